use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};

use crate::trend::Trend;

/// A WGS84 position, always within valid latitude/longitude ranges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Returns `None` for non-finite or out-of-range values.
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);

        valid.then_some(Self { latitude, longitude })
    }

    /// Parse the `"lat,lon"` form used by several geolocation services.
    pub fn parse_pair(raw: &str) -> Option<Self> {
        let (lat, lon) = raw.split_once(',')?;
        Self::new(lat.trim().parse().ok()?, lon.trim().parse().ok()?)
    }
}

/// weather.gov redirects point lookups with more than four decimals, so the
/// coordinate is rendered at that precision with trailing zeros dropped.
impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", compact(self.latitude), compact(self.longitude))
    }
}

fn compact(value: f64) -> String {
    let fixed = format!("{value:.4}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" { "0".to_string() } else { trimmed.to_string() }
}

/// Per-location resources returned by the point lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointInfo {
    pub hourly_url: String,
    pub forecast_url: String,
    pub city: String,
    pub state: String,
}

impl EndpointInfo {
    pub fn display_location(&self) -> String {
        format!("{}, {}", self.city, self.state)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDocument {
    pub periods: Vec<ForecastPeriod>,
}

impl ForecastDocument {
    /// Periods in order, stopping at the first whose number exceeds `limit`.
    pub fn through(&self, limit: u32) -> impl Iterator<Item = &ForecastPeriod> {
        self.periods.iter().take_while(move |p| p.number <= limit)
    }

    /// Whether period numbers start at 1 and strictly increase.
    pub fn is_ordered(&self) -> bool {
        self.periods.first().is_none_or(|p| p.number == 1)
            && self.periods.windows(2).all(|w| w[0].number < w[1].number)
    }
}

/// One slice of a forecast: an hour, or a day/night half.
///
/// Only `number` is required; everything else degrades to `None` or an empty
/// string so a single odd period never aborts display of the rest.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPeriod {
    pub number: u32,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub start_time: Option<DateTime<FixedOffset>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub end_time: Option<DateTime<FixedOffset>>,
    #[serde(default, deserialize_with = "lenient_temperature")]
    pub temperature: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub temperature_unit: String,
    #[serde(default, deserialize_with = "lenient_optional_string")]
    pub temperature_trend: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub wind_speed: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub wind_direction: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub short_forecast: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub detailed_forecast: String,
}

/// A period paired with the trend marker presentation should show for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendedPeriod {
    pub period: ForecastPeriod,
    pub trend: Trend,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_optional_string(deserializer)?.unwrap_or_default())
}

fn lenient_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<FixedOffset>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = lenient_optional_string(deserializer)?;
    Ok(raw.and_then(|s| DateTime::parse_from_rfc3339(&s).ok()))
}

// weather.gov sends either `"temperature": 55` or a quantitative value
// `{ "unitCode": "wmoUnit:degF", "value": 55 }` depending on feature flags.
fn lenient_temperature<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match &value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::Object(map) => map.get("value").and_then(serde_json::Value::as_f64),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coordinate_rejects_out_of_range() {
        assert!(Coordinate::new(90.5, 0.0).is_none());
        assert!(Coordinate::new(0.0, -180.1).is_none());
        assert!(Coordinate::new(f64::NAN, 0.0).is_none());
        assert!(Coordinate::new(-90.0, 180.0).is_some());
    }

    #[test]
    fn coordinate_display_trims_precision() {
        let c = Coordinate::new(37.774929, -122.419416).unwrap();
        assert_eq!(c.to_string(), "37.7749,-122.4194");

        let c = Coordinate::new(40.0, -105.25).unwrap();
        assert_eq!(c.to_string(), "40,-105.25");
    }

    #[test]
    fn coordinate_parses_pairs() {
        let c = Coordinate::parse_pair("37.7749, -122.4194").unwrap();
        assert_eq!(c.latitude, 37.7749);
        assert_eq!(c.longitude, -122.4194);

        assert!(Coordinate::parse_pair("37.7749").is_none());
        assert!(Coordinate::parse_pair("abc,def").is_none());
        assert!(Coordinate::parse_pair("137.0,10.0").is_none());
    }

    #[test]
    fn period_parses_full_nws_shape() {
        let period: ForecastPeriod = serde_json::from_value(json!({
            "number": 1,
            "name": "Tonight",
            "startTime": "2026-10-18T18:00:00-07:00",
            "endTime": "2026-10-19T06:00:00-07:00",
            "isDaytime": false,
            "temperature": 52,
            "temperatureUnit": "F",
            "temperatureTrend": "rising",
            "windSpeed": "5 to 10 mph",
            "windDirection": "W",
            "shortForecast": "Mostly Clear",
            "detailedForecast": "Mostly clear, with a low around 52."
        }))
        .unwrap();

        assert_eq!(period.number, 1);
        assert_eq!(period.temperature, Some(52.0));
        assert_eq!(period.temperature_trend.as_deref(), Some("rising"));
        assert_eq!(
            period.start_time.unwrap().to_rfc3339(),
            "2026-10-18T18:00:00-07:00"
        );
    }

    #[test]
    fn period_degrades_missing_and_odd_fields() {
        let period: ForecastPeriod = serde_json::from_value(json!({
            "number": 3,
            "startTime": "not a time",
            "temperature": { "unitCode": "wmoUnit:degF", "value": 61 },
            "temperatureTrend": null,
            "windSpeed": null
        }))
        .unwrap();

        assert_eq!(period.start_time, None);
        assert_eq!(period.end_time, None);
        assert_eq!(period.temperature, Some(61.0));
        assert_eq!(period.temperature_trend, None);
        assert_eq!(period.wind_speed, "");
        assert_eq!(period.short_forecast, "");
    }

    #[test]
    fn through_stops_at_first_number_over_limit() {
        let doc = ForecastDocument {
            periods: (1..=5)
                .map(|number| ForecastPeriod { number, ..Default::default() })
                .collect(),
        };

        let numbers: Vec<u32> = doc.through(3).map(|p| p.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(doc.through(0).count(), 0);
        assert_eq!(doc.through(99).count(), 5);
    }

    #[test]
    fn ordering_check() {
        let ordered = ForecastDocument {
            periods: [1, 2, 3]
                .into_iter()
                .map(|number| ForecastPeriod { number, ..Default::default() })
                .collect(),
        };
        let shuffled = ForecastDocument {
            periods: [1, 3, 2]
                .into_iter()
                .map(|number| ForecastPeriod { number, ..Default::default() })
                .collect(),
        };
        let late_start = ForecastDocument {
            periods: [5, 6]
                .into_iter()
                .map(|number| ForecastPeriod { number, ..Default::default() })
                .collect(),
        };

        assert!(ordered.is_ordered());
        assert!(!shuffled.is_ordered());
        assert!(!late_start.is_ordered());
        assert!(ForecastDocument { periods: vec![] }.is_ordered());
    }
}
