//! Temperature trend markers.
//!
//! Hourly documents carry no trend, so it is derived by walking the periods
//! and comparing each temperature with the one before it. Multi-day documents
//! ship `temperatureTrend` and it is passed straight through.

use serde::Serialize;

use crate::model::ForecastPeriod;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    /// No previous temperature to compare against.
    Unset,
    Rising,
    Falling,
    Steady,
}

impl Trend {
    /// Map the multi-day `temperatureTrend` field.
    pub fn from_api(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(s) if s.eq_ignore_ascii_case("rising") => Trend::Rising,
            Some(s) if s.eq_ignore_ascii_case("falling") => Trend::Falling,
            _ => Trend::Steady,
        }
    }

    /// Strict comparison of two consecutive temperatures.
    pub fn between(previous: Option<f64>, current: Option<f64>) -> Self {
        match (previous, current) {
            (Some(prev), Some(cur)) if cur > prev => Trend::Rising,
            (Some(prev), Some(cur)) if cur < prev => Trend::Falling,
            (Some(_), Some(_)) => Trend::Steady,
            _ => Trend::Unset,
        }
    }
}

/// Accumulator for the hourly walk: remembers the last temperature seen.
#[derive(Debug, Default, Clone)]
pub struct TrendTracker {
    last: Option<f64>,
}

impl TrendTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, temperature: Option<f64>) -> Trend {
        let trend = Trend::between(self.last, temperature);
        self.last = temperature;
        trend
    }
}

/// Derive trends for hourly periods, in the order given.
pub fn hourly_trends<'a, I>(periods: I) -> Vec<Trend>
where
    I: IntoIterator<Item = &'a ForecastPeriod>,
{
    periods
        .into_iter()
        .scan(TrendTracker::new(), |tracker, period| {
            Some(tracker.observe(period.temperature))
        })
        .collect()
}
