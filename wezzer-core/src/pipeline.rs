//! resolve location → discover endpoints → fetch hourly → fetch multi-day.

use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info};

use crate::{
    config::Config,
    error::Result,
    geoip,
    http::{HttpSettings, build_client},
    location::{IpifyDiscovery, LocationQuery, LocationResolver, NominatimGeocoder},
    model::{Coordinate, EndpointInfo, ForecastDocument, TrendedPeriod},
    nws::{NwsClient, WeatherService},
    trend::{Trend, hourly_trends},
};

/// What to fetch: where, and how many hourly periods / days.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlookRequest {
    pub query: LocationQuery,
    pub hours: u32,
    pub days: u32,
}

impl OutlookRequest {
    /// Multi-day documents alternate day and night, two periods per day.
    pub fn extended_periods(&self) -> u32 {
        self.days.saturating_mul(2)
    }
}

/// Everything presentation needs, already limited and trend-annotated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outlook {
    pub coordinate: Coordinate,
    pub location: EndpointInfo,
    pub hours: u32,
    pub days: u32,
    pub hourly: Vec<TrendedPeriod>,
    pub extended: Vec<TrendedPeriod>,
}

#[derive(Debug)]
pub struct Pipeline {
    resolver: LocationResolver,
    weather: Box<dyn WeatherService>,
}

impl Pipeline {
    pub fn new(resolver: LocationResolver, weather: Box<dyn WeatherService>) -> Self {
        Self { resolver, weather }
    }

    /// Wire the real upstream clients, sharing one HTTP client between them.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let http = build_client(&HttpSettings::from_config(config))?;
        Self::with_client(config, http)
    }

    fn with_client(config: &Config, http: Client) -> anyhow::Result<Self> {
        let endpoints = &config.endpoints;

        let resolver = LocationResolver::new(
            Box::new(NominatimGeocoder::new(
                http.clone(),
                endpoints.nominatim.clone(),
                config.geocode_country_codes.clone(),
            )),
            Box::new(IpifyDiscovery::new(http.clone(), endpoints.ipify.clone())),
            geoip::default_provider_from_config(config, http.clone())?,
        );
        let weather = Box::new(NwsClient::new(http, endpoints.weather_gov.clone()));

        Ok(Self::new(resolver, weather))
    }

    pub async fn run(&self, request: &OutlookRequest) -> Result<Outlook> {
        let coordinate = self.resolver.resolve(&request.query).await?;
        let location = self.weather.lookup_point(&coordinate).await?;
        info!("Forecast location: {}", location.display_location());

        let hourly_doc = self.weather.fetch_forecast(&location.hourly_url).await?;
        let extended_doc = self.weather.fetch_forecast(&location.forecast_url).await?;

        let hourly = annotate_hourly(&hourly_doc, request.hours);
        let extended = annotate_extended(&extended_doc, request.extended_periods());
        debug!(
            "Prepared {} hourly and {} extended periods",
            hourly.len(),
            extended.len()
        );

        Ok(Outlook {
            coordinate,
            location,
            hours: request.hours,
            days: request.days,
            hourly,
            extended,
        })
    }
}

/// Hourly periods up to `limit`, each compared with the one before it.
pub fn annotate_hourly(document: &ForecastDocument, limit: u32) -> Vec<TrendedPeriod> {
    let trends = hourly_trends(document.through(limit));

    document
        .through(limit)
        .zip(trends)
        .map(|(period, trend)| TrendedPeriod {
            period: period.clone(),
            trend,
        })
        .collect()
}

/// Multi-day periods up to `limit`, trend taken from the document itself.
pub fn annotate_extended(document: &ForecastDocument, limit: u32) -> Vec<TrendedPeriod> {
    document
        .through(limit)
        .map(|period| TrendedPeriod {
            trend: Trend::from_api(period.temperature_trend.as_deref()),
            period: period.clone(),
        })
        .collect()
}
