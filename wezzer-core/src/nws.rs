//! api.weather.gov client: point lookup and forecast documents.

use std::fmt::Debug;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, header::ACCEPT};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    error::{Result, WezzerError},
    http::{join_url, truncate_body},
    model::{Coordinate, EndpointInfo, ForecastDocument, ForecastPeriod},
};

const GEO_JSON: &str = "application/geo+json";

#[async_trait]
pub trait WeatherService: Send + Sync + Debug {
    /// Map a coordinate to its forecast resources and display location.
    async fn lookup_point(&self, coordinate: &Coordinate) -> Result<EndpointInfo>;

    /// Retrieve one forecast document (hourly or multi-day; same shape).
    async fn fetch_forecast(&self, url: &str) -> Result<ForecastDocument>;
}

#[derive(Debug, Clone)]
pub struct NwsClient {
    base_url: String,
    http: Client,
}

impl NwsClient {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http,
        }
    }
}

#[derive(Debug, Deserialize)]
struct PointResponse {
    properties: Option<PointProperties>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PointProperties {
    forecast: Option<String>,
    forecast_hourly: Option<String>,
    relative_location: Option<RelativeLocation>,
}

#[derive(Debug, Deserialize)]
struct RelativeLocation {
    properties: Option<RelativeLocationProperties>,
}

#[derive(Debug, Deserialize)]
struct RelativeLocationProperties {
    city: Option<String>,
    state: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    properties: Option<ForecastProperties>,
}

#[derive(Debug, Deserialize)]
struct ForecastProperties {
    periods: Option<Vec<ForecastPeriod>>,
}

fn required<T>(value: Option<T>, field: &str) -> Result<T> {
    value.ok_or_else(|| WezzerError::malformed("weather.gov points API", format!("missing {field}")))
}

impl PointResponse {
    fn into_endpoint_info(self) -> Result<EndpointInfo> {
        let props = required(self.properties, "properties")?;
        let forecast_url = required(props.forecast, "properties.forecast")?;
        let hourly_url = required(props.forecast_hourly, "properties.forecastHourly")?;
        let place = required(
            props.relative_location.and_then(|r| r.properties),
            "properties.relativeLocation.properties",
        )?;

        Ok(EndpointInfo {
            hourly_url,
            forecast_url,
            city: required(place.city, "properties.relativeLocation.properties.city")?,
            state: required(place.state, "properties.relativeLocation.properties.state")?,
        })
    }
}

#[async_trait]
impl WeatherService for NwsClient {
    async fn lookup_point(&self, coordinate: &Coordinate) -> Result<EndpointInfo> {
        let url = join_url(&self.base_url, &format!("points/{coordinate}"));
        debug!("Looking up forecast endpoints: {}", url);

        let res = self
            .http
            .get(&url)
            .header(ACCEPT, GEO_JSON)
            .send()
            .await
            .map_err(|e| WezzerError::EndpointLookup {
                coordinate: *coordinate,
                status: None,
                reason: e.to_string(),
            })?;

        let status = res.status();
        if status == StatusCode::NOT_FOUND {
            return Err(WezzerError::InvalidLocation {
                coordinate: *coordinate,
            });
        }

        let body = res.text().await.map_err(|e| WezzerError::EndpointLookup {
            coordinate: *coordinate,
            status: Some(status),
            reason: format!("failed to read response body: {e}"),
        })?;

        if !status.is_success() {
            warn!("weather.gov points returned {}: {}", status, truncate_body(&body));
            return Err(WezzerError::EndpointLookup {
                coordinate: *coordinate,
                status: Some(status),
                reason: format!("status {status}"),
            });
        }

        let parsed: PointResponse = serde_json::from_str(&body)
            .map_err(|e| WezzerError::malformed("weather.gov points API", e.to_string()))?;

        parsed.into_endpoint_info()
    }

    async fn fetch_forecast(&self, url: &str) -> Result<ForecastDocument> {
        debug!("Fetching forecast: {}", url);

        let fail = |status: Option<StatusCode>, reason: String| WezzerError::ForecastFetch {
            url: url.to_string(),
            status,
            reason,
        };

        let res = self
            .http
            .get(url)
            .header(ACCEPT, GEO_JSON)
            .send()
            .await
            .map_err(|e| fail(None, e.to_string()))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| fail(Some(status), format!("failed to read response body: {e}")))?;

        if status != StatusCode::OK {
            warn!("weather.gov forecast returned {}: {}", status, truncate_body(&body));
            return Err(fail(Some(status), format!("status {status}")));
        }

        let parsed: ForecastResponse = serde_json::from_str(&body)
            .map_err(|e| WezzerError::malformed("weather.gov forecast API", e.to_string()))?;

        let periods = parsed
            .properties
            .and_then(|p| p.periods)
            .ok_or_else(|| {
                WezzerError::malformed("weather.gov forecast API", "missing properties.periods")
            })?;

        let document = ForecastDocument { periods };
        if !document.is_ordered() {
            return Err(WezzerError::malformed(
                "weather.gov forecast API",
                "period numbers do not increase from 1",
            ));
        }

        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn coordinate() -> Coordinate {
        Coordinate::new(37.7749, -122.4194).unwrap()
    }

    fn point_body(server: &MockServer) -> serde_json::Value {
        json!({
            "properties": {
                "forecast": format!("{}/gridpoints/MTR/85,105/forecast", server.uri()),
                "forecastHourly": format!("{}/gridpoints/MTR/85,105/forecast/hourly", server.uri()),
                "relativeLocation": {
                    "properties": { "city": "San Francisco", "state": "CA" }
                }
            }
        })
    }

    #[tokio::test]
    async fn lookup_point_extracts_urls_and_place() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/points/37.7749,-122.4194"))
            .and(header("accept", GEO_JSON))
            .respond_with(ResponseTemplate::new(200).set_body_json(point_body(&server)))
            .mount(&server)
            .await;

        let info = NwsClient::new(Client::new(), server.uri())
            .lookup_point(&coordinate())
            .await
            .unwrap();

        assert_eq!(info.display_location(), "San Francisco, CA");
        assert!(info.hourly_url.ends_with("/forecast/hourly"));
        assert!(info.forecast_url.ends_with("/forecast"));
    }

    #[tokio::test]
    async fn not_found_is_invalid_location() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "title": "Data Unavailable For Requested Point"
            })))
            .mount(&server)
            .await;

        let err = NwsClient::new(Client::new(), server.uri())
            .lookup_point(&coordinate())
            .await
            .unwrap_err();

        assert!(matches!(err, WezzerError::InvalidLocation { .. }));
    }

    #[tokio::test]
    async fn other_failure_is_endpoint_lookup_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = NwsClient::new(Client::new(), server.uri())
            .lookup_point(&coordinate())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            WezzerError::EndpointLookup {
                status: Some(StatusCode::INTERNAL_SERVER_ERROR),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn missing_city_is_malformed() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "properties": {
                    "forecast": "http://x/forecast",
                    "forecastHourly": "http://x/forecast/hourly",
                    "relativeLocation": { "properties": { "state": "CA" } }
                }
            })))
            .mount(&server)
            .await;

        let err = NwsClient::new(Client::new(), server.uri())
            .lookup_point(&coordinate())
            .await
            .unwrap_err();

        assert!(matches!(err, WezzerError::MalformedResponse { .. }));
        assert!(err.to_string().contains("properties.relativeLocation.properties.city"));
    }

    #[tokio::test]
    async fn fetch_forecast_parses_periods() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/gridpoints/MTR/85,105/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "properties": {
                    "periods": [
                        { "number": 1, "name": "Today", "temperature": 68, "temperatureUnit": "F" },
                        { "number": 2, "name": "Tonight", "temperature": 52, "temperatureUnit": "F" }
                    ]
                }
            })))
            .mount(&server)
            .await;

        let url = format!("{}/gridpoints/MTR/85,105/forecast", server.uri());
        let doc = NwsClient::new(Client::new(), server.uri())
            .fetch_forecast(&url)
            .await
            .unwrap();

        assert_eq!(doc.periods.len(), 2);
        assert_eq!(doc.periods[1].name, "Tonight");
    }

    #[tokio::test]
    async fn fetch_forecast_failure_carries_status() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let url = format!("{}/gridpoints/MTR/85,105/forecast", server.uri());
        let err = NwsClient::new(Client::new(), server.uri())
            .fetch_forecast(&url)
            .await
            .unwrap_err();

        match err {
            WezzerError::ForecastFetch { status, url: failed, .. } => {
                assert_eq!(status, Some(StatusCode::SERVICE_UNAVAILABLE));
                assert_eq!(failed, url);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn fetch_forecast_rejects_numbering_not_starting_at_one() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "properties": {
                    "periods": [
                        { "number": 5, "name": "Friday", "temperature": 70 },
                        { "number": 6, "name": "Friday Night", "temperature": 55 }
                    ]
                }
            })))
            .mount(&server)
            .await;

        let url = format!("{}/forecast", server.uri());
        let err = NwsClient::new(Client::new(), server.uri())
            .fetch_forecast(&url)
            .await
            .unwrap_err();

        assert!(matches!(err, WezzerError::MalformedResponse { .. }));
        assert!(err.to_string().contains("do not increase from 1"));
    }

    #[tokio::test]
    async fn fetch_forecast_without_periods_is_malformed() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "properties": {} })))
            .mount(&server)
            .await;

        let url = format!("{}/forecast", server.uri());
        let err = NwsClient::new(Client::new(), server.uri())
            .fetch_forecast(&url)
            .await
            .unwrap_err();

        assert!(matches!(err, WezzerError::MalformedResponse { .. }));
    }
}
