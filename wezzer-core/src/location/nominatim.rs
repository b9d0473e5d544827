use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

use crate::{
    error::{Result, WezzerError},
    http::{join_url, truncate_body},
    model::Coordinate,
};

use super::Geocoder;

/// Forward geocoding through OpenStreetMap's Nominatim search API.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    base_url: String,
    country_codes: Option<String>,
    http: Client,
}

impl NominatimGeocoder {
    pub fn new(http: Client, base_url: impl Into<String>, country_codes: Option<String>) -> Self {
        Self {
            base_url: base_url.into(),
            country_codes,
            http,
        }
    }
}

// Nominatim sends coordinates as strings.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, query: &str) -> Result<Coordinate> {
        let fail = |reason: String| WezzerError::Geocode {
            query: query.to_string(),
            reason,
        };

        let mut params = vec![("q", query), ("format", "json"), ("limit", "1")];
        if let Some(codes) = self.country_codes.as_deref() {
            params.push(("countrycodes", codes));
        }

        let res = self
            .http
            .get(join_url(&self.base_url, "search"))
            .query(&params)
            .send()
            .await
            .map_err(|e| fail(format!("geocoding service unreachable: {e}")))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| fail(format!("failed to read geocoding response: {e}")))?;

        if !status.is_success() {
            warn!("Nominatim returned {}: {}", status, truncate_body(&body));
            return Err(fail(format!("geocoding service returned status {status}")));
        }

        let places: Vec<NominatimPlace> = serde_json::from_str(&body)
            .map_err(|e| WezzerError::malformed("Nominatim", e.to_string()))?;

        let best = places
            .into_iter()
            .next()
            .ok_or_else(|| fail("no matching location".to_string()))?;

        let (lat, lon) = match (best.lat.parse::<f64>(), best.lon.parse::<f64>()) {
            (Ok(lat), Ok(lon)) => (lat, lon),
            _ => {
                return Err(WezzerError::malformed(
                    "Nominatim",
                    format!("non-numeric coordinates '{}', '{}'", best.lat, best.lon),
                ));
            }
        };

        tracing::debug!(
            "Nominatim best match: {}",
            best.display_name.as_deref().unwrap_or("<unnamed>")
        );

        Coordinate::new(lat, lon).ok_or_else(|| fail(format!("coordinate out of range: {lat},{lon}")))
    }
}
