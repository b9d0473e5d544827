use std::net::IpAddr;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    error::{Result, WezzerError},
    http::join_url,
    model::Coordinate,
};

use super::GeoIpProvider;

/// ip-api.com's free JSON endpoint. No key, HTTP only.
#[derive(Debug, Clone)]
pub struct IpApiProvider {
    base_url: String,
    http: Client,
}

impl IpApiProvider {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http,
        }
    }
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

#[async_trait]
impl GeoIpProvider for IpApiProvider {
    async fn locate(&self, ip: IpAddr) -> Result<Coordinate> {
        let fail = |reason: String| WezzerError::GeoIp {
            ip: ip.to_string(),
            reason,
        };

        let res = self
            .http
            .get(join_url(&self.base_url, &format!("json/{ip}")))
            .query(&[("fields", "status,message,lat,lon")])
            .send()
            .await
            .map_err(|e| fail(format!("ip-api unreachable: {e}")))?;

        let status = res.status();
        if !status.is_success() {
            return Err(fail(format!("ip-api returned status {status}")));
        }

        let parsed: IpApiResponse = res
            .json()
            .await
            .map_err(|e| WezzerError::malformed("ip-api", e.to_string()))?;

        if parsed.status != "success" {
            return Err(fail(
                parsed
                    .message
                    .unwrap_or_else(|| "not found in geolocation database".to_string()),
            ));
        }

        match (parsed.lat, parsed.lon) {
            (Some(lat), Some(lon)) => Coordinate::new(lat, lon)
                .ok_or_else(|| fail(format!("coordinate out of range: {lat},{lon}"))),
            _ => Err(WezzerError::malformed("ip-api", "missing lat/lon")),
        }
    }
}
