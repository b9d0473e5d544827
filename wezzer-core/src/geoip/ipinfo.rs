use std::net::IpAddr;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    error::{Result, WezzerError},
    http::{join_url, truncate_body},
    model::Coordinate,
};

use super::GeoIpProvider;

#[derive(Debug, Clone)]
pub struct IpInfoProvider {
    base_url: String,
    token: Option<String>,
    http: Client,
}

impl IpInfoProvider {
    pub fn new(http: Client, base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token,
            http,
        }
    }
}

#[derive(Debug, Deserialize)]
struct IpInfoResponse {
    /// "latitude,longitude"; absent for bogon and unknown addresses.
    loc: Option<String>,
    #[serde(default)]
    bogon: bool,
}

#[async_trait]
impl GeoIpProvider for IpInfoProvider {
    async fn locate(&self, ip: IpAddr) -> Result<Coordinate> {
        let fail = |reason: String| WezzerError::GeoIp {
            ip: ip.to_string(),
            reason,
        };

        let mut req = self.http.get(join_url(&self.base_url, &format!("{ip}/json")));
        if let Some(token) = self.token.as_deref() {
            req = req.query(&[("token", token)]);
        }

        let res = req
            .send()
            .await
            .map_err(|e| fail(format!("ipinfo unreachable: {e}")))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| fail(format!("failed to read ipinfo response: {e}")))?;

        if !status.is_success() {
            return Err(fail(format!(
                "ipinfo returned status {status}: {}",
                truncate_body(&body)
            )));
        }

        let parsed: IpInfoResponse = serde_json::from_str(&body)
            .map_err(|e| WezzerError::malformed("ipinfo", e.to_string()))?;

        if parsed.bogon {
            return Err(fail("address is private or reserved".to_string()));
        }

        let loc = parsed
            .loc
            .ok_or_else(|| fail("not found in geolocation database".to_string()))?;

        Coordinate::parse_pair(&loc).ok_or_else(|| fail(format!("unusable location '{loc}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn parses_loc_field_and_sends_token() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/203.0.113.7/json"))
            .and(query_param("token", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ip": "203.0.113.7",
                "city": "Denver",
                "region": "Colorado",
                "loc": "39.7392,-104.9903"
            })))
            .mount(&server)
            .await;

        let provider = IpInfoProvider::new(Client::new(), server.uri(), Some("secret".into()));
        let c = provider.locate("203.0.113.7".parse().unwrap()).await.unwrap();

        assert_eq!(c, Coordinate::new(39.7392, -104.9903).unwrap());
    }

    #[tokio::test]
    async fn bogon_is_geoip_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/10.0.0.1/json"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "ip": "10.0.0.1", "bogon": true })),
            )
            .mount(&server)
            .await;

        let provider = IpInfoProvider::new(Client::new(), server.uri(), None);
        let err = provider.locate("10.0.0.1".parse().unwrap()).await.unwrap_err();

        assert!(matches!(err, WezzerError::GeoIp { .. }));
    }

    #[tokio::test]
    async fn missing_loc_is_geoip_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ip": "198.51.100.1" })))
            .mount(&server)
            .await;

        let provider = IpInfoProvider::new(Client::new(), server.uri(), None);
        let err = provider.locate("198.51.100.1".parse().unwrap()).await.unwrap_err();

        assert!(err.to_string().contains("not found in geolocation database"));
    }
}
