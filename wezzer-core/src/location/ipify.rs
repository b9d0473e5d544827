use std::net::IpAddr;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::error::{Result, WezzerError};

use super::IpDiscovery;

/// Public address discovery via ipify (`?format=json`).
#[derive(Debug, Clone)]
pub struct IpifyDiscovery {
    base_url: String,
    http: Client,
}

impl IpifyDiscovery {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http,
        }
    }
}

#[derive(Debug, Deserialize)]
struct IpifyResponse {
    ip: String,
}

#[async_trait]
impl IpDiscovery for IpifyDiscovery {
    async fn public_ip(&self) -> Result<IpAddr> {
        let res = self
            .http
            .get(&self.base_url)
            .query(&[("format", "json")])
            .send()
            .await
            .map_err(|e| WezzerError::IpLookup(format!("IP discovery service unreachable: {e}")))?;

        let status = res.status();
        if !status.is_success() {
            return Err(WezzerError::IpLookup(format!(
                "IP discovery service returned status {status}"
            )));
        }

        let parsed: IpifyResponse = res
            .json()
            .await
            .map_err(|e| WezzerError::IpLookup(format!("unreadable IP discovery response: {e}")))?;

        parsed
            .ip
            .trim()
            .parse()
            .map_err(|_| WezzerError::IpLookup(format!("'{}' is not an IP address", parsed.ip)))
    }
}
