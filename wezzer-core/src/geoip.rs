use crate::{
    Config,
    error::Result,
    geoip::{ipapi::IpApiProvider, ipinfo::IpInfoProvider},
    model::Coordinate,
};
use async_trait::async_trait;
use reqwest::Client;
use std::{convert::TryFrom, fmt::Debug, net::IpAddr};

pub mod ipapi;
pub mod ipinfo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeoIpProviderId {
    IpInfo,
    IpApi,
}

impl GeoIpProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeoIpProviderId::IpInfo => "ipinfo",
            GeoIpProviderId::IpApi => "ipapi",
        }
    }

    pub const fn all() -> &'static [GeoIpProviderId] {
        &[GeoIpProviderId::IpInfo, GeoIpProviderId::IpApi]
    }
}

impl std::fmt::Display for GeoIpProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for GeoIpProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> std::result::Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "ipinfo" => Ok(GeoIpProviderId::IpInfo),
            "ipapi" | "ip-api" => Ok(GeoIpProviderId::IpApi),
            _ => Err(anyhow::anyhow!(
                "Unknown GeoIP provider '{value}'. Supported providers: ipinfo, ipapi."
            )),
        }
    }
}

/// Maps an IP address to an approximate (city-level) coordinate.
#[async_trait]
pub trait GeoIpProvider: Send + Sync + Debug {
    async fn locate(&self, ip: IpAddr) -> Result<Coordinate>;
}

/// Construct a provider from config and explicit id.
pub fn provider_from_config(
    id: GeoIpProviderId,
    config: &Config,
    http: Client,
) -> Box<dyn GeoIpProvider> {
    let token = config.provider_api_key(id).map(str::to_owned);

    match id {
        GeoIpProviderId::IpInfo => Box::new(IpInfoProvider::new(
            http,
            config.endpoints.ipinfo.clone(),
            token,
        )),
        GeoIpProviderId::IpApi => Box::new(IpApiProvider::new(http, config.endpoints.ipapi.clone())),
    }
}

/// Construct the provider named by `default_geoip_provider` (ipinfo if unset).
pub fn default_provider_from_config(
    config: &Config,
    http: Client,
) -> anyhow::Result<Box<dyn GeoIpProvider>> {
    let id = config.default_geoip_provider_id()?;
    Ok(provider_from_config(id, config, http))
}
