//! Turning "where am I?" into a coordinate.
//!
//! Exactly one strategy runs per invocation: a supplied place string goes to
//! the geocoder, otherwise the public IP is discovered and geolocated.

use std::{fmt::Debug, net::IpAddr};

use async_trait::async_trait;
use tracing::debug;

use crate::{error::Result, geoip::GeoIpProvider, model::Coordinate};

pub mod ipify;
pub mod nominatim;

pub use ipify::IpifyDiscovery;
pub use nominatim::NominatimGeocoder;

/// Free-text place (ZIP code, "Boulder, CO", ...) to coordinate.
#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    async fn geocode(&self, query: &str) -> Result<Coordinate>;
}

/// Reports the caller's public address.
#[async_trait]
pub trait IpDiscovery: Send + Sync + Debug {
    async fn public_ip(&self) -> Result<IpAddr>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationQuery {
    Place(String),
    PublicIp,
}

impl LocationQuery {
    /// Blank place strings count as "not supplied".
    pub fn from_place(place: Option<String>) -> Self {
        match place {
            Some(p) if !p.trim().is_empty() => LocationQuery::Place(p.trim().to_string()),
            _ => LocationQuery::PublicIp,
        }
    }
}

#[derive(Debug)]
pub struct LocationResolver {
    geocoder: Box<dyn Geocoder>,
    ip_discovery: Box<dyn IpDiscovery>,
    geoip: Box<dyn GeoIpProvider>,
}

impl LocationResolver {
    pub fn new(
        geocoder: Box<dyn Geocoder>,
        ip_discovery: Box<dyn IpDiscovery>,
        geoip: Box<dyn GeoIpProvider>,
    ) -> Self {
        Self {
            geocoder,
            ip_discovery,
            geoip,
        }
    }

    pub async fn resolve(&self, query: &LocationQuery) -> Result<Coordinate> {
        match query {
            LocationQuery::Place(place) => {
                debug!("Geocoding place: {}", place);
                let coordinate = self.geocoder.geocode(place).await?;
                debug!("Geocoded '{}' to {}", place, coordinate);
                Ok(coordinate)
            }
            LocationQuery::PublicIp => {
                let ip = self.ip_discovery.public_ip().await?;
                debug!("Public IP address: {}", ip);
                let coordinate = self.geoip.locate(ip).await?;
                debug!("Geolocated {} to {}", ip, coordinate);
                Ok(coordinate)
            }
        }
    }
}
