//! Core library for the `wezzer` CLI.
//!
//! This crate defines:
//! - Configuration handling
//! - Location resolution (geocoding, public IP + GeoIP)
//! - The weather.gov point and forecast client
//! - Shared domain models and temperature trend derivation
//!
//! It is used by `wezzer-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod geoip;
pub mod http;
pub mod location;
pub mod model;
pub mod nws;
pub mod pipeline;
pub mod trend;

pub use config::{Config, DisplayDefaults, Endpoints, ProviderConfig};
pub use error::{Result, WezzerError};
pub use geoip::{GeoIpProvider, GeoIpProviderId};
pub use location::{Geocoder, IpDiscovery, LocationQuery, LocationResolver};
pub use model::{Coordinate, EndpointInfo, ForecastDocument, ForecastPeriod, TrendedPeriod};
pub use nws::{NwsClient, WeatherService};
pub use pipeline::{Outlook, OutlookRequest, Pipeline};
pub use trend::{Trend, TrendTracker};
