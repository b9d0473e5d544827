use reqwest::StatusCode;
use thiserror::Error;

use crate::model::Coordinate;

pub type Result<T> = std::result::Result<T, WezzerError>;

/// Every failure the forecast pipeline can hit.
///
/// None of these are retried: the binary prints the message on one line and
/// exits non-zero.
#[derive(Debug, Error)]
pub enum WezzerError {
    #[error("could not geocode '{query}': {reason}")]
    Geocode { query: String, reason: String },

    #[error("could not determine public IP address: {0}")]
    IpLookup(String),

    #[error("could not geolocate IP address {ip}: {reason}")]
    GeoIp { ip: String, reason: String },

    /// weather.gov answered the point lookup with 404: the coordinate is
    /// outside every forecast zone.
    #[error("Invalid address, city, or zip code provided. ({coordinate})")]
    InvalidLocation { coordinate: Coordinate },

    #[error("failed to get response from weather.gov API for {coordinate}: {reason}")]
    EndpointLookup {
        coordinate: Coordinate,
        status: Option<StatusCode>,
        reason: String,
    },

    #[error("malformed response from {source_name}: {detail}")]
    MalformedResponse {
        source_name: &'static str,
        detail: String,
    },

    #[error("failed to fetch forecast from {url}: {reason}")]
    ForecastFetch {
        url: String,
        status: Option<StatusCode>,
        reason: String,
    },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

impl WezzerError {
    pub(crate) fn malformed(source_name: &'static str, detail: impl Into<String>) -> Self {
        Self::MalformedResponse {
            source_name,
            detail: detail.into(),
        }
    }
}
