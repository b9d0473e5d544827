use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use crate::geoip::GeoIpProviderId;

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// The US plus the territories weather.gov forecasts for (PR, USVI, Guam,
/// American Samoa, Northern Marianas).
pub const DEFAULT_GEOCODE_COUNTRY_CODES: &str = "us,pr,vi,gu,as,mp";

/// Credentials for a single IP geolocation provider (e.g. an ipinfo token).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: String,
}

/// Fallback values for the command-line flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayDefaults {
    pub color: bool,
    pub days: u32,
    pub hours: u32,
    pub width: usize,
    /// ZIP code or place; absent means "use IP geolocation".
    pub zipcode: Option<String>,
}

impl Default for DisplayDefaults {
    fn default() -> Self {
        Self {
            color: false,
            days: 2,
            hours: 12,
            width: 80,
            zipcode: None,
        }
    }
}

/// Base URLs of every upstream service. Overridable for testing or mirrors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub weather_gov: String,
    pub nominatim: String,
    pub ipify: String,
    pub ipinfo: String,
    pub ipapi: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            weather_gov: "https://api.weather.gov".to_string(),
            nominatim: "https://nominatim.openstreetmap.org".to_string(),
            ipify: "https://api.ipify.org".to_string(),
            ipinfo: "https://ipinfo.io".to_string(),
            ipapi: "http://ip-api.com".to_string(),
        }
    }
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Optional IP geolocation provider id, "ipinfo" or "ipapi".
    pub default_geoip_provider: Option<String>,

    /// Sent on every request; weather.gov and Nominatim both reject anonymous clients.
    pub user_agent: Option<String>,
    pub timeout_secs: u64,

    /// Restricts place lookups to areas weather.gov covers.
    pub geocode_country_codes: Option<String>,

    pub defaults: DisplayDefaults,
    pub endpoints: Endpoints,

    /// Example TOML:
    /// [providers.ipinfo]
    /// api_key = "..."
    pub providers: HashMap<String, ProviderConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_geoip_provider: None,
            user_agent: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            geocode_country_codes: Some(DEFAULT_GEOCODE_COUNTRY_CODES.to_string()),
            defaults: DisplayDefaults::default(),
            endpoints: Endpoints::default(),
            providers: HashMap::new(),
        }
    }
}

impl Config {
    /// The configured GeoIP provider, or ipinfo when none is set.
    pub fn default_geoip_provider_id(&self) -> Result<GeoIpProviderId> {
        match self.default_geoip_provider.as_deref() {
            Some(s) => GeoIpProviderId::try_from(s),
            None => Ok(GeoIpProviderId::IpInfo),
        }
    }

    pub fn set_default_geoip_provider(&mut self, id: GeoIpProviderId) {
        self.default_geoip_provider = Some(id.as_str().to_string());
    }

    /// Set or replace a provider token; the first provider configured becomes the default.
    pub fn upsert_provider_api_key(&mut self, provider_id: GeoIpProviderId, api_key: String) {
        self.providers
            .insert(provider_id.as_str().to_string(), ProviderConfig { api_key });

        if self.default_geoip_provider.is_none() {
            self.default_geoip_provider = Some(provider_id.to_string());
        }
    }

    /// Returns API key for a provider, if present.
    pub fn provider_api_key(&self, provider_id: GeoIpProviderId) -> Option<&str> {
        self.providers
            .get(provider_id.as_str())
            .map(|cfg| cfg.api_key.as_str())
            .filter(|key| !key.is_empty())
    }

    pub fn user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| format!("wezzer/{}", env!("CARGO_PKG_VERSION")))
    }

    /// Load config from the platform location, or defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to the platform location, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "wezzer", "wezzer")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
