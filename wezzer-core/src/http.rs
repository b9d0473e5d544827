use std::time::Duration;

use reqwest::Client;

use crate::{config::Config, error::Result};

/// Settings shared by every outbound client.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub user_agent: String,
    pub timeout: Duration,
}

impl HttpSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            user_agent: config.user_agent(),
            timeout: Duration::from_secs(config.timeout_secs.max(1)),
        }
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Build a client that never waits longer than the configured timeout.
pub fn build_client(settings: &HttpSettings) -> Result<Client> {
    let client = Client::builder()
        .timeout(settings.timeout)
        .user_agent(settings.user_agent.as_str())
        .build()?;

    Ok(client)
}

pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
