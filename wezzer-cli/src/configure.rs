use std::path::Path;

use inquire::{Confirm, Password, Select, Text};
use wezzer_core::{Config, GeoIpProviderId};

/// Answers collected by the interactive prompts.
#[derive(Debug, Clone)]
pub struct Answers {
    pub zipcode: String,
    pub provider: GeoIpProviderId,
    pub token: Option<String>,
    pub color: bool,
}

/// Prompt for defaults and write them to the config file.
pub fn run(mut config: Config, path: Option<&Path>) -> anyhow::Result<()> {
    let answers = prompt(&config)?;
    apply(&mut config, answers);

    let saved = match path {
        Some(p) => {
            config.save_to(p)?;
            p.to_path_buf()
        }
        None => config.save()?,
    };

    println!("Configuration saved to {}", saved.display());
    Ok(())
}

fn prompt(config: &Config) -> anyhow::Result<Answers> {
    let zipcode = Text::new("Default ZIP code or place (leave empty to locate by IP):")
        .with_initial_value(config.defaults.zipcode.as_deref().unwrap_or(""))
        .prompt()?;

    let current = config.default_geoip_provider_id().unwrap_or(GeoIpProviderId::IpInfo);
    let options = GeoIpProviderId::all().to_vec();
    let start = options.iter().position(|id| *id == current).unwrap_or(0);
    let provider = Select::new("IP geolocation provider:", options)
        .with_starting_cursor(start)
        .prompt()?;

    let token = if provider == GeoIpProviderId::IpInfo {
        let raw = Password::new("ipinfo token (optional, leave empty for anonymous):")
            .without_confirmation()
            .prompt()?;
        Some(raw)
    } else {
        None
    };

    let color = Confirm::new("Enable terminal colors by default?")
        .with_default(config.defaults.color)
        .prompt()?;

    Ok(Answers {
        zipcode,
        provider,
        token,
        color,
    })
}

pub fn apply(config: &mut Config, answers: Answers) {
    let zipcode = answers.zipcode.trim();
    config.defaults.zipcode = (!zipcode.is_empty()).then(|| zipcode.to_string());
    config.defaults.color = answers.color;
    config.set_default_geoip_provider(answers.provider);

    // An empty token keeps whatever was stored before.
    if let Some(token) = answers.token.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()) {
        config.upsert_provider_api_key(answers.provider, token);
    }
}
