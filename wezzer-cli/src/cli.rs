use std::path::PathBuf;

use anyhow::Context;
use chrono::Local;
use clap::{Parser, Subcommand};
use tracing::debug;
use wezzer_core::{Config, DisplayDefaults, LocationQuery, OutlookRequest, Pipeline};

use crate::{configure, render::Renderer};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "wezzer",
    version,
    about = "It's wezzer, for weather: hourly and extended weather.gov forecasts"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Enable terminal colors
    #[arg(short, long, overrides_with = "no_color")]
    pub color: bool,

    /// Disable terminal colors, even when enabled in the config
    #[arg(long, overrides_with = "color")]
    pub no_color: bool,

    /// Number of days for Extended Forecast [default: 2]
    #[arg(short, long)]
    pub days: Option<u32>,

    /// Number of hours for Hourly Forecast [default: 12]
    #[arg(short = 't', long)]
    pub hours: Option<u32>,

    /// Max width of the output [default: 80]
    #[arg(short, long)]
    pub width: Option<usize>,

    /// ZIP code or place of desired weather location; omitted means locate by IP
    #[arg(short, long)]
    pub zipcode: Option<String>,

    /// Log every pipeline step to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Use this config file instead of the platform default
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactively set the default location, GeoIP provider and colors.
    Configure,
}

/// Flags merged over config defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub color: bool,
    pub days: u32,
    pub hours: u32,
    pub width: usize,
    pub zipcode: Option<String>,
}

impl Settings {
    pub fn merge(cli: &Cli, defaults: &DisplayDefaults) -> Self {
        Self {
            color: !cli.no_color && (cli.color || defaults.color),
            days: cli.days.unwrap_or(defaults.days),
            hours: cli.hours.unwrap_or(defaults.hours),
            width: cli.width.unwrap_or(defaults.width),
            zipcode: cli.zipcode.clone().or_else(|| defaults.zipcode.clone()),
        }
    }

    pub fn request(&self) -> OutlookRequest {
        OutlookRequest {
            query: LocationQuery::from_place(self.zipcode.clone()),
            hours: self.hours,
            days: self.days,
        }
    }
}

impl Cli {
    pub async fn run(mut self) -> anyhow::Result<()> {
        let config = match self.config.as_deref() {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };

        match self.command.take() {
            Some(Command::Configure) => configure::run(config, self.config.as_deref()),
            None => self.show(&config).await,
        }
    }

    async fn show(&self, config: &Config) -> anyhow::Result<()> {
        let settings = Settings::merge(self, &config.defaults);
        debug!("Effective settings: {:?}", settings);

        let pipeline =
            Pipeline::from_config(config).context("Failed to set up upstream clients")?;
        let outlook = pipeline.run(&settings.request()).await?;

        let renderer = Renderer::new(settings.color, settings.width);
        print!("{}", renderer.render(&outlook, Local::now().naive_local()));

        Ok(())
    }
}
