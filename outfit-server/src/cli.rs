use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use inquire::{CustomType, CustomUserError, Text, validator::Validation};
use outfit_core::{Config, SuggestionOrchestrator, SuggestionRequest, config::check_url};
use tracing::info;

use crate::api;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "outfit-advisor", version, about = "Weather-aware clothing suggestions")]
pub struct Cli {
    /// Read configuration from this file instead of the platform config directory.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve `POST /suggest` and the static frontend.
    Serve {
        /// Address to listen on, e.g. "127.0.0.1:8080".
        #[arg(long)]
        bind: Option<String>,

        /// Directory with the frontend assets.
        #[arg(long)]
        static_dir: Option<PathBuf>,

        /// Answer CORS preflight requests and allow any origin.
        #[arg(long)]
        cors: bool,
    },

    /// Run the pipeline once and print the suggestion.
    Suggest {
        /// Location name, e.g. "Lisbon".
        location: String,

        #[arg(long)]
        height: String,

        #[arg(long)]
        occasion: String,

        /// Rating of the previous suggestion; 1 to 7 asks for a better one.
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        rating: i64,
    },

    /// Interactively set upstream endpoints and server options.
    Configure,

    /// Show the config file location and the effective configuration.
    ShowConfig,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config = self.load_config()?;

        match self.command {
            Command::Serve {
                bind,
                static_dir,
                cors,
            } => {
                let mut config = config;
                if let Some(bind) = bind {
                    config.server.bind = bind;
                }
                if let Some(static_dir) = static_dir {
                    config.server.static_dir = static_dir;
                }
                config.server.cors |= cors;

                api::serve(&config).await?;
            }
            Command::Suggest {
                location,
                height,
                occasion,
                rating,
            } => {
                let orchestrator = SuggestionOrchestrator::from_config(&config)?;
                let request = SuggestionRequest {
                    height,
                    location,
                    occasion,
                    rating,
                };

                let outcome = orchestrator.handle(&request).await.with_context(|| {
                    format!("Could not build a suggestion for '{}'", request.location)
                })?;

                info!(elapsed_ms = outcome.trace.elapsed_ms, "suggestion ready");
                println!("{}", outcome.response.suggestion);
            }
            Command::Configure => {
                let path = match &self.config {
                    Some(path) => path.clone(),
                    None => Config::config_file_path()?,
                };
                let updated = prompt_config(config)?;
                updated.save_to(&path)?;
                println!("Saved configuration to {}", path.display());
            }
            Command::ShowConfig => {
                let path = match &self.config {
                    Some(path) => path.clone(),
                    None => Config::config_file_path()?,
                };
                println!("# {}", path.display());
                print!("{}", config.to_toml()?);
            }
        }

        Ok(())
    }

    fn load_config(&self) -> Result<Config> {
        match &self.config {
            Some(path) => Config::load_from(path),
            None => Config::load(),
        }
    }
}

fn prompt_config(mut config: Config) -> Result<Config> {
    config.upstream.geocoder_url = Text::new("Geocoder search URL:")
        .with_default(&config.upstream.geocoder_url)
        .with_validator(url_input)
        .prompt()?;
    config.upstream.weather_url = Text::new("Weather forecast URL:")
        .with_default(&config.upstream.weather_url)
        .with_validator(url_input)
        .prompt()?;
    config.upstream.generation_url = Text::new("Generation service URL:")
        .with_default(&config.upstream.generation_url)
        .with_validator(url_input)
        .prompt()?;
    config.server.bind = Text::new("Listen address:")
        .with_default(&config.server.bind)
        .prompt()?;
    config.request_timeout_secs = CustomType::<u64>::new("Request timeout (seconds):")
        .with_default(config.request_timeout_secs)
        .with_error_message("Please enter a whole number of seconds")
        .with_validator(positive_secs)
        .prompt()?;

    Ok(config)
}

fn url_input(input: &str) -> Result<Validation, CustomUserError> {
    Ok(match check_url(input) {
        Ok(()) => Validation::Valid,
        Err(err) => Validation::Invalid(format!("Not a usable URL: {err}").into()),
    })
}

fn positive_secs(secs: &u64) -> Result<Validation, CustomUserError> {
    Ok(if *secs == 0 {
        Validation::Invalid("The timeout must be at least one second".into())
    } else {
        Validation::Valid
    })
}
