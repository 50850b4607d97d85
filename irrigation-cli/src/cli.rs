use std::{
    io::{self, Write},
    process::ExitCode,
};

use anyhow::Context;
use clap::Parser;
use irrigation_core::{Config, clients_from_config};
use tracing::info;

use crate::{input, render, session::Session};

/// Top-level CLI struct. The advisor is interactive and takes no options.
#[derive(Debug, Parser)]
#[command(
    name = "irrigation-advisor",
    version,
    about = "Irrigation advice for your crop from current local weather",
    long_about = "Asks for a crop type and a location, looks up current weather on \
                  OpenWeatherMap and asks an OpenAI model for irrigation advice.\n\n\
                  Reads OPENWEATHER_API_KEY, OPENAI_API_KEY and optionally OPENAI_MODEL \
                  from the environment or a .env file."
)]
pub struct Cli {}

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        let Some(config) = checked_config(Config::from_env(), &mut io::stderr())? else {
            return Ok(ExitCode::FAILURE);
        };

        info!(model = %config.llm.model, "configuration loaded");

        let (weather, advisor) =
            clients_from_config(&config).context("Failed to initialise API clients")?;

        Session::new(input::stdin_prompter(), io::stdout(), weather.as_ref(), advisor.as_ref())
            .run()
            .await?;

        Ok(ExitCode::SUCCESS)
    }
}

/// Pass a loaded config through, or print setup help once and yield `None`.
fn checked_config(
    loaded: irrigation_core::Result<Config>,
    err_out: &mut impl Write,
) -> io::Result<Option<Config>> {
    match loaded {
        Ok(config) => Ok(Some(config)),
        Err(e) => {
            render::setup_instructions(err_out, &e)?;
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn configuration_error_is_reported_once() {
        let loaded = Err(irrigation_core::Error::Configuration(
            "OPENAI_API_KEY is not set.".into(),
        ));
        let mut out = Vec::new();

        let config = checked_config(loaded, &mut out).unwrap();

        assert!(config.is_none());
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("OPENAI_API_KEY is not set.").count(), 1);
    }

    #[test]
    fn loaded_config_passes_through() {
        let loaded = Config::from_lookup(|key| match key {
            "OPENWEATHER_API_KEY" | "OPENAI_API_KEY" => Some("key".to_string()),
            _ => None,
        });
        let mut out = Vec::new();

        assert!(checked_config(loaded, &mut out).unwrap().is_some());
        assert!(out.is_empty());
    }

    #[test]
    fn rejects_unknown_flags() {
        assert!(Cli::try_parse_from(["irrigation-advisor", "--crop", "tomato"]).is_err());
        assert!(Cli::try_parse_from(["irrigation-advisor"]).is_ok());
    }
}
