use std::time::Duration;

use tracing::debug;

use crate::error::{Error, Result};

pub const OPENWEATHER_API_KEY: &str = "OPENWEATHER_API_KEY";
pub const OPENWEATHER_BASE_URL: &str = "OPENWEATHER_BASE_URL";
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const OPENAI_MODEL: &str = "OPENAI_MODEL";
pub const OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";
pub const OPENAI_TIMEOUT_SECS: &str = "OPENAI_TIMEOUT_SECS";

pub const DEFAULT_WEATHER_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

const WEATHER_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_OPENAI_TIMEOUT_SECS: u64 = 60;

/// Settings for the weather provider.
#[derive(Clone)]
pub struct WeatherConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

/// Settings for the language-model provider.
#[derive(Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

/// Everything the advisor needs, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub weather: WeatherConfig,
    pub llm: LlmConfig,
}

impl Config {
    /// Load from the process environment, reading `.env` first if there is one.
    ///
    /// Variables already present in the environment take precedence over the file.
    pub fn from_env() -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "loaded .env file"),
            Err(e) if e.not_found() => debug!("no .env file found"),
            Err(e) => {
                return Err(Error::Configuration(format!("Failed to read .env file: {e}")));
            }
        }

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let setting = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |key: &'static str| {
            setting(key).ok_or_else(|| {
                Error::Configuration(format!(
                    "{key} is not set. Please add it to your environment or .env file."
                ))
            })
        };

        let weather = WeatherConfig {
            api_key: required(OPENWEATHER_API_KEY)?,
            base_url: setting(OPENWEATHER_BASE_URL)
                .unwrap_or_else(|| DEFAULT_WEATHER_BASE_URL.to_string()),
            timeout: WEATHER_TIMEOUT,
        };

        let timeout_secs = match setting(OPENAI_TIMEOUT_SECS) {
            None => DEFAULT_OPENAI_TIMEOUT_SECS,
            Some(raw) => raw.parse::<u64>().ok().filter(|s| *s > 0).ok_or_else(|| {
                Error::Configuration(format!(
                    "{OPENAI_TIMEOUT_SECS} must be a positive number of seconds, got '{raw}'"
                ))
            })?,
        };

        let llm = LlmConfig {
            api_key: required(OPENAI_API_KEY)?,
            model: setting(OPENAI_MODEL).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: setting(OPENAI_BASE_URL)
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            timeout: Duration::from_secs(timeout_secs),
        };

        Ok(Self { weather, llm })
    }
}

// Keys stay out of debug output and logs.
impl std::fmt::Debug for WeatherConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config> {
        let env: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn loads_required_keys_and_defaults() {
        let cfg = load(&[(OPENWEATHER_API_KEY, "W"), (OPENAI_API_KEY, "O")]).unwrap();

        assert_eq!(cfg.weather.api_key, "W");
        assert_eq!(cfg.weather.base_url, DEFAULT_WEATHER_BASE_URL);
        assert_eq!(cfg.weather.timeout, Duration::from_secs(10));
        assert_eq!(cfg.llm.api_key, "O");
        assert_eq!(cfg.llm.model, "gpt-4o-mini");
        assert_eq!(cfg.llm.base_url, DEFAULT_OPENAI_BASE_URL);
        assert_eq!(cfg.llm.timeout, Duration::from_secs(60));
    }

    #[test]
    fn model_override_is_used() {
        let cfg =
            load(&[(OPENWEATHER_API_KEY, "W"), (OPENAI_API_KEY, "O"), (OPENAI_MODEL, "gpt-4o")])
                .unwrap();
        assert_eq!(cfg.llm.model, "gpt-4o");
    }

    #[test]
    fn blank_optional_setting_falls_back_to_default() {
        let cfg =
            load(&[(OPENWEATHER_API_KEY, "W"), (OPENAI_API_KEY, "O"), (OPENAI_MODEL, "  ")])
                .unwrap();
        assert_eq!(cfg.llm.model, DEFAULT_MODEL);
    }

    #[test]
    fn missing_weather_key_is_configuration_error() {
        let err = load(&[(OPENAI_API_KEY, "O")]).unwrap_err();
        assert!(err.is_fatal());
        assert!(err.to_string().contains("OPENWEATHER_API_KEY is not set"));
    }

    #[test]
    fn empty_openai_key_is_configuration_error() {
        let err = load(&[(OPENWEATHER_API_KEY, "W"), (OPENAI_API_KEY, "   ")]).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(err.to_string().contains("OPENAI_API_KEY is not set"));
    }

    #[test]
    fn invalid_timeout_is_rejected() {
        for raw in ["soon", "0"] {
            let err = load(&[
                (OPENWEATHER_API_KEY, "W"),
                (OPENAI_API_KEY, "O"),
                (OPENAI_TIMEOUT_SECS, raw),
            ])
            .unwrap_err();
            assert!(err.to_string().contains(OPENAI_TIMEOUT_SECS), "{raw}: {err}");
        }
    }

    #[test]
    fn debug_output_redacts_keys() {
        let cfg = load(&[(OPENWEATHER_API_KEY, "secret-w"), (OPENAI_API_KEY, "secret-o")]).unwrap();
        let dbg = format!("{cfg:?}");
        assert!(!dbg.contains("secret-w"));
        assert!(!dbg.contains("secret-o"));
        assert!(dbg.contains("<redacted>"));
    }
}
