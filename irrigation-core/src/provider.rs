use crate::{
    Config, RecommendationRequest, Result, WeatherRecord,
    provider::{openai::OpenAiAdvisor, openweather::OpenWeatherProvider},
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openai;
pub mod openweather;

/// External services the advisor talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    Weather,
    LanguageModel,
}

impl Service {
    pub fn as_str(&self) -> &'static str {
        match self {
            Service::Weather => "OpenWeatherMap",
            Service::LanguageModel => "OpenAI",
        }
    }
}

impl std::fmt::Display for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current-conditions lookup for a named place.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current_weather(&self, location: &str) -> Result<WeatherRecord>;
}

/// Produces irrigation advice text for a crop under given weather.
#[async_trait]
pub trait Advisor: Send + Sync + Debug {
    async fn recommend(&self, request: &RecommendationRequest) -> Result<String>;
}

/// Build both clients from a loaded configuration.
pub fn clients_from_config(
    config: &Config,
) -> Result<(Box<dyn WeatherProvider>, Box<dyn Advisor>)> {
    let weather: Box<dyn WeatherProvider> =
        Box::new(OpenWeatherProvider::new(config.weather.clone())?);
    let advisor: Box<dyn Advisor> = Box::new(OpenAiAdvisor::new(config.llm.clone())?);

    Ok((weather, advisor))
}
