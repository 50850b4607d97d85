//! Core library for the irrigation advisor.
//!
//! This crate defines:
//! - Configuration loaded from the environment
//! - The weather lookup and advice generation clients
//! - Shared domain models and the error taxonomy
//!
//! It is used by `irrigation-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod model;
pub mod prompt;
pub mod provider;
pub mod validate;

pub use config::{Config, LlmConfig, WeatherConfig};
pub use error::{Error, Result};
pub use model::{RecommendationRequest, WeatherRecord};
pub use provider::{Advisor, Service, WeatherProvider, clients_from_config};
