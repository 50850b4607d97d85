use thiserror::Error;
use tracing::warn;

use crate::provider::Service;

/// Closed set of failures the advisor can produce.
///
/// `Display` is the diagnostic form. Turning these into short messages for the
/// person at the keyboard is the caller's job.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or unusable startup setting. Fatal.
    #[error("{0}")]
    Configuration(String),

    /// User input rejected before any network call was made.
    #[error("{0}")]
    Validation(String),

    #[error("{service} rejected the API key (HTTP {status})")]
    Authentication { service: Service, status: u16 },

    #[error("{service} could not find location '{location}'")]
    LocationNotFound { service: Service, location: String },

    #[error("{service} rate limit exceeded (HTTP {status}{})", code_suffix(.code))]
    RateLimited {
        service: Service,
        status: u16,
        /// Provider error code, e.g. `insufficient_quota`.
        code: Option<String>,
    },

    #[error("{service} is unavailable: {reason}")]
    ServiceUnavailable {
        service: Service,
        status: Option<u16>,
        reason: String,
    },

    #[error("{service} rejected the request (HTTP {status}): {message}")]
    InvalidRequest {
        service: Service,
        status: u16,
        message: String,
    },

    #[error("{service} returned a malformed response: {field}")]
    MalformedResponse { service: Service, field: String },

    #[error("{service} returned an empty response")]
    EmptyResponse { service: Service },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Only configuration problems should end the process.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Configuration(_))
    }

    /// Which external service produced the error, if any.
    pub fn service(&self) -> Option<Service> {
        match self {
            Error::Configuration(_) | Error::Validation(_) => None,
            Error::Authentication { service, .. }
            | Error::LocationNotFound { service, .. }
            | Error::RateLimited { service, .. }
            | Error::ServiceUnavailable { service, .. }
            | Error::InvalidRequest { service, .. }
            | Error::MalformedResponse { service, .. }
            | Error::EmptyResponse { service } => Some(*service),
        }
    }

    /// Map a transport failure from reqwest onto the taxonomy.
    ///
    /// The request URL is dropped first: it carries the weather key as a
    /// query parameter.
    pub(crate) fn transport(service: Service, err: reqwest::Error) -> Self {
        let err = err.without_url();
        warn!(%service, error = %err, "request failed");

        let reason = if err.is_timeout() {
            "request timed out".to_string()
        } else if err.is_connect() {
            "connection failed".to_string()
        } else if err.is_body() || err.is_decode() {
            "response body could not be read".to_string()
        } else {
            format!("request failed: {err}")
        };

        Error::ServiceUnavailable {
            service,
            status: err.status().map(|s| s.as_u16()),
            reason,
        }
    }
}

fn code_suffix(code: &Option<String>) -> String {
    code.as_deref().map(|c| format!(", {c}")).unwrap_or_default()
}
