use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::{
    config::WeatherConfig,
    error::{Error, Result},
    model::WeatherRecord,
    validate,
};

use super::{Service, WeatherProvider};

const SERVICE: Service = Service::Weather;

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    config: WeatherConfig,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(config: WeatherConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { config, http })
    }

    async fn fetch_current(&self, location: &str) -> Result<WeatherRecord> {
        let url = format!("{}/weather", self.config.base_url.trim_end_matches('/'));

        debug!(%location, "requesting current weather");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("q", location),
                ("appid", self.config.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await
            .map_err(|e| Error::transport(SERVICE, e))?;

        let status = res.status();
        let body = res.text().await.map_err(|e| Error::transport(SERVICE, e))?;

        if !status.is_success() {
            warn!(status = status.as_u16(), body = %truncate_body(&body), "OpenWeather returned an error");
            return Err(status_error(status, location, &body));
        }

        let record = parse_current(&body)?;
        info!(city = %record.city, country = %record.country, "weather retrieved");
        Ok(record)
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current_weather(&self, location: &str) -> Result<WeatherRecord> {
        let location = validate::location(location)?;
        self.fetch_current(&location).await
    }
}

/// Map a non-success status onto the error taxonomy.
fn status_error(status: StatusCode, location: &str, body: &str) -> Error {
    match status {
        StatusCode::UNAUTHORIZED => Error::Authentication { service: SERVICE, status: 401 },
        StatusCode::NOT_FOUND => Error::LocationNotFound {
            service: SERVICE,
            location: location.to_string(),
        },
        StatusCode::TOO_MANY_REQUESTS => {
            Error::RateLimited { service: SERVICE, status: 429, code: None }
        }
        s if s.is_server_error() => Error::ServiceUnavailable {
            service: SERVICE,
            status: Some(s.as_u16()),
            reason: format!("HTTP {s}"),
        },
        s => Error::InvalidRequest {
            service: SERVICE,
            status: s.as_u16(),
            message: provider_message(body),
        },
    }
}

/// OpenWeather error bodies look like `{"cod":"400","message":"..."}`.
fn provider_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct OwError {
        message: String,
    }

    serde_json::from_str::<OwError>(body)
        .map(|e| e.message)
        .unwrap_or_else(|_| truncate_body(body))
}

/// Parse a 200 response body into a record.
pub fn parse_current(body: &str) -> Result<WeatherRecord> {
    let parsed: OwCurrentResponse = serde_json::from_str(body).map_err(|e| {
        Error::MalformedResponse { service: SERVICE, field: format!("invalid JSON: {e}") }
    })?;

    parsed.into_record()
}

// Every field is optional here so that a missing one is reported by its path
// instead of as a generic deserialization failure.

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: Option<f64>,
    feels_like: Option<f64>,
    humidity: Option<u8>,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwClouds {
    all: Option<u8>,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwRain {
    #[serde(rename = "1h")]
    one_hour: Option<f64>,
    #[serde(rename = "3h")]
    three_hours: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: Option<String>,
    dt: Option<i64>,
    sys: Option<OwSys>,
    main: Option<OwMain>,
    weather: Option<Vec<OwWeather>>,
    wind: Option<OwWind>,
    clouds: Option<OwClouds>,
    rain: Option<OwRain>,
}

impl OwCurrentResponse {
    fn into_record(self) -> Result<WeatherRecord> {
        let main = required(self.main, "main")?;
        let first = required(self.weather, "weather")?
            .into_iter()
            .next()
            .ok_or_else(|| missing("weather[0]"))?;
        let wind = required(self.wind, "wind")?;
        let clouds = required(self.clouds, "clouds")?;
        let (rain_1h_mm, rain_3h_mm) = self
            .rain
            .map(|r| (r.one_hour, r.three_hours))
            .unwrap_or((None, None));

        Ok(WeatherRecord {
            city: required(self.name, "name")?,
            country: self
                .sys
                .and_then(|s| s.country)
                .unwrap_or_else(|| "Unknown".to_string()),
            temperature_c: required(main.temp, "main.temp")?,
            feels_like_c: required(main.feels_like, "main.feels_like")?,
            humidity_pct: required(main.humidity, "main.humidity")?,
            condition: required(first.main, "weather[0].main")?,
            description: required(first.description, "weather[0].description")?,
            wind_speed_mps: required(wind.speed, "wind.speed")?,
            cloud_cover_pct: required(clouds.all, "clouds.all")?,
            rain_1h_mm,
            rain_3h_mm,
            observed_at: self.dt.and_then(unix_to_utc),
        })
    }
}

fn required<T>(value: Option<T>, field: &str) -> Result<T> {
    value.ok_or_else(|| missing(field))
}

fn missing(field: &str) -> Error {
    Error::MalformedResponse { service: SERVICE, field: format!("missing field `{field}`") }
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
