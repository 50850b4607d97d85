//! Console output: banner, weather summary, report and error messages.

use std::io::{self, Write};

use irrigation_core::{Error, RecommendationRequest, Service, WeatherRecord};

const TITLE: &str = "SMART IRRIGATION ADVICE CHATBOT";
const WIDTH: usize = 70;

pub fn banner(out: &mut impl Write) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "=".repeat(WIDTH))?;
    writeln!(out, "{TITLE}")?;
    writeln!(out, "{}", "=".repeat(WIDTH))?;
    writeln!(out, "\nWelcome! I'll help you make informed irrigation decisions based on")?;
    writeln!(out, "current weather conditions and your crop type.")?;
    writeln!(out, "\nType 'exit' or 'quit' at any time to exit the program.\n")
}

pub fn goodbye(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "\nThank you for using Smart Irrigation Advice Chatbot. Goodbye!")
}

pub fn fetching_weather(out: &mut impl Write, location: &str) -> io::Result<()> {
    writeln!(out, "\nFetching weather data for {location}...")?;
    out.flush()
}

pub fn generating_advice(out: &mut impl Write, crop_type: &str) -> io::Result<()> {
    writeln!(out, "Weather data retrieved successfully.")?;
    writeln!(out, "Generating irrigation recommendations for {crop_type}...")?;
    out.flush()
}

/// Current conditions, one field per line.
pub fn weather_summary(w: &WeatherRecord) -> String {
    let mut s = String::new();
    s.push_str(&format!(
        "Temperature: {:.1}°C (feels like {:.1}°C)\n",
        w.temperature_c, w.feels_like_c
    ));
    s.push_str(&format!("Humidity: {}%\n", w.humidity_pct));
    s.push_str(&format!("Conditions: {}\n", capitalize(&w.description)));
    s.push_str(&format!("Wind Speed: {:.1} m/s\n", w.wind_speed_mps));
    s.push_str(&format!("Cloud Coverage: {}%\n", w.cloud_cover_pct));
    s.push_str(&format!("Recent Rainfall: {}\n", w.rainfall_summary()));
    if let Some(at) = w.observed_at {
        s.push_str(&format!("Observed: {}\n", at.format("%Y-%m-%d %H:%M UTC")));
    }
    s
}

/// Full report for one turn.
pub fn report(
    out: &mut impl Write,
    request: &RecommendationRequest,
    recommendation: &str,
) -> io::Result<()> {
    let heavy = "=".repeat(WIDTH);
    let light = "-".repeat(WIDTH);

    writeln!(out, "\n{heavy}\n{TITLE}\n{heavy}\n")?;
    writeln!(out, "Crop Type: {}", title_case(&request.crop_type))?;
    writeln!(out, "Location: {}\n", request.weather.location_label())?;
    writeln!(out, "{light}\nCURRENT WEATHER CONDITIONS\n{light}")?;
    write!(out, "{}", weather_summary(&request.weather))?;
    writeln!(out, "\n{light}\nIRRIGATION RECOMMENDATION\n{light}")?;
    writeln!(out, "{recommendation}")?;
    writeln!(out, "\n{heavy}")
}

pub fn validation(out: &mut impl Write, err: &Error) -> io::Result<()> {
    writeln!(out, "{err} Please try again.")
}

pub fn failure(out: &mut impl Write, err: &Error) -> io::Result<()> {
    writeln!(out, "\nError: {}", user_message(err))?;
    if let Some(hint) = hint(err) {
        writeln!(out, "   {hint}")?;
    }
    Ok(())
}

/// Startup help printed when configuration is incomplete.
pub fn setup_instructions(out: &mut impl Write, err: &Error) -> io::Result<()> {
    writeln!(out, "\nConfiguration Error:")?;
    writeln!(out, "   {err}")?;
    writeln!(out, "\nSetup Instructions:")?;
    writeln!(out, "   1. Create a .env file in the working directory (or export the variables)")?;
    writeln!(out, "   2. Set OPENWEATHER_API_KEY and OPENAI_API_KEY (OPENAI_MODEL is optional)")?;
    writeln!(out, "   3. Get an OpenWeatherMap API key: https://openweathermap.org/api")?;
    writeln!(out, "   4. Get an OpenAI API key: https://platform.openai.com/api-keys")
}

/// Short, human-readable text for an error.
pub fn user_message(err: &Error) -> String {
    match err {
        Error::Configuration(msg) | Error::Validation(msg) => msg.clone(),
        Error::Authentication { service, .. } => {
            format!("Invalid {service} API key. Please check your API key.")
        }
        Error::LocationNotFound { location, .. } => {
            format!("Location '{location}' not found. Please check the city name.")
        }
        Error::RateLimited { service, code, .. } => match code.as_deref() {
            Some("insufficient_quota") => {
                format!("{service} API quota exceeded. Please check your account.")
            }
            _ => format!("{service} API rate limit exceeded. Please try again later."),
        },
        Error::ServiceUnavailable { service, reason, .. } => {
            format!("{service} is currently unavailable ({reason}).")
        }
        Error::InvalidRequest { service, message, .. } => {
            format!("{service} rejected the request: {message}")
        }
        Error::MalformedResponse { service, .. } => {
            format!("Received incomplete data from {service}.")
        }
        Error::EmptyResponse { service } => {
            format!("{service} returned an empty recommendation.")
        }
    }
}

fn hint(err: &Error) -> Option<&'static str> {
    match err {
        Error::LocationNotFound { .. } => Some("Try 'City' or 'City,CountryCode', e.g. Paris,FR."),
        Error::ServiceUnavailable { .. } => {
            Some("Please check your internet connection and try again.")
        }
        Error::Authentication { service: Service::Weather, .. } => {
            Some("Check OPENWEATHER_API_KEY in your environment or .env file.")
        }
        Error::Authentication { service: Service::LanguageModel, .. } => {
            Some("Check OPENAI_API_KEY in your environment or .env file.")
        }
        Error::InvalidRequest { service: Service::LanguageModel, .. } => {
            Some("Check OPENAI_MODEL in your environment or .env file.")
        }
        Error::MalformedResponse { .. } | Error::EmptyResponse { .. } => Some("Please try again."),
        _ => None,
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn title_case(s: &str) -> String {
    s.split_whitespace().map(capitalize).collect::<Vec<_>>().join(" ")
}
