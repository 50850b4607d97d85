use chrono::{DateTime, Utc};

/// Normalized current conditions for one location.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherRecord {
    pub city: String,
    pub country: String,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: u8,
    /// Short category label, e.g. "Rain".
    pub condition: String,
    /// Longer description, e.g. "light rain".
    pub description: String,
    pub wind_speed_mps: f64,
    pub cloud_cover_pct: u8,
    /// `None` means the provider reported no rain, not zero.
    pub rain_1h_mm: Option<f64>,
    pub rain_3h_mm: Option<f64>,
    pub observed_at: Option<DateTime<Utc>>,
}

impl WeatherRecord {
    /// "City, CC"
    pub fn location_label(&self) -> String {
        format!("{}, {}", self.city, self.country)
    }

    /// Rainfall text shared by the prompt and the console report.
    ///
    /// Each reported window is shown, last hour first. With neither window
    /// reported the text says so explicitly.
    pub fn rainfall_summary(&self) -> String {
        match (self.rain_1h_mm, self.rain_3h_mm) {
            (None, None) => "none reported (no recent rainfall)".to_string(),
            (Some(h1), None) => format!("{h1:.1} mm (last hour)"),
            (None, Some(h3)) => format!("{h3:.1} mm (last 3 hours)"),
            (Some(h1), Some(h3)) => {
                format!("{h1:.1} mm (last hour), {h3:.1} mm (last 3 hours)")
            }
        }
    }
}

/// A crop paired with the weather it is growing under.
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationRequest {
    pub crop_type: String,
    pub weather: WeatherRecord,
}

impl RecommendationRequest {
    pub fn new(crop_type: impl Into<String>, weather: WeatherRecord) -> Self {
        Self { crop_type: crop_type.into(), weather }
    }
}
