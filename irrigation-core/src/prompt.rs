//! Prompt text sent to the language model.

use crate::model::RecommendationRequest;

/// System message fixing the assistant's persona.
pub const SYSTEM_INSTRUCTION: &str = "You are an agricultural irrigation expert who provides \
practical, clear advice to farmers.";

/// Render the user message for a request.
///
/// Pure: the same request always yields the same text.
pub fn render(request: &RecommendationRequest) -> String {
    let w = &request.weather;

    format!(
        "You are an agricultural expert specializing in irrigation management. \
Based on the current weather conditions and crop type, provide specific irrigation \
recommendations for a farmer.

Crop Type: {crop}

Current Weather Conditions:
- Location: {location}
- Temperature: {temp:.1}°C (feels like {feels:.1}°C)
- Humidity: {humidity}%
- Weather: {condition} ({description})
- Wind Speed: {wind:.1} m/s
- Cloud Coverage: {clouds}%
- Recent Rainfall: {rain}

Please provide irrigation advice in the following format:

1. IRRIGATION DECISION: (Yes/No/Consider) with a brief reason
2. RECOMMENDED FREQUENCY: How often to irrigate (e.g., daily, every 2 days)
3. DURATION: Approximate irrigation duration per session
4. BEST TIME: Best time of day to irrigate
5. PRECAUTIONS: Any weather-based precautions
6. ADDITIONAL TIPS: Crop-specific advice

Keep your response concise, practical, and beginner-friendly. Use simple language \
that a farmer with basic knowledge can understand.",
        crop = request.crop_type,
        location = w.location_label(),
        temp = w.temperature_c,
        feels = w.feels_like_c,
        humidity = w.humidity_pct,
        condition = w.condition,
        description = w.description,
        wind = w.wind_speed_mps,
        clouds = w.cloud_cover_pct,
        rain = w.rainfall_summary(),
    )
}
