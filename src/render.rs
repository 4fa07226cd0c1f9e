//! Plain-text rendering of a forecast for the terminal.

use crate::data::{ForecastDay, ForecastResponse};

fn temp_range(day: &ForecastDay) -> String {
    match (day.mintemp_c, day.maxtemp_c) {
        (Some(min), Some(max)) => format!("{:.0}°C to {:.0}°C", min, max),
        (None, Some(max)) => format!("max {:.0}°C", max),
        (Some(min), None) => format!("min {:.0}°C", min),
        (None, None) => "n/a".to_string(),
    }
}

/// Renders a forecast as a short multi-line report
pub fn render_text(forecast: &ForecastResponse) -> String {
    let mut lines = Vec::new();

    lines.push(forecast.location.full_name());
    lines.push(format!("Local time: {}", forecast.location.localtime));
    lines.push(String::new());

    let current = &forecast.current;
    lines.push(format!(
        "Now: {} {}",
        current.format_temperature(),
        current.condition_text().unwrap_or_default()
    ));
    if let Some(today) = &current.forecast {
        lines.push(format!("Today: {}", temp_range(today)));
    }

    if !forecast.forecast_days.is_empty() {
        lines.push(String::new());
        for day in &forecast.forecast_days {
            lines.push(format!(
                "{:<10}  {:<14}  {}",
                day.date.as_deref().unwrap_or("?"),
                temp_range(day),
                day.condition_text().unwrap_or_default()
            ));
        }
    }

    if forecast.cache_hit {
        lines.push(String::new());
        lines.push("(cached)".to_string());
    }

    lines.join("\n")
}
