//! Display helpers shared by the resource definitions.

use chrono::{DateTime, NaiveDate};

const UNKNOWN: &str = "unknown";

/// Appends a unit unless the API reports the value as unknown.
pub fn with_unit(value: &str, unit: &str) -> String {
    if value == UNKNOWN {
        value.to_string()
    } else {
        format!("{value} {unit}")
    }
}

/// German label for an API gender value; unrecognized values pass through.
pub fn translate_gender(gender: &str) -> String {
    let label = match gender.to_lowercase().as_str() {
        "male" => "Männlich",
        "female" => "Weiblich",
        "hermaphrodite" => "Hermaphrodit",
        "n/a" => "Nicht zutreffend",
        "unknown" => "Unbekannt",
        _ => return gender.to_string(),
    };
    label.to_string()
}

/// `1977-05-25` -> `25.5.1977`. Falls back to the raw input.
pub fn format_german_date(raw: &str) -> String {
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()));
    match date {
        Some(d) => d.format("%-d.%-m.%Y").to_string(),
        None => raw.to_string(),
    }
}

pub fn episode_label(episode_id: u32) -> String {
    format!("Episode {episode_id}")
}
