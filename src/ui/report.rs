//! Text rendering of detection results and chat transcripts.

use std::fmt::Write;

use super::Style;
use crate::session::{ChatMessage, DetectionResult, PlantRecord, Role};

const CARD_FIELDS: &[(&str, fn(&PlantRecord) -> &str)] = &[
    ("Scientific Name", |p| p.scientific_name.as_str()),
    ("Common Name", |p| p.common_name.as_str()),
    ("Local Name", |p| p.local_name.as_str()),
    ("Family", |p| p.family_name.as_str()),
    ("Genus", |p| p.genus.as_str()),
    ("Location", |p| p.native_location.as_str()),
    ("Medicinal Uses", |p| p.medicinal_uses.as_str()),
];

/// Renders one plant as an indented card.
pub fn plant_card(plant: &PlantRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", Style::header(&plant.name));

    if let Some(error) = &plant.error {
        let _ = writeln!(out, "  {} {}", Style::label("Error"), Style::warning(error));
        return out;
    }

    for (label, field) in CARD_FIELDS {
        let _ = writeln!(
            out,
            "  {} {}",
            Style::label(format!("{label:<15}")),
            Style::value(field(plant))
        );
    }
    out
}

/// Renders every plant of a detection, separated by blank lines.
pub fn detection_report(result: &DetectionResult) -> String {
    if result.plants.is_empty() {
        return format!("{}\n", Style::warning("No plants found in the image."));
    }

    result
        .plants
        .iter()
        .map(plant_card)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders one transcript line.
pub fn chat_line(message: &ChatMessage) -> String {
    let speaker = match message.role {
        Role::User => Style::user("you"),
        Role::Assistant => Style::assistant("plantid"),
    };
    format!("{speaker} {}", message.text)
}

pub fn print_detection(result: &DetectionResult) {
    print!("{}", detection_report(result));
}

pub fn print_message(message: &ChatMessage) {
    println!("{}", chat_line(message));
    println!();
}
