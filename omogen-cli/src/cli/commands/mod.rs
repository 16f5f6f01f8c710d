//! Command handlers

pub mod document;
pub mod read;
pub mod session;
pub mod write;

use anyhow::{Context, Result};
use colored::*;
use omogen_talk::Entity;

/// Print entities as a JSON array, with a summary line on stderr
pub fn print_entities(class_name: &str, entities: &[Entity]) -> Result<()> {
    let json: Vec<serde_json::Value> = entities.iter().map(Entity::to_json).collect();
    println!(
        "{}",
        serde_json::to_string_pretty(&json).context("Failed to format JSON output")?
    );
    eprintln!(
        "{} {} record(s)",
        entities.len().to_string().bright_green().bold(),
        class_name.cyan()
    );
    Ok(())
}

pub fn print_json(value: &serde_json::Value) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to format JSON output")?
    );
    Ok(())
}
