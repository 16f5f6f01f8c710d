use std::path::Path;

use anyhow::{Context, Result};
use colored::*;
use log::debug;
use omogen_talk::{DocumentFile, OmogenClient, PdaResponse, Value};

use super::print_json;

/// Parse `FIELD=VALUE`; `true`/`false` become booleans
fn parse_assignment(assignment: &str) -> Result<(String, Value)> {
    let (field, value) = assignment
        .split_once('=')
        .with_context(|| format!("Expected FIELD=VALUE, got '{}'", assignment))?;
    let field = field.trim();
    if field.is_empty() {
        anyhow::bail!("Empty field name in '{}'", assignment);
    }

    let value = match value {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        other => Value::from(other),
    };
    Ok((field.to_string(), value))
}

fn report(action: &str, class_name: &str, response: &PdaResponse) {
    eprintln!(
        "{} {} {}",
        action.bright_green().bold(),
        class_name.cyan(),
        response.id.as_deref().unwrap_or("?")
    );
    for field in &response.ignored_fields {
        eprintln!("  {} {}", "ignored:".yellow(), field);
    }
}

pub async fn save(
    client: &OmogenClient,
    token: Option<&str>,
    class_name: &str,
    id: Option<&str>,
    fields: &[String],
) -> Result<()> {
    let mut entity = client
        .entity(class_name)
        .with_context(|| format!("Cannot save {}", class_name))?;

    if let Some(id) = id {
        let primary_key = entity.descriptor().primary_key.clone();
        entity.set_attribute(primary_key, id);
        entity.mark_existing();
    }
    for assignment in fields {
        let (field, value) = parse_assignment(assignment)?;
        debug!("{}.{} = {}", class_name, field, value);
        entity.set(field, value);
    }

    let saved = client
        .save(entity, token)
        .await
        .with_context(|| format!("Failed to save {}", class_name))?;
    eprintln!(
        "{} {} {}",
        "Saved".bright_green().bold(),
        class_name.cyan(),
        saved.id().unwrap_or("?")
    );
    print_json(&saved.to_json())
}

pub async fn delete(
    client: &OmogenClient,
    token: Option<&str>,
    class_name: &str,
    id: &str,
) -> Result<()> {
    let response = client
        .delete(class_name, id, token)
        .await
        .with_context(|| format!("Failed to delete {} {}", class_name, id))?;
    report("Deleted", class_name, &response);
    Ok(())
}

pub async fn upload(
    client: &OmogenClient,
    class_name: &str,
    id: &str,
    field: &str,
    file: &Path,
) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {}", file.display());
    }

    let document = DocumentFile::from_path(file)
        .await
        .with_context(|| format!("Failed to read file: {}", file.display()))?;

    let mut entity = client
        .entity(class_name)
        .with_context(|| format!("Cannot upload to {}", class_name))?;
    let primary_key = entity.descriptor().primary_key.clone();
    entity.set_attribute(primary_key, id);

    let responses = client
        .upload_documents(&entity, vec![(field.to_string(), document)])
        .await
        .with_context(|| format!("Failed to upload {}", file.display()))?;
    for response in &responses {
        report("Uploaded to", class_name, response);
    }
    Ok(())
}
