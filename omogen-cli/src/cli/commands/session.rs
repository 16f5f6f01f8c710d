use anyhow::{Context, Result};
use colored::*;
use omogen_talk::OmogenClient;

use super::print_json;

pub async fn login(client: &OmogenClient, login: &str, password: &str) -> Result<()> {
    let response = client
        .login(login, password)
        .await
        .with_context(|| format!("Failed to log in as {}", login))?;

    eprintln!(
        "{} {} ({})",
        "Logged in as".bright_green().bold(),
        login.cyan(),
        response.text.dimmed()
    );
    println!("{}", response.token);
    Ok(())
}

pub async fn reset_password(client: &OmogenClient, email: &str) -> Result<()> {
    let response = client
        .reset_password_id(email)
        .await
        .with_context(|| format!("Failed to request a password reset for {}", email))?;

    match response.id.as_deref() {
        Some(reset_id) => println!("{}", reset_id),
        None => print_json(&serde_json::Value::String(response.raw))?,
    }
    Ok(())
}
