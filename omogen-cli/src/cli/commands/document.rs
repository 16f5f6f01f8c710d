use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use colored::*;
use omogen_talk::{EntityDescriptor, OmogenClient, QueryBuilder};

fn builder<'a>(
    client: &'a OmogenClient,
    token: Option<&str>,
    class_name: Option<&str>,
) -> Result<QueryBuilder<'a>> {
    match class_name {
        Some(class_name) => client
            .query(class_name, token)
            .with_context(|| format!("Cannot fetch documents of {}", class_name)),
        None => {
            let untyped = EntityDescriptor::new("", "", "id");
            Ok(client.query_descriptor(Arc::new(untyped), token))
        }
    }
}

pub async fn fetch(
    client: &OmogenClient,
    token: Option<&str>,
    class_name: Option<&str>,
    path: &str,
    output: Option<&Path>,
    base64: bool,
) -> Result<()> {
    let builder = builder(client, token, class_name)?;

    if base64 {
        let encoded = builder
            .get_encoded_document(path)
            .await
            .context("Failed to fetch document")?;
        println!("{}", encoded);
        return Ok(());
    }

    let written = match output {
        Some(output) => {
            let mut file = tokio::fs::File::create(output)
                .await
                .with_context(|| format!("Failed to create: {}", output.display()))?;
            let written = builder
                .get_document(path, &mut file)
                .await
                .context("Failed to fetch document")?;
            eprintln!(
                "Document saved to: {}",
                output.display().to_string().bright_green()
            );
            written
        }
        None => {
            let mut stdout = tokio::io::stdout();
            builder
                .get_document(path, &mut stdout)
                .await
                .context("Failed to fetch document")?
        }
    };
    eprintln!("{} bytes", written.to_string().bold());
    Ok(())
}
