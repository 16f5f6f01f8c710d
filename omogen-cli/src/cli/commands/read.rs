use anyhow::{Context, Result};
use colored::*;
use omogen_talk::{OmogenClient, QueryBuilder};

use super::{print_entities, print_json};
use crate::cli::ReadOptions;

pub struct Filter<'a> {
    pub column: &'a str,
    pub operator: &'a str,
    pub value: &'a str,
}

fn builder<'a>(
    client: &'a OmogenClient,
    token: Option<&str>,
    class_name: &str,
    options: &ReadOptions,
) -> Result<QueryBuilder<'a>> {
    let mut builder = client
        .query(class_name, token)
        .with_context(|| format!("Cannot query {}", class_name))?;
    if !options.with.is_empty() {
        builder = builder.with(&options.with);
    }
    if options.canonicalize {
        builder = builder.canonicalize();
    }
    Ok(builder)
}

/// Run a prepared read, raw or materialized
async fn run(builder: QueryBuilder<'_>, class_name: &str, raw: bool) -> Result<()> {
    if raw {
        let response = builder
            .get_results_raw()
            .await
            .context("Failed to execute query")?;
        return print_json(&response.raw);
    }

    let entities = builder.get().await.context("Failed to execute query")?;
    print_entities(class_name, &entities)
}

pub async fn find(
    client: &OmogenClient,
    token: Option<&str>,
    class_name: &str,
    id: &str,
    fail: bool,
    options: &ReadOptions,
) -> Result<()> {
    let builder = builder(client, token, class_name, options)?;

    let found = if fail {
        Some(builder.find_or_fail(id).await?)
    } else {
        builder
            .find(id)
            .await
            .with_context(|| format!("Failed to fetch {} {}", class_name, id))?
    };

    match found {
        Some(entity) => print_json(&entity.to_json()),
        None => {
            eprintln!("{} {} {}", "No".yellow(), class_name.cyan(), id);
            Ok(())
        }
    }
}

pub async fn all(
    client: &OmogenClient,
    token: Option<&str>,
    class_name: &str,
    options: &ReadOptions,
) -> Result<()> {
    let builder = builder(client, token, class_name, options)?;
    if options.raw {
        let builder = builder.query_raw("").with_data();
        return run(builder, class_name, true).await;
    }
    let entities = builder.all().await.context("Failed to execute query")?;
    print_entities(class_name, &entities)
}

pub async fn filter(
    client: &OmogenClient,
    token: Option<&str>,
    class_name: &str,
    filter: Filter<'_>,
    count: bool,
    options: &ReadOptions,
) -> Result<()> {
    let builder = builder(client, token, class_name, options)?.filter(
        filter.column,
        filter.operator,
        filter.value,
    );

    if count {
        let count = builder.count().await.context("Failed to execute query")?;
        println!("{}", count);
        return Ok(());
    }
    run(builder, class_name, options.raw).await
}

pub async fn query(
    client: &OmogenClient,
    token: Option<&str>,
    class_name: &str,
    expression: &str,
    options: &ReadOptions,
) -> Result<()> {
    let builder = builder(client, token, class_name, options)?.query_raw(expression);
    run(builder, class_name, options.raw).await
}

pub async fn many(
    client: &OmogenClient,
    token: Option<&str>,
    class_name: &str,
    ids: &[String],
) -> Result<()> {
    let entities = client
        .query(class_name, token)
        .with_context(|| format!("Cannot query {}", class_name))?
        .many(ids)
        .await
        .context("Failed to execute query")?;
    print_entities(class_name, &entities)
}
