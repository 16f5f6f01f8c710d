//! Command-line surface

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::debug;
use omogen_talk::{OmogenClient, OmogenConfig, Schema};

pub mod commands;

#[derive(Parser)]
#[command(name = "omogen", version, about = "Talk to an Omogen remote object store")]
pub struct Cli {
    /// Entity schema declaring the remote types
    #[arg(long, env = "OMOGEN_SCHEMA", default_value = "omogen.toml", global = true)]
    pub schema: PathBuf,

    /// Session token (GBSESSIONID)
    #[arg(long, env = "OMOGEN_TOKEN", global = true)]
    pub token: Option<String>,

    /// More logging, repeat for debug
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Relation expansion and naming options shared by reads
#[derive(Args, Debug, Clone, Default)]
pub struct ReadOptions {
    /// Related records to embed, as dotted paths (repeatable)
    #[arg(long = "with", value_name = "PATH")]
    pub with: Vec<String>,

    /// Ask for normalized field names
    #[arg(long)]
    pub canonicalize: bool,

    /// Print the raw API envelope instead of entities
    #[arg(long)]
    pub raw: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch one record by identifier
    Find {
        class_name: String,
        id: String,
        /// Fail when nothing matches
        #[arg(long)]
        fail: bool,
        #[command(flatten)]
        options: ReadOptions,
    },
    /// Fetch every record of a type
    All {
        class_name: String,
        #[command(flatten)]
        options: ReadOptions,
    },
    /// Fetch records matching `<column> <operator> <value>`
    Where {
        class_name: String,
        column: String,
        operator: String,
        value: String,
        /// Only print the number of matches
        #[arg(long)]
        count: bool,
        #[command(flatten)]
        options: ReadOptions,
    },
    /// Fetch records matching a raw query expression
    Query {
        class_name: String,
        expression: String,
        #[command(flatten)]
        options: ReadOptions,
    },
    /// Fetch several records by identifier
    Many {
        class_name: String,
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Delete a record
    Delete { class_name: String, id: String },
    /// Create a record, or update it when --id is given
    Save {
        class_name: String,
        #[arg(long)]
        id: Option<String>,
        /// Local field assignment (repeatable)
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        fields: Vec<String>,
    },
    /// Attach a file to a record, using the admin session
    Upload {
        class_name: String,
        id: String,
        field: String,
        file: PathBuf,
    },
    /// Download a document
    Document {
        /// Query fragment addressing the document
        path: String,
        /// Entity type the request is issued for
        #[arg(long)]
        class_name: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Print the document base64-encoded
        #[arg(long, conflicts_with = "output")]
        base64: bool,
    },
    /// Open a session and print its token
    Login {
        login: String,
        #[arg(long, env = "OMOGEN_PASSWORD")]
        password: String,
    },
    /// Request a password reset for an email address
    ResetPassword { email: String },
}

pub async fn run(cli: Cli) -> Result<()> {
    let config = OmogenConfig::from_env().context("Failed to read Omogen configuration")?;
    let registry = if cli.schema.exists() {
        Schema::load(&cli.schema)
            .await
            .with_context(|| format!("Failed to load schema: {}", cli.schema.display()))?
            .into_registry()
    } else {
        debug!("No schema at {}, no entity types registered", cli.schema.display());
        Schema::default().into_registry()
    };
    let client = OmogenClient::new(config, registry).context("Failed to build Omogen client")?;
    let token = cli.token.as_deref();

    match cli.command {
        Commands::Find {
            class_name,
            id,
            fail,
            options,
        } => commands::read::find(&client, token, &class_name, &id, fail, &options).await,
        Commands::All {
            class_name,
            options,
        } => commands::read::all(&client, token, &class_name, &options).await,
        Commands::Where {
            class_name,
            column,
            operator,
            value,
            count,
            options,
        } => {
            let filter = commands::read::Filter {
                column: &column,
                operator: &operator,
                value: &value,
            };
            commands::read::filter(&client, token, &class_name, filter, count, &options).await
        }
        Commands::Query {
            class_name,
            expression,
            options,
        } => commands::read::query(&client, token, &class_name, &expression, &options).await,
        Commands::Many { class_name, ids } => {
            commands::read::many(&client, token, &class_name, &ids).await
        }
        Commands::Delete { class_name, id } => {
            commands::write::delete(&client, token, &class_name, &id).await
        }
        Commands::Save {
            class_name,
            id,
            fields,
        } => commands::write::save(&client, token, &class_name, id.as_deref(), &fields).await,
        Commands::Upload {
            class_name,
            id,
            field,
            file,
        } => commands::write::upload(&client, &class_name, &id, &field, &file).await,
        Commands::Document {
            path,
            class_name,
            output,
            base64,
        } => {
            commands::document::fetch(
                &client,
                token,
                class_name.as_deref(),
                &path,
                output.as_deref(),
                base64,
            )
            .await
        }
        Commands::Login { login, password } => {
            commands::session::login(&client, &login, &password).await
        }
        Commands::ResetPassword { email } => commands::session::reset_password(&client, &email).await,
    }
}
