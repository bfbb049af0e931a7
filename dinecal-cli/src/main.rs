mod client;
mod commands;
mod config;
mod notification;
mod render;
mod utils;
mod view_model;

use anyhow::Result;
use clap::{Parser, Subcommand};
use dinecal_core::{EventId, SchemaVersion};
use tracing_subscriber::EnvFilter;

use crate::client::Client;
use crate::commands::new::NewArgs;
use crate::config::ClientConfig;
use crate::view_model::ViewModel;

#[derive(Parser)]
#[command(name = "dinecal")]
#[command(about = "Schedule and review group dining events on a dinecal server")]
struct Cli {
    /// Server URL (overrides server_url from the config file)
    #[arg(long, global = true)]
    server: Option<String>,

    /// Record layout for new events: v1 folds category and end time into notes
    #[arg(long, global = true)]
    schema: Option<SchemaVersion>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List events grouped by day
    List {
        /// Only show events from this date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Only show events until this date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },
    /// Show one event in full
    Show { id: EventId },
    /// Create an event on a date
    New(NewArgs),
    /// Delete an event
    Delete {
        id: EventId,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ClientConfig::load()?;

    let server_url = cli.server.unwrap_or_else(|| config.server_url.clone());
    let schema = cli.schema.unwrap_or(config.schema);
    let client = Client::new(&server_url)?;
    tracing::debug!("Using server {} (schema {})", client.base_url(), schema);

    let mut vm = ViewModel::new(client, schema, config.notification_ttl()?);

    match cli.command {
        Commands::List { from, to } => commands::list::run(&mut vm, from, to).await,
        Commands::Show { id } => commands::show::run(&mut vm, id).await,
        Commands::New(args) => commands::new::run(&mut vm, args).await,
        Commands::Delete { id, yes } => commands::delete::run(&mut vm, id, yes).await,
    }
}
