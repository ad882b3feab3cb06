//! CLI commands.

mod auth;
mod events;
mod subs;
mod updates;

use anyhow::Result;
use clap::{Parser, Subcommand};
use eventboard_sync::{EventBoard, EventId, Session};

use crate::config::{Config, Credentials};
use crate::error::CliError;
use crate::output::OutputFormat;

/// eventboard CLI - Browse events and follow what changes.
#[derive(Debug, Parser)]
#[command(name = "evb")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// API endpoint URL (overrides config and EVB_API_URL).
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Log request flow to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Authenticate with the eventboard API.
    Auth(auth::AuthCommand),

    /// List, create, edit and delete events.
    Events(events::EventsCommand),

    /// Inspect and change subscriptions.
    Subs(subs::SubsCommand),

    /// Show what changed in subscribed events.
    Updates,

    /// Show CLI version.
    Version,
}

impl Cli {
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// Run the CLI command.
    pub async fn run(self) -> Result<()> {
        let mut config = Config::load()?;
        if let Some(api_url) = self.api_url {
            config.api_url = api_url;
        }
        let credentials = Credentials::load()?;

        let ctx = CommandContext {
            config,
            credentials,
            format: self.format,
        };

        match self.command {
            Commands::Auth(cmd) => cmd.run(ctx).await,
            Commands::Events(cmd) => cmd.run(ctx).await,
            Commands::Subs(cmd) => cmd.run(ctx).await,
            Commands::Updates => updates::run(ctx).await,
            Commands::Version => {
                println!("evb {}", env!("CARGO_PKG_VERSION"));
                Ok(())
            }
        }
    }
}

/// Shared command context.
pub struct CommandContext {
    pub config: Config,
    pub credentials: Option<Credentials>,
    pub format: OutputFormat,
}

impl CommandContext {
    /// Session for the configured API, authenticated with `token`.
    pub fn session_with(&self, token: &str) -> Session {
        Session::new(&self.config.api_url)
            .with_token(token)
            .with_request_timeout(self.config.request_timeout())
    }

    /// Authenticated session from stored credentials.
    pub fn session(&self) -> Result<Session> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or(CliError::NotAuthenticated)?;
        Ok(self.session_with(&credentials.token))
    }

    /// Board over the authenticated session.
    pub fn board(&self) -> Result<EventBoard> {
        let session = self.session()?;
        tracing::debug!(api_url = %self.config.api_url, "connecting");
        Ok(EventBoard::connect(&session)?)
    }
}

/// Parse an event ID argument.
pub fn parse_event_id(raw: &str) -> Result<EventId> {
    EventId::parse(raw).map_err(|source| {
        CliError::InvalidId {
            kind: EventId::KIND,
            source,
        }
        .into()
    })
}
