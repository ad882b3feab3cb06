//! Authentication commands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use eventboard_sync::EventBoard;

use crate::config::Credentials;
use crate::output::{print_info, print_result, print_single, print_success, OutputFormat};

use super::CommandContext;

/// Authentication commands.
#[derive(Debug, Args)]
pub struct AuthCommand {
    #[command(subcommand)]
    command: AuthSubcommand,
}

#[derive(Debug, Subcommand)]
enum AuthSubcommand {
    /// Store a bearer token after checking it against the API.
    Login(LoginArgs),

    /// Remove stored credentials.
    Logout,

    /// Show current authentication status.
    Status,

    /// Show who you are logged in as.
    Whoami,
}

#[derive(Debug, Args)]
struct LoginArgs {
    /// Bearer token.
    #[arg(long, env = "EVB_TOKEN")]
    token: Option<String>,
}

impl AuthCommand {
    pub async fn run(self, ctx: CommandContext) -> Result<()> {
        match self.command {
            AuthSubcommand::Login(args) => login(ctx, args).await,
            AuthSubcommand::Logout => logout(),
            AuthSubcommand::Status => status(ctx),
            AuthSubcommand::Whoami => whoami(ctx).await,
        }
    }
}

async fn login(ctx: CommandContext, args: LoginArgs) -> Result<()> {
    let Some(token) = args.token else {
        print_info("Use --token or set the EVB_TOKEN environment variable.");
        return Ok(());
    };

    let board = EventBoard::connect(&ctx.session_with(&token))?;
    let user = board
        .current_user()
        .await
        .context("Token was rejected by the API")?;

    let mut creds = Credentials::new(token);
    creds.user_id = Some(user.id.to_string());
    creds.username = Some(user.username.clone());
    creds.save()?;

    print_result(&user, &format!("Logged in as {}.", user.username), ctx.format);
    Ok(())
}

fn logout() -> Result<()> {
    Credentials::delete()?;
    print_success("Logged out successfully.");
    Ok(())
}

fn status(ctx: CommandContext) -> Result<()> {
    match ctx.credentials {
        Some(creds) => {
            println!("{} Authenticated", "Status:".green().bold());
            println!("  API: {}", ctx.config.api_url);

            if let Some(username) = &creds.username {
                println!("  Username: {}", username);
            }

            if let Some(user_id) = &creds.user_id {
                println!("  User ID: {}", user_id);
            }
        }
        None => {
            println!("{} Not authenticated", "Status:".red().bold());
            println!("\nRun {} to log in.", "evb auth login".cyan());
        }
    }

    Ok(())
}

async fn whoami(ctx: CommandContext) -> Result<()> {
    let user = ctx.board()?.current_user().await?;

    match ctx.format {
        OutputFormat::Json => print_single(&user),
        OutputFormat::Table => println!("{} ({}, {})", user.username, user.id, user.role),
    }

    Ok(())
}
