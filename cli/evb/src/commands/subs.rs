//! Subscription commands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use eventboard_sync::{EventBoard, EventId};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{print_output, print_result};

use super::{parse_event_id, CommandContext};

/// Subscription commands.
#[derive(Debug, Args)]
pub struct SubsCommand {
    #[command(subcommand)]
    command: SubsSubcommand,
}

#[derive(Debug, Subcommand)]
enum SubsSubcommand {
    /// Show subscription status for one or more events.
    Status(StatusArgs),

    /// Flip the subscription for an event.
    Toggle(TargetArgs),

    /// Subscribe to an event.
    Add(TargetArgs),

    /// Unsubscribe from an event.
    Remove(TargetArgs),
}

#[derive(Debug, Args)]
struct StatusArgs {
    /// Event IDs.
    #[arg(required = true)]
    ids: Vec<String>,
}

#[derive(Debug, Args)]
struct TargetArgs {
    /// Event ID.
    id: String,
}

#[derive(Debug, Serialize, Tabled)]
#[serde(rename_all = "camelCase")]
struct StatusRow {
    #[tabled(rename = "Event ID")]
    event_id: String,

    #[tabled(rename = "Subscribed")]
    is_subscribed: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SubscriptionChange<'a> {
    event_id: &'a EventId,
    is_subscribed: bool,
}

impl SubsCommand {
    pub async fn run(self, ctx: CommandContext) -> Result<()> {
        match self.command {
            SubsSubcommand::Status(args) => status(ctx, args).await,
            SubsSubcommand::Toggle(args) => change(ctx, args, None).await,
            SubsSubcommand::Add(args) => change(ctx, args, Some(true)).await,
            SubsSubcommand::Remove(args) => change(ctx, args, Some(false)).await,
        }
    }
}

async fn status(ctx: CommandContext, args: StatusArgs) -> Result<()> {
    let ids = args
        .ids
        .iter()
        .map(|raw| parse_event_id(raw))
        .collect::<Result<Vec<_>>>()?;

    let resolved = ctx
        .board()?
        .statuses(&ids)
        .await
        .context("Failed to resolve subscription statuses")?;

    // Keep the order the IDs were given in.
    let rows: Vec<StatusRow> = ids
        .iter()
        .map(|id| StatusRow {
            event_id: id.to_string(),
            is_subscribed: resolved.get(id).copied().unwrap_or(false),
        })
        .collect();
    print_output(&rows, ctx.format);
    Ok(())
}

/// Toggle when `target` is `None`, otherwise bring the subscription to it.
async fn change(ctx: CommandContext, args: TargetArgs, target: Option<bool>) -> Result<()> {
    let id = parse_event_id(&args.id)?;
    let board = ctx.board()?;
    load_listing(&board).await?;

    let subscribed = match target {
        None => board.toggle(&id).await,
        Some(target) => board.set_subscribed(&id, target).await,
    }
    .context("Failed to change subscription")?;

    let message = if subscribed {
        format!("Subscribed to {id}.")
    } else {
        format!("Unsubscribed from {id}.")
    };
    print_result(
        &SubscriptionChange {
            event_id: &id,
            is_subscribed: subscribed,
        },
        &message,
        ctx.format,
    );
    Ok(())
}

/// Toggling needs the current status, which comes with a listing.
async fn load_listing(board: &EventBoard) -> Result<()> {
    board.search("").await.context("Failed to list events")?;
    Ok(())
}
