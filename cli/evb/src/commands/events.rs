//! Event commands.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use clap::{Args, Subcommand};
use eventboard_sync::model::{Event, ImageUpload, NewEvent};
use eventboard_sync::{EventBoard, EventId, SubscriptionSync};
use serde::Serialize;
use tabled::Tabled;

use crate::error::CliError;
use crate::output::{print_info, print_output, print_result, OutputFormat};

use super::{parse_event_id, CommandContext};

/// Event commands.
#[derive(Debug, Args)]
pub struct EventsCommand {
    #[command(subcommand)]
    command: EventsSubcommand,
}

#[derive(Debug, Subcommand)]
enum EventsSubcommand {
    /// List events, optionally filtered by title.
    List(ListArgs),

    /// Create an event.
    Create(CreateArgs),

    /// Change an event's title, description or date.
    Edit(EditArgs),

    /// Delete an event.
    Delete(DeleteArgs),
}

#[derive(Debug, Args)]
struct ListArgs {
    /// Case-insensitive title substring.
    #[arg(long, short, default_value = "")]
    search: String,

    /// Only events you created.
    #[arg(long)]
    mine: bool,
}

#[derive(Debug, Args)]
struct CreateArgs {
    #[arg(long)]
    title: String,

    #[arg(long)]
    description: String,

    /// Path to the event image.
    #[arg(long)]
    image: PathBuf,

    /// Event date (YYYY-MM-DD).
    #[arg(long)]
    date: String,
}

#[derive(Debug, Args)]
struct EditArgs {
    /// Event ID.
    id: String,

    #[arg(long)]
    title: Option<String>,

    #[arg(long)]
    description: Option<String>,

    /// New date (YYYY-MM-DD).
    #[arg(long)]
    date: Option<String>,
}

#[derive(Debug, Args)]
struct DeleteArgs {
    /// Event ID.
    id: String,
}

#[derive(Debug, Serialize, Tabled)]
struct EventRow {
    #[tabled(rename = "ID")]
    id: String,

    #[tabled(rename = "Title")]
    title: String,

    #[tabled(rename = "Date")]
    date: String,

    #[tabled(rename = "Creator")]
    creator: String,

    #[tabled(skip)]
    subscribed: bool,

    #[tabled(rename = "Subscribed")]
    #[serde(skip)]
    subscribed_label: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeletedEvent<'a> {
    event_id: &'a EventId,
    deleted: bool,
}

impl EventRow {
    fn new(event: &Event, subscriptions: &SubscriptionSync) -> Self {
        let subscribed = subscriptions.effective_status(&event.id);
        Self {
            id: event.id.to_string(),
            title: event.title.clone(),
            date: event
                .date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".to_string()),
            creator: event
                .created_by
                .as_ref()
                .map(|c| c.username.clone())
                .unwrap_or_else(|| "-".to_string()),
            subscribed,
            subscribed_label: if subscribed { "yes" } else { "-" }.to_string(),
        }
    }
}

impl EventsCommand {
    pub async fn run(self, ctx: CommandContext) -> Result<()> {
        match self.command {
            EventsSubcommand::List(args) => list(ctx, args).await,
            EventsSubcommand::Create(args) => create(ctx, args).await,
            EventsSubcommand::Edit(args) => edit(ctx, args).await,
            EventsSubcommand::Delete(args) => delete(ctx, args).await,
        }
    }
}

async fn list(ctx: CommandContext, args: ListArgs) -> Result<()> {
    let board = ctx.board()?;
    let events = board
        .search(&args.search)
        .await
        .context("Failed to list events")?
        .unwrap_or_default();

    let events = if args.mine { board.mine().await } else { events };
    print_rows(&board, &events, ctx.format);
    Ok(())
}

async fn create(ctx: CommandContext, args: CreateArgs) -> Result<()> {
    let date = parse_date(&args.date)?;
    let image = read_image(&args.image).await?;

    let board = ctx.board()?;
    let created = board
        .create(NewEvent {
            title: args.title,
            description: args.description,
            image: Some(image),
            date: Some(date),
        })
        .await
        .context("Failed to create event")?;

    print_result(
        &created,
        &format!("Created event {} ({}).", created.title, created.id),
        ctx.format,
    );
    Ok(())
}

async fn edit(ctx: CommandContext, args: EditArgs) -> Result<()> {
    let id = parse_event_id(&args.id)?;
    let date = args.date.as_deref().map(parse_date).transpose()?;

    let board = ctx.board()?;
    board.search("").await.context("Failed to list events")?;

    let mut draft = board.begin_edit(&id).await?;
    if let Some(title) = args.title {
        draft.title = title;
    }
    if let Some(description) = args.description {
        draft.description = description;
    }
    if date.is_some() {
        draft.date = date;
    }

    if !draft.is_dirty() {
        print_info("Nothing to change.");
        return Ok(());
    }

    let updated = board.commit(draft).await?;
    print_result(&updated, &format!("Updated event {}.", updated.id), ctx.format);
    Ok(())
}

async fn delete(ctx: CommandContext, args: DeleteArgs) -> Result<()> {
    let id = parse_event_id(&args.id)?;
    ctx.board()?
        .delete(&id)
        .await
        .context("Failed to delete event")?;

    print_result(
        &DeletedEvent {
            event_id: &id,
            deleted: true,
        },
        &format!("Deleted event {id}."),
        ctx.format,
    );
    Ok(())
}

fn print_rows(board: &EventBoard, events: &[Event], format: OutputFormat) {
    let rows: Vec<EventRow> = events
        .iter()
        .map(|event| EventRow::new(event, board.subscriptions()))
        .collect();
    print_output(&rows, format);
}

/// Parse a `YYYY-MM-DD` date as midnight UTC.
fn parse_date(raw: &str) -> Result<DateTime<Utc>, CliError> {
    let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| CliError::InvalidDate(raw.to_string()))?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| CliError::InvalidDate(raw.to_string()))?;
    Ok(Utc.from_utc_datetime(&midnight))
}

async fn read_image(path: &Path) -> Result<ImageUpload> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read image {:?}", path))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());

    Ok(ImageUpload {
        media_type: media_type_for(path).map(str::to_string),
        file_name,
        bytes,
    })
}

fn media_type_for(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}
