//! `evb updates`: change logs for subscribed events.

use anyhow::{Context, Result};

use crate::output::print_updates;

use super::CommandContext;

pub async fn run(ctx: CommandContext) -> Result<()> {
    let outcome = ctx
        .board()?
        .fetch_updates()
        .await
        .context("Failed to check for updates")?;

    print_updates(&outcome, ctx.format);
    Ok(())
}
