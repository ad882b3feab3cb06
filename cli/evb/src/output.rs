//! Output formatting for CLI commands.

use colored::Colorize;
use eventboard_sync::{RankedGroup, UpdatesOutcome};
use serde::Serialize;
use tabled::{Table, Tabled};

const CLI_SCHEMA_VERSION: &str = "eventboard.cli.v1";

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table format.
    #[default]
    Table,
    /// JSON format.
    Json,
}

/// Print rows in the specified format.
pub fn print_output<T: Serialize + Tabled>(data: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if data.is_empty() {
                println!("{}", "No items found.".dimmed());
            } else {
                println!("{}", Table::new(data));
            }
        }
        OutputFormat::Json => println!("{}", format_json(data, "[]")),
    }
}

/// Print a single item as JSON.
pub fn print_single<T: Serialize>(data: &T) {
    println!("{}", format_json(data, "{}"));
}

/// Print `data` as JSON, or `message` as a success line for tables.
pub fn print_result<T: Serialize>(data: &T, message: &str, format: OutputFormat) {
    println!("{}", render_result(data, message, format));
}

fn render_result<T: Serialize>(data: &T, message: &str, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => format_json(data, "{}"),
        OutputFormat::Table => format!("{} {}", "Success:".green().bold(), message),
    }
}

/// Print a success message.
pub fn print_success(message: &str) {
    println!("{} {}", "Success:".green().bold(), message);
}

/// Print an info message.
pub fn print_info(message: &str) {
    println!("{} {}", "Info:".blue().bold(), message);
}

/// Print the result of `evb updates`.
pub fn print_updates(outcome: &UpdatesOutcome, format: OutputFormat) {
    if format == OutputFormat::Json {
        print_single(outcome);
        return;
    }

    match outcome {
        UpdatesOutcome::NoUpdates { message } => print_info(message),
        UpdatesOutcome::Updates { groups } if groups.is_empty() => {
            println!("{}", "No items found.".dimmed());
        }
        UpdatesOutcome::Updates { groups } => {
            for group in groups {
                println!("{}", render_group(group));
            }
        }
    }
}

fn render_group(ranked: &RankedGroup) -> String {
    let group = &ranked.group;
    let heading = format!("{} ({})", group.event_title, group.event_id);
    let mut out = if ranked.is_highlighted() {
        format!("{}\n", heading.green().bold())
    } else {
        format!("{}\n", heading.dimmed())
    };

    for entry in &group.updates {
        out.push_str(&format!(
            "  {} on {}\n",
            entry.updated_by.cyan(),
            entry.formatted_at()
        ));
        for change in &entry.changes {
            out.push_str(&format!("    - {change}\n"));
        }
    }
    out
}

fn format_json<T: Serialize + ?Sized>(data: &T, fallback: &str) -> String {
    let value = serde_json::to_value(data).unwrap_or_else(|_| serde_json::json!({}));
    let wrapped = serde_json::json!({
        "schemaVersion": CLI_SCHEMA_VERSION,
        "data": sort_json_value(value)
    });
    serde_json::to_string_pretty(&wrapped).unwrap_or_else(|_| fallback.to_string())
}

fn sort_json_value(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Array(values) => {
            serde_json::Value::Array(values.into_iter().map(sort_json_value).collect())
        }
        serde_json::Value::Object(entries) => {
            let mut pairs: Vec<_> = entries.into_iter().collect();
            pairs.sort_by(|a, b| a.0.cmp(&b.0));
            let mut mapped = serde_json::Map::new();
            for (key, value) in pairs {
                mapped.insert(key, sort_json_value(value));
            }
            serde_json::Value::Object(mapped)
        }
        other => other,
    }
}
