//! Tracing setup. Logs go to stderr so they never mix with command output.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Level used when neither `RUST_LOG` nor `EVB_LOG_LEVEL` is set.
const DEFAULT_LEVEL: &str = "warn";

pub fn init(verbose: bool) {
    let level = std::env::var("EVB_LOG_LEVEL").ok();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(directive(verbose, level.as_deref())));

    let registry = tracing_subscriber::registry().with(filter);
    if json_requested(std::env::var("EVB_LOG_FORMAT").ok().as_deref()) {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}

fn directive(verbose: bool, level: Option<&str>) -> String {
    match level {
        Some(level) if !level.trim().is_empty() => level.trim().to_string(),
        _ if verbose => "eventboard_sync=debug,info".to_string(),
        _ => DEFAULT_LEVEL.to_string(),
    }
}

fn json_requested(format: Option<&str>) -> bool {
    format.is_some_and(|f| f.eq_ignore_ascii_case("json"))
}
