use std::fs;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Console logging always; JSON file logging when `log_dir` is given.
///
/// `quiet` drops progress output to warnings, on top of any `RUST_LOG`.
/// Keep the returned guard alive until exit so the file writer flushes.
const QUIET_DIRECTIVE: &str = "bsky2masto=warn";

fn build_filter(quiet: bool, env: Option<&str>) -> EnvFilter {
    let default_level = if quiet { "warn" } else { "info" };
    let mut filter = env
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(format!("bsky2masto={}", default_level)));
    if quiet {
        if let Ok(directive) = QUIET_DIRECTIVE.parse() {
            filter = filter.add_directive(directive);
        }
    }
    filter
}

pub fn init_logging(quiet: bool, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = build_filter(quiet, env.as_deref());

    let console_layer = fmt::layer()
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr);

    let (file_layer, guard) = match log_dir {
        Some(dir) => match fs::create_dir_all(dir) {
            Ok(()) => {
                let file_appender = tracing_appender::rolling::daily(dir, "bsky2masto.log");
                let (writer, guard) = tracing_appender::non_blocking(file_appender);
                (Some(fmt::layer().json().with_writer(writer)), Some(guard))
            }
            Err(e) => {
                eprintln!("Could not create log directory {}: {}", dir.display(), e);
                (None, None)
            }
        },
        None => (None, None),
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();

    guard
}
