//! Terminal User Interface for ticklist
//!
//! A keyboard-driven, full-screen view of one list. The filtered view is drawn
//! through the windowing renderer, so only the rows on screen are built.
//! Logs go to `tick.log` in the list's data directory while the terminal is
//! in raw mode.

mod app;
mod list_view;

pub use app::{Mode, TuiApp, run_app};
pub use list_view::ListView;

use crate::commands::ListContext;
use crate::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Log file name inside the data directory.
pub const LOG_FILE_NAME: &str = "tick.log";

fn init_file_logging(ctx: &ListContext) -> Result<WorkerGuard> {
    std::fs::create_dir_all(&ctx.storage_dir)?;
    let appender = tracing_appender::rolling::never(&ctx.storage_dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter =
        EnvFilter::try_from_env(crate::LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(false)
        .with_writer(writer)
        .try_init();
    Ok(guard)
}

/// Run the TUI for the list in `ctx`.
pub fn run(ctx: &ListContext) -> Result<()> {
    let _guard = init_file_logging(ctx)?;
    let store = ctx.store()?;
    tracing::info!(
        records = store.records().len(),
        list_dir = %ctx.list_dir.display(),
        "Starting TUI"
    );

    let app = TuiApp::new(store, ctx.config.overscan())
        .with_default_priority(ctx.config.default_priority());
    run_app(app)?;
    Ok(())
}
