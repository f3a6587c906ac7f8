//! tick CLI - a to-do list with filtered views and windowed rendering.

use clap::Parser;
use std::env;
use std::path::PathBuf;
use std::process;
use ticklist::cli::{Cli, Commands, ConfigCommands};
use ticklist::commands::{self, ListContext, Output};
use ticklist::LOG_ENV;
use ticklist::config::{ConfigOverrides, OUTPUT_FORMAT_ENV, OutputFormat};
use tracing_subscriber::EnvFilter;

/// Set to `json` for JSON log lines.
const LOG_FORMAT_ENV: &str = "TICK_LOG_FORMAT";

fn main() {
    let cli = Cli::parse();

    // The TUI owns the terminal and sets up its own file logging
    if !takes_over_terminal(&cli.command) {
        init_logging();
    }

    // Until config is resolved, only the flag and env can ask for human output
    let human_hint = cli.human_readable
        || env::var(OUTPUT_FORMAT_ENV).is_ok_and(|v| v.eq_ignore_ascii_case("human"));

    let list_dir = match resolve_list_dir(cli.list_dir) {
        Ok(dir) => dir,
        Err(message) => exit_with_error(&message, human_hint),
    };

    let overrides = command_overrides(cli.human_readable, &cli.command);

    let ctx = match ListContext::open(&list_dir, &overrides) {
        Ok(ctx) => ctx,
        Err(e) => exit_with_error(&e.to_string(), human_hint),
    };
    let human = ctx.human();

    if let Err(e) = run_command(cli.command, &ctx, human) {
        exit_with_error(&e.to_string(), human);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let json = env::var(LOG_FORMAT_ENV).is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

/// Flags that override config.kdl for this invocation.
fn command_overrides(human: bool, command: &Option<Commands>) -> ConfigOverrides {
    let mut overrides = ConfigOverrides::new();
    if human {
        overrides = overrides.with_output_format(OutputFormat::Human);
    }

    match command {
        Some(Commands::Add {
            priority: Some(priority),
            ..
        }) => overrides = overrides.with_default_priority(*priority),
        Some(Commands::List {
            filter: Some(filter),
        }) => overrides = overrides.with_default_filter(*filter),
        Some(Commands::Window {
            filter,
            viewport,
            item_size,
            overscan,
            ..
        }) => {
            if let Some(filter) = filter {
                overrides = overrides.with_default_filter(*filter);
            }
            if let Some(viewport) = viewport {
                overrides = overrides.with_viewport_size(*viewport);
            }
            if let Some(item_size) = item_size {
                overrides = overrides.with_item_size(*item_size);
            }
            if let Some(overscan) = overscan {
                overrides = overrides.with_overscan(*overscan);
            }
        }
        _ => {}
    }
    overrides
}

fn takes_over_terminal(command: &Option<Commands>) -> bool {
    #[cfg(feature = "tui")]
    if matches!(command, Some(Commands::Tui)) {
        return true;
    }
    let _ = command;
    false
}

/// Resolve the list directory: --dir flag > TICK_DIR env > current directory.
///
/// An explicit path must exist.
fn resolve_list_dir(explicit_path: Option<PathBuf>) -> Result<PathBuf, String> {
    match explicit_path {
        Some(path) if !path.exists() => Err(format!(
            "Specified list directory does not exist: {}",
            path.display()
        )),
        Some(path) => Ok(path),
        None => env::current_dir()
            .map_err(|e| format!("Could not determine current directory: {}", e)),
    }
}

fn exit_with_error(message: &str, human: bool) -> ! {
    if human {
        eprintln!("Error: {}", message);
    } else {
        eprintln!("{}", serde_json::json!({ "error": message }));
    }
    process::exit(1);
}

fn run_command(
    command: Option<Commands>,
    ctx: &ListContext,
    human: bool,
) -> Result<(), ticklist::Error> {
    match command {
        Some(Commands::Add { text, .. }) => {
            output(&commands::add(ctx, &text)?, human);
        }
        Some(Commands::Toggle { id }) => {
            output(&commands::toggle(ctx, &id)?, human);
        }
        Some(Commands::Rm { id }) => {
            output(&commands::remove(ctx, &id)?, human);
        }
        Some(Commands::Edit { id, text }) => {
            output(&commands::edit(ctx, &id, &text)?, human);
        }
        Some(Commands::ClearCompleted) => {
            output(&commands::clear_completed(ctx)?, human);
        }
        Some(Commands::List { .. }) | None => {
            output(&commands::list(ctx)?, human);
        }
        Some(Commands::Stats) => {
            output(&commands::stats(ctx)?, human);
        }
        Some(Commands::Window { scroll, .. }) => {
            output(&commands::window(ctx, scroll)?, human);
        }
        Some(Commands::Config { command }) => match command {
            ConfigCommands::Show => {
                output(&commands::config_show(ctx)?, human);
            }
            ConfigCommands::Set { key, value } => {
                output(&commands::config_set(ctx, &key, &value)?, human);
            }
        },
        #[cfg(feature = "tui")]
        Some(Commands::Tui) => {
            ticklist::tui::run(ctx)?;
        }
    }

    Ok(())
}

/// Print output in JSON or human-readable format.
fn output<T: Output>(result: &T, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}
