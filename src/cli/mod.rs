//! CLI argument definitions for ticklist.

use crate::models::{Filter, Priority};
use clap::{Parser, Subcommand};

/// ticklist - A to-do list with derived views and a windowed renderer.
#[derive(Parser, Debug)]
#[command(name = "tick")]
#[command(author, version, long_version = crate::LONG_VERSION, about = "A to-do list with filtered views, stats and windowed rendering", long_about = None)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// Run as if tick was started in <path> instead of the current directory.
    /// Each directory has its own list. Can also be set via TICK_DIR.
    #[arg(short = 'C', long = "dir", global = true, env = "TICK_DIR")]
    pub list_dir: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add a record to the end of the list
    Add {
        /// Record text (1-200 characters after trimming)
        text: String,

        /// Priority (low, medium, high)
        #[arg(short, long)]
        priority: Option<Priority>,
    },

    /// Flip the completed flag of a record
    Toggle {
        /// Record ID or unique prefix (at least 4 characters)
        id: String,
    },

    /// Remove a record
    #[command(alias = "remove")]
    Rm {
        /// Record ID or unique prefix (at least 4 characters)
        id: String,
    },

    /// Replace the text of a record
    Edit {
        /// Record ID or unique prefix (at least 4 characters)
        id: String,

        /// New text (1-200 characters after trimming)
        text: String,
    },

    /// Remove every completed record
    ClearCompleted,

    /// List records matching a filter
    List {
        /// Filter (all, active, completed); defaults to the configured filter
        #[arg(short, long)]
        filter: Option<Filter>,
    },

    /// Show total, active and completed counts
    Stats,

    /// Show the slice of the list a viewport would materialize
    Window {
        /// Filter (all, active, completed); defaults to the configured filter
        #[arg(short, long)]
        filter: Option<Filter>,

        /// Scroll offset, in pixels
        #[arg(short, long, default_value_t = 0.0, allow_negative_numbers = true)]
        scroll: f64,

        /// Viewport size, in pixels
        #[arg(long)]
        viewport: Option<f64>,

        /// Item size, in pixels
        #[arg(long)]
        item_size: Option<f64>,

        /// Items to materialize beyond each edge of the viewport
        #[arg(long)]
        overscan: Option<usize>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Interactive full-screen list
    #[cfg(feature = "tui")]
    Tui,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show resolved configuration values and where each came from
    Show,

    /// Set a configuration value in config.kdl
    Set {
        /// Configuration key (default-filter, default-priority, output-format,
        /// overscan, item-size, viewport-size)
        key: String,
        /// Configuration value
        value: String,
    },
}
