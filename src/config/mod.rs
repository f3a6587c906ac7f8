//! Configuration for ticklist.
//!
//! ## config.kdl - User preferences
//!
//! Located next to the stored list, at
//! `~/.local/share/ticklist/<dir-hash>/config.kdl`.
//!
//! Contains:
//! - `default-filter` - Filter applied when a list is opened
//! - `default-priority` - Priority for new records
//! - `output-format` - "json" or "human"
//! - `overscan`, `item-size`, `viewport-size` - Window geometry
//!
//! ## Precedence
//!
//! CLI flag > environment > config.kdl > defaults.
//!
//! Use the [`resolver`] module for precedence resolution.

pub mod resolver;
pub mod schema;

pub use resolver::{
    CONFIG_FILE_NAME, ConfigOverrides, OUTPUT_FORMAT_ENV, Resolved, ResolvedConfig, ValueSource,
    config_path, load_config_file, resolve_config, resolve_from, write_config_file,
};
pub use schema::{CONFIG_KEYS, MAX_OVERSCAN, OutputFormat, TickConfig};
