//! Precedence resolution for configuration.
//!
//! ## Precedence (highest to lowest)
//!
//! 1. CLI flags (passed at runtime)
//! 2. Environment (`TICK_OUTPUT`, output format only)
//! 3. config.kdl in the list's data directory
//! 4. Built-in defaults

use crate::Result;
use crate::config::{OutputFormat, TickConfig};
use crate::models::{Filter, Priority};
use crate::window::{DEFAULT_ITEM_SIZE, DEFAULT_OVERSCAN, DEFAULT_VIEWPORT_SIZE};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the output format.
pub const OUTPUT_FORMAT_ENV: &str = "TICK_OUTPUT";

/// File name of the config inside the data directory.
pub const CONFIG_FILE_NAME: &str = "config.kdl";

/// Tracks where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Value from environment variable
    EnvVar(String),
    /// Value from config.kdl
    File,
    /// Value from CLI flag
    CliFlag,
    /// Built-in default value
    Default,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::EnvVar(name) => write!(f, "env:{}", name),
            ValueSource::File => write!(f, "file"),
            ValueSource::CliFlag => write!(f, "cli"),
            ValueSource::Default => write!(f, "default"),
        }
    }
}

/// A resolved value with its source.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<T> {
    pub value: T,
    pub source: ValueSource,
}

impl<T> Resolved<T> {
    pub fn new(value: T, source: ValueSource) -> Self {
        Self { value, source }
    }
}

/// Pick the highest-precedence value among CLI, file and default.
fn pick<T: Clone>(cli: Option<T>, file: Option<T>, default: T) -> Resolved<T> {
    match (cli, file) {
        (Some(v), _) => Resolved::new(v, ValueSource::CliFlag),
        (None, Some(v)) => Resolved::new(v, ValueSource::File),
        (None, None) => Resolved::new(default, ValueSource::Default),
    }
}

/// Fully resolved configuration with source tracking.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub default_filter: Resolved<Filter>,
    /// No built-in default: records without one have no priority
    pub default_priority: Option<Resolved<Priority>>,
    pub output_format: Resolved<OutputFormat>,
    pub overscan: Resolved<usize>,
    pub item_size: Resolved<f64>,
    pub viewport_size: Resolved<f64>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            default_filter: Resolved::new(Filter::All, ValueSource::Default),
            default_priority: None,
            output_format: Resolved::new(OutputFormat::Json, ValueSource::Default),
            overscan: Resolved::new(DEFAULT_OVERSCAN, ValueSource::Default),
            item_size: Resolved::new(DEFAULT_ITEM_SIZE, ValueSource::Default),
            viewport_size: Resolved::new(DEFAULT_VIEWPORT_SIZE, ValueSource::Default),
        }
    }
}

impl ResolvedConfig {
    pub fn default_filter(&self) -> Filter {
        self.default_filter.value
    }

    pub fn default_priority(&self) -> Option<Priority> {
        self.default_priority.as_ref().map(|r| r.value)
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output_format.value
    }

    pub fn overscan(&self) -> usize {
        self.overscan.value
    }

    pub fn item_size(&self) -> f64 {
        self.item_size.value
    }

    pub fn viewport_size(&self) -> f64 {
        self.viewport_size.value
    }

    /// Every key with its display value and source, in config.kdl order.
    pub fn entries(&self) -> Vec<(&'static str, String, ValueSource)> {
        let priority = match &self.default_priority {
            Some(r) => (r.value.as_str().to_string(), r.source.clone()),
            None => ("none".to_string(), ValueSource::Default),
        };
        vec![
            (
                "default-filter",
                self.default_filter.value.as_str().to_string(),
                self.default_filter.source.clone(),
            ),
            ("default-priority", priority.0, priority.1),
            (
                "output-format",
                self.output_format.value.as_str().to_string(),
                self.output_format.source.clone(),
            ),
            (
                "overscan",
                self.overscan.value.to_string(),
                self.overscan.source.clone(),
            ),
            (
                "item-size",
                self.item_size.value.to_string(),
                self.item_size.source.clone(),
            ),
            (
                "viewport-size",
                self.viewport_size.value.to_string(),
                self.viewport_size.source.clone(),
            ),
        ]
    }
}

/// CLI overrides for configuration resolution.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub default_filter: Option<Filter>,
    pub default_priority: Option<Priority>,
    pub output_format: Option<OutputFormat>,
    pub overscan: Option<usize>,
    pub item_size: Option<f64>,
    pub viewport_size: Option<f64>,
}

impl ConfigOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = Some(format);
        self
    }

    pub fn with_default_filter(mut self, filter: Filter) -> Self {
        self.default_filter = Some(filter);
        self
    }

    pub fn with_default_priority(mut self, priority: Priority) -> Self {
        self.default_priority = Some(priority);
        self
    }

    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = Some(overscan);
        self
    }

    pub fn with_item_size(mut self, item_size: f64) -> Self {
        self.item_size = Some(item_size);
        self
    }

    pub fn with_viewport_size(mut self, viewport_size: f64) -> Self {
        self.viewport_size = Some(viewport_size);
        self
    }
}

/// Path of config.kdl inside a data directory.
pub fn config_path(storage_dir: &Path) -> PathBuf {
    storage_dir.join(CONFIG_FILE_NAME)
}

/// Read config.kdl, falling back to an empty config.
///
/// A missing file is an empty config. A file that does not parse or does not
/// validate is logged and ignored. Only I/O failures are errors.
pub fn load_config_file(path: &Path) -> Result<TickConfig> {
    if !path.exists() {
        return Ok(TickConfig::default());
    }
    let content = fs::read_to_string(path)?;

    let config = match TickConfig::parse(&content) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(path = %path.display(), "Ignoring config file: {}", e);
            return Ok(TickConfig::default());
        }
    };
    if let Err(e) = config.validate() {
        tracing::warn!(path = %path.display(), "Ignoring invalid config file: {}", e);
        return Ok(TickConfig::default());
    }
    Ok(config)
}

/// Write config.kdl, creating the data directory if needed.
pub fn write_config_file(path: &Path, config: &TickConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, config.to_kdl().to_string())?;
    Ok(())
}

/// Resolve from already-loaded inputs.
pub fn resolve_from(
    file: &TickConfig,
    env_output: Option<&str>,
    overrides: &ConfigOverrides,
) -> ResolvedConfig {
    let env_format = env_output.and_then(|raw| {
        let parsed = OutputFormat::parse(raw);
        if parsed.is_none() {
            tracing::warn!("Ignoring {}={:?}: expected json or human", OUTPUT_FORMAT_ENV, raw);
        }
        parsed
    });

    let output_format = match (overrides.output_format, env_format) {
        (Some(format), _) => Resolved::new(format, ValueSource::CliFlag),
        (None, Some(format)) => Resolved::new(
            format,
            ValueSource::EnvVar(OUTPUT_FORMAT_ENV.to_string()),
        ),
        (None, None) => pick(None, file.output_format, OutputFormat::Json),
    };

    let default_priority = match (overrides.default_priority, file.default_priority) {
        (Some(p), _) => Some(Resolved::new(p, ValueSource::CliFlag)),
        (None, Some(p)) => Some(Resolved::new(p, ValueSource::File)),
        (None, None) => None,
    };

    ResolvedConfig {
        default_filter: pick(overrides.default_filter, file.default_filter, Filter::All),
        default_priority,
        output_format,
        overscan: pick(overrides.overscan, file.overscan, DEFAULT_OVERSCAN),
        item_size: pick(overrides.item_size, file.item_size, DEFAULT_ITEM_SIZE),
        viewport_size: pick(
            overrides.viewport_size,
            file.viewport_size,
            DEFAULT_VIEWPORT_SIZE,
        ),
    }
}

/// Resolve configuration with the full precedence chain.
pub fn resolve_config(storage_dir: &Path, overrides: &ConfigOverrides) -> Result<ResolvedConfig> {
    let file = load_config_file(&config_path(storage_dir))?;
    let env_output = std::env::var(OUTPUT_FORMAT_ENV).ok();
    Ok(resolve_from(&file, env_output.as_deref(), overrides))
}
