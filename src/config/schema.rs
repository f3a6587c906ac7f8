//! KDL schema for config.kdl.
//!
//! This module provides:
//! - [`TickConfig`], the Rust view of the file
//! - Conversion to and from [`KdlDocument`]
//! - Validation and per-key updates for `tick config set`

use crate::models::{Filter, Priority};
use crate::{Error, Result};
use kdl::{KdlDocument, KdlEntry, KdlNode, KdlValue};
use serde::{Deserialize, Serialize};

/// Output format preference for CLI commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON output (default, machine-readable)
    #[default]
    Json,
    /// Human-readable output
    Human,
}

impl OutputFormat {
    /// Parse from string, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "human" => Some(OutputFormat::Human),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Human => "human",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Keys accepted in config.kdl, in the order they are written.
pub const CONFIG_KEYS: &[&str] = &[
    "default-filter",
    "default-priority",
    "output-format",
    "overscan",
    "item-size",
    "viewport-size",
];

/// Upper bound on overscan; anything larger defeats windowing.
pub const MAX_OVERSCAN: usize = 1000;

/// User preferences stored in config.kdl.
///
/// # KDL Schema
///
/// ```kdl
/// default-filter "active"
/// default-priority "medium"
/// output-format "human"
/// overscan 5
/// item-size 80
/// viewport-size 600
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickConfig {
    /// Filter applied when a store is opened
    pub default_filter: Option<Filter>,

    /// Priority given to new records when `add` has no `--priority`
    pub default_priority: Option<Priority>,

    /// Default output format for CLI commands
    pub output_format: Option<OutputFormat>,

    /// Items materialized beyond each edge of the viewport
    pub overscan: Option<usize>,

    /// Fixed size of one item, in pixels
    pub item_size: Option<f64>,

    /// Viewport size, in pixels
    pub viewport_size: Option<f64>,
}

fn first_string(doc: &KdlDocument, name: &str) -> Option<String> {
    doc.get(name)
        .and_then(|node| node.entries().first())
        .and_then(|entry| entry.value().as_string())
        .map(str::to_string)
}

fn first_number(doc: &KdlDocument, name: &str) -> Option<f64> {
    let entry = doc.get(name)?.entries().first()?;
    match entry.value() {
        KdlValue::Integer(i) => Some(*i as f64),
        KdlValue::Float(f) => Some(*f),
        _ => None,
    }
}

fn string_node(name: &str, value: &str) -> KdlNode {
    let mut node = KdlNode::new(name);
    node.push(KdlEntry::new(KdlValue::String(value.to_string())));
    node
}

fn number_node(name: &str, value: f64) -> KdlNode {
    let mut node = KdlNode::new(name);
    // Whole numbers stay integers so the file reads the way users write it
    if value.fract() == 0.0 && value.abs() < 1e15 {
        node.push(KdlEntry::new(KdlValue::Integer(value as i128)));
    } else {
        node.push(KdlEntry::new(KdlValue::Float(value)));
    }
    node
}

fn parse_size(key: &str, value: &str) -> std::result::Result<f64, String> {
    value
        .parse::<f64>()
        .map_err(|_| format!("{} must be a number, got '{}'", key, value))
}

impl TickConfig {
    /// Create an empty config with no values set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse config.kdl text.
    ///
    /// Unknown nodes and values of the wrong type are ignored.
    pub fn parse(content: &str) -> Result<Self> {
        let doc: KdlDocument = content
            .parse()
            .map_err(|e| Error::Config(format!("Failed to parse config.kdl: {}", e)))?;
        Ok(Self::from_kdl(&doc))
    }

    /// Validate the config values.
    ///
    /// Returns an error message if any value is invalid.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if let Some(overscan) = self.overscan {
            if overscan > MAX_OVERSCAN {
                return Err(format!(
                    "overscan must be at most {}, got {}",
                    MAX_OVERSCAN, overscan
                ));
            }
        }
        if let Some(size) = self.item_size {
            if !(size.is_finite() && size > 0.0) {
                return Err(format!("item-size must be a positive number, got {}", size));
            }
        }
        if let Some(size) = self.viewport_size {
            if !(size.is_finite() && size >= 0.0) {
                return Err(format!(
                    "viewport-size must be a non-negative number, got {}",
                    size
                ));
            }
        }
        Ok(())
    }

    /// Parse config from a KDL document.
    pub fn from_kdl(doc: &KdlDocument) -> Self {
        let mut config = Self::new();

        config.default_filter =
            first_string(doc, "default-filter").and_then(|s| s.parse::<Filter>().ok());
        config.default_priority =
            first_string(doc, "default-priority").and_then(|s| s.parse::<Priority>().ok());
        config.output_format =
            first_string(doc, "output-format").and_then(|s| OutputFormat::parse(&s));

        if let Some(n) = first_number(doc, "overscan") {
            if n >= 0.0 && n.fract() == 0.0 {
                config.overscan = Some(n as usize);
            }
        }
        config.item_size = first_number(doc, "item-size");
        config.viewport_size = first_number(doc, "viewport-size");

        config
    }

    /// Convert config to a KDL document.
    pub fn to_kdl(&self) -> KdlDocument {
        let mut doc = KdlDocument::new();
        let nodes = doc.nodes_mut();

        if let Some(filter) = self.default_filter {
            nodes.push(string_node("default-filter", filter.as_str()));
        }
        if let Some(priority) = self.default_priority {
            nodes.push(string_node("default-priority", priority.as_str()));
        }
        if let Some(format) = self.output_format {
            nodes.push(string_node("output-format", format.as_str()));
        }
        if let Some(overscan) = self.overscan {
            let mut node = KdlNode::new("overscan");
            node.push(KdlEntry::new(KdlValue::Integer(overscan as i128)));
            nodes.push(node);
        }
        if let Some(size) = self.item_size {
            nodes.push(number_node("item-size", size));
        }
        if let Some(size) = self.viewport_size {
            nodes.push(number_node("viewport-size", size));
        }

        doc.autoformat();
        doc
    }

    /// Merge another config into this one.
    /// Values from `other` override values in `self` if they are Some.
    pub fn merge(&mut self, other: &TickConfig) {
        if other.default_filter.is_some() {
            self.default_filter = other.default_filter;
        }
        if other.default_priority.is_some() {
            self.default_priority = other.default_priority;
        }
        if other.output_format.is_some() {
            self.output_format = other.output_format;
        }
        if other.overscan.is_some() {
            self.overscan = other.overscan;
        }
        if other.item_size.is_some() {
            self.item_size = other.item_size;
        }
        if other.viewport_size.is_some() {
            self.viewport_size = other.viewport_size;
        }
    }

    /// Set one key from its command-line string form, then validate.
    pub fn set(&mut self, key: &str, value: &str) -> std::result::Result<(), String> {
        let mut updated = self.clone();
        match key {
            "default-filter" => {
                updated.default_filter = Some(value.parse::<Filter>()?);
            }
            "default-priority" => {
                updated.default_priority = Some(value.parse::<Priority>()?);
            }
            "output-format" => {
                updated.output_format = Some(OutputFormat::parse(value).ok_or_else(|| {
                    format!("output-format must be json or human, got '{}'", value)
                })?);
            }
            "overscan" => {
                updated.overscan = Some(value.parse::<usize>().map_err(|_| {
                    format!("overscan must be a non-negative integer, got '{}'", value)
                })?);
            }
            "item-size" => updated.item_size = Some(parse_size(key, value)?),
            "viewport-size" => updated.viewport_size = Some(parse_size(key, value)?),
            _ => {
                return Err(format!(
                    "Unknown config key '{}'. Valid keys: {}",
                    key,
                    CONFIG_KEYS.join(", ")
                ));
            }
        }
        updated.validate()?;
        *self = updated;
        Ok(())
    }
}
