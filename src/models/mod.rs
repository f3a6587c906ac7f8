//! Data models for ticklist entities.
//!
//! This module defines the core data structures:
//! - `Record` - One to-do item with text, completion flag and optional priority
//! - `RecordId` - Opaque identifier, fresh per insertion and never reused
//! - `Priority` - Optional low/medium/high ranking
//! - `Filter` - Which records the filtered view selects
//! - `Stats` - Aggregate counts and completion rate over the whole collection

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Maximum record text length, in characters, after trimming.
pub const MAX_TEXT_LEN: usize = 200;

/// Rejected record text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("text must not be empty")]
    Empty,

    #[error("text must be at most {max} characters, got {len}")]
    TooLong { len: usize, max: usize },
}

/// Trim and validate record text.
///
/// Returns the trimmed text on success. Length is counted in Unicode scalar
/// values, not bytes.
pub fn validate_text(text: &str) -> Result<String, ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty);
    }
    let len = trimmed.chars().count();
    if len > MAX_TEXT_LEN {
        return Err(ValidationError::TooLong {
            len,
            max: MAX_TEXT_LEN,
        });
    }
    Ok(trimmed.to_string())
}

/// Opaque record identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(Uuid);

impl RecordId {
    /// Generate a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Whether the hyphenated form of this id starts with `prefix`.
    pub fn matches_prefix(&self, prefix: &str) -> bool {
        self.to_string().starts_with(&prefix.to_ascii_lowercase())
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for RecordId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Priority of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// All priorities, lowest first.
    pub fn all() -> &'static [Priority] {
        &[Priority::Low, Priority::Medium, Priority::High]
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" | "l" => Ok(Self::Low),
            "medium" | "med" | "m" => Ok(Self::Medium),
            "high" | "h" => Ok(Self::High),
            _ => Err(format!(
                "Invalid priority: {} (expected low, medium or high)",
                s
            )),
        }
    }
}

/// Which records the filtered view selects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    #[default]
    All,
    Active,
    Completed,
}

impl Filter {
    /// Whether `record` belongs in a view with this filter.
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Self::All => true,
            Self::Active => !record.completed,
            Self::Completed => record.completed,
        }
    }

    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }

    /// All filters in display order.
    pub fn all() -> &'static [Filter] {
        &[Filter::All, Filter::Active, Filter::Completed]
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Filter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "completed" | "done" => Ok(Self::Completed),
            _ => Err(format!(
                "Invalid filter: {} (expected all, active or completed)",
                s
            )),
        }
    }
}

/// One to-do item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Unique identifier, never recycled
    pub id: RecordId,

    /// Item text, already trimmed and validated
    pub text: String,

    /// Completion flag
    #[serde(default)]
    pub completed: bool,

    /// Optional priority
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Record {
    /// Create a new active record with a fresh id.
    ///
    /// `text` is stored as given; callers validate it with [`validate_text`].
    pub fn new(text: String, priority: Option<Priority>) -> Self {
        Self {
            id: RecordId::new(),
            text,
            completed: false,
            priority,
            created_at: Utc::now(),
        }
    }

    /// Copy of this record with the completion flag flipped.
    pub fn toggled(&self) -> Self {
        Self {
            completed: !self.completed,
            ..self.clone()
        }
    }

    /// Copy of this record with new text.
    pub fn with_text(&self, text: String) -> Self {
        Self {
            text,
            ..self.clone()
        }
    }
}

/// Aggregate statistics over the whole collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    /// Number of records
    pub total: usize,
    /// Number of records not completed
    pub active: usize,
    /// Number of completed records
    pub completed: usize,
    /// Completion percentage (0-100), rounded to one decimal
    pub completion_rate: f64,
}

impl Stats {
    /// Count `records` in a single pass.
    pub fn from_records(records: &[Record]) -> Self {
        let total = records.len();
        let completed = records.iter().filter(|r| r.completed).count();
        Self::new(total, completed)
    }

    /// Create stats from raw counts. `completed` is capped at `total`.
    pub fn new(total: usize, completed: usize) -> Self {
        let completed = completed.min(total);
        let completion_rate = if total > 0 {
            round_one_decimal(completed as f64 / total as f64 * 100.0)
        } else {
            0.0
        };
        Self {
            total,
            active: total - completed,
            completed,
            completion_rate,
        }
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
