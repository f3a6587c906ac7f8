//! Command implementations for the tick CLI.
//!
//! Each command opens the list for a directory, applies one store operation
//! and returns a result value that prints as JSON or as human-readable text.
//! Unknown or ambiguous ids are not errors: the command reports
//! `changed: false`, matching the store's no-op semantics.

use crate::config::{
    self, ConfigOverrides, OutputFormat, ResolvedConfig, TickConfig, ValueSource,
};
use crate::models::{Filter, Priority, Record, Stats, validate_text};
use crate::storage::{BlobPersistence, FileBackend, get_storage_dir};
use crate::store::{Command, Outcome, TodoStore};
use crate::window::{ItemRenderer, VirtualList};
use crate::{Error, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Command results that can be serialized to JSON or formatted for humans.
pub trait Output {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

fn json_line<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|e| serde_json::json!({ "error": e.to_string() }).to_string())
}

/// Store persisted as files in the list's data directory.
pub type FileStore = TodoStore<BlobPersistence<FileBackend>>;

/// Resolved locations and configuration for one list directory.
#[derive(Debug, Clone)]
pub struct ListContext {
    pub list_dir: PathBuf,
    pub storage_dir: PathBuf,
    pub config: ResolvedConfig,
}

impl ListContext {
    /// Resolve the data directory and configuration for `list_dir`.
    pub fn open(list_dir: &Path, overrides: &ConfigOverrides) -> Result<Self> {
        let storage_dir = get_storage_dir(list_dir)?;
        let config = config::resolve_config(&storage_dir, overrides)?;
        tracing::debug!(
            list_dir = %list_dir.display(),
            storage_dir = %storage_dir.display(),
            "Resolved list context"
        );
        Ok(Self {
            list_dir: list_dir.to_path_buf(),
            storage_dir,
            config,
        })
    }

    /// Whether output should be human-readable.
    pub fn human(&self) -> bool {
        self.config.output_format() == OutputFormat::Human
    }

    /// Open the store, with the resolved filter applied.
    pub fn store(&self) -> Result<FileStore> {
        let backend = FileBackend::new(&self.storage_dir)?;
        let mut store = TodoStore::open(BlobPersistence::new(backend));
        store.dispatch(Command::SetFilter {
            filter: self.config.default_filter(),
        })?;
        Ok(store)
    }

    pub fn config_path(&self) -> PathBuf {
        config::config_path(&self.storage_dir)
    }
}

fn short_id(record: &Record) -> String {
    record.id.to_string()[..8].to_string()
}

fn record_line(record: &Record) -> String {
    let check = if record.completed { "x" } else { " " };
    match record.priority {
        Some(priority) => format!(
            "[{}] {}  {} ({})",
            check,
            short_id(record),
            record.text,
            priority.as_str()
        ),
        None => format!("[{}] {}  {}", check, short_id(record), record.text),
    }
}

// === Add ===

#[derive(Debug, Serialize)]
pub struct AddResult {
    pub id: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

impl Output for AddResult {
    fn to_json(&self) -> String {
        json_line(self)
    }

    fn to_human(&self) -> String {
        format!("Added {}: {}", &self.id[..8], self.text)
    }
}

/// Append a record with the resolved priority (`-p`, then config).
pub fn add(ctx: &ListContext, text: &str) -> Result<AddResult> {
    let mut store = ctx.store()?;
    let Outcome::Added(id) = store.dispatch(Command::Add {
        text: text.to_string(),
        priority: ctx.config.default_priority(),
    })?
    else {
        return Err(Error::Other("Add did not produce a record".to_string()));
    };

    let record = store
        .get(id)
        .ok_or_else(|| Error::Other(format!("Record {} vanished after add", id)))?;
    Ok(AddResult {
        id: id.to_string(),
        text: record.text.clone(),
        priority: record.priority,
    })
}

// === Toggle / Remove / Edit ===

#[derive(Debug, Serialize)]
pub struct ChangeResult {
    pub action: &'static str,
    /// Id as given on the command line
    pub input: String,
    /// Full id, when the input matched exactly one record
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub changed: bool,
}

impl Output for ChangeResult {
    fn to_json(&self) -> String {
        json_line(self)
    }

    fn to_human(&self) -> String {
        match (&self.id, self.changed) {
            (None, _) => format!("No record matches '{}'", self.input),
            (Some(id), true) => format!("{} {}", capitalize(self.action), &id[..8]),
            (Some(id), false) => format!("{} unchanged", &id[..8]),
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Flip the completed flag of the record matching `input`.
pub fn toggle(ctx: &ListContext, input: &str) -> Result<ChangeResult> {
    let mut store = ctx.store()?;
    let id = store.resolve_id(input);
    let changed = match id {
        Some(id) => store.dispatch(Command::Toggle { id })?.changed(),
        None => false,
    };
    Ok(ChangeResult {
        action: "toggled",
        input: input.to_string(),
        id: id.map(|id| id.to_string()),
        changed,
    })
}

/// Remove the record matching `input`.
pub fn remove(ctx: &ListContext, input: &str) -> Result<ChangeResult> {
    let mut store = ctx.store()?;
    let id = store.resolve_id(input);
    let changed = match id {
        Some(id) => store.dispatch(Command::Remove { id })?.changed(),
        None => false,
    };
    Ok(ChangeResult {
        action: "removed",
        input: input.to_string(),
        id: id.map(|id| id.to_string()),
        changed,
    })
}

/// Replace the text of the record matching `input`.
///
/// Invalid text is an error even when no record matches.
pub fn edit(ctx: &ListContext, input: &str, text: &str) -> Result<ChangeResult> {
    validate_text(text)?;
    let mut store = ctx.store()?;
    let id = store.resolve_id(input);
    let changed = match id {
        Some(id) => store
            .dispatch(Command::Edit {
                id,
                text: text.to_string(),
            })?
            .changed(),
        None => false,
    };
    Ok(ChangeResult {
        action: "edited",
        input: input.to_string(),
        id: id.map(|id| id.to_string()),
        changed,
    })
}

// === Clear completed ===

#[derive(Debug, Serialize)]
pub struct ClearResult {
    pub removed: usize,
    pub remaining: usize,
}

impl Output for ClearResult {
    fn to_json(&self) -> String {
        json_line(self)
    }

    fn to_human(&self) -> String {
        format!(
            "Removed {} completed record(s), {} remaining",
            self.removed, self.remaining
        )
    }
}

pub fn clear_completed(ctx: &ListContext) -> Result<ClearResult> {
    let mut store = ctx.store()?;
    let removed = match store.dispatch(Command::ClearCompleted)? {
        Outcome::Cleared(removed) => removed,
        _ => 0,
    };
    Ok(ClearResult {
        removed,
        remaining: store.records().len(),
    })
}

// === List ===

#[derive(Debug, Serialize)]
pub struct ListResult {
    pub filter: Filter,
    pub count: usize,
    pub records: Vec<Record>,
}

impl Output for ListResult {
    fn to_json(&self) -> String {
        json_line(self)
    }

    fn to_human(&self) -> String {
        if self.records.is_empty() {
            return format!("No {} records.", self.filter.as_str());
        }
        let mut lines = vec![format!("{} {} record(s):", self.count, self.filter.as_str())];
        lines.extend(self.records.iter().map(|r| format!("  {}", record_line(r))));
        lines.join("\n")
    }
}

/// Records matching the resolved filter (`--filter`, then config).
pub fn list(ctx: &ListContext) -> Result<ListResult> {
    let store = ctx.store()?;
    let view = store.filtered_view();
    Ok(ListResult {
        filter: store.filter(),
        count: view.len(),
        records: view.to_vec(),
    })
}

// === Stats ===

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct StatsResult(pub Stats);

impl Output for StatsResult {
    fn to_json(&self) -> String {
        json_line(self)
    }

    fn to_human(&self) -> String {
        let s = &self.0;
        format!(
            "{} total, {} active, {} completed ({:.1}% done)",
            s.total, s.active, s.completed, s.completion_rate
        )
    }
}

pub fn stats(ctx: &ListContext) -> Result<StatsResult> {
    let store = ctx.store()?;
    Ok(StatsResult(*store.stats()))
}

// === Window ===

#[derive(Debug, Serialize)]
pub struct WindowRow {
    pub index: usize,
    pub offset: f64,
    pub id: String,
    pub text: String,
    pub completed: bool,
}

/// Renders window items as output rows.
struct RowRenderer;

impl ItemRenderer for RowRenderer {
    type Output = WindowRow;

    fn render_item(&mut self, index: usize, record: &Record, offset: f64) -> WindowRow {
        WindowRow {
            index,
            offset,
            id: record.id.to_string(),
            text: record.text.clone(),
            completed: record.completed,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WindowResult {
    pub filter: Filter,
    pub item_count: usize,
    pub total_extent: f64,
    pub scroll_offset: f64,
    pub viewport_size: f64,
    pub item_size: f64,
    pub overscan: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_index: Option<usize>,
    pub items: Vec<WindowRow>,
}

impl Output for WindowResult {
    fn to_json(&self) -> String {
        json_line(self)
    }

    fn to_human(&self) -> String {
        let header = match (self.start_index, self.end_index) {
            (Some(start), Some(end)) => format!(
                "Items {}-{} of {} ({} filter, extent {}, scroll {})",
                start,
                end,
                self.item_count,
                self.filter.as_str(),
                self.total_extent,
                self.scroll_offset
            ),
            _ => format!("No {} records.", self.filter.as_str()),
        };
        let mut lines = vec![header];
        for row in &self.items {
            let check = if row.completed { "x" } else { " " };
            lines.push(format!(
                "  {:>5} @{:<8} [{}] {}  {}",
                row.index,
                row.offset,
                check,
                &row.id[..8],
                row.text
            ));
        }
        lines.join("\n")
    }
}

/// The slice of the filtered view a viewport scrolled to `scroll` would
/// materialize. Geometry comes from the resolved config, flags included.
pub fn window(ctx: &ListContext, scroll: f64) -> Result<WindowResult> {
    let store = ctx.store()?;
    let view = store.filtered_view();

    let item_size = ctx.config.item_size();
    let viewport = ctx.config.viewport_size();
    let overscan = ctx.config.overscan();

    let mut list = VirtualList::new(item_size, viewport).with_overscan(overscan);
    list.scroll_to(scroll, view.len());
    let items = list.render(&view, &mut RowRenderer);
    let range = list.window(view.len()).range();

    Ok(WindowResult {
        filter: store.filter(),
        item_count: view.len(),
        total_extent: list.total_extent(view.len()),
        scroll_offset: list.scroll_offset(),
        viewport_size: viewport,
        item_size,
        overscan,
        start_index: range.as_ref().map(|r| *r.start()),
        end_index: range.as_ref().map(|r| *r.end()),
        items,
    })
}

// === Config ===

#[derive(Debug, Serialize)]
pub struct ConfigEntry {
    pub key: &'static str,
    pub value: String,
    pub source: String,
}

#[derive(Debug, Serialize)]
pub struct ConfigShowResult {
    pub path: String,
    pub entries: Vec<ConfigEntry>,
}

impl Output for ConfigShowResult {
    fn to_json(&self) -> String {
        json_line(self)
    }

    fn to_human(&self) -> String {
        let mut lines = vec![format!("Config file: {}", self.path)];
        for entry in &self.entries {
            lines.push(format!(
                "  {} = {} ({})",
                entry.key, entry.value, entry.source
            ));
        }
        lines.join("\n")
    }
}

pub fn config_show(ctx: &ListContext) -> Result<ConfigShowResult> {
    let entries = ctx
        .config
        .entries()
        .into_iter()
        .map(|(key, value, source): (&'static str, String, ValueSource)| ConfigEntry {
            key,
            value,
            source: source.to_string(),
        })
        .collect();
    Ok(ConfigShowResult {
        path: ctx.config_path().display().to_string(),
        entries,
    })
}

#[derive(Debug, Serialize)]
pub struct ConfigSetResult {
    pub key: String,
    pub value: String,
    pub path: String,
}

impl Output for ConfigSetResult {
    fn to_json(&self) -> String {
        json_line(self)
    }

    fn to_human(&self) -> String {
        format!("Set {} = {} in {}", self.key, self.value, self.path)
    }
}

/// Validate and store one key in config.kdl.
pub fn config_set(ctx: &ListContext, key: &str, value: &str) -> Result<ConfigSetResult> {
    let path = ctx.config_path();
    let mut file: TickConfig = config::load_config_file(&path)?;
    file.set(key, value).map_err(Error::Config)?;
    config::write_config_file(&path, &file)?;
    tracing::debug!(key, value, path = %path.display(), "Updated config");

    Ok(ConfigSetResult {
        key: key.to_string(),
        value: value.to_string(),
        path: path.display().to_string(),
    })
}
