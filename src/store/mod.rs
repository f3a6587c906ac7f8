//! Derived-state store for the record list.
//!
//! [`TodoStore`] owns the canonical ordered collection and the current
//! filter. Every change goes through one of six commands (add, toggle,
//! remove, edit, clear-completed, set-filter), which are also reachable
//! through a [`CommandHandles`] table that is built once and never changes
//! identity.
//!
//! The filtered view and the stats are derived lazily and memoized:
//! - the collection version bumps exactly once per command that changed the
//!   collection (no-op commands leave it alone)
//! - the view is keyed by `(version, filter)`, the stats by `version`
//! - a recomputation whose result equals the cached value keeps the cached
//!   `Rc`, so identity only changes when content does
//!
//! Every command that changed the collection saves the full list through the
//! [`Persistence`] collaborator.

mod memo;

pub use memo::Memo;

use crate::models::{Filter, Priority, Record, RecordId, Stats, ValidationError, validate_text};
use crate::storage::Persistence;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

/// Shortest id prefix accepted by [`TodoStore::resolve_id`].
pub const MIN_ID_PREFIX: usize = 4;

/// Command entry points, bound once per store.
///
/// Handles are plain function pointers, so two reads of
/// [`TodoStore::handles`] yield the same table regardless of how the store
/// changed in between.
pub struct CommandHandles<P: Persistence> {
    pub add: fn(&mut TodoStore<P>, &str, Option<Priority>) -> Result<RecordId, ValidationError>,
    pub toggle: fn(&mut TodoStore<P>, RecordId) -> bool,
    pub remove: fn(&mut TodoStore<P>, RecordId) -> bool,
    pub edit: fn(&mut TodoStore<P>, RecordId, &str) -> Result<bool, ValidationError>,
    pub clear_completed: fn(&mut TodoStore<P>) -> usize,
    pub set_filter: fn(&mut TodoStore<P>, Filter),
}

impl<P: Persistence> CommandHandles<P> {
    fn bind() -> Self {
        Self {
            add: TodoStore::add,
            toggle: TodoStore::toggle,
            remove: TodoStore::remove,
            edit: TodoStore::edit,
            clear_completed: TodoStore::clear_completed,
            set_filter: TodoStore::set_filter,
        }
    }
}

impl<P: Persistence> fmt::Debug for CommandHandles<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandHandles").finish_non_exhaustive()
    }
}

/// A store command as a value, for callers that queue or log commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    Add {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        priority: Option<Priority>,
    },
    Toggle {
        id: RecordId,
    },
    Remove {
        id: RecordId,
    },
    Edit {
        id: RecordId,
        text: String,
    },
    ClearCompleted,
    SetFilter {
        filter: Filter,
    },
}

impl Command {
    /// Short command name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::Toggle { .. } => "toggle",
            Self::Remove { .. } => "remove",
            Self::Edit { .. } => "edit",
            Self::ClearCompleted => "clear_completed",
            Self::SetFilter { .. } => "set_filter",
        }
    }
}

/// What a dispatched command did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A record was appended
    Added(RecordId),
    /// Toggle, remove or edit; `false` when nothing matched or nothing changed
    Changed(bool),
    /// Number of completed records removed
    Cleared(usize),
    /// The filter was set
    FilterSet,
}

impl Outcome {
    /// Whether the command changed the collection or the filter.
    pub fn changed(&self) -> bool {
        match *self {
            Self::Added(_) | Self::FilterSet => true,
            Self::Changed(changed) => changed,
            Self::Cleared(removed) => removed > 0,
        }
    }
}

/// Canonical record list plus memoized derived views.
pub struct TodoStore<P: Persistence> {
    records: Vec<Record>,
    filter: Filter,
    version: u64,
    persistence: P,
    view: Memo<(u64, Filter), [Record]>,
    stats: Memo<u64, Stats>,
    handles: Rc<CommandHandles<P>>,
}

impl<P: Persistence> TodoStore<P> {
    /// Create a store from whatever `persistence` loads.
    pub fn open(mut persistence: P) -> Self {
        let records = persistence.load();
        tracing::debug!(count = records.len(), "Opened store");
        Self {
            records,
            filter: Filter::default(),
            version: 0,
            persistence,
            view: Memo::new(),
            stats: Memo::new(),
            handles: Rc::new(CommandHandles::bind()),
        }
    }

    /// Command handle table; the same `Rc` for the lifetime of the store.
    pub fn handles(&self) -> Rc<CommandHandles<P>> {
        Rc::clone(&self.handles)
    }

    /// Validate and append a new record.
    pub fn add(
        &mut self,
        text: &str,
        priority: Option<Priority>,
    ) -> Result<RecordId, ValidationError> {
        let text = validate_text(text)?;
        let record = Record::new(text, priority);
        let id = record.id;
        self.records.push(record);
        self.commit("add");
        Ok(id)
    }

    /// Flip the completion flag of `id`. Returns `false` if `id` is absent.
    pub fn toggle(&mut self, id: RecordId) -> bool {
        let Some(pos) = self.position(id) else {
            return false;
        };
        self.records[pos] = self.records[pos].toggled();
        self.commit("toggle");
        true
    }

    /// Remove `id`. Returns `false` if `id` is absent.
    pub fn remove(&mut self, id: RecordId) -> bool {
        let Some(pos) = self.position(id) else {
            return false;
        };
        self.records.remove(pos);
        self.commit("remove");
        true
    }

    /// Replace the text of `id`, keeping its id, flag, priority and timestamp.
    ///
    /// The text is validated before the lookup, so invalid text is rejected
    /// even for an absent id. Returns `false` when `id` is absent or the text
    /// is unchanged.
    pub fn edit(&mut self, id: RecordId, text: &str) -> Result<bool, ValidationError> {
        let text = validate_text(text)?;
        let Some(pos) = self.position(id) else {
            return Ok(false);
        };
        if self.records[pos].text == text {
            return Ok(false);
        }
        self.records[pos] = self.records[pos].with_text(text);
        self.commit("edit");
        Ok(true)
    }

    /// Remove every completed record. Returns how many were removed.
    pub fn clear_completed(&mut self) -> usize {
        let before = self.records.len();
        self.records.retain(|r| !r.completed);
        let removed = before - self.records.len();
        if removed > 0 {
            self.commit("clear_completed");
        }
        removed
    }

    /// Set the current filter.
    pub fn set_filter(&mut self, filter: Filter) {
        if self.filter != filter {
            tracing::debug!(%filter, "Filter changed");
            self.filter = filter;
        }
    }

    /// Apply a command value through the handle table.
    pub fn dispatch(&mut self, command: Command) -> Result<Outcome, ValidationError> {
        let handles = self.handles();
        tracing::debug!(command = command.name(), "Dispatching command");
        let outcome = match command {
            Command::Add { text, priority } => {
                Outcome::Added((handles.add)(self, &text, priority)?)
            }
            Command::Toggle { id } => Outcome::Changed((handles.toggle)(self, id)),
            Command::Remove { id } => Outcome::Changed((handles.remove)(self, id)),
            Command::Edit { id, text } => Outcome::Changed((handles.edit)(self, id, &text)?),
            Command::ClearCompleted => Outcome::Cleared((handles.clear_completed)(self)),
            Command::SetFilter { filter } => {
                (handles.set_filter)(self, filter);
                Outcome::FilterSet
            }
        };
        Ok(outcome)
    }

    /// Records matching the current filter, in collection order.
    pub fn filtered_view(&self) -> Rc<[Record]> {
        let filter = self.filter;
        self.view.get_or_compute((self.version, filter), || {
            tracing::debug!(version = self.version, %filter, "Recomputing filtered view");
            self.records
                .iter()
                .filter(|r| filter.matches(r))
                .cloned()
                .collect()
        })
    }

    /// Aggregate statistics over the whole collection.
    pub fn stats(&self) -> Rc<Stats> {
        self.stats.get_or_compute(self.version, || {
            tracing::debug!(version = self.version, "Recomputing stats");
            Rc::new(Stats::from_records(&self.records))
        })
    }

    /// The canonical ordered collection.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    /// Look up a record by id.
    pub fn get(&self, id: RecordId) -> Option<&Record> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Resolve a full id or a unique prefix of at least [`MIN_ID_PREFIX`] characters.
    pub fn resolve_id(&self, input: &str) -> Option<RecordId> {
        let input = input.trim();
        if let Ok(id) = input.parse::<RecordId>() {
            return self.get(id).map(|r| r.id);
        }
        if input.len() < MIN_ID_PREFIX {
            return None;
        }
        let mut matches = self.records.iter().filter(|r| r.id.matches_prefix(input));
        match (matches.next(), matches.next()) {
            (Some(record), None) => Some(record.id),
            _ => None,
        }
    }

    /// Collection version; bumps once per command that changed the collection.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// How many times the filtered view has been recomputed.
    pub fn view_computations(&self) -> u64 {
        self.view.computations()
    }

    /// How many times the stats have been recomputed.
    pub fn stats_computations(&self) -> u64 {
        self.stats.computations()
    }

    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    pub fn persistence_mut(&mut self) -> &mut P {
        &mut self.persistence
    }

    fn position(&self, id: RecordId) -> Option<usize> {
        self.records.iter().position(|r| r.id == id)
    }

    fn commit(&mut self, command: &'static str) {
        self.version += 1;
        tracing::debug!(
            command,
            version = self.version,
            count = self.records.len(),
            "Collection changed"
        );
        self.persistence.save(&self.records);
    }
}

impl<P: Persistence> fmt::Debug for TodoStore<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TodoStore")
            .field("records", &self.records.len())
            .field("filter", &self.filter)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}
