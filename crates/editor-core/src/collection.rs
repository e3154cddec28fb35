//! The entry collection and the store boundary
//!
//! The collection is owned by a store. The controller never mutates it
//! directly; it issues [`StoreCommand`]s through a [`ConfigStore`].

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::entry::ConfigEntry;
use crate::error::Error;

/// Ordered entries plus the active selection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    entries: Vec<ConfigEntry>,
    active: Option<usize>,
}

impl Collection {
    pub fn new(entries: Vec<ConfigEntry>) -> Self {
        Self {
            entries,
            active: None,
        }
    }

    /// Build a collection with a selection, checking the index
    pub fn with_active(entries: Vec<ConfigEntry>, active: usize) -> Result<Self> {
        if active >= entries.len() {
            return Err(Error::IndexOutOfRange {
                index: active,
                len: entries.len(),
            });
        }
        Ok(Self {
            entries,
            active: Some(active),
        })
    }

    pub fn entries(&self) -> &[ConfigEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&ConfigEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn active_entry(&self) -> Option<&ConfigEntry> {
        self.active.and_then(|index| self.entries.get(index))
    }

    /// A copy of the entry list with one position replaced
    pub fn replacing(&self, index: usize, entry: ConfigEntry) -> Vec<ConfigEntry> {
        let mut entries = self.entries.clone();
        if let Some(slot) = entries.get_mut(index) {
            *slot = entry;
        }
        entries
    }

    /// Check that an index addresses an entry
    pub fn check_index(&self, index: usize) -> Result<()> {
        if index < self.entries.len() {
            Ok(())
        } else {
            Err(Error::IndexOutOfRange {
                index,
                len: self.entries.len(),
            })
        }
    }

    fn set_entries(&mut self, entries: Vec<ConfigEntry>) {
        self.entries = entries;
        if self.active.is_some_and(|index| index >= self.entries.len()) {
            self.active = None;
        }
    }
}

/// Commands the controller issues to the store
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "command", content = "payload")]
pub enum StoreCommand {
    /// Replace the whole entry list
    ReplaceAll(Vec<ConfigEntry>),
    /// Append an entry
    AddEntry(ConfigEntry),
    /// Persist an entry that was never stored
    SubmitNew(ConfigEntry),
    /// Persist changes to a stored entry
    SubmitEdit(ConfigEntry),
    /// Change the selection
    SelectActive(Option<usize>),
}

impl StoreCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ReplaceAll(_) => "ReplaceAll",
            Self::AddEntry(_) => "AddEntry",
            Self::SubmitNew(_) => "SubmitNew",
            Self::SubmitEdit(_) => "SubmitEdit",
            Self::SelectActive(_) => "SelectActive",
        }
    }
}

/// Holder of the shared collection
pub trait ConfigStore {
    /// Current state of the collection
    fn collection(&self) -> &Collection;

    /// Apply a command
    fn dispatch(&mut self, command: StoreCommand);
}

/// A store that applies commands immediately and records them
///
/// Submissions are treated as persisted at once: the submitted entry
/// replaces the active one with `is_new` cleared and `saved_in_backend`
/// set.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    collection: Collection,
    log: Vec<StoreCommand>,
}

impl InMemoryStore {
    pub fn new(collection: Collection) -> Self {
        Self {
            collection,
            log: Vec::new(),
        }
    }

    /// Every command dispatched so far, oldest first
    pub fn log(&self) -> &[StoreCommand] {
        &self.log
    }

    pub fn into_collection(self) -> Collection {
        self.collection
    }

    fn persist(&mut self, mut entry: ConfigEntry) {
        entry.is_new = false;
        entry.saved_in_backend = true;
        match self.collection.active {
            Some(index) if index < self.collection.entries.len() => {
                self.collection.entries[index] = entry;
            }
            _ => self.collection.entries.push(entry),
        }
    }
}

impl ConfigStore for InMemoryStore {
    fn collection(&self) -> &Collection {
        &self.collection
    }

    fn dispatch(&mut self, command: StoreCommand) {
        tracing::debug!("Store command {}", command.name());
        self.log.push(command.clone());

        match command {
            StoreCommand::ReplaceAll(entries) => self.collection.set_entries(entries),
            StoreCommand::AddEntry(entry) => self.collection.entries.push(entry),
            StoreCommand::SubmitNew(entry) | StoreCommand::SubmitEdit(entry) => self.persist(entry),
            StoreCommand::SelectActive(index) => {
                self.collection.active = match index {
                    Some(i) if i >= self.collection.entries.len() => {
                        tracing::warn!("Ignoring selection of missing entry {}", i);
                        None
                    }
                    other => other,
                };
            }
        }
    }
}
