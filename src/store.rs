//! The authoritative, ordered sequence of work records.
//!
//! The in-memory sequence is the source of truth. Every mutation is written through to the
//! `Storage` immediately; a failed write is logged and otherwise ignored, so the in-memory
//! state stays authoritative even when persistence fails.

use crate::defaults::{default_entries, CURRENT_DATA_VERSION};
use crate::model::{EntryId, NewEntry, WorkEntry};
use crate::storage::{SharedStorage, DATA_VERSION, WORK_DATA};
use crate::Result;
use anyhow::Context;
use tracing::{debug, error, info, warn};

pub struct RecordStore {
    storage: SharedStorage,
    entries: Vec<WorkEntry>,
}

impl std::fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore")
            .field("entries", &self.entries)
            .finish_non_exhaustive()
    }
}

impl RecordStore {
    /// Loads the records from `storage`.
    ///
    /// When the stored version tag equals `CURRENT_DATA_VERSION` and the stored data parses, it
    /// is used unchanged. Otherwise the store is reseeded from the default dataset and both keys
    /// are rewritten. If anything in that process fails, the default dataset is used and one more
    /// attempt is made to persist it, so an unreadable store is repaired rather than left broken.
    /// This function never fails.
    pub async fn initialize(storage: SharedStorage) -> Self {
        let entries = match load_or_reseed(&storage).await {
            Ok(entries) => entries,
            Err(e) => {
                error!("Error initializing the record store: {e:#}");
                let entries = default_entries();
                if let Err(e) = write_seed(&storage, &entries).await {
                    error!("Unable to save the default records: {e:#}");
                }
                entries
            }
        };
        Self { storage, entries }
    }

    pub fn entries(&self) -> &[WorkEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &EntryId) -> Option<&WorkEntry> {
        self.entries.iter().find(|e| e.id() == id)
    }

    /// Assigns a fresh id to `entry`, appends it and returns the stored record.
    pub async fn add(&mut self, entry: NewEntry) -> WorkEntry {
        let entry = WorkEntry::new(entry);
        debug!("Adding entry {}", entry.id());
        self.entries.push(entry.clone());
        self.persist().await;
        entry
    }

    /// Removes the first entry with `id` and returns it. Returns `None` and changes nothing when
    /// no entry matches.
    pub async fn delete(&mut self, id: &EntryId) -> Option<WorkEntry> {
        let ix = self.entries.iter().position(|e| e.id() == id)?;
        let removed = self.entries.remove(ix);
        debug!("Deleted entry {id}");
        self.persist().await;
        Some(removed)
    }

    /// Replaces the whole sequence with `entries`. Import uses this, and only with a non-empty
    /// sequence.
    pub async fn replace_all(&mut self, entries: Vec<WorkEntry>) {
        info!(
            "Replacing {} stored entries with {} entries",
            self.entries.len(),
            entries.len()
        );
        self.entries = entries;
        self.persist().await;
    }

    /// Writes the current sequence to storage. Failures are logged, never returned.
    async fn persist(&self) {
        if let Err(e) = write_entries(&self.storage, &self.entries).await {
            error!("Error writing records to storage: {e:#}");
        }
    }
}

async fn load_or_reseed(storage: &SharedStorage) -> Result<Vec<WorkEntry>> {
    let saved_version = storage.get(DATA_VERSION).await?;
    let saved_data = storage.get(WORK_DATA).await?;

    if saved_version.as_deref() == Some(CURRENT_DATA_VERSION) {
        if let Some(data) = saved_data {
            match serde_json::from_str::<Vec<WorkEntry>>(&data) {
                Ok(entries) => {
                    debug!("Loaded {} entries from storage", entries.len());
                    return Ok(entries);
                }
                Err(e) => warn!("Stored records could not be parsed, reseeding: {e}"),
            }
        }
    } else {
        info!(
            "Stored data version {:?} does not match {CURRENT_DATA_VERSION}, reseeding",
            saved_version
        );
    }

    let entries = default_entries();
    write_seed(storage, &entries).await?;
    Ok(entries)
}

/// Writes `entries` together with the current version tag.
async fn write_seed(storage: &SharedStorage, entries: &[WorkEntry]) -> Result<()> {
    write_entries(storage, entries).await?;
    storage
        .set(DATA_VERSION, CURRENT_DATA_VERSION)
        .await
        .context("Unable to write the data version")
}

async fn write_entries(storage: &SharedStorage, entries: &[WorkEntry]) -> Result<()> {
    let json = serde_json::to_string(entries).context("Unable to serialize records")?;
    storage
        .set(WORK_DATA, &json)
        .await
        .context("Unable to write records")
}
