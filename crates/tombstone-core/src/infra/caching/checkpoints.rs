// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use crate::domain::models::{RepoCheck, WorkItem};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

pub type CheckpointEntries = BTreeMap<String, CheckpointEntry>;

/// Last known outcome for a catalog entry, as persisted between runs
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointEntry {
    pub confirmed: bool,
    pub repo: String,
    pub repo_real: String,
    pub repo_deleted: bool,
    pub repo_archived: bool,
    pub moved_to: Option<String>,
    pub error: Option<String>,
}

impl CheckpointEntry {
    pub fn new(work_item: &WorkItem, check: &RepoCheck) -> Self {
        Self {
            confirmed: check.confirmed(),
            repo: work_item.url.clone(),
            repo_real: check.repo_real().to_string(),
            repo_deleted: check.repo_deleted(),
            repo_archived: check.repo_archived(),
            moved_to: check.moved_to().map(str::to_string),
            error: check.error().map(|error| error.to_string()),
        }
    }
}

#[derive(Debug)]
pub struct CheckpointFile {
    path: PathBuf,
}

impl CheckpointFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn load(&self) -> anyhow::Result<CheckpointEntries> {
        if !self.path.exists() {
            log::info!("[tombstone.checkpoints] {:?} not found, starting fresh", self.path);
            return Ok(CheckpointEntries::new());
        }

        let serialized = std::fs::read(&self.path)?;
        let entries: CheckpointEntries = serde_json::from_slice(&serialized)
            .with_context(|| format!("tombstone.checkpoints : cannot parse {:?}", self.path))?;
        log::info!("[tombstone.checkpoints] loaded {} entries from {:?}", entries.len(), self.path);
        Ok(entries)
    }

    /// Writes into a sibling file first, so an interrupted write never corrupts the previous checkpoint
    pub fn save(&self, entries: &CheckpointEntries) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
            log::info!("[tombstone.checkpoints] {:?} created", parent);
        }

        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        let staging = PathBuf::from(staging);

        let serialized = serde_json::to_string_pretty(entries)?;
        std::fs::write(&staging, serialized)?;
        std::fs::rename(&staging, &self.path)?;
        log::info!("[tombstone.checkpoints] {} entries saved at {:?}", entries.len(), self.path);
        Ok(())
    }
}

/// Checkpoint entries shared by batch workers.
///
/// Locks guard only in-memory map operations; file writes happen on a snapshot.
#[derive(Debug)]
pub struct CheckpointStore {
    entries: Mutex<CheckpointEntries>,
    file: Option<CheckpointFile>,
    writing: Mutex<()>,
}

impl CheckpointStore {
    #[cfg(test)]
    pub fn in_memory(entries: CheckpointEntries) -> Self {
        Self {
            entries: Mutex::new(entries),
            file: None,
            writing: Mutex::new(()),
        }
    }

    pub fn open(file: CheckpointFile) -> anyhow::Result<Self> {
        let entries = file.load()?;
        Ok(Self {
            entries: Mutex::new(entries),
            file: Some(file),
            writing: Mutex::new(()),
        })
    }

    fn locked_entries(&self) -> MutexGuard<'_, CheckpointEntries> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_confirmed(&self, key: &str) -> bool {
        self.locked_entries()
            .get(key)
            .map(|entry| entry.confirmed)
            .unwrap_or(false)
    }

    #[cfg(test)]
    pub fn entry(&self, key: &str) -> Option<CheckpointEntry> {
        self.locked_entries().get(key).cloned()
    }

    /// Stores the entry, replacing any previous one for the same key
    pub fn record(&self, key: &str, entry: CheckpointEntry) {
        self.locked_entries().insert(key.to_string(), entry);
    }

    pub fn snapshot(&self) -> CheckpointEntries {
        self.locked_entries().clone()
    }

    pub fn persist(&self) -> anyhow::Result<()> {
        let Some(file) = &self.file else {
            return Ok(());
        };

        let _writing = self.writing.lock().unwrap_or_else(PoisonError::into_inner);
        file.save(&self.snapshot())
    }
}
