// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use crate::domain::models::WorkItem;
use anyhow::{Context, bail};
use std::collections::HashSet;
use std::path::Path;

/// Reads the work items of an audit from a JSON index file.
///
/// Entries sharing a key with a previous one are ignored, since checkpoints are keyed by it.
pub fn load_work_items(index_path: &Path) -> anyhow::Result<Vec<WorkItem>> {
    if !index_path.is_file() {
        bail!("tombstone.catalog : no such index file ({:?})", index_path)
    }

    let serialized = std::fs::read(index_path)?;
    let declared: Vec<WorkItem> = serde_json::from_slice(&serialized)
        .with_context(|| format!("tombstone.catalog : cannot parse {:?}", index_path))?;

    let mut known_keys = HashSet::new();
    let work_items = declared
        .into_iter()
        .filter(|item| {
            let fresh = known_keys.insert(item.key.clone());
            if !fresh {
                log::warn!("[tombstone.catalog] ignoring duplicated entry {}", item);
            }
            fresh
        })
        .map(|item| WorkItem {
            commit: item.commit.filter(|hash| !hash.trim().is_empty()),
            ..item
        })
        .collect::<Vec<_>>();

    log::info!("[tombstone.catalog] loaded {} items from {:?}", work_items.len(), index_path);
    Ok(work_items)
}
