// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use crate::domain::models::{BatchReport, BatchStatistics, ItemState, WorkItem};
use crate::infra::caching::checkpoints::{CheckpointEntry, CheckpointStore};
use crate::tombstone::checker::RepositoryChecker;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio_util::sync::CancellationToken;

/// Builds the checker owned by a single worker
pub type CheckerFactory = Arc<dyn Fn() -> anyhow::Result<RepositoryChecker> + Send + Sync>;

type WorkQueue = Mutex<VecDeque<(usize, WorkItem)>>;

#[derive(Clone, Copy, Debug)]
pub struct BatchSettings {
    pub concurrency: usize,
    /// Rewrite the checkpoint file every time this many items complete; zero disables it
    pub flush_every: usize,
}

pub struct BatchRunner {
    settings: BatchSettings,
    checker_factory: CheckerFactory,
}

impl BatchRunner {
    pub fn new(settings: BatchSettings, checker_factory: CheckerFactory) -> Self {
        Self {
            settings,
            checker_factory,
        }
    }

    /// Drives every item to a terminal state, unless a stop is requested.
    ///
    /// Workers observe the cancellation token between items only, so an item is either
    /// completed and recorded, or left pending for the next run. The checkpoint is persisted
    /// once all workers are gone.
    pub async fn run(
        &self,
        work_items: Vec<WorkItem>,
        store: Arc<CheckpointStore>,
        cancellation: CancellationToken,
    ) -> anyhow::Result<BatchReport> {
        let total_items = work_items.len();
        let total_workers = self.settings.concurrency.clamp(1, total_items.max(1));

        let checkers = (0..total_workers)
            .map(|_| (self.checker_factory)())
            .collect::<anyhow::Result<Vec<_>>>()?;

        let queue: Arc<WorkQueue> = Arc::new(Mutex::new(work_items.iter().cloned().enumerate().collect()));
        let states = Arc::new(Mutex::new(vec![ItemState::Pending; total_items]));
        let completions = Arc::new(AtomicUsize::new(0));

        log::info!(
            "[tombstone.batch] processing {} items with {} workers",
            total_items,
            total_workers
        );

        let handles = checkers
            .into_iter()
            .enumerate()
            .map(|(worker_id, checker)| {
                let worker = BatchWorker {
                    worker_id,
                    checker,
                    queue: queue.clone(),
                    states: states.clone(),
                    store: store.clone(),
                    cancellation: cancellation.clone(),
                    completions: completions.clone(),
                    flush_every: self.settings.flush_every,
                };
                tokio::spawn(worker.run())
            })
            .collect::<Vec<_>>();

        for handle in handles {
            if let Err(incoming) = handle.await {
                log::error!("[tombstone.batch] worker stopped abruptly : {}", incoming);
            }
        }

        if cancellation.is_cancelled() {
            log::info!("[tombstone.batch] stopped on request, persisting partial results");
        }

        let persisting_store = store.clone();
        tokio::task::spawn_blocking(move || persisting_store.persist()).await??;

        let final_states = std::mem::take(&mut *lock(&states));
        Ok(aggregate(work_items, final_states))
    }
}

struct BatchWorker {
    worker_id: usize,
    checker: RepositoryChecker,
    queue: Arc<WorkQueue>,
    states: Arc<Mutex<Vec<ItemState>>>,
    store: Arc<CheckpointStore>,
    cancellation: CancellationToken,
    completions: Arc<AtomicUsize>,
    flush_every: usize,
}

impl BatchWorker {
    async fn run(self) {
        loop {
            if self.cancellation.is_cancelled() {
                log::info!("[tombstone.batch] worker #{} observed stop request", self.worker_id);
                break;
            }

            let Some((index, work_item)) = lock(&self.queue).pop_front() else {
                break;
            };

            if self.store.is_confirmed(&work_item.key) {
                log::info!("[tombstone.batch] skipping already confirmed {}", work_item);
                self.transition(index, ItemState::Skipped);
                continue;
            }

            self.transition(index, ItemState::Dispatched);
            let check = self
                .checker
                .check(&work_item.url, work_item.commit.as_deref())
                .await;

            if !check.confirmed() {
                log::warn!(
                    "[tombstone.batch] not confirmed : {} <-> {}",
                    work_item,
                    check.error().map(|error| error.to_string()).unwrap_or_default()
                );
            }

            self.store
                .record(&work_item.key, CheckpointEntry::new(&work_item, &check));
            self.transition(index, ItemState::Completed(check));

            let completed = self.completions.fetch_add(1, Ordering::SeqCst) + 1;
            if self.flush_every > 0 && completed.is_multiple_of(self.flush_every) {
                self.flush().await;
            }
        }

        log::info!("[tombstone.batch] worker #{} finished", self.worker_id);
    }

    fn transition(&self, index: usize, state: ItemState) {
        if let Some(slot) = lock(&self.states).get_mut(index) {
            *slot = state;
        }
    }

    async fn flush(&self) {
        let store = self.store.clone();
        match tokio::task::spawn_blocking(move || store.persist()).await {
            Ok(Ok(())) => {},
            Ok(Err(incoming)) => log::error!("[tombstone.batch] cannot flush checkpoint : {}", incoming),
            Err(incoming) => log::error!("[tombstone.batch] cannot flush checkpoint : {}", incoming),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn aggregate(work_items: Vec<WorkItem>, states: Vec<ItemState>) -> BatchReport {
    let mut statistics = BatchStatistics {
        total: work_items.len(),
        ..Default::default()
    };

    for state in states.iter() {
        match state {
            ItemState::Pending | ItemState::Dispatched => statistics.pending += 1,
            ItemState::Skipped => statistics.skipped += 1,
            ItemState::Completed(check) => {
                statistics.completed += 1;

                if !check.confirmed() {
                    statistics.unconfirmed += 1;
                } else if check.repo_deleted() {
                    statistics.deleted += 1;
                } else if check.repo_archived() {
                    statistics.archived += 1;
                    if check.moved_to().is_some() {
                        statistics.moved += 1;
                    }
                }
            },
        }
    }

    BatchReport {
        statistics,
        outcomes: work_items.into_iter().zip(states).collect(),
    }
}
