// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

pub(crate) mod batch;
pub(crate) mod checker;

use crate::infra::caching::checkpoints::{CheckpointFile, CheckpointStore};
use crate::infra::catalog;
use crate::infra::cli::reporter::ConsoleReporter;
use crate::tombstone::TombstoneTask::{AuditCatalog, CheckRepository};
use batch::{BatchRunner, BatchSettings, CheckerFactory};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Debug)]
pub enum TombstoneTask {
    CheckRepository {
        url: String,
        commit: Option<String>,
    },
    AuditCatalog {
        index_path: PathBuf,
        checkpoint_path: PathBuf,
        concurrency: usize,
        flush_every: usize,
    },
}

pub struct Tombstone {
    checker_factory: CheckerFactory,
    console_reporter: ConsoleReporter,
}

impl Tombstone {
    pub(crate) fn new(checker_factory: CheckerFactory, console_reporter: ConsoleReporter) -> Self {
        Self {
            checker_factory,
            console_reporter,
        }
    }

    pub async fn execute(self, task: TombstoneTask) -> anyhow::Result<()> {
        match task {
            CheckRepository { url, commit } => {
                self.console_reporter.report_check_started(&url);
                let checker = (self.checker_factory)()?;
                let check = checker.check(&url, commit.as_deref()).await;
                self.console_reporter.report_check_outcome(&url, &check);
            },
            AuditCatalog {
                index_path,
                checkpoint_path,
                concurrency,
                flush_every,
            } => {
                let work_items = catalog::load_work_items(&index_path)?;
                let store = Arc::new(CheckpointStore::open(CheckpointFile::new(checkpoint_path.clone()))?);
                self.console_reporter.report_audit_started(work_items.len());

                let cancellation = CancellationToken::new();
                let stop_listener = Self::listen_stop_requests(cancellation.clone());

                let settings = BatchSettings {
                    concurrency,
                    flush_every,
                };
                let runner = BatchRunner::new(settings, self.checker_factory.clone());
                let outcome = runner.run(work_items, store, cancellation).await;
                stop_listener.abort();

                let report = outcome?;
                self.console_reporter
                    .report_audit_outcomes(&report, checkpoint_path.as_path());
            },
        }

        Ok(())
    }

    fn listen_stop_requests(cancellation: CancellationToken) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::info!("[tombstone] stop requested, waiting for in-flight checks");
                cancellation.cancel();
            }
        })
    }
}
