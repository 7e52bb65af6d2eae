// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use crate::domain::capabilities::{CommitProber, PageFetcher};
use crate::domain::classifier::StatusClassifier;
use crate::domain::resolver::MoveResolver;
use crate::infra::cli::reporter::ConsoleReporter;
use crate::infra::networking::http::build_http_client;
use crate::infra::networking::pages::WebPageFetcher;
use crate::infra::networking::probes::HttpCommitProber;
use crate::tombstone::Tombstone;
use crate::tombstone::batch::CheckerFactory;
use crate::tombstone::checker::RepositoryChecker;
use std::sync::Arc;
use std::time::Duration;

pub static DEFAULT_CONCURRENCY: usize = 5;
pub static DEFAULT_CHECKPOINT_FILE: &str = "checked.result.json";
pub static DEFAULT_FLUSH_EVERY: usize = 50;

#[derive(Debug)]
pub struct ExecutionSettings {
    pub use_colors: bool,
    pub request_timeout: Duration,
}

fn web_checker(request_timeout: Duration) -> anyhow::Result<RepositoryChecker> {
    let http_client = build_http_client(request_timeout)?;
    let page_fetcher = PageFetcher::Web(WebPageFetcher::new(http_client.clone()));
    let commit_prober = CommitProber::Web(HttpCommitProber::new(http_client));

    Ok(RepositoryChecker::new(
        page_fetcher,
        StatusClassifier::default(),
        MoveResolver::new(commit_prober),
    ))
}

fn checker_factory(request_timeout: Duration) -> CheckerFactory {
    Arc::new(move || web_checker(request_timeout))
}

pub fn create_tombstone(settings: &ExecutionSettings) -> Tombstone {
    let console_reporter = ConsoleReporter::new(settings.use_colors);
    Tombstone::new(checker_factory(settings.request_timeout), console_reporter)
}
