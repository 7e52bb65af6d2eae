// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use crate::domain::errors::CheckError;
use crate::domain::interfaces::{CommitProbing, PageFetching, ProbeOutcome};
use crate::domain::models::FetchedPage;
use crate::domain::resolver::HostFamily;
use crate::infra::networking::pages::WebPageFetcher;
use crate::infra::networking::probes::HttpCommitProber;
#[cfg(test)]
use std::collections::HashMap;
#[cfg(test)]
use std::sync::Arc;
#[cfg(test)]
use std::sync::atomic::{AtomicUsize, Ordering};

pub enum PageFetcher {
    Web(WebPageFetcher),
    #[cfg(test)]
    Fake(FakePageFetcher),
}

impl PageFetching for PageFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, CheckError> {
        match self {
            PageFetcher::Web(delegate) => delegate.fetch(url).await,
            #[cfg(test)]
            PageFetcher::Fake(fake) => fake.fetch(url).await,
        }
    }
}

pub enum CommitProber {
    Web(HttpCommitProber),
    #[cfg(test)]
    Fake(FakeCommitProber),
}

impl CommitProbing for CommitProber {
    async fn probe(&self, family: HostFamily, candidate: &str, commit: &str) -> Result<ProbeOutcome, CheckError> {
        match self {
            CommitProber::Web(delegate) => delegate.probe(family, candidate, commit).await,
            #[cfg(test)]
            CommitProber::Fake(fake) => fake.probe(family, candidate, commit).await,
        }
    }
}

#[cfg(test)]
type FetchHook = Arc<dyn Fn(usize) + Send + Sync>;

/// Serves canned pages and counts every fetch, including the ones it cannot serve
#[cfg(test)]
#[derive(Clone, Default)]
pub struct FakePageFetcher {
    pages: HashMap<String, FetchedPage>,
    calls: Arc<AtomicUsize>,
    hook: Option<FetchHook>,
}

#[cfg(test)]
impl FakePageFetcher {
    pub fn serving(mut self, url: &str, page: FetchedPage) -> Self {
        self.pages.insert(url.to_string(), page);
        self
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }

    /// Runs the hook with the 1-based fetch count, before serving the page
    pub fn on_fetch(mut self, hook: impl Fn(usize) + Send + Sync + 'static) -> Self {
        self.hook = Some(Arc::new(hook));
        self
    }
}

#[cfg(test)]
impl PageFetching for FakePageFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, CheckError> {
        let fetches = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(hook) = &self.hook {
            hook(fetches);
        }

        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| CheckError::Transport(format!("cannot connect to {}", url)))
    }
}

/// Unknown candidates are never successors
#[cfg(test)]
#[derive(Clone, Default)]
pub struct FakeCommitProber {
    outcomes: HashMap<String, Result<ProbeOutcome, CheckError>>,
    calls: Arc<AtomicUsize>,
}

#[cfg(test)]
impl FakeCommitProber {
    pub fn answering(mut self, candidate: &str, outcome: Result<ProbeOutcome, CheckError>) -> Self {
        self.outcomes.insert(candidate.to_string(), outcome);
        self
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

#[cfg(test)]
impl CommitProbing for FakeCommitProber {
    async fn probe(&self, _: HostFamily, candidate: &str, _: &str) -> Result<ProbeOutcome, CheckError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcomes
            .get(candidate)
            .cloned()
            .unwrap_or(Ok(ProbeOutcome::NotSuccessor))
    }
}
