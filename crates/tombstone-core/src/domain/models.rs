// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use crate::domain::errors::CheckError;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};

/// Outcome of checking a single repository URL.
///
/// `confirmed` tells whether the boolean fields can be trusted : it is only set when
/// a host-backed determination happened (including "active, not archived").
/// Values are never mutated once built; later stages produce a superseding value instead.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RepoCheck {
    confirmed: bool,
    repo_deleted: bool,
    repo_archived: bool,
    moved_to: Option<String>,
    repo_real: String,
    error: Option<CheckError>,
}

impl RepoCheck {
    pub fn determined(repo_real: &str, archived: bool) -> Self {
        Self {
            confirmed: true,
            repo_archived: archived,
            repo_real: repo_real.to_string(),
            ..Default::default()
        }
    }

    pub fn deleted(repo_real: &str) -> Self {
        Self {
            confirmed: true,
            repo_deleted: true,
            repo_real: repo_real.to_string(),
            ..Default::default()
        }
    }

    pub fn failed(repo_real: &str, error: CheckError) -> Self {
        Self {
            repo_real: repo_real.to_string(),
            error: Some(error),
            ..Default::default()
        }
    }

    /// Only archived repositories can be relocated, anything else is returned untouched
    pub(crate) fn relocated(self, moved_to: String) -> Self {
        if !self.repo_archived {
            return self;
        }

        Self {
            moved_to: Some(moved_to),
            ..self
        }
    }

    /// Keeps the archival verdict but withdraws confidence on the overall outcome
    pub(crate) fn downgraded(self, error: CheckError) -> Self {
        Self {
            confirmed: false,
            error: Some(error),
            ..self
        }
    }

    pub fn confirmed(&self) -> bool {
        self.confirmed
    }

    pub fn repo_deleted(&self) -> bool {
        self.repo_deleted
    }

    pub fn repo_archived(&self) -> bool {
        self.repo_archived
    }

    pub fn moved_to(&self) -> Option<&str> {
        self.moved_to.as_deref()
    }

    pub fn repo_real(&self) -> &str {
        &self.repo_real
    }

    pub fn error(&self) -> Option<&CheckError> {
        self.error.as_ref()
    }
}

impl Display for RepoCheck {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if !self.confirmed {
            return f.write_str("unconfirmed");
        }

        match (self.repo_deleted, self.repo_archived, &self.moved_to) {
            (true, _, _) => f.write_str("deleted"),
            (false, true, Some(target)) => f.write_fmt(format_args!("archived; moved to {}", target)),
            (false, true, None) => f.write_str("archived"),
            (false, false, _) => f.write_str("active"),
        }
    }
}

/// A page as seen by the classifier, after redirects were followed.
///
/// Header names are stored lowercased; cookies keep only their names.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FetchedPage {
    pub status: u16,
    pub final_url: String,
    pub headers: HashMap<String, String>,
    pub cookies: Vec<String>,
    pub body: String,
}

impl FetchedPage {
    pub fn new(status: u16, final_url: &str, body: &str) -> Self {
        Self {
            status,
            final_url: final_url.to_string(),
            body: body.to_string(),
            ..Default::default()
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_lowercase(), value.to_string());
        self
    }

    pub fn with_cookie(mut self, name: &str) -> Self {
        self.cookies.push(name.to_string());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }

    pub fn has_cookie(&self, name: &str) -> bool {
        self.cookies.iter().any(|cookie| cookie == name)
    }

    pub fn mentions(&self, text: &str) -> bool {
        self.body.contains(text)
    }
}

/// One entry of a catalog to audit
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct WorkItem {
    pub key: String,
    pub url: String,
    #[serde(default)]
    pub commit: Option<String>,
}

impl WorkItem {
    pub fn new(key: &str, url: &str, commit: Option<&str>) -> Self {
        Self {
            key: key.to_string(),
            url: url.to_string(),
            commit: commit.map(str::to_string),
        }
    }
}

impl Display for WorkItem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{} ({})", self.key, self.url))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ItemState {
    Pending,
    Dispatched,
    Completed(RepoCheck),
    Skipped,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchStatistics {
    pub total: usize,
    pub completed: usize,
    pub skipped: usize,
    pub pending: usize,
    pub archived: usize,
    pub deleted: usize,
    pub moved: usize,
    pub unconfirmed: usize,
}

pub type BatchOutcome = (WorkItem, ItemState);

#[derive(Debug)]
pub struct BatchReport {
    pub statistics: BatchStatistics,
    pub outcomes: Vec<BatchOutcome>,
}

#[cfg(test)]
mod tests {
    use crate::domain::errors::CheckError;
    use crate::domain::models::{FetchedPage, RepoCheck};
    use assertor::{BooleanAssertion, EqualityAssertion};

    static REPO: &str = "https://github.com/dotanuki-labs/norris";

    #[test]
    fn should_not_relocate_active_repositories() {
        let active = RepoCheck::determined(REPO, false);

        let relocated = active.clone().relocated("https://github.com/elsewhere/norris".to_string());

        assertor::assert_that!(relocated).is_equal_to(active);
    }

    #[test]
    fn should_relocate_archived_repositories() {
        let archived = RepoCheck::determined(REPO, true);

        let relocated = archived.relocated("https://github.com/elsewhere/norris".to_string());

        assertor::assert_that!(relocated.moved_to()).is_equal_to(Some("https://github.com/elsewhere/norris"));
        assertor::assert_that!(relocated.to_string())
            .is_equal_to("archived; moved to https://github.com/elsewhere/norris".to_string());
    }

    #[test]
    fn should_keep_archival_verdict_when_downgraded() {
        let archived = RepoCheck::determined(REPO, true);

        let downgraded = archived.downgraded(CheckError::MoveVerification("boom".to_string()));

        assertor::assert_that!(downgraded.confirmed()).is_false();
        assertor::assert_that!(downgraded.repo_archived()).is_true();
        assertor::assert_that!(downgraded.to_string()).is_equal_to("unconfirmed".to_string());
    }

    #[test]
    fn should_lookup_headers_ignoring_case() {
        let page = FetchedPage::new(200, REPO, "").with_header("CF-Mitigated", "challenge");

        assertor::assert_that!(page.header("cf-mitigated")).is_equal_to(Some("challenge"));
    }
}
