// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use crate::domain::capabilities::PageFetcher;
use crate::domain::classifier::StatusClassifier;
use crate::domain::errors::CheckError;
use crate::domain::interfaces::PageFetching;
use crate::domain::models::RepoCheck;
use crate::domain::resolver::MoveResolver;
use std::str::FromStr;
use url::Url;

/// Runs one complete check : fetch, classification, then relocation when archived
pub struct RepositoryChecker {
    page_fetcher: PageFetcher,
    classifier: StatusClassifier,
    resolver: MoveResolver,
}

impl RepositoryChecker {
    pub fn new(page_fetcher: PageFetcher, classifier: StatusClassifier, resolver: MoveResolver) -> Self {
        Self {
            page_fetcher,
            classifier,
            resolver,
        }
    }

    pub async fn check(&self, url: &str, commit: Option<&str>) -> RepoCheck {
        let web_url = Url::from_str(url)
            .ok()
            .filter(|parsed| matches!(parsed.scheme(), "http" | "https"));

        if web_url.is_none() {
            log::info!("[tombstone.checker] refusing to check {}", url);
            return RepoCheck::failed(url, CheckError::MalformedUrl(url.to_string()));
        }

        log::info!("[tombstone.checker] starting check for {}", url);

        let page = match self.page_fetcher.fetch(url).await {
            Ok(page) => page,
            Err(error) => return RepoCheck::failed(url, error),
        };

        let check = self.classifier.classify(&page);

        let check = match commit {
            Some(hash) if check.repo_archived() => self.resolver.resolve(check, &page, hash).await,
            _ => check,
        };

        log::info!("[tombstone.checker] finished check for {} : {}", url, check);
        check
    }
}
