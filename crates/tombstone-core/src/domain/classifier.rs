// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use crate::domain::detectors::{Detection, HOST_DETECTORS, HostDetector};
use crate::domain::errors::CheckError;
use crate::domain::models::{FetchedPage, RepoCheck};
use std::str::FromStr;
use url::Url;

static WAF_CHALLENGE_HEADER: &str = "cf-mitigated";
static WAF_CHALLENGE_VALUE: &str = "challenge";

// Hosts which answer 404 for deleted (or renamed and then deleted) repositories
static DELETION_HOSTS: [&str; 6] = [
    "github.com",
    "gitlab.com",
    "codeberg.org",
    "bitbucket.org",
    "sourceforge.net",
    "sr.ht",
];

pub struct StatusClassifier {
    detectors: &'static [HostDetector],
}

impl Default for StatusClassifier {
    fn default() -> Self {
        Self::new(&HOST_DETECTORS)
    }
}

impl StatusClassifier {
    pub fn new(detectors: &'static [HostDetector]) -> Self {
        Self { detectors }
    }

    pub fn classify(&self, page: &FetchedPage) -> RepoCheck {
        if page.header(WAF_CHALLENGE_HEADER) == Some(WAF_CHALLENGE_VALUE) {
            log::info!("[tombstone.classifier] challenged by WAF at {}", page.final_url);
            return RepoCheck::failed(&page.final_url, CheckError::WafChallenge);
        }

        if page.status == 404 {
            return self.handle_not_found(page);
        }

        if page.status != 200 {
            log::info!(
                "[tombstone.classifier] unexpected status {} for {}",
                page.status,
                page.final_url
            );
            return RepoCheck::failed(&page.final_url, CheckError::HttpStatus(page.status));
        }

        let Ok(url) = Url::from_str(&page.final_url) else {
            return RepoCheck::failed(&page.final_url, CheckError::MalformedUrl(page.final_url.clone()));
        };

        for detector in self.detectors {
            if let Detection::Determined(check) = detector.detect(&url, page) {
                log::info!(
                    "[tombstone.classifier] {} detector owns {} (archived = {})",
                    detector.name,
                    page.final_url,
                    check.repo_archived()
                );
                return check;
            }
        }

        log::info!("[tombstone.classifier] no detector recognized {}", page.final_url);
        RepoCheck::failed(&page.final_url, CheckError::UnsupportedHost)
    }

    pub fn handle_not_found(&self, page: &FetchedPage) -> RepoCheck {
        let deletion_host = Url::from_str(&page.final_url)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
            .map(|host| {
                DELETION_HOSTS
                    .iter()
                    .any(|known| host == *known || host.ends_with(&format!(".{}", known)))
            })
            .unwrap_or(false);

        if deletion_host {
            log::info!("[tombstone.classifier] {} is gone", page.final_url);
            return RepoCheck::deleted(&page.final_url);
        }

        RepoCheck::failed(&page.final_url, CheckError::HttpStatus(page.status))
    }
}
