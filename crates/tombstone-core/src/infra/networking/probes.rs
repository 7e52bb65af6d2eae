// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use crate::domain::errors::CheckError;
use crate::domain::interfaces::{CommitProbing, ProbeOutcome};
use crate::domain::resolver::HostFamily;
use crate::infra::networking::http::HTTPClient;
use reqwest::StatusCode;

// GitHub renders commits reachable only from forks under the original repository path
static GITHUB_FOREIGN_COMMIT_WARNING: &str = "This commit does not belong to any branch on this repository";

pub struct HttpCommitProber {
    http_client: HTTPClient,
}

impl HttpCommitProber {
    pub fn new(http_client: HTTPClient) -> Self {
        Self { http_client }
    }

    async fn probe_github(&self, candidate: &str, commit: &str) -> Result<ProbeOutcome, CheckError> {
        let endpoint = format!("{}/commit/{}", candidate.trim_end_matches('/'), commit);
        let response = self.http_client.get(&endpoint).send().await?;

        match response.status() {
            StatusCode::OK => {
                let body = response.text().await?;
                if body.contains(GITHUB_FOREIGN_COMMIT_WARNING) {
                    log::info!("[tombstone.probes] {} only knows {} through a fork", candidate, commit);
                    return Ok(ProbeOutcome::NotSuccessor);
                }
                Ok(ProbeOutcome::Verified)
            },
            StatusCode::NOT_FOUND => Ok(ProbeOutcome::NotSuccessor),
            other => Ok(ProbeOutcome::Unexpected(other.as_u16())),
        }
    }

    async fn probe_gitlab(&self, candidate: &str, commit: &str) -> Result<ProbeOutcome, CheckError> {
        let endpoint = format!("{}/-/commit/{}", candidate.trim_end_matches('/'), commit);
        let response = self.http_client.head(&endpoint).send().await?;

        match response.status() {
            StatusCode::OK => Ok(ProbeOutcome::Verified),
            StatusCode::NOT_FOUND => Ok(ProbeOutcome::NotSuccessor),
            other => Ok(ProbeOutcome::Unexpected(other.as_u16())),
        }
    }
}

impl CommitProbing for HttpCommitProber {
    async fn probe(&self, family: HostFamily, candidate: &str, commit: &str) -> Result<ProbeOutcome, CheckError> {
        let outcome = match family {
            HostFamily::GitHub => self.probe_github(candidate, commit).await,
            HostFamily::GitLab => self.probe_gitlab(candidate, commit).await,
        };

        log::info!("[tombstone.probes] {} probe for {} : {:?}", family, candidate, outcome);
        outcome
    }
}
