// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use crate::domain::errors::CheckError;
use crate::domain::models::FetchedPage;
use crate::domain::resolver::HostFamily;

pub trait PageFetching {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, CheckError>;
}

/// What a verification probe learned about a candidate successor
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProbeOutcome {
    Verified,
    NotSuccessor,
    Unexpected(u16),
}

pub trait CommitProbing {
    async fn probe(&self, family: HostFamily, candidate: &str, commit: &str) -> Result<ProbeOutcome, CheckError>;
}
