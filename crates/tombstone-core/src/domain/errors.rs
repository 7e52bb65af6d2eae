// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Reasons why a repository check could not produce a trustworthy answer.
///
/// Every variant ends up stored in [`crate::domain::models::RepoCheck`], so the
/// payloads are plain owned values that can be cloned and compared.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CheckError {
    /// The hosting provider answered with an anti-bot challenge instead of the page
    #[error("anti-bot challenge detected (WAF)")]
    WafChallenge,

    #[error("HTTP status code: {0}")]
    HttpStatus(u16),

    #[error("unknown or unsupported host")]
    UnsupportedHost,

    /// A detector recognized the host, but the page was rendered in another language
    #[error("{detector} page is not rendered in English, cannot read archival markers")]
    LocaleMismatch { detector: String },

    #[error("transport failure : {0}")]
    Transport(String),

    #[error("cannot verify relocation : {0}")]
    MoveVerification(String),

    #[error("malformed repository url : {0}")]
    MalformedUrl(String),
}

#[cfg(test)]
mod tests {
    use crate::domain::errors::CheckError;
    use assertor::EqualityAssertion;

    #[test]
    fn should_describe_errors_for_checkpoints() {
        let scenarios = vec![
            (CheckError::HttpStatus(503), "HTTP status code: 503"),
            (CheckError::UnsupportedHost, "unknown or unsupported host"),
            (
                CheckError::LocaleMismatch {
                    detector: "gitea".to_string(),
                },
                "gitea page is not rendered in English, cannot read archival markers",
            ),
        ];

        for (error, expected) in scenarios {
            assertor::assert_that!(error.to_string()).is_equal_to(expected.to_string());
        }
    }
}
