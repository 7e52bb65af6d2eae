// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use crate::domain::capabilities::CommitProber;
use crate::domain::errors::CheckError;
use crate::domain::interfaces::{CommitProbing, ProbeOutcome};
use crate::domain::models::{FetchedPage, RepoCheck};
use regex::Regex;
use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::sync::LazyLock;

/// Hosting platforms where relocated repositories can be searched and verified
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HostFamily {
    GitHub,
    GitLab,
}

struct FamilyPatterns {
    base_url: &'static str,
    repository: Regex,
    denylist: Regex,
}

static GITHUB_PATTERNS: LazyLock<FamilyPatterns> = LazyLock::new(|| FamilyPatterns {
    base_url: "https://github.com",
    repository: Regex::new(r"https?://(?:www\.)?github\.com/([A-Za-z0-9][A-Za-z0-9-]*/[A-Za-z0-9_.-]+)")
        .expect("valid github repository pattern"),
    denylist: Regex::new(
        r"(?i)^(about|apps|collections|contact|customer-stories|codespaces|enterprise|events|explore|features|github|join|login|marketplace|new|notifications|organizations|orgs|pricing|readme|resources|security|settings|signup|site|solutions|sponsors|team|topics|trending|users)/",
    )
    .expect("valid github denylist pattern"),
});

static GITLAB_PATTERNS: LazyLock<FamilyPatterns> = LazyLock::new(|| FamilyPatterns {
    base_url: "https://gitlab.com",
    repository: Regex::new(r"https?://(?:www\.)?gitlab\.com/([A-Za-z0-9][A-Za-z0-9_.-]*(?:/[A-Za-z0-9_.-]+)+)")
        .expect("valid gitlab repository pattern"),
    denylist: Regex::new(
        r"(?i)^((admin|api|assets|dashboard|explore|groups|help|profile|projects|search|uploads|users|gitlab-com)/|gitlab-org/gitlab(-foss)?$)",
    )
    .expect("valid gitlab denylist pattern"),
});

impl HostFamily {
    pub const ALL: [HostFamily; 2] = [HostFamily::GitHub, HostFamily::GitLab];

    fn patterns(&self) -> &'static FamilyPatterns {
        match self {
            HostFamily::GitHub => &GITHUB_PATTERNS,
            HostFamily::GitLab => &GITLAB_PATTERNS,
        }
    }

    fn canonical_repositories(&self, text: &str) -> Vec<String> {
        let patterns = self.patterns();
        patterns
            .repository
            .captures_iter(text)
            .filter_map(|captures| {
                let path = self.repository_path(captures.get(1)?.as_str())?;
                if patterns.denylist.is_match(&path) {
                    return None;
                }

                Some(format!("{}/{}", patterns.base_url, path))
            })
            .collect()
    }

    /// Namespace and repository name out of a matched URL path, without any subpage
    fn repository_path(&self, matched: &str) -> Option<String> {
        let segments = matched.split('/').filter(|segment| !segment.is_empty());

        let mut segments = match self {
            HostFamily::GitHub => segments.take(2).collect::<Vec<_>>(),
            // GitLab groups nest, and every subpage lives behind a `-` segment
            HostFamily::GitLab => segments.take_while(|segment| *segment != "-").collect::<Vec<_>>(),
        };

        let repository = segments.pop()?.trim_end_matches('.');
        let repository = repository.strip_suffix(".git").unwrap_or(repository);

        if repository.is_empty() || segments.is_empty() {
            return None;
        }

        segments.push(repository);
        Some(segments.join("/"))
    }

    /// Successor candidates mentioned by the page, deduplicated and without the page's own repository
    pub fn candidates(&self, page: &FetchedPage) -> Vec<String> {
        let originals = self
            .canonical_repositories(&page.final_url)
            .into_iter()
            .map(|url| url.to_lowercase())
            .collect::<HashSet<_>>();

        let mut seen = HashSet::new();
        self.canonical_repositories(&page.body)
            .into_iter()
            .filter(|candidate| !originals.contains(&candidate.to_lowercase()))
            .filter(|candidate| seen.insert(candidate.to_lowercase()))
            .collect()
    }
}

impl Display for HostFamily {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            HostFamily::GitHub => f.write_str("github"),
            HostFamily::GitLab => f.write_str("gitlab"),
        }
    }
}

pub struct MoveResolver {
    prober: CommitProber,
}

impl MoveResolver {
    pub fn new(prober: CommitProber) -> Self {
        Self { prober }
    }

    /// Looks for a verified new home of an archived repository.
    ///
    /// At most one of `moved_to` or `error` is added to the given check. When no candidate
    /// verifies but some probe failed, the check is downgraded to unconfirmed since the
    /// relocation question stays open.
    pub async fn resolve(&self, check: RepoCheck, page: &FetchedPage, commit: &str) -> RepoCheck {
        if !check.repo_archived() {
            return check;
        }

        let mut pending_error = None;

        for family in HostFamily::ALL {
            for candidate in family.candidates(page) {
                log::info!("[tombstone.resolver] probing {} candidate {}", family, candidate);

                match self.prober.probe(family, &candidate, commit).await {
                    Ok(ProbeOutcome::Verified) => {
                        log::info!("[tombstone.resolver] {} moved to {}", page.final_url, candidate);
                        return check.relocated(candidate);
                    },
                    Ok(ProbeOutcome::NotSuccessor) => continue,
                    Ok(ProbeOutcome::Unexpected(status)) => {
                        let reason = format!("{} answered with HTTP status {}", candidate, status);
                        pending_error = Some(CheckError::MoveVerification(reason));
                    },
                    Err(incoming) => {
                        let reason = format!("{} cannot be probed ({})", candidate, incoming);
                        pending_error = Some(CheckError::MoveVerification(reason));
                    },
                }
            }
        }

        match pending_error {
            Some(error) => {
                log::info!("[tombstone.resolver] relocation undecided for {} : {}", page.final_url, error);
                check.downgraded(error)
            },
            None => check,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::capabilities::{CommitProber, FakeCommitProber};
    use crate::domain::errors::CheckError;
    use crate::domain::interfaces::ProbeOutcome;
    use crate::domain::models::{FetchedPage, RepoCheck};
    use crate::domain::resolver::{HostFamily, MoveResolver};
    use assertor::{BooleanAssertion, EqualityAssertion};

    static ARCHIVED_URL: &str = "https://github.com/old-owner/project";
    static COMMIT: &str = "bbd8b099ea52bf4de18051d012c8113cf0dca23a";

    fn archived_page(body: &str) -> FetchedPage {
        FetchedPage::new(200, ARCHIVED_URL, body)
    }

    #[test]
    fn should_extract_github_candidates() {
        let body = r#"
            <a href="https://github.com/old-owner/project/issues">Issues</a>
            <a href="https://github.com/features/actions">Actions</a>
            This repository has moved to https://github.com/new-owner/project.
            Clone with https://github.com/new-owner/project.git
            Mirror at https://www.github.com/mirrors/project
        "#;

        let candidates = HostFamily::GitHub.candidates(&archived_page(body));

        let expected = vec![
            "https://github.com/new-owner/project".to_string(),
            "https://github.com/mirrors/project".to_string(),
        ];
        assertor::assert_that!(candidates).is_equal_to(expected);
    }

    #[test]
    fn should_extract_gitlab_candidates() {
        let body = r#"
            Development continues at https://gitlab.com/new-group/project
            See https://gitlab.com/users/sign_in and https://gitlab.com/gitlab-org/gitlab
        "#;

        let candidates = HostFamily::GitLab.candidates(&archived_page(body));

        assertor::assert_that!(candidates).is_equal_to(vec!["https://gitlab.com/new-group/project".to_string()]);
    }

    #[test]
    fn should_keep_nested_gitlab_namespaces() {
        let body = r#"
            Moved to https://gitlab.com/group/sub/new-project/-/tree/main
            Old home https://gitlab.com/group/sub/old-project
            Sibling https://gitlab.com/group/sub/tooling.git
        "#;
        let page = FetchedPage::new(200, "https://gitlab.com/group/sub/old-project", body);

        let candidates = HostFamily::GitLab.candidates(&page);

        let expected = vec![
            "https://gitlab.com/group/sub/new-project".to_string(),
            "https://gitlab.com/group/sub/tooling".to_string(),
        ];
        assertor::assert_that!(candidates).is_equal_to(expected);
    }

    #[tokio::test]
    async fn should_resolve_verified_successor() {
        let successor = "https://github.com/new-owner/project";
        let page = archived_page(&format!("Moved to {}", successor));
        let prober = FakeCommitProber::default().answering(successor, Ok(ProbeOutcome::Verified));
        let resolver = MoveResolver::new(CommitProber::Fake(prober));

        let resolved = resolver
            .resolve(RepoCheck::determined(ARCHIVED_URL, true), &page, COMMIT)
            .await;

        let expected = RepoCheck::determined(ARCHIVED_URL, true).relocated(successor.to_string());
        assertor::assert_that!(resolved).is_equal_to(expected);
    }

    #[tokio::test]
    async fn should_keep_scanning_after_failed_probe() {
        let broken = "https://github.com/fork-owner/project";
        let successor = "https://gitlab.com/new-group/project";
        let page = archived_page(&format!("See {} or {}", broken, successor));
        let prober = FakeCommitProber::default()
            .answering(broken, Ok(ProbeOutcome::Unexpected(429)))
            .answering(successor, Ok(ProbeOutcome::Verified));
        let resolver = MoveResolver::new(CommitProber::Fake(prober));

        let resolved = resolver
            .resolve(RepoCheck::determined(ARCHIVED_URL, true), &page, COMMIT)
            .await;

        assertor::assert_that!(resolved.confirmed()).is_true();
        assertor::assert_that!(resolved.moved_to()).is_equal_to(Some(successor));
        assertor::assert_that!(resolved.error()).is_equal_to(None);
    }

    #[tokio::test]
    async fn should_downgrade_when_relocation_cannot_be_verified() {
        let broken = "https://github.com/fork-owner/project";
        let page = archived_page(&format!("See {}", broken));
        let prober =
            FakeCommitProber::default().answering(broken, Err(CheckError::Transport("timed out".to_string())));
        let resolver = MoveResolver::new(CommitProber::Fake(prober));

        let resolved = resolver
            .resolve(RepoCheck::determined(ARCHIVED_URL, true), &page, COMMIT)
            .await;

        assertor::assert_that!(resolved.confirmed()).is_false();
        assertor::assert_that!(resolved.repo_archived()).is_true();
        assertor::assert_that!(resolved.moved_to()).is_equal_to(None);
        assertor::assert_that!(resolved.error().is_some()).is_true();
    }

    #[tokio::test]
    async fn should_keep_archived_verdict_when_no_candidate_matches() {
        let page = archived_page("Maybe https://github.com/someone/else or https://github.com/another/one");
        let resolver = MoveResolver::new(CommitProber::Fake(FakeCommitProber::default()));

        let resolved = resolver
            .resolve(RepoCheck::determined(ARCHIVED_URL, true), &page, COMMIT)
            .await;

        assertor::assert_that!(resolved).is_equal_to(RepoCheck::determined(ARCHIVED_URL, true));
    }

    #[tokio::test]
    async fn should_never_probe_active_repositories() {
        let successor = "https://github.com/new-owner/project";
        let page = archived_page(&format!("Moved to {}", successor));
        let prober = FakeCommitProber::default().answering(successor, Ok(ProbeOutcome::Verified));
        let calls = prober.calls();
        let resolver = MoveResolver::new(CommitProber::Fake(prober));

        let resolved = resolver
            .resolve(RepoCheck::determined(ARCHIVED_URL, false), &page, COMMIT)
            .await;

        assertor::assert_that!(resolved.moved_to()).is_equal_to(None);
        assertor::assert_that!(calls.load(std::sync::atomic::Ordering::SeqCst)).is_equal_to(0);
    }
}
