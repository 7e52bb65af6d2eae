// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use crate::domain::errors::CheckError;
use crate::domain::models::{FetchedPage, RepoCheck};
use url::Url;

static GITHUB_ARCHIVED_NOTICE: &str = "his repository has been archived by the";
static GITHUB_READ_ONLY_NOTICE: &str = "It is now read-only.";

static GITLAB_SESSION_COOKIE: &str = "_gitlab_session";
static GITLAB_ARCHIVED_NOTICE: &str =
    "This is an archived project. Repository and other project resources are read-only.";

static GITEA_FOOTER: &str = "Powered by Gitea";
static GITEA_OFFICIAL_SITE: &str = "https://about.gitea.com";
static GITEA_PUBLIC_INSTANCES: [&str; 2] = ["codeberg.org", "gitea.com"];
static GITEA_LOCALE_MARKER: &str = "English";
static GITEA_ARCHIVED_NOTICE: &str = "This repository has been archived on";
static GITEA_READ_ONLY_NOTICE: &str =
    "You can view files and clone it, but cannot push or open issues or pull requests.";

// https://gitee.com/help/articles/4343
static GITEE_CLOSED_NOTICE: &str = "当前仓库属于关闭状态";
static GITEE_SUSPENDED_NOTICE: &str = "当前仓库属于暂停状态";

/// Whether a detector recognized the page
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Detection {
    NotApplicable,
    Determined(RepoCheck),
}

/// A host-specific rule : a predicate telling whether the page belongs to the host,
/// and an extractor reading the archival marker once it does.
pub struct HostDetector {
    pub name: &'static str,
    applies: fn(&Url, &FetchedPage) -> bool,
    archived: fn(&FetchedPage) -> Result<bool, CheckError>,
}

impl HostDetector {
    pub fn detect(&self, url: &Url, page: &FetchedPage) -> Detection {
        if !(self.applies)(url, page) {
            return Detection::NotApplicable;
        }

        let check = match (self.archived)(page) {
            Ok(archived) => RepoCheck::determined(&page.final_url, archived),
            Err(error) => RepoCheck::failed(&page.final_url, error),
        };

        Detection::Determined(check)
    }
}

/// Detectors in priority order; the first one whose predicate matches owns the page
pub static HOST_DETECTORS: [HostDetector; 4] = [
    HostDetector {
        name: "github",
        applies: is_github_repository,
        archived: github_archived,
    },
    HostDetector {
        name: "gitlab",
        applies: is_gitlab_page,
        archived: gitlab_archived,
    },
    HostDetector {
        name: "gitea",
        applies: is_gitea_page,
        archived: gitea_archived,
    },
    HostDetector {
        name: "gitee",
        applies: is_gitee_page,
        archived: gitee_archived,
    },
];

pub(crate) fn served_by(url: &Url, domain: &str) -> bool {
    match url.host_str() {
        Some(host) => host == domain || host.strip_prefix("www.") == Some(domain),
        None => false,
    }
}

fn is_github_repository(url: &Url, _: &FetchedPage) -> bool {
    let owner_and_repo = url
        .path_segments()
        .map(|segments| segments.filter(|segment| !segment.is_empty()).count() >= 2)
        .unwrap_or(false);

    served_by(url, "github.com") && owner_and_repo
}

fn github_archived(page: &FetchedPage) -> Result<bool, CheckError> {
    Ok(page.mentions(GITHUB_ARCHIVED_NOTICE) && page.mentions(GITHUB_READ_ONLY_NOTICE))
}

fn is_gitlab_page(url: &Url, page: &FetchedPage) -> bool {
    served_by(url, "gitlab.com") || page.has_cookie(GITLAB_SESSION_COOKIE)
}

fn gitlab_archived(page: &FetchedPage) -> Result<bool, CheckError> {
    Ok(page.mentions(GITLAB_ARCHIVED_NOTICE))
}

fn is_gitea_page(url: &Url, page: &FetchedPage) -> bool {
    let advertises_gitea = page.mentions(GITEA_FOOTER) && page.mentions(GITEA_OFFICIAL_SITE);
    let known_instance = GITEA_PUBLIC_INSTANCES
        .iter()
        .any(|instance| served_by(url, instance));

    advertises_gitea || known_instance
}

fn gitea_archived(page: &FetchedPage) -> Result<bool, CheckError> {
    if !page.mentions(GITEA_LOCALE_MARKER) {
        return Err(CheckError::LocaleMismatch {
            detector: "gitea".to_string(),
        });
    }

    Ok(page.mentions(GITEA_ARCHIVED_NOTICE) && page.mentions(GITEA_READ_ONLY_NOTICE))
}

fn is_gitee_page(url: &Url, _: &FetchedPage) -> bool {
    served_by(url, "gitee.com")
}

fn gitee_archived(page: &FetchedPage) -> Result<bool, CheckError> {
    Ok(page.mentions(GITEE_CLOSED_NOTICE) || page.mentions(GITEE_SUSPENDED_NOTICE))
}
