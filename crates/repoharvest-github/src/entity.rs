//! Harvested entity kinds and their destination schemas

/// Entity types harvestable from a repository.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Entity {
    PullRequests,
    Commits,
    Issues,
}

impl Entity {
    /// Parse CLI/config string into enum
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "pull-requests" | "prs" => Some(Self::PullRequests),
            "commits" => Some(Self::Commits),
            "issues" => Some(Self::Issues),
            _ => None,
        }
    }

    pub fn all() -> [Self; 3] {
        [Self::PullRequests, Self::Commits, Self::Issues]
    }

    /// Filename stem for the entity's destination CSV
    pub fn file_prefix(self) -> &'static str {
        match self {
            Self::PullRequests => "pull_requests",
            Self::Commits => "commits",
            Self::Issues => "issues",
        }
    }

    /// Destination column order, fixed at sink initialization and never
    /// altered mid-run.
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Self::PullRequests => &[
                "owner",
                "repo",
                "pr_number",
                "title",
                "body",
                "created_at",
                "merged_at",
                "closed_at",
                "additions",
                "deletions",
                "changed_files",
                "commits_count",
                "reviewers",
                "assignees",
            ],
            Self::Commits => &[
                "owner",
                "repo",
                "sha",
                "committed_date",
                "author_login",
                "author_name",
                "message_headline",
                "message_body",
                "lines_added",
                "lines_deleted",
                "files_changed",
                "parent_count",
            ],
            Self::Issues => &[
                "owner",
                "repo",
                "issue_number",
                "title",
                "body",
                "state",
                "created_at",
                "closed_at",
                "assignees",
                "labels",
                "comment_authors",
            ],
        }
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::PullRequests => "pull-requests",
            Self::Commits => "commits",
            Self::Issues => "issues",
        };
        f.write_str(s)
    }
}
