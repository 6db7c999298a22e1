//! Typed GraphQL nodes and node → row projection
//!
//! Null string fields (bodies, close timestamps, missing authors) project
//! to the empty string; collection fields flatten to comma-joined lists.

use repoharvest_core::{Page, Parsed, Row, Target};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

#[derive(Deserialize)]
struct Connection<T> {
    #[serde(rename = "pageInfo")]
    page_info: PageInfo,
    edges: Vec<Edge<T>>,
}

#[derive(Deserialize)]
struct PageInfo {
    #[serde(rename = "hasNextPage")]
    has_next_page: bool,
    #[serde(rename = "endCursor")]
    end_cursor: Option<String>,
}

#[derive(Deserialize)]
struct Edge<T> {
    node: T,
}

#[derive(Deserialize)]
struct Nodes<T> {
    nodes: Vec<T>,
}

#[derive(Deserialize)]
struct Login {
    login: String,
}

#[derive(Deserialize)]
struct TotalCount {
    #[serde(rename = "totalCount")]
    total_count: i64,
}

/// Deserialize one connection object and project every node to a row.
fn connection_page<T, F>(value: &Value, what: &str, project: F) -> Result<Parsed, String>
where
    T: DeserializeOwned,
    F: Fn(T) -> Row,
{
    let connection: Connection<T> = serde_json::from_value(value.clone())
        .map_err(|e| format!("{what} page has unexpected shape: {e}"))?;
    let rows = connection
        .edges
        .into_iter()
        .map(|edge| project(edge.node))
        .collect();
    Ok(Parsed::Page(Page {
        rows,
        has_next: connection.page_info.has_next_page,
        end_cursor: connection.page_info.end_cursor,
    }))
}

// === Pull requests ===

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PullRequestNode {
    number: i64,
    title: String,
    body: Option<String>,
    created_at: String,
    merged_at: Option<String>,
    closed_at: Option<String>,
    additions: i64,
    deletions: i64,
    changed_files: i64,
    commits: TotalCount,
    reviews: Nodes<Review>,
    assignees: Nodes<Login>,
}

#[derive(Deserialize)]
struct Review {
    // Deleted accounts review with a null author; those reviews are skipped
    author: Option<Login>,
}

pub(crate) fn pull_request_page(target: &Target, repository: &Value) -> Result<Parsed, String> {
    let connection = match repository.get("pullRequests") {
        Some(v) if !v.is_null() => v,
        _ => return Err("repository has no pullRequests connection".to_string()),
    };
    connection_page(connection, "pullRequests", |node: PullRequestNode| {
        let reviewers: Vec<&str> = node
            .reviews
            .nodes
            .iter()
            .filter_map(|review| review.author.as_ref().map(|a| a.login.as_str()))
            .collect();
        let assignees: Vec<&str> = node
            .assignees
            .nodes
            .iter()
            .map(|a| a.login.as_str())
            .collect();
        vec![
            target.owner.clone(),
            target.name.clone(),
            node.number.to_string(),
            node.title,
            node.body.unwrap_or_default(),
            node.created_at,
            node.merged_at.unwrap_or_default(),
            node.closed_at.unwrap_or_default(),
            node.additions.to_string(),
            node.deletions.to_string(),
            node.changed_files.to_string(),
            node.commits.total_count.to_string(),
            reviewers.join(","),
            assignees.join(","),
        ]
    })
}

// === Commit history ===

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommitNode {
    oid: String,
    committed_date: String,
    message_headline: String,
    message_body: Option<String>,
    author: Option<CommitAuthor>,
    additions: i64,
    deletions: i64,
    changed_files: i64,
    parents: TotalCount,
}

#[derive(Deserialize)]
struct CommitAuthor {
    name: Option<String>,
    user: Option<Login>,
}

pub(crate) fn commit_page(target: &Target, repository: &Value) -> Result<Parsed, String> {
    // A repository without a default branch has no history to walk
    let branch_ref = match repository.get("defaultBranchRef") {
        Some(v) if !v.is_null() => v,
        _ => return Ok(Parsed::NothingToHarvest),
    };
    let history = match branch_ref.pointer("/target/history") {
        Some(v) if !v.is_null() => v,
        _ => return Err("defaultBranchRef target carries no commit history".to_string()),
    };
    connection_page(history, "history", |node: CommitNode| {
        let author_login = node
            .author
            .as_ref()
            .and_then(|a| a.user.as_ref())
            .map(|u| u.login.clone())
            .unwrap_or_default();
        let author_name = node
            .author
            .as_ref()
            .and_then(|a| a.name.clone())
            .unwrap_or_default();
        vec![
            target.owner.clone(),
            target.name.clone(),
            node.oid,
            node.committed_date,
            author_login,
            author_name,
            node.message_headline,
            node.message_body.unwrap_or_default(),
            node.additions.to_string(),
            node.deletions.to_string(),
            node.changed_files.to_string(),
            node.parents.total_count.to_string(),
        ]
    })
}

// === Issues ===

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IssueNode {
    number: i64,
    title: String,
    body: Option<String>,
    state: String,
    created_at: String,
    closed_at: Option<String>,
    assignees: Nodes<Login>,
    labels: Nodes<Label>,
    comments: Nodes<Comment>,
}

#[derive(Deserialize)]
struct Label {
    name: String,
}

#[derive(Deserialize)]
struct Comment {
    author: Option<Login>,
}

pub(crate) fn issue_page(target: &Target, repository: &Value) -> Result<Parsed, String> {
    let connection = match repository.get("issues") {
        Some(v) if !v.is_null() => v,
        _ => return Err("repository has no issues connection".to_string()),
    };
    connection_page(connection, "issues", |node: IssueNode| {
        let assignees: Vec<&str> = node
            .assignees
            .nodes
            .iter()
            .map(|a| a.login.as_str())
            .collect();
        let labels: Vec<&str> = node.labels.nodes.iter().map(|l| l.name.as_str()).collect();
        let comment_authors: Vec<&str> = node
            .comments
            .nodes
            .iter()
            .filter_map(|c| c.author.as_ref().map(|a| a.login.as_str()))
            .collect();
        vec![
            target.owner.clone(),
            target.name.clone(),
            node.number.to_string(),
            node.title,
            node.body.unwrap_or_default(),
            node.state,
            node.created_at,
            node.closed_at.unwrap_or_default(),
            assignees.join(","),
            labels.join(","),
            comment_authors.join(","),
        ]
    })
}
