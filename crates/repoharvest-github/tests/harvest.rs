//! Harvest flow against canned GitHub-shaped responses: the engine loop
//! driving the real entity strategies, no network.

use std::sync::Mutex;
use std::time::Duration;

use serde_json::{Value, json};
use tempfile::TempDir;

use repoharvest_core::{CsvSink, FailureKind, FetchError, JobOutcome, Target, run_job};
use repoharvest_github::{Entity, GithubQuery};

fn pr_node(number: i64) -> Value {
    json!({
        "number": number,
        "title": format!("PR {number}"),
        "body": "text",
        "createdAt": "2024-01-01T00:00:00Z",
        "mergedAt": null,
        "closedAt": null,
        "additions": 1,
        "deletions": 0,
        "changedFiles": 1,
        "commits": { "totalCount": 1 },
        "reviews": { "nodes": [] },
        "assignees": { "nodes": [] }
    })
}

fn pr_body(numbers: &[i64], has_next: bool, cursor: Option<&str>) -> Value {
    let edges: Vec<Value> = numbers.iter().map(|n| json!({ "node": pr_node(*n) })).collect();
    json!({ "data": { "repository": { "pullRequests": {
        "pageInfo": { "hasNextPage": has_next, "endCursor": cursor },
        "edges": edges,
    }}}})
}

#[test]
fn pull_requests_stream_across_pages() {
    let dir = TempDir::new().unwrap();
    let entity = Entity::PullRequests;
    let path = dir.path().join("pull_requests.csv");
    let sink = CsvSink::open(&path, entity.columns()).unwrap();
    let query = GithubQuery::new(entity);

    let seen_cursors: Mutex<Vec<Option<String>>> = Mutex::new(Vec::new());
    let outcome = run_job(
        |_, _, vars| {
            let cursor = vars["cursor"].as_str().map(String::from);
            seen_cursors.lock().unwrap().push(cursor.clone());
            match cursor.as_deref() {
                None => Ok(pr_body(&[1, 2], true, Some("p1"))),
                Some("p1") => Ok(pr_body(&[3], false, None)),
                other => panic!("unexpected cursor {other:?}"),
            }
        },
        &query,
        &Target::new("octo", "repo"),
        &sink,
        Duration::ZERO,
    );

    assert!(matches!(outcome, JobOutcome::Exhausted { rows: 3, pages: 2 }));
    assert_eq!(
        *seen_cursors.lock().unwrap(),
        vec![None, Some("p1".to_string())]
    );
    drop(sink);

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(&headers[2], "pr_number");
    let numbers: Vec<String> = reader
        .records()
        .map(|r| r.unwrap()[2].to_string())
        .collect();
    assert_eq!(numbers, ["1", "2", "3"]);
}

#[test]
fn missing_repository_fails_the_job() {
    let dir = TempDir::new().unwrap();
    let entity = Entity::Issues;
    let sink = CsvSink::open(&dir.path().join("issues.csv"), entity.columns()).unwrap();
    let query = GithubQuery::new(entity);

    let outcome = run_job(
        |_, _, _| Ok(json!({ "data": { "repository": null } })),
        &query,
        &Target::new("octo", "gone"),
        &sink,
        Duration::ZERO,
    );

    match outcome {
        JobOutcome::Failed { kind, .. } => assert_eq!(kind, FailureKind::TargetUnavailable),
        other => panic!("expected Failed, got {other:?}"),
    }
    assert_eq!(sink.rows_appended(), 0);
}

#[test]
fn repository_without_default_branch_yields_no_commits() {
    let dir = TempDir::new().unwrap();
    let entity = Entity::Commits;
    let sink = CsvSink::open(&dir.path().join("commits.csv"), entity.columns()).unwrap();
    let query = GithubQuery::new(entity);

    let outcome = run_job(
        |_, _, _| {
            Ok(json!({ "data": { "repository": { "defaultBranchRef": null } } }))
        },
        &query,
        &Target::new("octo", "empty"),
        &sink,
        Duration::ZERO,
    );

    assert!(matches!(outcome, JobOutcome::Exhausted { rows: 0, .. }));
}

#[test]
fn budget_exhaustion_keeps_earlier_pages() {
    let dir = TempDir::new().unwrap();
    let entity = Entity::PullRequests;
    let path = dir.path().join("pull_requests.csv");
    let sink = CsvSink::open(&path, entity.columns()).unwrap();
    let query = GithubQuery::new(entity);

    let outcome = run_job(
        |_, _, vars| {
            if vars["cursor"].is_null() {
                Ok(pr_body(&[1, 2], true, Some("p1")))
            } else {
                Err(FetchError::Budget {
                    attempts: 5,
                    last: "HTTP 502".to_string(),
                })
            }
        },
        &query,
        &Target::new("octo", "repo"),
        &sink,
        Duration::ZERO,
    );

    match outcome {
        JobOutcome::Failed { kind, .. } => assert_eq!(kind, FailureKind::RetriesExhausted),
        other => panic!("expected Failed, got {other:?}"),
    }
    // First page already flushed; the failed page contributed nothing
    assert_eq!(sink.rows_appended(), 2);
}
