//! GraphQL documents and page extraction per entity

use repoharvest_core::{PageQuery, Parsed, Target};
use serde_json::{Value, json};

use crate::entity::Entity;
use crate::transform;

const PULL_REQUESTS_DOCUMENT: &str = r#"
query($owner: String!, $name: String!, $cursor: String) {
  repository(owner: $owner, name: $name) {
    pullRequests(first: 50, after: $cursor, orderBy: {field: CREATED_AT, direction: ASC}) {
      pageInfo { hasNextPage endCursor }
      edges {
        node {
          number
          title
          body
          createdAt
          mergedAt
          closedAt
          additions
          deletions
          changedFiles
          commits { totalCount }
          reviews(first: 50) { nodes { author { login } state } }
          assignees(first: 50) { nodes { login } }
        }
      }
    }
  }
}
"#;

const COMMITS_DOCUMENT: &str = r#"
query($owner: String!, $name: String!, $cursor: String) {
  repository(owner: $owner, name: $name) {
    defaultBranchRef {
      name
      target {
        ... on Commit {
          history(first: 50, after: $cursor) {
            pageInfo { hasNextPage endCursor }
            edges {
              node {
                oid
                committedDate
                messageHeadline
                messageBody
                author { name user { login } }
                additions
                deletions
                changedFiles
                parents { totalCount }
              }
            }
          }
        }
      }
    }
  }
}
"#;

const ISSUES_DOCUMENT: &str = r#"
query($owner: String!, $name: String!, $cursor: String) {
  repository(owner: $owner, name: $name) {
    issues(first: 50, after: $cursor, orderBy: {field: CREATED_AT, direction: ASC}) {
      pageInfo { hasNextPage endCursor }
      edges {
        node {
          number
          title
          body
          state
          createdAt
          closedAt
          assignees(first: 50) { nodes { login } }
          labels(first: 50) { nodes { name } }
          comments(first: 50) { nodes { author { login } } }
        }
      }
    }
  }
}
"#;

/// Query-and-projection strategy for one GitHub entity.
pub struct GithubQuery {
    entity: Entity,
}

impl GithubQuery {
    pub fn new(entity: Entity) -> Self {
        Self { entity }
    }
}

impl PageQuery for GithubQuery {
    fn document(&self) -> &str {
        match self.entity {
            Entity::PullRequests => PULL_REQUESTS_DOCUMENT,
            Entity::Commits => COMMITS_DOCUMENT,
            Entity::Issues => ISSUES_DOCUMENT,
        }
    }

    fn variables(&self, target: &Target, cursor: Option<&str>) -> Value {
        json!({ "owner": target.owner, "name": target.name, "cursor": cursor })
    }

    fn parse_page(&self, target: &Target, data: &Value) -> Result<Parsed, String> {
        let repository = match data.get("repository") {
            None => return Err("response carries no repository field".to_string()),
            Some(Value::Null) => return Ok(Parsed::MissingTarget),
            Some(repository) => repository,
        };
        match self.entity {
            Entity::PullRequests => transform::pull_request_page(target, repository),
            Entity::Commits => transform::commit_page(target, repository),
            Entity::Issues => transform::issue_page(target, repository),
        }
    }
}
