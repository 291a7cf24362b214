//! Redmine integration for the relay.
//!
//! Lists the issues of one project through the REST API (`issues.json`),
//! following pages until the whole list has been read.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_with::{DefaultOnError, DefaultOnNull, NoneAsEmptyString, serde_as};
use tracing::{debug, info, instrument};

use crate::base::{
    config::Config,
    error::FetchError,
    templates,
    types::{Issue, Journal, Res},
};

use super::{GenericTrackerClient, TrackerClient};

/// Header carrying the Redmine API key.
const API_KEY_HEADER: &str = "X-Redmine-API-Key";

/// Maximum number of body characters kept in a status error.
const ERROR_BODY_LIMIT: usize = 200;

// Extra methods on `TrackerClient` applied by the redmine implementation.

impl TrackerClient {
    /// Creates a new Redmine tracker client.
    pub fn redmine(config: &Config) -> Res<Self> {
        let client = RedmineTrackerClient::new(config)?;
        Ok(Self { inner: Arc::new(client) })
    }
}

// Wire types.

#[derive(Debug, Deserialize)]
struct IssuesPage {
    issues: Vec<RedmineIssue>,
    total_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct NamedRef {
    name: String,
}

#[serde_as]
#[derive(Debug, Deserialize)]
struct RedmineIssue {
    id: u64,
    #[serde(default)]
    subject: String,
    priority: Option<NamedRef>,
    assigned_to: Option<NamedRef>,
    status: Option<NamedRef>,
    /// Kept raw: a bad value only costs this issue its creation line.
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    created_on: Option<String>,
    updated_on: DateTime<Utc>,
    due_date: Option<String>,
    #[serde(default)]
    journals: Vec<RedmineJournal>,
}

#[serde_as]
#[derive(Debug, Deserialize)]
struct RedmineJournal {
    user: Option<NamedRef>,
    #[serde_as(as = "DefaultOnNull<NoneAsEmptyString>")]
    #[serde(default)]
    notes: Option<String>,
}

impl From<RedmineJournal> for Journal {
    fn from(journal: RedmineJournal) -> Self {
        Journal {
            author: journal.user.map(|u| u.name).unwrap_or_else(|| templates::UNKNOWN_AUTHOR.to_string()),
            notes: journal.notes,
        }
    }
}

impl From<RedmineIssue> for Issue {
    fn from(issue: RedmineIssue) -> Self {
        Issue {
            id: issue.id,
            subject: issue.subject,
            priority: issue.priority.map(|p| p.name).unwrap_or_else(|| templates::NO_PRIORITY.to_string()),
            assignee: issue.assigned_to.map(|a| a.name).unwrap_or_else(|| templates::UNASSIGNED.to_string()),
            status: issue.status.map(|s| s.name).unwrap_or_else(|| templates::NO_STATUS.to_string()),
            created_on: issue.created_on.filter(|c| !c.trim().is_empty()),
            updated_on: issue.updated_on,
            due_date: issue.due_date.filter(|d| !d.trim().is_empty()),
            journals: issue.journals.into_iter().map(Journal::from).collect(),
        }
    }
}

// Specific implementations.

/// Redmine tracker client implementation.
#[derive(Clone)]
pub struct RedmineTrackerClient {
    client: reqwest::Client,
    config: Config,
}

impl RedmineTrackerClient {
    /// Create a new Redmine tracker client.
    #[instrument(name = "RedmineTrackerClient::new", skip_all)]
    pub fn new(config: &Config) -> Res<Self> {
        let client = reqwest::Client::builder().timeout(config.http_timeout()).build()?;

        Ok(Self { client, config: config.clone() })
    }

    /// Fetch a single page of issues starting at `offset`.
    #[instrument(name = "RedmineTrackerClient::fetch_page", skip(self))]
    async fn fetch_page(&self, offset: u64) -> Result<IssuesPage, FetchError> {
        let url = format!("{}/issues.json", self.config.redmine_url);
        let limit = self.config.redmine_page_size.to_string();
        let offset = offset.to_string();

        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.config.redmine_api_key)
            .query(&[
                ("project_id", self.config.redmine_project_id.as_str()),
                ("include", "journals"),
                ("sort", "id"),
                ("limit", limit.as_str()),
                ("offset", offset.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: body.chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }

        let bytes = response.bytes().await?;
        let page: IssuesPage = serde_json::from_slice(&bytes)?;

        Ok(page)
    }
}

#[async_trait]
impl GenericTrackerClient for RedmineTrackerClient {
    #[instrument(skip(self), fields(project = %self.config.redmine_project_id))]
    async fn fetch_issues(&self) -> Result<Vec<Issue>, FetchError> {
        let mut issues = Vec::new();
        let mut offset = 0u64;
        let mut expected_total = None;

        loop {
            let page = self.fetch_page(offset).await?;
            let received = page.issues.len() as u64;

            // A changed total means pages moved under us and an issue may have been skipped.
            if let (Some(expected), Some(actual)) = (expected_total, page.total_count)
                && expected != actual
            {
                return Err(FetchError::Shifted { expected, actual });
            }
            expected_total = expected_total.or(page.total_count);

            issues.extend(page.issues.into_iter().map(Issue::from));
            offset += received;

            debug!("Received {} issues (offset {}, total {:?})", received, offset, page.total_count);

            match page.total_count {
                Some(total) if received > 0 && offset < total => continue,
                _ => break,
            }
        }

        info!("Fetched {} issues from Redmine", issues.len());

        Ok(issues)
    }
}

// Tests.
