//! Jira Server/DC 8.x REST client (`{base_url}/rest/api/2`).

use crate::client::Transport;
use crate::config::BackendConfig;
use crate::error::Result;
use reqwest::Method;
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::time::Duration;

const API_PREFIX: &str = "/rest/api/2";

pub struct JiraClient {
    transport: Transport,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    jql: &'a str,
    max_results: u64,
    start_at: u64,
}

impl JiraClient {
    /// # Errors
    ///
    /// Returns `Error::Config` if the underlying HTTP client cannot be built.
    pub fn new(config: BackendConfig, timeout: Duration) -> Result<Self> {
        Ok(Self {
            transport: Transport::new(config, API_PREFIX, timeout)?,
        })
    }

    /// Fetch one issue, optionally restricted to a comma-separated field list.
    ///
    /// # Errors
    ///
    /// `Error::Http` on any non-2xx status (404 for an unknown key),
    /// `Error::Transport` on network failure.
    pub async fn get_issue(&self, issue_key: &str, fields: Option<&str>) -> Result<Value> {
        let mut req = self
            .transport
            .request(Method::GET, &format!("/issue/{issue_key}"));
        if let Some(fields) = fields {
            req = req.query(&[("fields", fields)]);
        }
        self.transport.execute(req).await
    }

    /// Search issues by JQL. POST is used so long queries never hit URL
    /// length limits; the JQL string is passed through uninterpreted.
    ///
    /// # Errors
    ///
    /// `Error::Http` / `Error::Transport` as for [`Self::get_issue`].
    pub async fn search_issues(&self, jql: &str, max_results: u64, start_at: u64) -> Result<Value> {
        let req = self.transport.request(Method::POST, "/search").json(&SearchRequest {
            jql,
            max_results,
            start_at,
        });
        self.transport.execute(req).await
    }

    /// Create an issue. `extra_fields` entries override the base fields when
    /// keys collide (so callers can set any field, `customfield_*` included).
    ///
    /// Not idempotent: repeating the call creates another issue.
    ///
    /// # Errors
    ///
    /// `Error::Http` / `Error::Transport` as for [`Self::get_issue`].
    pub async fn create_issue(
        &self,
        project_key: &str,
        issue_type: &str,
        summary: &str,
        description: Option<&str>,
        extra_fields: Option<&Map<String, Value>>,
    ) -> Result<Value> {
        let mut fields = Map::new();
        fields.insert("project".to_string(), json!({ "key": project_key }));
        fields.insert("summary".to_string(), json!(summary));
        fields.insert("issuetype".to_string(), json!({ "name": issue_type }));
        if let Some(description) = description {
            fields.insert("description".to_string(), json!(description));
        }
        if let Some(extra) = extra_fields {
            for (k, v) in extra {
                fields.insert(k.clone(), v.clone());
            }
        }

        let req = self
            .transport
            .request(Method::POST, "/issue")
            .json(&json!({ "fields": fields }));
        self.transport.execute(req).await
    }

    /// Add a plain-text comment to an issue.
    ///
    /// # Errors
    ///
    /// `Error::Http` / `Error::Transport` as for [`Self::get_issue`].
    pub async fn add_comment(&self, issue_key: &str, body: &str) -> Result<Value> {
        let req = self
            .transport
            .request(Method::POST, &format!("/issue/{issue_key}/comment"))
            .json(&json!({ "body": body }));
        self.transport.execute(req).await
    }

    /// Delete an issue, optionally together with its subtasks. Jira answers
    /// 204 No Content, so the returned value is `Value::Null`.
    ///
    /// # Errors
    ///
    /// `Error::Http` / `Error::Transport` as for [`Self::get_issue`].
    pub async fn delete_issue(&self, issue_key: &str, delete_subtasks: bool) -> Result<Value> {
        let req = self
            .transport
            .request(Method::DELETE, &format!("/issue/{issue_key}"))
            .query(&[("deleteSubtasks", delete_subtasks.to_string().as_str())]);
        self.transport.execute(req).await
    }

    /// Create a project. The caller is responsible for a valid
    /// type/template/lead combination for the target Jira instance.
    ///
    /// # Errors
    ///
    /// `Error::Http` / `Error::Transport` as for [`Self::get_issue`].
    pub async fn create_project(
        &self,
        key: &str,
        name: &str,
        project_type_key: &str,
        lead: &str,
        description: Option<&str>,
        extra_fields: Option<&Map<String, Value>>,
    ) -> Result<Value> {
        let mut payload = Map::new();
        payload.insert("key".to_string(), json!(key));
        payload.insert("name".to_string(), json!(name));
        payload.insert("projectTypeKey".to_string(), json!(project_type_key));
        payload.insert("lead".to_string(), json!(lead));
        if let Some(description) = description {
            payload.insert("description".to_string(), json!(description));
        }
        if let Some(extra) = extra_fields {
            for (k, v) in extra {
                payload.insert(k.clone(), v.clone());
            }
        }

        let req = self
            .transport
            .request(Method::POST, "/project")
            .json(&Value::Object(payload));
        self.transport.execute(req).await
    }

    /// Delete a project by key or id. Jira typically answers 202 Accepted
    /// with an empty body.
    ///
    /// # Errors
    ///
    /// `Error::Http` / `Error::Transport` as for [`Self::get_issue`].
    pub async fn delete_project(&self, key: &str) -> Result<Value> {
        let req = self
            .transport
            .request(Method::DELETE, &format!("/project/{key}"));
        self.transport.execute(req).await
    }

    /// Fetch create metadata (fields expanded) for a project, optionally
    /// filtered to one issue type name.
    ///
    /// # Errors
    ///
    /// `Error::Http` / `Error::Transport` as for [`Self::get_issue`].
    pub async fn get_createmeta(
        &self,
        project_key: &str,
        issue_type_name: Option<&str>,
    ) -> Result<Value> {
        let mut req = self
            .transport
            .request(Method::GET, "/issue/createmeta")
            .query(&[
                ("projectKeys", project_key),
                ("expand", "projects.issuetypes.fields"),
            ]);
        if let Some(issue_type_name) = issue_type_name {
            req = req.query(&[("issuetypeNames", issue_type_name)]);
        }
        self.transport.execute(req).await
    }
}
