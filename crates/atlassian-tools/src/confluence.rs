//! Confluence Server/DC REST client (`{base_url}/rest/api`).

use crate::client::Transport;
use crate::config::BackendConfig;
use crate::error::Result;
use reqwest::Method;
use serde_json::{Value, json};
use std::time::Duration;

const API_PREFIX: &str = "/rest/api";

pub struct ConfluenceClient {
    transport: Transport,
}

impl ConfluenceClient {
    /// # Errors
    ///
    /// Returns `Error::Config` if the underlying HTTP client cannot be built.
    pub fn new(config: BackendConfig, timeout: Duration) -> Result<Self> {
        Ok(Self {
            transport: Transport::new(config, API_PREFIX, timeout)?,
        })
    }

    /// Fetch one page with storage body, version and space expanded.
    ///
    /// # Errors
    ///
    /// `Error::Http` on any non-2xx status (404 for an unknown id),
    /// `Error::Transport` on network failure.
    pub async fn get_page(&self, page_id: &str) -> Result<Value> {
        let req = self
            .transport
            .request(Method::GET, &format!("/content/{page_id}"))
            .query(&[("expand", "body.storage,version,space")]);
        self.transport.execute(req).await
    }

    /// Search content via CQL. The query string is passed through
    /// uninterpreted; the backend enforces its own page-size ceiling.
    ///
    /// # Errors
    ///
    /// `Error::Http` / `Error::Transport` as for [`Self::get_page`].
    pub async fn search_pages(&self, cql: &str, limit: u64, start: u64) -> Result<Value> {
        let req = self.transport.request(Method::GET, "/content/search").query(&[
            ("cql", cql),
            ("limit", &limit.to_string()),
            ("start", &start.to_string()),
            ("expand", "space,version"),
        ]);
        self.transport.execute(req).await
    }

    /// List visible spaces with plain description and homepage expanded.
    ///
    /// # Errors
    ///
    /// `Error::Http` / `Error::Transport` as for [`Self::get_page`].
    pub async fn get_spaces(&self, limit: u64, start: u64) -> Result<Value> {
        let req = self.transport.request(Method::GET, "/space").query(&[
            ("limit", limit.to_string().as_str()),
            ("start", start.to_string().as_str()),
            ("expand", "description.plain,homepage"),
        ]);
        self.transport.execute(req).await
    }

    /// Create a page in storage format, optionally under a parent page.
    ///
    /// Not idempotent: repeating the call creates another page.
    ///
    /// # Errors
    ///
    /// `Error::Http` / `Error::Transport` as for [`Self::get_page`].
    pub async fn create_page(
        &self,
        space_key: &str,
        title: &str,
        body_storage: &str,
        parent_page_id: Option<&str>,
    ) -> Result<Value> {
        let mut payload = json!({
            "type": "page",
            "title": title,
            "space": { "key": space_key },
            "body": {
                "storage": {
                    "value": body_storage,
                    "representation": "storage",
                }
            },
        });
        if let Some(parent) = parent_page_id {
            payload["ancestors"] = json!([{ "id": parent }]);
        }

        let req = self
            .transport
            .request(Method::POST, "/content")
            .json(&payload);
        self.transport.execute(req).await
    }

    /// Create a space (`global` type unless told otherwise).
    ///
    /// # Errors
    ///
    /// `Error::Http` / `Error::Transport` as for [`Self::get_page`].
    pub async fn create_space(
        &self,
        key: &str,
        name: &str,
        description: Option<&str>,
        space_type: &str,
    ) -> Result<Value> {
        let mut payload = json!({
            "key": key,
            "name": name,
            "type": space_type,
        });
        if let Some(description) = description {
            payload["description"] = json!({
                "plain": {
                    "value": description,
                    "representation": "plain",
                }
            });
        }

        let req = self.transport.request(Method::POST, "/space").json(&payload);
        self.transport.execute(req).await
    }

    /// Add a storage-format comment to a page (content of type `comment`
    /// with the page as container).
    ///
    /// # Errors
    ///
    /// `Error::Http` / `Error::Transport` as for [`Self::get_page`].
    pub async fn add_comment(&self, page_id: &str, body_storage: &str) -> Result<Value> {
        let payload = json!({
            "type": "comment",
            "container": {
                "id": page_id,
                "type": "page",
            },
            "body": {
                "storage": {
                    "value": body_storage,
                    "representation": "storage",
                }
            },
        });

        let req = self
            .transport
            .request(Method::POST, "/content")
            .json(&payload);
        self.transport.execute(req).await
    }

    /// Delete a page. Confluence answers 204 No Content on success, so the
    /// returned value is `Value::Null`.
    ///
    /// # Errors
    ///
    /// `Error::Http` / `Error::Transport` as for [`Self::get_page`].
    pub async fn delete_page(&self, page_id: &str, status: &str) -> Result<Value> {
        let req = self
            .transport
            .request(Method::DELETE, &format!("/content/{page_id}"))
            .query(&[("status", status)]);
        self.transport.execute(req).await
    }

    /// Delete a space by key.
    ///
    /// # Errors
    ///
    /// `Error::Http` / `Error::Transport` as for [`Self::get_page`].
    pub async fn delete_space(&self, key: &str) -> Result<Value> {
        let req = self.transport.request(Method::DELETE, &format!("/space/{key}"));
        self.transport.execute(req).await
    }
}
