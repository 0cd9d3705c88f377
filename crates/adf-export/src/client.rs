//! Issue tracker access.

use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde::Deserialize;
use serde_json::Value;

use crate::{ExportError, Result};

/// A field known to the issue tracker
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldInfo {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Where issues come from.
///
/// The exporter only talks to this trait, so tests can feed it canned issues.
pub trait IssueSource {
    /// Run a query and return the raw issue records
    fn fetch_issues(&self, query: &str, fields: &str) -> Result<Vec<Value>>;

    /// List every field the tracker knows about
    fn list_available_fields(&self) -> Result<Vec<FieldInfo>>;
}

/// Jira Cloud REST client (API v3) using basic auth with an API token.
pub struct JiraClient {
    base_url: String,
    email: String,
    api_token: String,
    http: Client,
}

impl JiraClient {
    /// Create a new client
    pub fn new(base_url: &str, email: &str, api_token: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let http = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            email: email.to_string(),
            api_token: api_token.to_string(),
            http,
        })
    }

    /// The base URL requests are made against
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Response> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .http
            .get(&url)
            .basic_auth(&self.email, Some(&self.api_token))
            .query(query)
            .send()
            .inspect_err(|err| log::error!("An error occurred while connecting to Jira: {err}"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            log::error!("Invalid response from Jira: {status} - {body}");
            return Err(ExportError::Status { status, body });
        }

        Ok(response)
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    issues: Vec<Value>,
}

impl IssueSource for JiraClient {
    fn fetch_issues(&self, query: &str, fields: &str) -> Result<Vec<Value>> {
        let response = self.get(
            "/rest/api/3/search",
            &[("jql", query), ("fields", fields), ("expand", "renderedFields")],
        )?;
        let search: SearchResponse = response.json()?;
        log::debug!("Jira returned {} issues for {query:?}", search.issues.len());
        Ok(search.issues)
    }

    fn list_available_fields(&self) -> Result<Vec<FieldInfo>> {
        let response = self.get("/rest/api/3/field", &[])?;
        Ok(response.json()?)
    }
}
