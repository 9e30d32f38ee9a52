//! HTTP client for thin-client mode.
//!
//! When `--server <url>` is passed to the CLI, questions go to a running
//! parlbot server instead of opening the local databases.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// HTTP client that proxies CLI commands to a remote parlbot server.
pub struct Client {
    base_url: String,
    http: reqwest::Client,
}

#[derive(Serialize)]
struct AskRequest<'a> {
    question: &'a str,
    context_only: bool,
}

/// Response from the /ask endpoint.
///
/// Row payloads are kept as raw JSON; the CLI only re-prints them.
#[derive(Debug, Serialize, Deserialize)]
pub struct AskResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    pub question: String,
    pub intent: serde_json::Value,
    pub data: serde_json::Value,
    pub provenance: serde_json::Value,
    pub truncated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub omitted_rows: Option<usize>,
}

/// Response from the /status endpoint
#[derive(Debug, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub tables: Option<crate::types::TableCounts>,
    pub error: Option<String>,
    pub lexicon: LexiconStats,
    pub model: String,
}

#[derive(Debug, Deserialize)]
pub struct LexiconStats {
    pub members: usize,
    pub parties: usize,
    pub aliases: usize,
}

/// Error response from the server
#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl Client {
    /// Create a new client pointing at the given server URL.
    pub fn new(base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    /// Ask a question via the remote server.
    pub async fn ask(&self, question: &str, context_only: bool) -> Result<AskResponse> {
        let url = format!("{}/ask", self.base_url);

        let resp = self
            .http
            .post(&url)
            .json(&AskRequest {
                question,
                context_only,
            })
            .send()
            .await
            .context("Failed to connect to parlbot server")?;

        let resp = check(resp).await?;
        resp.json().await.context("Failed to parse ask response")
    }

    /// Get table and lexicon status from the remote server.
    pub async fn status(&self) -> Result<StatusResponse> {
        let url = format!("{}/status", self.base_url);

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .context("Failed to connect to parlbot server")?;

        let resp = check(resp).await?;
        resp.json().await.context("Failed to parse status response")
    }
}

async fn check(resp: reqwest::Response) -> Result<reqwest::Response> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status();
    let body: ErrorBody = resp.json().await.unwrap_or(ErrorBody {
        error: format!("HTTP {}", status),
    });
    anyhow::bail!("Server error ({}): {}", status, body.error);
}
