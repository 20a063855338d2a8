//! Web search collaborator.
//!
//! [`SearchProvider`] is the seam the researcher agent reaches through for
//! fresh facts; the pipeline core never calls it directly. [`SerperProvider`]
//! is the shipped implementation, backed by the
//! [Serper](https://serper.dev) Google search API.

use std::fmt;
use std::fmt::Write as _;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::OrchestrationError;

/// Serper API endpoint.
pub const SERPER_API_URL: &str = "https://google.serper.dev/search";

const DEFAULT_MAX_RESULTS: usize = 5;

/// Async interface to a web search backend.
#[async_trait]
pub trait SearchProvider: Send + Sync + fmt::Debug {
    /// A short provider name for logs and debug output.
    fn provider_name(&self) -> &str;

    /// Run `query` and return the results as display-ready text.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestrationError::Search`] if the backend is unreachable
    /// or rejects the query.
    async fn search(&self, query: &str) -> Result<String, OrchestrationError>;
}

/// A shared, reference-counted search provider for use across tasks.
pub type SharedSearchProvider = Arc<dyn SearchProvider>;

/// Search provider backed by the Serper Google search API.
///
/// # Authentication
///
/// The API key is sent via the `X-API-KEY` header.
#[derive(Clone)]
pub struct SerperProvider {
    http_client: reqwest::Client,
    api_key: String,
    max_results: usize,
}

impl fmt::Debug for SerperProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerperProvider")
            .field("max_results", &self.max_results)
            .finish_non_exhaustive()
    }
}

impl SerperProvider {
    /// Create a provider with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            api_key: api_key.into(),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    /// Build a provider from `SERPER_API_KEY`.
    ///
    /// Returns `None` when the variable is unset or blank; the research
    /// pipeline runs without search in that case.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        match std::env::var("SERPER_API_KEY") {
            Ok(key) if !key.trim().is_empty() => Some(Self::new(key.trim())),
            _ => None,
        }
    }

    /// Cap the number of results spliced into prompts.
    #[must_use]
    pub const fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Provide a custom [`reqwest::Client`] (e.g. with proxy or timeout).
    #[must_use]
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = client;
        self
    }
}

#[async_trait]
impl SearchProvider for SerperProvider {
    fn provider_name(&self) -> &str {
        "serper"
    }

    async fn search(&self, query: &str) -> Result<String, OrchestrationError> {
        let body = serde_json::json!({
            "q": query,
            "num": self.max_results,
        });

        let response = self
            .http_client
            .post(SERPER_API_URL)
            .header("X-API-KEY", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| OrchestrationError::search(format!("Serper request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(OrchestrationError::search(format!(
                "Serper API error (HTTP {status}): {text}"
            )));
        }

        let parsed: SerperResponse = response
            .json()
            .await
            .map_err(|e| OrchestrationError::search(format!("Serper response unreadable: {e}")))?;

        Ok(format_results(&parsed.organic, self.max_results))
    }
}

/// Render organic results as titled snippets for prompt splicing.
fn format_results(results: &[OrganicResult], max_results: usize) -> String {
    if results.is_empty() {
        return "No search results found.".to_owned();
    }

    let mut out = String::new();
    for result in results.iter().take(max_results) {
        let _ = writeln!(out, "- {}", result.title);
        if !result.snippet.is_empty() {
            let _ = writeln!(out, "  {}", result.snippet);
        }
        let _ = writeln!(out, "  ({})", result.link);
    }
    out.trim_end().to_owned()
}

// Serper response shapes (private).
#[derive(Deserialize)]
struct SerperResponse {
    #[serde(default)]
    organic: Vec<OrganicResult>,
}

#[derive(Deserialize)]
struct OrganicResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(title: &str, link: &str, snippet: &str) -> OrganicResult {
        OrganicResult {
            title: title.into(),
            link: link.into(),
            snippet: snippet.into(),
        }
    }

    #[test]
    fn formats_titled_snippets() {
        let results = [
            result("Tea", "https://example.com/tea", "Leaves in hot water."),
            result("Coffee", "https://example.com/coffee", ""),
        ];
        let text = format_results(&results, 5);
        assert!(text.contains("- Tea"));
        assert!(text.contains("  Leaves in hot water."));
        assert!(text.contains("  (https://example.com/coffee)"));
        // No snippet line for the empty snippet.
        assert_eq!(text.lines().count(), 5);
    }

    #[test]
    fn empty_results_have_a_fixed_message() {
        assert_eq!(format_results(&[], 5), "No search results found.");
    }

    #[test]
    fn max_results_caps_the_rendering() {
        let results: Vec<OrganicResult> = (0..10)
            .map(|i| result(&format!("R{i}"), "https://example.com", "s"))
            .collect();
        let text = format_results(&results, 3);
        assert!(text.contains("- R2"));
        assert!(!text.contains("- R3"));
    }

    #[test]
    fn missing_fields_deserialize_to_defaults() {
        let parsed: SerperResponse = serde_json::from_str(r#"{"organic": [{"title": "T"}]}"#).unwrap();
        assert_eq!(parsed.organic.len(), 1);
        assert!(parsed.organic[0].link.is_empty());
    }

    #[test]
    fn debug_redacts_the_api_key() {
        let provider = SerperProvider::new("serper-secret");
        assert!(!format!("{provider:?}").contains("serper-secret"));
    }
}
