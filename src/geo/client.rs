// HTTP client for NCBI E-utilities — elink and esummary over HTTP+JSON.
//
// A thin reqwest wrapper plus pure parsing functions for the two response
// shapes the resolver depends on. Parsing is kept out of the async methods
// so the malformed-response rules are testable without a network.

use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::error::PipelineError;

/// Thin client for the two E-utilities lookups the resolver needs.
pub struct EutilsClient {
    client: reqwest::Client,
    base_url: String,
}

impl EutilsClient {
    /// Create a client pointing at the given E-utilities base URL.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, PipelineError> {
        let client = reqwest::Client::builder()
            .user_agent("geoclust/0.1 (dataset-clustering)")
            .timeout(timeout)
            .build()
            .map_err(|e| PipelineError::Resolution(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Link resolution: PubMed ids → associated GDS dataset uids.
    pub async fn elink(&self, pmids: &[String]) -> Result<Value, PipelineError> {
        let url = format!("{}/elink.fcgi", self.base_url);
        debug!(count = pmids.len(), "elink request");
        self.get_json(
            &url,
            &[
                ("dbfrom", "pubmed"),
                ("db", "gds"),
                ("id", &pmids.join(",")),
                ("retmode", "json"),
            ],
        )
        .await
    }

    /// Summary fetch: GDS dataset uids → structured metadata records.
    pub async fn esummary(&self, dataset_ids: &[String]) -> Result<Value, PipelineError> {
        let url = format!("{}/esummary.fcgi", self.base_url);
        debug!(count = dataset_ids.len(), "esummary request");
        self.get_json(
            &url,
            &[
                ("db", "gds"),
                ("id", &dataset_ids.join(",")),
                ("retmode", "json"),
            ],
        )
        .await
    }

    async fn get_json(&self, url: &str, params: &[(&str, &str)]) -> Result<Value, PipelineError> {
        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| PipelineError::Resolution(format!("request to {url} failed: {e}")))?;

        if !response.status().is_success() {
            return Err(PipelineError::Resolution(format!(
                "{url} returned {}",
                response.status()
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| PipelineError::Resolution(format!("invalid JSON from {url}: {e}")))
    }
}

/// Structured metadata for one dataset, as far as the pipeline cares.
#[derive(Debug, Clone)]
pub struct DatasetSummary {
    /// Numeric accession suffix; "GSE" is prepended to form the public id.
    pub accession_suffix: String,
    pub title: String,
    pub gds_type: String,
    pub summary: String,
    pub organism: String,
    /// All PubMed ids associated with this dataset in the link graph.
    pub pubmed_ids: Vec<String>,
}

/// Pull the associated dataset uid list out of an elink response.
///
/// Fails if the linkset shape is missing or the list is empty — an input
/// that links to no datasets at all is not locally recoverable.
pub fn parse_elink_links(body: &Value) -> Result<Vec<String>, PipelineError> {
    let links = body
        .get("linksets")
        .and_then(|v| v.get(0))
        .and_then(|v| v.get("linksetdbs"))
        .and_then(|v| v.get(0))
        .and_then(|v| v.get("links"))
        .and_then(Value::as_array)
        .ok_or_else(|| {
            PipelineError::Resolution("elink response missing linksets/linksetdbs/links".into())
        })?;

    let ids: Vec<String> = links.iter().filter_map(id_to_string).collect();

    if ids.is_empty() {
        return Err(PipelineError::Resolution(
            "link lookup returned no associated dataset identifiers".into(),
        ));
    }

    Ok(ids)
}

/// Check the esummary envelope and return the `result` object.
pub fn parse_summary_envelope(body: &Value) -> Result<&Value, PipelineError> {
    body.get("result")
        .filter(|v| v.is_object())
        .ok_or_else(|| PipelineError::Resolution("esummary response missing result object".into()))
}

/// Extract one dataset's summary fields from the esummary result object.
///
/// Returns None when the entry or any required field is absent — the caller
/// skips the record rather than inserting partial content.
pub fn parse_summary_entry(result: &Value, dataset_id: &str) -> Option<DatasetSummary> {
    let entry = result.get(dataset_id)?;

    let accession_suffix = entry.get("gse")?.as_str()?.to_string();
    let title = entry.get("title")?.as_str()?.to_string();
    let gds_type = entry.get("gdstype")?.as_str()?.to_string();
    let summary = entry.get("summary")?.as_str()?.to_string();
    let organism = entry.get("taxon")?.as_str()?.to_string();

    // pubmedids arrive as numbers in E-utilities JSON; tolerate strings too.
    let pubmed_ids = entry
        .get("pubmedids")
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(id_to_string).collect())
        .unwrap_or_default();

    Some(DatasetSummary {
        accession_suffix,
        title,
        gds_type,
        summary,
        organism,
        pubmed_ids,
    })
}

fn id_to_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
