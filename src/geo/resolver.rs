// Metadata resolver: PubMed ids → a table of GEO dataset records.
//
// Three sequential network phases with explicit states, so the partial
// failure rules (and any future retry logic) have obvious seams:
//
//   Linking     elink: input ids → associated dataset uids. Fatal on
//               malformed shape or an empty link list.
//   Summarizing esummary: dataset uids → structured metadata. Fatal on a
//               malformed envelope; a single unusable entry is skipped.
//   Detailing   accession page scrape per record. Never fatal — a failed
//               fetch degrades the design field to a placeholder.

use std::collections::HashSet;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::PipelineError;
use crate::geo::client::{
    parse_elink_links, parse_summary_entry, parse_summary_envelope, EutilsClient,
};
use crate::geo::detail::GeoDetailClient;
use crate::table::{DatasetRecord, RecordTable};

/// Resolution phases. `Detailing` is the only one that tolerates failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveState {
    Linking,
    Summarizing,
    Detailing,
    Done,
    Failed,
}

/// A summarized record waiting for its design description.
struct PendingRecord {
    dataset_id: String,
    accession_id: String,
    title: String,
    gds_type: String,
    summary: String,
    organism: String,
    linked_identifiers: Vec<String>,
}

/// Resolves input identifiers into a RecordTable. Holds no state between
/// invocations — every call is a fresh pass over the network.
pub struct GeoResolver {
    eutils: EutilsClient,
    detail: GeoDetailClient,
    detail_concurrency: usize,
}

impl GeoResolver {
    pub fn new(config: &Config) -> Result<Self, PipelineError> {
        let timeout = Duration::from_secs(config.request_timeout_secs);
        let eutils = EutilsClient::new(&config.eutils_url, timeout)?;
        let detail = GeoDetailClient::new(&config.geo_url, timeout)
            .map_err(|e| PipelineError::Resolution(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            eutils,
            detail,
            detail_concurrency: config.detail_concurrency.max(1),
        })
    }

    /// Resolve identifiers to a table of dataset records with aggregated text.
    pub async fn resolve(&self, pmids: &[String]) -> Result<RecordTable, PipelineError> {
        let pending = match self.link_and_summarize(pmids).await {
            Ok(p) => p,
            Err(e) => {
                debug!(state = ?ResolveState::Failed, "resolver phase");
                return Err(e);
            }
        };

        debug!(state = ?ResolveState::Detailing, "resolver phase");
        let designs = self.fetch_designs(&pending).await;

        let mut table = RecordTable::new();
        for (p, design) in pending.into_iter().zip(designs) {
            // Field order is fixed: downstream vectorization doesn't care,
            // but debug output readability does.
            let content = [
                p.title.as_str(),
                p.gds_type.as_str(),
                p.summary.as_str(),
                p.organism.as_str(),
                design.as_str(),
            ]
            .join(" ");

            table.push(DatasetRecord::new(
                p.dataset_id,
                p.accession_id,
                content,
                p.linked_identifiers,
            ));
        }

        debug!(state = ?ResolveState::Done, "resolver phase");
        info!(records = table.len(), "Resolution complete");
        Ok(table)
    }

    /// Linking and Summarizing phases: everything that can fail the run.
    async fn link_and_summarize(
        &self,
        pmids: &[String],
    ) -> Result<Vec<PendingRecord>, PipelineError> {
        debug!(state = ?ResolveState::Linking, "resolver phase");
        let elink_body = self.eutils.elink(pmids).await?;
        let mut dataset_ids = parse_elink_links(&elink_body)?;

        // The link graph can reach the same dataset through several input
        // identifiers. Keep one row per dataset, first-seen order.
        let mut seen = HashSet::new();
        dataset_ids.retain(|id| seen.insert(id.clone()));
        info!(links = dataset_ids.len(), "Fetched dataset links");

        debug!(state = ?ResolveState::Summarizing, "resolver phase");
        let summary_body = self.eutils.esummary(&dataset_ids).await?;
        let result = parse_summary_envelope(&summary_body)?;

        let input_set: HashSet<&str> = pmids.iter().map(String::as_str).collect();
        let mut pending = Vec::with_capacity(dataset_ids.len());

        for dataset_id in dataset_ids {
            let Some(s) = parse_summary_entry(result, &dataset_id) else {
                warn!(dataset_id, "Summary entry missing or incomplete, skipping record");
                continue;
            };

            let linked_identifiers: Vec<String> = s
                .pubmed_ids
                .iter()
                .filter(|id| input_set.contains(id.as_str()))
                .cloned()
                .collect();

            pending.push(PendingRecord {
                dataset_id,
                accession_id: format!("GSE{}", s.accession_suffix),
                title: s.title,
                gds_type: s.gds_type,
                summary: s.summary,
                organism: s.organism,
                linked_identifiers,
            });
        }

        Ok(pending)
    }

    /// Detailing phase: bounded-concurrency fetch of design descriptions.
    /// Results are applied by row index so table order is unaffected.
    async fn fetch_designs(&self, pending: &[PendingRecord]) -> Vec<String> {
        let pb = ProgressBar::new(pending.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("  Details [{bar:30}] {pos}/{len} ({eta})")
                .unwrap(),
        );

        let fetched: Vec<(usize, String)> =
            stream::iter(pending.iter().enumerate().map(|(i, p)| {
                let detail = &self.detail;
                let pb = pb.clone();
                let accession = p.accession_id.clone();
                async move {
                    let design = detail.fetch_overall_design(&accession).await;
                    pb.inc(1);
                    (i, design)
                }
            }))
            .buffer_unordered(self.detail_concurrency)
            .collect()
            .await;

        pb.finish_and_clear();

        let mut designs = vec![String::new(); pending.len()];
        for (i, design) in fetched {
            designs[i] = design;
        }
        designs
    }
}
