use std::env;

use anyhow::Result;

use crate::cluster::{ClusterParams, KMeansParams};
use crate::plot::PlotConfig;

pub const DEFAULT_EUTILS_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";
pub const DEFAULT_GEO_URL: &str = "https://www.ncbi.nlm.nih.gov/geo/query/acc.cgi";

/// Central configuration loaded from environment variables.
///
/// Everything has a sensible default — the pipeline works out of the box
/// against the public NCBI endpoints. The .env file is loaded automatically
/// at startup via dotenvy.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL for NCBI E-utilities (elink.fcgi / esummary.fcgi live here).
    pub eutils_url: String,
    /// GEO accession display endpoint (the per-record detail page).
    pub geo_url: String,
    /// Per-request timeout in seconds. Every call is attempted exactly once.
    pub request_timeout_secs: u64,
    /// How many detail-page fetches to run concurrently. Records are
    /// independent, so this only bounds in-flight requests.
    pub detail_concurrency: usize,
    /// Seed for the partitional clustering so runs are reproducible.
    pub kmeans_seed: u64,
}

impl Config {
    /// Load configuration from environment variables, falling back to the
    /// public NCBI endpoints and default tuning.
    pub fn load() -> Result<Self> {
        Ok(Self {
            eutils_url: env::var("GEOCLUST_EUTILS_URL")
                .unwrap_or_else(|_| DEFAULT_EUTILS_URL.to_string()),
            geo_url: env::var("GEOCLUST_GEO_URL").unwrap_or_else(|_| DEFAULT_GEO_URL.to_string()),
            request_timeout_secs: parse_env("GEOCLUST_TIMEOUT_SECS", 30),
            detail_concurrency: parse_env("GEOCLUST_DETAIL_CONCURRENCY", 4),
            kmeans_seed: parse_env("GEOCLUST_KMEANS_SEED", 42),
        })
    }

    /// Clustering parameters derived from this configuration.
    pub fn cluster_params(&self) -> ClusterParams {
        ClusterParams {
            kmeans: KMeansParams {
                seed: self.kmeans_seed,
                ..KMeansParams::default()
            },
            ..ClusterParams::default()
        }
    }

    /// Plot assembly configuration. Explicit per-run state — there is no
    /// process-global renderer setting to fight over.
    pub fn plot_config(&self) -> PlotConfig {
        PlotConfig::default()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            eutils_url: DEFAULT_EUTILS_URL.to_string(),
            geo_url: DEFAULT_GEO_URL.to_string(),
            request_timeout_secs: 30,
            detail_concurrency: 4,
            kmeans_seed: 42,
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
