// Pipeline entry point: identifiers in, named plot artifacts out.
//
// resolve → analyze → assemble, with the empty-input checks the error
// taxonomy promises: zero identifiers fail before any network call, and
// zero usable records fail before vectorization.

use tracing::info;

use crate::cluster;
use crate::config::Config;
use crate::error::PipelineError;
use crate::geo::resolver::GeoResolver;
use crate::plot::{self, ArtifactMap};

/// Run the full pipeline for a set of PubMed identifiers.
pub async fn process(identifiers: &[String], config: &Config) -> Result<ArtifactMap, PipelineError> {
    if identifiers.is_empty() {
        return Err(PipelineError::EmptyInput(
            "zero identifiers supplied".into(),
        ));
    }

    info!(identifiers = identifiers.len(), "Pipeline starting");

    let resolver = GeoResolver::new(config)?;
    let mut table = resolver.resolve(identifiers).await?;

    if table.is_empty() {
        return Err(PipelineError::EmptyInput(
            "no usable dataset records after filtering".into(),
        ));
    }

    cluster::analyze(&mut table, &config.cluster_params())?;

    Ok(plot::assemble(&table, &config.plot_config()))
}

/// Split raw uploaded text into identifier tokens: newlines count as
/// separators alongside commas, whitespace is trimmed, empties dropped.
/// Duplicates are kept — input order and multiplicity are the caller's.
pub fn split_identifiers(raw: &str) -> Vec<String> {
    raw.replace('\n', ",")
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_newlines_and_commas() {
        let ids = split_identifiers("123,456\n789\n\n ,  101 ");
        assert_eq!(ids, vec!["123", "456", "789", "101"]);
    }

    #[test]
    fn empty_upload_yields_no_identifiers() {
        assert!(split_identifiers("\n\n, ,\n").is_empty());
    }
}
