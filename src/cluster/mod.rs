// Vectorize record content and attach cluster labels and projections.
//
// Two independent labelings over the same TF-IDF feature space: a seeded
// partitional k-means on cosine-normalized vectors, and a density-based
// HDBSCAN-style clustering on the weighted matrix directly. Plus two
// independent PCA fits (2 and 3 components) for the visual projections.

pub mod hdbscan;
pub mod kmeans;
pub mod pca;

use tracing::info;

use crate::error::PipelineError;
use crate::table::RecordTable;
use crate::text::TfIdfVectorizer;

pub use hdbscan::{HdbscanParams, NOISE};
pub use kmeans::KMeansParams;

/// Tuning for the analysis stage.
#[derive(Debug, Clone, Default)]
pub struct ClusterParams {
    pub kmeans: KMeansParams,
    pub hdbscan: HdbscanParams,
}

/// Attach all seven derived columns to the table in place.
///
/// Rows are never added or removed. Fails with `DegenerateCorpus` when the
/// TF-IDF vocabulary is empty.
pub fn analyze(table: &mut RecordTable, params: &ClusterParams) -> Result<(), PipelineError> {
    let contents: Vec<String> = table
        .records()
        .iter()
        .map(|r| r.content.clone())
        .collect();

    let matrix = TfIdfVectorizer::default().fit_transform(&contents)?;

    let kmeans_labels = kmeans::fit_predict(&matrix.rows, &params.kmeans);
    let hdb_labels = hdbscan::fit_predict(&matrix.rows, &params.hdbscan);

    // Independent fits by design, not a shared basis.
    let coords_2d = pca::project(&matrix.rows, 2);
    let coords_3d = pca::project(&matrix.rows, 3);

    for (i, record) in table.records_mut().iter_mut().enumerate() {
        record.kmeans_label = Some(kmeans_labels[i]);
        record.hdb_label = Some(hdb_labels[i]);
        record.x_2d = Some(coords_2d[i][0]);
        record.y_2d = Some(coords_2d[i][1]);
        record.x_3d = Some(coords_3d[i][0]);
        record.y_3d = Some(coords_3d[i][1]);
        record.z_3d = Some(coords_3d[i][2]);
    }

    let dense_clusters = hdb_labels.iter().filter(|&&l| l != NOISE).max().map_or(0, |&m| m + 1);
    info!(
        records = table.len(),
        features = matrix.vocab.len(),
        dense_clusters,
        "Analysis complete"
    );

    Ok(())
}
