// The in-memory record table threaded through the pipeline.
//
// One DatasetRecord per resolved GEO series. Records are created during
// resolution and never mutated afterwards except for the derived columns
// that `cluster::analyze` attaches in place.

/// One resolved dataset with its aggregated descriptive text.
#[derive(Debug, Clone)]
pub struct DatasetRecord {
    /// Resolver-native key (the GDS uid from E-utilities).
    pub dataset_id: String,
    /// Public accession string, e.g. "GSE123456".
    pub accession_id: String,
    /// Space-joined title, type, summary, organism, and design description.
    pub content: String,
    /// Input identifiers that reference this dataset. May be empty — a
    /// record reached through the link graph but not citing any supplied
    /// identifier is still a valid row.
    pub linked_identifiers: Vec<String>,

    // Derived columns, attached by analyze(). None until then.
    pub kmeans_label: Option<i32>,
    pub hdb_label: Option<i32>,
    pub x_2d: Option<f64>,
    pub y_2d: Option<f64>,
    pub x_3d: Option<f64>,
    pub y_3d: Option<f64>,
    pub z_3d: Option<f64>,
}

impl DatasetRecord {
    pub fn new(
        dataset_id: String,
        accession_id: String,
        content: String,
        linked_identifiers: Vec<String>,
    ) -> Self {
        Self {
            dataset_id,
            accession_id,
            content,
            linked_identifiers,
            kmeans_label: None,
            hdb_label: None,
            x_2d: None,
            y_2d: None,
            x_3d: None,
            y_3d: None,
            z_3d: None,
        }
    }
}

/// Ordered collection of dataset records — the single mutable structure
/// passed through resolve → analyze → assemble. No persistence across runs.
#[derive(Debug, Clone, Default)]
pub struct RecordTable {
    records: Vec<DatasetRecord>,
}

impl RecordTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: DatasetRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[DatasetRecord] {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut [DatasetRecord] {
        &mut self.records
    }

    /// Check the final-table invariant: every record has non-empty content,
    /// a label under both algorithms, and coordinates under both projections.
    pub fn validate_enriched(&self) -> Result<(), String> {
        for (i, r) in self.records.iter().enumerate() {
            if r.content.is_empty() {
                return Err(format!("record {i} ({}) has empty content", r.accession_id));
            }
            if r.kmeans_label.is_none() || r.hdb_label.is_none() {
                return Err(format!(
                    "record {i} ({}) missing a cluster label",
                    r.accession_id
                ));
            }
            let coords = [r.x_2d, r.y_2d, r.x_3d, r.y_3d, r.z_3d];
            if coords.iter().any(|c| c.is_none()) {
                return Err(format!(
                    "record {i} ({}) missing projection coordinates",
                    r.accession_id
                ));
            }
        }
        Ok(())
    }
}
