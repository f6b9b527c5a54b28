// Plot assembly: turn an enriched record table into four named, embeddable
// scatter fragments.
//
// One trace per discrete cluster label, so colors are categorical rather
// than a continuous scale. The density-based "noise" label gets its own
// gray trace. Each fragment is an inline plotly div suitable for direct
// inclusion in a host page that loads plotly.js.

use std::collections::BTreeMap;

use plotly::common::color::Rgb;
use plotly::common::{Marker, Mode};
use plotly::{Plot, Scatter, Scatter3D};

use crate::cluster::NOISE;
use crate::table::{DatasetRecord, RecordTable};

/// Artifact name → embeddable markup fragment.
pub type ArtifactMap = BTreeMap<String, String>;

/// The four fixed artifact names, in output order.
pub const ARTIFACT_NAMES: [&str; 4] = [
    "plot_kmeans_2d",
    "plot_hdbscan_2d",
    "plot_kmeans_3d",
    "plot_hdbscan_3d",
];

/// Per-run plot configuration, passed explicitly instead of living in
/// process-wide renderer state.
#[derive(Debug, Clone)]
pub struct PlotConfig {
    /// Prefix for the div ids of the generated fragments, so two runs can
    /// coexist on one page.
    pub div_prefix: String,
    pub marker_size: usize,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            div_prefix: String::new(),
            marker_size: 8,
        }
    }
}

// Plotly's default qualitative palette.
const PALETTE: [(u8, u8, u8); 10] = [
    (99, 110, 250),
    (239, 85, 59),
    (0, 204, 150),
    (171, 99, 250),
    (255, 161, 90),
    (25, 211, 243),
    (255, 102, 146),
    (182, 232, 128),
    (255, 151, 255),
    (254, 203, 82),
];

const NOISE_GRAY: (u8, u8, u8) = (127, 127, 127);

/// Build the four artifacts from an enriched table. Pure — no side effects
/// beyond constructing the fragments.
pub fn assemble(table: &RecordTable, config: &PlotConfig) -> ArtifactMap {
    debug_assert!(table.validate_enriched().is_ok());

    let mut artifacts = ArtifactMap::new();

    let kmeans = |r: &DatasetRecord| r.kmeans_label.unwrap_or(NOISE);
    let hdb = |r: &DatasetRecord| r.hdb_label.unwrap_or(NOISE);

    artifacts.insert(
        ARTIFACT_NAMES[0].to_string(),
        scatter_2d(table, &kmeans, ARTIFACT_NAMES[0], config),
    );
    artifacts.insert(
        ARTIFACT_NAMES[1].to_string(),
        scatter_2d(table, &hdb, ARTIFACT_NAMES[1], config),
    );
    artifacts.insert(
        ARTIFACT_NAMES[2].to_string(),
        scatter_3d(table, &kmeans, ARTIFACT_NAMES[2], config),
    );
    artifacts.insert(
        ARTIFACT_NAMES[3].to_string(),
        scatter_3d(table, &hdb, ARTIFACT_NAMES[3], config),
    );

    artifacts
}

/// Group row indices by label value; BTreeMap keeps trace order stable.
fn group_by_label(
    table: &RecordTable,
    label_of: &dyn Fn(&DatasetRecord) -> i32,
) -> BTreeMap<i32, Vec<usize>> {
    let mut groups: BTreeMap<i32, Vec<usize>> = BTreeMap::new();
    for (i, r) in table.records().iter().enumerate() {
        groups.entry(label_of(r)).or_default().push(i);
    }
    groups
}

/// Hover line: accession id plus the input identifiers that reach it.
fn hover_text(r: &DatasetRecord) -> String {
    format!("{} | pmids: {}", r.accession_id, r.linked_identifiers.join(", "))
}

fn trace_name(label: i32) -> String {
    if label == NOISE {
        "noise".to_string()
    } else {
        label.to_string()
    }
}

fn trace_color(label: i32) -> Rgb {
    let (r, g, b) = if label == NOISE {
        NOISE_GRAY
    } else {
        PALETTE[label as usize % PALETTE.len()]
    };
    Rgb::new(r, g, b)
}

fn scatter_2d(
    table: &RecordTable,
    label_of: &dyn Fn(&DatasetRecord) -> i32,
    name: &str,
    config: &PlotConfig,
) -> String {
    let records = table.records();
    let mut plot = Plot::new();

    for (label, indices) in group_by_label(table, label_of) {
        let xs: Vec<f64> = indices.iter().map(|&i| records[i].x_2d.unwrap_or(0.0)).collect();
        let ys: Vec<f64> = indices.iter().map(|&i| records[i].y_2d.unwrap_or(0.0)).collect();
        let text: Vec<String> = indices.iter().map(|&i| hover_text(&records[i])).collect();

        let trace = Scatter::new(xs, ys)
            .mode(Mode::Markers)
            .name(trace_name(label))
            .text_array(text)
            .marker(Marker::new().size(config.marker_size).color(trace_color(label)));
        plot.add_trace(trace);
    }

    let div_id = format!("{}{name}", config.div_prefix);
    plot.to_inline_html(Some(div_id.as_str()))
}

fn scatter_3d(
    table: &RecordTable,
    label_of: &dyn Fn(&DatasetRecord) -> i32,
    name: &str,
    config: &PlotConfig,
) -> String {
    let records = table.records();
    let mut plot = Plot::new();

    for (label, indices) in group_by_label(table, label_of) {
        let xs: Vec<f64> = indices.iter().map(|&i| records[i].x_3d.unwrap_or(0.0)).collect();
        let ys: Vec<f64> = indices.iter().map(|&i| records[i].y_3d.unwrap_or(0.0)).collect();
        let zs: Vec<f64> = indices.iter().map(|&i| records[i].z_3d.unwrap_or(0.0)).collect();
        let text: Vec<String> = indices.iter().map(|&i| hover_text(&records[i])).collect();

        let trace = Scatter3D::new(xs, ys, zs)
            .mode(Mode::Markers)
            .name(trace_name(label))
            .text_array(text)
            .marker(Marker::new().size(config.marker_size).color(trace_color(label)));
        plot.add_trace(trace);
    }

    let div_id = format!("{}{name}", config.div_prefix);
    plot.to_inline_html(Some(div_id.as_str()))
}
