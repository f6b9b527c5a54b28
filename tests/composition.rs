// Composition tests — the analyze → assemble data flow on synthetic
// records, without any network access.
//
// Records get two distinguishable content themes so the TF-IDF vocabulary
// survives pruning and the partitional split is meaningful.

use geoclust::cluster::{self, ClusterParams, NOISE};
use geoclust::config::Config;
use geoclust::error::PipelineError;
use geoclust::pipeline;
use geoclust::plot::{assemble, PlotConfig, ARTIFACT_NAMES};
use geoclust::table::{DatasetRecord, RecordTable};

/// Twenty records: ten tumor-sequencing, ten mouse-metabolism.
fn synthetic_table() -> RecordTable {
    let mut table = RecordTable::new();
    for i in 0..20 {
        let content = if i < 10 {
            format!(
                "Tumor genome study {i} Expression profiling by sequencing \
                 human carcinoma samples sequencing tumor expression \
                 Overall design: tumor biopsies sequenced"
            )
        } else {
            format!(
                "Mouse liver study {i} Expression profiling by array \
                 mouse metabolism diet hepatic tissue microarray \
                 Overall design: mouse cohorts on controlled diet"
            )
        };
        table.push(DatasetRecord::new(
            format!("20000{i}"),
            format!("GSE10{i:02}"),
            content,
            if i % 3 == 0 {
                vec![format!("{}", 30000 + i)]
            } else {
                Vec::new()
            },
        ));
    }
    table
}

// ============================================================
// analyze: derived columns
// ============================================================

#[test]
fn analyze_attaches_all_seven_columns() {
    let mut table = synthetic_table();
    cluster::analyze(&mut table, &ClusterParams::default()).unwrap();

    assert_eq!(table.len(), 20, "no rows added or removed");
    table.validate_enriched().expect("every column populated");

    for r in table.records() {
        assert!(r.kmeans_label.is_some());
        assert!(r.hdb_label.is_some());
        assert!(r.x_2d.is_some() && r.y_2d.is_some());
        assert!(r.x_3d.is_some() && r.y_3d.is_some() && r.z_3d.is_some());
    }
}

#[test]
fn partitional_labels_split_the_two_themes() {
    let mut table = synthetic_table();
    cluster::analyze(&mut table, &ClusterParams::default()).unwrap();

    let labels: Vec<i32> = table
        .records()
        .iter()
        .map(|r| r.kmeans_label.unwrap())
        .collect();

    assert!(labels.iter().all(|&l| l == 0 || l == 1));
    assert!(labels.contains(&0) && labels.contains(&1));
}

#[test]
fn density_labels_are_noise_or_nonnegative() {
    let mut table = synthetic_table();
    cluster::analyze(&mut table, &ClusterParams::default()).unwrap();

    let labels: Vec<i32> = table
        .records()
        .iter()
        .map(|r| r.hdb_label.unwrap())
        .collect();

    assert!(labels.iter().all(|&l| l >= NOISE));
    let noise = labels.iter().filter(|&&l| l == NOISE).count();
    assert!(noise <= labels.len());
}

#[test]
fn analyze_is_reproducible_for_identical_content() {
    let mut a = synthetic_table();
    let mut b = synthetic_table();
    cluster::analyze(&mut a, &ClusterParams::default()).unwrap();
    cluster::analyze(&mut b, &ClusterParams::default()).unwrap();

    for (ra, rb) in a.records().iter().zip(b.records()) {
        assert_eq!(ra.kmeans_label, rb.kmeans_label);
        assert_eq!(ra.hdb_label, rb.hdb_label);
    }
}

#[test]
fn degenerate_corpus_is_surfaced_not_swallowed() {
    let mut table = RecordTable::new();
    for i in 0..3 {
        table.push(DatasetRecord::new(
            format!("{i}"),
            format!("GSE{i}"),
            "too small".to_string(),
            Vec::new(),
        ));
    }
    let err = cluster::analyze(&mut table, &ClusterParams::default()).unwrap_err();
    assert!(matches!(err, PipelineError::DegenerateCorpus(_)));
}

// ============================================================
// assemble: artifact contract
// ============================================================

#[test]
fn assemble_returns_exactly_the_four_fixed_artifacts() {
    let mut table = synthetic_table();
    cluster::analyze(&mut table, &ClusterParams::default()).unwrap();

    let artifacts = assemble(&table, &PlotConfig::default());
    assert_eq!(artifacts.len(), 4);
    for name in ARTIFACT_NAMES {
        let fragment = artifacts.get(name).expect("fixed artifact name present");
        assert!(!fragment.is_empty());
        assert!(fragment.contains(name), "fragment embeds its div id");
    }
}

#[test]
fn assemble_works_for_a_single_record() {
    let mut table = RecordTable::new();
    let mut record = DatasetRecord::new(
        "200001".to_string(),
        "GSE1".to_string(),
        "solo record".to_string(),
        vec!["12345".to_string()],
    );
    record.kmeans_label = Some(0);
    record.hdb_label = Some(NOISE);
    record.x_2d = Some(0.0);
    record.y_2d = Some(0.0);
    record.x_3d = Some(0.0);
    record.y_3d = Some(0.0);
    record.z_3d = Some(0.0);
    table.push(record);

    let artifacts = assemble(&table, &PlotConfig::default());
    assert_eq!(artifacts.len(), 4);
}

#[test]
fn hover_metadata_carries_accession_and_linked_identifiers() {
    let mut table = synthetic_table();
    cluster::analyze(&mut table, &ClusterParams::default()).unwrap();

    let artifacts = assemble(&table, &PlotConfig::default());
    let fragment = &artifacts["plot_kmeans_2d"];
    assert!(fragment.contains("GSE1000"));
    assert!(fragment.contains("30000"));
}

// ============================================================
// pipeline: empty input
// ============================================================

#[tokio::test]
async fn empty_identifier_list_fails_before_any_network_call() {
    // Config points at real endpoints, but the check fires first.
    let err = pipeline::process(&[], &Config::default()).await.unwrap_err();
    assert!(matches!(err, PipelineError::EmptyInput(_)));
}
