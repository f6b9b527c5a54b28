// geoclust: cluster GEO datasets linked from PubMed identifiers.
//
// This is the library root. Each module corresponds to one stage of the
// pipeline: geo resolves metadata, text vectorizes it, cluster labels and
// projects it, plot renders it. pipeline wires the stages together.

pub mod cluster;
pub mod config;
pub mod error;
pub mod geo;
pub mod pipeline;
pub mod plot;
pub mod table;
pub mod text;

#[cfg(feature = "web")]
pub mod web;
