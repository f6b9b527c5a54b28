use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;

use geoclust::config::Config;
use geoclust::pipeline;
use geoclust::plot::ARTIFACT_NAMES;

/// geoclust: cluster GEO datasets linked from PubMed identifiers.
///
/// Resolves each PubMed id to its associated GEO series, aggregates the
/// descriptive text, clusters the datasets two ways, and renders 2D/3D
/// projections of the result.
#[derive(Parser)]
#[command(name = "geoclust", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve, cluster, and write the plots for a list of PubMed ids
    Cluster {
        /// File containing PubMed ids (newline- or comma-separated)
        file: PathBuf,

        /// Where to write the assembled HTML page
        #[arg(long, default_value = "output/geoclust.html")]
        out: PathBuf,
    },

    /// Serve the upload form and run the pipeline per request
    #[cfg(feature = "web")]
    Serve {
        /// Port to listen on
        #[arg(long, default_value = "8080")]
        port: u16,

        /// Bind address
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("geoclust=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Cluster { file, out } => {
            let config = Config::load()?;

            let raw = fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let identifiers = pipeline::split_identifiers(&raw);

            println!(
                "Clustering datasets for {} identifiers...",
                identifiers.len()
            );

            let artifacts = pipeline::process(&identifiers, &config).await?;

            if let Some(parent) = out.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&out, host_page(&artifacts))
                .with_context(|| format!("failed to write {}", out.display()))?;

            println!("\n{}", "Clustering complete.".bold());
            println!("  Artifacts: {}", artifacts.len());
            println!("  Page: {}", out.display());
        }

        #[cfg(feature = "web")]
        Commands::Serve { port, bind } => {
            let config = Config::load()?;
            tracing::info!(port, "Starting web front end");
            geoclust::web::run_server(config, port, &bind).await?;
        }
    }

    Ok(())
}

/// Wrap the four fragments in a minimal host page that loads plotly.js.
fn host_page(artifacts: &geoclust::plot::ArtifactMap) -> String {
    let mut body = String::new();
    for name in ARTIFACT_NAMES {
        if let Some(fragment) = artifacts.get(name) {
            body.push_str(&format!("<h2>{name}</h2>\n{fragment}\n"));
        }
    }

    format!(
        "<!DOCTYPE html>\n<html><head><title>geoclust</title>\n\
         <script src=\"https://cdn.plot.ly/plotly-2.35.2.min.js\"></script>\n\
         </head><body>\n<h1>GEO dataset clusters</h1>\n{body}</body></html>\n"
    )
}
