// Web front end — a thin Axum wrapper around the pipeline.
//
// GET / serves an upload form; POST /upload reads the uploaded identifier
// list, splits it on newlines and commas, runs the pipeline, and renders
// the four fragments into the same page. The pipeline's contract doesn't
// change for this surface — it could be swapped for any other caller.

use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Multipart, State};
use axum::response::Html;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::Config;
use crate::pipeline;
use crate::plot::{ArtifactMap, ARTIFACT_NAMES};

/// Shared application state threaded through the handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
}

/// Start the web server and block until it exits.
pub async fn run_server(config: Config, port: u16, bind: &str) -> Result<()> {
    let state = AppState {
        config: Arc::new(config),
    };

    let app = Router::new()
        .route("/", get(index))
        .route("/upload", post(upload))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("{bind}:{port}");
    info!("geoclust listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// GET / — the upload form.
async fn index() -> Html<String> {
    Html(render_page(None, None))
}

/// POST /upload — run the pipeline on the uploaded identifier list.
async fn upload(State(state): State<AppState>, mut multipart: Multipart) -> Html<String> {
    let mut raw = String::new();
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => match field.text().await {
                Ok(text) => raw.push_str(&text),
                Err(e) => {
                    warn!(error = %e, "Unreadable multipart field, skipping");
                }
            },
            Ok(None) => break,
            Err(e) => {
                return Html(render_page(None, Some(&format!("invalid upload: {e}"))));
            }
        }
    }

    let identifiers = pipeline::split_identifiers(&raw);
    info!(identifiers = identifiers.len(), "Upload received");

    match pipeline::process(&identifiers, &state.config).await {
        Ok(artifacts) => Html(render_page(Some(&artifacts), None)),
        Err(e) => {
            warn!(error = %e, "Pipeline run failed");
            Html(render_page(None, Some(&e.to_string())))
        }
    }
}

/// Render the single page: form, optional error banner, optional plots.
fn render_page(artifacts: Option<&ArtifactMap>, error: Option<&str>) -> String {
    let mut body = String::from(
        "<h1>GEO dataset clusters</h1>\n\
         <form action=\"/upload\" method=\"post\" enctype=\"multipart/form-data\">\n\
           <p>Upload a file of PubMed ids (newline- or comma-separated):</p>\n\
           <input type=\"file\" name=\"file\" required>\n\
           <button type=\"submit\">Cluster</button>\n\
         </form>\n",
    );

    if let Some(error) = error {
        body.push_str(&format!(
            "<p style=\"color:#b00\">{}</p>\n",
            html_escape(error)
        ));
    }

    if let Some(artifacts) = artifacts {
        for name in ARTIFACT_NAMES {
            if let Some(fragment) = artifacts.get(name) {
                body.push_str(&format!("<h2>{name}</h2>\n{fragment}\n"));
            }
        }
    }

    format!(
        "<!DOCTYPE html>\n<html><head><title>geoclust</title>\n\
         <script src=\"https://cdn.plot.ly/plotly-2.35.2.min.js\"></script>\n\
         </head><body>\n{body}</body></html>\n"
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
