// Best-effort fetch of the "Overall design" text from a GEO accession page.
//
// This is the per-field degradation point: any failure here — network error,
// non-success status, or the expected table cell missing from the HTML —
// yields the placeholder string instead of failing the run.

use std::time::Duration;

use scraper::{Html, Selector};
use tracing::warn;

/// Fallback design description when the detail page can't be used.
pub const DESIGN_PLACEHOLDER: &str = "Overall design: not fetched";

/// Client for the GEO accession display pages.
pub struct GeoDetailClient {
    client: reqwest::Client,
    base_url: String,
}

impl GeoDetailClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent("geoclust/0.1 (dataset-clustering)")
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    /// Fetch the accession page and extract the design description.
    /// Never fails — degrades to [`DESIGN_PLACEHOLDER`].
    pub async fn fetch_overall_design(&self, accession: &str) -> String {
        let response = match self
            .client
            .get(&self.base_url)
            .query(&[("acc", accession)])
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!(accession, error = %e, "Detail page request failed");
                return DESIGN_PLACEHOLDER.to_string();
            }
        };

        if !response.status().is_success() {
            warn!(accession, status = %response.status(), "Detail page returned non-success");
            return DESIGN_PLACEHOLDER.to_string();
        }

        let body = match response.text().await {
            Ok(b) => b,
            Err(e) => {
                warn!(accession, error = %e, "Failed to read detail page body");
                return DESIGN_PLACEHOLDER.to_string();
            }
        };

        match extract_overall_design(&body) {
            Some(design) => design,
            None => {
                warn!(accession, "No 'Overall design' cell on detail page");
                DESIGN_PLACEHOLDER.to_string()
            }
        }
    }
}

/// Find the table cell labeled "Overall design" and join the text of the
/// cell that follows it. Returns None when the label cell is absent.
pub fn extract_overall_design(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let td = Selector::parse("td").ok()?;

    let cells: Vec<_> = doc.select(&td).collect();
    let label_idx = cells
        .iter()
        .position(|c| c.text().collect::<String>().trim() == "Overall design")?;

    let value = cells.get(label_idx + 1)?;
    let parts: Vec<String> = value
        .text()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();

    if parts.is_empty() {
        return None;
    }

    Some(format!("Overall design: {}", parts.join("; ")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_design_from_sibling_cell() {
        let html = r#"
            <html><body><table>
              <tr><td>Summary</td><td>irrelevant</td></tr>
              <tr><td>Overall design</td><td>RNA-seq of 12 samples,
                  <br> 3 replicates each </td></tr>
            </table></body></html>
        "#;
        let design = extract_overall_design(html).unwrap();
        assert_eq!(
            design,
            "Overall design: RNA-seq of 12 samples,; 3 replicates each"
        );
    }

    #[test]
    fn missing_label_cell_yields_none() {
        let html = "<html><body><table><tr><td>Summary</td><td>x</td></tr></table></body></html>";
        assert!(extract_overall_design(html).is_none());
    }

    #[test]
    fn label_without_value_cell_yields_none() {
        let html = "<html><body><table><tr><td>Overall design</td></tr></table></body></html>";
        assert!(extract_overall_design(html).is_none());
    }

    #[tokio::test]
    async fn unreachable_endpoint_degrades_to_placeholder() {
        // Port 1 on loopback refuses the connection immediately.
        let client =
            GeoDetailClient::new("http://127.0.0.1:1/acc.cgi", Duration::from_secs(2)).unwrap();
        let design = client.fetch_overall_design("GSE1").await;
        assert_eq!(design, DESIGN_PLACEHOLDER);
    }
}
