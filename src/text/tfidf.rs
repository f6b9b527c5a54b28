// TF-IDF vectorization of record content.
//
// Case-insensitive tokenization, English stopword removal via the
// stop-words crate, and document-frequency pruning: a term must appear in
// at least `min_df` records and at most `max_df` (fraction) of records to
// be kept as a feature. Weighting uses smoothed IDF and L2-normalized rows.

use std::collections::{HashMap, HashSet};

use stop_words::{get, LANGUAGE};
use tracing::info;

use crate::error::PipelineError;

/// Dense document-term matrix plus the retained vocabulary.
pub struct TfIdfMatrix {
    /// One L2-normalized row per input document.
    pub rows: Vec<Vec<f64>>,
    /// Retained terms, sorted, one per column.
    pub vocab: Vec<String>,
}

/// Term-weighted vectorizer over free-text record content.
pub struct TfIdfVectorizer {
    /// Minimum number of documents a term must appear in.
    pub min_df: usize,
    /// Maximum fraction of documents a term may appear in.
    pub max_df: f64,
}

impl Default for TfIdfVectorizer {
    fn default() -> Self {
        Self {
            min_df: 5,
            max_df: 0.9,
        }
    }
}

impl TfIdfVectorizer {
    /// Build the weighted feature matrix over all documents.
    ///
    /// Fails with `DegenerateCorpus` when no term survives pruning — e.g.
    /// fewer than `min_df` documents total, or content too sparse.
    pub fn fit_transform(&self, docs: &[String]) -> Result<TfIdfMatrix, PipelineError> {
        let stop: HashSet<String> = get(LANGUAGE::English).into_iter().collect();

        let tokenized: Vec<Vec<String>> = docs.iter().map(|d| tokenize(d, &stop)).collect();

        // Document frequency: in how many documents does each term occur?
        let mut df: HashMap<&str, usize> = HashMap::new();
        for tokens in &tokenized {
            let unique: HashSet<&str> = tokens.iter().map(String::as_str).collect();
            for term in unique {
                *df.entry(term).or_insert(0) += 1;
            }
        }

        let n_docs = docs.len();
        let max_count = (self.max_df * n_docs as f64).floor() as usize;
        let mut vocab: Vec<String> = df
            .iter()
            .filter(|(_, &count)| count >= self.min_df && count <= max_count)
            .map(|(term, _)| term.to_string())
            .collect();
        vocab.sort();

        if vocab.is_empty() {
            return Err(PipelineError::DegenerateCorpus(format!(
                "no term appears in >= {} and <= {:.0}% of {} documents",
                self.min_df,
                self.max_df * 100.0,
                n_docs
            )));
        }

        info!(features = vocab.len(), documents = n_docs, "Vectorized corpus");

        let col: HashMap<&str, usize> = vocab
            .iter()
            .enumerate()
            .map(|(i, t)| (t.as_str(), i))
            .collect();

        // Smoothed IDF, matching the usual ln((1+n)/(1+df)) + 1 form.
        let idf: Vec<f64> = vocab
            .iter()
            .map(|t| {
                let d = df.get(t.as_str()).copied().unwrap_or(0) as f64;
                ((1.0 + n_docs as f64) / (1.0 + d)).ln() + 1.0
            })
            .collect();

        let rows = tokenized
            .iter()
            .map(|tokens| {
                let mut row = vec![0.0; vocab.len()];
                for token in tokens {
                    if let Some(&j) = col.get(token.as_str()) {
                        row[j] += 1.0;
                    }
                }
                for (j, v) in row.iter_mut().enumerate() {
                    *v *= idf[j];
                }
                l2_normalize(&mut row);
                row
            })
            .collect();

        Ok(TfIdfMatrix { rows, vocab })
    }
}

/// Lowercase, split on non-alphanumeric boundaries, drop single characters
/// and stopwords.
fn tokenize(text: &str, stop: &HashSet<String>) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= 2)
        .filter(|t| !stop.contains(*t))
        .map(str::to_string)
        .collect()
}

fn l2_normalize(row: &mut [f64]) {
    let norm = row.iter().map(|v| v * v).sum::<f64>().sqrt();
    if norm > 0.0 {
        for v in row.iter_mut() {
            *v /= norm;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn terms_below_min_df_are_pruned() {
        // "shared" is in 6 of 12 docs, "rare" in only 2.
        let mut corpus = Vec::new();
        for i in 0..12 {
            let text = if i < 6 {
                format!("shared topic number{i}")
            } else {
                format!("other topic number{i}")
            };
            corpus.push(if i < 2 { format!("{text} rare") } else { text });
        }

        let m = TfIdfVectorizer::default().fit_transform(&corpus).unwrap();
        assert!(m.vocab.contains(&"shared".to_string()));
        assert!(!m.vocab.contains(&"rare".to_string()));
    }

    #[test]
    fn ubiquitous_terms_are_pruned_by_max_df() {
        // "everywhere" is in all 12 docs: 12 > floor(0.9 * 12) = 10.
        let corpus: Vec<String> = (0..12)
            .map(|i| {
                if i < 6 {
                    "everywhere alpha".to_string()
                } else {
                    "everywhere beta".to_string()
                }
            })
            .collect();

        let m = TfIdfVectorizer::default().fit_transform(&corpus).unwrap();
        assert!(!m.vocab.contains(&"everywhere".to_string()));
        assert!(m.vocab.contains(&"alpha".to_string()));
    }

    #[test]
    fn stopwords_never_become_features() {
        let corpus: Vec<String> = (0..12)
            .map(|_| "the and of protein expression analysis".to_string())
            .collect();
        // "the"/"and"/"of" are stopwords; the rest are pruned by max_df
        // (present in 100% of docs), so the corpus is degenerate.
        let result = TfIdfVectorizer::default().fit_transform(&corpus);
        assert!(matches!(result, Err(PipelineError::DegenerateCorpus(_))));
    }

    #[test]
    fn tiny_corpus_is_degenerate() {
        let corpus = docs(&["one study", "two study", "three study"]);
        let result = TfIdfVectorizer::default().fit_transform(&corpus);
        assert!(matches!(result, Err(PipelineError::DegenerateCorpus(_))));
    }

    #[test]
    fn rows_are_unit_length() {
        let corpus: Vec<String> = (0..10)
            .map(|i| {
                if i % 2 == 0 {
                    "tumor sequencing cohort".to_string()
                } else {
                    "mouse microarray liver".to_string()
                }
            })
            .collect();

        let m = TfIdfVectorizer::default().fit_transform(&corpus).unwrap();
        for row in &m.rows {
            let norm = row.iter().map(|v| v * v).sum::<f64>().sqrt();
            assert!((norm - 1.0).abs() < 1e-9, "row norm was {norm}");
        }
    }
}
