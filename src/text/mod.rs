pub mod tfidf;

pub use tfidf::{TfIdfMatrix, TfIdfVectorizer};
