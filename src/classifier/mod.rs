//! Statistical license guessing from free text.

pub mod corpus;
pub mod tfidf;
pub mod tokenizer;

pub use corpus::{text_model, title_model, Classifier};
pub use tfidf::{Predictor, TfIdfBuilder};
pub use tokenizer::tokenize;
