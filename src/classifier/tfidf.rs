//! TF-IDF vector space over a fixed document corpus.
//!
//! [`TfIdfBuilder`] collects per-document term histograms; [`TfIdfBuilder::build`]
//! consumes it and yields an immutable [`Predictor`] that scores unseen text by
//! cosine similarity against every trained document.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use log::debug;

use super::tokenizer::{phrase_class, tokenize, MAX_PHRASE_WORDS};

/// Upper bound on terms retained per document.
pub const MAX_RETAINED_TERMS: usize = 20;

/// Distinct weight levels a single phrase class may contribute per document.
pub const MAX_LEVELS_PER_PHRASE_CLASS: usize = 5;

type SparseVector = HashMap<usize, f64>;

#[derive(Debug)]
struct Document {
    id: String,
    term_counts: HashMap<String, usize>,
}

/// Mutable corpus accumulator. The only path to a [`Predictor`] is [`build`](Self::build).
#[derive(Debug, Default)]
pub struct TfIdfBuilder {
    documents: Vec<Document>,
    term_documents: HashMap<String, BTreeSet<usize>>,
}

impl TfIdfBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokenize `text` and record it under `id`.
    pub fn add_document(&mut self, id: impl Into<String>, text: &str) {
        let index = self.documents.len();
        let mut term_counts: HashMap<String, usize> = HashMap::new();
        for term in tokenize(text) {
            *term_counts.entry(term).or_insert(0) += 1;
        }
        for term in term_counts.keys() {
            self.term_documents
                .entry(term.clone())
                .or_default()
                .insert(index);
        }
        self.documents.push(Document {
            id: id.into(),
            term_counts,
        });
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Compute IDF weights, pick each document's distinguishing terms and
    /// project every document onto the resulting vocabulary.
    pub fn build(self) -> Predictor {
        let total = self.documents.len() as f64;
        let idf: HashMap<String, f64> = self
            .term_documents
            .iter()
            .map(|(term, docs)| (term.clone(), (total / docs.len() as f64).ln()))
            .collect();

        let mut retained: BTreeSet<&str> = BTreeSet::new();
        for doc in &self.documents {
            let mut ranked: Vec<(&str, f64)> = doc
                .term_counts
                .iter()
                .map(|(term, &count)| (term.as_str(), count as f64 * idf[term]))
                .filter(|(_, weight)| *weight > 0.0)
                .collect();
            ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
            retained.extend(select_terms(&ranked));
        }

        let vocabulary: HashMap<String, usize> = retained
            .iter()
            .enumerate()
            .map(|(index, term)| ((*term).to_string(), index))
            .collect();
        let idf: HashMap<String, f64> = idf
            .into_iter()
            .filter(|(term, _)| vocabulary.contains_key(term))
            .collect();

        let documents = self
            .documents
            .iter()
            .map(|doc| {
                let vector = project(
                    doc.term_counts.iter().map(|(t, c)| (t.as_str(), *c)),
                    &vocabulary,
                    &idf,
                );
                (doc.id.clone(), vector)
            })
            .collect::<Vec<_>>();

        debug!(
            "Built TF-IDF model: {} documents, {} retained terms",
            documents.len(),
            vocabulary.len()
        );

        Predictor {
            vocabulary,
            idf,
            documents,
        }
    }
}

/// Walk terms in descending weight and keep the strongest ones, limiting how
/// many weight levels each phrase class (unigram, bigram, trigram) may claim so
/// that one repetitive phrase family cannot crowd out the rest.
fn select_terms<'a>(ranked: &[(&'a str, f64)]) -> Vec<&'a str> {
    let mut levels: [Vec<f64>; MAX_PHRASE_WORDS] = Default::default();
    let mut selected = Vec::new();

    for &(term, weight) in ranked {
        if selected.len() == MAX_RETAINED_TERMS {
            break;
        }
        let class_levels = &mut levels[phrase_class(term)];
        let same_level = class_levels
            .last()
            .is_some_and(|level| (level - weight).abs() <= f64::EPSILON * level.abs());
        if !same_level {
            if class_levels.len() == MAX_LEVELS_PER_PHRASE_CLASS {
                continue;
            }
            class_levels.push(weight);
        }
        selected.push(term);
    }
    selected
}

/// tf*idf over the vocabulary, L2-normalized. Terms outside the vocabulary are ignored.
fn project<'a>(
    counts: impl Iterator<Item = (&'a str, usize)>,
    vocabulary: &HashMap<String, usize>,
    idf: &HashMap<String, f64>,
) -> SparseVector {
    let mut vector: SparseVector = counts
        .filter_map(|(term, count)| {
            let index = *vocabulary.get(term)?;
            let weight = count as f64 * idf.get(term)?;
            Some((index, weight))
        })
        .collect();

    let norm = vector.values().map(|w| w * w).sum::<f64>().sqrt();
    if norm > 0.0 {
        for weight in vector.values_mut() {
            *weight /= norm;
        }
    }
    vector
}

fn dot(a: &SparseVector, b: &SparseVector) -> f64 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small
        .iter()
        .filter_map(|(index, weight)| large.get(index).map(|other| weight * other))
        .sum()
}

/// Immutable, thread-safe similarity scorer produced by [`TfIdfBuilder::build`].
#[derive(Debug)]
pub struct Predictor {
    vocabulary: HashMap<String, usize>,
    idf: HashMap<String, f64>,
    documents: Vec<(String, SparseVector)>,
}

impl Predictor {
    /// Cosine similarity (`0.0..=1.0`) of `text` against every trained document.
    pub fn predict(&self, text: &str) -> BTreeMap<String, f64> {
        let query = self.query_vector(text);
        self.documents
            .iter()
            .map(|(id, vector)| (id.clone(), dot(&query, vector)))
            .collect()
    }

    /// The `limit` best documents with a positive score, best first.
    /// Equal scores are ordered by document id.
    pub fn rank(&self, text: &str, limit: usize) -> Vec<(String, f64)> {
        let mut scores: Vec<(String, f64)> = self
            .predict(text)
            .into_iter()
            .filter(|(_, score)| *score > 0.0)
            .collect();
        scores.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        scores.truncate(limit);
        scores
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    fn query_vector(&self, text: &str) -> SparseVector {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for term in tokenize(text) {
            *counts.entry(term).or_insert(0) += 1;
        }
        project(
            counts.iter().map(|(t, c)| (t.as_str(), *c)),
            &self.vocabulary,
            &self.idf,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Predictor {
        let mut builder = TfIdfBuilder::new();
        builder.add_document("Apache-1.1", "Apache License 1.1");
        builder.add_document("Apache-2.0", "Apache License 2.0");
        builder.add_document("MIT", "MIT License");
        builder.add_document("BSD-3-Clause", "BSD 3-Clause \"New\" or \"Revised\" License");
        builder.build()
    }

    #[test]
    fn test_exact_title_scores_one() {
        let predictor = sample();
        let scores = predictor.predict("Apache License 2.0");
        assert!((scores["Apache-2.0"] - 1.0).abs() < 1e-9);
        assert!(scores["Apache-1.1"] < scores["Apache-2.0"]);
    }

    #[test]
    fn test_rank_orders_best_first() {
        let predictor = sample();
        let ranked = predictor.rank("The Apache Software License, Version 1.1", 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].0, "Apache-1.1");
        assert_eq!(ranked[1].0, "Apache-2.0");
    }

    #[test]
    fn test_unrelated_text_scores_zero() {
        let predictor = sample();
        assert!(predictor.predict("lorem ipsum").values().all(|s| *s == 0.0));
        assert!(predictor.rank("lorem ipsum", 5).is_empty());
    }

    #[test]
    fn test_every_document_scored() {
        let predictor = sample();
        assert_eq!(predictor.document_count(), 4);
        assert!(predictor.vocabulary_len() > 0);
        assert_eq!(predictor.predict("MIT").len(), 4);
    }

    #[test]
    fn test_selection_caps_levels_per_class() {
        let ranked: Vec<(&str, f64)> = (0..10)
            .map(|i| (["a", "b", "c", "d", "e", "f", "g", "h", "i", "j"][i], 10.0 - i as f64))
            .chain([("x y", 0.5)])
            .collect();
        let selected = select_terms(&ranked);
        assert_eq!(selected, vec!["a", "b", "c", "d", "e", "x y"]);
    }

    #[test]
    fn test_selection_ties_share_a_level() {
        let ranked = vec![("a", 2.0), ("b", 2.0), ("c", 2.0), ("d", 1.0)];
        assert_eq!(select_terms(&ranked), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_selection_total_cap() {
        let terms: Vec<String> = (0..30).map(|i| format!("t{i}")).collect();
        let ranked: Vec<(&str, f64)> = terms.iter().map(|t| (t.as_str(), 1.0)).collect();
        assert_eq!(select_terms(&ranked).len(), MAX_RETAINED_TERMS);
    }

    #[test]
    fn test_empty_corpus() {
        let predictor = TfIdfBuilder::new().build();
        assert!(predictor.predict("MIT").is_empty());
    }
}
