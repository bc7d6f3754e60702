use log::debug;

use crate::error::UnresolvedLicenseError;
use crate::license::spdx::LicenseCatalog;

use super::tfidf::{Predictor, TfIdfBuilder};

/// Candidates considered when ranking free text.
pub const DEFAULT_CANDIDATES: usize = 20;

/// Model over canonical titles only, used to resolve short license names.
pub fn title_model(catalog: &LicenseCatalog) -> Predictor {
    let mut builder = TfIdfBuilder::new();
    for record in catalog.licenses() {
        builder.add_document(record.id.clone(), &record.title);
    }
    builder.build()
}

/// Model over title plus characteristic text, used to recognize license files.
pub fn text_model(catalog: &LicenseCatalog) -> Predictor {
    let mut builder = TfIdfBuilder::new();
    for record in catalog.licenses() {
        let document = format!("{}\n{}", record.title, record.text);
        builder.add_document(record.id.clone(), &document);
    }
    builder.build()
}

/// `score` (`0.0..=1.0`) against a threshold on the `0..=100` scale.
pub fn exceeds(score: f64, threshold: u8) -> bool {
    score * 100.0 > f64::from(threshold)
}

/// Guesses the license of unstructured text such as a LICENSE file.
#[derive(Debug)]
pub struct Classifier {
    predictor: Predictor,
    threshold: u8,
}

impl Classifier {
    pub fn new(catalog: &LicenseCatalog, threshold: u8) -> Self {
        Self {
            predictor: text_model(catalog),
            threshold,
        }
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    pub fn rank(&self, text: &str, limit: usize) -> Vec<(String, f64)> {
        self.predictor.rank(text, limit)
    }

    /// Best candidate id and score, provided the score exceeds the threshold.
    pub fn classify(&self, text: &str) -> Result<(String, f64), UnresolvedLicenseError> {
        let best = self.predictor.rank(text, 1).into_iter().next();
        match best {
            Some((id, score)) if exceeds(score, self.threshold) => {
                debug!("Classified text as {} ({:.2})", id, score);
                Ok((id, score))
            }
            best_candidate => Err(UnresolvedLicenseError {
                title: excerpt(text),
                best_candidate,
            }),
        }
    }
}

fn excerpt(text: &str) -> String {
    const MAX_CHARS: usize = 60;
    let line = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if line.chars().count() <= MAX_CHARS {
        return line;
    }
    let cut: String = line.chars().take(MAX_CHARS).collect();
    format!("{cut}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_is_strict() {
        assert!(exceeds(0.43, 42));
        assert!(!exceeds(0.42, 42));
        assert!(!exceeds(1.0, 100));
        assert!(exceeds(0.01, 0));
    }

    #[test]
    fn test_title_model_resolves_reworded_title() {
        let predictor = title_model(&LicenseCatalog::builtin());
        let ranked = predictor.rank("The Apache Software License, Version 1.1", DEFAULT_CANDIDATES);
        assert_eq!(ranked[0].0, "Apache-1.1");
        assert!(exceeds(ranked[0].1, 42));
    }

    #[test]
    fn test_classifies_license_text() {
        let classifier = Classifier::new(&LicenseCatalog::builtin(), 42);
        let text = "Copyright (c) 2024 Acme Corp\n\n\
                    Permission is hereby granted, free of charge, to any person obtaining a copy \
                    of this software and associated documentation files (the \"Software\"), to \
                    deal in the Software without restriction, including without limitation the \
                    rights to use, copy, modify, merge, publish, distribute, sublicense, and/or \
                    sell copies of the Software. The above copyright notice and this permission \
                    notice shall be included in all copies or substantial portions of the Software.";
        let (id, _) = classifier.classify(text).unwrap();
        assert_eq!(id, "MIT");
    }

    #[test]
    fn test_unrelated_text_is_unresolved() {
        let classifier = Classifier::new(&LicenseCatalog::builtin(), 42);
        let err = classifier.classify("lorem ipsum dolor sit amet").unwrap_err();
        assert_eq!(err.title, "lorem ipsum dolor sit amet");
        assert_eq!(err.best_candidate, None);
    }

    #[test]
    fn test_excerpt_truncates_long_text() {
        let text = "word ".repeat(40);
        let short = excerpt(&text);
        assert!(short.ends_with("..."));
        assert_eq!(short.chars().count(), 63);
    }
}
