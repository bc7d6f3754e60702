//! Resolution of free-text license mentions to standard identifiers.
//!
//! A title is tried against, in order: the public-domain phrase, the exact
//! identifier table, the title/alias table, URIs of the best title-model
//! candidates, and finally the single best candidate if it clears the
//! similarity threshold.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::classifier::corpus::{exceeds, title_model, DEFAULT_CANDIDATES};
use crate::classifier::tfidf::Predictor;
use crate::error::UnresolvedLicenseError;
use crate::license::expression::{FreeText, License, LicenseException, LicenseExpression};
use crate::license::spdx::LicenseCatalog;

pub const DEFAULT_SIMILARITY_THRESHOLD: u8 = 42;

const PUBLIC_DOMAIN: &str = "public domain";
const PUBLIC_DOMAIN_ID: &str = "CC0-1.0";

static SCHEME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9+.\-]*://").expect("Invalid scheme pattern"));

/// Immutable after construction; safe to share across threads.
#[derive(Debug)]
pub struct Normalizer {
    catalog: LicenseCatalog,
    titles: Predictor,
    threshold: u8,
}

impl Normalizer {
    pub fn new(catalog: LicenseCatalog, threshold: u8) -> Self {
        let titles = title_model(&catalog);
        Self {
            catalog,
            titles,
            threshold,
        }
    }

    pub fn catalog(&self) -> &LicenseCatalog {
        &self.catalog
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Resolve a free-text license, or `None` when nothing is confident enough.
    pub fn normalize_license(&self, text: &FreeText) -> Option<LicenseExpression> {
        self.resolve(text).ok()
    }

    /// Like [`normalize_license`](Self::normalize_license), but reports the
    /// closest candidate when resolution fails.
    pub fn resolve(&self, text: &FreeText) -> Result<LicenseExpression, UnresolvedLicenseError> {
        let title = text.title.trim();

        if title.eq_ignore_ascii_case(PUBLIC_DOMAIN) {
            debug!("`{}` is public domain", title);
            return Ok(self.standard(PUBLIC_DOMAIN_ID));
        }
        if let Some(record) = self.catalog.find_license(title) {
            debug!("`{}` is a known identifier", title);
            return Ok(LicenseExpression::license(record.to_license()));
        }
        if let Some(record) = self.catalog.find_by_alias(title) {
            debug!("`{}` is a known title of {}", title, record.id);
            return Ok(LicenseExpression::license(record.to_license()));
        }

        let candidates = self.titles.rank(title, DEFAULT_CANDIDATES);
        let input_uris: Vec<String> = text.uris.iter().map(|u| canonical_uri(u)).collect();
        if !input_uris.is_empty() {
            for (id, _) in &candidates {
                let Some(record) = self.catalog.find_license(id) else {
                    continue;
                };
                if record
                    .uris
                    .iter()
                    .any(|uri| input_uris.contains(&canonical_uri(uri)))
                {
                    debug!("`{}` matched {} by URI", text, record.id);
                    return Ok(LicenseExpression::license(record.to_license()));
                }
            }
        }

        match candidates.into_iter().next() {
            Some((id, score)) if exceeds(score, self.threshold) => {
                debug!("`{}` resolved to {} with similarity {:.2}", title, id, score);
                Ok(self.standard(&id))
            }
            best_candidate => {
                debug!("`{}` is unresolved", text);
                Err(UnresolvedLicenseError {
                    title: title.to_string(),
                    best_candidate,
                })
            }
        }
    }

    /// Resolve a free-text exception by identifier or title.
    pub fn normalize_exception(&self, text: &FreeText) -> Option<LicenseException> {
        self.catalog
            .find_exception(&text.title)
            .map(|record| record.to_exception())
    }

    /// Resolve every free-text leaf of `expr` and give standard leaves their
    /// catalog spelling. Leaves that cannot be resolved stay as they are.
    pub fn normalize(&self, expr: &LicenseExpression) -> LicenseExpression {
        expr.map_leaves(
            &|license: &License| self.normalize_leaf(license),
            &|exception: &LicenseException| self.normalize_exception_leaf(exception),
        )
    }

    /// The replacement for a single leaf, or `None` when it is already canonical
    /// or cannot be resolved.
    fn normalize_leaf(&self, license: &License) -> Option<License> {
        match license {
            License::Simple(text) => match self.normalize_license(text)? {
                LicenseExpression::License(resolved) => Some(resolved),
                _ => None,
            },
            License::Standard(_) => self.catalog.respell_license(license),
        }
    }

    fn normalize_exception_leaf(&self, exception: &LicenseException) -> Option<LicenseException> {
        match exception {
            LicenseException::Simple(text) => self.normalize_exception(text),
            LicenseException::Standard(_) => self.catalog.respell_exception(exception),
        }
    }

    fn standard(&self, id: &str) -> LicenseExpression {
        LicenseExpression::license(self.catalog.license(id))
    }
}

/// Two URIs look the same when they differ only in scheme, a `www.` prefix,
/// a trailing slash or a `.txt` / `.md` extension.
pub fn canonical_uri(uri: &str) -> String {
    let lower = uri.trim().to_lowercase();
    let without_scheme = SCHEME_PATTERN.replace(&lower, "");
    let mut rest: &str = without_scheme.strip_prefix("www.").unwrap_or(&*without_scheme);
    rest = rest.trim_end_matches('/');
    for extension in [".txt", ".md"] {
        if let Some(stripped) = rest.strip_suffix(extension) {
            rest = stripped;
        }
    }
    rest.trim_end_matches('/').to_string()
}
