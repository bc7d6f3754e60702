//! End-to-end checking: parse or normalize, expand, evaluate.

use log::{debug, warn};

use crate::classifier::corpus::Classifier;
use crate::config::Config;
use crate::error::Result;
use crate::license::compatibility::{CompatibilityPolicy, CompatibilityResult};
use crate::license::equivalence::Expander;
use crate::license::expression::{FreeText, License, LicenseExpression};
use crate::license::normalizer::Normalizer;
use crate::license::parser::parse;
use crate::models::{CheckedLicense, InputSource};

/// Every immutable model the checks need, built once from a [`Config`].
#[derive(Debug)]
pub struct Engine {
    normalizer: Normalizer,
    classifier: Classifier,
    policy: CompatibilityPolicy,
}

impl Engine {
    pub fn from_config(config: &Config) -> Result<Self> {
        let catalog = config.catalog();
        let expander = config.expander(&catalog)?;
        let policy = config.policy(&catalog, &expander)?;
        let classifier = Classifier::new(&catalog, config.similarity_threshold);
        let normalizer = Normalizer::new(catalog, config.similarity_threshold);
        debug!(
            "Engine ready: {} catalog licenses, {} policy rules",
            normalizer.catalog().licenses().len(),
            policy.len()
        );
        Ok(Self {
            normalizer,
            classifier,
            policy,
        })
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn policy(&self) -> &CompatibilityPolicy {
        &self.policy
    }

    pub fn expander(&self) -> &Expander {
        self.policy.expander()
    }

    /// Parse an explicit expression and evaluate it. Malformed input is an error.
    pub fn check_expression(&self, input: &str) -> Result<CheckedLicense> {
        let expr = self.normalizer.normalize(&parse(input)?);
        let result = self.policy.eval(&expr);
        Ok(row(input.to_string(), InputSource::Expression, Some(&expr), result))
    }

    /// Resolve a free-text mention and evaluate it. An unresolved mention is
    /// evaluated as the free-text license itself, which no rule matches.
    pub fn check_free_text(&self, text: &FreeText, source: InputSource) -> CheckedLicense {
        match self.normalizer.resolve(text) {
            Ok(expr) => {
                let result = self.policy.eval(&expr);
                row(text.to_string(), source, Some(&expr), result)
            }
            Err(err) => {
                warn!("{}", err);
                let expr = LicenseExpression::license(License::Simple(text.clone()));
                let mut result = self.policy.eval(&expr);
                result.reasons.insert(0, err.to_string());
                row(text.to_string(), source, Some(&expr), result)
            }
        }
    }

    /// Rows for every license a file declares, or a single rejected row when
    /// it declares none.
    pub fn check_declared(
        &self,
        origin: &str,
        source: InputSource,
        licenses: &[FreeText],
    ) -> Vec<CheckedLicense> {
        if licenses.is_empty() {
            let result = self.policy.eval_optional(None);
            return vec![row(origin.to_string(), source, None, result)];
        }
        licenses
            .iter()
            .map(|text| self.check_free_text(text, source.clone()))
            .collect()
    }
}

fn row(
    input: String,
    source: InputSource,
    expr: Option<&LicenseExpression>,
    result: CompatibilityResult,
) -> CheckedLicense {
    CheckedLicense {
        input,
        source,
        expression: expr.map(ToString::to_string),
        verdict: result.verdict,
        reasons: result.reasons,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Verdict;

    fn engine() -> Engine {
        Engine::from_config(&Config::default()).unwrap()
    }

    #[test]
    fn test_check_expression() {
        let row = engine().check_expression("mit or gpl-3.0-only").unwrap();
        assert_eq!(row.expression.as_deref(), Some("GPL-3.0-only OR MIT"));
        assert_eq!(row.verdict, Verdict::Allow);
        assert_eq!(row.source, InputSource::Expression);
    }

    #[test]
    fn test_lowercase_policy_key_matches_normalized_input() {
        let config = Config::from_toml(
            r#"
[[policy]]
licenses = ["apache-2.0"]
verdict = "allow"
"#,
        )
        .unwrap();
        let row = Engine::from_config(&config)
            .unwrap()
            .check_expression("apache-2.0")
            .unwrap();
        assert_eq!(row.expression.as_deref(), Some("Apache-2.0"));
        assert_eq!(row.verdict, Verdict::Allow);
    }

    #[test]
    fn test_check_expression_rejects_malformed_input() {
        assert!(engine().check_expression("MIT AND").is_err());
    }

    #[test]
    fn test_check_free_text_resolves_title() {
        let row = engine().check_free_text(
            &FreeText::new("The Apache Software License, Version 2.0"),
            InputSource::Pom,
        );
        assert_eq!(row.expression.as_deref(), Some("Apache-2.0"));
        assert_eq!(row.verdict, Verdict::Allow);
    }

    #[test]
    fn test_unresolved_free_text_is_unknown() {
        let row = engine().check_free_text(&FreeText::new("Acme EULA"), InputSource::Manifest);
        assert_eq!(row.verdict, Verdict::Unknown);
        assert_eq!(row.reasons[0], "Unable to resolve license `Acme EULA`");
        assert_eq!(row.reasons[1], "No rules found for Acme EULA");
    }

    #[test]
    fn test_file_without_licenses_is_rejected() {
        let rows = engine().check_declared("pom.xml", InputSource::Pom, &[]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].verdict, Verdict::Reject);
        assert_eq!(rows[0].reasons, vec!["License is null"]);
        assert_eq!(rows[0].expression, None);
    }
}
