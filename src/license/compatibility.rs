//! Three-valued compatibility evaluation.
//!
//! A [`CompatibilityPolicy`] maps expressions to a [`Verdict`] and a reason.
//! Evaluation looks up the exact expression first, then expands version ranges
//! and combines operand verdicts: OR is optimistic, AND is pessimistic.

use std::collections::BTreeMap;

use log::debug;
use serde::Serialize;

use crate::error::PolicyConfigurationError;
use crate::license::equivalence::Expander;
use crate::license::expression::LicenseExpression;
use crate::models::Verdict;

/// Verdict plus the reasons that led to it, in canonical operand order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompatibilityResult {
    pub verdict: Verdict,
    pub reasons: Vec<String>,
}

impl CompatibilityResult {
    pub fn new(verdict: Verdict, reason: impl Into<String>) -> Self {
        Self {
            verdict,
            reasons: vec![reason.into()],
        }
    }

    /// Reasons joined for single-line display.
    pub fn reason(&self) -> String {
        self.reasons.join("; ")
    }

    /// Merge for a disjunction: ALLOW wins, UNKNOWN beats REJECT.
    pub fn either(self, other: Self) -> Self {
        if self.verdict == other.verdict {
            return self.union(other);
        }
        match (self.verdict, other.verdict) {
            (Verdict::Allow, _) => self,
            (_, Verdict::Allow) => other,
            (Verdict::Unknown, _) => self,
            _ => other,
        }
    }

    /// Merge for a conjunction: ALLOW is absorbed, REJECT beats UNKNOWN.
    pub fn both(self, other: Self) -> Self {
        if self.verdict == other.verdict {
            return self.union(other);
        }
        match (self.verdict, other.verdict) {
            (Verdict::Reject, _) => self,
            (_, Verdict::Reject) => other,
            (Verdict::Unknown, _) => self,
            _ => other,
        }
    }

    fn union(mut self, other: Self) -> Self {
        for reason in other.reasons {
            if !self.reasons.contains(&reason) {
                self.reasons.push(reason);
            }
        }
        self
    }
}

#[derive(Debug, Clone)]
struct Rule {
    verdict: Verdict,
    reason: String,
}

/// Collects `(expressions, verdict, reason)` registrations and validates them.
#[derive(Debug, Default)]
pub struct CompatibilityPolicyBuilder {
    registrations: Vec<(LicenseExpression, Rule)>,
}

impl CompatibilityPolicyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Give every expression in `exprs` the same verdict and reason.
    pub fn register(
        &mut self,
        exprs: impl IntoIterator<Item = LicenseExpression>,
        verdict: Verdict,
        reason: impl Into<String>,
    ) -> &mut Self {
        let reason = reason.into();
        for expr in exprs {
            self.registrations.push((
                expr,
                Rule {
                    verdict,
                    reason: reason.clone(),
                },
            ));
        }
        self
    }

    /// Validate the registrations against `expander` and freeze them.
    ///
    /// Fails when a key is registered twice, or when two keys cover the same
    /// concrete expression once expanded.
    pub fn build(self, expander: &Expander) -> Result<CompatibilityPolicy, PolicyConfigurationError> {
        let mut rules: BTreeMap<LicenseExpression, Rule> = BTreeMap::new();
        let mut owners: BTreeMap<LicenseExpression, LicenseExpression> = BTreeMap::new();

        for (key, rule) in self.registrations {
            if rules.contains_key(&key) {
                return Err(PolicyConfigurationError::DuplicateKey {
                    key: key.to_string(),
                });
            }
            for leaf in covered(&key, expander) {
                if let Some(owner) = owners.get(&leaf) {
                    return Err(PolicyConfigurationError::Overlap {
                        leaf: leaf.to_string(),
                        first: owner.to_string(),
                        second: key.to_string(),
                    });
                }
                owners.insert(leaf, key.clone());
            }
            rules.insert(key, rule);
        }

        debug!(
            "Built compatibility policy with {} rule(s) covering {} expression(s)",
            rules.len(),
            owners.len()
        );
        Ok(CompatibilityPolicy {
            rules,
            expander: expander.clone(),
        })
    }
}

/// Concrete expressions a policy key stands for.
fn covered(key: &LicenseExpression, expander: &Expander) -> Vec<LicenseExpression> {
    key.disjuncts()
        .into_iter()
        .flat_map(|part| {
            expander
                .expand(part)
                .disjuncts()
                .into_iter()
                .cloned()
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Immutable policy; safe to share across threads.
#[derive(Debug, Clone)]
pub struct CompatibilityPolicy {
    rules: BTreeMap<LicenseExpression, Rule>,
    expander: Expander,
}

impl CompatibilityPolicy {
    pub fn builder() -> CompatibilityPolicyBuilder {
        CompatibilityPolicyBuilder::new()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Registered keys with their verdicts, in canonical order.
    pub fn rules(&self) -> impl Iterator<Item = (&LicenseExpression, Verdict, &str)> {
        self.rules
            .iter()
            .map(|(key, rule)| (key, rule.verdict, rule.reason.as_str()))
    }

    pub fn expander(&self) -> &Expander {
        &self.expander
    }

    /// Evaluate a possibly missing expression; a missing one is rejected.
    pub fn eval_optional(&self, expr: Option<&LicenseExpression>) -> CompatibilityResult {
        match expr {
            Some(expr) => self.eval(expr),
            None => CompatibilityResult::new(Verdict::Reject, "License is null"),
        }
    }

    pub fn eval(&self, expr: &LicenseExpression) -> CompatibilityResult {
        if let Some(rule) = self.rules.get(expr) {
            return CompatibilityResult::new(rule.verdict, rule.reason.clone());
        }

        match expr {
            LicenseExpression::Or(operands) => self.combine(operands, CompatibilityResult::either),
            LicenseExpression::And(operands) => self.combine(operands, CompatibilityResult::both),
            LicenseExpression::None
            | LicenseExpression::NoAssertion
            | LicenseExpression::License(_)
            | LicenseExpression::OrLater(_)
            | LicenseExpression::With { .. } => {
                let expanded = self.expander.expand(expr);
                if &expanded != expr {
                    return self.eval(&expanded);
                }
                CompatibilityResult::new(Verdict::Unknown, format!("No rules found for {expr}"))
            }
        }
    }

    fn combine<'a>(
        &self,
        operands: impl IntoIterator<Item = &'a LicenseExpression>,
        merge: fn(CompatibilityResult, CompatibilityResult) -> CompatibilityResult,
    ) -> CompatibilityResult {
        operands
            .into_iter()
            .map(|operand| self.eval(operand))
            .reduce(merge)
            .unwrap_or_else(|| CompatibilityResult::new(Verdict::Unknown, "Empty expression"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::license::expression::{License, LicenseException, SimpleExpression};
    use crate::license::parser::parse;

    fn id(s: &str) -> LicenseExpression {
        LicenseExpression::spdx(s)
    }

    fn policy() -> CompatibilityPolicy {
        let mut builder = CompatibilityPolicy::builder();
        builder
            .register([id("MIT"), id("Apache-2.0")], Verdict::Allow, "Permissive license")
            .register([id("CC0-1.0")], Verdict::Allow, "Public domain is OK")
            .register([id("MPL-2.0")], Verdict::Unknown, "Weak copyleft, ask legal")
            .register(
                [id("GPL-2.0-only"), id("GPL-3.0-only")],
                Verdict::Reject,
                "Strong copyleft",
            )
            .register(
                [LicenseExpression::with(
                    SimpleExpression::License(License::spdx("GPL-2.0-only")),
                    LicenseException::spdx("Classpath-exception-2.0"),
                )],
                Verdict::Allow,
                "Classpath exception permits linking",
            );
        builder.build(&Expander::spdx()).unwrap()
    }

    fn eval(expr: &str) -> CompatibilityResult {
        policy().eval(&parse(expr).unwrap())
    }

    #[test]
    fn test_exact_key_uses_its_reason() {
        let result = eval("MIT");
        assert_eq!(result.verdict, Verdict::Allow);
        assert_eq!(result.reasons, vec!["Permissive license"]);
    }

    #[test]
    fn test_exact_key_skips_expansion() {
        let mut builder = CompatibilityPolicy::builder();
        builder.register([id("GPL-2.0-or-later")], Verdict::Unknown, "Range reviewed");
        let policy = builder.build(&Expander::spdx()).unwrap();
        let result = policy.eval(&id("GPL-2.0-or-later"));
        assert_eq!(result.verdict, Verdict::Unknown);
        assert_eq!(result.reasons, vec!["Range reviewed"]);
    }

    #[test]
    fn test_or_joins_reasons_of_allowed_operands() {
        let result = eval("MIT OR CC0-1.0");
        assert_eq!(result.verdict, Verdict::Allow);
        assert_eq!(
            result.reasons,
            vec!["Public domain is OK", "Permissive license"]
        );
        assert_eq!(result.reason(), "Public domain is OK; Permissive license");
    }

    #[test]
    fn test_and_or_monotonicity() {
        assert_eq!(eval("MIT AND GPL-3.0-only").verdict, Verdict::Reject);
        assert_eq!(eval("MIT OR GPL-3.0-only").verdict, Verdict::Allow);
        assert_eq!(eval("MIT OR GPL-3.0-only").reasons, vec!["Permissive license"]);
    }

    #[test]
    fn test_reject_and_unknown() {
        assert_eq!(eval("MPL-2.0 OR GPL-3.0-only").verdict, Verdict::Unknown);
        let and = eval("MPL-2.0 AND GPL-3.0-only");
        assert_eq!(and.verdict, Verdict::Reject);
        assert_eq!(and.reasons, vec!["Strong copyleft"]);
    }

    #[test]
    fn test_allow_is_absorbed_by_conjunction() {
        let result = eval("MIT AND MPL-2.0");
        assert_eq!(result.verdict, Verdict::Unknown);
        assert_eq!(result.reasons, vec!["Weak copyleft, ask legal"]);
    }

    #[test]
    fn test_unknown_leaf() {
        let result = eval("Zlib");
        assert_eq!(result.verdict, Verdict::Unknown);
        assert_eq!(result.reasons, vec!["No rules found for Zlib"]);
    }

    #[test]
    fn test_or_later_is_expanded() {
        let result = eval("GPL-2.0-or-later");
        assert_eq!(result.verdict, Verdict::Reject);
        assert_eq!(result.reasons, vec!["Strong copyleft"]);
    }

    #[test]
    fn test_exception_is_distributed_before_lookup() {
        // GPL-2.0-only WITH CPE is allowed, GPL-3.0-only WITH CPE has no rule.
        let result = eval("GPL-2.0-or-later WITH Classpath-exception-2.0");
        assert_eq!(result.verdict, Verdict::Allow);
        assert_eq!(result.reasons, vec!["Classpath exception permits linking"]);
    }

    #[test]
    fn test_missing_expression_is_rejected() {
        let result = policy().eval_optional(None);
        assert_eq!(result.verdict, Verdict::Reject);
        assert_eq!(result.reasons, vec!["License is null"]);
    }

    #[test]
    fn test_evaluation_ignores_operand_order() {
        let policy = policy();
        let a = LicenseExpression::and([id("MPL-2.0"), id("Zlib"), id("MIT")]);
        let b = LicenseExpression::and([id("MIT"), id("MPL-2.0"), id("Zlib")]);
        assert_eq!(policy.eval(&a), policy.eval(&b));
        assert_eq!(
            policy.eval(&a).reasons,
            vec!["Weak copyleft, ask legal", "No rules found for Zlib"]
        );
    }

    #[test]
    fn test_duplicate_key_is_rejected() {
        let mut builder = CompatibilityPolicy::builder();
        builder
            .register([id("MIT")], Verdict::Allow, "ok")
            .register([id("MIT")], Verdict::Reject, "no");
        assert_eq!(
            builder.build(&Expander::spdx()).unwrap_err(),
            PolicyConfigurationError::DuplicateKey {
                key: "MIT".to_string()
            }
        );
    }

    #[test]
    fn test_overlapping_expansions_are_rejected() {
        let mut builder = CompatibilityPolicy::builder();
        builder
            .register([id("GPL-3.0-only")], Verdict::Reject, "copyleft")
            .register([id("GPL-2.0-or-later")], Verdict::Unknown, "range");
        let err = builder.build(&Expander::spdx()).unwrap_err();
        assert_eq!(
            err,
            PolicyConfigurationError::Overlap {
                leaf: "GPL-3.0-only".to_string(),
                first: "GPL-3.0-only".to_string(),
                second: "GPL-2.0-or-later".to_string(),
            }
        );
    }

    #[test]
    fn test_disjunction_key_overlaps_its_members() {
        let mut builder = CompatibilityPolicy::builder();
        builder
            .register([id("MIT")], Verdict::Allow, "ok")
            .register([id("MIT") | id("Apache-2.0")], Verdict::Allow, "ok");
        assert!(matches!(
            builder.build(&Expander::spdx()),
            Err(PolicyConfigurationError::Overlap { .. })
        ));
    }

    #[test]
    fn test_policy_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CompatibilityPolicy>();
    }
}
