//! License expressions and the reasoning built on them.
//!
//! - [`expression`]: the expression tree, construction helpers and canonical printing.
//! - [`parser`]: turns `"MIT OR (GPL-2.0-only WITH Classpath-exception-2.0)"` into a tree.
//! - [`spdx`]: catalog of standard licenses and exceptions.
//! - [`normalizer`]: resolves free-text license mentions to standard identifiers.
//! - [`equivalence`]: rewrites version ranges into the concrete versions they denote.
//! - [`compatibility`]: three-valued policy evaluation.

pub mod compatibility;
pub mod equivalence;
pub mod expression;
pub mod normalizer;
pub mod parser;
pub mod spdx;

pub use compatibility::{CompatibilityPolicy, CompatibilityPolicyBuilder, CompatibilityResult};
pub use equivalence::{EquivalenceTable, Expander};
pub use expression::{
    FreeText, License, LicenseException, LicenseExpression, SimpleExpression, StandardId,
};
pub use normalizer::Normalizer;
pub use parser::parse;
pub use spdx::LicenseCatalog;
