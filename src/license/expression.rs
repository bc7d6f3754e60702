//! License expression model.
//!
//! A [`LicenseExpression`] is an immutable tree over [`License`] and
//! [`LicenseException`] leaves. Conjunctions and disjunctions hold ordered sets,
//! so duplicates collapse and operand order never affects equality. The set
//! order is also the display order: ascending [`weight`](LicenseExpression::weight),
//! then by printed form.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{BitAnd, BitOr};

use serde::{Serialize, Serializer};

pub const SPDX_PROVIDER: &str = "spdx";

/// A license or exception with a stable identifier.
///
/// Equality, hashing and ordering use `id` only; title and URIs are descriptive.
#[derive(Debug, Clone)]
pub struct StandardId {
    pub provider_id: String,
    pub id: String,
    pub title: String,
    pub uris: Vec<String>,
}

impl StandardId {
    pub fn new(
        provider_id: impl Into<String>,
        id: impl Into<String>,
        title: impl Into<String>,
        uris: Vec<String>,
    ) -> Self {
        Self {
            provider_id: provider_id.into(),
            id: id.into(),
            title: title.into(),
            uris,
        }
    }

    /// A bare SPDX identifier without catalog metadata.
    pub fn spdx(id: impl Into<String>) -> Self {
        let id = id.into();
        Self::new(SPDX_PROVIDER, id.clone(), id, Vec::new())
    }
}

impl PartialEq for StandardId {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for StandardId {}

impl Hash for StandardId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for StandardId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for StandardId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

/// A license or exception known only by its free-text title and URIs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FreeText {
    pub title: String,
    pub uris: BTreeSet<String>,
}

impl FreeText {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            uris: BTreeSet::new(),
        }
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uris.insert(uri.into());
        self
    }
}

impl fmt::Display for FreeText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)?;
        if !self.uris.is_empty() {
            let uris: Vec<&str> = self.uris.iter().map(String::as_str).collect();
            write!(f, " [{}]", uris.join(", "))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum License {
    Standard(StandardId),
    Simple(FreeText),
}

impl License {
    pub fn spdx(id: impl Into<String>) -> Self {
        License::Standard(StandardId::spdx(id))
    }

    pub fn simple(title: impl Into<String>) -> Self {
        License::Simple(FreeText::new(title))
    }

    /// Stable identifier of a standard license.
    pub fn id(&self) -> Option<&str> {
        match self {
            License::Standard(standard) => Some(&standard.id),
            License::Simple(_) => None,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            License::Standard(standard) => &standard.title,
            License::Simple(text) => &text.title,
        }
    }
}

impl fmt::Display for License {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            License::Standard(standard) => f.write_str(&standard.id),
            License::Simple(text) => write!(f, "{text}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LicenseException {
    Standard(StandardId),
    Simple(FreeText),
}

impl LicenseException {
    pub fn spdx(id: impl Into<String>) -> Self {
        LicenseException::Standard(StandardId::spdx(id))
    }

    pub fn simple(title: impl Into<String>) -> Self {
        LicenseException::Simple(FreeText::new(title))
    }
}

impl fmt::Display for LicenseException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LicenseException::Standard(standard) => f.write_str(&standard.id),
            LicenseException::Simple(text) => write!(f, "{text}"),
        }
    }
}

/// The only operand shapes an exception may attach to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SimpleExpression {
    License(License),
    OrLater(License),
}

impl SimpleExpression {
    pub fn license(&self) -> &License {
        match self {
            SimpleExpression::License(license) | SimpleExpression::OrLater(license) => license,
        }
    }
}

impl fmt::Display for SimpleExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimpleExpression::License(license) => write!(f, "{license}"),
            SimpleExpression::OrLater(license) => write!(f, "{license}+"),
        }
    }
}

impl From<SimpleExpression> for LicenseExpression {
    fn from(simple: SimpleExpression) -> Self {
        match simple {
            SimpleExpression::License(license) => LicenseExpression::License(license),
            SimpleExpression::OrLater(license) => LicenseExpression::OrLater(license),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LicenseExpression {
    /// No license applies.
    None,
    /// The license is not known or was not stated.
    NoAssertion,
    /// Exactly this license version.
    License(License),
    /// This license version or any later one (`X+`).
    OrLater(License),
    With {
        license: SimpleExpression,
        exception: LicenseException,
    },
    And(BTreeSet<LicenseExpression>),
    Or(BTreeSet<LicenseExpression>),
}

impl LicenseExpression {
    pub fn license(license: License) -> Self {
        LicenseExpression::License(license)
    }

    /// Shorthand for a bare SPDX identifier leaf.
    pub fn spdx(id: impl Into<String>) -> Self {
        LicenseExpression::License(License::spdx(id))
    }

    pub fn or_later(license: License) -> Self {
        LicenseExpression::OrLater(license)
    }

    pub fn with(license: SimpleExpression, exception: LicenseException) -> Self {
        LicenseExpression::With { license, exception }
    }

    /// Conjunction of `operands`. Nested conjunctions are merged, duplicates
    /// collapse, a single operand is returned as is and no operands yield `NONE`.
    pub fn and(operands: impl IntoIterator<Item = LicenseExpression>) -> Self {
        let mut set = BTreeSet::new();
        for operand in operands {
            match operand {
                LicenseExpression::And(inner) => set.extend(inner),
                other => {
                    set.insert(other);
                }
            }
        }
        collapse(set, LicenseExpression::And)
    }

    /// Disjunction of `operands`, with the same flattening rules as [`and`](Self::and).
    pub fn or(operands: impl IntoIterator<Item = LicenseExpression>) -> Self {
        let mut set = BTreeSet::new();
        for operand in operands {
            match operand {
                LicenseExpression::Or(inner) => set.extend(inner),
                other => {
                    set.insert(other);
                }
            }
        }
        collapse(set, LicenseExpression::Or)
    }

    /// Complexity measure used for display ordering only.
    pub fn weight(&self) -> u32 {
        match self {
            LicenseExpression::None | LicenseExpression::NoAssertion => 0,
            LicenseExpression::License(_) => 1,
            LicenseExpression::OrLater(_) => 2,
            LicenseExpression::With { license, .. } => match license {
                SimpleExpression::License(_) => 2,
                SimpleExpression::OrLater(_) => 3,
            },
            LicenseExpression::And(operands) | LicenseExpression::Or(operands) => {
                operands.iter().map(Self::weight).max().unwrap_or(0) + 1
            }
        }
    }

    /// The operand as a [`SimpleExpression`], if it is one.
    pub fn as_simple(&self) -> Option<SimpleExpression> {
        match self {
            LicenseExpression::License(license) => Some(SimpleExpression::License(license.clone())),
            LicenseExpression::OrLater(license) => Some(SimpleExpression::OrLater(license.clone())),
            _ => None,
        }
    }

    /// Members of a disjunction, or the expression itself.
    pub fn disjuncts(&self) -> Vec<&LicenseExpression> {
        match self {
            LicenseExpression::Or(operands) => operands.iter().collect(),
            other => vec![other],
        }
    }

    /// Every license leaf, in display order.
    pub fn licenses(&self) -> Vec<&License> {
        let mut out = Vec::new();
        self.collect_licenses(&mut out);
        out
    }

    fn collect_licenses<'a>(&'a self, out: &mut Vec<&'a License>) {
        match self {
            LicenseExpression::None | LicenseExpression::NoAssertion => {}
            LicenseExpression::License(license) | LicenseExpression::OrLater(license) => {
                out.push(license)
            }
            LicenseExpression::With { license, .. } => out.push(license.license()),
            LicenseExpression::And(operands) | LicenseExpression::Or(operands) => {
                for operand in operands {
                    operand.collect_licenses(out);
                }
            }
        }
    }

    /// Rebuild the expression with every leaf `license` or `exception` returns
    /// a replacement for. Leaves mapped to `None` are kept as they are.
    pub fn map_leaves<L, E>(&self, license: &L, exception: &E) -> LicenseExpression
    where
        L: Fn(&License) -> Option<License>,
        E: Fn(&LicenseException) -> Option<LicenseException>,
    {
        match self {
            LicenseExpression::None | LicenseExpression::NoAssertion => self.clone(),
            LicenseExpression::License(inner) => match license(inner) {
                Some(resolved) => LicenseExpression::license(resolved),
                None => self.clone(),
            },
            LicenseExpression::OrLater(inner) => match license(inner) {
                Some(resolved) => LicenseExpression::or_later(resolved),
                None => self.clone(),
            },
            LicenseExpression::With {
                license: operand,
                exception: attached,
            } => {
                let resolved = match operand {
                    SimpleExpression::License(inner) => license(inner).map(SimpleExpression::License),
                    SimpleExpression::OrLater(inner) => license(inner).map(SimpleExpression::OrLater),
                };
                let resolved_exception = exception(attached);
                if resolved.is_none() && resolved_exception.is_none() {
                    return self.clone();
                }
                LicenseExpression::with(
                    resolved.unwrap_or_else(|| operand.clone()),
                    resolved_exception.unwrap_or_else(|| attached.clone()),
                )
            }
            LicenseExpression::And(operands) => {
                LicenseExpression::and(operands.iter().map(|op| op.map_leaves(license, exception)))
            }
            LicenseExpression::Or(operands) => {
                LicenseExpression::or(operands.iter().map(|op| op.map_leaves(license, exception)))
            }
        }
    }

    /// Human-readable node kind, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            LicenseExpression::None => "NONE",
            LicenseExpression::NoAssertion => "NOASSERTION",
            LicenseExpression::License(_) => "license",
            LicenseExpression::OrLater(_) => "or-later license",
            LicenseExpression::With { .. } => "license with exception",
            LicenseExpression::And(_) => "conjunction",
            LicenseExpression::Or(_) => "disjunction",
        }
    }

    fn kind_rank(&self) -> u8 {
        match self {
            LicenseExpression::None => 0,
            LicenseExpression::NoAssertion => 1,
            LicenseExpression::License(_) => 2,
            LicenseExpression::OrLater(_) => 3,
            LicenseExpression::With { .. } => 4,
            LicenseExpression::And(_) => 5,
            LicenseExpression::Or(_) => 6,
        }
    }

    /// Total order over structure, consistent with `Eq`. Only consulted when
    /// weight and printed form tie (e.g. a free-text title that reads like an id).
    fn structural_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (LicenseExpression::License(a), LicenseExpression::License(b))
            | (LicenseExpression::OrLater(a), LicenseExpression::OrLater(b)) => a.cmp(b),
            (
                LicenseExpression::With {
                    license: l1,
                    exception: e1,
                },
                LicenseExpression::With {
                    license: l2,
                    exception: e2,
                },
            ) => l1.cmp(l2).then_with(|| e1.cmp(e2)),
            (LicenseExpression::And(a), LicenseExpression::And(b))
            | (LicenseExpression::Or(a), LicenseExpression::Or(b)) => a.cmp(b),
            _ => self.kind_rank().cmp(&other.kind_rank()),
        }
    }
}

fn collapse(
    mut set: BTreeSet<LicenseExpression>,
    wrap: fn(BTreeSet<LicenseExpression>) -> LicenseExpression,
) -> LicenseExpression {
    if set.len() > 1 {
        return wrap(set);
    }
    set.pop_first().unwrap_or(LicenseExpression::None)
}

impl PartialOrd for LicenseExpression {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LicenseExpression {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.weight().cmp(&other.weight()) {
            Ordering::Equal if self == other => Ordering::Equal,
            Ordering::Equal => self
                .to_string()
                .cmp(&other.to_string())
                .then_with(|| self.structural_cmp(other)),
            unequal => unequal,
        }
    }
}

impl fmt::Display for LicenseExpression {
    /// AND binds tighter than OR, so only a disjunction inside a conjunction
    /// needs parentheses.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LicenseExpression::None => f.write_str("NONE"),
            LicenseExpression::NoAssertion => f.write_str("NOASSERTION"),
            LicenseExpression::License(license) => write!(f, "{license}"),
            LicenseExpression::OrLater(license) => write!(f, "{license}+"),
            LicenseExpression::With { license, exception } => {
                write!(f, "{license} WITH {exception}")
            }
            LicenseExpression::And(operands) => {
                for (i, operand) in operands.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" AND ")?;
                    }
                    match operand {
                        LicenseExpression::Or(_) => write!(f, "({operand})")?,
                        _ => write!(f, "{operand}")?,
                    }
                }
                Ok(())
            }
            LicenseExpression::Or(operands) => {
                for (i, operand) in operands.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" OR ")?;
                    }
                    write!(f, "{operand}")?;
                }
                Ok(())
            }
        }
    }
}

impl Serialize for LicenseExpression {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl BitAnd for LicenseExpression {
    type Output = LicenseExpression;

    fn bitand(self, rhs: Self) -> Self::Output {
        LicenseExpression::and([self, rhs])
    }
}

impl BitOr for LicenseExpression {
    type Output = LicenseExpression;

    fn bitor(self, rhs: Self) -> Self::Output {
        LicenseExpression::or([self, rhs])
    }
}
