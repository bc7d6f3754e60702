//! Equivalence expansion of version ranges.
//!
//! An [`EquivalenceTable`] maps an expression (usually an or-later license) to
//! the expressions it implies: `GPL-2.0-or-later` implies `GPL-2.0-only` and
//! `GPL-3.0-or-later`. The [`Expander`] consults an ordered list of tables and
//! follows the mapping breadth-first until only terminal expressions remain.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use log::debug;

use crate::license::expression::{License, LicenseException, LicenseExpression, SimpleExpression};
use crate::license::spdx::{DEPRECATED_WITH_EXCEPTION, ONLY_OR_LATER_FAMILIES, VERSIONED_FAMILIES};

#[derive(Debug, Clone, Default)]
pub struct EquivalenceTable {
    entries: BTreeMap<LicenseExpression, BTreeSet<LicenseExpression>>,
}

impl EquivalenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `key` implies each of `equivalents`. Repeated calls for the
    /// same key accumulate.
    pub fn insert(
        &mut self,
        key: LicenseExpression,
        equivalents: impl IntoIterator<Item = LicenseExpression>,
    ) {
        self.entries.entry(key).or_default().extend(equivalents);
    }

    pub fn get(&self, key: &LicenseExpression) -> Option<&BTreeSet<LicenseExpression>> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Version-range rules for the SPDX license families.
    pub fn spdx_defaults() -> Self {
        let mut table = Self::new();
        let id = |s: String| LicenseExpression::spdx(s);
        let plus = |s: String| LicenseExpression::or_later(License::spdx(s));

        for (family, versions) in ONLY_OR_LATER_FAMILIES {
            for (i, version) in versions.iter().enumerate() {
                let only = format!("{family}-{version}-only");
                let or_later = format!("{family}-{version}-or-later");

                let mut implied = vec![id(only.clone())];
                if let Some(next) = versions.get(i + 1) {
                    implied.push(id(format!("{family}-{next}-or-later")));
                }
                table.insert(id(or_later.clone()), implied);
                table.insert(plus(only.clone()), [id(or_later.clone())]);
                table.insert(plus(format!("{family}-{version}")), [id(or_later)]);
                table.insert(id(format!("{family}-{version}")), [id(only)]);
            }
        }

        for (family, versions) in VERSIONED_FAMILIES {
            for (i, version) in versions.iter().enumerate() {
                let current = format!("{family}-{version}");
                let mut implied = vec![id(current.clone())];
                if let Some(next) = versions.get(i + 1) {
                    implied.push(plus(format!("{family}-{next}")));
                }
                table.insert(plus(current), implied);
            }
        }

        for (deprecated, license, exception) in DEPRECATED_WITH_EXCEPTION {
            table.insert(
                id((*deprecated).to_string()),
                [LicenseExpression::with(
                    SimpleExpression::License(License::spdx(*license)),
                    LicenseException::spdx(*exception),
                )],
            );
        }

        table
    }
}

/// Breadth-first equivalence expansion over an ordered list of tables.
#[derive(Debug, Clone, Default)]
pub struct Expander {
    tables: Vec<EquivalenceTable>,
}

impl Expander {
    /// Tables are consulted in order; entries for the same key are unioned.
    pub fn new(tables: Vec<EquivalenceTable>) -> Self {
        Self { tables }
    }

    /// An expander over [`EquivalenceTable::spdx_defaults`] alone.
    pub fn spdx() -> Self {
        Self::new(vec![EquivalenceTable::spdx_defaults()])
    }

    /// Append an overlay consulted after the existing tables.
    pub fn push_table(&mut self, table: EquivalenceTable) {
        self.tables.push(table);
    }

    /// Union of every table's entry for `key`.
    pub fn lookup(&self, key: &LicenseExpression) -> Option<BTreeSet<LicenseExpression>> {
        let mut found: Option<BTreeSet<LicenseExpression>> = None;
        for table in &self.tables {
            if let Some(equivalents) = table.get(key) {
                found
                    .get_or_insert_with(BTreeSet::new)
                    .extend(equivalents.iter().cloned());
            }
        }
        found
    }

    /// Rewrite `expr` into the disjunction of the terminal expressions it
    /// implies. Expressions without a table entry come back unchanged, and so
    /// do compound expressions: callers walk those operand by operand.
    ///
    /// An exception attaches to a concrete license version, so
    /// `GPL-2.0-or-later WITH X` distributes into
    /// `GPL-2.0-only WITH X OR GPL-3.0-only WITH X`.
    pub fn expand(&self, expr: &LicenseExpression) -> LicenseExpression {
        let mut seen: BTreeSet<LicenseExpression> = BTreeSet::new();
        let mut queue: VecDeque<LicenseExpression> = VecDeque::new();
        let mut terminals: BTreeSet<LicenseExpression> = BTreeSet::new();

        seen.insert(expr.clone());
        queue.push_back(expr.clone());

        while let Some(current) = queue.pop_front() {
            let next = match self.lookup(&current) {
                Some(equivalents) => equivalents,
                None => match self.distribute_exception(&current) {
                    Some(distributed) => distributed,
                    None => {
                        terminals.insert(current);
                        continue;
                    }
                },
            };
            for candidate in next {
                if seen.insert(candidate.clone()) {
                    queue.push_back(candidate);
                }
            }
        }

        // A closure that only loops back on itself implies nothing new.
        if terminals.is_empty() || (terminals.len() == 1 && terminals.contains(expr)) {
            return expr.clone();
        }
        debug!(
            "Expanded {} into {} terminal expression(s) after visiting {}",
            expr,
            terminals.len(),
            seen.len()
        );
        LicenseExpression::or(terminals)
    }

    /// [`expand`](Self::expand) applied to every operand of a compound
    /// expression, rebuilding conjunctions and disjunctions around the results.
    pub fn expand_all(&self, expr: &LicenseExpression) -> LicenseExpression {
        match expr {
            LicenseExpression::And(operands) => {
                LicenseExpression::and(operands.iter().map(|op| self.expand_all(op)))
            }
            LicenseExpression::Or(operands) => {
                LicenseExpression::or(operands.iter().map(|op| self.expand_all(op)))
            }
            leaf => self.expand(leaf),
        }
    }

    /// `L WITH X` where `L` expands: one `WITH X` per concrete version of `L`.
    fn distribute_exception(&self, expr: &LicenseExpression) -> Option<BTreeSet<LicenseExpression>> {
        let LicenseExpression::With { license, exception } = expr else {
            return None;
        };
        let base: LicenseExpression = license.clone().into();
        let expanded = self.expand(&base);
        if expanded == base {
            return None;
        }
        // Every version must be able to carry the exception, otherwise the
        // `WITH` node stays terminal.
        expanded
            .disjuncts()
            .into_iter()
            .map(|part| {
                part.as_simple()
                    .map(|simple| LicenseExpression::with(simple, exception.clone()))
            })
            .collect()
    }
}
