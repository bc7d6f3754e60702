use std::path::{Path, PathBuf};

use log::debug;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::license::compatibility::{CompatibilityPolicy, CompatibilityPolicyBuilder};
use crate::license::equivalence::{EquivalenceTable, Expander};
use crate::license::expression::LicenseExpression;
use crate::license::normalizer::DEFAULT_SIMILARITY_THRESHOLD;
use crate::license::parser::parse;
use crate::license::spdx::{LicenseCatalog, LicenseRecord};
use crate::models::{LicenseRisk, Verdict};

/// Directory holding the project-level configuration file.
pub const CONFIG_DIR: &str = ".license-expr";
pub const CONFIG_FILE: &str = "config.toml";

/// Root configuration structure, deserialized from `.license-expr/config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Minimum similarity (0 to 100) a title or text must exceed to be resolved.
    #[serde(default = "default_threshold")]
    pub similarity_threshold: u8,
    /// Records added to (or replacing) the built-in catalog.
    #[serde(default, rename = "license")]
    pub licenses: Vec<LicenseRecord>,
    /// Equivalences consulted after the built-in version families.
    #[serde(default, rename = "equivalence")]
    pub equivalences: Vec<EquivalenceRule>,
    /// Policy rules. When empty, a policy is derived from each catalog
    /// license's risk family.
    #[serde(default, rename = "policy")]
    pub policies: Vec<PolicyRule>,
}

fn default_threshold() -> u8 {
    DEFAULT_SIMILARITY_THRESHOLD
}

/// `license` implies each of `equivalents`.
#[derive(Debug, Clone, Deserialize)]
pub struct EquivalenceRule {
    pub license: String,
    pub equivalents: Vec<String>,
}

/// A verdict shared by every expression in `licenses`.
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyRule {
    pub licenses: Vec<String>,
    pub verdict: Verdict,
    #[serde(default = "default_reason")]
    pub reason: String,
}

fn default_reason() -> String {
    "Listed in policy".to_string()
}

impl Default for Config {
    /// Built-in configuration used when no config file is found.
    ///
    /// Permissive licenses are allowed, weak-copyleft licenses are left to
    /// review, and strong-copyleft licenses (GPL, AGPL) are rejected.
    fn default() -> Self {
        Config {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            licenses: Vec::new(),
            equivalences: Vec::new(),
            policies: Vec::new(),
        }
    }
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.similarity_threshold > 100 {
            return Err(Error::Config(format!(
                "similarity_threshold must be between 0 and 100, got {}",
                self.similarity_threshold
            )));
        }
        Ok(())
    }

    /// Built-in catalog plus the configured records.
    pub fn catalog(&self) -> LicenseCatalog {
        let mut catalog = LicenseCatalog::builtin();
        for record in &self.licenses {
            catalog.add_license(record.clone());
        }
        catalog
    }

    /// SPDX version families followed by the configured overlay, if any.
    /// Overlay identifiers are spelled as `catalog` spells them.
    pub fn expander(&self, catalog: &LicenseCatalog) -> Result<Expander> {
        let mut expander = Expander::spdx();
        if self.equivalences.is_empty() {
            return Ok(expander);
        }
        let mut overlay = EquivalenceTable::new();
        for rule in &self.equivalences {
            let equivalents = rule
                .equivalents
                .iter()
                .map(|e| canonical(catalog, e))
                .collect::<Result<Vec<_>>>()?;
            overlay.insert(canonical(catalog, &rule.license)?, equivalents);
        }
        expander.push_table(overlay);
        Ok(expander)
    }

    /// The configured policy, or the risk-family default when none is configured.
    /// Policy keys are spelled as `catalog` spells them, matching normalized input.
    pub fn policy(&self, catalog: &LicenseCatalog, expander: &Expander) -> Result<CompatibilityPolicy> {
        let builder = if self.policies.is_empty() {
            default_policy(catalog, expander)
        } else {
            let mut builder = CompatibilityPolicy::builder();
            for rule in &self.policies {
                let exprs = rule
                    .licenses
                    .iter()
                    .map(|l| canonical(catalog, l))
                    .collect::<Result<Vec<_>>>()?;
                builder.register(exprs, rule.verdict, rule.reason.clone());
            }
            builder
        };
        Ok(builder.build(expander)?)
    }
}

fn canonical(catalog: &LicenseCatalog, expression: &str) -> Result<LicenseExpression> {
    Ok(catalog.canonicalize(&parse(expression)?))
}

/// One rule per risk family over the catalog's concrete identifiers.
/// Identifiers that expand (version ranges, deprecated ids) are left to expansion.
pub fn default_policy(catalog: &LicenseCatalog, expander: &Expander) -> CompatibilityPolicyBuilder {
    let mut builder = CompatibilityPolicy::builder();
    for (risk, verdict, reason) in [
        (LicenseRisk::Permissive, Verdict::Allow, "Permissive license"),
        (
            LicenseRisk::WeakCopyleft,
            Verdict::Unknown,
            "Weak copyleft license, review required",
        ),
        (LicenseRisk::StrongCopyleft, Verdict::Reject, "Strong copyleft license"),
    ] {
        let exprs: Vec<LicenseExpression> = catalog
            .licenses()
            .iter()
            .filter(|record| record.risk == risk)
            .map(|record| LicenseExpression::license(record.to_license()))
            .filter(|expr| &expander.expand(expr) == expr)
            .collect();
        builder.register(exprs, verdict, reason);
    }
    builder
}

/// Load the configuration, searching in order:
///
/// 1. `config_override`: path passed via `--config`
/// 2. `<project_path>/.license-expr/config.toml`
/// 3. `~/.config/license-expr/config.toml`
/// 4. Built-in [`Config::default`]
pub fn load_config(project_path: &Path, config_override: Option<&Path>) -> Result<Config> {
    if let Some(path) = config_override {
        return read_config(path);
    }

    let project_config = project_path.join(CONFIG_DIR).join(CONFIG_FILE);
    if project_config.exists() {
        return read_config(&project_config);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home.join(".config").join("license-expr").join(CONFIG_FILE);
        if home_config.exists() {
            return read_config(&home_config);
        }
    }

    debug!("No configuration file found, using built-in defaults");
    Ok(Config::default())
}

fn read_config(path: &Path) -> Result<Config> {
    debug!("Loading configuration from {}", path.display());
    let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: PathBuf::from(path),
        source,
    })?;
    Config::from_toml(&content)
}
