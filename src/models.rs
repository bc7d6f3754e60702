use serde::{Deserialize, Serialize};

/// Outcome of evaluating a license expression against a compatibility policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Allow,
    Unknown,
    Reject,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Allow => write!(f, "ALLOW"),
            Verdict::Unknown => write!(f, "UNKNOWN"),
            Verdict::Reject => write!(f, "REJECT"),
        }
    }
}

/// Broad obligation family of a standard license, used to seed the default policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LicenseRisk {
    Permissive,
    WeakCopyleft,
    StrongCopyleft,
    Unknown,
}

impl std::fmt::Display for LicenseRisk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LicenseRisk::Permissive => write!(f, "Permissive"),
            LicenseRisk::WeakCopyleft => write!(f, "Weak Copyleft"),
            LicenseRisk::StrongCopyleft => write!(f, "Strong Copyleft"),
            LicenseRisk::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Where an evaluated license came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputSource {
    /// An explicit expression given on the command line.
    Expression,
    /// A `<license>` entry of a Maven POM.
    Pom,
    /// A `Bundle-License` entry of a JAR manifest.
    Manifest,
}

impl std::fmt::Display for InputSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputSource::Expression => write!(f, "expression"),
            InputSource::Pom => write!(f, "pom"),
            InputSource::Manifest => write!(f, "manifest"),
        }
    }
}

/// One row of a compatibility report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckedLicense {
    /// The raw text the license was read from.
    pub input: String,
    pub source: InputSource,
    /// Canonical expression, absent when the input could not be resolved.
    pub expression: Option<String>,
    pub verdict: Verdict,
    pub reasons: Vec<String>,
}
