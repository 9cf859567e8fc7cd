//! Risk classification.
//!
//! Operations are sorted into four ordered tiers by the shape of the paths
//! they touch. The pattern tables live in [`ClassificationRules`] and are
//! compiled once into a [`Classifier`]; nothing here reads the document.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::{Regex, RegexSet};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::trace;

use crate::config::ConfigError;
use crate::types::{OpKind, Operation};

// ── Risk tier ─────────────────────────────────────────────────────────────

/// How consequential an operation is. Ordered so batches can take a maximum.
///
/// On the wire a tier is the integer `1..=4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum RiskTier {
    Low = 1,
    Medium = 2,
    High = 3,
    Critical = 4,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid risk tier: {0}")]
pub struct InvalidTier(pub String);

impl RiskTier {
    pub const ALL: [RiskTier; 4] = [
        RiskTier::Low,
        RiskTier::Medium,
        RiskTier::High,
        RiskTier::Critical,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RiskTier::Low => "LOW",
            RiskTier::Medium => "MEDIUM",
            RiskTier::High => "HIGH",
            RiskTier::Critical => "CRITICAL",
        }
    }

    /// HIGH and CRITICAL edits need an explicit confirmation.
    pub fn requires_confirmation(&self) -> bool {
        *self >= RiskTier::High
    }
}

impl TryFrom<u8> for RiskTier {
    type Error = InvalidTier;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        match n {
            1 => Ok(RiskTier::Low),
            2 => Ok(RiskTier::Medium),
            3 => Ok(RiskTier::High),
            4 => Ok(RiskTier::Critical),
            other => Err(InvalidTier(other.to_string())),
        }
    }
}

impl From<RiskTier> for u8 {
    fn from(tier: RiskTier) -> u8 {
        tier as u8
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Accepts a label in any case (`high`) or the wire integer (`3`).
impl FromStr for RiskTier {
    type Err = InvalidTier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(n) = s.parse::<u8>() {
            return RiskTier::try_from(n);
        }
        RiskTier::ALL
            .into_iter()
            .find(|tier| tier.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| InvalidTier(s.to_string()))
    }
}

// ── Rules ─────────────────────────────────────────────────────────────────

/// Pattern tables driving classification. Every entry is a regular
/// expression matched against the operation's pointer string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationRules {
    /// Identity of the document or of a top-level element, and every node
    /// that contains one: always CRITICAL.
    pub critical_identity: Vec<String>,
    /// Cross references, parent linkage and semantic identifiers: HIGH.
    pub cross_reference: Vec<String>,
    /// Free-text and administrative metadata: LOW.
    pub descriptive: Vec<String>,
    /// Paths an external constraint marks as required.
    pub required_paths: Vec<String>,
}

const TOP_LEVEL: &str = "(assetAdministrationShells|submodels|conceptDescriptions)";

impl ClassificationRules {
    /// Built-in table for asset administration shell environments.
    pub fn asset_shell() -> Self {
        let owned = |patterns: &[&str]| patterns.iter().map(|p| p.to_string()).collect();
        Self {
            critical_identity: vec![
                "^$".to_string(),
                "^/id$".to_string(),
                format!("^/{TOP_LEVEL}$"),
                format!("^/{TOP_LEVEL}/\\d+$"),
                format!("^/{TOP_LEVEL}/\\d+/id$"),
                "/assetInformation$".to_string(),
                "/globalAssetId$".to_string(),
            ],
            cross_reference: owned(&[
                r"/semanticId(/|$)",
                r"/supplementalSemanticIds(/|$)",
                r"/derivedFrom(/|$)",
                r"^/assetAdministrationShells/\d+/submodels(/|$)",
                r"/(first|second)(/|$)",
                r"/valueId(/|$)",
                r"/keys(/|$)",
                r"/isCaseOf(/|$)",
                r"/specificAssetIds(/|$)",
                r"/parent(/|$)",
            ]),
            descriptive: owned(&[
                r"/description(/|$)",
                r"/displayName(/|$)",
                r"/administration(/|$)",
                r"/category$",
            ]),
            required_paths: Vec::new(),
        }
    }
}

impl Default for ClassificationRules {
    fn default() -> Self {
        Self::asset_shell()
    }
}

// ── Classifier ────────────────────────────────────────────────────────────

/// Compiled, immutable form of [`ClassificationRules`].
#[derive(Debug, Clone)]
pub struct Classifier {
    critical: RegexSet,
    cross_reference: RegexSet,
    descriptive: RegexSet,
    required: RegexSet,
}

impl Classifier {
    /// Compile a rule table. The first pattern that fails to compile is
    /// reported by name.
    pub fn new(rules: &ClassificationRules) -> Result<Self, ConfigError> {
        Ok(Self {
            critical: compile(&rules.critical_identity)?,
            cross_reference: compile(&rules.cross_reference)?,
            descriptive: compile(&rules.descriptive)?,
            required: compile(&rules.required_paths)?,
        })
    }

    /// Assign a tier to one operation.
    ///
    /// An explicit `approval_tier` wins outright. Otherwise every touched
    /// pointer (`path`, plus `from` for a move) is matched against the tables
    /// and the highest tier is kept; `remove` never drops below HIGH.
    pub fn classify(&self, op: &Operation) -> RiskTier {
        if let Some(tier) = op.meta.approval_tier {
            return tier;
        }

        let mut tier = match op.op {
            OpKind::Remove if self.critical.is_match(&op.path) => RiskTier::Critical,
            OpKind::Remove => RiskTier::High,
            _ => touched(op)
                .map(|path| self.tier_for_path(path))
                .max()
                .unwrap_or(RiskTier::Medium),
        };

        for path in touched(op) {
            if !self.required.is_match(path) {
                continue;
            }
            let taken_away =
                op.op == OpKind::Remove || (op.op == OpKind::Move && op.from.as_deref() == Some(path));
            let floor = if taken_away { RiskTier::High } else { RiskTier::Medium };
            tier = tier.max(floor);
        }

        trace!(op = %op.describe(), %tier, "classified operation");
        tier
    }

    /// Highest tier across a batch; an empty batch is LOW.
    pub fn classify_batch_max(&self, ops: &[Operation]) -> RiskTier {
        ops.iter()
            .map(|op| self.classify(op))
            .fold(RiskTier::Low, RiskTier::max)
    }

    fn tier_for_path(&self, path: &str) -> RiskTier {
        if self.critical.is_match(path) {
            RiskTier::Critical
        } else if self.cross_reference.is_match(path) {
            RiskTier::High
        } else if self.descriptive.is_match(path) {
            RiskTier::Low
        } else {
            RiskTier::Medium
        }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(&ClassificationRules::asset_shell()).expect("built-in patterns compile")
    }
}

fn compile(patterns: &[String]) -> Result<RegexSet, ConfigError> {
    for pattern in patterns {
        Regex::new(pattern).map_err(|source| ConfigError::Pattern {
            pattern: pattern.clone(),
            source,
        })?;
    }
    RegexSet::new(patterns).map_err(|source| ConfigError::Pattern {
        pattern: patterns.join(" | "),
        source,
    })
}

fn touched(op: &Operation) -> impl Iterator<Item = &str> {
    let from = match op.op {
        OpKind::Move => op.from.as_deref(),
        _ => None,
    };
    std::iter::once(op.path.as_str()).chain(from)
}

fn default_classifier() -> &'static Classifier {
    static DEFAULT: OnceLock<Classifier> = OnceLock::new();
    DEFAULT.get_or_init(Classifier::default)
}

/// Classify with the built-in asset shell table.
pub fn classify(op: &Operation) -> RiskTier {
    default_classifier().classify(op)
}

/// Batch maximum with the built-in asset shell table.
pub fn classify_batch_max(ops: &[Operation]) -> RiskTier {
    default_classifier().classify_batch_max(ops)
}
