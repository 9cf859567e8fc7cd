//! Classification rules configuration.
//!
//! A rules file is TOML:
//!
//! ```toml
//! # Extend the built-in table (default) or replace it outright.
//! replace_defaults = false
//! critical_identity = ["^/submodels/\\d+/idShort$"]
//! cross_reference = []
//! descriptive = ["/note$"]
//! required_paths = ["^/submodels/\\d+/submodelElements/\\d+/value$"]
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::classify::{ClassificationRules, Classifier};

/// Environment variable naming a rules file for the CLI.
pub const RULES_ENV: &str = "AAS_PATCH_RULES";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read rules file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid rules file: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// On-disk form of [`ClassificationRules`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Use only the listed patterns instead of appending them to the
    /// built-in table.
    pub replace_defaults: bool,
    pub critical_identity: Vec<String>,
    pub cross_reference: Vec<String>,
    pub descriptive: Vec<String>,
    pub required_paths: Vec<String>,
}

impl RulesConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn into_rules(self) -> ClassificationRules {
        let mut rules = if self.replace_defaults {
            ClassificationRules {
                critical_identity: Vec::new(),
                cross_reference: Vec::new(),
                descriptive: Vec::new(),
                required_paths: Vec::new(),
            }
        } else {
            ClassificationRules::asset_shell()
        };
        rules.critical_identity.extend(self.critical_identity);
        rules.cross_reference.extend(self.cross_reference);
        rules.descriptive.extend(self.descriptive);
        rules.required_paths.extend(self.required_paths);
        rules
    }
}

/// Load and compile a rules file.
pub fn load_rules(path: &Path) -> Result<Classifier, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let rules = RulesConfig::from_toml_str(&contents)?.into_rules();
    debug!(path = %path.display(), "loaded classification rules");
    Classifier::new(&rules)
}

/// Classifier named by `AAS_PATCH_RULES`, or the built-in table when unset.
pub fn rules_from_env() -> Result<Classifier, ConfigError> {
    match std::env::var_os(RULES_ENV) {
        Some(path) if !path.is_empty() => load_rules(Path::new(&path)),
        _ => Ok(Classifier::default()),
    }
}
