//! Unroller configuration.
//!
//! Loaded from YAML, then optionally overridden by environment variables:
//!
//! ```yaml
//! basis: [u1, u2, u3, cx]
//! max_depth: 16
//! memoize: true
//! ```
//!
//! | Variable | Overrides |
//! |----------|-----------|
//! | `QUNROLL_BASIS` | `basis`, comma-separated |
//! | `QUNROLL_MAX_DEPTH` | `max_depth` |

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::basis::BasisSet;
use crate::error::{CompileError, CompileResult};
use crate::unroller::DEFAULT_MAX_DEPTH;

/// Environment variable overriding the basis.
pub const ENV_BASIS: &str = "QUNROLL_BASIS";
/// Environment variable overriding the maximum expansion depth.
pub const ENV_MAX_DEPTH: &str = "QUNROLL_MAX_DEPTH";

/// Settings for an [`Unroller`](crate::Unroller).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnrollerConfig {
    /// Target gate names.
    pub basis: Vec<String>,

    /// Bound on nested rule applications.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Cache expansions of identical gates within one run.
    #[serde(default = "default_memoize")]
    pub memoize: bool,
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_memoize() -> bool {
    true
}

impl UnrollerConfig {
    /// Create a configuration with default settings for a basis.
    pub fn new(basis: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            basis: basis.into_iter().map(Into::into).collect(),
            max_depth: default_max_depth(),
            memoize: default_memoize(),
        }
    }

    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> CompileResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml).map_err(|e| {
            CompileError::InvalidConfiguration(format!("failed to parse configuration: {e}"))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> CompileResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            CompileError::InvalidConfiguration(format!(
                "failed to read {}: {e}",
                path.display()
            ))
        })?;
        Self::from_yaml_str(&contents)
    }

    /// Apply overrides from the process environment.
    #[must_use]
    pub fn merge_env(self) -> Self {
        self.merge_vars(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any variable lookup.
    ///
    /// Unset variables leave fields unchanged. An unparsable depth is
    /// ignored with a warning.
    #[must_use]
    pub fn merge_vars(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(basis) = lookup(ENV_BASIS) {
            self.basis = basis
                .split(',')
                .map(str::trim)
                .filter(|g| !g.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(depth) = lookup(ENV_MAX_DEPTH) {
            match depth.trim().parse() {
                Ok(val) => self.max_depth = val,
                Err(_) => warn!(value = %depth, "ignoring invalid {ENV_MAX_DEPTH}"),
            }
        }
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> CompileResult<()> {
        if self.basis.is_empty() {
            return Err(CompileError::InvalidConfiguration(
                "basis must name at least one gate".into(),
            ));
        }
        if self.basis.iter().any(|g| g.trim().is_empty()) {
            return Err(CompileError::InvalidConfiguration(
                "basis contains an empty gate name".into(),
            ));
        }
        if self.max_depth == 0 {
            return Err(CompileError::InvalidConfiguration(
                "max_depth must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// The basis as a set.
    pub fn basis_set(&self) -> BasisSet {
        BasisSet::new(self.basis.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_fill_in() {
        let config = UnrollerConfig::from_yaml_str("basis: [u3, cx]").unwrap();
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert!(config.memoize);
        assert_eq!(config.basis_set(), BasisSet::u3_cx());
    }

    #[test]
    fn test_full_document() {
        let config = UnrollerConfig::from_yaml_str(
            "basis: [h, t, tdg, cx]\nmax_depth: 8\nmemoize: false\n",
        )
        .unwrap();
        assert_eq!(config.max_depth, 8);
        assert!(!config.memoize);
    }

    #[test]
    fn test_validation_errors() {
        for yaml in ["basis: []", "basis: [u3]\nmax_depth: 0", "basis: ['', cx]"] {
            assert!(
                matches!(
                    UnrollerConfig::from_yaml_str(yaml),
                    Err(CompileError::InvalidConfiguration(_))
                ),
                "{yaml}"
            );
        }
    }

    #[test]
    fn test_parse_errors() {
        assert!(UnrollerConfig::from_yaml_str("max_depth: 4").is_err());
        assert!(UnrollerConfig::from_yaml_str("basis: [u3]\nbogus: 1").is_err());
        assert!(UnrollerConfig::from_file("/nonexistent/qunroll.yaml").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> =
            HashMap::from([(ENV_BASIS, "u1, u2 ,u3,,cx"), (ENV_MAX_DEPTH, "5")]);
        let config = UnrollerConfig::new(["h"])
            .merge_vars(|k| vars.get(k).map(ToString::to_string));
        assert_eq!(config.basis, ["u1", "u2", "u3", "cx"]);
        assert_eq!(config.max_depth, 5);
    }

    #[test]
    fn test_bad_env_depth_is_ignored() {
        let config = UnrollerConfig::new(["h"]).merge_vars(|k| {
            (k == ENV_MAX_DEPTH).then(|| "many".to_string())
        });
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.basis, ["h"]);
    }
}
