//! Configuration file schema for hintcheck.
//!
//! A config file tunes how strictly a codebase is held to full annotation
//! coverage. Every field is optional; a missing file means defaults.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};

use crate::detect::Rule;
use crate::error::ConfigError;
use crate::score::{ScoringPolicy, DEFAULT_LENIENT_THRESHOLD, DEFAULT_STRICT_THRESHOLD};

/// Config file names searched for, in order.
pub const CONFIG_NAMES: &[&str] = &["hintcheck.yaml", ".hintcheck.yaml"];

fn default_strict() -> bool {
    true
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub version: String,
    /// Strict mode requires 100% coverage unless `threshold` is set.
    #[serde(default = "default_strict")]
    pub strict: bool,
    /// Explicit pass threshold (0-100), overriding the mode default.
    #[serde(default)]
    pub threshold: Option<f64>,
    /// Top-level subdirectories to scan; empty means all of them.
    #[serde(default)]
    pub targets: Vec<String>,
    /// Glob patterns, relative to the scan root, for paths to skip.
    #[serde(default)]
    pub excluded_paths: Vec<String>,
    /// Rule names that fail a file on any occurrence.
    #[serde(default)]
    pub zero_tolerance: Vec<String>,
    /// Show per-file diagnostics in pretty output.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: String::new(),
            strict: true,
            threshold: None,
            targets: Vec::new(),
            excluded_paths: Vec::new(),
            zero_tolerance: Vec::new(),
            verbose: false,
        }
    }
}

impl Config {
    /// Parse a config from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse_str(&content, &path.display().to_string())
    }

    /// Parse a config from YAML text; `origin` names it in errors.
    pub fn parse_str(content: &str, origin: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not a mapping.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|source| ConfigError::Yaml {
            path: origin.to_string(),
            source,
        })
    }

    /// Effective pass threshold.
    pub fn pass_threshold(&self) -> f64 {
        match self.threshold {
            Some(t) => t,
            None if self.strict => DEFAULT_STRICT_THRESHOLD,
            None => DEFAULT_LENIENT_THRESHOLD,
        }
    }

    /// Zero-tolerance rule names resolved to rules.
    pub fn zero_tolerance_rules(&self) -> Result<BTreeSet<Rule>, ConfigError> {
        self.zero_tolerance
            .iter()
            .map(|name| Rule::parse(name.trim()).ok_or_else(|| ConfigError::UnknownRule(name.clone())))
            .collect()
    }

    /// Compile `excluded_paths` into one matcher.
    pub fn excluded_globset(&self) -> Result<GlobSet, ConfigError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.excluded_paths {
            let glob = Glob::new(pattern).map_err(|source| ConfigError::InvalidGlob {
                pattern: pattern.clone(),
                source,
            })?;
            builder.add(glob);
        }
        builder.build().map_err(|source| ConfigError::InvalidGlob {
            pattern: self.excluded_paths.join(", "),
            source,
        })
    }

    /// Scoring policy derived from this config.
    pub fn scoring_policy(&self) -> Result<ScoringPolicy, ConfigError> {
        Ok(ScoringPolicy {
            pass_threshold: self.pass_threshold(),
            zero_tolerance: self.zero_tolerance_rules()?,
        })
    }
}

/// Validate a config. Returns the first problem found.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if let Some(t) = config.threshold {
        if !(0.0..=100.0).contains(&t) {
            return Err(ConfigError::InvalidThreshold(t));
        }
    }
    config.zero_tolerance_rules()?;
    config.excluded_globset()?;
    Ok(())
}

/// Find a config file in the first of `dirs` that has one.
pub fn discover_config(dirs: &[&Path]) -> Option<PathBuf> {
    dirs.iter()
        .flat_map(|dir| CONFIG_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.strict);
        assert_eq!(config.pass_threshold(), 100.0);
        assert!(config.zero_tolerance_rules().unwrap().is_empty());
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(Config::parse_str("", "x").unwrap(), Config::default());
        assert_eq!(Config::parse_str("  \n", "x").unwrap(), Config::default());
    }

    #[test]
    fn test_parse_full() {
        let yaml = r#"
version: "1"
strict: false
threshold: 90
targets: [ex0, ex1]
excluded_paths:
  - "**/migrations/**"
zero_tolerance:
  - return_literal_mismatch
verbose: true
"#;
        let config = Config::parse_str(yaml, "test").unwrap();
        assert!(!config.strict);
        assert_eq!(config.pass_threshold(), 90.0);
        assert_eq!(config.targets, vec!["ex0", "ex1"]);
        assert!(config.verbose);
        assert!(validate(&config).is_ok());

        let policy = config.scoring_policy().unwrap();
        assert!(policy.zero_tolerance.contains(&Rule::ReturnLiteralMismatch));
        assert!(config.excluded_globset().unwrap().is_match("app/migrations/0001.py"));
    }

    #[test]
    fn test_lenient_default_threshold() {
        let config = Config::parse_str("strict: false\n", "test").unwrap();
        assert_eq!(config.pass_threshold(), 85.0);
    }

    #[test]
    fn test_invalid_threshold() {
        for t in [-1.0, 100.5, f64::NAN] {
            let config = Config {
                threshold: Some(t),
                ..Default::default()
            };
            assert!(matches!(validate(&config), Err(ConfigError::InvalidThreshold(_))));
        }
    }

    #[test]
    fn test_unknown_rule() {
        let config = Config {
            zero_tolerance: vec!["no_such_rule".to_string()],
            ..Default::default()
        };
        assert!(matches!(validate(&config), Err(ConfigError::UnknownRule(ref n)) if n == "no_such_rule"));
    }

    #[test]
    fn test_invalid_glob() {
        let config = Config {
            excluded_paths: vec!["a/[".to_string()],
            ..Default::default()
        };
        assert!(matches!(validate(&config), Err(ConfigError::InvalidGlob { .. })));
    }

    #[test]
    fn test_invalid_yaml() {
        let err = Config::parse_str("threshold: [1, 2", "bad.yaml").unwrap_err();
        assert!(err.to_string().contains("bad.yaml"));
    }

    #[test]
    fn test_discover_config() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        std::fs::write(second.path().join(".hintcheck.yaml"), "strict: false\n").unwrap();

        let found = discover_config(&[first.path(), second.path()]).unwrap();
        assert_eq!(found, second.path().join(".hintcheck.yaml"));

        std::fs::write(first.path().join("hintcheck.yaml"), "").unwrap();
        let found = discover_config(&[first.path(), second.path()]).unwrap();
        assert_eq!(found, first.path().join("hintcheck.yaml"));

        let empty = TempDir::new().unwrap();
        assert!(discover_config(&[empty.path()]).is_none());
    }

    #[test]
    fn test_parse_file_missing() {
        let err = Config::parse_file("/nonexistent/hintcheck.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
