//! Model selector configuration

use crate::error::ConfigError;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Options shared by every selection strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// State count used by the constant strategy
    pub n_constant: usize,
    /// Smallest state count tried
    pub min_n_components: usize,
    /// Largest state count tried (inclusive)
    pub max_n_components: usize,
    /// Seed passed to every training call
    pub random_seed: u64,
    /// Log every candidate at info level instead of debug
    pub verbose: bool,
    /// Upper bound on cross-validation folds
    pub max_folds: usize,
    /// Shuffle sequences (with `random_seed`) before splitting into folds
    pub shuffle_folds: bool,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            n_constant: 3,
            min_n_components: 2,
            max_n_components: 10,
            random_seed: 14,
            verbose: false,
            max_folds: 3,
            shuffle_folds: false,
        }
    }
}

impl SelectorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set constant state count
    pub fn with_n_constant(mut self, n: usize) -> Self {
        self.n_constant = n;
        self
    }

    /// Set inclusive state-count range
    pub fn with_range(mut self, min: usize, max: usize) -> Self {
        self.min_n_components = min;
        self.max_n_components = max;
        self
    }

    /// Set training seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self
    }

    /// Enable verbose candidate logging
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Set cross-validation fold cap
    pub fn with_max_folds(mut self, folds: usize) -> Self {
        self.max_folds = folds;
        self
    }

    /// Shuffle sequences before fold splitting
    pub fn with_shuffle_folds(mut self, shuffle: bool) -> Self {
        self.shuffle_folds = shuffle;
        self
    }

    /// Candidate state counts in ascending order
    pub fn state_counts(&self) -> Vec<usize> {
        (self.min_n_components..=self.max_n_components).collect()
    }

    /// Check that the configuration can only produce models with at least two states
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_n_components < 2 {
            return Err(ConfigError::MinComponentsTooSmall(self.min_n_components));
        }
        if self.max_n_components < self.min_n_components {
            return Err(ConfigError::EmptyRange {
                min: self.min_n_components,
                max: self.max_n_components,
            });
        }
        if self.n_constant < 2 {
            return Err(ConfigError::ConstantTooSmall(self.n_constant));
        }
        if self.max_folds < 2 {
            return Err(ConfigError::TooFewFolds(self.max_folds));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration; missing fields take defaults
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(json).context("invalid selector configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        Self::from_json_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SelectorConfig::default();
        assert_eq!(config.n_constant, 3);
        assert_eq!(config.min_n_components, 2);
        assert_eq!(config.max_n_components, 10);
        assert_eq!(config.random_seed, 14);
        assert!(!config.verbose);
        assert!(config.validate().is_ok());
        assert_eq!(config.state_counts().len(), 9);
    }

    #[test]
    fn test_validate() {
        assert_eq!(
            SelectorConfig::new().with_range(1, 4).validate(),
            Err(ConfigError::MinComponentsTooSmall(1))
        );
        assert_eq!(
            SelectorConfig::new().with_range(5, 4).validate(),
            Err(ConfigError::EmptyRange { min: 5, max: 4 })
        );
        assert_eq!(
            SelectorConfig::new().with_n_constant(1).validate(),
            Err(ConfigError::ConstantTooSmall(1))
        );
        assert_eq!(
            SelectorConfig::new().with_max_folds(1).validate(),
            Err(ConfigError::TooFewFolds(1))
        );
    }

    #[test]
    fn test_from_json_partial() {
        let config = SelectorConfig::from_json_str(r#"{"max_n_components": 4, "verbose": true}"#).unwrap();
        assert_eq!(config.max_n_components, 4);
        assert!(config.verbose);
        assert_eq!(config.min_n_components, 2);
    }

    #[test]
    fn test_from_json_invalid_range() {
        assert!(SelectorConfig::from_json_str(r#"{"min_n_components": 6, "max_n_components": 3}"#).is_err());
    }
}
