//! Repository configuration.
//!
//! On-disk repositories keep their settings in `config.toml` at the
//! repository root. Every field is optional in the file; missing fields take
//! their default.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RepoError, RepoResult};

/// File name of the configuration inside a repository directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Default bound on symbolic reference chains.
pub const DEFAULT_MAX_SYMBOLIC_DEPTH: usize = 5;

/// Tunables for a [`Repository`](crate::Repository).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    /// Maximum number of symbolic links followed while resolving a reference.
    pub max_symbolic_depth: usize,
    /// Re-hash objects read from disk and reject mismatches.
    pub verify_on_read: bool,
    /// zstd level for newly written loose objects.
    pub compression_level: i32,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            max_symbolic_depth: DEFAULT_MAX_SYMBOLIC_DEPTH,
            verify_on_read: true,
            compression_level: 3,
        }
    }
}

impl RepositoryConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> RepoResult<Self> {
        let config: Self = toml::from_str(s).map_err(|e| RepoError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Render as a TOML document.
    pub fn to_toml_string(&self) -> RepoResult<String> {
        toml::to_string_pretty(self).map_err(|e| RepoError::Config(e.to_string()))
    }

    /// Load the config file at `path`, falling back to defaults when absent.
    pub fn load(path: &Path) -> RepoResult<Self> {
        match fs::read_to_string(path) {
            Ok(contents) => Self::from_toml_str(&contents),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Write the config file at `path`.
    pub fn save(&self, path: &Path) -> RepoResult<()> {
        fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    /// Reject out-of-range values.
    pub fn validate(&self) -> RepoResult<()> {
        if self.max_symbolic_depth == 0 {
            return Err(RepoError::Config(
                "max_symbolic_depth must be at least 1".into(),
            ));
        }
        if !(1..=22).contains(&self.compression_level) {
            return Err(RepoError::Config(format!(
                "compression_level must be between 1 and 22, got {}",
                self.compression_level
            )));
        }
        Ok(())
    }
}
