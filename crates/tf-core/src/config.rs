use crate::error::{Result, TreefoldError};
use crate::types::{OptimizationLevel, OutputFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreefoldConfig {
    pub optimizer: OptimizerConfig,
    pub output: OutputConfig,
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    pub level: OptimizationLevel,
    pub strip_comments: bool,
    pub collapse_whitespace: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub pretty: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Deepest nesting a parser accepts.
    pub max_depth: usize,
    pub max_input_bytes: usize,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            level: OptimizationLevel::Safe,
            strip_comments: false,
            collapse_whitespace: true,
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_depth: 256,
            max_input_bytes: 16 * 1024 * 1024,
        }
    }
}

impl TreefoldConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| TreefoldError::Config(format!("{}: {e}", path.display())))
    }

    /// `<config dir>/treefold/config.json`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("treefold").join("config.json"))
    }

    /// Explicit path if given, else the default path if it exists, else
    /// built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            debug!(path = %path.display(), "loading config");
            return Self::from_file(path);
        }
        match Self::default_path() {
            Some(path) if path.is_file() => {
                debug!(path = %path.display(), "loading default config");
                Self::from_file(path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Reject an input larger than `limits.max_input_bytes`.
    pub fn check_input_size(&self, len: usize) -> Result<()> {
        if len > self.limits.max_input_bytes {
            return Err(TreefoldError::LimitExceeded(format!(
                "input is {len} bytes, limit is {}",
                self.limits.max_input_bytes
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"optimizer": {{"level": "structural"}}, "limits": {{"max_depth": 8}}}}"#).unwrap();
        let cfg = TreefoldConfig::from_file(file.path()).unwrap();
        assert_eq!(cfg.optimizer.level, OptimizationLevel::Structural);
        assert!(cfg.optimizer.collapse_whitespace);
        assert_eq!(cfg.limits.max_depth, 8);
        assert_eq!(cfg.limits.max_input_bytes, LimitsConfig::default().max_input_bytes);
        assert_eq!(cfg.output.format, OutputFormat::Text);
    }

    #[test]
    fn test_bad_file_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = TreefoldConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, TreefoldError::Config(_)));
    }

    #[test]
    fn test_missing_explicit_file_is_io_error() {
        let err = TreefoldConfig::load(Some(Path::new("/definitely/not/here.json"))).unwrap_err();
        assert!(matches!(err, TreefoldError::Io(_)));
    }

    #[test]
    fn test_input_size_limit() {
        let mut cfg = TreefoldConfig::default();
        cfg.limits.max_input_bytes = 4;
        assert!(cfg.check_input_size(4).is_ok());
        assert!(matches!(cfg.check_input_size(5), Err(TreefoldError::LimitExceeded(_))));
    }
}
