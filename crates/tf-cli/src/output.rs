//! Output formatting and writing for command results

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tf_core::{OutputFormat, TreefoldConfig};

use crate::cli::OutputArgs;

pub struct OutputFormatter {
    format: OutputFormat,
    pretty: bool,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat, pretty: bool) -> Self {
        Self { format, pretty }
    }

    /// Command-line flags win over the config file.
    pub fn from_args(config: &TreefoldConfig, args: &OutputArgs) -> Self {
        let format = args.format.map(Into::into).unwrap_or(config.output.format);
        Self::new(format, config.output.pretty)
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn json<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(json)
    }

    /// Write the finished result to `path`, or to stdout. Nothing is written
    /// before a command has fully succeeded.
    pub fn emit(&self, content: &str, path: Option<&Path>) -> Result<()> {
        match path {
            Some(path) => fs::write(path, content)
                .with_context(|| format!("Failed to write output to {}", path.display())),
            None => {
                let mut stdout = io::stdout().lock();
                stdout.write_all(content.as_bytes())?;
                if !content.ends_with('\n') {
                    stdout.write_all(b"\n")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Format;

    #[test]
    fn test_flag_overrides_config() {
        let mut config = TreefoldConfig::default();
        config.output.format = OutputFormat::Json;
        let f = OutputFormatter::from_args(&config, &OutputArgs::default());
        assert_eq!(f.format(), OutputFormat::Json);
        let args = OutputArgs { format: Some(Format::Text), output: None };
        assert_eq!(OutputFormatter::from_args(&config, &args).format(), OutputFormat::Text);
    }

    #[test]
    fn test_pretty_json() {
        let compact = OutputFormatter::new(OutputFormat::Json, false);
        let pretty = OutputFormatter::new(OutputFormat::Json, true);
        let value = serde_json::json!({"a": [1, 2]});
        assert_eq!(compact.json(&value).unwrap(), r#"{"a":[1,2]}"#);
        assert!(pretty.json(&value).unwrap().contains('\n'));
    }

    #[test]
    fn test_emit_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        OutputFormatter::new(OutputFormat::Text, false)
            .emit("body", Some(&path))
            .unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "body");
    }
}
