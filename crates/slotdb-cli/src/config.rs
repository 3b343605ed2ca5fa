//! Configuration file support for the CLI.
//!
//! Loads page settings from a TOML file with a `[page]` table:
//!
//! ```toml
//! [page]
//! page_size = 4096
//! compaction_threshold = 0.3
//! verify_on_open = true
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use slotdb_common::PageConfig;

/// CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Page settings.
    #[serde(default)]
    pub page: PageConfig,
}

impl CliConfig {
    /// Loads configuration from a file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        Ok(config)
    }

    /// Loads the given file, or the defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Applies command-line overrides and validates the result.
    pub fn with_page_size(mut self, page_size: Option<usize>) -> Result<Self> {
        if let Some(page_size) = page_size {
            self.page.page_size = page_size;
        }
        self.page.validate()?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = CliConfig::load(None).unwrap();
        assert_eq!(config.page, PageConfig::default());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[page]\npage_size = 4096\nverify_on_open = true").unwrap();

        let config = CliConfig::from_file(file.path()).unwrap();
        assert_eq!(config.page.page_size, 4096);
        assert!(config.page.verify_on_open);
        assert_eq!(config.page.pages, PageConfig::default().pages);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let config = CliConfig::from_file(file.path()).unwrap();
        assert_eq!(config, CliConfig::default());
    }

    #[test]
    fn test_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[page]\npage_size = \"large\"").unwrap();
        assert!(CliConfig::from_file(file.path()).is_err());
        assert!(CliConfig::from_file(Path::new("/nonexistent/slotdb.toml")).is_err());
    }

    #[test]
    fn test_page_size_override() {
        let config = CliConfig::default().with_page_size(Some(512)).unwrap();
        assert_eq!(config.page.page_size, 512);

        assert!(CliConfig::default().with_page_size(Some(8)).is_err());
    }
}
