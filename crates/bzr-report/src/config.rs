use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use report_spec::{Company, CompanyDirectory, InMemoryDirectory};

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "bzr-report.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub directory: InMemoryDirectory,
    pub export: ExportConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    pub output_dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    /// Loads the harness configuration.
    ///
    /// An explicit path must exist. Without one, `bzr-report.toml` in the
    /// working directory is used when present, defaults otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !fallback.exists() {
                    debug!("no configuration file, using defaults");
                    return Ok(Self::default());
                }
                fallback
            }
        };
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = Self::parse(&raw)
            .with_context(|| format!("invalid config {}", path.display()))?;
        debug!(
            path = %path.display(),
            companies = config.directory.companies.len(),
            "configuration loaded"
        );
        Ok(config)
    }

    pub fn parse(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn company(&self, id: &str) -> Result<Company> {
        self.directory
            .company(id)
            .with_context(|| format!("company '{id}' is not in the configured directory"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_directory_and_export_sections() {
        let config = Config::parse(
            r#"
            [[directory.companies]]
            id = "c-001"
            name = "Universal Logistics"
            contact = "office@ul.example"
            responsible_person = "Marko Marković"

            [export]
            output_dir = "izvestaji"
            "#,
        )
        .expect("config");
        assert_eq!(config.export.output_dir, PathBuf::from("izvestaji"));
        let company = config.company("c-001").expect("company");
        assert_eq!(company.responsible_person.as_deref(), Some("Marko Marković"));
        assert!(config.company("c-404").is_err());
    }

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::parse("").expect("config");
        assert_eq!(config, Config::default());
        assert_eq!(config.export.output_dir, PathBuf::from("."));
    }

    #[test]
    fn unknown_sections_are_rejected() {
        assert!(Config::parse("[printer]\nname = \"x\"\n").is_err());
    }
}
