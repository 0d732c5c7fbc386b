//! Run configuration file.
//!
//! ```yaml
//! folder: public/swagger
//! group: root
//! namespace: App::Http::Controllers
//! title: Widget API
//! version: 1.2.0
//! server:
//!   SERVER_NAME: localhost
//! ```
//!
//! Every key is optional. JSON files are accepted too.

use crate::error::{Error, Result};
use crate::openapi_builder::Info;
use log::debug;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DocConfig {
    /// Output folder for group and action documents
    pub folder: PathBuf,
    /// Group document used when a descriptor names none
    pub group: String,
    /// Namespace prefix for directory discovery
    pub namespace: String,
    pub title: String,
    pub version: String,
    pub description: Option<String>,
    /// Base server environment of every synthesized request
    pub server: Map<String, Value>,
}

impl Default for DocConfig {
    fn default() -> Self {
        let info = Info::default();
        Self {
            folder: PathBuf::from("swagger"),
            group: "root".to_string(),
            namespace: "App::Http::Controllers".to_string(),
            title: info.title,
            version: info.version,
            description: info.description,
            server: Map::new(),
        }
    }
}

impl DocConfig {
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading configuration from {}", path.display());
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::parse(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn parse(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Info block written into new group documents.
    pub fn info(&self) -> Info {
        Info {
            title: self.title.clone(),
            version: self.version.clone(),
            description: self.description.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = DocConfig::parse("folder: public/docs\ntitle: Widget API\n").unwrap();

        assert_eq!(config.folder, PathBuf::from("public/docs"));
        assert_eq!(config.title, "Widget API");
        assert_eq!(config.group, "root");
        assert_eq!(config.namespace, "App::Http::Controllers");
    }

    #[test]
    fn test_json_is_accepted() {
        let config = DocConfig::parse(r#"{"group": "admin", "server": {"SERVER_PORT": 8080}}"#).unwrap();

        assert_eq!(config.group, "admin");
        assert_eq!(config.server["SERVER_PORT"], json!(8080));
    }

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(DocConfig::parse("").unwrap(), DocConfig::default());
    }

    #[test]
    fn test_load_reports_invalid_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("docs.yaml");
        fs::write(&path, "folder: [unclosed").unwrap();

        assert!(matches!(DocConfig::load(&path), Err(Error::Config(_))));
        assert!(matches!(
            DocConfig::load(&temp_dir.path().join("missing.yaml")),
            Err(Error::Io { .. })
        ));
    }

    #[test]
    fn test_info_block() {
        let config = DocConfig {
            description: Some("Widgets".to_string()),
            ..DocConfig::default()
        };

        assert_eq!(config.info().description.as_deref(), Some("Widgets"));
        assert_eq!(config.info().version, "1.0.0");
    }
}
