//! Configuration loading and management

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// How DELETE requests are carried out for kinds that allow it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum DeleteMode {
    /// Rows are physically removed from the store
    Hard,

    /// Rows are flagged instead of removed; the field must be declared on
    /// kinds that support deletion
    Soft {
        #[serde(default = "default_delete_field")]
        field: String,
    },
}

fn default_delete_field() -> String {
    "deleted".to_string()
}

impl Default for DeleteMode {
    fn default() -> Self {
        DeleteMode::Soft {
            field: default_delete_field(),
        }
    }
}

impl DeleteMode {
    /// The soft-delete field name, when soft deletion is active
    pub fn soft_field(&self) -> Option<&str> {
        match self {
            DeleteMode::Soft { field } => Some(field),
            DeleteMode::Hard => None,
        }
    }

    pub fn is_hard(&self) -> bool {
        matches!(self, DeleteMode::Hard)
    }
}

/// Immutable per-server configuration.
///
/// Constructed once and shared by every handler of a server instance; two
/// instances in one process can carry different configurations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Path prefix all routes are mounted under (no slashes)
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Deletion behavior
    #[serde(default)]
    pub delete: DeleteMode,
}

fn default_api_base() -> String {
    "api".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            delete: DeleteMode::default(),
        }
    }
}

impl ApiConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Configuration with hard deletion enabled
    pub fn hard_delete(mut self) -> Self {
        self.delete = DeleteMode::Hard;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.api_base, "api");
        assert_eq!(config.delete.soft_field(), Some("deleted"));
        assert!(!config.delete.is_hard());
    }

    #[test]
    fn test_from_yaml_str() {
        let config = ApiConfig::from_yaml_str(
            r#"
            api_base: v1
            delete:
                mode: soft
                field: removed
            "#,
        )
        .unwrap();

        assert_eq!(config.api_base, "v1");
        assert_eq!(config.delete.soft_field(), Some("removed"));
    }

    #[test]
    fn test_hard_mode_yaml() {
        let config = ApiConfig::from_yaml_str(
            r#"
            delete:
                mode: hard
            "#,
        )
        .unwrap();

        assert_eq!(config.api_base, "api");
        assert!(config.delete.is_hard());
        assert_eq!(config.delete.soft_field(), None);
    }

    #[test]
    fn test_soft_field_defaults_when_omitted() {
        let config = ApiConfig::from_yaml_str("delete:\n  mode: soft\n").unwrap();
        assert_eq!(config.delete.soft_field(), Some("deleted"));
    }

    #[test]
    fn test_from_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api_base: files").unwrap();

        let config = ApiConfig::from_yaml_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.api_base, "files");
    }

    #[test]
    fn test_from_yaml_file_missing() {
        assert!(ApiConfig::from_yaml_file("/nonexistent/config.yaml").is_err());
    }

    #[test]
    fn test_hard_delete_builder() {
        let config = ApiConfig::default().hard_delete();
        assert!(config.delete.is_hard());
    }
}
