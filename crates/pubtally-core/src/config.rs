use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PubtallyError, Result};

/// Column that names the faculty member a spreadsheet row belongs to.
pub const DEFAULT_FACULTY_COLUMN: &str = "Faculty Name";

/// Root application configuration, loaded from `~/.config/pubtally/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub upload: UploadConfig,
    pub remote: RemoteConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub faculty_column: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub base_url: String,
    pub api_key_env: String,
    pub user_agent: String,
    /// Page size used when listing an author's papers.
    pub page_size: u32,
    pub max_publications: usize,
    /// Per-request timeout. Unset means requests may block indefinitely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub sheet_name: String,
    pub heading: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_directory: Option<String>,
}

// ─── Defaults ──────────────────────────────────────────────

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            faculty_column: DEFAULT_FACULTY_COLUMN.to_string(),
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.semanticscholar.org/graph/v1".to_string(),
            api_key_env: "S2_API_KEY".to_string(),
            user_agent: "pubtally/0.1".to_string(),
            page_size: 100,
            max_publications: 500,
            request_timeout_secs: None,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            sheet_name: "Publications".to_string(),
            heading: "Publication Records".to_string(),
            output_directory: None,
        }
    }
}

// ─── Load / Save ───────────────────────────────────────────

impl AppConfig {
    /// Standard config file path: `~/.config/pubtally/config.toml`
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("PUBTALLY_CONFIG") {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("pubtally")
            .join("config.toml")
    }

    /// Load config from disk, falling back to defaults if the file doesn't exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.upload.faculty_column.trim().is_empty() {
            return Err(PubtallyError::ConfigError(
                "upload.faculty_column must not be empty".to_string(),
            ));
        }
        if self.remote.base_url.trim().is_empty() {
            return Err(PubtallyError::ConfigError(
                "remote.base_url must not be empty".to_string(),
            ));
        }
        if self.remote.page_size == 0 {
            return Err(PubtallyError::ConfigError(
                "remote.page_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let toml_str = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }

    /// API key for the remote lookup, read from the configured env var.
    pub fn remote_api_key(&self) -> Option<String> {
        std::env::var(&self.remote.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
    }

    /// Directory exports are written to; the working directory when unset.
    pub fn output_dir(&self) -> PathBuf {
        self.export
            .output_directory
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.upload.faculty_column, "Faculty Name");
        assert_eq!(cfg.export.sheet_name, "Publications");
        assert!(cfg.remote.request_timeout_secs.is_none());
    }

    #[test]
    fn test_config_toml_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let mut cfg = AppConfig::default();
        cfg.remote.max_publications = 42;
        cfg.export.output_directory = Some("/tmp/exports".to_string());
        cfg.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.remote.max_publications, 42);
        assert_eq!(loaded.output_dir(), PathBuf::from("/tmp/exports"));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[remote]\npage_size = 10\n").unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.remote.page_size, 10);
        assert_eq!(loaded.remote.user_agent, "pubtally/0.1");
        assert_eq!(loaded.upload.faculty_column, DEFAULT_FACULTY_COLUMN);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[upload]\nfaculty_column = \"  \"\n").unwrap();

        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, PubtallyError::ConfigError(ref m) if m.contains("faculty_column")));
    }

    #[test]
    fn test_load_nonexistent_returns_default() {
        let cfg = AppConfig::load_from(Path::new("/tmp/nonexistent_pubtally_config.toml")).unwrap();
        assert_eq!(cfg.export.heading, "Publication Records");
    }
}
