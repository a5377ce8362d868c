//! Plugin and project configuration.

use crate::entry::EntryStatic;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Port the dev server listens on unless configured otherwise.
pub const DEFAULT_PORT: u16 = 8081;

/// The only platform family with a device tunnel.
pub const ANDROID: &str = "android";

/// Options handed through to the dev server unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevServerConfig {
    /// Target platform family (e.g. `android`, `ios`).
    #[serde(default)]
    pub platform: String,
    /// Port used by the server, the injected client constant and the tunnel.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_host() -> String {
    "localhost".to_string()
}

impl Default for DevServerConfig {
    fn default() -> Self {
        Self {
            platform: String::new(),
            port: DEFAULT_PORT,
            host: default_host(),
        }
    }
}

/// User-facing plugin options, as written in a config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevServerPluginOptions {
    /// Whether to run the development server. Defaults to `true`.
    #[serde(default)]
    pub enabled: Option<bool>,
    /// Whether hot module replacement and refresh are wired in. Defaults to `true`.
    #[serde(default)]
    pub hmr: Option<bool>,
    /// Server options.
    #[serde(flatten)]
    pub server: DevServerConfig,
}

/// Normalized plugin configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevServerPluginConfig {
    pub enabled: bool,
    pub hmr: bool,
    pub server: DevServerConfig,
}

impl DevServerPluginConfig {
    /// Normalize user options, defaulting `enabled` and `hmr` to `true`.
    #[must_use]
    pub fn new(options: DevServerPluginOptions) -> Self {
        Self {
            enabled: options.enabled.unwrap_or(true),
            hmr: options.hmr.unwrap_or(true),
            server: options.server,
        }
    }

    /// Whether this configuration targets the tunnel-capable platform.
    #[must_use]
    pub fn is_android(&self) -> bool {
        self.server.platform == ANDROID
    }
}

impl From<DevServerPluginOptions> for DevServerPluginConfig {
    fn from(options: DevServerPluginOptions) -> Self {
        Self::new(options)
    }
}

/// Project configuration file (`tether.config.json`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    /// Build entries.
    #[serde(default)]
    pub entry: EntryStatic,
    /// Dev server plugin options.
    #[serde(default)]
    pub dev_server: DevServerPluginOptions,
}

/// Config file names in priority order, relative to the project root.
pub const CONFIG_FILES: &[&str] = &["tether.config.json", ".tether/config.json"];

/// Find the project config file under `root`.
pub fn resolve_config_path(root: &Path) -> Result<PathBuf> {
    CONFIG_FILES
        .iter()
        .map(|name| root.join(name))
        .find(|path| path.is_file())
        .ok_or_else(|| Error::ConfigNotFound {
            root: root.to_path_buf(),
        })
}

/// Load and parse a project config file.
pub fn load_project_config(path: &Path) -> Result<ProjectConfig> {
    let source = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&source).map_err(|source| Error::ConfigParse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_normalized_once() {
        let config = DevServerPluginConfig::new(DevServerPluginOptions::default());
        assert!(config.enabled);
        assert!(config.hmr);
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.server.host, "localhost");
    }

    #[test]
    fn test_explicit_values_win() {
        let options: DevServerPluginOptions =
            serde_json::from_str(r#"{"enabled":false,"hmr":false,"platform":"ios","port":9000}"#)
                .unwrap();
        let config = DevServerPluginConfig::from(options);

        assert!(!config.enabled);
        assert!(!config.hmr);
        assert_eq!(config.server.platform, "ios");
        assert_eq!(config.server.port, 9000);
        assert!(!config.is_android());
    }

    #[test]
    fn test_project_config_roundtrip_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tether.config.json");
        std::fs::write(
            &path,
            r#"{
                "entry": { "main": { "import": ["InitializeCore.js", "index.js"] } },
                "devServer": { "platform": "android", "hmr": false }
            }"#,
        )
        .unwrap();

        assert_eq!(resolve_config_path(dir.path()).unwrap(), path);

        let config = load_project_config(&path).unwrap();
        assert_eq!(config.entry["main"].import, ["InitializeCore.js", "index.js"]);
        assert_eq!(config.dev_server.server.platform, "android");
        assert_eq!(config.dev_server.hmr, Some(false));
        assert_eq!(config.dev_server.enabled, None);
    }

    #[test]
    fn test_missing_config_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_config_path(dir.path()).unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound { .. }));
    }

    #[test]
    fn test_invalid_config_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tether.config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = load_project_config(&path).unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }));
    }
}
