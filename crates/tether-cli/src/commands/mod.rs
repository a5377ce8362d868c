pub mod entries;
pub mod host;
pub mod start;

use miette::{IntoDiagnostic, Result};
use std::path::{Path, PathBuf};
use tether_core::config::{load_project_config, resolve_config_path};
use tether_core::{DevServerPluginOptions, ProjectConfig};

/// Command-line overrides for the dev server options.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub platform: Option<String>,
    pub port: Option<u16>,
    pub no_hmr: bool,
    pub disable_server: bool,
}

impl Overrides {
    /// Apply flags on top of the config file values.
    pub fn apply(&self, mut options: DevServerPluginOptions) -> DevServerPluginOptions {
        if let Some(platform) = &self.platform {
            options.server.platform.clone_from(platform);
        }
        if let Some(port) = self.port {
            options.server.port = port;
        }
        if self.no_hmr {
            options.hmr = Some(false);
        }
        if self.disable_server {
            options.enabled = Some(false);
        }
        options
    }
}

/// Load the project config, from `config` if given, else by discovery in `cwd`.
pub fn load_project(cwd: &Path, config: Option<&Path>) -> Result<(PathBuf, ProjectConfig)> {
    let path = match config {
        Some(path) if path.is_absolute() => path.to_path_buf(),
        Some(path) => cwd.join(path),
        None => resolve_config_path(cwd).into_diagnostic()?,
    };
    let project = load_project_config(&path).into_diagnostic()?;
    tracing::debug!(path = %path.display(), entries = project.entry.len(), "loaded config");
    Ok((path, project))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_win_over_file_values() {
        let options: DevServerPluginOptions =
            serde_json::from_str(r#"{"platform":"ios","port":8081,"hmr":true}"#).unwrap();
        let overrides = Overrides {
            platform: Some("android".into()),
            port: Some(9000),
            no_hmr: true,
            disable_server: false,
        };

        let options = overrides.apply(options);
        assert_eq!(options.server.platform, "android");
        assert_eq!(options.server.port, 9000);
        assert_eq!(options.hmr, Some(false));
        assert_eq!(options.enabled, None);
    }

    #[test]
    fn test_load_project_relative_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("conf")).unwrap();
        std::fs::write(
            dir.path().join("conf/dev.json"),
            r#"{"entry":{"main":{"import":["index.js"]}}}"#,
        )
        .unwrap();

        let (path, project) = load_project(dir.path(), Some(Path::new("conf/dev.json"))).unwrap();
        assert_eq!(path, dir.path().join("conf/dev.json"));
        assert_eq!(project.entry["main"].import, ["index.js"]);
    }

    #[test]
    fn test_load_project_without_config_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_project(dir.path(), None).is_err());
    }
}
