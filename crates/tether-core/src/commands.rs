//! Adapter over the host CLI's `bundle` and `start` commands.
//!
//! The host CLI declares positional option values as required (`<path>`).
//! tether fills most of them from its own config, so the adapted commands
//! declare them optional (`[path]`) and add tether's own flags.

use crate::config::resolve_config_path;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Package that provides the host command registry.
pub const HOST_CLI_PACKAGE: &str = "@react-native-community/cli";

pub const BUNDLE_COMMAND: &str = "tether-bundle";
pub const START_COMMAND: &str = "tether-start";

/// How a command option's raw value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueParse {
    /// Resolve the value against the working directory into an absolute path.
    ResolvePath,
}

/// One option of a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOption {
    /// Flag with value markup, e.g. `--entry-file <path>`.
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Default value, when the option has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Value interpretation; the raw value is used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parse: Option<ValueParse>,
}

impl CommandOption {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            default: None,
            parse: None,
        }
    }

    /// Interpret a value given for this option on the command line.
    pub fn parse_value(&self, raw: &str, cwd: &Path) -> String {
        match self.parse {
            Some(ValueParse::ResolvePath) => resolve_path(cwd, raw).display().to_string(),
            None => raw.to_string(),
        }
    }
}

/// `raw` made absolute against `cwd`; an empty value is `cwd` itself.
fn resolve_path(cwd: &Path, raw: &str) -> PathBuf {
    if raw.is_empty() {
        cwd.to_path_buf()
    } else {
        cwd.join(raw)
    }
}

/// One command of the host CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandDescriptor {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub options: Vec<CommandOption>,
}

/// Commands exported by the host CLI.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommandRegistry {
    pub commands: Vec<CommandDescriptor>,
}

impl CommandRegistry {
    /// Load a registry manifest (JSON).
    ///
    /// A missing manifest means the host CLI is not installed.
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path).map_err(|_| Error::CliNotFound {
            package: HOST_CLI_PACKAGE.to_string(),
        })?;
        Self::from_json(&source, path)
    }

    pub fn from_json(source: &str, path: &Path) -> Result<Self> {
        serde_json::from_str(source).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Look up a command by name.
    pub fn find(&self, name: &str) -> Result<&CommandDescriptor> {
        self.commands
            .iter()
            .find(|command| command.name == name)
            .ok_or_else(|| Error::CommandNotFound {
                name: name.to_string(),
            })
    }
}

/// Turn required value markup into optional markup: the first `<` becomes
/// `[` and the first `>` becomes `]`.
pub fn optionalize(name: &str) -> String {
    name.replacen('<', "[", 1).replacen('>', "]", 1)
}

/// Build tether's `bundle` and `start` commands from the host's.
pub fn adapt_commands(registry: &CommandRegistry, project_root: &Path) -> Result<Vec<CommandDescriptor>> {
    let bundle = registry.find("bundle")?;
    let start = registry.find("start")?;
    let config_option = config_option(project_root);

    let mut bundle_options = optional_options(&bundle.options);
    bundle_options.push(CommandOption::new("--verbose", "Enables verbose logging"));
    bundle_options.push(config_option.clone());

    let mut start_options = optional_options(&start.options);
    start_options.push(config_option);

    Ok(vec![
        CommandDescriptor {
            name: BUNDLE_COMMAND.to_string(),
            description: bundle.description.clone(),
            options: bundle_options,
        },
        CommandDescriptor {
            name: START_COMMAND.to_string(),
            description: start.description.clone(),
            options: start_options,
        },
    ])
}

fn optional_options(options: &[CommandOption]) -> Vec<CommandOption> {
    options
        .iter()
        .map(|option| CommandOption {
            name: optionalize(&option.name),
            ..option.clone()
        })
        .collect()
}

/// `--config [path]`, defaulting to the discovered config file or empty.
/// Given values are resolved against the working directory.
fn config_option(project_root: &Path) -> CommandOption {
    let default = resolve_config_path(project_root)
        .map(|path| path.display().to_string())
        .unwrap_or_default();
    CommandOption {
        name: "--config [path]".to_string(),
        description: "Path to a tether config".to_string(),
        default: Some(default),
        parse: Some(ValueParse::ResolvePath),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REGISTRY: &str = r#"{
        "commands": [
            {
                "name": "bundle",
                "description": "Builds the JavaScript bundle for offline use",
                "options": [
                    { "name": "--entry-file <path>", "description": "Entry file" },
                    { "name": "--platform <string>", "description": "Platform", "default": "ios" },
                    { "name": "--dev [boolean]", "description": "Dev mode" }
                ]
            },
            {
                "name": "start",
                "description": "Starts the dev server",
                "options": [{ "name": "--port <number>", "description": "Port" }]
            },
            { "name": "doctor", "description": "Diagnose" }
        ]
    }"#;

    fn registry() -> CommandRegistry {
        CommandRegistry::from_json(REGISTRY, Path::new("commands.json")).unwrap()
    }

    #[test]
    fn test_optionalize() {
        assert_eq!(optionalize("--entry-file <path>"), "--entry-file [path]");
        assert_eq!(optionalize("--dev [boolean]"), "--dev [boolean]");
        assert_eq!(optionalize("--pair <a> <b>"), "--pair [a] <b>");
        assert_eq!(optionalize("--reset-cache"), "--reset-cache");
    }

    #[test]
    fn test_adapt_commands() {
        let dir = tempfile::tempdir().unwrap();
        let commands = adapt_commands(&registry(), dir.path()).unwrap();

        assert_eq!(commands.len(), 2);
        let bundle = &commands[0];
        assert_eq!(bundle.name, BUNDLE_COMMAND);
        assert_eq!(bundle.description, "Builds the JavaScript bundle for offline use");
        let names: Vec<_> = bundle.options.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "--entry-file [path]",
                "--platform [string]",
                "--dev [boolean]",
                "--verbose",
                "--config [path]"
            ]
        );
        assert_eq!(bundle.options[1].default.as_deref(), Some("ios"));

        let start = &commands[1];
        assert_eq!(start.name, START_COMMAND);
        let names: Vec<_> = start.options.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, ["--port [number]", "--config [path]"]);
    }

    #[test]
    fn test_config_default_swallows_missing_config() {
        let dir = tempfile::tempdir().unwrap();
        let option = config_option(dir.path());
        assert_eq!(option.default.as_deref(), Some(""));
    }

    #[test]
    fn test_config_default_uses_discovered_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tether.config.json");
        std::fs::write(&path, "{}").unwrap();

        let option = config_option(dir.path());
        assert_eq!(option.default, Some(path.display().to_string()));
    }

    #[test]
    fn test_config_value_resolves_to_absolute_path() {
        let option = config_option(Path::new("/nonexistent"));
        let cwd = Path::new("/work/app");

        assert_eq!(
            option.parse_value("configs/dev.json", cwd),
            Path::new("/work/app/configs/dev.json").display().to_string()
        );
        assert_eq!(option.parse_value("/etc/tether.json", cwd), "/etc/tether.json");
        assert_eq!(option.parse_value("", cwd), cwd.display().to_string());
    }

    #[test]
    fn test_host_options_keep_raw_values() {
        let commands = adapt_commands(&registry(), Path::new("/nonexistent")).unwrap();
        let entry_file = &commands[0].options[0];

        assert_eq!(entry_file.parse, None);
        assert_eq!(entry_file.parse_value("index.js", Path::new("/work")), "index.js");
    }

    #[test]
    fn test_missing_command_is_an_error() {
        let registry = CommandRegistry {
            commands: vec![CommandDescriptor {
                name: "bundle".into(),
                description: String::new(),
                options: Vec::new(),
            }],
        };

        let err = adapt_commands(&registry, Path::new("/")).unwrap_err();
        assert!(matches!(err, Error::CommandNotFound { name } if name == "start"));
    }

    #[test]
    fn test_missing_manifest_names_the_package() {
        let err = CommandRegistry::load(Path::new("/nonexistent/commands.json")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot resolve @react-native-community/cli package"
        );
    }
}
