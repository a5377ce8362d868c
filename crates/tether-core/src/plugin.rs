//! Plugin interface and built-in plugins.
//!
//! A plugin is applied once per compiler. It may rewrite compiler options
//! right away and register handlers on compiler hooks for later.
//!
//! ## Example
//!
//! ```ignore
//! use tether_core::{Compiler, Plugin, HookResult};
//!
//! struct VersionPlugin;
//!
//! impl Plugin for VersionPlugin {
//!     fn name(&self) -> &str { "VersionPlugin" }
//!
//!     fn apply(&self, compiler: &mut Compiler) -> HookResult<()> {
//!         compiler.options.define.insert("__VERSION__".into(), "\"1.0.0\"".into());
//!         Ok(())
//!     }
//! }
//! ```

use crate::compiler::Compiler;
use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;

/// Result type for plugin hooks.
pub type HookResult<T> = Result<T, PluginError>;

/// Error from a plugin.
#[derive(Debug, Error)]
#[error("[{plugin}] {hook}: {message}")]
pub struct PluginError {
    /// Plugin name that caused the error.
    pub plugin: String,
    /// Hook that failed.
    pub hook: &'static str,
    /// Error message.
    pub message: String,
}

impl PluginError {
    pub fn new(plugin: impl Into<String>, hook: &'static str, message: impl ToString) -> Self {
        Self {
            plugin: plugin.into(),
            hook,
            message: message.to_string(),
        }
    }
}

/// The plugin trait.
pub trait Plugin: Send + Sync {
    /// Plugin name for logging and error messages.
    fn name(&self) -> &str;

    /// Install the plugin into a compiler.
    fn apply(&self, compiler: &mut Compiler) -> HookResult<()>;
}

/// Plugin that records compile-time constants.
///
/// Values are JSON-encoded, so strings end up quoted in the bundle and
/// numbers do not.
pub struct DefinePlugin {
    definitions: IndexMap<String, String>,
}

impl DefinePlugin {
    /// Create an empty define plugin.
    pub fn new() -> Self {
        Self {
            definitions: IndexMap::new(),
        }
    }

    /// Define `key` as the JSON encoding of `value`.
    pub fn define(mut self, key: impl Into<String>, value: &impl Serialize) -> Self {
        let source = serde_json::to_string(value).unwrap_or_else(|_| "undefined".to_string());
        self.definitions.insert(key.into(), source);
        self
    }
}

impl Default for DefinePlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for DefinePlugin {
    fn name(&self) -> &str {
        "DefinePlugin"
    }

    fn apply(&self, compiler: &mut Compiler) -> HookResult<()> {
        for (key, value) in &self.definitions {
            compiler.options.define.insert(key.clone(), value.clone());
        }
        Ok(())
    }
}

/// Plugin that turns on hot module replacement.
#[derive(Debug, Default)]
pub struct HotModuleReplacementPlugin;

impl Plugin for HotModuleReplacementPlugin {
    fn name(&self) -> &str {
        "HotModuleReplacementPlugin"
    }

    fn apply(&self, compiler: &mut Compiler) -> HookResult<()> {
        compiler.options.hot = true;
        Ok(())
    }
}
