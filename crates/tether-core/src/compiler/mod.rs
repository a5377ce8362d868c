//! The build compiler that plugins are applied to.
//!
//! Mirrors the parts of a bundler compiler a dev server plugin touches:
//! the working directory, the entry configuration, compile-time constants,
//! hot-reload switches, and the watch lifecycle hook.

mod hooks;

pub use hooks::{AsyncSeriesHook, AsyncTap, CompilerHooks};

use crate::entry::{Entry, EntryStatic};
use crate::error::Result;
use crate::plugin::{HookResult, Plugin};
use indexmap::IndexMap;
use std::path::PathBuf;

/// Settings recorded by the refresh instrumentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshOptions {
    /// Whether the in-app error overlay is shown.
    pub overlay: bool,
}

/// Options plugins may read and rewrite.
#[derive(Debug, Default)]
pub struct CompilerOptions {
    /// Entry configuration.
    pub entry: Entry,
    /// Compile-time constants: identifier → source text.
    pub define: IndexMap<String, String>,
    /// Hot module replacement support.
    pub hot: bool,
    /// Refresh instrumentation, when installed.
    pub refresh: Option<RefreshOptions>,
}

/// A compiler instance for one build/watch session.
#[derive(Debug)]
pub struct Compiler {
    /// Project working directory.
    pub context: PathBuf,
    /// Mutable build options.
    pub options: CompilerOptions,
    /// Lifecycle hooks.
    pub hooks: CompilerHooks,
}

impl Compiler {
    /// Create a compiler rooted at `context`.
    pub fn new(context: PathBuf, entry: impl Into<Entry>) -> Self {
        Self {
            context,
            options: CompilerOptions {
                entry: entry.into(),
                ..CompilerOptions::default()
            },
            hooks: CompilerHooks::default(),
        }
    }

    /// Apply a plugin to this compiler.
    pub fn apply(&mut self, plugin: &dyn Plugin) -> HookResult<()> {
        tracing::debug!(plugin = plugin.name(), "applying plugin");
        plugin.apply(self)
    }

    /// Logger scoped to a plugin name.
    pub fn infrastructure_logger(&self, name: &str) -> InfrastructureLogger {
        InfrastructureLogger {
            name: name.to_string(),
            context: self.context.clone(),
        }
    }

    /// Fire the watch-iteration hook.
    pub async fn watch_run(&mut self) -> HookResult<()> {
        self.hooks.watch_run.call().await
    }

    /// Resolve the entry configuration to a concrete map.
    pub async fn resolve_entry(&self) -> Result<EntryStatic> {
        self.options.entry.resolve().await
    }

    /// Take the entry configuration out for rewriting.
    pub fn take_entry(&mut self) -> Entry {
        std::mem::take(&mut self.options.entry)
    }
}

/// Named logger handed to plugins.
#[derive(Debug, Clone)]
pub struct InfrastructureLogger {
    name: String,
    context: PathBuf,
}

impl InfrastructureLogger {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn debug(&self, message: &str) {
        tracing::debug!(plugin = %self.name, context = %self.context.display(), "{message}");
    }

    pub fn info(&self, message: &str) {
        tracing::info!(plugin = %self.name, context = %self.context.display(), "{message}");
    }

    pub fn warn(&self, message: &str) {
        tracing::warn!(plugin = %self.name, context = %self.context.display(), "{message}");
    }
}
