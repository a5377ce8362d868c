//! React Fast Refresh instrumentation.
//!
//! Preserves component state across hot updates. The plugin injects the
//! refresh runtime entry at the front of every entry point so that component
//! registration hooks exist before any application module runs.
//!
//! ## Usage
//!
//! ```ignore
//! use tether_core::plugins::ReactRefreshPlugin;
//!
//! compiler.apply(&ReactRefreshPlugin::new().overlay(false))?;
//! ```

use crate::compiler::{Compiler, RefreshOptions};
use crate::entry::EntryStatic;
use crate::plugin::{HookResult, Plugin};

/// Module id of the refresh runtime entry.
pub const REFRESH_ENTRY_MODULE: &str = "@tether/react-refresh/client/ReactRefreshEntry.js";

/// React Fast Refresh plugin.
#[derive(Debug, Clone)]
pub struct ReactRefreshPlugin {
    overlay: bool,
    entry_module: String,
}

impl ReactRefreshPlugin {
    /// Create a refresh plugin with the error overlay enabled.
    pub fn new() -> Self {
        Self {
            overlay: true,
            entry_module: REFRESH_ENTRY_MODULE.to_string(),
        }
    }

    /// Show or hide the error overlay.
    pub fn overlay(mut self, overlay: bool) -> Self {
        self.overlay = overlay;
        self
    }

    /// Use a different refresh runtime entry module.
    pub fn entry_module(mut self, module: impl Into<String>) -> Self {
        self.entry_module = module.into();
        self
    }

    fn inject(entry_module: &str, mut entries: EntryStatic) -> EntryStatic {
        for descriptor in entries.values_mut() {
            if !descriptor.import.iter().any(|module| module == entry_module) {
                descriptor.import.insert(0, entry_module.to_string());
            }
        }
        entries
    }
}

impl Default for ReactRefreshPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for ReactRefreshPlugin {
    fn name(&self) -> &str {
        "ReactRefreshPlugin"
    }

    fn apply(&self, compiler: &mut Compiler) -> HookResult<()> {
        if !compiler.options.hot {
            compiler
                .infrastructure_logger(self.name())
                .warn("Hot Module Replacement is not enabled; React Refresh will not take effect");
        }

        compiler.options.refresh = Some(RefreshOptions {
            overlay: self.overlay,
        });

        let entry_module = self.entry_module.clone();
        let entry = compiler.take_entry();
        compiler.options.entry = entry.map_static(move |entries| Self::inject(&entry_module, entries));
        Ok(())
    }
}
