//! Re-sequencing of the refresh runtime entry.
//!
//! The refresh instrumentation injects its runtime entry ahead of everything
//! else, which places it before the platform bootstrap (`InitializeCore`).
//! The runtime must instead evaluate after the bootstrap and right before
//! the hot-reload client, giving the startup chain:
//!
//! ```text
//! 0. polyfills
//! 1. InitializeCore      (sets up the devtools hook)
//! 2. ReactRefreshEntry   (registers refresh)
//! 3. WebpackHMRClient    (assumes everything above is ready)
//! ```

use super::{Entry, EntryStatic};
use tracing::debug;

/// Identifies the refresh runtime entry inside an import list.
pub const REFRESH_ENTRY_MARKER: &str = "ReactRefreshEntry.js";

/// Identifies the hot-reload client inside an import list.
pub const HOT_CLIENT_MARKER: &str = "WebpackHMRClient.js";

/// Moves the refresh runtime import right before the hot-reload client.
#[derive(Debug, Clone)]
pub struct RefreshEntryReorder {
    refresh_marker: String,
    hot_client_marker: String,
}

impl RefreshEntryReorder {
    /// Create a reorderer using the default markers.
    pub fn new() -> Self {
        Self {
            refresh_marker: REFRESH_ENTRY_MARKER.to_string(),
            hot_client_marker: HOT_CLIENT_MARKER.to_string(),
        }
    }

    /// Override the marker identifying the refresh runtime import.
    pub fn refresh_marker(mut self, marker: impl Into<String>) -> Self {
        self.refresh_marker = marker.into();
        self
    }

    /// Override the marker identifying the hot-reload client import.
    pub fn hot_client_marker(mut self, marker: impl Into<String>) -> Self {
        self.hot_client_marker = marker.into();
        self
    }

    /// Reorder a single import list in place.
    ///
    /// Returns `false` when the list has no refresh import and was left alone.
    /// Without a hot client the refresh import goes to the end of the list.
    pub fn reorder_imports(&self, imports: &mut Vec<String>) -> bool {
        let Some(refresh_index) = imports
            .iter()
            .position(|module| module.contains(&self.refresh_marker))
        else {
            return false;
        };

        let refresh_entry = imports.remove(refresh_index);
        let target = imports
            .iter()
            .position(|module| module.contains(&self.hot_client_marker))
            .unwrap_or(imports.len());
        imports.insert(target, refresh_entry);
        true
    }

    /// Reorder every entry of a static map independently.
    pub fn reorder(&self, mut entries: EntryStatic) -> EntryStatic {
        for (name, descriptor) in &mut entries {
            if self.reorder_imports(&mut descriptor.import) {
                debug!(entry = %name, imports = ?descriptor.import, "placed refresh entry before hot client");
            }
        }
        entries
    }

    /// Apply the reordering to either entry shape.
    pub fn apply(self, entry: Entry) -> Entry {
        entry.map_static(move |entries| self.reorder(entries))
    }
}

impl Default for RefreshEntryReorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::EntryDescriptor;

    fn entries(imports: &[&str]) -> EntryStatic {
        let mut map = EntryStatic::new();
        map.insert("main".into(), EntryDescriptor::new(imports.iter().copied()));
        map
    }

    fn sorted(list: &[String]) -> Vec<String> {
        let mut list = list.to_vec();
        list.sort();
        list
    }

    #[test]
    fn test_already_ordered_entry_is_unchanged() {
        let input = entries(&[
            "PolyfillA.js",
            "InitializeCore.js",
            "ReactRefreshEntry.js",
            "WebpackHMRClient.js",
            "App.js",
        ]);

        let output = RefreshEntryReorder::new().reorder(input.clone());
        assert_eq!(output, input);
    }

    #[test]
    fn test_refresh_moves_after_initialize_core() {
        let output = RefreshEntryReorder::new().reorder(entries(&[
            "PolyfillA.js",
            "ReactRefreshEntry.js",
            "InitializeCore.js",
            "WebpackHMRClient.js",
        ]));

        assert_eq!(
            output["main"].import,
            [
                "PolyfillA.js",
                "InitializeCore.js",
                "ReactRefreshEntry.js",
                "WebpackHMRClient.js"
            ]
        );
    }

    #[test]
    fn test_refresh_after_hot_client_moves_back() {
        let output = RefreshEntryReorder::new().reorder(entries(&[
            "node_modules/hot/WebpackHMRClient.js",
            "App.js",
            "node_modules/refresh/ReactRefreshEntry.js",
        ]));

        assert_eq!(
            output["main"].import,
            [
                "node_modules/refresh/ReactRefreshEntry.js",
                "node_modules/hot/WebpackHMRClient.js",
                "App.js"
            ]
        );
    }

    #[test]
    fn test_without_refresh_marker_is_noop() {
        let input = entries(&["InitializeCore.js", "WebpackHMRClient.js", "App.js"]);
        let output = RefreshEntryReorder::new().reorder(input.clone());
        assert_eq!(output, input);
    }

    #[test]
    fn test_missing_hot_client_appends_refresh() {
        let output = RefreshEntryReorder::new().reorder(entries(&[
            "ReactRefreshEntry.js",
            "InitializeCore.js",
            "App.js",
        ]));

        assert_eq!(
            output["main"].import,
            ["InitializeCore.js", "App.js", "ReactRefreshEntry.js"]
        );
    }

    #[test]
    fn test_result_is_permutation_and_idempotent() {
        let input = entries(&[
            "ReactRefreshEntry.js",
            "PolyfillA.js",
            "PolyfillB.js",
            "InitializeCore.js",
            "WebpackHMRClient.js",
            "App.js",
        ]);
        let reorder = RefreshEntryReorder::new();

        let once = reorder.reorder(input.clone());
        let imports = &once["main"].import;
        assert_eq!(imports.len(), input["main"].import.len());
        assert_eq!(sorted(imports), sorted(&input["main"].import));

        let refresh = imports.iter().position(|m| m == "ReactRefreshEntry.js").unwrap();
        let client = imports.iter().position(|m| m == "WebpackHMRClient.js").unwrap();
        assert_eq!(refresh + 1, client);

        let twice = reorder.reorder(once.clone());
        assert_eq!(twice, once);
    }

    #[test]
    fn test_entries_are_reordered_independently() {
        let mut input = entries(&["ReactRefreshEntry.js", "Init.js", "WebpackHMRClient.js"]);
        input.insert(
            "worker".into(),
            EntryDescriptor::new(["Worker.js", "WebpackHMRClient.js"]),
        );

        let output = RefreshEntryReorder::new().reorder(input);

        assert_eq!(
            output["main"].import,
            ["Init.js", "ReactRefreshEntry.js", "WebpackHMRClient.js"]
        );
        assert_eq!(output["worker"].import, ["Worker.js", "WebpackHMRClient.js"]);
        assert_eq!(output.keys().collect::<Vec<_>>(), ["main", "worker"]);
    }

    #[test]
    fn test_custom_markers() {
        let reorder = RefreshEntryReorder::new()
            .refresh_marker("refresh-runtime")
            .hot_client_marker("hot-client");
        let mut imports = vec![
            "refresh-runtime.js".to_string(),
            "core.js".to_string(),
            "hot-client.js".to_string(),
        ];

        assert!(reorder.reorder_imports(&mut imports));
        assert_eq!(imports, ["core.js", "refresh-runtime.js", "hot-client.js"]);
    }

    #[tokio::test]
    async fn test_dynamic_entry_is_reordered_after_await() {
        let entry = Entry::dynamic(|| async {
            Ok(entries(&[
                "PolyfillA.js",
                "ReactRefreshEntry.js",
                "InitializeCore.js",
                "WebpackHMRClient.js",
            ]))
        });

        let reordered = RefreshEntryReorder::new().apply(entry);
        assert!(reordered.is_dynamic());

        let resolved = reordered.resolve().await.unwrap();
        assert_eq!(
            resolved["main"].import,
            [
                "PolyfillA.js",
                "InitializeCore.js",
                "ReactRefreshEntry.js",
                "WebpackHMRClient.js"
            ]
        );
    }
}
