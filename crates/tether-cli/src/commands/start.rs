//! `tether start` command implementation.
//!
//! Applies the dev server plugin to a compiler and drives its watch loop:
//!
//! ```text
//! apply DevServerPlugin   → tunnel, __PUBLIC_PORT__, HMR wiring
//! watch_run (initial)     → dev server created and started
//! file change → watch_run → server kept, clients told a rebuild started
//! ```

use super::{load_project, Overrides};
use miette::{IntoDiagnostic, Result};
use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;
use tether_core::{Compiler, DevServerPlugin};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Quiet period that closes a batch of changes.
const DEBOUNCE: Duration = Duration::from_millis(50);

/// Source extensions that trigger a watch iteration.
const WATCHED_EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx", "mjs", "cjs", "json"];

/// Start action.
#[derive(Debug, Clone)]
pub struct StartAction {
    /// Project root.
    pub cwd: PathBuf,
    /// Explicit config file (overrides discovery).
    pub config: Option<PathBuf>,
    /// Flag overrides.
    pub overrides: Overrides,
}

/// Run the dev server until interrupted.
pub async fn run(action: StartAction) -> Result<()> {
    let cwd = action.cwd.canonicalize().into_diagnostic()?;
    let (config_path, project) = load_project(&cwd, action.config.as_deref())?;
    info!(config = %config_path.display(), "loaded config");

    let options = action.overrides.apply(project.dev_server);
    let mut compiler = Compiler::new(cwd.clone(), project.entry);
    compiler
        .apply(&DevServerPlugin::new(options))
        .into_diagnostic()?;

    compiler.watch_run().await.into_diagnostic()?;

    let (change_tx, mut change_rx) = mpsc::channel::<Vec<PathBuf>>(16);
    let watch_cwd = cwd.clone();
    std::thread::spawn(move || {
        if let Err(e) = watch_files(&watch_cwd, &change_tx) {
            warn!(error = %e, "file watcher stopped");
        }
    });

    info!("watching {} (Ctrl+C to stop)", cwd.display());

    loop {
        tokio::select! {
            changed = change_rx.recv() => {
                let Some(changed) = changed else { break };
                debug!(files = ?changed, "change detected");
                info!(count = changed.len(), "files changed");
                compiler.watch_run().await.into_diagnostic()?;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                break;
            }
        }
    }

    Ok(())
}

/// Check if a path should be ignored by the file watcher.
fn should_ignore(path: &Path) -> bool {
    let path_str = path.to_string_lossy();

    if path_str.contains("/node_modules/")
        || path_str.contains("/.git/")
        || path_str.contains("/build/")
        || path_str.contains("/dist/")
        || path_str.contains("/android/app/build/")
        || path_str.contains("/ios/Pods/")
        || path_str.contains("/.tether/")
    {
        return true;
    }

    path.file_name()
        .is_some_and(|name| name.to_string_lossy().starts_with('.'))
}

fn is_watched(path: &Path) -> bool {
    if should_ignore(path) {
        return false;
    }
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    WATCHED_EXTENSIONS.contains(&ext)
}

/// Watch `cwd` and forward batches of changed files.
///
/// A batch is sent once no event has arrived for [`DEBOUNCE`]. Returns when
/// the receiving side is gone.
fn watch_files(cwd: &Path, change_tx: &mpsc::Sender<Vec<PathBuf>>) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();

    let mut watcher = RecommendedWatcher::new(tx, Config::default()).into_diagnostic()?;
    watcher.watch(cwd, RecursiveMode::Recursive).into_diagnostic()?;

    let mut pending: HashSet<PathBuf> = HashSet::new();

    loop {
        match rx.recv_timeout(DEBOUNCE) {
            Ok(Ok(event)) => {
                pending.extend(event.paths.into_iter().filter(|p| is_watched(p)));
            }
            Ok(Err(e)) => warn!(error = %e, "watch error"),
            Err(RecvTimeoutError::Timeout) => {
                if pending.is_empty() {
                    if change_tx.is_closed() {
                        break;
                    }
                    continue;
                }
                if change_tx.blocking_send(pending.drain().collect()).is_err() {
                    break;
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    Ok(())
}
