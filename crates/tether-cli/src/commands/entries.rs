//! `tether entries`: print the entry map the bundler will see.

use super::{load_project, Overrides};
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;
use tether_core::{Compiler, DevServerPlugin};

pub async fn run(cwd: PathBuf, config: Option<PathBuf>, overrides: Overrides) -> Result<()> {
    let (_, project) = load_project(&cwd, config.as_deref())?;
    let options = overrides.apply(project.dev_server);

    let mut compiler = Compiler::new(cwd, project.entry);
    compiler
        .apply(&DevServerPlugin::new(options))
        .into_diagnostic()?;

    // No watch iteration runs, so the server is never started.
    let entries = compiler.resolve_entry().await.into_diagnostic()?;
    let json = serde_json::to_string_pretty(&entries).into_diagnostic()?;
    println!("{json}");
    Ok(())
}
