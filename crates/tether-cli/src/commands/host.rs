//! `tether commands`: adapt the host CLI's commands.

use miette::{IntoDiagnostic, Result};
use std::path::Path;
use tether_core::commands::{adapt_commands, CommandRegistry};

pub fn run(cwd: &Path, registry: &Path) -> Result<()> {
    let registry = CommandRegistry::load(&cwd.join(registry)).into_diagnostic()?;
    let commands = adapt_commands(&registry, cwd).into_diagnostic()?;
    let json = serde_json::to_string_pretty(&commands).into_diagnostic()?;
    println!("{json}");
    Ok(())
}
