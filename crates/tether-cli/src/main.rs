#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::needless_pass_by_value)]

mod commands;
mod logging;

use clap::Parser;
use commands::Overrides;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "tether")]
#[command(author, version, about = "Dev server and hot reload orchestration for device builds", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON formatted logs
    #[arg(long, global = true)]
    json: bool,

    /// Override the working directory
    #[arg(long, global = true, value_name = "PATH")]
    cwd: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Debug, Clone)]
struct DevServerArgs {
    /// Path to a tether config (defaults to tether.config.json)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Target platform (e.g. android, ios)
    #[arg(long)]
    platform: Option<String>,

    /// Dev server port
    #[arg(long)]
    port: Option<u16>,

    /// Disable hot module replacement and React Refresh
    #[arg(long)]
    no_hmr: bool,

    /// Do not start the dev server
    #[arg(long)]
    disable_server: bool,
}

impl DevServerArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            platform: self.platform.clone(),
            port: self.port,
            no_hmr: self.no_hmr,
            disable_server: self.disable_server,
        }
    }
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Start the dev server and watch for changes
    Start {
        #[command(flatten)]
        args: DevServerArgs,
    },

    /// Print the entry points after plugin rewriting
    Entries {
        #[command(flatten)]
        args: DevServerArgs,
    },

    /// Print the host CLI's bundle/start commands adapted for tether
    Commands {
        /// Path to the host CLI command manifest (JSON)
        #[arg(long, value_name = "PATH")]
        registry: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let cwd = cli
        .cwd
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));

    // Prints JSON to stdout, no logging
    if let Commands::Commands { registry } = &cli.command {
        return commands::host::run(&cwd, registry);
    }

    logging::init(cli.verbose, cli.json);

    let rt = tokio::runtime::Runtime::new().into_diagnostic()?;
    match cli.command {
        Commands::Start { args } => {
            let span = tracing::info_span!("start", cmd = "start", cwd = %cwd.display());
            let _guard = span.enter();
            let action = commands::start::StartAction {
                cwd,
                config: args.config.clone(),
                overrides: args.overrides(),
            };
            rt.block_on(commands::start::run(action))
        }
        Commands::Entries { args } => {
            rt.block_on(commands::entries::run(cwd, args.config.clone(), args.overrides()))
        }
        Commands::Commands { .. } => unreachable!(), // Handled above
    }
}
