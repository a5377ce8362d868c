#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]

//! Dev-time orchestration between a bundler and a running mobile app.
//!
//! The [`DevServerPlugin`] is applied to a [`Compiler`]; it opens a device
//! tunnel, wires hot reloading (fixing up the entry order so refresh
//! registers before the hot client runs), and starts a dev server on the
//! first watch iteration.

pub mod commands;
pub mod compiler;
pub mod config;
pub mod entry;
pub mod error;
pub mod plugin;
pub mod plugins;
pub mod server;
pub mod tunnel;

pub use compiler::Compiler;
pub use config::{DevServerConfig, DevServerPluginConfig, DevServerPluginOptions, ProjectConfig};
pub use entry::{Entry, EntryDescriptor, EntryStatic, RefreshEntryReorder};
pub use error::Error;
pub use plugin::{HookResult, Plugin, PluginError};
pub use plugins::DevServerPlugin;
