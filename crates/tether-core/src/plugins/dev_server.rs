//! Dev server lifecycle plugin.
//!
//! Wires the device tunnel, hot reloading and the development server into
//! one compiler. Applying the plugin does, in order:
//!
//! 1. `adb reverse` for Android when the server is enabled (background, best effort)
//! 2. `__PUBLIC_PORT__` compile-time constant (always)
//! 3. HMR + React Refresh, then refresh entry reordering (when `hmr` is on)
//! 4. a `watchRun` handler that creates and starts the server on the first
//!    watch iteration only
//!
//! With `enabled: false` only step 2 has an effect, so bundles look the
//! same whether or not a server runs.

use crate::compiler::{AsyncTap, Compiler, InfrastructureLogger};
use crate::config::{DevServerPluginConfig, DevServerPluginOptions};
use crate::entry::RefreshEntryReorder;
use crate::plugin::{DefinePlugin, HookResult, HotModuleReplacementPlugin, Plugin, PluginError};
use crate::plugins::ReactRefreshPlugin;
use crate::server::{DevServer, HmrMessage, HttpServerFactory, ServerFactory, ServerSettings};
use crate::tunnel::{AdbTunnel, TunnelLauncher};
use futures::future::BoxFuture;
use std::sync::Arc;

const PLUGIN_NAME: &str = "DevServerPlugin";

/// Compile-time constant exposing the dev server port to bundled code.
pub const PUBLIC_PORT_DEFINE: &str = "__PUBLIC_PORT__";

/// Runs the development server and hot reloading for a compiler.
pub struct DevServerPlugin {
    config: DevServerPluginConfig,
    factory: Arc<dyn ServerFactory>,
    tunnel: Arc<dyn TunnelLauncher>,
}

impl DevServerPlugin {
    /// Create the plugin, normalizing `enabled` and `hmr` to `true` when unset.
    pub fn new(options: DevServerPluginOptions) -> Self {
        Self {
            config: DevServerPluginConfig::new(options),
            factory: Arc::new(HttpServerFactory),
            tunnel: Arc::new(AdbTunnel),
        }
    }

    /// Build servers with a different factory.
    pub fn with_server_factory(mut self, factory: Arc<dyn ServerFactory>) -> Self {
        self.factory = factory;
        self
    }

    /// Open device tunnels with a different launcher.
    pub fn with_tunnel(mut self, tunnel: Arc<dyn TunnelLauncher>) -> Self {
        self.tunnel = tunnel;
        self
    }

    pub fn config(&self) -> &DevServerPluginConfig {
        &self.config
    }

    fn apply_hmr(&self, compiler: &mut Compiler) -> HookResult<()> {
        compiler.apply(&HotModuleReplacementPlugin)?;
        compiler.apply(&ReactRefreshPlugin::new().overlay(false))?;

        let entry = compiler.take_entry();
        compiler.options.entry = RefreshEntryReorder::new().apply(entry);
        Ok(())
    }
}

impl Plugin for DevServerPlugin {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    fn apply(&self, compiler: &mut Compiler) -> HookResult<()> {
        let logger = compiler.infrastructure_logger(PLUGIN_NAME);

        if self.config.enabled && self.config.is_android() {
            self.tunnel.launch(self.config.server.port, logger.clone());
        }

        compiler.apply(&DefinePlugin::new().define(PUBLIC_PORT_DEFINE, &self.config.server.port))?;

        if !self.config.enabled {
            logger.debug("dev server disabled");
            return Ok(());
        }

        if self.config.hmr {
            self.apply_hmr(compiler)?;
        }

        let tap = ServerTap {
            settings: ServerSettings {
                config: self.config.server.clone(),
                context: compiler.context.clone(),
            },
            factory: Arc::clone(&self.factory),
            logger,
            state: ServerState::Armed,
        };
        compiler.hooks.watch_run.tap_promise(PLUGIN_NAME, tap);
        Ok(())
    }
}

/// Lifecycle of the server owned by one applied plugin.
enum ServerState {
    /// Hook registered, no watch iteration yet.
    Armed,
    /// Server created; never replaced, even if starting it failed.
    Running(Box<dyn DevServer>),
}

/// `watchRun` handler owning the server.
struct ServerTap {
    settings: ServerSettings,
    factory: Arc<dyn ServerFactory>,
    logger: InfrastructureLogger,
    state: ServerState,
}

impl ServerTap {
    async fn watch_run(&mut self) -> HookResult<()> {
        if let ServerState::Running(server) = &self.state {
            server.broadcast(HmrMessage::Building);
            return Ok(());
        }

        let server = self
            .factory
            .create(self.settings.clone())
            .map_err(|e| PluginError::new(PLUGIN_NAME, "watchRun", e))?;
        self.state = ServerState::Running(server);

        if let ServerState::Running(server) = &mut self.state {
            server
                .run()
                .await
                .map_err(|e| PluginError::new(PLUGIN_NAME, "watchRun", e))?;
        }

        self.logger.info(&format!(
            "Dev server running on port {} ({})",
            self.settings.config.port,
            self.settings.context.display()
        ));
        Ok(())
    }
}

impl AsyncTap for ServerTap {
    fn call(&mut self) -> BoxFuture<'_, HookResult<()>> {
        Box::pin(self.watch_run())
    }
}
