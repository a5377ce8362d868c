//! Device-to-host reverse port forwarding.
//!
//! Runs `adb reverse tcp:<port> tcp:<port>` so an app on a connected Android
//! device can reach the dev server through `localhost`. The command runs in
//! a detached task; its outcome is only logged. Only one device is addressed.

use crate::compiler::InfrastructureLogger;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tokio::task::JoinHandle;

/// Environment variable pointing at the Android SDK.
pub const ANDROID_HOME: &str = "ANDROID_HOME";

/// Marker preceding the reason in the tool's error output.
const ERROR_MARKER: &str = "error:";

/// A reverse port forward for one port.
#[derive(Debug, Clone)]
pub struct AdbReverse {
    adb: PathBuf,
    port: u16,
}

impl AdbReverse {
    /// Forward `port`, locating `adb` through `ANDROID_HOME`.
    pub fn from_env(port: u16) -> Self {
        Self::new(adb_path(std::env::var_os(ANDROID_HOME)), port)
    }

    pub fn new(adb: PathBuf, port: u16) -> Self {
        Self { adb, port }
    }

    pub fn adb(&self) -> &Path {
        &self.adb
    }

    /// The command line as shown in logs.
    pub fn command_line(&self) -> String {
        format!(
            "{} reverse tcp:{} tcp:{}",
            self.adb.display(),
            self.port,
            self.port
        )
    }

    /// Run the forward once.
    ///
    /// The error string mirrors what a shell reports: spawn failures carry
    /// the I/O message, non-zero exits carry the tool's stderr.
    pub async fn run(&self) -> Result<(), String> {
        let tcp = format!("tcp:{}", self.port);
        let output = Command::new(&self.adb)
            .args(["reverse", tcp.as_str(), tcp.as_str()])
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| e.to_string())?;

        if output.status.success() {
            Ok(())
        } else {
            Err(format!(
                "Command failed: {}\n{}",
                self.command_line(),
                String::from_utf8_lossy(&output.stderr)
            ))
        }
    }

    /// Start the forward in the background and log the outcome.
    ///
    /// Returns `None` without a tokio runtime; nothing is spawned then.
    pub fn spawn(self, logger: InfrastructureLogger) -> Option<JoinHandle<()>> {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            logger.warn(&format!(
                "Failed to run: {} - no async runtime available",
                self.command_line()
            ));
            return None;
        };

        Some(handle.spawn(async move {
            let command = self.command_line();
            match self.run().await {
                Ok(()) => logger.info(&format!("Successfully run: {command}")),
                Err(message) => logger.warn(&format!(
                    "Failed to run: {command} - {}",
                    extract_tool_error(&message)
                )),
            }
        }))
    }
}

/// Opens the device tunnel for a dev server port.
///
/// Launching never fails the caller; outcomes go to the logger.
pub trait TunnelLauncher: Send + Sync {
    fn launch(&self, port: u16, logger: InfrastructureLogger);
}

/// Launches [`AdbReverse`] with `adb` located through `ANDROID_HOME`.
#[derive(Debug, Default, Clone, Copy)]
pub struct AdbTunnel;

impl TunnelLauncher for AdbTunnel {
    fn launch(&self, port: u16, logger: InfrastructureLogger) {
        AdbReverse::from_env(port).spawn(logger);
    }
}

/// `$ANDROID_HOME/platform-tools/adb`, or plain `adb` from the search path.
pub fn adb_path(android_home: Option<OsString>) -> PathBuf {
    match android_home {
        Some(home) if !home.is_empty() => PathBuf::from(home).join("platform-tools").join("adb"),
        _ => PathBuf::from("adb"),
    }
}

/// The reason reported by the tool: text after the first `error:` marker,
/// or the whole message when there is none.
pub fn extract_tool_error(message: &str) -> &str {
    message
        .split(ERROR_MARKER)
        .nth(1)
        .filter(|reason| !reason.is_empty())
        .unwrap_or(message)
        .trim()
}
