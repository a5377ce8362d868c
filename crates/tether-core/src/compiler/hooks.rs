//! Async lifecycle hooks.

use crate::plugin::HookResult;
use futures::future::BoxFuture;

/// A handler registered on an [`AsyncSeriesHook`].
///
/// Handlers take `&mut self`, so per-handler state (such as a lazily created
/// server) lives in the handler and needs no lock: a series hook never runs
/// two invocations of the same handler at once.
pub trait AsyncTap: Send {
    fn call(&mut self) -> BoxFuture<'_, HookResult<()>>;
}

impl<F> AsyncTap for F
where
    F: FnMut() -> BoxFuture<'static, HookResult<()>> + Send,
{
    fn call(&mut self) -> BoxFuture<'_, HookResult<()>> {
        self()
    }
}

struct Tap {
    name: String,
    handler: Box<dyn AsyncTap>,
}

/// Hook whose handlers run one after another, each awaited before the next.
#[derive(Default)]
pub struct AsyncSeriesHook {
    taps: Vec<Tap>,
}

impl AsyncSeriesHook {
    /// Create an empty hook.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under a plugin name.
    pub fn tap_promise(&mut self, name: impl Into<String>, handler: impl AsyncTap + 'static) {
        self.taps.push(Tap {
            name: name.into(),
            handler: Box::new(handler),
        });
    }

    /// Run every handler in registration order.
    ///
    /// Stops at the first failure and returns it.
    pub async fn call(&mut self) -> HookResult<()> {
        for tap in &mut self.taps {
            tracing::trace!(tap = %tap.name, "calling hook");
            tap.handler.call().await?;
        }
        Ok(())
    }

    /// Names of registered handlers, in order.
    pub fn tap_names(&self) -> Vec<&str> {
        self.taps.iter().map(|tap| tap.name.as_str()).collect()
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.taps.len()
    }

    /// Whether no handler is registered.
    pub fn is_empty(&self) -> bool {
        self.taps.is_empty()
    }
}

impl std::fmt::Debug for AsyncSeriesHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncSeriesHook")
            .field("taps", &self.tap_names())
            .finish()
    }
}

/// Hooks exposed by the compiler.
#[derive(Debug, Default)]
pub struct CompilerHooks {
    /// Fired at the start of every watch iteration.
    pub watch_run: AsyncSeriesHook,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::PluginError;
    use futures::FutureExt;
    use std::sync::{Arc, Mutex};

    fn recorder(log: &Arc<Mutex<Vec<&'static str>>>, label: &'static str) -> impl AsyncTap {
        let log = Arc::clone(log);
        move || {
            let log = Arc::clone(&log);
            async move {
                log.lock().unwrap().push(label);
                Ok::<(), PluginError>(())
            }
            .boxed()
        }
    }

    #[tokio::test]
    async fn test_taps_run_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut hook = AsyncSeriesHook::new();
        hook.tap_promise("first", recorder(&log, "first"));
        hook.tap_promise("second", recorder(&log, "second"));

        hook.call().await.unwrap();
        hook.call().await.unwrap();

        assert_eq!(*log.lock().unwrap(), ["first", "second", "first", "second"]);
        assert_eq!(hook.tap_names(), ["first", "second"]);
    }

    #[tokio::test]
    async fn test_failure_stops_the_series() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut hook = AsyncSeriesHook::new();
        hook.tap_promise("failing", || {
            async { Err::<(), _>(PluginError::new("failing", "watchRun", "nope")) }.boxed()
        });
        hook.tap_promise("after", recorder(&log, "after"));

        let err = hook.call().await.unwrap_err();
        assert_eq!(err.plugin, "failing");
        assert!(log.lock().unwrap().is_empty());
    }
}
