//! Build entry descriptions.
//!
//! An entry collection is either available up front ([`Entry::Static`]) or
//! produced later by an async factory ([`Entry::Dynamic`]). Plugins rewrite
//! both shapes through [`Entry::map_static`], which keeps a dynamic entry
//! deferred.

mod reorder;

pub use reorder::{RefreshEntryReorder, HOT_CLIENT_MARKER, REFRESH_ENTRY_MARKER};

use crate::error::{Error, Result};
use futures::future::BoxFuture;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// One named build entry point.
///
/// The order of `import` is evaluation order at runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryDescriptor {
    /// Module references evaluated in order.
    #[serde(default)]
    pub import: Vec<String>,
}

impl EntryDescriptor {
    /// Create a descriptor from an import list.
    pub fn new<I, S>(import: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            import: import.into_iter().map(Into::into).collect(),
        }
    }
}

/// Entry name → descriptor, in declaration order.
pub type EntryStatic = IndexMap<String, EntryDescriptor>;

/// Future resolving to an entry map.
pub type EntryFuture = BoxFuture<'static, Result<EntryStatic>>;

/// Zero-argument async producer of an entry map.
pub type EntryFactory = Arc<dyn Fn() -> EntryFuture + Send + Sync>;

/// The compiler's entry configuration.
#[derive(Clone)]
pub enum Entry {
    /// Entry map known synchronously.
    Static(EntryStatic),
    /// Entry map produced on demand.
    Dynamic(EntryFactory),
}

impl Entry {
    /// Wrap an async closure as a dynamic entry.
    pub fn dynamic<F, Fut>(factory: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<EntryStatic>> + Send + 'static,
    {
        Entry::Dynamic(Arc::new(move || -> EntryFuture { Box::pin(factory()) }))
    }

    /// Whether the entry is produced asynchronously.
    pub fn is_dynamic(&self) -> bool {
        matches!(self, Entry::Dynamic(_))
    }

    /// Apply a transformation to the entry map.
    ///
    /// Static maps are transformed immediately. Dynamic entries get a new
    /// factory that awaits the original and transforms its output, so the
    /// caller still receives a deferred value.
    pub fn map_static<F>(self, f: F) -> Entry
    where
        F: Fn(EntryStatic) -> EntryStatic + Send + Sync + 'static,
    {
        match self {
            Entry::Static(entries) => Entry::Static(f(entries)),
            Entry::Dynamic(factory) => {
                let f = Arc::new(f);
                Entry::Dynamic(Arc::new(move || -> EntryFuture {
                    let factory = Arc::clone(&factory);
                    let f = Arc::clone(&f);
                    Box::pin(async move {
                        let entries = factory().await?;
                        Ok(f(entries))
                    })
                }))
            }
        }
    }

    /// Resolve to a concrete entry map, awaiting the factory if needed.
    pub async fn resolve(&self) -> Result<EntryStatic> {
        match self {
            Entry::Static(entries) => Ok(entries.clone()),
            Entry::Dynamic(factory) => factory().await,
        }
    }
}

impl Default for Entry {
    fn default() -> Self {
        Entry::Static(EntryStatic::new())
    }
}

impl From<EntryStatic> for Entry {
    fn from(entries: EntryStatic) -> Self {
        Entry::Static(entries)
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entry::Static(entries) => f.debug_tuple("Static").field(entries).finish(),
            Entry::Dynamic(_) => f.write_str("Dynamic(<factory>)"),
        }
    }
}

/// Build an [`Error::EntryFactory`] from anything displayable.
pub fn factory_error(err: impl fmt::Display) -> Error {
    Error::EntryFactory(err.to_string())
}
