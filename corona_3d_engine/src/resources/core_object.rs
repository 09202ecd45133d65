/// Front-end / core object pairing
///
/// Every GPU-visible resource exists twice: a front-end object that any
/// thread may hold (metadata only) and a core object that only the core
/// thread works with. The front-end owns a reference to its core object
/// through a [`CoreHandle`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use crate::core_thread::defer_release;
use crate::error::{Error, Result};

static NEXT_CORE_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of a core object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CoreObjectId(u64);

impl CoreObjectId {
    /// Allocate a fresh id
    pub fn next() -> Self {
        Self(NEXT_CORE_OBJECT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

/// Front-end owned reference to a core object
///
/// Resolving (`core()`) happens on the producer thread, before a command is
/// built. Commands capture their own `Arc`, so a core object outlives
/// `destroy` until the last command using it has run.
///
/// Dropping a handle that still owns its core object hands that reference
/// to the core thread, which frees it between batches.
pub struct CoreHandle<T: Send + Sync + 'static> {
    core: RwLock<Option<Arc<T>>>,
}

impl<T: Send + Sync + 'static> CoreHandle<T> {
    pub fn new(core: T) -> Self {
        Self::from_arc(Arc::new(core))
    }

    /// Share an existing core object (e.g. a window's render target)
    pub fn from_arc(core: Arc<T>) -> Self {
        Self {
            core: RwLock::new(Some(core)),
        }
    }

    /// Resolve to the core object, `None` once destroyed
    pub fn core(&self) -> Option<Arc<T>> {
        self.core.read().ok().and_then(|core| core.clone())
    }

    pub fn is_destroyed(&self) -> bool {
        self.core().is_none()
    }

    /// Detach the core object from the front-end
    pub(crate) fn take(&self) -> Option<Arc<T>> {
        self.core.write().ok().and_then(|mut core| core.take())
    }
}

impl<T: Send + Sync + 'static> Drop for CoreHandle<T> {
    fn drop(&mut self) {
        let core = match self.core.get_mut() {
            Ok(core) => core.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(core) = core {
            defer_release(core);
        }
    }
}

/// A front-end resource with a core counterpart
pub trait FrontEndResource: Send + Sync {
    type Core: Send + Sync + 'static;

    /// Resource kind, used in error messages
    const KIND: &'static str;

    fn core_handle(&self) -> &CoreHandle<Self::Core>;

    /// Resolve the core object
    ///
    /// # Errors
    ///
    /// `NullResource` if the resource has been destroyed.
    fn core(&self) -> Result<Arc<Self::Core>> {
        self.core_handle()
            .core()
            .ok_or_else(|| Error::NullResource(format!("{} has no core object", Self::KIND)))
    }
}
