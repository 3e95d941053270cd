//! Exclusive access to foreign readers.
//!
//! Bio-Formats readers keep a mutable cursor and are not safe to call from
//! several threads at once. The library is treated as globally non-reentrant,
//! so one process-wide lock covers every call made through any
//! [`ReaderHandle`], across all open files.

use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

use super::reader::FormatReader;

/// The single lock serializing all calls into the foreign library.
static FOREIGN_LOCK: Mutex<()> = Mutex::new(());

pub(crate) fn acquire_foreign_lock() -> MutexGuard<'static, ()> {
    // The lock guards no data, so a panic while holding it leaves nothing inconsistent.
    FOREIGN_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// ReaderHandle
// =============================================================================

/// Owns one bound reader. The reader is only reachable through [`ReaderHandle::lock`].
pub struct ReaderHandle {
    path: PathBuf,
    reader: Box<dyn FormatReader>,
}

impl ReaderHandle {
    /// Take ownership of a reader already bound to `path`.
    pub fn new(path: impl Into<PathBuf>, reader: impl FormatReader + 'static) -> Self {
        Self {
            path: path.into(),
            reader: Box::new(reader),
        }
    }

    /// The file this handle is bound to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Acquire the process-wide lock and borrow the reader.
    ///
    /// Blocks until no other thread is inside the foreign library. Do not call
    /// this again on the same thread while a guard is alive.
    pub fn lock(&self) -> ReaderGuard<'_> {
        ReaderGuard {
            _lock: acquire_foreign_lock(),
            reader: self.reader.as_ref(),
        }
    }
}

impl Drop for ReaderHandle {
    fn drop(&mut self) {
        let reader = self.lock();
        if let Err(e) = reader.close() {
            debug!("Closing reader for {} failed: {}", self.path.display(), e);
        }
    }
}

impl std::fmt::Debug for ReaderHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReaderHandle")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Borrow of a reader while the foreign lock is held.
pub struct ReaderGuard<'a> {
    _lock: MutexGuard<'static, ()>,
    reader: &'a (dyn FormatReader + 'static),
}

impl Deref for ReaderGuard<'_> {
    type Target = dyn FormatReader + 'static;

    fn deref(&self) -> &Self::Target {
        self.reader
    }
}

// =============================================================================
// Tests
// =============================================================================
