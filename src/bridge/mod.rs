//! Bridge to the Bio-Formats Java library.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │         LazyArray / metadata            │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │             ReaderHandle                │
//! │   (process-wide lock on every call)     │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │          FormatReader Trait             │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │  JvmFormatReader  →  Runtime (one JVM)  │
//! └─────────────────────────────────────────┘
//! ```

mod handle;
mod jvm;
mod reader;
mod runtime;

use std::path::Path;

pub use handle::{ReaderGuard, ReaderHandle};
pub use jvm::JvmFormatReader;
pub use reader::{FormatReader, PhysicalAxis};
pub use runtime::{jvm_options, Runtime};

use crate::config::RuntimeConfig;
use crate::error::BridgeError;

/// Start the runtime if needed and open `path` with Bio-Formats.
pub fn open_jvm_reader(path: &Path, config: &RuntimeConfig) -> Result<ReaderHandle, BridgeError> {
    let runtime = Runtime::get_or_start(config)?;
    let reader = {
        let _lock = handle::acquire_foreign_lock();
        JvmFormatReader::open(runtime, path)?
    };
    Ok(ReaderHandle::new(path, reader))
}
