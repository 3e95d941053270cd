//! Reader entry points for the host viewer.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use super::remediation::RuntimeRemediation;
use crate::array::{Dimensions, LazyArray};
use crate::bridge::{open_jvm_reader, FormatReader, ReaderHandle};
use crate::config::RuntimeConfig;
use crate::error::{BridgeError, ReadError};
use crate::format::is_supported;
use crate::metadata::DisplayMetadata;

// =============================================================================
// Types
// =============================================================================

/// What the host asks a reader plugin about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReaderInput {
    Path(PathBuf),
    Paths(Vec<PathBuf>),
}

impl From<PathBuf> for ReaderInput {
    fn from(path: PathBuf) -> Self {
        ReaderInput::Path(path)
    }
}

impl From<&Path> for ReaderInput {
    fn from(path: &Path) -> Self {
        ReaderInput::Path(path.to_path_buf())
    }
}

impl From<&str> for ReaderInput {
    fn from(path: &str) -> Self {
        ReaderInput::Path(PathBuf::from(path))
    }
}

impl From<Vec<PathBuf>> for ReaderInput {
    fn from(paths: Vec<PathBuf>) -> Self {
        ReaderInput::Paths(paths)
    }
}

/// Signature of the reader returned by [`napari_get_reader`].
pub type ReaderFn = fn(&Path, &ReadOptions) -> Result<Vec<LayerData>, ReadError>;

/// Options for a read.
#[derive(Clone)]
pub struct ReadOptions {
    /// Return one layer per channel (sets `channel_axis`).
    pub split_channels: bool,

    /// Used only if this read starts the runtime.
    pub runtime: RuntimeConfig,

    /// Tried once if the Java runtime cannot be found.
    pub remediation: Option<Arc<dyn RuntimeRemediation>>,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            split_channels: true,
            runtime: RuntimeConfig::default(),
            remediation: None,
        }
    }
}

impl ReadOptions {
    pub fn with_split_channels(mut self, split_channels: bool) -> Self {
        self.split_channels = split_channels;
        self
    }

    pub fn with_runtime(mut self, runtime: RuntimeConfig) -> Self {
        self.runtime = runtime;
        self
    }

    pub fn with_remediation(mut self, remediation: Arc<dyn RuntimeRemediation>) -> Self {
        self.remediation = Some(remediation);
        self
    }
}

impl fmt::Debug for ReadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadOptions")
            .field("split_channels", &self.split_channels)
            .field("runtime", &self.runtime)
            .field("remediation", &self.remediation.is_some())
            .finish()
    }
}

/// One layer: the lazy array and its display hints.
#[derive(Debug, Clone)]
pub struct LayerData {
    pub data: LazyArray,
    pub meta: DisplayMetadata,
}

// =============================================================================
// Entry Points
// =============================================================================

/// Sniffer: the reader for a single path with a supported suffix.
///
/// Lists of paths and unknown suffixes get `None`. Never fails.
pub fn napari_get_reader(input: &ReaderInput) -> Option<ReaderFn> {
    match input {
        ReaderInput::Path(path) if is_supported(path) => Some(read_bioformats as ReaderFn),
        _ => None,
    }
}

/// Open `path` through Bio-Formats and return exactly one layer.
pub fn read_bioformats(path: &Path, options: &ReadOptions) -> Result<Vec<LayerData>, ReadError> {
    read_with_opener(path, options, |path, options| {
        open_jvm_reader(path, &options.runtime)
    })
}

/// Open `path` and return only its lazy array.
pub fn open_lazy(path: &Path, config: &RuntimeConfig) -> Result<LazyArray, BridgeError> {
    let handle = open_jvm_reader(path, config)?;
    LazyArray::new(Arc::new(handle))
}

/// Build the layer for a reader already bound to `path`.
pub fn read_with_reader(
    reader: impl FormatReader + 'static,
    path: &Path,
    split_channels: bool,
) -> Result<Vec<LayerData>, BridgeError> {
    read_handle(ReaderHandle::new(path, reader), split_channels)
}

/// Run a read with `open`, remediating a missing runtime at most once.
pub(crate) fn read_with_opener<F>(
    path: &Path,
    options: &ReadOptions,
    open: F,
) -> Result<Vec<LayerData>, ReadError>
where
    F: Fn(&Path, &ReadOptions) -> Result<ReaderHandle, BridgeError>,
{
    let handle = match open(path, options) {
        Ok(handle) => handle,
        Err(e) if e.is_runtime_not_found() => {
            let retried = match options.remediation {
                Some(ref remediation) if remediation.remediate(&e) => {
                    info!("Java runtime remediated, retrying {}", path.display());
                    open(path, options)
                }
                _ => Err(e),
            };
            match retried {
                Ok(handle) => handle,
                Err(e) if e.is_runtime_not_found() => {
                    return Err(ReadError::JavaRequired(e.to_string()))
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(e) => return Err(e.into()),
    };

    Ok(read_handle(handle, options.split_channels)?)
}

fn read_handle(handle: ReaderHandle, split_channels: bool) -> Result<Vec<LayerData>, BridgeError> {
    let (dims, meta) = {
        let reader = handle.lock();
        let dims = Dimensions::query(&*reader)?;
        let meta = DisplayMetadata::extract(&*reader, handle.path(), &dims, split_channels)?;
        (dims, meta)
    };
    debug!(
        "{}: shape {:?}, dtype {}",
        handle.path().display(),
        dims.shape(),
        dims.dtype
    );

    let data = LazyArray::with_dimensions(Arc::new(handle), dims);
    Ok(vec![LayerData { data, meta }])
}

// =============================================================================
// Tests
// =============================================================================
