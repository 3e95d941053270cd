use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while talking to the Java runtime or a Bio-Formats reader
#[derive(Debug, Clone, Error)]
pub enum BridgeError {
    /// No Java virtual machine could be located on this system
    #[error("Java runtime not found: {0}")]
    RuntimeNotFound(String),

    /// A JVM was located but could not be started
    #[error("Failed to start Java runtime: {0}")]
    RuntimeStart(String),

    /// The Bio-Formats jar is not installed in any known location
    #[error("loci_tools.jar not found (searched: {searched:?})")]
    JarNotFound { searched: Vec<PathBuf> },

    /// The file is unreadable or not recognized by Bio-Formats
    #[error("Failed to open {path}: {reason}")]
    OpenFailed { path: PathBuf, reason: String },

    /// A call into the Java library threw an exception
    #[error("Java error: {0}")]
    Java(String),

    /// Pixel type code outside the range Bio-Formats defines
    #[error("Unknown pixel type code: {0}")]
    UnknownPixelType(i32),

    /// Dimension order string not recognized
    #[error("Unknown dimension order: {0}")]
    UnknownDimensionOrder(String),

    /// The library returned a plane of unexpected length
    #[error("Plane {index} has {actual} bytes, expected {expected}")]
    PlaneSize {
        index: u32,
        expected: usize,
        actual: usize,
    },

    /// Pixel bytes could not be arranged into the requested shape
    #[error("Failed to decode pixel data: {0}")]
    Decode(String),

    /// Requested chunk lies outside the array
    #[error("Chunk (t={t}, c={c}, z={z}) out of bounds for shape (T={size_t}, C={size_c}, Z={size_z})")]
    ChunkOutOfBounds {
        t: u32,
        c: u32,
        z: u32,
        size_t: u32,
        size_c: u32,
        size_z: u32,
    },
}

impl BridgeError {
    /// Whether this error means the Java runtime itself is missing.
    pub fn is_runtime_not_found(&self) -> bool {
        matches!(self, BridgeError::RuntimeNotFound(_))
    }
}

/// Errors from the reader plugin entry points
#[derive(Debug, Clone, Error)]
pub enum ReadError {
    /// The Java runtime is missing and remediation did not resolve it
    #[error(
        "bioformats-bridge requires (but could not find) a java virtual machine. \
         Please install java (or set JAVA_HOME) and try again. ({0})"
    )]
    JavaRequired(String),

    /// Any other bridge failure
    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

/// Errors from downloading and installing artifacts
#[derive(Debug, Clone, Error)]
pub enum InstallError {
    /// Downloaded bytes do not match the published digest
    #[error("Downloaded {artifact} has invalid checksum: expected {expected}, got {actual}. Please try again.")]
    ChecksumMismatch {
        artifact: String,
        expected: String,
        actual: String,
    },

    /// None of the candidate directories is writable
    #[error(
        "No writable location found. Please download loci_tools.jar ({url}) \
         to one of the following locations: {candidates:?}"
    )]
    NoWritableLocation { url: String, candidates: Vec<PathBuf> },

    /// Network or HTTP failure
    #[error("Fetch error for {url}: {message}")]
    Fetch { url: String, message: String },

    /// The published checksum file could not be understood
    #[error("Invalid checksum file at {url}")]
    InvalidChecksumFile { url: String },

    /// Local filesystem failure
    #[error("I/O error at {path}: {message}")]
    Io { path: PathBuf, message: String },

    /// A sample archive could not be extracted
    #[error("Archive error for {archive}: {message}")]
    Archive { archive: String, message: String },
}

impl InstallError {
    pub(crate) fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        InstallError::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

/// Errors parsing the embedded OME-XML document
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OmeError {
    #[error("Invalid OME-XML: {0}")]
    Parse(String),
}

/// Errors building a colormap
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ColormapError {
    #[error("A colormap needs at least two control points, got {0}")]
    TooFewControls(usize),

    #[error("Color component out of range [0, 1]: {0}")]
    ComponentOutOfRange(f64),
}
