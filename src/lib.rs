//! # bioformats-bridge
//!
//! Open microscopy files through the Bio-Formats Java library and expose them
//! as lazily loaded 5D arrays with viewer display hints.
//!
//! All decoding is done by Bio-Formats, reached over JNI. This crate starts
//! the JVM once per process, serializes every call into the library, pulls
//! planes out on demand and packages the result the way an image viewer's
//! reader plugin returns it.
//!
//! ## Architecture
//!
//! - [`mod@format`] - supported suffixes, pixel types and plane ordering
//! - [`bridge`] - JVM lifecycle, the `FormatReader` trait and the locked reader handle
//! - [`array`] - `LazyArray`, one chunk per (T, C, Z) plane
//! - [`metadata`] - scale, names, colormaps and the lazy OME-XML document
//! - [`plugin`] - the `napari_get_reader` sniffer and `read_bioformats`
//! - [`install`] - jar download with checksum verification, sample data
//! - [`config`] - runtime settings and CLI types
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use bioformats_bridge::{napari_get_reader, PlaneCoord, ReadOptions, ReaderInput};
//!
//! let path = Path::new("cells.czi");
//! if let Some(read) = napari_get_reader(&ReaderInput::from(path)) {
//!     let layers = read(path, &ReadOptions::default()).unwrap();
//!     let layer = &layers[0];
//!     println!("shape {:?}, dtype {}", layer.data.shape(), layer.data.dtype());
//!     let plane = layer.data.chunk(PlaneCoord::new(0, 0, 0)).unwrap();
//!     println!("first plane range {:?}", plane.min_max());
//! }
//! ```

pub mod array;
pub mod bridge;
pub mod config;
pub mod error;
pub mod format;
pub mod install;
pub mod metadata;
pub mod plugin;

// Re-export commonly used types
pub use array::{ArrayData, Dimensions, LazyArray, PlaneCoord};
pub use bridge::{open_jvm_reader, FormatReader, PhysicalAxis, ReaderGuard, ReaderHandle, Runtime};
pub use config::{Cli, Command, RuntimeConfig};
pub use error::{BridgeError, ColormapError, InstallError, OmeError, ReadError};
pub use format::{is_supported, supported_suffixes, DType, DimensionOrder, Endianness, PixelType};
pub use install::{
    download_loci_jar, fetch_samples, find_jar, jar_locations, ChecksumKind, Fetcher, HttpFetcher,
};
pub use metadata::{Colormap, DisplayMetadata, LayerName, LazyOme, Rgb};
pub use plugin::{
    napari_get_reader, open_lazy, read_bioformats, read_with_reader, CondaJdkInstaller,
    LayerData, ReadOptions, ReaderFn, ReaderInput, RuntimeRemediation,
};
