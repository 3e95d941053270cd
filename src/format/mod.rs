//! What Bio-Formats can read and how its pixel data is laid out.
//!
//! - [`registry`]: the file suffixes the reader claims
//! - [`pixel`]: pixel type codes, byte order and plane ordering

pub mod pixel;
pub mod registry;

pub use pixel::{DType, DimensionOrder, Endianness, PixelType};
pub use registry::{is_supported, supported_suffixes};
