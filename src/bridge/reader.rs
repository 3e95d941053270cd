//! FormatReader trait for the foreign decoding library.
//!
//! This trait mirrors the subset of `loci.formats.IFormatReader` and the
//! attached OME-XML metadata store that the rest of the crate needs. The JVM
//! implementation lives in [`super::jvm`]; tests provide in-memory readers.
//!
//! Implementations are not expected to be reentrant. Callers must go through
//! [`super::ReaderHandle`], which serializes every call process-wide.

use bytes::Bytes;

use crate::error::BridgeError;

// =============================================================================
// Physical Axis
// =============================================================================

/// Spatial axes with a physical pixel size in the OME metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhysicalAxis {
    X,
    Y,
    Z,
}

// =============================================================================
// FormatReader Trait
// =============================================================================

/// A bound reader for one file.
///
/// All methods refer to series 0 / image 0 of the file.
pub trait FormatReader: Send + Sync {
    /// `getSizeX()`
    fn size_x(&self) -> Result<u32, BridgeError>;

    /// `getSizeY()`
    fn size_y(&self) -> Result<u32, BridgeError>;

    /// `getSizeZ()`
    fn size_z(&self) -> Result<u32, BridgeError>;

    /// `getSizeC()`
    fn size_c(&self) -> Result<u32, BridgeError>;

    /// `getSizeT()`
    fn size_t(&self) -> Result<u32, BridgeError>;

    /// `isRGB()`
    fn is_rgb(&self) -> Result<bool, BridgeError>;

    /// `getRGBChannelCount()`
    fn rgb_channel_count(&self) -> Result<u32, BridgeError>;

    /// `isLittleEndian()`
    fn is_little_endian(&self) -> Result<bool, BridgeError>;

    /// Raw `getPixelType()` code.
    fn pixel_type(&self) -> Result<i32, BridgeError>;

    /// `getIndex(z, c, t)`: the library's own plane index.
    fn plane_index(&self, z: u32, c: u32, t: u32) -> Result<u32, BridgeError>;

    /// `openBytes(index)`: raw bytes of one plane, copied out of the library.
    fn open_bytes(&self, index: u32) -> Result<Bytes, BridgeError>;

    /// Physical pixel size along an axis, `None` if the file does not record it.
    fn physical_size(&self, axis: PhysicalAxis) -> Result<Option<f64>, BridgeError>;

    /// Name of the first image.
    fn image_name(&self) -> Result<Option<String>, BridgeError>;

    /// Name of a channel of the first image.
    fn channel_name(&self, channel: u32) -> Result<Option<String>, BridgeError>;

    /// Packed RGBA color of a channel of the first image.
    fn channel_color(&self, channel: u32) -> Result<Option<i32>, BridgeError>;

    /// The OME-XML document describing the file.
    fn ome_xml(&self) -> Result<String, BridgeError>;

    /// Release library resources. Called once when the handle is dropped.
    fn close(&self) -> Result<(), BridgeError> {
        Ok(())
    }
}

impl<R: FormatReader + ?Sized> FormatReader for Box<R> {
    fn size_x(&self) -> Result<u32, BridgeError> {
        (**self).size_x()
    }

    fn size_y(&self) -> Result<u32, BridgeError> {
        (**self).size_y()
    }

    fn size_z(&self) -> Result<u32, BridgeError> {
        (**self).size_z()
    }

    fn size_c(&self) -> Result<u32, BridgeError> {
        (**self).size_c()
    }

    fn size_t(&self) -> Result<u32, BridgeError> {
        (**self).size_t()
    }

    fn is_rgb(&self) -> Result<bool, BridgeError> {
        (**self).is_rgb()
    }

    fn rgb_channel_count(&self) -> Result<u32, BridgeError> {
        (**self).rgb_channel_count()
    }

    fn is_little_endian(&self) -> Result<bool, BridgeError> {
        (**self).is_little_endian()
    }

    fn pixel_type(&self) -> Result<i32, BridgeError> {
        (**self).pixel_type()
    }

    fn plane_index(&self, z: u32, c: u32, t: u32) -> Result<u32, BridgeError> {
        (**self).plane_index(z, c, t)
    }

    fn open_bytes(&self, index: u32) -> Result<Bytes, BridgeError> {
        (**self).open_bytes(index)
    }

    fn physical_size(&self, axis: PhysicalAxis) -> Result<Option<f64>, BridgeError> {
        (**self).physical_size(axis)
    }

    fn image_name(&self) -> Result<Option<String>, BridgeError> {
        (**self).image_name()
    }

    fn channel_name(&self, channel: u32) -> Result<Option<String>, BridgeError> {
        (**self).channel_name(channel)
    }

    fn channel_color(&self, channel: u32) -> Result<Option<i32>, BridgeError> {
        (**self).channel_color(channel)
    }

    fn ome_xml(&self) -> Result<String, BridgeError> {
        (**self).ome_xml()
    }

    fn close(&self) -> Result<(), BridgeError> {
        (**self).close()
    }
}
