//! Pixel types, element-type tags and plane ordering as Bio-Formats defines them.

use std::fmt;
use std::str::FromStr;

use crate::error::BridgeError;

// =============================================================================
// PixelType
// =============================================================================

/// Pixel type codes returned by `IFormatReader.getPixelType()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelType {
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Float,
    Double,
    /// One bit per pixel, delivered by the library as one byte per pixel
    Bit,
}

impl PixelType {
    /// Size of one element in the plane buffer.
    pub const fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelType::Int8 | PixelType::UInt8 | PixelType::Bit => 1,
            PixelType::Int16 | PixelType::UInt16 => 2,
            PixelType::Int32 | PixelType::UInt32 | PixelType::Float => 4,
            PixelType::Double => 8,
        }
    }

    /// The numpy kind letter plus byte width, e.g. `u2`.
    const fn kind(&self) -> &'static str {
        match self {
            PixelType::Int8 => "i1",
            PixelType::UInt8 | PixelType::Bit => "u1",
            PixelType::Int16 => "i2",
            PixelType::UInt16 => "u2",
            PixelType::Int32 => "i4",
            PixelType::UInt32 => "u4",
            PixelType::Float => "f4",
            PixelType::Double => "f8",
        }
    }
}

impl TryFrom<i32> for PixelType {
    type Error = BridgeError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(PixelType::Int8),
            1 => Ok(PixelType::UInt8),
            2 => Ok(PixelType::Int16),
            3 => Ok(PixelType::UInt16),
            4 => Ok(PixelType::Int32),
            5 => Ok(PixelType::UInt32),
            6 => Ok(PixelType::Float),
            7 => Ok(PixelType::Double),
            8 => Ok(PixelType::Bit),
            other => Err(BridgeError::UnknownPixelType(other)),
        }
    }
}

// =============================================================================
// DType
// =============================================================================

/// Byte order of plane buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endianness {
    Little,
    Big,
}

/// Element type of an opened file: pixel type plus byte order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DType {
    pub pixel_type: PixelType,
    pub endianness: Endianness,
}

impl DType {
    pub const fn new(pixel_type: PixelType, endianness: Endianness) -> Self {
        Self {
            pixel_type,
            endianness,
        }
    }

    /// Build from the reader's pixel type code and `isLittleEndian()` flag.
    pub fn from_reader_codes(pixel_type: i32, little_endian: bool) -> Result<Self, BridgeError> {
        let endianness = if little_endian {
            Endianness::Little
        } else {
            Endianness::Big
        };
        Ok(Self::new(PixelType::try_from(pixel_type)?, endianness))
    }

    pub const fn bytes_per_pixel(&self) -> usize {
        self.pixel_type.bytes_per_pixel()
    }

    pub const fn is_little_endian(&self) -> bool {
        matches!(self.endianness, Endianness::Little)
    }

    /// Element-type tag in numpy notation, e.g. `<u2` or `>f4`.
    ///
    /// Single-byte types carry `|` since byte order does not apply to them.
    pub fn tag(&self) -> String {
        let order = if self.bytes_per_pixel() == 1 {
            '|'
        } else if self.is_little_endian() {
            '<'
        } else {
            '>'
        };
        format!("{}{}", order, self.pixel_type.kind())
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag())
    }
}

// =============================================================================
// DimensionOrder
// =============================================================================

/// Order in which Bio-Formats lays out planes in a file.
///
/// The first two letters are always `XY`; the remaining three give the
/// rasterization order of Z, C and T, fastest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DimensionOrder {
    #[default]
    XYZCT,
    XYZTC,
    XYCTZ,
    XYCZT,
    XYTCZ,
    XYTZC,
}

impl DimensionOrder {
    pub const ALL: [DimensionOrder; 6] = [
        DimensionOrder::XYZCT,
        DimensionOrder::XYZTC,
        DimensionOrder::XYCTZ,
        DimensionOrder::XYCZT,
        DimensionOrder::XYTCZ,
        DimensionOrder::XYTZC,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            DimensionOrder::XYZCT => "XYZCT",
            DimensionOrder::XYZTC => "XYZTC",
            DimensionOrder::XYCTZ => "XYCTZ",
            DimensionOrder::XYCZT => "XYCZT",
            DimensionOrder::XYTCZ => "XYTCZ",
            DimensionOrder::XYTZC => "XYTZC",
        }
    }

    /// Plane index of `(z, c, t)` for sizes `(size_z, size_c, size_t)`.
    ///
    /// Mirrors `FormatTools.getIndex`: row-major over the three non-spatial
    /// axes, with the axis named first after `XY` varying fastest.
    pub fn plane_index(
        &self,
        (size_z, size_c, size_t): (u32, u32, u32),
        (z, c, t): (u32, u32, u32),
    ) -> u32 {
        let ((a, size_a), (b, size_b), (c_, _)) = match self {
            DimensionOrder::XYZCT => ((z, size_z), (c, size_c), (t, size_t)),
            DimensionOrder::XYZTC => ((z, size_z), (t, size_t), (c, size_c)),
            DimensionOrder::XYCTZ => ((c, size_c), (t, size_t), (z, size_z)),
            DimensionOrder::XYCZT => ((c, size_c), (z, size_z), (t, size_t)),
            DimensionOrder::XYTCZ => ((t, size_t), (c, size_c), (z, size_z)),
            DimensionOrder::XYTZC => ((t, size_t), (z, size_z), (c, size_c)),
        };
        a + size_a * (b + size_b * c_)
    }
}

impl FromStr for DimensionOrder {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DimensionOrder::ALL
            .into_iter()
            .find(|order| order.as_str() == s)
            .ok_or_else(|| BridgeError::UnknownDimensionOrder(s.to_string()))
    }
}

impl fmt::Display for DimensionOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Tests
// =============================================================================
