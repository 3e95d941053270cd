//! Decoded pixel data.
//!
//! Plane buffers arrive as raw bytes in the file's byte order. [`ArrayData`]
//! holds them as a typed 5D array, one variant per Bio-Formats pixel type.

use ndarray::Array5;

use crate::error::BridgeError;
use crate::format::{DType, Endianness, PixelType};

/// A typed `(T, C, Z, Y, X)` array.
///
/// `Bit` images are delivered one byte per pixel and decode to `UInt8`.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayData {
    Int8(Array5<i8>),
    UInt8(Array5<u8>),
    Int16(Array5<i16>),
    UInt16(Array5<u16>),
    Int32(Array5<i32>),
    UInt32(Array5<u32>),
    Float(Array5<f32>),
    Double(Array5<f64>),
}

/// Element types that can be read from a fixed-width byte slice.
trait Element: Sized + Copy {
    const WIDTH: usize;

    fn from_le(bytes: &[u8]) -> Self;
    fn from_be(bytes: &[u8]) -> Self;
}

macro_rules! impl_element {
    ($($t:ty),*) => {
        $(
            impl Element for $t {
                const WIDTH: usize = std::mem::size_of::<$t>();

                fn from_le(bytes: &[u8]) -> Self {
                    let mut raw = [0u8; std::mem::size_of::<$t>()];
                    raw.copy_from_slice(bytes);
                    <$t>::from_le_bytes(raw)
                }

                fn from_be(bytes: &[u8]) -> Self {
                    let mut raw = [0u8; std::mem::size_of::<$t>()];
                    raw.copy_from_slice(bytes);
                    <$t>::from_be_bytes(raw)
                }
            }
        )*
    };
}

impl_element!(i8, u8, i16, u16, i32, u32, f32, f64);

fn decode<T: Element>(
    shape: [usize; 5],
    bytes: &[u8],
    endianness: Endianness,
) -> Result<Array5<T>, BridgeError> {
    let values: Vec<T> = match endianness {
        Endianness::Little => bytes.chunks_exact(T::WIDTH).map(T::from_le).collect(),
        Endianness::Big => bytes.chunks_exact(T::WIDTH).map(T::from_be).collect(),
    };
    Array5::from_shape_vec(shape, values).map_err(|e| BridgeError::Decode(e.to_string()))
}

macro_rules! dispatch {
    ($self:expr, $arr:ident => $body:expr) => {
        match $self {
            ArrayData::Int8($arr) => $body,
            ArrayData::UInt8($arr) => $body,
            ArrayData::Int16($arr) => $body,
            ArrayData::UInt16($arr) => $body,
            ArrayData::Int32($arr) => $body,
            ArrayData::UInt32($arr) => $body,
            ArrayData::Float($arr) => $body,
            ArrayData::Double($arr) => $body,
        }
    };
}

impl ArrayData {
    /// Decode raw bytes of element type `dtype` into an array of `shape`.
    pub fn from_bytes(dtype: DType, shape: [usize; 5], bytes: &[u8]) -> Result<Self, BridgeError> {
        let expected = shape.iter().product::<usize>() * dtype.bytes_per_pixel();
        if bytes.len() != expected {
            return Err(BridgeError::Decode(format!(
                "{} bytes for shape {:?} of {}, expected {}",
                bytes.len(),
                shape,
                dtype,
                expected
            )));
        }

        let order = dtype.endianness;
        Ok(match dtype.pixel_type {
            PixelType::Int8 => ArrayData::Int8(decode(shape, bytes, order)?),
            PixelType::UInt8 | PixelType::Bit => ArrayData::UInt8(decode(shape, bytes, order)?),
            PixelType::Int16 => ArrayData::Int16(decode(shape, bytes, order)?),
            PixelType::UInt16 => ArrayData::UInt16(decode(shape, bytes, order)?),
            PixelType::Int32 => ArrayData::Int32(decode(shape, bytes, order)?),
            PixelType::UInt32 => ArrayData::UInt32(decode(shape, bytes, order)?),
            PixelType::Float => ArrayData::Float(decode(shape, bytes, order)?),
            PixelType::Double => ArrayData::Double(decode(shape, bytes, order)?),
        })
    }

    pub fn shape(&self) -> &[usize] {
        dispatch!(self, a => a.shape())
    }

    pub fn len(&self) -> usize {
        dispatch!(self, a => a.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element at `index`, widened to `f64`.
    pub fn get_f64(&self, index: [usize; 5]) -> Option<f64> {
        dispatch!(self, a => a.get(index).map(|&v| v as f64))
    }

    /// Smallest and largest element, widened to `f64`. `None` when empty.
    pub fn min_max(&self) -> Option<(f64, f64)> {
        dispatch!(self, a => a.iter().map(|&v| v as f64).fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        }))
    }

    pub fn as_u8(&self) -> Option<&Array5<u8>> {
        match self {
            ArrayData::UInt8(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_u16(&self) -> Option<&Array5<u16>> {
        match self {
            ArrayData::UInt16(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<&Array5<f32>> {
        match self {
            ArrayData::Float(a) => Some(a),
            _ => None,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
