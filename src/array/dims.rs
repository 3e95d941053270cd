use std::fmt;

use crate::bridge::FormatReader;
use crate::error::BridgeError;
use crate::format::DType;

/// Axis names of every array this crate produces, outermost first.
pub const AXES: [char; 5] = ['t', 'c', 'z', 'y', 'x'];

/// Index of the channel axis in [`AXES`].
pub const CHANNEL_AXIS: usize = 1;

// =============================================================================
// Dimensions
// =============================================================================

/// Sizes and element type of an opened file.
///
/// Queried once per file; immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub size_t: u32,
    pub size_c: u32,
    pub size_z: u32,
    pub size_y: u32,
    pub size_x: u32,
    pub dtype: DType,
}

impl Dimensions {
    /// Query sizes and element type from a bound reader.
    ///
    /// For files that report themselves as RGB the channel count is the RGB
    /// channel count.
    pub fn query(reader: &dyn FormatReader) -> Result<Self, BridgeError> {
        let size_c = if reader.is_rgb()? {
            reader.rgb_channel_count()?
        } else {
            reader.size_c()?
        };
        let dtype = DType::from_reader_codes(reader.pixel_type()?, reader.is_little_endian()?)?;

        Ok(Self {
            size_t: reader.size_t()?,
            size_c,
            size_z: reader.size_z()?,
            size_y: reader.size_y()?,
            size_x: reader.size_x()?,
            dtype,
        })
    }

    /// `(T, C, Z, Y, X)` as array extents.
    pub fn shape(&self) -> [usize; 5] {
        [
            self.size_t as usize,
            self.size_c as usize,
            self.size_z as usize,
            self.size_y as usize,
            self.size_x as usize,
        ]
    }

    /// Number of (Y, X) planes.
    pub fn plane_count(&self) -> usize {
        self.size_t as usize * self.size_c as usize * self.size_z as usize
    }

    /// Bytes in one plane buffer.
    pub fn plane_bytes(&self) -> usize {
        self.size_y as usize * self.size_x as usize * self.dtype.bytes_per_pixel()
    }

    pub fn contains(&self, coord: PlaneCoord) -> bool {
        coord.t < self.size_t && coord.c < self.size_c && coord.z < self.size_z
    }

    /// All plane coordinates in row-major `(t, c, z)` order.
    pub fn coords(&self) -> impl Iterator<Item = PlaneCoord> + '_ {
        (0..self.size_t).flat_map(move |t| {
            (0..self.size_c)
                .flat_map(move |c| (0..self.size_z).map(move |z| PlaneCoord { t, c, z }))
        })
    }
}

// =============================================================================
// PlaneCoord
// =============================================================================

/// Position of one (Y, X) plane, in chunk-grid order `(t, c, z)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlaneCoord {
    pub t: u32,
    pub c: u32,
    pub z: u32,
}

impl PlaneCoord {
    pub const fn new(t: u32, c: u32, z: u32) -> Self {
        Self { t, c, z }
    }
}

impl fmt::Display for PlaneCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(t={}, c={}, z={})", self.t, self.c, self.z)
    }
}

// =============================================================================
// Tests
// =============================================================================
