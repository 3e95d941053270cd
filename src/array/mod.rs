//! Chunked array bridge.
//!
//! Exposes an opened file as a lazy 5D `(T, C, Z, Y, X)` array whose chunks are
//! single planes read on demand.

mod data;
mod dims;
mod lazy;

pub use data::ArrayData;
pub use dims::{Dimensions, PlaneCoord, AXES, CHANNEL_AXIS};
pub use lazy::LazyArray;
