//! Lazy, plane-chunked view over an opened file.
//!
//! Nothing is read at construction. Each chunk is one (Y, X) plane, pulled
//! from the reader on request. Every plane read takes the process-wide foreign
//! lock for the `getIndex` + `openBytes` pair, so concurrent chunk requests
//! from any number of threads never interleave inside the library.

use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use rayon::prelude::*;
use tracing::debug;

use super::data::ArrayData;
use super::dims::{Dimensions, PlaneCoord};
use crate::bridge::ReaderHandle;
use crate::error::BridgeError;
use crate::format::DType;

/// A `(T, C, Z, Y, X)` array backed by a bound reader.
///
/// Cloning shares the reader; the reader is closed when the last clone is
/// dropped.
#[derive(Debug, Clone)]
pub struct LazyArray {
    handle: Arc<ReaderHandle>,
    dims: Dimensions,
}

impl LazyArray {
    /// Query dimensions from the handle and build the array.
    pub fn new(handle: Arc<ReaderHandle>) -> Result<Self, BridgeError> {
        let dims = Dimensions::query(&*handle.lock())?;
        Ok(Self::with_dimensions(handle, dims))
    }

    /// Build the array from dimensions queried earlier.
    pub fn with_dimensions(handle: Arc<ReaderHandle>, dims: Dimensions) -> Self {
        Self { handle, dims }
    }

    pub fn dims(&self) -> &Dimensions {
        &self.dims
    }

    pub fn shape(&self) -> [usize; 5] {
        self.dims.shape()
    }

    pub fn ndim(&self) -> usize {
        5
    }

    pub fn dtype(&self) -> DType {
        self.dims.dtype
    }

    /// The file backing this array.
    pub fn path(&self) -> &Path {
        self.handle.path()
    }

    pub fn handle(&self) -> &Arc<ReaderHandle> {
        &self.handle
    }

    /// Shape of every chunk: `(1, 1, 1, Y, X)`.
    pub fn chunk_shape(&self) -> [usize; 5] {
        [1, 1, 1, self.dims.size_y as usize, self.dims.size_x as usize]
    }

    /// Chunk sizes along each axis, dask style.
    ///
    /// Ones along T, C and Z; a single chunk spanning each of Y and X.
    pub fn chunks(&self) -> [Vec<usize>; 5] {
        let [t, c, z, y, x] = self.shape();
        [vec![1; t], vec![1; c], vec![1; z], vec![y], vec![x]]
    }

    pub fn num_chunks(&self) -> usize {
        self.dims.plane_count()
    }

    /// Raw bytes of one plane, copied out of the library.
    pub fn read_plane(&self, coord: PlaneCoord) -> Result<Bytes, BridgeError> {
        if !self.dims.contains(coord) {
            return Err(BridgeError::ChunkOutOfBounds {
                t: coord.t,
                c: coord.c,
                z: coord.z,
                size_t: self.dims.size_t,
                size_c: self.dims.size_c,
                size_z: self.dims.size_z,
            });
        }

        let (index, bytes) = {
            let reader = self.handle.lock();
            let index = reader.plane_index(coord.z, coord.c, coord.t)?;
            (index, reader.open_bytes(index)?)
        };
        debug!("Read plane {} as index {} ({} bytes)", coord, index, bytes.len());

        let expected = self.dims.plane_bytes();
        if bytes.len() != expected {
            return Err(BridgeError::PlaneSize {
                index,
                expected,
                actual: bytes.len(),
            });
        }
        Ok(bytes)
    }

    /// One plane decoded as a `(1, 1, 1, Y, X)` array.
    pub fn chunk(&self, coord: PlaneCoord) -> Result<ArrayData, BridgeError> {
        let bytes = self.read_plane(coord)?;
        ArrayData::from_bytes(self.dims.dtype, self.chunk_shape(), &bytes)
    }

    /// Materialize the whole volume, one plane at a time.
    pub fn compute(&self) -> Result<ArrayData, BridgeError> {
        let planes = self
            .dims
            .coords()
            .map(|coord| self.read_plane(coord))
            .collect::<Result<Vec<_>, _>>()?;
        self.assemble(planes)
    }

    /// Materialize the whole volume with the rayon thread pool.
    ///
    /// Plane reads still queue on the foreign lock; decoding and assembly run
    /// in parallel with them.
    pub fn compute_parallel(&self) -> Result<ArrayData, BridgeError> {
        let coords: Vec<PlaneCoord> = self.dims.coords().collect();
        let planes = coords
            .into_par_iter()
            .map(|coord| self.read_plane(coord))
            .collect::<Result<Vec<_>, _>>()?;
        self.assemble(planes)
    }

    /// Concatenate planes in `(t, c, z)` order and decode once.
    fn assemble(&self, planes: Vec<Bytes>) -> Result<ArrayData, BridgeError> {
        let mut buffer = Vec::with_capacity(self.dims.plane_count() * self.dims.plane_bytes());
        for plane in &planes {
            buffer.extend_from_slice(plane);
        }
        ArrayData::from_bytes(self.dims.dtype, self.shape(), &buffer)
    }
}
