//! Metadata extraction.
//!
//! - [`extract`]: scale, names and colormaps for the viewer
//! - [`color`]: channel color decoding and colormaps
//! - [`ome`]: the lazily parsed OME-XML document

pub mod color;
pub mod extract;
pub mod ome;

pub use color::{primary_colormap, Colormap, LinearRamp, Rgb};
pub use extract::{DisplayMetadata, LayerName};
pub use ome::{LazyOme, OmeChannel, OmeDocument, OmeImage, OmePixels};
