//! Display metadata for the host viewer.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use super::color::{Colormap, Rgb};
use super::ome::LazyOme;
use crate::array::{Dimensions, CHANNEL_AXIS};
use crate::bridge::{FormatReader, PhysicalAxis};
use crate::error::BridgeError;

/// Decimal places kept in physical scale values.
const SCALE_DECIMALS: i32 = 5;

// =============================================================================
// DisplayMetadata
// =============================================================================

/// Layer name: one for the whole array or one per channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LayerName {
    Single(String),
    PerChannel(Vec<String>),
}

/// Display hints returned alongside the array.
#[derive(Debug, Clone, Serialize)]
pub struct DisplayMetadata {
    pub name: LayerName,
    /// Set when channels are split into separate layers.
    pub channel_axis: Option<usize>,
    /// Physical pixel size per displayed axis.
    pub scale: Option<Vec<f64>>,
    /// Per-channel colormaps; `None` slots mean the viewer default.
    pub colormap: Option<Vec<Option<Colormap>>>,
    #[serde(skip)]
    pub metadata: Arc<LazyOme>,
}

impl DisplayMetadata {
    /// Collect display metadata from a bound reader.
    ///
    /// Missing optional values degrade (no scale, default names, white
    /// channels) instead of failing; only a failure to read the OME-XML
    /// document is an error.
    pub fn extract(
        reader: &dyn FormatReader,
        path: &Path,
        dims: &Dimensions,
        split_channels: bool,
    ) -> Result<Self, BridgeError> {
        let xml = reader.ome_xml()?;
        let image_name = image_name(reader, path);
        let scale = physical_scale(reader, split_channels);

        let (name, channel_axis, colormap) = if split_channels {
            let names = channel_names(reader, dims.size_c, &image_name);
            let colormaps = channel_colormaps(reader, dims.size_c);
            let name = if names.is_empty() {
                LayerName::Single(image_name)
            } else {
                LayerName::PerChannel(names)
            };
            let colormap = (!colormaps.is_empty()).then_some(colormaps);
            (name, Some(CHANNEL_AXIS), colormap)
        } else {
            (LayerName::Single(image_name), None, None)
        };

        Ok(Self {
            name,
            channel_axis,
            scale,
            colormap,
            metadata: Arc::new(LazyOme::new(xml)),
        })
    }
}

// =============================================================================
// Extraction Helpers
// =============================================================================

/// Physical scale for the displayed axes, `None` if any of Z, Y, X is unknown.
///
/// Axes are `t, z, y, x` when channels are split and `t, c, z, y, x`
/// otherwise; T and C always have scale 1.
pub fn physical_scale(reader: &dyn FormatReader, split_channels: bool) -> Option<Vec<f64>> {
    let size = |axis: PhysicalAxis| match reader.physical_size(axis) {
        Ok(Some(value)) => Some(round_to(value, SCALE_DECIMALS)),
        Ok(None) => None,
        Err(e) => {
            warn!("Could not read physical size {:?}: {}", axis, e);
            None
        }
    };

    let (Some(z), Some(y), Some(x)) = (
        size(PhysicalAxis::Z),
        size(PhysicalAxis::Y),
        size(PhysicalAxis::X),
    ) else {
        warn!("Physical pixel sizes unavailable; no scale set");
        return None;
    };

    if split_channels {
        Some(vec![1.0, z, y, x])
    } else {
        Some(vec![1.0, 1.0, z, y, x])
    }
}

/// Name of the first image, or the file name when the file records none.
pub fn image_name(reader: &dyn FormatReader, path: &Path) -> String {
    match reader.image_name() {
        Ok(Some(name)) => name,
        Ok(None) => file_name(path),
        Err(e) => {
            warn!("Could not read image name: {}", e);
            file_name(path)
        }
    }
}

/// `"<channel>: <image>"` for each channel.
pub fn channel_names(reader: &dyn FormatReader, size_c: u32, image_name: &str) -> Vec<String> {
    (0..size_c)
        .map(|c| {
            let channel = reader
                .channel_name(c)
                .ok()
                .flatten()
                .unwrap_or_else(|| format!("Channel {}", c));
            format!("{}: {}", channel, image_name)
        })
        .collect()
}

pub fn channel_colormaps(reader: &dyn FormatReader, size_c: u32) -> Vec<Option<Colormap>> {
    (0..size_c)
        .map(|c| {
            let color = reader.channel_color(c).ok().flatten();
            let colormap = Colormap::for_color(Rgb::from_channel_color(color));
            if colormap.is_none() {
                warn!("Could not build a colormap for channel {}", c);
            }
            colormap
        })
        .collect()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

// =============================================================================
// Tests
// =============================================================================
