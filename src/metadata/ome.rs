//! The OME-XML document embedded in every opened file.
//!
//! Only the parts of the schema this crate reads are modeled; everything else
//! in the document is skipped during deserialization. The raw XML stays
//! available through [`LazyOme::xml`] for callers that need the rest.

use std::fmt;
use std::sync::OnceLock;

use quick_xml::de::from_str;
use serde::Deserialize;
use tracing::debug;

use crate::error::{BridgeError, OmeError};
use crate::format::DimensionOrder;

// =============================================================================
// OME-XML Structures
// =============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename = "OME")]
pub struct OmeDocument {
    #[serde(rename = "@Creator", default)]
    pub creator: Option<String>,
    #[serde(rename = "Image", default)]
    pub images: Vec<OmeImage>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OmeImage {
    #[serde(rename = "@ID")]
    pub id: String,
    #[serde(rename = "@Name", default)]
    pub name: Option<String>,
    #[serde(rename = "AcquisitionDate", default)]
    pub acquisition_date: Option<String>,
    #[serde(rename = "Pixels")]
    pub pixels: OmePixels,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OmePixels {
    #[serde(rename = "@DimensionOrder")]
    pub dimension_order: String,
    #[serde(rename = "@Type")]
    pub pixel_type: String,
    #[serde(rename = "@SizeX")]
    pub size_x: u32,
    #[serde(rename = "@SizeY")]
    pub size_y: u32,
    #[serde(rename = "@SizeZ")]
    pub size_z: u32,
    #[serde(rename = "@SizeC")]
    pub size_c: u32,
    #[serde(rename = "@SizeT")]
    pub size_t: u32,
    #[serde(rename = "@PhysicalSizeX", default)]
    pub physical_size_x: Option<f64>,
    #[serde(rename = "@PhysicalSizeY", default)]
    pub physical_size_y: Option<f64>,
    #[serde(rename = "@PhysicalSizeZ", default)]
    pub physical_size_z: Option<f64>,
    #[serde(rename = "Channel", default)]
    pub channels: Vec<OmeChannel>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OmeChannel {
    #[serde(rename = "@ID")]
    pub id: String,
    #[serde(rename = "@Name", default)]
    pub name: Option<String>,
    #[serde(rename = "@Color", default)]
    pub color: Option<i32>,
    #[serde(rename = "@SamplesPerPixel", default)]
    pub samples_per_pixel: Option<u32>,
}

impl OmeDocument {
    pub fn parse(xml: &str) -> Result<Self, OmeError> {
        from_str(xml).map_err(|e| OmeError::Parse(e.to_string()))
    }

    /// The first image, which is the one this crate reads.
    pub fn first_image(&self) -> Option<&OmeImage> {
        self.images.first()
    }
}

impl OmePixels {
    pub fn dimension_order(&self) -> Result<DimensionOrder, BridgeError> {
        self.dimension_order.parse()
    }
}

// =============================================================================
// LazyOme
// =============================================================================

/// OME-XML captured at read time, parsed on first access.
///
/// The parse result, success or failure, is cached for the lifetime of the
/// value.
pub struct LazyOme {
    xml: String,
    document: OnceLock<Result<OmeDocument, OmeError>>,
}

impl LazyOme {
    pub fn new(xml: impl Into<String>) -> Self {
        Self {
            xml: xml.into(),
            document: OnceLock::new(),
        }
    }

    /// The raw document.
    pub fn xml(&self) -> &str {
        &self.xml
    }

    /// The parsed document.
    pub fn get(&self) -> Result<&OmeDocument, OmeError> {
        self.document
            .get_or_init(|| {
                debug!("Parsing OME-XML ({} bytes)", self.xml.len());
                OmeDocument::parse(&self.xml)
            })
            .as_ref()
            .map_err(Clone::clone)
    }

    pub fn is_parsed(&self) -> bool {
        self.document.get().is_some()
    }
}

impl fmt::Debug for LazyOme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyOme")
            .field("xml_len", &self.xml.len())
            .field("parsed", &self.is_parsed())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
