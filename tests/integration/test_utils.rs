//! Test utilities for integration tests.
//!
//! This module provides an in-memory `FormatReader` with call instrumentation
//! and an in-memory `Fetcher`, so the reader and installer can be exercised
//! without a JVM or network access.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tokio::sync::RwLock;
use url::Url;

use bioformats_bridge::bridge::{FormatReader, PhysicalAxis};
use bioformats_bridge::error::{BridgeError, InstallError};
use bioformats_bridge::install::Fetcher;
use bioformats_bridge::DimensionOrder;

/// Plane index offset baked into every synthetic pixel value.
pub const PLANE_STRIDE: u64 = 10_000;

// =============================================================================
// Reader Instrumentation
// =============================================================================

/// Counters shared between a synthetic reader and the test.
#[derive(Default)]
pub struct ReaderStats {
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    open_bytes_calls: AtomicUsize,
    interleavings: AtomicUsize,
    closed: AtomicBool,
    last_index: Mutex<Option<u32>>,
    opened: Mutex<Vec<u32>>,
}

impl ReaderStats {
    /// Highest number of threads seen inside the reader at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn open_bytes_calls(&self) -> usize {
        self.open_bytes_calls.load(Ordering::SeqCst)
    }

    /// `openBytes` calls whose index was not the one computed just before.
    pub fn interleavings(&self) -> usize {
        self.interleavings.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Plane indices passed to `openBytes`, in call order.
    pub fn opened(&self) -> Vec<u32> {
        self.opened.lock().unwrap().clone()
    }

    fn enter(&self) -> InFlight<'_> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        InFlight(self)
    }
}

struct InFlight<'a>(&'a ReaderStats);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

// =============================================================================
// Synthetic Reader
// =============================================================================

/// In-memory `FormatReader` producing deterministic planes.
///
/// The pixel at `(y, x)` of plane `index` has value
/// `index * PLANE_STRIDE + y * size_x + x`, cast (wrapping) to the element type.
pub struct SyntheticReader {
    size_t: u32,
    size_c: u32,
    size_z: u32,
    size_y: u32,
    size_x: u32,
    rgb_channels: Option<u32>,
    pixel_type: i32,
    little_endian: bool,
    order: DimensionOrder,
    physical: [Option<f64>; 3],
    image_name: Option<String>,
    channel_names: Vec<Option<String>>,
    channel_colors: Vec<Option<i32>>,
    ome_xml: String,
    plane_len: Option<usize>,
    delay: Duration,
    stats: Arc<ReaderStats>,
}

impl SyntheticReader {
    /// Little-endian `uint16`, `XYZCT`, no optional metadata.
    pub fn new(size_t: u32, size_c: u32, size_z: u32, size_y: u32, size_x: u32) -> Self {
        Self {
            size_t,
            size_c,
            size_z,
            size_y,
            size_x,
            rgb_channels: None,
            pixel_type: 3,
            little_endian: true,
            order: DimensionOrder::XYZCT,
            physical: [None; 3],
            image_name: None,
            channel_names: Vec::new(),
            channel_colors: Vec::new(),
            ome_xml: String::new(),
            plane_len: None,
            delay: Duration::ZERO,
            stats: Arc::new(ReaderStats::default()),
        }
    }

    pub fn with_pixel_type(mut self, code: i32, little_endian: bool) -> Self {
        self.pixel_type = code;
        self.little_endian = little_endian;
        self
    }

    pub fn with_order(mut self, order: DimensionOrder) -> Self {
        self.order = order;
        self
    }

    pub fn with_physical_sizes(mut self, x: f64, y: f64, z: f64) -> Self {
        self.physical = [Some(x), Some(y), Some(z)];
        self
    }

    pub fn with_physical_size(mut self, axis: PhysicalAxis, value: f64) -> Self {
        self.physical[axis_slot(axis)] = Some(value);
        self
    }

    pub fn with_image_name(mut self, name: impl Into<String>) -> Self {
        self.image_name = Some(name.into());
        self
    }

    pub fn with_channels(mut self, names: Vec<Option<&str>>, colors: Vec<Option<i32>>) -> Self {
        self.channel_names = names.into_iter().map(|n| n.map(str::to_string)).collect();
        self.channel_colors = colors;
        self
    }

    pub fn with_rgb(mut self, channels: u32) -> Self {
        self.rgb_channels = Some(channels);
        self
    }

    pub fn with_ome_xml(mut self, xml: impl Into<String>) -> Self {
        self.ome_xml = xml.into();
        self
    }

    /// Return planes of `len` bytes regardless of the dimensions.
    pub fn with_plane_len(mut self, len: usize) -> Self {
        self.plane_len = Some(len);
        self
    }

    /// Sleep inside every call, widening any race window.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Share counters with another reader.
    pub fn with_stats(mut self, stats: Arc<ReaderStats>) -> Self {
        self.stats = stats;
        self
    }

    pub fn stats(&self) -> Arc<ReaderStats> {
        Arc::clone(&self.stats)
    }

    fn effective_c(&self) -> u32 {
        self.rgb_channels.unwrap_or(self.size_c)
    }

    fn bytes_per_pixel(&self) -> usize {
        match self.pixel_type {
            0 | 1 | 8 => 1,
            2 | 3 => 2,
            4..=6 => 4,
            _ => 8,
        }
    }

    fn pause(&self) {
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
    }

    fn encode(&self, value: u64, out: &mut Vec<u8>) {
        macro_rules! put {
            ($t:ty) => {{
                let v = value as $t;
                if self.little_endian {
                    out.extend_from_slice(&v.to_le_bytes());
                } else {
                    out.extend_from_slice(&v.to_be_bytes());
                }
            }};
        }
        match self.pixel_type {
            0 => put!(i8),
            1 | 8 => put!(u8),
            2 => put!(i16),
            3 => put!(u16),
            4 => put!(i32),
            5 => put!(u32),
            6 => put!(f32),
            _ => put!(f64),
        }
    }
}

fn axis_slot(axis: PhysicalAxis) -> usize {
    match axis {
        PhysicalAxis::X => 0,
        PhysicalAxis::Y => 1,
        PhysicalAxis::Z => 2,
    }
}

/// Expected synthetic value at `(y, x)` of plane `index`.
pub fn synthetic_value(index: u32, y: u32, x: u32, size_x: u32) -> u64 {
    index as u64 * PLANE_STRIDE + (y * size_x + x) as u64
}

impl FormatReader for SyntheticReader {
    fn size_x(&self) -> Result<u32, BridgeError> {
        let _probe = self.stats.enter();
        Ok(self.size_x)
    }

    fn size_y(&self) -> Result<u32, BridgeError> {
        let _probe = self.stats.enter();
        Ok(self.size_y)
    }

    fn size_z(&self) -> Result<u32, BridgeError> {
        let _probe = self.stats.enter();
        Ok(self.size_z)
    }

    fn size_c(&self) -> Result<u32, BridgeError> {
        let _probe = self.stats.enter();
        Ok(self.size_c)
    }

    fn size_t(&self) -> Result<u32, BridgeError> {
        let _probe = self.stats.enter();
        Ok(self.size_t)
    }

    fn is_rgb(&self) -> Result<bool, BridgeError> {
        Ok(self.rgb_channels.is_some())
    }

    fn rgb_channel_count(&self) -> Result<u32, BridgeError> {
        Ok(self.rgb_channels.unwrap_or(1))
    }

    fn is_little_endian(&self) -> Result<bool, BridgeError> {
        Ok(self.little_endian)
    }

    fn pixel_type(&self) -> Result<i32, BridgeError> {
        Ok(self.pixel_type)
    }

    fn plane_index(&self, z: u32, c: u32, t: u32) -> Result<u32, BridgeError> {
        let _probe = self.stats.enter();
        self.pause();
        if z >= self.size_z || c >= self.effective_c() || t >= self.size_t {
            return Err(BridgeError::Java(format!(
                "java.lang.IllegalArgumentException: Invalid ZCT ({}, {}, {})",
                z, c, t
            )));
        }
        let index = self
            .order
            .plane_index((self.size_z, self.effective_c(), self.size_t), (z, c, t));
        *self.stats.last_index.lock().unwrap() = Some(index);
        Ok(index)
    }

    fn open_bytes(&self, index: u32) -> Result<Bytes, BridgeError> {
        let _probe = self.stats.enter();
        self.stats.open_bytes_calls.fetch_add(1, Ordering::SeqCst);
        if *self.stats.last_index.lock().unwrap() != Some(index) {
            self.stats.interleavings.fetch_add(1, Ordering::SeqCst);
        }
        self.stats.opened.lock().unwrap().push(index);
        self.pause();

        let mut out = Vec::with_capacity(
            (self.size_y * self.size_x) as usize * self.bytes_per_pixel(),
        );
        for y in 0..self.size_y {
            for x in 0..self.size_x {
                self.encode(synthetic_value(index, y, x, self.size_x), &mut out);
            }
        }
        if let Some(len) = self.plane_len {
            out.resize(len, 0);
        }
        Ok(Bytes::from(out))
    }

    fn physical_size(&self, axis: PhysicalAxis) -> Result<Option<f64>, BridgeError> {
        Ok(self.physical[axis_slot(axis)])
    }

    fn image_name(&self) -> Result<Option<String>, BridgeError> {
        Ok(self.image_name.clone())
    }

    fn channel_name(&self, channel: u32) -> Result<Option<String>, BridgeError> {
        Ok(self.channel_names.get(channel as usize).cloned().flatten())
    }

    fn channel_color(&self, channel: u32) -> Result<Option<i32>, BridgeError> {
        Ok(self.channel_colors.get(channel as usize).copied().flatten())
    }

    fn ome_xml(&self) -> Result<String, BridgeError> {
        Ok(self.ome_xml.clone())
    }

    fn close(&self) -> Result<(), BridgeError> {
        self.stats.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// A minimal OME-XML document for a single image.
pub fn sample_ome_xml(name: &str, channels: &[&str]) -> String {
    let channel_elements: String = channels
        .iter()
        .enumerate()
        .map(|(i, channel)| {
            format!(
                r#"<Channel ID="Channel:0:{}" Name="{}" SamplesPerPixel="1"/>"#,
                i, channel
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<OME xmlns="http://www.openmicroscopy.org/Schemas/OME/2016-06">
  <Image ID="Image:0" Name="{}">
    <Pixels DimensionOrder="XYZCT" ID="Pixels:0" SizeC="{}" SizeT="1" SizeX="8" SizeY="4" SizeZ="2" Type="uint16">
      {}
    </Pixels>
  </Image>
</OME>"#,
        name,
        channels.len(),
        channel_elements
    )
}

// =============================================================================
// Mock Fetcher
// =============================================================================

/// In-memory fetcher serving fixed bodies by URL and recording requests.
#[derive(Default)]
pub struct MockFetcher {
    responses: HashMap<String, Bytes>,
    requests: Arc<RwLock<Vec<String>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: impl Into<String>, body: impl Into<Bytes>) -> Self {
        self.responses.insert(url.into(), body.into());
        self
    }

    pub async fn requests(&self) -> Vec<String> {
        self.requests.read().await.clone()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &Url) -> Result<Bytes, InstallError> {
        self.requests.write().await.push(url.to_string());
        self.responses
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| InstallError::Fetch {
                url: url.to_string(),
                message: "HTTP 404 Not Found".to_string(),
            })
    }
}

/// Build a stored (uncompressed) zip archive in memory.
pub fn make_zip(entries: &[(&str, &[u8])]) -> Bytes {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Stored);
    for (name, data) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(data).unwrap();
    }
    Bytes::from(writer.finish().unwrap().into_inner())
}
