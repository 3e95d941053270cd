//! Channel colors and the colormaps derived from them.

use std::fmt;

use serde::Serialize;

use crate::error::ColormapError;

// =============================================================================
// Rgb
// =============================================================================

/// An RGB color with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(1.0, 1.0, 1.0);
    pub const BLACK: Rgb = Rgb::new(0.0, 0.0, 0.0);

    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Unpack an OME `Color` value (`0xRRGGBBAA`, signed). Alpha is dropped.
    pub fn from_packed_rgba(value: i32) -> Self {
        let component = |shift: u32| f64::from((value >> shift) & 255) / 255.0;
        Self::new(component(24), component(16), component(8))
    }

    /// Channel color, falling back to white when the file records none.
    pub fn from_channel_color(value: Option<i32>) -> Self {
        value.map(Self::from_packed_rgba).unwrap_or(Self::WHITE)
    }

    pub fn components(&self) -> [f64; 3] {
        [self.r, self.g, self.b]
    }
}

/// Named colormaps for exact primary colors.
const PRIMARY_COLORS: [(Rgb, &str); 8] = [
    (Rgb::new(1.0, 0.0, 0.0), "red"),
    (Rgb::new(0.0, 1.0, 0.0), "green"),
    (Rgb::new(0.0, 0.0, 1.0), "blue"),
    (Rgb::new(0.0, 1.0, 1.0), "cyan"),
    (Rgb::new(1.0, 1.0, 0.0), "yellow"),
    (Rgb::new(1.0, 0.0, 1.0), "magenta"),
    (Rgb::new(0.0, 0.0, 0.0), "black"),
    (Rgb::new(1.0, 1.0, 1.0), "gray"),
];

/// Name of the primary colormap matching `rgb` exactly.
pub fn primary_colormap(rgb: Rgb) -> Option<&'static str> {
    PRIMARY_COLORS
        .iter()
        .find(|(color, _)| *color == rgb)
        .map(|(_, name)| *name)
}

// =============================================================================
// Colormap
// =============================================================================

/// Linear interpolation between evenly spaced control colors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinearRamp {
    controls: Vec<Rgb>,
}

impl LinearRamp {
    pub fn new(controls: Vec<Rgb>) -> Result<Self, ColormapError> {
        if controls.len() < 2 {
            return Err(ColormapError::TooFewControls(controls.len()));
        }
        for value in controls.iter().flat_map(Rgb::components) {
            if !(0.0..=1.0).contains(&value) {
                return Err(ColormapError::ComponentOutOfRange(value));
            }
        }
        Ok(Self { controls })
    }

    pub fn controls(&self) -> &[Rgb] {
        &self.controls
    }

    /// Color at position `t` in `[0, 1]`; values outside are clamped.
    pub fn sample(&self, t: f64) -> Rgb {
        let segments = (self.controls.len() - 1) as f64;
        let position = t.clamp(0.0, 1.0) * segments;
        let lower = (position.floor() as usize).min(self.controls.len() - 2);
        let frac = position - lower as f64;
        let (a, b) = (self.controls[lower], self.controls[lower + 1]);
        Rgb::new(
            a.r + (b.r - a.r) * frac,
            a.g + (b.g - a.g) * frac,
            a.b + (b.b - a.b) * frac,
        )
    }
}

/// Display colormap for one channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Colormap {
    /// One of the viewer's built-in colormaps
    Named(&'static str),
    Ramp(LinearRamp),
}

impl Colormap {
    /// Colormap for a channel color: a named primary or a black-to-color ramp.
    ///
    /// `None` when the ramp cannot be built.
    pub fn for_color(rgb: Rgb) -> Option<Self> {
        if let Some(name) = primary_colormap(rgb) {
            return Some(Colormap::Named(name));
        }
        LinearRamp::new(vec![Rgb::BLACK, rgb])
            .map(Colormap::Ramp)
            .ok()
    }
}

impl fmt::Display for Colormap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Colormap::Named(name) => f.write_str(name),
            Colormap::Ramp(ramp) => {
                let stops: Vec<String> = ramp
                    .controls()
                    .iter()
                    .map(|c| format!("({:.3}, {:.3}, {:.3})", c.r, c.g, c.b))
                    .collect();
                write!(f, "ramp[{}]", stops.join(" -> "))
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
