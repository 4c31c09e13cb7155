//! Mapping between percentage coordinates and pixels.
//!
//! Percentages (fractions in `0..=1` of the reference canvas) are the
//! durable form of every layer's geometry. Pixels are derived for one
//! reference canvas size and recomputed whenever that size changes, never
//! the other way round.

use serde::{Deserialize, Serialize};

/// Pixel size of the canvas that percentages are measured against
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    /// Used before any background image has loaded: A4 landscape at 96 dpi
    pub const STANDARD: CanvasSize = CanvasSize {
        width: 1123,
        height: 794,
    };

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Position as fractions of the reference canvas
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct PercentPoint {
    pub x: f64,
    pub y: f64,
}

impl PercentPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Both coordinates forced into `0..=1`
    pub fn clamped(self) -> Self {
        Self {
            x: clamp_unit(self.x),
            y: clamp_unit(self.y),
        }
    }
}

/// Position in pixels. Signed, since a drag can end outside the canvas.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Width and height as fractions of the reference canvas
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct PercentSize {
    pub width: f64,
    pub height: f64,
}

impl PercentSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Width and height in pixels
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

impl PixelSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// How a layer's height is tied to its width
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum AspectLock {
    /// Width and height are edited independently
    Free,
    /// Height always equals width; both percentages are fractions of the
    /// canvas width
    Square,
    /// Height over width in pixels is fixed to this ratio
    Ratio(f64),
}

impl AspectLock {
    /// Lock for an image of the given intrinsic size. A degenerate size
    /// cannot define a ratio and leaves the layer free.
    pub fn from_dimensions(width: u32, height: u32) -> Self {
        if width == 0 || height == 0 {
            AspectLock::Free
        } else {
            AspectLock::Ratio(height as f64 / width as f64)
        }
    }
}

/// Clamp into `0..=1`, mapping NaN to zero
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// `x = round(px * W)`, `y = round(py * H)`
pub fn to_absolute(percent: PercentPoint, canvas: CanvasSize) -> PixelPoint {
    PixelPoint {
        x: (percent.x * canvas.width as f64).round() as i32,
        y: (percent.y * canvas.height as f64).round() as i32,
    }
}

/// Inverse of [`to_absolute`]. A zero-sized canvas maps everything to zero.
pub fn to_percent(point: PixelPoint, canvas: CanvasSize) -> PercentPoint {
    PercentPoint {
        x: ratio(point.x as f64, canvas.width),
        y: ratio(point.y as f64, canvas.height),
    }
}

/// Apply `lock` to a requested size: the width is kept and the height
/// derived from it, except for [`AspectLock::Free`]
pub fn lock_size(size: PercentSize, lock: AspectLock, canvas: CanvasSize) -> PercentSize {
    let width = clamp_unit(size.width);
    match lock {
        AspectLock::Free => PercentSize::new(width, clamp_unit(size.height)),
        AspectLock::Square => PercentSize::new(width, width),
        AspectLock::Ratio(r) => {
            let height_px = width * canvas.width as f64 * r;
            PercentSize::new(width, ratio(height_px, canvas.height))
        }
    }
}

/// Width percentage that yields `height` under `lock`; the inverse of the
/// height derivation in [`lock_size`]
pub fn width_for_height(height: f64, lock: AspectLock, canvas: CanvasSize) -> f64 {
    let height = clamp_unit(height);
    match lock {
        AspectLock::Free | AspectLock::Square => height,
        AspectLock::Ratio(r) if r > 0.0 => {
            let width_px = height * canvas.height as f64 / r;
            clamp_unit(ratio(width_px, canvas.width))
        }
        AspectLock::Ratio(_) => height,
    }
}

/// Pixel size of a percentage size
pub fn size_to_absolute(size: PercentSize, lock: AspectLock, canvas: CanvasSize) -> PixelSize {
    let width = (size.width * canvas.width as f64).round() as u32;
    match lock {
        AspectLock::Square => PixelSize::new(width, width),
        AspectLock::Free | AspectLock::Ratio(_) => {
            PixelSize::new(width, (size.height * canvas.height as f64).round() as u32)
        }
    }
}

/// Percentage size of a pixel size
pub fn size_to_percent(size: PixelSize, lock: AspectLock, canvas: CanvasSize) -> PercentSize {
    let width = ratio(size.width as f64, canvas.width);
    match lock {
        AspectLock::Square => PercentSize::new(width, width),
        AspectLock::Free | AspectLock::Ratio(_) => {
            PercentSize::new(width, ratio(size.height as f64, canvas.height))
        }
    }
}

fn ratio(pixels: f64, extent: u32) -> f64 {
    if extent == 0 {
        0.0
    } else {
        pixels / extent as f64
    }
}
