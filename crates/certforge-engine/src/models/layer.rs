use serde::{Deserialize, Serialize};
use std::fmt;

use crate::layout::coordinates::{
    AspectLock, CanvasSize, PercentPoint, PercentSize, PixelPoint, PixelSize, lock_size,
    size_to_absolute, to_absolute,
};
use crate::models::rich_text::RichText;
use crate::models::style::{FontStyle, FontWeight, ResolvedStyle, TextDecoration};

/// Unique identifier of a layer within its registry
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(String);

impl LayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LayerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Discriminant of [`Layer`]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Text,
    Photo,
    QrCode,
}

impl LayerKind {
    /// Prefix used when generating ids
    pub fn prefix(self) -> &'static str {
        match self {
            LayerKind::Text => "text",
            LayerKind::Photo => "photo",
            LayerKind::QrCode => "qr",
        }
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LayerKind::Text => "text",
            LayerKind::Photo => "photo",
            LayerKind::QrCode => "qrcode",
        })
    }
}

/// Where a layer sits on the canvas.
///
/// The percentages are authoritative. `x`/`y` cache their pixel values for
/// the registry's current reference size; they are written out for
/// debugging but never read back.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub(crate) x_percent: f64,
    pub(crate) y_percent: f64,
    #[serde(default, skip_deserializing)]
    pub(crate) x: i32,
    #[serde(default, skip_deserializing)]
    pub(crate) y: i32,
}

impl Position {
    pub fn new(percent: PercentPoint, canvas: CanvasSize) -> Self {
        let mut position = Self {
            x_percent: 0.0,
            y_percent: 0.0,
            x: 0,
            y: 0,
        };
        position.set_percent(percent, canvas);
        position
    }

    pub fn percent(&self) -> PercentPoint {
        PercentPoint::new(self.x_percent, self.y_percent)
    }

    pub fn absolute(&self) -> PixelPoint {
        PixelPoint::new(self.x, self.y)
    }

    pub(crate) fn set_percent(&mut self, percent: PercentPoint, canvas: CanvasSize) {
        let percent = percent.clamped();
        self.x_percent = percent.x;
        self.y_percent = percent.y;
        self.refresh(canvas);
    }

    /// Clamp the stored percentages into the canvas and re-derive pixels
    pub(crate) fn refresh(&mut self, canvas: CanvasSize) {
        let percent = self.percent().clamped();
        self.x_percent = percent.x;
        self.y_percent = percent.y;
        let absolute = to_absolute(percent, canvas);
        self.x = absolute.x;
        self.y = absolute.y;
    }
}

/// Size of a photo or QR layer; the same percent/pixel split as [`Position`]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Extent {
    pub(crate) width_percent: f64,
    pub(crate) height_percent: f64,
    #[serde(default, skip_deserializing)]
    pub(crate) width: u32,
    #[serde(default, skip_deserializing)]
    pub(crate) height: u32,
}

impl Extent {
    pub fn new(size: PercentSize, lock: AspectLock, canvas: CanvasSize) -> Self {
        let mut extent = Self {
            width_percent: 0.0,
            height_percent: 0.0,
            width: 0,
            height: 0,
        };
        extent.set_percent(size, lock, canvas);
        extent
    }

    pub fn percent(&self) -> PercentSize {
        PercentSize::new(self.width_percent, self.height_percent)
    }

    pub fn absolute(&self) -> PixelSize {
        PixelSize::new(self.width, self.height)
    }

    pub(crate) fn set_percent(&mut self, size: PercentSize, lock: AspectLock, canvas: CanvasSize) {
        let size = lock_size(size, lock, canvas);
        self.width_percent = size.width;
        self.height_percent = size.height;
        self.refresh(lock, canvas);
    }

    /// Re-derive pixels for `canvas`. Percentages are clamped to the canvas
    /// and a locked height percentage is re-derived from the width, since the
    /// same width covers a different share of a canvas with another aspect
    /// ratio.
    pub(crate) fn refresh(&mut self, lock: AspectLock, canvas: CanvasSize) {
        let size = lock_size(self.percent(), lock, canvas);
        self.width_percent = size.width;
        self.height_percent = size.height;
        let absolute = size_to_absolute(self.percent(), lock, canvas);
        self.width = absolute.width;
        self.height = absolute.height;
    }
}

/// A text layer; owns its span model
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextLayer {
    pub id: LayerId,
    pub rich_text: RichText,
    #[serde(flatten)]
    pub(crate) position: Position,
    pub font_size: f32,
    pub font_family: String,
    pub font_weight: FontWeight,
    pub color: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_editing: bool,
}

impl TextLayer {
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Style every span inherits from
    pub fn default_style(&self) -> ResolvedStyle {
        ResolvedStyle {
            font_weight: self.font_weight,
            font_family: self.font_family.clone(),
            font_size: self.font_size,
            color: self.color.clone(),
            font_style: FontStyle::Normal,
            text_decoration: TextDecoration::None,
        }
    }

    /// Every span with its style fully resolved against the layer defaults
    pub fn resolved_spans(&self) -> Vec<ResolvedSpan> {
        let defaults = self.default_style();
        self.rich_text
            .spans()
            .iter()
            .filter(|span| !span.text.is_empty())
            .map(|span| ResolvedSpan {
                text: span.text.clone(),
                style: span.style.resolve(&defaults),
            })
            .collect()
    }
}

/// A span ready for the renderer
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResolvedSpan {
    pub text: String,
    #[serde(flatten)]
    pub style: ResolvedStyle,
}

/// How a photo fills its box
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitMode {
    #[default]
    Contain,
    Cover,
    Fill,
}

/// An image placed on the canvas; references its stored asset by path
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoLayer {
    pub id: LayerId,
    pub src: String,
    pub storage_path: String,
    #[serde(flatten)]
    pub(crate) position: Position,
    #[serde(flatten)]
    pub(crate) extent: Extent,
    pub z_index: i32,
    #[serde(default)]
    pub fit_mode: FitMode,
    #[serde(default = "full_opacity")]
    pub opacity: f32,
    #[serde(default)]
    pub rotation: f32,
    #[serde(default = "enabled")]
    pub maintain_aspect_ratio: bool,
    pub original_width: u32,
    pub original_height: u32,
}

impl PhotoLayer {
    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn extent(&self) -> &Extent {
        &self.extent
    }

    pub fn aspect_lock(&self) -> AspectLock {
        if self.maintain_aspect_ratio {
            AspectLock::from_dimensions(self.original_width, self.original_height)
        } else {
            AspectLock::Free
        }
    }
}

/// QR error correction level
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ErrorCorrectionLevel {
    L,
    #[default]
    M,
    Q,
    H,
}

impl ErrorCorrectionLevel {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "L" => Some(Self::L),
            "M" => Some(Self::M),
            "Q" => Some(Self::Q),
            "H" => Some(Self::H),
            _ => None,
        }
    }
}

/// A QR code; always square
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrCodeLayer {
    pub id: LayerId,
    pub qr_data: String,
    #[serde(default)]
    pub error_correction_level: ErrorCorrectionLevel,
    #[serde(flatten)]
    pub(crate) position: Position,
    #[serde(flatten)]
    pub(crate) extent: Extent,
    pub foreground_color: String,
    pub background_color: String,
    pub z_index: i32,
    #[serde(default = "full_opacity")]
    pub opacity: f32,
    #[serde(default)]
    pub rotation: f32,
    #[serde(default = "enabled")]
    pub maintain_aspect_ratio: bool,
    #[serde(default)]
    pub margin: u32,
    #[serde(default = "enabled")]
    pub visible: bool,
}

impl QrCodeLayer {
    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn extent(&self) -> &Extent {
        &self.extent
    }
}

fn full_opacity() -> f32 {
    1.0
}

fn enabled() -> bool {
    true
}

/// Any layer on one side of a template
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Layer {
    #[serde(rename = "text")]
    Text(TextLayer),
    #[serde(rename = "photo")]
    Photo(PhotoLayer),
    #[serde(rename = "qrcode")]
    QrCode(QrCodeLayer),
}

impl Layer {
    pub fn id(&self) -> &LayerId {
        match self {
            Layer::Text(layer) => &layer.id,
            Layer::Photo(layer) => &layer.id,
            Layer::QrCode(layer) => &layer.id,
        }
    }

    pub fn kind(&self) -> LayerKind {
        match self {
            Layer::Text(_) => LayerKind::Text,
            Layer::Photo(_) => LayerKind::Photo,
            Layer::QrCode(_) => LayerKind::QrCode,
        }
    }

    pub fn position(&self) -> &Position {
        match self {
            Layer::Text(layer) => &layer.position,
            Layer::Photo(layer) => &layer.position,
            Layer::QrCode(layer) => &layer.position,
        }
    }

    /// Explicit stacking order; text layers are ordered by list position
    pub fn z_index(&self) -> Option<i32> {
        match self {
            Layer::Text(_) => None,
            Layer::Photo(layer) => Some(layer.z_index),
            Layer::QrCode(layer) => Some(layer.z_index),
        }
    }

    pub fn extent(&self) -> Option<&Extent> {
        match self {
            Layer::Text(_) => None,
            Layer::Photo(layer) => Some(&layer.extent),
            Layer::QrCode(layer) => Some(&layer.extent),
        }
    }

    pub fn aspect_lock(&self) -> AspectLock {
        match self {
            Layer::Text(_) => AspectLock::Free,
            Layer::Photo(layer) => layer.aspect_lock(),
            Layer::QrCode(_) => AspectLock::Square,
        }
    }

    pub fn as_text(&self) -> Option<&TextLayer> {
        match self {
            Layer::Text(layer) => Some(layer),
            _ => None,
        }
    }

    pub fn as_photo(&self) -> Option<&PhotoLayer> {
        match self {
            Layer::Photo(layer) => Some(layer),
            _ => None,
        }
    }

    pub fn as_qr_code(&self) -> Option<&QrCodeLayer> {
        match self {
            Layer::QrCode(layer) => Some(layer),
            _ => None,
        }
    }

    /// Recompute every pixel cache from the percentages for `canvas`
    pub(crate) fn refresh_geometry(&mut self, canvas: CanvasSize) {
        let lock = self.aspect_lock();
        match self {
            Layer::Text(layer) => layer.position.refresh(canvas),
            Layer::Photo(layer) => {
                layer.position.refresh(canvas);
                layer.extent.refresh(lock, canvas);
            }
            Layer::QrCode(layer) => {
                layer.position.refresh(canvas);
                layer.extent.refresh(lock, canvas);
            }
        }
    }
}
