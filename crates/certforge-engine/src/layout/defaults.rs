use serde::{Deserialize, Serialize};

use crate::models::layer::{ErrorCorrectionLevel, FitMode};
use crate::models::style::FontWeight;

/// Placement and styling given to newly added layers
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerDefaults {
    pub text: TextDefaults,
    pub photo: PhotoDefaults,
    pub qr_code: QrCodeDefaults,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextDefaults {
    pub x_percent: f64,
    pub y_percent: f64,
    pub font_size: f32,
    pub font_family: String,
    pub font_weight: FontWeight,
    pub color: String,
}

impl Default for TextDefaults {
    fn default() -> Self {
        Self {
            x_percent: 0.5,
            y_percent: 0.5,
            font_size: 24.0,
            font_family: "Arial".to_string(),
            font_weight: FontWeight::NORMAL,
            color: "#000000".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhotoDefaults {
    pub x_percent: f64,
    pub y_percent: f64,
    pub width_percent: f64,
    pub fit_mode: FitMode,
    pub maintain_aspect_ratio: bool,
}

impl Default for PhotoDefaults {
    fn default() -> Self {
        Self {
            x_percent: 0.5,
            y_percent: 0.3,
            width_percent: 0.25,
            fit_mode: FitMode::Contain,
            maintain_aspect_ratio: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QrCodeDefaults {
    pub x_percent: f64,
    pub y_percent: f64,
    /// Side length as a fraction of the canvas width
    pub size_percent: f64,
    pub foreground_color: String,
    pub background_color: String,
    pub error_correction_level: ErrorCorrectionLevel,
    pub margin: u32,
}

impl Default for QrCodeDefaults {
    fn default() -> Self {
        Self {
            x_percent: 0.85,
            y_percent: 0.85,
            size_percent: 0.15,
            foreground_color: "#000000".to_string(),
            background_color: "#FFFFFF".to_string(),
            error_correction_level: ErrorCorrectionLevel::M,
            margin: 4,
        }
    }
}
