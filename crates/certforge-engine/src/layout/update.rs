use crate::layout::coordinates::{
    AspectLock, CanvasSize, PercentPoint, PercentSize, PixelPoint, PixelSize, size_to_percent,
    to_percent, width_for_height,
};
use crate::models::layer::{
    ErrorCorrectionLevel, Extent, FitMode, Layer, PhotoLayer, Position, QrCodeLayer, TextLayer,
};
use crate::models::style::{FontWeight, is_valid_font_size};

/// New position for a layer, in either coordinate space. Absolute input is
/// converted to percent against the current reference size first.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Move {
    Percent(PercentPoint),
    Absolute(PixelPoint),
}

/// New size for a photo or QR layer.
///
/// On an aspect-locked layer only one dimension is honoured: the width when
/// it is given, otherwise the height, with the other one derived.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Resize {
    Percent(PercentSize),
    Absolute(PixelSize),
    Width(f64),
    Height(f64),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextLayerUpdate {
    pub position: Option<Move>,
    pub font_size: Option<f32>,
    pub font_family: Option<String>,
    pub font_weight: Option<FontWeight>,
    pub color: Option<String>,
    pub is_editing: Option<bool>,
}

/// Replacement image for a photo layer
#[derive(Clone, Debug, PartialEq)]
pub struct PhotoSource {
    pub src: String,
    pub storage_path: String,
    pub original_width: u32,
    pub original_height: u32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PhotoLayerUpdate {
    pub position: Option<Move>,
    pub size: Option<Resize>,
    pub source: Option<PhotoSource>,
    pub z_index: Option<i32>,
    pub fit_mode: Option<FitMode>,
    pub opacity: Option<f32>,
    pub rotation: Option<f32>,
    pub maintain_aspect_ratio: Option<bool>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct QrCodeLayerUpdate {
    pub position: Option<Move>,
    pub size: Option<Resize>,
    pub qr_data: Option<String>,
    pub error_correction_level: Option<ErrorCorrectionLevel>,
    pub foreground_color: Option<String>,
    pub background_color: Option<String>,
    pub z_index: Option<i32>,
    pub opacity: Option<f32>,
    pub rotation: Option<f32>,
    pub margin: Option<u32>,
    pub visible: Option<bool>,
}

/// Partial update of one layer; the variant must match the layer's
#[derive(Clone, Debug, PartialEq)]
pub enum LayerUpdate {
    Text(TextLayerUpdate),
    Photo(PhotoLayerUpdate),
    QrCode(QrCodeLayerUpdate),
}

impl LayerUpdate {
    pub fn move_to(layer: &Layer, to: Move) -> Self {
        match layer {
            Layer::Text(_) => LayerUpdate::Text(TextLayerUpdate {
                position: Some(to),
                ..Default::default()
            }),
            Layer::Photo(_) => LayerUpdate::Photo(PhotoLayerUpdate {
                position: Some(to),
                ..Default::default()
            }),
            Layer::QrCode(_) => LayerUpdate::QrCode(QrCodeLayerUpdate {
                position: Some(to),
                ..Default::default()
            }),
        }
    }
}

/// Merge `update` into `layer`. Returns false, leaving the layer untouched,
/// when the update targets another variant.
pub(crate) fn apply_update(layer: &mut Layer, update: &LayerUpdate, canvas: CanvasSize) -> bool {
    match (layer, update) {
        (Layer::Text(layer), LayerUpdate::Text(update)) => {
            update_text(layer, update, canvas);
            true
        }
        (Layer::Photo(layer), LayerUpdate::Photo(update)) => {
            update_photo(layer, update, canvas);
            true
        }
        (Layer::QrCode(layer), LayerUpdate::QrCode(update)) => {
            update_qr_code(layer, update, canvas);
            true
        }
        _ => false,
    }
}

fn update_text(layer: &mut TextLayer, update: &TextLayerUpdate, canvas: CanvasSize) {
    if let Some(to) = update.position {
        move_position(&mut layer.position, to, canvas);
    }
    if let Some(size) = update.font_size {
        if is_valid_font_size(size) {
            layer.font_size = size;
        } else {
            log::warn!("Ignoring font size {size} for {}", layer.id);
        }
    }
    if let Some(family) = &update.font_family {
        layer.font_family = family.clone();
    }
    if let Some(weight) = update.font_weight {
        layer.font_weight = weight;
    }
    if let Some(color) = &update.color {
        layer.color = color.clone();
    }
    if let Some(editing) = update.is_editing {
        layer.is_editing = editing;
    }
}

fn update_photo(layer: &mut PhotoLayer, update: &PhotoLayerUpdate, canvas: CanvasSize) {
    if let Some(source) = &update.source {
        layer.src = source.src.clone();
        layer.storage_path = source.storage_path.clone();
        layer.original_width = source.original_width;
        layer.original_height = source.original_height;
    }
    if let Some(maintain) = update.maintain_aspect_ratio {
        layer.maintain_aspect_ratio = maintain;
    }
    if let Some(z_index) = update.z_index {
        layer.z_index = z_index;
    }
    if let Some(fit_mode) = update.fit_mode {
        layer.fit_mode = fit_mode;
    }
    if let Some(opacity) = update.opacity {
        layer.opacity = opacity.clamp(0.0, 1.0);
    }
    if let Some(rotation) = update.rotation {
        layer.rotation = rotation;
    }
    if let Some(to) = update.position {
        move_position(&mut layer.position, to, canvas);
    }

    // A new image or a toggled lock changes the height even without a resize
    let lock = layer.aspect_lock();
    match update.size {
        Some(resize) => resize_extent(&mut layer.extent, resize, lock, canvas),
        None => layer.extent.refresh(lock, canvas),
    }
}

fn update_qr_code(layer: &mut QrCodeLayer, update: &QrCodeLayerUpdate, canvas: CanvasSize) {
    if let Some(data) = &update.qr_data {
        layer.qr_data = data.clone();
    }
    if let Some(level) = update.error_correction_level {
        layer.error_correction_level = level;
    }
    if let Some(color) = &update.foreground_color {
        layer.foreground_color = color.clone();
    }
    if let Some(color) = &update.background_color {
        layer.background_color = color.clone();
    }
    if let Some(z_index) = update.z_index {
        layer.z_index = z_index;
    }
    if let Some(opacity) = update.opacity {
        layer.opacity = opacity.clamp(0.0, 1.0);
    }
    if let Some(rotation) = update.rotation {
        layer.rotation = rotation;
    }
    if let Some(margin) = update.margin {
        layer.margin = margin;
    }
    if let Some(visible) = update.visible {
        layer.visible = visible;
    }
    if let Some(to) = update.position {
        move_position(&mut layer.position, to, canvas);
    }
    if let Some(resize) = update.size {
        resize_extent(&mut layer.extent, resize, AspectLock::Square, canvas);
    }
}

fn move_position(position: &mut Position, to: Move, canvas: CanvasSize) {
    let percent = match to {
        Move::Percent(percent) => percent,
        Move::Absolute(point) => to_percent(point, canvas),
    };
    position.set_percent(percent, canvas);
}

fn resize_extent(extent: &mut Extent, resize: Resize, lock: AspectLock, canvas: CanvasSize) {
    let current = extent.percent();
    let requested = match resize {
        Resize::Percent(size) => size,
        Resize::Absolute(size) => size_to_percent(size, lock, canvas),
        Resize::Width(width) => PercentSize::new(width, current.height),
        Resize::Height(height) => match lock {
            AspectLock::Free => PercentSize::new(current.width, height),
            AspectLock::Square | AspectLock::Ratio(_) => {
                PercentSize::new(width_for_height(height, lock, canvas), height)
            }
        },
    };
    extent.set_percent(requested, lock, canvas);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::layer::LayerId;
    use crate::models::rich_text::RichText;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::rstest;

    const CANVAS: CanvasSize = CanvasSize::new(1000, 500);

    fn photo(maintain_aspect_ratio: bool) -> Layer {
        let lock = if maintain_aspect_ratio {
            AspectLock::from_dimensions(800, 600)
        } else {
            AspectLock::Free
        };
        Layer::Photo(PhotoLayer {
            id: LayerId::new("photo-1"),
            src: "https://cdn.example.org/seal.png".to_string(),
            storage_path: "templates/7/seal.png".to_string(),
            position: Position::new(PercentPoint::new(0.5, 0.3), CANVAS),
            extent: Extent::new(PercentSize::new(0.2, 0.2), lock, CANVAS),
            z_index: 1,
            fit_mode: FitMode::Contain,
            opacity: 1.0,
            rotation: 0.0,
            maintain_aspect_ratio,
            original_width: 800,
            original_height: 600,
        })
    }

    fn qr() -> Layer {
        Layer::QrCode(QrCodeLayer {
            id: LayerId::new("qr-1"),
            qr_data: "https://example.org/verify/1".to_string(),
            error_correction_level: ErrorCorrectionLevel::M,
            position: Position::new(PercentPoint::new(0.85, 0.85), CANVAS),
            extent: Extent::new(PercentSize::new(0.15, 0.15), AspectLock::Square, CANVAS),
            foreground_color: "#000000".to_string(),
            background_color: "#ffffff".to_string(),
            z_index: 2,
            opacity: 1.0,
            rotation: 0.0,
            maintain_aspect_ratio: true,
            margin: 4,
            visible: true,
        })
    }

    fn resize(layer: &mut Layer, size: Resize) {
        let update = match layer {
            Layer::Photo(_) => LayerUpdate::Photo(PhotoLayerUpdate {
                size: Some(size),
                ..Default::default()
            }),
            _ => LayerUpdate::QrCode(QrCodeLayerUpdate {
                size: Some(size),
                ..Default::default()
            }),
        };
        assert!(apply_update(layer, &update, CANVAS));
    }

    #[test]
    fn test_move_by_pixels_updates_percent_first() {
        let mut layer = qr();
        let update = LayerUpdate::move_to(&layer, Move::Absolute(PixelPoint::new(250, 100)));

        assert!(apply_update(&mut layer, &update, CANVAS));

        assert_eq!(layer.position().percent(), PercentPoint::new(0.25, 0.2));
        assert_eq!(layer.position().absolute(), PixelPoint::new(250, 100));
    }

    #[test]
    fn test_move_off_canvas_is_clamped() {
        let mut layer = qr();
        let update = LayerUpdate::move_to(&layer, Move::Percent(PercentPoint::new(-0.2, 1.7)));

        apply_update(&mut layer, &update, CANVAS);

        assert_eq!(layer.position().percent(), PercentPoint::new(0.0, 1.0));
    }

    #[test]
    fn test_qr_width_forces_square() {
        let mut layer = qr();
        resize(&mut layer, Resize::Percent(PercentSize::new(0.3, 0.1)));

        let extent = layer.extent().unwrap();
        assert_eq!(extent.percent(), PercentSize::new(0.3, 0.3));
        assert_eq!(extent.absolute(), PixelSize::new(300, 300));
    }

    #[test]
    fn test_qr_height_only_drives_width() {
        let mut layer = qr();
        resize(&mut layer, Resize::Height(0.1));

        assert_eq!(layer.extent().unwrap().absolute(), PixelSize::new(100, 100));
    }

    #[test]
    fn test_locked_photo_derives_height() {
        let mut layer = photo(true);
        resize(&mut layer, Resize::Absolute(PixelSize::new(400, 10)));

        assert_eq!(layer.extent().unwrap().absolute(), PixelSize::new(400, 300));
    }

    #[test]
    fn test_locked_photo_height_only_derives_width() {
        let mut layer = photo(true);
        resize(&mut layer, Resize::Height(0.6));

        assert_eq!(layer.extent().unwrap().absolute(), PixelSize::new(400, 300));
    }

    #[test]
    fn test_free_photo_sizes_independently() {
        let mut layer = photo(false);
        resize(&mut layer, Resize::Percent(PercentSize::new(0.5, 0.1)));

        assert_eq!(layer.extent().unwrap().absolute(), PixelSize::new(500, 50));
    }

    #[test]
    fn test_enabling_lock_rederives_height() {
        let mut layer = photo(false);
        let update = LayerUpdate::Photo(PhotoLayerUpdate {
            maintain_aspect_ratio: Some(true),
            ..Default::default()
        });

        apply_update(&mut layer, &update, CANVAS);

        assert_eq!(layer.extent().unwrap().absolute(), PixelSize::new(200, 150));
    }

    #[test]
    fn test_text_update_changes_only_given_fields() {
        let mut layer = Layer::Text(TextLayer {
            id: LayerId::new("text-1"),
            rich_text: RichText::plain("Certificate of Completion"),
            position: Position::new(PercentPoint::new(0.5, 0.2), CANVAS),
            font_size: 32.0,
            font_family: "Georgia".to_string(),
            font_weight: FontWeight::NORMAL,
            color: "#000000".to_string(),
            is_editing: false,
        });
        let update = LayerUpdate::Text(TextLayerUpdate {
            color: Some("#1a237e".to_string()),
            ..Default::default()
        });

        apply_update(&mut layer, &update, CANVAS);

        let text = layer.as_text().unwrap();
        assert_eq!(text.color, "#1a237e");
        assert_eq!(text.font_size, 32.0);
        assert_eq!(text.position().percent(), PercentPoint::new(0.5, 0.2));
    }

    #[rstest]
    #[case(f32::NAN)]
    #[case(f32::NEG_INFINITY)]
    #[case(0.0)]
    fn test_text_update_ignores_unusable_font_size(#[case] size: f32) {
        let mut layer = Layer::Text(TextLayer {
            id: LayerId::new("text-1"),
            rich_text: RichText::plain("Jane Doe"),
            position: Position::new(PercentPoint::new(0.5, 0.5), CANVAS),
            font_size: 24.0,
            font_family: "Arial".to_string(),
            font_weight: FontWeight::NORMAL,
            color: "#000000".to_string(),
            is_editing: false,
        });
        let update = LayerUpdate::Text(TextLayerUpdate {
            font_size: Some(size),
            ..Default::default()
        });

        apply_update(&mut layer, &update, CANVAS);

        assert_eq!(layer.as_text().unwrap().font_size, 24.0);
    }

    #[test]
    fn test_mismatched_variant_is_rejected() {
        let mut layer = qr();
        let before = layer.clone();
        let update = LayerUpdate::Text(TextLayerUpdate {
            font_size: Some(12.0),
            ..Default::default()
        });

        assert!(!apply_update(&mut layer, &update, CANVAS));
        assert_eq!(layer, before);
    }

    proptest! {
        #[test]
        fn qr_resize_is_always_square(width in 0.0f64..=1.0, height in 0.0f64..=1.0) {
            let mut layer = qr();
            resize(&mut layer, Resize::Percent(PercentSize::new(width, height)));
            let extent = layer.extent().unwrap();
            prop_assert_eq!(extent.percent().width, extent.percent().height);
            prop_assert_eq!(extent.absolute().width, extent.absolute().height);
        }

        #[test]
        fn locked_photo_keeps_ratio(width in 0.05f64..=1.0) {
            let mut layer = photo(true);
            resize(&mut layer, Resize::Width(width));
            let size = layer.extent().unwrap().absolute();
            let expected = size.width as f64 * 0.75;
            prop_assert!((size.height as f64 - expected).abs() <= 0.5 * 0.75 + 0.5 + 1e-6);
        }
    }
}
