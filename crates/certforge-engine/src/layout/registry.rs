use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::editing::{Cmd, Patch, apply_command};
use crate::layout::coordinates::{
    AspectLock, CanvasSize, PercentPoint, PercentSize, PixelPoint, PixelSize,
};
use crate::layout::defaults::LayerDefaults;
use crate::layout::update::{LayerUpdate, PhotoSource, apply_update};
use crate::models::layer::{
    Extent, Layer, LayerId, LayerKind, PhotoLayer, Position, QrCodeLayer, ResolvedSpan, TextLayer,
};
use crate::models::rich_text::RichText;

/// Which face of a certificate template a registry lays out
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CanvasSide {
    Certificate,
    Score,
}

impl fmt::Display for CanvasSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CanvasSide::Certificate => "certificate",
            CanvasSide::Score => "score",
        })
    }
}

/// Time-based ids, strictly increasing within one registry
#[derive(Debug, Default)]
struct IdGenerator {
    last: u64,
}

impl IdGenerator {
    fn next(&mut self, kind: LayerKind, taken: impl Fn(&LayerId) -> bool) -> LayerId {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as u64)
            .unwrap_or_default();
        let mut stamp = now.max(self.last + 1);
        loop {
            let id = LayerId::new(format!("{}-{}", kind.prefix(), stamp));
            if !taken(&id) {
                self.last = stamp;
                return id;
            }
            stamp += 1;
        }
    }
}

/// A layer resolved for painting: pixel geometry and, for text, fully
/// styled spans
#[derive(Clone, Debug, PartialEq)]
pub struct MaterializedLayer<'a> {
    pub layer: &'a Layer,
    pub position: PixelPoint,
    pub size: Option<PixelSize>,
    pub spans: Vec<ResolvedSpan>,
}

/// Owns the layers of one canvas side.
///
/// All geometry is stored as percentages of the reference canvas; pixel
/// caches are re-derived whenever the reference size changes. Operations on
/// unknown ids are logged no-ops, since a stale UI callback racing a delete
/// is expected.
#[derive(Debug)]
pub struct LayerRegistry {
    side: CanvasSide,
    reference_size: CanvasSize,
    layers: Vec<Layer>,
    defaults: LayerDefaults,
    ids: IdGenerator,
    selected: HashMap<LayerKind, LayerId>,
    version: u64,
}

impl LayerRegistry {
    /// An empty registry measured against [`CanvasSize::STANDARD`] until a
    /// background image is known
    pub fn new(side: CanvasSide, defaults: LayerDefaults) -> Self {
        Self {
            side,
            reference_size: CanvasSize::STANDARD,
            layers: Vec::new(),
            defaults,
            ids: IdGenerator::default(),
            selected: HashMap::new(),
            version: 0,
        }
    }

    /// Rebuild a registry from stored layers. Pixel caches are recomputed;
    /// whatever absolute values the layers carried are discarded.
    pub fn from_layers(
        side: CanvasSide,
        reference_size: CanvasSize,
        layers: Vec<Layer>,
        defaults: LayerDefaults,
    ) -> Self {
        let mut registry = Self::new(side, defaults);
        registry.layers = layers;
        if !reference_size.is_empty() {
            registry.reference_size = reference_size;
        }
        let canvas = registry.reference_size;
        for layer in &mut registry.layers {
            layer.refresh_geometry(canvas);
        }
        registry
    }

    pub fn side(&self) -> CanvasSide {
        self.side
    }

    pub fn reference_size(&self) -> CanvasSize {
        self.reference_size
    }

    pub fn defaults(&self) -> &LayerDefaults {
        &self.defaults
    }

    /// Bumped on every mutation
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn into_layers(self) -> Vec<Layer> {
        self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn get(&self, id: &LayerId) -> Option<&Layer> {
        self.layers.iter().find(|layer| layer.id() == id)
    }

    /// Switch to a new reference canvas, typically once the side's
    /// background image has loaded. Every pixel cache is re-derived from the
    /// stored percentages. An empty size is ignored.
    pub fn set_reference_size(&mut self, size: CanvasSize) {
        if size.is_empty() {
            log::warn!(
                "Ignoring empty reference size {}x{} for {} side",
                size.width,
                size.height,
                self.side
            );
            return;
        }
        self.reference_size = size;
        for layer in &mut self.layers {
            layer.refresh_geometry(size);
        }
        self.version += 1;
    }

    /// Add a text layer holding `text` with no span formatting
    pub fn add_text_layer(&mut self, text: &str) -> &Layer {
        let defaults = self.defaults.text.clone();
        let layer = TextLayer {
            id: self.next_id(LayerKind::Text),
            rich_text: RichText::plain(text),
            position: Position::new(
                PercentPoint::new(defaults.x_percent, defaults.y_percent),
                self.reference_size,
            ),
            font_size: defaults.font_size,
            font_family: defaults.font_family,
            font_weight: defaults.font_weight,
            color: defaults.color,
            is_editing: false,
        };
        self.push(Layer::Text(layer))
    }

    /// Add a photo layer above every existing photo and QR layer
    pub fn add_photo_layer(&mut self, source: PhotoSource) -> &Layer {
        let defaults = self.defaults.photo.clone();
        let lock = if defaults.maintain_aspect_ratio {
            AspectLock::from_dimensions(source.original_width, source.original_height)
        } else {
            AspectLock::Free
        };
        let layer = PhotoLayer {
            id: self.next_id(LayerKind::Photo),
            src: source.src,
            storage_path: source.storage_path,
            position: Position::new(
                PercentPoint::new(defaults.x_percent, defaults.y_percent),
                self.reference_size,
            ),
            extent: Extent::new(
                PercentSize::new(defaults.width_percent, defaults.width_percent),
                lock,
                self.reference_size,
            ),
            z_index: self.next_z_index(),
            fit_mode: defaults.fit_mode,
            opacity: 1.0,
            rotation: 0.0,
            maintain_aspect_ratio: defaults.maintain_aspect_ratio,
            original_width: source.original_width,
            original_height: source.original_height,
        };
        self.push(Layer::Photo(layer))
    }

    /// Add a square QR code encoding `data`
    pub fn add_qr_code_layer(&mut self, data: &str) -> &Layer {
        let defaults = self.defaults.qr_code.clone();
        let layer = QrCodeLayer {
            id: self.next_id(LayerKind::QrCode),
            qr_data: data.to_string(),
            error_correction_level: defaults.error_correction_level,
            position: Position::new(
                PercentPoint::new(defaults.x_percent, defaults.y_percent),
                self.reference_size,
            ),
            extent: Extent::new(
                PercentSize::new(defaults.size_percent, defaults.size_percent),
                AspectLock::Square,
                self.reference_size,
            ),
            foreground_color: defaults.foreground_color,
            background_color: defaults.background_color,
            z_index: self.next_z_index(),
            opacity: 1.0,
            rotation: 0.0,
            maintain_aspect_ratio: true,
            margin: defaults.margin,
            visible: true,
        };
        self.push(Layer::QrCode(layer))
    }

    /// Merge a partial update into the layer with `id`.
    ///
    /// Returns the updated layer, or `None` when the id is unknown or the
    /// update is for another kind of layer.
    pub fn update_layer(&mut self, id: &LayerId, update: &LayerUpdate) -> Option<&Layer> {
        let canvas = self.reference_size;
        let Some(index) = self.index_of(id) else {
            log::warn!("Ignoring update for unknown layer {id}");
            return None;
        };
        if !apply_update(&mut self.layers[index], update, canvas) {
            log::warn!(
                "Ignoring update that does not match {} layer {id}",
                self.layers[index].kind()
            );
            return None;
        }
        self.version += 1;
        self.layers.get(index)
    }

    /// Remove the layer with `id` and hand it back.
    ///
    /// Releasing a photo's stored asset is left to the caller, see
    /// [`crate::io::release_layer_asset`].
    pub fn delete_layer(&mut self, id: &LayerId) -> Option<Layer> {
        let Some(index) = self.index_of(id) else {
            log::warn!("Ignoring delete of unknown layer {id}");
            return None;
        };
        let layer = self.layers.remove(index);
        if self.selected.get(&layer.kind()) == Some(id) {
            self.selected.remove(&layer.kind());
        }
        self.version += 1;
        log::debug!("Deleted {} layer {id}", layer.kind());
        Some(layer)
    }

    /// Run an edit command against a text layer's spans
    pub fn apply_text_command(&mut self, id: &LayerId, cmd: &Cmd) -> Option<Patch> {
        let Some(Layer::Text(layer)) = self.layers.iter_mut().find(|layer| layer.id() == id)
        else {
            log::warn!("Ignoring text command for missing text layer {id}");
            return None;
        };
        let (rich_text, mut patch) = apply_command(&layer.rich_text, cmd);
        layer.rich_text = rich_text;
        self.version += 1;
        patch.version = self.version;
        Some(patch)
    }

    /// Mark `id` as the selected layer of its kind
    pub fn select(&mut self, id: &LayerId) -> bool {
        match self.get(id).map(Layer::kind) {
            Some(kind) => {
                self.selected.insert(kind, id.clone());
                true
            }
            None => {
                log::warn!("Ignoring selection of unknown layer {id}");
                false
            }
        }
    }

    pub fn deselect(&mut self, kind: LayerKind) {
        self.selected.remove(&kind);
    }

    pub fn selected(&self, kind: LayerKind) -> Option<&Layer> {
        self.selected.get(&kind).and_then(|id| self.get(id))
    }

    /// Layers back to front: photo and QR layers by ascending `z_index`
    /// (insertion order breaking ties), then text layers in list order
    pub fn paint_order(&self) -> Vec<&Layer> {
        let mut stacked: Vec<&Layer> = self
            .layers
            .iter()
            .filter(|layer| layer.z_index().is_some())
            .collect();
        stacked.sort_by_key(|layer| layer.z_index());
        stacked.extend(self.layers.iter().filter(|layer| layer.z_index().is_none()));
        stacked
    }

    /// Everything a renderer needs, in paint order
    pub fn materialize(&self) -> Vec<MaterializedLayer<'_>> {
        self.paint_order()
            .into_iter()
            .map(|layer| MaterializedLayer {
                layer,
                position: layer.position().absolute(),
                size: layer.extent().map(Extent::absolute),
                spans: layer
                    .as_text()
                    .map(TextLayer::resolved_spans)
                    .unwrap_or_default(),
            })
            .collect()
    }

    fn next_id(&mut self, kind: LayerKind) -> LayerId {
        let layers = &self.layers;
        self.ids
            .next(kind, |id| layers.iter().any(|layer| layer.id() == id))
    }

    fn next_z_index(&self) -> i32 {
        self.layers
            .iter()
            .filter_map(Layer::z_index)
            .max()
            .unwrap_or(0)
            + 1
    }

    fn index_of(&self, id: &LayerId) -> Option<usize> {
        self.layers.iter().position(|layer| layer.id() == id)
    }

    fn push(&mut self, layer: Layer) -> &Layer {
        log::debug!("Added {} layer {} to {} side", layer.kind(), layer.id(), self.side);
        self.layers.push(layer);
        self.version += 1;
        let index = self.layers.len() - 1;
        &self.layers[index]
    }
}
