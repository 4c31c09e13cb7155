use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cache::Cache;
use crate::layout::coordinates::CanvasSize;
use crate::layout::defaults::LayerDefaults;
use crate::layout::registry::{CanvasSide, LayerRegistry};
use crate::models::layer::Layer;

pub mod assets;

pub use assets::{AssetStore, FsAssetStore, release_layer_asset};

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid template {path}: {source}")]
    InvalidTemplate {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The stored layout of one canvas side.
///
/// `reference_size` records the canvas the pixel caches were last computed
/// for; layers are re-measured against it on load.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SideLayout {
    #[serde(default)]
    pub reference_size: CanvasSize,
    #[serde(default)]
    pub layers: Vec<Layer>,
}

impl Default for SideLayout {
    fn default() -> Self {
        Self {
            reference_size: CanvasSize::STANDARD,
            layers: Vec::new(),
        }
    }
}

impl SideLayout {
    pub fn from_registry(registry: &LayerRegistry) -> Self {
        Self {
            reference_size: registry.reference_size(),
            layers: registry.layers().to_vec(),
        }
    }

    pub fn into_registry(self, side: CanvasSide, defaults: LayerDefaults) -> LayerRegistry {
        LayerRegistry::from_layers(side, self.reference_size, self.layers, defaults)
    }
}

/// A certificate template: the certificate face and the score sheet
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default)]
    pub certificate: SideLayout,
    #[serde(default)]
    pub score: SideLayout,
}

impl Template {
    pub fn side(&self, side: CanvasSide) -> &SideLayout {
        match side {
            CanvasSide::Certificate => &self.certificate,
            CanvasSide::Score => &self.score,
        }
    }

    pub fn side_mut(&mut self, side: CanvasSide) -> &mut SideLayout {
        match side {
            CanvasSide::Certificate => &mut self.certificate,
            CanvasSide::Score => &mut self.score,
        }
    }

    /// Load one side into a registry ready for editing
    pub fn registry(&self, side: CanvasSide, defaults: LayerDefaults) -> LayerRegistry {
        self.side(side).clone().into_registry(side, defaults)
    }

    /// Replace one side with the registry's current layers
    pub fn store(&mut self, registry: &LayerRegistry) {
        *self.side_mut(registry.side()) = SideLayout::from_registry(registry);
    }
}

/// Parse a template document
pub fn parse_template(json: &str) -> Result<Template, serde_json::Error> {
    serde_json::from_str(json)
}

/// Serialize a template document, pretty-printed
pub fn template_to_json(template: &Template) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(template)
}

/// Read a template file
pub fn read_template(path: &Path) -> Result<Template, IoError> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    let content = fs::read_to_string(path).map_err(IoError::Io)?;
    parse_template(&content).map_err(|source| IoError::InvalidTemplate {
        path: path.to_path_buf(),
        source,
    })
}

/// Write a template file, creating parent directories as needed
pub fn write_template(path: &Path, template: &Template) -> Result<(), IoError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(IoError::Io)?;
    }
    let content = template_to_json(template)?;
    fs::write(path, content).map_err(IoError::Io)
}

/// Reads templates through a cache so repeated opens skip parsing
pub struct TemplateLoader<C> {
    cache: C,
}

impl<C: Cache<PathBuf, Template>> TemplateLoader<C> {
    pub fn new(cache: C) -> Self {
        Self { cache }
    }

    pub fn load(&mut self, path: &Path) -> Result<Template, IoError> {
        let key = path.to_path_buf();
        if let Some(template) = self.cache.get(&key) {
            log::debug!("Template cache hit for {}", path.display());
            return Ok(template.clone());
        }
        let template = read_template(path)?;
        self.cache.set(key, template.clone());
        Ok(template)
    }

    /// Write through to disk and refresh the cached copy
    pub fn save(&mut self, path: &Path, template: &Template) -> Result<(), IoError> {
        write_template(path, template)?;
        self.cache.set(path.to_path_buf(), template.clone());
        Ok(())
    }

    pub fn invalidate(&mut self, path: &Path) {
        self.cache.delete(&path.to_path_buf());
    }
}
