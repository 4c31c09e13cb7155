//! Layer geometry and the per-side layer registry.
//!
//! Percentages of the reference canvas are the stored form of every
//! position and size. [`coordinates`] maps them to pixels, [`update`]
//! merges partial edits while holding aspect locks, and [`registry`] owns
//! the layers of one canvas side.

pub mod coordinates;
pub mod defaults;
pub mod registry;
pub mod update;

pub use coordinates::{
    AspectLock, CanvasSize, PercentPoint, PercentSize, PixelPoint, PixelSize, to_absolute,
    to_percent,
};
pub use defaults::{LayerDefaults, PhotoDefaults, QrCodeDefaults, TextDefaults};
pub use registry::{CanvasSide, LayerRegistry, MaterializedLayer};
pub use update::{
    LayerUpdate, Move, PhotoLayerUpdate, PhotoSource, QrCodeLayerUpdate, Resize, TextLayerUpdate,
};
