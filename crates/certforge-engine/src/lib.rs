pub mod cache;
pub mod editing;
pub mod io;
pub mod layout;
pub mod models;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use cache::{Cache, Clock, EvictionPolicy, ManualClock, SystemClock, TtlCache};
pub use editing::{Cmd, Patch, RawSelection, SelectionQuery};
pub use io::*;
pub use layout::{CanvasSide, CanvasSize, LayerDefaults, LayerRegistry, LayerUpdate};
pub use models::*;
