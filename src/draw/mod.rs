pub mod input;
pub mod model;
pub mod raster;
pub mod state;
pub mod surface;

pub use input::{normalize_event, PointerAction, PointerInput, PointerPhase, RawPointerEvent};
pub use model::{Point, SurfaceRect};
pub use surface::{DrawingSurface, Snapshot, SurfaceSnapshot};
