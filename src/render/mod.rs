//! Region layout, per-region painters, and the dirty-queue renderer.

mod frame;
mod regions;
mod renderer;

pub use frame::FrameView;
pub use regions::{DirtyQueue, DirtyRegion, Layout, Rect, RegionId};
pub use renderer::Renderer;
