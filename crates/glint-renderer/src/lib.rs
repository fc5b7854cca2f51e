//! Frame rendering: per-frame lifecycle, GPU models, and draw dispatch.

pub mod frame;
pub mod model;
pub mod render_system;
pub mod renderer;
pub mod ubo;

pub use frame::FrameTracker;
pub use model::{Model, ModelArena};
pub use render_system::{DrawCall, PushKind, RenderSystem, build_draw_list};
pub use renderer::FrameRenderer;
pub use ubo::GlobalUbo;

pub use glint_rhi::MAX_FRAMES_IN_FLIGHT;
