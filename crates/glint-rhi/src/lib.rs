//! Vulkan rendering hardware interface built on ash.
//!
//! Thin RAII wrappers over the raw API: instance and device bring-up,
//! swapchain management, buffers, descriptors, pipelines, and sync
//! primitives. Higher layers compose these into a frame loop.

mod error;

pub mod buffer;
pub mod command;
pub mod descriptor;
pub mod device;
pub mod instance;
pub mod physical_device;
pub mod pipeline;
pub mod shader;
pub mod swapchain;
pub mod sync;
pub mod vertex;

pub use error::{RhiError, RhiResult};
pub use sync::MAX_FRAMES_IN_FLIGHT;

pub use ash::vk;
