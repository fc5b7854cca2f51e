//! RHI error types.

use thiserror::Error;

/// Errors produced by the Vulkan abstraction layer.
#[derive(Error, Debug)]
pub enum RhiError {
    #[error("Vulkan error: {0}")]
    VulkanError(#[from] ash::vk::Result),

    #[error("Vulkan loading error: {0}")]
    LoadingError(#[from] ash::LoadingError),

    #[error("Allocation error: {0}")]
    AllocatorError(#[from] gpu_allocator::AllocationError),

    #[error("No suitable GPU found")]
    NoSuitableGpu,

    #[error("Shader error: {0}")]
    ShaderError(String),

    #[error("Swapchain error: {0}")]
    SwapchainError(String),

    #[error("Invalid handle: {0}")]
    InvalidHandle(String),

    #[error("Pipeline error: {0}")]
    PipelineError(String),
}

/// Convenience result alias for RHI operations.
pub type RhiResult<T> = Result<T, RhiError>;
