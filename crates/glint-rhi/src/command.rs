//! Command pools and one-shot submission helpers.

use std::sync::Arc;

use ash::vk;
use tracing::debug;

use crate::RhiResult;
use crate::device::Device;

/// A command pool bound to a single queue family.
pub struct CommandPool {
    device: Arc<Device>,
    pool: vk::CommandPool,
}

impl CommandPool {
    /// Create a pool whose buffers may be individually reset and re-recorded.
    pub fn new(device: Arc<Device>, queue_family_index: u32) -> RhiResult<Self> {
        Self::with_flags(
            device,
            queue_family_index,
            vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER,
        )
    }

    /// Create a pool for short-lived buffers (staging uploads).
    pub fn new_transient(device: Arc<Device>, queue_family_index: u32) -> RhiResult<Self> {
        Self::with_flags(
            device,
            queue_family_index,
            vk::CommandPoolCreateFlags::TRANSIENT | vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER,
        )
    }

    fn with_flags(
        device: Arc<Device>,
        queue_family_index: u32,
        flags: vk::CommandPoolCreateFlags,
    ) -> RhiResult<Self> {
        let create_info = vk::CommandPoolCreateInfo::default()
            .queue_family_index(queue_family_index)
            .flags(flags);

        let pool = unsafe { device.handle().create_command_pool(&create_info, None)? };
        debug!(queue_family_index, "Created command pool");

        Ok(Self { device, pool })
    }

    /// Allocate primary command buffers from this pool.
    pub fn allocate_primary(&self, count: u32) -> RhiResult<Vec<vk::CommandBuffer>> {
        let alloc_info = vk::CommandBufferAllocateInfo::default()
            .command_pool(self.pool)
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_buffer_count(count);

        let buffers = unsafe { self.device.handle().allocate_command_buffers(&alloc_info)? };
        Ok(buffers)
    }

    /// Record a command buffer, submit it to the graphics queue, and wait
    /// for completion. Used for staging copies during resource creation.
    pub fn submit_once(&self, record: impl FnOnce(&ash::Device, vk::CommandBuffer)) -> RhiResult<()> {
        let device = self.device.handle();
        let cmd = self.allocate_primary(1)?[0];

        let begin_info = vk::CommandBufferBeginInfo::default()
            .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);

        unsafe {
            device.begin_command_buffer(cmd, &begin_info)?;
            record(device, cmd);
            device.end_command_buffer(cmd)?;

            let cmds = [cmd];
            let submit = vk::SubmitInfo::default().command_buffers(&cmds);
            device.queue_submit(self.device.graphics_queue(), &[submit], vk::Fence::null())?;
            device.queue_wait_idle(self.device.graphics_queue())?;
            device.free_command_buffers(self.pool, &cmds);
        }

        Ok(())
    }

    #[inline]
    pub fn handle(&self) -> vk::CommandPool {
        self.pool
    }
}

impl Drop for CommandPool {
    fn drop(&mut self) {
        debug!("Destroying command pool");
        unsafe {
            self.device.handle().destroy_command_pool(self.pool, None);
        }
    }
}

/// Copy `size` bytes between two buffers through a one-shot command buffer.
pub fn copy_buffer(
    pool: &CommandPool,
    src: vk::Buffer,
    dst: vk::Buffer,
    size: u64,
) -> RhiResult<()> {
    pool.submit_once(|device, cmd| {
        let region = vk::BufferCopy::default().size(size);
        unsafe {
            device.cmd_copy_buffer(cmd, src, dst, &[region]);
        }
    })
}
