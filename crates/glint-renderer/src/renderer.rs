//! The frame renderer: owns the swapchain and drives the per-frame
//! lifecycle.
//!
//! A frame runs begin_frame -> begin_render_pass -> record ->
//! end_render_pass -> end_frame. begin_frame may return `None` (minimized
//! window or stale swapchain); callers skip the frame and try again next
//! loop iteration.

use std::sync::Arc;

use ash::vk;
use tracing::debug;

use glint_platform::Window;
use glint_rhi::command::CommandPool;
use glint_rhi::device::Device;
use glint_rhi::instance::Instance;
use glint_rhi::swapchain::{ImageAcquire, PresentStatus, Swapchain};
use glint_rhi::{MAX_FRAMES_IN_FLIGHT, RhiResult};

use crate::frame::FrameTracker;

/// Clear color for the scene background.
const CLEAR_COLOR: [f32; 4] = [0.01, 0.01, 0.01, 1.0];

/// Owns the swapchain, command buffers, and frame state.
pub struct FrameRenderer {
    device: Arc<Device>,
    swapchain: Swapchain,
    // Held so the allocated command buffers outlive every frame.
    #[allow(dead_code)]
    command_pool: CommandPool,
    command_buffers: Vec<vk::CommandBuffer>,
    tracker: FrameTracker,
}

impl FrameRenderer {
    pub fn new(
        instance: &Instance,
        device: Arc<Device>,
        surface_loader: &ash::khr::surface::Instance,
        surface: vk::SurfaceKHR,
        extent: vk::Extent2D,
    ) -> RhiResult<Self> {
        let swapchain = Swapchain::new(
            instance.handle(),
            device.clone(),
            surface_loader,
            surface,
            extent,
        )?;

        let command_pool = CommandPool::new(device.clone(), device.graphics_family())?;
        let command_buffers = command_pool.allocate_primary(MAX_FRAMES_IN_FLIGHT as u32)?;

        Ok(Self {
            device,
            swapchain,
            command_pool,
            command_buffers,
            tracker: FrameTracker::new(),
        })
    }

    /// Start a frame.
    ///
    /// Returns `None` without starting when the window is minimized or the
    /// swapchain was stale and had to be rebuilt; in both cases no commands
    /// are recorded this iteration. Panics if a frame is already in
    /// progress.
    pub fn begin_frame(&mut self, window: &Window) -> RhiResult<Option<vk::CommandBuffer>> {
        assert!(
            !self.tracker.in_progress(),
            "begin_frame called while a frame is already in progress"
        );

        if window.is_minimized() {
            return Ok(None);
        }

        let image_index = match self.swapchain.acquire_next_image()? {
            ImageAcquire::Acquired { image_index, .. } => image_index,
            ImageAcquire::OutOfDate => {
                debug!("Swapchain out of date on acquire, rebuilding");
                self.rebuild_swapchain(window)?;
                return Ok(None);
            }
        };

        let cmd = self.current_command_buffer();
        self.tracker.begin(image_index, cmd);

        let begin_info = vk::CommandBufferBeginInfo::default();
        unsafe {
            self.device.handle().begin_command_buffer(cmd, &begin_info)?;
        }

        Ok(Some(cmd))
    }

    /// Finish the frame: submit, present, and handle staleness.
    ///
    /// The frame slot always advances. A suboptimal or out-of-date present,
    /// or a pending window resize, triggers a swapchain rebuild with the
    /// resize flag cleared exactly once.
    pub fn end_frame(&mut self, window: &mut Window) -> RhiResult<()> {
        assert!(
            self.tracker.in_progress(),
            "end_frame called with no frame in progress"
        );

        let cmd = self.current_command_buffer();
        unsafe {
            self.device.handle().end_command_buffer(cmd)?;
        }

        let status = self
            .swapchain
            .submit_and_present(cmd, self.tracker.image_index())?;

        self.tracker.end();

        if status != PresentStatus::Optimal || window.was_resized() {
            debug!(?status, resized = window.was_resized(), "Rebuilding swapchain");
            window.reset_resized_flag();
            self.rebuild_swapchain(window)?;
        }

        Ok(())
    }

    /// Begin the swapchain render pass on the current command buffer and
    /// set the full-extent viewport and scissor.
    pub fn begin_render_pass(&self, cmd: vk::CommandBuffer) {
        self.tracker.assert_recording(cmd);

        let extent = self.swapchain.extent();
        let clear_values = [
            vk::ClearValue {
                color: vk::ClearColorValue {
                    float32: CLEAR_COLOR,
                },
            },
            vk::ClearValue {
                depth_stencil: vk::ClearDepthStencilValue {
                    depth: 1.0,
                    stencil: 0,
                },
            },
        ];

        let begin_info = vk::RenderPassBeginInfo::default()
            .render_pass(self.swapchain.render_pass())
            .framebuffer(self.swapchain.framebuffer(self.tracker.image_index()))
            .render_area(vk::Rect2D {
                offset: vk::Offset2D { x: 0, y: 0 },
                extent,
            })
            .clear_values(&clear_values);

        let viewport = vk::Viewport {
            x: 0.0,
            y: 0.0,
            width: extent.width as f32,
            height: extent.height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        };
        let scissor = vk::Rect2D {
            offset: vk::Offset2D { x: 0, y: 0 },
            extent,
        };

        unsafe {
            self.device
                .handle()
                .cmd_begin_render_pass(cmd, &begin_info, vk::SubpassContents::INLINE);
            self.device.handle().cmd_set_viewport(cmd, 0, &[viewport]);
            self.device.handle().cmd_set_scissor(cmd, 0, &[scissor]);
        }
    }

    /// End the swapchain render pass.
    pub fn end_render_pass(&self, cmd: vk::CommandBuffer) {
        self.tracker.assert_recording(cmd);

        unsafe {
            self.device.handle().cmd_end_render_pass(cmd);
        }
    }

    /// Rebuild the swapchain for the window's current extent, deferring
    /// while the framebuffer has zero area.
    fn rebuild_swapchain(&mut self, window: &Window) -> RhiResult<()> {
        let extent = window.extent();
        if extent.width == 0 || extent.height == 0 {
            debug!("Deferring swapchain rebuild while window has zero area");
            return Ok(());
        }
        self.swapchain.recreate(extent)
    }

    fn current_command_buffer(&self) -> vk::CommandBuffer {
        self.command_buffers[self.tracker.frame_index()]
    }

    /// Index of the frame slot currently recording. Panics outside a frame.
    pub fn frame_index(&self) -> usize {
        assert!(
            self.tracker.in_progress(),
            "frame_index queried outside a frame"
        );
        self.tracker.frame_index()
    }

    #[inline]
    pub fn render_pass(&self) -> vk::RenderPass {
        self.swapchain.render_pass()
    }

    #[inline]
    pub fn aspect_ratio(&self) -> f32 {
        self.swapchain.aspect_ratio()
    }

    #[inline]
    pub fn swapchain(&self) -> &Swapchain {
        &self.swapchain
    }
}
