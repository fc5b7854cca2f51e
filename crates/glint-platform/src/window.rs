//! Window management built on winit.

use std::sync::Arc;

use ash::vk;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use tracing::debug;
use winit::dpi::PhysicalSize;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window as WinitWindow, WindowAttributes};

use glint_core::{Error, Result};

/// A Vulkan surface tied to a window.
///
/// Destroys the underlying `VkSurfaceKHR` on drop, so it must be dropped
/// before the instance that created it.
pub struct Surface {
    handle: vk::SurfaceKHR,
    loader: ash::khr::surface::Instance,
}

impl Surface {
    #[inline]
    pub fn handle(&self) -> vk::SurfaceKHR {
        self.handle
    }

    #[inline]
    pub fn loader(&self) -> &ash::khr::surface::Instance {
        &self.loader
    }
}

impl Drop for Surface {
    fn drop(&mut self) {
        debug!("Destroying surface");
        unsafe {
            self.loader.destroy_surface(self.handle, None);
        }
    }
}

/// Application window.
pub struct Window {
    window: Arc<WinitWindow>,
    framebuffer_resized: bool,
}

impl Window {
    /// Create a new window on the given event loop.
    pub fn new(event_loop: &ActiveEventLoop, width: u32, height: u32, title: &str) -> Result<Self> {
        let attributes = WindowAttributes::default()
            .with_title(title)
            .with_inner_size(PhysicalSize::new(width, height));

        let window = event_loop
            .create_window(attributes)
            .map_err(|e| Error::Window(format!("failed to create window: {e}")))?;

        debug!(width, height, title, "Created window");

        Ok(Self {
            window: Arc::new(window),
            framebuffer_resized: false,
        })
    }

    #[inline]
    pub fn inner(&self) -> &WinitWindow {
        &self.window
    }

    /// Current framebuffer extent in pixels.
    pub fn extent(&self) -> vk::Extent2D {
        let size = self.window.inner_size();
        vk::Extent2D {
            width: size.width,
            height: size.height,
        }
    }

    /// Whether the framebuffer currently has zero area.
    pub fn is_minimized(&self) -> bool {
        let extent = self.extent();
        extent.width == 0 || extent.height == 0
    }

    pub fn aspect_ratio(&self) -> f32 {
        let extent = self.extent();
        if extent.height == 0 {
            return 1.0;
        }
        extent.width as f32 / extent.height as f32
    }

    /// Record that the framebuffer was resized. The flag stays set until
    /// [`Self::reset_resized_flag`] is called.
    pub fn on_resized(&mut self, size: PhysicalSize<u32>) {
        debug!(width = size.width, height = size.height, "Window resized");
        self.framebuffer_resized = true;
    }

    #[inline]
    pub fn was_resized(&self) -> bool {
        self.framebuffer_resized
    }

    #[inline]
    pub fn reset_resized_flag(&mut self) {
        self.framebuffer_resized = false;
    }

    pub fn request_redraw(&self) {
        self.window.request_redraw();
    }

    /// Create a Vulkan surface for this window.
    pub fn create_surface(&self, entry: &ash::Entry, instance: &ash::Instance) -> Result<Surface> {
        let display_handle = self
            .window
            .display_handle()
            .map_err(|e| Error::Window(format!("failed to get display handle: {e}")))?;
        let window_handle = self
            .window
            .window_handle()
            .map_err(|e| Error::Window(format!("failed to get window handle: {e}")))?;

        let handle = unsafe {
            ash_window::create_surface(
                entry,
                instance,
                display_handle.as_raw(),
                window_handle.as_raw(),
                None,
            )
            .map_err(|e| Error::Window(format!("failed to create surface: {e}")))?
        };

        let loader = ash::khr::surface::Instance::new(entry, instance);
        debug!("Created surface");

        Ok(Surface { handle, loader })
    }
}

/// Instance extensions required to present to windows on this platform.
pub fn required_extensions(window: &Window) -> Result<Vec<*const std::ffi::c_char>> {
    let display_handle = window
        .inner()
        .display_handle()
        .map_err(|e| Error::Window(format!("failed to get display handle: {e}")))?;

    let extensions = ash_window::enumerate_required_extensions(display_handle.as_raw())
        .map_err(|e| Error::Window(format!("failed to query surface extensions: {e}")))?;

    Ok(extensions.to_vec())
}
