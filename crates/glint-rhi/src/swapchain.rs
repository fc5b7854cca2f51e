//! Swapchain management.
//!
//! The [`Swapchain`] owns everything tied to the presentable surface: the
//! chain itself, color image views, per-image depth targets, the render
//! pass, framebuffers, and all per-frame synchronization. Acquire and
//! present report surface staleness through typed results instead of
//! errors, so the frame loop can rebuild the chain and keep running.

use std::sync::Arc;

use ash::vk;
use gpu_allocator::MemoryLocation;
use gpu_allocator::vulkan::{Allocation, AllocationCreateDesc, AllocationScheme};
use tracing::{debug, info, warn};

use crate::device::Device;
use crate::sync::{Fence, MAX_FRAMES_IN_FLIGHT, Semaphore};
use crate::{RhiError, RhiResult};

/// Depth formats in preference order.
const DEPTH_FORMAT_CANDIDATES: [vk::Format; 3] = [
    vk::Format::D32_SFLOAT,
    vk::Format::D32_SFLOAT_S8_UINT,
    vk::Format::D24_UNORM_S8_UINT,
];

/// Outcome of acquiring a swapchain image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageAcquire {
    /// An image is available for rendering. `suboptimal` means the chain
    /// still works but no longer matches the surface exactly.
    Acquired { image_index: u32, suboptimal: bool },
    /// The chain can no longer present; it must be rebuilt before drawing.
    OutOfDate,
}

/// Outcome of presenting a rendered image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PresentStatus {
    Optimal,
    Suboptimal,
    OutOfDate,
}

/// Surface capabilities relevant to swapchain creation.
pub struct SwapchainSupportDetails {
    pub capabilities: vk::SurfaceCapabilitiesKHR,
    pub formats: Vec<vk::SurfaceFormatKHR>,
    pub present_modes: Vec<vk::PresentModeKHR>,
}

impl SwapchainSupportDetails {
    pub fn query(
        surface_loader: &ash::khr::surface::Instance,
        device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> RhiResult<Self> {
        unsafe {
            Ok(Self {
                capabilities: surface_loader
                    .get_physical_device_surface_capabilities(device, surface)?,
                formats: surface_loader.get_physical_device_surface_formats(device, surface)?,
                present_modes: surface_loader
                    .get_physical_device_surface_present_modes(device, surface)?,
            })
        }
    }

    pub fn is_adequate(&self) -> bool {
        !self.formats.is_empty() && !self.present_modes.is_empty()
    }
}

/// A depth attachment with its own device-local allocation.
struct DepthTarget {
    device: Arc<Device>,
    image: vk::Image,
    view: vk::ImageView,
    allocation: Option<Allocation>,
}

impl DepthTarget {
    fn new(device: Arc<Device>, format: vk::Format, extent: vk::Extent2D) -> RhiResult<Self> {
        let create_info = vk::ImageCreateInfo::default()
            .image_type(vk::ImageType::TYPE_2D)
            .extent(vk::Extent3D {
                width: extent.width,
                height: extent.height,
                depth: 1,
            })
            .mip_levels(1)
            .array_layers(1)
            .format(format)
            .tiling(vk::ImageTiling::OPTIMAL)
            .initial_layout(vk::ImageLayout::UNDEFINED)
            .usage(vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT)
            .samples(vk::SampleCountFlags::TYPE_1)
            .sharing_mode(vk::SharingMode::EXCLUSIVE);

        let image = unsafe { device.handle().create_image(&create_info, None)? };
        let requirements = unsafe { device.handle().get_image_memory_requirements(image) };

        let allocation = device.allocate(&AllocationCreateDesc {
            name: "depth target",
            requirements,
            location: MemoryLocation::GpuOnly,
            linear: false,
            allocation_scheme: AllocationScheme::GpuAllocatorManaged,
        })?;

        unsafe {
            device
                .handle()
                .bind_image_memory(image, allocation.memory(), allocation.offset())?;
        }

        let view_info = vk::ImageViewCreateInfo::default()
            .image(image)
            .view_type(vk::ImageViewType::TYPE_2D)
            .format(format)
            .subresource_range(vk::ImageSubresourceRange {
                aspect_mask: vk::ImageAspectFlags::DEPTH,
                base_mip_level: 0,
                level_count: 1,
                base_array_layer: 0,
                layer_count: 1,
            });
        let view = unsafe { device.handle().create_image_view(&view_info, None)? };

        Ok(Self {
            device,
            image,
            view,
            allocation: Some(allocation),
        })
    }
}

impl Drop for DepthTarget {
    fn drop(&mut self) {
        unsafe {
            self.device.handle().destroy_image_view(self.view, None);
            self.device.handle().destroy_image(self.image, None);
        }
        if let Some(allocation) = self.allocation.take() {
            if let Err(e) = self.device.free(allocation) {
                warn!("failed to free depth allocation: {e}");
            }
        }
    }
}

/// The swapchain and every resource bound to its images.
pub struct Swapchain {
    device: Arc<Device>,
    instance: ash::Instance,
    surface_loader: ash::khr::surface::Instance,
    surface: vk::SurfaceKHR,
    loader: ash::khr::swapchain::Device,
    swapchain: vk::SwapchainKHR,
    images: Vec<vk::Image>,
    image_views: Vec<vk::ImageView>,
    color_format: vk::Format,
    depth_format: vk::Format,
    extent: vk::Extent2D,
    // Held so the depth images outlive the framebuffers referencing them.
    #[allow(dead_code)]
    depth_targets: Vec<DepthTarget>,
    render_pass: vk::RenderPass,
    framebuffers: Vec<vk::Framebuffer>,
    image_available: Vec<Semaphore>,
    render_finished: Vec<Semaphore>,
    in_flight: Vec<Fence>,
    images_in_flight: Vec<vk::Fence>,
    current_frame: usize,
}

impl Swapchain {
    /// Create a swapchain for a surface at the given extent.
    pub fn new(
        instance: &ash::Instance,
        device: Arc<Device>,
        surface_loader: &ash::khr::surface::Instance,
        surface: vk::SurfaceKHR,
        extent: vk::Extent2D,
    ) -> RhiResult<Self> {
        Self::create(
            instance.clone(),
            device,
            surface_loader.clone(),
            surface,
            extent,
            vk::SwapchainKHR::null(),
        )
    }

    fn create(
        instance: ash::Instance,
        device: Arc<Device>,
        surface_loader: ash::khr::surface::Instance,
        surface: vk::SurfaceKHR,
        extent: vk::Extent2D,
        old_swapchain: vk::SwapchainKHR,
    ) -> RhiResult<Self> {
        debug_assert!(
            extent.width > 0 && extent.height > 0,
            "swapchain extent must be nonzero"
        );

        let support = SwapchainSupportDetails::query(&surface_loader, device.physical_device(), surface)?;
        if !support.is_adequate() {
            return Err(RhiError::SwapchainError(
                "surface reports no formats or present modes".to_string(),
            ));
        }

        let surface_format = choose_surface_format(&support.formats);
        let present_mode = choose_present_mode(&support.present_modes);
        let extent = choose_extent(&support.capabilities, extent.width, extent.height);
        let image_count = determine_image_count(&support.capabilities);

        let mut create_info = vk::SwapchainCreateInfoKHR::default()
            .surface(surface)
            .min_image_count(image_count)
            .image_format(surface_format.format)
            .image_color_space(surface_format.color_space)
            .image_extent(extent)
            .image_array_layers(1)
            .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
            .pre_transform(support.capabilities.current_transform)
            .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
            .present_mode(present_mode)
            .clipped(true)
            .old_swapchain(old_swapchain);

        let families = [device.graphics_family(), device.present_family()];
        if families[0] != families[1] {
            create_info = create_info
                .image_sharing_mode(vk::SharingMode::CONCURRENT)
                .queue_family_indices(&families);
        } else {
            create_info = create_info.image_sharing_mode(vk::SharingMode::EXCLUSIVE);
        }

        let loader = ash::khr::swapchain::Device::new(&instance, device.handle());
        let swapchain = unsafe { loader.create_swapchain(&create_info, None)? };
        let images = unsafe { loader.get_swapchain_images(swapchain)? };

        let image_views = create_image_views(&device, &images, surface_format.format)?;

        let depth_format = choose_depth_format(&instance, device.physical_device())?;
        let mut depth_targets = Vec::with_capacity(images.len());
        for _ in 0..images.len() {
            depth_targets.push(DepthTarget::new(device.clone(), depth_format, extent)?);
        }

        let render_pass = create_render_pass(&device, surface_format.format, depth_format)?;
        let framebuffers = create_framebuffers(
            &device,
            render_pass,
            &image_views,
            &depth_targets,
            extent,
        )?;

        let mut image_available = Vec::with_capacity(MAX_FRAMES_IN_FLIGHT);
        let mut render_finished = Vec::with_capacity(MAX_FRAMES_IN_FLIGHT);
        let mut in_flight = Vec::with_capacity(MAX_FRAMES_IN_FLIGHT);
        for _ in 0..MAX_FRAMES_IN_FLIGHT {
            image_available.push(Semaphore::new(device.clone())?);
            render_finished.push(Semaphore::new(device.clone())?);
            in_flight.push(Fence::new(device.clone(), true)?);
        }
        let images_in_flight = vec![vk::Fence::null(); images.len()];

        info!(
            width = extent.width,
            height = extent.height,
            images = images.len(),
            format = ?surface_format.format,
            present_mode = ?present_mode,
            "Created swapchain"
        );

        Ok(Self {
            device,
            instance,
            surface_loader,
            surface,
            loader,
            swapchain,
            images,
            image_views,
            color_format: surface_format.format,
            depth_format,
            extent,
            depth_targets,
            render_pass,
            framebuffers,
            image_available,
            render_finished,
            in_flight,
            images_in_flight,
            current_frame: 0,
        })
    }

    /// Rebuild the chain in place for a new extent.
    ///
    /// The old chain is handed to the new one and destroyed afterwards.
    /// Fails if the surface now reports different color or depth formats,
    /// since every pipeline was compiled against the old ones.
    pub fn recreate(&mut self, extent: vk::Extent2D) -> RhiResult<()> {
        self.device.wait_idle()?;

        let mut fresh = Self::create(
            self.instance.clone(),
            self.device.clone(),
            self.surface_loader.clone(),
            self.surface,
            extent,
            self.swapchain,
        )?;

        if fresh.color_format != self.color_format || fresh.depth_format != self.depth_format {
            return Err(RhiError::SwapchainError(
                "surface format changed across swapchain rebuild".to_string(),
            ));
        }

        // `fresh` takes the retired chain and tears it down on drop.
        std::mem::swap(self, &mut fresh);
        debug!("Recreated swapchain");
        Ok(())
    }

    /// Acquire the next image, waiting on the current frame slot's fence.
    pub fn acquire_next_image(&mut self) -> RhiResult<ImageAcquire> {
        self.in_flight[self.current_frame].wait(u64::MAX)?;

        let result = unsafe {
            self.loader.acquire_next_image(
                self.swapchain,
                u64::MAX,
                self.image_available[self.current_frame].handle(),
                vk::Fence::null(),
            )
        };

        match result {
            Ok((image_index, suboptimal)) => Ok(ImageAcquire::Acquired {
                image_index,
                suboptimal,
            }),
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(ImageAcquire::OutOfDate),
            Err(e) => Err(e.into()),
        }
    }

    /// Submit a recorded command buffer and present the image.
    ///
    /// Always advances the frame slot, even when presentation reports a
    /// stale surface.
    pub fn submit_and_present(
        &mut self,
        cmd: vk::CommandBuffer,
        image_index: u32,
    ) -> RhiResult<PresentStatus> {
        let image = image_index as usize;

        // A previous frame may still be rendering into this image.
        if self.images_in_flight[image] != vk::Fence::null() {
            unsafe {
                self.device.handle().wait_for_fences(
                    &[self.images_in_flight[image]],
                    true,
                    u64::MAX,
                )?;
            }
        }
        self.images_in_flight[image] = self.in_flight[self.current_frame].handle();
        self.in_flight[self.current_frame].reset()?;

        let wait_semaphores = [self.image_available[self.current_frame].handle()];
        let wait_stages = [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
        let signal_semaphores = [self.render_finished[self.current_frame].handle()];
        let command_buffers = [cmd];

        let submit_info = vk::SubmitInfo::default()
            .wait_semaphores(&wait_semaphores)
            .wait_dst_stage_mask(&wait_stages)
            .command_buffers(&command_buffers)
            .signal_semaphores(&signal_semaphores);

        unsafe {
            self.device.handle().queue_submit(
                self.device.graphics_queue(),
                &[submit_info],
                self.in_flight[self.current_frame].handle(),
            )?;
        }

        let swapchains = [self.swapchain];
        let image_indices = [image_index];
        let present_info = vk::PresentInfoKHR::default()
            .wait_semaphores(&signal_semaphores)
            .swapchains(&swapchains)
            .image_indices(&image_indices);

        let result = unsafe {
            self.loader
                .queue_present(self.device.present_queue(), &present_info)
        };

        self.current_frame = (self.current_frame + 1) % MAX_FRAMES_IN_FLIGHT;

        match result {
            Ok(false) => Ok(PresentStatus::Optimal),
            Ok(true) => Ok(PresentStatus::Suboptimal),
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(PresentStatus::OutOfDate),
            Err(e) => Err(e.into()),
        }
    }

    #[inline]
    pub fn render_pass(&self) -> vk::RenderPass {
        self.render_pass
    }

    #[inline]
    pub fn framebuffer(&self, image_index: u32) -> vk::Framebuffer {
        self.framebuffers[image_index as usize]
    }

    #[inline]
    pub fn extent(&self) -> vk::Extent2D {
        self.extent
    }

    #[inline]
    pub fn color_format(&self) -> vk::Format {
        self.color_format
    }

    #[inline]
    pub fn depth_format(&self) -> vk::Format {
        self.depth_format
    }

    #[inline]
    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    pub fn aspect_ratio(&self) -> f32 {
        if self.extent.height == 0 {
            return 1.0;
        }
        self.extent.width as f32 / self.extent.height as f32
    }
}

impl Drop for Swapchain {
    fn drop(&mut self) {
        debug!("Destroying swapchain");
        unsafe {
            for framebuffer in self.framebuffers.drain(..) {
                self.device.handle().destroy_framebuffer(framebuffer, None);
            }
            self.device.handle().destroy_render_pass(self.render_pass, None);
            for view in self.image_views.drain(..) {
                self.device.handle().destroy_image_view(view, None);
            }
            if self.swapchain != vk::SwapchainKHR::null() {
                self.loader.destroy_swapchain(self.swapchain, None);
            }
        }
    }
}

fn create_image_views(
    device: &Arc<Device>,
    images: &[vk::Image],
    format: vk::Format,
) -> RhiResult<Vec<vk::ImageView>> {
    images
        .iter()
        .map(|&image| {
            let create_info = vk::ImageViewCreateInfo::default()
                .image(image)
                .view_type(vk::ImageViewType::TYPE_2D)
                .format(format)
                .subresource_range(vk::ImageSubresourceRange {
                    aspect_mask: vk::ImageAspectFlags::COLOR,
                    base_mip_level: 0,
                    level_count: 1,
                    base_array_layer: 0,
                    layer_count: 1,
                });
            let view = unsafe { device.handle().create_image_view(&create_info, None)? };
            Ok(view)
        })
        .collect()
}

fn create_render_pass(
    device: &Arc<Device>,
    color_format: vk::Format,
    depth_format: vk::Format,
) -> RhiResult<vk::RenderPass> {
    let attachments = [
        vk::AttachmentDescription::default()
            .format(color_format)
            .samples(vk::SampleCountFlags::TYPE_1)
            .load_op(vk::AttachmentLoadOp::CLEAR)
            .store_op(vk::AttachmentStoreOp::STORE)
            .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
            .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
            .initial_layout(vk::ImageLayout::UNDEFINED)
            .final_layout(vk::ImageLayout::PRESENT_SRC_KHR),
        vk::AttachmentDescription::default()
            .format(depth_format)
            .samples(vk::SampleCountFlags::TYPE_1)
            .load_op(vk::AttachmentLoadOp::CLEAR)
            .store_op(vk::AttachmentStoreOp::DONT_CARE)
            .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
            .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
            .initial_layout(vk::ImageLayout::UNDEFINED)
            .final_layout(vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL),
    ];

    let color_ref = [vk::AttachmentReference {
        attachment: 0,
        layout: vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
    }];
    let depth_ref = vk::AttachmentReference {
        attachment: 1,
        layout: vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL,
    };

    let subpasses = [vk::SubpassDescription::default()
        .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
        .color_attachments(&color_ref)
        .depth_stencil_attachment(&depth_ref)];

    let dependencies = [vk::SubpassDependency {
        src_subpass: vk::SUBPASS_EXTERNAL,
        dst_subpass: 0,
        src_stage_mask: vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT
            | vk::PipelineStageFlags::EARLY_FRAGMENT_TESTS,
        src_access_mask: vk::AccessFlags::empty(),
        dst_stage_mask: vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT
            | vk::PipelineStageFlags::EARLY_FRAGMENT_TESTS,
        dst_access_mask: vk::AccessFlags::COLOR_ATTACHMENT_WRITE
            | vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE,
        dependency_flags: vk::DependencyFlags::empty(),
    }];

    let create_info = vk::RenderPassCreateInfo::default()
        .attachments(&attachments)
        .subpasses(&subpasses)
        .dependencies(&dependencies);

    let render_pass = unsafe { device.handle().create_render_pass(&create_info, None)? };
    Ok(render_pass)
}

fn create_framebuffers(
    device: &Arc<Device>,
    render_pass: vk::RenderPass,
    image_views: &[vk::ImageView],
    depth_targets: &[DepthTarget],
    extent: vk::Extent2D,
) -> RhiResult<Vec<vk::Framebuffer>> {
    image_views
        .iter()
        .zip(depth_targets)
        .map(|(&view, depth)| {
            let attachments = [view, depth.view];
            let create_info = vk::FramebufferCreateInfo::default()
                .render_pass(render_pass)
                .attachments(&attachments)
                .width(extent.width)
                .height(extent.height)
                .layers(1);
            let framebuffer = unsafe { device.handle().create_framebuffer(&create_info, None)? };
            Ok(framebuffer)
        })
        .collect()
}

fn choose_depth_format(
    instance: &ash::Instance,
    physical_device: vk::PhysicalDevice,
) -> RhiResult<vk::Format> {
    first_supported_format(&DEPTH_FORMAT_CANDIDATES, |format| {
        let props =
            unsafe { instance.get_physical_device_format_properties(physical_device, format) };
        props
            .optimal_tiling_features
            .contains(vk::FormatFeatureFlags::DEPTH_STENCIL_ATTACHMENT)
    })
    .ok_or_else(|| RhiError::SwapchainError("no supported depth format".to_string()))
}

/// First candidate format accepted by `supports`.
fn first_supported_format(
    candidates: &[vk::Format],
    mut supports: impl FnMut(vk::Format) -> bool,
) -> Option<vk::Format> {
    candidates.iter().copied().find(|&format| supports(format))
}

/// Prefer sRGB BGRA, fall back to UNORM BGRA, then whatever comes first.
fn choose_surface_format(formats: &[vk::SurfaceFormatKHR]) -> vk::SurfaceFormatKHR {
    formats
        .iter()
        .find(|f| {
            f.format == vk::Format::B8G8R8A8_SRGB
                && f.color_space == vk::ColorSpaceKHR::SRGB_NONLINEAR
        })
        .or_else(|| {
            formats
                .iter()
                .find(|f| f.format == vk::Format::B8G8R8A8_UNORM)
        })
        .or_else(|| formats.first())
        .copied()
        .unwrap_or(vk::SurfaceFormatKHR {
            format: vk::Format::B8G8R8A8_SRGB,
            color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
        })
}

/// Prefer mailbox (low latency without tearing), fall back to FIFO which is
/// always available.
fn choose_present_mode(modes: &[vk::PresentModeKHR]) -> vk::PresentModeKHR {
    if modes.contains(&vk::PresentModeKHR::MAILBOX) {
        vk::PresentModeKHR::MAILBOX
    } else {
        vk::PresentModeKHR::FIFO
    }
}

/// Use the surface's fixed extent when it has one, otherwise clamp the
/// requested size to the supported range.
fn choose_extent(
    capabilities: &vk::SurfaceCapabilitiesKHR,
    width: u32,
    height: u32,
) -> vk::Extent2D {
    if capabilities.current_extent.width != u32::MAX {
        return capabilities.current_extent;
    }
    vk::Extent2D {
        width: width.clamp(
            capabilities.min_image_extent.width,
            capabilities.max_image_extent.width,
        ),
        height: height.clamp(
            capabilities.min_image_extent.height,
            capabilities.max_image_extent.height,
        ),
    }
}

/// One more than the minimum, capped by the maximum (0 means unlimited).
fn determine_image_count(capabilities: &vk::SurfaceCapabilitiesKHR) -> u32 {
    let mut count = capabilities.min_image_count + 1;
    if capabilities.max_image_count > 0 && count > capabilities.max_image_count {
        count = capabilities.max_image_count;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capabilities(
        min_count: u32,
        max_count: u32,
        current: vk::Extent2D,
        min_extent: vk::Extent2D,
        max_extent: vk::Extent2D,
    ) -> vk::SurfaceCapabilitiesKHR {
        vk::SurfaceCapabilitiesKHR {
            min_image_count: min_count,
            max_image_count: max_count,
            current_extent: current,
            min_image_extent: min_extent,
            max_image_extent: max_extent,
            ..Default::default()
        }
    }

    #[test]
    fn surface_format_prefers_srgb() {
        let formats = [
            vk::SurfaceFormatKHR {
                format: vk::Format::R8G8B8A8_UNORM,
                color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
            },
            vk::SurfaceFormatKHR {
                format: vk::Format::B8G8R8A8_SRGB,
                color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
            },
        ];
        assert_eq!(
            choose_surface_format(&formats).format,
            vk::Format::B8G8R8A8_SRGB
        );
    }

    #[test]
    fn surface_format_falls_back_to_unorm() {
        let formats = [
            vk::SurfaceFormatKHR {
                format: vk::Format::R16G16B16A16_SFLOAT,
                color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
            },
            vk::SurfaceFormatKHR {
                format: vk::Format::B8G8R8A8_UNORM,
                color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
            },
        ];
        assert_eq!(
            choose_surface_format(&formats).format,
            vk::Format::B8G8R8A8_UNORM
        );
    }

    #[test]
    fn surface_format_takes_first_when_nothing_matches() {
        let formats = [vk::SurfaceFormatKHR {
            format: vk::Format::R16G16B16A16_SFLOAT,
            color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
        }];
        assert_eq!(
            choose_surface_format(&formats).format,
            vk::Format::R16G16B16A16_SFLOAT
        );
    }

    #[test]
    fn present_mode_prefers_mailbox() {
        let modes = [vk::PresentModeKHR::FIFO, vk::PresentModeKHR::MAILBOX];
        assert_eq!(choose_present_mode(&modes), vk::PresentModeKHR::MAILBOX);
    }

    #[test]
    fn present_mode_falls_back_to_fifo() {
        let modes = [vk::PresentModeKHR::IMMEDIATE, vk::PresentModeKHR::FIFO];
        assert_eq!(choose_present_mode(&modes), vk::PresentModeKHR::FIFO);
    }

    #[test]
    fn extent_uses_current_when_fixed() {
        let caps = capabilities(
            2,
            8,
            vk::Extent2D {
                width: 800,
                height: 600,
            },
            vk::Extent2D {
                width: 1,
                height: 1,
            },
            vk::Extent2D {
                width: 4096,
                height: 4096,
            },
        );
        let extent = choose_extent(&caps, 1920, 1080);
        assert_eq!(extent.width, 800);
        assert_eq!(extent.height, 600);
    }

    #[test]
    fn extent_clamps_when_flexible() {
        let caps = capabilities(
            2,
            8,
            vk::Extent2D {
                width: u32::MAX,
                height: u32::MAX,
            },
            vk::Extent2D {
                width: 100,
                height: 100,
            },
            vk::Extent2D {
                width: 1000,
                height: 1000,
            },
        );
        let extent = choose_extent(&caps, 5000, 50);
        assert_eq!(extent.width, 1000);
        assert_eq!(extent.height, 100);
    }

    #[test]
    fn image_count_is_min_plus_one() {
        let caps = capabilities(
            2,
            0,
            vk::Extent2D::default(),
            vk::Extent2D::default(),
            vk::Extent2D::default(),
        );
        assert_eq!(determine_image_count(&caps), 3);
    }

    #[test]
    fn image_count_respects_maximum() {
        let caps = capabilities(
            3,
            3,
            vk::Extent2D::default(),
            vk::Extent2D::default(),
            vk::Extent2D::default(),
        );
        assert_eq!(determine_image_count(&caps), 3);
    }

    #[test]
    fn depth_candidates_are_tried_in_order() {
        let picked = first_supported_format(&DEPTH_FORMAT_CANDIDATES, |format| {
            format == vk::Format::D24_UNORM_S8_UINT
        });
        assert_eq!(picked, Some(vk::Format::D24_UNORM_S8_UINT));

        let picked = first_supported_format(&DEPTH_FORMAT_CANDIDATES, |_| true);
        assert_eq!(picked, Some(vk::Format::D32_SFLOAT));

        assert_eq!(first_supported_format(&DEPTH_FORMAT_CANDIDATES, |_| false), None);
    }

    #[test]
    fn acquire_results_compare() {
        assert_eq!(
            ImageAcquire::Acquired {
                image_index: 1,
                suboptimal: false
            },
            ImageAcquire::Acquired {
                image_index: 1,
                suboptimal: false
            }
        );
        assert_ne!(PresentStatus::Optimal, PresentStatus::OutOfDate);
    }
}
