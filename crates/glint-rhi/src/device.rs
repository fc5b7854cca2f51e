//! Logical device and GPU memory allocator.

use std::mem::ManuallyDrop;
use std::sync::{Arc, Mutex, MutexGuard};

use ash::vk;
use gpu_allocator::vulkan::{Allocation, AllocationCreateDesc, Allocator, AllocatorCreateDesc};
use tracing::{debug, info, warn};

use crate::RhiResult;
use crate::instance::Instance;
use crate::physical_device::PhysicalDeviceInfo;

/// Logical device, queues, and the GPU memory allocator.
///
/// Shared as `Arc<Device>` by every resource wrapper; the device is
/// destroyed only after all resources holding it are dropped.
pub struct Device {
    device: ash::Device,
    physical_device: vk::PhysicalDevice,
    allocator: ManuallyDrop<Mutex<Allocator>>,
    graphics_queue: vk::Queue,
    present_queue: vk::Queue,
    graphics_family: u32,
    present_family: u32,
}

impl Device {
    /// Create the logical device for a selected physical device.
    pub fn new(instance: &Instance, info: &PhysicalDeviceInfo) -> RhiResult<Arc<Self>> {
        let graphics_family = info
            .queue_families
            .graphics
            .ok_or(crate::RhiError::NoSuitableGpu)?;
        let present_family = info
            .queue_families
            .present
            .ok_or(crate::RhiError::NoSuitableGpu)?;

        let priorities = [1.0_f32];
        let queue_infos: Vec<vk::DeviceQueueCreateInfo> = info
            .queue_families
            .unique_families()
            .into_iter()
            .map(|family| {
                vk::DeviceQueueCreateInfo::default()
                    .queue_family_index(family)
                    .queue_priorities(&priorities)
            })
            .collect();

        let extensions = [ash::khr::swapchain::NAME.as_ptr()];
        let features = vk::PhysicalDeviceFeatures::default();

        let create_info = vk::DeviceCreateInfo::default()
            .queue_create_infos(&queue_infos)
            .enabled_extension_names(&extensions)
            .enabled_features(&features);

        let device = unsafe {
            instance
                .handle()
                .create_device(info.device, &create_info, None)?
        };

        let graphics_queue = unsafe { device.get_device_queue(graphics_family, 0) };
        let present_queue = unsafe { device.get_device_queue(present_family, 0) };

        let allocator = Allocator::new(&AllocatorCreateDesc {
            instance: instance.handle().clone(),
            device: device.clone(),
            physical_device: info.device,
            debug_settings: Default::default(),
            buffer_device_address: false,
            allocation_sizes: Default::default(),
        })?;

        info!(
            name = %info.device_name(),
            graphics_family,
            present_family,
            "Created logical device"
        );

        Ok(Arc::new(Self {
            device,
            physical_device: info.device,
            allocator: ManuallyDrop::new(Mutex::new(allocator)),
            graphics_queue,
            present_queue,
            graphics_family,
            present_family,
        }))
    }

    #[inline]
    pub fn handle(&self) -> &ash::Device {
        &self.device
    }

    #[inline]
    pub fn physical_device(&self) -> vk::PhysicalDevice {
        self.physical_device
    }

    #[inline]
    pub fn graphics_queue(&self) -> vk::Queue {
        self.graphics_queue
    }

    #[inline]
    pub fn present_queue(&self) -> vk::Queue {
        self.present_queue
    }

    #[inline]
    pub fn graphics_family(&self) -> u32 {
        self.graphics_family
    }

    #[inline]
    pub fn present_family(&self) -> u32 {
        self.present_family
    }

    fn lock_allocator(&self) -> MutexGuard<'_, Allocator> {
        // A poisoned lock only means another thread panicked mid-allocation;
        // the allocator itself is still consistent enough to keep using.
        self.allocator
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Allocate GPU memory.
    pub fn allocate(&self, desc: &AllocationCreateDesc<'_>) -> RhiResult<Allocation> {
        Ok(self.lock_allocator().allocate(desc)?)
    }

    /// Return GPU memory to the allocator.
    pub fn free(&self, allocation: Allocation) -> RhiResult<()> {
        self.lock_allocator().free(allocation)?;
        Ok(())
    }

    /// Block until the device is idle.
    pub fn wait_idle(&self) -> RhiResult<()> {
        unsafe {
            self.device.device_wait_idle()?;
        }
        Ok(())
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        debug!("Destroying device");
        if let Err(e) = self.wait_idle() {
            warn!("wait_idle failed during device teardown: {e}");
        }
        unsafe {
            // The allocator frees its memory blocks against the live device,
            // so it must go first.
            ManuallyDrop::drop(&mut self.allocator);
            self.device.destroy_device(None);
        }
    }
}

// SAFETY: the raw device and queues are externally synchronized by the
// renderer (single submission thread); the allocator is behind a Mutex.
unsafe impl Send for Device {}
unsafe impl Sync for Device {}
