//! Physical device selection.

use ash::vk;
use tracing::{debug, info};

use crate::{RhiError, RhiResult};

/// Queue families required for rendering and presentation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct QueueFamilyIndices {
    pub graphics: Option<u32>,
    pub present: Option<u32>,
}

impl QueueFamilyIndices {
    pub fn is_complete(&self) -> bool {
        self.graphics.is_some() && self.present.is_some()
    }

    /// Deduplicated list of the required family indices.
    pub fn unique_families(&self) -> Vec<u32> {
        match (self.graphics, self.present) {
            (Some(g), Some(p)) if g == p => vec![g],
            (Some(g), Some(p)) => vec![g, p],
            (Some(g), None) => vec![g],
            (None, Some(p)) => vec![p],
            (None, None) => Vec::new(),
        }
    }
}

/// A selected physical device and its cached properties.
pub struct PhysicalDeviceInfo {
    pub device: vk::PhysicalDevice,
    pub properties: vk::PhysicalDeviceProperties,
    pub memory_properties: vk::PhysicalDeviceMemoryProperties,
    pub queue_families: QueueFamilyIndices,
}

impl PhysicalDeviceInfo {
    pub fn device_name(&self) -> String {
        self.properties
            .device_name_as_c_str()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|_| "Unknown".to_string())
    }

    /// Total device-local VRAM in bytes.
    pub fn device_local_memory(&self) -> u64 {
        self.memory_properties
            .memory_heaps
            .iter()
            .take(self.memory_properties.memory_heap_count as usize)
            .filter(|heap| heap.flags.contains(vk::MemoryHeapFlags::DEVICE_LOCAL))
            .map(|heap| heap.size)
            .sum()
    }
}

/// Pick the best physical device that can render to the given surface.
pub fn select_physical_device(
    instance: &ash::Instance,
    surface_loader: &ash::khr::surface::Instance,
    surface: vk::SurfaceKHR,
) -> RhiResult<PhysicalDeviceInfo> {
    let devices = unsafe { instance.enumerate_physical_devices()? };

    let mut best: Option<(u64, PhysicalDeviceInfo)> = None;
    for device in devices {
        let queue_families = find_queue_families(instance, surface_loader, surface, device)?;
        if !queue_families.is_complete() {
            continue;
        }
        if !supports_swapchain_extension(instance, device) {
            continue;
        }

        let properties = unsafe { instance.get_physical_device_properties(device) };
        let memory_properties = unsafe { instance.get_physical_device_memory_properties(device) };
        let info = PhysicalDeviceInfo {
            device,
            properties,
            memory_properties,
            queue_families,
        };

        let score = rate_device(&info);
        debug!(name = %info.device_name(), score, "Rated physical device");

        let better = match &best {
            Some((best_score, _)) => score > *best_score,
            None => true,
        };
        if better {
            best = Some((score, info));
        }
    }

    let (_, info) = best.ok_or(RhiError::NoSuitableGpu)?;
    info!(name = %info.device_name(), "Selected physical device");
    Ok(info)
}

fn rate_device(info: &PhysicalDeviceInfo) -> u64 {
    let mut score: u64 = 0;

    if info.properties.device_type == vk::PhysicalDeviceType::DISCRETE_GPU {
        score += 10_000;
    } else if info.properties.device_type == vk::PhysicalDeviceType::INTEGRATED_GPU {
        score += 1_000;
    }

    score += u64::from(info.properties.limits.max_image_dimension2_d);

    // VRAM in MiB, capped so one huge heap cannot outweigh device type.
    score += (info.device_local_memory() / (1024 * 1024)).min(16_000);

    score
}

fn find_queue_families(
    instance: &ash::Instance,
    surface_loader: &ash::khr::surface::Instance,
    surface: vk::SurfaceKHR,
    device: vk::PhysicalDevice,
) -> RhiResult<QueueFamilyIndices> {
    let families = unsafe { instance.get_physical_device_queue_family_properties(device) };

    let mut indices = QueueFamilyIndices::default();
    for (index, family) in families.iter().enumerate() {
        let index = index as u32;

        if indices.graphics.is_none()
            && family.queue_flags.contains(vk::QueueFlags::GRAPHICS)
            && family.queue_count > 0
        {
            indices.graphics = Some(index);
        }

        if indices.present.is_none() {
            let supported = unsafe {
                surface_loader.get_physical_device_surface_support(device, index, surface)?
            };
            if supported {
                indices.present = Some(index);
            }
        }

        if indices.is_complete() {
            break;
        }
    }

    Ok(indices)
}

fn supports_swapchain_extension(instance: &ash::Instance, device: vk::PhysicalDevice) -> bool {
    let extensions = match unsafe { instance.enumerate_device_extension_properties(device) } {
        Ok(extensions) => extensions,
        Err(_) => return false,
    };
    extensions.iter().any(|ext| {
        ext.extension_name_as_c_str()
            .is_ok_and(|name| name == ash::khr::swapchain::NAME)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incomplete_families_are_reported() {
        let indices = QueueFamilyIndices {
            graphics: Some(0),
            present: None,
        };
        assert!(!indices.is_complete());
    }

    #[test]
    fn shared_family_is_deduplicated() {
        let indices = QueueFamilyIndices {
            graphics: Some(0),
            present: Some(0),
        };
        assert_eq!(indices.unique_families(), vec![0]);
    }

    #[test]
    fn distinct_families_are_kept() {
        let indices = QueueFamilyIndices {
            graphics: Some(0),
            present: Some(2),
        };
        assert_eq!(indices.unique_families(), vec![0, 2]);
    }

    #[test]
    fn empty_families_yield_nothing() {
        assert!(QueueFamilyIndices::default().unique_families().is_empty());
    }
}
