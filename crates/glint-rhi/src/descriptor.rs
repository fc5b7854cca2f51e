//! Descriptor set layouts, pools, and writes.
//!
//! Layouts are built through a builder that records every binding, so later
//! writes can be validated against the declared layout. Pool exhaustion is a
//! recoverable condition surfaced as `Ok(None)`, not an error.

use std::collections::HashMap;
use std::sync::Arc;

use ash::vk;
use tracing::{debug, warn};

use crate::RhiResult;
use crate::device::Device;

/// A descriptor set layout that remembers its bindings.
pub struct DescriptorSetLayout {
    device: Arc<Device>,
    layout: vk::DescriptorSetLayout,
    bindings: HashMap<u32, vk::DescriptorSetLayoutBinding<'static>>,
}

impl DescriptorSetLayout {
    pub fn builder() -> DescriptorSetLayoutBuilder {
        DescriptorSetLayoutBuilder::default()
    }

    #[inline]
    pub fn handle(&self) -> vk::DescriptorSetLayout {
        self.layout
    }

    pub fn binding(&self, index: u32) -> Option<&vk::DescriptorSetLayoutBinding<'static>> {
        self.bindings.get(&index)
    }
}

impl Drop for DescriptorSetLayout {
    fn drop(&mut self) {
        unsafe {
            self.device
                .handle()
                .destroy_descriptor_set_layout(self.layout, None);
        }
    }
}

/// Builder for [`DescriptorSetLayout`].
#[derive(Default)]
pub struct DescriptorSetLayoutBuilder {
    bindings: HashMap<u32, vk::DescriptorSetLayoutBinding<'static>>,
}

impl DescriptorSetLayoutBuilder {
    /// Declare a binding. Panics if the binding index was already declared.
    pub fn add_binding(
        mut self,
        binding: u32,
        descriptor_type: vk::DescriptorType,
        count: u32,
        stage_flags: vk::ShaderStageFlags,
    ) -> Self {
        assert!(
            !self.bindings.contains_key(&binding),
            "binding {binding} already declared in this layout"
        );
        self.bindings.insert(
            binding,
            vk::DescriptorSetLayoutBinding::default()
                .binding(binding)
                .descriptor_type(descriptor_type)
                .descriptor_count(count)
                .stage_flags(stage_flags),
        );
        self
    }

    pub fn build(self, device: Arc<Device>) -> RhiResult<DescriptorSetLayout> {
        let flat: Vec<vk::DescriptorSetLayoutBinding<'_>> =
            self.bindings.values().copied().collect();
        let create_info = vk::DescriptorSetLayoutCreateInfo::default().bindings(&flat);

        let layout = unsafe {
            device
                .handle()
                .create_descriptor_set_layout(&create_info, None)?
        };
        debug!(bindings = self.bindings.len(), "Created descriptor set layout");

        Ok(DescriptorSetLayout {
            device,
            layout,
            bindings: self.bindings,
        })
    }
}

/// A fixed-size descriptor pool.
pub struct DescriptorPool {
    device: Arc<Device>,
    pool: vk::DescriptorPool,
}

impl DescriptorPool {
    pub fn builder() -> DescriptorPoolBuilder {
        DescriptorPoolBuilder::default()
    }

    /// Allocate one set with the given layout.
    ///
    /// Returns `Ok(None)` when the pool is exhausted or too fragmented;
    /// callers decide whether that is fatal.
    pub fn try_allocate(
        &self,
        layout: vk::DescriptorSetLayout,
    ) -> RhiResult<Option<vk::DescriptorSet>> {
        let layouts = [layout];
        let alloc_info = vk::DescriptorSetAllocateInfo::default()
            .descriptor_pool(self.pool)
            .set_layouts(&layouts);

        match unsafe { self.device.handle().allocate_descriptor_sets(&alloc_info) } {
            Ok(sets) => Ok(sets.into_iter().next()),
            Err(vk::Result::ERROR_OUT_OF_POOL_MEMORY | vk::Result::ERROR_FRAGMENTED_POOL) => {
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Return every set allocated from this pool to it.
    pub fn reset(&self) -> RhiResult<()> {
        unsafe {
            self.device
                .handle()
                .reset_descriptor_pool(self.pool, vk::DescriptorPoolResetFlags::empty())?;
        }
        Ok(())
    }

    #[inline]
    pub fn handle(&self) -> vk::DescriptorPool {
        self.pool
    }
}

impl Drop for DescriptorPool {
    fn drop(&mut self) {
        unsafe {
            self.device.handle().destroy_descriptor_pool(self.pool, None);
        }
    }
}

/// Builder for [`DescriptorPool`].
#[derive(Default)]
pub struct DescriptorPoolBuilder {
    pool_sizes: Vec<vk::DescriptorPoolSize>,
    max_sets: u32,
    flags: vk::DescriptorPoolCreateFlags,
}

impl DescriptorPoolBuilder {
    pub fn add_pool_size(mut self, descriptor_type: vk::DescriptorType, count: u32) -> Self {
        self.pool_sizes.push(vk::DescriptorPoolSize {
            ty: descriptor_type,
            descriptor_count: count,
        });
        self
    }

    pub fn max_sets(mut self, max_sets: u32) -> Self {
        self.max_sets = max_sets;
        self
    }

    pub fn flags(mut self, flags: vk::DescriptorPoolCreateFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn build(self, device: Arc<Device>) -> RhiResult<DescriptorPool> {
        let create_info = vk::DescriptorPoolCreateInfo::default()
            .pool_sizes(&self.pool_sizes)
            .max_sets(self.max_sets)
            .flags(self.flags);

        let pool = unsafe { device.handle().create_descriptor_pool(&create_info, None)? };
        debug!(max_sets = self.max_sets, "Created descriptor pool");

        Ok(DescriptorPool { device, pool })
    }
}

enum WriteInfo {
    Buffer(vk::DescriptorBufferInfo),
    Image(vk::DescriptorImageInfo),
}

struct PendingWrite {
    binding: u32,
    descriptor_type: vk::DescriptorType,
    info: WriteInfo,
}

/// Stages descriptor writes against a layout and flushes them in one call.
pub struct DescriptorWriter<'a> {
    layout: &'a DescriptorSetLayout,
    pool: &'a DescriptorPool,
    writes: Vec<PendingWrite>,
}

impl<'a> DescriptorWriter<'a> {
    pub fn new(layout: &'a DescriptorSetLayout, pool: &'a DescriptorPool) -> Self {
        Self {
            layout,
            pool,
            writes: Vec::new(),
        }
    }

    /// Stage a buffer write. Panics if the layout has no such binding or the
    /// binding expects more than one descriptor.
    pub fn write_buffer(mut self, binding: u32, info: vk::DescriptorBufferInfo) -> Self {
        let declared = expect_single_binding(&self.layout.bindings, binding);
        self.writes.push(PendingWrite {
            binding,
            descriptor_type: declared.descriptor_type,
            info: WriteInfo::Buffer(info),
        });
        self
    }

    /// Stage an image write. Same contract as [`Self::write_buffer`].
    pub fn write_image(mut self, binding: u32, info: vk::DescriptorImageInfo) -> Self {
        let declared = expect_single_binding(&self.layout.bindings, binding);
        self.writes.push(PendingWrite {
            binding,
            descriptor_type: declared.descriptor_type,
            info: WriteInfo::Image(info),
        });
        self
    }

    /// Allocate a set from the pool and apply the staged writes.
    ///
    /// `Ok(None)` means the pool is exhausted.
    pub fn build(&self, device: &Device) -> RhiResult<Option<vk::DescriptorSet>> {
        let Some(set) = self.pool.try_allocate(self.layout.handle())? else {
            warn!("descriptor pool exhausted");
            return Ok(None);
        };
        self.overwrite(device, set);
        Ok(Some(set))
    }

    /// Apply the staged writes to an existing set in one update call.
    pub fn overwrite(&self, device: &Device, set: vk::DescriptorSet) {
        let writes: Vec<vk::WriteDescriptorSet<'_>> = self
            .writes
            .iter()
            .map(|pending| {
                let write = vk::WriteDescriptorSet::default()
                    .dst_set(set)
                    .dst_binding(pending.binding)
                    .descriptor_type(pending.descriptor_type);
                match &pending.info {
                    WriteInfo::Buffer(info) => write.buffer_info(std::slice::from_ref(info)),
                    WriteInfo::Image(info) => write.image_info(std::slice::from_ref(info)),
                }
            })
            .collect();

        unsafe {
            device.handle().update_descriptor_sets(&writes, &[]);
        }
    }
}

/// Look up a binding that must exist and hold exactly one descriptor.
fn expect_single_binding<'b>(
    bindings: &'b HashMap<u32, vk::DescriptorSetLayoutBinding<'static>>,
    binding: u32,
) -> &'b vk::DescriptorSetLayoutBinding<'static> {
    let declared = bindings
        .get(&binding)
        .unwrap_or_else(|| panic!("layout has no binding {binding}"));
    assert!(
        declared.descriptor_count == 1,
        "binding {binding} expects {} descriptors, single writes are not allowed",
        declared.descriptor_count
    );
    declared
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform_binding(binding: u32, count: u32) -> vk::DescriptorSetLayoutBinding<'static> {
        vk::DescriptorSetLayoutBinding::default()
            .binding(binding)
            .descriptor_type(vk::DescriptorType::UNIFORM_BUFFER)
            .descriptor_count(count)
            .stage_flags(vk::ShaderStageFlags::VERTEX)
    }

    #[test]
    fn builder_records_bindings() {
        let builder = DescriptorSetLayout::builder()
            .add_binding(
                0,
                vk::DescriptorType::UNIFORM_BUFFER,
                1,
                vk::ShaderStageFlags::VERTEX,
            )
            .add_binding(
                1,
                vk::DescriptorType::COMBINED_IMAGE_SAMPLER,
                1,
                vk::ShaderStageFlags::FRAGMENT,
            );
        assert_eq!(builder.bindings.len(), 2);
        assert_eq!(
            builder.bindings[&1].descriptor_type,
            vk::DescriptorType::COMBINED_IMAGE_SAMPLER
        );
    }

    #[test]
    #[should_panic(expected = "binding 0 already declared")]
    fn duplicate_binding_panics() {
        let _ = DescriptorSetLayout::builder()
            .add_binding(
                0,
                vk::DescriptorType::UNIFORM_BUFFER,
                1,
                vk::ShaderStageFlags::VERTEX,
            )
            .add_binding(
                0,
                vk::DescriptorType::STORAGE_BUFFER,
                1,
                vk::ShaderStageFlags::VERTEX,
            );
    }

    #[test]
    fn declared_single_binding_is_accepted() {
        let mut bindings = HashMap::new();
        bindings.insert(0, uniform_binding(0, 1));
        let declared = expect_single_binding(&bindings, 0);
        assert_eq!(declared.descriptor_type, vk::DescriptorType::UNIFORM_BUFFER);
    }

    #[test]
    #[should_panic(expected = "layout has no binding 3")]
    fn missing_binding_panics() {
        let mut bindings = HashMap::new();
        bindings.insert(0, uniform_binding(0, 1));
        expect_single_binding(&bindings, 3);
    }

    #[test]
    #[should_panic(expected = "expects 4 descriptors")]
    fn array_binding_rejects_single_write() {
        let mut bindings = HashMap::new();
        bindings.insert(2, uniform_binding(2, 4));
        expect_single_binding(&bindings, 2);
    }
}
