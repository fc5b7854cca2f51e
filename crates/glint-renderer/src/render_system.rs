//! Draw dispatch: push-constant data and pipeline-bound rendering.
//!
//! Dispatch is split in two: [`build_draw_list`] is pure and turns the
//! object store into an ordered list of draw calls, then
//! [`RenderSystem::render`] records them against the bound pipeline.

use std::path::Path;
use std::sync::Arc;

use ash::vk;
use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use tracing::warn;

use glint_rhi::RhiResult;
use glint_rhi::device::Device;
use glint_rhi::pipeline::{CullMode, GraphicsPipelineBuilder, Pipeline, PipelineLayout};
use glint_rhi::shader::{Shader, ShaderStage};
use glint_rhi::vertex::Vertex;
use glint_scene::{ModelHandle, ObjectId, ObjectStore, Transform};

use crate::model::ModelArena;

/// Push constants for flat 2D rendering: column-major 2x2 transform,
/// screen offset, and tint color, padded to std430 rules.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct FlatPush {
    pub transform: [f32; 4],
    pub offset: [f32; 2],
    _pad0: [f32; 2],
    pub color: [f32; 3],
    _pad1: f32,
}

impl FlatPush {
    pub fn new(transform: [f32; 4], offset: [f32; 2], color: [f32; 3]) -> Self {
        Self {
            transform,
            offset,
            _pad0: [0.0; 2],
            color,
            _pad1: 0.0,
        }
    }
}

/// Push constants for 3D mesh rendering: model and normal matrices.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct MeshPush {
    pub model: Mat4,
    pub normal: Mat4,
}

/// Which push-constant layout a render system drives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PushKind {
    Flat,
    Mesh,
}

impl PushKind {
    pub fn size(self) -> u32 {
        match self {
            PushKind::Flat => std::mem::size_of::<FlatPush>() as u32,
            PushKind::Mesh => std::mem::size_of::<MeshPush>() as u32,
        }
    }
}

/// Push data for one draw call.
#[derive(Clone, Copy, Debug)]
pub enum PushData {
    Flat(FlatPush),
    Mesh(MeshPush),
}

impl PushData {
    pub fn bytes(&self) -> &[u8] {
        match self {
            PushData::Flat(push) => bytemuck::bytes_of(push),
            PushData::Mesh(push) => bytemuck::bytes_of(push),
        }
    }
}

/// One recorded draw: the object it came from, the model to bind, and the
/// constants to push.
#[derive(Clone, Copy, Debug)]
pub struct DrawCall {
    pub object: ObjectId,
    pub model: ModelHandle,
    pub push: PushData,
}

/// Build the ordered draw list for a store.
///
/// Objects are visited in creation order; objects without a model are
/// skipped. The result has exactly one call per model-bearing object.
pub fn build_draw_list(store: &ObjectStore, kind: PushKind) -> Vec<DrawCall> {
    store
        .iter()
        .filter_map(|object| {
            let model = object.model?;
            let push = match kind {
                PushKind::Flat => PushData::Flat(FlatPush::new(
                    flat_transform(&object.transform),
                    [object.transform.translation.x, object.transform.translation.y],
                    object.color.to_array(),
                )),
                PushKind::Mesh => PushData::Mesh(MeshPush {
                    model: object.transform.matrix(),
                    normal: object.transform.normal_matrix(),
                }),
            };
            Some(DrawCall {
                object: object.id(),
                model,
                push,
            })
        })
        .collect()
}

/// Column-major 2x2 built from Z rotation and XY scale.
fn flat_transform(transform: &Transform) -> [f32; 4] {
    let (sin, cos) = transform.rotation.z.sin_cos();
    let scale = transform.scale;
    [cos * scale.x, sin * scale.x, -sin * scale.y, cos * scale.y]
}

/// A pipeline plus its layout, dispatching draw lists of one push kind.
pub struct RenderSystem {
    device: Arc<Device>,
    pipeline_layout: PipelineLayout,
    pipeline: Pipeline,
    kind: PushKind,
}

impl RenderSystem {
    pub fn new(
        device: Arc<Device>,
        render_pass: vk::RenderPass,
        set_layouts: &[vk::DescriptorSetLayout],
        kind: PushKind,
        vertex_shader_path: impl AsRef<Path>,
        fragment_shader_path: impl AsRef<Path>,
    ) -> RhiResult<Self> {
        let vertex_shader =
            Shader::from_spirv_file(device.clone(), ShaderStage::Vertex, vertex_shader_path)?;
        let fragment_shader =
            Shader::from_spirv_file(device.clone(), ShaderStage::Fragment, fragment_shader_path)?;

        let push_range = vk::PushConstantRange::default()
            .stage_flags(vk::ShaderStageFlags::VERTEX | vk::ShaderStageFlags::FRAGMENT)
            .offset(0)
            .size(kind.size());

        let pipeline_layout = PipelineLayout::new(device.clone(), set_layouts, &[push_range])?;

        let pipeline = GraphicsPipelineBuilder::new()
            .vertex_shader(&vertex_shader)
            .fragment_shader(&fragment_shader)
            .vertex_input(
                vec![Vertex::binding_description()],
                Vertex::attribute_descriptions().to_vec(),
            )
            .cull_mode(CullMode::None)
            .render_pass(render_pass, 0)
            .build(device.clone(), pipeline_layout.handle())?;

        Ok(Self {
            device,
            pipeline_layout,
            pipeline,
            kind,
        })
    }

    /// Record draws for every model-bearing object in the store.
    pub fn render(
        &self,
        cmd: vk::CommandBuffer,
        store: &ObjectStore,
        arena: &ModelArena,
        global_set: Option<vk::DescriptorSet>,
    ) {
        let device = self.device.handle();
        unsafe {
            device.cmd_bind_pipeline(cmd, vk::PipelineBindPoint::GRAPHICS, self.pipeline.handle());
            if let Some(set) = global_set {
                device.cmd_bind_descriptor_sets(
                    cmd,
                    vk::PipelineBindPoint::GRAPHICS,
                    self.pipeline_layout.handle(),
                    0,
                    &[set],
                    &[],
                );
            }
        }

        for call in build_draw_list(store, self.kind) {
            let Some(model) = arena.get(call.model) else {
                warn!(object = %call.object, "skipping draw with dangling model handle");
                continue;
            };
            unsafe {
                device.cmd_push_constants(
                    cmd,
                    self.pipeline_layout.handle(),
                    vk::ShaderStageFlags::VERTEX | vk::ShaderStageFlags::FRAGMENT,
                    0,
                    call.push.bytes(),
                );
            }
            model.bind(cmd);
            model.draw(cmd);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn push_sizes_match_shader_expectations() {
        assert_eq!(PushKind::Flat.size(), 48);
        assert_eq!(PushKind::Mesh.size(), 128);
    }

    #[test]
    fn draw_list_preserves_store_order() {
        let mut store = ObjectStore::new();
        let handle = ModelHandle::from_raw(0);
        let mut expected = Vec::new();
        for _ in 0..4 {
            let object = store.spawn();
            object.model = Some(handle);
            expected.push(object.id());
        }

        let calls = build_draw_list(&store, PushKind::Mesh);
        assert_eq!(calls.len(), 4);
        let order: Vec<ObjectId> = calls.iter().map(|call| call.object).collect();
        assert_eq!(order, expected);
    }

    #[test]
    fn draw_list_skips_objects_without_models() {
        let mut store = ObjectStore::new();
        store.spawn();
        store.spawn().model = Some(ModelHandle::from_raw(7));
        store.spawn();

        let calls = build_draw_list(&store, PushKind::Mesh);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].model, ModelHandle::from_raw(7));
    }

    #[test]
    fn two_objects_can_share_one_model() {
        let mut store = ObjectStore::new();
        let shared = ModelHandle::from_raw(1);
        store.spawn().model = Some(shared);
        store.spawn().model = Some(shared);

        let calls = build_draw_list(&store, PushKind::Mesh);
        assert_eq!(calls.len(), 2);
        assert!(calls.iter().all(|call| call.model == shared));
        assert_ne!(calls[0].object, calls[1].object);
    }

    #[test]
    fn mesh_push_carries_object_transform() {
        let mut store = ObjectStore::new();
        let object = store.spawn();
        object.model = Some(ModelHandle::from_raw(0));
        object.transform.translation = Vec3::new(1.0, 2.0, 3.0);

        let calls = build_draw_list(&store, PushKind::Mesh);
        let PushData::Mesh(push) = calls[0].push else {
            panic!("expected mesh push data");
        };
        assert_eq!(push.model.w_axis.truncate(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn flat_transform_rotates_and_scales() {
        let transform = Transform::new()
            .with_rotation(Vec3::new(0.0, 0.0, std::f32::consts::FRAC_PI_2))
            .with_scale(Vec3::new(2.0, 3.0, 1.0));
        let m = flat_transform(&transform);
        let expected = [0.0, 2.0, -3.0, 0.0];
        for (a, b) in m.iter().zip(expected.iter()) {
            assert!((a - b).abs() < 1e-5, "{m:?} != {expected:?}");
        }
    }

    #[test]
    fn flat_push_is_48_bytes_with_color_at_32() {
        assert_eq!(std::mem::size_of::<FlatPush>(), 48);
        assert_eq!(std::mem::offset_of!(FlatPush, offset), 16);
        assert_eq!(std::mem::offset_of!(FlatPush, color), 32);
    }
}
