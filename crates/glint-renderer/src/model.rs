//! GPU models and the arena that owns them.

use std::collections::HashMap;
use std::sync::Arc;

use ash::vk;
use tracing::debug;

use glint_assets::MeshData;
use glint_rhi::RhiResult;
use glint_rhi::buffer::{Buffer, BufferUsage};
use glint_rhi::command::CommandPool;
use glint_rhi::device::Device;
use glint_scene::ModelHandle;

/// Vertex and index buffers for one mesh, uploaded to device-local memory.
pub struct Model {
    device: Arc<Device>,
    vertex_buffer: Buffer,
    vertex_count: u32,
    index_buffer: Option<Buffer>,
    index_count: u32,
}

impl Model {
    /// Upload mesh data through a staging copy.
    ///
    /// Panics if the mesh holds fewer than three vertices.
    pub fn new(device: Arc<Device>, pool: &CommandPool, mesh: &MeshData) -> RhiResult<Self> {
        assert!(
            mesh.vertices.len() >= 3,
            "mesh must contain at least three vertices"
        );

        let vertex_bytes = bytemuck::cast_slice(&mesh.vertices);
        let vertex_buffer = Buffer::device_local_with_data(
            device.clone(),
            pool,
            BufferUsage::Vertex,
            vertex_bytes,
        )?;

        let (index_buffer, index_count) = if mesh.indices.is_empty() {
            (None, 0)
        } else {
            let index_bytes = bytemuck::cast_slice(&mesh.indices);
            let buffer = Buffer::device_local_with_data(
                device.clone(),
                pool,
                BufferUsage::Index,
                index_bytes,
            )?;
            (Some(buffer), mesh.indices.len() as u32)
        };

        debug!(
            vertices = mesh.vertices.len(),
            indices = index_count,
            "Uploaded model"
        );

        Ok(Self {
            device,
            vertex_buffer,
            vertex_count: mesh.vertices.len() as u32,
            index_buffer,
            index_count,
        })
    }

    /// Bind vertex (and index, when present) buffers.
    pub fn bind(&self, cmd: vk::CommandBuffer) {
        let buffers = [self.vertex_buffer.handle()];
        let offsets = [0_u64];
        unsafe {
            self.device
                .handle()
                .cmd_bind_vertex_buffers(cmd, 0, &buffers, &offsets);
            if let Some(index_buffer) = &self.index_buffer {
                self.device.handle().cmd_bind_index_buffer(
                    cmd,
                    index_buffer.handle(),
                    0,
                    vk::IndexType::UINT32,
                );
            }
        }
    }

    /// Issue the draw for this model. Indexed when an index buffer exists.
    pub fn draw(&self, cmd: vk::CommandBuffer) {
        unsafe {
            if self.index_buffer.is_some() {
                self.device
                    .handle()
                    .cmd_draw_indexed(cmd, self.index_count, 1, 0, 0, 0);
            } else {
                self.device.handle().cmd_draw(cmd, self.vertex_count, 1, 0, 0);
            }
        }
    }

    #[inline]
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    #[inline]
    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    #[inline]
    pub fn is_indexed(&self) -> bool {
        self.index_buffer.is_some()
    }
}

/// Owns uploaded models; scene objects reference them by handle so many
/// objects can share one upload.
#[derive(Default)]
pub struct ModelArena {
    models: HashMap<ModelHandle, Arc<Model>>,
    next_handle: u32,
}

impl ModelArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, model: Model) -> ModelHandle {
        let handle = ModelHandle::from_raw(self.next_handle);
        self.next_handle += 1;
        self.models.insert(handle, Arc::new(model));
        handle
    }

    pub fn get(&self, handle: ModelHandle) -> Option<&Arc<Model>> {
        self.models.get(&handle)
    }

    pub fn remove(&mut self, handle: ModelHandle) -> Option<Arc<Model>> {
        self.models.remove(&handle)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
