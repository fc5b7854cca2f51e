//! Application state: device bring-up, scene setup, and the per-frame
//! update/draw split.

use anyhow::Context;
use ash::vk;
use glam::{Vec3, Vec4};
use tracing::{info, warn};

use glint_assets::MeshData;
use glint_platform::{InputState, Surface, Window};
use glint_renderer::{
    FrameRenderer, GlobalUbo, MAX_FRAMES_IN_FLIGHT, Model, ModelArena, PushKind, RenderSystem,
};
use glint_rhi::buffer::{Buffer, BufferUsage};
use glint_rhi::command::CommandPool;
use glint_rhi::descriptor::{DescriptorPool, DescriptorSetLayout, DescriptorWriter};
use glint_rhi::device::Device;
use glint_rhi::instance::Instance;
use glint_rhi::physical_device::select_physical_device;
use glint_scene::{Camera, ObjectStore, Transform};

use crate::controller::CameraController;

const MESH_VERT_SPV: &str = "shaders/mesh.vert.spv";
const MESH_FRAG_SPV: &str = "shaders/mesh.frag.spv";
const CUBE_OBJ: &str = "assets/models/cube.obj";

/// The rendering sandbox: a spinning pair of cubes sharing one mesh, an
/// optional OBJ-loaded model, and a free-flying camera.
///
/// Field order is load-bearing: GPU resources are declared before the
/// device, and the surface before the instance, so teardown runs in
/// dependency order.
pub struct Sandbox {
    render_system: RenderSystem,
    global_sets: Vec<vk::DescriptorSet>,
    ubo_buffers: Vec<Buffer>,
    #[allow(dead_code)]
    descriptor_pool: DescriptorPool,
    #[allow(dead_code)]
    global_layout: DescriptorSetLayout,
    arena: ModelArena,
    store: ObjectStore,
    camera: Camera,
    camera_pose: Transform,
    controller: CameraController,
    renderer: FrameRenderer,
    #[allow(dead_code)]
    upload_pool: CommandPool,
    device: std::sync::Arc<Device>,
    #[allow(dead_code)]
    surface: Surface,
    #[allow(dead_code)]
    instance: Instance,
}

impl Sandbox {
    pub fn new(window: &Window) -> anyhow::Result<Self> {
        let extensions = glint_platform::window::required_extensions(window)?;
        let instance = Instance::new(&extensions, cfg!(debug_assertions))?;
        let surface = window.create_surface(instance.entry(), instance.handle())?;

        let physical_device =
            select_physical_device(instance.handle(), surface.loader(), surface.handle())?;
        let device = Device::new(&instance, &physical_device)?;

        let renderer = FrameRenderer::new(
            &instance,
            device.clone(),
            surface.loader(),
            surface.handle(),
            window.extent(),
        )?;
        let upload_pool = CommandPool::new_transient(device.clone(), device.graphics_family())?;

        let global_layout = DescriptorSetLayout::builder()
            .add_binding(
                0,
                vk::DescriptorType::UNIFORM_BUFFER,
                1,
                vk::ShaderStageFlags::VERTEX | vk::ShaderStageFlags::FRAGMENT,
            )
            .build(device.clone())?;
        let descriptor_pool = DescriptorPool::builder()
            .add_pool_size(vk::DescriptorType::UNIFORM_BUFFER, MAX_FRAMES_IN_FLIGHT as u32)
            .max_sets(MAX_FRAMES_IN_FLIGHT as u32)
            .build(device.clone())?;

        let mut ubo_buffers = Vec::with_capacity(MAX_FRAMES_IN_FLIGHT);
        let mut global_sets = Vec::with_capacity(MAX_FRAMES_IN_FLIGHT);
        for _ in 0..MAX_FRAMES_IN_FLIGHT {
            let buffer = Buffer::new(
                device.clone(),
                BufferUsage::Uniform,
                std::mem::size_of::<GlobalUbo>() as u64,
            )?;
            let set = DescriptorWriter::new(&global_layout, &descriptor_pool)
                .write_buffer(0, buffer.descriptor_info())
                .build(&device)?
                .context("descriptor pool exhausted during startup")?;
            ubo_buffers.push(buffer);
            global_sets.push(set);
        }

        let render_system = RenderSystem::new(
            device.clone(),
            renderer.render_pass(),
            &[global_layout.handle()],
            PushKind::Mesh,
            MESH_VERT_SPV,
            MESH_FRAG_SPV,
        )?;

        let (arena, store) = Self::build_scene(&device, &upload_pool)?;

        info!(objects = store.len(), models = arena.len(), "Scene ready");

        Ok(Self {
            render_system,
            global_sets,
            ubo_buffers,
            descriptor_pool,
            global_layout,
            arena,
            store,
            camera: Camera::new(),
            camera_pose: Transform::default(),
            controller: CameraController::new(),
            renderer,
            upload_pool,
            device,
            surface,
            instance,
        })
    }

    fn build_scene(
        device: &std::sync::Arc<Device>,
        upload_pool: &CommandPool,
    ) -> anyhow::Result<(ModelArena, ObjectStore)> {
        let mut arena = ModelArena::new();
        let mut store = ObjectStore::new();

        // Two objects sharing a single cube upload.
        let cube = Model::new(device.clone(), upload_pool, &MeshData::unit_cube())?;
        let cube_handle = arena.insert(cube);

        let left = store.spawn();
        left.model = Some(cube_handle);
        left.transform.translation = Vec3::new(-1.0, 0.0, -2.5);
        left.transform.scale = Vec3::splat(0.6);

        let right = store.spawn();
        right.model = Some(cube_handle);
        right.transform.translation = Vec3::new(1.0, 0.0, -2.5);
        right.transform.scale = Vec3::splat(0.6);
        right.transform.rotation = Vec3::new(0.4, 0.8, 0.0);

        // Exercise the OBJ path when the asset is present.
        match MeshData::load_obj(CUBE_OBJ) {
            Ok(mesh) => {
                let model = Model::new(device.clone(), upload_pool, &mesh)?;
                let handle = arena.insert(model);
                let object = store.spawn();
                object.model = Some(handle);
                object.transform.translation = Vec3::new(0.0, 1.2, -2.5);
                object.transform.scale = Vec3::splat(0.35);
                object.color = Vec3::new(0.9, 0.5, 0.2);
            }
            Err(e) => warn!("skipping OBJ model: {e}"),
        }

        Ok((arena, store))
    }

    /// Advance simulation state. Runs before any command recording.
    pub fn update(&mut self, dt: f32, input: &InputState) {
        self.controller.update(input, dt, &mut self.camera_pose);
        self.camera
            .set_view_yxz(self.camera_pose.translation, self.camera_pose.rotation);

        for object in self.store.iter_mut() {
            object.transform.rotation.y += 0.5 * dt;
            object.transform.rotation.x += 0.25 * dt;
        }
    }

    /// Record and present one frame. Skips cleanly when no image is
    /// available.
    pub fn draw(&mut self, window: &mut Window) -> anyhow::Result<()> {
        self.camera.set_perspective(
            50f32.to_radians(),
            self.renderer.aspect_ratio(),
            0.1,
            100.0,
        );

        let Some(cmd) = self.renderer.begin_frame(window)? else {
            return Ok(());
        };
        let frame = self.renderer.frame_index();

        let ubo = GlobalUbo {
            projection_view: self.camera.projection_view(),
            light_direction: Vec4::new(1.0, -3.0, -1.0, 0.0).normalize_or_zero(),
        };
        self.ubo_buffers[frame].write_data(0, bytemuck::bytes_of(&ubo))?;

        self.renderer.begin_render_pass(cmd);
        self.render_system.render(
            cmd,
            &self.store,
            &self.arena,
            Some(self.global_sets[frame]),
        );
        self.renderer.end_render_pass(cmd);
        self.renderer.end_frame(window)?;

        Ok(())
    }
}

impl Drop for Sandbox {
    fn drop(&mut self) {
        // GPU work may still reference the resources about to drop.
        if let Err(e) = self.device.wait_idle() {
            warn!("wait_idle failed during shutdown: {e}");
        }
    }
}
