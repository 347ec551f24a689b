use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;

use crate::scene_graph::{Object3D, ObjectId, Scene};
use crate::tracking::ArDisplay;

/// Perspective camera whose clip planes come from the AR display. Its pose
/// lives on a scene node so objects can be parented to it.
pub struct ArCamera {
    pub node: ObjectId,
    fov_y: f32,
    aspect: f32,
    near: f32,
    far: f32,
    projection: Mat4,
}

impl ArCamera {
    /// Adds the camera node under the world root.
    pub fn new(scene: &mut Scene, display: &dyn ArDisplay, fov_y_degrees: f32, aspect: f32) -> Self {
        let root = scene.root();
        let node = scene.add_child(root, Object3D::named("Camera"));

        let mut camera = Self {
            node,
            fov_y: display.fov_y().unwrap_or(fov_y_degrees.to_radians()),
            aspect,
            near: display.depth_near(),
            far: display.depth_far(),
            projection: Mat4::IDENTITY,
        };
        camera.update_projection_matrix();
        camera
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn near(&self) -> f32 {
        self.near
    }

    pub fn far(&self) -> f32 {
        self.far
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
            self.update_projection_matrix();
        }
    }

    /// Pulls the clip planes and field of view from the display again, in
    /// case the device intrinsics changed.
    pub fn refresh_from_display(&mut self, display: &dyn ArDisplay) {
        self.near = display.depth_near();
        self.far = display.depth_far();
        if let Some(fov_y) = display.fov_y() {
            self.fov_y = fov_y;
        }
        self.update_projection_matrix();
    }

    fn update_projection_matrix(&mut self) {
        self.projection = Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far);
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn world_matrix(&self, scene: &Scene) -> Mat4 {
        scene.world_matrix(self.node)
    }

    pub fn view_matrix(&self, scene: &Scene) -> Mat4 {
        self.world_matrix(scene).inverse()
    }

    pub fn view_projection_matrix(&self, scene: &Scene) -> Mat4 {
        self.projection_matrix() * self.view_matrix(scene)
    }

    pub fn world_position(&self, scene: &Scene) -> Vec3 {
        self.world_matrix(scene).w_axis.truncate()
    }

    /// Normalized device coordinates to a world-space point.
    pub fn unproject(&self, scene: &Scene, ndc: Vec3) -> Vec3 {
        let view_space = self.projection.inverse().project_point3(ndc);
        self.world_matrix(scene).transform_point3(view_space)
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Default)]
pub struct CameraUniform {
    view_proj: Mat4,
}

impl CameraUniform {
    pub fn update(&mut self, scene: &Scene, camera: &ArCamera) {
        self.view_proj = camera.view_projection_matrix(scene);
    }

    pub fn create_buffer(&self, device: &wgpu::Device) -> wgpu::Buffer {
        device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Uniform Buffer"),
            contents: bytemuck::cast_slice(&[*self]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        })
    }

    pub fn update_buffer(&self, queue: &wgpu::Queue, buffer: &wgpu::Buffer) {
        queue.write_buffer(buffer, 0, bytemuck::cast_slice(&[*self]));
    }
}
