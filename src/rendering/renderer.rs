use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;
use wgpu::CommandEncoderDescriptor;
use winit::{
    event::WindowEvent,
    window::{Window, WindowId},
};

use crate::{
    camera::{ArCamera, CameraUniform},
    debug_info::DebugInfo,
    frame_loop::RenderTarget,
    rendering::{
        debug_overlay::{create_debug_overlay, DebugOverlay},
        passes::{
            background_pass::BackgroundPass,
            mesh_pass::{MeshDraw, MeshPass},
        },
        render_common::RenderCommon,
        render_model::{NodeUniform, RenderMesh, RenderNode},
        texture::DepthTexture,
    },
    scene_graph::{GeometryId, ObjectId, Scene},
    tracking::ArDisplay,
};

/// Surface texture and encoder for the frame being recorded.
struct FrameInProgress {
    output: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
    encoder: wgpu::CommandEncoder,
}

pub struct Renderer {
    pub window: Arc<Window>,

    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,

    common: RenderCommon,
    depth_texture: DepthTexture,
    clear_color: wgpu::Color,

    camera_uniform: CameraUniform,
    camera_buffer: wgpu::Buffer,

    background_pass: BackgroundPass,
    mesh_pass: MeshPass,
    overlay: DebugOverlay,

    meshes: HashMap<GeometryId, RenderMesh>,
    nodes: HashMap<ObjectId, RenderNode>,

    frame: Option<FrameInProgress>,
}

impl Renderer {
    pub async fn new(window: Arc<Window>, clear_color: wgpu::Color) -> anyhow::Result<Renderer> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance
            .create_surface(window.clone())
            .context("Failed to create surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("No compatible graphics adapter")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                label: None,
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("Failed to create device")?;

        let common = RenderCommon::new(&device, &adapter, &surface, size.width, size.height)?;
        let depth_texture = DepthTexture::new(&device, &common.output_surface_config, "Depth Texture");

        let camera_uniform = CameraUniform::default();
        let camera_buffer = camera_uniform.create_buffer(&device);

        let background_pass = BackgroundPass::create(&device, &common);
        let mesh_pass = MeshPass::create(&device, &common, &camera_buffer);
        let overlay = create_debug_overlay(&window, &device, &queue, common.format());

        log::info!("Renderer ready on {}", adapter.get_info().name);

        Ok(Self {
            window,
            surface,
            device,
            queue,
            common,
            depth_texture,
            clear_color,
            camera_uniform,
            camera_buffer,
            background_pass,
            mesh_pass,
            overlay,
            meshes: HashMap::new(),
            nodes: HashMap::new(),
            frame: None,
        })
    }

    /// Reapplies the current surface configuration, e.g. after the surface was lost.
    pub fn reconfigure(&mut self) {
        self.surface
            .configure(&self.device, &self.common.output_surface_config);
    }

    pub fn handle_window_event(&mut self, window_id: WindowId, event: &WindowEvent) {
        self.overlay.handle_event(&self.window, window_id, event);
    }

    /// Drops a partially recorded frame without presenting it.
    pub fn abandon_frame(&mut self) {
        self.frame = None;
    }

    fn frame(&mut self) -> anyhow::Result<&mut FrameInProgress> {
        if self.frame.is_none() {
            let output = self.surface.get_current_texture()?;
            let view = output
                .texture
                .create_view(&wgpu::TextureViewDescriptor::default());
            let encoder = self
                .device
                .create_command_encoder(&CommandEncoderDescriptor {
                    label: Some("Render Encoder"),
                });

            self.frame = Some(FrameInProgress {
                output,
                view,
                encoder,
            });
        }

        self.frame.as_mut().context("Frame was not started")
    }

    /// Creates GPU resources for nodes seen for the first time and uploads
    /// their current world matrices.
    fn prepare_nodes(&mut self, scene: &Scene) -> Vec<(GeometryId, ObjectId)> {
        let mut drawn = Vec::new();

        for (object_id, object) in scene.objects.iter() {
            let Some(geometry_id) = object.geometry_id else {
                continue;
            };
            let Some(geometry) = scene.get_geometry(geometry_id) else {
                continue;
            };

            if !self.meshes.contains_key(&geometry_id) {
                log::debug!("Uploading geometry {}", geometry.name);
                self.meshes
                    .insert(geometry_id, RenderMesh::from_geometry(&self.device, geometry));
            }

            let node = self.nodes.entry(object_id).or_insert_with(|| {
                RenderNode::new(
                    &self.device,
                    &self.mesh_pass.node_bind_group_layout,
                    &object.name,
                )
            });

            let model = *object.transform.cached_world_matrix();
            node.update(&self.queue, NodeUniform::new(model, object.color));
            drawn.push((geometry_id, object_id));
        }

        drawn
    }
}

impl RenderTarget for Renderer {
    fn clear_color(&mut self) -> anyhow::Result<()> {
        let clear_color = self.clear_color;
        let frame = self.frame()?;

        frame
            .encoder
            .begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Clear Color"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

        Ok(())
    }

    fn render_background(&mut self, _display: &dyn ArDisplay) -> anyhow::Result<()> {
        self.frame()?;
        if let Some(frame) = self.frame.as_mut() {
            self.background_pass.render(&frame.view, &mut frame.encoder);
        }
        Ok(())
    }

    fn clear_depth(&mut self) -> anyhow::Result<()> {
        self.frame()?;
        if let Some(frame) = self.frame.as_mut() {
            frame
                .encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Clear Depth"),
                    color_attachments: &[],
                    depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                        view: self.depth_texture.view(),
                        depth_ops: Some(wgpu::Operations {
                            load: wgpu::LoadOp::Clear(1.0),
                            store: wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    }),
                    occlusion_query_set: None,
                    timestamp_writes: None,
                });
        }
        Ok(())
    }

    fn render(&mut self, scene: &Scene, camera: &ArCamera) -> anyhow::Result<()> {
        self.frame()?;

        self.camera_uniform.update(scene, camera);
        self.camera_uniform
            .update_buffer(&self.queue, &self.camera_buffer);

        let drawn = self.prepare_nodes(scene);
        let draws: Vec<MeshDraw> = drawn
            .iter()
            .filter_map(|(geometry_id, object_id)| {
                Some(MeshDraw {
                    mesh: self.meshes.get(geometry_id)?,
                    node: self.nodes.get(object_id)?,
                })
            })
            .collect();

        if let Some(frame) = self.frame.as_mut() {
            self.mesh_pass.render(
                &frame.view,
                self.depth_texture.view(),
                &mut frame.encoder,
                &draws,
            );
        }

        Ok(())
    }

    fn render_overlay(&mut self, info: &DebugInfo) -> anyhow::Result<()> {
        self.frame()?;
        if let Some(frame) = self.frame.as_mut() {
            self.overlay.render(
                &self.window,
                &frame.view,
                &self.device,
                &self.queue,
                &mut frame.encoder,
                info,
            )?;
        }
        Ok(())
    }

    fn present(&mut self) -> anyhow::Result<()> {
        let frame = self.frame.take().context("No frame to present")?;

        self.queue.submit([frame.encoder.finish()]);
        frame.output.present();

        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.frame = None;
            self.common.output_surface_config.width = width;
            self.common.output_surface_config.height = height;
            self.reconfigure();
            self.depth_texture
                .resize(&self.device, &self.common.output_surface_config);
        }
    }
}
