//! Fakes for the display, render target and frame scheduler.

use std::cell::Cell;

use glam::Mat4;

use crate::camera::ArCamera;
use crate::debug_info::DebugInfo;
use crate::frame_loop::{FrameScheduler, RenderTarget};
use crate::scene_graph::Scene;
use crate::tracking::{Anchor, ArDisplay, DisplayProvider, Pose};

pub struct FakeDisplay {
    pub near: f32,
    pub far: f32,
    pub fov_y: Option<f32>,
    pub pose: Option<Pose>,
    pub pending_anchors: Vec<Anchor>,
}

impl FakeDisplay {
    pub fn with_pose(pose: Pose) -> Self {
        Self {
            pose: Some(pose),
            ..Default::default()
        }
    }
}

impl Default for FakeDisplay {
    fn default() -> Self {
        Self {
            near: 0.01,
            far: 100.0,
            fov_y: None,
            pose: Some(Pose::IDENTITY),
            pending_anchors: Vec::new(),
        }
    }
}

impl ArDisplay for FakeDisplay {
    fn display_name(&self) -> &str {
        "Fake display"
    }

    fn depth_near(&self) -> f32 {
        self.near
    }

    fn depth_far(&self) -> f32 {
        self.far
    }

    fn fov_y(&self) -> Option<f32> {
        self.fov_y
    }

    fn pose(&self) -> Option<Pose> {
        self.pose
    }

    fn take_updated_anchors(&mut self) -> Vec<Anchor> {
        std::mem::take(&mut self.pending_anchors)
    }
}

pub struct FakeProvider {
    available: bool,
}

impl FakeProvider {
    pub fn available() -> Self {
        Self { available: true }
    }

    pub fn unavailable() -> Self {
        Self { available: false }
    }
}

impl DisplayProvider for FakeProvider {
    async fn request_display(&self) -> Option<Box<dyn ArDisplay>> {
        self.available
            .then(|| Box::new(FakeDisplay::default()) as Box<dyn ArDisplay>)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderCall {
    ClearColor,
    Background,
    ClearDepth,
    Render,
    Overlay,
    Present,
}

#[derive(Default)]
pub struct RecordingTarget {
    pub calls: Vec<RenderCall>,
    pub size: Option<(u32, u32)>,
    pub rendered_camera_world: Option<Mat4>,
    pub rendered_camera_far: Option<f32>,
    pub overlay: Option<DebugInfo>,
    pub fail_render: bool,
}

impl RenderTarget for RecordingTarget {
    fn clear_color(&mut self) -> anyhow::Result<()> {
        self.calls.push(RenderCall::ClearColor);
        Ok(())
    }

    fn render_background(&mut self, _display: &dyn ArDisplay) -> anyhow::Result<()> {
        self.calls.push(RenderCall::Background);
        Ok(())
    }

    fn clear_depth(&mut self) -> anyhow::Result<()> {
        self.calls.push(RenderCall::ClearDepth);
        Ok(())
    }

    fn render(&mut self, scene: &Scene, camera: &ArCamera) -> anyhow::Result<()> {
        if self.fail_render {
            anyhow::bail!("render failed");
        }
        self.calls.push(RenderCall::Render);
        self.rendered_camera_world = Some(camera.world_matrix(scene));
        self.rendered_camera_far = Some(camera.far());
        Ok(())
    }

    fn render_overlay(&mut self, info: &DebugInfo) -> anyhow::Result<()> {
        self.calls.push(RenderCall::Overlay);
        self.overlay = Some(info.clone());
        Ok(())
    }

    fn present(&mut self) -> anyhow::Result<()> {
        self.calls.push(RenderCall::Present);
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.size = Some((width, height));
    }
}

#[derive(Default)]
pub struct FakeScheduler {
    requests: Cell<usize>,
}

impl FakeScheduler {
    pub fn requests(&self) -> usize {
        self.requests.get()
    }
}

impl FrameScheduler for FakeScheduler {
    fn request_frame(&self) {
        self.requests.set(self.requests.get() + 1);
    }
}
