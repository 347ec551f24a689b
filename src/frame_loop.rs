use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::camera::ArCamera;
use crate::debug_info::DebugInfo;
use crate::scene_graph::Scene;
use crate::session::Session;
use crate::tracking::ArDisplay;

/// Whatever draws the frame: a GPU surface in the app, a recorder in tests.
pub trait RenderTarget {
    fn clear_color(&mut self) -> anyhow::Result<()>;

    /// Draws the camera passthrough behind the scene.
    fn render_background(&mut self, display: &dyn ArDisplay) -> anyhow::Result<()>;

    fn clear_depth(&mut self) -> anyhow::Result<()>;

    fn render(&mut self, scene: &Scene, camera: &ArCamera) -> anyhow::Result<()>;

    /// Draws the debug panel over the rendered scene.
    fn render_overlay(&mut self, info: &DebugInfo) -> anyhow::Result<()>;

    /// Hands the finished frame to the display.
    fn present(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32);
}

/// The host's next-frame callback, e.g. a window redraw request.
pub trait FrameScheduler {
    fn request_frame(&self);
}

/// Cloneable switch that halts a [`FrameLoop`] before its next frame.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    stopped: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    Continue,
    Stopped,
}

#[derive(Debug, Default)]
pub struct FrameLoop {
    stop: StopHandle,
    frames: u64,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Asks for the first frame.
    pub fn start(&self, scheduler: &dyn FrameScheduler) -> FrameStatus {
        self.schedule_next(scheduler)
    }

    fn schedule_next(&self, scheduler: &dyn FrameScheduler) -> FrameStatus {
        if self.stop.is_stopped() {
            return FrameStatus::Stopped;
        }

        scheduler.request_frame();
        FrameStatus::Continue
    }

    /// Runs one frame and requests the next one unless stopped. A render
    /// error aborts the frame without scheduling another; the host decides
    /// whether to recover.
    pub fn tick(
        &mut self,
        session: &mut Session,
        target: &mut dyn RenderTarget,
        scheduler: &dyn FrameScheduler,
    ) -> anyhow::Result<FrameStatus> {
        if self.stop.is_stopped() {
            return Ok(FrameStatus::Stopped);
        }

        target.clear_color()?;
        target.render_background(session.display())?;

        session.refresh_projection();
        session.update_tracking();
        session.scene_mut().late_update();

        target.clear_depth()?;
        target.render(session.scene(), session.camera())?;
        if session.config().debug_overlay {
            target.render_overlay(&DebugInfo::capture(session, self.frames))?;
        }
        target.present()?;

        self.frames += 1;
        Ok(self.schedule_next(scheduler))
    }
}
