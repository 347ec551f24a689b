use std::sync::Arc;

use anyhow::Context;
use glam::Vec2;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, MouseButton, TouchPhase, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    window::Window,
};

use crate::{
    config::SessionConfig,
    frame_loop::{FrameLoop, FrameScheduler, FrameStatus},
    input::{InputEvent, Viewport},
    rendering::renderer::Renderer,
    session::{self, Session},
    tracking::ConfiguredDisplayProvider,
};

struct RedrawScheduler(Arc<Window>);

impl FrameScheduler for RedrawScheduler {
    fn request_frame(&self) {
        self.0.request_redraw();
    }
}

struct Running {
    session: Session,
    renderer: Renderer,
    frame_loop: FrameLoop,
    scheduler: RedrawScheduler,
}

struct App {
    config: SessionConfig,
    running: Option<Running>,
    startup_error: Option<anyhow::Error>,
    cursor: Vec2,
    /// Active touches, oldest first.
    touches: Vec<(u64, Vec2)>,
}

impl App {
    fn new(config: SessionConfig) -> Self {
        Self {
            config,
            running: None,
            startup_error: None,
            cursor: Vec2::ZERO,
            touches: Vec::new(),
        }
    }

    fn start(&self, event_loop: &ActiveEventLoop) -> anyhow::Result<Running> {
        let window = event_loop
            .create_window(Window::default_attributes().with_title("argrab"))
            .context("Failed to create window")?;
        let window = Arc::new(window);

        let size = window.inner_size();
        let provider = ConfiguredDisplayProvider::new(&self.config);
        let session = pollster::block_on(session::bootstrap(
            &provider,
            self.config.clone(),
            Viewport::new(size.width, size.height),
        ))?;

        let renderer = pollster::block_on(Renderer::new(window.clone(), self.config.clear_color))?;

        let frame_loop = FrameLoop::new();
        let scheduler = RedrawScheduler(window);
        frame_loop.start(&scheduler);

        Ok(Running {
            session,
            renderer,
            frame_loop,
            scheduler,
        })
    }

    fn touch_event(&mut self, phase: TouchPhase, id: u64, position: Vec2) -> Option<InputEvent> {
        match phase {
            TouchPhase::Started => {
                self.touches.push((id, position));
                Some(InputEvent::TouchStart {
                    touches: self.touches.iter().map(|(_, position)| *position).collect(),
                })
            }
            TouchPhase::Moved => {
                if let Some(touch) = self.touches.iter_mut().find(|(touch_id, _)| *touch_id == id) {
                    touch.1 = position;
                }
                None
            }
            TouchPhase::Ended | TouchPhase::Cancelled => {
                self.touches.retain(|(touch_id, _)| *touch_id != id);
                Some(InputEvent::TouchEnd)
            }
        }
    }

    fn redraw(running: &mut Running, event_loop: &ActiveEventLoop) {
        let result = running.frame_loop.tick(
            &mut running.session,
            &mut running.renderer,
            &running.scheduler,
        );

        let error = match result {
            Ok(FrameStatus::Continue) => return,
            Ok(FrameStatus::Stopped) => {
                event_loop.exit();
                return;
            }
            Err(error) => error,
        };

        running.renderer.abandon_frame();

        if recover_from(&error) {
            if let Some(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) =
                error.downcast_ref::<wgpu::SurfaceError>()
            {
                running.renderer.reconfigure();
            }
            running.renderer.window.request_redraw();
        } else {
            running.frame_loop.stop_handle().stop();
            event_loop.exit();
        }
    }
}

/// Logs a failed frame and decides whether rendering should carry on. Only
/// transient surface errors are retried.
fn recover_from(error: &anyhow::Error) -> bool {
    match error.downcast_ref::<wgpu::SurfaceError>() {
        Some(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
            log::debug!("Surface needs reconfiguring: {}", error);
            true
        }
        Some(wgpu::SurfaceError::Timeout) => {
            log::warn!("Timeout");
            true
        }
        Some(wgpu::SurfaceError::OutOfMemory) => {
            log::error!("Out of memory");
            false
        }
        _ => {
            log::error!("Unexpected error: {:?}", error);
            false
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() {
            return;
        }

        match self.start(event_loop) {
            Ok(running) => self.running = Some(running),
            Err(error) => {
                self.startup_error = Some(error);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        if let Some(running) = self.running.as_mut() {
            running.renderer.handle_window_event(window_id, &event);
        }

        let input = match event {
            WindowEvent::CloseRequested => {
                if let Some(running) = &self.running {
                    running.frame_loop.stop_handle().stop();
                    log::info!("Stopping after {} frames", running.frame_loop.frames());
                }
                event_loop.exit();
                None
            }
            WindowEvent::RedrawRequested => {
                if let Some(running) = self.running.as_mut() {
                    Self::redraw(running, event_loop);
                }
                None
            }
            WindowEvent::Resized(new_size) => Some(InputEvent::Resize {
                width: new_size.width,
                height: new_size.height,
            }),
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Vec2::new(position.x as f32, position.y as f32);
                None
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => match state {
                ElementState::Pressed => Some(InputEvent::TouchStart {
                    touches: vec![self.cursor],
                }),
                ElementState::Released => Some(InputEvent::TouchEnd),
            },
            WindowEvent::Touch(touch) => {
                let position = Vec2::new(touch.location.x as f32, touch.location.y as f32);
                self.touch_event(touch.phase, touch.id, position)
            }
            _ => None,
        };

        if let (Some(input), Some(running)) = (input, self.running.as_mut()) {
            running
                .session
                .handle_input(&input, &mut running.renderer);
        }
    }
}

pub async fn run(config: SessionConfig) -> anyhow::Result<()> {
    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    match app.startup_error.take() {
        Some(error) => Err(error),
        None => Ok(()),
    }
}
