use std::time::Instant;

use anyhow::Context;
use imgui::{Condition, FontConfig, FontSource};
use imgui_wgpu::RendererConfig;
use imgui_winit_support::WinitPlatform;
use wgpu::{CommandEncoder, TextureView};
use winit::{
    event::{Event, WindowEvent},
    window::{Window, WindowId},
};

use crate::debug_info::DebugInfo;

/// Imgui panel listing session state, drawn on top of the scene.
pub struct DebugOverlay {
    context: imgui::Context,
    platform: WinitPlatform,
    renderer: imgui_wgpu::Renderer,
    last_frame: Instant,
}

impl DebugOverlay {
    pub fn handle_event(&mut self, window: &Window, window_id: WindowId, event: &WindowEvent) {
        self.platform.handle_event::<()>(
            self.context.io_mut(),
            window,
            &Event::WindowEvent {
                window_id,
                event: event.clone(),
            },
        );
    }

    pub fn render(
        &mut self,
        window: &Window,
        view: &TextureView,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut CommandEncoder,
        info: &DebugInfo,
    ) -> anyhow::Result<()> {
        let now = Instant::now();
        self.context
            .io_mut()
            .update_delta_time(now - self.last_frame);
        self.last_frame = now;

        self.platform
            .prepare_frame(self.context.io_mut(), window)
            .context("Failed to prepare Imgui frame")?;

        let ui = self.context.new_frame();
        ui.window("AR debug")
            .position([10.0, 10.0], Condition::FirstUseEver)
            .size([260.0, 240.0], Condition::FirstUseEver)
            .build(|| {
                for line in info.lines() {
                    ui.text(line);
                }
            });
        self.platform.prepare_render(ui, window);

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Imgui render pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        let draw_data = self.context.render();

        // imgui-rs crashes on empty draw data
        // https://github.com/imgui-rs/imgui-rs/issues/325
        if draw_data.draw_lists_count() == 0 {
            return Ok(());
        }

        self.renderer
            .render(draw_data, queue, device, &mut render_pass)
            .map_err(|err| anyhow::anyhow!("Rendering Imgui failed: {:?}", err))
    }
}

pub fn create_debug_overlay(
    window: &Window,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    texture_format: wgpu::TextureFormat,
) -> DebugOverlay {
    let mut context = imgui::Context::create();
    let mut platform = WinitPlatform::new(&mut context);
    platform.attach_window(
        context.io_mut(),
        window,
        imgui_winit_support::HiDpiMode::Default,
    );

    context.fonts().add_font(&[FontSource::DefaultFontData {
        config: Some(FontConfig {
            oversample_h: 1,
            pixel_snap_h: true,
            size_pixels: 14.0,
            ..Default::default()
        }),
    }]);

    // INI persistence is broken in the published imgui
    context.set_ini_filename(None);

    let renderer_config = RendererConfig {
        texture_format,
        ..Default::default()
    };
    let renderer = imgui_wgpu::Renderer::new(&mut context, device, queue, renderer_config);

    DebugOverlay {
        context,
        platform,
        renderer,
        last_frame: Instant::now(),
    }
}
