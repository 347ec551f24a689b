use anyhow::Result;

mod anchors;
mod camera;
mod config;
mod debug_info;
mod entity;
mod error;
mod frame_loop;
mod input;
mod interaction;
mod math;
mod picking;
mod rendering;
mod scene_graph;
mod session;
#[cfg(test)]
mod testing;
mod tracking;
mod window;

fn main() -> Result<()> {
    pretty_env_logger::init();

    let config = config::SessionConfig::from_env();
    pollster::block_on(window::run(config))?;

    Ok(())
}
