use glam::Vec2;

/// Size of the render surface in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Pixel position (y down) to normalized device coordinates (y up), or
    /// `None` for an empty viewport.
    pub fn to_ndc(&self, pixel: Vec2) -> Option<Vec2> {
        if self.is_empty() {
            return None;
        }

        Some(Vec2::new(
            pixel.x / self.width as f32 * 2.0 - 1.0,
            -(pixel.y / self.height as f32) * 2.0 + 1.0,
        ))
    }
}

/// Host input routed to a session.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Resize { width: u32, height: u32 },
    /// Positions of every touch active when a new touch began, oldest first.
    TouchStart { touches: Vec<Vec2> },
    TouchEnd,
}
