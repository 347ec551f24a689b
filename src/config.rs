use glam::Vec3;

/// Which of the objects under a touch get picked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickPolicy {
    /// Every object the touch ray passes through.
    AllHits,
    /// Only the object closest to the camera.
    Nearest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingSource {
    Simulated,
    /// No tracking hardware at all; bootstrap reports AR as unsupported.
    None,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub fov_y_degrees: f32,
    /// Camera-local position a picked object snaps to.
    pub held_offset: Vec3,
    pub pick_policy: PickPolicy,
    pub tracking: TrackingSource,
    /// Amplitude in metres of the noise added to simulated poses.
    pub tracking_jitter: f32,
    pub clear_color: wgpu::Color,
    /// Draw the on-screen debug panel over the scene.
    pub debug_overlay: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 60.0,
            held_offset: Vec3::new(0.0, -0.1, -0.4),
            pick_policy: PickPolicy::AllHits,
            tracking: TrackingSource::Simulated,
            tracking_jitter: 0.0,
            clear_color: wgpu::Color::TRANSPARENT,
            debug_overlay: true,
        }
    }
}

impl SessionConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(value) = lookup("ARGRAB_PICK") {
            match value.to_ascii_lowercase().as_str() {
                "all" => config.pick_policy = PickPolicy::AllHits,
                "nearest" => config.pick_policy = PickPolicy::Nearest,
                other => log::warn!("Ignoring unknown ARGRAB_PICK value {:?}", other),
            }
        }

        if let Some(value) = lookup("ARGRAB_TRACKING") {
            match value.to_ascii_lowercase().as_str() {
                "simulated" => config.tracking = TrackingSource::Simulated,
                "none" => config.tracking = TrackingSource::None,
                other => log::warn!("Ignoring unknown ARGRAB_TRACKING value {:?}", other),
            }
        }

        if let Some(value) = lookup("ARGRAB_JITTER") {
            match value.parse::<f32>() {
                Ok(jitter) if jitter >= 0.0 => config.tracking_jitter = jitter,
                _ => log::warn!("Ignoring invalid ARGRAB_JITTER value {:?}", value),
            }
        }

        if let Some(value) = lookup("ARGRAB_DEBUG") {
            match value.to_ascii_lowercase().as_str() {
                "1" | "on" | "true" => config.debug_overlay = true,
                "0" | "off" | "false" => config.debug_overlay = false,
                other => log::warn!("Ignoring unknown ARGRAB_DEBUG value {:?}", other),
            }
        }

        config
    }
}
