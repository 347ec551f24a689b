use std::time::{Duration, Instant};

use glam::{Mat4, Quat, Vec3};
use rand::Rng;

use crate::config::{SessionConfig, TrackingSource};
use crate::scene_graph::{ObjectId, Scene};

/// Device pose in tracking space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub orientation: Quat,
}

#[cfg(test)]
impl Pose {
    pub const IDENTITY: Pose = Pose {
        position: Vec3::ZERO,
        orientation: Quat::IDENTITY,
    };

    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation, self.position)
    }
}

pub type AnchorId = u64;

/// A tracked real-world reference point reported by the display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub id: AnchorId,
    pub transform: Mat4,
}

/// Handle to an AR-capable display and its tracking session.
pub trait ArDisplay {
    fn display_name(&self) -> &str;

    fn depth_near(&self) -> f32;

    fn depth_far(&self) -> f32;

    /// Vertical field of view in radians from the device intrinsics, if known.
    fn fov_y(&self) -> Option<f32> {
        None
    }

    /// Current pose, or `None` while tracking is lost.
    fn pose(&self) -> Option<Pose>;

    /// Anchors changed since the previous call.
    fn take_updated_anchors(&mut self) -> Vec<Anchor> {
        Vec::new()
    }
}

#[allow(async_fn_in_trait)]
pub trait DisplayProvider {
    /// Resolves to `None` when no AR-capable display exists.
    async fn request_display(&self) -> Option<Box<dyn ArDisplay>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingState {
    /// No pose has been reported yet.
    Initializing,
    Tracking,
    /// Pose reports stopped; the camera holds its last pose.
    Lost,
}

/// Copies the display pose onto the camera node every frame.
pub struct PoseControls {
    camera_node: ObjectId,
    last_pose: Option<Pose>,
    tracking: bool,
}

impl PoseControls {
    pub fn new(camera_node: ObjectId) -> Self {
        Self {
            camera_node,
            last_pose: None,
            tracking: false,
        }
    }

    /// Returns whether a fresh pose was applied. The camera keeps its last
    /// pose while tracking is lost.
    pub fn update(&mut self, display: &dyn ArDisplay, scene: &mut Scene) -> bool {
        let Some(pose) = display.pose() else {
            if self.tracking {
                log::warn!("Tracking lost on {}", display.display_name());
                self.tracking = false;
            }
            return false;
        };

        if !self.tracking {
            log::info!("Tracking acquired on {}", display.display_name());
            self.tracking = true;
        }

        scene.set_object_transform(self.camera_node, pose.position, pose.orientation, 1.0);
        self.last_pose = Some(pose);
        true
    }

    pub fn state(&self) -> TrackingState {
        match (self.tracking, self.last_pose) {
            (true, _) => TrackingState::Tracking,
            (false, Some(_)) => TrackingState::Lost,
            (false, None) => TrackingState::Initializing,
        }
    }
}

/// Desktop stand-in for AR hardware: the camera sways gently around the origin.
pub struct SimulatedDisplay {
    started: Instant,
    jitter: f32,
    floor_reported: bool,
}

impl SimulatedDisplay {
    const FLOOR_ANCHOR: AnchorId = 1;
    const FLOOR_DETECTION_DELAY: Duration = Duration::from_secs(1);

    pub fn new(jitter: f32) -> Self {
        Self {
            started: Instant::now(),
            jitter,
            floor_reported: false,
        }
    }

    fn pose_at(&self, time: f32) -> Pose {
        let mut position = Vec3::new((time * 0.3).sin() * 0.05, 0.0, (time * 0.2).sin() * 0.03);

        if self.jitter > 0.0 {
            let mut rng = rand::thread_rng();
            position += Vec3::new(
                rng.gen_range(-self.jitter..=self.jitter),
                rng.gen_range(-self.jitter..=self.jitter),
                rng.gen_range(-self.jitter..=self.jitter),
            );
        }

        Pose {
            position,
            orientation: Quat::from_rotation_y((time * 0.25).sin() * 0.1),
        }
    }
}

impl ArDisplay for SimulatedDisplay {
    fn display_name(&self) -> &str {
        "Simulated AR display"
    }

    fn depth_near(&self) -> f32 {
        0.01
    }

    fn depth_far(&self) -> f32 {
        100.0
    }

    fn pose(&self) -> Option<Pose> {
        Some(self.pose_at(self.started.elapsed().as_secs_f32()))
    }

    fn take_updated_anchors(&mut self) -> Vec<Anchor> {
        if self.floor_reported || self.started.elapsed() < Self::FLOOR_DETECTION_DELAY {
            return Vec::new();
        }

        self.floor_reported = true;
        vec![Anchor {
            id: Self::FLOOR_ANCHOR,
            transform: Mat4::from_translation(Vec3::new(0.0, -1.5, 0.0)),
        }]
    }
}

/// Picks the tracking source named by the session configuration.
pub struct ConfiguredDisplayProvider {
    source: TrackingSource,
    jitter: f32,
}

impl ConfiguredDisplayProvider {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            source: config.tracking,
            jitter: config.tracking_jitter,
        }
    }
}

impl DisplayProvider for ConfiguredDisplayProvider {
    async fn request_display(&self) -> Option<Box<dyn ArDisplay>> {
        match self.source {
            TrackingSource::Simulated => Some(Box::new(SimulatedDisplay::new(self.jitter))),
            TrackingSource::None => None,
        }
    }
}
