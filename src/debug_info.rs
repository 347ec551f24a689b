//! What the debug panel shows, captured from the session once per frame.

use glam::{EulerRot, Quat, Vec3};

use crate::config::PickPolicy;
use crate::entity::EntityKind;
use crate::input::Viewport;
use crate::session::Session;
use crate::tracking::{AnchorId, TrackingState};

#[derive(Debug, Clone, PartialEq)]
pub struct EntityStatus {
    pub kind: EntityKind,
    pub moved: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DebugInfo {
    pub frame: u64,
    pub display_name: String,
    pub tracking: TrackingState,
    pub camera_position: Vec3,
    /// Yaw, pitch and roll in degrees.
    pub camera_angles: Vec3,
    pub near: f32,
    pub far: f32,
    pub aspect: f32,
    pub viewport: Viewport,
    pub pick_policy: PickPolicy,
    pub anchors: Vec<(AnchorId, Vec3)>,
    pub entities: Vec<EntityStatus>,
}

impl DebugInfo {
    pub fn capture(session: &Session, frame: u64) -> Self {
        let (camera_position, camera_rotation) = session
            .scene()
            .get_object_transform(session.camera().node)
            .map(|transform| (transform.translation(), transform.rotation()))
            .unwrap_or((Vec3::ZERO, Quat::IDENTITY));
        let (yaw, pitch, roll) = camera_rotation.to_euler(EulerRot::YXZ);

        Self {
            frame,
            display_name: session.display().display_name().to_owned(),
            tracking: session.tracking_state(),
            camera_position,
            camera_angles: Vec3::new(yaw, pitch, roll) * (180.0 / std::f32::consts::PI),
            near: session.camera().near(),
            far: session.camera().far(),
            aspect: session.camera().aspect(),
            viewport: session.viewport(),
            pick_policy: session.config().pick_policy,
            anchors: session
                .anchors()
                .iter()
                .map(|(id, transform)| (id, transform.w_axis.truncate()))
                .collect(),
            entities: session
                .entities()
                .iter()
                .map(|entity| EntityStatus {
                    kind: entity.kind,
                    moved: entity.moved,
                })
                .collect(),
        }
    }

    pub fn lines(&self) -> Vec<String> {
        let tracking = match self.tracking {
            TrackingState::Initializing => "initializing",
            TrackingState::Tracking => "tracking",
            TrackingState::Lost => "lost",
        };
        let pick_policy = match self.pick_policy {
            PickPolicy::AllHits => "all hits",
            PickPolicy::Nearest => "nearest",
        };
        let p = self.camera_position;
        let a = self.camera_angles;

        let mut lines = vec![
            format!("Display: {}", self.display_name),
            format!("Frame: {}", self.frame),
            format!("Tracking: {}", tracking),
            format!("Camera: ({:.3}, {:.3}, {:.3})", p.x, p.y, p.z),
            format!("Yaw {:.1} Pitch {:.1} Roll {:.1}", a.x, a.y, a.z),
            format!("Clip: {:.2}..{:.1}", self.near, self.far),
            format!(
                "Viewport: {}x{} ({:.2})",
                self.viewport.width, self.viewport.height, self.aspect
            ),
            format!("Pick: {}", pick_policy),
        ];

        if self.anchors.is_empty() {
            lines.push("Anchors: none".to_owned());
        } else {
            lines.push(format!("Anchors: {}", self.anchors.len()));
            for (id, position) in &self.anchors {
                lines.push(format!(
                    "  #{} at ({:.2}, {:.2}, {:.2})",
                    id, position.x, position.y, position.z
                ));
            }
        }

        for entity in &self.entities {
            let state = if entity.moved { "held" } else { "in world" };
            lines.push(format!("{:?}: {}", entity.kind, state));
        }

        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Mat4, Vec2};

    use crate::config::SessionConfig;
    use crate::testing::FakeDisplay;
    use crate::tracking::{Anchor, Pose};

    fn session_with(display: FakeDisplay) -> Session {
        Session::new(
            Box::new(display),
            SessionConfig::default(),
            Viewport::new(400, 400),
        )
    }

    #[test]
    fn fresh_session_shows_initializing_and_free_entities() {
        let session = session_with(FakeDisplay::default());
        let info = DebugInfo::capture(&session, 0);

        assert_eq!(info.display_name, "Fake display");
        assert_eq!(info.tracking, TrackingState::Initializing);
        assert!(info.anchors.is_empty());
        assert_eq!(
            info.entities,
            vec![
                EntityStatus {
                    kind: EntityKind::Cube,
                    moved: false
                },
                EntityStatus {
                    kind: EntityKind::Sphere,
                    moved: false
                },
            ]
        );

        let lines = info.lines();
        assert!(lines.contains(&"Tracking: initializing".to_owned()));
        assert!(lines.contains(&"Anchors: none".to_owned()));
        assert!(lines.contains(&"Viewport: 400x400 (1.00)".to_owned()));
        assert!(lines.contains(&"Clip: 0.01..100.0".to_owned()));
        assert!(lines.contains(&"Cube: in world".to_owned()));
    }

    #[test]
    fn reflects_pose_anchors_and_held_entities() {
        let mut display = FakeDisplay::with_pose(Pose {
            position: Vec3::new(0.0, 1.5, 0.0),
            orientation: Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
        });
        display.pending_anchors = vec![Anchor {
            id: 4,
            transform: Mat4::from_translation(Vec3::new(0.0, -1.5, 0.0)),
        }];
        let mut session = session_with(display);
        session.update_tracking();

        // Face the sphere head on.
        let sphere = session.entities()[1].mesh;
        let target = session.scene().local_to_world(sphere, Vec3::ZERO);
        let camera_node = session.camera().node;
        session.scene_mut().set_object_transform(
            camera_node,
            Vec3::new(target.x, target.y, 0.0),
            Quat::IDENTITY,
            1.0,
        );
        assert_eq!(session.touch_start(&[Vec2::new(200.0, 200.0)]), 1);

        let info = DebugInfo::capture(&session, 12);
        assert_eq!(info.tracking, TrackingState::Tracking);
        assert_eq!(info.anchors, vec![(4, Vec3::new(0.0, -1.5, 0.0))]);
        assert!(info.entities[1].moved);
        assert!(!info.entities[0].moved);

        let lines = info.lines();
        assert!(lines.contains(&"Frame: 12".to_owned()));
        assert!(lines.contains(&"Anchors: 1".to_owned()));
        assert!(lines.contains(&"  #4 at (0.00, -1.50, 0.00)".to_owned()));
        assert!(lines.contains(&"Sphere: held".to_owned()));
    }

    #[test]
    fn camera_angles_are_in_degrees() {
        let mut session = session_with(FakeDisplay::with_pose(Pose {
            position: Vec3::ZERO,
            orientation: Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
        }));
        session.update_tracking();

        let info = DebugInfo::capture(&session, 0);
        assert!((info.camera_angles.x - 90.0).abs() < 1e-3);
        assert!(info.camera_angles.y.abs() < 1e-3);
        assert!(info.lines().iter().any(|line| line.starts_with("Yaw 90.0")));
    }
}
