use glam::Vec2;

use crate::anchors::AnchorManager;
use crate::camera::ArCamera;
use crate::config::SessionConfig;
use crate::entity::Entity;
use crate::error::SessionError;
use crate::frame_loop::RenderTarget;
use crate::input::{InputEvent, Viewport};
use crate::interaction;
use crate::picking;
use crate::scene_graph::Scene;
use crate::tracking::{ArDisplay, DisplayProvider, PoseControls, TrackingState};

/// Everything one AR session owns: the display handle, the scene graph with
/// its camera node, and the draggable entities.
pub struct Session {
    config: SessionConfig,
    display: Box<dyn ArDisplay>,
    scene: Scene,
    camera: ArCamera,
    controls: PoseControls,
    anchors: AnchorManager,
    entities: Vec<Entity>,
    viewport: Viewport,
}

/// Acquires a display and builds a session around it. A missing display is
/// terminal; callers should report it and stop.
pub async fn bootstrap(
    provider: &impl DisplayProvider,
    config: SessionConfig,
    viewport: Viewport,
) -> Result<Session, SessionError> {
    let Some(display) = provider.request_display().await else {
        log::error!("No AR display available");
        return Err(SessionError::Unsupported);
    };

    log::info!(
        "Using {} (depth {}..{})",
        display.display_name(),
        display.depth_near(),
        display.depth_far()
    );

    Ok(Session::new(display, config, viewport))
}

impl Session {
    pub fn new(display: Box<dyn ArDisplay>, config: SessionConfig, viewport: Viewport) -> Self {
        let mut scene = Scene::new();
        let aspect = if viewport.is_empty() {
            1.0
        } else {
            viewport.aspect()
        };
        let camera = ArCamera::new(&mut scene, display.as_ref(), config.fov_y_degrees, aspect);
        let controls = PoseControls::new(camera.node);
        let entities = Entity::spawn_defaults(&mut scene);

        Self {
            config,
            display,
            scene,
            camera,
            controls,
            anchors: AnchorManager::new(),
            entities,
            viewport,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn display(&self) -> &dyn ArDisplay {
        self.display.as_ref()
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn camera(&self) -> &ArCamera {
        &self.camera
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn anchors(&self) -> &AnchorManager {
        &self.anchors
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn tracking_state(&self) -> TrackingState {
        self.controls.state()
    }

    pub fn handle_input(&mut self, event: &InputEvent, target: &mut dyn RenderTarget) {
        match event {
            InputEvent::Resize { width, height } => self.resize(*width, *height, target),
            InputEvent::TouchStart { touches } => {
                self.touch_start(touches);
            }
            InputEvent::TouchEnd => {
                self.touch_end();
            }
        }
    }

    pub fn resize(&mut self, width: u32, height: u32, target: &mut dyn RenderTarget) {
        log::debug!("Viewport resized to {}x{}", width, height);

        self.viewport = Viewport::new(width, height);
        if !self.viewport.is_empty() {
            self.camera.set_aspect(self.viewport.aspect());
        }
        target.resize(width, height);
    }

    /// Picks up whatever lies under the first touch. Returns how many
    /// entities were attached to the camera.
    pub fn touch_start(&mut self, touches: &[Vec2]) -> usize {
        let Some(&touch) = touches.first() else {
            return 0;
        };

        let hits = picking::pick(&self.scene, &self.camera, self.viewport, touch);
        interaction::attach_hits(
            &mut self.scene,
            self.camera.node,
            &mut self.entities,
            &hits,
            self.config.pick_policy,
            self.config.held_offset,
        )
        .len()
    }

    /// Drops every held entity into the world. Returns how many were released.
    pub fn touch_end(&mut self) -> usize {
        interaction::release_all(&mut self.scene, self.camera.node, &mut self.entities).len()
    }

    pub fn refresh_projection(&mut self) {
        self.camera.refresh_from_display(self.display.as_ref());
    }

    /// Applies the latest tracking pose to the camera node and records any
    /// anchor updates.
    pub fn update_tracking(&mut self) {
        self.controls.update(self.display.as_ref(), &mut self.scene);
        self.anchors.update(self.display.as_mut());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Mat4, Quat, Vec3};

    use crate::config::PickPolicy;
    use crate::testing::{FakeDisplay, FakeProvider, RecordingTarget};
    use crate::tracking::{Anchor, Pose};

    const VIEWPORT: Viewport = Viewport {
        width: 400,
        height: 400,
    };
    const CENTER: Vec2 = Vec2::new(200.0, 200.0);

    fn session() -> Session {
        Session::new(
            Box::new(FakeDisplay::default()),
            SessionConfig::default(),
            VIEWPORT,
        )
    }

    /// Puts the camera right behind the given entity so a center touch hits it.
    fn look_at_entity(session: &mut Session, index: usize) {
        let mesh = session.entities[index].mesh;
        let target = session.scene.local_to_world(mesh, Vec3::ZERO);
        let camera_node = session.camera.node;
        session
            .scene
            .set_object_translation(camera_node, Vec3::new(target.x, target.y, 0.0));
    }

    fn approx_eq_vec3(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn bootstrap_builds_scene_when_display_exists() {
        let provider = FakeProvider::available();
        let session =
            pollster::block_on(bootstrap(&provider, SessionConfig::default(), VIEWPORT)).unwrap();

        let scene = session.scene();
        assert_eq!(scene.parent_of(session.camera().node), Some(scene.root()));
        assert_eq!(session.entities().len(), 2);
        assert!(session.entities().iter().all(|entity| !entity.moved));
        assert_eq!(session.camera().near(), FakeDisplay::default().near);
    }

    #[test]
    fn bootstrap_without_display_is_unsupported() {
        let provider = FakeProvider::unavailable();
        let result = pollster::block_on(bootstrap(&provider, SessionConfig::default(), VIEWPORT));
        assert!(matches!(result, Err(SessionError::Unsupported)));
    }

    #[test]
    fn empty_touch_list_changes_nothing() {
        let mut session = session();
        look_at_entity(&mut session, 0);
        let before = session.entities().to_vec();

        assert_eq!(session.touch_start(&[]), 0);

        assert_eq!(session.entities(), &before[..]);
        for entity in session.entities() {
            assert_eq!(session.scene().parent_of(entity.mesh), Some(session.scene().root()));
        }
    }

    #[test]
    fn touch_on_empty_space_picks_nothing() {
        let mut session = session();
        assert_eq!(session.touch_start(&[CENTER]), 0);
        assert!(session.entities().iter().all(|entity| !entity.moved));
    }

    #[test]
    fn touch_start_then_end_drops_entity_in_front_of_camera() {
        let mut session = session();
        look_at_entity(&mut session, 0);

        assert_eq!(session.touch_start(&[CENTER]), 1);
        let cube = session.entities()[0].mesh;
        assert!(session.entities()[0].moved);
        assert_eq!(session.scene().parent_of(cube), Some(session.camera().node));

        // Walk and turn while holding it.
        let camera_node = session.camera().node;
        session.scene_mut().set_object_transform(
            camera_node,
            Vec3::new(2.0, 0.0, 1.0),
            Quat::from_rotation_y(-0.7),
            1.0,
        );
        let expected = session
            .scene()
            .local_to_world(camera_node, SessionConfig::default().held_offset);

        assert_eq!(session.touch_end(), 1);

        assert!(!session.entities()[0].moved);
        assert_eq!(session.scene().parent_of(cube), Some(session.scene().root()));
        let position = session.scene().get_object_transform(cube).unwrap().translation();
        assert!(approx_eq_vec3(position, expected));
    }

    #[test]
    fn only_first_touch_is_used() {
        let mut session = session();
        look_at_entity(&mut session, 1);

        assert_eq!(session.touch_start(&[CENTER, Vec2::new(1.0, 1.0)]), 1);
        assert!(session.entities()[1].moved);
        assert_eq!(session.touch_start(&[Vec2::new(1.0, 1.0), CENTER]), 0);
    }

    #[test]
    fn touch_end_without_held_entities_is_a_no_op() {
        let mut session = session();
        let before: Vec<Mat4> = session
            .entities()
            .iter()
            .map(|entity| session.scene().world_matrix(entity.mesh))
            .collect();

        assert_eq!(session.touch_end(), 0);

        let after: Vec<Mat4> = session
            .entities()
            .iter()
            .map(|entity| session.scene().world_matrix(entity.mesh))
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn nearest_policy_is_respected() {
        let config = SessionConfig {
            pick_policy: PickPolicy::Nearest,
            ..Default::default()
        };
        let mut session = Session::new(Box::new(FakeDisplay::default()), config, VIEWPORT);

        // Line both entities up on the view axis.
        let cube = session.entities[0].mesh;
        let sphere = session.entities[1].mesh;
        session
            .scene
            .set_object_translation(cube, Vec3::new(0.0, 0.0, -0.5));
        session
            .scene
            .set_object_translation(sphere, Vec3::new(0.0, 0.0, -1.0));

        assert_eq!(session.touch_start(&[CENTER]), 1);
        assert!(session.entities()[0].moved);
        assert!(!session.entities()[1].moved);
    }

    #[test]
    fn all_hits_policy_picks_every_entity_along_the_ray() {
        let mut session = session();
        let cube = session.entities[0].mesh;
        let sphere = session.entities[1].mesh;
        session
            .scene
            .set_object_translation(cube, Vec3::new(0.0, 0.0, -0.5));
        session
            .scene
            .set_object_translation(sphere, Vec3::new(0.0, 0.0, -1.0));

        assert_eq!(session.touch_start(&[CENTER]), 2);
        assert_eq!(session.touch_end(), 2);
        assert!(session.entities().iter().all(|entity| !entity.moved));
    }

    #[test]
    fn resize_updates_camera_and_target_only() {
        let mut session = session();
        let mut target = RecordingTarget::default();
        let before = session.entities().to_vec();

        session.handle_input(
            &InputEvent::Resize {
                width: 1280,
                height: 720,
            },
            &mut target,
        );

        assert_eq!(session.camera().aspect(), 1280.0 / 720.0);
        assert_eq!(session.viewport(), Viewport::new(1280, 720));
        assert_eq!(target.size, Some((1280, 720)));
        assert_eq!(session.entities(), &before[..]);
    }

    #[test]
    fn input_events_route_to_touch_handlers() {
        let mut session = session();
        let mut target = RecordingTarget::default();
        look_at_entity(&mut session, 0);

        session.handle_input(
            &InputEvent::TouchStart {
                touches: vec![CENTER],
            },
            &mut target,
        );
        assert!(session.entities()[0].moved);

        session.handle_input(&InputEvent::TouchEnd, &mut target);
        assert!(!session.entities()[0].moved);
        assert!(target.calls.is_empty());
    }

    #[test]
    fn tracking_update_moves_camera_and_records_anchors() {
        let mut display = FakeDisplay::with_pose(Pose {
            position: Vec3::new(0.0, 1.6, 0.0),
            orientation: Quat::IDENTITY,
        });
        display.pending_anchors = vec![Anchor {
            id: 3,
            transform: Mat4::IDENTITY,
        }];
        let mut session = Session::new(Box::new(display), SessionConfig::default(), VIEWPORT);

        session.update_tracking();

        assert_eq!(
            session.camera().world_position(session.scene()),
            Vec3::new(0.0, 1.6, 0.0)
        );
        assert_eq!(session.anchors().iter().count(), 1);
    }
}
