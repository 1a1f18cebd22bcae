use bevy::ecs::event::{EventRegistry, ShouldUpdateEvents};
use bevy::ecs::system::RunSystemOnce;
use bevy::prelude::*;
use bevy::transform::TransformPlugin;
use bevy::window::{CursorLeft, CursorMoved};

use flight_globe::interaction::{hover_plugin, CityClicked, CityHover, HoverState, PointerCapture};
use flight_globe::scene::{
    spawn_city_marker, CityRegistry, GlobeCamera, GlobeRoot, MarkerHandle, RenderSurface,
};
use flight_globe::ui::ScreenProjector;
use flight_globe::CityRecord;

struct Harness {
    app: App,
    markers: Vec<MarkerHandle>,
    projector: ScreenProjector,
}

/// Camera on +Z looking at two markers on the near side of a radius 100 globe.
fn harness() -> Harness {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, TransformPlugin))
        .init_resource::<Assets<Mesh>>()
        .init_resource::<Assets<StandardMaterial>>()
        .init_resource::<CityRegistry>()
        .init_resource::<RenderSurface>()
        .init_resource::<ButtonInput<MouseButton>>()
        .add_event::<CursorMoved>()
        .add_event::<CursorLeft>()
        .add_plugins(hover_plugin);
    // TimePlugin gates event buffer swaps on FixedUpdate; swap every update so
    // `iter_current_update_events` only sees the latest frame's events.
    app.world_mut()
        .resource_mut::<EventRegistry>()
        .should_update = ShouldUpdateEvents::Always;

    let camera_tf = Transform::from_xyz(0.0, 0.0, 300.0).looking_at(Vec3::ZERO, Vec3::Y);
    let projection = Projection::Perspective(PerspectiveProjection::default());
    app.world_mut()
        .spawn((GlobeCamera, projection.clone(), camera_tf));
    let root = app
        .world_mut()
        .spawn((GlobeRoot, Transform::IDENTITY, Visibility::default()))
        .id();

    let cities = vec![
        CityRecord::new("Front", -90.0, 0.0, 0xff0000),
        CityRecord::new("Right", -70.0, 0.0, 0x00ff00),
    ];
    let markers = app
        .world_mut()
        .run_system_once(
            move |mut commands: Commands,
                  mut meshes: ResMut<Assets<Mesh>>,
                  mut materials: ResMut<Assets<StandardMaterial>>,
                  mut registry: ResMut<CityRegistry>| {
                cities
                    .iter()
                    .cloned()
                    .map(|record| {
                        spawn_city_marker(
                            &mut commands,
                            &mut meshes,
                            &mut materials,
                            &mut registry,
                            root,
                            record,
                            100.0,
                        )
                    })
                    .collect::<Vec<_>>()
            },
        )
        .expect("markers spawn");

    // Propagate transforms before the first pointer event.
    app.update();

    let size = app.world().resource::<RenderSurface>().size();
    let projector =
        ScreenProjector::from_camera(&projection, &GlobalTransform::from(camera_tf), size);
    Harness {
        app,
        markers,
        projector,
    }
}

impl Harness {
    fn pixel_of(&self, marker: usize) -> Vec2 {
        let point = self.projector.project(self.markers[marker].position());
        assert!(point.visible);
        Vec2::new(point.x, point.y)
    }

    fn move_to(&mut self, position: Vec2) -> Vec<CityHover> {
        let window = Entity::PLACEHOLDER;
        self.app.world_mut().send_event(CursorMoved {
            window,
            position,
            delta: None,
        });
        self.app.update();
        self.hover_events()
    }

    fn leave_window(&mut self) -> Vec<CityHover> {
        self.app.world_mut().send_event(CursorLeft {
            window: Entity::PLACEHOLDER,
        });
        self.app.update();
        self.hover_events()
    }

    fn hover_events(&self) -> Vec<CityHover> {
        self.app
            .world()
            .resource::<Events<CityHover>>()
            .iter_current_update_events()
            .copied()
            .collect()
    }

    fn set_over_ui(&mut self, over_ui: bool) {
        self.app.world_mut().insert_resource(PointerCapture { over_ui });
    }

    fn click(&mut self) -> Vec<CityClicked> {
        let mut mouse = self.app.world_mut().resource_mut::<ButtonInput<MouseButton>>();
        mouse.release(MouseButton::Left);
        mouse.clear();
        mouse.press(MouseButton::Left);
        self.app.update();
        self.app
            .world()
            .resource::<Events<CityClicked>>()
            .iter_current_update_events()
            .copied()
            .collect()
    }

    fn state(&self) -> &HoverState {
        self.app.world().resource::<HoverState>()
    }
}

#[test]
fn enter_fires_once_while_the_pointer_stays_on_a_city() {
    let mut h = harness();
    let front = h.markers[0].id;
    let at = h.pixel_of(0);

    assert_eq!(h.move_to(at), vec![CityHover::Enter(front)]);
    assert!(h.move_to(at + Vec2::new(0.5, 0.0)).is_empty());

    let state = h.state();
    assert!(state.visible);
    assert_eq!(state.position, at + Vec2::new(0.5, 0.0));
    assert_eq!(state.city.as_ref().map(|c| c.name.as_str()), Some("Front"));
}

#[test]
fn moving_between_cities_leaves_before_entering() {
    let mut h = harness();
    let (front, right) = (h.markers[0].id, h.markers[1].id);

    h.move_to(h.pixel_of(0));
    let events = h.move_to(h.pixel_of(1));

    assert_eq!(events, vec![CityHover::Leave(front), CityHover::Enter(right)]);
    assert_eq!(
        h.state().city.as_ref().map(|c| c.name.as_str()),
        Some("Right")
    );
}

#[test]
fn empty_space_and_leaving_the_window_clear_the_hover() {
    let mut h = harness();
    let front = h.markers[0].id;

    h.move_to(h.pixel_of(0));
    assert_eq!(h.move_to(Vec2::new(40.0, 40.0)), vec![CityHover::Leave(front)]);
    assert!(!h.state().visible);

    h.move_to(h.pixel_of(0));
    assert_eq!(h.leave_window(), vec![CityHover::Leave(front)]);
    assert!(h.state().city.is_none());
    assert!(h.leave_window().is_empty());
}

#[test]
fn destroyed_marker_is_no_longer_hoverable() {
    let mut h = harness();
    let at = h.pixel_of(0);
    let marker = h.markers[0];

    h.app
        .world_mut()
        .run_system_once(move |mut commands: Commands, mut registry: ResMut<CityRegistry>| {
            marker.destroy(&mut commands, &mut registry);
        })
        .expect("destroy runs");

    assert!(h.move_to(at).is_empty());
    assert!(!h.state().visible);
}

#[test]
fn overlay_under_the_pointer_hides_the_city_behind_it() {
    let mut h = harness();
    let front = h.markers[0].id;
    let at = h.pixel_of(0);
    h.move_to(at);

    h.set_over_ui(true);
    assert_eq!(h.move_to(at), vec![CityHover::Leave(front)]);
    assert!(!h.state().visible);

    h.set_over_ui(false);
    assert_eq!(h.move_to(at), vec![CityHover::Enter(front)]);
}

#[test]
fn clicks_on_an_overlay_do_not_reach_the_city() {
    let mut h = harness();
    let front = h.markers[0].id;
    h.move_to(h.pixel_of(0));

    h.set_over_ui(true);
    assert!(h.click().is_empty());

    h.set_over_ui(false);
    assert_eq!(h.click(), vec![CityClicked(front)]);
}
