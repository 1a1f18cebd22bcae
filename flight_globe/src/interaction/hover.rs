//! Pointer hover and click tracking over city markers.

use bevy::prelude::*;
use bevy::window::{CursorLeft, CursorMoved};

use crate::data::{CityId, CityRecord};
use crate::interaction::pick::{camera_ray, pick_city, PickShape};
use crate::scene::{CityRegistry, GlobeCamera, RenderSurface};

/// What the tooltip shows.
#[derive(Resource, Clone, Debug, Default, PartialEq)]
pub struct HoverState {
    pub visible: bool,
    /// Pointer position in logical pixels.
    pub position: Vec2,
    pub city: Option<CityRecord>,
}

/// Hover transitions, in the order they happened.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub enum CityHover {
    Enter(CityId),
    Leave(CityId),
}

/// Left click on a city.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct CityClicked(pub CityId);

/// Whether an overlay owns the pointer this frame. While set, pointer input
/// does not reach the scene.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PointerCapture {
    pub over_ui: bool,
}

/// Remembers the hovered city across pointer moves.
#[derive(Resource, Debug, Default)]
pub struct HoverController {
    hovered: Option<CityId>,
}

impl HoverController {
    pub fn hovered(&self) -> Option<CityId> {
        self.hovered
    }

    /// Applies a pointer move where `found` is the city under the pointer.
    /// Returns the resulting transitions; a leave always precedes an enter.
    pub fn pointer_moved(
        &mut self,
        found: Option<CityId>,
        position: Vec2,
        registry: &CityRegistry,
        state: &mut HoverState,
    ) -> Vec<CityHover> {
        // A city without a record can't be shown.
        let found = found.filter(|id| registry.record(*id).is_some());
        let mut transitions = Vec::new();

        match (self.hovered, found) {
            (Some(current), Some(next)) if current == next => {}
            (current, next) => {
                if let Some(current) = current {
                    transitions.push(CityHover::Leave(current));
                }
                if let Some(next) = next {
                    transitions.push(CityHover::Enter(next));
                }
                self.hovered = next;
            }
        }

        match self.hovered.and_then(|id| registry.record(id)) {
            Some(record) => {
                state.visible = true;
                state.position = position;
                if state.city.as_ref() != Some(record) {
                    state.city = Some(record.clone());
                }
            }
            None => {
                state.visible = false;
                state.city = None;
            }
        }
        transitions
    }

    /// Pointer left the surface.
    pub fn pointer_left(&mut self, state: &mut HoverState) -> Option<CityHover> {
        state.visible = false;
        state.city = None;
        self.hovered.take().map(CityHover::Leave)
    }
}

pub fn hover_plugin(app: &mut App) {
    app.init_resource::<HoverState>()
        .init_resource::<HoverController>()
        .init_resource::<PointerCapture>()
        .init_resource::<RenderSurface>()
        .init_resource::<CityRegistry>()
        .add_event::<CityHover>()
        .add_event::<CityClicked>()
        .add_systems(
            Update,
            (
                pointer_moved_system,
                pointer_left_system,
                city_click_system,
                log_hover_system,
            )
                .chain(),
        );
}

#[allow(clippy::too_many_arguments)]
fn pointer_moved_system(
    mut moved: EventReader<CursorMoved>,
    surface: Res<RenderSurface>,
    camera_query: Query<(&Projection, &GlobalTransform), With<GlobeCamera>>,
    targets: Query<(Entity, &GlobalTransform, &PickShape)>,
    registry: Res<CityRegistry>,
    capture: Res<PointerCapture>,
    mut controller: ResMut<HoverController>,
    mut state: ResMut<HoverState>,
    mut hover_events: EventWriter<CityHover>,
) {
    let Some(last) = moved.read().last() else {
        return;
    };
    let Ok((projection, cam_tf)) = camera_query.get_single() else {
        return;
    };
    // A city under an overlay panel counts as not found.
    let found = if capture.over_ui {
        None
    } else {
        camera_ray(projection, cam_tf, last.position, surface.size())
            .and_then(|ray| pick_city(ray, &targets, &registry))
    };

    let transitions = controller.pointer_moved(found, last.position, &registry, &mut state);
    hover_events.send_batch(transitions);
}

fn pointer_left_system(
    mut left: EventReader<CursorLeft>,
    mut controller: ResMut<HoverController>,
    mut state: ResMut<HoverState>,
    mut hover_events: EventWriter<CityHover>,
) {
    if left.read().last().is_none() {
        return;
    }
    if let Some(leave) = controller.pointer_left(&mut state) {
        hover_events.send(leave);
    }
}

fn city_click_system(
    mouse: Option<Res<ButtonInput<MouseButton>>>,
    capture: Res<PointerCapture>,
    controller: Res<HoverController>,
    registry: Res<CityRegistry>,
    mut clicked: EventWriter<CityClicked>,
) {
    let Some(mouse) = mouse else {
        return;
    };
    if !mouse.just_pressed(MouseButton::Left) || capture.over_ui {
        return;
    }
    if let Some(id) = controller.hovered() {
        if let Some(record) = registry.record(id) {
            info!("skyroute: clicked {}", record.name);
        }
        clicked.send(CityClicked(id));
    }
}

fn log_hover_system(mut hover_events: EventReader<CityHover>, registry: Res<CityRegistry>) {
    for event in hover_events.read() {
        let (verb, id) = match *event {
            CityHover::Enter(id) => ("enter", id),
            CityHover::Leave(id) => ("leave", id),
        };
        let name = registry.record(id).map_or("?", |r| r.name.as_str());
        debug!("skyroute: hover {verb} {name}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with(names: &[&str]) -> (CityRegistry, Vec<CityId>) {
        let mut world = World::new();
        let mut registry = CityRegistry::default();
        let ids = names
            .iter()
            .map(|name| {
                let root = world.spawn_empty().id();
                registry.insert(CityRecord::new(*name, 0.0, 0.0, 0xffffff), root, Vec3::ZERO)
            })
            .collect();
        (registry, ids)
    }

    #[test]
    fn enter_fires_once_per_city() {
        let (registry, ids) = registry_with(&["A"]);
        let mut controller = HoverController::default();
        let mut state = HoverState::default();

        let first = controller.pointer_moved(Some(ids[0]), Vec2::new(10.0, 10.0), &registry, &mut state);
        let second = controller.pointer_moved(Some(ids[0]), Vec2::new(12.0, 11.0), &registry, &mut state);

        assert_eq!(first, vec![CityHover::Enter(ids[0])]);
        assert!(second.is_empty());
        assert!(state.visible);
        assert_eq!(state.position, Vec2::new(12.0, 11.0));
        assert_eq!(state.city.as_ref().map(|c| c.name.as_str()), Some("A"));
    }

    #[test]
    fn switching_cities_leaves_before_entering() {
        let (registry, ids) = registry_with(&["A", "B"]);
        let mut controller = HoverController::default();
        let mut state = HoverState::default();

        controller.pointer_moved(Some(ids[0]), Vec2::ZERO, &registry, &mut state);
        let switched = controller.pointer_moved(Some(ids[1]), Vec2::ONE, &registry, &mut state);

        assert_eq!(switched, vec![CityHover::Leave(ids[0]), CityHover::Enter(ids[1])]);
        assert_eq!(controller.hovered(), Some(ids[1]));
        assert_eq!(state.city.as_ref().map(|c| c.name.as_str()), Some("B"));
    }

    #[test]
    fn moving_off_hides_the_tooltip() {
        let (registry, ids) = registry_with(&["A"]);
        let mut controller = HoverController::default();
        let mut state = HoverState::default();

        controller.pointer_moved(Some(ids[0]), Vec2::ZERO, &registry, &mut state);
        let off = controller.pointer_moved(None, Vec2::new(400.0, 5.0), &registry, &mut state);

        assert_eq!(off, vec![CityHover::Leave(ids[0])]);
        assert!(!state.visible);
        assert!(state.city.is_none());
        assert!(controller
            .pointer_moved(None, Vec2::ZERO, &registry, &mut state)
            .is_empty());
    }

    #[test]
    fn pointer_left_clears_hover() {
        let (registry, ids) = registry_with(&["A"]);
        let mut controller = HoverController::default();
        let mut state = HoverState::default();

        assert_eq!(controller.pointer_left(&mut state), None);
        controller.pointer_moved(Some(ids[0]), Vec2::ZERO, &registry, &mut state);
        assert_eq!(controller.pointer_left(&mut state), Some(CityHover::Leave(ids[0])));
        assert!(!state.visible);
        assert_eq!(controller.hovered(), None);
    }

    #[test]
    fn removed_city_counts_as_leaving() {
        let (mut registry, ids) = registry_with(&["A"]);
        let mut controller = HoverController::default();
        let mut state = HoverState::default();

        controller.pointer_moved(Some(ids[0]), Vec2::ZERO, &registry, &mut state);
        registry.remove(ids[0]);
        let after = controller.pointer_moved(Some(ids[0]), Vec2::ZERO, &registry, &mut state);

        assert_eq!(after, vec![CityHover::Leave(ids[0])]);
        assert!(!state.visible);
    }

    #[test]
    fn plugin_runs_on_its_own() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .add_event::<CursorMoved>()
            .add_event::<CursorLeft>()
            .add_plugins(hover_plugin);

        app.world_mut().send_event(CursorMoved {
            window: Entity::PLACEHOLDER,
            position: Vec2::new(10.0, 10.0),
            delta: None,
        });
        app.update();

        assert!(app.world().contains_resource::<RenderSurface>());
        assert!(!app.world().resource::<HoverState>().visible);
    }
}
