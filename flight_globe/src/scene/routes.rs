//! Route scheduler: launches one arc per interval, cycling through routes.

use std::time::Duration;

use bevy::prelude::*;

use crate::config::GlobeConfig;
use crate::data::CityId;
use crate::scene::arcs::LaunchArc;
use crate::scene::CityRegistry;

/// Repeating launcher over a fixed list of (source, target) routes.
#[derive(Resource, Debug)]
pub struct RouteSchedule {
    timer: Timer,
    routes: Vec<(CityId, CityId)>,
    cursor: usize,
}

impl RouteSchedule {
    pub fn new(interval: Duration, routes: Vec<(CityId, CityId)>) -> Self {
        Self {
            timer: Timer::new(interval, TimerMode::Repeating),
            routes,
            cursor: 0,
        }
    }

    pub fn routes(&self) -> &[(CityId, CityId)] {
        &self.routes
    }

    /// Replaces the routes and restarts the rotation.
    pub fn set_routes(&mut self, routes: Vec<(CityId, CityId)>) {
        self.routes = routes;
        self.cursor = 0;
    }

    /// Next route in round-robin order.
    pub fn next_route(&mut self) -> Option<(CityId, CityId)> {
        let route = *self.routes.get(self.cursor % self.routes.len().max(1))?;
        self.cursor = (self.cursor + 1) % self.routes.len();
        Some(route)
    }

    /// Advances the timer and returns one launch per elapsed interval.
    pub fn tick(&mut self, dt: Duration) -> Vec<LaunchArc> {
        self.timer.tick(dt);
        (0..self.timer.times_finished_this_tick())
            .filter_map(|_| self.next_route())
            .map(|(source, target)| LaunchArc { source, target })
            .collect()
    }
}

/// Routes from the first registered city to every other one.
pub fn hub_routes(registry: &CityRegistry) -> Vec<(CityId, CityId)> {
    let mut ids = registry.iter().map(|(id, _)| id);
    let Some(hub) = ids.next() else {
        return Vec::new();
    };
    ids.map(|id| (hub, id)).collect()
}

pub fn route_plugin(app: &mut App) {
    app.add_systems(Startup, init_route_schedule)
        .add_systems(Update, schedule_routes_system);
}

fn init_route_schedule(mut commands: Commands, config: Res<GlobeConfig>) {
    commands.insert_resource(RouteSchedule::new(config.route_interval, Vec::new()));
}

fn schedule_routes_system(
    time: Res<Time>,
    registry: Res<CityRegistry>,
    schedule: Option<ResMut<RouteSchedule>>,
    mut launches: EventWriter<LaunchArc>,
) {
    let Some(mut schedule) = schedule else {
        return;
    };
    if schedule.routes().is_empty() && registry.len() > 1 {
        let routes = hub_routes(&registry);
        info!("skyroute: scheduling {} hub routes", routes.len());
        schedule.set_routes(routes);
    }
    launches.send_batch(schedule.tick(time.delta()));
}
