use bevy::prelude::*;
use flappy_helpers::effects::TimedDespawn;
use flappy_helpers::{WINDOW_HEIGHT, WINDOW_WIDTH};

use crate::gameplay::{self, GameState, PickupCollectedEvent, RoundEntity};
use crate::player::{Player, PLAYER_SIZE};
use crate::scene;

const PICKUP_SIZE: Vec2 = Vec2::splat(22.0);
const MIN_SPAWN_INTERVAL_SECS: f32 = 5.0;
const MAX_SPAWN_INTERVAL_SECS: f32 = 10.0;
/// Fraction of the viewport kept clear at each edge so pickups never appear
/// half off screen.
const EDGE_BUFFER: f32 = 0.1;
const DESPAWN_RADIUS: f32 = 1000.0;
const BURST_SCALE: f32 = 1.6;
const BURST_LIFETIME_SECS: f32 = 0.15;

#[derive(Component)]
pub struct AmmoPickup;

#[derive(Resource)]
struct PickupSpawnTimer(Timer);

impl Default for PickupSpawnTimer {
    fn default() -> Self {
        Self(Timer::from_seconds(random_interval(), TimerMode::Once))
    }
}

fn random_interval() -> f32 {
    fastrand::f32().mul_add(
        MAX_SPAWN_INTERVAL_SECS - MIN_SPAWN_INTERVAL_SECS,
        MIN_SPAWN_INTERVAL_SECS,
    )
}

pub struct PickupPlugin;

impl Plugin for PickupPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PickupSpawnTimer>()
            .add_systems(OnExit(GameState::StartMenu), reset_spawn_timer)
            .add_systems(
                Update,
                (spawn_pickups, collect_pickups, despawn_distant)
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

fn reset_spawn_timer(mut spawn_timer: ResMut<PickupSpawnTimer>) {
    *spawn_timer = PickupSpawnTimer::default();
}

fn spawn_pickups(
    mut commands: Commands,
    time: Res<Time>,
    mut spawn_timer: ResMut<PickupSpawnTimer>,
    camera_query: Query<&Transform, With<Camera>>,
) {
    if !spawn_timer.0.tick(time.delta()).just_finished() {
        return;
    }
    *spawn_timer = PickupSpawnTimer::default();

    let Ok(camera_transform) = camera_query.get_single() else {
        return;
    };
    let camera_pos = camera_transform.translation.truncate();

    let span = 1.0 - 2.0 * EDGE_BUFFER;
    let mut position = camera_pos
        + Vec2::new(
            (fastrand::f32() - 0.5) * span * WINDOW_WIDTH,
            (fastrand::f32() - 0.5) * span * WINDOW_HEIGHT,
        );
    position.y = position.y.max(scene::GROUND_SURFACE_Y + PICKUP_SIZE.y);

    commands.spawn((
        AmmoPickup,
        Sprite::from_color(Color::srgb(0.93, 0.79, 0.25), PICKUP_SIZE),
        Transform::from_translation(position.extend(0.7)),
        RoundEntity,
    ));
}

fn collect_pickups(
    mut commands: Commands,
    mut player_query: Query<(&Transform, &mut Player)>,
    pickup_query: Query<(Entity, &Transform), With<AmmoPickup>>,
    mut collected_events: EventWriter<PickupCollectedEvent>,
) {
    let Ok((player_transform, mut player)) = player_query.get_single_mut() else {
        return;
    };
    let player_pos = player_transform.translation.truncate();

    for (entity, transform) in &pickup_query {
        let position = transform.translation.truncate();

        if gameplay::check_aabb_collision(player_pos, PLAYER_SIZE, position, PICKUP_SIZE) {
            player.magazines += 1;
            commands.entity(entity).despawn_recursive();

            // Brief flash where the pickup sat.
            commands.spawn((
                Sprite::from_color(Color::srgb(1.0, 0.95, 0.6), PICKUP_SIZE * BURST_SCALE),
                Transform::from_translation(position.extend(0.75)),
                TimedDespawn::from_secs(BURST_LIFETIME_SECS),
                RoundEntity,
            ));

            collected_events.send(PickupCollectedEvent { position });
        }
    }
}

fn despawn_distant(
    mut commands: Commands,
    camera_query: Query<&Transform, With<Camera>>,
    pickup_query: Query<(Entity, &Transform), With<AmmoPickup>>,
) {
    let Ok(camera_transform) = camera_query.get_single() else {
        return;
    };
    let camera_pos = camera_transform.translation.truncate();

    for (entity, transform) in &pickup_query {
        if camera_pos.distance(transform.translation.truncate()) > DESPAWN_RADIUS {
            commands.entity(entity).despawn_recursive();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_intervals_stay_in_range() {
        for _ in 0..100 {
            let interval = random_interval();
            assert!(
                (MIN_SPAWN_INTERVAL_SECS..MAX_SPAWN_INTERVAL_SECS).contains(&interval),
                "got {interval}"
            );
        }
    }
}
