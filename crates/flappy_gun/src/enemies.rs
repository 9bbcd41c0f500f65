use bevy::prelude::*;
use flappy_helpers::{WINDOW_HEIGHT, WINDOW_WIDTH};

use crate::gameplay::{GameState, RoundEntity};
use crate::scene;

pub const ENEMY_SIZE: Vec2 = Vec2::new(36.0, 28.0);
const ENEMY_SPEED: f32 = 120.0;
const ENEMY_GRAVITY: f32 = 180.0;
// Gravity times the hop interval: each hop puts back exactly what gravity
// took since the last one, so a hopping enemy holds altitude.
const ENEMY_HOP_IMPULSE: f32 = ENEMY_GRAVITY * ENEMY_HOP_INTERVAL_SECS;
const ENEMY_HOP_INTERVAL_SECS: f32 = 1.5;
const SPAWN_INTERVAL_SECS: f32 = 2.0;
const SPAWN_EDGE_OFFSET: f32 = 32.0;
const SPAWN_VERTICAL_SPAN: f32 = WINDOW_HEIGHT * 0.8;
const DESPAWN_RADIUS: f32 = 1000.0;

#[derive(Component)]
pub struct Enemy {
    velocity: Vec2,
    hop_timer: Timer,
}

impl Enemy {
    /// An upward kick on top of whatever the enemy is already doing, so a
    /// falling enemy hops weaker than a rising one, like a flapped wing.
    fn hop(&mut self) {
        self.velocity.y += ENEMY_HOP_IMPULSE;
        self.hop_timer = Timer::from_seconds(ENEMY_HOP_INTERVAL_SECS, TimerMode::Once);
    }
}

#[derive(Resource)]
struct EnemySpawnTimer(Timer);

impl Default for EnemySpawnTimer {
    fn default() -> Self {
        Self(Timer::from_seconds(
            SPAWN_INTERVAL_SECS,
            TimerMode::Repeating,
        ))
    }
}

pub struct EnemyPlugin;

impl Plugin for EnemyPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<EnemySpawnTimer>()
            .add_systems(OnExit(GameState::StartMenu), reset_spawn_timer)
            .add_systems(
                Update,
                (spawn_enemies, move_enemies, despawn_distant)
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

fn reset_spawn_timer(mut spawn_timer: ResMut<EnemySpawnTimer>) {
    *spawn_timer = EnemySpawnTimer::default();
}

/// Where an enemy enters relative to the camera, and which way it flies.
fn spawn_point(camera_pos: Vec2, from_right: bool, vertical_offset: f32) -> (Vec2, f32) {
    let half_width = WINDOW_WIDTH / 2.0 + SPAWN_EDGE_OFFSET;

    if from_right {
        (
            Vec2::new(camera_pos.x + half_width, camera_pos.y + vertical_offset),
            -1.0,
        )
    } else {
        (
            Vec2::new(camera_pos.x - half_width, camera_pos.y + vertical_offset),
            1.0,
        )
    }
}

fn spawn_enemies(
    mut commands: Commands,
    time: Res<Time>,
    mut spawn_timer: ResMut<EnemySpawnTimer>,
    camera_query: Query<&Transform, With<Camera>>,
) {
    if !spawn_timer.0.tick(time.delta()).just_finished() {
        return;
    }

    let Ok(camera_transform) = camera_query.get_single() else {
        return;
    };

    let vertical_offset =
        fastrand::f32().mul_add(SPAWN_VERTICAL_SPAN, -SPAWN_VERTICAL_SPAN / 2.0);
    let (mut position, direction) = spawn_point(
        camera_transform.translation.truncate(),
        fastrand::bool(),
        vertical_offset,
    );
    position.y = position.y.max(scene::GROUND_SURFACE_Y + ENEMY_SIZE.y);

    commands.spawn((
        Enemy {
            velocity: Vec2::new(direction * ENEMY_SPEED, 0.0),
            // Randomized so a wave of enemies doesn't hop in lockstep.
            hop_timer: Timer::from_seconds(
                fastrand::f32() * ENEMY_HOP_INTERVAL_SECS,
                TimerMode::Once,
            ),
        },
        Sprite::from_color(Color::srgb(0.86, 0.2, 0.27), ENEMY_SIZE),
        Transform::from_translation(position.extend(0.8)),
        RoundEntity,
    ));
}

fn move_enemies(time: Res<Time>, mut enemy_query: Query<(&mut Enemy, &mut Transform)>) {
    for (mut enemy, mut transform) in &mut enemy_query {
        if enemy.hop_timer.tick(time.delta()).just_finished() {
            enemy.hop();
        }

        enemy.velocity.y -= ENEMY_GRAVITY * time.delta_secs();
        transform.translation += (enemy.velocity * time.delta_secs()).extend(0.0);
    }
}

fn despawn_distant(
    mut commands: Commands,
    camera_query: Query<&Transform, With<Camera>>,
    enemy_query: Query<(Entity, &Transform), With<Enemy>>,
) {
    let Ok(camera_transform) = camera_query.get_single() else {
        return;
    };
    let camera_pos = camera_transform.translation.truncate();

    for (entity, transform) in &enemy_query {
        if camera_pos.distance(transform.translation.truncate()) > DESPAWN_RADIUS {
            commands.entity(entity).despawn_recursive();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hops_stack_on_the_current_velocity() {
        let mut enemy = Enemy {
            velocity: Vec2::new(ENEMY_SPEED, -40.0),
            hop_timer: Timer::from_seconds(0.0, TimerMode::Once),
        };

        enemy.hop();

        assert!(
            (enemy.velocity.y - (ENEMY_HOP_IMPULSE - 40.0)).abs() < f32::EPSILON,
            "the hop should add to the downward velocity, not replace it"
        );
        assert!(
            !enemy.hop_timer.finished(),
            "hopping should re-arm the hop timer"
        );
    }

    #[test]
    fn hop_impulse_cancels_gravity_over_one_interval() {
        assert!(
            (ENEMY_HOP_IMPULSE - ENEMY_GRAVITY * ENEMY_HOP_INTERVAL_SECS).abs() < f32::EPSILON,
            "a hop must put back what gravity removes between hops"
        );
    }

    #[test]
    fn enemies_enter_just_outside_the_screen() {
        let camera = Vec2::new(100.0, 50.0);

        let (left, direction) = spawn_point(camera, false, 10.0);
        assert!(left.x < camera.x - WINDOW_WIDTH / 2.0);
        assert!(direction > 0.0, "a left spawn should fly right");
        assert!((left.y - 60.0).abs() < 1e-6);

        let (right, direction) = spawn_point(camera, true, -10.0);
        assert!(right.x > camera.x + WINDOW_WIDTH / 2.0);
        assert!(direction < 0.0, "a right spawn should fly left");
        assert!((right.y - 40.0).abs() < 1e-6);
    }
}
