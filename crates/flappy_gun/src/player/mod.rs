pub mod controls;
pub mod inputs;

use std::time::Duration;

use bevy::prelude::*;
use leafwing_input_manager::prelude::*;

use crate::enemies::{self, Enemy};
use crate::gameplay::{self, DeathCause, GameState, PlayerDiedEvent};
use crate::scene;

pub const PLAYER_SIZE: Vec2 = Vec2::new(48.0, 24.0);
pub const CYLINDER_CAPACITY: u32 = 6;
pub const START_MAGAZINES: u32 = 2;
/// Muzzle distance from the player center, along the aim direction.
pub(crate) const MUZZLE_OFFSET: f32 = 30.0;
pub(crate) const RECOIL_IMPULSE: f32 = 450.0;
const GRAVITY: f32 = 600.0;
const MAX_SPEED: f32 = 900.0;
const FIRE_COOLDOWN_SECS: f32 = 0.5;

#[derive(Component)]
pub struct Player {
    pub velocity: Vec2,
    pub rounds: u32,
    pub magazines: u32,
    pub fire_cooldown: Timer,
    /// Accumulated rotation towards the next reload, in radians.
    pub reload_progress: f32,
    pub aim_angle: f32,
    pub prev_aim_angle: Option<f32>,
}

impl Player {
    /// Feeds one aim sample into the reload gesture. Progress only
    /// accumulates while the cylinder is empty; a full turn consumes a
    /// magazine and refills the cylinder. Returns true when that happens.
    pub(crate) fn advance_reload_gesture(&mut self, aim_angle: f32) -> bool {
        use std::f32::consts::TAU;

        let Some(prev) = self.prev_aim_angle.replace(aim_angle) else {
            return false;
        };

        if self.rounds > 0 {
            self.reload_progress = 0.0;
            return false;
        }

        let step = angle_delta(prev, aim_angle).abs();
        self.reload_progress = (self.reload_progress + step).min(TAU);

        if self.reload_progress >= TAU && self.magazines > 0 {
            self.magazines -= 1;
            self.rounds = CYLINDER_CAPACITY;
            self.reload_progress = 0.0;
            return true;
        }

        false
    }
}

impl Default for Player {
    fn default() -> Self {
        let mut fire_cooldown = Timer::from_seconds(FIRE_COOLDOWN_SECS, TimerMode::Once);
        // The first shot of a round must not wait for the cooldown.
        fire_cooldown.tick(Duration::from_secs_f32(FIRE_COOLDOWN_SECS));

        Self {
            velocity: Vec2::ZERO,
            rounds: CYLINDER_CAPACITY,
            magazines: START_MAGAZINES,
            fire_cooldown,
            reload_progress: 0.0,
            aim_angle: 0.0,
            prev_aim_angle: None,
        }
    }
}

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(InputManagerPlugin::<inputs::Action>::default())
            .add_systems(Startup, setup)
            .add_systems(OnEnter(GameState::StartMenu), reset_player)
            .add_systems(
                Update,
                (
                    (controls::aim_gun, controls::track_reload_gesture).chain(),
                    controls::fire_gun,
                    move_player,
                    check_player_collisions,
                )
                    .run_if(in_state(GameState::Playing)),
            )
            .add_systems(
                Update,
                controls::pause_game.run_if(in_state(GameState::Playing)),
            )
            .add_systems(
                Update,
                controls::resume_game.run_if(in_state(GameState::Paused)),
            );
    }
}

fn setup(mut commands: Commands) {
    commands.spawn((
        Name::new("Player"),
        Player::default(),
        Sprite::from_color(Color::srgb(0.35, 0.35, 0.4), PLAYER_SIZE),
        Transform::from_xyz(0.0, 0.0, 1.0),
        InputManagerBundle::<inputs::Action> {
            input_map: inputs::create_input_map(),
            ..default()
        },
    ));
}

/// The player survives state transitions, so a fresh round just rewinds it.
fn reset_player(mut player_query: Query<(&mut Player, &mut Transform, &mut Sprite)>) {
    let Ok((mut player, mut transform, mut sprite)) = player_query.get_single_mut() else {
        return;
    };

    *player = Player::default();
    transform.translation = Vec3::new(0.0, 0.0, 1.0);
    transform.rotation = Quat::IDENTITY;
    sprite.flip_y = false;
}

fn move_player(time: Res<Time>, mut player_query: Query<(&mut Player, &mut Transform)>) {
    let Ok((mut player, mut transform)) = player_query.get_single_mut() else {
        return;
    };

    player.velocity.y -= GRAVITY * time.delta_secs();
    player.velocity = player.velocity.clamp_length_max(MAX_SPEED);
    transform.translation += (player.velocity * time.delta_secs()).extend(0.0);
}

fn check_player_collisions(
    player_query: Query<&Transform, With<Player>>,
    enemy_query: Query<&Transform, With<Enemy>>,
    mut death_events: EventWriter<PlayerDiedEvent>,
) {
    let Ok(player_transform) = player_query.get_single() else {
        return;
    };
    let player_pos = player_transform.translation.truncate();

    if player_pos.y - PLAYER_SIZE.y / 2.0 <= scene::GROUND_SURFACE_Y {
        death_events.send(PlayerDiedEvent {
            cause: DeathCause::GroundImpact,
        });
        return;
    }

    for enemy_transform in &enemy_query {
        if gameplay::check_aabb_collision(
            player_pos,
            PLAYER_SIZE,
            enemy_transform.translation.truncate(),
            enemies::ENEMY_SIZE,
        ) {
            death_events.send(PlayerDiedEvent {
                cause: DeathCause::Enemy,
            });
            return;
        }
    }
}

/// Shortest signed arc from one angle to another, in radians.
pub(crate) fn angle_delta(from: f32, to: f32) -> f32 {
    use std::f32::consts::{PI, TAU};

    let mut delta = (to - from) % TAU;
    if delta > PI {
        delta -= TAU;
    } else if delta < -PI {
        delta += TAU;
    }

    delta
}

#[cfg(test)]
mod tests {
    use std::f32::consts::TAU;

    use super::*;

    #[test]
    fn angle_delta_takes_the_short_way_around() {
        assert!((angle_delta(0.5, 1.0) - 0.5).abs() < 1e-6);

        // Crossing the -PI/PI seam is a small step, not a near-full turn.
        let crossing = angle_delta(3.0, -3.0);
        assert!(crossing > 0.0 && crossing < 0.5, "got {crossing}");

        let crossing_back = angle_delta(-3.0, 3.0);
        assert!(crossing_back < 0.0 && crossing_back > -0.5, "got {crossing_back}");
    }

    #[test]
    fn full_turn_accumulates_to_tau() {
        let steps = 8;
        let mut angle: f32 = 0.0;
        let mut total = 0.0;

        for _ in 0..steps {
            let next = angle + TAU / steps as f32;
            total += angle_delta(angle, next).abs();
            angle = next;
        }

        assert!((total - TAU).abs() < 1e-4, "got {total}");
    }

    #[test]
    fn player_starts_loaded_and_ready_to_fire() {
        let player = Player::default();

        assert_eq!(player.rounds, CYLINDER_CAPACITY);
        assert_eq!(player.magazines, START_MAGAZINES);
        assert!(player.fire_cooldown.finished());
    }

    /// Sweeps the aim through `turns` full rotations in small steps, the way
    /// frames feed the gesture, and reports whether a reload fired.
    fn sweep(player: &mut Player, turns: f32) -> bool {
        let steps = (turns * 16.0).ceil() as u32;
        let mut reloaded = false;

        for i in 0..=steps {
            let aim_angle = i as f32 / steps as f32 * turns * TAU;
            reloaded |= player.advance_reload_gesture(aim_angle);
        }

        reloaded
    }

    #[test]
    fn full_sweep_with_empty_cylinder_swaps_in_a_magazine() {
        let mut player = Player {
            rounds: 0,
            ..Player::default()
        };

        assert!(
            sweep(&mut player, 1.1),
            "a full turn with an empty cylinder should reload"
        );
        assert_eq!(player.rounds, CYLINDER_CAPACITY, "the cylinder should refill");
        assert_eq!(
            player.magazines,
            START_MAGAZINES - 1,
            "the reload should consume one magazine"
        );
        assert_eq!(
            player.reload_progress, 0.0,
            "the accumulator should reset after a reload"
        );
    }

    #[test]
    fn partial_sweep_keeps_the_cylinder_empty() {
        let mut player = Player {
            rounds: 0,
            ..Player::default()
        };

        assert!(!sweep(&mut player, 0.5), "half a turn must not reload");
        assert_eq!(player.rounds, 0);
        assert_eq!(player.magazines, START_MAGAZINES);
        assert!(
            player.reload_progress > 0.0,
            "partial progress should carry over to the next frame"
        );
    }

    #[test]
    fn gesture_saturates_without_magazines() {
        let mut player = Player {
            rounds: 0,
            magazines: 0,
            ..Player::default()
        };

        assert!(
            !sweep(&mut player, 3.0),
            "spinning without a magazine must do nothing"
        );
        assert_eq!(player.rounds, 0, "there is nothing to refill from");
        assert!(
            player.reload_progress <= TAU,
            "the accumulator must not grow past a full turn"
        );
    }

    #[test]
    fn rounds_in_the_cylinder_drop_any_progress() {
        let mut player = Player {
            rounds: 0,
            ..Player::default()
        };
        sweep(&mut player, 0.5);
        assert!(player.reload_progress > 0.0);

        player.rounds = 1;
        player.advance_reload_gesture(0.3);
        assert_eq!(
            player.reload_progress, 0.0,
            "a non-empty cylinder should clear the accumulator"
        );
    }
}
