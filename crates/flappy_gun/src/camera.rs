use std::time::Duration;

use bevy::prelude::*;

use crate::gameplay::{GameState, GunFiredEvent};
use crate::player::Player;

const FOLLOW_SMOOTHING: f32 = 0.125;
const SHAKE_DURATION_SECS: f32 = 0.1;
const SHAKE_MAGNITUDE: f32 = 8.0;

#[derive(Resource)]
pub struct CameraShake {
    timer: Timer,
    offset: Vec2,
}

impl Default for CameraShake {
    fn default() -> Self {
        let mut timer = Timer::from_seconds(SHAKE_DURATION_SECS, TimerMode::Once);
        timer.tick(Duration::from_secs_f32(SHAKE_DURATION_SECS));

        Self {
            timer,
            offset: Vec2::ZERO,
        }
    }
}

impl CameraShake {
    fn trigger(&mut self) {
        self.timer.reset();
    }
}

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CameraShake>()
            .add_systems(Startup, setup)
            .add_systems(OnEnter(GameState::StartMenu), recenter_camera)
            .add_systems(Update, (shake_on_gunfire, follow_player).chain());
    }
}

fn setup(mut commands: Commands) {
    commands.spawn(Camera2d);
}

fn recenter_camera(
    mut shake: ResMut<CameraShake>,
    mut camera_query: Query<&mut Transform, With<Camera>>,
) {
    let Ok(mut transform) = camera_query.get_single_mut() else {
        return;
    };

    transform.translation = Vec3::new(0.0, 0.0, transform.translation.z);
    *shake = CameraShake::default();
}

fn shake_on_gunfire(mut shake: ResMut<CameraShake>, mut gun_fired: EventReader<GunFiredEvent>) {
    let fired = !gun_fired.is_empty();
    for _ in gun_fired.read() {} // Clear the queue

    if fired {
        shake.trigger();
    }
}

/// Eases the camera after the player. The shake offset from the previous
/// frame is removed before smoothing so it never leaks into the follow path.
fn follow_player(
    time: Res<Time>,
    mut shake: ResMut<CameraShake>,
    player_query: Query<&Transform, With<Player>>,
    mut camera_query: Query<&mut Transform, (With<Camera>, Without<Player>)>,
) {
    let Ok(player_transform) = player_query.get_single() else {
        return;
    };
    let Ok(mut camera_transform) = camera_query.get_single_mut() else {
        return;
    };

    shake.timer.tick(time.delta());

    let base = camera_transform.translation.truncate() - shake.offset;
    let target = player_transform.translation.truncate();
    let smoothed = base.lerp(target, FOLLOW_SMOOTHING);

    shake.offset = if shake.timer.finished() {
        Vec2::ZERO
    } else {
        Vec2::new(random_jitter(), random_jitter())
    };

    camera_transform.translation =
        (smoothed + shake.offset).extend(camera_transform.translation.z);
}

fn random_jitter() -> f32 {
    fastrand::f32().mul_add(2.0, -1.0) * SHAKE_MAGNITUDE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shake_starts_spent_and_rearms_on_trigger() {
        let mut shake = CameraShake::default();
        assert!(shake.timer.finished());

        shake.trigger();
        assert!(!shake.timer.finished());
    }
}
