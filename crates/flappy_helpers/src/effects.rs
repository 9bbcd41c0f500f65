use bevy::prelude::*;

/// Despawns the entity once the timer runs out. Used for one-shot effects
/// like muzzle flashes and collection bursts.
#[derive(Component)]
pub struct TimedDespawn {
    timer: Timer,
}

impl TimedDespawn {
    pub fn from_secs(secs: f32) -> Self {
        Self {
            timer: Timer::from_seconds(secs, TimerMode::Once),
        }
    }
}

pub fn despawn_expired(
    mut commands: Commands,
    time: Res<Time>,
    mut query: Query<(Entity, &mut TimedDespawn)>,
) {
    for (entity, mut despawn) in &mut query {
        despawn.timer.tick(time.delta());

        // Recursive so effects parented to another entity detach cleanly.
        if despawn.timer.finished() {
            commands.entity(entity).despawn_recursive();
        }
    }
}
