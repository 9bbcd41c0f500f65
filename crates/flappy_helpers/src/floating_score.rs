use core::time::Duration;

use bevy::prelude::*;

use crate::FONT;

const RISE_DISTANCE: f32 = 40.0;

#[derive(Component)]
pub struct FloatingScore {
    timer: Timer,
    start: Vec2,
}

/// Spawns a short lived score popup at a world position. The popup rises and
/// fades out, then despawns itself through `animate_floating_scores`.
pub fn spawn_floating_score(
    commands: &mut Commands,
    position: Vec2,
    text: &str,
    color: Srgba,
    asset_server: &Res<AssetServer>,
) {
    commands.spawn((
        Text2d::new(text),
        TextFont {
            font: asset_server.load(FONT),
            font_size: 24.0,
            ..default()
        },
        TextColor(Color::Srgba(color)),
        Transform::from_translation(position.extend(5.0)),
        FloatingScore {
            timer: Timer::new(Duration::from_secs(1), TimerMode::Once),
            start: position,
        },
    ));
}

pub fn animate_floating_scores(
    mut commands: Commands,
    time: Res<Time>,
    mut query: Query<(Entity, &mut Transform, &mut TextColor, &mut FloatingScore)>,
) {
    for (entity, mut transform, mut color, mut floating_score) in &mut query {
        floating_score.timer.tick(time.delta());
        let progress = floating_score.timer.fraction();

        // Move upwards and fade out
        transform.translation.y = RISE_DISTANCE.mul_add(progress, floating_score.start.y);
        color.0 = color.0.with_alpha(1.0 - progress);

        if floating_score.timer.finished() {
            commands.entity(entity).despawn();
        }
    }
}
