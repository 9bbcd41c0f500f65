use bevy::prelude::*;
use flappy_helpers::effects::TimedDespawn;

use crate::enemies::{self, Enemy};
use crate::gameplay::{self, EnemyKilledEvent, GameState, RoundEntity, ScoredEvent};
use crate::player;

const BULLET_SPEED: f32 = 1200.0;
const BULLET_SIZE: Vec2 = Vec2::new(12.0, 4.0);
const BULLET_LIFETIME_SECS: f32 = 3.0;
const MUZZLE_FLASH_SIZE: Vec2 = Vec2::splat(14.0);
const MUZZLE_FLASH_LIFETIME_SECS: f32 = 0.1;

#[derive(Component)]
pub struct Bullet {
    velocity: Vec2,
}

pub struct WeaponPlugin;

impl Plugin for WeaponPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (move_bullets, check_bullet_collisions).run_if(in_state(GameState::Playing)),
        );
    }
}

pub fn spawn_bullet(commands: &mut Commands, position: Vec2, direction: Vec2) {
    commands.spawn((
        Bullet {
            velocity: direction * BULLET_SPEED,
        },
        Sprite::from_color(Color::srgb(1.0, 0.85, 0.2), BULLET_SIZE),
        Transform::from_translation(position.extend(0.9))
            .with_rotation(Quat::from_rotation_z(direction.y.atan2(direction.x))),
        TimedDespawn::from_secs(BULLET_LIFETIME_SECS),
        RoundEntity,
    ));
}

/// Short-lived flash parented to the gun so it rides along with the recoil.
pub fn spawn_muzzle_flash(commands: &mut Commands, gun: Entity) {
    let flash = commands
        .spawn((
            Sprite::from_color(Color::srgb(1.0, 0.9, 0.4), MUZZLE_FLASH_SIZE),
            Transform::from_xyz(player::MUZZLE_OFFSET, 0.0, 0.1),
            TimedDespawn::from_secs(MUZZLE_FLASH_LIFETIME_SECS),
        ))
        .id();

    commands.entity(gun).add_child(flash);
}

fn move_bullets(time: Res<Time>, mut bullet_query: Query<(&Bullet, &mut Transform)>) {
    for (bullet, mut transform) in &mut bullet_query {
        transform.translation += (bullet.velocity * time.delta_secs()).extend(0.0);
    }
}

fn check_bullet_collisions(
    mut commands: Commands,
    bullet_query: Query<(Entity, &Transform), With<Bullet>>,
    enemy_query: Query<(Entity, &Transform), With<Enemy>>,
    mut scored_events: EventWriter<ScoredEvent>,
    mut enemy_killed_events: EventWriter<EnemyKilledEvent>,
) {
    // Entities despawn through commands at the end of the frame, so hits have
    // to be tracked here to keep one bullet from killing twice.
    let mut killed: Vec<Entity> = Vec::new();

    for (bullet_entity, bullet_transform) in &bullet_query {
        for (enemy_entity, enemy_transform) in &enemy_query {
            if killed.contains(&enemy_entity) {
                continue;
            }

            if gameplay::check_aabb_collision(
                bullet_transform.translation.truncate(),
                BULLET_SIZE,
                enemy_transform.translation.truncate(),
                enemies::ENEMY_SIZE,
            ) {
                killed.push(enemy_entity);
                commands.entity(bullet_entity).despawn_recursive();
                commands.entity(enemy_entity).despawn_recursive();
                scored_events.send(ScoredEvent {
                    points: gameplay::ENEMY_KILL_POINTS,
                    position: enemy_transform.translation.truncate(),
                });
                enemy_killed_events.send(EnemyKilledEvent);
                break;
            }
        }
    }
}
