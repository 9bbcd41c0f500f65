use bevy::prelude::*;
use flappy_helpers::input::pointer_world_position;
use leafwing_input_manager::prelude::*;

use crate::gameplay::{EmptyClickedEvent, GameState, GunFiredEvent, ReloadedEvent};
use crate::player::inputs::Action;
use crate::player::{self, Player};
use crate::weapons;

/// Points the gun at the pointer. The sprite flips instead of turning upside
/// down when aiming left.
pub fn aim_gun(
    touch_input: Res<Touches>,
    windows: Query<&Window>,
    camera: Query<(&Camera, &GlobalTransform)>,
    mut player_query: Query<(&mut Player, &mut Transform, &mut Sprite)>,
) {
    let Some(pointer) = pointer_world_position(&touch_input, &windows, &camera) else {
        return;
    };

    let (mut player, mut transform, mut sprite) = player_query.single_mut();

    let to_pointer = pointer - transform.translation.truncate();
    if to_pointer.length_squared() < 1.0 {
        return;
    }

    player.aim_angle = to_pointer.y.atan2(to_pointer.x);
    transform.rotation = Quat::from_rotation_z(player.aim_angle);
    sprite.flip_y = to_pointer.x < 0.0;
}

/// Reloading is a gesture: with an empty cylinder, sweep the gun through a
/// full turn to swap in the next magazine. Partial progress is kept across
/// frames and dropped as soon as the cylinder has rounds again.
pub fn track_reload_gesture(
    mut player_query: Query<&mut Player>,
    mut reloaded_events: EventWriter<ReloadedEvent>,
) {
    let mut player = player_query.single_mut();

    let aim_angle = player.aim_angle;
    if player.advance_reload_gesture(aim_angle) {
        reloaded_events.send(ReloadedEvent);
    }
}

pub fn fire_gun(
    mut commands: Commands,
    time: Res<Time>,
    touch_input: Res<Touches>,
    interactions: Query<&Interaction>,
    mut player_query: Query<(Entity, &ActionState<Action>, &mut Player, &Transform)>,
    mut gun_fired_events: EventWriter<GunFiredEvent>,
    mut empty_clicked_events: EventWriter<EmptyClickedEvent>,
) {
    let (entity, action_state, mut player, transform) = player_query.single_mut();

    player.fire_cooldown.tick(time.delta());

    // Leafwing Input Manager doesn't support touch input, so we need to check for it here
    if !action_state.just_pressed(&Action::Fire) && !touch_input.any_just_pressed() {
        return;
    }

    // Presses that land on a UI button belong to the button.
    if interactions
        .iter()
        .any(|interaction| *interaction != Interaction::None)
    {
        return;
    }

    if !player.fire_cooldown.finished() {
        return;
    }

    if player.rounds == 0 {
        // The hammer falls on an empty chamber without re-arming the cooldown.
        empty_clicked_events.send(EmptyClickedEvent);
        return;
    }

    player.rounds -= 1;
    player.fire_cooldown.reset();

    let aim = Vec2::from_angle(player.aim_angle);
    let muzzle = transform.translation.truncate() + aim * player::MUZZLE_OFFSET;
    weapons::spawn_bullet(&mut commands, muzzle, aim);
    weapons::spawn_muzzle_flash(&mut commands, entity);

    player.velocity -= aim * player::RECOIL_IMPULSE;
    gun_fired_events.send(GunFiredEvent);
}

pub fn pause_game(
    query: Query<&ActionState<Action>>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    let action_state = query.single();

    if action_state.just_pressed(&Action::Pause) {
        next_state.set(GameState::Paused);
    }
}

pub fn resume_game(
    query: Query<&ActionState<Action>>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    let action_state = query.single();

    if action_state.just_pressed(&Action::Pause) {
        next_state.set(GameState::Playing);
    }
}
