pub mod clouds;

use bevy::prelude::*;

use crate::gameplay::GameState;
use crate::player::Player;

pub const GROUND_TILE_SIZE: Vec2 = Vec2::new(180.0, 40.0);
pub const GROUND_SURFACE_Y: f32 = GROUND_LEVEL_Y + GROUND_TILE_SIZE.y / 2.0;
const GROUND_TILE_COUNT: usize = 7;
const GROUND_LEVEL_Y: f32 = -270.0;
// Neighboring tiles overlap slightly so floating point drift never shows a seam.
const TILE_OVERLAP: f32 = 1.0;
const TILE_STRIDE: f32 = GROUND_TILE_SIZE.x - TILE_OVERLAP;

#[derive(Component)]
pub struct GroundTile;

pub struct ScenePlugin;

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(clouds::CloudPlugin)
            .add_systems(Startup, setup_ground)
            .add_systems(OnEnter(GameState::StartMenu), reset_ground)
            .add_systems(Update, recycle_ground.run_if(in_state(GameState::Playing)));
    }
}

fn setup_ground(mut commands: Commands) {
    for i in 0..GROUND_TILE_COUNT {
        commands.spawn((
            GroundTile,
            Sprite::from_color(Color::srgb(0.33, 0.24, 0.18), GROUND_TILE_SIZE),
            Transform::from_xyz(tile_start_x(i), GROUND_LEVEL_Y, 0.0),
        ));
    }
}

fn tile_start_x(index: usize) -> f32 {
    (index as f32 - (GROUND_TILE_COUNT as f32 - 1.0) / 2.0) * TILE_STRIDE
}

fn reset_ground(mut tile_query: Query<&mut Transform, With<GroundTile>>) {
    for (i, mut transform) in tile_query.iter_mut().enumerate() {
        transform.translation.x = tile_start_x(i);
    }
}

#[derive(Debug, PartialEq)]
enum Recycle {
    None,
    LeftToRight { new_x: f32 },
    RightToLeft { new_x: f32 },
}

/// Whether the strip of tiles spanning `min_x..max_x` needs its trailing tile
/// moved ahead of the player. Triggers once the player gets within half a
/// tile of the leading tile, early enough that the ground never runs out
/// under them.
fn ground_recycle(player_x: f32, min_x: f32, max_x: f32) -> Recycle {
    let trigger_distance = TILE_STRIDE / 2.0;

    if max_x - player_x < trigger_distance {
        Recycle::LeftToRight {
            new_x: max_x + TILE_STRIDE,
        }
    } else if player_x - min_x < trigger_distance {
        Recycle::RightToLeft {
            new_x: min_x - TILE_STRIDE,
        }
    } else {
        Recycle::None
    }
}

// Move tiles the player has left behind to the front, so a handful of tiles
// covers an endless ground.
fn recycle_ground(
    player_query: Query<&Transform, With<Player>>,
    mut tile_query: Query<&mut Transform, (With<GroundTile>, Without<Player>)>,
) {
    let Ok(player_transform) = player_query.get_single() else {
        return;
    };
    let player_x = player_transform.translation.x;

    let mut min_x = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    for transform in &tile_query {
        min_x = min_x.min(transform.translation.x);
        max_x = max_x.max(transform.translation.x);
    }

    let (old_x, new_x) = match ground_recycle(player_x, min_x, max_x) {
        Recycle::None => return,
        Recycle::LeftToRight { new_x } => (min_x, new_x),
        Recycle::RightToLeft { new_x } => (max_x, new_x),
    };

    for mut transform in &mut tile_query {
        if (transform.translation.x - old_x).abs() < 0.5 {
            transform.translation.x = new_x;
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip_bounds() -> (f32, f32) {
        (tile_start_x(0), tile_start_x(GROUND_TILE_COUNT - 1))
    }

    #[test]
    fn centered_player_needs_no_recycling() {
        let (min_x, max_x) = strip_bounds();

        assert_eq!(ground_recycle(0.0, min_x, max_x), Recycle::None);
        assert_eq!(ground_recycle(100.0, min_x, max_x), Recycle::None);
    }

    #[test]
    fn trailing_tiles_move_ahead_of_the_player() {
        let (min_x, max_x) = strip_bounds();

        let moving_right = ground_recycle(max_x, min_x, max_x);
        assert_eq!(
            moving_right,
            Recycle::LeftToRight {
                new_x: max_x + TILE_STRIDE
            }
        );

        let moving_left = ground_recycle(min_x, min_x, max_x);
        assert_eq!(
            moving_left,
            Recycle::RightToLeft {
                new_x: min_x - TILE_STRIDE
            }
        );
    }

    #[test]
    fn recycling_waits_for_the_half_tile_threshold() {
        let (min_x, max_x) = strip_bounds();

        // One full tile away from the edge: nothing to do yet.
        assert_eq!(
            ground_recycle(max_x - TILE_STRIDE, min_x, max_x),
            Recycle::None
        );

        // Just inside half a tile of the leading edge: recycle.
        assert_eq!(
            ground_recycle(max_x - TILE_STRIDE / 2.0 + 1.0, min_x, max_x),
            Recycle::LeftToRight {
                new_x: max_x + TILE_STRIDE
            }
        );
        assert_eq!(
            ground_recycle(min_x + TILE_STRIDE / 2.0 - 1.0, min_x, max_x),
            Recycle::RightToLeft {
                new_x: min_x - TILE_STRIDE
            }
        );
    }
}
