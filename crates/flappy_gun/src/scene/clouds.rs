use bevy::prelude::*;
use bevy::utils::HashSet;
use flappy_helpers::{WINDOW_HEIGHT, WINDOW_WIDTH};

use crate::gameplay::{GameState, RoundEntity};

const CLOUD_GRID_CELL: f32 = 640.0;
const CLOUDS_PER_CELL: usize = 5;
/// Clouds only live above this altitude, so the ground stays clear.
const MIN_CLOUD_Y: f32 = 300.0;
const CLOUD_SIZE: Vec2 = Vec2::new(110.0, 50.0);
const MIN_SCALE: f32 = 0.8;
const MAX_SCALE: f32 = 1.5;
const MIN_ALPHA: f32 = 0.4;
const MAX_ALPHA: f32 = 0.8;

#[derive(Component)]
pub struct Cloud;

/// Sky cells that already received their clouds, so revisiting an area does
/// not pile up more of them.
#[derive(Resource, Default)]
struct CloudCover {
    decorated: HashSet<IVec2>,
}

impl CloudCover {
    /// Whether `cell` still needs clouds. Marks the cell and its whole 3x3
    /// neighborhood as covered either way, which keeps adjacent cells from
    /// seeding too and spaces the cloud groups out.
    fn claim(&mut self, cell: IVec2) -> bool {
        let fresh = !self.decorated.contains(&cell);

        for dx in -1..=1 {
            for dy in -1..=1 {
                self.decorated.insert(cell + IVec2::new(dx, dy));
            }
        }

        fresh
    }
}

pub struct CloudPlugin;

impl Plugin for CloudPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CloudCover>()
            .add_systems(OnEnter(GameState::StartMenu), reset_clouds)
            .add_systems(Update, decorate_sky.run_if(in_state(GameState::Playing)));
    }
}

fn reset_clouds(mut cloud_cover: ResMut<CloudCover>) {
    cloud_cover.decorated.clear();
}

fn cell_of(position: Vec2) -> IVec2 {
    (position / CLOUD_GRID_CELL).floor().as_ivec2()
}

/// Keeps fresh clouds from popping up mid-screen by moving any in-view
/// position a full screen away along one axis.
fn push_outside_view(position: Vec2, camera_pos: Vec2, push_horizontal: bool) -> Vec2 {
    let frac = (position - camera_pos) / Vec2::new(WINDOW_WIDTH, WINDOW_HEIGHT) + 0.5;
    if !(0.0..1.0).contains(&frac.x) || !(0.0..1.0).contains(&frac.y) {
        return position;
    }

    let mut pushed = position;
    if push_horizontal {
        pushed.x += if frac.x < 0.5 {
            -WINDOW_WIDTH
        } else {
            WINDOW_WIDTH
        };
    } else {
        pushed.y += if frac.y < 0.5 {
            -WINDOW_HEIGHT
        } else {
            WINDOW_HEIGHT
        };
    }

    pushed
}

fn decorate_sky(
    mut commands: Commands,
    mut cloud_cover: ResMut<CloudCover>,
    camera_query: Query<&Transform, With<Camera>>,
) {
    let Ok(camera_transform) = camera_query.get_single() else {
        return;
    };
    let camera_pos = camera_transform.translation.truncate();
    let center = cell_of(camera_pos);

    if cloud_cover.claim(center) {
        seed_cell(&mut commands, center, camera_pos);
    }
}

fn seed_cell(commands: &mut Commands, cell: IVec2, camera_pos: Vec2) {
    for _ in 0..CLOUDS_PER_CELL {
        let offset = Vec2::new(fastrand::f32(), fastrand::f32());
        let position = (cell.as_vec2() + offset) * CLOUD_GRID_CELL;

        if position.y < MIN_CLOUD_Y {
            continue;
        }

        let position = push_outside_view(position, camera_pos, fastrand::bool());
        let scale = fastrand::f32().mul_add(MAX_SCALE - MIN_SCALE, MIN_SCALE);
        let alpha = fastrand::f32().mul_add(MAX_ALPHA - MIN_ALPHA, MIN_ALPHA);

        commands.spawn((
            Cloud,
            Sprite::from_color(Color::WHITE.with_alpha(alpha), CLOUD_SIZE),
            Transform::from_translation(position.extend(-1.0)).with_scale(Vec3::splat(scale)),
            RoundEntity,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_cell_seeds_per_visit_and_neighbors_stay_barren() {
        let mut cover = CloudCover::default();

        assert!(
            cover.claim(IVec2::ZERO),
            "the first visited cell should get clouds"
        );
        assert_eq!(
            cover.decorated.len(),
            9,
            "claiming a cell should mark its whole neighborhood"
        );

        for dx in -1..=1 {
            for dy in -1..=1 {
                assert!(
                    !cover.claim(IVec2::new(dx, dy)),
                    "cells next to a seeded one must not seed again"
                );
            }
        }

        assert!(
            cover.claim(IVec2::new(2, 0)),
            "a cell past the marked neighborhood should get its own clouds"
        );
    }

    #[test]
    fn cells_tile_the_plane_including_negatives() {
        assert_eq!(cell_of(Vec2::ZERO), IVec2::ZERO);
        assert_eq!(cell_of(Vec2::new(650.0, 10.0)), IVec2::new(1, 0));
        assert_eq!(cell_of(Vec2::new(-1.0, -1.0)), IVec2::new(-1, -1));
        assert_eq!(
            cell_of(Vec2::new(-CLOUD_GRID_CELL - 1.0, 0.0)),
            IVec2::new(-2, 0)
        );
    }

    fn in_view(position: Vec2, camera_pos: Vec2) -> bool {
        let offset = position - camera_pos;
        offset.x.abs() < WINDOW_WIDTH / 2.0 && offset.y.abs() < WINDOW_HEIGHT / 2.0
    }

    #[test]
    fn in_view_positions_get_pushed_out() {
        let camera = Vec2::new(1000.0, 500.0);
        let on_screen = camera + Vec2::new(40.0, -30.0);

        for push_horizontal in [true, false] {
            let pushed = push_outside_view(on_screen, camera, push_horizontal);
            assert!(
                !in_view(pushed, camera),
                "{pushed} should be outside the view around {camera}"
            );
        }
    }

    #[test]
    fn off_screen_positions_stay_put() {
        let camera = Vec2::ZERO;
        let off_screen = Vec2::new(WINDOW_WIDTH, 0.0);

        assert_eq!(push_outside_view(off_screen, camera, true), off_screen);
        assert_eq!(push_outside_view(off_screen, camera, false), off_screen);
    }
}
