use bevy::prelude::*;
use flappy_helpers::save::{self, SaveData};
use strum::Display;

use crate::player::Player;

// Altitude band over which the sky darkens towards space
const SKY_LOW_ALTITUDE: f32 = 0.0;
const SKY_HIGH_ALTITUDE: f32 = 2400.0;
const SKY_LOW: Srgba = Srgba::new(0.47, 0.74, 0.92, 1.0);
const SKY_HIGH: Srgba = Srgba::new(0.01, 0.01, 0.08, 1.0);

pub const ENEMY_KILL_POINTS: u32 = 1;

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States, Display)]
pub enum GameState {
    #[default]
    StartMenu,
    Playing,
    Paused,
    GameOver,
}

/// Score of the round in progress. The persistent best lives in `SaveData`.
#[derive(Resource, Default, Copy, Clone)]
pub struct Score(pub u32);

/// Outcome details of the round that just ended, for the game over screen.
#[derive(Resource, Default, Copy, Clone)]
pub struct RoundResult {
    pub new_best: bool,
}

/// Everything spawned during a round. Despawned wholesale when the world
/// resets back to the start menu.
#[derive(Component)]
pub struct RoundEntity;

#[derive(Event)]
pub struct ScoredEvent {
    pub points: u32,
    pub position: Vec2,
}

#[derive(Event)]
pub struct GunFiredEvent;

#[derive(Event)]
pub struct EmptyClickedEvent;

#[derive(Event)]
pub struct ReloadedEvent;

#[derive(Event)]
pub struct EnemyKilledEvent;

#[derive(Event)]
pub struct PickupCollectedEvent {
    pub position: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathCause {
    Enemy,
    GroundImpact,
}

#[derive(Event)]
pub struct PlayerDiedEvent {
    pub cause: DeathCause,
}

pub struct GameFlowPlugin;

impl Plugin for GameFlowPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<GameState>()
            .init_resource::<Score>()
            .init_resource::<RoundResult>()
            .add_event::<ScoredEvent>()
            .add_event::<GunFiredEvent>()
            .add_event::<EmptyClickedEvent>()
            .add_event::<ReloadedEvent>()
            .add_event::<EnemyKilledEvent>()
            .add_event::<PickupCollectedEvent>()
            .add_event::<PlayerDiedEvent>()
            .add_systems(OnEnter(GameState::StartMenu), reset_world)
            .add_systems(OnExit(GameState::StartMenu), start_round)
            .add_systems(OnEnter(GameState::GameOver), record_high_score)
            .add_systems(
                Update,
                (
                    (apply_scoring, handle_player_death).run_if(in_state(GameState::Playing)),
                    update_sky_color.run_if(in_state(GameState::Playing)),
                    log_state_changes,
                ),
            );
    }
}

/// Removes the previous round from the world, the replacement for reloading
/// the whole scene.
fn reset_world(
    mut commands: Commands,
    round_entities: Query<Entity, With<RoundEntity>>,
    mut clear_color: ResMut<ClearColor>,
) {
    for entity in &round_entities {
        commands.entity(entity).despawn_recursive();
    }

    clear_color.0 = Color::Srgba(SKY_LOW);
}

fn start_round(mut score: ResMut<Score>, mut round_result: ResMut<RoundResult>) {
    score.0 = 0;
    *round_result = RoundResult::default();
}

fn apply_scoring(mut score: ResMut<Score>, mut scored_events: EventReader<ScoredEvent>) {
    for scored in scored_events.read() {
        score.0 += scored.points;
    }
}

fn handle_player_death(
    mut death_events: EventReader<PlayerDiedEvent>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    for death in death_events.read() {
        info!("player died: {:?}", death.cause);
        next_state.set(GameState::GameOver);
    }
}

pub fn record_high_score(
    score: Res<Score>,
    mut save_data: ResMut<SaveData>,
    mut round_result: ResMut<RoundResult>,
) {
    if score.0 > save_data.high_score {
        save_data.high_score = score.0;
        round_result.new_best = true;
        save::persist(&save_data);
    }
}

fn update_sky_color(
    player_query: Query<&Transform, With<Player>>,
    mut clear_color: ResMut<ClearColor>,
) {
    let Ok(transform) = player_query.get_single() else {
        return;
    };

    clear_color.0 = Color::Srgba(sky_color_at(transform.translation.y));
}

fn log_state_changes(mut transitions: EventReader<StateTransitionEvent<GameState>>) {
    for transition in transitions.read() {
        if let Some(entered) = &transition.entered {
            info!("State changed to {entered}");
        }
    }
}

/// Sky color for a given altitude, clamped to the band ends.
pub(crate) fn sky_color_at(altitude: f32) -> Srgba {
    let t = ((altitude - SKY_LOW_ALTITUDE) / (SKY_HIGH_ALTITUDE - SKY_LOW_ALTITUDE))
        .clamp(0.0, 1.0);

    // This lerp form hits the band colors exactly at t = 0 and t = 1.
    let lerp = |low: f32, high: f32| (1.0 - t).mul_add(low, t * high);

    Srgba::new(
        lerp(SKY_LOW.red, SKY_HIGH.red),
        lerp(SKY_LOW.green, SKY_HIGH.green),
        lerp(SKY_LOW.blue, SKY_HIGH.blue),
        1.0,
    )
}

pub fn check_aabb_collision(pos1: Vec2, size1: Vec2, pos2: Vec2, size2: Vec2) -> bool {
    pos1.x - size1.x / 2.0 < pos2.x + size2.x / 2.0
        && pos1.x + size1.x / 2.0 > pos2.x - size2.x / 2.0
        && pos1.y - size1.y / 2.0 < pos2.y + size2.y / 2.0
        && pos1.y + size1.y / 2.0 > pos2.y - size2.y / 2.0
}

#[cfg(test)]
mod tests {
    use bevy::state::app::StatesPlugin;

    use super::*;

    #[test]
    fn aabb_overlap_is_detected() {
        assert!(
            check_aabb_collision(
                Vec2::ZERO,
                Vec2::splat(10.0),
                Vec2::new(5.0, 5.0),
                Vec2::splat(10.0)
            ),
            "overlapping boxes should collide"
        );
    }

    #[test]
    fn aabb_separation_is_not_a_collision() {
        assert!(
            !check_aabb_collision(
                Vec2::ZERO,
                Vec2::splat(10.0),
                Vec2::new(20.0, 0.0),
                Vec2::splat(10.0)
            ),
            "separated boxes should not collide"
        );
        assert!(
            !check_aabb_collision(
                Vec2::ZERO,
                Vec2::splat(10.0),
                Vec2::new(10.0, 0.0),
                Vec2::splat(10.0)
            ),
            "boxes that only touch at the edge should not collide"
        );
    }

    #[test]
    fn sky_color_clamps_to_band_ends() {
        assert_eq!(
            sky_color_at(-500.0),
            SKY_LOW,
            "below the band the sky stays at the low color"
        );
        assert_eq!(
            sky_color_at(SKY_HIGH_ALTITUDE + 500.0),
            SKY_HIGH,
            "above the band the sky stays at the high color"
        );
    }

    #[test]
    fn sky_darkens_with_altitude() {
        let mid = sky_color_at(SKY_HIGH_ALTITUDE / 2.0);

        assert!(
            mid.blue < SKY_LOW.blue && mid.blue > SKY_HIGH.blue,
            "halfway up the sky should sit between the band colors"
        );
    }

    fn test_app() -> App {
        let mut app = App::new();
        app.add_plugins(StatesPlugin)
            .add_plugins(GameFlowPlugin)
            .insert_resource(ClearColor(Color::BLACK))
            .insert_resource(SaveData {
                high_score: 5,
                coins: 0,
            });
        app
    }

    fn set_state(app: &mut App, state: GameState) {
        app.world_mut()
            .resource_mut::<NextState<GameState>>()
            .set(state);
        app.update();
    }

    fn current_state(app: &App) -> GameState {
        *app.world().resource::<State<GameState>>().get()
    }

    #[test]
    fn round_flow_resets_and_gates_the_score() {
        let mut app = test_app();
        app.update();
        assert_eq!(
            current_state(&app),
            GameState::StartMenu,
            "the game should boot into the start menu"
        );

        // Scoring outside of a round must be ignored.
        app.world_mut().send_event(ScoredEvent {
            points: 3,
            position: Vec2::ZERO,
        });
        app.update();
        assert_eq!(
            app.world().resource::<Score>().0,
            0,
            "score must not change outside the playing state"
        );

        set_state(&mut app, GameState::Playing);
        assert_eq!(current_state(&app), GameState::Playing, "round should start");
        app.world_mut().send_event(ScoredEvent {
            points: 3,
            position: Vec2::ZERO,
        });
        app.update();
        assert_eq!(
            app.world().resource::<Score>().0,
            3,
            "score should accumulate while playing"
        );

        // Pausing keeps the score intact.
        set_state(&mut app, GameState::Paused);
        set_state(&mut app, GameState::Playing);
        assert_eq!(
            app.world().resource::<Score>().0,
            3,
            "resuming must not reset the score"
        );

        set_state(&mut app, GameState::GameOver);
        assert!(
            !app.world().resource::<RoundResult>().new_best,
            "a score below the saved best is not a new best"
        );
        assert_eq!(
            app.world().resource::<SaveData>().high_score,
            5,
            "the saved best should be untouched"
        );

        // Replay goes back through the menu and the next round starts clean.
        set_state(&mut app, GameState::StartMenu);
        set_state(&mut app, GameState::Playing);
        assert_eq!(
            app.world().resource::<Score>().0,
            0,
            "a new round should start with a clean score"
        );
    }

    #[test]
    fn player_death_ends_the_round() {
        let mut app = test_app();
        app.update();
        set_state(&mut app, GameState::Playing);

        app.world_mut().send_event(PlayerDiedEvent {
            cause: DeathCause::GroundImpact,
        });
        app.update();
        app.update();

        assert_eq!(
            current_state(&app),
            GameState::GameOver,
            "a death event while playing should end the round"
        );
    }
}
