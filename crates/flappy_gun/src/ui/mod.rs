use bevy::color::palettes::css::{GOLD, GREEN};
use bevy::prelude::*;
use flappy_helpers::floating_score::{animate_floating_scores, spawn_floating_score};
use flappy_helpers::input::just_pressed_screen_position;
use flappy_helpers::save::SaveData;
use flappy_helpers::{FONT, RewardedAdRequest, effects};

use crate::ads::{AdAvailability, AdsConfig};
use crate::gameplay::{GameState, PickupCollectedEvent, RoundResult, Score, ScoredEvent};
use crate::player::Player;

const NORMAL_BUTTON: Color = Color::srgb(0.22, 0.25, 0.31);
const HOVERED_BUTTON: Color = Color::srgb(0.3, 0.34, 0.42);
const PRESSED_BUTTON: Color = Color::srgb(0.16, 0.18, 0.23);

#[derive(Component, Clone, Copy, PartialEq, Eq)]
enum UiAction {
    Start,
    Resume,
    Replay,
    WatchAd,
    Pause,
}

#[derive(Component)]
struct StartMenuScreen;

#[derive(Component)]
struct HudRoot;

#[derive(Component)]
struct PauseScreen;

#[derive(Component)]
struct GameOverScreen;

#[derive(Component)]
struct ScoreText;

#[derive(Component)]
struct AmmoText;

#[derive(Component)]
struct CoinsText;

#[derive(Component)]
struct AdButton;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GameState::StartMenu), spawn_start_menu)
            .add_systems(
                OnExit(GameState::StartMenu),
                (despawn_screen::<StartMenuScreen>, spawn_hud),
            )
            .add_systems(OnEnter(GameState::Paused), spawn_pause_screen)
            .add_systems(OnExit(GameState::Paused), despawn_screen::<PauseScreen>)
            .add_systems(
                OnEnter(GameState::GameOver),
                (
                    despawn_screen::<HudRoot>,
                    spawn_game_over_screen.after(crate::gameplay::record_high_score),
                ),
            )
            .add_systems(OnExit(GameState::GameOver), despawn_screen::<GameOverScreen>)
            .add_systems(Update, (handle_buttons, update_coin_texts))
            .add_systems(
                Update,
                tap_to_start.run_if(in_state(GameState::StartMenu)),
            )
            .add_systems(
                Update,
                (update_score_text, update_ammo_text, spawn_score_popups, spawn_pickup_popups)
                    .run_if(in_state(GameState::Playing)),
            )
            .add_systems(
                Update,
                update_ad_button.run_if(in_state(GameState::GameOver)),
            )
            .add_systems(
                Update,
                (animate_floating_scores, effects::despawn_expired)
                    .run_if(not(in_state(GameState::Paused))),
            );
    }
}

fn despawn_screen<T: Component>(mut commands: Commands, query: Query<Entity, With<T>>) {
    for entity in &query {
        commands.entity(entity).despawn_recursive();
    }
}

fn full_screen_panel(alpha: f32) -> (Node, BackgroundColor) {
    (
        Node {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            flex_direction: FlexDirection::Column,
            justify_content: JustifyContent::Center,
            align_items: AlignItems::Center,
            row_gap: Val::Px(12.0),
            ..default()
        },
        BackgroundColor(Color::srgba(0.0, 0.0, 0.0, alpha)),
    )
}

fn spawn_button(
    parent: &mut ChildBuilder,
    asset_server: &Res<AssetServer>,
    action: UiAction,
    label: &str,
) {
    parent
        .spawn((
            Button,
            action,
            Node {
                width: Val::Px(200.0),
                height: Val::Px(56.0),
                margin: UiRect::all(Val::Px(8.0)),
                // horizontally center child text
                justify_content: JustifyContent::Center,
                // vertically center child text
                align_items: AlignItems::Center,
                ..default()
            },
            BorderRadius::MAX,
            BackgroundColor(NORMAL_BUTTON),
        ))
        .with_children(|button| {
            button.spawn((
                Text::new(label),
                TextFont {
                    font: asset_server.load(FONT),
                    font_size: 28.0,
                    ..default()
                },
                TextColor(Color::WHITE),
            ));
        });
}

fn spawn_start_menu(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    save_data: Res<SaveData>,
) {
    commands
        .spawn((StartMenuScreen, full_screen_panel(0.55)))
        .with_children(|screen| {
            screen.spawn((
                Text::new("FLAPPY GUN"),
                TextFont {
                    font: asset_server.load(FONT),
                    font_size: 48.0,
                    ..default()
                },
                TextColor(GOLD.into()),
            ));
            screen.spawn((
                Text::new(format!("Best: {num}", num = save_data.high_score)),
                TextFont {
                    font: asset_server.load(FONT),
                    font_size: 24.0,
                    ..default()
                },
                TextColor(Color::WHITE),
            ));
            screen.spawn((
                CoinsText,
                Text::new(format!("Coins: {num}", num = save_data.coins)),
                TextFont {
                    font: asset_server.load(FONT),
                    font_size: 24.0,
                    ..default()
                },
                TextColor(GOLD.into()),
            ));
            spawn_button(screen, &asset_server, UiAction::Start, "START");
        });
}

fn spawn_hud(mut commands: Commands, asset_server: Res<AssetServer>, save_data: Res<SaveData>) {
    commands
        .spawn((
            HudRoot,
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                ..default()
            },
        ))
        .with_children(|hud| {
            hud.spawn((
                ScoreText,
                Text::new("0"),
                TextFont {
                    font: asset_server.load(FONT),
                    font_size: 40.0,
                    ..default()
                },
                TextColor(Color::WHITE),
                TextLayout::new_with_justify(JustifyText::Center),
                Node {
                    position_type: PositionType::Absolute,
                    justify_self: JustifySelf::Center,
                    top: Val::Px(8.0),
                    ..default()
                },
            ));

            // Rounds in the cylinder next to magazines in reserve.
            hud.spawn((
                AmmoText,
                Text::new("6 | 2"),
                TextFont {
                    font: asset_server.load(FONT),
                    font_size: 28.0,
                    ..default()
                },
                TextColor(Color::WHITE),
                Node {
                    position_type: PositionType::Absolute,
                    top: Val::Px(8.0),
                    left: Val::Px(12.0),
                    ..default()
                },
            ));

            hud.spawn((
                CoinsText,
                Text::new(format!("Coins: {num}", num = save_data.coins)),
                TextFont {
                    font: asset_server.load(FONT),
                    font_size: 20.0,
                    ..default()
                },
                TextColor(GOLD.into()),
                Node {
                    position_type: PositionType::Absolute,
                    top: Val::Px(44.0),
                    left: Val::Px(12.0),
                    ..default()
                },
            ));

            hud.spawn((
                Button,
                UiAction::Pause,
                Node {
                    position_type: PositionType::Absolute,
                    top: Val::Px(8.0),
                    right: Val::Px(12.0),
                    width: Val::Px(44.0),
                    height: Val::Px(44.0),
                    justify_content: JustifyContent::Center,
                    align_items: AlignItems::Center,
                    ..default()
                },
                BorderRadius::MAX,
                BackgroundColor(NORMAL_BUTTON),
            ))
            .with_children(|button| {
                button.spawn((
                    Text::new("II"),
                    TextFont {
                        font: asset_server.load(FONT),
                        font_size: 24.0,
                        ..default()
                    },
                    TextColor(Color::WHITE),
                ));
            });
        });
}

fn spawn_pause_screen(mut commands: Commands, asset_server: Res<AssetServer>) {
    commands
        .spawn((PauseScreen, full_screen_panel(0.55)))
        .with_children(|screen| {
            screen.spawn((
                Text::new("PAUSED"),
                TextFont {
                    font: asset_server.load(FONT),
                    font_size: 48.0,
                    ..default()
                },
                TextColor(Color::WHITE),
            ));
            spawn_button(screen, &asset_server, UiAction::Resume, "RESUME");
        });
}

fn spawn_game_over_screen(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    score: Res<Score>,
    save_data: Res<SaveData>,
    round_result: Res<RoundResult>,
    availability: Res<AdAvailability>,
) {
    commands
        .spawn((GameOverScreen, full_screen_panel(0.7)))
        .with_children(|screen| {
            screen.spawn((
                Text::new("GAME OVER"),
                TextFont {
                    font: asset_server.load(FONT),
                    font_size: 48.0,
                    ..default()
                },
                TextColor(Color::srgb(0.9, 0.3, 0.3)),
            ));
            screen.spawn((
                Text::new(format!("Score: {num}", num = score.0)),
                TextFont {
                    font: asset_server.load(FONT),
                    font_size: 32.0,
                    ..default()
                },
                TextColor(Color::WHITE),
            ));
            if round_result.new_best {
                screen.spawn((
                    Text::new("NEW BEST!"),
                    TextFont {
                        font: asset_server.load(FONT),
                        font_size: 28.0,
                        ..default()
                    },
                    TextColor(GOLD.into()),
                ));
            } else {
                screen.spawn((
                    Text::new(format!("Best: {num}", num = save_data.high_score)),
                    TextFont {
                        font: asset_server.load(FONT),
                        font_size: 24.0,
                        ..default()
                    },
                    TextColor(Color::WHITE),
                ));
            }
            screen.spawn((
                CoinsText,
                Text::new(format!("Coins: {num}", num = save_data.coins)),
                TextFont {
                    font: asset_server.load(FONT),
                    font_size: 24.0,
                    ..default()
                },
                TextColor(GOLD.into()),
            ));
            spawn_button(screen, &asset_server, UiAction::Replay, "REPLAY");

            // Hidden until the ad provider reports an ad ready to show.
            screen
                .spawn((
                    AdButton,
                    Button,
                    UiAction::WatchAd,
                    Node {
                        width: Val::Px(220.0),
                        height: Val::Px(56.0),
                        margin: UiRect::all(Val::Px(8.0)),
                        justify_content: JustifyContent::Center,
                        align_items: AlignItems::Center,
                        ..default()
                    },
                    BorderRadius::MAX,
                    BackgroundColor(NORMAL_BUTTON),
                    if availability.0 {
                        Visibility::Inherited
                    } else {
                        Visibility::Hidden
                    },
                ))
                .with_children(|button| {
                    button.spawn((
                        Text::new("FREE COINS"),
                        TextFont {
                            font: asset_server.load(FONT),
                            font_size: 24.0,
                            ..default()
                        },
                        TextColor(GOLD.into()),
                    ));
                });
        });
}

/// The whole start screen doubles as a start button. Presses that land on a
/// real button are left to `handle_buttons`.
fn tap_to_start(
    mouse_input: Res<ButtonInput<MouseButton>>,
    touch_input: Res<Touches>,
    windows: Query<&Window>,
    interactions: Query<&Interaction>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if just_pressed_screen_position(&mouse_input, &touch_input, &windows).is_none() {
        return;
    }

    if interactions
        .iter()
        .any(|interaction| *interaction != Interaction::None)
    {
        return;
    }

    next_state.set(GameState::Playing);
}

fn handle_buttons(
    mut interaction_query: Query<
        (&Interaction, &UiAction, &mut BackgroundColor),
        (Changed<Interaction>, With<Button>),
    >,
    availability: Res<AdAvailability>,
    config: Res<AdsConfig>,
    mut next_state: ResMut<NextState<GameState>>,
    mut ad_requests: EventWriter<RewardedAdRequest>,
) {
    for (interaction, action, mut background) in &mut interaction_query {
        match *interaction {
            Interaction::Pressed => {
                background.0 = PRESSED_BUTTON;
                match action {
                    UiAction::Start | UiAction::Resume => next_state.set(GameState::Playing),
                    UiAction::Replay => next_state.set(GameState::StartMenu),
                    UiAction::Pause => next_state.set(GameState::Paused),
                    UiAction::WatchAd => {
                        if availability.0 {
                            ad_requests.send(RewardedAdRequest::Show {
                                ad_unit_id: config.ad_unit_id.clone(),
                            });
                        }
                    }
                }
            }
            Interaction::Hovered => background.0 = HOVERED_BUTTON,
            Interaction::None => background.0 = NORMAL_BUTTON,
        }
    }
}

fn update_score_text(score: Res<Score>, mut score_query: Query<&mut Text, With<ScoreText>>) {
    if !score.is_changed() {
        return;
    }

    for mut text in &mut score_query {
        text.0 = format!("{num}", num = score.0);
    }
}

fn update_ammo_text(player_query: Query<&Player>, mut ammo_query: Query<&mut Text, With<AmmoText>>) {
    let Ok(player) = player_query.get_single() else {
        return;
    };
    let ammo = format!(
        "{rounds} | {magazines}",
        rounds = player.rounds,
        magazines = player.magazines
    );

    for mut text in &mut ammo_query {
        if text.0 != ammo {
            text.0.clone_from(&ammo);
        }
    }
}

fn update_coin_texts(save_data: Res<SaveData>, mut coin_query: Query<&mut Text, With<CoinsText>>) {
    if !save_data.is_changed() {
        return;
    }

    for mut text in &mut coin_query {
        text.0 = format!("Coins: {num}", num = save_data.coins);
    }
}

fn update_ad_button(
    availability: Res<AdAvailability>,
    mut button_query: Query<&mut Visibility, With<AdButton>>,
) {
    if !availability.is_changed() {
        return;
    }

    for mut visibility in &mut button_query {
        *visibility = if availability.0 {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
    }
}

fn spawn_score_popups(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    mut scored_events: EventReader<ScoredEvent>,
) {
    for scored in scored_events.read() {
        spawn_floating_score(
            &mut commands,
            scored.position,
            &format!("+{num}", num = scored.points),
            GREEN,
            &asset_server,
        );
    }
}

fn spawn_pickup_popups(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    mut collected_events: EventReader<PickupCollectedEvent>,
) {
    for collected in collected_events.read() {
        spawn_floating_score(&mut commands, collected.position, "+1 MAG", GOLD, &asset_server);
    }
}
