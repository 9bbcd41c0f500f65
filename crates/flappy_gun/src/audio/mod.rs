use bevy::prelude::*;
use bevy_asset_loader::prelude::*;
use bevy_kira_audio::prelude::*;

use crate::gameplay::{
    DeathCause, EmptyClickedEvent, EnemyKilledEvent, GameState, GunFiredEvent,
    PickupCollectedEvent, PlayerDiedEvent, ReloadedEvent,
};

#[derive(Clone, Eq, PartialEq, Debug, Hash, Default, States)]
enum AssetState {
    #[default]
    Loading,
    Loaded,
}

#[derive(AssetCollection, Resource)]
struct AudioAssets {
    #[asset(path = "audio/shot.ogg")]
    shot: Handle<bevy_kira_audio::prelude::AudioSource>,
    #[asset(path = "audio/empty_click.ogg")]
    empty_click: Handle<bevy_kira_audio::prelude::AudioSource>,
    #[asset(path = "audio/reload.ogg")]
    reload: Handle<bevy_kira_audio::prelude::AudioSource>,
    #[asset(path = "audio/enemy_death.ogg")]
    enemy_death: Handle<bevy_kira_audio::prelude::AudioSource>,
    #[asset(path = "audio/pickup.ogg")]
    pickup: Handle<bevy_kira_audio::prelude::AudioSource>,
    #[asset(path = "audio/ground_impact.ogg")]
    ground_impact: Handle<bevy_kira_audio::prelude::AudioSource>,
    #[asset(path = "audio/game_start.ogg")]
    game_start: Handle<bevy_kira_audio::prelude::AudioSource>,
    #[asset(path = "audio/game_over.ogg")]
    game_over: Handle<bevy_kira_audio::prelude::AudioSource>,
}

pub struct GameAudioPlugin;

impl Plugin for GameAudioPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(AudioPlugin)
            .init_state::<AssetState>()
            .add_loading_state(
                LoadingState::new(AssetState::Loading)
                    .continue_to_state(AssetState::Loaded)
                    .load_collection::<AudioAssets>(),
            )
            .add_systems(
                Update,
                (
                    gunfire_audio,
                    empty_click_audio,
                    reload_audio,
                    kill_audio,
                    pickup_audio,
                    death_audio,
                )
                    .run_if(in_state(AssetState::Loaded)),
            )
            .add_systems(
                OnExit(GameState::StartMenu),
                game_start_audio.run_if(in_state(AssetState::Loaded)),
            )
            .add_systems(
                OnEnter(GameState::GameOver),
                game_over_audio.run_if(in_state(AssetState::Loaded)),
            );
    }
}

fn game_start_audio(audio_assets: Res<AudioAssets>, audio: Res<Audio>) {
    audio.play(audio_assets.game_start.clone_weak());
}

fn game_over_audio(audio_assets: Res<AudioAssets>, audio: Res<Audio>) {
    audio.play(audio_assets.game_over.clone_weak());
}

fn gunfire_audio(
    audio_assets: Res<AudioAssets>,
    audio: Res<Audio>,
    mut fired_event: EventReader<GunFiredEvent>,
) {
    for _ in fired_event.read() {
        audio.play(audio_assets.shot.clone_weak());
    }
}

fn empty_click_audio(
    audio_assets: Res<AudioAssets>,
    audio: Res<Audio>,
    mut empty_event: EventReader<EmptyClickedEvent>,
) {
    for _ in empty_event.read() {
        audio.play(audio_assets.empty_click.clone_weak());
    }
}

fn reload_audio(
    audio_assets: Res<AudioAssets>,
    audio: Res<Audio>,
    mut reloaded_event: EventReader<ReloadedEvent>,
) {
    for _ in reloaded_event.read() {
        audio.play(audio_assets.reload.clone_weak());
    }
}

fn kill_audio(
    audio_assets: Res<AudioAssets>,
    audio: Res<Audio>,
    mut killed_event: EventReader<EnemyKilledEvent>,
) {
    for _ in killed_event.read() {
        audio.play(audio_assets.enemy_death.clone_weak());
    }
}

fn pickup_audio(
    audio_assets: Res<AudioAssets>,
    audio: Res<Audio>,
    mut collected_event: EventReader<PickupCollectedEvent>,
) {
    for _ in collected_event.read() {
        audio.play(audio_assets.pickup.clone_weak());
    }
}

fn death_audio(
    audio_assets: Res<AudioAssets>,
    audio: Res<Audio>,
    mut death_event: EventReader<PlayerDiedEvent>,
) {
    for death in death_event.read() {
        if death.cause == DeathCause::GroundImpact {
            audio.play(audio_assets.ground_impact.clone_weak());
        }
    }
}
