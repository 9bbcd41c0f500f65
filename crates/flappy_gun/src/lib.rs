mod ads;
mod audio;
mod camera;
mod enemies;
mod gameplay;
mod pickups;
mod player;
mod scene;
mod ui;
mod weapons;

use flappy_helpers::RewardedAdsPlugin;
use flappy_helpers::save::SaveLoadPlugin;
#[cfg(not(target_arch = "wasm32"))]
use flappy_helpers::SimulatedRewardedAds as AdProvider;
#[cfg(target_arch = "wasm32")]
use flappy_helpers::WebRewardedAds as AdProvider;

pub fn run() {
    flappy_helpers::get_default_app(env!("CARGO_PKG_NAME"))
        .add_plugins(SaveLoadPlugin)
        .add_plugins(RewardedAdsPlugin::<AdProvider>::default())
        .add_plugins(gameplay::GameFlowPlugin)
        .add_plugins(camera::CameraPlugin)
        .add_plugins(player::PlayerPlugin)
        .add_plugins(enemies::EnemyPlugin)
        .add_plugins(weapons::WeaponPlugin)
        .add_plugins(pickups::PickupPlugin)
        .add_plugins(scene::ScenePlugin)
        .add_plugins(ads::AdsPlugin)
        .add_plugins(ui::UiPlugin)
        .add_plugins(audio::GameAudioPlugin)
        .run();
}
