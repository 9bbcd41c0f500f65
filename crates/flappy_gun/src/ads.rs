use bevy::prelude::*;
use flappy_helpers::save::{self, SaveData};
use flappy_helpers::{RewardedAdEvent, RewardedAdRequest};

const INIT_RETRY_SECS: f32 = 5.0;
const LOAD_RETRY_SECS: f32 = 3.0;

#[derive(Resource)]
pub struct AdsConfig {
    pub app_key: String,
    pub ad_unit_id: String,
}

impl Default for AdsConfig {
    fn default() -> Self {
        Self {
            app_key: "226ef3535".into(),
            ad_unit_id: "2gjv6i8xjpslyeji".into(),
        }
    }
}

/// Whether a rewarded ad is loaded and ready to show.
#[derive(Resource, Default)]
pub struct AdAvailability(pub bool);

#[derive(Resource, Default)]
struct AdRetryTimers {
    init: Option<Timer>,
    load: Option<Timer>,
}

pub struct AdsPlugin;

impl Plugin for AdsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AdsConfig>()
            .init_resource::<AdAvailability>()
            .init_resource::<AdRetryTimers>()
            .add_systems(Startup, request_init)
            .add_systems(Update, (handle_ad_events, tick_retry_timers));
    }
}

fn request_init(config: Res<AdsConfig>, mut requests: EventWriter<RewardedAdRequest>) {
    requests.send(RewardedAdRequest::Init {
        app_key: config.app_key.clone(),
    });
}

fn handle_ad_events(
    mut events: EventReader<RewardedAdEvent>,
    mut requests: EventWriter<RewardedAdRequest>,
    mut availability: ResMut<AdAvailability>,
    mut retries: ResMut<AdRetryTimers>,
    mut save_data: ResMut<SaveData>,
) {
    for event in events.read() {
        match event {
            RewardedAdEvent::Initialized => {
                requests.send(RewardedAdRequest::Load);
            }
            RewardedAdEvent::InitFailed(reason) => {
                warn!("ad init failed: {reason}");
                retries.init = Some(Timer::from_seconds(INIT_RETRY_SECS, TimerMode::Once));
            }
            RewardedAdEvent::Loaded => {
                availability.0 = true;
            }
            RewardedAdEvent::LoadFailed(reason) => {
                warn!("ad load failed: {reason}");
                availability.0 = false;
                retries.load = Some(Timer::from_seconds(LOAD_RETRY_SECS, TimerMode::Once));
            }
            RewardedAdEvent::Displayed => {
                availability.0 = false;
            }
            RewardedAdEvent::DisplayFailed(reason) => {
                warn!("ad display failed: {reason}");
                availability.0 = false;
                requests.send(RewardedAdRequest::Load);
            }
            RewardedAdEvent::Rewarded { amount } => {
                save_data.coins += amount;
                save::persist(&save_data);
                info!("rewarded {amount} coins, {} total", save_data.coins);
            }
            RewardedAdEvent::Clicked => {}
            RewardedAdEvent::Closed => {
                // The shown ad is spent, line up the next one.
                requests.send(RewardedAdRequest::Load);
            }
        }
    }
}

fn tick_retry_timers(
    time: Res<Time>,
    config: Res<AdsConfig>,
    mut retries: ResMut<AdRetryTimers>,
    mut requests: EventWriter<RewardedAdRequest>,
) {
    if let Some(timer) = &mut retries.init {
        if timer.tick(time.delta()).just_finished() {
            requests.send(RewardedAdRequest::Init {
                app_key: config.app_key.clone(),
            });
            retries.init = None;
        }
    }

    if let Some(timer) = &mut retries.load {
        if timer.tick(time.delta()).just_finished() {
            requests.send(RewardedAdRequest::Load);
            retries.load = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use flappy_helpers::{RewardedAdsPlugin, SimulatedRewardedAds};

    use super::*;

    #[test]
    fn boot_chains_init_into_a_loaded_ad() {
        let mut app = App::new();
        app.init_resource::<Time>()
            .insert_resource(SaveData::default())
            .add_plugins(RewardedAdsPlugin::<SimulatedRewardedAds>::default())
            .add_plugins(AdsPlugin);

        // Init request, the provider's answer, and the follow-up load each
        // take a frame to round-trip.
        for _ in 0..5 {
            app.update();
        }

        assert!(
            app.world().resource::<AdAvailability>().0,
            "an ad should be loaded after the init and load handshake"
        );
    }
}
