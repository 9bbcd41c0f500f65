use std::sync::{Arc, LazyLock};

use bevy::prelude::*;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;
#[cfg(target_arch = "wasm32")]
use web_sys::MessageEvent;

/// Callbacks coming back from the ad network. These mirror the callback
/// surface of mobile mediation SDKs: the async native layer reports through
/// this queue and the plugin forwards everything into Bevy events.
#[derive(Event, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RewardedAdEvent {
    Initialized,
    InitFailed(String),
    Loaded,
    LoadFailed(String),
    Displayed,
    DisplayFailed(String),
    Rewarded { amount: u32 },
    Clicked,
    Closed,
}

/// Calls going out to the ad network.
#[derive(Event, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RewardedAdRequest {
    Init { app_key: String },
    Load,
    Show { ad_unit_id: String },
}

pub static AD_EVENT_QUEUE: LazyLock<Arc<Mutex<Vec<RewardedAdEvent>>>> =
    LazyLock::new(|| Arc::new(Mutex::new(Vec::new())));

/// Entry point for ad network callbacks. Safe to call from outside the ECS,
/// the queue is drained into `RewardedAdEvent`s once per frame.
pub fn push_ad_event(event: RewardedAdEvent) {
    AD_EVENT_QUEUE.lock().push(event);
}

/// The outward half of the SDK surface. Implementations turn requests into
/// whatever the platform expects and answer through `push_ad_event`.
pub trait RewardedAdProvider: Resource + Default {
    fn init(&mut self, app_key: &str);
    fn load(&mut self);
    fn show(&mut self, ad_unit_id: &str);
}

#[derive(Default)]
pub struct RewardedAdsPlugin<T: RewardedAdProvider>(core::marker::PhantomData<T>);

impl<T: RewardedAdProvider> Plugin for RewardedAdsPlugin<T> {
    fn build(&self, app: &mut App) {
        app.add_event::<RewardedAdEvent>()
            .add_event::<RewardedAdRequest>()
            .init_resource::<T>()
            .add_systems(
                PostUpdate,
                (dispatch_ad_requests::<T>, forward_ad_events).chain(),
            );

        #[cfg(target_arch = "wasm32")]
        {
            app.add_systems(Startup, listen_ad_messages);
        }
    }
}

fn dispatch_ad_requests<T: RewardedAdProvider>(
    mut provider: ResMut<T>,
    mut requests: EventReader<RewardedAdRequest>,
) {
    for request in requests.read() {
        match request {
            RewardedAdRequest::Init { app_key } => provider.init(app_key),
            RewardedAdRequest::Load => provider.load(),
            RewardedAdRequest::Show { ad_unit_id } => provider.show(ad_unit_id),
        }
    }
}

fn forward_ad_events(mut events: EventWriter<RewardedAdEvent>) {
    let queued = AD_EVENT_QUEUE.lock().drain(..).collect::<Vec<_>>();

    for event in queued {
        events.send(event);
    }
}

/// Stand-in ad network for native builds and tests. Answers every request
/// synchronously and always pays out, the way editor builds of mediation
/// SDKs fake their callbacks.
#[derive(Resource, Default)]
pub struct SimulatedRewardedAds {
    initialized: bool,
    loaded: bool,
}

pub const SIMULATED_REWARD_AMOUNT: u32 = 25;

impl RewardedAdProvider for SimulatedRewardedAds {
    fn init(&mut self, _app_key: &str) {
        self.initialized = true;
        push_ad_event(RewardedAdEvent::Initialized);
    }

    fn load(&mut self) {
        if !self.initialized {
            push_ad_event(RewardedAdEvent::LoadFailed("not initialized".to_string()));
            return;
        }

        self.loaded = true;
        push_ad_event(RewardedAdEvent::Loaded);
    }

    fn show(&mut self, _ad_unit_id: &str) {
        if !self.loaded {
            push_ad_event(RewardedAdEvent::DisplayFailed("no ad loaded".to_string()));
            return;
        }

        self.loaded = false;
        push_ad_event(RewardedAdEvent::Displayed);
        push_ad_event(RewardedAdEvent::Rewarded {
            amount: SIMULATED_REWARD_AMOUNT,
        });
        push_ad_event(RewardedAdEvent::Closed);
    }
}

/// Web provider: requests are posted to the embedding page, which owns the
/// real SDK and answers with `RewardedAdEvent` messages.
#[cfg(target_arch = "wasm32")]
#[derive(Resource, Default)]
pub struct WebRewardedAds;

#[cfg(target_arch = "wasm32")]
impl RewardedAdProvider for WebRewardedAds {
    fn init(&mut self, app_key: &str) {
        post_ad_request(&RewardedAdRequest::Init {
            app_key: app_key.to_string(),
        });
    }

    fn load(&mut self) {
        post_ad_request(&RewardedAdRequest::Load);
    }

    fn show(&mut self, ad_unit_id: &str) {
        post_ad_request(&RewardedAdRequest::Show {
            ad_unit_id: ad_unit_id.to_string(),
        });
    }
}

#[cfg(target_arch = "wasm32")]
fn post_ad_request(request: &RewardedAdRequest) {
    let Some(window) = web_sys::window() else {
        error!("{request:?} not sent, no window");
        return;
    };

    let Ok(value) = serde_wasm_bindgen::to_value(request) else {
        error!("could not serialize {request:?}");
        return;
    };

    let Ok(Some(parent_window)) = window.parent() else {
        error!("{request:?} not sent, parent window not found");
        return;
    };

    if let Err(err) = parent_window.post_message(&value, "*") {
        error!("could not post message {value:?}. {err:?}");
    }
}

#[cfg(target_arch = "wasm32")]
fn listen_ad_messages() {
    let Some(window) = web_sys::window() else {
        error!("no window, ad callbacks will never arrive");
        return;
    };

    let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
        let message: Result<RewardedAdEvent, serde_wasm_bindgen::Error> =
            serde_wasm_bindgen::from_value(event.data());

        let Ok(message) = message else {
            error!("could not parse ad message {:?}", &event.data());
            return;
        };

        push_ad_event(message);
    }) as Box<dyn FnMut(MessageEvent)>);

    if window
        .add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
        .is_err()
    {
        error!("failed to add message event listener");
        return;
    }

    closure.forget(); // Leaks memory, but ensures the closure lives for the lifetime of the program
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain_queue() -> Vec<RewardedAdEvent> {
        AD_EVENT_QUEUE.lock().drain(..).collect()
    }

    // A single test covers the whole provider flow because the callback
    // queue is process global.
    #[test]
    fn simulated_provider_walks_the_full_ad_lifecycle() {
        drain_queue();
        let mut provider = SimulatedRewardedAds::default();

        // Loading before init fails the way a real SDK would.
        provider.load();
        assert_eq!(
            drain_queue(),
            vec![RewardedAdEvent::LoadFailed("not initialized".to_string())],
            "load before init should fail"
        );

        provider.init("test-key");
        assert_eq!(
            drain_queue(),
            vec![RewardedAdEvent::Initialized],
            "init should report success"
        );

        // Showing with nothing loaded is a display failure.
        provider.show("unit");
        assert_eq!(
            drain_queue(),
            vec![RewardedAdEvent::DisplayFailed("no ad loaded".to_string())],
            "show without a loaded ad should fail"
        );

        provider.load();
        assert_eq!(
            drain_queue(),
            vec![RewardedAdEvent::Loaded],
            "load after init should succeed"
        );

        // A successful show pays out and consumes the loaded ad.
        provider.show("unit");
        assert_eq!(
            drain_queue(),
            vec![
                RewardedAdEvent::Displayed,
                RewardedAdEvent::Rewarded {
                    amount: SIMULATED_REWARD_AMOUNT
                },
                RewardedAdEvent::Closed,
            ],
            "successful show should display, reward and close"
        );

        provider.show("unit");
        assert_eq!(
            drain_queue(),
            vec![RewardedAdEvent::DisplayFailed("no ad loaded".to_string())],
            "the loaded ad should be consumed by the first show"
        );
    }

    #[test]
    fn ad_events_round_trip_through_ron() {
        let event = RewardedAdEvent::Rewarded { amount: 25 };

        let encoded = ron::to_string(&event).expect("encoding failed");
        let decoded: RewardedAdEvent = ron::from_str(&encoded).expect("decoding failed");

        assert_eq!(decoded, event, "round trip should preserve the payload");
    }
}
