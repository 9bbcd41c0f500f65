mod app;
pub use app::*;

pub mod effects;
pub mod floating_score;
pub mod input;
pub mod save;

mod rewarded;
pub use rewarded::*;

mod window_resizing;
