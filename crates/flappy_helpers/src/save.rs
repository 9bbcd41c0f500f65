use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Progress that survives across sessions. Written as RON to the platform
/// data directory on native targets and to `localStorage` on the web.
///
/// New fields need `#[serde(default)]` so older save files keep parsing.
#[derive(Resource, Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveData {
    #[serde(default)]
    pub high_score: u32,
    #[serde(default)]
    pub coins: u32,
}

#[derive(Error, Debug)]
pub enum SaveError {
    #[error("failed to access save file: {0}")]
    Io(#[from] std::io::Error),

    #[error("save file is not valid RON: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("failed to encode save data: {0}")]
    Encode(#[from] ron::Error),
}

pub struct SaveLoadPlugin;

impl Plugin for SaveLoadPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(PreStartup, load_save_data);
    }
}

/// Loads the save file before anything else runs, so every system can rely
/// on `Res<SaveData>` being present. A missing or corrupt file falls back to
/// defaults instead of failing.
fn load_save_data(mut commands: Commands) {
    commands.insert_resource(storage::load().unwrap_or_default());
}

/// Writes the given data to persistent storage. Call this at explicit
/// moments (new high score, reward granted), not every frame.
pub fn persist(save_data: &SaveData) {
    storage::save(save_data);
}

#[cfg(not(target_arch = "wasm32"))]
mod storage {
    use std::path::PathBuf;

    use tracing::{info, warn};

    use super::{SaveData, SaveError};

    const SAVE_DIR_NAME: &str = "flappy_gun";
    const SAVE_FILE_NAME: &str = "save.ron";

    fn save_file_path() -> PathBuf {
        dirs::data_dir().map_or_else(
            || PathBuf::from(SAVE_FILE_NAME),
            |dir| dir.join(SAVE_DIR_NAME).join(SAVE_FILE_NAME),
        )
    }

    pub fn load() -> Option<SaveData> {
        let path = save_file_path();

        if !path.exists() {
            info!("no save file at {path:?}, starting fresh");
            return None;
        }

        match read(&path) {
            Ok(data) => Some(data),
            Err(err) => {
                warn!("could not load save file: {err}, using defaults");
                None
            }
        }
    }

    fn read(path: &std::path::Path) -> Result<SaveData, SaveError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(ron::from_str(&contents)?)
    }

    pub fn save(save_data: &SaveData) {
        if let Err(err) = write(save_data) {
            warn!("could not write save file: {err}");
        }
    }

    fn write(save_data: &SaveData) -> Result<(), SaveError> {
        let path = save_file_path();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = ron::ser::to_string_pretty(save_data, ron::ser::PrettyConfig::default())?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
mod storage {
    use tracing::warn;

    use super::SaveData;

    const SAVE_KEY: &str = "flappy_gun_save";

    fn local_storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }

    pub fn load() -> Option<SaveData> {
        let contents = local_storage()?.get_item(SAVE_KEY).ok()??;

        match ron::from_str(&contents) {
            Ok(data) => Some(data),
            Err(err) => {
                warn!("could not parse saved data: {err}, using defaults");
                None
            }
        }
    }

    pub fn save(save_data: &SaveData) {
        let Some(storage) = local_storage() else {
            warn!("localStorage unavailable, progress will not persist");
            return;
        };

        let Ok(contents) = ron::ser::to_string_pretty(save_data, ron::ser::PrettyConfig::default())
        else {
            warn!("could not encode save data");
            return;
        };

        if let Err(err) = storage.set_item(SAVE_KEY, &contents) {
            warn!("could not write to localStorage: {err:?}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_data_round_trips_through_ron() {
        let data = SaveData {
            high_score: 42,
            coins: 125,
        };

        let encoded = ron::ser::to_string_pretty(&data, ron::ser::PrettyConfig::default())
            .expect("encoding failed");
        let decoded: SaveData = ron::from_str(&encoded).expect("decoding failed");

        assert_eq!(decoded, data, "round trip should preserve every field");
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        // A save file from before the coins field existed.
        let decoded: SaveData = ron::from_str("(high_score: 7)").expect("decoding failed");

        assert_eq!(decoded.high_score, 7, "present fields should parse");
        assert_eq!(decoded.coins, 0, "missing fields should default");
    }

    #[test]
    fn corrupt_data_is_an_error_not_a_panic() {
        assert!(
            ron::from_str::<SaveData>("(high_score: \"garbage\")").is_err(),
            "type mismatch should be reported as an error"
        );
    }
}
