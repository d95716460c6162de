use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Version History:
/// 0: Unversioned data file (keys only)
/// 1: Add `version` field
pub const VERSION: u32 = 1;

#[derive(Error, Debug)]
pub enum DataLoadError {
    #[error("player data deserialization error")]
    Deserialize(#[from] serde_json::Error),

    #[error("player data version {0} too new to be loaded")]
    TooNew(u32),

    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Error, Debug)]
pub enum DataSaveError {
    #[error("player data serialization error")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Per-player preferences as they are written to the data file.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct PlayerData {
    pub enabled: bool,
    /// Cooldown in seconds
    pub cooldown: f32,
    pub notification: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct StoredData {
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub player_data: BTreeMap<u64, PlayerData>,
}

impl StoredData {
    pub fn new() -> StoredData {
        StoredData {
            version: VERSION,
            player_data: BTreeMap::new(),
        }
    }

    pub fn from_json(json: &str) -> Result<StoredData, DataLoadError> {
        let mut data: StoredData = serde_json::from_str(json)?;
        if data.version > VERSION {
            return Err(DataLoadError::TooNew(data.version));
        }
        data.version = VERSION;
        Ok(data)
    }

    /// Returns `Ok(None)` if there is no data file yet.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Option<StoredData>, DataLoadError> {
        let path = path.as_ref();
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let data = StoredData::from_json(&json)?;
        debug!(
            "Loaded {} player records from {}",
            data.player_data.len(),
            path.display()
        );
        Ok(Some(data))
    }

    pub fn to_json(&self) -> Result<String, DataSaveError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), DataSaveError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        // The target is only replaced once the new file is complete.
        let tmp_path = temp_path_for(path);
        if let Err(err) = self.write_file(&tmp_path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(err);
        }
        fs::rename(&tmp_path, path)?;
        Ok(())
    }

    fn write_file(&self, path: &Path) -> Result<(), DataSaveError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        writer.get_ref().sync_data()?;
        Ok(())
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}
