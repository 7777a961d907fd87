//! Persistence of the timer record under a single well-known key

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use serde_json::{Map, Value};
use tracing::debug;

use crate::{
    error::{PomodoroError, Result},
    state::TimerState,
};

/// Key the timer record is stored under.
pub const STORAGE_KEY: &str = "timerState";

/// Key-value collaborator that holds the persisted timer record
pub trait StateStore: Send + Sync {
    /// Read the record; `Ok(None)` means nothing was stored yet.
    fn load(&self) -> Result<Option<TimerState>>;

    fn save(&self, state: &TimerState) -> Result<()>;
}

fn decode(raw: &str) -> Result<Option<TimerState>> {
    let mut document: Map<String, Value> = serde_json::from_str(raw)?;
    match document.remove(STORAGE_KEY) {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}

fn encode(state: &TimerState) -> Result<String> {
    let mut document = Map::new();
    document.insert(STORAGE_KEY.to_string(), serde_json::to_value(state)?);
    Ok(serde_json::to_string_pretty(&Value::Object(document))?)
}

/// JSON file on disk, replaced atomically on every save
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<data dir>/pomodoro-daemon/timer_state.json`
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .map(|dir| dir.join("pomodoro-daemon"))
            .unwrap_or_else(|| PathBuf::from("/tmp/pomodoro-daemon"))
            .join("timer_state.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for JsonFileStore {
    fn load(&self) -> Result<Option<TimerState>> {
        if !self.path.exists() {
            debug!("No stored timer state at {}", self.path.display());
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path)?;
        decode(&raw)
    }

    fn save(&self, state: &TimerState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, encode(state)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Serialized record kept in memory, for embedding and tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    raw: Mutex<Option<String>>,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from raw stored text, which may be corrupt.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: Mutex::new(Some(raw.into())),
            fail_writes: false,
        }
    }

    /// A store whose writes always fail.
    pub fn read_only() -> Self {
        Self {
            raw: Mutex::new(None),
            fail_writes: true,
        }
    }

    pub fn raw(&self) -> Option<String> {
        self.raw.lock().ok().and_then(|raw| raw.clone())
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> Result<Option<TimerState>> {
        let raw = self
            .raw
            .lock()
            .map_err(|e| PomodoroError::Storage(format!("Failed to lock memory store: {}", e)))?;
        match raw.as_deref() {
            Some(raw) => decode(raw),
            None => Ok(None),
        }
    }

    fn save(&self, state: &TimerState) -> Result<()> {
        if self.fail_writes {
            return Err(PomodoroError::Storage("store is read-only".to_string()));
        }
        let encoded = encode(state)?;
        let mut raw = self
            .raw
            .lock()
            .map_err(|e| PomodoroError::Storage(format!("Failed to lock memory store: {}", e)))?;
        *raw = Some(encoded);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Mode, TimerState};
    use chrono::Utc;

    #[test]
    fn file_store_round_trips_settings() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested").join("state.json"));
        assert!(store.load().unwrap().is_none());

        let mut state = TimerState::new(Utc::now());
        state.set_mode(Mode::Extended, Utc::now());
        state.set_task_name("Refactor parser");
        state.sound_enabled = false;
        store.save(&state).unwrap();

        let restored = store.load().unwrap().unwrap();
        assert_eq!(restored.focus_time, 50);
        assert_eq!(restored.break_time, 10);
        assert_eq!(restored.mode, Mode::Extended);
        assert_eq!(restored.task_name, "Refactor parser");
        assert!(!restored.sound_enabled);
        assert_eq!(
            restored.last_update_time.timestamp_millis(),
            state.last_update_time.timestamp_millis()
        );
    }

    #[test]
    fn record_lives_under_the_well_known_key() {
        let store = MemoryStore::new();
        store.save(&TimerState::default()).unwrap();

        let raw = store.raw().unwrap();
        let value: Value = serde_json::from_str(&raw).unwrap();
        assert!(value[STORAGE_KEY]["timeLeft"].is_u64());
        assert!(value[STORAGE_KEY]["lastUpdateTime"].is_i64());
    }

    #[test]
    fn corrupt_record_is_an_error() {
        let store = MemoryStore::with_raw(r#"{"timerState": {"timeLeft": -4}}"#);
        assert!(store.load().is_err());

        let store = MemoryStore::with_raw("not json");
        assert!(store.load().is_err());
    }

    #[test]
    fn read_only_store_rejects_writes() {
        let store = MemoryStore::read_only();
        assert!(store.save(&TimerState::default()).is_err());
        assert!(store.load().unwrap().is_none());
    }
}
