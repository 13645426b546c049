//! Persistence for [`EngineState`].
//!
//! A store loads the whole state at session start and overwrites it after
//! every state-changing operation. Loading never fails: a missing or
//! malformed file yields an empty state, and [`LoadOutcome::was_fallback`]
//! records that this happened. Writes can fail and are reported as
//! [`StoreError`].
//!
//! There is exactly one writer per session. Two sessions sharing a file
//! overwrite each other (last writer wins).

use crate::StoreError;
use crate::state::EngineState;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

/// Result of [`PersistentStore::load`].
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOutcome {
    pub state: EngineState,
    /// `true` when the stored data was missing or unreadable and `state` is
    /// a fresh empty state.
    pub was_fallback: bool,
}

impl LoadOutcome {
    fn loaded(state: EngineState) -> Self {
        Self {
            state,
            was_fallback: false,
        }
    }

    fn fallback() -> Self {
        Self {
            state: EngineState::default(),
            was_fallback: true,
        }
    }
}

/// Durable whole-state storage.
pub trait PersistentStore: Send + Sync {
    /// Load the stored state, or an empty one if nothing usable is stored.
    fn load(&self) -> LoadOutcome;

    /// Overwrite the stored state.
    fn save(&self, state: &EngineState) -> Result<(), StoreError>;
}

// ── JsonFileStore ──────────────────────────────────────────────────

/// Stores the state as pretty-printed JSON in a single file.
///
/// Writes go to a sibling temp file that is then renamed over the target.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "state.json".to_string());
        self.path.with_file_name(format!(".{name}.tmp"))
    }

    /// Load, reporting why the stored data was unusable.
    pub fn try_load(&self) -> Result<Option<EngineState>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let read_err = |reason: String| StoreError::Read {
            path: self.path.clone(),
            reason,
        };
        let json = std::fs::read_to_string(&self.path).map_err(|e| read_err(e.to_string()))?;
        let state = serde_json::from_str(&json).map_err(|e| read_err(e.to_string()))?;
        Ok(Some(state))
    }
}

impl PersistentStore for JsonFileStore {
    fn load(&self) -> LoadOutcome {
        match self.try_load() {
            Ok(Some(state)) => {
                debug!(
                    "Loaded state from {}: {} messages, {} cards, {} interactions",
                    self.path.display(),
                    state.chat.len(),
                    state.cards.len(),
                    state.interactions.len()
                );
                LoadOutcome::loaded(state)
            }
            Ok(None) => {
                debug!("No state at {}, starting empty", self.path.display());
                LoadOutcome::fallback()
            }
            Err(e) => {
                warn!("{e}; starting with empty state");
                LoadOutcome::fallback()
            }
        }
    }

    fn save(&self, state: &EngineState) -> Result<(), StoreError> {
        let write_err = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(write_err)?;
        }

        let json = serde_json::to_string_pretty(state)?;
        let tmp = self.tmp_path();
        std::fs::write(&tmp, json).map_err(write_err)?;
        std::fs::rename(&tmp, &self.path).map_err(write_err)?;

        debug!("Saved state to {}", self.path.display());
        Ok(())
    }
}

// ── MemoryStore ────────────────────────────────────────────────────

/// In-memory store. Holds the last saved state as JSON so loads go through
/// the same serialization as the file store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    json: Mutex<Option<String>>,
    saves: Mutex<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with raw JSON (possibly malformed).
    pub fn with_json(json: impl Into<String>) -> Self {
        Self {
            json: Mutex::new(Some(json.into())),
            saves: Mutex::new(0),
        }
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        *self.saves.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// The raw JSON last saved, if any.
    pub fn raw(&self) -> Option<String> {
        self.json.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl PersistentStore for MemoryStore {
    fn load(&self) -> LoadOutcome {
        let json = self.json.lock().unwrap_or_else(|e| e.into_inner());
        match json.as_deref().map(serde_json::from_str::<EngineState>) {
            Some(Ok(state)) => LoadOutcome::loaded(state),
            Some(Err(e)) => {
                warn!("Malformed in-memory state: {e}; starting with empty state");
                LoadOutcome::fallback()
            }
            None => LoadOutcome::fallback(),
        }
    }

    fn save(&self, state: &EngineState) -> Result<(), StoreError> {
        let serialized = serde_json::to_string(state)?;
        *self.json.lock().unwrap_or_else(|e| e.into_inner()) = Some(serialized);
        *self.saves.lock().unwrap_or_else(|e| e.into_inner()) += 1;
        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────────
