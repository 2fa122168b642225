//! Console presentation preferences and their local store.
//!
//! The only persisted preference is the console font size, kept as a decimal
//! string under [`FONT_SIZE_KEY`]. Store failures never stop the console: a
//! failed read yields the platform default, a failed write is logged and the
//! in-memory value still changes.

use crate::model::PreferenceError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Store key for the console font size.
pub const FONT_SIZE_KEY: &str = "logfeed.console.font_size";

/// Smallest allowed font size.
pub const MIN_FONT_SIZE: u8 = 8;

/// Largest allowed font size.
pub const MAX_FONT_SIZE: u8 = 24;

/// Device class, used only to pick the default font size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Desktop browser or terminal.
    #[default]
    Desktop,
    /// Narrow handheld screen.
    Mobile,
}

impl Platform {
    /// Default font size for this platform.
    pub fn default_font_size(self) -> u8 {
        match self {
            Platform::Desktop => 12,
            Platform::Mobile => 11,
        }
    }
}

/// Clamp an arbitrary size into `[MIN_FONT_SIZE, MAX_FONT_SIZE]`.
pub fn clamp_font_size(px: i32) -> u8 {
    px.clamp(i32::from(MIN_FONT_SIZE), i32::from(MAX_FONT_SIZE)) as u8
}

/// String key-value store for preferences.
pub trait PreferenceStore {
    /// Read a value; `Ok(None)` when the key was never written.
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError>;

    /// Write a value, replacing any previous one.
    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError>;
}

/// JSON object of strings on disk.
///
/// The whole file is read on every access; it holds a handful of keys.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Store backed by `path` (created on first write).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<data_local_dir>/logfeed/preferences.json`, if the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_local_dir().map(|dir| dir.join("logfeed").join("preferences.json"))
    }

    /// Backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, PreferenceError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(PreferenceError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&contents).map_err(|e| PreferenceError::Parse {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }
}

impl PreferenceStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError> {
        // A corrupt file is replaced rather than blocking every write
        let mut values = match self.read_all() {
            Ok(values) => values,
            Err(PreferenceError::Parse { .. }) => BTreeMap::new(),
            Err(e) => return Err(e),
        };
        values.insert(key.to_string(), value.to_string());

        let write_err = |source| PreferenceError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(write_err)?;
            }
        }
        let json = serde_json::to_string_pretty(&values).map_err(|e| PreferenceError::Parse {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        fs::write(&self.path, json).map_err(write_err)?;
        debug!(path = %self.path.display(), key, "Preference written");
        Ok(())
    }
}

/// In-memory store.
///
/// Used when no data directory exists, and by tests. `failing` builds a store
/// whose writes always error.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
    fail_writes: bool,
}

impl MemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with one entry.
    pub fn with_value(key: &str, value: &str) -> Self {
        let mut store = Self::new();
        store.values.insert(key.to_string(), value.to_string());
        store
    }

    /// Store that rejects every write.
    pub fn failing() -> Self {
        Self {
            values: HashMap::new(),
            fail_writes: true,
        }
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError> {
        if self.fail_writes {
            return Err(PreferenceError::Write {
                path: PathBuf::from("<memory>"),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only store"),
            });
        }
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Current presentation preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preferences {
    font_size: u8,
    platform: Platform,
}

impl Preferences {
    /// Defaults for `platform`, nothing read from a store.
    pub fn new(platform: Platform) -> Self {
        Self {
            font_size: platform.default_font_size(),
            platform,
        }
    }

    /// Load from `store`, falling back to the platform default when the key
    /// is missing, unreadable or not a number. Stored values outside the
    /// allowed range are clamped.
    pub fn load<S: PreferenceStore>(store: &S, platform: Platform) -> Self {
        let mut prefs = Self::new(platform);
        match store.get(FONT_SIZE_KEY) {
            Ok(Some(raw)) => match raw.trim().parse::<i32>() {
                Ok(px) => prefs.font_size = clamp_font_size(px),
                Err(_) => warn!(value = %raw, "Ignoring non-numeric stored font size"),
            },
            Ok(None) => {}
            Err(error) => warn!(%error, "Failed to read preferences, using defaults"),
        }
        prefs
    }

    /// Set the font size (clamped) and persist it.
    ///
    /// Returns the size actually applied. A persistence failure is logged;
    /// the new size is kept regardless.
    pub fn set_font_size<S: PreferenceStore>(&mut self, store: &mut S, px: i32) -> u8 {
        self.font_size = clamp_font_size(px);
        if let Err(error) = store.set(FONT_SIZE_KEY, &self.font_size.to_string()) {
            warn!(%error, "Failed to persist font size");
        }
        self.font_size
    }

    /// Current font size.
    pub fn font_size(&self) -> u8 {
        self.font_size
    }

    /// Platform the defaults were chosen for.
    pub fn platform(&self) -> Platform {
        self.platform
    }
}

impl Default for Preferences {
    fn default() -> Self {
        Self::new(Platform::default())
    }
}
