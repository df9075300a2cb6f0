use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::{MdPickError, Result};

/// String key-value storage for persisted configuration.
///
/// No transactional guarantees: each `set` replaces the stored string.
pub trait ConfigStore {
    /// Stored serialized value for `key`, if any
    fn get(&self, key: &str) -> Option<String>;
    /// Replace the serialized value for `key`
    fn set(&mut self, key: &str, value: String) -> Result<()>;
}

/// In-memory store, used for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfigStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// Store backed by a single JSON object file whose values are serialized strings.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<config dir>/mdpick/config.json`, falling back to the working directory.
    pub fn default_location() -> Self {
        let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::new(base.join("mdpick").join("config.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// An unreadable or non-object file reads as empty; it is rewritten on the next `set`.
    fn read_all(&self) -> Map<String, Value> {
        let Ok(content) = fs::read_to_string(&self.path) else {
            return Map::new();
        };

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => map,
            Ok(_) | Err(_) => {
                tracing::warn!(path = %self.path.display(), "config store is not a JSON object, ignoring it");
                Map::new()
            }
        }
    }
}

impl ConfigStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        match self.read_all().remove(key)? {
            Value::String(s) => Some(s),
            other => Some(other.to_string()),
        }
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        let mut all = self.read_all();
        all.insert(key.to_string(), Value::String(value));

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let serialized = serde_json::to_string_pretty(&Value::Object(all))
            .map_err(|e| MdPickError::config(key, e))?;
        fs::write(&self.path, serialized)?;
        Ok(())
    }
}
