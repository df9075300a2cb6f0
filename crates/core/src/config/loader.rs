use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::config::filter::FilterConfig;
use crate::config::shortcut::ShortcutConfig;
use crate::config::store::ConfigStore;
use crate::{MdPickError, Result};

/// A configuration type persisted under a fixed storage key.
pub trait Layered: Serialize + DeserializeOwned + Default {
    const STORAGE_KEY: &'static str;
}

impl Layered for FilterConfig {
    const STORAGE_KEY: &'static str = "filterConfig";
}

impl Layered for ShortcutConfig {
    const STORAGE_KEY: &'static str = "shortCutConfig";
}

/// Loads configuration by layering built-in defaults, persisted overrides and
/// in-session overrides. Each layer replaces whole top-level keys.
#[derive(Debug, Clone)]
pub struct ConfigLoader<S> {
    store: S,
}

impl<S: ConfigStore> ConfigLoader<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Load `T` with no session overrides.
    pub fn load<T: Layered>(&mut self) -> T {
        self.load_with(&Map::new())
    }

    /// Load `T`, layering `session` over the persisted value.
    ///
    /// Never fails: corrupted persisted values are replaced by the defaults,
    /// and a merged value that does not deserialize falls back to the defaults.
    pub fn load_with<T: Layered>(&mut self, session: &Map<String, Value>) -> T {
        let merged = self.merge_layers::<T>(session);

        match serde_json::from_value(Value::Object(merged)) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(key = T::STORAGE_KEY, %err, "merged config is invalid, using defaults");
                T::default()
            }
        }
    }

    /// Validate a raw JSON edit of the filter config, merge it over the
    /// defaults and persist it.
    ///
    /// # Errors
    ///
    /// Returns [`MdPickError::ConfigParse`] when `raw` is not a JSON object;
    /// nothing is persisted in that case.
    pub fn apply_filter_edit(&mut self, raw: &str) -> Result<FilterConfig> {
        let key = FilterConfig::STORAGE_KEY;
        let edit = parse_object(key, raw)?;

        let mut merged = defaults_object::<FilterConfig>();
        merged.extend(edit);

        let config: FilterConfig =
            serde_json::from_value(Value::Object(merged.clone())).map_err(|e| MdPickError::config(key, e))?;
        self.persist(key, &merged);

        tracing::debug!(key, "filter config updated");
        Ok(config)
    }

    fn merge_layers<T: Layered>(&mut self, session: &Map<String, Value>) -> Map<String, Value> {
        let key = T::STORAGE_KEY;
        let defaults = defaults_object::<T>();
        let mut merged = defaults.clone();

        match self.store.get(key) {
            Some(stored) => match parse_object(key, &stored) {
                Ok(persisted) => merged.extend(persisted),
                Err(err) => {
                    tracing::warn!(%err, "resetting corrupted persisted config");
                    self.persist(key, &defaults);
                }
            },
            None => self.persist(key, &defaults),
        }

        if !session.is_empty() {
            merged.extend(session.clone());
            self.persist(key, &merged);
        }

        merged
    }

    fn persist(&mut self, key: &str, value: &Map<String, Value>) {
        let serialized = Value::Object(value.clone()).to_string();
        if let Err(err) = self.store.set(key, serialized) {
            tracing::warn!(key, %err, "failed to persist config");
        }
    }
}

fn defaults_object<T: Layered>() -> Map<String, Value> {
    match serde_json::to_value(T::default()) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

fn parse_object(key: &str, raw: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(MdPickError::config(key, format!("expected a JSON object, found {other}"))),
        Err(err) => Err(MdPickError::config(key, err)),
    }
}
