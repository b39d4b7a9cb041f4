//! Server settings snapshot and override handling
//!
//! Before warmup starts the current value of every overridden setting is
//! captured; leaving warmup writes the captured values back. Settings are
//! assumed independent of each other, so write order does not matter.

use crate::engine::{Engine, EngineError};
use log::{error, info, warn};
use std::collections::BTreeMap;
use thiserror::Error;

pub type SettingsMap = BTreeMap<String, i64>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SettingsError {
    #[error("failed to read setting: {0}")]
    Engine(#[from] EngineError),

    #[error("setting '{name}' returned non-integer value '{value}'")]
    NotAnInteger { name: String, value: String },
}

/// Reads every named setting as an integer. Fails as a whole if any read fails.
pub fn read_settings<'a>(
    engine: &mut dyn Engine,
    names: impl IntoIterator<Item = &'a String>,
) -> Result<SettingsMap, SettingsError> {
    let mut values = SettingsMap::new();
    for name in names {
        let raw = engine.rcon_invoke(name)?;
        let value = raw
            .trim()
            .parse::<i64>()
            .map_err(|_| SettingsError::NotAnInteger {
                name: name.clone(),
                value: raw.trim().to_string(),
            })?;
        values.insert(name.clone(), value);
    }
    Ok(values)
}

/// Writes each setting unconditionally. Failures are logged per setting.
pub fn write_settings(engine: &mut dyn Engine, values: &SettingsMap) {
    for (name, value) in values {
        if let Err(e) = engine.rcon_invoke(&format!("{} {}", name, value)) {
            error!("Failed to write setting {} = {}: {}", name, value, e);
        }
    }
}

/// Owns the warmup overrides and the captured originals.
#[derive(Debug, Clone)]
pub struct SettingsManager {
    overrides: SettingsMap,
    snapshot: Option<SettingsMap>,
}

impl SettingsManager {
    pub fn new(overrides: SettingsMap) -> Self {
        Self {
            overrides,
            snapshot: None,
        }
    }

    pub fn overrides(&self) -> &SettingsMap {
        &self.overrides
    }

    pub fn snapshot(&self) -> Option<&SettingsMap> {
        self.snapshot.as_ref()
    }

    /// Captures the current values of all overridden settings. On failure the
    /// snapshot is left unset.
    pub fn take_snapshot(&mut self, engine: &mut dyn Engine) -> Result<(), SettingsError> {
        self.snapshot = None;
        let values = read_settings(engine, self.overrides.keys())?;
        info!("Captured {} settings", values.len());
        self.snapshot = Some(values);
        Ok(())
    }

    pub fn apply_overrides(&self, engine: &mut dyn Engine) {
        info!("Applying {} warmup settings", self.overrides.len());
        write_settings(engine, &self.overrides);
    }

    /// Snapshot then override. Overrides are skipped when the snapshot could
    /// not be taken, since they could never be restored.
    pub fn enter_warmup(&mut self, engine: &mut dyn Engine) -> bool {
        match self.take_snapshot(engine) {
            Ok(()) => {
                self.apply_overrides(engine);
                true
            }
            Err(e) => {
                error!("Settings snapshot failed, keeping current settings: {}", e);
                false
            }
        }
    }

    /// Writes the captured values back and forgets them. Without a snapshot
    /// this only logs.
    pub fn restore(&mut self, engine: &mut dyn Engine) {
        match self.snapshot.take() {
            Some(values) => {
                info!("Restoring {} settings", values.len());
                write_settings(engine, &values);
            }
            None => warn!("No settings snapshot to restore"),
        }
    }
}
