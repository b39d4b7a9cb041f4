//! Module configuration
//!
//! Both modules read named scalar options with documented defaults. A JSON
//! file may override any subset of them; missing keys keep their default.

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use warmup_shared::{Heading, Vec3, DEFAULT_STREAMER_PREFIX};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{field} must be {expected}, got {value}")]
    OutOfRange {
        field: &'static str,
        expected: &'static str,
        value: f64,
    },
}

/// Converts a seconds option, rejecting values a timer cannot use.
fn seconds(field: &'static str, value: f64, allow_zero: bool) -> Result<Duration, ConfigError> {
    let out_of_range = || ConfigError::OutOfRange {
        field,
        expected: if allow_zero {
            "a non-negative number of seconds"
        } else {
            "a positive number of seconds"
        },
        value,
    };
    if value == 0.0 && !allow_zero {
        return Err(out_of_range());
    }
    Duration::try_from_secs_f64(value).map_err(|_| out_of_range())
}

/// A fixed spawn location with the orientation as written in waypoint tables.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(from = "([f32; 3], [f32; 3])")]
pub struct Waypoint {
    pub position: Vec3,
    pub heading: Heading,
}

impl Waypoint {
    pub const fn new(position: (f32, f32, f32), heading: (f32, f32, f32)) -> Self {
        Self {
            position: Vec3::new(position.0, position.1, position.2),
            heading: Heading::new(heading.0, heading.1, heading.2),
        }
    }
}

impl From<([f32; 3], [f32; 3])> for Waypoint {
    fn from((p, h): ([f32; 3], [f32; 3])) -> Self {
        Waypoint::new((p[0], p[1], p[2]), (h[0], h[1], h[2]))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub warmup: WarmupConfig,
    pub freecam: FreecamConfig,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every timing and height option. Call again after applying
    /// overrides from other sources.
    pub fn validate(&self) -> Result<(), ConfigError> {
        seconds("warmup.sampleRate", self.warmup.sample_rate, false)?;
        seconds("warmup.initDelay", self.warmup.init_delay, true)?;
        seconds("freecam.sampleRate", self.freecam.sample_rate, false)?;
        seconds("freecam.initDelay", self.freecam.init_delay, true)?;
        if !self.freecam.height.is_finite() {
            return Err(ConfigError::OutOfRange {
                field: "freecam.height",
                expected: "a finite number",
                value: self.freecam.height as f64,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WarmupConfig {
    /// Seconds between status reports
    pub sample_rate: f64,
    /// Seconds before the first status report
    pub init_delay: f64,
    pub streamer_prefix: String,
    /// Settings overridden during warmup. Every value is treated as an integer.
    pub changed_variables: BTreeMap<String, i64>,
    /// Extra per-map waypoint lists, merged over the built-in table.
    pub waypoints: HashMap<String, Vec<Waypoint>>,
}

// Invalid values fall back to the defaults; `Config::validate` reports them.
impl WarmupConfig {
    pub fn sample_interval(&self) -> Duration {
        seconds("warmup.sampleRate", self.sample_rate, false)
            .unwrap_or_else(|_| Duration::from_secs(20))
    }

    pub fn initial_delay(&self) -> Duration {
        seconds("warmup.initDelay", self.init_delay, true)
            .unwrap_or_else(|_| Duration::from_secs(10))
    }
}

impl Default for WarmupConfig {
    fn default() -> Self {
        let changed_variables = [
            ("sv.spawnTime", 1),
            ("sv.soldierFriendlyFire", 2),
            ("sv.manDownTime", 0),
            ("sv.timeBeforeRestartMap", 5),
            ("sv.startDelay", 5),
            ("sv.endDelay", 3),
            ("sv.endOfRoundDelay", 4),
            ("sv.ticketRatio", 800),
            ("sv.timeLimit", 3600),
        ]
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect();

        Self {
            sample_rate: 20.0,
            init_delay: 10.0,
            streamer_prefix: DEFAULT_STREAMER_PREFIX.to_string(),
            changed_variables,
            waypoints: HashMap::new(),
        }
    }
}

/// How the holding point of a dead player's camera is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FreecamPolicy {
    /// Park at the configured height above the centre of the map's objectives,
    /// corrected on every tick.
    MapCentroid,
    /// Shift the camera by a fixed offset once, at death.
    RelativeOnDeath(Vec3),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FreecamConfig {
    /// Seconds between player scans
    pub sample_rate: f64,
    pub init_delay: f64,
    /// Holding height. Large maps lose minimap vehicles above roughly 390-440.
    pub height: f32,
    pub streamer_prefix: String,
    pub policy: FreecamPolicy,
}

impl FreecamConfig {
    pub fn sample_interval(&self) -> Duration {
        seconds("freecam.sampleRate", self.sample_rate, false)
            .unwrap_or_else(|_| Duration::from_millis(800))
    }

    pub fn initial_delay(&self) -> Duration {
        seconds("freecam.initDelay", self.init_delay, true)
            .unwrap_or_else(|_| Duration::from_secs(10))
    }
}

impl Default for FreecamConfig {
    fn default() -> Self {
        Self {
            sample_rate: 0.8,
            init_delay: 10.0,
            height: 390.0,
            streamer_prefix: DEFAULT_STREAMER_PREFIX.to_string(),
            policy: FreecamPolicy::MapCentroid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.warmup.sample_rate, 20.0);
        assert_eq!(config.warmup.streamer_prefix, "STREAM");
        assert_eq!(config.warmup.changed_variables.len(), 9);
        assert_eq!(config.warmup.changed_variables["sv.ticketRatio"], 800);
        assert_eq!(config.freecam.height, 390.0);
        assert_eq!(config.freecam.policy, FreecamPolicy::MapCentroid);
        assert_eq!(config.freecam.sample_interval(), Duration::from_millis(800));
    }

    #[test]
    fn test_partial_override() {
        let config = Config::from_json(
            r#"{
                "warmup": { "sampleRate": 5, "streamerPrefix": "TV" },
                "freecam": { "height": 440.5 }
            }"#,
        )
        .unwrap();

        assert_eq!(config.warmup.sample_rate, 5.0);
        assert_eq!(config.warmup.init_delay, 10.0);
        assert_eq!(config.warmup.streamer_prefix, "TV");
        assert_eq!(config.warmup.changed_variables.len(), 9);
        assert_eq!(config.freecam.height, 440.5);
        assert_eq!(config.freecam.streamer_prefix, "STREAM");
    }

    #[test]
    fn test_changed_variables_replace_defaults() {
        let config =
            Config::from_json(r#"{ "warmup": { "changedVariables": { "sv.spawnTime": 3 } } }"#)
                .unwrap();
        assert_eq!(config.warmup.changed_variables.len(), 1);
        assert_eq!(config.warmup.changed_variables["sv.spawnTime"], 3);
    }

    #[test]
    fn test_waypoint_literal() {
        let config = Config::from_json(
            r#"{ "warmup": { "waypoints": { "dalian_plant": [[[1, 2, 3], [90, 0, 0]]] } } }"#,
        )
        .unwrap();
        let list = &config.warmup.waypoints["dalian_plant"];
        assert_eq!(list.len(), 1);
        assert_eq!(list[0], Waypoint::new((1.0, 2.0, 3.0), (90.0, 0.0, 0.0)));
    }

    #[test]
    fn test_relative_policy() {
        let config = Config::from_json(
            r#"{ "freecam": { "policy": { "relativeOnDeath": { "x": 0, "y": 1000, "z": 0 } } } }"#,
        )
        .unwrap();
        assert_eq!(
            config.freecam.policy,
            FreecamPolicy::RelativeOnDeath(Vec3::new(0.0, 1000.0, 0.0))
        );
    }

    #[test]
    fn test_out_of_range_timing_rejected() {
        let result = Config::from_json(r#"{ "warmup": { "sampleRate": -1 } }"#);
        assert!(matches!(
            result,
            Err(ConfigError::OutOfRange { field: "warmup.sampleRate", .. })
        ));

        let result = Config::from_json(r#"{ "freecam": { "sampleRate": 0 } }"#);
        assert!(matches!(
            result,
            Err(ConfigError::OutOfRange { field: "freecam.sampleRate", .. })
        ));

        let result = Config::from_json(r#"{ "freecam": { "initDelay": 1e300 } }"#);
        assert!(matches!(
            result,
            Err(ConfigError::OutOfRange { field: "freecam.initDelay", .. })
        ));

        assert!(Config::from_json(r#"{ "warmup": { "initDelay": 0 } }"#).is_ok());
    }

    #[test]
    fn test_invalid_overrides_do_not_panic() {
        let mut config = Config::default();
        config.warmup.sample_rate = -1.0;
        config.freecam.init_delay = f64::NAN;
        assert!(config.validate().is_err());

        assert_eq!(config.warmup.sample_interval(), Duration::from_secs(20));
        assert_eq!(config.freecam.initial_delay(), Duration::from_secs(10));
    }

    #[test]
    fn test_invalid_json() {
        let result = Config::from_json("{ not json");
        assert!(matches!(result, Err(ConfigError::Json(_))));
    }
}
