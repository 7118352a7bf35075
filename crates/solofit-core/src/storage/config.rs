//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Countdown lengths for warm-up, rest and evaluation intervals
//! - The custom workout (exercise list with per-exercise `enabled` flags)
//! - Notification preferences
//!
//! Configuration is stored at `~/.config/solofit/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::data_dir;
use crate::error::{ConfigError, ValidationError};
use crate::session::{Exercise, Program, TimerSettings};

/// Countdown lengths, in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimersConfig {
    #[serde(default = "default_warmup_secs")]
    pub warmup_secs: u32,
    #[serde(default = "default_rest_secs")]
    pub rest_secs: u32,
    #[serde(default = "default_exercise_secs")]
    pub exercise_secs: u32,
}

/// One exercise of the configured workout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseConfig {
    pub id: String,
    pub name: String,
    pub sets: u32,
    pub reps: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutConfig {
    #[serde(default = "default_workout_name")]
    pub name: String,
    #[serde(default = "default_exercises")]
    pub exercises: Vec<ExerciseConfig>,
}

/// Notification configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub sounds: bool,
    #[serde(default = "default_true")]
    pub vibration: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/solofit/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timers: TimersConfig,
    #[serde(default)]
    pub workout: WorkoutConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

// Default functions
fn default_warmup_secs() -> u32 {
    300
}
fn default_rest_secs() -> u32 {
    60
}
fn default_exercise_secs() -> u32 {
    300
}
fn default_true() -> bool {
    true
}
fn default_workout_name() -> String {
    Program::full_body().name().to_string()
}
fn default_exercises() -> Vec<ExerciseConfig> {
    Program::full_body()
        .exercises()
        .iter()
        .map(|e| ExerciseConfig {
            id: e.id.clone(),
            name: e.name.clone(),
            sets: e.sets,
            reps: e.reps,
            description: e.description.clone(),
            enabled: true,
        })
        .collect()
}

impl Default for TimersConfig {
    fn default() -> Self {
        Self {
            warmup_secs: default_warmup_secs(),
            rest_secs: default_rest_secs(),
            exercise_secs: default_exercise_secs(),
        }
    }
}

impl Default for WorkoutConfig {
    fn default() -> Self {
        Self {
            name: default_workout_name(),
            exercises: default_exercises(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            sounds: true,
            vibration: true,
        }
    }
}

/// Step into an object field or an array index.
fn child<'a>(value: &'a Value, part: &str) -> Option<&'a Value> {
    match value {
        Value::Array(items) => items.get(part.parse::<usize>().ok()?),
        other => other.get(part),
    }
}

fn child_mut<'a>(value: &'a mut Value, part: &str) -> Option<&'a mut Value> {
    match value {
        Value::Array(items) => items.get_mut(part.parse::<usize>().ok()?),
        other => other.get_mut(part),
    }
}

impl Config {
    fn get_json_value_by_path<'a>(root: &'a Value, key: &str) -> Option<&'a Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = child(current, part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(root: &mut Value, key: &str, value: &str) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        if key.is_empty() {
            return Err(unknown());
        }
        let slot = key
            .split('.')
            .try_fold(root, |current, part| child_mut(current, part))
            .ok_or_else(unknown)?;

        let new_value = match &*slot {
            Value::Bool(_) => Value::Bool(
                value
                    .parse::<bool>()
                    .map_err(|_| invalid(format!("cannot parse '{value}' as true/false")))?,
            ),
            Value::Number(_) => Value::Number(
                value
                    .parse::<u64>()
                    .map_err(|_| invalid(format!("cannot parse '{value}' as a whole number")))?
                    .into(),
            ),
            Value::Object(_) | Value::Array(_) => {
                serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
            }
            _ => Value::String(value.into()),
        };
        *slot = new_value;
        Ok(())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the data directory, writing defaults on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    ///
    /// Array elements are addressed by index: `workout.exercises.0.enabled`.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key. The config is left untouched on error.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the result is not a usable configuration.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let mut json = serde_json::to_value(&*self).map_err(|e| invalid(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| invalid(e.to_string()))?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Every leaf value as `(dot.path, value)`, in document order.
    pub fn list(&self) -> Vec<(String, String)> {
        fn walk(prefix: &str, value: &Value, out: &mut Vec<(String, String)>) {
            let join = |part: &str| {
                if prefix.is_empty() {
                    part.to_string()
                } else {
                    format!("{prefix}.{part}")
                }
            };
            match value {
                Value::Object(map) => {
                    for (k, v) in map {
                        walk(&join(k), v, out);
                    }
                }
                Value::Array(items) => {
                    for (i, v) in items.iter().enumerate() {
                        walk(&join(&i.to_string()), v, out);
                    }
                }
                Value::String(s) => out.push((prefix.to_string(), s.clone())),
                other => out.push((prefix.to_string(), other.to_string())),
            }
        }

        let mut out = Vec::new();
        if let Ok(json) = serde_json::to_value(self) {
            walk("", &json, &mut out);
        }
        out
    }

    /// Reject values no session can run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.timers;
        for (key, secs) in [
            ("timers.warmup_secs", t.warmup_secs),
            ("timers.rest_secs", t.rest_secs),
            ("timers.exercise_secs", t.exercise_secs),
        ] {
            if secs == 0 {
                return Err(ConfigError::InvalidValue {
                    key: key.into(),
                    message: "must be at least one second".into(),
                });
            }
        }
        Ok(())
    }

    pub fn timer_settings(&self) -> TimerSettings {
        TimerSettings {
            warmup_secs: self.timers.warmup_secs,
            rest_secs: self.timers.rest_secs,
            exercise_secs: self.timers.exercise_secs,
        }
    }

    /// The configured workout, enabled exercises only.
    ///
    /// # Errors
    ///
    /// Fails when no exercise is enabled, an id repeats or a set count is zero.
    pub fn workout_program(&self) -> Result<Program, ValidationError> {
        let exercises = self
            .workout
            .exercises
            .iter()
            .filter(|e| e.enabled)
            .map(|e| {
                Exercise::new(e.id.clone(), e.name.clone(), e.sets, e.reps)
                    .with_description(e.description.clone())
            })
            .collect();
        Program::new(self.workout.name.clone(), exercises)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
        assert_eq!(parsed.timers.rest_secs, 60);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[timers]\nrest_secs = 45\n").unwrap();
        assert_eq!(parsed.timers.rest_secs, 45);
        assert_eq!(parsed.timers.warmup_secs, 300);
        assert_eq!(parsed.workout.exercises.len(), 3);
        assert!(parsed.notifications.sounds);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("timers.warmup_secs").as_deref(), Some("300"));
        assert_eq!(cfg.get("workout.exercises.1.id").as_deref(), Some("squats"));
        assert_eq!(cfg.get("notifications.vibration").as_deref(), Some("true"));
        assert!(cfg.get("timers.missing").is_none());
        assert!(cfg.get("workout.exercises.9.id").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn set_updates_nested_values() {
        let mut cfg = Config::default();
        cfg.set("timers.rest_secs", "30").unwrap();
        cfg.set("workout.exercises.2.enabled", "false").unwrap();
        cfg.set("workout.name", "Morning").unwrap();
        assert_eq!(cfg.timers.rest_secs, 30);
        assert!(!cfg.workout.exercises[2].enabled);
        assert_eq!(cfg.workout.name, "Morning");
    }

    #[test]
    fn set_rejects_bad_input_without_changes() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("timers.nope", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(
            cfg.set("timers.rest_secs", "soon"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            cfg.set("timers.rest_secs", "0"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn workout_program_keeps_enabled_exercises() {
        let mut cfg = Config::default();
        cfg.workout.exercises[1].enabled = false;
        let program = cfg.workout_program().unwrap();
        let ids: Vec<_> = program.exercises().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["pushups", "crunches"]);
        assert_eq!(program.estimated_minutes(), 9);
    }

    #[test]
    fn workout_program_needs_an_enabled_exercise() {
        let mut cfg = Config::default();
        for e in &mut cfg.workout.exercises {
            e.enabled = false;
        }
        assert!(matches!(
            cfg.workout_program(),
            Err(ValidationError::EmptyCollection(_))
        ));
    }

    #[test]
    fn list_flattens_leaves() {
        let list = Config::default().list();
        assert!(list.contains(&("timers.exercise_secs".into(), "300".into())));
        assert!(list.contains(&("workout.exercises.0.id".into(), "pushups".into())));
    }

    #[test]
    fn load_from_creates_defaults_then_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(cfg, Config::default());

        let mut changed = cfg.clone();
        changed.set("timers.warmup_secs", "120").unwrap();
        changed.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().timers.warmup_secs, 120);
    }

    #[test]
    fn load_from_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "timers = 5").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::LoadFailed { .. })
        ));
    }
}
