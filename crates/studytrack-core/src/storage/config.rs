//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Alert cooldown and output (terminal bell, log only, external command)
//! - Snapshot cadence for the CLI display
//!
//! Configuration is stored at `~/.config/studytrack/config.toml`.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::alert::{AlertSink, CommandSink, LogSink, SinkKind, TerminalBell};
use crate::error::ConfigError;
use crate::tracker::DEFAULT_COOLDOWN_SECS;

/// Alert configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Minimum spacing between two alerts, in seconds.
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: f64,
    #[serde(default = "default_sink")]
    pub sink: SinkKind,
    /// How long the bell sink holds the alert slot.
    #[serde(default = "default_tone_ms")]
    pub tone_ms: u64,
    /// Program and arguments for the command sink.
    #[serde(default)]
    pub command: Vec<String>,
}

/// Display configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Print a snapshot every N accepted observations; 0 prints only the summary.
    #[serde(default = "default_snapshot_every")]
    pub snapshot_every: u64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/studytrack/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub alert: AlertConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

// Default functions
fn default_true() -> bool {
    true
}
fn default_cooldown_secs() -> f64 {
    DEFAULT_COOLDOWN_SECS as f64
}
fn default_sink() -> SinkKind {
    SinkKind::Bell
}
fn default_tone_ms() -> u64 {
    500
}
fn default_snapshot_every() -> u64 {
    1
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cooldown_secs: default_cooldown_secs(),
            sink: default_sink(),
            tone_ms: default_tone_ms(),
            command: Vec::new(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            snapshot_every: default_snapshot_every(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().map_or(true, |p| p.is_empty()) {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;

            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value
                        .parse::<bool>()
                        .map_err(|e| invalid(e.to_string()))?,
                ),
                serde_json::Value::Number(_) => {
                    if let Ok(n) = value.parse::<u64>() {
                        serde_json::Value::Number(n.into())
                    } else if let Ok(n) = value.parse::<f64>() {
                        serde_json::Number::from_f64(n)
                            .map(serde_json::Value::Number)
                            .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                    } else {
                        return Err(invalid(format!("cannot parse '{value}' as number")));
                    }
                }
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                }
                _ => serde_json::Value::String(value.into()),
            };

            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    /// Location of the config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be created.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit path, writing defaults there if it is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// default config cannot be written.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
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

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Persist to an explicit path.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key. Does not save.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the resulting config is invalid. `self` is unchanged on error.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Check the values serde cannot check on its own.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let secs = self.alert.cooldown_secs;
        if !secs.is_finite() || secs < 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "alert.cooldown_secs".into(),
                message: format!("must be a non-negative number of seconds, got {secs}"),
            });
        }
        if self.alert.sink == SinkKind::Command && self.alert.command.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "alert.command".into(),
                message: "the command sink needs a program to run".into(),
            });
        }
        Ok(())
    }

    pub fn cooldown(&self) -> Duration {
        Duration::milliseconds((self.alert.cooldown_secs * 1000.0).round() as i64)
    }

    /// Build the configured alert sink, or `None` when alerts are disabled.
    ///
    /// # Errors
    ///
    /// Returns an error if the command sink is selected without a command.
    pub fn build_sink(&self) -> Result<Option<Arc<dyn AlertSink>>, ConfigError> {
        if !self.alert.enabled {
            return Ok(None);
        }
        let sink: Arc<dyn AlertSink> = match self.alert.sink {
            SinkKind::Bell => Arc::new(TerminalBell::new(StdDuration::from_millis(
                self.alert.tone_ms,
            ))),
            SinkKind::Log => Arc::new(LogSink),
            SinkKind::Command => Arc::new(CommandSink::from_argv(&self.alert.command).ok_or_else(
                || ConfigError::InvalidValue {
                    key: "alert.command".into(),
                    message: "the command sink needs a program to run".into(),
                },
            )?),
        };
        Ok(Some(sink))
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
        assert!(parsed.alert.enabled);
        assert_eq!(parsed.alert.cooldown_secs, 3.0);
        assert_eq!(parsed.alert.sink, SinkKind::Bell);
        assert_eq!(parsed.display.snapshot_every, 1);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[alert]\nsink = \"log\"\n").unwrap();
        assert_eq!(parsed.alert.sink, SinkKind::Log);
        assert_eq!(parsed.alert.tone_ms, 500);
        assert_eq!(parsed.display.snapshot_every, 1);
    }

    #[test]
    fn get_uses_dot_paths() {
        let cfg = Config::default();
        assert_eq!(cfg.get("alert.sink").as_deref(), Some("bell"));
        assert_eq!(cfg.get("alert.enabled").as_deref(), Some("true"));
        assert_eq!(cfg.get("alert.missing"), None);
        assert_eq!(cfg.get(""), None);
    }

    #[test]
    fn set_updates_typed_values() {
        let mut cfg = Config::default();
        cfg.set("alert.cooldown_secs", "7.5").unwrap();
        cfg.set("alert.enabled", "false").unwrap();
        cfg.set("display.snapshot_every", "10").unwrap();
        cfg.set("alert.command", r#"["paplay", "beep.wav"]"#).unwrap();
        cfg.set("alert.sink", "command").unwrap();

        assert_eq!(cfg.cooldown(), Duration::milliseconds(7_500));
        assert!(!cfg.alert.enabled);
        assert_eq!(cfg.display.snapshot_every, 10);
        assert_eq!(cfg.alert.sink, SinkKind::Command);
    }

    #[test]
    fn set_rejects_unknown_keys_and_bad_values() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("alert.volume", "3"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(
            cfg.set("alert.enabled", "maybe"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(cfg.set("alert.sink", "siren").is_err());
        assert!(cfg.set("alert.cooldown_secs", "-1").is_err());
        // Command sink without a command is refused and nothing changes.
        assert!(cfg.set("alert.sink", "command").is_err());
        assert_eq!(cfg.alert.sink, SinkKind::Bell);
    }

    #[test]
    fn disabled_alerts_build_no_sink() {
        let mut cfg = Config::default();
        assert!(cfg.build_sink().unwrap().is_some());
        cfg.alert.enabled = false;
        assert!(cfg.build_sink().unwrap().is_none());
    }

    #[test]
    fn load_from_creates_defaults_then_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let cfg = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(cfg.alert.cooldown_secs, 3.0);

        let mut changed = cfg.clone();
        changed.set("alert.tone_ms", "250").unwrap();
        changed.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().alert.tone_ms, 250);
    }

    #[test]
    fn load_from_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[alert\ncooldown_secs = ").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::LoadFailed { .. })
        ));
    }
}
