//! TOML-based application configuration.
//!
//! Stores everything a session is built from:
//! - Copy (recipient, sender, evasive-target captions)
//! - The reaction clip URL
//! - Evasion timings, margins and attempt cap
//! - Reveal stage offsets and restart delay
//! - Confetti and background heart density
//!
//! Configuration is stored at `~/.config/valentine/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, CoreError, Result, ValidationError};
use crate::evasion::{EvasionSettings, LabelSet, DEFAULT_LABELS, DEFAULT_TERMINAL_LABEL};
use crate::geometry::{Placement, Size};
use crate::media::DEFAULT_MEDIA_URL;
use crate::reveal::{ConfettiSettings, RevealPlan, RevealSettings, RevealStage, RevealStep};

/// Returns `~/.config/valentine[-dev]/` based on VALENTINE_ENV.
///
/// Set VALENTINE_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("VALENTINE_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("valentine-dev")
    } else {
        base_dir.join("valentine")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Names and captions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopyConfig {
    #[serde(default = "default_recipient")]
    pub recipient: String,
    #[serde(default = "default_sender")]
    pub sender: String,
    #[serde(default = "default_labels")]
    pub labels: Vec<String>,
    #[serde(default = "default_terminal_label")]
    pub terminal_label: String,
}

/// Reaction clip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    #[serde(default = "default_media_url")]
    pub url: String,
    /// Start fetching as soon as the session starts.
    #[serde(default = "default_true")]
    pub preload: bool,
}

/// Evasive target behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvasionConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_anticipation_ms")]
    pub anticipation_ms: u64,
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
    #[serde(default = "default_fade_ms")]
    pub fade_ms: u64,
    #[serde(default = "default_bounce_ms")]
    pub bounce_ms: u64,
    #[serde(default = "default_viewport_margin")]
    pub viewport_margin: f64,
    #[serde(default = "default_container_margin")]
    pub container_margin: f64,
    #[serde(default = "default_target_width")]
    pub fallback_width: f64,
    #[serde(default = "default_target_height")]
    pub fallback_height: f64,
}

/// Celebration timings, from the moment the screen switches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevealConfig {
    #[serde(default = "default_card_ms")]
    pub card_ms: u64,
    #[serde(default = "default_message_ms")]
    pub message_ms: u64,
    #[serde(default = "default_media_ms")]
    pub media_ms: u64,
    #[serde(default = "default_full_ms")]
    pub full_ms: u64,
    #[serde(default = "default_media_reveal_ms")]
    pub media_reveal_ms: u64,
    #[serde(default = "default_restart_delay_ms")]
    pub restart_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfettiConfig {
    #[serde(default = "default_confetti_count")]
    pub count: usize,
    #[serde(default = "default_max_delay_s")]
    pub max_delay_s: f64,
    #[serde(default = "default_min_duration_s")]
    pub min_duration_s: f64,
    #[serde(default = "default_duration_spread_s")]
    pub duration_spread_s: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartsConfig {
    #[serde(default = "default_heart_count")]
    pub count: usize,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/valentine/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub copy: CopyConfig,
    #[serde(default)]
    pub media: MediaConfig,
    #[serde(default)]
    pub evasion: EvasionConfig,
    #[serde(default)]
    pub reveal: RevealConfig,
    #[serde(default)]
    pub confetti: ConfettiConfig,
    #[serde(default)]
    pub hearts: HeartsConfig,
}

// Default functions
fn default_recipient() -> String {
    "Khushboo".into()
}
fn default_sender() -> String {
    "Krish".into()
}
fn default_labels() -> Vec<String> {
    DEFAULT_LABELS.iter().map(|s| s.to_string()).collect()
}
fn default_terminal_label() -> String {
    DEFAULT_TERMINAL_LABEL.into()
}
fn default_media_url() -> String {
    DEFAULT_MEDIA_URL.into()
}
fn default_true() -> bool {
    true
}
fn default_max_attempts() -> u32 {
    12
}
fn default_anticipation_ms() -> u64 {
    120
}
fn default_settle_ms() -> u64 {
    500
}
fn default_fade_ms() -> u64 {
    800
}
fn default_bounce_ms() -> u64 {
    400
}
fn default_viewport_margin() -> f64 {
    10.0
}
fn default_container_margin() -> f64 {
    20.0
}
fn default_target_width() -> f64 {
    120.0
}
fn default_target_height() -> f64 {
    44.0
}
fn default_card_ms() -> u64 {
    100
}
fn default_message_ms() -> u64 {
    400
}
fn default_media_ms() -> u64 {
    1200
}
fn default_full_ms() -> u64 {
    1800
}
fn default_media_reveal_ms() -> u64 {
    50
}
fn default_restart_delay_ms() -> u64 {
    800
}
fn default_confetti_count() -> usize {
    100
}
fn default_max_delay_s() -> f64 {
    4.0
}
fn default_min_duration_s() -> f64 {
    2.5
}
fn default_duration_spread_s() -> f64 {
    3.0
}
fn default_heart_count() -> usize {
    15
}

impl Default for CopyConfig {
    fn default() -> Self {
        Self {
            recipient: default_recipient(),
            sender: default_sender(),
            labels: default_labels(),
            terminal_label: default_terminal_label(),
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            url: default_media_url(),
            preload: true,
        }
    }
}

impl Default for EvasionConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            anticipation_ms: default_anticipation_ms(),
            settle_ms: default_settle_ms(),
            fade_ms: default_fade_ms(),
            bounce_ms: default_bounce_ms(),
            viewport_margin: default_viewport_margin(),
            container_margin: default_container_margin(),
            fallback_width: default_target_width(),
            fallback_height: default_target_height(),
        }
    }
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            card_ms: default_card_ms(),
            message_ms: default_message_ms(),
            media_ms: default_media_ms(),
            full_ms: default_full_ms(),
            media_reveal_ms: default_media_reveal_ms(),
            restart_delay_ms: default_restart_delay_ms(),
        }
    }
}

impl Default for ConfettiConfig {
    fn default() -> Self {
        Self {
            count: default_confetti_count(),
            max_delay_s: default_max_delay_s(),
            min_duration_s: default_min_duration_s(),
            duration_spread_s: default_duration_spread_s(),
        }
    }
}

impl Default for HeartsConfig {
    fn default() -> Self {
        Self {
            count: default_heart_count(),
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
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
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

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    pub fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or write and return the default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        Self::load_from(Self::path()?)
    }

    /// [`Config::load`] against an explicit file.
    pub fn load_from(path: PathBuf) -> Result<Self> {
        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).map_err(|e| {
                CoreError::from(ConfigError::LoadFailed {
                    path,
                    message: e.to_string(),
                })
            }),
            Err(_) => {
                let cfg = Self::default();
                cfg.save_to(&path)?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        std::fs::write(path, content).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
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

    /// Set a config value by key and persist it.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// the result does not validate, or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.apply(key, value)?;
        self.save()
    }

    /// Set a config value in memory only.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<()> {
        self.labels()?;
        self.reveal_plan()?;
        if self.evasion.max_attempts == 0 {
            return Err(ValidationError::InvalidValue {
                field: "evasion.max_attempts".into(),
                message: "must be at least 1".into(),
            }
            .into());
        }
        if let Err(e) = url::Url::parse(&self.media.url) {
            return Err(ValidationError::InvalidValue {
                field: "media.url".into(),
                message: e.to_string(),
            }
            .into());
        }
        Ok(())
    }

    pub fn labels(&self) -> Result<LabelSet, ValidationError> {
        LabelSet::new(self.copy.labels.clone(), self.copy.terminal_label.clone())
    }

    pub fn reveal_plan(&self) -> Result<RevealPlan, ValidationError> {
        let r = &self.reveal;
        RevealPlan::new(vec![
            RevealStep {
                stage: RevealStage::CardShown,
                offset_ms: r.card_ms,
                label: "Card".into(),
            },
            RevealStep {
                stage: RevealStage::MessageShown,
                offset_ms: r.message_ms,
                label: "Message".into(),
            },
            RevealStep {
                stage: RevealStage::MediaShown,
                offset_ms: r.media_ms,
                label: "Media".into(),
            },
            RevealStep {
                stage: RevealStage::FullyRevealed,
                offset_ms: r.full_ms,
                label: "Everything else".into(),
            },
        ])
    }

    pub fn evasion_settings(&self) -> EvasionSettings {
        let e = &self.evasion;
        EvasionSettings {
            max_attempts: e.max_attempts,
            anticipation_ms: e.anticipation_ms,
            settle_ms: e.settle_ms,
            fade_ms: e.fade_ms,
            bounce_ms: e.bounce_ms,
            placement: Placement {
                viewport_margin: e.viewport_margin,
                container_margin: e.container_margin,
                fallback_target: Size::new(e.fallback_width, e.fallback_height),
            },
        }
    }

    pub fn reveal_settings(&self) -> RevealSettings {
        RevealSettings {
            media_reveal_ms: self.reveal.media_reveal_ms,
            restart_delay_ms: self.reveal.restart_delay_ms,
        }
    }

    pub fn confetti_settings(&self) -> ConfettiSettings {
        ConfettiSettings {
            count: self.confetti.count,
            max_delay_s: self.confetti.max_delay_s,
            min_duration_s: self.confetti.min_duration_s,
            duration_spread_s: self.confetti.duration_spread_s,
            ..ConfettiSettings::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_from_writes_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(path.clone()).unwrap();
        assert_eq!(cfg.copy.recipient, "Khushboo");
        assert!(path.exists());

        let mut changed = cfg;
        changed.apply("copy.sender", "Ravi").unwrap();
        changed.save_to(&path).unwrap();
        assert_eq!(Config::load_from(path).unwrap().copy.sender, "Ravi");
    }

    #[test]
    fn load_from_reports_malformed_file_with_its_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[evasion]\nmax_attempts = \"many\"\n").unwrap();
        match Config::load_from(path.clone()) {
            Err(CoreError::Config(ConfigError::LoadFailed { path: p, .. })) => assert_eq!(p, path),
            other => panic!("expected LoadFailed, got {other:?}"),
        }
    }

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.copy.recipient, "Khushboo");
        assert_eq!(parsed.copy.labels.len(), 12);
        assert_eq!(parsed.evasion.max_attempts, 12);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[copy]\nrecipient = \"Sam\"\n").unwrap();
        assert_eq!(parsed.copy.recipient, "Sam");
        assert_eq!(parsed.copy.sender, "Krish");
        assert_eq!(parsed.reveal.media_ms, 1200);
        assert_eq!(parsed.confetti.count, 100);
    }

    #[test]
    fn derived_settings_match_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.evasion_settings(), EvasionSettings::default());
        assert_eq!(cfg.reveal_settings(), RevealSettings::default());
        assert_eq!(cfg.confetti_settings(), ConfettiSettings::default());
        assert_eq!(cfg.reveal_plan().unwrap(), RevealPlan::default());
        assert_eq!(cfg.labels().unwrap(), LabelSet::default());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("copy.recipient").as_deref(), Some("Khushboo"));
        assert_eq!(cfg.get("evasion.settle_ms").as_deref(), Some("500"));
        assert_eq!(cfg.get("media.preload").as_deref(), Some("true"));
        assert!(cfg.get("copy.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn apply_updates_nested_values() {
        let mut cfg = Config::default();
        cfg.apply("copy.recipient", "Alex").unwrap();
        cfg.apply("evasion.max_attempts", "5").unwrap();
        cfg.apply("evasion.container_margin", "12.5").unwrap();
        cfg.apply("media.preload", "false").unwrap();
        cfg.apply("copy.labels", r#"["no", "stop"]"#).unwrap();
        assert_eq!(cfg.copy.recipient, "Alex");
        assert_eq!(cfg.evasion.max_attempts, 5);
        assert_eq!(cfg.evasion.container_margin, 12.5);
        assert!(!cfg.media.preload);
        assert_eq!(cfg.copy.labels, vec!["no", "stop"]);
    }

    #[test]
    fn apply_rejects_unknown_and_invalid() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.apply("copy.nonexistent", "x"),
            Err(CoreError::Config(ConfigError::UnknownKey(_)))
        ));
        assert!(matches!(
            cfg.apply("media.preload", "maybe"),
            Err(CoreError::Config(ConfigError::InvalidValue { .. }))
        ));
        assert!(cfg.apply("copy.labels", "[]").is_err());
        assert!(cfg.apply("reveal.media_ms", "50").is_err());
        assert!(cfg.apply("evasion.max_attempts", "0").is_err());
        assert!(cfg.apply("media.url", "not a url").is_err());
        // nothing stuck
        assert_eq!(cfg.copy.labels.len(), 12);
        assert_eq!(cfg.reveal.media_ms, 1200);
    }
}
