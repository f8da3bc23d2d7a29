//! Overlay configuration
//!
//! Option flags and timing constants. Every field has a default, so a config
//! file only needs the values it changes:
//!
//! ```toml
//! randomize_digits = true
//! show_delay_ms = 150
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Overlay behaviour flags and timings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Reopen each field on the face it last used
    pub remember_last_layout: bool,
    /// Shuffle the digits every time the numeric face is shown
    pub randomize_digits: bool,
    /// Never show the key-press preview bubble
    pub suppress_preview: bool,
    /// Pulse the haptic motor on every key press
    pub vibrate_on_key: bool,

    /// Debounce before a show is carried out
    pub show_delay_ms: u64,
    /// Debounce before a hide is carried out
    pub hide_delay_ms: u64,
    pub show_duration_ms: u64,
    pub hide_duration_ms: u64,
    /// Gap kept between the active field and the overlay or container edge
    pub scroll_margin: f32,
    pub haptic_pulse_ms: u64,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            remember_last_layout: true,
            randomize_digits: false,
            suppress_preview: false,
            vibrate_on_key: false,
            show_delay_ms: 200,
            hide_delay_ms: 50,
            show_duration_ms: 300,
            hide_duration_ms: 300,
            scroll_margin: 10.0,
            haptic_pulse_ms: 20,
        }
    }
}

impl OverlayConfig {
    /// Parse a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Load a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn show_delay(&self) -> Duration {
        Duration::from_millis(self.show_delay_ms)
    }

    pub fn hide_delay(&self) -> Duration {
        Duration::from_millis(self.hide_delay_ms)
    }

    pub fn show_duration(&self) -> Duration {
        Duration::from_millis(self.show_duration_ms)
    }

    pub fn hide_duration(&self) -> Duration {
        Duration::from_millis(self.hide_duration_ms)
    }

    pub fn haptic_pulse(&self) -> Duration {
        Duration::from_millis(self.haptic_pulse_ms)
    }

    /// Set a boolean option
    pub fn set(&mut self, option: OverlayOption, enabled: bool) {
        match option {
            OverlayOption::RememberLastLayout => self.remember_last_layout = enabled,
            OverlayOption::RandomizeDigits => self.randomize_digits = enabled,
            OverlayOption::SuppressPreview => self.suppress_preview = enabled,
            OverlayOption::VibrateOnKey => self.vibrate_on_key = enabled,
        }
    }

    pub fn get(&self, option: OverlayOption) -> bool {
        match option {
            OverlayOption::RememberLastLayout => self.remember_last_layout,
            OverlayOption::RandomizeDigits => self.randomize_digits,
            OverlayOption::SuppressPreview => self.suppress_preview,
            OverlayOption::VibrateOnKey => self.vibrate_on_key,
        }
    }
}

/// Boolean options settable at runtime
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OverlayOption {
    RememberLastLayout,
    RandomizeDigits,
    SuppressPreview,
    VibrateOnKey,
}

impl OverlayOption {
    pub const ALL: [OverlayOption; 4] = [
        OverlayOption::RememberLastLayout,
        OverlayOption::RandomizeDigits,
        OverlayOption::SuppressPreview,
        OverlayOption::VibrateOnKey,
    ];

    pub fn name(self) -> &'static str {
        match self {
            OverlayOption::RememberLastLayout => "rememberLastLayout",
            OverlayOption::RandomizeDigits => "randomizeDigits",
            OverlayOption::SuppressPreview => "suppressPreview",
            OverlayOption::VibrateOnKey => "vibrateOnKey",
        }
    }
}

impl fmt::Display for OverlayOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OverlayOption {
    type Err = ConfigError;

    /// Accepts both `randomizeDigits` and `randomize_digits`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        Self::ALL
            .into_iter()
            .find(|option| option.name().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| ConfigError::UnknownOption(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = OverlayConfig::default();
        assert!(config.remember_last_layout);
        assert!(!config.randomize_digits);
        assert_eq!(config.show_delay(), Duration::from_millis(200));
        assert_eq!(config.hide_delay(), Duration::from_millis(50));
        assert_eq!(config.show_duration(), Duration::from_millis(300));
        assert_eq!(config.scroll_margin, 10.0);
        assert_eq!(config.haptic_pulse(), Duration::from_millis(20));
    }

    #[test]
    fn test_partial_toml() {
        let config = OverlayConfig::from_toml_str(
            r#"
            randomize_digits = true
            show_delay_ms = 150
            "#,
        )
        .unwrap();
        assert!(config.randomize_digits);
        assert_eq!(config.show_delay_ms, 150);
        assert_eq!(config.hide_delay_ms, 50);
    }

    #[test]
    fn test_invalid_toml() {
        let err = OverlayConfig::from_toml_str("show_delay_ms = \"soon\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = OverlayConfig::load("/nonexistent/safekey.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_option_names() {
        assert_eq!(
            "randomizeDigits".parse::<OverlayOption>().unwrap(),
            OverlayOption::RandomizeDigits
        );
        assert_eq!(
            "vibrate_on_key".parse::<OverlayOption>().unwrap(),
            OverlayOption::VibrateOnKey
        );
        assert_eq!(
            "suppress-preview".parse::<OverlayOption>().unwrap(),
            OverlayOption::SuppressPreview
        );
        assert!("turbo".parse::<OverlayOption>().is_err());
    }

    #[test]
    fn test_set_and_get() {
        let mut config = OverlayConfig::default();
        for option in OverlayOption::ALL {
            config.set(option, true);
            assert!(config.get(option));
            config.set(option, false);
            assert!(!config.get(option));
        }
    }
}
