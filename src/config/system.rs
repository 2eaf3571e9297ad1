//! System configuration - root configuration structure.

use heapless::{FnvIndexMap, String};
use serde::Deserialize;

use crate::policy::PolicyUpdate;

use super::motor::MotorConfig;
use super::program::ProgramConfig;
use super::timer::TimerSettings;

/// Root configuration structure from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct SystemConfig {
    /// Tick timer settings.
    pub timer: TimerSettings,

    /// Error policy changes applied over the defaults.
    #[serde(default)]
    pub error_policy: PolicyUpdate,

    /// Motor configurations keyed by their one-character name.
    pub motors: FnvIndexMap<String<8>, MotorConfig, 8>,

    /// Named program configurations.
    #[serde(default)]
    pub programs: FnvIndexMap<String<32>, ProgramConfig, 32>,
}

impl SystemConfig {
    /// Empty configuration around a timer.
    pub fn new(timer: TimerSettings) -> Self {
        Self {
            timer,
            error_policy: PolicyUpdate::default(),
            motors: FnvIndexMap::new(),
            programs: FnvIndexMap::new(),
        }
    }

    /// Get a motor configuration by name.
    pub fn motor(&self, name: &str) -> Option<&MotorConfig> {
        self.motors
            .iter()
            .find(|(k, _)| k.as_str() == name)
            .map(|(_, v)| v)
    }

    /// Get a program configuration by name.
    pub fn program(&self, name: &str) -> Option<&ProgramConfig> {
        self.programs
            .iter()
            .find(|(k, _)| k.as_str() == name)
            .map(|(_, v)| v)
    }

    /// List all motor names.
    pub fn motor_names(&self) -> impl Iterator<Item = &str> {
        self.motors.keys().map(|s| s.as_str())
    }

    /// List all program names.
    pub fn program_names(&self) -> impl Iterator<Item = &str> {
        self.programs.keys().map(|s| s.as_str())
    }
}

/// Motor name of a config key, if the key is exactly one character.
pub fn motor_name(key: &str) -> Option<char> {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}
