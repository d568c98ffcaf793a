//! Veil configuration system
//!
//! This crate provides centralized configuration management for Veil demos
//! and engine defaults, loading settings from `veil.toml` as an alternative
//! to environment variables.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for Veil
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct VeilConfig {
    /// Demo scenario settings
    pub demo: DemoConfig,
    /// Transition engine defaults
    pub engine: EngineConfig,
}

/// Demo scenario configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Scenario to run (toggle, switch, multi-stage)
    pub scenario: Option<String>,
    /// Switch timing policy (simultaneous, enter-first, exit-first)
    pub timing: Option<String>,
}

/// Transition engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Process-wide safety timeout in milliseconds
    pub safety_timeout_ms: Option<u64>,
    /// Class prefix applied to every transition class token
    pub class_prefix: Option<String>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            scenario: None,
            timing: None,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            safety_timeout_ms: None,
            class_prefix: None,
        }
    }
}

impl VeilConfig {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the veil.toml configuration file
    ///
    /// # Returns
    /// * `Ok(VeilConfig)` - Successfully loaded configuration
    /// * `Err(String)` - Error message if loading failed
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {}", e))
    }

    /// Load configuration from the default location (veil.toml in the current
    /// directory) or return default configuration if file doesn't exist
    pub fn load_or_default() -> Self {
        Self::load_from_file("veil.toml").unwrap_or_default()
    }

    /// Merge configuration with environment variables
    ///
    /// Environment variables take precedence over configuration file values.
    /// This allows for temporary overrides without modifying the config file.
    pub fn merge_with_env(&mut self) {
        if let Ok(scenario) = std::env::var("VEIL_SCENARIO") {
            self.demo.scenario = Some(scenario);
        }
        if let Ok(timing) = std::env::var("VEIL_TIMING") {
            self.demo.timing = Some(timing);
        }
        if let Ok(val) = std::env::var("VEIL_SAFETY_TIMEOUT_MS") {
            if let Ok(ms) = val.parse::<u64>() {
                self.engine.safety_timeout_ms = Some(ms);
            }
        }
        if let Ok(prefix) = std::env::var("VEIL_CLASS_PREFIX") {
            self.engine.class_prefix = Some(prefix);
        }
    }

    /// Load configuration with environment variable overrides
    ///
    /// This is the recommended way to load configuration:
    /// 1. Load from veil.toml (or use defaults if not found)
    /// 2. Override with environment variables if present
    pub fn load() -> Self {
        let mut config = Self::load_or_default();
        config.merge_with_env();
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = VeilConfig::default();
        assert!(config.demo.scenario.is_none());
        assert!(config.engine.safety_timeout_ms.is_none());
    }

    #[test]
    fn test_toml_serialization() {
        let config = VeilConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: VeilConfig = toml::from_str(&toml_str).unwrap();
        assert!(parsed.demo.timing.is_none());
    }

    #[test]
    fn test_parse_partial_file() {
        let parsed: VeilConfig = toml::from_str(
            r#"
            [demo]
            scenario = "switch"
            timing = "enter-first"
            "#,
        )
        .unwrap();
        assert_eq!(parsed.demo.scenario.as_deref(), Some("switch"));
        assert_eq!(parsed.demo.timing.as_deref(), Some("enter-first"));
        assert!(parsed.engine.class_prefix.is_none());
    }

    #[test]
    fn test_load_or_default() {
        // Should not panic even if veil.toml doesn't exist
        let config = VeilConfig::load_or_default();
        assert!(config.engine.class_prefix.is_none());
    }

    #[test]
    fn test_merge_with_env() {
        unsafe {
            std::env::set_var("VEIL_SCENARIO", "multi-stage");
            std::env::set_var("VEIL_SAFETY_TIMEOUT_MS", "2500");
        }

        let mut config = VeilConfig::default();
        config.merge_with_env();

        assert_eq!(config.demo.scenario.as_deref(), Some("multi-stage"));
        assert_eq!(config.engine.safety_timeout_ms, Some(2500));

        unsafe {
            std::env::remove_var("VEIL_SCENARIO");
            std::env::remove_var("VEIL_SAFETY_TIMEOUT_MS");
        }
    }
}
