//! Folio configuration
//!
//! Every field has a built-in default, so an empty file (or no file at all)
//! gives the stock behaviour. Example `folio.toml`:
//!
//! ```toml
//! [capability]
//! mobile_breakpoint = 768.0
//!
//! [sections.hero]
//! threshold = 0.25
//! root_margin = "0px 0px -120px 0px"
//!
//! [navigation]
//! scroll_offset = 80.0
//!
//! [timing]
//! stagger_ms = 80.0
//! ```

use crate::error::ConfigError;
use folio_core::capability::CapabilityPolicy;
use folio_core::observer::{ObserverConfig, RootMargin};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Top-level configuration
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FolioConfig {
    pub capability: CapabilityConfig,
    pub sections: SectionsConfig,
    pub navigation: NavigationConfig,
    pub timing: TimingConfig,
}

impl FolioConfig {
    /// Parse and validate TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: FolioConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded folio config");
        Ok(config)
    }

    /// Serialize back to TOML
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let breakpoint = self.capability.mobile_breakpoint;
        if !(breakpoint.is_finite() && breakpoint >= 0.0) {
            return Err(ConfigError::Value {
                field: "capability.mobile_breakpoint".into(),
                message: "must be a non-negative number".into(),
            });
        }
        for (name, gate) in self.sections.iter() {
            gate.observer_config(name)?;
        }
        if self.timing.stagger_ms < 0.0 || self.timing.stagger_ms.is_nan() {
            return Err(ConfigError::Value {
                field: "timing.stagger_ms".into(),
                message: "must not be negative".into(),
            });
        }
        Ok(())
    }

    pub fn capability_policy(&self) -> CapabilityPolicy {
        CapabilityPolicy {
            mobile_breakpoint: self.capability.mobile_breakpoint,
            software_signatures: self.capability.software_signatures.clone(),
        }
    }
}

/// Capability probe tunables
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CapabilityConfig {
    pub mobile_breakpoint: f32,
    pub software_signatures: Vec<String>,
}

impl Default for CapabilityConfig {
    fn default() -> Self {
        let policy = CapabilityPolicy::default();
        Self {
            mobile_breakpoint: policy.mobile_breakpoint,
            software_signatures: policy.software_signatures,
        }
    }
}

/// Visibility trigger for one section
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct GateConfig {
    pub threshold: f32,
    #[serde(default = "default_root_margin")]
    pub root_margin: String,
}

fn default_root_margin() -> String {
    "0px".to_string()
}

impl GateConfig {
    pub fn new(threshold: f32, root_margin: impl Into<String>) -> Self {
        Self {
            threshold,
            root_margin: root_margin.into(),
        }
    }

    /// Resolve into an observer config; `section` names the error
    pub fn observer_config(&self, section: &str) -> Result<ObserverConfig, ConfigError> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(ConfigError::Value {
                field: format!("sections.{section}.threshold"),
                message: format!("{} is outside [0, 1]", self.threshold),
            });
        }
        let margin = RootMargin::parse(&self.root_margin).map_err(|source| {
            ConfigError::RootMargin {
                section: section.to_string(),
                source,
            }
        })?;
        Ok(ObserverConfig::new(self.threshold).with_root_margin(margin))
    }
}

/// Per-section visibility triggers
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SectionsConfig {
    pub intro: GateConfig,
    pub navigation: GateConfig,
    pub hero: GateConfig,
    pub about: GateConfig,
    pub skills: GateConfig,
}

impl SectionsConfig {
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &GateConfig)> {
        [
            ("intro", &self.intro),
            ("navigation", &self.navigation),
            ("hero", &self.hero),
            ("about", &self.about),
            ("skills", &self.skills),
        ]
        .into_iter()
    }
}

impl Default for SectionsConfig {
    fn default() -> Self {
        Self {
            intro: GateConfig::new(0.0, "0px"),
            navigation: GateConfig::new(0.0, "0px"),
            hero: GateConfig::new(0.2, "0px 0px -100px 0px"),
            about: GateConfig::new(0.2, "0px 0px -100px 0px"),
            skills: GateConfig::new(0.3, "0px 0px -50px 0px"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Scroll distance after which the bar gets its backdrop
    pub scroll_offset: f32,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self { scroll_offset: 50.0 }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Delay between consecutive items in a staggered group
    pub stagger_ms: f32,
    /// Length of the intro curtain
    pub curtain_ms: f32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            stagger_ms: 100.0,
            curtain_ms: 1200.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::observer::Length;

    #[test]
    fn test_empty_config_is_default() {
        let config = FolioConfig::from_toml_str("").unwrap();
        assert_eq!(config, FolioConfig::default());
        assert_eq!(config.capability_policy(), CapabilityPolicy::default());
    }

    #[test]
    fn test_partial_override() {
        let config = FolioConfig::from_toml_str(
            r#"
            [sections.hero]
            threshold = 0.25
            root_margin = "0px 0px -120px 0px"

            [navigation]
            scroll_offset = 80.0
            "#,
        )
        .unwrap();

        assert_eq!(config.navigation.scroll_offset, 80.0);
        assert_eq!(config.sections.about, SectionsConfig::default().about);
        let observer = config.sections.hero.observer_config("hero").unwrap();
        assert_eq!(observer.threshold, 0.25);
        assert_eq!(observer.root_margin.bottom, Length::Px(-120.0));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = FolioConfig::from_toml_str("[sections.about]\nthreshold = 1.5\n").unwrap_err();
        assert!(matches!(err, ConfigError::Value { .. }));

        let err = FolioConfig::from_toml_str(
            "[sections.skills]\nthreshold = 0.3\nroot_margin = \"1em\"\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::RootMargin { ref section, .. } if section == "skills"));

        let err = FolioConfig::from_toml_str("[timing]\nstagger_ms = \"fast\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_and_round_trip() {
        let path = std::env::temp_dir().join(format!("folio-config-{}.toml", std::process::id()));
        let mut config = FolioConfig::default();
        config.timing.stagger_ms = 60.0;
        fs::write(&path, config.to_toml_string().unwrap()).unwrap();

        let loaded = FolioConfig::load(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded, config);

        let missing = FolioConfig::load(path.with_extension("missing"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }
}
