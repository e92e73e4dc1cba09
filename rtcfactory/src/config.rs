//! Configuration types and defaults

use rtcfactory_core::{FactoryResult, RtcFactoryError};
use rtcfactory_media::video::{BlacklistPredicate, BlacklistRule};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Global rtcfactory configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactoryConfig {
    /// Enable debug logging
    pub debug_logging: bool,
    /// Decoder factory settings
    pub decoder: DecoderConfig,
    /// Encoder factory settings
    pub encoder: EncoderConfig,
    /// Audio processing settings
    pub audio: AudioConfig,
}

/// Decoder factory settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Rules narrowing the built-in Exynos VP9 veto
    ///
    /// When non-empty, a hardware decoder is vetoed only if it matches the
    /// built-in rule and at least one of these. They cannot veto decoders the
    /// built-in rule lets through, so a `qcom`/`h264` entry has no effect.
    pub blacklist_scope: Vec<BlacklistRule>,
}

impl DecoderConfig {
    /// Caller predicate built from the scope rules, if any; the decoder
    /// factory ANDs it with the built-in rule
    pub fn predicate(&self) -> Option<BlacklistPredicate> {
        if self.blacklist_scope.is_empty() {
            None
        } else {
            Some(BlacklistPredicate::any_rule(self.blacklist_scope.clone()))
        }
    }
}

/// Encoder factory settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// Use the built-in software encoders as fallback
    pub use_fallback: bool,
    /// Advertise VP9 profile 2
    pub high_bit_depth_vp9: bool,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            use_fallback: true,
            high_bit_depth_vp9: false,
        }
    }
}

/// Which audio processing factory to build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioMode {
    /// Built-in processor with imperative configuration
    #[default]
    Builtin,
    /// Module loading `processor_library` itself
    Dynamic,
    /// Module wrapping a processor created from `processor_library`
    External,
}

/// Audio processing settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Factory variant
    pub mode: AudioMode,
    /// Processor plugin library, required by the dynamic and external modes
    pub processor_library: Option<String>,
}

impl FactoryConfig {
    /// Parse a JSON document
    pub fn from_json_str(json: &str) -> FactoryResult<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| RtcFactoryError::Configuration {
            reason: format!("invalid JSON configuration: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> FactoryResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| RtcFactoryError::Configuration {
            reason: format!("cannot read {}: {}", path.display(), e),
        })?;
        Self::from_json_str(&json)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> FactoryResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| RtcFactoryError::Configuration {
            reason: e.to_string(),
        })
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> FactoryResult<()> {
        let needs_library = matches!(self.audio.mode, AudioMode::Dynamic | AudioMode::External);
        let has_library = self
            .audio
            .processor_library
            .as_deref()
            .is_some_and(|library| !library.is_empty());
        if needs_library && !has_library {
            return Err(RtcFactoryError::Configuration {
                reason: format!("audio mode {:?} requires processor_library", self.audio.mode),
            });
        }
        if let Some(rule) = self
            .decoder
            .blacklist_scope
            .iter()
            .find(|rule| rule.vendor.is_empty() || rule.codec.is_empty())
        {
            return Err(RtcFactoryError::Configuration {
                reason: format!("blacklist rule {:?} has an empty tag", rule),
            });
        }
        Ok(())
    }
}
