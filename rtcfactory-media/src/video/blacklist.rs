//! Hardware decoder blacklist predicates

use crate::video::media_codec::MediaCodecInfo;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Vendor tag of the default blacklist
pub const EXYNOS_VENDOR_TAG: &str = "exynos";
/// Codec tag of the default blacklist
pub const VP9_CODEC_TAG: &str = "vp9";

/// Representative platform codec for a decoder query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecCandidate<'a> {
    /// The registry scan matched this entry
    Found(&'a MediaCodecInfo),
    /// No registry entry matched the requested type
    Absent,
}

impl<'a> CodecCandidate<'a> {
    /// Tag an optional scan result
    pub fn from_option(info: Option<&'a MediaCodecInfo>) -> Self {
        info.map_or(CodecCandidate::Absent, CodecCandidate::Found)
    }

    /// The matched entry, if any
    pub fn info(self) -> Option<&'a MediaCodecInfo> {
        match self {
            CodecCandidate::Found(info) => Some(info),
            CodecCandidate::Absent => None,
        }
    }
}

impl fmt::Display for CodecCandidate<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecCandidate::Found(info) => write!(
                f,
                "MediaCodecInfo(name={}, isEncoder={})",
                info.name, info.is_encoder
            ),
            CodecCandidate::Absent => f.write_str("none"),
        }
    }
}

type PredicateFn = dyn Fn(CodecCandidate<'_>) -> bool + Send + Sync;

/// Decides whether the hardware decoder for a candidate must not be used
#[derive(Clone)]
pub struct BlacklistPredicate {
    label: String,
    test: Arc<PredicateFn>,
}

impl BlacklistPredicate {
    /// Predicate from a closure; `label` shows up in logs
    pub fn new<F>(label: impl Into<String>, test: F) -> Self
    where
        F: Fn(CodecCandidate<'_>) -> bool + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            test: Arc::new(test),
        }
    }

    /// Matches decoders whose lowercase name contains both tags
    pub fn name_tags(vendor: &str, codec: &str) -> Self {
        let rule = BlacklistRule {
            vendor: vendor.to_lowercase(),
            codec: codec.to_lowercase(),
        };
        Self::new(format!("{}+{}", rule.vendor, rule.codec), move |candidate| {
            candidate.info().is_some_and(|info| rule.matches(info))
        })
    }

    /// Matches decoders satisfying any of the rules
    pub fn any_rule(rules: Vec<BlacklistRule>) -> Self {
        let label = rules
            .iter()
            .map(|rule| format!("{}+{}", rule.vendor, rule.codec))
            .collect::<Vec<_>>()
            .join("|");
        Self::new(label, move |candidate| {
            candidate
                .info()
                .is_some_and(|info| rules.iter().any(|rule| rule.matches(info)))
        })
    }

    /// Exynos VP9 decoders
    pub fn exynos_vp9() -> Self {
        Self::name_tags(EXYNOS_VENDOR_TAG, VP9_CODEC_TAG)
    }

    /// Caller-supplied predicate AND the default, or the default alone
    pub fn with_default(custom: Option<BlacklistPredicate>) -> Self {
        match custom {
            Some(custom) => custom.and(Self::exynos_vp9()),
            None => Self::exynos_vp9(),
        }
    }

    /// Logical AND of two predicates
    pub fn and(self, other: BlacklistPredicate) -> Self {
        let label = format!("({}) && ({})", self.label, other.label);
        Self::new(label, move |candidate| self.test(candidate) && other.test(candidate))
    }

    /// Evaluate the predicate
    pub fn test(&self, candidate: CodecCandidate<'_>) -> bool {
        (self.test)(candidate)
    }

    /// Human readable description
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl Default for BlacklistPredicate {
    fn default() -> Self {
        Self::exynos_vp9()
    }
}

impl fmt::Debug for BlacklistPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlacklistPredicate")
            .field("label", &self.label)
            .finish()
    }
}

/// Vendor/codec tag pair, as found in configuration files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlacklistRule {
    /// Vendor substring, e.g. `exynos`
    pub vendor: String,
    /// Codec substring, e.g. `vp9`
    pub codec: String,
}

impl BlacklistRule {
    /// Whether a decoder's lowercase name contains both tags
    pub fn matches(&self, info: &MediaCodecInfo) -> bool {
        let name = info.name.to_lowercase();
        !info.is_encoder
            && name.contains(&self.vendor.to_lowercase())
            && name.contains(&self.codec.to_lowercase())
    }
}
