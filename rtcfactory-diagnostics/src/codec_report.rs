//! Snapshot of the codecs advertised by the video factories

use crate::DiagnosticsError;
use rtcfactory_media::video::{VideoCodecInfo, VideoDecoderFactory, VideoEncoderFactory};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Advertised decoder and encoder codecs, in factory order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecReport {
    /// Decoder factory codecs
    pub decoders: Vec<VideoCodecInfo>,
    /// Encoder factory codecs
    pub encoders: Vec<VideoCodecInfo>,
}

impl CodecReport {
    /// Collect the supported codecs of both factories
    pub fn collect(decoders: &dyn VideoDecoderFactory, encoders: &dyn VideoEncoderFactory) -> Self {
        let report = Self {
            decoders: decoders.supported_codecs(),
            encoders: encoders.supported_codecs(),
        };
        tracing::debug!(
            decoders = report.decoders.len(),
            encoders = report.encoders.len(),
            "Collected codec report"
        );
        report
    }

    /// Encoder codec names that occur more than once, lowercase, with counts
    ///
    /// The factories never deduplicate; this shows what the consumer will drop.
    pub fn duplicate_encoder_names(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for codec in &self.encoders {
            *counts.entry(codec.name.to_lowercase()).or_insert(0) += 1;
        }
        counts.retain(|_, count| *count > 1);
        counts
    }

    /// Pretty JSON rendering
    pub fn to_json(&self) -> Result<String, DiagnosticsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_names_are_case_insensitive() {
        let report = CodecReport {
            decoders: Vec::new(),
            encoders: vec![
                VideoCodecInfo::new("VP9"),
                VideoCodecInfo::new("vp9"),
                VideoCodecInfo::new("AV1"),
            ],
        };
        let duplicates = report.duplicate_encoder_names();
        assert_eq!(duplicates.len(), 1);
        assert_eq!(duplicates.get("vp9"), Some(&2));
    }

    #[test]
    fn test_json_rendering() {
        let report = CodecReport {
            decoders: vec![VideoCodecInfo::new("H264").param("packetization-mode", "1")],
            encoders: Vec::new(),
        };
        let json = report.to_json().unwrap();
        assert!(json.contains("\"packetization-mode\": \"1\""));
        let parsed: CodecReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, report);
    }
}
