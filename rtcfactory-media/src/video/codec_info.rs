//! Codec descriptors, mime types and scalability modes

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Immutable description of a codec as advertised by a factory
///
/// `==` compares every field exactly, name case included. Use
/// [`VideoCodecInfo::is_named`] to match codec names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoCodecInfo {
    /// Codec name; lookups and ordering ignore case
    pub name: String,
    /// SDP format parameters
    #[serde(default)]
    pub params: BTreeMap<String, String>,
    /// Supported scalability modes, empty when the codec has no layering support
    #[serde(default)]
    pub scalability_modes: Vec<ScalabilityMode>,
}

impl VideoCodecInfo {
    /// Descriptor with no params and no scalability modes
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            params: BTreeMap::new(),
            scalability_modes: Vec::new(),
        }
    }

    /// Add a format parameter
    pub fn param(mut self, key: &str, value: &str) -> Self {
        self.params.insert(key.to_string(), value.to_string());
        self
    }

    /// Replace the scalability mode list
    pub fn with_scalability_modes(mut self, modes: Vec<ScalabilityMode>) -> Self {
        self.scalability_modes = modes;
        self
    }

    /// Whether this descriptor advertises any scalability mode
    pub fn has_scalability_modes(&self) -> bool {
        !self.scalability_modes.is_empty()
    }

    /// Case-insensitive name comparison, folding each character
    pub fn is_named(&self, name: &str) -> bool {
        self.name
            .chars()
            .flat_map(char::to_lowercase)
            .eq(name.chars().flat_map(char::to_lowercase))
    }

    /// Mime type for this codec, if it is one the platform knows
    pub fn mime_type(&self) -> Option<VideoCodecMimeType> {
        self.name.parse().ok()
    }
}

impl fmt::Display for VideoCodecInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VideoCodec({}", self.name)?;
        for (key, value) in &self.params {
            write!(f, " {key}={value}")?;
        }
        if self.has_scalability_modes() {
            write!(f, " modes={}", self.scalability_modes.len())?;
        }
        write!(f, ")")
    }
}

/// Codec types the platform registry can be queried for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VideoCodecMimeType {
    /// VP8
    VP8,
    /// VP9
    VP9,
    /// H.264 / AVC
    H264,
    /// H.265 / HEVC
    H265,
    /// AV1
    AV1,
}

impl VideoCodecMimeType {
    /// Every known type, in the order platform factories advertise them
    pub const ALL: [VideoCodecMimeType; 5] = [
        VideoCodecMimeType::VP8,
        VideoCodecMimeType::AV1,
        VideoCodecMimeType::VP9,
        VideoCodecMimeType::H264,
        VideoCodecMimeType::H265,
    ];

    /// Platform mime string
    pub fn mime_type(self) -> &'static str {
        match self {
            VideoCodecMimeType::VP8 => "video/x-vnd.on2.vp8",
            VideoCodecMimeType::VP9 => "video/x-vnd.on2.vp9",
            VideoCodecMimeType::H264 => "video/avc",
            VideoCodecMimeType::H265 => "video/hevc",
            VideoCodecMimeType::AV1 => "video/av01",
        }
    }

    /// Codec name used in descriptors
    pub fn name(self) -> &'static str {
        match self {
            VideoCodecMimeType::VP8 => "VP8",
            VideoCodecMimeType::VP9 => "VP9",
            VideoCodecMimeType::H264 => "H264",
            VideoCodecMimeType::H265 => "H265",
            VideoCodecMimeType::AV1 => "AV1",
        }
    }
}

impl fmt::Display for VideoCodecMimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for VideoCodecMimeType {
    type Err = UnknownCodecType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VideoCodecMimeType::ALL
            .into_iter()
            .find(|ty| ty.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownCodecType(s.to_string()))
    }
}

/// Codec name with no platform mime type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown codec type: {0}")]
pub struct UnknownCodecType(pub String);

/// Named scalability tier such as `L1T3`, `L3T3_KEY` or `S2T1h`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ScalabilityMode {
    name: String,
    spatial_layers: u8,
    temporal_layers: u8,
}

impl ScalabilityMode {
    /// Mode name as advertised in SDP
    pub fn as_str(&self) -> &str {
        &self.name
    }

    /// Number of spatial layers
    pub fn spatial_layers(&self) -> u8 {
        self.spatial_layers
    }

    /// Number of temporal layers
    pub fn temporal_layers(&self) -> u8 {
        self.temporal_layers
    }

    /// Whether spatial layers are independent simulcast streams (`S` modes)
    pub fn is_simulcast(&self) -> bool {
        self.name.starts_with('S')
    }
}

/// Scalability mode string that does not follow `[LS]<n>T<m>[h][_KEY[_SHIFT]]`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid scalability mode: {0}")]
pub struct InvalidScalabilityMode(pub String);

impl FromStr for ScalabilityMode {
    type Err = InvalidScalabilityMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidScalabilityMode(s.to_string());
        let bytes = s.as_bytes();
        if bytes.len() < 4 || !matches!(bytes[0], b'L' | b'S') || bytes[2] != b'T' {
            return Err(invalid());
        }
        let digit = |b: u8| match b {
            b'1'..=b'3' => Some(b - b'0'),
            _ => None,
        };
        let spatial_layers = digit(bytes[1]).ok_or_else(invalid)?;
        let temporal_layers = digit(bytes[3]).ok_or_else(invalid)?;

        let suffix = &s[4..];
        let suffix = suffix.strip_prefix('h').unwrap_or(suffix);
        if !matches!(suffix, "" | "_KEY" | "_KEY_SHIFT") {
            return Err(invalid());
        }
        // KEY variants only make sense for layered (non-simulcast) spatial modes
        if !suffix.is_empty() && (bytes[0] == b'S' || spatial_layers < 2) {
            return Err(invalid());
        }

        Ok(Self {
            name: s.to_string(),
            spatial_layers,
            temporal_layers,
        })
    }
}

impl TryFrom<String> for ScalabilityMode {
    type Error = InvalidScalabilityMode;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ScalabilityMode> for String {
    fn from(mode: ScalabilityMode) -> Self {
        mode.name
    }
}

impl fmt::Display for ScalabilityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Parse a list of mode names, failing on the first invalid one
pub fn parse_scalability_modes(names: &[&str]) -> Result<Vec<ScalabilityMode>, InvalidScalabilityMode> {
    names.iter().map(|name| name.parse()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_type_lookup_is_case_insensitive() {
        assert_eq!("vp9".parse::<VideoCodecMimeType>(), Ok(VideoCodecMimeType::VP9));
        assert_eq!("Av1".parse::<VideoCodecMimeType>(), Ok(VideoCodecMimeType::AV1));
        assert!("H266".parse::<VideoCodecMimeType>().is_err());
        assert_eq!(VideoCodecMimeType::H264.mime_type(), "video/avc");
    }

    #[test]
    fn test_equality_is_exact_but_name_match_ignores_case() {
        let upper = VideoCodecInfo::new("VP9");
        let lower = VideoCodecInfo::new("vp9");
        assert_ne!(upper, lower);
        assert!(upper.is_named("vp9"));
        assert!(VideoCodecInfo::new("Ä1").is_named("ä1"));
    }

    #[test]
    fn test_scalability_mode_parsing() {
        let mode: ScalabilityMode = "L3T3_KEY".parse().unwrap();
        assert_eq!(mode.spatial_layers(), 3);
        assert_eq!(mode.temporal_layers(), 3);
        assert!(!mode.is_simulcast());

        let mode: ScalabilityMode = "S2T1h".parse().unwrap();
        assert!(mode.is_simulcast());
        assert_eq!(mode.spatial_layers(), 2);

        assert!("L1T1_KEY".parse::<ScalabilityMode>().is_err());
        assert!("S2T2_KEY".parse::<ScalabilityMode>().is_err());
        assert!("L4T1".parse::<ScalabilityMode>().is_err());
        assert!("X1T1".parse::<ScalabilityMode>().is_err());
        assert!("L1T".parse::<ScalabilityMode>().is_err());
    }

    #[test]
    fn test_codec_info_display() {
        let info = VideoCodecInfo::new("VP9")
            .param("profile-id", "0")
            .with_scalability_modes(parse_scalability_modes(&["L1T1", "L1T2"]).unwrap());
        assert_eq!(info.to_string(), "VideoCodec(VP9 profile-id=0 modes=2)");
        assert!(info.is_named("vp9"));
        assert_eq!(info.mime_type(), Some(VideoCodecMimeType::VP9));
    }
}
