//! Platform codec registry model
//!
//! Mirrors what a platform media-codec registry reports for each installed
//! codec, plus the heuristics used to classify entries as hardware or
//! software implementations.

use crate::error::{MediaError, MediaResult};
use crate::video::codec_info::VideoCodecMimeType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Planar YUV 4:2:0
pub const COLOR_FORMAT_YUV420_PLANAR: i32 = 19;
/// Semi-planar YUV 4:2:0
pub const COLOR_FORMAT_YUV420_SEMI_PLANAR: i32 = 21;
/// Qualcomm semi-planar YUV 4:2:0
pub const COLOR_QCOM_FORMAT_YUV420_SEMI_PLANAR: i32 = 0x7FA3_0C00;
/// Qualcomm packed semi-planar YVU, 32m4ka alignment
pub const COLOR_QCOM_FORMAT_YVU420_PACKED_SEMI_PLANAR_32M4KA: i32 = 0x7FA3_0C01;
/// Qualcomm packed semi-planar YVU, 16m4ka alignment
pub const COLOR_QCOM_FORMAT_YVU420_PACKED_SEMI_PLANAR_16M4KA: i32 = 0x7FA3_0C02;
/// Qualcomm packed semi-planar YVU, 64x32 tiles
pub const COLOR_QCOM_FORMAT_YVU420_PACKED_SEMI_PLANAR_64X32_TILE_2M8KA: i32 = 0x7FA3_0C03;
/// Qualcomm packed semi-planar YUV, 32m alignment
pub const COLOR_QCOM_FORMAT_YUV420_PACKED_SEMI_PLANAR_32M: i32 = 0x7FA3_0C04;

/// Color formats a decoder may output, in order of preference
pub const DECODER_COLOR_FORMATS: [i32; 7] = [
    COLOR_FORMAT_YUV420_PLANAR,
    COLOR_FORMAT_YUV420_SEMI_PLANAR,
    COLOR_QCOM_FORMAT_YUV420_SEMI_PLANAR,
    COLOR_QCOM_FORMAT_YVU420_PACKED_SEMI_PLANAR_32M4KA,
    COLOR_QCOM_FORMAT_YVU420_PACKED_SEMI_PLANAR_16M4KA,
    COLOR_QCOM_FORMAT_YVU420_PACKED_SEMI_PLANAR_64X32_TILE_2M8KA,
    COLOR_QCOM_FORMAT_YUV420_PACKED_SEMI_PLANAR_32M,
];

/// Name prefixes of software codecs on platforms that cannot say so themselves
pub const SOFTWARE_IMPLEMENTATION_PREFIXES: [&str; 3] = ["OMX.google.", "OMX.SEC.", "c2.android"];

/// Capabilities of a codec for one mime type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecCapabilities {
    /// Supported color formats
    #[serde(default)]
    pub color_formats: Vec<i32>,
}

/// One entry of the platform codec registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaCodecInfo {
    /// Platform codec name, e.g. `OMX.qcom.video.decoder.avc`
    pub name: String,
    /// Whether the entry is an encoder
    #[serde(default)]
    pub is_encoder: bool,
    /// Supported mime types
    #[serde(default)]
    pub supported_types: Vec<String>,
    /// Capabilities keyed by mime type
    #[serde(default)]
    pub capabilities: HashMap<String, CodecCapabilities>,
    /// Platform-reported hardware acceleration, when the platform exposes it
    #[serde(default)]
    pub hardware_accelerated: Option<bool>,
    /// Platform-reported software-only flag, when the platform exposes it
    #[serde(default)]
    pub software_only: Option<bool>,
}

impl MediaCodecInfo {
    /// Decoder entry supporting the given types with planar output
    pub fn decoder(name: &str, types: &[VideoCodecMimeType]) -> Self {
        Self::with_direction(name, false, types)
    }

    /// Encoder entry supporting the given types with planar input
    pub fn encoder(name: &str, types: &[VideoCodecMimeType]) -> Self {
        Self::with_direction(name, true, types)
    }

    fn with_direction(name: &str, is_encoder: bool, types: &[VideoCodecMimeType]) -> Self {
        let supported_types: Vec<String> = types.iter().map(|ty| ty.mime_type().to_string()).collect();
        let capabilities = supported_types
            .iter()
            .map(|mime| {
                (
                    mime.clone(),
                    CodecCapabilities {
                        color_formats: vec![COLOR_FORMAT_YUV420_PLANAR],
                    },
                )
            })
            .collect();
        Self {
            name: name.to_string(),
            is_encoder,
            supported_types,
            capabilities,
            hardware_accelerated: None,
            software_only: None,
        }
    }

    /// Capabilities for a mime type, if the codec reports any
    pub fn capabilities_for_type(&self, mime_type: &str) -> Option<&CodecCapabilities> {
        self.capabilities.get(mime_type)
    }
}

/// Platform codec registry
pub trait MediaCodecList: Send + Sync + std::fmt::Debug {
    /// Number of registry entries
    fn codec_count(&self) -> usize;

    /// Entry at `index`; individual lookups may fail
    fn codec_info_at(&self, index: usize) -> MediaResult<MediaCodecInfo>;
}

/// Fixed registry, typically loaded from a device profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaticCodecList {
    codecs: Vec<MediaCodecInfo>,
}

impl StaticCodecList {
    /// Registry over the given entries, in enumeration order
    pub fn new(codecs: Vec<MediaCodecInfo>) -> Self {
        Self { codecs }
    }

    /// Entries in enumeration order
    pub fn codecs(&self) -> &[MediaCodecInfo] {
        &self.codecs
    }
}

impl MediaCodecList for StaticCodecList {
    fn codec_count(&self) -> usize {
        self.codecs.len()
    }

    fn codec_info_at(&self, index: usize) -> MediaResult<MediaCodecInfo> {
        self.codecs
            .get(index)
            .cloned()
            .ok_or_else(|| MediaError::CodecLookupFailed {
                index,
                reason: format!("index out of range (count {})", self.codecs.len()),
            })
    }
}

/// Whether the codec lists `ty` among its supported types
pub fn codec_supports_type(info: &MediaCodecInfo, ty: VideoCodecMimeType) -> bool {
    info.supported_types
        .iter()
        .any(|mime| mime.eq_ignore_ascii_case(ty.mime_type()))
}

/// First format of `preferred` that the capabilities support
pub fn select_color_format(preferred: &[i32], capabilities: &CodecCapabilities) -> Option<i32> {
    preferred
        .iter()
        .copied()
        .find(|format| capabilities.color_formats.contains(format))
}

/// Software-only classification, falling back to name prefixes
pub fn is_software_only(info: &MediaCodecInfo) -> bool {
    info.software_only.unwrap_or_else(|| {
        SOFTWARE_IMPLEMENTATION_PREFIXES
            .iter()
            .any(|prefix| info.name.starts_with(prefix))
    })
}

/// Hardware-acceleration classification, falling back to "not software-only"
pub fn is_hardware_accelerated(info: &MediaCodecInfo) -> bool {
    info.hardware_accelerated
        .unwrap_or_else(|| !is_software_only(info))
}

/// Whether `info` is a decoder for `ty` with a usable output color format
pub fn is_decoder_for_type(info: &MediaCodecInfo, ty: VideoCodecMimeType) -> bool {
    if info.is_encoder || !codec_supports_type(info, ty) {
        return false;
    }
    info.capabilities_for_type(ty.mime_type())
        .and_then(|caps| select_color_format(&DECODER_COLOR_FORMATS, caps))
        .is_some()
}

/// Scan the registry once and return the first decoder for `ty` that `allowed` accepts.
///
/// Entries whose lookup fails are logged and skipped.
pub fn find_decoder_for_type(
    list: &dyn MediaCodecList,
    ty: VideoCodecMimeType,
    allowed: impl Fn(&MediaCodecInfo) -> bool,
) -> Option<MediaCodecInfo> {
    (0..list.codec_count()).find_map(|index| {
        let info = match list.codec_info_at(index) {
            Ok(info) => info,
            Err(e) => {
                tracing::warn!(index, error = %e, "cannot retrieve decoder codec info, skipping");
                return None;
            }
        };
        (is_decoder_for_type(&info, ty) && allowed(&info)).then_some(info)
    })
}
