//! Codec descriptors supplied by the native encoder stack

use crate::video::codec_info::{ScalabilityMode, VideoCodecInfo, VideoCodecMimeType};

/// Scalability modes the native VP9 and AV1 encoders can produce
pub const NATIVE_SCALABILITY_MODES: [&str; 34] = [
    "L1T1", "L1T2", "L1T3", "L2T1", "L2T1h", "L2T1_KEY", "L2T2", "L2T2h", "L2T2_KEY",
    "L2T2_KEY_SHIFT", "L2T3", "L2T3h", "L2T3_KEY", "L3T1", "L3T1h", "L3T1_KEY", "L3T2", "L3T2h",
    "L3T2_KEY", "L3T3", "L3T3h", "L3T3_KEY", "S2T1", "S2T1h", "S2T2", "S2T2h", "S2T3", "S2T3h",
    "S3T1", "S3T1h", "S3T2", "S3T2h", "S3T3", "S3T3h",
];

/// Codec capabilities reported by the native encoder stack
pub trait NativeCodecCapabilities: Send + Sync + std::fmt::Debug {
    /// Supported VP9 variants
    fn vp9_codecs(&self) -> Vec<VideoCodecInfo>;

    /// The AV1 descriptor, if the native stack provides one
    fn av1_codec(&self) -> Option<VideoCodecInfo>;
}

/// Capabilities of the bundled libvpx/libaom encoders
#[derive(Debug, Clone, Default)]
pub struct BuiltinCodecCapabilities {
    high_bit_depth_vp9: bool,
}

impl BuiltinCodecCapabilities {
    /// VP9 profile 0 and AV1
    pub fn new() -> Self {
        Self::default()
    }

    /// Also advertise VP9 profile 2 (10-bit)
    pub fn with_high_bit_depth_vp9(mut self, enabled: bool) -> Self {
        self.high_bit_depth_vp9 = enabled;
        self
    }

    fn scalability_modes() -> Vec<ScalabilityMode> {
        NATIVE_SCALABILITY_MODES
            .iter()
            .filter_map(|name| name.parse().ok())
            .collect()
    }
}

impl NativeCodecCapabilities for BuiltinCodecCapabilities {
    fn vp9_codecs(&self) -> Vec<VideoCodecInfo> {
        let mut profiles = vec!["0"];
        if self.high_bit_depth_vp9 {
            profiles.push("2");
        }
        profiles
            .into_iter()
            .map(|profile| {
                VideoCodecInfo::new(VideoCodecMimeType::VP9.name())
                    .param("profile-id", profile)
                    .with_scalability_modes(Self::scalability_modes())
            })
            .collect()
    }

    fn av1_codec(&self) -> Option<VideoCodecInfo> {
        Some(
            VideoCodecInfo::new(VideoCodecMimeType::AV1.name())
                .param("level-idx", "5")
                .param("profile", "0")
                .param("tier", "0")
                .with_scalability_modes(Self::scalability_modes()),
        )
    }
}
