//! Decoder factories backed by the platform codec registry

use crate::video::codec_info::{VideoCodecInfo, VideoCodecMimeType};
use crate::video::decoder::{VideoDecoder, VideoDecoderFactory};
use crate::video::media_codec::{
    find_decoder_for_type, is_hardware_accelerated, is_software_only, MediaCodecInfo, MediaCodecList,
};
use std::fmt;
use std::sync::Arc;

/// Constrained baseline, level 3.1
pub const H264_CONSTRAINED_BASELINE_3_1: &str = "42e01f";

/// Instantiates platform decoders by registry name
pub trait PlatformDecoderProvider: Send + Sync + std::fmt::Debug {
    /// Create the named platform decoder for `ty`
    fn create_decoder(&self, codec_name: &str, ty: VideoCodecMimeType) -> Option<Box<dyn VideoDecoder>>;
}

type AllowPredicate = dyn Fn(&MediaCodecInfo) -> bool + Send + Sync;

/// Selects registry decoders with an allow-predicate and creates them through a provider
pub struct MediaCodecVideoDecoderFactory {
    label: &'static str,
    codec_list: Arc<dyn MediaCodecList>,
    provider: Arc<dyn PlatformDecoderProvider>,
    allowed: Box<AllowPredicate>,
}

impl MediaCodecVideoDecoderFactory {
    /// Factory over hardware-accelerated registry decoders
    pub fn hardware(codec_list: Arc<dyn MediaCodecList>, provider: Arc<dyn PlatformDecoderProvider>) -> Self {
        Self::with_predicate("hardware", codec_list, provider, is_hardware_accelerated)
    }

    /// Factory over software-only registry decoders
    pub fn platform_software(
        codec_list: Arc<dyn MediaCodecList>,
        provider: Arc<dyn PlatformDecoderProvider>,
    ) -> Self {
        Self::with_predicate("platform-software", codec_list, provider, is_software_only)
    }

    /// Factory with a custom allow-predicate
    pub fn with_predicate<F>(
        label: &'static str,
        codec_list: Arc<dyn MediaCodecList>,
        provider: Arc<dyn PlatformDecoderProvider>,
        allowed: F,
    ) -> Self
    where
        F: Fn(&MediaCodecInfo) -> bool + Send + Sync + 'static,
    {
        Self {
            label,
            codec_list,
            provider,
            allowed: Box::new(allowed),
        }
    }

    fn find_codec(&self, ty: VideoCodecMimeType) -> Option<MediaCodecInfo> {
        find_decoder_for_type(self.codec_list.as_ref(), ty, |info| (self.allowed)(info))
    }
}

impl fmt::Debug for MediaCodecVideoDecoderFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaCodecVideoDecoderFactory")
            .field("label", &self.label)
            .field("codec_list", &self.codec_list)
            .finish()
    }
}

impl VideoDecoderFactory for MediaCodecVideoDecoderFactory {
    fn create_decoder(&self, codec: &VideoCodecInfo) -> Option<Box<dyn VideoDecoder>> {
        let ty = codec.mime_type()?;
        let info = self.find_codec(ty)?;
        tracing::debug!(factory = self.label, codec = %info.name, "creating platform decoder");
        self.provider.create_decoder(&info.name, ty)
    }

    fn supported_codecs(&self) -> Vec<VideoCodecInfo> {
        VideoCodecMimeType::ALL
            .into_iter()
            .filter(|ty| self.find_codec(*ty).is_some())
            .map(|ty| match ty {
                VideoCodecMimeType::H264 => VideoCodecInfo::new(ty.name())
                    .param("level-asymmetry-allowed", "1")
                    .param("packetization-mode", "1")
                    .param("profile-level-id", H264_CONSTRAINED_BASELINE_3_1),
                _ => VideoCodecInfo::new(ty.name()),
            })
            .collect()
    }
}
