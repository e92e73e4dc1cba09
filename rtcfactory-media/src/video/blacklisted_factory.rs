//! Decoder factory that vetoes blacklisted hardware decoders
//!
//! For every decoder request the factory:
//! 1. Resolves the codec name to a platform mime type.
//! 2. Scans the platform registry once for the first decoder of that type
//!    that is hardware-accelerated or software-only (first match, not best).
//! 3. Builds the software decoder (platform software as a second choice) and
//!    the hardware decoder independently.
//! 4. Runs the blacklist predicate on the scanned entry, or on
//!    [`CodecCandidate::Absent`] when nothing matched.
//! 5. Returns software only when blacklisted, otherwise a hardware-first
//!    [`VideoDecoderFallback`] when both exist, otherwise whichever exists.

use crate::video::blacklist::{BlacklistPredicate, CodecCandidate};
use crate::video::codec_info::VideoCodecInfo;
use crate::video::decoder::{VideoDecoder, VideoDecoderFactory, VideoDecoderFallback};
use crate::video::media_codec::{
    find_decoder_for_type, is_hardware_accelerated, is_software_only, MediaCodecInfo, MediaCodecList,
};
use crate::video::platform::{MediaCodecVideoDecoderFactory, PlatformDecoderProvider};
use crate::video::software::SoftwareVideoDecoderFactory;
use std::sync::Arc;

/// Decoder factory combining hardware, software and platform-software factories
#[derive(Debug)]
pub struct BlacklistedVideoDecoderFactory {
    hardware: Arc<dyn VideoDecoderFactory>,
    software: Arc<dyn VideoDecoderFactory>,
    platform_software: Arc<dyn VideoDecoderFactory>,
    codec_list: Arc<dyn MediaCodecList>,
    is_hardware_blacklisted: BlacklistPredicate,
}

impl BlacklistedVideoDecoderFactory {
    /// Factory with platform hardware/software decoders, built-in software
    /// decoders and the default blacklist
    pub fn new(codec_list: Arc<dyn MediaCodecList>, provider: Arc<dyn PlatformDecoderProvider>) -> Self {
        Self::with_predicate(codec_list, provider, None)
    }

    /// Same as [`Self::new`], with a caller predicate ANDed onto the default
    pub fn with_predicate(
        codec_list: Arc<dyn MediaCodecList>,
        provider: Arc<dyn PlatformDecoderProvider>,
        predicate: Option<BlacklistPredicate>,
    ) -> Self {
        let hardware = MediaCodecVideoDecoderFactory::hardware(codec_list.clone(), provider.clone());
        let platform_software =
            MediaCodecVideoDecoderFactory::platform_software(codec_list.clone(), provider);
        Self::builder(codec_list)
            .hardware(Arc::new(hardware))
            .software(Arc::new(SoftwareVideoDecoderFactory::new()))
            .platform_software(Arc::new(platform_software))
            .predicate(predicate)
            .build()
    }

    /// Builder for injecting backing factories
    pub fn builder(codec_list: Arc<dyn MediaCodecList>) -> BlacklistedVideoDecoderFactoryBuilder {
        BlacklistedVideoDecoderFactoryBuilder {
            codec_list,
            hardware: None,
            software: None,
            platform_software: None,
            predicate: None,
        }
    }

    /// The composed predicate in use
    pub fn predicate(&self) -> &BlacklistPredicate {
        &self.is_hardware_blacklisted
    }

    fn find_codec_for_type(&self, codec: &VideoCodecInfo) -> Option<MediaCodecInfo> {
        let ty = codec.mime_type()?;
        find_decoder_for_type(self.codec_list.as_ref(), ty, |info| {
            is_hardware_accelerated(info) || is_software_only(info)
        })
    }
}

impl VideoDecoderFactory for BlacklistedVideoDecoderFactory {
    fn create_decoder(&self, codec: &VideoCodecInfo) -> Option<Box<dyn VideoDecoder>> {
        let info = self.find_codec_for_type(codec);
        let candidate = CodecCandidate::from_option(info.as_ref());
        tracing::debug!(codec = %codec, candidate = %candidate, "[create_decoder]");

        let software = self
            .software
            .create_decoder(codec)
            .or_else(|| self.platform_software.create_decoder(codec));
        let hardware = self.hardware.create_decoder(codec);

        if self.is_hardware_blacklisted.test(candidate) {
            tracing::info!(
                candidate = %candidate,
                predicate = self.is_hardware_blacklisted.label(),
                "[create_decoder] hardware decoder is blacklisted"
            );
            return software;
        }

        match (hardware, software) {
            (Some(hardware), Some(software)) => {
                let fallback: Box<dyn VideoDecoder> =
                    Box::new(VideoDecoderFallback::new(software, hardware));
                Some(fallback)
            }
            (hardware, software) => hardware.or(software),
        }
    }

    fn supported_codecs(&self) -> Vec<VideoCodecInfo> {
        let mut codecs = self.software.supported_codecs();
        codecs.extend(self.hardware.supported_codecs());
        codecs.extend(self.platform_software.supported_codecs());
        codecs
    }
}

/// Builder for [`BlacklistedVideoDecoderFactory`]
#[derive(Debug)]
pub struct BlacklistedVideoDecoderFactoryBuilder {
    codec_list: Arc<dyn MediaCodecList>,
    hardware: Option<Arc<dyn VideoDecoderFactory>>,
    software: Option<Arc<dyn VideoDecoderFactory>>,
    platform_software: Option<Arc<dyn VideoDecoderFactory>>,
    predicate: Option<BlacklistPredicate>,
}

impl BlacklistedVideoDecoderFactoryBuilder {
    /// Hardware decoder factory
    pub fn hardware(mut self, factory: Arc<dyn VideoDecoderFactory>) -> Self {
        self.hardware = Some(factory);
        self
    }

    /// Primary software decoder factory
    pub fn software(mut self, factory: Arc<dyn VideoDecoderFactory>) -> Self {
        self.software = Some(factory);
        self
    }

    /// Platform software decoder factory, used when the primary software factory yields none
    pub fn platform_software(mut self, factory: Arc<dyn VideoDecoderFactory>) -> Self {
        self.platform_software = Some(factory);
        self
    }

    /// Caller predicate, ANDed with the default Exynos VP9 rule
    pub fn predicate(mut self, predicate: Option<BlacklistPredicate>) -> Self {
        self.predicate = predicate;
        self
    }

    /// Finish; missing factories advertise and create nothing
    pub fn build(self) -> BlacklistedVideoDecoderFactory {
        let empty = || -> Arc<dyn VideoDecoderFactory> { Arc::new(EmptyDecoderFactory) };
        BlacklistedVideoDecoderFactory {
            hardware: self.hardware.unwrap_or_else(empty),
            software: self.software.unwrap_or_else(empty),
            platform_software: self.platform_software.unwrap_or_else(empty),
            codec_list: self.codec_list,
            is_hardware_blacklisted: BlacklistPredicate::with_default(self.predicate),
        }
    }
}

#[derive(Debug)]
struct EmptyDecoderFactory;

impl VideoDecoderFactory for EmptyDecoderFactory {
    fn create_decoder(&self, _codec: &VideoCodecInfo) -> Option<Box<dyn VideoDecoder>> {
        None
    }

    fn supported_codecs(&self) -> Vec<VideoCodecInfo> {
        Vec::new()
    }
}
