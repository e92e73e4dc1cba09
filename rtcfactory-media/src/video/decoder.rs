//! Decoder interfaces and the hardware-first fallback wrapper

use crate::error::MediaResult;
use crate::frames::{EncodedImage, VideoFrame};
use crate::video::codec_info::VideoCodecInfo;

/// Decoder initialization settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderSettings {
    /// Expected maximum width
    pub width: u32,
    /// Expected maximum height
    pub height: u32,
    /// Number of decoding cores the caller allows
    pub number_of_cores: u32,
}

impl Default for DecoderSettings {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            number_of_cores: 1,
        }
    }
}

/// A video decoder instance
pub trait VideoDecoder: Send + std::fmt::Debug {
    /// Prepare the decoder for a stream
    fn init_decode(&mut self, settings: &DecoderSettings) -> MediaResult<()>;

    /// Decode one image; `Ok(None)` means the decoder buffered it without output
    fn decode(&mut self, image: &EncodedImage) -> MediaResult<Option<VideoFrame>>;

    /// Free decoder resources
    fn release(&mut self) -> MediaResult<()>;

    /// Implementation name for logs and stats
    fn implementation_name(&self) -> String;
}

/// Produces decoders for codec descriptors
pub trait VideoDecoderFactory: Send + Sync + std::fmt::Debug {
    /// Create a decoder, or `None` when this factory does not support the codec
    fn create_decoder(&self, codec: &VideoCodecInfo) -> Option<Box<dyn VideoDecoder>>;

    /// Codecs this factory can decode
    fn supported_codecs(&self) -> Vec<VideoCodecInfo>;
}

/// Decoder that prefers `primary` and switches to `fallback` when the primary fails.
///
/// Once switched, the wrapper stays on the fallback until released.
#[derive(Debug)]
pub struct VideoDecoderFallback {
    fallback: Box<dyn VideoDecoder>,
    primary: Box<dyn VideoDecoder>,
    settings: Option<DecoderSettings>,
    using_fallback: bool,
}

impl VideoDecoderFallback {
    /// Wrap a fallback and a preferred primary decoder
    pub fn new(fallback: Box<dyn VideoDecoder>, primary: Box<dyn VideoDecoder>) -> Self {
        Self {
            fallback,
            primary,
            settings: None,
            using_fallback: false,
        }
    }

    /// Whether decoding currently goes through the fallback
    pub fn is_using_fallback(&self) -> bool {
        self.using_fallback
    }

    fn switch_to_fallback(&mut self) -> MediaResult<()> {
        tracing::warn!(
            primary = %self.primary.implementation_name(),
            fallback = %self.fallback.implementation_name(),
            "switching to fallback decoder"
        );
        if let Err(e) = self.primary.release() {
            tracing::debug!(error = %e, "primary decoder release failed");
        }
        let settings = self.settings.clone().unwrap_or_default();
        self.fallback.init_decode(&settings)?;
        self.using_fallback = true;
        Ok(())
    }
}

impl VideoDecoder for VideoDecoderFallback {
    fn init_decode(&mut self, settings: &DecoderSettings) -> MediaResult<()> {
        self.settings = Some(settings.clone());
        if self.using_fallback {
            return self.fallback.init_decode(settings);
        }
        match self.primary.init_decode(settings) {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::warn!(error = %e, "primary decoder init failed");
                self.switch_to_fallback()
            }
        }
    }

    fn decode(&mut self, image: &EncodedImage) -> MediaResult<Option<VideoFrame>> {
        if self.using_fallback {
            return self.fallback.decode(image);
        }
        match self.primary.decode(image) {
            Ok(frame) => Ok(frame),
            Err(e) => {
                tracing::warn!(error = %e, "primary decoder failed to decode");
                self.switch_to_fallback()?;
                self.fallback.decode(image)
            }
        }
    }

    fn release(&mut self) -> MediaResult<()> {
        let primary = self.primary.release();
        let fallback = self.fallback.release();
        self.using_fallback = false;
        self.settings = None;
        primary.and(fallback)
    }

    fn implementation_name(&self) -> String {
        if self.using_fallback {
            format!("fallback:{}", self.fallback.implementation_name())
        } else {
            self.primary.implementation_name()
        }
    }
}
