//! Encoder interfaces

use crate::error::MediaResult;
use crate::frames::{EncodedImage, VideoFrame};
use crate::video::codec_info::{ScalabilityMode, VideoCodecInfo};

/// One simulcast layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulcastStream {
    /// Layer width
    pub width: u32,
    /// Layer height
    pub height: u32,
    /// Maximum bitrate in kbps
    pub max_bitrate_kbps: u32,
}

/// Encoder initialization settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderSettings {
    /// Input width
    pub width: u32,
    /// Input height
    pub height: u32,
    /// Maximum frame rate
    pub max_framerate: u32,
    /// Start bitrate in kbps
    pub start_bitrate_kbps: u32,
    /// Simulcast layers, empty for a single stream
    pub simulcast_streams: Vec<SimulcastStream>,
    /// Requested scalability mode
    pub scalability_mode: Option<ScalabilityMode>,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            max_framerate: 30,
            start_bitrate_kbps: 1_000,
            simulcast_streams: Vec::new(),
            scalability_mode: None,
        }
    }
}

impl EncoderSettings {
    /// Settings for a single simulcast layer
    pub fn for_stream(&self, stream: &SimulcastStream) -> Self {
        Self {
            width: stream.width,
            height: stream.height,
            start_bitrate_kbps: self.start_bitrate_kbps.min(stream.max_bitrate_kbps),
            simulcast_streams: Vec::new(),
            ..self.clone()
        }
    }
}

/// A video encoder instance
pub trait VideoEncoder: Send + std::fmt::Debug {
    /// Prepare the encoder
    fn init_encode(&mut self, settings: &EncoderSettings) -> MediaResult<()>;

    /// Encode a frame; layered encoders may emit several images
    fn encode(&mut self, frame: &VideoFrame, request_keyframe: bool) -> MediaResult<Vec<EncodedImage>>;

    /// Free encoder resources
    fn release(&mut self) -> MediaResult<()>;

    /// Implementation name for logs and stats
    fn implementation_name(&self) -> String;
}

/// Produces encoders for codec descriptors
pub trait VideoEncoderFactory: Send + Sync + std::fmt::Debug {
    /// Create an encoder, or `None` when this factory does not support the codec
    fn create_encoder(&self, codec: &VideoCodecInfo) -> Option<Box<dyn VideoEncoder>>;

    /// Codecs this factory can encode
    fn supported_codecs(&self) -> Vec<VideoCodecInfo>;
}
