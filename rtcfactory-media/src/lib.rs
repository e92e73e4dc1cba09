//! # rtcfactory Media
//!
//! Audio processing factories and video codec selection for rtcfactory.
//! The audio side hands out native module handles; the video side picks
//! hardware, software or fallback decoders and builds simulcast encoders.

#![warn(clippy::all)]

pub mod audio;
pub mod error;
pub mod frames;
pub mod video;

// Re-export main types
pub use audio::{
    AudioBuffer, AudioProcessingFactory, AudioProcessingNative, ConfigurableAudioProcessingFactory,
    DynamicAudioProcessingFactory, ExternalAudioProcessingFactory, ExternalProcessorFactory,
    PluginProcessorFactory, ProcessingEngine,
};
pub use error::{ErrorCategory, MediaError, MediaResult};
pub use frames::{EncodedImage, VideoFrame};
pub use video::{
    BlacklistPredicate, BlacklistedVideoDecoderFactory, BuiltinCodecCapabilities, CodecCandidate,
    MediaCodecInfo, MediaCodecList, NativeCodecCapabilities, SimulcastVideoEncoderFactory,
    StaticCodecList, VideoCodecInfo, VideoCodecMimeType, VideoDecoder, VideoDecoderFactory,
    VideoEncoder, VideoEncoderFactory,
};
