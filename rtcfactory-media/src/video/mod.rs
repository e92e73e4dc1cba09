//! Video codec selection
//!
//! Codec descriptors, platform codec enumeration, the hardware blacklist,
//! decoder/encoder factories and the simulcast encoder.

pub mod blacklist;
pub mod blacklisted_factory;
pub mod codec_info;
pub mod decoder;
pub mod encoder;
pub mod media_codec;
pub mod native_codecs;
pub mod platform;
pub mod simulcast;
pub mod software;

pub use blacklist::{BlacklistPredicate, BlacklistRule, CodecCandidate};
pub use blacklisted_factory::{BlacklistedVideoDecoderFactory, BlacklistedVideoDecoderFactoryBuilder};
pub use codec_info::{
    parse_scalability_modes, InvalidScalabilityMode, ScalabilityMode, UnknownCodecType,
    VideoCodecInfo, VideoCodecMimeType,
};
pub use decoder::{DecoderSettings, VideoDecoder, VideoDecoderFactory, VideoDecoderFallback};
pub use encoder::{EncoderSettings, SimulcastStream, VideoEncoder, VideoEncoderFactory};
pub use media_codec::{CodecCapabilities, MediaCodecInfo, MediaCodecList, StaticCodecList};
pub use native_codecs::{BuiltinCodecCapabilities, NativeCodecCapabilities};
pub use platform::{MediaCodecVideoDecoderFactory, PlatformDecoderProvider};
pub use simulcast::{sort_codecs, SimulcastVideoEncoder, SimulcastVideoEncoderFactory};
pub use software::{SoftwareVideoDecoderFactory, SoftwareVideoEncoderFactory};

#[cfg(feature = "h264")]
pub use software::{OpenH264VideoDecoder, OpenH264VideoEncoder};
