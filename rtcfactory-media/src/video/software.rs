//! Built-in software codecs
//!
//! H.264 is provided by OpenH264 when the `h264` feature is enabled. Without
//! it both factories advertise nothing and create nothing.

use crate::video::codec_info::{VideoCodecInfo, VideoCodecMimeType};
use crate::video::decoder::{VideoDecoder, VideoDecoderFactory};
use crate::video::encoder::{VideoEncoder, VideoEncoderFactory};
use crate::video::platform::H264_CONSTRAINED_BASELINE_3_1;

#[cfg(feature = "h264")]
use crate::error::{MediaError, MediaResult};
#[cfg(feature = "h264")]
use crate::frames::{i420_size, EncodedImage, VideoFrame};
#[cfg(feature = "h264")]
use crate::video::decoder::DecoderSettings;
#[cfg(feature = "h264")]
use crate::video::encoder::EncoderSettings;

#[cfg(feature = "h264")]
use openh264::{
    decoder::Decoder as H264Decoder,
    encoder::Encoder as H264Encoder,
    formats::{YUVBuffer, YUVSource},
};

fn h264_codec_info() -> VideoCodecInfo {
    VideoCodecInfo::new(VideoCodecMimeType::H264.name())
        .param("level-asymmetry-allowed", "1")
        .param("packetization-mode", "1")
        .param("profile-level-id", H264_CONSTRAINED_BASELINE_3_1)
}

fn is_software_h264(codec: &VideoCodecInfo) -> bool {
    cfg!(feature = "h264") && codec.mime_type() == Some(VideoCodecMimeType::H264)
}

/// Built-in software decoders
#[derive(Debug, Default)]
pub struct SoftwareVideoDecoderFactory;

impl SoftwareVideoDecoderFactory {
    /// Create the factory
    pub fn new() -> Self {
        Self
    }
}

impl VideoDecoderFactory for SoftwareVideoDecoderFactory {
    fn create_decoder(&self, codec: &VideoCodecInfo) -> Option<Box<dyn VideoDecoder>> {
        if !is_software_h264(codec) {
            return None;
        }
        #[cfg(feature = "h264")]
        {
            Some(Box::new(OpenH264VideoDecoder::new()))
        }
        #[cfg(not(feature = "h264"))]
        {
            None
        }
    }

    fn supported_codecs(&self) -> Vec<VideoCodecInfo> {
        if cfg!(feature = "h264") {
            vec![h264_codec_info()]
        } else {
            Vec::new()
        }
    }
}

/// Built-in software encoders
#[derive(Debug, Default)]
pub struct SoftwareVideoEncoderFactory;

impl SoftwareVideoEncoderFactory {
    /// Create the factory
    pub fn new() -> Self {
        Self
    }
}

impl VideoEncoderFactory for SoftwareVideoEncoderFactory {
    fn create_encoder(&self, codec: &VideoCodecInfo) -> Option<Box<dyn VideoEncoder>> {
        if !is_software_h264(codec) {
            return None;
        }
        #[cfg(feature = "h264")]
        {
            Some(Box::new(OpenH264VideoEncoder::new()))
        }
        #[cfg(not(feature = "h264"))]
        {
            None
        }
    }

    fn supported_codecs(&self) -> Vec<VideoCodecInfo> {
        if cfg!(feature = "h264") {
            vec![h264_codec_info()]
        } else {
            Vec::new()
        }
    }
}

/// OpenH264 decoder
#[cfg(feature = "h264")]
pub struct OpenH264VideoDecoder {
    decoder: Option<H264Decoder>,
}

// SAFETY: the OpenH264 handle is only touched through `&mut self`, so moving
// the wrapper between threads never shares it.
#[cfg(feature = "h264")]
unsafe impl Send for OpenH264VideoDecoder {}

#[cfg(feature = "h264")]
impl OpenH264VideoDecoder {
    /// Uninitialised decoder
    pub fn new() -> Self {
        Self { decoder: None }
    }
}

#[cfg(feature = "h264")]
impl Default for OpenH264VideoDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "h264")]
impl std::fmt::Debug for OpenH264VideoDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenH264VideoDecoder")
            .field("initialized", &self.decoder.is_some())
            .finish()
    }
}

#[cfg(feature = "h264")]
fn copy_plane(dst: &mut Vec<u8>, src: &[u8], stride: usize, width: usize, height: usize) {
    for row in 0..height {
        let start = row * stride;
        dst.extend_from_slice(&src[start..start + width]);
    }
}

#[cfg(feature = "h264")]
impl VideoDecoder for OpenH264VideoDecoder {
    fn init_decode(&mut self, _settings: &DecoderSettings) -> MediaResult<()> {
        let decoder = H264Decoder::new().map_err(|e| MediaError::CodecInitializationFailed {
            codec: "H264".to_string(),
            reason: format!("Failed to create H.264 decoder: {}", e),
        })?;
        self.decoder = Some(decoder);
        Ok(())
    }

    fn decode(&mut self, image: &EncodedImage) -> MediaResult<Option<VideoFrame>> {
        let decoder = self.decoder.as_mut().ok_or_else(|| MediaError::InvalidState {
            message: "H.264 decoder used before init_decode".to_string(),
        })?;
        if image.data.is_empty() {
            return Err(MediaError::DecodingFailed {
                codec: "H264".to_string(),
                reason: "Empty H.264 data".to_string(),
            });
        }

        let decoded = decoder
            .decode(&image.data)
            .map_err(|e| MediaError::DecodingFailed {
                codec: "H264".to_string(),
                reason: format!("H.264 decoding failed: {}", e),
            })?;

        let Some(yuv) = decoded else {
            return Ok(None);
        };
        let (width, height) = yuv.dimensions();
        let (stride_y, stride_u, stride_v) = yuv.strides();
        let (chroma_width, chroma_height) = (width.div_ceil(2), height.div_ceil(2));

        let mut data = Vec::with_capacity(i420_size(width as u32, height as u32));
        copy_plane(&mut data, yuv.y(), stride_y, width, height);
        copy_plane(&mut data, yuv.u(), stride_u, chroma_width, chroma_height);
        copy_plane(&mut data, yuv.v(), stride_v, chroma_width, chroma_height);

        Ok(Some(VideoFrame {
            width: width as u32,
            height: height as u32,
            data,
            timestamp_us: image.timestamp_us,
        }))
    }

    fn release(&mut self) -> MediaResult<()> {
        self.decoder = None;
        Ok(())
    }

    fn implementation_name(&self) -> String {
        "OpenH264".to_string()
    }
}

/// OpenH264 encoder
#[cfg(feature = "h264")]
pub struct OpenH264VideoEncoder {
    encoder: Option<H264Encoder>,
    settings: Option<EncoderSettings>,
    frames_encoded: u64,
}

// SAFETY: see `OpenH264VideoDecoder`.
#[cfg(feature = "h264")]
unsafe impl Send for OpenH264VideoEncoder {}

#[cfg(feature = "h264")]
impl OpenH264VideoEncoder {
    /// Uninitialised encoder
    pub fn new() -> Self {
        Self {
            encoder: None,
            settings: None,
            frames_encoded: 0,
        }
    }
}

#[cfg(feature = "h264")]
impl Default for OpenH264VideoEncoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "h264")]
impl std::fmt::Debug for OpenH264VideoEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenH264VideoEncoder")
            .field("settings", &self.settings)
            .field("frames_encoded", &self.frames_encoded)
            .finish()
    }
}

#[cfg(feature = "h264")]
impl VideoEncoder for OpenH264VideoEncoder {
    fn init_encode(&mut self, settings: &EncoderSettings) -> MediaResult<()> {
        // OpenH264 takes 4:2:0 input with whole chroma samples only.
        if settings.width == 0 || settings.height == 0 || settings.width % 2 != 0 || settings.height % 2 != 0 {
            return Err(MediaError::CodecInitializationFailed {
                codec: "H264".to_string(),
                reason: format!(
                    "invalid resolution {}x{}, width and height must be even",
                    settings.width, settings.height
                ),
            });
        }
        let encoder = H264Encoder::new().map_err(|e| MediaError::CodecInitializationFailed {
            codec: "H264".to_string(),
            reason: format!("Failed to create H.264 encoder: {}", e),
        })?;
        self.encoder = Some(encoder);
        self.settings = Some(settings.clone());
        self.frames_encoded = 0;
        Ok(())
    }

    fn encode(&mut self, frame: &VideoFrame, request_keyframe: bool) -> MediaResult<Vec<EncodedImage>> {
        let (Some(encoder), Some(settings)) = (self.encoder.as_mut(), self.settings.as_ref()) else {
            return Err(MediaError::InvalidState {
                message: "H.264 encoder used before init_encode".to_string(),
            });
        };
        if frame.width != settings.width || frame.height != settings.height {
            return Err(MediaError::EncodingFailed {
                codec: "H264".to_string(),
                reason: format!(
                    "Frame size mismatch: expected {}x{}, got {}x{}",
                    settings.width, settings.height, frame.width, frame.height
                ),
            });
        }

        let expected = i420_size(frame.width, frame.height);
        if frame.data.len() != expected {
            return Err(MediaError::EncodingFailed {
                codec: "H264".to_string(),
                reason: format!("I420 buffer holds {} bytes, expected {}", frame.data.len(), expected),
            });
        }

        let is_keyframe = request_keyframe || self.frames_encoded == 0;
        if request_keyframe {
            encoder.force_intra_frame();
        }
        let yuv = YUVBuffer::from_vec(frame.data.clone(), frame.width as usize, frame.height as usize);
        let bitstream = encoder
            .encode(&yuv)
            .map_err(|e| MediaError::EncodingFailed {
                codec: "H264".to_string(),
                reason: format!("H.264 encoding failed: {}", e),
            })?;
        self.frames_encoded += 1;

        let mut image = EncodedImage::new(bitstream.to_vec(), frame.timestamp_us, is_keyframe);
        image.width = frame.width;
        image.height = frame.height;
        Ok(vec![image])
    }

    fn release(&mut self) -> MediaResult<()> {
        self.encoder = None;
        self.settings = None;
        Ok(())
    }

    fn implementation_name(&self) -> String {
        "OpenH264".to_string()
    }
}
