//! Simulcast encoder factory
//!
//! Every encoder request is answered with a [`SimulcastVideoEncoder`] that
//! builds one encoder per simulcast layer, primary factory first. The
//! advertised codec list merges the primary, fallback and native lists and is
//! ordered so that, for equal names, descriptors with scalability modes come
//! first: the consumer removes duplicate names keeping the first occurrence,
//! and the richer descriptor must survive that pass.

use crate::error::{MediaError, MediaResult};
use crate::frames::{EncodedImage, VideoFrame};
use crate::video::codec_info::VideoCodecInfo;
use crate::video::encoder::{EncoderSettings, SimulcastStream, VideoEncoder, VideoEncoderFactory};
use crate::video::native_codecs::NativeCodecCapabilities;
use std::cmp::Ordering;
use std::sync::Arc;

/// Order by case-insensitive name, then scalability-capable descriptors first
///
/// Names are folded per character with Unicode lowercase mapping, so `"Av1"`
/// and `"AV1"` compare equal.
pub fn compare_codecs(a: &VideoCodecInfo, b: &VideoCodecInfo) -> Ordering {
    let by_name = a
        .name
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.name.chars().flat_map(char::to_lowercase));
    by_name.then_with(|| b.has_scalability_modes().cmp(&a.has_scalability_modes()))
}

/// Stable sort with [`compare_codecs`]; equal entries keep merge order
pub fn sort_codecs(codecs: &mut [VideoCodecInfo]) {
    codecs.sort_by(compare_codecs);
}

/// Encoder factory wrapping primary/fallback factories in simulcast encoders
#[derive(Debug, Clone)]
pub struct SimulcastVideoEncoderFactory {
    primary: Arc<dyn VideoEncoderFactory>,
    fallback: Option<Arc<dyn VideoEncoderFactory>>,
    native: Arc<dyn NativeCodecCapabilities>,
}

impl SimulcastVideoEncoderFactory {
    /// Create the factory; `fallback` may be absent
    pub fn new(
        primary: Arc<dyn VideoEncoderFactory>,
        fallback: Option<Arc<dyn VideoEncoderFactory>>,
        native: Arc<dyn NativeCodecCapabilities>,
    ) -> Self {
        Self {
            primary,
            fallback,
            native,
        }
    }
}

impl VideoEncoderFactory for SimulcastVideoEncoderFactory {
    fn create_encoder(&self, codec: &VideoCodecInfo) -> Option<Box<dyn VideoEncoder>> {
        Some(Box::new(SimulcastVideoEncoder::new(
            self.primary.clone(),
            self.fallback.clone(),
            codec.clone(),
        )))
    }

    fn supported_codecs(&self) -> Vec<VideoCodecInfo> {
        let mut codecs = self.primary.supported_codecs();
        if let Some(fallback) = &self.fallback {
            codecs.extend(fallback.supported_codecs());
        }
        codecs.extend(self.native.vp9_codecs());
        match self.native.av1_codec() {
            Some(av1) => codecs.push(av1),
            None => tracing::warn!("native AV1 codec unavailable, omitting from supported codecs"),
        }
        sort_codecs(&mut codecs);
        codecs
    }
}

#[derive(Debug)]
struct Layer {
    encoder: Box<dyn VideoEncoder>,
    from_fallback: bool,
    width: u32,
    height: u32,
}

/// Encoder producing one stream per simulcast layer
#[derive(Debug)]
pub struct SimulcastVideoEncoder {
    primary: Arc<dyn VideoEncoderFactory>,
    fallback: Option<Arc<dyn VideoEncoderFactory>>,
    codec: VideoCodecInfo,
    layers: Vec<Layer>,
}

impl SimulcastVideoEncoder {
    /// Encoder for `codec`, built lazily in `init_encode`
    pub fn new(
        primary: Arc<dyn VideoEncoderFactory>,
        fallback: Option<Arc<dyn VideoEncoderFactory>>,
        codec: VideoCodecInfo,
    ) -> Self {
        Self {
            primary,
            fallback,
            codec,
            layers: Vec::new(),
        }
    }

    /// Codec this encoder was created for
    pub fn codec(&self) -> &VideoCodecInfo {
        &self.codec
    }

    /// Number of initialised layers
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Configured resolution of layer `index`
    pub fn layer_resolution(&self, index: usize) -> Option<(u32, u32)> {
        self.layers.get(index).map(|layer| (layer.width, layer.height))
    }

    /// Whether layer `index` is served by the fallback factory
    pub fn is_layer_on_fallback(&self, index: usize) -> Option<bool> {
        self.layers.get(index).map(|layer| layer.from_fallback)
    }

    fn try_factory(
        &self,
        factory: &dyn VideoEncoderFactory,
        settings: &EncoderSettings,
    ) -> Option<Box<dyn VideoEncoder>> {
        let mut encoder = factory.create_encoder(&self.codec)?;
        match encoder.init_encode(settings) {
            Ok(()) => Some(encoder),
            Err(e) => {
                tracing::warn!(
                    codec = %self.codec,
                    encoder = %encoder.implementation_name(),
                    error = %e,
                    "encoder init failed"
                );
                None
            }
        }
    }

    fn build_layer(&self, index: usize, settings: &EncoderSettings) -> MediaResult<Layer> {
        if let Some(encoder) = self.try_factory(self.primary.as_ref(), settings) {
            return Ok(Layer {
                encoder,
                from_fallback: false,
                width: settings.width,
                height: settings.height,
            });
        }
        if let Some(fallback) = &self.fallback {
            tracing::info!(codec = %self.codec, layer = index, "using fallback encoder");
            if let Some(encoder) = self.try_factory(fallback.as_ref(), settings) {
                return Ok(Layer {
                    encoder,
                    from_fallback: true,
                    width: settings.width,
                    height: settings.height,
                });
            }
        }
        Err(MediaError::CodecUnavailable {
            codec: self.codec.name.clone(),
        })
    }
}

impl VideoEncoder for SimulcastVideoEncoder {
    fn init_encode(&mut self, settings: &EncoderSettings) -> MediaResult<()> {
        if let Err(e) = self.release() {
            tracing::warn!(codec = %self.codec, error = %e, "releasing previous layers failed, reinitialising anyway");
        }

        let streams = if settings.simulcast_streams.is_empty() {
            vec![SimulcastStream {
                width: settings.width,
                height: settings.height,
                max_bitrate_kbps: settings.start_bitrate_kbps,
            }]
        } else {
            settings.simulcast_streams.clone()
        };

        let mut layers = Vec::with_capacity(streams.len());
        for (index, stream) in streams.iter().enumerate() {
            layers.push(self.build_layer(index, &settings.for_stream(stream))?);
        }
        tracing::debug!(codec = %self.codec, layers = layers.len(), "simulcast encoder initialised");
        self.layers = layers;
        Ok(())
    }

    fn encode(&mut self, frame: &VideoFrame, request_keyframe: bool) -> MediaResult<Vec<EncodedImage>> {
        if self.layers.is_empty() {
            return Err(MediaError::InvalidState {
                message: "simulcast encoder used before init_encode".to_string(),
            });
        }

        // A failing layer is skipped; the call only fails when every layer does.
        let mut images = Vec::new();
        let mut last_error = None;
        let mut encoded_layers = 0;
        for (index, layer) in self.layers.iter_mut().enumerate() {
            let result = frame
                .scaled(layer.width, layer.height)
                .and_then(|input| layer.encoder.encode(&input, request_keyframe));
            match result {
                Ok(layer_images) => {
                    encoded_layers += 1;
                    images.extend(layer_images.into_iter().map(|mut image| {
                        image.simulcast_index = index;
                        image
                    }));
                }
                Err(e) => {
                    tracing::warn!(
                        codec = %self.codec,
                        layer = index,
                        encoder = %layer.encoder.implementation_name(),
                        error = %e,
                        "layer encode failed"
                    );
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if encoded_layers == 0 => Err(e),
            _ => Ok(images),
        }
    }

    fn release(&mut self) -> MediaResult<()> {
        let mut result = Ok(());
        for mut layer in self.layers.drain(..) {
            if let Err(e) = layer.encoder.release() {
                tracing::debug!(error = %e, "layer release failed");
                result = Err(e);
            }
        }
        result
    }

    fn implementation_name(&self) -> String {
        let names: Vec<String> = self
            .layers
            .iter()
            .map(|layer| layer.encoder.implementation_name())
            .collect();
        format!("SimulcastEncoderAdapter ({})", names.join(", "))
    }
}
