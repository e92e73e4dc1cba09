//! # rtcfactory - Codec and Audio Processing Factories
//!
//! rtcfactory sits between a real-time media engine and the platform. It
//! decides which video decoder or encoder serves a codec and hands out
//! native audio processing modules.
//!
//! ## Key Features
//!
//! - **Hardware blacklist**: known-bad hardware decoders (Exynos VP9 by default) are replaced by software
//! - **Fallback decoding**: hardware-first decoders that switch to software on failure
//! - **Simulcast encoding**: one encoder per layer, merged codec lists ordered for downstream deduplication
//! - **Audio processing**: built-in, plugin-loading and externally supplied processors
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rtcfactory::{FactoryConfig, RtcFactory};
//! use rtcfactory_media::video::{SoftwareVideoEncoderFactory, VideoEncoderFactory};
//! use std::sync::Arc;
//!
//! let factory = RtcFactory::init_with(FactoryConfig::default())?;
//!
//! let encoders = factory.encoder_factory(Arc::new(SoftwareVideoEncoderFactory::new()));
//! for codec in encoders.supported_codecs() {
//!     println!("{}", codec);
//! }
//!
//! let audio = factory.audio_processing_factory()?;
//! let module = audio.create_native()?;
//! println!("audio module {}", module);
//! # Ok::<(), rtcfactory::RtcFactoryError>(())
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]

// Re-export core types for easy access
pub use rtcfactory_core::{FactoryResult, NativeHandle, RtcFactoryError};

pub use rtcfactory_media::{
    audio::{
        AudioProcessingFactory, ConfigurableAudioProcessingFactory, DynamicAudioProcessingFactory,
        ExternalAudioProcessingFactory, PluginProcessorFactory, ProcessingEngine,
    },
    video::{
        BlacklistPredicate, BlacklistedVideoDecoderFactory, BuiltinCodecCapabilities,
        MediaCodecList, NativeCodecCapabilities, PlatformDecoderProvider,
        SimulcastVideoEncoderFactory, VideoCodecInfo, VideoDecoderFactory, VideoEncoderFactory,
    },
};

#[cfg(feature = "diagnostics")]
pub use rtcfactory_diagnostics::{CodecReport, DebugLogger};

// Public API modules
pub mod config;

// Re-export main API types
pub use config::{AudioConfig, AudioMode, DecoderConfig, EncoderConfig, FactoryConfig};

use rtcfactory_media::video::SoftwareVideoEncoderFactory;
use std::sync::Arc;

#[cfg(feature = "diagnostics")]
fn init_debug_logging() -> FactoryResult<()> {
    DebugLogger::init_logging(true).map_err(|e| RtcFactoryError::Initialization {
        reason: format!("Failed to initialize logging: {}", e),
    })
}

#[cfg(not(feature = "diagnostics"))]
fn init_debug_logging() -> FactoryResult<()> {
    Ok(())
}

/// Main entry point for rtcfactory
#[derive(Debug, Clone)]
pub struct RtcFactory {
    inner: Arc<RtcFactoryInner>,
}

#[derive(Debug)]
struct RtcFactoryInner {
    config: FactoryConfig,
    engine: Arc<ProcessingEngine>,
}

impl RtcFactory {
    /// Initialize with default settings
    ///
    /// # Example
    /// ```rust,no_run
    /// use rtcfactory::RtcFactory;
    ///
    /// let factory = RtcFactory::init()?;
    /// # Ok::<(), rtcfactory::RtcFactoryError>(())
    /// ```
    pub fn init() -> FactoryResult<Self> {
        Self::init_with(FactoryConfig::default())
    }

    /// Initialize with a custom configuration
    pub fn init_with(config: FactoryConfig) -> FactoryResult<Self> {
        config.validate()?;
        if config.debug_logging {
            init_debug_logging()?;
        }

        tracing::info!(
            audio_mode = ?config.audio.mode,
            blacklist_scope_rules = config.decoder.blacklist_scope.len(),
            "rtcfactory initialized"
        );

        Ok(Self {
            inner: Arc::new(RtcFactoryInner {
                config,
                engine: Arc::new(ProcessingEngine::new()),
            }),
        })
    }

    /// Active configuration
    pub fn config(&self) -> &FactoryConfig {
        &self.inner.config
    }

    /// Native audio processing engine shared by all audio factories
    pub fn engine(&self) -> Arc<ProcessingEngine> {
        self.inner.engine.clone()
    }

    /// Decoder factory over the platform registry with the configured blacklist scope
    pub fn decoder_factory(
        &self,
        codec_list: Arc<dyn MediaCodecList>,
        provider: Arc<dyn PlatformDecoderProvider>,
    ) -> BlacklistedVideoDecoderFactory {
        BlacklistedVideoDecoderFactory::with_predicate(
            codec_list,
            provider,
            self.inner.config.decoder.predicate(),
        )
    }

    /// Simulcast encoder factory using the built-in native codec capabilities
    pub fn encoder_factory(&self, primary: Arc<dyn VideoEncoderFactory>) -> SimulcastVideoEncoderFactory {
        let native = BuiltinCodecCapabilities::new()
            .with_high_bit_depth_vp9(self.inner.config.encoder.high_bit_depth_vp9);
        self.encoder_factory_with_native(primary, Arc::new(native))
    }

    /// Simulcast encoder factory with caller-supplied native capabilities
    pub fn encoder_factory_with_native(
        &self,
        primary: Arc<dyn VideoEncoderFactory>,
        native: Arc<dyn NativeCodecCapabilities>,
    ) -> SimulcastVideoEncoderFactory {
        let fallback: Option<Arc<dyn VideoEncoderFactory>> = if self.inner.config.encoder.use_fallback {
            Some(Arc::new(SoftwareVideoEncoderFactory::new()))
        } else {
            None
        };
        SimulcastVideoEncoderFactory::new(primary, fallback, native)
    }

    /// Audio processing factory for the configured mode
    pub fn audio_processing_factory(&self) -> FactoryResult<Arc<dyn AudioProcessingFactory>> {
        let audio = &self.inner.config.audio;
        let library = audio.processor_library.clone().unwrap_or_default();
        let factory: Arc<dyn AudioProcessingFactory> = match audio.mode {
            AudioMode::Builtin => Arc::new(self.configurable_audio_factory()),
            AudioMode::Dynamic => Arc::new(DynamicAudioProcessingFactory::new(self.engine(), library)?),
            AudioMode::External => Arc::new(
                ExternalAudioProcessingFactory::builder()
                    .external_processor_factory(Arc::new(PluginProcessorFactory::new(self.engine(), library)))
                    .log_processor_handle(self.inner.config.debug_logging)
                    .build(self.engine())?,
            ),
        };
        tracing::debug!(mode = ?audio.mode, "Created audio processing factory");
        Ok(factory)
    }

    /// Built-in audio processing factory with its configuration calls
    pub fn configurable_audio_factory(&self) -> ConfigurableAudioProcessingFactory {
        ConfigurableAudioProcessingFactory::new(self.engine())
    }

    /// Snapshot of the codecs both factories advertise
    #[cfg(feature = "diagnostics")]
    pub fn codec_report(
        &self,
        decoders: &dyn VideoDecoderFactory,
        encoders: &dyn VideoEncoderFactory,
    ) -> CodecReport {
        CodecReport::collect(decoders, encoders)
    }
}
