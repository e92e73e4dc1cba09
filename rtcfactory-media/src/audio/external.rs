//! Factory delegating processor creation to an external factory

use crate::audio::native::AudioProcessingNative;
use crate::audio::{AudioProcessingFactory, ExternalProcessorFactory};
use rtcfactory_core::{FactoryResult, NativeHandle, RtcFactoryError};
use std::sync::Arc;

/// Wraps processors from an [`ExternalProcessorFactory`] in native modules
#[derive(Debug, Clone)]
pub struct ExternalAudioProcessingFactory {
    native: Arc<dyn AudioProcessingNative>,
    external_processor_factory: Arc<dyn ExternalProcessorFactory>,
    log_processor_handle: bool,
}

impl ExternalAudioProcessingFactory {
    /// Start building a factory
    pub fn builder() -> ExternalAudioProcessingFactoryBuilder {
        ExternalAudioProcessingFactoryBuilder::default()
    }
}

impl AudioProcessingFactory for ExternalAudioProcessingFactory {
    fn create_native(&self) -> FactoryResult<NativeHandle> {
        let processor = self.external_processor_factory.create_native()?;
        if self.log_processor_handle {
            tracing::debug!(processor = %processor, "External processor created");
        }
        self.native.create_module_for_processor(processor)
    }
}

/// Builder for [`ExternalAudioProcessingFactory`]
#[derive(Debug, Default)]
pub struct ExternalAudioProcessingFactoryBuilder {
    external_processor_factory: Option<Arc<dyn ExternalProcessorFactory>>,
    log_processor_handle: bool,
}

impl ExternalAudioProcessingFactoryBuilder {
    /// Delegate producing processors; required
    pub fn external_processor_factory(mut self, factory: Arc<dyn ExternalProcessorFactory>) -> Self {
        self.external_processor_factory = Some(factory);
        self
    }

    /// Log each intermediate processor handle at debug level
    pub fn log_processor_handle(mut self, enabled: bool) -> Self {
        self.log_processor_handle = enabled;
        self
    }

    /// Fails with `InvalidArgument` when no delegate was set
    pub fn build(self, native: Arc<dyn AudioProcessingNative>) -> FactoryResult<ExternalAudioProcessingFactory> {
        let external_processor_factory = self.external_processor_factory.ok_or_else(|| {
            RtcFactoryError::invalid_argument("external_processor_factory", "must be set")
        })?;
        Ok(ExternalAudioProcessingFactory {
            native,
            external_processor_factory,
            log_processor_handle: self.log_processor_handle,
        })
    }
}
