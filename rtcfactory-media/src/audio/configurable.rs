//! Factory for the built-in module with imperative configuration

use crate::audio::native::AudioProcessingNative;
use crate::audio::AudioProcessingFactory;
use rtcfactory_core::{FactoryResult, NativeHandle, RtcFactoryError};
use std::sync::Arc;

/// Creates built-in modules and forwards configuration calls to the native layer
#[derive(Debug, Clone)]
pub struct ConfigurableAudioProcessingFactory {
    native: Arc<dyn AudioProcessingNative>,
}

impl ConfigurableAudioProcessingFactory {
    /// Create the factory
    pub fn new(native: Arc<dyn AudioProcessingNative>) -> Self {
        Self { native }
    }

    /// Load a model by name
    pub fn init_model(&self, name: &str) -> FactoryResult<()> {
        if name.is_empty() {
            return Err(RtcFactoryError::invalid_argument("model", "must not be empty"));
        }
        self.native.init_model(name)
    }

    /// Load a model from bytes
    pub fn init_model_blob(&self, blob: &[u8]) -> FactoryResult<()> {
        if blob.is_empty() {
            return Err(RtcFactoryError::invalid_argument("blob", "must not be empty"));
        }
        self.native.init_model_blob(blob)
    }

    /// Bypass processing
    pub fn set_disabled(&self, disabled: bool) -> FactoryResult<()> {
        self.native.set_disabled(disabled)
    }

    /// Whether processing is bypassed
    pub fn is_disabled(&self) -> FactoryResult<bool> {
        self.native.is_disabled()
    }

    /// Destroy the most recent built-in module
    pub fn destroy(&self) -> FactoryResult<()> {
        self.native.destroy_builtin_module()
    }
}

impl AudioProcessingFactory for ConfigurableAudioProcessingFactory {
    fn create_native(&self) -> FactoryResult<NativeHandle> {
        self.native.create_builtin_module()
    }
}
