//! Factory for modules loading a processor library by name

use crate::audio::native::AudioProcessingNative;
use crate::audio::AudioProcessingFactory;
use rtcfactory_core::{FactoryResult, NativeHandle, RtcFactoryError};
use std::sync::Arc;

/// Creates modules whose post-processing stage is the shared library `libname`
#[derive(Debug, Clone)]
pub struct DynamicAudioProcessingFactory {
    native: Arc<dyn AudioProcessingNative>,
    libname: String,
}

impl DynamicAudioProcessingFactory {
    /// Fails with `InvalidArgument` when `libname` is empty
    pub fn new(native: Arc<dyn AudioProcessingNative>, libname: impl Into<String>) -> FactoryResult<Self> {
        let libname = libname.into();
        if libname.is_empty() {
            return Err(RtcFactoryError::invalid_argument("libname", "must not be empty"));
        }
        Ok(Self { native, libname })
    }

    /// Library name forwarded to the native layer
    pub fn libname(&self) -> &str {
        &self.libname
    }
}

impl AudioProcessingFactory for DynamicAudioProcessingFactory {
    fn create_native(&self) -> FactoryResult<NativeHandle> {
        tracing::debug!(libname = %self.libname, "Creating dynamic audio processing module");
        self.native.create_dynamic_module(&self.libname)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::engine::ProcessingEngine;

    #[test]
    fn test_empty_libname_is_rejected() {
        let engine = Arc::new(ProcessingEngine::new());
        let err = DynamicAudioProcessingFactory::new(engine.clone(), "").unwrap_err();
        assert!(err.is_invalid_argument());
        assert_eq!(engine.module_count(), 0);
    }

    #[test]
    fn test_each_call_creates_a_module() {
        let engine = Arc::new(ProcessingEngine::new());
        let factory = DynamicAudioProcessingFactory::new(engine.clone(), "libdenoise.so").unwrap();
        let a = factory.create_native().unwrap();
        let b = factory.create_native().unwrap();
        assert_ne!(a, b);
        assert_eq!(engine.module_count(), 2);
    }
}
