//! Audio processing factories
//!
//! Each factory variant yields a [`NativeHandle`] naming an audio processing
//! module owned by the native layer ([`AudioProcessingNative`]).

pub mod apm;
pub mod configurable;
pub mod dynamic;
pub mod engine;
pub mod external;
pub mod native;
pub mod plugin;
pub mod processors;

use rtcfactory_core::{FactoryResult, NativeHandle};

pub use apm::{ApmConfig, AudioBuffer, AudioProcessingModule, CustomProcessing, RuntimeSetting};
pub use configurable::ConfigurableAudioProcessingFactory;
pub use dynamic::DynamicAudioProcessingFactory;
pub use engine::{BuiltinStatus, PluginProcessorFactory, ProcessingEngine};
pub use external::{ExternalAudioProcessingFactory, ExternalAudioProcessingFactoryBuilder};
pub use native::AudioProcessingNative;
pub use plugin::{PluginError, ProcessorPlugin};
pub use processors::{BuiltinProcessor, PluginProcessing, ProcessorModel};

/// Produces native audio processing modules
pub trait AudioProcessingFactory: Send + Sync + std::fmt::Debug {
    /// Create a module; every call yields a fresh handle
    fn create_native(&self) -> FactoryResult<NativeHandle>;
}

/// Produces external processors for [`ExternalAudioProcessingFactory`]
pub trait ExternalProcessorFactory: Send + Sync + std::fmt::Debug {
    /// Create a processor and return its native handle
    fn create_native(&self) -> FactoryResult<NativeHandle>;
}
