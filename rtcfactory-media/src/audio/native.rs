//! Native audio processing boundary

use rtcfactory_core::{FactoryResult, NativeHandle};

/// Entry points of the native audio processing layer
///
/// Handles returned here are owned by the implementation; callers only pass
/// them back.
pub trait AudioProcessingNative: Send + Sync + std::fmt::Debug {
    /// Module whose post-processing stage loads the shared library `libname`
    fn create_dynamic_module(&self, libname: &str) -> FactoryResult<NativeHandle>;

    /// Module wrapping a processor previously produced by an external factory
    fn create_module_for_processor(&self, processor: NativeHandle) -> FactoryResult<NativeHandle>;

    /// Module running the built-in processor
    fn create_builtin_module(&self) -> FactoryResult<NativeHandle>;

    /// Load a built-in model by name
    fn init_model(&self, name: &str) -> FactoryResult<()>;

    /// Load a built-in model from bytes
    fn init_model_blob(&self, blob: &[u8]) -> FactoryResult<()>;

    /// Bypass the built-in processor
    fn set_disabled(&self, disabled: bool) -> FactoryResult<()>;

    /// Whether the built-in processor is bypassed
    fn is_disabled(&self) -> FactoryResult<bool>;

    /// Drop the most recent built-in module
    fn destroy_builtin_module(&self) -> FactoryResult<()>;
}
