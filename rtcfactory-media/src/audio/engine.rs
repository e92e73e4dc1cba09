//! In-process native audio processing layer
//!
//! [`ProcessingEngine`] owns every module and registered processor. Handles
//! are monotonic non-zero ids; a stale handle resolves to
//! [`MediaError::UnknownHandle`] rather than to a dangling resource.

use crate::audio::apm::{AudioBuffer, AudioProcessingModule, CustomProcessing, RuntimeSetting};
use crate::audio::native::AudioProcessingNative;
use crate::audio::processors::{
    BuiltinProcessor, PluginProcessing, ProcessorModel, SharedBuiltinState,
};
use crate::audio::ExternalProcessorFactory;
use crate::error::{MediaError, MediaResult};
use bytes::Bytes;
use parking_lot::Mutex;
use rtcfactory_core::{FactoryResult, NativeHandle, RtcFactoryError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Snapshot of the built-in processor state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltinStatus {
    /// Bypass flag
    pub disabled: bool,
    /// Loaded model
    pub model: Option<ProcessorModel>,
    /// Frames processed so far
    pub frames_processed: u64,
}

/// Owner of audio processing modules and external processors
#[derive(Debug)]
pub struct ProcessingEngine {
    next_id: AtomicU64,
    modules: Mutex<HashMap<NativeHandle, AudioProcessingModule>>,
    processors: Mutex<HashMap<NativeHandle, Box<dyn CustomProcessing>>>,
    builtin_modules: Mutex<Vec<NativeHandle>>,
    builtin: SharedBuiltinState,
}

impl Default for ProcessingEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingEngine {
    /// Empty engine
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            modules: Mutex::new(HashMap::new()),
            processors: Mutex::new(HashMap::new()),
            builtin_modules: Mutex::new(Vec::new()),
            builtin: SharedBuiltinState::default(),
        }
    }

    fn allocate_handle(&self) -> FactoryResult<NativeHandle> {
        let raw = self.next_id.fetch_add(1, Ordering::Relaxed);
        NativeHandle::from_raw(raw).ok_or_else(|| RtcFactoryError::Initialization {
            reason: "native handle space exhausted".to_string(),
        })
    }

    fn insert_module(&self, stage: Box<dyn CustomProcessing>) -> FactoryResult<NativeHandle> {
        let handle = self.allocate_handle()?;
        let module = AudioProcessingModule::new(stage);
        tracing::info!(%handle, stage = %module.stage_name(), "Created audio processing module");
        self.modules.lock().insert(handle, module);
        Ok(handle)
    }

    /// Register an external processor; the handle is consumed by
    /// [`AudioProcessingNative::create_module_for_processor`]
    pub fn register_processor(&self, processor: Box<dyn CustomProcessing>) -> FactoryResult<NativeHandle> {
        let handle = self.allocate_handle()?;
        tracing::debug!(%handle, processor = %processor.name(), "Registered external processor");
        self.processors.lock().insert(handle, processor);
        Ok(handle)
    }

    /// Run capture processing on the module behind `handle`
    pub fn process_capture(&self, handle: NativeHandle, audio: &mut AudioBuffer) -> MediaResult<()> {
        let mut modules = self.modules.lock();
        let module = modules
            .get_mut(&handle)
            .ok_or(MediaError::UnknownHandle { handle })?;
        module.process_capture(audio)
    }

    /// Forward a runtime setting to the module behind `handle`
    pub fn set_runtime_setting(&self, handle: NativeHandle, setting: RuntimeSetting) -> MediaResult<()> {
        let mut modules = self.modules.lock();
        let module = modules
            .get_mut(&handle)
            .ok_or(MediaError::UnknownHandle { handle })?;
        module.set_runtime_setting(setting);
        Ok(())
    }

    /// Destroy a module
    pub fn destroy_module(&self, handle: NativeHandle) -> MediaResult<()> {
        self.modules
            .lock()
            .remove(&handle)
            .ok_or(MediaError::UnknownHandle { handle })?;
        self.builtin_modules.lock().retain(|h| *h != handle);
        tracing::info!(%handle, "Destroyed audio processing module");
        Ok(())
    }

    /// Whether `handle` refers to a live module
    pub fn contains_module(&self, handle: NativeHandle) -> bool {
        self.modules.lock().contains_key(&handle)
    }

    /// Number of live modules
    pub fn module_count(&self) -> usize {
        self.modules.lock().len()
    }

    /// Number of registered, unclaimed processors
    pub fn pending_processor_count(&self) -> usize {
        self.processors.lock().len()
    }

    /// Current built-in processor state
    pub fn builtin_status(&self) -> BuiltinStatus {
        let state = self.builtin.lock();
        BuiltinStatus {
            disabled: state.disabled,
            model: state.model.clone(),
            frames_processed: state.frames_processed,
        }
    }
}

impl AudioProcessingNative for ProcessingEngine {
    fn create_dynamic_module(&self, libname: &str) -> FactoryResult<NativeHandle> {
        self.insert_module(Box::new(PluginProcessing::new(libname)))
    }

    fn create_module_for_processor(&self, processor: NativeHandle) -> FactoryResult<NativeHandle> {
        let stage = self
            .processors
            .lock()
            .remove(&processor)
            .ok_or(RtcFactoryError::UnknownHandle { handle: processor })?;
        self.insert_module(stage)
    }

    fn create_builtin_module(&self) -> FactoryResult<NativeHandle> {
        let handle = self.insert_module(Box::new(BuiltinProcessor::new(self.builtin.clone())))?;
        self.builtin_modules.lock().push(handle);
        Ok(handle)
    }

    fn init_model(&self, name: &str) -> FactoryResult<()> {
        tracing::info!(model = name, "Loading builtin model");
        self.builtin.lock().model = Some(ProcessorModel::Named(name.to_string()));
        Ok(())
    }

    fn init_model_blob(&self, blob: &[u8]) -> FactoryResult<()> {
        tracing::info!(size = blob.len(), "Loading builtin model blob");
        self.builtin.lock().model = Some(ProcessorModel::Blob(Bytes::copy_from_slice(blob)));
        Ok(())
    }

    fn set_disabled(&self, disabled: bool) -> FactoryResult<()> {
        tracing::debug!(disabled, "Builtin processor bypass");
        self.builtin.lock().disabled = disabled;
        Ok(())
    }

    fn is_disabled(&self) -> FactoryResult<bool> {
        Ok(self.builtin.lock().disabled)
    }

    fn destroy_builtin_module(&self) -> FactoryResult<()> {
        let Some(handle) = self.builtin_modules.lock().pop() else {
            tracing::debug!("No builtin module to destroy");
            return Ok(());
        };
        self.modules.lock().remove(&handle);
        tracing::info!(%handle, "Destroyed builtin audio processing module");
        Ok(())
    }
}

/// External processor factory backed by a processor plugin
#[derive(Debug, Clone)]
pub struct PluginProcessorFactory {
    engine: Arc<ProcessingEngine>,
    library: String,
}

impl PluginProcessorFactory {
    /// Factory registering `library` with `engine`
    pub fn new(engine: Arc<ProcessingEngine>, library: impl Into<String>) -> Self {
        Self {
            engine,
            library: library.into(),
        }
    }
}

impl ExternalProcessorFactory for PluginProcessorFactory {
    fn create_native(&self) -> FactoryResult<NativeHandle> {
        let stage = PluginProcessing::load(self.library.as_str()).map_err(MediaError::from)?;
        self.engine.register_processor(Box::new(stage))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Invert;

    impl CustomProcessing for Invert {
        fn initialize(&mut self, _sample_rate_hz: u32, _num_channels: usize) {}

        fn process(&mut self, audio: &mut AudioBuffer) {
            for channel in audio.channels_mut() {
                channel.iter_mut().for_each(|s| *s = -*s);
            }
        }

        fn name(&self) -> String {
            "Invert".to_string()
        }
    }

    #[test]
    fn test_handles_are_unique() {
        let engine = ProcessingEngine::new();
        let a = engine.create_builtin_module().unwrap();
        let b = engine.create_builtin_module().unwrap();
        assert_ne!(a, b);
        assert_eq!(engine.module_count(), 2);
    }

    #[test]
    fn test_processor_handle_is_consumed_once() {
        let engine = ProcessingEngine::new();
        let processor = engine.register_processor(Box::new(Invert)).unwrap();
        let module = engine.create_module_for_processor(processor).unwrap();
        assert_eq!(engine.pending_processor_count(), 0);

        let err = engine.create_module_for_processor(processor).unwrap_err();
        assert!(matches!(err, RtcFactoryError::UnknownHandle { .. }));

        let mut audio = AudioBuffer::from_channels(8_000, vec![vec![1.0; 4]]).unwrap();
        engine.process_capture(module, &mut audio).unwrap();
        assert_eq!(audio.channels()[0], vec![-1.0; 4]);
    }

    #[test]
    fn test_destroy_builtin_drops_latest() {
        let engine = ProcessingEngine::new();
        let first = engine.create_builtin_module().unwrap();
        let second = engine.create_builtin_module().unwrap();
        engine.destroy_builtin_module().unwrap();
        assert!(engine.contains_module(first));
        assert!(!engine.contains_module(second));

        let mut audio = AudioBuffer::new(16_000, 1, 160);
        let err = engine.process_capture(second, &mut audio).unwrap_err();
        assert!(matches!(err, MediaError::UnknownHandle { .. }));
    }

    #[test]
    fn test_model_blob_is_copied() {
        let engine = ProcessingEngine::new();
        engine.init_model_blob(&[1, 2, 3]).unwrap();
        assert_eq!(
            engine.builtin_status().model,
            Some(ProcessorModel::Blob(Bytes::from_static(&[1, 2, 3])))
        );
    }
}
