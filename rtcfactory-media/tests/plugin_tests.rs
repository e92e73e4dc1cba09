//! Integration tests for external processor plugins
//!
//! Plugins are opened through the real dynamic loader: a half-gain processor
//! built from `rtcfactory-test-plugin`, a file that is not a library, and a
//! system library that lacks the processor ABI.

use rtcfactory_media::audio::plugin::{
    CREATE_SYMBOL, ERROR_LOADING_CREATE_INSTANCE, ERROR_LOADING_LIBRARY,
};
use rtcfactory_media::audio::{
    AudioBuffer, AudioProcessingFactory, DynamicAudioProcessingFactory,
    ExternalAudioProcessingFactory, PluginError, PluginProcessing, PluginProcessorFactory,
    ProcessingEngine, ProcessorPlugin,
};
use std::env::consts::{DLL_PREFIX, DLL_SUFFIX};
use std::path::PathBuf;
use std::sync::Arc;

// ============================================================================
// HELPERS
// ============================================================================

/// Shared library built from `rtcfactory-test-plugin`, next to the test binary
fn gain_plugin_path() -> Option<String> {
    let exe = std::env::current_exe().ok()?;
    let deps = exe.parent()?;
    let prefix = format!("{}rtcfactory_test_plugin", DLL_PREFIX);
    let dirs: Vec<PathBuf> = deps
        .parent()
        .map(|profile| vec![deps.to_path_buf(), profile.to_path_buf()])
        .unwrap_or_else(|| vec![deps.to_path_buf()]);

    dirs.iter()
        .filter_map(|dir| std::fs::read_dir(dir).ok())
        .flat_map(|entries| entries.flatten())
        .map(|entry| entry.path())
        .find(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with(&prefix) && name.ends_with(DLL_SUFFIX))
        })
        .and_then(|path| path.to_str().map(str::to_string))
}

macro_rules! require_gain_plugin {
    () => {
        match gain_plugin_path() {
            Some(path) => path,
            None => {
                eprintln!("rtcfactory_test_plugin shared library not found, skipping");
                return;
            }
        }
    };
}

fn stereo(left: f32, right: f32) -> AudioBuffer {
    AudioBuffer::from_channels(48_000, vec![vec![left; 480], vec![right; 480]]).unwrap()
}

// ============================================================================
// LOADER STATUS CODES
// ============================================================================

#[test]
fn test_non_library_file_reports_load_error() {
    let path = std::env::temp_dir().join(format!("rtcfactory-not-a-plugin-{}{}", std::process::id(), DLL_SUFFIX));
    std::fs::write(&path, b"this is a text file, not a shared object").unwrap();

    let err = ProcessorPlugin::load(path.to_str().unwrap()).unwrap_err();
    let _ = std::fs::remove_file(&path);

    assert!(matches!(err, PluginError::LoadLibrary { .. }));
    assert_eq!(err.code(), ERROR_LOADING_LIBRARY);
}

#[cfg(all(target_os = "linux", target_env = "gnu"))]
#[test]
fn test_library_without_processor_abi_reports_missing_create() {
    let err = ProcessorPlugin::load("libc.so.6").unwrap_err();
    match &err {
        PluginError::MissingSymbol { symbol, .. } => assert_eq!(*symbol, CREATE_SYMBOL),
        other => panic!("Expected MissingSymbol, got {other:?}"),
    }
    assert_eq!(err.code(), ERROR_LOADING_CREATE_INSTANCE);
}

// ============================================================================
// LOADED PLUGIN TESTS
// ============================================================================

#[test]
fn test_loaded_plugin_initializes_and_processes() {
    let path = require_gain_plugin!();
    let plugin = ProcessorPlugin::load(&path).unwrap();
    assert_eq!(plugin.path(), path);

    assert!(plugin.initialize(48_000, 2));
    assert!(!plugin.initialize(0, 2));

    let mut channels = vec![vec![1.0f32; 160], vec![-0.5f32; 160]];
    assert!(plugin.process_frame(&mut channels, 160, 1));
    assert!(channels[0].iter().all(|s| *s == 0.5));
    assert!(channels[1].iter().all(|s| *s == -0.25));
}

#[test]
fn test_process_frame_rejects_short_channels() {
    let path = require_gain_plugin!();
    let plugin = ProcessorPlugin::load(&path).unwrap();
    plugin.initialize(16_000, 1);

    let mut channels = vec![vec![1.0f32; 80]];
    assert!(!plugin.process_frame(&mut channels, 160, 1));
    assert!(channels[0].iter().all(|s| *s == 1.0));
}

#[test]
fn test_plugin_stage_loads_eagerly() {
    let path = require_gain_plugin!();
    let stage = PluginProcessing::load(path.as_str()).unwrap();
    assert!(stage.is_loaded());
}

// ============================================================================
// FACTORY TESTS
// ============================================================================

#[test]
fn test_dynamic_module_loads_plugin_on_first_capture() {
    let path = require_gain_plugin!();
    let engine = Arc::new(ProcessingEngine::new());
    let factory = DynamicAudioProcessingFactory::new(engine.clone(), path).unwrap();
    let module = factory.create_native().unwrap();

    let mut audio = stereo(1.0, -1.0);
    engine.process_capture(module, &mut audio).unwrap();
    assert!(audio.channels()[0].iter().all(|s| *s == 0.5));
    assert!(audio.channels()[1].iter().all(|s| *s == -0.5));

    // Same format: the stage is not reinitialised and keeps processing.
    engine.process_capture(module, &mut audio).unwrap();
    assert!(audio.channels()[0].iter().all(|s| *s == 0.25));
}

#[test]
fn test_external_module_wraps_loaded_plugin() {
    let path = require_gain_plugin!();
    let engine = Arc::new(ProcessingEngine::new());
    let factory = ExternalAudioProcessingFactory::builder()
        .external_processor_factory(Arc::new(PluginProcessorFactory::new(engine.clone(), path)))
        .build(engine.clone())
        .unwrap();

    let module = factory.create_native().unwrap();
    assert_eq!(engine.pending_processor_count(), 0);

    let mut audio = stereo(0.8, 0.4);
    engine.process_capture(module, &mut audio).unwrap();
    assert!(audio.channels()[0].iter().all(|s| *s == 0.4));
    assert!(audio.channels()[1].iter().all(|s| *s == 0.2));
}
