//! Capture post-processing stages
//!
//! [`PluginProcessing`] drives an external processor plugin. [`BuiltinProcessor`]
//! is the in-tree stage whose bypass flag and model live in a [`BuiltinState`]
//! shared with the engine, so configuration calls reach modules that are
//! already running.

use crate::audio::apm::{AudioBuffer, CustomProcessing, RuntimeSetting};
use crate::audio::plugin::{PluginError, ProcessorPlugin};
use bytes::Bytes;
use parking_lot::Mutex;
use std::sync::Arc;

/// Capture audio reaches the stage as a single full band
const FULL_BAND: usize = 1;

/// Stage backed by a processor plugin
#[derive(Debug)]
pub struct PluginProcessing {
    library: String,
    plugin: Option<ProcessorPlugin>,
    load_failed: bool,
}

impl PluginProcessing {
    /// Stage that loads `library` on first initialisation
    pub fn new(library: impl Into<String>) -> Self {
        Self {
            library: library.into(),
            plugin: None,
            load_failed: false,
        }
    }

    /// Stage with the plugin loaded up front
    pub fn load(library: impl Into<String>) -> Result<Self, PluginError> {
        let library = library.into();
        let plugin = ProcessorPlugin::load(&library)?;
        Ok(Self {
            library,
            plugin: Some(plugin),
            load_failed: false,
        })
    }

    /// Whether the plugin is loaded
    pub fn is_loaded(&self) -> bool {
        self.plugin.is_some()
    }
}

impl CustomProcessing for PluginProcessing {
    fn initialize(&mut self, sample_rate_hz: u32, num_channels: usize) {
        if self.plugin.is_none() && !self.load_failed {
            match ProcessorPlugin::load(&self.library) {
                Ok(plugin) => self.plugin = Some(plugin),
                Err(e) => {
                    tracing::error!(library = %self.library, code = e.code(), error = %e, "Plugin load failed");
                    self.load_failed = true;
                }
            }
        }
        if let Some(plugin) = &self.plugin {
            if !plugin.initialize(sample_rate_hz, num_channels) {
                tracing::error!(library = %self.library, sample_rate_hz, num_channels, "ExternalProcessorInitialize failed");
            }
        }
    }

    fn process(&mut self, audio: &mut AudioBuffer) {
        let Some(plugin) = &self.plugin else {
            return;
        };
        let num_frames = audio.num_frames();
        if !plugin.process_frame(audio.channels_mut(), num_frames, FULL_BAND) {
            tracing::error!(library = %self.library, num_frames, "ExternalProcessorProcessFrame failed");
        }
    }

    fn name(&self) -> String {
        "ExternalProcessing".to_string()
    }

    fn set_runtime_setting(&mut self, setting: RuntimeSetting) {
        tracing::info!(library = %self.library, ?setting, "ExternalProcessing runtime setting");
    }
}

/// Model used by the built-in processor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessorModel {
    /// Model identified by name
    Named(String),
    /// Model supplied as raw bytes
    Blob(Bytes),
}

/// Configuration and counters shared by all built-in modules
#[derive(Debug, Default)]
pub struct BuiltinState {
    /// Bypass processing
    pub disabled: bool,
    /// Loaded model
    pub model: Option<ProcessorModel>,
    /// Frames processed across modules
    pub frames_processed: u64,
}

/// Shared handle to [`BuiltinState`]
pub type SharedBuiltinState = Arc<Mutex<BuiltinState>>;

/// DC-blocking pole
const DC_BLOCK_POLE: f32 = 0.995;

#[derive(Debug, Clone, Copy, Default)]
struct DcBlocker {
    previous_input: f32,
    previous_output: f32,
}

impl DcBlocker {
    fn run(&mut self, samples: &mut [f32]) {
        for sample in samples {
            let output = *sample - self.previous_input + DC_BLOCK_POLE * self.previous_output;
            self.previous_input = *sample;
            self.previous_output = output;
            *sample = output;
        }
    }
}

/// Built-in stage; runs only with a model loaded and bypass off
#[derive(Debug)]
pub struct BuiltinProcessor {
    state: SharedBuiltinState,
    filters: Vec<DcBlocker>,
    pre_gain: f32,
}

impl BuiltinProcessor {
    /// Stage reading `state`
    pub fn new(state: SharedBuiltinState) -> Self {
        Self {
            state,
            filters: Vec::new(),
            pre_gain: 1.0,
        }
    }
}

impl CustomProcessing for BuiltinProcessor {
    fn initialize(&mut self, sample_rate_hz: u32, num_channels: usize) {
        self.filters = vec![DcBlocker::default(); num_channels];
        tracing::debug!(sample_rate_hz, num_channels, "Builtin processor initialized");
    }

    fn process(&mut self, audio: &mut AudioBuffer) {
        let mut state = self.state.lock();
        if state.disabled || state.model.is_none() {
            return;
        }
        if self.filters.len() != audio.num_channels() {
            self.filters = vec![DcBlocker::default(); audio.num_channels()];
        }
        let gain = self.pre_gain;
        for (filter, channel) in self.filters.iter_mut().zip(audio.channels_mut()) {
            if gain != 1.0 {
                channel.iter_mut().for_each(|s| *s *= gain);
            }
            filter.run(channel);
        }
        state.frames_processed += 1;
    }

    fn name(&self) -> String {
        "BuiltinProcessing".to_string()
    }

    fn set_runtime_setting(&mut self, setting: RuntimeSetting) {
        let RuntimeSetting::CapturePreGain(gain) = setting;
        self.pre_gain = gain;
    }
}
