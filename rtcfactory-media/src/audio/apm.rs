//! Audio processing module
//!
//! The module built for every factory handle. Echo cancellation is disabled
//! and mobile mode is on; all actual work happens in the capture
//! post-processing stage.

use crate::error::{MediaError, MediaResult};

/// Echo canceller settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EchoCancellerConfig {
    /// Whether echo cancellation runs
    pub enabled: bool,
    /// Use the mobile (AECM) variant
    pub mobile_mode: bool,
}

/// Module configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApmConfig {
    /// Echo canceller settings
    pub echo_canceller: EchoCancellerConfig,
}

impl Default for ApmConfig {
    fn default() -> Self {
        Self {
            echo_canceller: EchoCancellerConfig {
                enabled: false,
                mobile_mode: true,
            },
        }
    }
}

/// Runtime settings forwarded to the post-processing stage
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RuntimeSetting {
    /// Linear gain applied before capture processing
    CapturePreGain(f32),
}

/// Deinterleaved capture audio
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    sample_rate_hz: u32,
    num_frames: usize,
    channels: Vec<Vec<f32>>,
}

impl AudioBuffer {
    /// Silent buffer
    pub fn new(sample_rate_hz: u32, num_channels: usize, num_frames: usize) -> Self {
        Self {
            sample_rate_hz,
            num_frames,
            channels: vec![vec![0.0; num_frames]; num_channels],
        }
    }

    /// Buffer over existing channel data; all channels must have equal length
    pub fn from_channels(sample_rate_hz: u32, channels: Vec<Vec<f32>>) -> MediaResult<Self> {
        let num_frames = channels.first().map_or(0, Vec::len);
        if let Some(bad) = channels.iter().find(|c| c.len() != num_frames) {
            return Err(MediaError::InvalidFrameData {
                expected: num_frames,
                actual: bad.len(),
            });
        }
        Ok(Self {
            sample_rate_hz,
            num_frames,
            channels,
        })
    }

    /// Sample rate
    pub fn sample_rate_hz(&self) -> u32 {
        self.sample_rate_hz
    }

    /// Samples per channel
    pub fn num_frames(&self) -> usize {
        self.num_frames
    }

    /// Channel count
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Channel data
    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    /// Mutable channel data
    pub fn channels_mut(&mut self) -> &mut [Vec<f32>] {
        &mut self.channels
    }
}

/// Capture post-processing stage
pub trait CustomProcessing: Send + std::fmt::Debug {
    /// Called when the stream format changes
    fn initialize(&mut self, sample_rate_hz: u32, num_channels: usize);

    /// Process capture audio in place
    fn process(&mut self, audio: &mut AudioBuffer);

    /// Stage name
    fn name(&self) -> String;

    /// Apply a runtime setting
    fn set_runtime_setting(&mut self, setting: RuntimeSetting) {
        tracing::debug!(stage = %self.name(), ?setting, "Runtime setting ignored");
    }
}

/// Audio processing module with a capture post-processing stage
#[derive(Debug)]
pub struct AudioProcessingModule {
    config: ApmConfig,
    capture_post_processing: Box<dyn CustomProcessing>,
    format: Option<(u32, usize)>,
}

impl AudioProcessingModule {
    /// Module with the default configuration
    pub fn new(capture_post_processing: Box<dyn CustomProcessing>) -> Self {
        Self::with_config(ApmConfig::default(), capture_post_processing)
    }

    /// Module with an explicit configuration
    pub fn with_config(config: ApmConfig, capture_post_processing: Box<dyn CustomProcessing>) -> Self {
        Self {
            config,
            capture_post_processing,
            format: None,
        }
    }

    /// Current configuration
    pub fn config(&self) -> ApmConfig {
        self.config
    }

    /// Name of the post-processing stage
    pub fn stage_name(&self) -> String {
        self.capture_post_processing.name()
    }

    /// Run capture processing, reinitialising the stage on format changes
    pub fn process_capture(&mut self, audio: &mut AudioBuffer) -> MediaResult<()> {
        if audio.sample_rate_hz() == 0 {
            return Err(MediaError::Audio {
                message: "sample rate must be positive".to_string(),
            });
        }
        let format = (audio.sample_rate_hz(), audio.num_channels());
        if self.format != Some(format) {
            tracing::debug!(
                stage = %self.capture_post_processing.name(),
                sample_rate_hz = format.0,
                num_channels = format.1,
                "Initializing capture post-processing"
            );
            self.capture_post_processing.initialize(format.0, format.1);
            self.format = Some(format);
        }
        self.capture_post_processing.process(audio);
        Ok(())
    }

    /// Forward a runtime setting to the stage
    pub fn set_runtime_setting(&mut self, setting: RuntimeSetting) {
        self.capture_post_processing.set_runtime_setting(setting);
    }
}
