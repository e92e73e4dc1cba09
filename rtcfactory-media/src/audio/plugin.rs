//! External processor plugins
//!
//! A plugin is a shared library exporting four C functions:
//!
//! ```text
//! bool ExternalProcessorCreate(void);
//! bool ExternalProcessorDestroy(void);
//! bool ExternalProcessorInitialize(int sample_rate_hz, int num_channels);
//! bool ExternalProcessorProcessFrame(float* const* channels, size_t num_frames,
//!                                    size_t num_bands, size_t num_channels);
//! ```
//!
//! Load failures map onto the loader status codes below.

use libloading::Library;
use std::os::raw::c_int;
use thiserror::Error;

/// Plugin loaded and created
pub const LOAD_SUCCESS: i32 = 0;
/// The shared library could not be opened
pub const ERROR_LOADING_LIBRARY: i32 = -1;
/// A required symbol other than destroy is missing
pub const ERROR_LOADING_CREATE_INSTANCE: i32 = -2;
/// The destroy symbol is missing
pub const ERROR_LOADING_DESTROY_INSTANCE: i32 = -3;
/// The create call returned false
pub const ERROR_CREATING_INSTANCE: i32 = -4;

/// Create symbol name
pub const CREATE_SYMBOL: &str = "ExternalProcessorCreate";
/// Destroy symbol name
pub const DESTROY_SYMBOL: &str = "ExternalProcessorDestroy";
/// Initialize symbol name
pub const INITIALIZE_SYMBOL: &str = "ExternalProcessorInitialize";
/// Process symbol name
pub const PROCESS_FRAME_SYMBOL: &str = "ExternalProcessorProcessFrame";

type CreateFn = unsafe extern "C" fn() -> bool;
type DestroyFn = unsafe extern "C" fn() -> bool;
type InitializeFn = unsafe extern "C" fn(c_int, c_int) -> bool;
type ProcessFrameFn = unsafe extern "C" fn(*const *mut f32, usize, usize, usize) -> bool;

/// Plugin loading errors
#[derive(Error, Debug)]
pub enum PluginError {
    /// Library could not be opened
    #[error("Failed to load library {path}: {reason}")]
    LoadLibrary {
        /// Library path or name
        path: String,
        /// Loader message
        reason: String,
    },

    /// A required function is not exported
    #[error("Missing symbol {symbol}: {reason}")]
    MissingSymbol {
        /// Symbol name
        symbol: &'static str,
        /// Loader message
        reason: String,
    },

    /// The plugin refused to create its instance
    #[error("ExternalProcessorCreate failed in {path}")]
    CreateFailed {
        /// Library path or name
        path: String,
    },
}

impl PluginError {
    /// Loader status code for this failure
    pub fn code(&self) -> i32 {
        match self {
            PluginError::LoadLibrary { .. } => ERROR_LOADING_LIBRARY,
            PluginError::MissingSymbol { symbol, .. } if *symbol == DESTROY_SYMBOL => {
                ERROR_LOADING_DESTROY_INSTANCE
            }
            PluginError::MissingSymbol { .. } => ERROR_LOADING_CREATE_INSTANCE,
            PluginError::CreateFailed { .. } => ERROR_CREATING_INSTANCE,
        }
    }
}

/// A loaded and created external processor
pub struct ProcessorPlugin {
    path: String,
    destroy: DestroyFn,
    initialize: InitializeFn,
    process_frame: ProcessFrameFn,
    // Keeps the function pointers above valid.
    _library: Library,
}

impl std::fmt::Debug for ProcessorPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessorPlugin").field("path", &self.path).finish()
    }
}

fn symbol<T: Copy>(library: &Library, name: &'static str) -> Result<T, PluginError> {
    // SAFETY: `T` is one of the function pointer types above, matching the
    // plugin ABI. The pointer is only used while `library` is alive.
    let symbol = unsafe { library.get::<T>(name.as_bytes()) }.map_err(|e| PluginError::MissingSymbol {
        symbol: name,
        reason: e.to_string(),
    })?;
    Ok(*symbol)
}

impl ProcessorPlugin {
    /// Open `path`, resolve the processor ABI and create the instance
    pub fn load(path: &str) -> Result<Self, PluginError> {
        tracing::info!(library = path, "Loading external processor");

        // SAFETY: loading runs the library's initialisers; plugins are
        // trusted code supplied by the application.
        let library = unsafe { Library::new(path) }.map_err(|e| PluginError::LoadLibrary {
            path: path.to_string(),
            reason: e.to_string(),
        })?;

        let create: CreateFn = symbol(&library, CREATE_SYMBOL)?;
        let destroy: DestroyFn = symbol(&library, DESTROY_SYMBOL)?;
        let initialize: InitializeFn = symbol(&library, INITIALIZE_SYMBOL)?;
        let process_frame: ProcessFrameFn = symbol(&library, PROCESS_FRAME_SYMBOL)?;

        // SAFETY: resolved from the library with the ABI signature.
        if !unsafe { create() } {
            return Err(PluginError::CreateFailed {
                path: path.to_string(),
            });
        }

        tracing::debug!(library = path, "External processor created");
        Ok(Self {
            path: path.to_string(),
            destroy,
            initialize,
            process_frame,
            _library: library,
        })
    }

    /// Library path this plugin was loaded from
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Configure the processor for a stream format
    pub fn initialize(&self, sample_rate_hz: u32, num_channels: usize) -> bool {
        let (Ok(rate), Ok(channels)) = (c_int::try_from(sample_rate_hz), c_int::try_from(num_channels))
        else {
            return false;
        };
        // SAFETY: resolved from the live library with the ABI signature.
        unsafe { (self.initialize)(rate, channels) }
    }

    /// Process one frame in place; every channel must hold at least `num_frames` samples
    pub fn process_frame(&self, channels: &mut [Vec<f32>], num_frames: usize, num_bands: usize) -> bool {
        if channels.iter().any(|channel| channel.len() < num_frames) {
            return false;
        }
        let pointers: Vec<*mut f32> = channels.iter_mut().map(|c| c.as_mut_ptr()).collect();
        // SAFETY: each pointer addresses `num_frames` valid samples and the
        // buffers outlive the call.
        unsafe { (self.process_frame)(pointers.as_ptr(), num_frames, num_bands, pointers.len()) }
    }
}

impl Drop for ProcessorPlugin {
    fn drop(&mut self) {
        // SAFETY: the library is still loaded; it is dropped after this.
        if unsafe { (self.destroy)() } {
            tracing::debug!(library = %self.path, "External processor destroyed");
        } else {
            tracing::warn!(library = %self.path, "ExternalProcessorDestroy returned false");
        }
    }
}
