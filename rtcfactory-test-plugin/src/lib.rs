//! Half-gain external processor
//!
//! Exports the four `ExternalProcessor*` entry points and scales every sample
//! by [`GAIN`]. Built as a shared library so the media tests can load it the
//! way applications load real processors.

#![warn(clippy::all)]
#![allow(non_snake_case)]

use std::os::raw::c_int;

/// Gain applied to every processed sample
pub const GAIN: f32 = 0.5;

/// Create the processor instance
#[no_mangle]
pub extern "C" fn ExternalProcessorCreate() -> bool {
    true
}

/// Destroy the processor instance
#[no_mangle]
pub extern "C" fn ExternalProcessorDestroy() -> bool {
    true
}

/// Configure for a stream format; rejects non-positive values
#[no_mangle]
pub extern "C" fn ExternalProcessorInitialize(sample_rate_hz: c_int, num_channels: c_int) -> bool {
    sample_rate_hz > 0 && num_channels > 0
}

/// Scale one frame in place
///
/// # Safety
///
/// `channels` must point to `num_channels` pointers, each addressing
/// `num_frames` writable samples.
#[no_mangle]
pub unsafe extern "C" fn ExternalProcessorProcessFrame(
    channels: *const *mut f32,
    num_frames: usize,
    num_bands: usize,
    num_channels: usize,
) -> bool {
    if channels.is_null() || num_bands == 0 {
        return false;
    }
    for index in 0..num_channels {
        let samples = std::slice::from_raw_parts_mut(*channels.add(index), num_frames);
        samples.iter_mut().for_each(|s| *s *= GAIN);
    }
    true
}
