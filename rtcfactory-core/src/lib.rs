//! # rtcfactory Core
//!
//! Shared building blocks for the rtcfactory crates: the core error type
//! and the opaque handle used to refer to native resources.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod handle;

// Re-export main types
pub use error::{FactoryResult, RtcFactoryError};
pub use handle::NativeHandle;
