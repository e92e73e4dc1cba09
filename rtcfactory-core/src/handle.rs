//! Opaque native handles
//!
//! A [`NativeHandle`] identifies a resource that lives on the native side
//! (an audio processing module, a registered external processor). The
//! factory layer only borrows and forwards these ids: it never frees the
//! resource behind one. The native side owns the resource and decides when
//! it goes away; once it does, the handle simply stops resolving.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU64;

/// Non-owning, non-zero identifier of a native resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NativeHandle(NonZeroU64);

impl NativeHandle {
    /// Wrap a raw native id. Zero is the native "no resource" value.
    pub fn from_raw(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Self)
    }

    /// Raw id for passing back across the native boundary
    pub fn as_raw(self) -> u64 {
        self.0.get()
    }
}

impl From<NonZeroU64> for NativeHandle {
    fn from(raw: NonZeroU64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for NativeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0.get())
    }
}
