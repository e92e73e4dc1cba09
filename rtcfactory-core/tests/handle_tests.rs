//! Integration tests for core types

use rtcfactory_core::{NativeHandle, RtcFactoryError};
use std::collections::HashMap;

// ============================================================================
// NATIVE HANDLE TESTS
// ============================================================================

#[test]
fn test_handle_serializes_as_raw_id() {
    let handle = NativeHandle::from_raw(0xCAFE).unwrap();
    assert_eq!(serde_json::to_string(&handle).unwrap(), "51966");

    let parsed: NativeHandle = serde_json::from_str("51966").unwrap();
    assert_eq!(parsed, handle);
}

#[test]
fn test_zero_handle_does_not_deserialize() {
    assert!(serde_json::from_str::<NativeHandle>("0").is_err());
}

#[test]
fn test_handles_key_native_tables() {
    let mut table = HashMap::new();
    let a = NativeHandle::from_raw(1).unwrap();
    let b = NativeHandle::from_raw(2).unwrap();
    table.insert(a, "apm");
    table.insert(b, "processor");

    // Copies refer to the same entry; the table owns the resource.
    let copy = a;
    assert_eq!(table.remove(&copy), Some("apm"));
    assert!(!table.contains_key(&a));
    assert_eq!(table.len(), 1);
}

// ============================================================================
// ERROR TESTS
// ============================================================================

#[test]
fn test_unknown_handle_error_names_handle() {
    let err = RtcFactoryError::UnknownHandle {
        handle: NativeHandle::from_raw(255).unwrap(),
    };
    assert_eq!(err.to_string(), "Unknown native handle: 0xff");
    assert!(!err.is_invalid_argument());
}
