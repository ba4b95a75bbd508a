//! Compile-time checks that shared core types can cross thread boundaries.

use uigen_core::{EphemeralRef, Error, Location, PreviewConfig, SyntaxError};

fn assert_send<T: Send>() {}
fn assert_sync<T: Sync>() {}

#[test]
fn test_error_is_send_sync() {
    assert_send::<Error>();
    assert_sync::<Error>();
}

#[test]
fn test_diagnostics_are_send_sync() {
    assert_send::<SyntaxError>();
    assert_sync::<SyntaxError>();
    assert_send::<Location>();
    assert_sync::<Location>();
}

#[test]
fn test_config_is_send_sync() {
    assert_send::<PreviewConfig>();
    assert_sync::<PreviewConfig>();
}

#[test]
fn test_ephemeral_ref_is_send_sync() {
    assert_send::<EphemeralRef>();
    assert_sync::<EphemeralRef>();
}
