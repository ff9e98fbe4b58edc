//! # Error Tests
//!
//! Error messages name the offending stream, field and index.

use cyclebench_core::common::{CodecError, ConfigError, HarnessError};

#[test]
fn test_codec_error_converts_into_harness_error() {
    let codec = CodecError::WidthMismatch {
        field: "a".to_string(),
        width: 4,
        value: "16".to_string(),
    };
    let harness: HarnessError = codec.clone().into();
    assert_eq!(harness, HarnessError::Codec(codec));
    assert_eq!(harness.to_string(), "value 16 of field `a` does not fit in 4 bits");
}

#[test]
fn test_mismatch_messages_name_stream_and_index() {
    let err = HarnessError::DataMismatch {
        stream: "cmd".to_string(),
        index: 2,
        expected: "word { a: 1 }".to_string(),
        actual: "word { a: 2 }".to_string(),
    };
    let message = err.to_string();
    assert!(message.contains("`cmd`"));
    assert!(message.contains("index 2"));
    assert!(message.contains("word { a: 2 }"));
}

#[test]
fn test_timeout_lists_pending_streams() {
    let err = HarnessError::Timeout {
        cycles: 50,
        pending: vec![("out".to_string(), 3)],
    };
    let message = err.to_string();
    assert!(message.starts_with("timed out after 50 cycles"));
    assert!(message.contains("\"out\""));
}

#[test]
fn test_config_error_wraps_harness_error() {
    let err: ConfigError = HarnessError::InvalidConfig("bad".to_string()).into();
    assert_eq!(err.to_string(), "invalid configuration: bad");
}
