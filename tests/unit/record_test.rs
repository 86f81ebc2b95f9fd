//! Tests for response records

use service_poller::core::{ParseError, ResponseRecord};

#[test]
fn test_any_json_document_is_accepted() {
    for body in [r#"{"status":"ok"}"#, "[1,2,3]", "\"up\"", "42", "null"] {
        assert!(ResponseRecord::parse(body.as_bytes()).is_ok(), "{body}");
    }
}

#[test]
fn test_malformed_bodies_are_rejected() {
    for body in ["", "<html>", "{\"a\":", "{} {}"] {
        let err = ResponseRecord::parse(body.as_bytes()).unwrap_err();
        assert!(matches!(err, ParseError::MalformedJson(_)), "{body}");
    }
}

#[test]
fn test_nested_values_survive() {
    let record = ResponseRecord::parse(br#"{"z":{"b":[1,{"c":null}]},"a":true}"#).unwrap();
    assert_eq!(
        serde_json::to_string(record.value()).unwrap(),
        r#"{"z":{"b":[1,{"c":null}]},"a":true}"#
    );
}
