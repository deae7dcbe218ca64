//! Tests for RawMessage

use crate::message::RawMessage;

#[test]
fn test_new_trims_whitespace() {
    let msg = RawMessage::new("  hello world \t");
    assert_eq!(msg.as_str(), "hello world");
}

#[test]
fn test_from_line_strips_lf() {
    let msg = RawMessage::from_line(b"hello\n");
    assert_eq!(msg.as_str(), "hello");
}

#[test]
fn test_from_line_strips_crlf() {
    let msg = RawMessage::from_line(b"<134>Dec 20 12:34:56 host app: started\r\n");
    assert_eq!(msg.as_str(), "<134>Dec 20 12:34:56 host app: started");
}

#[test]
fn test_from_line_empty() {
    let msg = RawMessage::from_line(b"\n");
    assert!(msg.is_empty());
    assert_eq!(msg.len(), 0);
    assert_eq!(msg.as_str(), "");
}

#[test]
fn test_from_line_whitespace_only() {
    let msg = RawMessage::from_line(b"   \t \r\n");
    assert!(msg.is_empty());
}

#[test]
fn test_from_line_keeps_inner_whitespace() {
    let msg = RawMessage::from_line(b"a  b\tc\n");
    assert_eq!(msg.as_str(), "a  b\tc");
}

#[test]
fn test_from_line_invalid_utf8_is_replaced() {
    let msg = RawMessage::from_line(&[b'o', b'k', 0xff, b'\n']);
    assert_eq!(msg.as_str(), "ok\u{fffd}");
}

#[test]
fn test_display_and_into_string() {
    let msg = RawMessage::new("text");
    assert_eq!(msg.to_string(), "text");
    assert_eq!(msg.into_string(), "text");
}
