//! Tests for Tag type

use crate::tag::Tag;

#[test]
fn test_tag_default_is_syslog() {
    assert_eq!(Tag::default().as_str(), "syslog");
}

#[test]
fn test_tag_from_str_and_string() {
    assert_eq!(Tag::from("app.logs").as_str(), "app.logs");
    assert_eq!(Tag::from(String::from("kern")).as_str(), "kern");
}

#[test]
fn test_tag_display() {
    assert_eq!(format!("{}", Tag::new("syslog")), "syslog");
}

#[test]
fn test_tag_serializes_as_plain_string() {
    let json = serde_json::to_string(&Tag::new("syslog")).unwrap();
    assert_eq!(json, "\"syslog\"");
}
