//! Sort field and duplicate-check checksum.
//!
//! Both values are derived from a note's first field and are what the
//! `ix_notes_csum` index is built over.

use sha1::{Digest, Sha1};

use crate::text::strip_html_media;

/// Sort key for a raw field value.
pub fn sort_field(raw: &str) -> String {
    strip_html_media(raw)
}

/// Lowercase hex SHA-1 of `text`.
pub fn content_hash(text: &str) -> String {
    hex::encode(Sha1::digest(text.as_bytes()))
}

/// First 8 hex digits of the SHA-1 of `sort_field`, as an integer.
pub fn field_checksum(sort_field: &str) -> i64 {
    let hash = content_hash(sort_field);
    // A SHA-1 hex digest is always 40 ASCII hex digits.
    i64::from_str_radix(&hash[..8], 16).unwrap_or_default()
}

/// Sort field and checksum for a note's first field.
pub fn fingerprint(first_field: &str) -> (String, i64) {
    let sfld = sort_field(first_field);
    let csum = field_checksum(&sfld);
    (sfld, csum)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash_known_value() {
        assert_eq!(
            content_hash("abc"),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
    }

    #[test]
    fn test_field_checksum_uses_first_eight_digits() {
        assert_eq!(field_checksum("abc"), 0xa9993e36);
    }

    #[test]
    fn test_fingerprint_strips_markup() {
        let (sfld, csum) = fingerprint("Hello<b>World</b>");
        assert_eq!(sfld, "HelloWorld");
        assert_eq!(csum, i64::from_str_radix(&content_hash("HelloWorld")[..8], 16).unwrap());
    }

    #[test]
    fn test_same_visible_text_same_checksum() {
        assert_eq!(fingerprint("<i>cat</i>").1, fingerprint("cat").1);
        assert_ne!(fingerprint("cat").1, fingerprint("dog").1);
    }

    #[test]
    fn test_named_entities_match_literal_text() {
        let (sfld, csum) = fingerprint("caf&eacute;");
        assert_eq!(sfld, "caf\u{e9}");
        assert_eq!(csum, fingerprint("caf\u{e9}").1);
    }
}
