//! Character encoding detection and transcoding.
//!
//! Input documents and dictionaries are read as bytes and normalized to
//! UTF-8 before parsing. The charset comes from a byte-order mark, an XML
//! declaration, or an HTML `<meta>` charset hint, in that order; anything
//! undeclared is treated as UTF-8.

use std::sync::LazyLock;

use encoding_rs::{Encoding, UTF_8};
use regex::Regex;

/// Match the `encoding` pseudo-attribute of an XML declaration.
#[allow(clippy::expect_used)]
static XML_DECL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<\?xml[^>]*\bencoding\s*=\s*["']([^"']+)["']"#).expect("valid regex")
});

/// Match `<meta charset="...">`.
#[allow(clippy::expect_used)]
static META_CHARSET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?([^"'\s>]+)"#).expect("valid regex")
});

/// Match `<meta http-equiv="Content-Type" content="...; charset=...">`.
#[allow(clippy::expect_used)]
static HTTP_EQUIV_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)<meta[^>]+http-equiv\s*=\s*["']?content-type["']?[^>]+content\s*=\s*["']?[^"'>]*;\s*charset\s*=\s*([^"'\s>]+)"#,
    )
    .expect("valid regex")
});

/// Detect the character encoding of a document.
///
/// A byte-order mark wins outright. Otherwise only the first 1024 bytes
/// are searched for an XML declaration or a `<meta>` charset hint, and
/// UTF-8 is the fallback.
pub(crate) fn detect_encoding(bytes: &[u8]) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return encoding;
    }

    let head = &bytes[..bytes.len().min(1024)];
    let head = String::from_utf8_lossy(head);

    for re in [&*XML_DECL_RE, &*META_CHARSET_RE, &*HTTP_EQUIV_RE] {
        let label = re
            .captures(&head)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str());
        if let Some(label) = label {
            if let Some(encoding) = Encoding::for_label(label.as_bytes()) {
                return encoding;
            }
        }
    }

    UTF_8
}

/// Transcode raw document bytes to a UTF-8 string.
///
/// Malformed sequences become the replacement character rather than an
/// error; a leading byte-order mark is removed.
pub(crate) fn transcode(bytes: &[u8]) -> String {
    let encoding = detect_encoding(bytes);
    let (text, _, _) = encoding.decode(bytes);
    text.into_owned()
}
