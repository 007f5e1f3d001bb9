//! Small XML text helpers shared across the crate.

use std::borrow::Cow;

use quick_xml::events::BytesStart;

use crate::error::{Error, Result};

/// Re-quote an attribute value that is still in its raw (entity-escaped)
/// input form. Raw values only need `"` handled, since entities in them are
/// passed through untouched; `quick_xml::escape` would escape their `&` a
/// second time.
pub(crate) fn requote_attr(s: &str) -> Cow<'_, str> {
    if !s.contains('"') {
        return Cow::Borrowed(s);
    }
    Cow::Owned(s.replace('"', "&quot;"))
}

/// Collect a tag's attributes as `(name, raw value)` pairs. Values keep
/// their input form, entity references and all, so they can be echoed
/// byte for byte later.
pub(crate) fn attributes_of(
    e: &BytesStart<'_>,
    path: &str,
    line: usize,
    col: usize,
) -> Result<Vec<(String, String)>> {
    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| Error::Syntax {
            path: path.to_string(),
            line,
            col,
            message: err.to_string(),
        })?;
        attributes.push((
            String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
            String::from_utf8_lossy(&attr.value).into_owned(),
        ));
    }
    Ok(attributes)
}

/// Running 1-based line and column over one document.
///
/// Byte offsets normally arrive in increasing order, one per parser event,
/// so each byte is counted once across a whole scan. Columns count
/// characters, not bytes.
#[derive(Debug)]
pub(crate) struct LineCounter<'a> {
    text: &'a str,
    offset: usize,
    line: usize,
    col: usize,
}

impl<'a> LineCounter<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self {
            text,
            offset: 0,
            line: 1,
            col: 1,
        }
    }

    /// Line and column of `offset`, clamped to the end of the text.
    pub(crate) fn locate(&mut self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.text.len());
        if offset < self.offset {
            // A backwards request restarts the count.
            self.offset = 0;
            self.line = 1;
            self.col = 1;
        }
        for ch in self.text[self.offset..offset].chars() {
            if ch == '\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
        }
        self.offset = offset;
        (self.line, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requote_attr_leaves_entities_alone() {
        assert_eq!(requote_attr("a &amp; b"), "a &amp; b");
        assert_eq!(requote_attr(r#"a "b" c"#), "a &quot;b&quot; c");
    }

    #[test]
    fn locate_counts_from_one() {
        let mut counter = LineCounter::new("ab\ncde\nf");
        assert_eq!(counter.locate(0), (1, 1));
        assert_eq!(counter.locate(1), (1, 2));
        assert_eq!(counter.locate(3), (2, 1));
        assert_eq!(counter.locate(7), (3, 1));
    }

    #[test]
    fn locate_repeats_and_clamps() {
        let mut counter = LineCounter::new("ab\ncd");
        assert_eq!(counter.locate(3), (2, 1));
        assert_eq!(counter.locate(3), (2, 1));
        assert_eq!(counter.locate(100), (2, 3));
    }

    #[test]
    fn locate_counts_characters_not_bytes() {
        let mut counter = LineCounter::new("é<b>");
        assert_eq!(counter.locate(2), (1, 2));
    }

    #[test]
    fn locate_recounts_after_a_backwards_request() {
        let mut counter = LineCounter::new("a\nb");
        assert_eq!(counter.locate(2), (2, 1));
        assert_eq!(counter.locate(0), (1, 1));
    }
}
