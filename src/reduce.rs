//! Fragment reduction and serialization.
//!
//! A translatable region often wraps its real content in layers of
//! single-child wrapper elements plus incidental whitespace, for example
//! `<p> <b>Hello</b> </p>`. Reduction descends through those layers to the
//! innermost content worth sending to the dictionary, then serializes it to
//! the wire form used as the dictionary key.
//!
//! On the wire, inline elements are replaced by numbered placeholder
//! markers so translators never see (or break) document attributes:
//! `<g id="n">…</g>` for elements with content, `<x id="n"/>` for void
//! ones. Text is entity-escaped; the merge side resolves markers back to
//! the original elements by number.

use quick_xml::escape::partial_escape;

use crate::fragment::{FragmentKind, FragmentSequence, NodeId};
use crate::xml_utils::requote_attr;

/// Serialization mode for fragment trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Wire {
    /// Document side: every inline element becomes a placeholder marker.
    Document,
    /// Dictionary side: `g`/`x` elements carrying an `id` attribute are
    /// rewritten to canonical marker form, everything else stays literal.
    Entry,
}

/// Where the descent stopped at one level of the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Level {
    /// Nothing translatable here: every child is whitespace-only text or a
    /// childless element.
    EmptyCore,
    /// Exactly one child subtree carries all the content.
    Wrapper(NodeId),
    /// The content spans child indices `first..=last`; children outside
    /// the span are decoration left in place.
    Span { first: usize, last: usize },
}

/// Whitespace-only text nodes and childless elements are decoration that
/// never carries translatable content on its own.
fn is_reducible(seq: &FragmentSequence, id: NodeId) -> bool {
    match &seq.node(id).kind {
        FragmentKind::Text {
            has_nonwhitespace, ..
        } => !has_nonwhitespace,
        FragmentKind::Element { .. } => seq.children(id).is_empty(),
        FragmentKind::Root => false,
    }
}

pub(crate) fn classify(seq: &FragmentSequence, node: NodeId) -> Level {
    let children = seq.children(node);
    let mut first = None;
    let mut last = 0;
    let mut count = 0usize;

    for (i, &child) in children.iter().enumerate() {
        if is_reducible(seq, child) {
            continue;
        }
        count += 1;
        if first.is_none() {
            first = Some(i);
        }
        last = i;
    }

    let Some(first) = first else {
        return Level::EmptyCore;
    };

    if count == 1 {
        if let FragmentKind::Element { .. } = seq.node(children[first]).kind {
            return Level::Wrapper(children[first]);
        }
    }
    Level::Span { first, last }
}

/// Reduce a document-side fragment to its dictionary phrase.
///
/// Returns the wire string with leading and trailing whitespace trimmed,
/// plus a flag set when the descent moved below the region root, or `None`
/// when the region holds nothing translatable. In space-preserving regions
/// the interior whitespace was stored verbatim and survives here; only the
/// boundary whitespace comes off, and the merge side restores it.
pub(crate) fn reduce_document(seq: &FragmentSequence) -> Option<(String, bool)> {
    let mut node = seq.root()?;
    let mut reduced = false;

    let (first, last) = loop {
        match classify(seq, node) {
            Level::EmptyCore => return None,
            Level::Wrapper(inner) => {
                node = inner;
                reduced = true;
            }
            Level::Span { first, last } => break (first, last),
        }
    };

    let body = wire_span(seq, node, first, last, Wire::Document);
    let phrase = body.trim_ascii();
    if phrase.is_empty() {
        None
    } else {
        Some((phrase.to_string(), reduced))
    }
}

/// Flatten the content of a dictionary `<source>` or `<target>` element.
///
/// No descent happens here; entries already hold reduced phrases. Marker
/// elements are canonicalized, boundary whitespace is trimmed, interior
/// whitespace is kept as written.
pub(crate) fn flatten_entry(seq: &FragmentSequence) -> Option<String> {
    let root = seq.root()?;
    let children = seq.children(root);
    if children.is_empty() {
        return None;
    }

    let body = wire_span(seq, root, 0, children.len() - 1, Wire::Entry);
    let phrase = body.trim_ascii();
    if phrase.is_empty() {
        None
    } else {
        Some(phrase.to_string())
    }
}

/// Serialize children `first..=last` of `node` in the given wire mode.
pub(crate) fn wire_span(
    seq: &FragmentSequence,
    node: NodeId,
    first: usize,
    last: usize,
    mode: Wire,
) -> String {
    let mut out = String::new();
    for &child in &seq.children(node)[first..=last] {
        wire_node(seq, child, mode, &mut out);
    }
    out
}

fn wire_node(seq: &FragmentSequence, id: NodeId, mode: Wire, out: &mut String) {
    match &seq.node(id).kind {
        FragmentKind::Root => {
            for &child in seq.children(id) {
                wire_node(seq, child, mode, out);
            }
        }
        FragmentKind::Text { value, .. } => out.push_str(&partial_escape(value)),
        FragmentKind::Element {
            name,
            attributes,
            closed,
            is_void,
            id: wire,
        } => match mode {
            Wire::Document => {
                if *is_void {
                    out.push_str(&format!("<x id=\"{wire}\"/>"));
                } else {
                    out.push_str(&format!("<g id=\"{wire}\">"));
                    for &child in seq.children(id) {
                        wire_node(seq, child, mode, out);
                    }
                    out.push_str("</g>");
                }
            }
            Wire::Entry => {
                if let Some(marker) = marker_id(name, attributes) {
                    if name == "x" {
                        out.push_str(&format!("<x id=\"{marker}\"/>"));
                        for &child in seq.children(id) {
                            wire_node(seq, child, mode, out);
                        }
                    } else {
                        out.push_str(&format!("<g id=\"{marker}\">"));
                        for &child in seq.children(id) {
                            wire_node(seq, child, mode, out);
                        }
                        out.push_str("</g>");
                    }
                } else {
                    push_open_tag(out, name, attributes, *is_void);
                    if !is_void {
                        for &child in seq.children(id) {
                            wire_node(seq, child, mode, out);
                        }
                        if *closed {
                            out.push_str(&format!("</{name}>"));
                        }
                    }
                }
            }
        },
    }
}

/// Placeholder marker number of a dictionary-side `g`/`x` element.
pub(crate) fn marker_id(name: &str, attributes: &[(String, String)]) -> Option<u32> {
    if name != "g" && name != "x" {
        return None;
    }
    attributes
        .iter()
        .find(|(key, _)| key == "id")
        .and_then(|(_, value)| value.trim().parse().ok())
}

/// Serialize a node as literal markup: real tag names, attributes as
/// written (re-quoted for double-quote delimiters), escaped text.
pub(crate) fn markup_node(seq: &FragmentSequence, id: NodeId, out: &mut String) {
    match &seq.node(id).kind {
        FragmentKind::Root => {
            for &child in seq.children(id) {
                markup_node(seq, child, out);
            }
        }
        FragmentKind::Text { value, .. } => out.push_str(&partial_escape(value)),
        FragmentKind::Element {
            name,
            attributes,
            closed,
            is_void,
            ..
        } => {
            push_open_tag(out, name, attributes, *is_void);
            if !is_void {
                for &child in seq.children(id) {
                    markup_node(seq, child, out);
                }
                if *closed {
                    out.push_str(&format!("</{name}>"));
                }
            }
        }
    }
}

/// Literal markup of children `range` of `node`.
pub(crate) fn markup_span(
    seq: &FragmentSequence,
    node: NodeId,
    range: std::ops::Range<usize>,
) -> String {
    let mut out = String::new();
    for &child in &seq.children(node)[range] {
        markup_node(seq, child, &mut out);
    }
    out
}

pub(crate) fn push_open_tag(
    out: &mut String,
    name: &str,
    attributes: &[(String, String)],
    self_closing: bool,
) {
    out.push('<');
    out.push_str(name);
    for (key, value) in attributes {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&requote_attr(value));
        out.push('"');
    }
    if self_closing {
        out.push_str("/>");
    } else {
        out.push('>');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(seq: &mut FragmentSequence, s: &str) {
        seq.text(s, false, s).unwrap();
    }

    #[test]
    fn reduction_descends_through_wrappers() {
        // <p> <b>Hello</b> </p>
        let mut seq = FragmentSequence::new();
        text(&mut seq, " ");
        seq.start("b", Vec::new(), false, "<b>").unwrap();
        text(&mut seq, "Hello");
        seq.end("b", "</b>").unwrap();
        text(&mut seq, " ");

        assert_eq!(reduce_document(&seq), Some(("Hello".to_string(), true)));
    }

    #[test]
    fn bare_text_is_trimmed() {
        let mut seq = FragmentSequence::new();
        text(&mut seq, "  Hello, world!  ");

        assert_eq!(
            reduce_document(&seq),
            Some(("Hello, world!".to_string(), false))
        );
    }

    #[test]
    fn whitespace_only_region_reduces_to_nothing() {
        let mut seq = FragmentSequence::new();
        text(&mut seq, " \n\t ");

        assert_eq!(reduce_document(&seq), None);
    }

    #[test]
    fn void_decoration_reduces_to_nothing() {
        // <p> <img/> </p>
        let mut seq = FragmentSequence::new();
        text(&mut seq, " ");
        seq.start("img", Vec::new(), true, "<img/>").unwrap();
        seq.end("img", "").unwrap();
        text(&mut seq, " ");

        assert_eq!(reduce_document(&seq), None);
    }

    #[test]
    fn empty_wrapper_reduces_to_nothing() {
        // <p> <b> </b> </p>
        let mut seq = FragmentSequence::new();
        text(&mut seq, " ");
        seq.start("b", Vec::new(), false, "<b>").unwrap();
        text(&mut seq, " ");
        seq.end("b", "</b>").unwrap();
        text(&mut seq, " ");

        assert_eq!(reduce_document(&seq), None);
    }

    #[test]
    fn mixed_content_uses_placeholder_markers() {
        // <p>Hello <b class="x">world</b>!</p>
        let mut seq = FragmentSequence::new();
        text(&mut seq, "Hello ");
        seq.start(
            "b",
            vec![("class".to_string(), "x".to_string())],
            false,
            "<b class=\"x\">",
        )
        .unwrap();
        text(&mut seq, "world");
        seq.end("b", "</b>").unwrap();
        text(&mut seq, "!");

        assert_eq!(
            reduce_document(&seq),
            Some(("Hello <g id=\"1\">world</g>!".to_string(), false))
        );
    }

    #[test]
    fn interior_void_becomes_x_marker() {
        // <p>line<br/>break</p>
        let mut seq = FragmentSequence::new();
        text(&mut seq, "line");
        seq.start("br", Vec::new(), true, "<br/>").unwrap();
        seq.end("br", "").unwrap();
        text(&mut seq, "break");

        assert_eq!(
            reduce_document(&seq),
            Some(("line<x id=\"1\"/>break".to_string(), false))
        );
    }

    #[test]
    fn edge_decoration_is_dropped_from_the_phrase() {
        // <p><b></b>Hello</p>
        let mut seq = FragmentSequence::new();
        seq.start("b", Vec::new(), false, "<b>").unwrap();
        seq.end("b", "</b>").unwrap();
        text(&mut seq, "Hello");

        assert_eq!(reduce_document(&seq), Some(("Hello".to_string(), false)));
    }

    #[test]
    fn text_is_entity_escaped_on_the_wire() {
        let mut seq = FragmentSequence::new();
        text(&mut seq, "A & B < C");

        assert_eq!(
            reduce_document(&seq),
            Some(("A &amp; B &lt; C".to_string(), false))
        );
    }

    #[test]
    fn nested_markers_number_in_document_order() {
        // <p><b>a<i>b</i></b>c</p>
        let mut seq = FragmentSequence::new();
        seq.start("b", Vec::new(), false, "<b>").unwrap();
        text(&mut seq, "a");
        seq.start("i", Vec::new(), false, "<i>").unwrap();
        text(&mut seq, "b");
        seq.end("i", "</i>").unwrap();
        seq.end("b", "</b>").unwrap();
        text(&mut seq, "c");

        assert_eq!(
            reduce_document(&seq),
            Some((
                "<g id=\"1\">a<g id=\"2\">b</g></g>c".to_string(),
                false
            ))
        );
    }

    #[test]
    fn entry_markers_are_canonicalized() {
        let mut seq = FragmentSequence::new();
        text(&mut seq, "Hello ");
        seq.start(
            "g",
            vec![("id".to_string(), "7".to_string())],
            false,
            "<g id='7'>",
        )
        .unwrap();
        text(&mut seq, "world");
        seq.end("g", "</g>").unwrap();

        assert_eq!(
            flatten_entry(&seq),
            Some("Hello <g id=\"7\">world</g>".to_string())
        );
    }

    #[test]
    fn entry_keeps_foreign_elements_literal() {
        let mut seq = FragmentSequence::new();
        seq.start(
            "b",
            vec![("class".to_string(), "x".to_string())],
            false,
            "<b class=\"x\">",
        )
        .unwrap();
        text(&mut seq, "bold");
        seq.end("b", "</b>").unwrap();

        assert_eq!(
            flatten_entry(&seq),
            Some("<b class=\"x\">bold</b>".to_string())
        );
    }

    #[test]
    fn entry_void_marker_round_trips() {
        let mut seq = FragmentSequence::new();
        text(&mut seq, "a");
        seq.start(
            "x",
            vec![("id".to_string(), "2".to_string())],
            true,
            "<x id=\"2\"/>",
        )
        .unwrap();
        seq.end("x", "").unwrap();
        text(&mut seq, "b");

        assert_eq!(flatten_entry(&seq), Some("a<x id=\"2\"/>b".to_string()));
    }

    #[test]
    fn preserve_mode_keeps_interior_whitespace() {
        let mut seq = FragmentSequence::new();
        seq.text("  fn main()  {\n}  ", true, "  fn main()  {\n}  ")
            .unwrap();

        assert_eq!(
            reduce_document(&seq),
            Some(("fn main()  {\n}".to_string(), false))
        );
    }
}
