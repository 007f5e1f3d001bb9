//! Translation merge back into document structure.
//!
//! The merger replays the same descent the reducer used, so it lands on
//! the node whose serialization produced the dictionary key. Decoration
//! outside the content span (wrapper tags, whitespace, childless markup)
//! is printed as-is; the span itself is replaced by the target rendering,
//! re-padded with the boundary whitespace the reducer trimmed off.
//!
//! Placeholder markers in the target are resolved by number against the
//! document-side elements, so translators can reorder inline markup and
//! the original tag names and attributes still come out.

use std::io::{self, Write};

use quick_xml::escape::partial_escape;

use crate::fragment::{FragmentKind, FragmentSequence, NodeId};
use crate::reduce::{classify, marker_id, markup_span, push_open_tag, wire_span, Level, Wire};

/// Print `doc` with the region that reduced to `source` replaced by
/// `target`. Returns false when the replay no longer matches `source`, in
/// which case the fragment was printed unchanged.
pub(crate) fn merge<W: Write>(
    doc: &FragmentSequence,
    source: &str,
    target: &FragmentSequence,
    out: &mut W,
    warnings: &mut Vec<String>,
    location: &str,
) -> io::Result<bool> {
    let Some(root) = doc.root() else {
        return Ok(false);
    };
    merge_level(doc, root, source, target, out, warnings, location)
}

fn merge_level<W: Write>(
    doc: &FragmentSequence,
    node: NodeId,
    source: &str,
    target: &FragmentSequence,
    out: &mut W,
    warnings: &mut Vec<String>,
    location: &str,
) -> io::Result<bool> {
    let child_count = doc.children(node).len();

    match classify(doc, node) {
        Level::EmptyCore => {
            out.write_all(markup_span(doc, node, 0..child_count).as_bytes())?;
            Ok(false)
        }
        Level::Wrapper(inner) => {
            let pos = doc
                .children(node)
                .iter()
                .position(|&c| c == inner)
                .unwrap_or(0);
            let FragmentKind::Element {
                name,
                attributes,
                closed,
                ..
            } = &doc.node(inner).kind
            else {
                out.write_all(markup_span(doc, node, 0..child_count).as_bytes())?;
                return Ok(false);
            };

            out.write_all(markup_span(doc, node, 0..pos).as_bytes())?;
            let mut tag = String::new();
            push_open_tag(&mut tag, name, attributes, false);
            out.write_all(tag.as_bytes())?;
            let ok = merge_level(doc, inner, source, target, out, warnings, location)?;
            if *closed {
                write!(out, "</{name}>")?;
            }
            out.write_all(markup_span(doc, node, pos + 1..child_count).as_bytes())?;
            Ok(ok)
        }
        Level::Span { first, last } => {
            let body = wire_span(doc, node, first, last, Wire::Document);
            let key = body.trim_ascii();
            if key != source {
                out.write_all(markup_span(doc, node, 0..child_count).as_bytes())?;
                return Ok(false);
            }

            let lead = &body[..body.len() - body.trim_ascii_start().len()];
            let trail = &body[body.trim_ascii_end().len()..];

            out.write_all(markup_span(doc, node, 0..first).as_bytes())?;
            out.write_all(lead.as_bytes())?;
            render_target(doc, target, out, warnings, location)?;
            out.write_all(trail.as_bytes())?;
            out.write_all(markup_span(doc, node, last + 1..child_count).as_bytes())?;
            Ok(true)
        }
    }
}

fn render_target<W: Write>(
    doc: &FragmentSequence,
    target: &FragmentSequence,
    out: &mut W,
    warnings: &mut Vec<String>,
    location: &str,
) -> io::Result<()> {
    if let Some(root) = target.root() {
        render_nodes(doc, target, root, out, warnings, location)?;
    }
    Ok(())
}

fn render_nodes<W: Write>(
    doc: &FragmentSequence,
    target: &FragmentSequence,
    node: NodeId,
    out: &mut W,
    warnings: &mut Vec<String>,
    location: &str,
) -> io::Result<()> {
    for &child in target.children(node) {
        match &target.node(child).kind {
            FragmentKind::Root => {}
            FragmentKind::Text { value, .. } => {
                out.write_all(partial_escape(value).as_bytes())?;
            }
            FragmentKind::Element {
                name,
                attributes,
                closed,
                is_void,
                ..
            } => {
                if let Some(wire) = marker_id(name, attributes) {
                    render_marker(doc, target, child, wire, out, warnings, location)?;
                } else {
                    let mut tag = String::new();
                    push_open_tag(&mut tag, name, attributes, *is_void);
                    out.write_all(tag.as_bytes())?;
                    if !is_void {
                        render_nodes(doc, target, child, out, warnings, location)?;
                        if *closed {
                            write!(out, "</{name}>")?;
                        }
                    }
                }
            }
        }
    }
    Ok(())
}

/// Substitute a `g`/`x` marker with the document element it points at.
/// The marker's own content (the translated inner text) goes inside.
fn render_marker<W: Write>(
    doc: &FragmentSequence,
    target: &FragmentSequence,
    marker: NodeId,
    wire: u32,
    out: &mut W,
    warnings: &mut Vec<String>,
    location: &str,
) -> io::Result<()> {
    let Some(doc_node) = doc.element_by_wire_id(wire) else {
        warnings.push(format!(
            "{location}: no inline element with id {wire} in source fragment"
        ));
        return render_nodes(doc, target, marker, out, warnings, location);
    };
    let FragmentKind::Element {
        name,
        attributes,
        is_void,
        ..
    } = &doc.node(doc_node).kind
    else {
        return render_nodes(doc, target, marker, out, warnings, location);
    };

    let mut tag = String::new();
    push_open_tag(&mut tag, name, attributes, *is_void);
    out.write_all(tag.as_bytes())?;
    if *is_void {
        render_nodes(doc, target, marker, out, warnings, location)
    } else {
        render_nodes(doc, target, marker, out, warnings, location)?;
        write!(out, "</{name}>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_text(seq: &mut FragmentSequence, s: &str) {
        seq.text(s, false, s).unwrap();
    }

    fn target_of_text(s: &str) -> FragmentSequence {
        let mut seq = FragmentSequence::new();
        seq.text(s, true, s).unwrap();
        seq
    }

    fn run_merge(doc: &FragmentSequence, source: &str, target: &FragmentSequence) -> (String, bool) {
        let mut out = Vec::new();
        let mut warnings = Vec::new();
        let ok = merge(doc, source, target, &mut out, &mut warnings, "test:1:1").unwrap();
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
        (String::from_utf8(out).unwrap(), ok)
    }

    #[test]
    fn bare_text_keeps_boundary_whitespace() {
        // <p>  Hello  </p> reduced to "Hello"
        let mut doc = FragmentSequence::new();
        doc_text(&mut doc, "  Hello  ");

        let (out, ok) = run_merge(&doc, "Hello", &target_of_text("Bonjour"));
        assert!(ok);
        assert_eq!(out, " Bonjour ");
    }

    #[test]
    fn wrapper_tags_are_rebuilt_around_the_target() {
        // <p> <b>Hello</b> </p>
        let mut doc = FragmentSequence::new();
        doc_text(&mut doc, " ");
        doc.start("b", Vec::new(), false, "<b>").unwrap();
        doc_text(&mut doc, "Hello");
        doc.end("b", "</b>").unwrap();
        doc_text(&mut doc, " ");

        let (out, ok) = run_merge(&doc, "Hello", &target_of_text("Bonjour"));
        assert!(ok);
        assert_eq!(out, " <b>Bonjour</b> ");
    }

    #[test]
    fn markers_resolve_back_to_document_elements() {
        // <p>Hello <b class="x">world</b>!</p> with a reordering target
        let mut doc = FragmentSequence::new();
        doc_text(&mut doc, "Hello ");
        doc.start(
            "b",
            vec![("class".to_string(), "x".to_string())],
            false,
            "<b class=\"x\">",
        )
        .unwrap();
        doc_text(&mut doc, "world");
        doc.end("b", "</b>").unwrap();
        doc_text(&mut doc, "!");

        // target: <g id="1">monde</g> bonjour!
        let mut target = FragmentSequence::new();
        target
            .start("g", vec![("id".to_string(), "1".to_string())], false, "")
            .unwrap();
        target.text("monde", true, "monde").unwrap();
        target.end("g", "").unwrap();
        target.text(" bonjour!", true, " bonjour!").unwrap();

        let (out, ok) = run_merge(&doc, "Hello <g id=\"1\">world</g>!", &target);
        assert!(ok);
        assert_eq!(out, "<b class=\"x\">monde</b> bonjour!");
    }

    #[test]
    fn x_marker_renders_the_void_element() {
        // <p>line<br/>break</p>
        let mut doc = FragmentSequence::new();
        doc_text(&mut doc, "line");
        doc.start("br", Vec::new(), true, "<br/>").unwrap();
        doc.end("br", "").unwrap();
        doc_text(&mut doc, "break");

        // target: ligne<x id="1"/>coupure
        let mut target = FragmentSequence::new();
        target.text("ligne", true, "ligne").unwrap();
        target
            .start("x", vec![("id".to_string(), "1".to_string())], true, "")
            .unwrap();
        target.end("x", "").unwrap();
        target.text("coupure", true, "coupure").unwrap();

        let (out, ok) = run_merge(&doc, "line<x id=\"1\"/>break", &target);
        assert!(ok);
        assert_eq!(out, "ligne<br/>coupure");
    }

    #[test]
    fn edge_decoration_survives_substitution() {
        // <p><b></b>Hello</p>
        let mut doc = FragmentSequence::new();
        doc.start("b", Vec::new(), false, "<b>").unwrap();
        doc.end("b", "</b>").unwrap();
        doc_text(&mut doc, "Hello");

        let (out, ok) = run_merge(&doc, "Hello", &target_of_text("Bonjour"));
        assert!(ok);
        assert_eq!(out, "<b></b>Bonjour");
    }

    #[test]
    fn mismatch_prints_the_fragment_unchanged() {
        let mut doc = FragmentSequence::new();
        doc_text(&mut doc, "Hello ");
        doc.start("b", Vec::new(), false, "<b>").unwrap();
        doc_text(&mut doc, "world");
        doc.end("b", "</b>").unwrap();

        let mut out = Vec::new();
        let mut warnings = Vec::new();
        let ok = merge(
            &doc,
            "Goodbye",
            &target_of_text("x"),
            &mut out,
            &mut warnings,
            "test:1:1",
        )
        .unwrap();
        assert!(!ok);
        assert_eq!(String::from_utf8(out).unwrap(), "Hello <b>world</b>");
    }

    #[test]
    fn unknown_marker_warns_and_keeps_its_content() {
        let mut doc = FragmentSequence::new();
        doc_text(&mut doc, "Hello");

        let mut target = FragmentSequence::new();
        target
            .start("g", vec![("id".to_string(), "9".to_string())], false, "")
            .unwrap();
        target.text("salut", true, "salut").unwrap();
        target.end("g", "").unwrap();

        let mut out = Vec::new();
        let mut warnings = Vec::new();
        let ok = merge(&doc, "Hello", &target, &mut out, &mut warnings, "test:1:1").unwrap();
        assert!(ok);
        assert_eq!(String::from_utf8(out).unwrap(), "salut");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("no inline element with id 9"));
    }

    #[test]
    fn preserve_mode_restores_exact_boundaries() {
        // <pre xml:space="preserve">  let x = 1;\n  </pre>
        let mut doc = FragmentSequence::new();
        doc.text("  let x = 1;\n  ", true, "  let x = 1;\n  ").unwrap();

        let (out, ok) = run_merge(&doc, "let x = 1;", &target_of_text("let y = 2;"));
        assert!(ok);
        assert_eq!(out, "  let y = 2;\n  ");
    }
}
