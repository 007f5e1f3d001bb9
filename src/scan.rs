//! Document scanning.
//!
//! One pass over an HTML document drives everything: the context stack
//! decides which parts are translatable, translatable regions accumulate in
//! a [`FragmentSequence`], and every region is flushed when a context
//! boundary closes it. Extraction collects the reduced phrases; joining
//! looks each phrase up in a dictionary and writes the document back out
//! with translations substituted, echoing all other bytes unchanged.
//!
//! The only rewriting the join applies outside substituted regions is
//! dropping `its:translate` attributes from start tags; they direct the
//! scan and carry no meaning for readers of the output.

use std::io::{self, Write};
use std::mem;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::bundle::Bundle;
use crate::context::{ContextStack, Decision, Leave};
use crate::error::{Error, Result};
use crate::fragment::{BuildError, FragmentSequence};
use crate::merge::merge;
use crate::options::Options;
use crate::reduce::{push_open_tag, reduce_document};
use crate::tags::is_void;
use crate::xml_utils::{attributes_of, LineCounter};

/// What one extraction pass found in a document.
#[derive(Debug, Default)]
pub struct ScanReport {
    /// Reduced phrases in document order, duplicates included.
    pub phrases: Vec<String>,
    /// Value of the root element's `lang` attribute, if present.
    pub language: Option<String>,
    /// Recoverable problems, each prefixed with `path:line:col`.
    pub warnings: Vec<String>,
    /// How many regions were structurally reduced before serialization.
    pub reduced: usize,
}

/// What one join pass did to a document.
#[derive(Debug, Default)]
pub struct JoinReport {
    /// Recoverable problems, each prefixed with `path:line:col`.
    pub warnings: Vec<String>,
    /// Phrases that had no dictionary entry and were echoed untranslated.
    pub missing: usize,
}

/// Extract translatable phrases from one document.
pub(crate) fn scan_document(text: &str, path: &str, options: &Options) -> Result<ScanReport> {
    let mut walker: Walker<'_, io::Sink> = Walker::new(text, path, options, None, None);
    walker.walk()?;
    Ok(ScanReport {
        phrases: walker.phrases,
        language: walker.language,
        warnings: walker.warnings,
        reduced: walker.reduced,
    })
}

/// Rewrite one document with translations from `bundle`, writing to `out`.
pub(crate) fn join_document<W: Write>(
    text: &str,
    path: &str,
    bundle: &Bundle,
    options: &Options,
    out: &mut W,
) -> Result<JoinReport> {
    let mut walker = Walker::new(text, path, options, Some(bundle), Some(out));
    walker.walk()?;
    Ok(JoinReport {
        warnings: walker.warnings,
        missing: walker.missing,
    })
}

struct Walker<'a, W: Write> {
    text: &'a str,
    path: &'a str,
    options: &'a Options,
    counter: LineCounter<'a>,
    stack: ContextStack,
    seq: FragmentSequence,
    bundle: Option<&'a Bundle>,
    out: Option<&'a mut W>,
    phrases: Vec<String>,
    language: Option<String>,
    warnings: Vec<String>,
    reduced: usize,
    missing: usize,
    saw_root: bool,
}

impl<'a, W: Write> Walker<'a, W> {
    fn new(
        text: &'a str,
        path: &'a str,
        options: &'a Options,
        bundle: Option<&'a Bundle>,
        out: Option<&'a mut W>,
    ) -> Self {
        Self {
            text,
            path,
            options,
            counter: LineCounter::new(text),
            stack: ContextStack::new(options.translate_default),
            seq: FragmentSequence::new(),
            bundle,
            out,
            phrases: Vec::new(),
            language: None,
            warnings: Vec::new(),
            reduced: 0,
            missing: 0,
            saw_root: false,
        }
    }

    fn walk(&mut self) -> Result<()> {
        let mut reader = Reader::from_str(self.text);
        reader.config_mut().check_end_names = true;

        let mut prev = 0usize;
        loop {
            let event = match reader.read_event() {
                Ok(event) => event,
                Err(err) => {
                    let pos = position(&reader, self.text);
                    let (line, col) = self.counter.locate(pos);
                    return Err(Error::Syntax {
                        path: self.path.to_string(),
                        line,
                        col,
                        message: err.to_string(),
                    });
                }
            };
            let cur = position(&reader, self.text);
            let raw = &self.text[prev..cur];

            match event {
                Event::Eof => {
                    if !self.stack.is_empty() {
                        let (line, col) = self.counter.locate(prev);
                        return Err(Error::Syntax {
                            path: self.path.to_string(),
                            line,
                            col,
                            message: "unexpected end of document".to_string(),
                        });
                    }
                    return Ok(());
                }
                Event::Start(e) => self.element_start(&e, raw, prev, false)?,
                Event::Empty(e) => self.element_start(&e, raw, prev, true)?,
                Event::End(e) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    self.element_end(&name, raw, prev)?;
                }
                Event::Text(e) => {
                    if self.stack.translating() {
                        let (line, col) = self.counter.locate(prev);
                        let path = self.path;
                        let content = e.unescape().map_err(|err| Error::Syntax {
                            path: path.to_string(),
                            line,
                            col,
                            message: err.to_string(),
                        })?;
                        self.seq
                            .text(&content, self.stack.preserving(), raw)
                            .map_err(|err| self.build_error(err, line, col))?;
                    } else {
                        self.echo(raw)?;
                    }
                }
                Event::CData(e) => {
                    if self.stack.translating() {
                        let (line, col) = self.counter.locate(prev);
                        let inner = e.into_inner();
                        let content = String::from_utf8_lossy(&inner).into_owned();
                        self.seq
                            .text(&content, self.stack.preserving(), raw)
                            .map_err(|err| self.build_error(err, line, col))?;
                    } else {
                        self.echo(raw)?;
                    }
                }
                // Comments, doctype, declarations, processing instructions:
                // structure-free bytes that ride along verbatim.
                _ => {
                    if self.stack.translating() {
                        self.seq.append_verbatim(raw);
                    } else {
                        self.echo(raw)?;
                    }
                }
            }
            prev = cur;
        }
    }

    fn element_start(
        &mut self,
        e: &BytesStart<'_>,
        raw: &str,
        pos: usize,
        empty: bool,
    ) -> Result<()> {
        let (line, col) = self.counter.locate(pos);
        let path = self.path;
        let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
        let attributes = attributes_of(e, path, line, col)?;
        let (translate, preserve) = its_flags(&attributes);

        if !self.saw_root {
            self.saw_root = true;
            self.root_checks(&name, &attributes, line, col);
        }

        match self.stack.enter(&name, translate, preserve) {
            Decision::Inline => {
                self.seq
                    .start(&name, attributes, is_void(&name), raw)
                    .map_err(|err| self.build_error(err, line, col))?;
                if self.seq.depth() >= self.options.max_depth {
                    return Err(Error::DepthExceeded {
                        path: path.to_string(),
                        line,
                        col,
                        limit: self.options.max_depth,
                    });
                }
                if empty {
                    self.seq
                        .end(&name, "")
                        .map_err(|err| self.build_error(err, line, col))?;
                }
                return Ok(());
            }
            Decision::Nested => {
                self.flush(pos)?;
                self.echo(raw)?;
            }
            Decision::Open { .. } => {
                self.flush(pos)?;
                if self.stack.depth() >= self.options.max_depth {
                    return Err(Error::DepthExceeded {
                        path: path.to_string(),
                        line,
                        col,
                        limit: self.options.max_depth,
                    });
                }
                if translate.is_some() {
                    self.echo_without_its(&name, &attributes, empty)?;
                } else {
                    self.echo(raw)?;
                }
            }
        }
        if empty {
            self.stack.leave(&name);
        }
        Ok(())
    }

    fn element_end(&mut self, name: &str, raw: &str, pos: usize) -> Result<()> {
        // An end tag inside an open inline element closes that element,
        // not a context frame.
        if self.stack.translating() && !self.seq.cursor_at_root() {
            let (line, col) = self.counter.locate(pos);
            self.seq
                .end(name, raw)
                .map_err(|err| self.build_error(err, line, col))?;
            return Ok(());
        }

        match self.stack.leave(name) {
            Leave::Closed { translate, .. } => {
                if translate {
                    self.flush(pos)?;
                }
                self.echo(raw)?;
            }
            Leave::Nested => {
                self.flush(pos)?;
                self.echo(raw)?;
            }
            Leave::Unmatched => self.echo(raw)?,
        }
        Ok(())
    }

    /// Complete the pending translatable region: reduce it, then collect
    /// the phrase (extract) or substitute its translation (join). Regions
    /// with nothing translatable are echoed byte for byte.
    fn flush(&mut self, pos: usize) -> Result<()> {
        if self.seq.is_empty() {
            return Ok(());
        }
        let seq = mem::take(&mut self.seq);
        let path = self.path;

        if !seq.cursor_at_root() {
            let (line, col) = self.counter.locate(pos);
            let element = seq.open_element().unwrap_or_default().to_string();
            return Err(Error::BrokenScope {
                path: path.to_string(),
                line,
                col,
                element,
            });
        }

        let Some((phrase, reduced)) = reduce_document(&seq) else {
            return self.echo(seq.verbatim());
        };
        if reduced {
            self.reduced += 1;
        }

        match (self.bundle, self.out.as_deref_mut()) {
            (None, _) => self.phrases.push(phrase),
            (Some(bundle), Some(out)) => {
                let (line, col) = self.counter.locate(pos);
                let location = format!("{path}:{line}:{col}");
                match bundle.get(&phrase) {
                    Some(entry) => {
                        let ok =
                            merge(&seq, &phrase, &entry.target, out, &mut self.warnings, &location)
                                .map_err(|err| Error::Io {
                                    path: path.to_string(),
                                    source: err,
                                })?;
                        if !ok {
                            self.warnings.push(format!(
                                "{location}: translation does not line up with the document, \
                                 keeping source text"
                            ));
                        }
                    }
                    None => {
                        self.missing += 1;
                        self.warnings
                            .push(format!("{location}: no translation for extracted phrase"));
                        out.write_all(seq.verbatim().as_bytes())
                            .map_err(|err| Error::Io {
                                path: path.to_string(),
                                source: err,
                            })?;
                    }
                }
            }
            (Some(_), None) => {}
        }
        Ok(())
    }

    /// Root-element bookkeeping: capture the document language and check
    /// for the ITS namespace declaration. Both absences are recoverable.
    fn root_checks(&mut self, name: &str, attributes: &[(String, String)], line: usize, col: usize) {
        let mut has_namespace = false;
        for (key, value) in attributes {
            if key.eq_ignore_ascii_case("xmlns:its") {
                has_namespace = true;
            } else if key.eq_ignore_ascii_case("lang") && self.language.is_none() {
                self.language = Some(value.clone());
            }
        }
        if !has_namespace {
            self.warnings.push(format!(
                "{}:{line}:{col}: no xmlns:its declaration on <{name}>",
                self.path
            ));
        }
        if self.language.is_none() {
            self.warnings.push(format!(
                "{}:{line}:{col}: no lang attribute on <{name}>",
                self.path
            ));
        }
    }

    /// Echo a start tag rebuilt without its `its:translate` attribute.
    fn echo_without_its(
        &mut self,
        name: &str,
        attributes: &[(String, String)],
        self_closing: bool,
    ) -> Result<()> {
        let kept: Vec<(String, String)> = attributes
            .iter()
            .filter(|(key, _)| !key.eq_ignore_ascii_case("its:translate"))
            .cloned()
            .collect();
        let mut tag = String::new();
        push_open_tag(&mut tag, name, &kept, self_closing);
        self.echo(&tag)
    }

    fn echo(&mut self, raw: &str) -> Result<()> {
        let path = self.path;
        if let Some(out) = self.out.as_deref_mut() {
            out.write_all(raw.as_bytes()).map_err(|err| Error::Io {
                path: path.to_string(),
                source: err,
            })?;
        }
        Ok(())
    }

    fn build_error(&self, err: BuildError, line: usize, col: usize) -> Error {
        match err {
            BuildError::VoidContent { element } => Error::VoidContent {
                path: self.path.to_string(),
                line,
                col,
                element,
            },
            BuildError::Mismatch { element } => Error::Syntax {
                path: self.path.to_string(),
                line,
                col,
                message: format!("mismatched closing tag </{element}>"),
            },
        }
    }
}

fn position<R>(reader: &Reader<R>, text: &str) -> usize {
    usize::try_from(reader.buffer_position())
        .unwrap_or(usize::MAX)
        .min(text.len())
}

/// Read `its:translate` and `xml:space` off a start tag. Names and values
/// match case-insensitively; unrecognized values count as absent.
fn its_flags(attributes: &[(String, String)]) -> (Option<bool>, Option<bool>) {
    let mut translate = None;
    let mut preserve = None;
    for (key, value) in attributes {
        let value = value.trim();
        if key.eq_ignore_ascii_case("its:translate") {
            if value.eq_ignore_ascii_case("yes") {
                translate = Some(true);
            } else if value.eq_ignore_ascii_case("no") {
                translate = Some(false);
            }
        } else if key.eq_ignore_ascii_case("xml:space") {
            if value.eq_ignore_ascii_case("preserve") {
                preserve = Some(true);
            } else if value.eq_ignore_ascii_case("default") {
                preserve = Some(false);
            }
        }
    }
    (translate, preserve)
}
