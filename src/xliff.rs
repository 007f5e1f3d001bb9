//! XLIFF 1.2 dictionary format.
//!
//! Dictionaries are flat: one `<file>` element carrying the language pair,
//! one `<trans-unit>` per phrase with `<source>` and `<target>` children
//! holding the wire form of the phrase. Reading runs a small state machine
//! over the event stream; only text inside an open `<source>` or `<target>`
//! is collected, everything between units is skipped. Writing produces the
//! canonical tab-indented layout with units numbered from 1.

use std::io::{self, Write};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::bundle::TranslationEntry;
use crate::error::{Error, Result};
use crate::fragment::FragmentSequence;
use crate::options::DEFAULT_MAX_DEPTH;
use crate::reduce::flatten_entry;
use crate::xml_utils::{attributes_of, requote_attr, LineCounter};

pub(crate) const XLIFF_NS: &str = "urn:oasis:names:tc:xliff:document:1.2";
pub(crate) const XLIFF_VERSION: &str = "1.2";

/// Raw parse result before duplicate resolution.
#[derive(Debug)]
pub(crate) struct ParsedDictionary {
    pub(crate) entries: Vec<TranslationEntry>,
    pub(crate) source_language: Option<String>,
    pub(crate) target_language: Option<String>,
    pub(crate) warnings: Vec<String>,
}

/// Which phrase field of the current unit is being collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Source,
    Target,
}

/// A `trans-unit` in progress.
#[derive(Debug)]
struct Unit {
    line: usize,
    col: usize,
    source: Option<String>,
    target: Option<(String, FragmentSequence)>,
    saw_source: bool,
    saw_target: bool,
}

impl Unit {
    fn new(line: usize, col: usize) -> Self {
        Self {
            line,
            col,
            source: None,
            target: None,
            saw_source: false,
            saw_target: false,
        }
    }
}

struct Parser<'a> {
    path: &'a str,
    counter: LineCounter<'a>,
    entries: Vec<TranslationEntry>,
    warnings: Vec<String>,
    source_language: Option<String>,
    target_language: Option<String>,
    saw_root: bool,
    unit: Option<Unit>,
    field: Option<(Field, FragmentSequence)>,
}

/// Parse an XLIFF 1.2 dictionary into its entries.
///
/// The root element must be `<xliff>` with `version="1.2"`; anything else
/// is fatal, as is a dictionary without a single complete entry. Units
/// missing a source or a target are skipped with a warning.
pub(crate) fn parse_dictionary(text: &str, path: &str) -> Result<ParsedDictionary> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().check_end_names = true;

    let mut parser = Parser {
        path,
        counter: LineCounter::new(text),
        entries: Vec::new(),
        warnings: Vec::new(),
        source_language: None,
        target_language: None,
        saw_root: false,
        unit: None,
        field: None,
    };

    loop {
        let pos = usize::try_from(reader.buffer_position()).unwrap_or(usize::MAX);
        match reader.read_event() {
            Ok(Event::Eof) => break,
            Ok(event) => parser.dispatch(event, pos)?,
            Err(err) => {
                let (line, col) = parser.counter.locate(pos);
                return Err(Error::Syntax {
                    path: path.to_string(),
                    line,
                    col,
                    message: err.to_string(),
                });
            }
        }
    }
    parser.finish()
}

impl Parser<'_> {
    fn dispatch(&mut self, event: Event<'_>, pos: usize) -> Result<()> {
        let (line, col) = self.counter.locate(pos);
        match event {
            Event::Start(e) => self.element_start(&e, line, col, false),
            Event::Empty(e) => self.element_start(&e, line, col, true),
            Event::End(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                self.element_end(&name, line, col)
            }
            Event::Text(e) => {
                if self.field.is_none() {
                    return Ok(());
                }
                let path = self.path;
                let content = e.unescape().map_err(|err| Error::Syntax {
                    path: path.to_string(),
                    line,
                    col,
                    message: err.to_string(),
                })?;
                self.field_text(&content, line, col)
            }
            Event::CData(e) => {
                if self.field.is_none() {
                    return Ok(());
                }
                let raw = e.into_inner();
                let content = String::from_utf8_lossy(&raw).into_owned();
                self.field_text(&content, line, col)
            }
            // Comments, processing instructions and declarations carry no
            // dictionary content.
            _ => Ok(()),
        }
    }

    fn element_start(
        &mut self,
        e: &BytesStart<'_>,
        line: usize,
        col: usize,
        empty: bool,
    ) -> Result<()> {
        let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
        let path = self.path;

        if !self.saw_root {
            return self.check_root(e, &name, line, col);
        }

        if self.field.is_some() {
            let attributes = attributes_of(e, path, line, col)?;
            if let Some((_, seq)) = self.field.as_mut() {
                seq.start(&name, attributes, empty, "")
                    .map_err(|err| Error::Syntax {
                        path: path.to_string(),
                        line,
                        col,
                        message: err.to_string(),
                    })?;
                if seq.depth() >= DEFAULT_MAX_DEPTH {
                    return Err(Error::DepthExceeded {
                        path: path.to_string(),
                        line,
                        col,
                        limit: DEFAULT_MAX_DEPTH,
                    });
                }
                if empty {
                    seq.end(&name, "").map_err(|err| Error::Syntax {
                        path: path.to_string(),
                        line,
                        col,
                        message: err.to_string(),
                    })?;
                }
            }
            return Ok(());
        }

        match name.as_str() {
            "file" => self.file_languages(e, line, col)?,
            "trans-unit" => {
                // A unit still open here never saw its end tag.
                self.close_unit();
                self.unit = Some(Unit::new(line, col));
                if empty {
                    self.close_unit();
                }
            }
            "source" | "target" if self.unit.is_some() => {
                let field = if name == "source" {
                    Field::Source
                } else {
                    Field::Target
                };
                if let Some(unit) = self.unit.as_mut() {
                    match field {
                        Field::Source => unit.saw_source = true,
                        Field::Target => unit.saw_target = true,
                    }
                }
                self.field = Some((field, FragmentSequence::new()));
                if empty {
                    self.finish_field();
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn element_end(&mut self, name: &str, line: usize, col: usize) -> Result<()> {
        let path = self.path;
        if let Some((_, seq)) = self.field.as_mut() {
            if !seq.cursor_at_root() {
                return seq.end(name, "").map_err(|err| Error::Syntax {
                    path: path.to_string(),
                    line,
                    col,
                    message: err.to_string(),
                });
            }
        }
        match name {
            "source" | "target" => self.finish_field(),
            "trans-unit" => self.close_unit(),
            _ => {}
        }
        Ok(())
    }

    fn field_text(&mut self, content: &str, line: usize, col: usize) -> Result<()> {
        let path = self.path;
        if let Some((_, seq)) = self.field.as_mut() {
            // Entry text keeps its interior whitespace; only the phrase
            // boundaries are trimmed when the field closes.
            seq.text(content, true, "").map_err(|err| Error::Syntax {
                path: path.to_string(),
                line,
                col,
                message: err.to_string(),
            })?;
        }
        Ok(())
    }

    fn check_root(&mut self, e: &BytesStart<'_>, name: &str, line: usize, col: usize) -> Result<()> {
        let attributes = attributes_of(e, self.path, line, col)?;
        let version = attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case("version"))
            .map(|(_, value)| value.trim());

        if !name.eq_ignore_ascii_case("xliff") || version != Some(XLIFF_VERSION) {
            return Err(Error::DictionaryVersion {
                path: self.path.to_string(),
                expected: XLIFF_VERSION,
            });
        }
        self.saw_root = true;
        Ok(())
    }

    fn file_languages(&mut self, e: &BytesStart<'_>, line: usize, col: usize) -> Result<()> {
        for (key, value) in attributes_of(e, self.path, line, col)? {
            match key.as_str() {
                "source-language" if self.source_language.is_none() => {
                    self.source_language = Some(value);
                }
                "target-language" if self.target_language.is_none() => {
                    self.target_language = Some(value);
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Flatten the collected field into its wire form and file it on the
    /// open unit. An empty field is dropped with a warning.
    fn finish_field(&mut self) {
        let Some((field, mut seq)) = self.field.take() else {
            return;
        };
        let Some(unit) = self.unit.as_mut() else {
            return;
        };

        match (field, flatten_entry(&seq)) {
            (Field::Source, Some(text)) => unit.source = Some(text),
            (Field::Target, Some(text)) => {
                // Keep the stored tree in line with the trimmed wire text.
                seq.trim_edges();
                unit.target = Some((text, seq));
            }
            (Field::Source, None) => self.warnings.push(format!(
                "{}:{}:{}: empty <source> in entry",
                self.path, unit.line, unit.col
            )),
            (Field::Target, None) => self.warnings.push(format!(
                "{}:{}:{}: empty <target> in entry",
                self.path, unit.line, unit.col
            )),
        }
    }

    fn close_unit(&mut self) {
        let Some(unit) = self.unit.take() else {
            return;
        };
        let Unit {
            line,
            col,
            source,
            target,
            saw_source,
            saw_target,
        } = unit;

        match (source, target) {
            (Some(source), Some((target_text, target))) => {
                self.entries.push(TranslationEntry {
                    source,
                    target_text,
                    target,
                    line,
                    col,
                });
            }
            _ if saw_target && !saw_source => self.warnings.push(format!(
                "{}:{line}:{col}: target without source, entry skipped",
                self.path
            )),
            _ if !saw_source || !saw_target => self.warnings.push(format!(
                "{}:{line}:{col}: entry missing source or target, skipped",
                self.path
            )),
            // Empty fields were already warned about when they closed.
            _ => {}
        }
    }

    fn finish(self) -> Result<ParsedDictionary> {
        if !self.saw_root {
            return Err(Error::DictionaryVersion {
                path: self.path.to_string(),
                expected: XLIFF_VERSION,
            });
        }
        if self.entries.is_empty() {
            return Err(Error::DictionaryEmpty {
                path: self.path.to_string(),
            });
        }
        Ok(ParsedDictionary {
            entries: self.entries,
            source_language: self.source_language,
            target_language: self.target_language,
            warnings: self.warnings,
        })
    }
}

/// Write a dictionary in the canonical layout.
///
/// Sources and targets are wire-form strings and go out as-is; the caller
/// sorts the pairs. Units are numbered from 1 in the order given.
pub(crate) fn write_dictionary<W: Write>(
    out: &mut W,
    source_language: &str,
    target_language: &str,
    pairs: &[(String, String)],
) -> io::Result<()> {
    writeln!(out, "<xliff xmlns=\"{XLIFF_NS}\" version=\"{XLIFF_VERSION}\">")?;
    writeln!(
        out,
        "\t<file source-language=\"{}\" target-language=\"{}\" datatype=\"html\" original=\"messages\">",
        requote_attr(source_language),
        requote_attr(target_language)
    )?;
    writeln!(out, "\t\t<body>")?;
    for (idx, (source, target)) in pairs.iter().enumerate() {
        writeln!(out, "\t\t\t<trans-unit id=\"{}\">", idx + 1)?;
        writeln!(out, "\t\t\t\t<source>{source}</source>")?;
        writeln!(out, "\t\t\t\t<target>{target}</target>")?;
        writeln!(out, "\t\t\t</trans-unit>")?;
    }
    writeln!(out, "\t\t</body>")?;
    writeln!(out, "\t</file>")?;
    writeln!(out, "</xliff>")
}
