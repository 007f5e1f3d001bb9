//! # html-xliff
//!
//! Translate HTML5 documents with XLIFF 1.2 dictionaries.
//!
//! The library pulls human-readable phrases out of markup annotated with
//! [ITS](https://www.w3.org/TR/its20/) `its:translate` attributes, writes
//! them into an XLIFF translation dictionary, and later substitutes the
//! translated phrases back into the original documents without disturbing
//! any other byte of markup. Inline elements inside a phrase (`<b>`,
//! `<a href>`, `<br/>`…) travel with the text as numbered XLIFF
//! `<g id="n">` and `<x id="n"/>` markers so translators can reorder them.
//!
//! ## Quick start
//!
//! ```rust
//! use html_xliff::extract;
//!
//! let html = r#"<html xmlns:its="https://www.w3.org/2005/11/its" lang="en">
//! <body><p>Hello, <b>world</b>!</p></body></html>"#;
//!
//! let report = extract(html)?;
//! assert_eq!(report.phrases, vec![r#"Hello, <g id="1">world</g>!"#]);
//! assert_eq!(report.language.as_deref(), Some("en"));
//! # Ok::<(), html_xliff::Error>(())
//! ```
//!
//! ## Workflow
//!
//! 1. **Extract**: scan documents, emit a template dictionary with `TODO`
//!    targets ([`extract_files`]).
//! 2. Translate the dictionary by hand or with any XLIFF tool.
//! 3. **Join**: substitute the translations back into the documents
//!    ([`join_files`]).
//! 4. **Update**: as documents change, merge newly found phrases into the
//!    existing dictionary without losing finished translations
//!    ([`update_files`]).
//!
//! The command-line tool `html-xliff` wraps these drivers; the string-level
//! entry points [`extract`] and [`join`] serve library callers.

mod bundle;
mod context;
mod encoding;
mod error;
mod fragment;
mod merge;
mod options;
mod reduce;
mod run;
mod scan;
mod tags;
mod xliff;
mod xml_utils;

pub use bundle::{Assembler, Bundle, TranslationEntry};
pub use error::{Error, Result};
pub use options::Options;
pub use run::{extract_files, join_files, update_files};
pub use scan::{JoinReport, ScanReport};

/// Extracts translatable phrases from an HTML document using default
/// options.
///
/// Returns a [`ScanReport`] carrying the phrases in document order (one
/// entry per occurrence), the root `lang` attribute if present, and any
/// warnings. Feed reports to an [`Assembler`] to build a dictionary.
///
/// # Errors
///
/// Fails on malformed markup, a translation scope broken by a block element
/// inside an inline one, content inside a void element, or a document
/// nested deeper than [`Options::max_depth`].
///
/// # Example
///
/// ```rust
/// use html_xliff::extract;
///
/// let html = r#"<html xmlns:its="https://www.w3.org/2005/11/its" lang="en">
/// <p>One</p><p its:translate="no">debug()</p><p>Two</p></html>"#;
/// let report = extract(html)?;
/// assert_eq!(report.phrases, vec!["One", "Two"]);
/// # Ok::<(), html_xliff::Error>(())
/// ```
pub fn extract(html: &str) -> Result<ScanReport> {
    extract_with_options(html, &Options::default())
}

/// Extracts translatable phrases with custom options.
///
/// # Errors
///
/// Same failure modes as [`extract`].
pub fn extract_with_options(html: &str, options: &Options) -> Result<ScanReport> {
    scan::scan_document(html, "<input>", options)
}

/// Rewrites an HTML document with translations from a dictionary, using
/// default options.
///
/// Returns the translated document and a [`JoinReport`] counting lookups
/// that found no translation; missed phrases keep their source text. The
/// output is byte-identical to the input outside translated phrases, except
/// that `its:translate` attributes are dropped.
///
/// # Errors
///
/// Fails on the same document errors as [`extract`]. Unlike the
/// [`join_files`] driver, a missed lookup is not an error here; callers
/// decide what `missing > 0` means for them.
///
/// # Example
///
/// ```rust
/// use html_xliff::{join, Bundle};
///
/// let dictionary = r#"<xliff xmlns="urn:oasis:names:tc:xliff:document:1.2" version="1.2">
/// <file source-language="en" target-language="de"><body>
/// <trans-unit id="1"><source>Hello</source><target>Hallo</target></trans-unit>
/// </body></file></xliff>"#;
/// let bundle = Bundle::parse(dictionary, "dict.xlf")?;
///
/// let html = r#"<html xmlns:its="https://www.w3.org/2005/11/its" lang="en"><p>Hello</p></html>"#;
/// let (translated, report) = join(html, &bundle)?;
/// assert!(translated.contains("<p>Hallo</p>"));
/// assert_eq!(report.missing, 0);
/// # Ok::<(), html_xliff::Error>(())
/// ```
pub fn join(html: &str, bundle: &Bundle) -> Result<(String, JoinReport)> {
    join_with_options(html, bundle, &Options::default())
}

/// Rewrites an HTML document with translations, using custom options.
///
/// # Errors
///
/// Same failure modes as [`join`].
pub fn join_with_options(
    html: &str,
    bundle: &Bundle,
    options: &Options,
) -> Result<(String, JoinReport)> {
    let mut out = Vec::new();
    let report = scan::join_document(html, "<input>", bundle, options, &mut out)?;
    // The writer only ever receives UTF-8 text.
    Ok((String::from_utf8_lossy(&out).into_owned(), report))
}
