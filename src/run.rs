//! File-level drivers for the three processing modes.
//!
//! These functions wrap the document scanner with the batch policy the
//! command line needs: read and transcode each input, stop at the first
//! fatal error, and only emit dictionary output once every input has been
//! processed cleanly. Warnings go to standard error unless `quiet` is set;
//! `verbose` adds a per-file progress line. Nothing in here terminates the
//! process, so library callers get every failure back as an [`Error`].

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::bundle::{Assembler, Bundle};
use crate::encoding::transcode;
use crate::error::{Error, Result};
use crate::options::Options;
use crate::scan::{join_document, scan_document};

/// Scan documents and write a fresh dictionary template to `out`.
///
/// The template is only written once every input has scanned cleanly, so a
/// fatal error in any document leaves `out` untouched.
///
/// # Errors
///
/// Returns the first scan or I/O failure encountered.
pub fn extract_files<W: Write>(paths: &[PathBuf], options: &Options, out: &mut W) -> Result<()> {
    let assembler = scan_all(paths, options)?;
    assembler
        .write_template(options.copy, out)
        .map_err(output_error)
}

/// Scan documents and merge their phrases into an existing dictionary,
/// writing the refreshed dictionary to `out`.
///
/// Phrases already present keep their translations; new phrases get
/// placeholder targets (or copies of the source under `copy`). Entries that
/// no longer occur in any input are dropped unless `keep` is set.
///
/// # Errors
///
/// Returns the first dictionary, scan, or I/O failure encountered.
pub fn update_files<W: Write>(
    dictionary: &Path,
    paths: &[PathBuf],
    options: &Options,
    out: &mut W,
) -> Result<()> {
    let bundle = load_dictionary(dictionary, options)?;
    let assembler = scan_all(paths, options)?;
    assembler
        .write_update(&bundle, options.copy, options.keep, out)
        .map_err(output_error)
}

/// Rewrite documents with translations from a dictionary, concatenating the
/// results to `out`.
///
/// Phrases without a translation are echoed in their source form. Under
/// `copy` that is the expected fallback and the run succeeds; without it the
/// whole batch still runs to completion, then fails with
/// [`Error::MissingTranslations`] reporting how many lookups missed.
///
/// # Errors
///
/// Returns the first dictionary, scan, or I/O failure encountered, or
/// [`Error::MissingTranslations`] as described above.
pub fn join_files<W: Write>(
    dictionary: &Path,
    paths: &[PathBuf],
    options: &Options,
    out: &mut W,
) -> Result<()> {
    let bundle = load_dictionary(dictionary, options)?;
    let mut missing = 0;
    for path in paths {
        let display = path.display().to_string();
        if options.verbose {
            eprintln!("{display}: translating");
        }
        let text = read_document(path)?;
        let report = join_document(&text, &display, &bundle, options, out)?;
        report_warnings(&report.warnings, options);
        missing += report.missing;
    }
    if missing > 0 && !options.copy {
        return Err(Error::MissingTranslations { count: missing });
    }
    Ok(())
}

/// Scan every input in order, pooling the results into one assembler.
fn scan_all(paths: &[PathBuf], options: &Options) -> Result<Assembler> {
    let mut assembler = Assembler::new();
    for path in paths {
        let display = path.display().to_string();
        if options.verbose {
            eprintln!("{display}: scanning");
        }
        let text = read_document(path)?;
        let report = scan_document(&text, &display, options)?;
        report_warnings(&report.warnings, options);
        if options.verbose {
            eprintln!(
                "{display}: {} phrase(s), {} region(s) reduced",
                report.phrases.len(),
                report.reduced
            );
        }
        assembler.add_report(&report);
    }
    Ok(assembler)
}

/// Read and parse the translation dictionary, surfacing its warnings.
fn load_dictionary(path: &Path, options: &Options) -> Result<Bundle> {
    let display = path.display().to_string();
    if options.verbose {
        eprintln!("{display}: loading dictionary");
    }
    let text = read_document(path)?;
    let bundle = Bundle::parse(&text, &display)?;
    report_warnings(&bundle.warnings, options);
    if options.verbose {
        eprintln!("{display}: {} dictionary entries", bundle.len());
    }
    Ok(bundle)
}

/// Read a document from disk and decode it to UTF-8.
///
/// Directories, sockets, and other non-regular files are rejected rather
/// than read.
fn read_document(path: &Path) -> Result<String> {
    let display = path.display().to_string();
    let metadata = fs::metadata(path).map_err(|source| Error::Io {
        path: display.clone(),
        source,
    })?;
    if !metadata.is_file() {
        return Err(Error::Io {
            path: display,
            source: io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"),
        });
    }
    let bytes = fs::read(path).map_err(|source| Error::Io {
        path: display,
        source,
    })?;
    Ok(transcode(&bytes))
}

fn report_warnings(warnings: &[String], options: &Options) {
    if options.quiet {
        return;
    }
    for warning in warnings {
        eprintln!("{warning}");
    }
}

fn output_error(source: io::Error) -> Error {
    Error::Io {
        path: "<output>".to_string(),
        source,
    }
}
