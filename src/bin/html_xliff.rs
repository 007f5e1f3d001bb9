//! html-xliff - extract, translate, and update HTML5 documents with
//! XLIFF 1.2 dictionaries.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use html_xliff::{extract_files, join_files, update_files, Options};

#[derive(Parser)]
#[command(name = "html-xliff")]
#[command(version, about = "Extract, translate, and update HTML5 documents \
                            with XLIFF 1.2 dictionaries")]
#[command(after_help = "EXAMPLES:
    html-xliff page.html > page.xlf           Extract a template dictionary
    html-xliff -j page.xlf page.html          Translate a document
    html-xliff -u page.xlf new.html > merged.xlf
                                              Merge new phrases into a dictionary")]
struct Cli {
    /// Extract a template dictionary from the input documents (default mode)
    #[arg(short = 'e', long, conflicts_with_all = ["join", "update"])]
    extract: bool,

    /// Translate the input documents against dictionary FILE
    #[arg(short = 'j', long, value_name = "FILE", conflicts_with = "update")]
    join: Option<PathBuf>,

    /// Merge newly found phrases into dictionary FILE, printing the result
    #[arg(short = 'u', long, value_name = "FILE")]
    update: Option<PathBuf>,

    /// Copy source text into empty targets; with -j, fall back to the
    /// source text for missing translations without failing
    #[arg(short = 'c', long)]
    copy: bool,

    /// Keep dictionary entries no longer present in the inputs (with -u)
    #[arg(short = 'k', long)]
    keep: bool,

    /// Suppress warnings
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Report per-file progress on standard error
    #[arg(short = 'v', long)]
    verbose: bool,

    /// HTML documents to process
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let options = Options {
        copy: cli.copy,
        keep: cli.keep,
        quiet: cli.quiet,
        verbose: cli.verbose,
        ..Options::default()
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let result = if cli.extract {
        extract_files(&cli.files, &options, &mut out)
    } else if let Some(dictionary) = cli.join.as_deref() {
        join_files(dictionary, &cli.files, &options, &mut out)
    } else if let Some(dictionary) = cli.update.as_deref() {
        update_files(dictionary, &cli.files, &options, &mut out)
    } else {
        extract_files(&cli.files, &options, &mut out)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("html-xliff: {err}");
            ExitCode::FAILURE
        }
    }
}
