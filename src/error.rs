//! Error types for html-xliff.
//!
//! Fatal conditions are split between per-document failures (malformed
//! markup, broken translation scopes) and dictionary failures (bad version,
//! no entries, unreadable file). Recoverable conditions never appear here;
//! they are collected as warnings on the per-call reports.

/// Error type for document and dictionary processing.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The tokenizer rejected the input markup.
    #[error("{path}:{line}:{col}: malformed markup: {message}")]
    Syntax {
        path: String,
        line: usize,
        col: usize,
        message: String,
    },

    /// An element boundary crossed a translatable region without matching
    /// the region's own boundary.
    #[error("{path}:{line}:{col}: translation scope broken inside <{element}>")]
    BrokenScope {
        path: String,
        line: usize,
        col: usize,
        element: String,
    },

    /// Text or child elements appeared inside a void element.
    #[error("{path}:{line}:{col}: content inside void element <{element}>")]
    VoidContent {
        path: String,
        line: usize,
        col: usize,
        element: String,
    },

    /// Element nesting exceeded the configured context depth.
    #[error("{path}:{line}:{col}: context depth limit of {limit} exceeded")]
    DepthExceeded {
        path: String,
        line: usize,
        col: usize,
        limit: usize,
    },

    /// The dictionary root did not declare the expected format version.
    #[error("{path}: dictionary version missing or not {expected}")]
    DictionaryVersion { path: String, expected: &'static str },

    /// The dictionary parsed but yielded no usable entries.
    #[error("{path}: dictionary has no usable entries")]
    DictionaryEmpty { path: String },

    /// A file could not be read or written.
    #[error("{path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// A join ran to completion but some phrases had no translation and the
    /// copy fallback was not enabled.
    #[error("{count} phrase(s) had no translation")]
    MissingTranslations { count: usize },
}

/// Result type alias for document and dictionary processing.
pub type Result<T> = std::result::Result<T, Error>;
