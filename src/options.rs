//! Configuration options for extracting, joining, and updating.
//!
//! The `Options` struct carries the small set of switches the command line
//! exposes plus the document defaults library callers may want to override.

/// Element nesting bound applied when no configuration is in reach, as in
/// dictionary parsing.
pub(crate) const DEFAULT_MAX_DEPTH: usize = 64;

/// Configuration options shared by all three processing modes.
///
/// All fields are public for easy configuration. Use `Default::default()`
/// for standard settings.
///
/// # Example
///
/// ```rust
/// use html_xliff::Options;
///
/// // Use defaults
/// let options = Options::default();
///
/// // Customize specific fields
/// let options = Options {
///     copy: true,
///     quiet: true,
///     ..Options::default()
/// };
/// ```
#[derive(Debug, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct Options {
    /// Treat the document root as translatable when it carries no
    /// `its:translate` attribute. Regions that must not be translated
    /// (scripts, code samples) are expected to carry `its:translate="no"`.
    ///
    /// Default: `true`
    pub translate_default: bool,

    /// Copy source text into empty targets when writing a dictionary, and
    /// fall back to the source text without failing the run when a join
    /// lookup finds no translation.
    ///
    /// Default: `false`
    pub copy: bool,

    /// When updating, keep dictionary entries that no longer occur in any
    /// input document instead of dropping them.
    ///
    /// Default: `false`
    pub keep: bool,

    /// Suppress warning output. Fatal errors are always reported.
    ///
    /// Default: `false`
    pub quiet: bool,

    /// Report per-file activity on standard error.
    ///
    /// Default: `false`
    pub verbose: bool,

    /// Maximum nesting depth before a document is rejected with a depth
    /// error. Counted separately for context frames, where same-name
    /// nesting does not consume depth, and for inline markup inside a
    /// translatable region.
    ///
    /// Default: `64`
    pub max_depth: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            translate_default: true,
            copy: false,
            keep: false,
            quiet: false,
            verbose: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options() {
        let opts = Options::default();

        assert!(opts.translate_default);
        assert!(!opts.copy);
        assert!(!opts.keep);
        assert!(!opts.quiet);
        assert!(!opts.verbose);
        assert_eq!(opts.max_depth, 64);
    }

    #[test]
    fn options_can_be_customized() {
        let opts = Options {
            translate_default: false,
            copy: true,
            keep: true,
            max_depth: 8,
            ..Options::default()
        };

        assert!(!opts.translate_default);
        assert!(opts.copy);
        assert!(opts.keep);
        assert_eq!(opts.max_depth, 8);
    }
}
