//! Translation context tracking.
//!
//! A stack of open block elements records, for the current position in the
//! document, whether content is translatable (`its:translate`) and whether
//! whitespace is significant (`xml:space`). Both attributes inherit from the
//! enclosing frame when an element does not set them. Phrasing elements that
//! set neither attribute do not open a frame of their own; they stay inline
//! and become part of the surrounding fragment sequence.

use crate::tags::is_phrasing;

/// One open block element and the flags in effect inside it.
#[derive(Debug)]
struct Frame {
    name: String,
    /// Count of directly nested same-name elements folded into this frame.
    nested: usize,
    translate: bool,
    preserve: bool,
}

/// What `enter` decided to do with a start tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Decision {
    /// A new frame was pushed; these are the flags in effect inside it.
    Open { translate: bool, preserve: bool },
    /// The tag repeats the innermost frame's name without overriding
    /// anything, so it was folded into that frame.
    Nested,
    /// A phrasing element with no overrides; it belongs to the text flow.
    Inline,
}

/// What `leave` decided to do with an end tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Leave {
    /// The innermost frame was popped; these were its flags.
    Closed { translate: bool, preserve: bool },
    /// The end tag matched a folded same-name nesting, not the frame itself.
    Nested,
    /// The end tag does not match the innermost frame.
    Unmatched,
}

/// Stack of open translation contexts.
#[derive(Debug)]
pub(crate) struct ContextStack {
    frames: Vec<Frame>,
    translate_default: bool,
}

impl ContextStack {
    pub(crate) fn new(translate_default: bool) -> Self {
        Self {
            frames: Vec::new(),
            translate_default,
        }
    }

    /// Whether content at the current position is translatable.
    pub(crate) fn translating(&self) -> bool {
        self.frames.last().map_or(false, |f| f.translate)
    }

    /// Whether whitespace at the current position is significant.
    pub(crate) fn preserving(&self) -> bool {
        self.frames.last().map_or(false, |f| f.preserve)
    }

    /// Number of distinct frames on the stack. Same-name nesting folded
    /// into a frame does not count.
    pub(crate) fn depth(&self) -> usize {
        self.frames.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Record a start tag. `translate` and `preserve` are the element's own
    /// attribute values, if present; `None` inherits from the enclosing
    /// frame.
    pub(crate) fn enter(
        &mut self,
        name: &str,
        translate: Option<bool>,
        preserve: Option<bool>,
    ) -> Decision {
        if translate.is_none() && preserve.is_none() {
            if self.translating() && is_phrasing(name) {
                return Decision::Inline;
            }
            if let Some(top) = self.frames.last_mut() {
                if top.name.eq_ignore_ascii_case(name) {
                    top.nested += 1;
                    return Decision::Nested;
                }
            }
        }

        let translate = translate.unwrap_or_else(|| {
            self.frames
                .last()
                .map_or(self.translate_default, |f| f.translate)
        });
        let preserve = preserve.unwrap_or_else(|| self.preserving());

        self.frames.push(Frame {
            name: name.to_string(),
            nested: 0,
            translate,
            preserve,
        });

        Decision::Open {
            translate,
            preserve,
        }
    }

    /// Record an end tag.
    pub(crate) fn leave(&mut self, name: &str) -> Leave {
        match self.frames.last_mut() {
            Some(top) if top.name.eq_ignore_ascii_case(name) => {
                if top.nested > 0 {
                    top.nested -= 1;
                    Leave::Nested
                } else {
                    let translate = top.translate;
                    let preserve = top.preserve;
                    self.frames.pop();
                    Leave::Closed {
                        translate,
                        preserve,
                    }
                }
            }
            _ => Leave::Unmatched,
        }
    }
}
