//! Fragment tree for translatable regions.
//!
//! While the scanner walks a translatable scope it builds an arena-backed
//! tree of the inline markup it sees: text nodes and phrasing elements.
//! Alongside the tree, every raw input slice is appended to a verbatim
//! buffer so a region that turns out not to reduce to a phrase can be
//! echoed byte for byte.
//!
//! Text values are stored unescaped; attribute values are kept exactly as
//! written in the input. Inline elements are numbered 1, 2, 3... in document
//! order within their sequence. These numbers become the `id` attributes of
//! the placeholder markers in the dictionary.

pub(crate) type NodeId = usize;

/// Index of the implicit root node in the arena.
pub(crate) const ROOT: NodeId = 0;

#[derive(Debug)]
pub(crate) enum FragmentKind {
    Root,
    Element {
        name: String,
        /// Attribute values exactly as written, entity references intact.
        attributes: Vec<(String, String)>,
        closed: bool,
        is_void: bool,
        /// Placeholder marker number, 1-based in document order.
        id: u32,
    },
    Text {
        /// Unescaped character data, whitespace-collapsed unless the
        /// region preserves space.
        value: String,
        /// Sticky: true once any non-whitespace character was appended.
        has_nonwhitespace: bool,
    },
}

#[derive(Debug)]
pub(crate) struct Fragment {
    pub(crate) kind: FragmentKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

/// Structural problems the tree refuses to represent.
#[derive(Debug, thiserror::Error)]
pub(crate) enum BuildError {
    /// Content inside a void element such as `<br>` or `<img>`.
    #[error("content inside void element <{element}>")]
    VoidContent { element: String },
    /// End tag that does not match the innermost open element.
    #[error("mismatched closing tag </{element}>")]
    Mismatch { element: String },
}

/// One translatable region in the making.
#[derive(Debug)]
pub(crate) struct FragmentSequence {
    nodes: Vec<Fragment>,
    cursor: NodeId,
    verbatim: String,
    next_id: u32,
    depth: usize,
}

// `mem::take` hands out default sequences; ids must keep starting at 1.
impl Default for FragmentSequence {
    fn default() -> Self {
        Self::new()
    }
}

impl FragmentSequence {
    pub(crate) fn new() -> Self {
        Self {
            nodes: Vec::new(),
            cursor: ROOT,
            verbatim: String::new(),
            next_id: 1,
            depth: 0,
        }
    }

    /// True when nothing at all was collected, not even a comment.
    pub(crate) fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.verbatim.is_empty()
    }

    pub(crate) fn cursor_at_root(&self) -> bool {
        self.nodes.is_empty() || self.cursor == ROOT
    }

    /// How many elements are open at the cursor.
    pub(crate) fn depth(&self) -> usize {
        self.depth
    }

    /// Name of the innermost open element, if the cursor is inside one.
    pub(crate) fn open_element(&self) -> Option<&str> {
        if self.cursor_at_root() {
            return None;
        }
        match &self.nodes[self.cursor].kind {
            FragmentKind::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    pub(crate) fn root(&self) -> Option<NodeId> {
        if self.nodes.is_empty() {
            None
        } else {
            Some(ROOT)
        }
    }

    pub(crate) fn node(&self, id: NodeId) -> &Fragment {
        &self.nodes[id]
    }

    pub(crate) fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    /// Raw input bytes of everything appended so far.
    pub(crate) fn verbatim(&self) -> &str {
        &self.verbatim
    }

    pub(crate) fn append_verbatim(&mut self, raw: &str) {
        self.verbatim.push_str(raw);
    }

    /// Find the element carrying placeholder number `wire`.
    pub(crate) fn element_by_wire_id(&self, wire: u32) -> Option<NodeId> {
        self.nodes.iter().enumerate().find_map(|(i, n)| match n.kind {
            FragmentKind::Element { id, .. } if id == wire => Some(i),
            _ => None,
        })
    }

    /// Open an inline element and move the cursor into it.
    pub(crate) fn start(
        &mut self,
        name: &str,
        attributes: Vec<(String, String)>,
        is_void: bool,
        raw: &str,
    ) -> Result<(), BuildError> {
        self.verbatim.push_str(raw);
        self.ensure_root();

        if let Some(element) = self.void_cursor() {
            return Err(BuildError::VoidContent {
                element: element.to_string(),
            });
        }

        let id = self.next_id;
        self.next_id += 1;

        let child = self.nodes.len();
        self.nodes.push(Fragment {
            kind: FragmentKind::Element {
                name: name.to_string(),
                attributes,
                closed: false,
                is_void,
                id,
            },
            parent: Some(self.cursor),
            children: Vec::new(),
        });
        self.nodes[self.cursor].children.push(child);
        self.cursor = child;
        self.depth += 1;
        Ok(())
    }

    /// Append character data at the cursor. `content` is unescaped text;
    /// consecutive appends coalesce into a single node. Unless `preserve`
    /// is set, whitespace runs collapse to a single space.
    pub(crate) fn text(
        &mut self,
        content: &str,
        preserve: bool,
        raw: &str,
    ) -> Result<(), BuildError> {
        self.verbatim.push_str(raw);
        if content.is_empty() {
            return Ok(());
        }
        self.ensure_root();

        let nonws = content.chars().any(|c| !c.is_ascii_whitespace());
        if let Some(element) = self.void_cursor() {
            return Err(BuildError::VoidContent {
                element: element.to_string(),
            });
        }

        let target = match self.nodes[self.cursor].children.last() {
            Some(&last) if matches!(self.nodes[last].kind, FragmentKind::Text { .. }) => last,
            _ => {
                let child = self.nodes.len();
                self.nodes.push(Fragment {
                    kind: FragmentKind::Text {
                        value: String::new(),
                        has_nonwhitespace: false,
                    },
                    parent: Some(self.cursor),
                    children: Vec::new(),
                });
                self.nodes[self.cursor].children.push(child);
                child
            }
        };

        if let FragmentKind::Text {
            value,
            has_nonwhitespace,
        } = &mut self.nodes[target].kind
        {
            if preserve {
                value.push_str(content);
            } else {
                for c in content.chars() {
                    if c.is_ascii_whitespace() {
                        if !value.ends_with(' ') {
                            value.push(' ');
                        }
                    } else {
                        value.push(c);
                    }
                }
            }
            *has_nonwhitespace |= nonws;
        }
        Ok(())
    }

    /// Close the innermost open element and move the cursor back out.
    pub(crate) fn end(&mut self, name: &str, raw: &str) -> Result<(), BuildError> {
        self.verbatim.push_str(raw);

        if self.cursor_at_root() {
            return Err(BuildError::Mismatch {
                element: name.to_string(),
            });
        }

        let matches = match &self.nodes[self.cursor].kind {
            FragmentKind::Element {
                name: open_name, ..
            } => open_name.eq_ignore_ascii_case(name),
            _ => false,
        };
        if !matches {
            return Err(BuildError::Mismatch {
                element: name.to_string(),
            });
        }

        if let FragmentKind::Element { closed, .. } = &mut self.nodes[self.cursor].kind {
            *closed = true;
        }
        self.cursor = self.nodes[self.cursor].parent.unwrap_or(ROOT);
        self.depth -= 1;
        Ok(())
    }

    /// Drop boundary whitespace: the lead of the first top-level text node
    /// and the tail of the last. Interior and nested whitespace stays.
    pub(crate) fn trim_edges(&mut self) {
        let Some(root) = self.root() else {
            return;
        };

        if let Some(&first) = self.nodes[root].children.first() {
            if let FragmentKind::Text { value, .. } = &mut self.nodes[first].kind {
                let lead = value.len() - value.trim_ascii_start().len();
                if lead > 0 {
                    value.drain(..lead);
                }
            }
        }
        if let Some(&last) = self.nodes[root].children.last() {
            if let FragmentKind::Text { value, .. } = &mut self.nodes[last].kind {
                value.truncate(value.trim_ascii_end().len());
            }
        }
    }

    fn ensure_root(&mut self) {
        if self.nodes.is_empty() {
            self.nodes.push(Fragment {
                kind: FragmentKind::Root,
                parent: None,
                children: Vec::new(),
            });
            self.cursor = ROOT;
        }
    }

    fn void_cursor(&self) -> Option<&str> {
        match &self.nodes[self.cursor].kind {
            FragmentKind::Element { name, is_void, .. } if *is_void => Some(name),
            _ => None,
        }
    }
}
