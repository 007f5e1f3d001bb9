//! Static HTML5 element classification tables.

/// Void elements: no content model, always serialized self-closing.
pub(crate) const VOID_ELEMENTS: [&str; 16] = [
    "area", "base", "br", "col", "command", "embed", "hr", "img", "input", "keygen", "link",
    "meta", "param", "source", "track", "wbr",
];

/// Phrasing-level elements. Inside a translating scope these continue the
/// surrounding phrase instead of opening a translation context of their own.
pub(crate) const PHRASING_ELEMENTS: [&str; 49] = [
    "a", "abbr", "audio", "b", "bdi", "bdo", "br", "button", "canvas", "cite", "code", "data",
    "del", "dfn", "em", "embed", "i", "iframe", "img", "input", "ins", "kbd", "label", "map",
    "mark", "meter", "noscript", "object", "output", "picture", "progress", "q", "rb", "rp",
    "rt", "rtc", "ruby", "s", "samp", "small", "span", "strong", "sub", "sup", "time", "u",
    "var", "video", "wbr",
];

pub(crate) fn is_void(name: &str) -> bool {
    VOID_ELEMENTS.iter().any(|v| name.eq_ignore_ascii_case(v))
}

pub(crate) fn is_phrasing(name: &str) -> bool {
    PHRASING_ELEMENTS.iter().any(|v| name.eq_ignore_ascii_case(v))
}
