//! Fixed-column alignment of symbolic names.

use serde::Serialize;

/// A named UID as extracted from its source, before any layout concern.
///
/// Identity and ordering use the raw `name`; padding is applied only when the entry is turned
/// into an [`AlignedEntry`] for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UidEntry {
    pub name: String,
    pub uid: String,
}

impl UidEntry {
    pub fn new(name: impl Into<String>, uid: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uid: uid.into(),
        }
    }
}

/// A [`UidEntry`] whose name has been right-padded with spaces to a shared column width.
///
/// Serialises as `{ "name": <padded name>, "uid": <uid> }` for the template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlignedEntry {
    name: String,
    uid: String,
}

impl AlignedEntry {
    /// The padded name, as it appears in the rendered document.
    pub fn padded_name(&self) -> &str {
        &self.name
    }

    /// The name without column padding.
    pub fn name(&self) -> &str {
        self.name.trim_end_matches(' ')
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// Column width the name was padded to.
    pub fn width(&self) -> usize {
        self.name.chars().count()
    }
}

/// Length, in characters, of the longest name in `names`. Zero for an empty input.
pub fn max_width<'a>(names: impl IntoIterator<Item = &'a str>) -> usize {
    names
        .into_iter()
        .map(|name| name.chars().count())
        .max()
        .unwrap_or(0)
}

/// Right-pad `name` with spaces to `width` characters. Longer names are left untouched.
pub fn pad(name: &str, width: usize) -> String {
    format!("{name:<width$}")
}

/// Pad every entry to the width of the longest name in `entries`, keeping their order.
///
/// Aligning entries that were already padded to a shared width changes nothing.
pub fn align(entries: &[UidEntry]) -> Vec<AlignedEntry> {
    let width = max_width(entries.iter().map(|e| e.name.as_str()));
    entries
        .iter()
        .map(|entry| AlignedEntry {
            name: pad(&entry.name, width),
            uid: entry.uid.clone(),
        })
        .collect()
}
