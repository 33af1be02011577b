//! Storage SOP class extraction from the toolkit's `dcuid.h`.
//!
//! Every line of the form `#define UID_<Name>Storage "<uid>"` contributes one entry. The
//! entries are sorted by name over the whole header, padded to one shared column width and
//! then split into current, draft and retired classes, so the three resulting tables line up
//! and keep the global alphabetical order.

use crate::align::{align, AlignedEntry, UidEntry};
use crate::constants::{DRAFT_PREFIX, RETIRED_PREFIX};
use regex::Regex;
use std::io::BufRead;
use std::sync::LazyLock;

static STORAGE_DEFINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^#define UID_(.+?Storage)\s*"(.+?)""#).expect("valid storage pattern")
});

/// Lifecycle status of a Storage SOP class, derived from its symbolic name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SopClassStatus {
    Current,
    Draft,
    Retired,
}

impl SopClassStatus {
    /// Classify by name prefix: `RETIRED...` is retired, `DRAFT...` is draft, anything else
    /// is current.
    pub fn of(name: &str) -> Self {
        if name.starts_with(RETIRED_PREFIX) {
            Self::Retired
        } else if name.starts_with(DRAFT_PREFIX) {
            Self::Draft
        } else {
            Self::Current
        }
    }
}

/// The three aligned Storage SOP class tables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageClasses {
    pub current: Vec<AlignedEntry>,
    pub draft: Vec<AlignedEntry>,
    pub retired: Vec<AlignedEntry>,
}

impl StorageClasses {
    /// Total number of entries across the three tables.
    pub fn len(&self) -> usize {
        self.current.len() + self.draft.len() + self.retired.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Match a single header line. Returns `None` for anything that is not a Storage UID define.
pub fn parse_storage_line(line: &str) -> Option<UidEntry> {
    let caps = STORAGE_DEFINE.captures(line)?;
    Some(UidEntry::new(&caps[1], &caps[2]))
}

/// Collect every Storage UID define from the header, in file order.
///
/// Bytes that are not valid UTF-8 are replaced rather than rejected; such lines cannot
/// contain a well-formed define anyway.
///
/// # Errors
///
/// Returns the underlying I/O error if `reader` fails.
pub fn scan_storage_uids(reader: impl BufRead) -> std::io::Result<Vec<UidEntry>> {
    reader.split(b'\n').try_fold(
        Vec::new(),
        |mut entries, line| -> std::io::Result<Vec<UidEntry>> {
            let line = line?;
            let text = String::from_utf8_lossy(&line);
            if let Some(entry) = parse_storage_line(text.trim_end_matches('\r')) {
                entries.push(entry);
            }
            Ok(entries)
        },
    )
}

/// Sort, align and classify raw Storage entries.
///
/// Ordering is by name, then UID, so the result does not depend on input order.
pub fn classify(mut entries: Vec<UidEntry>) -> StorageClasses {
    entries.sort();

    let aligned = align(&entries);
    let mut classes = StorageClasses::default();
    for (raw, entry) in entries.iter().zip(aligned) {
        match SopClassStatus::of(&raw.name) {
            SopClassStatus::Current => classes.current.push(entry),
            SopClassStatus::Draft => classes.draft.push(entry),
            SopClassStatus::Retired => classes.retired.push(entry),
        }
    }
    classes
}

/// Scan the header and classify the Storage SOP classes it declares.
///
/// # Errors
///
/// Returns the underlying I/O error if `reader` fails.
pub fn extract_storage_classes(reader: impl BufRead) -> std::io::Result<StorageClasses> {
    let entries = scan_storage_uids(reader)?;
    if entries.is_empty() {
        tracing::warn!("No Storage SOP class defines found in header");
    }

    let classes = classify(entries);
    tracing::info!(
        "Extracted {} Storage SOP classes ({} current, {} draft, {} retired)",
        classes.len(),
        classes.current.len(),
        classes.draft.len(),
        classes.retired.len()
    );
    Ok(classes)
}
