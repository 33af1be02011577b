//! Transfer syntax table loaded from the local JSON data file.

use crate::align::{align, AlignedEntry, UidEntry};
use crate::constants::TRANSFER_SYNTAX_SUFFIX;
use crate::{ConformanceError, ConformanceResult};
use serde::Deserialize;
use std::path::Path;

/// One record of the transfer syntax data file. Other fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct TransferSyntaxRecord {
    #[serde(rename = "Value")]
    pub value: String,
    #[serde(rename = "UID")]
    pub uid: String,
}

impl TransferSyntaxRecord {
    /// `<Value>TransferSyntax`, paired with the record's UID.
    pub fn to_entry(&self) -> UidEntry {
        UidEntry::new(format!("{}{}", self.value, TRANSFER_SYNTAX_SUFFIX), &self.uid)
    }
}

/// Normalise records into aligned entries sorted by UID.
///
/// UIDs compare as plain strings, so `1.2.840.10008.1.2.4.100` sorts before
/// `1.2.840.10008.1.2.4.50`. Entries sharing a UID are ordered by name.
pub fn normalise(records: &[TransferSyntaxRecord]) -> Vec<AlignedEntry> {
    let mut entries: Vec<UidEntry> = records.iter().map(TransferSyntaxRecord::to_entry).collect();
    entries.sort_by(|a, b| a.uid.cmp(&b.uid).then_with(|| a.name.cmp(&b.name)));
    align(&entries)
}

/// Parse the transfer syntax data (a JSON array of `{ "Value", "UID" }` records).
///
/// # Errors
///
/// Returns `ConformanceError::DataFormat` if `json` is not an array of such records.
pub fn parse_transfer_syntaxes(json: &str) -> ConformanceResult<Vec<AlignedEntry>> {
    let records: Vec<TransferSyntaxRecord> = serde_json::from_str(json)?;
    Ok(normalise(&records))
}

/// Read and normalise the transfer syntax data file.
///
/// # Errors
///
/// Returns `ConformanceError::FileRead` if the file cannot be read and
/// `ConformanceError::DataFormat` if its content is malformed.
pub fn load_transfer_syntaxes(path: &Path) -> ConformanceResult<Vec<AlignedEntry>> {
    let json = std::fs::read_to_string(path).map_err(|source| ConformanceError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let entries = parse_transfer_syntaxes(&json)?;
    tracing::info!(
        "Loaded {} transfer syntaxes from {}",
        entries.len(),
        path.display()
    );
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_single_record() {
        let entries =
            parse_transfer_syntaxes(r#"[{"Value":"ImplicitVRLittleEndian","UID":"1.2.840.10008.1.2"}]"#)
                .unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].padded_name(), "ImplicitVRLittleEndianTransferSyntax");
        assert_eq!(entries[0].uid(), "1.2.840.10008.1.2");
    }

    #[test]
    fn test_sorted_by_uid_as_string() {
        let json = r#"[
            {"Value": "JPEGProcess1", "UID": "1.2.840.10008.1.2.4.50"},
            {"Value": "MPEG2MainProfileAtMainLevel", "UID": "1.2.840.10008.1.2.4.100"},
            {"Value": "LittleEndianImplicit", "UID": "1.2.840.10008.1.2"}
        ]"#;

        let entries = parse_transfer_syntaxes(json).unwrap();
        let uids: Vec<&str> = entries.iter().map(AlignedEntry::uid).collect();

        assert_eq!(
            uids,
            vec![
                "1.2.840.10008.1.2",
                "1.2.840.10008.1.2.4.100",
                "1.2.840.10008.1.2.4.50"
            ]
        );
        let width = "MPEG2MainProfileAtMainLevelTransferSyntax".len();
        assert!(entries.iter().all(|e| e.width() == width));
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let json = r#"[{"Value":"XML","UID":"1.2.840.10008.1.2.6.2","Retired":false,"Name":"XML Encoding"}]"#;
        let entries = parse_transfer_syntaxes(json).unwrap();

        assert_eq!(entries[0].name(), "XMLTransferSyntax");
    }

    #[test]
    fn test_order_is_deterministic() {
        let forward = r#"[
            {"Value": "B", "UID": "1.2"},
            {"Value": "A", "UID": "1.2"},
            {"Value": "C", "UID": "1.1"}
        ]"#;
        let shuffled = r#"[
            {"Value": "C", "UID": "1.1"},
            {"Value": "A", "UID": "1.2"},
            {"Value": "B", "UID": "1.2"}
        ]"#;

        let a = parse_transfer_syntaxes(forward).unwrap();
        let b = parse_transfer_syntaxes(shuffled).unwrap();

        assert_eq!(a, b);
        assert_eq!(a[1].name(), "ATransferSyntax");
    }

    #[test]
    fn test_malformed_data() {
        for json in [
            "{}",
            "[{\"Value\": \"X\"}]",
            "[{\"Value\": 1, \"UID\": \"1.2\"}]",
            "not json",
        ] {
            match parse_transfer_syntaxes(json) {
                Err(ConformanceError::DataFormat(_)) => {}
                other => panic!("Expected DataFormat error for {json}, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_load_bundled_data_file() {
        let path =
            Path::new(env!("CARGO_MANIFEST_DIR")).join("resources/DicomTransferSyntaxes.json");

        let entries = load_transfer_syntaxes(&path).unwrap();

        assert!(!entries.is_empty());
        assert_eq!(entries[0].name(), "LittleEndianImplicitTransferSyntax");
        assert!(entries.windows(2).all(|w| w[0].uid() <= w[1].uid()));
        let width = entries[0].width();
        assert!(entries.iter().all(|e| e.width() == width));
    }

    #[test]
    fn test_load_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = load_transfer_syntaxes(&temp.path().join("absent.json")).unwrap_err();

        assert!(matches!(err, ConformanceError::FileRead { .. }));
    }
}
