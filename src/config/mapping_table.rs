//! Column mapping table
//!
//! Loads the per-file column mappings from TOML and validates them against the
//! closed set of known fields. The table is built once at startup and shared
//! read-only by every pipeline.
//!
//! # Format
//!
//! ```toml
//! [files.17]
//! key = "shipping_invoice_number"       # default: tracking_code
//! blocked = false                        # default: false
//! numeric_fields = ["total_shipment_cost"]
//! fields = [
//!   { key = "shipping_invoice_number", file = "Invoice", type = "column", table = "Shipments" },
//!   { key = "shipment_currency", file = "EUR", type = "constant", table = "ShipmentCosts" },
//! ]
//! ```

use crate::types::{
    Field, FileId, FileMapping, KeyColumn, MappingEntry, ReconcileError, SourceKind,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// Mapping table shipped with the binary
const DEFAULT_MAPPINGS: &str = include_str!("../../config/column_mappings.toml");

/// Serialized form of the table, as written in TOML
#[derive(Debug, Default, Serialize, Deserialize)]
struct RawMappingTable {
    #[serde(default)]
    files: BTreeMap<String, RawFileMapping>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RawFileMapping {
    #[serde(default)]
    key: KeyColumn,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    blocked: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    numeric_fields: Vec<Field>,
    #[serde(default)]
    fields: Vec<MappingEntry>,
}

impl From<&FileMapping> for RawFileMapping {
    fn from(mapping: &FileMapping) -> Self {
        Self {
            key: mapping.key,
            blocked: mapping.blocked,
            numeric_fields: mapping.numeric_fields.clone(),
            fields: mapping.entries.clone(),
        }
    }
}

/// Validated file identifier → mapping table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingTable {
    files: BTreeMap<FileId, FileMapping>,
}

impl MappingTable {
    /// Table embedded in the binary
    pub fn embedded() -> Result<Self, ReconcileError> {
        Self::from_toml_str(DEFAULT_MAPPINGS)
    }

    /// Load and validate a table from a TOML file
    pub fn load(path: &Path) -> Result<Self, ReconcileError> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ReconcileError::file_not_found(path),
            _ => e.into(),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a table from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ReconcileError> {
        let raw: RawMappingTable = toml::from_str(content)?;

        let mappings = raw
            .files
            .into_iter()
            .map(|(id, raw)| {
                let file_id = id
                    .parse::<FileId>()
                    .map_err(|e| ReconcileError::invalid_mapping(&id, e.to_string()))?;
                Ok(FileMapping {
                    id: file_id,
                    key: raw.key,
                    blocked: raw.blocked,
                    numeric_fields: raw.numeric_fields,
                    entries: raw.fields,
                })
            })
            .collect::<Result<Vec<_>, ReconcileError>>()?;

        Self::from_mappings(mappings)
    }

    /// Build a table from already-typed mappings, validating each one
    pub fn from_mappings(mappings: Vec<FileMapping>) -> Result<Self, ReconcileError> {
        let mut files = BTreeMap::new();

        for mapping in mappings {
            validate(&mapping)?;
            let id = mapping.id;
            if files.insert(id, mapping).is_some() {
                return Err(ReconcileError::invalid_mapping(id, "file declared twice"));
            }
        }

        Ok(Self { files })
    }

    /// Mapping for a file identifier
    pub fn get(&self, file_id: FileId) -> Option<&FileMapping> {
        self.files.get(&file_id)
    }

    /// Mapping for a file identifier, or `UnknownFileId`
    pub fn require(&self, file_id: FileId) -> Result<&FileMapping, ReconcileError> {
        self.get(file_id)
            .ok_or(ReconcileError::UnknownFileId { file_id })
    }

    /// All mappings in file identifier order
    pub fn iter(&self) -> impl Iterator<Item = &FileMapping> {
        self.files.values()
    }

    pub fn file_ids(&self) -> Vec<FileId> {
        self.files.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Render the table in the same TOML format it is loaded from
    pub fn to_toml_string(&self) -> Result<String, ReconcileError> {
        let raw = RawMappingTable {
            files: self
                .files
                .iter()
                .map(|(id, mapping)| (id.to_string(), RawFileMapping::from(mapping)))
                .collect(),
        };
        Ok(toml::to_string_pretty(&raw)?)
    }
}

fn validate(mapping: &FileMapping) -> Result<(), ReconcileError> {
    let id = mapping.id;
    let mut seen = HashSet::new();

    for entry in &mapping.entries {
        if !seen.insert(entry.key) {
            return Err(ReconcileError::invalid_mapping(
                id,
                format!("field {} mapped more than once", entry.key),
            ));
        }
        if entry.table != entry.key.table() {
            return Err(ReconcileError::invalid_mapping(
                id,
                format!(
                    "field {} belongs to {}, not {}",
                    entry.key,
                    entry.key.table(),
                    entry.table
                ),
            ));
        }
        if entry.kind == SourceKind::Column && entry.file.trim().is_empty() {
            return Err(ReconcileError::invalid_mapping(
                id,
                format!("field {} has an empty source column", entry.key),
            ));
        }
    }

    for field in &mapping.numeric_fields {
        match mapping.entry(*field) {
            Some(entry) if entry.kind == SourceKind::Column && field.is_amount() => {}
            _ => {
                return Err(ReconcileError::invalid_mapping(
                    id,
                    format!("numeric field {} must be a mapped amount column", field),
                ))
            }
        }
    }

    // Blocked files are never read, so they may omit their fields entirely
    if !mapping.blocked && mapping.entry(mapping.key.field()).is_none() {
        return Err(ReconcileError::invalid_mapping(
            id,
            format!("key field {} is not mapped", mapping.key),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn file(id: u8) -> FileId {
        FileId::new(id).unwrap()
    }

    #[test]
    fn test_embedded_table_loads() {
        let table = MappingTable::embedded().unwrap();
        assert!(!table.is_empty());

        for id in [15, 16, 18] {
            assert!(table.get(file(id)).unwrap().blocked, "file {} should be blocked", id);
        }
        for id in [17, 18] {
            assert_eq!(table.get(file(id)).unwrap().key, KeyColumn::ShippingInvoiceNumber);
        }
        for id in [8, 25, 26] {
            assert!(table.get(file(id)).unwrap().strips(Field::TotalShipmentCost));
        }
        assert_eq!(table.get(file(1)).unwrap().key, KeyColumn::TrackingCode);
    }

    #[test]
    fn test_parse_full_entry() {
        let table = MappingTable::from_toml_str(
            r#"
            [files.17]
            key = "shipping_invoice_number"
            numeric_fields = ["total_shipment_cost"]
            fields = [
              { key = "shipping_invoice_number", file = "Invoice", type = "column", table = "Shipments" },
              { key = "total_shipment_cost", file = "Total", type = "column", table = "ShipmentCosts" },
              { key = "shipment_currency", file = "EUR", type = "constant", table = "ShipmentCosts" },
            ]
            "#,
        )
        .unwrap();

        let mapping = table.get(file(17)).unwrap();
        assert_eq!(mapping.key, KeyColumn::ShippingInvoiceNumber);
        assert!(!mapping.blocked);
        assert_eq!(mapping.entries.len(), 3);
        assert_eq!(mapping.entries[2], MappingEntry::constant(Field::ShipmentCurrency, "EUR"));
        assert_eq!(mapping.source_columns().collect::<Vec<_>>(), vec!["Invoice", "Total"]);
    }

    #[test]
    fn test_file_ids_sorted_numerically() {
        let table = MappingTable::from_toml_str(
            r#"
            [files.10]
            blocked = true
            [files.2]
            blocked = true
            [files.1]
            blocked = true
            "#,
        )
        .unwrap();
        assert_eq!(table.file_ids(), vec![file(1), file(2), file(10)]);
    }

    #[rstest]
    #[case::out_of_range(
        "[files.40]\nblocked = true\n",
        "Invalid mapping for file 40"
    )]
    #[case::not_a_number(
        "[files.abc]\nblocked = true\n",
        "Invalid mapping for file abc"
    )]
    #[case::wrong_table(
        r#"[files.3]
        fields = [{ key = "tracking_code", file = "T", type = "column", table = "ShipmentCosts" }]"#,
        "belongs to Shipments"
    )]
    #[case::duplicate_field(
        r#"[files.3]
        fields = [
          { key = "tracking_code", file = "T", type = "column", table = "Shipments" },
          { key = "tracking_code", file = "U", type = "column", table = "Shipments" },
        ]"#,
        "mapped more than once"
    )]
    #[case::key_not_mapped(
        r#"[files.3]
        key = "shipping_invoice_number"
        fields = [{ key = "tracking_code", file = "T", type = "column", table = "Shipments" }]"#,
        "key field shipping_invoice_number is not mapped"
    )]
    #[case::numeric_constant(
        r#"[files.3]
        numeric_fields = ["total_shipment_cost"]
        fields = [
          { key = "tracking_code", file = "T", type = "column", table = "Shipments" },
          { key = "total_shipment_cost", file = "0", type = "constant", table = "ShipmentCosts" },
        ]"#,
        "must be a mapped amount column"
    )]
    #[case::empty_column(
        r#"[files.3]
        fields = [{ key = "tracking_code", file = " ", type = "column", table = "Shipments" }]"#,
        "empty source column"
    )]
    fn test_invalid_tables(#[case] toml: &str, #[case] expected: &str) {
        let err = MappingTable::from_toml_str(toml).unwrap_err();
        assert!(
            err.to_string().contains(expected),
            "expected '{}' in '{}'",
            expected,
            err
        );
    }

    #[test]
    fn test_unknown_field_rejected_by_parser() {
        let err = MappingTable::from_toml_str(
            r#"[files.3]
            fields = [{ key = "weight", file = "W", type = "column", table = "Shipments" }]"#,
        )
        .unwrap_err();
        assert!(matches!(err, ReconcileError::ConfigError { .. }));
    }

    #[test]
    fn test_require_unknown_file() {
        let table = MappingTable::default();
        assert_eq!(
            table.require(file(5)).unwrap_err(),
            ReconcileError::UnknownFileId { file_id: file(5) }
        );
    }

    #[test]
    fn test_toml_rendering_reloads_identically() {
        let table = MappingTable::embedded().unwrap();
        let rendered = table.to_toml_string().unwrap();
        assert_eq!(MappingTable::from_toml_str(&rendered).unwrap(), table);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[files.4]\nblocked = true\n").unwrap();
        file.flush().unwrap();

        let table = MappingTable::load(file.path()).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_load_missing_file() {
        let err = MappingTable::load(Path::new("does/not/exist.toml")).unwrap_err();
        assert!(matches!(err, ReconcileError::FileNotFound { .. }));
    }
}
