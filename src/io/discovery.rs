//! Column discovery
//!
//! Derives a mapping table from the discovery sheet (`main.csv`). The sheet
//! has one row per export: a `FileNumber` column plus one column per known
//! field, each cell naming the vendor column that feeds that field (`-` or
//! empty when the export does not carry it).
//!
//! ```text
//! FileNumber,tracking_code,shipping_invoice_number,total_shipment_cost,...
//! 1,Tracking Number,-,Total Charges,...
//! ```
//!
//! Rows without a usable key column are skipped with a warning; when a file
//! number appears twice the later row wins.

use crate::config::MappingTable;
use crate::io::async_reader::open_csv;
use crate::types::{
    normalize_value, Field, FileId, FileMapping, KeyColumn, MappingEntry, ReconcileError,
};
use csv_async::{AsyncReaderBuilder, StringRecord};
use futures::io::AsyncRead;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

/// Header of the column holding the file identifier
pub const FILE_NUMBER_COLUMN: &str = "FileNumber";

/// Read the discovery sheet at `path` and build a mapping table from it
pub async fn discover_file(path: &Path) -> Result<MappingTable, ReconcileError> {
    let file = open_csv(path).await?;
    discover_mappings(file).await
}

/// Build a mapping table from a discovery sheet
pub async fn discover_mappings<R>(reader: R) -> Result<MappingTable, ReconcileError>
where
    R: AsyncRead + Unpin + Send,
{
    let mut csv_reader = AsyncReaderBuilder::new()
        .flexible(true)
        .trim(csv_async::Trim::All)
        .create_reader(reader);

    let headers = csv_reader.headers().await?.clone();
    let id_position = headers
        .iter()
        .position(|header| header == FILE_NUMBER_COLUMN)
        .ok_or_else(|| ReconcileError::ParseError {
            line: Some(1),
            message: format!("discovery sheet has no '{}' column", FILE_NUMBER_COLUMN),
        })?;
    let field_positions: Vec<(Field, usize)> = headers
        .iter()
        .enumerate()
        .filter_map(|(index, header)| Field::from_column(header).map(|field| (field, index)))
        .collect();

    // Later rows for the same file replace earlier ones
    let mut mappings = BTreeMap::new();
    let mut row = StringRecord::new();

    while csv_reader.read_record(&mut row).await? {
        let raw_id = row.get(id_position).unwrap_or_default();
        let file_id = match raw_id.parse::<FileId>() {
            Ok(file_id) => file_id,
            Err(e) => {
                warn!(file_number = raw_id, error = %e, "skipping discovery row");
                continue;
            }
        };

        let entries: Vec<MappingEntry> = field_positions
            .iter()
            .filter_map(|(field, index)| {
                row.get(*index)
                    .and_then(normalize_value)
                    .map(|source| MappingEntry::column(*field, &source))
            })
            .collect();

        let key = if entries.iter().any(|e| e.key == Field::TrackingCode) {
            KeyColumn::TrackingCode
        } else if entries.iter().any(|e| e.key == Field::ShippingInvoiceNumber) {
            KeyColumn::ShippingInvoiceNumber
        } else {
            warn!(%file_id, "skipping discovery row without tracking code or invoice column");
            continue;
        };

        debug!(%file_id, fields = entries.len(), %key, "discovered mapping");
        mappings.insert(
            file_id,
            FileMapping {
                id: file_id,
                key,
                blocked: false,
                numeric_fields: Vec::new(),
                entries,
            },
        );
    }

    MappingTable::from_mappings(mappings.into_values().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SourceKind;
    use futures::io::Cursor;

    fn file(id: u8) -> FileId {
        FileId::new(id).unwrap()
    }

    #[tokio::test]
    async fn test_discovers_column_mappings() {
        let sheet = "FileNumber,tracking_code,shipping_invoice_number,total_shipment_cost,tax_charges,status\n\
                     1,Tracking Number,-,Total Charges,,Status\n\
                     17,-,Invoice Number,Invoice Total,Tax Amount,-\n";

        let table = discover_mappings(Cursor::new(sheet.as_bytes())).await.unwrap();
        assert_eq!(table.file_ids(), vec![file(1), file(17)]);

        let first = table.get(file(1)).unwrap();
        assert_eq!(first.key, KeyColumn::TrackingCode);
        assert_eq!(
            first.entries,
            vec![
                MappingEntry::column(Field::TrackingCode, "Tracking Number"),
                MappingEntry::column(Field::TotalShipmentCost, "Total Charges"),
                MappingEntry::column(Field::Status, "Status"),
            ]
        );

        let invoice = table.get(file(17)).unwrap();
        assert_eq!(invoice.key, KeyColumn::ShippingInvoiceNumber);
        assert!(invoice.entries.iter().all(|e| e.kind == SourceKind::Column));
        assert_eq!(invoice.entries.len(), 3);
    }

    #[tokio::test]
    async fn test_skips_unusable_rows() {
        let sheet = "FileNumber,tracking_code,total_shipment_cost\n\
                     abc,T,Total\n\
                     41,T,Total\n\
                     3,-,Total\n\
                     4,Tracking,-\n\
                     5,Old,-\n\
                     5,New,Total\n";

        let table = discover_mappings(Cursor::new(sheet.as_bytes())).await.unwrap();
        assert_eq!(table.file_ids(), vec![file(4), file(5)]);
        assert_eq!(table.get(file(5)).unwrap().entries.len(), 2);
    }

    #[tokio::test]
    async fn test_requires_file_number_column() {
        let sheet = "Id,tracking_code\n1,T\n";

        let err = discover_mappings(Cursor::new(sheet.as_bytes())).await.unwrap_err();
        assert!(matches!(err, ReconcileError::ParseError { line: Some(1), .. }));
    }

    #[tokio::test]
    async fn test_discovered_table_renders_as_toml() {
        let sheet = "FileNumber,tracking_code,fuel_charges\n2,AWB,Fuel\n";

        let table = discover_mappings(Cursor::new(sheet.as_bytes())).await.unwrap();
        let rendered = table.to_toml_string().unwrap();
        assert!(rendered.contains("AWB"));
        assert_eq!(MappingTable::from_toml_str(&rendered).unwrap(), table);
    }
}
