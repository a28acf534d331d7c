//! Column mapping types
//!
//! Strongly-typed description of how a vendor CSV export maps onto the
//! `Shipments` and `ShipmentCosts` tables. The set of destination fields is
//! closed: every [`Field`] knows its table and column, so a mapping can be
//! validated once at load time instead of being trusted row by row.

use crate::types::ReconcileError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of one vendor export format (1 to 39)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileId(u8);

impl FileId {
    /// Lowest accepted identifier
    pub const MIN: u8 = 1;
    /// Highest accepted identifier
    pub const MAX: u8 = 39;

    /// Create a FileId, returning `None` when out of range
    pub fn new(value: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&value).then_some(Self(value))
    }

    /// Numeric value of the identifier
    pub fn get(self) -> u8 {
        self.0
    }

    /// Name of the CSV export for this identifier, e.g. `8.csv`
    pub fn file_name(self) -> String {
        format!("{}.csv", self.0)
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FileId {
    type Err = ReconcileError;

    /// Accepts plain decimal digits without sign or leading zero
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ReconcileError::InvalidFileId {
            value: s.to_string(),
            min: Self::MIN,
            max: Self::MAX,
        };

        if s.is_empty() || s.starts_with('0') || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        s.parse::<u8>().ok().and_then(Self::new).ok_or_else(invalid)
    }
}

/// Destination table of a mapped field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Table {
    Shipments,
    ShipmentCosts,
}

impl Table {
    /// Quoted SQL identifier of the table
    pub fn sql_name(self) -> &'static str {
        match self {
            Table::Shipments => "\"Shipments\"",
            Table::ShipmentCosts => "\"ShipmentCosts\"",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Table::Shipments => write!(f, "Shipments"),
            Table::ShipmentCosts => write!(f, "ShipmentCosts"),
        }
    }
}

/// Every field the reconciler knows how to read or write
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    TrackingCode,
    ShippingInvoiceNumber,
    ShipmentCurrency,
    TotalShipmentCost,
    TaxCharges,
    FuelCharges,
    OtherCosts,
    ShippingCost,
    SurchargeCost,
    InsuranceCost,
    Status,
}

impl Field {
    /// All known fields, in canonical order
    pub const ALL: [Field; 11] = [
        Field::TrackingCode,
        Field::ShippingInvoiceNumber,
        Field::ShipmentCurrency,
        Field::TotalShipmentCost,
        Field::TaxCharges,
        Field::FuelCharges,
        Field::OtherCosts,
        Field::ShippingCost,
        Field::SurchargeCost,
        Field::InsuranceCost,
        Field::Status,
    ];

    /// Cost fields that may be written by an update
    pub const COST_FIELDS: [Field; 8] = [
        Field::ShipmentCurrency,
        Field::TotalShipmentCost,
        Field::TaxCharges,
        Field::FuelCharges,
        Field::OtherCosts,
        Field::ShippingCost,
        Field::SurchargeCost,
        Field::InsuranceCost,
    ];

    /// Column name in the destination table
    pub fn column(self) -> &'static str {
        match self {
            Field::TrackingCode => "tracking_code",
            Field::ShippingInvoiceNumber => "shipping_invoice_number",
            Field::ShipmentCurrency => "shipment_currency",
            Field::TotalShipmentCost => "total_shipment_cost",
            Field::TaxCharges => "tax_charges",
            Field::FuelCharges => "fuel_charges",
            Field::OtherCosts => "other_costs",
            Field::ShippingCost => "shipping_cost",
            Field::SurchargeCost => "surcharge_cost",
            Field::InsuranceCost => "insurance_cost",
            Field::Status => "status",
        }
    }

    /// Table the field lives in
    pub fn table(self) -> Table {
        match self {
            Field::TrackingCode | Field::ShippingInvoiceNumber => Table::Shipments,
            _ => Table::ShipmentCosts,
        }
    }

    /// Whether an update may write this field
    ///
    /// `status` belongs to `ShipmentCosts` but is only ever read.
    pub fn is_cost(self) -> bool {
        self.table() == Table::ShipmentCosts && self != Field::Status
    }

    /// Whether the field holds a monetary amount (everything but the currency)
    pub fn is_amount(self) -> bool {
        self.is_cost() && self != Field::ShipmentCurrency
    }

    /// Look a field up by its column name
    pub fn from_column(column: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|field| field.column() == column)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Field used to locate the database row for a file's records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyColumn {
    #[default]
    TrackingCode,
    ShippingInvoiceNumber,
}

impl KeyColumn {
    /// The record field holding the key
    pub fn field(self) -> Field {
        match self {
            KeyColumn::TrackingCode => Field::TrackingCode,
            KeyColumn::ShippingInvoiceNumber => Field::ShippingInvoiceNumber,
        }
    }

    /// Column name in `Shipments`
    pub fn column(self) -> &'static str {
        self.field().column()
    }
}

impl fmt::Display for KeyColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Where a field's value comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Copy the named CSV column
    Column,
    /// Use the literal value for every row
    Constant,
}

/// One output field of a file mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEntry {
    /// Destination field
    pub key: Field,
    /// Source column name, or the literal for constants
    pub file: String,
    /// How `file` is interpreted
    #[serde(rename = "type")]
    pub kind: SourceKind,
    /// Declared destination table; must match `key.table()`
    pub table: Table,
}

impl MappingEntry {
    /// Entry copying a CSV column into `key`
    pub fn column(key: Field, source: &str) -> Self {
        Self {
            key,
            file: source.to_string(),
            kind: SourceKind::Column,
            table: key.table(),
        }
    }

    /// Entry setting `key` to a literal
    pub fn constant(key: Field, value: &str) -> Self {
        Self {
            key,
            file: value.to_string(),
            kind: SourceKind::Constant,
            table: key.table(),
        }
    }
}

/// Complete, validated mapping for one file identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMapping {
    pub id: FileId,
    /// Field used to locate the database row
    pub key: KeyColumn,
    /// Blocked files are skipped before any record is read
    pub blocked: bool,
    /// Fields whose values are stripped down to digits, `.` and `-`
    pub numeric_fields: Vec<Field>,
    /// Output fields in declaration order
    pub entries: Vec<MappingEntry>,
}

impl FileMapping {
    /// Mapping entry for a field, if mapped
    pub fn entry(&self, field: Field) -> Option<&MappingEntry> {
        self.entries.iter().find(|entry| entry.key == field)
    }

    /// Whether values of `field` get numeric stripping in this file
    pub fn strips(&self, field: Field) -> bool {
        self.numeric_fields.contains(&field)
    }

    /// Source columns this mapping reads from the CSV header
    pub fn source_columns(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|entry| entry.kind == SourceKind::Column)
            .map(|entry| entry.file.as_str())
    }
}
