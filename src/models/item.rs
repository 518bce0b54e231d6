use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Item attributes a spreadsheet column can be mapped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CanonicalField {
    Name,
    ItemCode,
    Category,
    Hsn,
    SalePrice,
    PurchasePrice,
    WholesalePrice,
    DiscountType,
    SaleDiscount,
    OpeningStockQuantity,
    MinimumStockQuantity,
    ItemLocation,
    TaxRate,
    InclusiveOfTax,
    BaseUnit,
    SecondaryUnit,
    ConversionRate,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 17] = [
        CanonicalField::Name,
        CanonicalField::ItemCode,
        CanonicalField::Category,
        CanonicalField::Hsn,
        CanonicalField::SalePrice,
        CanonicalField::PurchasePrice,
        CanonicalField::WholesalePrice,
        CanonicalField::DiscountType,
        CanonicalField::SaleDiscount,
        CanonicalField::OpeningStockQuantity,
        CanonicalField::MinimumStockQuantity,
        CanonicalField::ItemLocation,
        CanonicalField::TaxRate,
        CanonicalField::InclusiveOfTax,
        CanonicalField::BaseUnit,
        CanonicalField::SecondaryUnit,
        CanonicalField::ConversionRate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalField::Name => "name",
            CanonicalField::ItemCode => "itemCode",
            CanonicalField::Category => "category",
            CanonicalField::Hsn => "hsn",
            CanonicalField::SalePrice => "salePrice",
            CanonicalField::PurchasePrice => "purchasePrice",
            CanonicalField::WholesalePrice => "wholesalePrice",
            CanonicalField::DiscountType => "discountType",
            CanonicalField::SaleDiscount => "saleDiscount",
            CanonicalField::OpeningStockQuantity => "openingStockQuantity",
            CanonicalField::MinimumStockQuantity => "minimumStockQuantity",
            CanonicalField::ItemLocation => "itemLocation",
            CanonicalField::TaxRate => "taxRate",
            CanonicalField::InclusiveOfTax => "inclusiveOfTax",
            CanonicalField::BaseUnit => "baseUnit",
            CanonicalField::SecondaryUnit => "secondaryUnit",
            CanonicalField::ConversionRate => "conversionRate",
        }
    }

    /// Column label used in the downloadable template.
    pub fn label(&self) -> &'static str {
        match self {
            CanonicalField::Name => "Item Name*",
            CanonicalField::ItemCode => "Item Code",
            CanonicalField::Category => "Category",
            CanonicalField::Hsn => "HSN",
            CanonicalField::SalePrice => "Sale Price",
            CanonicalField::PurchasePrice => "Purchase Price",
            CanonicalField::WholesalePrice => "Online Store Price",
            CanonicalField::DiscountType => "Discount Type",
            CanonicalField::SaleDiscount => "Sale Discount",
            CanonicalField::OpeningStockQuantity => "Opening Stock Quantity",
            CanonicalField::MinimumStockQuantity => "Minimum Stock",
            CanonicalField::ItemLocation => "Item Location",
            CanonicalField::TaxRate => "Tax Rate",
            CanonicalField::InclusiveOfTax => "Inclusive Of Tax",
            CanonicalField::BaseUnit => "Base Unit",
            CanonicalField::SecondaryUnit => "Secondary Unit",
            CanonicalField::ConversionRate => "Conversion Rate",
        }
    }
}

impl std::fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical field -> zero-based column index, built once from the header row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderMap {
    columns: BTreeMap<CanonicalField, usize>,
}

impl HeaderMap {
    /// Keeps the first column seen for a field.
    pub fn insert(&mut self, field: CanonicalField, column: usize) {
        self.columns.entry(field).or_insert(column);
    }

    pub fn column(&self, field: CanonicalField) -> Option<usize> {
        self.columns.get(&field).copied()
    }

    pub fn contains(&self, field: CanonicalField) -> bool {
        self.columns.contains_key(&field)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Cell for `field`, or "" when the field is unmapped or the row is short.
    pub fn cell<'a>(&self, row: &'a [String], field: CanonicalField) -> &'a str {
        self.column(field)
            .and_then(|idx| row.get(idx))
            .map(|s| s.as_str())
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemStatus {
    Active,
}

/// One candidate item parsed from an input row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRecord {
    pub name: String,
    pub item_code: String,
    pub category: String,
    pub hsn: String,
    pub sale_price: f64,
    pub purchase_price: f64,
    pub wholesale_price: f64,
    pub discount_type: String,
    pub sale_discount: f64,
    pub opening_stock_quantity: f64,
    pub minimum_stock_quantity: f64,
    pub item_location: String,
    pub tax_rate: f64,
    pub tax_rate_raw: String,
    pub inclusive_of_tax: bool,
    pub inclusive_of_tax_raw: String,
    pub base_unit: String,
    pub secondary_unit: String,
    pub conversion_rate: Option<f64>,
    pub conversion_rate_raw: String,
    pub status: ItemStatus,
    /// Physical line number in the source text (header is line 1).
    #[serde(skip)]
    pub row_number: usize,
}

impl ImportRecord {
    /// Business key used for duplicate detection: item code, falling back to name.
    pub fn external_id(&self) -> &str {
        if self.item_code.is_empty() {
            &self.name
        } else {
            &self.item_code
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    pub row_index: usize,
    pub field: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(row_index: usize, field: CanonicalField, message: impl Into<String>) -> Self {
        ValidationIssue {
            row_index,
            field: field.as_str().to_string(),
            message: message.into(),
        }
    }
}

/// Outcome of one submitted batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkResult {
    pub ordinal: usize,
    pub size: usize,
    pub success_count: usize,
    pub error_count: usize,
    pub failed: bool,
    pub processing_time: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub success_count: usize,
    pub error_count: usize,
    pub skipped_count: usize,
}

impl ImportSummary {
    /// "N imported[, M failed][, K skipped]"
    pub fn message(&self) -> String {
        let mut message = format!("{} imported", self.success_count);
        if self.error_count > 0 {
            message.push_str(&format!(", {} failed", self.error_count));
        }
        if self.skipped_count > 0 {
            message.push_str(&format!(", {} skipped", self.skipped_count));
        }
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_message_omits_zero_counts() {
        let summary = ImportSummary {
            success_count: 5,
            error_count: 0,
            skipped_count: 0,
        };
        assert_eq!(summary.message(), "5 imported");

        let summary = ImportSummary {
            success_count: 5,
            error_count: 2,
            skipped_count: 3,
        };
        assert_eq!(summary.message(), "5 imported, 2 failed, 3 skipped");
    }

    #[test]
    fn header_map_keeps_first_column() {
        let mut map = HeaderMap::default();
        map.insert(CanonicalField::Name, 0);
        map.insert(CanonicalField::Name, 4);
        assert_eq!(map.column(CanonicalField::Name), Some(0));
    }

    #[test]
    fn cell_is_empty_for_unmapped_or_short_rows() {
        let mut map = HeaderMap::default();
        map.insert(CanonicalField::Hsn, 5);
        let row = vec!["Widget".to_string()];
        assert_eq!(map.cell(&row, CanonicalField::Hsn), "");
        assert_eq!(map.cell(&row, CanonicalField::Name), "");
    }
}
