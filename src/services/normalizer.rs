use crate::models::{CanonicalField, HeaderMap, ImportRecord, ItemStatus, ValidationIssue};
use crate::utils::{first_number, parse_float_or_zero, parse_leading_float};

/// Turns one row of cells into a typed record plus its validation issues. Never fails:
/// unparseable numbers fall back to 0 (or unset for the conversion rate).
pub fn normalize(
    row: &[String],
    header_map: &HeaderMap,
    row_number: usize,
) -> (ImportRecord, Vec<ValidationIssue>) {
    let text = |field: CanonicalField| header_map.cell(row, field).trim().to_string();
    let number = |field: CanonicalField| parse_float_or_zero(header_map.cell(row, field));

    let tax_rate_raw = text(CanonicalField::TaxRate);
    let inclusive_of_tax_raw = text(CanonicalField::InclusiveOfTax);
    let conversion_rate_raw = text(CanonicalField::ConversionRate);

    let record = ImportRecord {
        name: text(CanonicalField::Name),
        item_code: text(CanonicalField::ItemCode),
        category: text(CanonicalField::Category),
        hsn: text(CanonicalField::Hsn),
        sale_price: number(CanonicalField::SalePrice),
        purchase_price: number(CanonicalField::PurchasePrice),
        wholesale_price: number(CanonicalField::WholesalePrice),
        discount_type: text(CanonicalField::DiscountType),
        sale_discount: number(CanonicalField::SaleDiscount),
        opening_stock_quantity: number(CanonicalField::OpeningStockQuantity),
        minimum_stock_quantity: number(CanonicalField::MinimumStockQuantity),
        item_location: text(CanonicalField::ItemLocation),
        tax_rate: first_number(&tax_rate_raw).unwrap_or(0.0),
        inclusive_of_tax: parse_inclusive(&inclusive_of_tax_raw),
        conversion_rate: if conversion_rate_raw.is_empty() {
            None
        } else {
            parse_leading_float(&conversion_rate_raw)
        },
        tax_rate_raw,
        inclusive_of_tax_raw,
        conversion_rate_raw,
        base_unit: text(CanonicalField::BaseUnit),
        secondary_unit: text(CanonicalField::SecondaryUnit),
        status: ItemStatus::Active,
        row_number,
    };

    let issues = validate(&record);
    (record, issues)
}

fn parse_inclusive(raw: &str) -> bool {
    matches!(raw.to_lowercase().as_str(), "inclusive" | "yes" | "true")
}

pub fn validate(record: &ImportRecord) -> Vec<ValidationIssue> {
    let row = record.row_number;
    let mut issues = Vec::new();

    if record.name.trim().is_empty() {
        issues.push(ValidationIssue::new(row, CanonicalField::Name, "Item name is required"));
    }
    let prices = [
        (CanonicalField::SalePrice, record.sale_price, "Sale price cannot be negative"),
        (CanonicalField::PurchasePrice, record.purchase_price, "Purchase price cannot be negative"),
        (CanonicalField::WholesalePrice, record.wholesale_price, "Wholesale price cannot be negative"),
    ];
    for (field, value, message) in prices {
        if value < 0.0 {
            issues.push(ValidationIssue::new(row, field, message));
        }
    }
    if record.minimum_stock_quantity < 0.0 {
        issues.push(ValidationIssue::new(
            row,
            CanonicalField::MinimumStockQuantity,
            "Minimum stock cannot be negative",
        ));
    }
    if record.tax_rate < 0.0 || record.tax_rate > 100.0 {
        issues.push(ValidationIssue::new(
            row,
            CanonicalField::TaxRate,
            "Tax rate must be between 0 and 100",
        ));
    }
    if !record.base_unit.is_empty() && !record.secondary_unit.is_empty() {
        let valid = matches!(record.conversion_rate, Some(rate) if rate > 0.0);
        if !valid {
            issues.push(ValidationIssue::new(
                row,
                CanonicalField::ConversionRate,
                "Conversion rate must be greater than 0 when both units are set",
            ));
        }
    }

    issues
}
