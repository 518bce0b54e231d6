use crate::models::{CanonicalField, HeaderMap};

/// Substring triggers per field, tested in order; the first matching rule wins.
/// `InclusiveOfTax` sits ahead of `TaxRate` so "Inclusive Of Tax" is not taken by the bare "tax".
const RULES: [(CanonicalField, &[&str]); 17] = [
    (CanonicalField::Name, &["item name", "name"]),
    (CanonicalField::ItemCode, &["item code", "code", "sku"]),
    (CanonicalField::Category, &["category"]),
    (CanonicalField::Hsn, &["hsn", "sac"]),
    (CanonicalField::SalePrice, &["sale price", "selling price"]),
    (CanonicalField::PurchasePrice, &["purchase price", "cost price", "buying price"]),
    (CanonicalField::WholesalePrice, &["wholesale", "online store price", "bulk price"]),
    (CanonicalField::DiscountType, &["discount type"]),
    (CanonicalField::SaleDiscount, &["sale discount", "discount"]),
    (CanonicalField::OpeningStockQuantity, &["current stock", "opening stock", "stock quantity"]),
    (CanonicalField::MinimumStockQuantity, &["minimum stock", "min stock"]),
    (CanonicalField::ItemLocation, &["location", "warehouse"]),
    (CanonicalField::InclusiveOfTax, &["inclusive", "tax inclusive"]),
    (CanonicalField::TaxRate, &["tax rate", "tax"]),
    (CanonicalField::BaseUnit, &["base unit", "primary unit"]),
    (CanonicalField::SecondaryUnit, &["secondary unit", "alternative unit"]),
    (CanonicalField::ConversionRate, &["conversion rate", "conversion factor"]),
];

pub fn match_header(header: &str) -> Option<CanonicalField> {
    let header = header.trim().to_lowercase();
    if header.is_empty() {
        return None;
    }
    RULES
        .iter()
        .find(|(_, triggers)| triggers.iter().any(|t| header.contains(t)))
        .map(|(field, _)| *field)
}

pub fn build_header_map(header_cells: &[String]) -> HeaderMap {
    let mut map = HeaderMap::default();
    for (idx, cell) in header_cells.iter().enumerate() {
        if let Some(field) = match_header(cell) {
            map.insert(field, idx);
        }
    }
    map
}
