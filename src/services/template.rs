use anyhow::{anyhow, Result};
use std::path::Path;

use crate::models::CanonicalField;

fn example_value(field: CanonicalField) -> &'static str {
    match field {
        CanonicalField::Name => "Steel Bolt M8",
        CanonicalField::ItemCode => "ITM001",
        CanonicalField::Category => "Hardware",
        CanonicalField::Hsn => "7318",
        CanonicalField::SalePrice => "12.50",
        CanonicalField::PurchasePrice => "9.00",
        CanonicalField::WholesalePrice => "11.00",
        CanonicalField::DiscountType => "Percentage",
        CanonicalField::SaleDiscount => "0",
        CanonicalField::OpeningStockQuantity => "500",
        CanonicalField::MinimumStockQuantity => "50",
        CanonicalField::ItemLocation => "Rack A3",
        CanonicalField::TaxRate => "18.00",
        CanonicalField::InclusiveOfTax => "No",
        CanonicalField::BaseUnit => "Piece",
        CanonicalField::SecondaryUnit => "Box",
        CanonicalField::ConversionRate => "100",
    }
}

/// Header row with every field label plus one example row.
pub fn template_csv() -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(Vec::new());
    writer.write_record(CanonicalField::ALL.iter().map(|f| f.label()))?;
    writer.write_record(CanonicalField::ALL.iter().map(|f| example_value(*f)))?;
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow!("CSV buffer: {}", e))?;
    Ok(String::from_utf8(bytes)?)
}

pub fn write_template(path: &Path) -> Result<()> {
    std::fs::write(path, template_csv()?)?;
    Ok(())
}
