use crate::models::{Amount, CompanyId, StockItemId, ValidationError, validation::non_empty};
use time::OffsetDateTime;

/// An inventory item that can appear on item vouchers.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StockItem {
    /// Unique identifier
    pub id: StockItemId,
    /// The owning company
    pub company_id: CompanyId,
    /// The editable item details
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub data: StockItemData,
    /// When the item was created
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    #[cfg_attr(feature = "schemars", schemars(with = "String"))]
    pub created_at: OffsetDateTime,
}

/// The editable details of a stock item.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StockItemData {
    /// Name, unique within the company
    pub name: String,
    /// Unit of measure (e.g. `pcs`, `kg`)
    pub unit: String,
    /// Whether sales and purchases of this item are taxable
    #[cfg_attr(feature = "serde", serde(default = "default_true"))]
    pub vat_applicable: bool,
    /// Quantity on hand when the books were opened
    #[cfg_attr(feature = "serde", serde(default))]
    pub opening_quantity: f64,
    /// Unit cost of the opening quantity
    #[cfg_attr(feature = "serde", serde(default))]
    pub opening_rate: Amount,
}

#[cfg(feature = "serde")]
fn default_true() -> bool {
    true
}

impl StockItemData {
    /// Trim and check the name and unit, and the opening stock.
    pub fn validate(self) -> Result<Self, ValidationError> {
        if !self.opening_quantity.is_finite() || self.opening_quantity < 0.0 {
            return Err(ValidationError::InvalidQuantity);
        }
        if self.opening_rate.is_negative() {
            return Err(ValidationError::NegativeRate);
        }
        if self.opening_rate.checked_scale(self.opening_quantity).is_none() {
            return Err(ValidationError::AmountOutOfRange);
        }
        Ok(Self {
            name: non_empty("name", &self.name)?,
            unit: non_empty("unit", &self.unit)?,
            ..self
        })
    }
}
