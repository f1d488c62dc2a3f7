use crate::models::{AccountId, Amount, StockItemId, VoucherId, VoucherType};
use time::Date;

/// A posted ledger entry, joined with the voucher it came from.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LedgerEntry {
    /// The originating voucher
    pub voucher_id: VoucherId,
    /// Type of the originating voucher
    pub voucher_type: VoucherType,
    /// Number of the originating voucher
    pub voucher_number: String,
    /// The account debited or credited
    pub account_id: AccountId,
    /// Voucher date
    #[cfg_attr(feature = "schemars", schemars(with = "String"))]
    pub date: Date,
    /// Debit amount
    pub debit: Amount,
    /// Credit amount
    pub credit: Amount,
}

impl LedgerEntry {
    /// Debit minus credit.
    pub fn net(&self) -> Amount {
        self.debit - self.credit
    }
}

/// A posted stock movement, joined with the voucher it came from.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StockMovement {
    /// The originating voucher
    pub voucher_id: VoucherId,
    /// Type of the originating voucher
    pub voucher_type: VoucherType,
    /// The item moved
    pub item_id: StockItemId,
    /// Voucher date
    #[cfg_attr(feature = "schemars", schemars(with = "String"))]
    pub date: Date,
    /// Quantity received
    pub inward: f64,
    /// Quantity issued
    pub outward: f64,
    /// Unit rate of the movement
    pub rate: Amount,
}
