use crate::models::{Account, AccountId, Amount, Voucher, VoucherId, VoucherTotals, VoucherType};
use rustc_hash::FxHashMap;
use std::ops::{Add, Sub};
use time::Date;

/// Taxable, exempt and VAT amounts of a group of vouchers.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VatTotals {
    /// Taxable amount
    pub taxable: Amount,
    /// Exempt amount
    pub non_vat: Amount,
    /// VAT amount
    pub vat: Amount,
    /// Grand total
    pub total: Amount,
}

impl From<VoucherTotals> for VatTotals {
    fn from(value: VoucherTotals) -> Self {
        Self {
            taxable: value.taxable,
            non_vat: value.non_vat,
            vat: value.vat,
            total: value.total,
        }
    }
}

impl Add for VatTotals {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            taxable: self.taxable + rhs.taxable,
            non_vat: self.non_vat + rhs.non_vat,
            vat: self.vat + rhs.vat,
            total: self.total + rhs.total,
        }
    }
}

impl Sub for VatTotals {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self {
            taxable: self.taxable - rhs.taxable,
            non_vat: self.non_vat - rhs.non_vat,
            vat: self.vat - rhs.vat,
            total: self.total - rhs.total,
        }
    }
}

/// One voucher in the VAT register.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VatRegisterRow {
    /// The voucher
    pub voucher_id: VoucherId,
    /// Voucher date
    #[cfg_attr(feature = "schemars", schemars(with = "String"))]
    pub date: Date,
    /// Voucher number
    pub number: String,
    /// Voucher type
    pub voucher_type: VoucherType,
    /// The counterparty
    pub party_account_id: AccountId,
    /// The counterparty's name
    pub party_name: String,
    /// The voucher's VAT breakdown
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub totals: VatTotals,
}

/// Output and input VAT over a date range.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VatReport {
    /// First day of the range
    #[cfg_attr(feature = "schemars", schemars(with = "String"))]
    pub from: Date,
    /// Last day of the range
    #[cfg_attr(feature = "schemars", schemars(with = "String"))]
    pub to: Date,
    /// Sales vouchers
    pub sales: VatTotals,
    /// Credit notes (sales returns)
    pub sales_returns: VatTotals,
    /// Sales net of returns
    pub net_sales: VatTotals,
    /// Purchase vouchers
    pub purchases: VatTotals,
    /// Debit notes (purchase returns)
    pub purchase_returns: VatTotals,
    /// Purchases net of returns
    pub net_purchases: VatTotals,
    /// VAT collected on net sales
    pub output_vat: Amount,
    /// VAT paid on net purchases
    pub input_vat: Amount,
    /// `output_vat - input_vat`; negative when VAT is refundable
    pub net_payable: Amount,
    /// Every item voucher in the range, by date then number
    pub register: Vec<VatRegisterRow>,
}

/// Summarize VAT for the item vouchers dated within `[from, to]`.
pub fn vat_report(from: Date, to: Date, vouchers: &[Voucher], accounts: &[Account]) -> VatReport {
    let names: FxHashMap<AccountId, &str> = accounts
        .iter()
        .map(|a| (a.id, a.data.name.as_str()))
        .collect();

    let mut sums: FxHashMap<VoucherType, VatTotals> = FxHashMap::default();
    let mut register: Vec<VatRegisterRow> = Vec::new();

    for voucher in vouchers
        .iter()
        .filter(|v| v.voucher_type.has_items() && from <= v.date && v.date <= to)
    {
        let totals = VatTotals::from(voucher.totals);
        let sum = sums.entry(voucher.voucher_type).or_default();
        *sum = *sum + totals;
        register.push(VatRegisterRow {
            voucher_id: voucher.id,
            date: voucher.date,
            number: voucher.number.clone(),
            voucher_type: voucher.voucher_type,
            party_account_id: voucher.party_account_id,
            party_name: names
                .get(&voucher.party_account_id)
                .map(|n| (*n).to_owned())
                .unwrap_or_default(),
            totals,
        });
    }
    register.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.number.cmp(&b.number)));

    let get = |ty| sums.get(&ty).copied().unwrap_or_default();
    let sales = get(VoucherType::Sales);
    let sales_returns = get(VoucherType::CreditNote);
    let purchases = get(VoucherType::Purchase);
    let purchase_returns = get(VoucherType::DebitNote);
    let net_sales = sales - sales_returns;
    let net_purchases = purchases - purchase_returns;

    VatReport {
        from,
        to,
        sales,
        sales_returns,
        net_sales,
        purchases,
        purchase_returns,
        net_purchases,
        output_vat: net_sales.vat,
        input_vat: net_purchases.vat,
        net_payable: net_sales.vat - net_purchases.vat,
        register,
    }
}
