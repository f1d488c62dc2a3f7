use crate::models::{
    Account, AccountId, Amount, CompanyId, FiscalYear, FiscalYearId, MenuSection, StockItem,
    StockItemId, SystemAccount, UserId, ValidationError, VoucherId, validation::string_enum,
};
use rustc_hash::FxHashMap;
use time::{Date, OffsetDateTime};

/// The kinds of voucher the ERP records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum VoucherType {
    /// A sale of stock items to a party
    Sales,
    /// A purchase of stock items from a party
    Purchase,
    /// Money paid out to a party
    Payment,
    /// Money received from a party
    Receipt,
    /// A purchase return: goods go back to the supplier
    DebitNote,
    /// A sales return: goods come back from the customer
    CreditNote,
}

string_enum!(VoucherType, "voucher type", {
    Sales => "sales",
    Purchase => "purchase",
    Payment => "payment",
    Receipt => "receipt",
    DebitNote => "debit_note",
    CreditNote => "credit_note",
});

impl VoucherType {
    /// The short code used in generated voucher-number prefixes.
    pub fn code(&self) -> &'static str {
        match self {
            VoucherType::Sales => "SV",
            VoucherType::Purchase => "PV",
            VoucherType::Payment => "PY",
            VoucherType::Receipt => "RV",
            VoucherType::DebitNote => "DN",
            VoucherType::CreditNote => "CN",
        }
    }

    /// The menu section a user needs to work with vouchers of this type.
    pub fn menu_section(&self) -> MenuSection {
        match self {
            VoucherType::Sales => MenuSection::Sales,
            VoucherType::Purchase => MenuSection::Purchase,
            VoucherType::Payment => MenuSection::Payment,
            VoucherType::Receipt => MenuSection::Receipt,
            VoucherType::DebitNote => MenuSection::DebitNote,
            VoucherType::CreditNote => MenuSection::CreditNote,
        }
    }

    /// Whether this voucher carries stock-item lines (as opposed to a cash amount).
    pub fn has_items(&self) -> bool {
        !matches!(self, VoucherType::Payment | VoucherType::Receipt)
    }

    /// Whether goods flow into stock with this voucher.
    pub fn is_inward(&self) -> bool {
        matches!(self, VoucherType::Purchase | VoucherType::CreditNote)
    }
}

/// A stock-item line as submitted by a client.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineInput {
    /// The item sold or bought
    pub item_id: StockItemId,
    /// Quantity, strictly positive
    pub quantity: f64,
    /// Unit rate, excluding VAT
    pub rate: Amount,
}

/// A voucher as submitted by a client, before numbering and posting.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VoucherInput {
    /// The fiscal year the voucher is numbered in
    pub fiscal_year_id: FiscalYearId,
    /// The kind of voucher
    pub voucher_type: VoucherType,
    /// Transaction date, within the fiscal year
    #[cfg_attr(feature = "schemars", schemars(with = "String"))]
    pub date: Date,
    /// The customer, supplier or other counterparty
    pub party_account_id: AccountId,
    /// The cash or bank account (payments and receipts only)
    #[cfg_attr(feature = "serde", serde(default))]
    pub cash_account_id: Option<AccountId>,
    /// Item lines (item vouchers only)
    #[cfg_attr(feature = "serde", serde(default))]
    pub lines: Vec<LineInput>,
    /// The amount paid or received (payments and receipts only)
    #[cfg_attr(feature = "serde", serde(default))]
    pub amount: Option<Amount>,
    /// Free-text description
    #[cfg_attr(feature = "serde", serde(default))]
    pub narration: Option<String>,
}

/// A priced stock-item line on a posted voucher.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VoucherLine {
    /// The item sold or bought
    pub item_id: StockItemId,
    /// Quantity
    pub quantity: f64,
    /// Unit rate, excluding VAT
    pub rate: Amount,
    /// `rate × quantity`
    pub amount: Amount,
    /// Whether the line counts as taxable
    pub vat_applicable: bool,
}

/// The VAT breakdown of a voucher.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VoucherTotals {
    /// Sum of the taxable line amounts
    pub taxable: Amount,
    /// Sum of the exempt line amounts
    pub non_vat: Amount,
    /// VAT on the taxable amount
    pub vat: Amount,
    /// Grand total (for payments and receipts, the amount)
    pub total: Amount,
}

/// A numbered, posted voucher.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Voucher {
    /// Unique identifier
    pub id: VoucherId,
    /// The owning company
    pub company_id: CompanyId,
    /// The fiscal year the voucher is numbered in
    pub fiscal_year_id: FiscalYearId,
    /// The kind of voucher
    pub voucher_type: VoucherType,
    /// The voucher number, e.g. `SV-2081/82-0001`
    pub number: String,
    /// Transaction date
    #[cfg_attr(feature = "schemars", schemars(with = "String"))]
    pub date: Date,
    /// The counterparty
    pub party_account_id: AccountId,
    /// The cash or bank account (payments and receipts only)
    pub cash_account_id: Option<AccountId>,
    /// Item lines (item vouchers only)
    pub lines: Vec<VoucherLine>,
    /// The VAT breakdown
    pub totals: VoucherTotals,
    /// Free-text description
    pub narration: Option<String>,
    /// The user who recorded the voucher
    pub created_by: UserId,
    /// When the voucher was recorded
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    #[cfg_attr(feature = "schemars", schemars(with = "String"))]
    pub created_at: OffsetDateTime,
}

/// Everything posting needs to know about the company.
pub struct PostingContext<'a> {
    /// The fiscal year the voucher is recorded in
    pub fiscal_year: &'a FiscalYear,
    /// The company's VAT rate in basis points
    pub vat_rate_bps: u32,
    /// The company's chart of accounts
    pub accounts: &'a [Account],
    /// The company's stock items
    pub items: &'a [StockItem],
}

/// One side of a double entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PostingEntry {
    /// The account debited or credited
    pub account_id: AccountId,
    /// Debit amount (zero for a credit)
    pub debit: Amount,
    /// Credit amount (zero for a debit)
    pub credit: Amount,
}

/// A change in the quantity on hand of a stock item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PostingMovement {
    /// The item moved
    pub item_id: StockItemId,
    /// Quantity received
    pub inward: f64,
    /// Quantity issued
    pub outward: f64,
    /// Unit rate of the movement
    pub rate: Amount,
}

/// The outcome of posting a voucher: priced lines, totals, ledger entries
/// and stock movements.
#[derive(Debug, Clone, PartialEq)]
pub struct Posting {
    /// Priced item lines
    pub lines: Vec<VoucherLine>,
    /// VAT breakdown
    pub totals: VoucherTotals,
    /// Ledger entries; debits and credits always balance
    pub entries: Vec<PostingEntry>,
    /// Stock movements
    pub movements: Vec<PostingMovement>,
}

impl Posting {
    /// Sum of debits minus sum of credits; zero for every valid posting.
    pub fn imbalance(&self) -> Amount {
        self.entries.iter().map(|e| e.debit - e.credit).sum()
    }

    /// Combine the posting with its identity to form the stored voucher.
    pub fn into_voucher(
        self,
        id: VoucherId,
        company_id: CompanyId,
        input: VoucherInput,
        number: String,
        created_by: UserId,
        created_at: OffsetDateTime,
    ) -> Voucher {
        let cash_account_id = if input.voucher_type.has_items() {
            None
        } else {
            input.cash_account_id
        };
        Voucher {
            id,
            company_id,
            fiscal_year_id: input.fiscal_year_id,
            voucher_type: input.voucher_type,
            number,
            date: input.date,
            party_account_id: input.party_account_id,
            cash_account_id,
            lines: self.lines,
            totals: self.totals,
            narration: input
                .narration
                .map(|n| n.trim().to_owned())
                .filter(|n| !n.is_empty()),
            created_by,
            created_at,
        }
    }
}

#[derive(Default)]
struct Entries(Vec<PostingEntry>);

impl Entries {
    fn debit(&mut self, account_id: AccountId, amount: Amount) {
        if !amount.is_zero() {
            self.0.push(PostingEntry {
                account_id,
                debit: amount,
                credit: Amount::ZERO,
            });
        }
    }

    fn credit(&mut self, account_id: AccountId, amount: Amount) {
        if !amount.is_zero() {
            self.0.push(PostingEntry {
                account_id,
                debit: Amount::ZERO,
                credit: amount,
            });
        }
    }
}

impl VoucherInput {
    /// Validate the voucher against the company's books and compute its
    /// lines, totals, ledger entries and stock movements.
    pub fn post(&self, context: &PostingContext<'_>) -> Result<Posting, ValidationError> {
        if !context.fiscal_year.contains(self.date) {
            return Err(ValidationError::DateOutsideFiscalYear);
        }

        let accounts: FxHashMap<AccountId, &Account> =
            context.accounts.iter().map(|a| (a.id, a)).collect();
        let system = |role: SystemAccount| {
            context
                .accounts
                .iter()
                .find(|a| a.system == Some(role))
                .map(|a| a.id)
                .ok_or(ValidationError::MissingSystemAccount(role.as_str()))
        };

        let party = accounts
            .get(&self.party_account_id)
            .ok_or(ValidationError::UnknownAccount(self.party_account_id))?;
        if !party.data.group.is_party() {
            return Err(ValidationError::InvalidPartyAccount(party.id));
        }

        let mut entries = Entries::default();

        if !self.voucher_type.has_items() {
            if !self.lines.is_empty() {
                return Err(ValidationError::UnexpectedLines);
            }
            let amount = self
                .amount
                .filter(|a| a.is_positive())
                .ok_or(ValidationError::NonPositiveAmount)?;
            if !amount.in_range() {
                return Err(ValidationError::AmountOutOfRange);
            }
            let cash_id = self
                .cash_account_id
                .ok_or(ValidationError::MissingCashAccount)?;
            let cash = accounts
                .get(&cash_id)
                .ok_or(ValidationError::UnknownAccount(cash_id))?;
            if !cash.data.group.is_cash_or_bank() {
                return Err(ValidationError::InvalidCashAccount(cash_id));
            }
            if cash_id == party.id {
                return Err(ValidationError::SameAccount);
            }

            if self.voucher_type == VoucherType::Receipt {
                entries.debit(cash_id, amount);
                entries.credit(party.id, amount);
            } else {
                entries.debit(party.id, amount);
                entries.credit(cash_id, amount);
            }

            return Ok(Posting {
                lines: Vec::new(),
                totals: VoucherTotals {
                    total: amount,
                    ..Default::default()
                },
                entries: entries.0,
                movements: Vec::new(),
            });
        }

        if self.lines.is_empty() {
            return Err(ValidationError::NoLines);
        }

        let items: FxHashMap<StockItemId, &StockItem> =
            context.items.iter().map(|i| (i.id, i)).collect();

        let mut lines = Vec::with_capacity(self.lines.len());
        let mut movements = Vec::with_capacity(self.lines.len());
        let mut totals = VoucherTotals::default();

        for line in &self.lines {
            if !line.quantity.is_finite() || line.quantity <= 0.0 {
                return Err(ValidationError::InvalidQuantity);
            }
            if line.rate.is_negative() {
                return Err(ValidationError::NegativeRate);
            }
            let item = items
                .get(&line.item_id)
                .ok_or(ValidationError::UnknownItem(line.item_id))?;

            let amount = line
                .rate
                .checked_scale(line.quantity)
                .ok_or(ValidationError::AmountOutOfRange)?;
            let subtotal = if item.data.vat_applicable {
                &mut totals.taxable
            } else {
                &mut totals.non_vat
            };
            *subtotal = subtotal
                .checked_add(amount)
                .ok_or(ValidationError::AmountOutOfRange)?;

            lines.push(VoucherLine {
                item_id: item.id,
                quantity: line.quantity,
                rate: line.rate,
                amount,
                vat_applicable: item.data.vat_applicable,
            });

            let (inward, outward) = if self.voucher_type.is_inward() {
                (line.quantity, 0.0)
            } else {
                (0.0, line.quantity)
            };
            movements.push(PostingMovement {
                item_id: item.id,
                inward,
                outward,
                rate: line.rate,
            });
        }

        totals.vat = totals.taxable.percent_bps(context.vat_rate_bps);
        let goods = totals
            .taxable
            .checked_add(totals.non_vat)
            .ok_or(ValidationError::AmountOutOfRange)?;
        totals.total = goods
            .checked_add(totals.vat)
            .ok_or(ValidationError::AmountOutOfRange)?;

        let vat = system(SystemAccount::Vat)?;
        match self.voucher_type {
            VoucherType::Sales => {
                entries.debit(party.id, totals.total);
                entries.credit(system(SystemAccount::Sales)?, goods);
                entries.credit(vat, totals.vat);
            }
            VoucherType::CreditNote => {
                entries.debit(system(SystemAccount::Sales)?, goods);
                entries.debit(vat, totals.vat);
                entries.credit(party.id, totals.total);
            }
            VoucherType::Purchase => {
                entries.debit(system(SystemAccount::Purchase)?, goods);
                entries.debit(vat, totals.vat);
                entries.credit(party.id, totals.total);
            }
            VoucherType::DebitNote => {
                entries.debit(party.id, totals.total);
                entries.credit(system(SystemAccount::Purchase)?, goods);
                entries.credit(vat, totals.vat);
            }
            VoucherType::Payment | VoucherType::Receipt => unreachable!("handled above"),
        }

        Ok(Posting {
            lines,
            totals,
            entries: entries.0,
            movements,
        })
    }
}
