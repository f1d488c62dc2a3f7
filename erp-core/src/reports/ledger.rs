use crate::models::{Account, AccountId, Amount, LedgerEntry, VoucherId, VoucherType};
use time::Date;

/// One posting in an account ledger, with the running balance after it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LedgerLine {
    /// Voucher date
    #[cfg_attr(feature = "schemars", schemars(with = "String"))]
    pub date: Date,
    /// The originating voucher
    pub voucher_id: VoucherId,
    /// Its number
    pub voucher_number: String,
    /// Its type
    pub voucher_type: VoucherType,
    /// Debit amount
    pub debit: Amount,
    /// Credit amount
    pub credit: Amount,
    /// Running balance, positive for debit
    pub balance: Amount,
}

/// The statement of one account over a date range.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AccountLedger {
    /// The account
    pub account_id: AccountId,
    /// Its name
    pub account_name: String,
    /// First day of the statement
    #[cfg_attr(feature = "schemars", schemars(with = "String"))]
    pub from: Date,
    /// Last day of the statement
    #[cfg_attr(feature = "schemars", schemars(with = "String"))]
    pub to: Date,
    /// Balance before `from`
    pub opening: Amount,
    /// Postings within the range, in date order
    pub lines: Vec<LedgerLine>,
    /// Sum of debits within the range
    pub total_debit: Amount,
    /// Sum of credits within the range
    pub total_credit: Amount,
    /// Balance at the end of `to`
    pub closing: Amount,
}

/// Build the ledger of `account` for `[from, to]`. `entries` may contain
/// postings to other accounts; they are skipped.
pub fn account_ledger(
    account: &Account,
    from: Date,
    to: Date,
    entries: &[LedgerEntry],
) -> AccountLedger {
    let mine = entries.iter().filter(|e| e.account_id == account.id);

    let opening = account.data.opening_balance
        + mine
            .clone()
            .filter(|e| e.date < from)
            .map(LedgerEntry::net)
            .sum::<Amount>();

    let mut in_range: Vec<&LedgerEntry> =
        mine.filter(|e| from <= e.date && e.date <= to).collect();
    in_range.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| a.voucher_number.cmp(&b.voucher_number))
    });

    let mut balance = opening;
    let mut total_debit = Amount::ZERO;
    let mut total_credit = Amount::ZERO;
    let lines = in_range
        .into_iter()
        .map(|entry| {
            balance += entry.net();
            total_debit += entry.debit;
            total_credit += entry.credit;
            LedgerLine {
                date: entry.date,
                voucher_id: entry.voucher_id,
                voucher_number: entry.voucher_number.clone(),
                voucher_type: entry.voucher_type,
                debit: entry.debit,
                credit: entry.credit,
                balance,
            }
        })
        .collect();

    AccountLedger {
        account_id: account.id,
        account_name: account.data.name.clone(),
        from,
        to,
        opening,
        lines,
        total_debit,
        total_credit,
        closing: balance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AccountGroup;
    use crate::reports::fixtures::{account, entry};
    use time::macros::date;

    #[test]
    fn running_balance() {
        let cash = account("Cash", AccountGroup::Cash, 1_000);
        let other = account("Other", AccountGroup::Cash, 0);
        let entries = vec![
            entry(&cash, date!(2024 - 02 - 01), 500, 0),
            entry(&cash, date!(2024 - 01 - 10), 0, 200),
            entry(&cash, date!(2023 - 12 - 31), 300, 0),
            entry(&other, date!(2024 - 01 - 15), 999, 0),
            entry(&cash, date!(2024 - 03 - 01), 10, 0),
        ];
        let ledger = account_ledger(
            &cash,
            date!(2024 - 01 - 01),
            date!(2024 - 02 - 28),
            &entries,
        );
        assert_eq!(ledger.opening, Amount(1_300));
        assert_eq!(ledger.lines.len(), 2);
        assert_eq!(ledger.lines[0].balance, Amount(1_100));
        assert_eq!(ledger.lines[1].balance, Amount(1_600));
        assert_eq!(ledger.total_debit, Amount(500));
        assert_eq!(ledger.total_credit, Amount(200));
        assert_eq!(ledger.closing, Amount(1_600));
    }
}
