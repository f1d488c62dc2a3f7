use crate::models::{Account, AccountGroup, AccountId, Amount, LedgerEntry};
use rustc_hash::FxHashMap;
use time::Date;

/// One account's line in the trial balance.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrialBalanceRow {
    /// The account
    pub account_id: AccountId,
    /// Its name
    pub account_name: String,
    /// Its group
    pub group: AccountGroup,
    /// Total debits, including a debit opening balance
    pub debit: Amount,
    /// Total credits, including a credit opening balance
    pub credit: Amount,
    /// `debit - credit`
    pub balance: Amount,
}

/// Debit and credit totals of every account as of a date.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrialBalance {
    /// The report date
    #[cfg_attr(feature = "schemars", schemars(with = "String"))]
    pub as_of: Date,
    /// Accounts with a non-zero total, by group then name
    pub rows: Vec<TrialBalanceRow>,
    /// Sum of the debit column
    pub total_debit: Amount,
    /// Sum of the credit column
    pub total_credit: Amount,
}

/// Sum the postings dated on or before `as_of` by account.
pub fn trial_balance(as_of: Date, accounts: &[Account], entries: &[LedgerEntry]) -> TrialBalance {
    let mut sums: FxHashMap<AccountId, (Amount, Amount)> = FxHashMap::default();
    for entry in entries.iter().filter(|e| e.date <= as_of) {
        let (debit, credit) = sums.entry(entry.account_id).or_default();
        *debit += entry.debit;
        *credit += entry.credit;
    }

    let mut rows: Vec<TrialBalanceRow> = accounts
        .iter()
        .filter_map(|account| {
            let (opening_debit, opening_credit) = account.data.opening_balance.split();
            let (debit, credit) = sums.get(&account.id).copied().unwrap_or_default();
            let debit = debit + opening_debit;
            let credit = credit + opening_credit;
            (!debit.is_zero() || !credit.is_zero()).then(|| TrialBalanceRow {
                account_id: account.id,
                account_name: account.data.name.clone(),
                group: account.data.group,
                debit,
                credit,
                balance: debit - credit,
            })
        })
        .collect();
    rows.sort_by(|a, b| {
        (a.group.as_str(), &a.account_name).cmp(&(b.group.as_str(), &b.account_name))
    });

    TrialBalance {
        as_of,
        total_debit: rows.iter().map(|r| r.debit).sum(),
        total_credit: rows.iter().map(|r| r.credit).sum(),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::fixtures::{account, entry};
    use time::macros::date;

    #[test]
    fn balanced_postings_balance() {
        let capital = account("Capital", AccountGroup::Capital, -10_000);
        let cash = account("Cash", AccountGroup::Cash, 10_000);
        let sales = account("Sales", AccountGroup::Sales, 0);
        let unused = account("Unused", AccountGroup::Bank, 0);
        let day = date!(2024 - 05 - 01);
        let entries = vec![
            entry(&cash, day, 2_500, 0),
            entry(&sales, day, 0, 2_500),
            entry(&cash, date!(2024 - 07 - 01), 1, 0),
        ];

        let tb = trial_balance(
            date!(2024 - 06 - 30),
            &[capital, cash.clone(), sales, unused],
            &entries,
        );
        assert_eq!(tb.rows.len(), 3);
        assert_eq!(tb.total_debit, Amount(12_500));
        assert_eq!(tb.total_debit, tb.total_credit);
        let cash_row = tb.rows.iter().find(|r| r.account_id == cash.id).unwrap();
        assert_eq!(cash_row.balance, Amount(12_500));
    }
}
