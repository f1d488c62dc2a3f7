use super::net_before;
use crate::models::{
    Account, AccountGroup, AccountId, AgeingKind, Amount, FiscalYear, LedgerEntry,
};
use time::Date;

/// The ageing buckets as `(label, lowest age in days, highest age in days)`.
/// The last bucket is open-ended.
pub const AGEING_BUCKETS: [(&str, i64, i64); 5] = [
    ("0-30", 0, 30),
    ("31-60", 31, 60),
    ("61-90", 61, 90),
    ("91-120", 91, 120),
    ("120+", 121, i64::MAX),
];

/// Debits and credits of one age bracket.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgeingBucket {
    /// The bracket, e.g. `31-60`
    pub label: String,
    /// Sum of debits aged into the bracket
    pub debit: Amount,
    /// Sum of credits aged into the bracket
    pub credit: Amount,
    /// `debit - credit`
    pub net: Amount,
}

/// The aged balance of one party account.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgeingRow {
    /// The party account, absent on the totals row
    pub account_id: Option<AccountId>,
    /// Account name, or `Total`
    pub account_name: String,
    /// One entry per [`AGEING_BUCKETS`] bracket
    pub buckets: Vec<AgeingBucket>,
    /// The sum of the bucket nets
    pub balance: Amount,
}

impl AgeingRow {
    fn empty(account_id: Option<AccountId>, account_name: String) -> Self {
        Self {
            account_id,
            account_name,
            buckets: AGEING_BUCKETS
                .iter()
                .map(|(label, _, _)| AgeingBucket {
                    label: (*label).to_owned(),
                    debit: Amount::ZERO,
                    credit: Amount::ZERO,
                    net: Amount::ZERO,
                })
                .collect(),
            balance: Amount::ZERO,
        }
    }

    fn add(&mut self, bucket: usize, debit: Amount, credit: Amount) {
        let slot = &mut self.buckets[bucket];
        slot.debit += debit;
        slot.credit += credit;
        slot.net += debit - credit;
        self.balance += debit - credit;
    }
}

/// Receivables or payables aged as of a date.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgeingReport {
    /// Receivable or payable
    pub kind: AgeingKind,
    /// The date ages are measured from
    #[cfg_attr(feature = "schemars", schemars(with = "String"))]
    pub as_of: Date,
    /// One row per party account with activity, by name
    pub rows: Vec<AgeingRow>,
    /// Bucket-wise sums over every row
    pub totals: AgeingRow,
}

fn bucket_of(age: i64) -> usize {
    AGEING_BUCKETS
        .iter()
        .position(|(_, low, high)| (*low..=*high).contains(&age))
        .unwrap_or(0)
}

/// Age the sundry debtors (receivable) or sundry creditors (payable) of a
/// company as of `as_of`.
///
/// The balance brought into the fiscal year (the account's opening balance
/// plus everything posted before the year started) is dated at the start of
/// the year. Entries after `as_of` are ignored.
pub fn ageing_report(
    kind: AgeingKind,
    fiscal_year: &FiscalYear,
    as_of: Date,
    accounts: &[Account],
    entries: &[LedgerEntry],
) -> AgeingReport {
    let group = match kind {
        AgeingKind::Receivable => AccountGroup::SundryDebtor,
        AgeingKind::Payable => AccountGroup::SundryCreditor,
    };
    let start = fiscal_year.data.start_date;
    let brought_forward = net_before(entries, start);

    let mut parties: Vec<&Account> = accounts.iter().filter(|a| a.data.group == group).collect();
    parties.sort_by(|a, b| a.data.name.cmp(&b.data.name));

    let mut totals = AgeingRow::empty(None, "Total".to_owned());
    let mut rows = Vec::new();

    for account in parties {
        let mut row = AgeingRow::empty(Some(account.id), account.data.name.clone());
        let mut active = false;

        let opening = account.data.opening_balance
            + brought_forward
                .get(&account.id)
                .copied()
                .unwrap_or_default();
        if !opening.is_zero() {
            let (debit, credit) = opening.split();
            row.add(bucket_of((as_of - start).whole_days()), debit, credit);
            active = true;
        }

        for entry in entries
            .iter()
            .filter(|e| e.account_id == account.id && start <= e.date && e.date <= as_of)
        {
            row.add(
                bucket_of((as_of - entry.date).whole_days()),
                entry.debit,
                entry.credit,
            );
            active = true;
        }

        if active {
            for (bucket, slot) in row.buckets.iter().enumerate() {
                totals.add(bucket, slot.debit, slot.credit);
            }
            rows.push(row);
        }
    }

    AgeingReport {
        kind,
        as_of,
        rows,
        totals,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::fixtures::{account, entry, fiscal_year};
    use rstest::rstest;
    use time::{Duration, macros::date};

    #[rstest]
    #[case(0, 0)]
    #[case(30, 0)]
    #[case(31, 1)]
    #[case(60, 1)]
    #[case(61, 2)]
    #[case(90, 2)]
    #[case(91, 3)]
    #[case(120, 3)]
    #[case(121, 4)]
    #[case(4000, 4)]
    fn bucket_edges(#[case] age: i64, #[case] bucket: usize) {
        assert_eq!(bucket_of(age), bucket);
    }

    #[test]
    fn bucket_nets_sum_to_balance() {
        let fy = fiscal_year(date!(2024 - 01 - 01), date!(2024 - 12 - 31));
        let as_of = date!(2024 - 06 - 30);
        let alice = account("Alice", AccountGroup::SundryDebtor, 5_000);
        let bob = account("Bob", AccountGroup::SundryDebtor, 0);
        let idle = account("Idle", AccountGroup::SundryDebtor, 0);
        let supplier = account("Supplier", AccountGroup::SundryCreditor, -9_000);

        let entries = vec![
            entry(&alice, date!(2023 - 12 - 15), 1_000, 0),
            entry(&alice, as_of - Duration::days(10), 20_000, 0),
            entry(&alice, as_of - Duration::days(45), 0, 3_000),
            entry(&bob, as_of - Duration::days(100), 7_000, 0),
            entry(&bob, as_of + Duration::days(1), 99_000, 0),
            entry(&supplier, as_of - Duration::days(5), 0, 1_000),
        ];

        let report = ageing_report(
            AgeingKind::Receivable,
            &fy,
            as_of,
            &[alice.clone(), bob.clone(), idle, supplier],
            &entries,
        );

        assert_eq!(report.rows.len(), 2);
        let alice_row = &report.rows[0];
        assert_eq!(alice_row.account_name, "Alice");
        assert_eq!(alice_row.balance, Amount(23_000));
        assert_eq!(alice_row.buckets[0].debit, Amount(20_000));
        assert_eq!(alice_row.buckets[1].credit, Amount(3_000));
        // opening 5000 plus 1000 brought forward, aged from 2024-01-01
        assert_eq!(alice_row.buckets[4].debit, Amount(6_000));
        for row in &report.rows {
            let nets: Amount = row.buckets.iter().map(|b| b.net).sum();
            assert_eq!(nets, row.balance);
        }

        let bob_row = &report.rows[1];
        assert_eq!(bob_row.balance, Amount(7_000));
        assert_eq!(bob_row.buckets[3].net, Amount(7_000));

        assert_eq!(report.totals.balance, Amount(30_000));
        assert_eq!(report.totals.account_id, None);
    }

    #[test]
    fn payables_carry_credit_balances() {
        let fy = fiscal_year(date!(2024 - 01 - 01), date!(2024 - 12 - 31));
        let supplier = account("Supplier", AccountGroup::SundryCreditor, -9_000);
        let report = ageing_report(
            AgeingKind::Payable,
            &fy,
            date!(2024 - 01 - 20),
            &[supplier],
            &[],
        );
        assert_eq!(report.rows[0].buckets[0].credit, Amount(9_000));
        assert_eq!(report.totals.balance, Amount(-9_000));
    }
}
