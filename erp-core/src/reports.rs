mod ageing;
mod ledger;
mod stock;
mod trial_balance;
mod vat;

pub use ageing::{AGEING_BUCKETS, AgeingBucket, AgeingReport, AgeingRow, ageing_report};
pub use ledger::{AccountLedger, LedgerLine, account_ledger};
pub use stock::{StockReport, StockRow, stock_report};
pub use trial_balance::{TrialBalance, TrialBalanceRow, trial_balance};
pub use vat::{VatRegisterRow, VatReport, VatTotals, vat_report};

use crate::models::{AccountId, Amount, LedgerEntry};
use rustc_hash::FxHashMap;
use time::Date;

/// Net (debit − credit) of the entries dated strictly before `date`, per account.
fn net_before(entries: &[LedgerEntry], date: Date) -> FxHashMap<AccountId, Amount> {
    let mut net = FxHashMap::default();
    for entry in entries.iter().filter(|e| e.date < date) {
        *net.entry(entry.account_id).or_insert(Amount::ZERO) += entry.net();
    }
    net
}
