use crate::models::{Amount, StockItem, StockItemId, StockMovement, VoucherType};
use time::Date;

/// One item's line in the stock summary.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StockRow {
    /// The item
    pub item_id: StockItemId,
    /// Its name
    pub name: String,
    /// Its unit of measure
    pub unit: String,
    /// Quantity on hand at the start of the range
    pub opening: f64,
    /// Quantity received within the range
    pub inward: f64,
    /// Quantity issued within the range
    pub outward: f64,
    /// Quantity on hand at the end of the range
    pub closing: f64,
    /// Weighted average cost of the opening stock and every purchase
    pub average_rate: Amount,
    /// `closing × average_rate`
    pub closing_value: Amount,
}

/// Quantities and valuation of every stock item over a date range.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StockReport {
    /// First day of the range
    #[cfg_attr(feature = "schemars", schemars(with = "String"))]
    pub from: Date,
    /// Last day of the range
    #[cfg_attr(feature = "schemars", schemars(with = "String"))]
    pub to: Date,
    /// One row per item, by name
    pub rows: Vec<StockRow>,
    /// Sum of the closing values
    pub total_value: Amount,
}

/// Summarize stock for `[from, to]`.
///
/// Movements before `from` roll into the opening quantity. Only purchases
/// contribute to the average cost; returns move quantity at their own rate
/// but do not reprice the stock.
pub fn stock_report(
    from: Date,
    to: Date,
    items: &[StockItem],
    movements: &[StockMovement],
) -> StockReport {
    let mut rows: Vec<StockRow> = items
        .iter()
        .map(|item| {
            let mut opening = item.data.opening_quantity;
            let mut inward = 0.0;
            let mut outward = 0.0;
            let mut cost_quantity = item.data.opening_quantity;
            let mut cost_value = item.data.opening_rate.scale(item.data.opening_quantity);

            for movement in movements
                .iter()
                .filter(|m| m.item_id == item.id && m.date <= to)
            {
                if movement.date < from {
                    opening += movement.inward - movement.outward;
                } else {
                    inward += movement.inward;
                    outward += movement.outward;
                }
                if movement.voucher_type == VoucherType::Purchase {
                    cost_quantity += movement.inward;
                    cost_value += movement.rate.scale(movement.inward);
                }
            }

            let average_rate = if cost_quantity > 0.0 {
                Amount((cost_value.0 as f64 / cost_quantity).round() as i64)
            } else {
                item.data.opening_rate
            };
            let closing = opening + inward - outward;

            StockRow {
                item_id: item.id,
                name: item.data.name.clone(),
                unit: item.data.unit.clone(),
                opening,
                inward,
                outward,
                closing,
                average_rate,
                closing_value: average_rate.scale(closing),
            }
        })
        .collect();
    rows.sort_by(|a, b| a.name.cmp(&b.name));

    StockReport {
        from,
        to,
        total_value: rows.iter().map(|r| r.closing_value).sum(),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CompanyId, StockItemData, VoucherId};
    use time::{OffsetDateTime, macros::date};

    fn movement(
        item: &StockItem,
        voucher_type: VoucherType,
        date: Date,
        quantity: f64,
        rate: i64,
    ) -> StockMovement {
        let (inward, outward) = if voucher_type.is_inward() {
            (quantity, 0.0)
        } else {
            (0.0, quantity)
        };
        StockMovement {
            voucher_id: VoucherId::new_v4(),
            voucher_type,
            item_id: item.id,
            date,
            inward,
            outward,
            rate: Amount(rate),
        }
    }

    #[test]
    fn weighted_average_over_purchases() {
        let item = StockItem {
            id: StockItemId::new_v4(),
            company_id: CompanyId::new_v4(),
            data: StockItemData {
                name: "Widget".into(),
                unit: "pcs".into(),
                vat_applicable: true,
                opening_quantity: 10.0,
                opening_rate: Amount(1_000),
            },
            created_at: OffsetDateTime::UNIX_EPOCH,
        };
        let movements = vec![
            movement(&item, VoucherType::Purchase, date!(2023 - 12 - 01), 10.0, 2_000),
            movement(&item, VoucherType::Sales, date!(2024 - 01 - 05), 4.0, 5_000),
            movement(&item, VoucherType::CreditNote, date!(2024 - 01 - 06), 1.0, 5_000),
            movement(&item, VoucherType::DebitNote, date!(2024 - 01 - 07), 2.0, 2_000),
            movement(&item, VoucherType::Purchase, date!(2024 - 09 - 01), 50.0, 9_000),
        ];

        let report = stock_report(
            date!(2024 - 01 - 01),
            date!(2024 - 06 - 30),
            &[item],
            &movements,
        );
        let row = &report.rows[0];
        assert_eq!(row.opening, 20.0);
        assert_eq!(row.inward, 1.0);
        assert_eq!(row.outward, 6.0);
        assert_eq!(row.closing, 15.0);
        assert_eq!(row.average_rate, Amount(1_500));
        assert_eq!(row.closing_value, Amount(22_500));
        assert_eq!(report.total_value, Amount(22_500));
    }
}
