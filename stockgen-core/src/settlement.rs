//! Settlement and aggregation: net/cumulative shares and fee-adjusted cash.

use crate::domain::{Side, Transaction, TransactionSlot};

/// Cash flow for one trade. Sells receive `value * (1 - fee)`, buys pay
/// `value * (1 + fee)` (returned negative).
pub fn settlement_amount(side: Side, quantity: u64, unit_price: f64, fee_rate: f64) -> f64 {
    let value = quantity as f64 * unit_price;
    match side {
        Side::Sell => value * (1.0 - fee_rate),
        Side::Buy => -(value * (1.0 + fee_rate)),
    }
}

/// Signed share delta. Quantities beyond `i64::MAX` are rejected by
/// validation; here they saturate.
pub fn net_share(side: Side, quantity: u64) -> i64 {
    let quantity = i64::try_from(quantity).unwrap_or(i64::MAX);
    match side {
        Side::Buy => quantity,
        Side::Sell => -quantity,
    }
}

/// Finalize repaired slots into transactions.
///
/// `cumulative_share` is the running holding seeded at `initial_holding`.
/// Slots must already satisfy the non-negative holding invariant.
pub fn settle(
    ticker: &str,
    slots: Vec<TransactionSlot>,
    initial_holding: u64,
    fee_rate: f64,
) -> Vec<Transaction> {
    let mut cumulative = initial_holding;
    slots
        .into_iter()
        .map(|slot| {
            cumulative = match slot.side {
                Side::Buy => cumulative.saturating_add(slot.quantity),
                Side::Sell => cumulative.saturating_sub(slot.quantity),
            };
            Transaction {
                date: slot.date,
                ticker: ticker.to_string(),
                side: slot.side,
                unit_price: slot.unit_price,
                quantity: slot.quantity,
                net_share: net_share(slot.side, slot.quantity),
                cumulative_share: cumulative,
                settlement_amount: settlement_amount(
                    slot.side,
                    slot.quantity,
                    slot.unit_price,
                    fee_rate,
                ),
            }
        })
        .collect()
}
