//! Balance repair: rewrite sides and quantities so holdings never go negative.
//!
//! Runs once, left to right, over one ticker's date-sorted slots, carrying the
//! running holding. Per slot, in priority order:
//! 1. last slot with final sale forced → Sell everything held
//! 2. Buy → add
//! 3. Sell with nothing held → becomes a Buy
//! 4. Sell more than held → clamp to the holding
//! 5. otherwise → subtract
//!
//! Before the walk, a ticker starting from zero holdings has its first slot
//! forced to Buy. Slots are never re-dated or re-ordered.

use crate::domain::{Side, TransactionSlot};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// What the pass changed. Used for logging and run summaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairReport {
    /// Holding after the last slot.
    pub final_holding: u64,
    /// First slot was rewritten from Sell to Buy.
    pub forced_first_buy: bool,
    /// Sells rewritten to Buys because nothing was held.
    pub flipped_to_buy: usize,
    /// Sells reduced to the available holding.
    pub clamped: usize,
    /// Last slot rewritten as a full sell-off.
    pub forced_final_sale: bool,
}

/// Repair `slots` in place, starting from `initial_holding`.
pub fn repair_balances(
    slots: &mut [TransactionSlot],
    initial_holding: u64,
    force_final_sale: bool,
) -> RepairReport {
    let mut report = RepairReport::default();
    let n = slots.len();

    if initial_holding == 0 {
        if let Some(first) = slots.first_mut() {
            report.forced_first_buy = first.side == Side::Sell;
            first.side = Side::Buy;
        }
    }

    let mut held = initial_holding;
    for (i, slot) in slots.iter_mut().enumerate() {
        if i + 1 == n && force_final_sale {
            debug!(date = %slot.date, quantity = held, "final sell-off");
            slot.side = Side::Sell;
            slot.quantity = held;
            held = 0;
            report.forced_final_sale = true;
        } else if slot.side == Side::Buy {
            held = held.saturating_add(slot.quantity);
        } else if held == 0 {
            debug!(
                date = %slot.date,
                quantity = slot.quantity,
                "sell with nothing held, flipped to buy"
            );
            slot.side = Side::Buy;
            held = held.saturating_add(slot.quantity);
            report.flipped_to_buy += 1;
        } else if slot.quantity > held {
            debug!(date = %slot.date, requested = slot.quantity, held, "sell clamped to holding");
            slot.quantity = held;
            held = 0;
            report.clamped += 1;
        } else {
            held -= slot.quantity;
        }
    }

    report.final_holding = held;
    report
}
