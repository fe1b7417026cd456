use serde::{Deserialize, Serialize};

use crate::*;

pub const BASE_RTP: f64 = 0.97;
pub const RTP_ADJUSTMENT_FACTOR: f64 = 0.2;
pub const HINT_BASE_COST_FACTOR: f64 = 0.5;

/// Tunable parameters of the payout curve and hint pricing.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PayoutRules {
    /// Return to player before any hint is bought.
    pub base_rtp: f64,
    /// RTP added when every safe cell's worth of hints has been bought. `0` decouples
    /// the curve from hint purchases.
    pub rtp_adjustment_factor: f64,
    /// Share of the next potential win charged for a hint before the information
    /// discount.
    pub hint_base_cost_factor: f64,
    pub entropy_model: EntropyModel,
}

impl Default for PayoutRules {
    fn default() -> Self {
        Self {
            base_rtp: BASE_RTP,
            rtp_adjustment_factor: RTP_ADJUSTMENT_FACTOR,
            hint_base_cost_factor: HINT_BASE_COST_FACTOR,
            entropy_model: EntropyModel::default(),
        }
    }
}

impl PayoutRules {
    /// RTP after `hints_bought` hints, scaled by the share of safe cells those hints
    /// represent.
    pub fn adjusted_rtp(&self, hints_bought: u32, total_cells: CellCount, bombs: CellCount) -> f64 {
        let safe_cells = total_cells.saturating_sub(bombs);
        if safe_cells == 0 {
            return self.base_rtp;
        }
        let risk_meter = f64::from(hints_bought) / f64::from(safe_cells);
        self.base_rtp + risk_meter * self.rtp_adjustment_factor
    }
}

/// Probability that `revealed` cells picked blindly from `total_cells` are all safe
/// when `bombs` of them are bombs.
///
/// Requires `revealed <= total_cells - bombs`.
pub fn survival_probability(revealed: CellCount, total_cells: CellCount, bombs: CellCount) -> f64 {
    debug_assert!(bombs <= total_cells);
    debug_assert!(revealed <= total_cells - bombs);
    if bombs == 0 || revealed == 0 {
        return 1.0;
    }
    combination(total_cells - bombs, revealed) / combination(total_cells, revealed)
}

/// Fair-odds multiplier for `revealed` safe cells, scaled down by `adjusted_rtp`.
pub fn compute_multiplier(
    adjusted_rtp: f64,
    revealed: CellCount,
    total_cells: CellCount,
    bombs: CellCount,
) -> f64 {
    adjusted_rtp / survival_probability(revealed, total_cells, bombs)
}
