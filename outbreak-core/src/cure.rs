use serde::{Deserialize, Serialize};

use crate::catalog::RegionCatalog;
use crate::config::OutpostRates;
use crate::numbers;
use crate::province::ProvinceState;

/// Aggregate cure-research and economy state, one instance per session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct GlobalState {
    /// Global research completion fraction in [0,1].
    pub cure_progress: f32,
    pub total_outposts: u32,
    pub active_outposts: u32,
    /// Remaining budget in whole ZAR; spends are checked before deduction.
    pub budget: i64,
}

/// Walk all provinces in catalog order, assign each active outpost its
/// deployment-order diminishing-return multiplier (urban hubs scale theirs by
/// the hub bonus), refresh the outpost counts, and advance cure progress by
/// the summed contribution. Progress only moves when elapsed time, the summed
/// factor, and the global rate are all positive; a zero-hour recomputation
/// still refreshes the counts. Returns the effective outpost factor.
pub fn recompute_cure(
    global: &mut GlobalState,
    provinces: &[ProvinceState],
    catalog: &RegionCatalog,
    rates: &OutpostRates,
    elapsed_hours: f64,
) -> f64 {
    let decay = f64::from(rates.diminishing_factor.clamp(0.0, 1.0));
    let hub_bonus = f64::from(rates.urban_hub_bonus.max(1.0));

    let mut factor = 0.0_f64;
    let mut global_index = 0_i32;
    let mut total = 0_u32;
    let mut active = 0_u32;

    for province in provinces {
        total = total.saturating_add(province.outpost_count);
        if !province.local_cure_active() {
            continue;
        }
        active = active.saturating_add(province.outpost_count);
        let hub = catalog.is_urban_hub(&province.region);
        for _ in 0..province.outpost_count {
            let mut multiplier = decay.powi(global_index);
            if hub {
                multiplier *= hub_bonus;
            }
            factor += multiplier;
            global_index = global_index.saturating_add(1);
        }
    }

    global.total_outposts = total;
    global.active_outposts = active;

    let rate = f64::from(rates.global_cure_per_hour.max(0.0));
    if elapsed_hours > 0.0 && factor > 0.0 && rate > 0.0 {
        global.cure_progress = numbers::clamp_unit_f32(
            f64::from(global.cure_progress) + rate * factor * elapsed_hours,
        );
    }

    factor
}
