use std::fmt;

use clap::ValueEnum;
use outbreak_core::{OutbreakEngine, ProvinceState, RegionId};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Policy interface for automated outpost placement.
pub trait BuildPolicy {
    /// Name used for logging/report output.
    fn name(&self) -> &'static str;

    /// Pick a region to build in right now, or `None` to hold.
    fn choose_build(&mut self, engine: &OutbreakEngine) -> Option<RegionId>;
}

/// Built-in build strategies for automated runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum)]
pub enum BuildStrategy {
    /// Hubs first, always keeps a base-cost reserve.
    Balanced,
    /// Builds whenever affordable, most-infected viable province first.
    Aggressive,
    /// Urban hubs only, and only with a double-cost reserve.
    Frugal,
    /// Seeded random placement across viable provinces.
    Scatter,
    /// Never builds; measures the unassisted baseline.
    None,
}

impl BuildStrategy {
    pub const ALL: [Self; 5] = [
        Self::Balanced,
        Self::Aggressive,
        Self::Frugal,
        Self::Scatter,
        Self::None,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Balanced => "Balanced",
            Self::Aggressive => "Aggressive",
            Self::Frugal => "Frugal",
            Self::Scatter => "Scatter",
            Self::None => "None",
        }
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn BuildPolicy> {
        match self {
            Self::Balanced => Box::new(BalancedPolicy),
            Self::Aggressive => Box::new(AggressivePolicy),
            Self::Frugal => Box::new(FrugalPolicy),
            Self::Scatter => Box::new(ScatterPolicy::new(seed)),
            Self::None => Box::new(NoBuildPolicy),
        }
    }
}

impl fmt::Display for BuildStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

struct NoBuildPolicy;
struct AggressivePolicy;
struct BalancedPolicy;
struct FrugalPolicy;

struct ScatterPolicy {
    rng: ChaCha20Rng,
}

impl ScatterPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

/// Provinces that can still accept an outpost.
fn viable(engine: &OutbreakEngine) -> Vec<&ProvinceState> {
    let threshold = engine.config().virus.fully_infected_threshold;
    engine
        .provinces()
        .iter()
        .filter(|p| p.infection_level < threshold)
        .collect()
}

fn affordable(engine: &OutbreakEngine, region: &RegionId) -> bool {
    engine.can_build_outpost(region).is_ok()
}

impl BuildPolicy for NoBuildPolicy {
    fn name(&self) -> &'static str {
        "none"
    }

    fn choose_build(&mut self, _engine: &OutbreakEngine) -> Option<RegionId> {
        None
    }
}

impl BuildPolicy for AggressivePolicy {
    fn name(&self) -> &'static str {
        "aggressive"
    }

    fn choose_build(&mut self, engine: &OutbreakEngine) -> Option<RegionId> {
        let pick = viable(engine)
            .into_iter()
            .max_by(|a, b| a.infection_level.total_cmp(&b.infection_level))?;
        let region = pick.region.clone();
        affordable(engine, &region).then_some(region)
    }
}

impl BuildPolicy for BalancedPolicy {
    fn name(&self) -> &'static str {
        "balanced"
    }

    fn choose_build(&mut self, engine: &OutbreakEngine) -> Option<RegionId> {
        let candidates = viable(engine);
        let uncovered_hub = candidates
            .iter()
            .find(|p| engine.catalog().is_urban_hub(&p.region) && p.outpost_count == 0);
        let pick = match uncovered_hub {
            Some(hub) => hub,
            None => candidates.iter().min_by_key(|p| p.outpost_count)?,
        };
        let region = pick.region.clone();

        let quote = engine.can_build_outpost(&region).ok()?;
        let budget = engine.global_state()?.budget;
        // hold back enough for one more base-priced outpost
        (budget - quote.cost >= engine.config().costs.base_cost).then_some(region)
    }
}

impl BuildPolicy for FrugalPolicy {
    fn name(&self) -> &'static str {
        "frugal"
    }

    fn choose_build(&mut self, engine: &OutbreakEngine) -> Option<RegionId> {
        let candidates = viable(engine);
        let pick = candidates
            .iter()
            .filter(|p| engine.catalog().is_urban_hub(&p.region))
            .min_by_key(|p| p.outpost_count)?;
        let region = pick.region.clone();

        let quote = engine.can_build_outpost(&region).ok()?;
        let budget = engine.global_state()?.budget;
        (budget >= quote.cost * 2).then_some(region)
    }
}

impl BuildPolicy for ScatterPolicy {
    fn name(&self) -> &'static str {
        "scatter"
    }

    fn choose_build(&mut self, engine: &OutbreakEngine) -> Option<RegionId> {
        let candidates = viable(engine);
        if candidates.is_empty() {
            return None;
        }
        let pick = candidates[self.rng.gen_range(0..candidates.len())];
        let region = pick.region.clone();
        affordable(engine, &region).then_some(region)
    }
}
