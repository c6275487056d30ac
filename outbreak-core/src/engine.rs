//! The outbreak simulation engine: province dynamics, cure race, outpost
//! economy, and win/loss evaluation behind narrow mutating entry points.

use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::catalog::{RegionCatalog, RegionId};
use crate::clock::{ClockReading, ClockTracker};
use crate::config::{ConfigError, SimulationConfig};
use crate::cure::{self, GlobalState};
use crate::events::{EventHub, SimEvent, SubscriptionId};
use crate::outcome::{Outcome, OutcomeKind};
use crate::province::ProvinceState;
use crate::seeding;

/// Initialization failures. The engine stays uninitialized and callers treat
/// state as absent; nothing here is fatal.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InitError {
    #[error("region catalog is empty")]
    EmptyRegionCatalog,
}

/// Typed reasons an outpost build is refused. Checks run in declaration
/// order; none of them mutate state.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("simulation is not initialized")]
    NotInitialized,
    #[error("unknown region: {region}")]
    UnknownRegion { region: RegionId },
    #[error("province {region} is fully infected")]
    ProvinceFullyInfected { region: RegionId },
    #[error("not enough ZAR: outpost costs R{cost}, budget R{budget}")]
    NotEnoughZar { cost: i64, budget: i64 },
}

/// Price quote for the next outpost in a region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildQuote {
    pub region: RegionId,
    pub cost: i64,
}

/// Record of a completed outpost build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildReceipt {
    pub region: RegionId,
    pub cost: i64,
    pub remaining_budget: i64,
    pub outpost_count: u32,
}

/// What one call to [`OutbreakEngine::advance`] did.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AdvanceSummary {
    pub day: u32,
    /// Elapsed minutes after negative/non-finite clamping.
    pub elapsed_minutes: f32,
    pub provinces_changed: u32,
    /// One-shot flags raised during this call.
    pub all_infected: bool,
    pub cure_completed: bool,
    pub outcome_reached: bool,
}

/// Single-threaded simulation engine. The engine is the sole writer of its
/// state; collaborators observe through events and read-only queries, and
/// event handlers must not re-enter the engine.
#[derive(Debug)]
pub struct OutbreakEngine {
    cfg: SimulationConfig,
    seed: u64,
    catalog: RegionCatalog,
    provinces: Vec<ProvinceState>,
    global: GlobalState,
    clock: ClockTracker,
    events: EventHub,
    outcome: Option<Outcome>,
    last_day: u32,
    initialized: bool,
    all_infected_flagged: bool,
    cure_completed_flagged: bool,
}

impl OutbreakEngine {
    /// Construct an uninitialized engine.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when the configuration violates hard bounds.
    /// Soft numeric edges (negative rates, inverted seed ranges) are
    /// normalized instead of rejected.
    pub fn new(config: SimulationConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut cfg = config;
        cfg.sanitize();
        Ok(Self {
            cfg,
            seed,
            catalog: RegionCatalog::default(),
            provinces: Vec::new(),
            global: GlobalState::default(),
            clock: ClockTracker::new(cfg.clock.minutes_per_day),
            events: EventHub::new(),
            outcome: None,
            last_day: 1,
            initialized: false,
            all_infected_flagged: false,
            cure_completed_flagged: false,
        })
    }

    /// Reset the session against a region catalog: seed per-province
    /// infection, restore the starting budget, clear any prior outcome, and
    /// notify listeners of every fresh province plus the global state.
    ///
    /// # Errors
    ///
    /// Returns `InitError::EmptyRegionCatalog` for an empty catalog; the
    /// engine then remains uninitialized.
    pub fn initialize(&mut self, catalog: &RegionCatalog) -> Result<(), InitError> {
        if catalog.is_empty() {
            return Err(InitError::EmptyRegionCatalog);
        }

        let cfg = self.cfg;
        let seed = self.seed;
        let (lo, hi) = cfg.initial_infection.bounds();
        self.provinces = catalog
            .iter()
            .map(|info| {
                let seed_infection = if hi > lo {
                    let mut rng = seeding::region_rng(seed, &info.id);
                    rng.gen_range(lo..=hi)
                } else {
                    lo
                };
                ProvinceState::seeded(info, seed_infection, &cfg.virus)
            })
            .collect();
        self.catalog = catalog.clone();
        self.global = GlobalState {
            budget: cfg.starting_budget,
            ..GlobalState::default()
        };
        self.outcome = None;
        self.all_infected_flagged = false;
        self.cure_completed_flagged = false;
        self.last_day = 1;
        self.clock.reset();
        self.initialized = true;

        for idx in 0..self.provinces.len() {
            let snapshot = self.provinces[idx].snapshot();
            self.events
                .emit(&SimEvent::ProvinceChanged { province: snapshot });
        }
        let global = self.global;
        self.events.emit(&SimEvent::GlobalChanged { global });
        Ok(())
    }

    /// Advance the simulation by `elapsed_minutes` of simulated time at the
    /// given day index. Negative or non-finite elapsed time clamps to zero
    /// and changes no simulation state, though the day index is still
    /// recorded as the most recent advance day for later builds.
    pub fn advance(&mut self, elapsed_minutes: f32, day: u32) -> AdvanceSummary {
        let minutes = if elapsed_minutes.is_finite() {
            elapsed_minutes.max(0.0)
        } else {
            0.0
        };
        let mut summary = AdvanceSummary {
            day,
            elapsed_minutes: minutes,
            ..AdvanceSummary::default()
        };
        if !self.initialized {
            return summary;
        }
        self.last_day = day;
        if minutes <= 0.0 {
            return summary;
        }

        let elapsed_hours = f64::from(minutes) / 60.0;
        let strength = self.cfg.virus.strength_factor(day);

        let mut changed: SmallVec<[usize; 12]> = SmallVec::new();
        for (idx, province) in self.provinces.iter_mut().enumerate() {
            if province.apply_tick(&self.cfg.virus, &self.cfg.outposts, strength, elapsed_hours) {
                changed.push(idx);
            }
        }
        // Province notifications fire after the full pass, never interleaved.
        for idx in &changed {
            let snapshot = self.provinces[*idx].snapshot();
            self.events
                .emit(&SimEvent::ProvinceChanged { province: snapshot });
        }
        summary.provinces_changed = u32::try_from(changed.len()).unwrap_or(u32::MAX);

        self.recompute_and_emit(elapsed_hours, &mut summary);
        self.evaluate_outcome(day, &mut summary);
        self.flag_all_infected(&mut summary);
        summary
    }

    /// Advance from an external clock reading; the engine derives the elapsed
    /// delta itself, including day rollover and the negative-delta clamp.
    pub fn advance_clock(&mut self, reading: ClockReading) -> AdvanceSummary {
        let minutes = self.clock.observe(reading);
        self.advance(minutes, reading.day)
    }

    /// Price of the next outpost anywhere in the country.
    #[must_use]
    pub fn next_outpost_cost(&self) -> i64 {
        self.cfg.costs.base_cost
            + self.cfg.costs.cost_per_existing_outpost * i64::from(self.global.total_outposts)
    }

    /// Check whether an outpost could be built in `region` right now and at
    /// what price. Never mutates state.
    ///
    /// # Errors
    ///
    /// Returns the first failing [`BuildError`] check.
    pub fn can_build_outpost(&self, region: &RegionId) -> Result<BuildQuote, BuildError> {
        if !self.initialized {
            return Err(BuildError::NotInitialized);
        }
        let province = self
            .provinces
            .iter()
            .find(|p| &p.region == region)
            .ok_or_else(|| BuildError::UnknownRegion {
                region: region.clone(),
            })?;
        if province.infection_level >= self.cfg.virus.fully_infected_threshold {
            return Err(BuildError::ProvinceFullyInfected {
                region: region.clone(),
            });
        }
        let cost = self.next_outpost_cost();
        if cost > self.global.budget {
            return Err(BuildError::NotEnoughZar {
                cost,
                budget: self.global.budget,
            });
        }
        Ok(BuildQuote {
            region: province.region.clone(),
            cost,
        })
    }

    /// Build an outpost in `region`: deduct the quoted cost, place the
    /// outpost, refresh the province thresholds, refresh global outpost
    /// counts without advancing cure progress, and re-evaluate win/loss at
    /// the most recent advance day.
    ///
    /// # Errors
    ///
    /// Returns the same typed reasons as [`Self::can_build_outpost`].
    pub fn try_build_outpost(&mut self, region: &RegionId) -> Result<BuildReceipt, BuildError> {
        let quote = self.can_build_outpost(region)?;
        let Some(idx) = self.province_index(region) else {
            return Err(BuildError::UnknownRegion {
                region: region.clone(),
            });
        };

        self.global.budget -= quote.cost;
        let province = &mut self.provinces[idx];
        province.outpost_count += 1;
        province.refresh_thresholds(&self.cfg.virus);

        let snapshot = self.provinces[idx].snapshot();
        self.events
            .emit(&SimEvent::ProvinceChanged { province: snapshot });

        let mut summary = AdvanceSummary {
            day: self.last_day,
            ..AdvanceSummary::default()
        };
        self.recompute_and_emit(0.0, &mut summary);
        self.evaluate_outcome(self.last_day, &mut summary);

        Ok(BuildReceipt {
            region: quote.region,
            cost: quote.cost,
            remaining_budget: self.global.budget,
            outpost_count: self.provinces[idx].outpost_count,
        })
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&SimEvent) + 'static) -> SubscriptionId {
        self.events.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    #[must_use]
    pub fn provinces(&self) -> &[ProvinceState] {
        &self.provinces
    }

    #[must_use]
    pub fn province(&self, region: &RegionId) -> Option<&ProvinceState> {
        self.provinces.iter().find(|p| &p.region == region)
    }

    /// Current global state, absent while uninitialized.
    #[must_use]
    pub fn global_state(&self) -> Option<GlobalState> {
        self.initialized.then_some(self.global)
    }

    #[must_use]
    pub const fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    /// Day index of the most recent `advance` call.
    #[must_use]
    pub const fn last_advance_day(&self) -> u32 {
        self.last_day
    }

    #[must_use]
    pub const fn config(&self) -> &SimulationConfig {
        &self.cfg
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    #[must_use]
    pub const fn catalog(&self) -> &RegionCatalog {
        &self.catalog
    }

    fn province_index(&self, region: &RegionId) -> Option<usize> {
        self.provinces.iter().position(|p| &p.region == region)
    }

    fn recompute_and_emit(&mut self, elapsed_hours: f64, summary: &mut AdvanceSummary) {
        cure::recompute_cure(
            &mut self.global,
            &self.provinces,
            &self.catalog,
            &self.cfg.outposts,
            elapsed_hours,
        );
        let global = self.global;
        self.events.emit(&SimEvent::GlobalChanged { global });

        if !self.cure_completed_flagged
            && self.global.cure_progress >= self.cfg.cure_completion_threshold
        {
            self.cure_completed_flagged = true;
            summary.cure_completed = true;
            self.events.emit(&SimEvent::CureCompleted);
        }
    }

    fn evaluate_outcome(&mut self, day: u32, summary: &mut AdvanceSummary) {
        if self.outcome.is_some() {
            return;
        }
        let total = u32::try_from(self.provinces.len()).unwrap_or(u32::MAX);
        let fully = u32::try_from(
            self.provinces
                .iter()
                .filter(|p| p.fully_infected)
                .count(),
        )
        .unwrap_or(u32::MAX);

        let cure_done = self.global.cure_progress >= self.cfg.cure_completion_threshold;
        let kind = if cure_done {
            OutcomeKind::Victory
        } else if total > 0 && fully == total {
            OutcomeKind::Defeat
        } else {
            return;
        };

        let outcome = Outcome {
            kind,
            day,
            provinces_saved: total.saturating_sub(fully),
            provinces_fully_infected: fully,
            global: self.global,
        };
        self.outcome = Some(outcome.clone());
        summary.outcome_reached = true;
        self.events.emit(&SimEvent::OutcomeReached { outcome });
    }

    fn flag_all_infected(&mut self, summary: &mut AdvanceSummary) {
        if self.all_infected_flagged || self.provinces.is_empty() {
            return;
        }
        if self.provinces.iter().all(|p| p.fully_infected) {
            self.all_infected_flagged = true;
            summary.all_infected = true;
            self.events.emit(&SimEvent::AllProvincesInfected);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::RegionInfo;
    use crate::config::InitialInfection;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn catalog(ids: &[&str]) -> RegionCatalog {
        RegionCatalog {
            regions: ids.iter().map(|id| RegionInfo::new(id, id)).collect(),
            urban_hubs: Vec::new(),
        }
    }

    fn constant_seed_config(seed_infection: f32) -> SimulationConfig {
        SimulationConfig {
            initial_infection: InitialInfection {
                min: seed_infection,
                max: seed_infection,
            },
            ..SimulationConfig::default()
        }
    }

    #[test]
    fn empty_catalog_leaves_engine_uninitialized() {
        let mut engine = OutbreakEngine::new(SimulationConfig::default(), 1).unwrap();
        let err = engine.initialize(&RegionCatalog::default()).unwrap_err();
        assert_eq!(err, InitError::EmptyRegionCatalog);
        assert!(!engine.is_initialized());
        assert!(engine.global_state().is_none());
        let summary = engine.advance(60.0, 1);
        assert_eq!(summary.provinces_changed, 0);
    }

    #[test]
    fn initialization_emits_per_province_and_global_events() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut engine = OutbreakEngine::new(constant_seed_config(0.1), 9).unwrap();
        engine.subscribe(move |event| sink.borrow_mut().push(event.clone()));
        engine.initialize(&catalog(&["a", "b", "c"])).unwrap();

        let events = seen.borrow();
        assert_eq!(events.len(), 4);
        assert!(matches!(events[0], SimEvent::ProvinceChanged { .. }));
        assert!(matches!(events[3], SimEvent::GlobalChanged { .. }));
    }

    #[test]
    fn reinitialization_resets_session_state() {
        let mut engine = OutbreakEngine::new(constant_seed_config(0.0), 5).unwrap();
        engine.initialize(&catalog(&["a"])).unwrap();
        engine
            .try_build_outpost(&RegionId::new("a"))
            .expect("first build affordable");
        assert_eq!(engine.global_state().unwrap().total_outposts, 1);

        engine.initialize(&catalog(&["a"])).unwrap();
        let global = engine.global_state().unwrap();
        assert_eq!(global.total_outposts, 0);
        assert_eq!(global.budget, engine.config().starting_budget);
        assert!(engine.outcome().is_none());
    }

    #[test]
    fn seed_draws_are_catalog_order_independent() {
        let cfg = SimulationConfig::default();
        let mut forward = OutbreakEngine::new(cfg, 1234).unwrap();
        forward.initialize(&catalog(&["a", "b", "c"])).unwrap();
        let mut reversed = OutbreakEngine::new(cfg, 1234).unwrap();
        reversed.initialize(&catalog(&["c", "b", "a"])).unwrap();

        for province in forward.provinces() {
            let twin = reversed.province(&province.region).unwrap();
            assert!((province.infection_level - twin.infection_level).abs() < f32::EPSILON);
        }
    }

    #[test]
    fn build_checks_fail_in_declared_order() {
        let mut cfg = constant_seed_config(0.1);
        cfg.costs.base_cost = 2_000;
        let mut engine = OutbreakEngine::new(cfg, 3).unwrap();

        assert_eq!(
            engine.can_build_outpost(&RegionId::new("a")),
            Err(BuildError::NotInitialized)
        );
        engine.initialize(&catalog(&["a"])).unwrap();
        assert!(matches!(
            engine.can_build_outpost(&RegionId::new("nowhere")),
            Err(BuildError::UnknownRegion { .. })
        ));
        assert!(matches!(
            engine.can_build_outpost(&RegionId::new("a")),
            Err(BuildError::NotEnoughZar {
                cost: 2_000,
                budget: 1_000
            })
        ));
    }

    #[test]
    fn fully_infected_provinces_refuse_outposts() {
        let mut engine = OutbreakEngine::new(constant_seed_config(0.96), 3).unwrap();
        engine.initialize(&catalog(&["a"])).unwrap();
        assert!(matches!(
            engine.can_build_outpost(&RegionId::new("a")),
            Err(BuildError::ProvinceFullyInfected { .. })
        ));
    }

    #[test]
    fn build_updates_counts_without_advancing_cure() {
        let mut engine = OutbreakEngine::new(constant_seed_config(0.1), 3).unwrap();
        engine.initialize(&catalog(&["a", "b"])).unwrap();

        let receipt = engine.try_build_outpost(&RegionId::new("a")).unwrap();
        assert_eq!(receipt.cost, 250);
        assert_eq!(receipt.remaining_budget, 750);
        assert_eq!(receipt.outpost_count, 1);

        let global = engine.global_state().unwrap();
        assert_eq!(global.total_outposts, 1);
        assert_eq!(global.active_outposts, 1);
        assert!((global.cure_progress - 0.0).abs() < f32::EPSILON);
        assert_eq!(engine.next_outpost_cost(), 325);
    }

    #[test]
    fn case_insensitive_region_lookup() {
        let mut engine = OutbreakEngine::new(constant_seed_config(0.1), 3).unwrap();
        engine
            .initialize(&catalog(&["gauteng"]))
            .unwrap();
        assert!(engine.province(&RegionId::new("GAUTENG")).is_some());
        assert!(engine.can_build_outpost(&RegionId::new(" Gauteng ")).is_ok());
    }

    #[test]
    fn zero_minute_advance_changes_nothing_but_records_day() {
        let mut engine = OutbreakEngine::new(constant_seed_config(0.2), 3).unwrap();
        engine.initialize(&catalog(&["a"])).unwrap();
        let before = engine.province(&RegionId::new("a")).unwrap().clone();

        let summary = engine.advance(0.0, 7);
        assert_eq!(summary.provinces_changed, 0);
        assert_eq!(engine.province(&RegionId::new("a")).unwrap(), &before);
        assert_eq!(engine.last_advance_day(), 7);

        let summary = engine.advance(-30.0, 8);
        assert!((summary.elapsed_minutes - 0.0).abs() < f32::EPSILON);
        assert_eq!(engine.last_advance_day(), 8);
    }

    #[test]
    fn outcome_fires_exactly_once() {
        let mut cfg = constant_seed_config(0.96);
        cfg.virus.base_infection_per_hour = 0.0;
        let mut engine = OutbreakEngine::new(cfg, 3).unwrap();
        engine.initialize(&catalog(&["a", "b"])).unwrap();

        let summary = engine.advance(60.0, 2);
        assert!(summary.outcome_reached);
        assert!(summary.all_infected);
        let outcome = engine.outcome().unwrap().clone();
        assert_eq!(outcome.kind, OutcomeKind::Defeat);
        assert_eq!(outcome.day, 2);
        assert_eq!(outcome.provinces_saved, 0);
        assert_eq!(outcome.provinces_fully_infected, 2);

        let summary = engine.advance(60.0, 3);
        assert!(!summary.outcome_reached);
        assert!(!summary.all_infected);
        assert_eq!(engine.outcome(), Some(&outcome));
    }
}
