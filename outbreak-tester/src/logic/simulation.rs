use anyhow::{Context, Result};
use outbreak_core::{
    ClockReading, OutbreakEngine, OutcomeKind, RegionId, StaticScenario, bootstrap_engine,
};
use serde::{Deserialize, Serialize};

use crate::logic::policy::{BuildPolicy, BuildStrategy};

/// Configuration for one automated session.
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    pub seed: u64,
    pub strategy: BuildStrategy,
    pub max_days: u32,
    pub tick_minutes: f32,
}

impl SessionConfig {
    #[must_use]
    pub fn new(seed: u64, strategy: BuildStrategy) -> Self {
        Self {
            seed,
            strategy,
            max_days: 120,
            tick_minutes: 60.0,
        }
    }

    #[must_use]
    pub fn with_max_days(mut self, max_days: u32) -> Self {
        self.max_days = max_days.max(1);
        self
    }

    #[must_use]
    pub fn with_tick_minutes(mut self, tick_minutes: f32) -> Self {
        self.tick_minutes = if tick_minutes.is_finite() {
            tick_minutes.max(1.0)
        } else {
            60.0
        };
        self
    }
}

/// One outpost placement made during a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildRecord {
    pub day: u32,
    pub region: RegionId,
    pub cost: i64,
}

/// Result of advancing the session by one simulated day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayOutcome {
    pub day: u32,
    pub builds: u32,
    pub session_ended: bool,
}

/// Serializable summary of a completed session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub seed: u64,
    pub strategy: String,
    pub days: u32,
    pub outcome: Option<OutcomeKind>,
    pub outcome_day: Option<u32>,
    pub provinces_saved: u32,
    pub provinces_fully_infected: u32,
    pub cure_progress: f32,
    pub budget_remaining: i64,
    pub builds: Vec<BuildRecord>,
}

impl SessionReport {
    #[must_use]
    pub fn victorious(&self) -> bool {
        self.outcome == Some(OutcomeKind::Victory)
    }

    #[must_use]
    pub fn total_spend(&self) -> i64 {
        self.builds.iter().map(|record| record.cost).sum()
    }
}

/// Deterministic day-loop harness driving the engine through a synthetic
/// clock and an automated build policy.
pub struct SimulationSession {
    engine: OutbreakEngine,
    cfg: SessionConfig,
    builds: Vec<BuildRecord>,
    days_run: u32,
}

impl SimulationSession {
    /// Boot a session against the embedded scenario data.
    ///
    /// # Errors
    ///
    /// Returns an error if the scenario fails to load or initialize.
    pub fn new(cfg: SessionConfig) -> Result<Self> {
        let engine = bootstrap_engine(&StaticScenario, cfg.seed)
            .with_context(|| format!("bootstrapping session for seed {}", cfg.seed))?;
        Ok(Self {
            engine,
            cfg,
            builds: Vec::new(),
            days_run: 0,
        })
    }

    #[must_use]
    pub fn engine(&self) -> &OutbreakEngine {
        &self.engine
    }

    /// Advance one simulated day: tick the synthetic clock through the day,
    /// consulting the policy after every tick.
    pub fn advance_day(&mut self, policy: &mut dyn BuildPolicy) -> DayOutcome {
        let day = self.days_run + 1;
        let minutes_per_day = self.engine.config().clock.minutes_per_day;
        let mut minutes_into_day = 0.0_f32;
        let mut builds = 0_u32;

        while minutes_into_day < minutes_per_day {
            minutes_into_day = (minutes_into_day + self.cfg.tick_minutes).min(minutes_per_day);
            self.engine
                .advance_clock(ClockReading::new(day, minutes_into_day));

            if self.engine.outcome().is_some() {
                break;
            }

            if let Some(region) = policy.choose_build(&self.engine)
                && let Ok(receipt) = self.engine.try_build_outpost(&region)
            {
                log::debug!(
                    "day {day}: {} built in {} for R{}",
                    policy.name(),
                    receipt.region,
                    receipt.cost
                );
                self.builds.push(BuildRecord {
                    day,
                    region: receipt.region,
                    cost: receipt.cost,
                });
                builds += 1;
            }
        }

        self.days_run = day;
        DayOutcome {
            day,
            builds,
            session_ended: self.engine.outcome().is_some(),
        }
    }

    /// Consume the session into its report.
    #[must_use]
    pub fn into_report(self) -> SessionReport {
        let global = self.engine.global_state().unwrap_or_default();
        let outcome = self.engine.outcome();
        let fully = self
            .engine
            .provinces()
            .iter()
            .filter(|p| p.fully_infected)
            .count();
        let total = self.engine.provinces().len();

        SessionReport {
            seed: self.cfg.seed,
            strategy: self.cfg.strategy.label().to_string(),
            days: self.days_run,
            outcome: outcome.map(|o| o.kind),
            outcome_day: outcome.map(|o| o.day),
            provinces_saved: u32::try_from(total - fully).unwrap_or(0),
            provinces_fully_infected: u32::try_from(fully).unwrap_or(0),
            cure_progress: global.cure_progress,
            budget_remaining: global.budget,
            builds: self.builds,
        }
    }

    /// Run a full session to its outcome or the day cap.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be bootstrapped.
    pub fn run(cfg: SessionConfig) -> Result<SessionReport> {
        let mut session = Self::new(cfg)?;
        let mut policy = cfg.strategy.create_policy(cfg.seed);
        for _ in 0..cfg.max_days {
            let outcome = session.advance_day(policy.as_mut());
            if outcome.session_ended {
                break;
            }
        }
        Ok(session.into_report())
    }
}
