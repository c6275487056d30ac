//! Simulation tuning: outpost, virus, cost, and clock configuration.

use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use thiserror::Error;

const DEFAULT_SIMULATION_DATA: &str = include_str!("../data/simulation.json");

/// Cure-outpost rate tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutpostRates {
    /// Infection fraction cured per outpost per simulated hour, locally.
    #[serde(default = "OutpostRates::default_local_cure_per_hour")]
    pub local_cure_per_hour: f32,
    /// Global cure progress per active-outpost equivalent per simulated hour.
    #[serde(default = "OutpostRates::default_global_cure_per_hour")]
    pub global_cure_per_hour: f32,
    /// Per-additional-active-outpost decay applied to global contribution.
    #[serde(default = "OutpostRates::default_diminishing_factor")]
    pub diminishing_factor: f32,
    /// Contribution multiplier for outposts in urban-hub regions.
    #[serde(default = "OutpostRates::default_urban_hub_bonus")]
    pub urban_hub_bonus: f32,
    /// Descriptive tuning target; not enforced by the engine.
    #[serde(default = "OutpostRates::default_target_win_day_window")]
    pub target_win_day_window: u32,
}

impl OutpostRates {
    const fn default_local_cure_per_hour() -> f32 {
        0.03
    }

    const fn default_global_cure_per_hour() -> f32 {
        0.002
    }

    const fn default_diminishing_factor() -> f32 {
        0.9
    }

    const fn default_urban_hub_bonus() -> f32 {
        1.25
    }

    const fn default_target_win_day_window() -> u32 {
        30
    }
}

impl Default for OutpostRates {
    fn default() -> Self {
        Self {
            local_cure_per_hour: Self::default_local_cure_per_hour(),
            global_cure_per_hour: Self::default_global_cure_per_hour(),
            diminishing_factor: Self::default_diminishing_factor(),
            urban_hub_bonus: Self::default_urban_hub_bonus(),
            target_win_day_window: Self::default_target_win_day_window(),
        }
    }
}

/// Virus spread tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VirusRates {
    /// Infection fraction gained per province per simulated hour on day 1.
    #[serde(default = "VirusRates::default_base_infection_per_hour")]
    pub base_infection_per_hour: f32,
    /// Strength amplification per elapsed simulated day past day 1.
    #[serde(default = "VirusRates::default_daily_growth_rate")]
    pub daily_growth_rate: f32,
    /// Infection level at which a province's outposts stop operating.
    #[serde(default = "VirusRates::default_outpost_disable_threshold")]
    pub outpost_disable_threshold: f32,
    /// Infection level at which a province counts as fully infected.
    #[serde(default = "VirusRates::default_fully_infected_threshold")]
    pub fully_infected_threshold: f32,
}

impl VirusRates {
    const fn default_base_infection_per_hour() -> f32 {
        0.01
    }

    const fn default_daily_growth_rate() -> f32 {
        0.15
    }

    const fn default_outpost_disable_threshold() -> f32 {
        0.8
    }

    const fn default_fully_infected_threshold() -> f32 {
        0.95
    }

    /// Escalating community-transmission multiplier; day 1 has no amplification.
    #[must_use]
    pub fn strength_factor(&self, day: u32) -> f64 {
        let elapsed = f64::from(day.saturating_sub(1));
        1.0 + elapsed * f64::from(self.daily_growth_rate.max(0.0))
    }
}

impl Default for VirusRates {
    fn default() -> Self {
        Self {
            base_infection_per_hour: Self::default_base_infection_per_hour(),
            daily_growth_rate: Self::default_daily_growth_rate(),
            outpost_disable_threshold: Self::default_outpost_disable_threshold(),
            fully_infected_threshold: Self::default_fully_infected_threshold(),
        }
    }
}

/// Outpost pricing in whole ZAR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutpostCosts {
    #[serde(default = "OutpostCosts::default_base_cost")]
    pub base_cost: i64,
    /// Increment applied per outpost already built anywhere in the country.
    #[serde(default = "OutpostCosts::default_cost_per_existing_outpost")]
    pub cost_per_existing_outpost: i64,
}

impl OutpostCosts {
    const fn default_base_cost() -> i64 {
        250
    }

    const fn default_cost_per_existing_outpost() -> i64 {
        75
    }
}

impl Default for OutpostCosts {
    fn default() -> Self {
        Self {
            base_cost: Self::default_base_cost(),
            cost_per_existing_outpost: Self::default_cost_per_existing_outpost(),
        }
    }
}

/// Seed-infection range drawn per province at initialization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InitialInfection {
    #[serde(default = "InitialInfection::default_min")]
    pub min: f32,
    #[serde(default = "InitialInfection::default_max")]
    pub max: f32,
}

impl InitialInfection {
    const fn default_min() -> f32 {
        0.05
    }

    const fn default_max() -> f32 {
        0.15
    }

    /// Ordered bounds; a degenerate range collapses to a constant draw.
    #[must_use]
    pub fn bounds(&self) -> (f32, f32) {
        if self.min <= self.max {
            (self.min, self.max)
        } else {
            (self.max, self.min)
        }
    }
}

impl Default for InitialInfection {
    fn default() -> Self {
        Self {
            min: Self::default_min(),
            max: Self::default_max(),
        }
    }
}

/// Simulated-clock geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClockCfg {
    #[serde(default = "ClockCfg::default_minutes_per_day")]
    pub minutes_per_day: f32,
}

impl ClockCfg {
    const fn default_minutes_per_day() -> f32 {
        1_440.0
    }
}

impl Default for ClockCfg {
    fn default() -> Self {
        Self {
            minutes_per_day: Self::default_minutes_per_day(),
        }
    }
}

/// Complete, session-immutable simulation configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default)]
    pub outposts: OutpostRates,
    #[serde(default)]
    pub virus: VirusRates,
    #[serde(default)]
    pub costs: OutpostCosts,
    #[serde(default)]
    pub initial_infection: InitialInfection,
    #[serde(default = "SimulationConfig::default_starting_budget")]
    pub starting_budget: i64,
    #[serde(default)]
    pub clock: ClockCfg,
    /// Near-1 threshold tolerating floating-point accumulation in the cure race.
    #[serde(default = "SimulationConfig::default_cure_completion_threshold")]
    pub cure_completion_threshold: f32,
}

impl SimulationConfig {
    const fn default_starting_budget() -> i64 {
        1_000
    }

    const fn default_cure_completion_threshold() -> f32 {
        0.999
    }

    #[must_use]
    pub fn load_from_static() -> Self {
        serde_json::from_str(DEFAULT_SIMULATION_DATA).unwrap_or_default()
    }

    #[must_use]
    pub fn default_config() -> &'static Self {
        static CONFIG: OnceLock<SimulationConfig> = OnceLock::new();
        CONFIG.get_or_init(Self::load_from_static)
    }

    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into a configuration.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Validate configuration invariants before sanitization.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when any field violates the documented bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        range_check(
            "outposts.diminishing_factor",
            self.outposts.diminishing_factor,
            f32::EPSILON,
            1.0,
        )?;
        min_check("outposts.urban_hub_bonus", self.outposts.urban_hub_bonus, 1.0)?;
        range_check(
            "virus.outpost_disable_threshold",
            self.virus.outpost_disable_threshold,
            f32::EPSILON,
            1.0,
        )?;
        range_check(
            "virus.fully_infected_threshold",
            self.virus.fully_infected_threshold,
            f32::EPSILON,
            1.0,
        )?;
        range_check(
            "cure_completion_threshold",
            self.cure_completion_threshold,
            f32::EPSILON,
            1.0,
        )?;
        min_check("clock.minutes_per_day", self.clock.minutes_per_day, 1.0)?;
        if self.costs.base_cost < 0 {
            return Err(ConfigError::NegativeCost {
                field: "costs.base_cost",
                value: self.costs.base_cost,
            });
        }
        if self.costs.cost_per_existing_outpost < 0 {
            return Err(ConfigError::NegativeCost {
                field: "costs.cost_per_existing_outpost",
                value: self.costs.cost_per_existing_outpost,
            });
        }
        if self.starting_budget < 0 {
            return Err(ConfigError::NegativeCost {
                field: "starting_budget",
                value: self.starting_budget,
            });
        }
        Ok(())
    }

    /// Normalize soft numeric edge cases in place. Negative rates clamp to
    /// zero, non-finite rates reset to zero, and an inverted seed-infection
    /// range is swapped.
    pub fn sanitize(&mut self) {
        self.outposts.local_cure_per_hour = sanitize_rate(self.outposts.local_cure_per_hour);
        self.outposts.global_cure_per_hour = sanitize_rate(self.outposts.global_cure_per_hour);
        self.virus.base_infection_per_hour = sanitize_rate(self.virus.base_infection_per_hour);
        self.virus.daily_growth_rate = sanitize_rate(self.virus.daily_growth_rate);
        let (min, max) = self.initial_infection.bounds();
        self.initial_infection.min = sanitize_rate(min).clamp(0.0, 1.0);
        self.initial_infection.max = sanitize_rate(max).clamp(0.0, 1.0);
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            outposts: OutpostRates::default(),
            virus: VirusRates::default(),
            costs: OutpostCosts::default(),
            initial_infection: InitialInfection::default(),
            starting_budget: Self::default_starting_budget(),
            clock: ClockCfg::default(),
            cure_completion_threshold: Self::default_cure_completion_threshold(),
        }
    }
}

/// Typed configuration violations surfaced by [`SimulationConfig::validate`].
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be at least {min:.2} (got {value:.2})")]
    MinViolation {
        field: &'static str,
        min: f32,
        value: f32,
    },
    #[error("{field} must be between {min:.3} and {max:.3} (got {value:.3})")]
    RangeViolation {
        field: &'static str,
        min: f32,
        max: f32,
        value: f32,
    },
    #[error("{field} must not be negative (got {value})")]
    NegativeCost { field: &'static str, value: i64 },
}

fn range_check(field: &'static str, value: f32, min: f32, max: f32) -> Result<(), ConfigError> {
    if !value.is_finite() || !(min..=max).contains(&value) {
        return Err(ConfigError::RangeViolation {
            field,
            min,
            max,
            value,
        });
    }
    Ok(())
}

fn min_check(field: &'static str, value: f32, min: f32) -> Result<(), ConfigError> {
    if !value.is_finite() || value < min {
        return Err(ConfigError::MinViolation { field, min, value });
    }
    Ok(())
}

fn sanitize_rate(value: f32) -> f32 {
    if value.is_finite() { value.max(0.0) } else { 0.0 }
}
