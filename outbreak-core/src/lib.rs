//! Outbreak Simulation Engine
//!
//! Platform-agnostic core logic for the province outbreak strategy game.
//! This crate owns all infection, cure, and outpost-economy state without UI
//! or platform-specific dependencies; rendering, input, and the day/night
//! clock live in host applications that feed the engine region catalogs and
//! clock readings and observe its change notifications.

pub mod catalog;
pub mod clock;
pub mod config;
pub mod cure;
pub mod engine;
pub mod events;
pub mod numbers;
pub mod outcome;
pub mod province;
pub mod seeding;

// Re-export commonly used types
pub use catalog::{RegionCatalog, RegionId, RegionInfo};
pub use clock::{ClockReading, ClockTracker};
pub use config::{
    ClockCfg, ConfigError, InitialInfection, OutpostCosts, OutpostRates, SimulationConfig,
    VirusRates,
};
pub use cure::GlobalState;
pub use engine::{
    AdvanceSummary, BuildError, BuildQuote, BuildReceipt, InitError, OutbreakEngine,
};
pub use events::{EventHub, SimEvent, SubscriptionId};
pub use outcome::{Outcome, OutcomeKind};
pub use province::{ProvinceSnapshot, ProvinceState};

/// Trait for abstracting scenario data loading operations.
/// Platform-specific implementations should provide this.
pub trait ScenarioSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the ordered region catalog from the platform-specific source.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded.
    fn load_region_catalog(&self) -> Result<RegionCatalog, Self::Error>;

    /// Load the simulation configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or parsed.
    fn load_simulation_config(&self) -> Result<SimulationConfig, Self::Error>;
}

/// Scenario source backed by the data files embedded in this crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticScenario;

impl ScenarioSource for StaticScenario {
    type Error = serde_json::Error;

    fn load_region_catalog(&self) -> Result<RegionCatalog, Self::Error> {
        Ok(RegionCatalog::default_catalog().clone())
    }

    fn load_simulation_config(&self) -> Result<SimulationConfig, Self::Error> {
        Ok(*SimulationConfig::default_config())
    }
}

/// Load a scenario, construct the engine, and initialize it in one step.
///
/// # Errors
///
/// Returns an error if the scenario cannot be loaded, the configuration is
/// invalid, or the catalog is empty.
pub fn bootstrap_engine<S>(source: &S, seed: u64) -> Result<OutbreakEngine, anyhow::Error>
where
    S: ScenarioSource,
    S::Error: Into<anyhow::Error>,
{
    let catalog = source.load_region_catalog().map_err(Into::into)?;
    let config = source.load_simulation_config().map_err(Into::into)?;
    let mut engine = OutbreakEngine::new(config, seed)?;
    engine.initialize(&catalog)?;
    Ok(engine)
}
