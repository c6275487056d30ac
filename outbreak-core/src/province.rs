use serde::{Deserialize, Serialize};

use crate::catalog::{RegionId, RegionInfo};
use crate::config::{OutpostRates, VirusRates};
use crate::numbers;

/// Mutable infection and outpost state for one governed province.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvinceState {
    pub region: RegionId,
    pub name: String,
    /// Infected fraction of the province, always within [0,1].
    pub infection_level: f32,
    pub outpost_count: u32,
    /// True only while infection sits at or above the disable threshold and
    /// the province has outposts to disable.
    pub outposts_disabled: bool,
    /// Monotonic within a session; only re-initialization clears it.
    pub fully_infected: bool,
}

/// Read-only province payload carried by change notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvinceSnapshot {
    pub region: RegionId,
    pub infection_level: f32,
    pub outpost_count: u32,
    pub outposts_disabled: bool,
    pub fully_infected: bool,
}

impl ProvinceState {
    /// Fresh province seeded with its initial infection draw.
    #[must_use]
    pub fn seeded(info: &RegionInfo, seed_infection: f32, virus: &VirusRates) -> Self {
        let infection_level = numbers::clamp_unit_f32(f64::from(seed_infection));
        let mut province = Self {
            region: info.id.clone(),
            name: info.name.clone(),
            infection_level,
            outpost_count: 0,
            outposts_disabled: false,
            fully_infected: false,
        };
        province.refresh_thresholds(virus);
        province
    }

    /// Whether local outposts currently contribute cure work.
    #[must_use]
    pub const fn local_cure_active(&self) -> bool {
        self.outpost_count > 0 && !self.outposts_disabled
    }

    /// Integrate one tick of infection growth against local cure output.
    /// Growth and cure apply as a single net delta, clamped once at the end.
    /// Returns true when any observable field changed.
    pub(crate) fn apply_tick(
        &mut self,
        virus: &VirusRates,
        outposts: &OutpostRates,
        virus_strength: f64,
        elapsed_hours: f64,
    ) -> bool {
        let before = (
            self.infection_level,
            self.outposts_disabled,
            self.fully_infected,
        );

        let growth =
            f64::from(virus.base_infection_per_hour.max(0.0)) * virus_strength * elapsed_hours;
        let local_cure = if self.local_cure_active() {
            f64::from(outposts.local_cure_per_hour.max(0.0))
                * f64::from(self.outpost_count)
                * elapsed_hours
        } else {
            0.0
        };
        self.infection_level =
            numbers::clamp_unit_f32(f64::from(self.infection_level) + growth - local_cure);
        self.refresh_thresholds(virus);

        before
            != (
                self.infection_level,
                self.outposts_disabled,
                self.fully_infected,
            )
    }

    /// Re-derive the threshold flags from the current infection level.
    /// Disable/enable is hysteresis-free; full infection is sticky.
    pub(crate) fn refresh_thresholds(&mut self, virus: &VirusRates) -> bool {
        let before = (self.outposts_disabled, self.fully_infected);
        self.outposts_disabled =
            self.outpost_count > 0 && self.infection_level >= virus.outpost_disable_threshold;
        self.fully_infected =
            self.fully_infected || self.infection_level >= virus.fully_infected_threshold;
        before != (self.outposts_disabled, self.fully_infected)
    }

    #[must_use]
    pub fn snapshot(&self) -> ProvinceSnapshot {
        ProvinceSnapshot {
            region: self.region.clone(),
            infection_level: self.infection_level,
            outpost_count: self.outpost_count,
            outposts_disabled: self.outposts_disabled,
            fully_infected: self.fully_infected,
        }
    }
}
