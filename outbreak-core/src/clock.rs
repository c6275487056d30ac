//! Elapsed-time derivation from external day/night clock readings.

use serde::{Deserialize, Serialize};

/// One observation of the external simulated clock.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClockReading {
    /// One-based simulated day index.
    pub day: u32,
    /// Simulated minutes elapsed into the current day.
    pub minutes_into_day: f32,
}

impl ClockReading {
    #[must_use]
    pub const fn new(day: u32, minutes_into_day: f32) -> Self {
        Self {
            day,
            minutes_into_day,
        }
    }
}

/// Turns successive clock readings into non-negative elapsed-minute deltas.
///
/// Day rollover is credited through the configured day length. Non-monotonic
/// or repeated readings clamp to zero elapsed; the tracker never attempts to
/// correct a backwards clock.
#[derive(Debug, Clone, Default)]
pub struct ClockTracker {
    minutes_per_day: f32,
    last: Option<ClockReading>,
}

impl ClockTracker {
    #[must_use]
    pub fn new(minutes_per_day: f32) -> Self {
        Self {
            minutes_per_day: if minutes_per_day.is_finite() {
                minutes_per_day.max(0.0)
            } else {
                0.0
            },
            last: None,
        }
    }

    /// Record a reading and return the clamped elapsed minutes since the
    /// previous one. The first observation yields zero.
    pub fn observe(&mut self, reading: ClockReading) -> f32 {
        let elapsed = match self.last {
            None => 0.0,
            Some(prev) => {
                let day_span = (f64::from(reading.day) - f64::from(prev.day))
                    * f64::from(self.minutes_per_day);
                let minute_span =
                    f64::from(reading.minutes_into_day) - f64::from(prev.minutes_into_day);
                day_span + minute_span
            }
        };
        self.last = Some(reading);
        if elapsed.is_finite() {
            crate::numbers::clamp_f64_to_f32(elapsed.max(0.0))
        } else {
            0.0
        }
    }

    /// Forget the previous reading, e.g. on re-initialization.
    pub fn reset(&mut self) {
        self.last = None;
    }

    #[must_use]
    pub const fn last_reading(&self) -> Option<ClockReading> {
        self.last
    }
}
