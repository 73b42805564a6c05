// src/safety/mod.rs - Collision-avoidance supervisor: thresholds, state, monitor, facade
pub mod facade;
pub mod monitor;

use std::time::Duration;

use thiserror::Error;

pub use facade::SafeMotionController;
pub use monitor::SafetyMonitor;

/// Distance substituted for a failed or echo-less sensor read. One neutral
/// sample never clears an armed emergency stop; it only keeps a dead sensor
/// from wedging the loop.
pub const DEFAULT_SAFE_DISTANCE_CM: u16 = 100;

#[derive(Debug, Error)]
pub enum SafetyError {
    #[error(
        "invalid thresholds: emergency distance {emergency_cm}cm must be positive and below the minimum distance {min_cm}cm"
    )]
    InvalidThresholds { min_cm: u16, emergency_cm: u16 },
    #[error("sample interval must be positive")]
    InvalidSampleInterval,
    #[error("sampling task did not stop within {0:?}")]
    StopTimeout(Duration),
    #[error("sampling task failed: {0}")]
    TaskFailed(String),
    #[error("hardware error: {0}")]
    Hardware(#[from] crate::hardware::HardwareError),
}

/// Validated distance thresholds. `emergency_distance_cm` is strictly below
/// `min_distance_cm`; a monitor cannot be built with an incoherent policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafetyThresholds {
    min_distance_cm: u16,
    emergency_distance_cm: u16,
}

impl SafetyThresholds {
    pub fn new(min_distance_cm: u16, emergency_distance_cm: u16) -> Result<Self, SafetyError> {
        if emergency_distance_cm == 0 || emergency_distance_cm >= min_distance_cm {
            return Err(SafetyError::InvalidThresholds {
                min_cm: min_distance_cm,
                emergency_cm: emergency_distance_cm,
            });
        }
        Ok(Self {
            min_distance_cm,
            emergency_distance_cm,
        })
    }

    pub fn min_distance_cm(&self) -> u16 {
        self.min_distance_cm
    }

    pub fn emergency_distance_cm(&self) -> u16 {
        self.emergency_distance_cm
    }
}

/// Read-only snapshot of the supervisor, taken under one lock acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafetyStatus {
    pub monitoring: bool,
    pub last_distance_cm: u16,
    pub safe: bool,
    pub emergency_stop_triggered: bool,
}

/// What a folded-in reading asks of the sampling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReadingOutcome {
    /// Crossed into the emergency zone; issue a stop now.
    EmergencyStop,
    /// Entered the warning zone.
    Warning,
    /// No transition of interest.
    Unchanged,
}

/// Mutable supervisor state. Owned by the monitor; every external view goes
/// through a [`SafetyStatus`] snapshot.
#[derive(Debug, Clone)]
pub(crate) struct SafetyState {
    pub last_distance_cm: u16,
    pub monitoring: bool,
    pub collision_latched: bool,
    pub emergency_stop_triggered: bool,
}

impl Default for SafetyState {
    fn default() -> Self {
        Self {
            last_distance_cm: DEFAULT_SAFE_DISTANCE_CM,
            monitoring: false,
            collision_latched: false,
            emergency_stop_triggered: false,
        }
    }
}

impl SafetyState {
    /// Folds one reading into the latches.
    ///
    /// The emergency stop fires on the edge of `emergency_stop_triggered`, not
    /// of the warning latch, so a warning reading ahead of the crossing does
    /// not swallow the stop, and an unbroken stay below the emergency
    /// threshold issues exactly one. Distance recovering above the minimum
    /// clears the warning latch but never the emergency flag; that takes an
    /// explicit reset.
    pub(crate) fn apply_reading(
        &mut self,
        distance_cm: u16,
        thresholds: &SafetyThresholds,
    ) -> ReadingOutcome {
        self.last_distance_cm = distance_cm;
        if distance_cm <= thresholds.emergency_distance_cm() {
            let crossed = !self.emergency_stop_triggered;
            self.emergency_stop_triggered = true;
            self.collision_latched = true;
            if crossed {
                ReadingOutcome::EmergencyStop
            } else {
                ReadingOutcome::Unchanged
            }
        } else if distance_cm <= thresholds.min_distance_cm() {
            let crossed = !self.collision_latched;
            self.collision_latched = true;
            if crossed {
                ReadingOutcome::Warning
            } else {
                ReadingOutcome::Unchanged
            }
        } else {
            self.collision_latched = false;
            ReadingOutcome::Unchanged
        }
    }

    pub(crate) fn safe_to_move(&self, thresholds: &SafetyThresholds) -> bool {
        !self.emergency_stop_triggered && self.last_distance_cm > thresholds.min_distance_cm()
    }
}
