//! Collision-avoidance safety supervisor for a small ground rover.
//!
//! A background [`SafetyMonitor`] samples an ultrasonic [`DistanceSensor`] on
//! a fixed cadence and derives a movement verdict; a [`SafeMotionController`]
//! wraps the chassis [`MotionController`] and refuses forward and turning
//! commands while the verdict says no. Emergency-range readings stop the
//! chassis immediately and stay latched until an explicit reset.

pub mod command;
pub mod config;
pub mod hardware;
pub mod safety;

pub use command::{CommandExecutor, MovementCommand, parse_movement_command};
pub use config::{ConfigError, DriveConfig, RoverConfig, SafetyConfig, load_config, load_or_default};
pub use hardware::{
    DistanceSensor, HardwareError, MotionController, MotionEvent, SimDistanceSensor,
    SimMotionController,
};
pub use safety::{
    DEFAULT_SAFE_DISTANCE_CM, SafeMotionController, SafetyError, SafetyMonitor, SafetyStatus,
    SafetyThresholds,
};
