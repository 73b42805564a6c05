// src/hardware/mod.rs - Hardware seam: motion and ranging contracts
pub mod sim;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use sim::{MotionEvent, SimDistanceSensor, SimMotionController};

#[derive(Debug, Error)]
pub enum HardwareError {
    #[error("motor fault: {0}")]
    Motor(String),
    #[error("sensor fault: {0}")]
    Sensor(String),
}

/// Drive and camera primitives of the rover chassis.
///
/// Implementations carry no safety logic of their own and must tolerate
/// interleaved calls from more than one task; in particular `stop` can arrive
/// while a timed move is still in flight and always wins.
#[async_trait]
pub trait MotionController: Send + Sync {
    /// Drive forward at `speed` percent. With a duration, the controller
    /// stops on its own once the duration elapses.
    async fn forward(&self, speed: u8, duration: Option<Duration>) -> Result<(), HardwareError>;

    /// Drive backward at `speed` percent.
    async fn backward(&self, speed: u8, duration: Option<Duration>) -> Result<(), HardwareError>;

    /// Steer left by `angle` degrees while driving.
    async fn turn_left(&self, angle: u8, duration: Option<Duration>) -> Result<(), HardwareError>;

    /// Steer right by `angle` degrees while driving.
    async fn turn_right(&self, angle: u8, duration: Option<Duration>) -> Result<(), HardwareError>;

    /// Halt all drive motors and center the steering. Idempotent.
    async fn stop(&self) -> Result<(), HardwareError>;

    /// Pan the camera head, degrees from center (-90..=90).
    async fn set_camera_pan(&self, angle: i8) -> Result<(), HardwareError>;

    /// Tilt the camera head, degrees from level (-90..=90).
    async fn set_camera_tilt(&self, angle: i8) -> Result<(), HardwareError>;
}

/// Forward-facing ultrasonic range finder.
#[async_trait]
pub trait DistanceSensor: Send + Sync {
    /// One ranging measurement in centimeters. A reading of 0 means the
    /// sensor got no echo; callers treat it like a failed read.
    async fn read_distance(&self) -> Result<u16, HardwareError>;
}
