// src/safety/facade.rs - Motion controller wrapper gated on the safety verdict

use std::sync::Arc;
use std::time::Duration;

use super::{SafetyError, SafetyMonitor, SafetyStatus};
use crate::hardware::{HardwareError, MotionController};

/// Pause between the two servo positions of a nod or head-shake.
const GESTURE_STEP: Duration = Duration::from_millis(300);

/// Wraps a [`MotionController`] so forward and turning commands only reach
/// the hardware while the monitor's verdict permits movement. Backward, stop,
/// and camera operations always pass through.
///
/// The verdict is a snapshot: a reading that lands between the check and the
/// forwarded call is resolved by the next sampling tick, which forces a stop
/// for emergency-range readings. The staleness window is bounded by one
/// sampling period.
///
/// The facade never mutates safety state; clearing an emergency stop is done
/// on the monitor itself.
pub struct SafeMotionController {
    controller: Arc<dyn MotionController>,
    monitor: Arc<SafetyMonitor>,
}

impl SafeMotionController {
    pub fn new(controller: Arc<dyn MotionController>, monitor: Arc<SafetyMonitor>) -> Self {
        Self {
            controller,
            monitor,
        }
    }

    /// Drive forward. Returns `Ok(false)`, without touching the controller,
    /// while movement is unsafe.
    pub async fn forward(
        &self,
        speed: u8,
        duration: Option<Duration>,
    ) -> Result<bool, HardwareError> {
        if !self.monitor.is_safe_to_move().await {
            tracing::warn!("forward blocked: obstacle detected");
            return Ok(false);
        }
        self.controller.forward(speed, duration).await?;
        Ok(true)
    }

    /// Drive backward. Backing away from an obstacle is never blocked.
    pub async fn backward(
        &self,
        speed: u8,
        duration: Option<Duration>,
    ) -> Result<bool, HardwareError> {
        self.controller.backward(speed, duration).await?;
        Ok(true)
    }

    /// Turn left. Gated like [`forward`](Self::forward).
    pub async fn turn_left(
        &self,
        angle: u8,
        duration: Option<Duration>,
    ) -> Result<bool, HardwareError> {
        if !self.monitor.is_safe_to_move().await {
            tracing::warn!("turn blocked: obstacle detected");
            return Ok(false);
        }
        self.controller.turn_left(angle, duration).await?;
        Ok(true)
    }

    /// Turn right. Gated like [`forward`](Self::forward).
    pub async fn turn_right(
        &self,
        angle: u8,
        duration: Option<Duration>,
    ) -> Result<bool, HardwareError> {
        if !self.monitor.is_safe_to_move().await {
            tracing::warn!("turn blocked: obstacle detected");
            return Ok(false);
        }
        self.controller.turn_right(angle, duration).await?;
        Ok(true)
    }

    /// Stop all movement. Always forwarded.
    pub async fn stop(&self) -> Result<bool, HardwareError> {
        self.controller.stop().await?;
        Ok(true)
    }

    pub async fn set_camera_pan(&self, angle: i8) -> Result<(), HardwareError> {
        self.controller.set_camera_pan(angle).await
    }

    pub async fn set_camera_tilt(&self, angle: i8) -> Result<(), HardwareError> {
        self.controller.set_camera_tilt(angle).await
    }

    /// Re-center the camera head.
    pub async fn look_forward(&self) -> Result<(), HardwareError> {
        self.controller.set_camera_pan(0).await?;
        self.controller.set_camera_tilt(0).await
    }

    /// Nodding gesture (yes). Carries no collision risk, never gated.
    pub async fn nod(&self, times: u8) -> Result<(), HardwareError> {
        for _ in 0..times {
            self.controller.set_camera_tilt(-20).await?;
            tokio::time::sleep(GESTURE_STEP).await;
            self.controller.set_camera_tilt(20).await?;
            tokio::time::sleep(GESTURE_STEP).await;
        }
        self.controller.set_camera_tilt(0).await
    }

    /// Head-shake gesture (no). Carries no collision risk, never gated.
    pub async fn shake_head(&self, times: u8) -> Result<(), HardwareError> {
        for _ in 0..times {
            self.controller.set_camera_pan(-30).await?;
            tokio::time::sleep(GESTURE_STEP).await;
            self.controller.set_camera_pan(30).await?;
            tokio::time::sleep(GESTURE_STEP).await;
        }
        self.controller.set_camera_pan(0).await
    }

    pub async fn safety_status(&self) -> SafetyStatus {
        self.monitor.status().await
    }

    /// Stops monitoring and returns the hardware to a safe idle posture.
    /// The hardware sequence runs even when the monitor fails to stop in
    /// time; that failure is surfaced afterwards.
    pub async fn cleanup(&self) -> Result<(), SafetyError> {
        let stop_result = self.monitor.stop().await;
        self.controller.stop().await?;
        self.look_forward().await?;
        stop_result
    }
}
