// src/safety/monitor.rs - Background distance sampling and the safety verdict

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock, broadcast};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::{
    DEFAULT_SAFE_DISTANCE_CM, ReadingOutcome, SafetyError, SafetyState, SafetyStatus,
    SafetyThresholds,
};
use crate::hardware::{DistanceSensor, MotionController};

/// Bound on how long `stop` waits for the sampling task to exit.
const STOP_TIMEOUT: Duration = Duration::from_secs(1);

/// Polls the distance sensor on a fixed cadence and maintains the safety
/// verdict consulted by [`SafeMotionController`](super::SafeMotionController).
///
/// When a reading crosses into the emergency zone the monitor stops the
/// chassis itself, directly on the controller, so the stop lands even when no
/// facade call is in flight.
pub struct SafetyMonitor {
    thresholds: SafetyThresholds,
    sample_interval: Duration,
    controller: Arc<dyn MotionController>,
    sensor: Arc<dyn DistanceSensor>,
    state: Arc<RwLock<SafetyState>>,
    shutdown_tx: broadcast::Sender<()>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl SafetyMonitor {
    pub fn new(
        thresholds: SafetyThresholds,
        sample_interval: Duration,
        controller: Arc<dyn MotionController>,
        sensor: Arc<dyn DistanceSensor>,
    ) -> Result<Self, SafetyError> {
        if sample_interval.is_zero() {
            return Err(SafetyError::InvalidSampleInterval);
        }
        let (shutdown_tx, _) = broadcast::channel(1);
        Ok(Self {
            thresholds,
            sample_interval,
            controller,
            sensor,
            state: Arc::new(RwLock::new(SafetyState::default())),
            shutdown_tx,
            task: Mutex::new(None),
        })
    }

    pub fn thresholds(&self) -> SafetyThresholds {
        self.thresholds
    }

    /// Spawns the sampling task and re-arms movement. Idempotent: while a
    /// sampling task exists (including one still winding down after a
    /// timed-out stop) this is a no-op, so concurrent starts spawn exactly
    /// one task.
    pub async fn start(&self) {
        let mut task = self.task.lock().await;
        match task.take() {
            Some(handle) if !handle.is_finished() => {
                *task = Some(handle);
                return;
            }
            _ => {}
        }
        {
            let mut state = self.state.write().await;
            state.monitoring = true;
            state.emergency_stop_triggered = false;
        }
        let shutdown_rx = self.shutdown_tx.subscribe();
        *task = Some(tokio::spawn(sampling_loop(
            self.thresholds,
            self.sample_interval,
            self.controller.clone(),
            self.sensor.clone(),
            self.state.clone(),
            shutdown_rx,
        )));
        tracing::info!(
            interval_ms = self.sample_interval.as_millis() as u64,
            min_distance_cm = self.thresholds.min_distance_cm(),
            emergency_distance_cm = self.thresholds.emergency_distance_cm(),
            "safety monitoring started"
        );
    }

    /// Signals the sampling task and waits for it to exit, bounded by
    /// [`STOP_TIMEOUT`]. On timeout the shutdown signal stays delivered and
    /// the join handle is retained, so the task still exits on its next
    /// iteration and a later `stop` can reap it.
    pub async fn stop(&self) -> Result<(), SafetyError> {
        let mut task = self.task.lock().await;
        let _ = self.shutdown_tx.send(());
        if let Some(mut handle) = task.take() {
            match tokio::time::timeout(STOP_TIMEOUT, &mut handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    self.state.write().await.monitoring = false;
                    return Err(SafetyError::TaskFailed(e.to_string()));
                }
                Err(_) => {
                    *task = Some(handle);
                    self.state.write().await.monitoring = false;
                    return Err(SafetyError::StopTimeout(STOP_TIMEOUT));
                }
            }
        }
        self.state.write().await.monitoring = false;
        tracing::info!("safety monitoring stopped");
        Ok(())
    }

    /// One sensor read, folded to the neutral sample on failure. Does not
    /// touch the safety state.
    pub async fn sample_once(&self) -> u16 {
        read_or_default(self.sensor.as_ref()).await
    }

    /// Whether forward or turning movement may proceed right now: no armed
    /// emergency stop, and the last reading clear of the warning zone.
    pub async fn is_safe_to_move(&self) -> bool {
        self.state.read().await.safe_to_move(&self.thresholds)
    }

    /// Clears the emergency stop and the warning latch. Always safe to call;
    /// does not resume monitoring, and the verdict re-evaluates on the next
    /// tick.
    pub async fn reset(&self) {
        let mut state = self.state.write().await;
        state.emergency_stop_triggered = false;
        state.collision_latched = false;
        tracing::info!("emergency stop reset");
    }

    pub async fn status(&self) -> SafetyStatus {
        let state = self.state.read().await;
        SafetyStatus {
            monitoring: state.monitoring,
            last_distance_cm: state.last_distance_cm,
            safe: state.safe_to_move(&self.thresholds),
            emergency_stop_triggered: state.emergency_stop_triggered,
        }
    }
}

async fn sampling_loop(
    thresholds: SafetyThresholds,
    sample_interval: Duration,
    controller: Arc<dyn MotionController>,
    sensor: Arc<dyn DistanceSensor>,
    state: Arc<RwLock<SafetyState>>,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    let mut interval = tokio::time::interval(sample_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => {
                tracing::debug!("sampling loop shutting down");
                break;
            }
            _ = interval.tick() => {
                let distance = read_or_default(sensor.as_ref()).await;
                let outcome = state.write().await.apply_reading(distance, &thresholds);
                match outcome {
                    ReadingOutcome::EmergencyStop => {
                        tracing::warn!(distance_cm = distance, "EMERGENCY STOP: obstacle inside emergency range");
                        if let Err(e) = controller.stop().await {
                            tracing::error!("emergency stop command failed: {}", e);
                        }
                    }
                    ReadingOutcome::Warning => {
                        tracing::warn!(distance_cm = distance, "obstacle inside minimum distance, movement blocked");
                    }
                    ReadingOutcome::Unchanged => {}
                }
            }
        }
    }
    state.write().await.monitoring = false;
}

async fn read_or_default(sensor: &dyn DistanceSensor) -> u16 {
    match sensor.read_distance().await {
        // No echo; treat like a failed read.
        Ok(0) => DEFAULT_SAFE_DISTANCE_CM,
        Ok(cm) => cm,
        Err(e) => {
            tracing::warn!("distance sensor read failed: {}; assuming clear", e);
            DEFAULT_SAFE_DISTANCE_CM
        }
    }
}
