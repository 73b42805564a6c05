// src/hardware/sim.rs - Simulated rover hardware for tests and bench runs

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use super::{DistanceSensor, HardwareError, MotionController};

/// A drive or camera command observed by the simulated controller, in the
/// order it was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionEvent {
    Forward { speed: u8 },
    Backward { speed: u8 },
    TurnLeft { angle: u8 },
    TurnRight { angle: u8 },
    Stop,
    CameraPan { angle: i8 },
    CameraTilt { angle: i8 },
}

/// Motion controller that records every command instead of driving motors.
///
/// Clones share the same event log, so a test can keep a handle for
/// inspection while the supervisor owns another.
#[derive(Debug, Clone, Default)]
pub struct SimMotionController {
    events: Arc<Mutex<Vec<MotionEvent>>>,
}

impl SimMotionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every command issued so far.
    pub fn events(&self) -> Vec<MotionEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn stop_count(&self) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| matches!(e, MotionEvent::Stop))
            .count()
    }

    pub fn clear_events(&self) {
        self.events.lock().unwrap().clear();
    }

    fn record(&self, event: MotionEvent) {
        self.events.lock().unwrap().push(event);
    }

    async fn hold_then_stop(&self, duration: Option<Duration>) -> Result<(), HardwareError> {
        if let Some(duration) = duration {
            tokio::time::sleep(duration).await;
            self.record(MotionEvent::Stop);
            tracing::debug!("sim: stopped after timed move");
        }
        Ok(())
    }
}

#[async_trait]
impl MotionController for SimMotionController {
    async fn forward(&self, speed: u8, duration: Option<Duration>) -> Result<(), HardwareError> {
        self.record(MotionEvent::Forward { speed });
        tracing::debug!(speed, "sim: driving forward");
        self.hold_then_stop(duration).await
    }

    async fn backward(&self, speed: u8, duration: Option<Duration>) -> Result<(), HardwareError> {
        self.record(MotionEvent::Backward { speed });
        tracing::debug!(speed, "sim: driving backward");
        self.hold_then_stop(duration).await
    }

    async fn turn_left(&self, angle: u8, duration: Option<Duration>) -> Result<(), HardwareError> {
        self.record(MotionEvent::TurnLeft { angle });
        tracing::debug!(angle, "sim: turning left");
        self.hold_then_stop(duration).await
    }

    async fn turn_right(&self, angle: u8, duration: Option<Duration>) -> Result<(), HardwareError> {
        self.record(MotionEvent::TurnRight { angle });
        tracing::debug!(angle, "sim: turning right");
        self.hold_then_stop(duration).await
    }

    async fn stop(&self) -> Result<(), HardwareError> {
        self.record(MotionEvent::Stop);
        tracing::debug!("sim: stopped");
        Ok(())
    }

    async fn set_camera_pan(&self, angle: i8) -> Result<(), HardwareError> {
        self.record(MotionEvent::CameraPan { angle });
        tracing::debug!(angle, "sim: camera pan");
        Ok(())
    }

    async fn set_camera_tilt(&self, angle: i8) -> Result<(), HardwareError> {
        self.record(MotionEvent::CameraTilt { angle });
        tracing::debug!(angle, "sim: camera tilt");
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
enum SimReading {
    Distance(u16),
    Fault,
    Random { min_cm: u16, max_cm: u16 },
}

/// Ultrasonic sensor stand-in.
///
/// Readings queued with [`push_reading`](Self::push_reading) (or seeded via
/// [`scripted`](Self::scripted)) are returned one per call; once the queue is
/// drained the sensor keeps reporting its idle behavior, which for scripted
/// sensors is the last dequeued distance (a static obstacle).
#[derive(Debug, Clone)]
pub struct SimDistanceSensor {
    inner: Arc<Mutex<SensorInner>>,
}

#[derive(Debug)]
struct SensorInner {
    queue: VecDeque<SimReading>,
    idle: SimReading,
}

impl SimDistanceSensor {
    /// Always reports `distance_cm`.
    pub fn fixed(distance_cm: u16) -> Self {
        Self::with_idle(SimReading::Distance(distance_cm))
    }

    /// Uniform random readings in `min_cm..=max_cm` per call.
    pub fn random(min_cm: u16, max_cm: u16) -> Self {
        Self::with_idle(SimReading::Random { min_cm, max_cm })
    }

    /// Every read fails.
    pub fn failing() -> Self {
        Self::with_idle(SimReading::Fault)
    }

    /// Returns `readings` in order, then holds the last one.
    pub fn scripted(readings: impl IntoIterator<Item = u16>) -> Self {
        let sensor = Self::fixed(100);
        {
            let mut inner = sensor.inner.lock().unwrap();
            inner.queue = readings.into_iter().map(SimReading::Distance).collect();
        }
        sensor
    }

    fn with_idle(idle: SimReading) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SensorInner {
                queue: VecDeque::new(),
                idle,
            })),
        }
    }

    /// Queue one distance reading.
    pub fn push_reading(&self, distance_cm: u16) {
        self.inner
            .lock()
            .unwrap()
            .queue
            .push_back(SimReading::Distance(distance_cm));
    }

    /// Queue one failed read.
    pub fn push_failure(&self) {
        self.inner.lock().unwrap().queue.push_back(SimReading::Fault);
    }
}

#[async_trait]
impl DistanceSensor for SimDistanceSensor {
    async fn read_distance(&self) -> Result<u16, HardwareError> {
        let reading = {
            let mut inner = self.inner.lock().unwrap();
            match inner.queue.pop_front() {
                Some(reading) => {
                    if let SimReading::Distance(_) = reading {
                        inner.idle = reading;
                    }
                    reading
                }
                None => inner.idle,
            }
        };
        match reading {
            SimReading::Distance(cm) => Ok(cm),
            SimReading::Fault => Err(HardwareError::Sensor(
                "simulated ultrasonic fault".to_string(),
            )),
            SimReading::Random { min_cm, max_cm } => {
                Ok(rand::rng().random_range(min_cm..=max_cm))
            }
        }
    }
}
