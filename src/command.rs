// src/command.rs - Text movement commands and their dispatch

use std::sync::Arc;

use crate::config::DriveConfig;
use crate::hardware::HardwareError;
use crate::safety::SafeMotionController;

/// Gesture repetitions produced by the parser.
const GESTURE_TIMES: u8 = 2;

/// A movement intent recognized in free text. Speeds, steering angles, and
/// durations come from [`DriveConfig`] at dispatch time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementCommand {
    Forward,
    Backward,
    TurnLeft,
    TurnRight,
    Stop,
    Nod { times: u8 },
    ShakeHead { times: u8 },
}

/// Scans text for a movement command, first match wins.
///
/// Matching is keyword containment over the lowercased input, so natural
/// phrasings like "please move forward" or "turn left now" resolve; text with
/// no movement keyword returns `None`.
pub fn parse_movement_command(text: &str) -> Option<MovementCommand> {
    let text = text.to_lowercase();
    let has = |words: &[&str]| words.iter().any(|w| text.contains(w));

    if has(&["forward", "ahead"]) {
        return Some(MovementCommand::Forward);
    }
    if has(&["backward", "back"]) {
        return Some(MovementCommand::Backward);
    }
    if has(&["turn left", "go left", "left"]) {
        return Some(MovementCommand::TurnLeft);
    }
    if has(&["turn right", "go right", "right"]) {
        return Some(MovementCommand::TurnRight);
    }
    if has(&["stop", "halt", "wait"]) {
        return Some(MovementCommand::Stop);
    }
    if text.contains("head") {
        if has(&["nod", "yes"]) {
            return Some(MovementCommand::Nod {
                times: GESTURE_TIMES,
            });
        }
        if has(&["shake", "no"]) {
            return Some(MovementCommand::ShakeHead {
                times: GESTURE_TIMES,
            });
        }
    }
    None
}

/// Dispatches parsed commands through the gated controller, filling in the
/// configured default speed, steering angle, and durations.
pub struct CommandExecutor {
    facade: Arc<SafeMotionController>,
    drive: DriveConfig,
}

impl CommandExecutor {
    pub fn new(facade: Arc<SafeMotionController>, drive: DriveConfig) -> Self {
        Self { facade, drive }
    }

    /// Runs one command. Returns whether the motion was permitted; gestures
    /// and stop always are.
    pub async fn execute(&self, command: MovementCommand) -> Result<bool, HardwareError> {
        tracing::debug!(?command, "executing movement command");
        match command {
            MovementCommand::Forward => {
                self.facade
                    .forward(
                        self.drive.default_speed,
                        Some(self.drive.forward_duration()),
                    )
                    .await
            }
            MovementCommand::Backward => {
                self.facade
                    .backward(
                        self.drive.default_speed,
                        Some(self.drive.forward_duration()),
                    )
                    .await
            }
            MovementCommand::TurnLeft => {
                self.facade
                    .turn_left(self.drive.default_turn_angle, Some(self.drive.turn_duration()))
                    .await
            }
            MovementCommand::TurnRight => {
                self.facade
                    .turn_right(self.drive.default_turn_angle, Some(self.drive.turn_duration()))
                    .await
            }
            MovementCommand::Stop => self.facade.stop().await,
            MovementCommand::Nod { times } => {
                self.facade.nod(times).await?;
                Ok(true)
            }
            MovementCommand::ShakeHead { times } => {
                self.facade.shake_head(times).await?;
                Ok(true)
            }
        }
    }
}
