// src/main.rs - Interactive safety supervisor over simulated rover hardware
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use rover_guard::command::{CommandExecutor, parse_movement_command};
use rover_guard::config;
use rover_guard::hardware::{MotionController, SimDistanceSensor, SimMotionController};
use rover_guard::safety::{SafeMotionController, SafetyMonitor};

#[derive(Parser, Debug)]
#[command(
    name = "rover-guard",
    about = "Collision-avoidance safety supervisor for a small rover"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "rover.toml")]
    config: String,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    tracing::info!("Starting rover-guard safety supervisor");
    tracing::info!("Loading configuration from: {}", cli.config);

    let config = config::load_or_default(&cli.config).map_err(|e| {
        tracing::error!("Failed to load config from '{}': {}", cli.config, e);
        e
    })?;

    if !config.simulation {
        tracing::warn!("hardware backend not available in this build; using simulated devices");
    }
    tracing::info!(
        min_distance_cm = config.safety.min_distance_cm,
        emergency_distance_cm = config.safety.emergency_distance_cm,
        sample_interval_ms = config.safety.sample_interval_ms,
        "safety thresholds loaded"
    );

    // Simulated chassis: readings wander across safe, warning, and emergency
    // ranges so the supervisor has something to react to.
    let controller = Arc::new(SimMotionController::new());
    let sensor = Arc::new(SimDistanceSensor::random(10, 100));

    let monitor = Arc::new(SafetyMonitor::new(
        config.safety.thresholds()?,
        config.safety.sample_interval(),
        controller.clone() as Arc<dyn MotionController>,
        sensor,
    )?);
    monitor.start().await;

    let facade = Arc::new(SafeMotionController::new(
        controller.clone() as Arc<dyn MotionController>,
        monitor.clone(),
    ));
    let executor = CommandExecutor::new(facade.clone(), config.drive.clone());

    println!(
        "Commands: forward | backward | turn left | turn right | stop | nod your head | shake your head"
    );
    println!("          status | reset | quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        match line {
            "" => continue,
            "quit" | "exit" => break,
            "status" => {
                let status = facade.safety_status().await;
                println!(
                    "monitoring={} distance={}cm safe={} emergency_stop={}",
                    status.monitoring,
                    status.last_distance_cm,
                    status.safe,
                    status.emergency_stop_triggered
                );
            }
            "reset" => {
                monitor.reset().await;
                println!("emergency stop cleared");
            }
            _ => match parse_movement_command(line) {
                Some(command) => {
                    if !executor.execute(command).await? {
                        println!("blocked: obstacle detected");
                    }
                }
                None => println!("unrecognized command: {line}"),
            },
        }
    }

    facade.cleanup().await?;
    tracing::info!("rover-guard shut down");
    Ok(())
}
