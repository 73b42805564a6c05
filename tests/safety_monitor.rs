// Integration tests for the safety monitor's sampling loop and lifecycle

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use rover_guard::hardware::{
        DistanceSensor, MotionController, SimDistanceSensor, SimMotionController,
    };
    use rover_guard::safety::{SafetyError, SafetyMonitor, SafetyThresholds};

    fn build_monitor(sensor: &SimDistanceSensor) -> (Arc<SafetyMonitor>, SimMotionController) {
        let controller = SimMotionController::new();
        let monitor = SafetyMonitor::new(
            SafetyThresholds::new(20, 10).unwrap(),
            Duration::from_millis(100),
            Arc::new(controller.clone()) as Arc<dyn MotionController>,
            Arc::new(sensor.clone()) as Arc<dyn DistanceSensor>,
        )
        .unwrap();
        (Arc::new(monitor), controller)
    }

    #[tokio::test(start_paused = true)]
    async fn scenario_warning_emergency_sticky_reset() {
        // Ticks land at 0ms/100ms/...: readings 50, 15, 8, 8, 30.
        let sensor = SimDistanceSensor::scripted([50, 15, 8, 8, 30]);
        let (monitor, controller) = build_monitor(&sensor);
        monitor.start().await;

        tokio::time::sleep(Duration::from_millis(50)).await;
        let status = monitor.status().await;
        assert_eq!(status.last_distance_cm, 50);
        assert!(status.safe);
        assert!(monitor.is_safe_to_move().await);

        // Warning zone: blocked, but no stop issued.
        tokio::time::sleep(Duration::from_millis(100)).await;
        let status = monitor.status().await;
        assert_eq!(status.last_distance_cm, 15);
        assert!(!status.safe);
        assert!(!status.emergency_stop_triggered);
        assert_eq!(controller.stop_count(), 0);

        // Emergency crossing fires exactly one stop.
        tokio::time::sleep(Duration::from_millis(100)).await;
        let status = monitor.status().await;
        assert_eq!(status.last_distance_cm, 8);
        assert!(status.emergency_stop_triggered);
        assert_eq!(controller.stop_count(), 1);

        // Staying below the threshold does not re-issue the stop.
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(controller.stop_count(), 1);

        // Distance recovery: still unsafe until an explicit reset.
        tokio::time::sleep(Duration::from_millis(100)).await;
        let status = monitor.status().await;
        assert_eq!(status.last_distance_cm, 30);
        assert!(status.emergency_stop_triggered);
        assert!(!monitor.is_safe_to_move().await);
        assert_eq!(controller.stop_count(), 1);

        // Reset clears the latch; the next clear reading reads safe again.
        monitor.reset().await;
        sensor.push_reading(50);
        tokio::time::sleep(Duration::from_millis(100)).await;
        let status = monitor.status().await;
        assert_eq!(status.last_distance_cm, 50);
        assert!(status.safe);
        assert!(monitor.is_safe_to_move().await);
        assert_eq!(controller.stop_count(), 1);

        monitor.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn failing_sensor_reads_neutral_and_never_stops() {
        let sensor = SimDistanceSensor::failing();
        let (monitor, controller) = build_monitor(&sensor);
        monitor.start().await;

        tokio::time::sleep(Duration::from_millis(550)).await;
        let status = monitor.status().await;
        assert_eq!(status.last_distance_cm, 100);
        assert!(status.safe);
        assert!(monitor.is_safe_to_move().await);
        assert!(!status.emergency_stop_triggered);
        assert_eq!(controller.stop_count(), 0);

        monitor.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn zero_reading_maps_to_neutral_sample() {
        let sensor = SimDistanceSensor::fixed(42);
        let (monitor, _controller) = build_monitor(&sensor);
        assert_eq!(monitor.sample_once().await, 42);

        let (monitor, _controller) = build_monitor(&SimDistanceSensor::fixed(0));
        assert_eq!(monitor.sample_once().await, 100);

        let (monitor, _controller) = build_monitor(&SimDistanceSensor::failing());
        assert_eq!(monitor.sample_once().await, 100);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_joins_task_and_restart_rearms() {
        let sensor = SimDistanceSensor::scripted([5]);
        let (monitor, controller) = build_monitor(&sensor);
        monitor.start().await;

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(monitor.status().await.emergency_stop_triggered);
        assert_eq!(controller.stop_count(), 1);

        monitor.stop().await.unwrap();
        assert!(!monitor.status().await.monitoring);

        // A fresh start clears the emergency latch and resumes sampling.
        sensor.push_reading(50);
        monitor.start().await;
        let status = monitor.status().await;
        assert!(status.monitoring);
        assert!(!status.emergency_stop_triggered);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(monitor.status().await.last_distance_cm, 50);
        monitor.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn double_start_runs_a_single_sampling_loop() {
        // One loop consumes one scripted reading per tick; a duplicate loop
        // would drain the queue twice as fast.
        let sensor = SimDistanceSensor::scripted([50, 15, 8]);
        let (monitor, _controller) = build_monitor(&sensor);
        monitor.start().await;
        monitor.start().await;

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(monitor.status().await.last_distance_cm, 50);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(monitor.status().await.last_distance_cm, 15);

        monitor.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn stop_is_idempotent_and_safe_before_start() {
        let sensor = SimDistanceSensor::fixed(50);
        let (monitor, _controller) = build_monitor(&sensor);

        // Never started: both calls return promptly.
        monitor.stop().await.unwrap();
        monitor.stop().await.unwrap();

        monitor.start().await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        monitor.stop().await.unwrap();
        monitor.stop().await.unwrap();
        assert!(!monitor.status().await.monitoring);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_before_start_is_a_noop() {
        let sensor = SimDistanceSensor::fixed(50);
        let (monitor, _controller) = build_monitor(&sensor);
        monitor.reset().await;
        let status = monitor.status().await;
        assert!(!status.monitoring);
        assert_eq!(status.last_distance_cm, 100);
        assert!(!status.emergency_stop_triggered);
    }

    #[test]
    fn monitor_rejects_zero_sample_interval() {
        let controller = SimMotionController::new();
        let sensor = SimDistanceSensor::fixed(50);
        let result = SafetyMonitor::new(
            SafetyThresholds::new(20, 10).unwrap(),
            Duration::ZERO,
            Arc::new(controller) as Arc<dyn MotionController>,
            Arc::new(sensor) as Arc<dyn DistanceSensor>,
        );
        assert!(matches!(result, Err(SafetyError::InvalidSampleInterval)));
    }
}
