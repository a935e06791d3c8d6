use log::{info, warn};

use crate::sensors::reading::{check_reading, to_percentage, Reading, Rejection};
use crate::sensors::sensor::RawSampleSource;
use crate::telemetry::TelemetrySink;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Published(Reading),
    Skipped { raw: i32, rejection: Rejection },
}

/// Sampling state: the last raw value that passed validation.
#[derive(Debug, Default)]
pub struct MoistureMonitor {
    last_accepted: Option<i32>,
}

impl MoistureMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_accepted(&self) -> Option<i32> {
        self.last_accepted
    }

    pub fn process(&mut self, raw: i32) -> Result<Reading, Rejection> {
        check_reading(raw, self.last_accepted)?;
        self.last_accepted = Some(raw);

        Ok(Reading {
            raw,
            percentage: to_percentage(raw),
        })
    }

    pub fn run_cycle<S: RawSampleSource, T: TelemetrySink>(
        &mut self,
        source: &mut S,
        sink: &mut T,
    ) -> anyhow::Result<CycleOutcome> {
        let raw = source.read_raw_sample()?;

        match self.process(raw) {
            Ok(reading) => {
                info!("Moisture level: {}% (raw value: {})", reading.percentage, raw);
                sink.publish(reading.percentage)?;
                Ok(CycleOutcome::Published(reading))
            }
            Err(rejection) => {
                warn!("Skipping reading: {}", rejection);
                Ok(CycleOutcome::Skipped { raw, rejection })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::scripted_sensor::ScriptedSensor;

    #[derive(Default)]
    struct RecordingSink {
        sent: Vec<u8>,
        fail: bool,
    }

    impl TelemetrySink for RecordingSink {
        fn publish(&mut self, percentage: u8) -> anyhow::Result<()> {
            if self.fail {
                anyhow::bail!("broker unreachable");
            }
            self.sent.push(percentage);
            Ok(())
        }
    }

    #[test]
    fn test_starts_without_history() {
        assert_eq!(MoistureMonitor::new().last_accepted(), None);
    }

    #[test]
    fn test_rejection_keeps_last_accepted() {
        let mut monitor = MoistureMonitor::new();

        assert!(monitor.process(4095).is_err());
        assert_eq!(monitor.last_accepted(), None);

        monitor.process(3000).unwrap();
        assert!(monitor.process(4095).is_err());
        assert_eq!(monitor.last_accepted(), Some(3000));
    }

    #[test]
    fn test_accepted_rail_reading_becomes_history() {
        let mut monitor = MoistureMonitor::new();

        monitor.process(3800).unwrap();
        let reading = monitor.process(4095).unwrap();
        assert_eq!(reading.percentage, 0);
        assert_eq!(monitor.last_accepted(), Some(4095));

        // Suspicious again, but close to the rail reading just accepted.
        assert!(monitor.process(4080).is_ok());
    }

    #[test]
    fn test_extreme_raw_value_does_not_become_history() {
        let mut monitor = MoistureMonitor::new();

        monitor.process(3695).unwrap();
        monitor.process(4095).unwrap();

        assert!(matches!(
            monitor.process(i32::MIN),
            Err(Rejection::OutlierJump { .. })
        ));
        assert!(monitor.process(i32::MAX).is_err());
        assert_eq!(monitor.last_accepted(), Some(4095));
    }

    #[test]
    fn test_cycles_publish_only_accepted() {
        let mut monitor = MoistureMonitor::new();
        let mut sensor = ScriptedSensor::new([0, 2048, 4095, 4060]);
        let mut sink = RecordingSink::default();

        let first = monitor.run_cycle(&mut sensor, &mut sink).unwrap();
        assert_eq!(
            first,
            CycleOutcome::Skipped {
                raw: 0,
                rejection: Rejection::DisconnectedNoHistory { raw: 0 }
            }
        );

        let second = monitor.run_cycle(&mut sensor, &mut sink).unwrap();
        assert_eq!(
            second,
            CycleOutcome::Published(Reading {
                raw: 2048,
                percentage: 49
            })
        );

        let third = monitor.run_cycle(&mut sensor, &mut sink).unwrap();
        assert!(matches!(
            third,
            CycleOutcome::Skipped {
                rejection: Rejection::OutlierJump { .. },
                ..
            }
        ));

        monitor.run_cycle(&mut sensor, &mut sink).unwrap();

        assert_eq!(sink.sent, vec![49, 0]);
        assert_eq!(monitor.last_accepted(), Some(4060));
    }

    #[test]
    fn test_failed_publish_still_records_reading() {
        let mut monitor = MoistureMonitor::new();
        let mut sensor = ScriptedSensor::new([1500]);
        let mut sink = RecordingSink {
            fail: true,
            ..Default::default()
        };

        assert!(monitor.run_cycle(&mut sensor, &mut sink).is_err());
        assert_eq!(monitor.last_accepted(), Some(1500));
    }

    #[test]
    fn test_source_error_propagates() {
        let mut monitor = MoistureMonitor::new();
        let mut sensor = ScriptedSensor::new([]);
        let mut sink = RecordingSink::default();

        assert!(monitor.run_cycle(&mut sensor, &mut sink).is_err());
        assert!(sink.sent.is_empty());
    }
}
