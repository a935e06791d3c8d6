use std::collections::VecDeque;

use anyhow::anyhow;

use super::sensor::RawSampleSource;

/// Replays a fixed list of raw samples, used by the host build and tests.
#[derive(Debug, Default)]
pub struct ScriptedSensor {
    samples: VecDeque<i32>,
}

impl ScriptedSensor {
    pub fn new(samples: impl IntoIterator<Item = i32>) -> Self {
        Self {
            samples: samples.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.samples.len()
    }
}

impl RawSampleSource for ScriptedSensor {
    fn read_raw_sample(&mut self) -> anyhow::Result<i32> {
        self.samples
            .pop_front()
            .ok_or_else(|| anyhow!("no more scripted samples"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replays_in_order_then_fails() {
        let mut sensor = ScriptedSensor::new([12, 4095]);

        assert_eq!(sensor.read_raw_sample().unwrap(), 12);
        assert_eq!(sensor.remaining(), 1);
        assert_eq!(sensor.read_raw_sample().unwrap(), 4095);
        assert!(sensor.read_raw_sample().is_err());
    }
}
