use log::info;
use serde_json::{json, Value};

use crate::monitor::CycleOutcome;

pub trait TelemetrySink {
    fn publish(&mut self, percentage: u8) -> anyhow::Result<()>;
}

/// Publishing without an open session fails.
impl<T: TelemetrySink> TelemetrySink for Option<T> {
    fn publish(&mut self, percentage: u8) -> anyhow::Result<()> {
        match self {
            Some(sink) => sink.publish(percentage),
            None => anyhow::bail!("telemetry not connected"),
        }
    }
}

/// Adafruit IO MQTT topic of a feed.
pub fn feed_topic(username: &str, feed: &str) -> String {
    format!("{}/feeds/{}", username, feed)
}

pub fn feed_payload(percentage: u8) -> String {
    percentage.to_string()
}

pub fn cycle_report(device_name: &str, outcome: &CycleOutcome) -> Value {
    match outcome {
        CycleOutcome::Published(reading) => json!({
            "name": device_name,
            "raw": reading.raw,
            "level": reading.percentage,
            "status": "published"
        }),
        CycleOutcome::Skipped { raw, rejection } => json!({
            "name": device_name,
            "raw": raw,
            "status": "skipped",
            "reason": rejection.to_string()
        }),
    }
}

/// Sink that only writes to the log, for runs without a network.
#[derive(Debug)]
pub struct LogTelemetry {
    topic: String,
}

impl LogTelemetry {
    pub fn new(topic: String) -> Self {
        Self { topic }
    }
}

impl TelemetrySink for LogTelemetry {
    fn publish(&mut self, percentage: u8) -> anyhow::Result<()> {
        info!("Sending message: {} -> {}", feed_payload(percentage), self.topic);
        Ok(())
    }
}
