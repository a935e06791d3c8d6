use std::sync::{
    atomic::{AtomicBool, Ordering},
    mpsc::Sender,
    Arc,
};

use esp_idf_svc::mqtt::client::{EspMqttClient, EventPayload, MqttClientConfiguration, QoS};
use log::{error, info, warn};

use crate::configuration::main_configuration::DeviceSettings;
use crate::telemetry::{feed_payload, feed_topic, TelemetrySink};

pub const ADAFRUIT_IO_URL: &str = "mqtt://io.adafruit.com:1883";

/// Adafruit IO session: publishes to the moisture feed and forwards every
/// message of the relay feed to `commands`.
pub struct AdafruitIo<'a> {
    client: EspMqttClient<'a>,
    soil_topic: String,
    relay_topic: String,
    connected: Arc<AtomicBool>,
    needs_subscribe: Arc<AtomicBool>,
}

impl AdafruitIo<'static> {
    pub fn connect(settings: &DeviceSettings, commands: Sender<String>) -> anyhow::Result<Self> {
        info!("Connecting to Adafruit IO...");

        let soil_topic = feed_topic(&settings.aio_username, &settings.soil_feed);
        let relay_topic = feed_topic(&settings.aio_username, &settings.relay_feed);

        let connected = Arc::new(AtomicBool::new(false));
        let needs_subscribe = Arc::new(AtomicBool::new(false));

        let cb_connected = connected.clone();
        let cb_needs_subscribe = needs_subscribe.clone();
        let cb_relay_topic = relay_topic.clone();

        let client = EspMqttClient::new_cb(
            ADAFRUIT_IO_URL,
            &MqttClientConfiguration {
                client_id: Some(&settings.name),
                username: Some(&settings.aio_username),
                password: Some(&settings.aio_key),
                ..Default::default()
            },
            move |event| match event.payload() {
                EventPayload::Connected(_) => {
                    info!("Connected to Adafruit IO");
                    cb_connected.store(true, Ordering::Relaxed);
                    cb_needs_subscribe.store(true, Ordering::Relaxed);
                }
                EventPayload::Disconnected => {
                    warn!("Disconnected from Adafruit IO");
                    cb_connected.store(false, Ordering::Relaxed);
                }
                EventPayload::Received { topic, data, .. } => {
                    if topic == Some(cb_relay_topic.as_str()) {
                        let command = String::from_utf8_lossy(data).into_owned();
                        if commands.send(command).is_err() {
                            error!("Relay command receiver dropped");
                        }
                    }
                }
                EventPayload::Error(e) => error!("MQTT error: {:?}", e),
                _ => {}
            },
        )?;

        Ok(Self {
            client,
            soil_topic,
            relay_topic,
            connected,
            needs_subscribe,
        })
    }
}

impl<'a> AdafruitIo<'a> {
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    /// Subscribes to the relay feed after every (re)connection.
    pub fn run(&mut self) -> anyhow::Result<()> {
        if self.is_connected() && self.needs_subscribe.swap(false, Ordering::Relaxed) {
            if let Err(e) = self.client.subscribe(&self.relay_topic, QoS::AtLeastOnce) {
                self.needs_subscribe.store(true, Ordering::Relaxed);
                return Err(e.into());
            }
            info!("Subscribed to {}", self.relay_topic);
        }

        Ok(())
    }
}

impl<'a> TelemetrySink for AdafruitIo<'a> {
    fn publish(&mut self, percentage: u8) -> anyhow::Result<()> {
        info!("Sending message: {}", percentage);

        self.client.publish(
            &self.soil_topic,
            QoS::AtLeastOnce,
            false,
            feed_payload(percentage).as_bytes(),
        )?;

        Ok(())
    }
}
