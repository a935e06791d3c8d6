#[cfg(target_os = "espidf")]
mod firmware {
    use std::sync::mpsc;
    use std::time::{Duration, Instant};

    use esp_idf_svc::hal::delay::FreeRtos;
    use esp_idf_svc::hal::peripherals::Peripherals;
    use log::{debug, error, info, warn};

    use soil_moisture_relay::board::Board;
    use soil_moisture_relay::cloud::AdafruitIo;
    use soil_moisture_relay::configuration::main_configuration::DeviceSettings;
    use soil_moisture_relay::configuration::nvs_configuration::NvsConfiguration;
    use soil_moisture_relay::link::LinkSupervisor;
    use soil_moisture_relay::monitor::MoistureMonitor;
    use soil_moisture_relay::schedule::{Ticker, RECONNECT_INTERVAL};
    use soil_moisture_relay::{portal, relay, telemetry, wifi_helper};

    const LOOP_DELAY_MS: u32 = 100;

    pub fn main() -> anyhow::Result<()> {
        esp_idf_svc::sys::link_patches();
        esp_idf_svc::log::EspLogger::initialize_default();

        let peripherals = Peripherals::take()?;
        let config = NvsConfiguration::new()?;
        let settings = DeviceSettings::load(&config);

        let mut board = Board::new(peripherals.adc1, peripherals.pins)?;

        FreeRtos::delay_ms(1000);

        if board.settings_requested() || !settings.is_provisioned() {
            info!("Starting settings portal");
            return portal::run(config, peripherals.modem);
        }
        drop(config);

        // WiFi down at boot is not fatal, the relay feed and the
        // sampling loop come back as soon as the link does.
        let mut wifi = wifi_helper::create_station(&settings, peripherals.modem)?;
        if let Err(e) = wifi_helper::connect_wifi(&mut wifi) {
            error!("WiFi unavailable at boot, retrying in the background: {e}");
        }

        let (command_tx, command_rx) = mpsc::channel();
        let mut cloud: Option<AdafruitIo> = None;

        let mut monitor = MoistureMonitor::new();
        let now = Instant::now();
        let mut sample_ticker = Ticker::new(Duration::from_millis(settings.sample_interval_ms), now);
        let mut wifi_supervisor = LinkSupervisor::new(RECONNECT_INTERVAL, now);
        let mut cloud_ticker = Ticker::new(RECONNECT_INTERVAL, now);

        loop {
            let now = Instant::now();

            let wifi_up = wifi_supervisor.maintain(&mut wifi, now);

            if wifi_up && cloud.is_none() && cloud_ticker.is_due(now) {
                match AdafruitIo::connect(&settings, command_tx.clone()) {
                    Ok(session) => cloud = Some(session),
                    Err(e) => error!("Adafruit IO connection failed: {e}"),
                }
            }

            if let Some(session) = cloud.as_mut() {
                if let Err(e) = session.run() {
                    warn!("Relay feed subscription failed: {e}");
                }
            }

            for cmd in command_rx.try_iter() {
                if let Err(e) = relay::on_command(&mut board.relay, &cmd) {
                    warn!("Ignoring command: {e}");
                }
            }

            if sample_ticker.is_due(now) {
                match monitor.run_cycle(&mut board.moisture_sensor, &mut cloud) {
                    Ok(outcome) => debug!("{}", telemetry::cycle_report(&settings.name, &outcome)),
                    Err(e) => error!("Sampling cycle failed: {e}"),
                }
            }

            FreeRtos::delay_ms(LOOP_DELAY_MS);
        }
    }
}

#[cfg(target_os = "espidf")]
fn main() -> anyhow::Result<()> {
    firmware::main()
}

/// Host build: replays raw samples given on the command line through the
/// same sampling pipeline, publishing to the log.
#[cfg(not(target_os = "espidf"))]
fn main() -> anyhow::Result<()> {
    use log::info;
    use soil_moisture_relay::configuration::config_store::MemoryConfiguration;
    use soil_moisture_relay::configuration::main_configuration::DeviceSettings;
    use soil_moisture_relay::monitor::MoistureMonitor;
    use soil_moisture_relay::sensors::scripted_sensor::ScriptedSensor;
    use soil_moisture_relay::telemetry::{cycle_report, feed_topic, LogTelemetry};

    const DEMO_SAMPLES: [i32; 6] = [4095, 2300, 2280, 0, 4080, 1900];

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let samples = std::env::args()
        .skip(1)
        .map(|arg| arg.parse::<i32>())
        .collect::<Result<Vec<_>, _>>()?;
    let samples = if samples.is_empty() {
        DEMO_SAMPLES.to_vec()
    } else {
        samples
    };

    let settings = DeviceSettings::load(&MemoryConfiguration::new());
    let mut sensor = ScriptedSensor::new(samples);
    let mut sink = LogTelemetry::new(feed_topic("local", &settings.soil_feed));
    let mut monitor = MoistureMonitor::new();

    while sensor.remaining() > 0 {
        let outcome = monitor.run_cycle(&mut sensor, &mut sink)?;
        info!("{}", cycle_report(&settings.name, &outcome));
    }

    Ok(())
}
