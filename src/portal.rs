use std::sync::{Arc, Mutex, MutexGuard};

use embedded_svc::http::Headers;
use embedded_svc::io::{Read, Write};
use esp_idf_svc::hal::{delay::FreeRtos, modem::Modem, peripheral::Peripheral};
use esp_idf_svc::http::{self, server::EspHttpServer, Method};
use log::{error, info};

use crate::configuration::main_configuration::{apply_form, check_body_length};
use crate::configuration::nvs_configuration::NvsConfiguration;
use crate::template;
use crate::wifi_helper;

/// Serves the settings form on the access point until the device is reset.
pub fn run(
    config: NvsConfiguration,
    modem: impl Peripheral<P = Modem> + 'static,
) -> anyhow::Result<()> {
    let wifi = wifi_helper::create_ap(modem)?;

    let mutex_config = Arc::new(Mutex::new(config));
    let mutex_wifi = Arc::new(Mutex::new(wifi));

    let mut server = EspHttpServer::new(&http::server::Configuration {
        stack_size: 10240,
        ..Default::default()
    })?;

    let (get_config, get_wifi) = (mutex_config.clone(), mutex_wifi.clone());
    server.fn_handler::<anyhow::Error, _>("/", Method::Get, move |req| {
        let aps = wifi_helper::scan(&mut *lock(&get_wifi)?);
        info!("Scan result: {} networks", aps.len());

        let html = template::to_html(&*lock(&get_config)?, None, &aps);
        req.into_ok_response()?.write_all(html.as_bytes())?;
        Ok(())
    })?;

    server.fn_handler::<anyhow::Error, _>("/", Method::Post, move |mut req| {
        let len_body = req.content_len().unwrap_or(0);

        let message = match check_body_length(len_body) {
            Err(e) => e.to_string(),
            Ok(()) => {
                let mut buffer = vec![0u8; len_body as usize];
                let mut read = 0;

                while read < buffer.len() {
                    match req.read(&mut buffer[read..]) {
                        Ok(0) => break,
                        Ok(n) => read += n,
                        Err(e) => {
                            error!("Failed to read request: {:?}", e);
                            break;
                        }
                    }
                }

                let body = String::from_utf8_lossy(&buffer[..read]).into_owned();
                match apply_form(&mut *lock(&mutex_config)?, &body) {
                    Ok(stored) => {
                        info!("Stored {} settings", stored);
                        "Save successfully! Restart the device to apply.".to_string()
                    }
                    Err(e) => e.to_string(),
                }
            }
        };

        let aps = wifi_helper::scan(&mut *lock(&mutex_wifi)?);
        let html = template::to_html(&*lock(&mutex_config)?, Some(&message), &aps);
        req.into_ok_response()?.write_all(html.as_bytes())?;
        Ok(())
    })?;

    info!("Settings portal ready");

    loop {
        FreeRtos::delay_ms(1000);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> anyhow::Result<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| anyhow::anyhow!("settings portal state poisoned"))
}
