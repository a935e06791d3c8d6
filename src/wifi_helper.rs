use std::{net::Ipv4Addr, str::FromStr};

use anyhow::anyhow;
use esp_idf_svc::hal::sys::{esp, esp_wifi_set_country, wifi_country_t};
use esp_idf_svc::hal::{modem::Modem, peripheral::Peripheral};
use esp_idf_svc::{
    eventloop::EspSystemEventLoop,
    ipv4::{self, Mask, Subnet},
    netif::{EspNetif, NetifConfiguration, NetifStack},
    nvs::EspDefaultNvsPartition,
    wifi::{
        AccessPointConfiguration, AuthMethod, BlockingWifi, ClientConfiguration, Configuration,
        EspWifi, WifiDriver,
    },
};
use log::{error, info, warn};

use crate::configuration::main_configuration::DeviceSettings;
use crate::link::Link;
use crate::template::AccessPoint;

const CONNECT_ATTEMPTS: u32 = 5;
const AP_SSID: &str = "Soil Monitor Config";
const AP_GATEWAY: &str = "192.168.70.1";

/// Station interface configured for the saved network, not yet connected.
pub fn create_station<'a>(
    settings: &DeviceSettings,
    modem: impl Peripheral<P = Modem> + 'a,
) -> anyhow::Result<BlockingWifi<EspWifi<'a>>> {
    let wifi_configuration = Configuration::Client(ClientConfiguration {
        ssid: settings
            .ssid
            .as_str()
            .try_into()
            .map_err(|_| anyhow!("SSID too long"))?,
        bssid: None,
        auth_method: AuthMethod::WPA2Personal,
        password: settings
            .passphrase
            .as_str()
            .try_into()
            .map_err(|_| anyhow!("Passphrase too long"))?,
        channel: None,
        ..Default::default()
    });

    let sys_loop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    let mut wifi = BlockingWifi::wrap(EspWifi::new(modem, sys_loop.clone(), Some(nvs))?, sys_loop)?;

    wifi.set_configuration(&wifi_configuration)?;

    Ok(wifi)
}

pub fn connect_wifi(wifi: &mut BlockingWifi<EspWifi<'_>>) -> anyhow::Result<()> {
    for i in 1..=CONNECT_ATTEMPTS {
        info!("Wifi connection attempt #{i}");

        match bring_up(wifi) {
            Ok(_) => break,
            Err(e) => {
                warn!("Wifi attempt #{i} failed: {e}");
                if i == CONNECT_ATTEMPTS {
                    return Err(e);
                }
            }
        }
    }

    Ok(())
}

fn bring_up(wifi: &mut BlockingWifi<EspWifi<'_>>) -> anyhow::Result<()> {
    let _ = wifi.disconnect();

    if !wifi.is_started()? {
        wifi.start()?;
        info!("Wifi started");
    }

    wifi.connect()?;
    info!("Wifi connected");

    wifi.wait_netif_up()?;
    info!("Wifi netif up");
    Ok(())
}

impl<'a> Link for BlockingWifi<EspWifi<'a>> {
    fn is_up(&mut self) -> bool {
        self.is_connected().unwrap_or(false)
    }

    /// Single reconnection attempt, called periodically from the main loop.
    fn reconnect(&mut self) -> anyhow::Result<()> {
        info!("Reconnecting to WiFi...");
        bring_up(self).map_err(|e| {
            error!("Failed to connect. Check WiFi settings.");
            e
        })
    }
}

pub fn create_ap<'a>(
    modem: impl Peripheral<P = Modem> + 'a,
) -> anyhow::Result<BlockingWifi<EspWifi<'a>>> {
    let sys_loop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    let wifi_drv = WifiDriver::new(modem, sys_loop.clone(), Some(nvs))?;
    let wifi_esp = EspWifi::wrap_all(
        wifi_drv,
        EspNetif::new(NetifStack::Sta)?,
        EspNetif::new_with_conf(&NetifConfiguration {
            ip_configuration: ipv4::Configuration::Router(ipv4::RouterConfiguration {
                subnet: Subnet {
                    gateway: Ipv4Addr::from_str(AP_GATEWAY)?,
                    mask: Mask(24),
                },
                ..Default::default()
            }),
            ..NetifConfiguration::wifi_default_router()
        })?,
    )?;

    let mut wifi = BlockingWifi::wrap(wifi_esp, sys_loop)?;

    let cc = wifi_country_t {
        cc: [b'F' as _, b'R' as _, 0],
        schan: 1,
        nchan: 14,
        max_tx_power: 80,
        ..Default::default()
    };

    esp!(unsafe { esp_wifi_set_country(&cc) })?;

    // Mixed mode so the portal can scan networks while serving the form.
    let wifi_configuration = Configuration::Mixed(
        ClientConfiguration {
            ..Default::default()
        },
        AccessPointConfiguration {
            ssid: AP_SSID.try_into().map_err(|_| anyhow!("AP SSID too long"))?,
            ssid_hidden: false,
            auth_method: AuthMethod::None,
            max_connections: 5,
            channel: 1,
            ..Default::default()
        },
    );

    info!("Set configuration");
    wifi.set_configuration(&wifi_configuration)?;

    for i in 1..=CONNECT_ATTEMPTS {
        info!("WiFi starting attempt #{i}");

        match wifi.start() {
            Ok(_) => break,
            Err(e) => {
                error!("Failed: {e}");

                if i == CONNECT_ATTEMPTS {
                    return Err(e.into());
                }
            }
        }
    }

    Ok(wifi)
}

pub fn scan(wifi: &mut BlockingWifi<EspWifi<'_>>) -> Vec<AccessPoint> {
    match wifi.scan() {
        Ok(aps) => aps
            .into_iter()
            .map(|ap| AccessPoint {
                ssid: ap.ssid.to_string(),
                rssi: ap.signal_strength,
            })
            .collect(),
        Err(e) => {
            warn!("WiFi scan failed: {e}");
            Vec::new()
        }
    }
}
