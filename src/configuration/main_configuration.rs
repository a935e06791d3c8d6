use url_encoded_data::UrlEncodedData;

use super::config_store::ConfigStore;
use crate::error::ConfigError;

pub const KEY_SSID: &str = "SSID";
pub const KEY_PASSPHRASE: &str = "PASS";
pub const KEY_AIO_USERNAME: &str = "AIO_USER";
pub const KEY_AIO_KEY: &str = "AIO_KEY";
pub const KEY_SOIL_FEED: &str = "SOIL_FEED";
pub const KEY_RELAY_FEED: &str = "RELAY_FEED";
pub const KEY_NAME: &str = "NAME";
pub const KEY_INTERVAL: &str = "INTERVAL";

pub const DEFAULT_SOIL_FEED: &str = "soil-moisture";
pub const DEFAULT_RELAY_FEED: &str = "relay-command";
pub const DEFAULT_NAME: &str = "soil-monitor";
pub const DEFAULT_INTERVAL_MS: u64 = 10_000;
pub const MIN_INTERVAL_MS: u64 = 1_000;

pub const MAX_FORM_BODY: u64 = 512;

#[derive(Debug)]
pub enum MapFormType {
    String(&'static str, usize),
    Unsigned64(u64),
}

#[derive(Debug)]
pub struct MapFormElement {
    pub nvs_key: &'static str,
    pub form_name: &'static str,
    pub template_id: Option<&'static str>,
    pub data_type: MapFormType,
}

pub const MAP_NVS_FORM: &[MapFormElement] = &[
    MapFormElement {
        nvs_key: KEY_SSID,
        form_name: "ssid",
        template_id: Some("{SSID}"),
        data_type: MapFormType::String("", 32),
    },
    MapFormElement {
        nvs_key: KEY_PASSPHRASE,
        form_name: "pass",
        template_id: None,
        data_type: MapFormType::String("", 63),
    },
    MapFormElement {
        nvs_key: KEY_AIO_USERNAME,
        form_name: "aio_user",
        template_id: Some("{AIO_USER}"),
        data_type: MapFormType::String("", 32),
    },
    MapFormElement {
        nvs_key: KEY_AIO_KEY,
        form_name: "aio_key",
        template_id: None,
        data_type: MapFormType::String("", 64),
    },
    MapFormElement {
        nvs_key: KEY_SOIL_FEED,
        form_name: "soil_feed",
        template_id: Some("{SOIL_FEED}"),
        data_type: MapFormType::String(DEFAULT_SOIL_FEED, 64),
    },
    MapFormElement {
        nvs_key: KEY_RELAY_FEED,
        form_name: "relay_feed",
        template_id: Some("{RELAY_FEED}"),
        data_type: MapFormType::String(DEFAULT_RELAY_FEED, 64),
    },
    MapFormElement {
        nvs_key: KEY_NAME,
        form_name: "name",
        template_id: Some("{NAME}"),
        data_type: MapFormType::String(DEFAULT_NAME, 32),
    },
    MapFormElement {
        nvs_key: KEY_INTERVAL,
        form_name: "interval",
        template_id: Some("{INTERVAL}"),
        data_type: MapFormType::Unsigned64(DEFAULT_INTERVAL_MS),
    },
];

/// Snapshot of the stored configuration, read once at boot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSettings {
    pub ssid: String,
    pub passphrase: String,
    pub aio_username: String,
    pub aio_key: String,
    pub soil_feed: String,
    pub relay_feed: String,
    pub name: String,
    pub sample_interval_ms: u64,
}

impl DeviceSettings {
    pub fn load<S: ConfigStore>(store: &S) -> Self {
        Self {
            ssid: store.read_string(KEY_SSID, ""),
            passphrase: store.read_string(KEY_PASSPHRASE, ""),
            aio_username: store.read_string(KEY_AIO_USERNAME, ""),
            aio_key: store.read_string(KEY_AIO_KEY, ""),
            soil_feed: store.read_string(KEY_SOIL_FEED, DEFAULT_SOIL_FEED),
            relay_feed: store.read_string(KEY_RELAY_FEED, DEFAULT_RELAY_FEED),
            name: store.read_string(KEY_NAME, DEFAULT_NAME),
            sample_interval_ms: store
                .read_u64(KEY_INTERVAL, DEFAULT_INTERVAL_MS)
                .max(MIN_INTERVAL_MS),
        }
    }

    pub fn is_provisioned(&self) -> bool {
        !self.ssid.is_empty() && !self.aio_username.is_empty() && !self.aio_key.is_empty()
    }
}

pub fn check_body_length(len: u64) -> Result<(), ConfigError> {
    if len == 0 {
        Err(ConfigError::EmptyBody)
    } else if len >= MAX_FORM_BODY {
        Err(ConfigError::BodyTooLong(len))
    } else {
        Ok(())
    }
}

/// Stores every known field of an url-encoded settings form.
///
/// Returns how many fields were written. Numbers are all validated before
/// anything is stored.
pub fn apply_form<S: ConfigStore>(store: &mut S, body: &str) -> Result<usize, ConfigError> {
    let form = UrlEncodedData::parse_str(body);
    let mut values = Vec::new();

    for elem in MAP_NVS_FORM {
        if !form.exists(elem.form_name) {
            continue;
        }

        let data = form
            .get_first(elem.form_name)
            .map(|v| v.to_string())
            .unwrap_or_default();

        let value = match elem.data_type {
            MapFormType::String(_, max_size) => FormValue::Text(data, max_size),
            MapFormType::Unsigned64(_) => match data.trim().parse::<u64>() {
                Ok(number) => FormValue::Number(number),
                Err(_) => {
                    return Err(ConfigError::InvalidNumber {
                        field: elem.form_name,
                        value: data,
                    })
                }
            },
        };

        values.push((elem.nvs_key, value));
    }

    for (key, value) in &values {
        match value {
            FormValue::Text(text, max_size) => store.store_string(key, text, *max_size)?,
            FormValue::Number(number) => store.store_u64(key, *number)?,
        }
    }

    Ok(values.len())
}

enum FormValue {
    Text(String, usize),
    Number(u64),
}
