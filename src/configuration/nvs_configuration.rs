use std::sync::atomic::{AtomicBool, Ordering};

use esp_idf_svc::nvs::{EspCustomNvsPartition, EspNvs, NvsCustom};

use super::config_store::{strip_padding, trunc_pad_string, ConfigStore};
use crate::error::ConfigError;

static IS_NVS_TAKEN: AtomicBool = AtomicBool::new(false);

const PARTITION_NAME: &str = "config";
const NAMESPACE: &str = "config";

pub struct NvsConfiguration {
    nvs: EspNvs<NvsCustom>,
}

impl NvsConfiguration {
    pub fn new() -> Result<Self, ConfigError> {
        if IS_NVS_TAKEN.swap(true, Ordering::Relaxed) {
            return Err(ConfigError::AlreadyTaken);
        }

        let nvs = EspCustomNvsPartition::take(PARTITION_NAME)
            .and_then(|partition| EspNvs::new(partition, NAMESPACE, true))
            .map_err(|e| {
                IS_NVS_TAKEN.store(false, Ordering::Relaxed);
                ConfigError::Esp("Failed to open config partition", e)
            })?;

        Ok(Self { nvs })
    }
}

impl ConfigStore for NvsConfiguration {
    fn read_string(&self, key: &str, default: &str) -> String {
        let size = self.nvs.str_len(key).unwrap_or(None).unwrap_or(0);

        if size == 0 {
            return default.to_string();
        }

        let mut buf = vec![0; size];

        match self.nvs.get_str(key, &mut buf) {
            Ok(Some(value)) => strip_padding(value).to_owned(),
            _ => default.to_string(),
        }
    }

    fn store_string(
        &mut self,
        key: &str,
        value: &str,
        max_size: usize,
    ) -> Result<(), ConfigError> {
        self.nvs
            .remove(key)
            .map_err(|e| ConfigError::Esp("Failed to erase key", e))?;
        self.nvs
            .set_str(key, &trunc_pad_string(value, max_size))
            .map_err(|e| ConfigError::Esp("Failed to store string", e))
    }

    fn read_u64(&self, key: &str, default: u64) -> u64 {
        self.nvs.get_u64(key).unwrap_or(None).unwrap_or(default)
    }

    fn store_u64(&mut self, key: &str, value: u64) -> Result<(), ConfigError> {
        self.nvs
            .remove(key)
            .map_err(|e| ConfigError::Esp("Failed to erase key", e))?;
        self.nvs
            .set_u64(key, value)
            .map_err(|e| ConfigError::Esp("Failed to store U64", e))
    }
}

impl Drop for NvsConfiguration {
    fn drop(&mut self) {
        IS_NVS_TAKEN.store(false, Ordering::Relaxed);
    }
}
