use std::collections::HashMap;

use pad::{Alignment, PadStr};

use crate::error::ConfigError;

const PAD_CHAR: char = 0x03 as char;

/// Key/value storage behind the device settings.
pub trait ConfigStore {
    fn read_string(&self, key: &str, default: &str) -> String;
    fn store_string(&mut self, key: &str, value: &str, max_size: usize)
        -> Result<(), ConfigError>;
    fn read_u64(&self, key: &str, default: u64) -> u64;
    fn store_u64(&mut self, key: &str, value: u64) -> Result<(), ConfigError>;
}

/// Cuts `s` to at most `max` bytes on a char boundary, then pads it.
///
/// Fixed-size fields (SSID, passphrase) are limited in bytes, not chars.
pub fn trunc_pad_string(s: &str, max: usize) -> String {
    let mut end = s.len().min(max);
    while !s.is_char_boundary(end) {
        end -= 1;
    }

    s[..end].pad(max, PAD_CHAR, Alignment::Left, false)
}

pub fn strip_padding(s: &str) -> &str {
    s.split_once(PAD_CHAR).map_or(s, |(value, _)| value)
}

/// Volatile store with the same padding behavior as the NVS one.
#[derive(Debug, Default)]
pub struct MemoryConfiguration {
    strings: HashMap<String, String>,
    numbers: HashMap<String, u64>,
}

impl MemoryConfiguration {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfigStore for MemoryConfiguration {
    fn read_string(&self, key: &str, default: &str) -> String {
        match self.strings.get(key) {
            Some(value) => strip_padding(value).to_owned(),
            None => default.to_string(),
        }
    }

    fn store_string(
        &mut self,
        key: &str,
        value: &str,
        max_size: usize,
    ) -> Result<(), ConfigError> {
        self.strings
            .insert(key.to_string(), trunc_pad_string(value, max_size));
        Ok(())
    }

    fn read_u64(&self, key: &str, default: u64) -> u64 {
        self.numbers.get(key).copied().unwrap_or(default)
    }

    fn store_u64(&mut self, key: &str, value: u64) -> Result<(), ConfigError> {
        self.numbers.insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_and_strip() {
        let padded = trunc_pad_string("garden", 10);

        assert_eq!(padded.chars().count(), 10);
        assert!(padded.ends_with(PAD_CHAR));
        assert_eq!(strip_padding(&padded), "garden");
    }

    #[test]
    fn test_truncates_long_values() {
        assert_eq!(trunc_pad_string("soil-moisture-feed", 4), "soil");
        assert_eq!(strip_padding("soil"), "soil");
    }

    #[test]
    fn test_truncates_multibyte_values_by_bytes() {
        let ssid = "é".repeat(20);
        let stored = trunc_pad_string(&ssid, 32);
        let value = strip_padding(&stored);

        assert_eq!(value, "é".repeat(16));
        assert!(value.len() <= 32);

        // A 3-byte char straddling the limit is dropped whole.
        assert_eq!(strip_padding(&trunc_pad_string("ab€", 4)), "ab");
    }

    #[test]
    fn test_memory_store_defaults_and_round_trip() {
        let mut store = MemoryConfiguration::new();

        assert_eq!(store.read_string("SSID", "none"), "none");
        assert_eq!(store.read_u64("INTERVAL", 42), 42);

        store.store_string("SSID", "home-network", 32).unwrap();
        store.store_u64("INTERVAL", 30_000).unwrap();

        assert_eq!(store.read_string("SSID", ""), "home-network");
        assert_eq!(store.read_u64("INTERVAL", 42), 30_000);
    }

    #[test]
    fn test_shorter_value_replaces_longer_one() {
        let mut store = MemoryConfiguration::new();

        store.store_string("NAME", "vegetable-patch", 32).unwrap();
        store.store_string("NAME", "herbs", 32).unwrap();

        assert_eq!(store.read_string("NAME", ""), "herbs");
    }
}
