pub mod config_store;
pub mod main_configuration;

#[cfg(target_os = "espidf")]
pub mod nvs_configuration;
