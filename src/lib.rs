pub mod configuration;
pub mod error;
pub mod link;
pub mod monitor;
pub mod relay;
pub mod schedule;
pub mod sensors;
pub mod telemetry;
pub mod template;

#[cfg(target_os = "espidf")]
pub mod board;
#[cfg(target_os = "espidf")]
pub mod cloud;
#[cfg(target_os = "espidf")]
pub mod portal;
#[cfg(target_os = "espidf")]
pub mod wifi_helper;
