pub mod reading;
pub mod scripted_sensor;
pub mod sensor;

#[cfg(target_os = "espidf")]
pub mod moisture_sensor;
