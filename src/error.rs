use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Save error: No body or no content-length")]
    EmptyBody,

    #[error("Save error: Content-length too long ({0} bytes)")]
    BodyTooLong(u64),

    #[error("Save error: '{value}' is not a valid number for {field}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("Configuration NVS already taken")]
    AlreadyTaken,

    #[cfg(target_os = "espidf")]
    #[error("{0}: {1}")]
    Esp(&'static str, esp_idf_svc::sys::EspError),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown relay command '{0}'")]
    Unknown(String),
}
