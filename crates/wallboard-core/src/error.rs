use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Credential errors
    #[error("Invalid PIN format: {0}")]
    InvalidPinFormat(String),

    #[error("Invalid profile type: {0}")]
    InvalidProfileType(String),

    #[error("Invalid profile id: {0}")]
    InvalidProfileId(String),

    // Schedule errors
    #[error("Invalid time of day: {0}")]
    InvalidTime(String),

    #[error("Invalid weekday: {0} (expected 0-6)")]
    InvalidWeekday(u8),

    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),
}

pub type Result<T> = std::result::Result<T, Error>;
