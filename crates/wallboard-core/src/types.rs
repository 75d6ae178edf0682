use crate::{
    Result,
    constants::{MAX_PIN_LENGTH, MAX_WEEKDAY, MIN_PIN_LENGTH, MINUTES_PER_DAY},
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use subtle::ConstantTimeEq;

/// Stable identifier of a family profile.
///
/// Profile ids are opaque strings generated by the persistence layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileId(String);

impl ProfileId {
    /// Create a profile id, rejecting blank input.
    ///
    /// # Errors
    /// Returns `Error::InvalidProfileId` if the id is empty or whitespace.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(Error::InvalidProfileId("profile id must not be empty".to_string()));
        }
        Ok(ProfileId(id))
    }

    /// Generate a fresh random id.
    #[must_use]
    pub fn generate() -> Self {
        ProfileId(uuid::Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for ProfileId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ProfileId::new(s)
    }
}

/// Privilege level of a profile.
///
/// Admin profiles can reset other profiles' PINs and must always keep a PIN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileType {
    Admin,
    Standard,
}

impl ProfileType {
    /// Storage representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileType::Admin => "admin",
            ProfileType::Standard => "standard",
        }
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        matches!(self, ProfileType::Admin)
    }
}

impl fmt::Display for ProfileType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProfileType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "admin" => Ok(ProfileType::Admin),
            "standard" => Ok(ProfileType::Standard),
            other => Err(Error::InvalidProfileType(other.to_string())),
        }
    }
}

impl TryFrom<String> for ProfileType {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// A plaintext profile PIN (4-6 ASCII digits).
///
/// # Security
/// The value never appears in `Debug` output, and equality is evaluated in
/// constant time so comparing two submitted PINs leaks nothing through timing.
/// Stored PINs are never held in this type; they live as Argon2 hashes.
#[derive(Clone)]
pub struct Pin(String);

impl Pin {
    /// Validate and wrap a PIN.
    ///
    /// # Errors
    /// Returns `Error::InvalidPinFormat` if the PIN is not 4-6 ASCII digits.
    pub fn new(pin: &str) -> Result<Self> {
        let len = pin.len();
        if !(MIN_PIN_LENGTH..=MAX_PIN_LENGTH).contains(&len) {
            return Err(Error::InvalidPinFormat(format!(
                "PIN must be {MIN_PIN_LENGTH}-{MAX_PIN_LENGTH} digits, got {len} characters"
            )));
        }

        if !pin.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidPinFormat(
                "PIN must contain digits only".to_string(),
            ));
        }

        Ok(Pin(pin.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pin").field(&"[REDACTED]").finish()
    }
}

impl PartialEq for Pin {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_bytes().ct_eq(other.0.as_bytes()).into()
    }
}

impl Eq for Pin {}

impl std::str::FromStr for Pin {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Pin::new(s)
    }
}

/// Minute-precision wall-clock time parsed from `"HH:MM"`.
///
/// Only the exact two-digit form is accepted (`"8:00"` and `"08:00:00"` are
/// rejected) so that every stored schedule time has a single spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime {
    hour: u32,
    minute: u32,
}

impl ClockTime {
    /// Create a clock time from hour (0-23) and minute (0-59).
    ///
    /// # Errors
    /// Returns `Error::InvalidTime` for out-of-range components.
    pub fn new(hour: u32, minute: u32) -> Result<Self> {
        if hour > 23 || minute > 59 {
            return Err(Error::InvalidTime(format!("{hour:02}:{minute:02}")));
        }
        Ok(ClockTime { hour, minute })
    }

    /// Build from minutes since midnight.
    ///
    /// # Errors
    /// Returns `Error::InvalidTime` if `minutes` is not within one day.
    pub fn from_minutes_of_day(minutes: u32) -> Result<Self> {
        if minutes >= MINUTES_PER_DAY {
            return Err(Error::InvalidTime(format!("minute {minutes} of day")));
        }
        Ok(ClockTime {
            hour: minutes / 60,
            minute: minutes % 60,
        })
    }

    #[must_use]
    pub fn hour(&self) -> u32 {
        self.hour
    }

    #[must_use]
    pub fn minute(&self) -> u32 {
        self.minute
    }

    /// Minutes elapsed since midnight (0..1440).
    #[must_use]
    pub fn minutes_of_day(&self) -> u32 {
        self.hour * 60 + self.minute
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl std::str::FromStr for ClockTime {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = s.as_bytes();
        let well_formed = bytes.len() == 5
            && bytes[2] == b':'
            && bytes[..2].iter().all(u8::is_ascii_digit)
            && bytes[3..].iter().all(u8::is_ascii_digit);

        if !well_formed {
            return Err(Error::InvalidTime(s.to_string()));
        }

        let hour: u32 = s[..2]
            .parse()
            .map_err(|_| Error::InvalidTime(s.to_string()))?;
        let minute: u32 = s[3..]
            .parse()
            .map_err(|_| Error::InvalidTime(s.to_string()))?;

        ClockTime::new(hour, minute)
    }
}

/// Validate a weekday number (0 = Sunday .. 6 = Saturday).
///
/// # Errors
/// Returns `Error::InvalidWeekday` for values above 6.
pub fn validate_weekday(day: u8) -> Result<u8> {
    if day > MAX_WEEKDAY {
        return Err(Error::InvalidWeekday(day));
    }
    Ok(day)
}
