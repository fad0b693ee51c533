use crate::{
    Result,
    constants::{MAX_CHIP_LENGTH, MAX_DOOR_ID},
    error::Error,
};
use chrono::{DateTime, Datelike, Local, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use subtle::ConstantTimeEq;

/// Door identifier (4-bit field on the wire, 0-15).
///
/// Door id 0 is reserved as the broadcast address on outbound frames; it is
/// still a valid value here since inbound decoding may produce it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DoorId(u8);

impl DoorId {
    /// Create a new door id with validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidDoorId` if the id does not fit the 4-bit wire
    /// field (0-15).
    pub fn new(id: u8) -> Result<Self> {
        if id > MAX_DOOR_ID {
            return Err(Error::InvalidDoorId(format!(
                "Door id must be 0-{MAX_DOOR_ID}, got {id}"
            )));
        }
        Ok(DoorId(id))
    }

    /// Build from the 4-bit wire field. Masks to the valid range, so this
    /// never fails; use it only on values extracted from a command word.
    #[must_use]
    pub fn from_wire(bits: u8) -> Self {
        DoorId(bits & MAX_DOOR_ID)
    }

    /// Get the raw door id as u8.
    #[must_use]
    pub fn as_u8(&self) -> u8 {
        self.0
    }

    /// Returns `true` for door id 0, the broadcast address on outbound frames.
    #[must_use]
    pub fn is_broadcast(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for DoorId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for DoorId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let id: u8 = s
            .parse()
            .map_err(|_| Error::InvalidDoorId(format!("Invalid door id: {s}")))?;
        DoorId::new(id)
    }
}

/// Chip (transponder) identifier presented at a door unit.
///
/// # Security
/// This type implements constant-time comparison to prevent timing attacks
/// when comparing chip ids during access checks.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
pub struct ChipId(String);

impl ChipId {
    /// Create a new chip id with validation.
    ///
    /// The chip id is normalized (trimmed and converted to uppercase) before
    /// validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidChipId` if the id is empty, longer than 32
    /// characters, or contains non-ASCII characters.
    pub fn new(id: &str) -> Result<Self> {
        let id = id.trim().to_uppercase();

        if id.is_empty() || id.len() > MAX_CHIP_LENGTH {
            return Err(Error::InvalidChipId(format!(
                "Chip id must be 1-{MAX_CHIP_LENGTH} chars, got {}",
                id.len()
            )));
        }

        if !id.is_ascii() {
            return Err(Error::InvalidChipId("Chip id must be ASCII".to_string()));
        }

        Ok(ChipId(id))
    }

    /// Get the chip id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChipId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ChipId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ChipId::new(s)
    }
}

/// Constant-time comparison implementation for ChipId.
impl PartialEq for ChipId {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_bytes().ct_eq(other.0.as_bytes()).into()
    }
}

impl std::hash::Hash for ChipId {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

/// Membership number identifying a member in the rights store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemberId(i64);

impl MemberId {
    #[must_use]
    pub fn new(id: i64) -> Self {
        MemberId(id)
    }

    #[must_use]
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Timestamp for the broadcast hello frame.
///
/// Wire encoding is a fixed-width hex string: 4 digits for the year, then 2
/// digits each for month, day, ISO weekday (1 = Monday), hour, minute and
/// second. Example: `07EA08060410251E` for 2026-08-06 (Thursday) 16:37:30.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusTimestamp(DateTime<Local>);

impl BusTimestamp {
    /// Create a timestamp from the current local time.
    #[must_use]
    pub fn now() -> Self {
        BusTimestamp(Local::now())
    }

    /// Create a timestamp from a DateTime instance.
    #[must_use]
    pub fn from_datetime(dt: DateTime<Local>) -> Self {
        BusTimestamp(dt)
    }

    /// Encode as the hello frame payload.
    #[must_use]
    pub fn encode(&self) -> String {
        format!(
            "{:04X}{:02X}{:02X}{:02X}{:02X}{:02X}{:02X}",
            self.0.year(),
            self.0.month(),
            self.0.day(),
            self.0.weekday().number_from_monday(),
            self.0.hour(),
            self.0.minute(),
            self.0.second()
        )
    }

    /// Get the inner DateTime reference.
    #[must_use]
    pub fn inner(&self) -> &DateTime<Local> {
        &self.0
    }
}

impl fmt::Display for BusTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d %H:%M:%S"))
    }
}
