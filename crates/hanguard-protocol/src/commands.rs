//! The fixed command table of the door bus and its typed payloads.
//!
//! The table is defined by the door-unit firmware and is not configurable:
//!
//! | id   | direction          | payload                                  |
//! |------|--------------------|------------------------------------------|
//! | 0x00 | door -> gateway    | chip id (open request)                   |
//! | 0x00 | gateway -> door    | 2-hex-digit allow-seconds, empty = deny  |
//! | 0x02 | door -> gateway    | hex status bitmask                       |
//! | 0x14 | gateway broadcast  | time-sync hello timestamp                |
//!
//! Every other id is logged and ignored by the dispatcher.

use hanguard_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Commands the gateway implements. Ids outside this table map to `None` in
/// [`CommandCode::from_u8`] and are handled as unimplemented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum CommandCode {
    /// Open request (inbound) / open reply (outbound).
    Open = 0x00,

    /// Door status report (inbound, never answered).
    Status = 0x02,

    /// Broadcast time-sync hello (outbound only).
    Hello = 0x14,
}

impl CommandCode {
    /// Look up a wire command id in the table.
    #[must_use]
    pub fn from_u8(id: u8) -> Option<Self> {
        match id {
            0x00 => Some(CommandCode::Open),
            0x02 => Some(CommandCode::Status),
            0x14 => Some(CommandCode::Hello),
            _ => None,
        }
    }

    /// Wire command id.
    #[must_use]
    pub fn to_u8(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for CommandCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CommandCode::Open => write!(f, "Open"),
            CommandCode::Status => write!(f, "Status"),
            CommandCode::Hello => write!(f, "Hello"),
        }
    }
}

/// Outcome payload of an open reply.
///
/// An allow carries the door-open duration as two lowercase hex digits; a
/// deny is the empty payload, which the door unit also interprets as "close".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessReply {
    Allow { seconds: u8 },
    Deny,
}

impl AccessReply {
    /// Render the reply payload for the wire.
    #[must_use]
    pub fn payload(&self) -> String {
        match self {
            AccessReply::Allow { seconds } => format!("{seconds:02x}"),
            AccessReply::Deny => String::new(),
        }
    }

    #[must_use]
    pub fn is_allow(&self) -> bool {
        matches!(self, AccessReply::Allow { .. })
    }
}

/// Decoded door status bitmask (command 0x02 payload).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoorStatus(u8);

impl DoorStatus {
    const LOCKED: u8 = 0x1;
    const TAMPER: u8 = 0x2;
    const ALARM: u8 = 0x4;

    /// Parse the hex bitmask payload of a status report.
    ///
    /// # Errors
    /// Returns `Error::InvalidPayload` if the payload is not a hex number.
    pub fn from_payload(payload: &str) -> Result<Self> {
        let bits = u8::from_str_radix(payload.trim(), 16).map_err(|_| Error::InvalidPayload {
            command: CommandCode::Status.to_u8(),
            reason: format!("status bitmask {payload:?} is not hex"),
        })?;
        Ok(DoorStatus(bits))
    }

    #[must_use]
    pub fn bits(&self) -> u8 {
        self.0
    }

    /// Door bolt is thrown.
    #[must_use]
    pub fn locked(&self) -> bool {
        self.0 & Self::LOCKED != 0
    }

    /// Tamper contact triggered.
    #[must_use]
    pub fn tamper(&self) -> bool {
        self.0 & Self::TAMPER != 0
    }

    /// Alarm contact triggered.
    #[must_use]
    pub fn alarm(&self) -> bool {
        self.0 & Self::ALARM != 0
    }
}

/// Human-readable flag list, e.g. `locked, tamper` or `unlocked`.
impl fmt::Display for DoorStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut flags = vec![if self.locked() { "locked" } else { "unlocked" }];
        if self.tamper() {
            flags.push("tamper");
        }
        if self.alarm() {
            flags.push("alarm");
        }
        write!(f, "{}", flags.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0x00, Some(CommandCode::Open))]
    #[case(0x02, Some(CommandCode::Status))]
    #[case(0x14, Some(CommandCode::Hello))]
    #[case(0x01, None)]
    #[case(0x1f, None)]
    fn test_command_code_table(#[case] id: u8, #[case] expected: Option<CommandCode>) {
        assert_eq!(CommandCode::from_u8(id), expected);
    }

    #[test]
    fn test_access_reply_payloads() {
        assert_eq!(AccessReply::Allow { seconds: 3 }.payload(), "03");
        assert_eq!(AccessReply::Allow { seconds: 30 }.payload(), "1e");
        assert_eq!(AccessReply::Deny.payload(), "");
    }

    #[rstest]
    #[case("0", false, false, false)]
    #[case("1", true, false, false)]
    #[case("3", true, true, false)]
    #[case("7", true, true, true)]
    #[case("06", false, true, true)]
    fn test_door_status_bits(
        #[case] payload: &str,
        #[case] locked: bool,
        #[case] tamper: bool,
        #[case] alarm: bool,
    ) {
        let status = DoorStatus::from_payload(payload).unwrap();
        assert_eq!(status.locked(), locked);
        assert_eq!(status.tamper(), tamper);
        assert_eq!(status.alarm(), alarm);
    }

    #[test]
    fn test_door_status_rejects_junk() {
        assert!(DoorStatus::from_payload("xyz").is_err());
        assert!(DoorStatus::from_payload("").is_err());
    }

    #[test]
    fn test_door_status_display() {
        assert_eq!(DoorStatus::from_payload("1").unwrap().to_string(), "locked");
        assert_eq!(
            DoorStatus::from_payload("6").unwrap().to_string(),
            "unlocked, tamper, alarm"
        );
    }
}
