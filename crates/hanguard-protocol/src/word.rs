//! Bit packing and unpacking of the 16-bit command word.
//!
//! The command word carries addressing and the command id in one value:
//!
//! ```text
//!  15       10    8     5   4   3     0
//!   ........ A .. DDDD R CCCC
//!             │    │    │  └─ command id (low 5 bits incl. R)
//!             │    │    └──── explicit-recipient flag
//!             │    └───────── door id (sender or recipient)
//!             └────────────── alarm-system flag
//! ```
//!
//! Inbound frames from door units carry the *sender* door id and a clear
//! recipient flag. Outbound directed frames set the recipient flag; a zero
//! recipient means broadcast and the flag stays clear.
//!
//! The command-id mask deliberately includes bit 4: on a well-formed inbound
//! frame that bit is clear, and callers are expected to check
//! [`has_recipient`](CommandWord::has_recipient) before trusting the decoded
//! fields.

use hanguard_core::constants::{
    ALARM_BIT, COMMAND_ID_MASK, DOOR_ID_MASK, DOOR_ID_SHIFT, RECIPIENT_BIT,
};
use hanguard_core::{DoorId, Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The 16-bit bit-packed command word of a text frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandWord(u16);

impl CommandWord {
    /// Wrap a raw wire value. All 16-bit values are representable; semantic
    /// checks happen in the accessors.
    #[must_use]
    pub fn from_raw(raw: u16) -> Self {
        CommandWord(raw)
    }

    /// Compose an outbound command word.
    ///
    /// A broadcast recipient (door id 0) leaves both the door-id field and
    /// the recipient flag clear; any other recipient sets both.
    ///
    /// # Errors
    /// Returns `Error::InvalidCommandWord` if the command id does not fit the
    /// 5-bit field.
    pub fn compose(command_id: u8, recipient: DoorId) -> Result<Self> {
        if u16::from(command_id) & !COMMAND_ID_MASK != 0 {
            return Err(Error::InvalidCommandWord(format!(
                "Command id must be 0-{COMMAND_ID_MASK:#x}, got {command_id:#x}"
            )));
        }

        let mut word = u16::from(command_id);
        if !recipient.is_broadcast() {
            word |= u16::from(recipient.as_u8()) << DOOR_ID_SHIFT;
            word |= RECIPIENT_BIT;
        }
        Ok(CommandWord(word))
    }

    /// Get the raw 16-bit value.
    #[must_use]
    pub fn raw(&self) -> u16 {
        self.0
    }

    /// Alarm-system frame. Informational only; must never be answered.
    #[must_use]
    pub fn alarm(&self) -> bool {
        self.0 & ALARM_BIT != 0
    }

    /// Explicit-recipient flag. Set on gateway -> door directed frames;
    /// should not occur on the inbound path.
    #[must_use]
    pub fn has_recipient(&self) -> bool {
        self.0 & RECIPIENT_BIT != 0
    }

    /// The 4-bit door id field: the sender on inbound frames, the recipient
    /// on outbound directed frames.
    #[must_use]
    pub fn door_id(&self) -> DoorId {
        DoorId::from_wire(((self.0 >> DOOR_ID_SHIFT) & DOOR_ID_MASK) as u8)
    }

    /// The 5-bit command id field (includes bit 4, expected clear inbound).
    #[must_use]
    pub fn command_id(&self) -> u8 {
        (self.0 & COMMAND_ID_MASK) as u8
    }
}

impl fmt::Display for CommandWord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:04X}", self.0)
    }
}
