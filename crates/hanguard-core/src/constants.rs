//! Protocol-level constants for the door-bus wire format.
//!
//! The bus carries CRLF-terminated ASCII text frames plus two out-of-band
//! single control bytes:
//!
//! ```text
//! c;XXXX;<payload>\r\n
//! ```
//!
//! Where `XXXX` is the 16-bit command word as 4 uppercase hex digits. The
//! command word packs addressing and the command id:
//!
//! | bits  | meaning                                     |
//! |-------|---------------------------------------------|
//! | 10    | alarm-system frame (informational only)     |
//! | 5-8   | door id (sender, or recipient when bit 4)   |
//! | 4     | explicit-recipient flag (gateway -> door)   |
//! | 0-3   | command id (masked with 0x1F incl. bit 4)   |
//!
//! These values are fixed by the door-unit firmware; changing them breaks
//! compatibility with deployed hardware.

// ============================================================================
// Out-of-band control bytes
// ============================================================================

/// Positive acknowledge, sent by door units as a bare byte outside any frame.
pub const ACK_BYTE: u8 = 0x06;

/// Negative acknowledge, sent by door units as a bare byte outside any frame.
pub const NACK_BYTE: u8 = 0x15;

// ============================================================================
// Text frame format
// ============================================================================

/// Leading marker of every text frame.
pub const FRAME_PREFIX: &str = "c;";

/// Frame terminator. Door units always send CRLF.
pub const FRAME_TERMINATOR: &str = "\r\n";

/// A frame splits on `;` into exactly this many parts: marker, word, payload.
pub const FRAME_PART_COUNT: usize = 3;

/// Maximum accepted line length in bytes.
///
/// Lines longer than this without a terminator indicate a protocol violation
/// or a stuck sender; the reader discards the buffer to bound memory use.
pub const MAX_LINE_LENGTH: usize = 1024;

// ============================================================================
// Command word bit layout
// ============================================================================

/// Bit marking an alarm-system frame. Such frames are informational only and
/// must never be answered.
pub const ALARM_BIT: u16 = 1 << 10;

/// Bit marking an explicit recipient (gateway -> door directed message).
pub const RECIPIENT_BIT: u16 = 1 << 4;

/// Shift of the 4-bit door id field.
pub const DOOR_ID_SHIFT: u16 = 5;

/// Mask of the door id field after shifting.
pub const DOOR_ID_MASK: u16 = 0xF;

/// Mask of the command id field. Includes bit 4, which is expected clear on
/// inbound sender-addressed frames.
pub const COMMAND_ID_MASK: u16 = 0x1F;

// ============================================================================
// Identifier ranges
// ============================================================================

/// Maximum door id. Door ids occupy a 4-bit field; 0 doubles as broadcast on
/// outbound frames.
pub const MAX_DOOR_ID: u8 = 15;

/// Maximum chip id length in characters.
pub const MAX_CHIP_LENGTH: usize = 32;

// ============================================================================
// Timing defaults
// ============================================================================

/// Fixed door-open duration granted on a successful access check (seconds).
pub const DEFAULT_ALLOW_SECONDS: u8 = 3;

/// Interval between broadcast time-sync hello frames (seconds).
pub const HELLO_INTERVAL_SECS: u64 = 600;

/// Bounded read timeout on the serial transport (milliseconds).
///
/// This bounds heartbeat jitter; it is far below the hello interval, so the
/// drift is irrelevant in practice.
pub const READ_TIMEOUT_MS: u64 = 2000;

// ============================================================================
// Serial line parameters (reference deployment)
// ============================================================================

/// Bus baud rate.
pub const BAUD_RATE: u32 = 115_200;
