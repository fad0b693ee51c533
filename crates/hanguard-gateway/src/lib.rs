//! The Hanguard gateway loop.
//!
//! Glues the transport, the frame reader, and the decision engine into one
//! cooperative loop:
//!
//! ```text
//! Transport -> FrameReader -> Dispatcher -> { decode, decide, encode } -> Transport
//! ```
//!
//! A single logical thread of control alternates "check heartbeat timer" ->
//! "bounded read" -> "dispatch drained events" -> repeat. The door bus is a
//! half-duplex shared medium with the gateway as sole master, so parallel
//! request handling is neither required nor permitted: at most one decision
//! is in flight, and a frame's reply is written before the next read starts.

pub mod dispatcher;
pub mod heartbeat;
pub mod transport;

pub use dispatcher::Dispatcher;
pub use heartbeat::HeartbeatScheduler;
pub use transport::{BusTransport, MockTransport};
