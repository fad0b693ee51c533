pub mod commands;
pub mod frame;
pub mod reader;
pub mod word;

pub use commands::{AccessReply, CommandCode, DoorStatus};
pub use frame::TextFrame;
pub use reader::{BusEvent, FrameReader};
pub use word::CommandWord;
