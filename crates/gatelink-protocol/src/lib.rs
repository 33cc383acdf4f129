pub mod field;
pub mod frame;
pub mod receiver;
pub mod response;

pub use frame::{Frame, ParsedCommand};
pub use receiver::{FrameReceiver, OverflowPolicy};
pub use response::{ReplyBuilder, WireReply};
