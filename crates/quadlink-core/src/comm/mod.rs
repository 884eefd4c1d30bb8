//! Communication primitives: wire codec, serial link, input-source channels
//!
//! The codec and link are shared by both sides of the wire: the controller
//! encodes and transmits, the executor receives and decodes.

mod channel;
mod codec;
mod link;

pub use channel::{bounded_channel, unbounded_channel, Receiver, Sender};
pub use codec::{decode_line, encode_line, WireFrame, MAX_LINE_LEN};
pub use link::{LinkChannel, LinkConfig, LinkState, SendOutcome};

#[cfg(feature = "serial")]
pub use link::SerialLink;
