//! quadlink-core: position coordination for an 8-servo quadruped robot
//!
//! Coordinates actuator positions across two cooperating processes: a
//! controller that decides target joint angles (manual input, persisted
//! state, or canned motion sequences) and a microcontroller-resident
//! executor that turns angles into PWM duties.
//!
//! # Modules
//!
//! - [`joints`] - Joint identity and the validated [`PositionVector`]
//! - [`comm`] - Wire codec, serial link lifecycle, input-source channels
//! - [`store`] - Durable key/value snapshot storage (current, previous, flags)
//! - [`control`] - The [`StateController`] orchestration core and sequences
//! - [`executor`] - Device-side line listener and degrees-to-duty mapping
//!
//! # Example
//!
//! ```no_run
//! use quadlink_core::{JsonFileStore, LinkConfig, PositionVector, SerialLink, StateController};
//!
//! # fn main() -> quadlink_core::Result<()> {
//! // A failed open degrades the link instead of failing the controller;
//! // sliders and persistence keep working with no robot attached.
//! let link = SerialLink::open(&LinkConfig::new("/dev/ttyUSB0"));
//! let store = JsonFileStore::open("robot-state")?;
//! let mut controller = StateController::new(link, store);
//!
//! let pose = PositionVector::default();
//! controller.apply(&pose);
//! controller.snapshot_current(&pose)?;
//! # Ok(())
//! # }
//! ```

#![warn(unused_must_use)]

pub mod comm;
pub mod control;
pub mod executor;
pub mod joints;
pub mod store;

// Re-exports for convenience
pub use comm::{decode_line, encode_line, LinkChannel, LinkConfig, LinkState, SendOutcome, WireFrame};
#[cfg(feature = "serial")]
pub use comm::SerialLink;
pub use control::{ApplyOutcome, MotionSequence, PlayOutcome, SequenceLibrary, StateController, UndoOutcome};
pub use joints::{PositionVector, JOINT_NAMES, NUM_JOINTS};
pub use store::{JsonFileStore, MemoryStore, ModeFlags, StateStore, StoreKey, StoredValue};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Error types for quadlink-core
///
/// Transport and link errors are recovered locally and logged; they never
/// crash the control loop. Only construction-time invariant violations
/// ([`Error::Config`]) are fatal at startup.
#[derive(Debug, thiserror::Error)]
#[must_use = "errors must be handled or explicitly ignored with let _ = ..."]
#[non_exhaustive]
pub enum Error {
    /// A joint angle outside the valid degree range.
    /// Rejected at construction; an out-of-range vector is never transmitted.
    #[error("joint {joint} angle {angle} outside {}..={} degrees", joints::ANGLE_MIN, joints::ANGLE_MAX)]
    OutOfRange { joint: usize, angle: u16 },

    /// Wire line has the wrong field count or a non-numeric token.
    /// Handle by: dropping the line, logging, and continuing to listen.
    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    /// Line matches neither wire shape at all.
    /// Handle by: dropping the line, logging, and continuing to listen.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The serial link could not be opened.
    /// Captured once at open time; thereafter surfaced as the Degraded
    /// channel state, never re-raised per send.
    #[error("link unavailable: {0}")]
    LinkUnavailable(String),

    /// No sequence registered under the requested name.
    #[error("unknown sequence: {0}")]
    UnknownSequence(String),

    /// Store backend I/O or serialization failure.
    /// A missing key is a normal `Ok(None)` result, not this error.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Input-source channel was closed.
    /// Handle by: stopping the producing thread.
    #[error("channel closed")]
    ChannelClosed,

    /// Input-source channel is full (backpressure).
    /// Handle by: draining the receiver or slowing the producer.
    #[error("channel full")]
    ChannelFull,

    /// Invalid configuration. The only startup-fatal error class.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Persistence(format!("I/O error: {}", e))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Persistence(format!("JSON error: {}", e))
    }
}

/// Result type alias for quadlink-core operations
pub type Result<T> = std::result::Result<T, Error>;
