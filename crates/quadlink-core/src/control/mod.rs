//! Control core: the state controller, canned sequences, input sources

mod controller;
mod input;
mod sequence;

pub use controller::{ApplyOutcome, PlayOutcome, StateController, UndoOutcome};
pub use input::spawn_remote_listener;
pub use sequence::{sit_pose, stand_pose, MotionSequence, SequenceLibrary};
