//! Canned motion sequences: sit, stand, wave
//!
//! Pure data. A [`MotionSequence`] is an ordered list of position frames
//! with one inter-frame delay; the [`SequenceLibrary`] indexes the built-in
//! sequences by name. Playback ordering and cancellation live in the
//! controller.

use std::collections::HashMap;
use std::time::Duration;

use crate::joints::{PositionVector, NUM_JOINTS};
use crate::{Error, Result};

/// All-center pose the robot sits in
const SIT: [u16; NUM_JOINTS] = [90, 90, 90, 90, 90, 90, 90, 90];
/// Legs-extended standing pose
const STAND: [u16; NUM_JOINTS] = [0, 180, 0, 180, 0, 0, 180, 0];
/// Wave with the front-right knee raised
const WAVE_RAISED: [u16; NUM_JOINTS] = [0, 180, 0, 140, 0, 0, 180, 0];
/// Wave with the front-right knee lowered
const WAVE_LOWERED: [u16; NUM_JOINTS] = [0, 180, 0, 40, 0, 0, 180, 0];

/// Wave cycles before returning to stand
const WAVE_CYCLES: usize = 4;
/// Delay between wave frames
const WAVE_FRAME_DELAY: Duration = Duration::from_millis(100);

fn pose(angles: [u16; NUM_JOINTS]) -> PositionVector {
    PositionVector::new(angles).expect("builtin pose within joint range")
}

/// The sit pose frame
#[must_use]
pub fn sit_pose() -> PositionVector {
    pose(SIT)
}

/// The stand pose frame; also the safe terminal frame applied when a
/// sequence is cancelled
#[must_use]
pub fn stand_pose() -> PositionVector {
    pose(STAND)
}

/// An immutable ordered list of position frames with an inter-frame delay
#[derive(Debug, Clone)]
pub struct MotionSequence {
    name: String,
    frames: Vec<PositionVector>,
    frame_delay: Duration,
}

impl MotionSequence {
    /// Create a sequence. Fails with [`Error::Config`] when empty; an empty
    /// sequence has no defined terminal pose.
    pub fn new(
        name: impl Into<String>,
        frames: Vec<PositionVector>,
        frame_delay: Duration,
    ) -> Result<Self> {
        let name = name.into();
        if frames.is_empty() {
            return Err(Error::Config(format!("sequence {:?} has no frames", name)));
        }
        Ok(Self {
            name,
            frames,
            frame_delay,
        })
    }

    /// Sequence name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Frames in playback order
    #[must_use]
    pub fn frames(&self) -> &[PositionVector] {
        &self.frames
    }

    /// Delay between consecutive frames
    #[must_use]
    pub fn frame_delay(&self) -> Duration {
        self.frame_delay
    }

    /// Number of frames
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Named lookup over the canned sequences
#[derive(Debug, Clone)]
pub struct SequenceLibrary {
    sequences: HashMap<String, MotionSequence>,
}

impl SequenceLibrary {
    /// The built-in library: `stand`, `sit`, and `wave`.
    ///
    /// Wave alternates the raised and lowered frames for [`WAVE_CYCLES`]
    /// cycles and ends back at the stand pose.
    #[must_use]
    pub fn builtin() -> Self {
        let mut lib = Self {
            sequences: HashMap::new(),
        };

        lib.insert(
            MotionSequence::new("stand", vec![stand_pose()], Duration::ZERO)
                .expect("builtin sequence is non-empty"),
        );
        lib.insert(
            MotionSequence::new("sit", vec![sit_pose()], Duration::ZERO)
                .expect("builtin sequence is non-empty"),
        );

        let mut wave_frames = Vec::with_capacity(WAVE_CYCLES * 2 + 1);
        for _ in 0..WAVE_CYCLES {
            wave_frames.push(pose(WAVE_RAISED));
            wave_frames.push(pose(WAVE_LOWERED));
        }
        wave_frames.push(stand_pose());
        lib.insert(
            MotionSequence::new("wave", wave_frames, WAVE_FRAME_DELAY)
                .expect("builtin sequence is non-empty"),
        );

        lib
    }

    /// An empty library, for callers that register their own sequences
    #[must_use]
    pub fn empty() -> Self {
        Self {
            sequences: HashMap::new(),
        }
    }

    /// Register a sequence under its own name, replacing any previous entry
    pub fn insert(&mut self, sequence: MotionSequence) {
        self.sequences.insert(sequence.name().to_string(), sequence);
    }

    /// Look up a sequence by name
    pub fn get(&self, name: &str) -> Result<&MotionSequence> {
        self.sequences
            .get(name)
            .ok_or_else(|| Error::UnknownSequence(name.to_string()))
    }

    /// Registered sequence names, unordered
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sequences.keys().map(String::as_str)
    }
}

impl Default for SequenceLibrary {
    fn default() -> Self {
        Self::builtin()
    }
}
