//! The orchestration core: change detection, undo, mode toggles, playback
//!
//! A [`StateController`] is the single source of truth for the last
//! transmitted position. All transmissions go through its `&mut self`
//! methods, so concurrent callers serialize at the borrow instead of racing
//! `last_sent`.

use std::io::{Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use crate::comm::{encode_line, LinkChannel, SendOutcome};
use crate::joints::PositionVector;
use crate::store::{StateStore, StoreKey, StoredValue};
use crate::Result;

use super::sequence::{sit_pose, stand_pose, SequenceLibrary};

/// Result of an [`StateController::apply`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Positions changed and went out on the wire
    Sent,
    /// Identical to the last applied positions; nothing transmitted
    Unchanged,
    /// Positions changed but the link is down; nothing transmitted
    NotSent,
}

/// Result of an [`StateController::undo`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoOutcome {
    /// The previous snapshot was applied
    Restored(ApplyOutcome),
    /// No previous snapshot exists; nothing happened
    NothingToUndo,
}

/// Result of sequence playback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    /// Every frame was applied
    Completed,
    /// Cancelled between frames; the stand pose was applied before returning
    Cancelled,
}

/// Holds the last-sent position, the link, and the store, and drives every
/// state change: manual applies, snapshots, undo, mode toggles, and timed
/// sequence playback.
pub struct StateController<S, B> {
    link: LinkChannel<S>,
    store: B,
    sequences: SequenceLibrary,
    last_sent: Option<PositionVector>,
}

impl<S: Read + Write, B: StateStore> StateController<S, B> {
    /// Create a controller with the built-in sequence library
    pub fn new(link: LinkChannel<S>, store: B) -> Self {
        Self::with_sequences(link, store, SequenceLibrary::builtin())
    }

    /// Create a controller with a custom sequence library
    pub fn with_sequences(link: LinkChannel<S>, store: B, sequences: SequenceLibrary) -> Self {
        Self {
            link,
            store,
            sequences,
            last_sent: None,
        }
    }

    /// The last positions handed to [`apply`](Self::apply), sent or not
    #[must_use]
    pub fn last_sent(&self) -> Option<&PositionVector> {
        self.last_sent.as_ref()
    }

    /// The underlying link
    pub fn link(&self) -> &LinkChannel<S> {
        &self.link
    }

    /// The underlying store
    pub fn store(&self) -> &B {
        &self.store
    }

    /// Transmit `positions` if they differ from the last applied vector.
    ///
    /// Identical repeat input is suppressed without touching the wire; this is the
    /// core guard against link saturation from repeated slider reads. The
    /// vector is remembered even when the link is degraded, so change
    /// detection keeps suppressing redundant input after a reconnect.
    pub fn apply(&mut self, positions: &PositionVector) -> ApplyOutcome {
        if self.last_sent.as_ref() == Some(positions) {
            tracing::debug!("positions unchanged; skipping transmission");
            return ApplyOutcome::Unchanged;
        }

        let line = encode_line(positions);
        let outcome = match self.link.send_line(&line) {
            SendOutcome::Sent => ApplyOutcome::Sent,
            SendOutcome::NotSent => ApplyOutcome::NotSent,
        };
        self.last_sent = Some(*positions);
        outcome
    }

    /// Record `positions` as the `current` snapshot, rotating the old
    /// `current` into `previous`. One level of undo history is kept.
    pub fn snapshot_current(&mut self, positions: &PositionVector) -> Result<()> {
        if let Some(old) = self.store.load_positions(StoreKey::Current)? {
            self.store
                .save(StoreKey::Previous, &StoredValue::Positions(old))?;
        }
        self.store
            .save(StoreKey::Current, &StoredValue::Positions(*positions))
    }

    /// Re-apply the `previous` snapshot, if one exists.
    pub fn undo(&mut self) -> Result<UndoOutcome> {
        match self.store.load_positions(StoreKey::Previous)? {
            None => {
                tracing::debug!("nothing to undo");
                Ok(UndoOutcome::NothingToUndo)
            }
            Some(previous) => Ok(UndoOutcome::Restored(self.apply(&previous))),
        }
    }

    /// Flip the persisted sit/stand flag and apply the matching pose.
    ///
    /// The decision comes from the persisted flag, not from comparing live
    /// positions against a canonical pose, so manual drift between toggles
    /// cannot desynchronize the button.
    pub fn toggle_sit_stand(&mut self) -> Result<ApplyOutcome> {
        let mut flags = self
            .store
            .load_flags(StoreKey::ButtonStates)?
            .unwrap_or_default();
        flags.sit_stand = !flags.sit_stand;

        let pose = if flags.sit_stand {
            sit_pose()
        } else {
            stand_pose()
        };
        tracing::info!(sitting = flags.sit_stand, "sit/stand toggled");

        let outcome = self.apply(&pose);
        self.store
            .save(StoreKey::ButtonStates, &StoredValue::Flags(flags))?;
        Ok(outcome)
    }

    /// Play a named sequence to completion, frame by frame.
    ///
    /// Each frame's apply runs to completion before the inter-frame delay;
    /// `cancel` is honored only between frames. On cancellation the stand
    /// pose is applied so the robot is never left mid-sequence.
    pub fn play_sequence(&mut self, name: &str, cancel: &AtomicBool) -> Result<PlayOutcome> {
        let sequence = self.sequences.get(name)?.clone();
        tracing::info!(sequence = name, frames = sequence.len(), "playing sequence");

        let frames = sequence.frames();
        for (i, frame) in frames.iter().enumerate() {
            let _ = self.apply(frame);

            if i + 1 < frames.len() {
                thread::sleep(sequence.frame_delay());
                if cancel.load(Ordering::Relaxed) {
                    tracing::warn!(sequence = name, "sequence cancelled; returning to stand");
                    let _ = self.apply(&stand_pose());
                    return Ok(PlayOutcome::Cancelled);
                }
            }
        }
        Ok(PlayOutcome::Completed)
    }

    /// Play the wave sequence, latching the persisted `waving` flag for its
    /// duration. Wave ends at the stand pose whether it completes or is
    /// cancelled.
    pub fn wave(&mut self, cancel: &AtomicBool) -> Result<PlayOutcome> {
        let mut flags = self
            .store
            .load_flags(StoreKey::ButtonStates)?
            .unwrap_or_default();
        flags.waving = true;
        self.store
            .save(StoreKey::ButtonStates, &StoredValue::Flags(flags))?;

        let outcome = self.play_sequence("wave", cancel);

        flags.waving = false;
        self.store
            .save(StoreKey::ButtonStates, &StoredValue::Flags(flags))?;
        outcome
    }

    /// Close the link. Safe to call at any time; further applies report
    /// [`ApplyOutcome::NotSent`].
    pub fn close(&mut self) {
        self.link.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::Arc;
    use std::time::Duration;

    use parking_lot::Mutex;

    use crate::comm::decode_line;
    use crate::joints::NUM_JOINTS;
    use crate::store::{MemoryStore, ModeFlags};
    use crate::WireFrame;

    use super::super::sequence::MotionSequence;

    /// Write-only transport recording every transmitted line.
    #[derive(Clone, Default)]
    struct Recorder {
        written: Arc<Mutex<Vec<u8>>>,
    }

    impl Recorder {
        fn lines(&self) -> Vec<String> {
            String::from_utf8(self.written.lock().clone())
                .unwrap()
                .lines()
                .map(str::to_string)
                .collect()
        }
    }

    impl io::Read for Recorder {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Ok(0)
        }
    }

    impl io::Write for Recorder {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.written.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn controller() -> (StateController<Recorder, MemoryStore>, Recorder) {
        let io = Recorder::default();
        let c = StateController::new(LinkChannel::over(io.clone()), MemoryStore::new());
        (c, io)
    }

    fn vec_of(angle: u16) -> PositionVector {
        PositionVector::new([angle; NUM_JOINTS]).unwrap()
    }

    #[test]
    fn test_apply_repeat_transmits_once() {
        let (mut c, io) = controller();
        let a = vec_of(45);

        assert_eq!(c.apply(&a), ApplyOutcome::Sent);
        assert_eq!(c.apply(&a), ApplyOutcome::Unchanged);
        assert_eq!(io.lines().len(), 1);
    }

    #[test]
    fn test_apply_distinct_transmits_each() {
        let (mut c, io) = controller();
        assert_eq!(c.apply(&vec_of(45)), ApplyOutcome::Sent);
        assert_eq!(c.apply(&vec_of(46)), ApplyOutcome::Sent);
        assert_eq!(io.lines().len(), 2);
    }

    #[test]
    fn test_applied_line_decodes_back() {
        let (mut c, io) = controller();
        let a = PositionVector::new([0, 180, 0, 140, 0, 0, 180, 0]).unwrap();
        let _ = c.apply(&a);

        let lines = io.lines();
        assert_eq!(decode_line(&lines[0]).unwrap(), WireFrame::Vector(a));
    }

    #[test]
    fn test_degraded_apply_not_sent_but_remembered() {
        let link = LinkChannel::<Recorder>::degraded("no port");
        let mut c = StateController::new(link, MemoryStore::new());
        let a = vec_of(30);

        assert_eq!(c.apply(&a), ApplyOutcome::NotSent);
        assert_eq!(c.last_sent(), Some(&a));
        // Change detection still suppresses the repeat.
        assert_eq!(c.apply(&a), ApplyOutcome::Unchanged);
    }

    #[test]
    fn test_undo_without_history_is_noop() {
        let (mut c, io) = controller();
        assert_eq!(c.undo().unwrap(), UndoOutcome::NothingToUndo);
        assert!(io.lines().is_empty());
    }

    #[test]
    fn test_snapshot_rotation() {
        let (mut c, _io) = controller();
        let x = vec_of(10);
        let y = vec_of(20);

        c.snapshot_current(&x).unwrap();
        c.snapshot_current(&y).unwrap();

        let store = c.store();
        assert_eq!(store.load_positions(StoreKey::Previous).unwrap(), Some(x));
        assert_eq!(store.load_positions(StoreKey::Current).unwrap(), Some(y));
    }

    #[test]
    fn test_undo_applies_previous() {
        let (mut c, io) = controller();
        let x = vec_of(10);
        let y = vec_of(20);
        c.snapshot_current(&x).unwrap();
        c.snapshot_current(&y).unwrap();

        match c.undo().unwrap() {
            UndoOutcome::Restored(ApplyOutcome::Sent) => {}
            other => panic!("expected Restored(Sent), got {:?}", other),
        }
        assert_eq!(c.last_sent(), Some(&x));
        assert_eq!(io.lines().len(), 1);
    }

    #[test]
    fn test_toggle_sit_stand_roundtrip() {
        let (mut c, io) = controller();

        assert_eq!(c.toggle_sit_stand().unwrap(), ApplyOutcome::Sent);
        assert_eq!(c.last_sent(), Some(&sit_pose()));
        let flags = c.store().load_flags(StoreKey::ButtonStates).unwrap().unwrap();
        assert!(flags.sit_stand);

        assert_eq!(c.toggle_sit_stand().unwrap(), ApplyOutcome::Sent);
        assert_eq!(c.last_sent(), Some(&stand_pose()));
        let flags = c.store().load_flags(StoreKey::ButtonStates).unwrap().unwrap();
        assert!(!flags.sit_stand);

        assert_eq!(io.lines().len(), 2);
    }

    #[test]
    fn test_play_sequence_applies_every_frame() {
        let (mut c, io) = controller();
        let never = AtomicBool::new(false);

        assert_eq!(
            c.play_sequence("wave", &never).unwrap(),
            PlayOutcome::Completed
        );
        let wave_len = SequenceLibrary::builtin().get("wave").unwrap().len();
        assert_eq!(io.lines().len(), wave_len);
        assert_eq!(c.last_sent(), Some(&stand_pose()));
    }

    #[test]
    fn test_play_unknown_sequence() {
        let (mut c, _io) = controller();
        let never = AtomicBool::new(false);
        assert!(matches!(
            c.play_sequence("moonwalk", &never),
            Err(crate::Error::UnknownSequence(_))
        ));
    }

    #[test]
    fn test_cancelled_sequence_ends_standing() {
        let io = Recorder::default();
        let mut lib = SequenceLibrary::empty();
        lib.insert(
            MotionSequence::new(
                "sweep",
                vec![vec_of(10), vec_of(20), vec_of(30)],
                Duration::from_millis(1),
            )
            .unwrap(),
        );
        let mut c = StateController::with_sequences(
            LinkChannel::over(io.clone()),
            MemoryStore::new(),
            lib,
        );

        let cancel = AtomicBool::new(true);
        assert_eq!(
            c.play_sequence("sweep", &cancel).unwrap(),
            PlayOutcome::Cancelled
        );
        // First frame completed, then the cancel check fired and stand went out.
        assert_eq!(c.last_sent(), Some(&stand_pose()));
        assert_eq!(io.lines().len(), 2);
    }

    #[test]
    fn test_wave_clears_latched_flag() {
        let (mut c, _io) = controller();
        let never = AtomicBool::new(false);

        assert_eq!(c.wave(&never).unwrap(), PlayOutcome::Completed);
        let flags = c.store().load_flags(StoreKey::ButtonStates).unwrap();
        assert_eq!(
            flags,
            Some(ModeFlags {
                sit_stand: false,
                waving: false
            })
        );
    }
}
