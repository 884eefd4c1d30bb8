//! Line-based wire codec shared by controller and executor
//!
//! Canonical frame: the eight joint angles as decimal ASCII, comma-separated,
//! terminated by a single newline: `90,90,90,90,90,90,90,90\n`. The encoding
//! is byte-exact; the executor's decoder accepts only this shape.
//!
//! A line consisting solely of decimal digits decodes as a legacy
//! single-position frame ([`WireFrame::Index`]). Nothing in this crate emits
//! that shape; it survives for old executor firmware and is deprecated.

use std::fmt::Write as _;

use arrayvec::ArrayString;

use crate::joints::{PositionVector, NUM_JOINTS};
use crate::{Error, Result};

/// Worst-case encoded line length: 8 three-digit angles, 7 commas, newline
pub const MAX_LINE_LEN: usize = NUM_JOINTS * 3 + (NUM_JOINTS - 1) + 1;

/// One decoded wire line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFrame {
    /// Canonical full position vector
    Vector(PositionVector),
    /// Legacy single position index (deprecated, executor-side only)
    Index(u16),
}

/// Encode a position vector as one wire line.
///
/// The returned buffer is stack-allocated; capacity is provably sufficient
/// for any valid vector.
pub fn encode_line(positions: &PositionVector) -> ArrayString<MAX_LINE_LEN> {
    let mut line = ArrayString::<MAX_LINE_LEN>::new();
    for (i, angle) in positions.iter().enumerate() {
        if i > 0 {
            line.push(',');
        }
        write!(line, "{}", angle).expect("encoded line exceeds MAX_LINE_LEN");
    }
    line.push('\n');
    line
}

/// Decode one wire line.
///
/// Trailing whitespace is stripped first. Failure modes:
/// - [`Error::MalformedFrame`]: comma list with a bad token or wrong count
/// - [`Error::OutOfRange`]: numeric but outside the joint range
/// - [`Error::InvalidInput`]: matches neither wire shape
///
/// Callers drop and log failed lines; decode errors are never fatal.
pub fn decode_line(line: &str) -> Result<WireFrame> {
    let trimmed = line.trim_end();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput("empty line".into()));
    }

    if trimmed.bytes().all(|b| b.is_ascii_digit()) {
        let index = trimmed
            .parse::<u16>()
            .map_err(|_| Error::InvalidInput(format!("position index too large: {}", trimmed)))?;
        return Ok(WireFrame::Index(index));
    }

    if !trimmed.contains(',') {
        return Err(Error::InvalidInput(format!("not a wire frame: {:?}", trimmed)));
    }

    let mut angles = [0u16; NUM_JOINTS];
    let mut count = 0usize;
    for token in trimmed.split(',') {
        let token = token.trim();
        if count < NUM_JOINTS {
            angles[count] = token.parse::<u16>().map_err(|_| {
                Error::MalformedFrame(format!("non-numeric token: {:?}", token))
            })?;
        }
        count += 1;
    }
    if count != NUM_JOINTS {
        return Err(Error::MalformedFrame(format!(
            "expected {} fields, got {}",
            NUM_JOINTS, count
        )));
    }

    Ok(WireFrame::Vector(PositionVector::new(angles)?))
}
