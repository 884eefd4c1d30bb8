//! Joint identity and position vector types

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Number of controllable joints on the quadruped
pub const NUM_JOINTS: usize = 8;

/// Joint names in physical servo index order
///
/// The order is load-bearing: it matches the executor's joint mapping,
/// so element `i` of every wire line drives servo `i`.
pub const JOINT_NAMES: [&str; NUM_JOINTS] = [
    "front_left_hip",
    "front_left_knee",
    "front_right_hip",
    "front_right_knee",
    "rear_left_hip",
    "rear_left_knee",
    "rear_right_hip",
    "rear_right_knee",
];

/// Minimum joint angle in degrees
pub const ANGLE_MIN: u16 = 0;
/// Maximum joint angle in degrees
pub const ANGLE_MAX: u16 = 180;
/// Startup angle for every joint (servo center)
pub const ANGLE_DEFAULT: u16 = 90;

/// The complete ordered set of joint target angles at one instant.
///
/// Construction validates every angle against the joint range, so a held
/// `PositionVector` is always transmittable. Equality is element-wise.
/// Serializes as a plain integer array, round-tripping exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "[u16; NUM_JOINTS]", into = "[u16; NUM_JOINTS]")]
pub struct PositionVector([u16; NUM_JOINTS]);

impl PositionVector {
    /// Create a position vector, rejecting any out-of-range angle.
    pub fn new(angles: [u16; NUM_JOINTS]) -> Result<Self> {
        for (joint, &angle) in angles.iter().enumerate() {
            if !(ANGLE_MIN..=ANGLE_MAX).contains(&angle) {
                return Err(Error::OutOfRange { joint, angle });
            }
        }
        Ok(Self(angles))
    }

    /// All joint angles in physical index order
    #[inline]
    #[must_use]
    pub fn angles(&self) -> [u16; NUM_JOINTS] {
        self.0
    }

    /// Angle of a single joint, `None` for an out-of-bounds index
    #[must_use]
    pub fn angle(&self, joint: usize) -> Option<u16> {
        self.0.get(joint).copied()
    }

    /// Iterate angles in physical index order
    pub fn iter(&self) -> impl Iterator<Item = u16> + '_ {
        self.0.iter().copied()
    }
}

impl Default for PositionVector {
    fn default() -> Self {
        Self([ANGLE_DEFAULT; NUM_JOINTS])
    }
}

impl TryFrom<[u16; NUM_JOINTS]> for PositionVector {
    type Error = Error;

    fn try_from(angles: [u16; NUM_JOINTS]) -> Result<Self> {
        Self::new(angles)
    }
}

impl From<PositionVector> for [u16; NUM_JOINTS] {
    fn from(v: PositionVector) -> Self {
        v.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_centered() {
        let v = PositionVector::default();
        assert!(v.iter().all(|a| a == ANGLE_DEFAULT));
    }

    #[test]
    fn test_out_of_range_rejected() {
        let mut angles = [90u16; NUM_JOINTS];
        angles[3] = 181;
        match PositionVector::new(angles) {
            Err(Error::OutOfRange { joint, angle }) => {
                assert_eq!(joint, 3);
                assert_eq!(angle, 181);
            }
            other => panic!("expected OutOfRange, got {:?}", other),
        }
    }

    #[test]
    fn test_equality_is_element_wise() {
        let a = PositionVector::new([0, 180, 0, 180, 0, 0, 180, 0]).unwrap();
        let b = PositionVector::new([0, 180, 0, 180, 0, 0, 180, 0]).unwrap();
        let c = PositionVector::new([0, 180, 0, 140, 0, 0, 180, 0]).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_serde_roundtrip_is_integer_exact() {
        let v = PositionVector::new([0, 45, 90, 135, 180, 90, 90, 90]).unwrap();
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, "[0,45,90,135,180,90,90,90]");
        let back: PositionVector = serde_json::from_str(&json).unwrap();
        assert_eq!(v, back);
    }

    #[test]
    fn test_serde_rejects_out_of_range() {
        let res: std::result::Result<PositionVector, _> =
            serde_json::from_str("[0,0,0,0,0,0,0,999]");
        assert!(res.is_err());
    }
}
