//! Angle newtypes.
//!
//! Spawn packets carry degrees, the physics state stores radians.
//! Keeping both as distinct types makes the conversion points explicit.

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// Angle in degrees.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize, Encode, Decode,
)]
pub struct Degree(pub f32);

/// Angle in radians.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize, Encode, Decode,
)]
pub struct Radian(pub f32);

impl Degree {
    #[inline]
    pub fn value(self) -> f32 {
        self.0
    }
}

impl Radian {
    #[inline]
    pub fn value(self) -> f32 {
        self.0
    }
}

impl From<Degree> for Radian {
    fn from(angle: Degree) -> Self {
        Radian(angle.0.to_radians())
    }
}

impl From<Radian> for Degree {
    fn from(angle: Radian) -> Self {
        Degree(angle.0.to_degrees())
    }
}

impl std::ops::Mul<f32> for Radian {
    type Output = Radian;
    fn mul(self, rhs: f32) -> Radian {
        Radian(self.0 * rhs)
    }
}

impl std::ops::Neg for Radian {
    type Output = Radian;
    fn neg(self) -> Radian {
        Radian(-self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degree_radian_roundtrip() {
        let angle = Degree(90.0);
        let radian: Radian = angle.into();
        assert!((radian.value() - std::f32::consts::FRAC_PI_2).abs() < 1e-6);

        let back: Degree = radian.into();
        assert!((back.value() - 90.0).abs() < 1e-4);
    }
}
