use std::fmt;
use std::ops::Sub;

use serde::{Deserialize, Serialize};

/// External marker identifier as reported by the motion-capture server.
pub type MarkerId = u32;

/// Label given to markers registered without one.
pub const DEFAULT_LABEL: &str = "unlabelled marker";

/// A single 3D sample. Non-finite components are accepted and simply
/// propagate through derived values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub const ORIGIN: Point3 = Point3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean length of the vector from the origin.
    #[inline]
    pub fn norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Euclidean distance between two samples.
    #[inline]
    pub fn distance_to(&self, other: &Point3) -> f64 {
        (*self - *other).norm()
    }
}

impl Sub for Point3 {
    type Output = Point3;

    fn sub(self, rhs: Point3) -> Point3 {
        Point3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl From<(f64, f64, f64)> for Point3 {
    fn from((x, y, z): (f64, f64, f64)) -> Self {
        Self::new(x, y, z)
    }
}

impl From<[f64; 3]> for Point3 {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl From<Point3> for (f64, f64, f64) {
    fn from(p: Point3) -> Self {
        (p.x, p.y, p.z)
    }
}

impl fmt::Display for Point3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3}, {:.3})", self.x, self.y, self.z)
    }
}

/// How far a history has filled its ring.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FillState {
    Empty,
    /// Holds this many points, fewer than capacity. Nothing overwritten yet.
    Partial(usize),
    /// Every slot holds data; each insert overwrites the oldest point.
    Full,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_is_component_wise() {
        let d = Point3::new(3.0, 5.0, -1.0) - Point3::new(1.0, 1.0, 1.0);
        assert_eq!(d, Point3::new(2.0, 4.0, -2.0));
    }

    #[test]
    fn distance_is_euclidean() {
        let a = Point3::new(1.0, 2.0, 3.0);
        let b = Point3::new(4.0, 6.0, 3.0);
        assert_eq!(a.distance_to(&b), 5.0);
    }

    #[test]
    fn nan_propagates() {
        let a = Point3::new(f64::NAN, 0.0, 0.0);
        assert!(a.distance_to(&Point3::ORIGIN).is_nan());
    }
}
