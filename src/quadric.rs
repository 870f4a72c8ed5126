//! Quadric error metric.
//!
//! A quadric stores the error function `E(p) = pᵀAp + 2bᵀp + c` of a sum of
//! squared point-to-plane distances. The 4x4 matrix is symmetric, so only its
//! 10 upper-triangular coefficients are kept.

use std::ops::{Add, AddAssign};

use nalgebra::{Point3, Vector3};

/// A packed symmetric 4x4 quadric.
///
/// Coefficient layout for the plane `ax + by + cz + d = 0`:
///
/// ```text
/// | aa ab ac ad |     | 0 1 2 3 |
/// | ab bb bc bd |  =  | 1 4 5 6 |
/// | ac bc cc cd |     | 2 5 7 8 |
/// | ad bd cd dd |     | 3 6 8 9 |
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Quadric {
    data: [f64; 10],
}

impl Quadric {
    /// The zero quadric (no error anywhere).
    pub const ZERO: Quadric = Quadric { data: [0.0; 10] };

    /// Create a quadric from a plane `n · p + d = 0`.
    ///
    /// `normal` is expected to have unit length.
    pub fn from_plane(normal: &Vector3<f64>, distance: f64) -> Self {
        let (a, b, c, d) = (normal.x, normal.y, normal.z, distance);
        Self {
            data: [
                a * a,
                a * b,
                a * c,
                a * d,
                b * b,
                b * c,
                b * d,
                c * c,
                c * d,
                d * d,
            ],
        }
    }

    /// Raw coefficients in packed order.
    pub fn coefficients(&self) -> &[f64; 10] {
        &self.data
    }

    /// Evaluate the error at `p`, i.e. `vᵀQv` with `v = [x, y, z, 1]`.
    pub fn evaluate(&self, p: &Point3<f64>) -> f64 {
        let q = &self.data;
        let (x, y, z) = (p.x, p.y, p.z);

        q[0] * x * x
            + 2.0 * q[1] * x * y
            + 2.0 * q[2] * x * z
            + 2.0 * q[3] * x
            + q[4] * y * y
            + 2.0 * q[5] * y * z
            + 2.0 * q[6] * y
            + q[7] * z * z
            + 2.0 * q[8] * z
            + q[9]
    }
}

impl AddAssign for Quadric {
    fn add_assign(&mut self, other: Quadric) {
        for (a, b) in self.data.iter_mut().zip(other.data.iter()) {
            *a += b;
        }
    }
}

impl Add for Quadric {
    type Output = Quadric;

    fn add(mut self, other: Quadric) -> Quadric {
        self += other;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quadric_from_plane() {
        // Plane z = 0
        let q = Quadric::from_plane(&Vector3::z(), 0.0);

        assert!(q.evaluate(&Point3::origin()).abs() < 1e-10);
        assert!((q.evaluate(&Point3::new(0.0, 0.0, 1.0)) - 1.0).abs() < 1e-10);
        assert!((q.evaluate(&Point3::new(5.0, 3.0, 2.0)) - 4.0).abs() < 1e-10);
    }

    #[test]
    fn test_quadric_offset_plane() {
        // Plane x = 2, written as x - 2 = 0
        let q = Quadric::from_plane(&Vector3::x(), -2.0);
        assert!(q.evaluate(&Point3::new(2.0, 7.0, -1.0)).abs() < 1e-10);
        assert!((q.evaluate(&Point3::new(5.0, 0.0, 0.0)) - 9.0).abs() < 1e-10);
    }

    #[test]
    fn test_quadric_addition() {
        let q1 = Quadric::from_plane(&Vector3::x(), 0.0);
        let q2 = Quadric::from_plane(&Vector3::y(), 0.0);

        let q = q1 + q2;

        // x² + y²
        assert!((q.evaluate(&Point3::new(3.0, 4.0, 0.0)) - 25.0).abs() < 1e-10);
    }

    #[test]
    fn test_quadric_additivity_matches_sum_of_evaluations() {
        let n1 = Vector3::new(1.0, 2.0, 2.0) / 3.0;
        let n2 = Vector3::new(0.0, 0.6, -0.8);
        let q1 = Quadric::from_plane(&n1, 1.5);
        let q2 = Quadric::from_plane(&n2, -0.25);

        for p in [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, -2.0, 3.5),
            Point3::new(-7.25, 0.5, 10.0),
        ] {
            let combined = (q1 + q2).evaluate(&p);
            let separate = q1.evaluate(&p) + q2.evaluate(&p);
            assert!((combined - separate).abs() < 1e-9 * (1.0 + separate.abs()));
        }
    }

    #[test]
    fn test_add_assign_is_commutative() {
        let q1 = Quadric::from_plane(&Vector3::x(), 1.0);
        let q2 = Quadric::from_plane(&Vector3::z(), -3.0);

        let mut a = Quadric::ZERO;
        a += q1;
        a += q2;
        let mut b = Quadric::ZERO;
        b += q2;
        b += q1;

        assert_eq!(a, b);
        assert_eq!(a, q1 + q2);
    }
}
