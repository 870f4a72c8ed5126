//! Small vector helpers shared by the simplifier.
//!
//! Addition, subtraction, dot and cross products come straight from
//! `nalgebra`. Normalization here deliberately divides by the Euclidean norm
//! without a zero-length guard: a degenerate edge or face yields a non-finite
//! vector, and callers reject any collapse whose test value is not finite.

use nalgebra::{Point3, Vector3};

/// Divide `v` by its Euclidean norm.
///
/// A zero vector produces NaN components.
#[inline]
pub fn normalize(v: Vector3<f64>) -> Vector3<f64> {
    v / v.norm()
}

/// Unit vector pointing from `from` to `to`.
#[inline]
pub fn unit_direction(from: &Point3<f64>, to: &Point3<f64>) -> Vector3<f64> {
    normalize(to - from)
}

/// Unit normal of the triangle `(p0, p1, p2)` with counter-clockwise winding.
#[inline]
pub fn triangle_normal(p0: &Point3<f64>, p1: &Point3<f64>, p2: &Point3<f64>) -> Vector3<f64> {
    normalize((p1 - p0).cross(&(p2 - p0)))
}

/// Returns `true` if every component of `v` is finite.
#[inline]
pub fn is_finite(v: &Vector3<f64>) -> bool {
    v.iter().all(|c| c.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        let n = normalize(Vector3::new(3.0, 0.0, 4.0));
        assert!((n.norm() - 1.0).abs() < 1e-12);
        assert!((n.x - 0.6).abs() < 1e-12);
        assert!((n.z - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_zero_is_not_finite() {
        let n = normalize(Vector3::zeros());
        assert!(!is_finite(&n));
    }

    #[test]
    fn test_triangle_normal_ccw() {
        let n = triangle_normal(
            &Point3::new(0.0, 0.0, 0.0),
            &Point3::new(1.0, 0.0, 0.0),
            &Point3::new(0.0, 1.0, 0.0),
        );
        assert!((n - Vector3::z()).norm() < 1e-12);
    }

    #[test]
    fn test_triangle_normal_degenerate() {
        let p = Point3::new(1.0, 2.0, 3.0);
        let n = triangle_normal(&p, &p, &Point3::new(2.0, 2.0, 3.0));
        assert!(!is_finite(&n));
    }

    #[test]
    fn test_unit_direction() {
        let d = unit_direction(&Point3::new(1.0, 1.0, 1.0), &Point3::new(1.0, 1.0, 6.0));
        assert!((d - Vector3::z()).norm() < 1e-12);
    }
}
