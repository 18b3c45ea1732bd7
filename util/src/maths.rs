//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::{Matrix3, UnitQuaternion, Vector3};
use num_traits::Float;

/// Clamp a value between a minimum and a maximum.
///
/// Unlike `f64::clamp` this does not panic if `min > max`, `max` wins.
pub fn clamp<T>(value: &T, min: &T, max: &T) -> T
where
    T: Float
{
    let mut ret = *value;

    if ret < *min {
        ret = *min
    }
    if ret > *max {
        ret = *max
    }

    ret
}

/// Smooth Hermite step between 0 (at `edge_0`) and 1 (at `edge_1`).
pub fn smoothstep<T>(edge_0: T, edge_1: T, value: T) -> T
where
    T: Float
{
    let zero = T::zero();
    let one = T::one();
    let two = one + one;
    let three = two + one;

    if edge_1 <= edge_0 {
        return if value < edge_0 { zero } else { one };
    }

    let x = clamp(&((value - edge_0) / (edge_1 - edge_0)), &zero, &one);

    x * x * (three - two * x)
}

/// The skew symmetric (cross product) matrix of a vector, such that
/// `skew_symmetric(a) * b == a.cross(&b)`.
pub fn skew_symmetric(v: &Vector3<f64>) -> Matrix3<f64> {
    Matrix3::new(
        0.0, -v.z, v.y,
        v.z, 0.0, -v.x,
        -v.y, v.x, 0.0
    )
}

/// Get the roll, pitch and yaw of an attitude.
pub fn rpy(q: &UnitQuaternion<f64>) -> Vector3<f64> {
    let (roll, pitch, yaw) = q.euler_angles();
    Vector3::new(roll, pitch, yaw)
}

/// The attitude with the yaw removed, which rotates vectors from a body
/// frame into the yaw aligned, gravity levelled frame.
pub fn roll_pitch_only(q: &UnitQuaternion<f64>) -> UnitQuaternion<f64> {
    let (roll, pitch, _) = q.euler_angles();
    UnitQuaternion::from_euler_angles(roll, pitch, 0.0)
}

/// True if every element of the vector is finite.
pub fn all_finite(v: &[f64]) -> bool {
    v.iter().all(|x| x.is_finite())
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::FRAC_PI_4;

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(&2.0, &-1.0, &1.0), 1.0);
        assert_eq!(clamp(&-2.0, &-1.0, &1.0), -1.0);
        assert_eq!(clamp(&0.3, &-1.0, &1.0), 0.3);

        // Inverted bounds don't panic
        assert_eq!(clamp(&0.0, &1.0, &-1.0), -1.0);
    }

    #[test]
    fn test_smoothstep() {
        assert_eq!(smoothstep(0.0, 0.1, -1.0), 0.0);
        assert_eq!(smoothstep(0.0, 0.1, 0.0), 0.0);
        assert_eq!(smoothstep(0.0, 0.1, 0.1), 1.0);
        assert_eq!(smoothstep(0.0, 0.1, 5.0), 1.0);
        assert!((smoothstep(0.0, 0.1, 0.05) - 0.5).abs() < 1e-12);

        // Degenerate edges act as a hard step
        assert_eq!(smoothstep(0.2, 0.2, 0.1), 0.0);
        assert_eq!(smoothstep(0.2, 0.2, 0.3), 1.0);
    }

    #[test]
    fn test_skew_symmetric() {
        let a = Vector3::new(1.0, -2.0, 0.5);
        let b = Vector3::new(0.3, 4.0, -1.0);

        assert!((skew_symmetric(&a) * b - a.cross(&b)).norm() < 1e-12);
    }

    #[test]
    fn test_roll_pitch_only() {
        let q = UnitQuaternion::from_euler_angles(0.1, -0.2, FRAC_PI_4);
        let rp = rpy(&roll_pitch_only(&q));

        assert!((rp - Vector3::new(0.1, -0.2, 0.0)).norm() < 1e-12);
        assert!((rpy(&q).z - FRAC_PI_4).abs() < 1e-12);
    }
}
