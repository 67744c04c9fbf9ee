//! Vectorized two-view midpoint triangulation (§4.3): a tight inner loop —
//! closed-form per row, no SVD and no heap allocation per correspondence.

use nalgebra::{Matrix3, Point3, Vector3};

use crate::error::{Result, TriangulateError};
use crate::types::TriangulationResult;

/// Closed-form two-ray closest point: minimizes `‖(c1 + s·b1) - (c2 +
/// r·b2)‖²` by solving the 2×2 normal equations for `(s, r)` (the standard
/// line-line closest-point formula), then returns the midpoint of the two
/// closest points together with whether both `s` and `r` came out positive
/// (positive depth in both views).
fn two_ray_midpoint(
    c1: &Vector3<f64>,
    b1: &Vector3<f64>,
    c2: &Vector3<f64>,
    b2: &Vector3<f64>,
) -> (bool, Point3<f64>) {
    let w0 = c1 - c2;
    let a = b1.dot(b1);
    let b = b1.dot(b2);
    let c = b2.dot(b2);
    let d = b1.dot(&w0);
    let e = b2.dot(&w0);

    let denom = a * c - b * b;
    if denom.abs() < 1e-12 {
        // Near-parallel rays: no well-conditioned closest-point pair.
        return (false, Point3::origin());
    }
    let s = (b * e - c * d) / denom;
    let r = (a * e - b * d) / denom;

    let p1 = c1 + b1 * s;
    let p2 = c2 + b2 * r;
    let midpoint = Point3::from((p1 + p2) * 0.5);
    (s > 0.0 && r > 0.0, midpoint)
}

/// The canonical, literal-signature entry point of spec §6. Callers must
/// uphold `bearings1.len() == bearings2.len()`; violating it trips a debug
/// assertion rather than an `Err`.
pub fn triangulate_two_bearings_midpoint_many_unchecked(
    bearings1: &[Vector3<f64>],
    bearings2: &[Vector3<f64>],
    relative_rotation: &Matrix3<f64>,
    relative_translation: &Vector3<f64>,
) -> Vec<TriangulationResult> {
    debug_assert_eq!(bearings1.len(), bearings2.len());

    let c1 = Vector3::zeros();
    let c2 = *relative_translation;
    bearings1
        .iter()
        .zip(bearings2)
        .map(|(b1, b2)| {
            let b2_in_frame1 = relative_rotation * b2;
            let (positive_depth, point) = two_ray_midpoint(&c1, b1, &c2, &b2_in_frame1);
            if positive_depth {
                TriangulationResult::Accepted(point)
            } else {
                TriangulationResult::Rejected
            }
        })
        .collect()
}

/// Checked entry point: validates `bearings1.len() == bearings2.len()`
/// before delegating to [`triangulate_two_bearings_midpoint_many_unchecked`].
pub fn triangulate_two_bearings_midpoint_many(
    bearings1: &[Vector3<f64>],
    bearings2: &[Vector3<f64>],
    relative_rotation: &Matrix3<f64>,
    relative_translation: &Vector3<f64>,
) -> Result<Vec<TriangulationResult>> {
    if bearings1.len() != bearings2.len() {
        return Err(TriangulateError::LengthMismatch {
            a_name: "bearings1",
            a_len: bearings1.len(),
            b_name: "bearings2",
            b_len: bearings2.len(),
        });
    }
    Ok(triangulate_two_bearings_midpoint_many_unchecked(
        bearings1,
        bearings2,
        relative_rotation,
        relative_translation,
    ))
}
