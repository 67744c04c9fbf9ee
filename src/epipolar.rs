//! Batched epipolar-angle evaluation (§4.4): a pure geometric consistency
//! score between two bearing sets under a fixed relative pose. No
//! acceptance gate of its own — callers compose it with the triangulators
//! when a consistency threshold is needed.

use nalgebra::{DMatrix, Matrix3, Vector3};

/// Below this norm, the epipolar plane normal `t × b` is undefined — the
/// bearing is collinear with the baseline — and the residual is defined as
/// 0 per spec §4.4.
const EPIPOLAR_NORMAL_CONDITIONING: f64 = 1e-12;

fn epipolar_residual(b1: &Vector3<f64>, b2_in_frame1: &Vector3<f64>, t: &Vector3<f64>) -> f64 {
    let n = t.cross(b2_in_frame1);
    let norm = n.norm();
    if norm < EPIPOLAR_NORMAL_CONDITIONING {
        tracing::trace!("epipolar normal undefined (bearing collinear with baseline)");
        return 0.0;
    }
    let n_hat = n / norm;
    let b1_norm = b1.norm();
    if b1_norm < f64::EPSILON {
        return 0.0;
    }
    (b1.dot(&n_hat) / b1_norm).clamp(-1.0, 1.0).asin().abs()
}

/// For every `(i, j)`, transform `bearings2[j]` into camera 1's frame via
/// `relative_rotation` and measure the out-of-plane angle of `bearings1[i]`
/// relative to the epipolar plane spanned by that transformed bearing and
/// `relative_translation`.
pub fn epipolar_angle_two_bearings_many(
    bearings1: &[Vector3<f64>],
    bearings2: &[Vector3<f64>],
    relative_rotation: &Matrix3<f64>,
    relative_translation: &Vector3<f64>,
) -> DMatrix<f64> {
    let rotated2: Vec<Vector3<f64>> = bearings2.iter().map(|b| relative_rotation * b).collect();
    DMatrix::from_fn(bearings1.len(), bearings2.len(), |i, j| {
        epipolar_residual(&bearings1[i], &rotated2[j], relative_translation)
    })
}
