//! Least-squares midpoint triangulation (§4.2): the closest point to a
//! bundle of rays, via the weighted normal equations shared with iterative
//! refinement (§4.5).

use nalgebra::{Matrix3, Point3, Vector3};

use crate::error::{Result, TriangulateError};
use crate::gate;
use crate::linalg::{self, MIDPOINT_CONDITIONING_THRESHOLD};
use crate::types::{Bearing, GateParams, ThresholdBundle, TriangulationResult};

/// `M = Σ w_i (I - B_i B_iᵀ)` and `v = Σ w_i (I - B_i B_iᵀ) c_i`: the normal
/// equations for the weighted closest point to a bundle of rays. Weight 1.0
/// for every view recovers the plain midpoint of §4.2; variable per-view
/// weights implement the IRLS step of §4.5.
pub(crate) fn weighted_normal_equations(
    centers: &[Point3<f64>],
    bearings_world: &[Vector3<f64>],
    weights: &[f64],
) -> (Matrix3<f64>, Vector3<f64>) {
    let identity = Matrix3::identity();
    let mut m = Matrix3::zeros();
    let mut v = Vector3::zeros();
    for ((center, bearing), &weight) in centers.iter().zip(bearings_world).zip(weights) {
        let projector = identity - bearing * bearing.transpose();
        m += projector * weight;
        v += (projector * center.coords) * weight;
    }
    (m, v)
}

fn signed_depth(point: &Point3<f64>, center: &Point3<f64>, bearing: &Vector3<f64>) -> f64 {
    (*point - *center).dot(bearing)
}

/// The canonical, literal-signature entry point of spec §6. Callers must
/// uphold `centers.len() == bearings_world.len() == thresholds.len() >= 2`;
/// violating it trips a debug assertion rather than an `Err`.
pub fn triangulate_bearings_midpoint_unchecked(
    centers: &[Point3<f64>],
    bearings_world: &[Bearing],
    thresholds: &ThresholdBundle,
    gate_params: GateParams,
) -> TriangulationResult {
    debug_assert_eq!(centers.len(), bearings_world.len());
    debug_assert_eq!(centers.len(), thresholds.len());
    debug_assert!(centers.len() >= 2);

    let bearings_vec: Vec<Vector3<f64>> =
        bearings_world.iter().map(Bearing::as_unit_vector).collect();
    let weights = vec![1.0_f64; centers.len()];
    let (m, v) = weighted_normal_equations(centers, &bearings_vec, &weights);

    let Some((solution, sigma_min)) = linalg::solve_3x3(m, v) else {
        tracing::warn!("midpoint normal-equations SVD failed to converge");
        return TriangulationResult::Rejected;
    };
    if sigma_min < MIDPOINT_CONDITIONING_THRESHOLD {
        tracing::debug!(sigma_min, "midpoint system singular, rejecting");
        return TriangulationResult::Rejected;
    }
    let point = Point3::from(solution);

    let depths: Vec<f64> = centers
        .iter()
        .zip(&bearings_vec)
        .map(|(c, b)| signed_depth(&point, c, b))
        .collect();
    let residuals: Vec<f64> = centers
        .iter()
        .zip(&bearings_vec)
        .map(|(c, b)| gate::angular_residual(b, &(point - *c)))
        .collect();

    match gate::evaluate(&bearings_vec, &depths, &residuals, &gate_params, thresholds) {
        Ok(()) => TriangulationResult::Accepted(point),
        Err(failure) => {
            tracing::debug!(%failure, "midpoint triangulation rejected");
            TriangulationResult::Rejected
        }
    }
}

/// Checked entry point: validates the three input slices agree in length
/// and that there are at least two views before delegating to
/// [`triangulate_bearings_midpoint_unchecked`].
pub fn triangulate_bearings_midpoint(
    centers: &[Point3<f64>],
    bearings_world: &[Bearing],
    thresholds: &ThresholdBundle,
    gate_params: GateParams,
) -> Result<TriangulationResult> {
    if centers.len() != bearings_world.len() {
        return Err(TriangulateError::LengthMismatch {
            a_name: "centers",
            a_len: centers.len(),
            b_name: "bearings_world",
            b_len: bearings_world.len(),
        });
    }
    if centers.len() != thresholds.len() {
        return Err(TriangulateError::LengthMismatch {
            a_name: "centers",
            a_len: centers.len(),
            b_name: "thresholds",
            b_len: thresholds.len(),
        });
    }
    if centers.len() < 2 {
        return Err(TriangulateError::NotEnoughViews(centers.len()));
    }
    Ok(triangulate_bearings_midpoint_unchecked(
        centers,
        bearings_world,
        thresholds,
        gate_params,
    ))
}
