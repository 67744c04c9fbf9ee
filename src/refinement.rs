//! Iterative reweighted point refinement (§4.5): re-solves the weighted
//! midpoint normal equations of [`crate::midpoint`] each iteration, with
//! weights drawn from the current perpendicular residual. Returns a point
//! unconditionally — there is no acceptance gate here, the caller owns
//! validation.

use nalgebra::{Point3, Vector3};

use crate::error::{Result, TriangulateError};
use crate::linalg;
use crate::midpoint::weighted_normal_equations;
use crate::types::Bearing;

/// Residual weights are clamped above this floor to prevent explosion as a
/// ray's perpendicular residual approaches zero (spec §9, "Weight clamping
/// in refinement").
const WEIGHT_FLOOR: f64 = 1e-12;

/// Iteration stops early once a step falls below this tolerance.
const CONVERGENCE_TOLERANCE: f64 = 1e-12;

fn perpendicular_residual(point: &Point3<f64>, center: &Point3<f64>, bearing: &Vector3<f64>) -> f64 {
    let d = *point - *center;
    let parallel = bearing * bearing.dot(&d);
    (d - parallel).norm()
}

/// The canonical, literal-signature entry point of spec §6. Callers must
/// uphold `centers.len() == bearings_world.len() >= 2`; violating it trips
/// a debug assertion rather than an `Err`.
pub fn point_refinement_unchecked(
    centers: &[Point3<f64>],
    bearings_world: &[Bearing],
    initial: Point3<f64>,
    max_iters: u32,
) -> Point3<f64> {
    debug_assert_eq!(centers.len(), bearings_world.len());
    debug_assert!(centers.len() >= 2);

    let bearings_vec: Vec<Vector3<f64>> =
        bearings_world.iter().map(Bearing::as_unit_vector).collect();

    let mut current = initial;
    for _ in 0..max_iters {
        let weights: Vec<f64> = centers
            .iter()
            .zip(&bearings_vec)
            .map(|(c, b)| 1.0 / perpendicular_residual(&current, c, b).max(WEIGHT_FLOOR))
            .collect();

        let (m, v) = weighted_normal_equations(centers, &bearings_vec, &weights);
        let Some((solution, sigma_min)) = linalg::solve_3x3(m, v) else {
            tracing::warn!("refinement SVD failed to converge, keeping previous estimate");
            break;
        };
        if sigma_min < linalg::MIDPOINT_CONDITIONING_THRESHOLD {
            tracing::debug!(sigma_min, "refinement system singular, keeping previous estimate");
            break;
        }

        let next = Point3::from(solution);
        let step = (next - current).norm();
        current = next;
        if step < CONVERGENCE_TOLERANCE {
            break;
        }
    }
    current
}

/// Checked entry point: validates `centers.len() == bearings_world.len() >=
/// 2` before delegating to [`point_refinement_unchecked`].
pub fn point_refinement(
    centers: &[Point3<f64>],
    bearings_world: &[Bearing],
    initial: Point3<f64>,
    max_iters: u32,
) -> Result<Point3<f64>> {
    if centers.len() != bearings_world.len() {
        return Err(TriangulateError::LengthMismatch {
            a_name: "centers",
            a_len: centers.len(),
            b_name: "bearings_world",
            b_len: bearings_world.len(),
        });
    }
    if centers.len() < 2 {
        return Err(TriangulateError::NotEnoughViews(centers.len()));
    }
    Ok(point_refinement_unchecked(centers, bearings_world, initial, max_iters))
}
