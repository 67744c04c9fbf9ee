//! Direct Linear Transform triangulation (§4.1): a homogeneous-coordinates
//! linear system solved by SVD, gated the same way as [`crate::midpoint`].

use nalgebra::{DMatrix, Point3, Vector3, Vector4};

use crate::error::{Result, TriangulateError};
use crate::gate::{self, angular_residual};
use crate::linalg::{self, DLT_DEGENERATE_SIGMA_NEXT, DLT_MIN_W};
use crate::types::{Bearing, GateParams, Pose, ThresholdBundle, TriangulationResult};

/// Stack two independent cross-product rows per view into the `(2N)×4`
/// system `A` such that `A·[X;1] = 0` expresses "`b_i` is parallel to
/// `R_i·X + t_i`" for every view.
fn build_system(poses: &[Pose], bearings: &[Bearing]) -> DMatrix<f64> {
    let n = poses.len();
    let mut a = DMatrix::<f64>::zeros(2 * n, 4);
    for (i, (pose, bearing)) in poses.iter().zip(bearings).enumerate() {
        let p = pose.as_rt_matrix();
        let b = bearing.as_unit_vector();
        let p_row = |r: usize| Vector4::new(p[(r, 0)], p[(r, 1)], p[(r, 2)], p[(r, 3)]);

        let row1 = b.y * p_row(2) - b.z * p_row(1);
        let row2 = b.z * p_row(0) - b.x * p_row(2);
        a.row_mut(2 * i).copy_from(&row1.transpose());
        a.row_mut(2 * i + 1).copy_from(&row2.transpose());
    }
    a
}

/// The canonical, literal-signature entry point of spec §6. Callers must
/// uphold `poses.len() == bearings.len() >= 2`; violating it trips a debug
/// assertion rather than an `Err`, per the crate's taxonomy of size
/// mismatches as caller bugs rather than runtime conditions.
pub fn triangulate_bearings_dlt_unchecked(
    poses: &[Pose],
    bearings: &[Bearing],
    tau: f64,
    gate_params: GateParams,
) -> TriangulationResult {
    debug_assert_eq!(poses.len(), bearings.len());
    debug_assert!(poses.len() >= 2);

    let n = poses.len();
    let a = build_system(poses, bearings);
    let Some((solution, sigma_min, sigma_next)) = linalg::homogeneous_solve_4(a) else {
        tracing::warn!("DLT SVD failed to converge");
        return TriangulationResult::Rejected;
    };

    if sigma_next < DLT_DEGENERATE_SIGMA_NEXT {
        tracing::debug!(sigma_min, sigma_next, "DLT system degenerate, rejecting");
        return TriangulationResult::Rejected;
    }

    let w = solution.w;
    if w.abs() < DLT_MIN_W {
        tracing::debug!(w, "DLT dehomogenization failed (near-zero w)");
        return TriangulationResult::Rejected;
    }
    let point = Point3::new(solution.x / w, solution.y / w, solution.z / w);

    let bearings_world: Vec<Vector3<f64>> = poses
        .iter()
        .zip(bearings)
        .map(|(pose, b)| pose.camera_to_world_direction(&b.as_unit_vector()))
        .collect();

    let mut depths = Vec::with_capacity(n);
    let mut residuals = Vec::with_capacity(n);
    for (pose, bearing) in poses.iter().zip(bearings) {
        let predicted = pose.world_to_camera(&point);
        depths.push(predicted.z);
        residuals.push(angular_residual(&bearing.as_unit_vector(), &predicted));
    }

    let thresholds = ThresholdBundle::broadcast(tau, n);
    match gate::evaluate(&bearings_world, &depths, &residuals, &gate_params, &thresholds) {
        Ok(()) => TriangulationResult::Accepted(point),
        Err(failure) => {
            tracing::debug!(%failure, "DLT triangulation rejected");
            TriangulationResult::Rejected
        }
    }
}

/// Checked entry point: validates `poses.len() == bearings.len() >= 2`
/// before delegating to [`triangulate_bearings_dlt_unchecked`].
pub fn triangulate_bearings_dlt(
    poses: &[Pose],
    bearings: &[Bearing],
    tau: f64,
    gate_params: GateParams,
) -> Result<TriangulationResult> {
    if poses.len() != bearings.len() {
        return Err(TriangulateError::LengthMismatch {
            a_name: "poses",
            a_len: poses.len(),
            b_name: "bearings",
            b_len: bearings.len(),
        });
    }
    if poses.len() < 2 {
        return Err(TriangulateError::NotEnoughViews(poses.len()));
    }
    Ok(triangulate_bearings_dlt_unchecked(poses, bearings, tau, gate_params))
}
