//! Reprojection-error bookkeeping over an already-accepted triangulation,
//! mirroring the teacher crate's `PointWorldFrameWithSumReprojError` /
//! `MultiCameraSystem::find3d_and_cum_reproj_dist`. Pure bookkeeping over
//! quantities the acceptance gate already computes — not a new algorithm,
//! so it does not conflict with any Non-goal.

use nalgebra::{Point3, Vector3};

use crate::gate::angular_residual;
use crate::types::{Bearing, Pose};

/// Per-view angular reprojection residuals for an accepted point, plus their
/// sum and mean, using the same `1 - cos(err)` convention as the
/// reprojection gate (§4.1/§4.2).
#[derive(Debug, Clone, PartialEq)]
pub struct TriangulationReport {
    pub point: Point3<f64>,
    pub reprojection_residuals: Vec<f64>,
    pub sum_reprojection_residual: f64,
    pub mean_reprojection_residual: f64,
}

impl TriangulationReport {
    fn new(point: Point3<f64>, residuals: Vec<f64>) -> Self {
        let sum: f64 = residuals.iter().sum();
        let mean = sum / residuals.len() as f64;
        Self {
            point,
            reprojection_residuals: residuals,
            sum_reprojection_residual: sum,
            mean_reprojection_residual: mean,
        }
    }

    /// Report for an accepted DLT point: reprojects `point` into each
    /// camera's local frame via its pose and compares against the observed
    /// bearing.
    pub fn for_dlt(point: Point3<f64>, poses: &[Pose], bearings: &[Bearing]) -> Self {
        let residuals = poses
            .iter()
            .zip(bearings)
            .map(|(pose, bearing)| {
                let predicted = pose.world_to_camera(&point);
                angular_residual(&bearing.as_unit_vector(), &predicted)
            })
            .collect();
        Self::new(point, residuals)
    }

    /// Report for an accepted midpoint-family point: compares each
    /// world-frame bearing against the direction from its camera center to
    /// `point`.
    pub fn for_midpoint(point: Point3<f64>, centers: &[Point3<f64>], bearings_world: &[Bearing]) -> Self {
        let residuals = centers
            .iter()
            .zip(bearings_world)
            .map(|(center, bearing)| {
                let predicted: Vector3<f64> = point - center;
                angular_residual(&bearing.as_unit_vector(), &predicted)
            })
            .collect();
        Self::new(point, residuals)
    }
}
