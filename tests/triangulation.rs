//! End-to-end scenarios and cross-cutting invariants for the triangulation
//! core, covering the seven literal scenarios and the eight numbered
//! invariants of the specification's testable-properties section.

use nalgebra::{Matrix3, Point3, Rotation3, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use braid_triangulate::{
    epipolar_angle_two_bearings_many, point_refinement, triangulate_bearings_dlt,
    triangulate_bearings_midpoint, triangulate_two_bearings_midpoint_many, Bearing, GateParams,
    Pose, ThresholdBundle,
};

const TAU: f64 = 0.01;
fn alpha_min() -> f64 {
    2.0_f64.to_radians()
}
const D_MIN: f64 = 1e-6;

fn poses_for(centers: &[Point3<f64>]) -> Vec<Pose> {
    centers
        .iter()
        .map(|c| Pose::from_rotation_and_center(Matrix3::identity(), *c))
        .collect()
}

fn bearings_for(centers: &[Point3<f64>], truth: &Point3<f64>) -> Vec<Bearing> {
    centers.iter().map(|c| Bearing::new(truth - c)).collect()
}

fn perturb(bearing: &Bearing, eta: f64, rng: &mut StdRng) -> Bearing {
    let v = bearing.as_unit_vector();
    let noise = Vector3::new(
        rng.random_range(-eta..eta),
        rng.random_range(-eta..eta),
        rng.random_range(-eta..eta),
    );
    Bearing::new(v + noise)
}

/// Scenario 1: two cameras, axis-aligned.
#[test]
fn scenario_1_two_cameras_axis_aligned() {
    let truth = Point3::new(0.0, 0.0, 1.0);
    let centers = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)];
    let poses = poses_for(&centers);
    let bearings = bearings_for(&centers, &truth);
    let gate = GateParams::new(alpha_min(), D_MIN);

    let dlt = triangulate_bearings_dlt(&poses, &bearings, TAU, gate).unwrap();
    assert!(dlt.accepted());
    assert!((dlt.point().unwrap() - truth).norm() < 1e-6);

    let thresholds = ThresholdBundle::broadcast(TAU, centers.len());
    let mid = triangulate_bearings_midpoint(&centers, &bearings, &thresholds, gate).unwrap();
    assert!(mid.accepted());
    assert!((mid.point().unwrap() - truth).norm() < 1e-6);
}

/// Scenario 2: five cameras on a short baseline, clean and with noise.
#[test]
fn scenario_2_five_cameras_short_baseline() {
    let truth = Point3::new(0.0, 0.0, 1.0);
    let centers: Vec<Point3<f64>> = (0..5)
        .map(|i| Point3::new(0.1 * i as f64, 0.02 * i as f64, 0.0))
        .collect();
    let poses = poses_for(&centers);
    let bearings = bearings_for(&centers, &truth);
    let gate = GateParams::new(alpha_min(), D_MIN);
    let thresholds = ThresholdBundle::broadcast(TAU, centers.len());

    let dlt = triangulate_bearings_dlt(&poses, &bearings, TAU, gate).unwrap();
    assert!(dlt.accepted());
    assert!((dlt.point().unwrap() - truth).norm() < 1e-6);

    let mid = triangulate_bearings_midpoint(&centers, &bearings, &thresholds, gate).unwrap();
    assert!(mid.accepted());
    assert!((mid.point().unwrap() - truth).norm() < 1e-6);

    let mut rng = StdRng::seed_from_u64(0xB6A1D);
    let eta = 1e-3;
    let noisy_bearings: Vec<Bearing> = bearings.iter().map(|b| perturb(b, eta, &mut rng)).collect();

    let gate_loose = GateParams::new(alpha_min(), D_MIN);
    let thresholds_loose = ThresholdBundle::broadcast(0.05, centers.len());
    let dlt_noisy = triangulate_bearings_dlt(&poses, &noisy_bearings, 0.05, gate_loose).unwrap();
    assert!(dlt_noisy.accepted());
    assert!((dlt_noisy.point().unwrap() - truth).norm() < 1e-2);

    let mid_noisy =
        triangulate_bearings_midpoint(&centers, &noisy_bearings, &thresholds_loose, gate_loose)
            .unwrap();
    assert!(mid_noisy.accepted());
    assert!((mid_noisy.point().unwrap() - truth).norm() < 1e-2);
}

/// Scenario 3: three cameras, two sharing a center.
#[test]
fn scenario_3_partial_coincidence() {
    let truth = Point3::new(0.0, 0.0, 1.0);
    let centers = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
    ];
    let poses = poses_for(&centers);
    let bearings = bearings_for(&centers, &truth);
    let gate = GateParams::new(alpha_min(), D_MIN);
    let thresholds = ThresholdBundle::broadcast(TAU, centers.len());

    let dlt = triangulate_bearings_dlt(&poses, &bearings, TAU, gate).unwrap();
    assert!(dlt.accepted());
    assert!((dlt.point().unwrap() - truth).norm() < 1e-6);

    let mid = triangulate_bearings_midpoint(&centers, &bearings, &thresholds, gate).unwrap();
    assert!(mid.accepted());
    assert!((mid.point().unwrap() - truth).norm() < 1e-6);
}

/// Scenario 4: two cameras with identical centers and distinct bearings.
#[test]
fn scenario_4_coincident_centers_reject_then_diagnostic() {
    let center = Point3::new(1.0, 0.0, 0.0);
    let centers = vec![center, center];
    let poses = poses_for(&centers);
    let bearings = vec![
        Bearing::new(Vector3::new(0.0, 0.0, 1.0)),
        Bearing::new(Vector3::new(1.0, 0.0, 0.0)),
    ];
    let thresholds = ThresholdBundle::broadcast(TAU, centers.len());

    let gate_reject = GateParams::new(alpha_min(), D_MIN);
    let dlt = triangulate_bearings_dlt(&poses, &bearings, TAU, gate_reject).unwrap();
    assert!(!dlt.accepted());
    let mid = triangulate_bearings_midpoint(&centers, &bearings, &thresholds, gate_reject).unwrap();
    assert!(!mid.accepted());

    let gate_diagnostic = GateParams::new(alpha_min(), -1e-6);
    let mid_diag =
        triangulate_bearings_midpoint(&centers, &bearings, &thresholds, gate_diagnostic).unwrap();
    assert!(mid_diag.accepted());
    assert!((mid_diag.point().unwrap() - center).norm() < 1e-6);
}

fn relative_pose() -> (Matrix3<f64>, Vector3<f64>) {
    let rotation = Rotation3::from_axis_angle(&Vector3::y_axis(), 0.1).into_inner();
    let translation = Vector3::new(-1.0, 2.0, 0.2);
    (rotation, translation)
}

fn two_view_bearings(truths: &[Point3<f64>], rotation: &Matrix3<f64>, translation: &Vector3<f64>) -> (Vec<Vector3<f64>>, Vec<Vector3<f64>>) {
    let bearings1: Vec<Vector3<f64>> = truths.iter().map(|p| p.coords.normalize()).collect();
    let bearings2: Vec<Vector3<f64>> = truths
        .iter()
        .map(|p| (rotation.transpose() * (p.coords - translation)).normalize())
        .collect();
    (bearings1, bearings2)
}

/// Scenario 5: two-view batched midpoint over two points.
#[test]
fn scenario_5_two_view_batched_midpoint() {
    let truths = [Point3::new(0.0, 0.0, 1.0), Point3::new(1.0, 2.0, 3.0)];
    let (rotation, translation) = relative_pose();
    let (bearings1, bearings2) = two_view_bearings(&truths, &rotation, &translation);

    let results =
        triangulate_two_bearings_midpoint_many(&bearings1, &bearings2, &rotation, &translation)
            .unwrap();
    for (result, truth) in results.iter().zip(&truths) {
        assert!(result.accepted());
        assert!((result.point().unwrap() - truth).norm() < 1e-6);
    }

    let mut rng = StdRng::seed_from_u64(0xF00D);
    let eta = 1e-3;
    let noisy1: Vec<Vector3<f64>> = bearings1
        .iter()
        .map(|b| {
            let noise = Vector3::new(
                rng.random_range(-eta..eta),
                rng.random_range(-eta..eta),
                rng.random_range(-eta..eta),
            );
            (b + noise).normalize()
        })
        .collect();
    let noisy2: Vec<Vector3<f64>> = bearings2
        .iter()
        .map(|b| {
            let noise = Vector3::new(
                rng.random_range(-eta..eta),
                rng.random_range(-eta..eta),
                rng.random_range(-eta..eta),
            );
            (b + noise).normalize()
        })
        .collect();
    let noisy_results =
        triangulate_two_bearings_midpoint_many(&noisy1, &noisy2, &rotation, &translation).unwrap();
    for (result, truth) in noisy_results.iter().zip(&truths) {
        assert!(result.accepted());
        assert!((result.point().unwrap() - truth).norm() < 1e-2);
    }
}

/// Scenario 6: epipolar angle matrix over the scenario-5 geometry.
#[test]
fn scenario_6_epipolar_angle_matrix() {
    let truths = [Point3::new(0.0, 0.0, 1.0), Point3::new(1.0, 2.0, 3.0)];
    let (rotation, translation) = relative_pose();
    let (bearings1, bearings2) = two_view_bearings(&truths, &rotation, &translation);

    let m = epipolar_angle_two_bearings_many(&bearings1, &bearings2, &rotation, &translation);
    for i in 0..truths.len() {
        assert!(m[(i, i)] <= 1e-6, "diagonal[{i}] = {}", m[(i, i)]);
    }
    for i in 0..truths.len() {
        for j in 0..truths.len() {
            if i != j {
                assert!(m[(i, j)] > 1e-6, "off-diagonal[{i},{j}] = {}", m[(i, j)]);
            }
        }
    }
}

/// Scenario 7: refinement from a perturbed initial estimate.
#[test]
fn scenario_7_refinement_converges() {
    let truth = Point3::new(0.0, 0.0, 1.0);
    let centers = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)];
    let bearings = bearings_for(&centers, &truth);

    let initial = truth + Vector3::new(0.1, 0.2, 0.3);
    let refined = point_refinement(&centers, &bearings, initial, 10).unwrap();
    assert!((refined - truth).norm() < 1e-6);
}

/// P6: partial coincidence with >2 distinct centers and noise still
/// triangulates within tolerance for both solvers.
#[test]
fn p6_partial_coincidence_with_noise() {
    let truth = Point3::new(0.2, -0.1, 2.0);
    let centers = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(0.5, 0.3, 0.0),
        Point3::new(-0.4, 0.2, 0.1),
    ];
    let poses = poses_for(&centers);
    let bearings = bearings_for(&centers, &truth);
    let gate = GateParams::new(alpha_min(), D_MIN);
    let thresholds = ThresholdBundle::broadcast(TAU, centers.len());

    let dlt = triangulate_bearings_dlt(&poses, &bearings, TAU, gate).unwrap();
    assert!(dlt.accepted());
    let mid = triangulate_bearings_midpoint(&centers, &bearings, &thresholds, gate).unwrap();
    assert!(mid.accepted());
    assert!((mid.point().unwrap() - truth).norm() < 1e-6);
}

/// Input-size mismatches are programming errors, not geometric rejections:
/// the checked entry points return `Err`, never a silently-rejected result.
#[test]
fn length_mismatches_are_reported_as_errors_not_rejections() {
    let centers = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)];
    let bearings = vec![Bearing::new(Vector3::new(0.0, 0.0, 1.0))];
    let thresholds = ThresholdBundle::broadcast(TAU, 2);
    let gate = GateParams::new(alpha_min(), D_MIN);

    assert!(triangulate_bearings_midpoint(&centers, &bearings, &thresholds, gate).is_err());

    let poses = poses_for(&centers);
    assert!(triangulate_bearings_dlt(&poses, &bearings, TAU, gate).is_err());
}
