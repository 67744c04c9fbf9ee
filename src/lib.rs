//! Multi-view geometric triangulation core for Braid-style
//! structure-from-motion pipelines.
//!
//! Given calibrated camera observations of an unknown 3D scene point — a
//! bearing (unit direction in a camera's local frame) paired with either
//! that camera's pose or its world-frame center — this crate recovers the
//! point's world-space location, or reports that the observations are too
//! degenerate (coincident centers, parallel rays, excessive reprojection
//! error) to trust. It consumes pre-calibrated bearings and pre-computed
//! camera poses; feature detection, intrinsics estimation, bundle
//! adjustment and outlier rejection (RANSAC) are all the caller's problem.
//!
//! ## Operations
//!
//! - [`triangulate_bearings_dlt`]: N-view Direct Linear Transform.
//! - [`triangulate_bearings_midpoint`]: N-view least-squares midpoint.
//! - [`triangulate_two_bearings_midpoint_many`]: vectorized two-view
//!   midpoint over many correspondences sharing one relative pose.
//! - [`epipolar_angle_two_bearings_many`]: batched epipolar consistency
//!   score between two bearing sets.
//! - [`point_refinement`]: iterative reweighted refinement of an initial
//!   point estimate.
//!
//! Every operation is a pure function of its inputs: no I/O, no shared
//! mutable state, no internal caching. All are freely callable from
//! multiple threads in parallel on disjoint inputs.
//!
//! Geometric rejection and numerical degeneracy are both reported through
//! [`TriangulationResult::accepted`] rather than an `Err` — the two are
//! indistinguishable to callers, and both are expected, frequent outcomes,
//! not bugs. A `TriangulateError` means the *caller* violated a
//! precondition (mismatched slice lengths, fewer than two views).
//!
//! ## Example
//!
//! Two cameras observe a single point; DLT recovers it exactly.
//!
//! ```rust
//! use braid_triangulate::{triangulate_bearings_dlt, Bearing, GateParams, Pose};
//! use nalgebra::{Matrix3, Point3};
//!
//! let truth = Point3::new(0.0, 0.0, 1.0);
//! let centers = [Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)];
//!
//! let poses: Vec<Pose> = centers
//!     .iter()
//!     .map(|c| Pose::from_rotation_and_center(Matrix3::identity(), *c))
//!     .collect();
//! let bearings: Vec<Bearing> = centers.iter().map(|c| Bearing::new(truth - c)).collect();
//!
//! let gate = GateParams::new(2.0_f64.to_radians(), 1e-6);
//! let result = triangulate_bearings_dlt(&poses, &bearings, 0.01, gate).unwrap();
//!
//! assert!(result.accepted());
//! let recovered = result.point().unwrap();
//! assert!((recovered - truth).norm() < 1e-6, "error = {}", (recovered - truth).norm());
//! ```
#![deny(rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod dlt;
mod epipolar;
mod error;
mod gate;
mod linalg;
mod midpoint;
mod refinement;
mod report;
mod two_view;
mod types;

pub use crate::dlt::{triangulate_bearings_dlt, triangulate_bearings_dlt_unchecked};
pub use crate::epipolar::epipolar_angle_two_bearings_many;
pub use crate::error::{Result, TriangulateError};
pub use crate::midpoint::{
    triangulate_bearings_midpoint, triangulate_bearings_midpoint_unchecked,
};
pub use crate::refinement::{point_refinement, point_refinement_unchecked};
pub use crate::report::TriangulationReport;
pub use crate::two_view::{
    triangulate_two_bearings_midpoint_many, triangulate_two_bearings_midpoint_many_unchecked,
};
pub use crate::types::{Bearing, GateParams, Pose, ThresholdBundle, TriangulationResult};
