//! Acceptance gating: the subtle part of triangulation per the spec's intro
//! — degenerate geometry can produce numerically plausible but meaningless
//! answers, so every triangulator runs its result through the same
//! three-stage gate before calling it accepted.

use nalgebra::Vector3;

use crate::types::{GateParams, ThresholdBundle};

/// Why a candidate point was rejected, used only for `tracing` diagnostics —
/// the public API collapses all of these into `accepted = false`, per the
/// spec's §7 claim that geometric rejection and numerical degeneracy are
/// indistinguishable to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GateFailure {
    InsufficientParallax,
    NegativeDepth { view: usize },
    ExcessiveReprojectionError { view: usize },
}

impl std::fmt::Display for GateFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GateFailure::InsufficientParallax => write!(f, "insufficient parallax"),
            GateFailure::NegativeDepth { view } => write!(f, "negative depth at view {view}"),
            GateFailure::ExcessiveReprojectionError { view } => {
                write!(f, "excessive reprojection error at view {view}")
            }
        }
    }
}

/// `1 - cos(angle)` between two (not-necessarily-unit) direction vectors.
/// This is the reprojection-error convention the crate fixes, per spec §9
/// ("Angle vs. cosine gate"): a squared-angle-like residual that is cheap
/// (one dot product, two norms) and avoids an `acos` per view per call.
///
/// A zero-length `predicted` direction means the candidate point coincides
/// with the camera center (signed depth exactly 0) — the degenerate case
/// the coincident-center diagnostic (P5) relies on. That case has no
/// defined reprojection direction to compare against, so it passes this
/// gate unconditionally; the depth gate is the intended discriminator and
/// is already disabled whenever that diagnostic is reachable (`min_depth <
/// 0`). A zero-length `observed` bearing is not expected to occur but is
/// still handled as a maximal residual rather than a division by zero.
pub(crate) fn angular_residual(observed: &Vector3<f64>, predicted: &Vector3<f64>) -> f64 {
    let predicted_norm = predicted.norm();
    if predicted_norm < f64::EPSILON {
        return 0.0;
    }
    let observed_norm = observed.norm();
    if observed_norm < f64::EPSILON {
        return 2.0; // maximal residual: observed direction undefined.
    }
    1.0 - (observed.dot(predicted) / (observed_norm * predicted_norm)).clamp(-1.0, 1.0)
}

/// Angle (radians) subtended by two world-frame bearings at the candidate
/// point.
fn pairwise_angle(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    let denom = a.norm() * b.norm();
    if denom < f64::EPSILON {
        return 0.0;
    }
    (a.dot(b) / denom).clamp(-1.0, 1.0).acos()
}

/// Stage 1: at least one pair of world-frame bearings must subtend an angle
/// `>= min_parallax_radians`. Short-circuits on the first qualifying pair
/// (spec §9, "Parallax pairwise cost").
pub(crate) fn parallax_ok(bearings_world: &[Vector3<f64>], min_parallax_radians: f64) -> bool {
    for i in 0..bearings_world.len() {
        for j in (i + 1)..bearings_world.len() {
            if pairwise_angle(&bearings_world[i], &bearings_world[j]) >= min_parallax_radians {
                return true;
            }
        }
    }
    false
}

/// The maximum pairwise parallax angle across all views, for diagnostics
/// and tests that want a number rather than a bool.
#[cfg(test)]
pub(crate) fn max_parallax_angle(bearings_world: &[Vector3<f64>]) -> f64 {
    let mut best = 0.0_f64;
    for i in 0..bearings_world.len() {
        for j in (i + 1)..bearings_world.len() {
            best = best.max(pairwise_angle(&bearings_world[i], &bearings_world[j]));
        }
    }
    best
}

/// Run the full three-stage gate (parallax, depth, reprojection) against
/// per-view signed depths and angular residuals that the caller (DLT or
/// midpoint) has already computed for its candidate point. Returns `Ok(())`
/// on acceptance or the first failing stage, in spec order.
pub(crate) fn evaluate(
    bearings_world: &[Vector3<f64>],
    depths: &[f64],
    residuals: &[f64],
    gate: &GateParams,
    thresholds: &ThresholdBundle,
) -> Result<(), GateFailure> {
    if !parallax_ok(bearings_world, gate.min_parallax_radians) {
        return Err(GateFailure::InsufficientParallax);
    }
    if gate.min_depth >= 0.0 {
        for (view, &depth) in depths.iter().enumerate() {
            if depth < gate.min_depth {
                return Err(GateFailure::NegativeDepth { view });
            }
        }
    }
    for (view, &residual) in residuals.iter().enumerate() {
        if residual > thresholds.get(view) {
            return Err(GateFailure::ExcessiveReprojectionError { view });
        }
    }
    Ok(())
}
