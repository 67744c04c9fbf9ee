//! Linear-algebra primitives shared by the triangulators: SVD-based
//! conditioning checks and the two linear solves the spec calls for (the
//! DLT homogeneous system and the midpoint normal equations).

use nalgebra::{DMatrix, Matrix3, Vector3, Vector4};

/// Mirrors `braid_mvg::camera::SVD_MAX_ITERATIONS` / the `my_pinv` epsilon:
/// a generous iteration cap and a conservative convergence epsilon for
/// nalgebra's Jacobi SVD.
const SVD_MAX_ITERATIONS: usize = 1_000_000;
const SVD_EPSILON: f64 = 1e-9;

/// For exact or near-exact geometry the homogeneous DLT system has a 1-D
/// null space: `sigma_min` collapses to ~machine epsilon while
/// `sigma_next` stays `O(1)`, so their *ratio* is always tiny and cannot
/// signal degeneracy. True degeneracy (coincident centers combined with
/// parallel rays — spec §4.1 failure modes) instead widens the null space
/// to 2-D, which shows up as `sigma_next` itself collapsing toward zero.
/// Below this absolute threshold, `sigma_next` is considered degenerate.
pub(crate) const DLT_DEGENERATE_SIGMA_NEXT: f64 = 1e-9;

/// Below this singular value, the 3×3 midpoint normal-equations matrix `M`
/// is considered singular (spec §4.2: "if M's smallest singular value is
/// below a conditioning threshold, reject").
pub(crate) const MIDPOINT_CONDITIONING_THRESHOLD: f64 = 1e-10;

/// `w` components below this are treated as a failed dehomogenization.
pub(crate) const DLT_MIN_W: f64 = 1e-12;

/// Solve `A * [X; 1] = 0` in the least-squares sense via SVD, returning the
/// homogeneous solution (the right-singular vector of the smallest singular
/// value) together with the two smallest singular values, used by the
/// caller to judge conditioning.
///
/// `a` must have exactly 4 columns and at least 4 rows.
pub(crate) fn homogeneous_solve_4(a: DMatrix<f64>) -> Option<(Vector4<f64>, f64, f64)> {
    debug_assert_eq!(a.ncols(), 4);
    let svd = nalgebra::linalg::SVD::try_new(a, false, true, SVD_EPSILON, SVD_MAX_ITERATIONS)?;
    let v_t = svd.v_t.as_ref()?;

    // nalgebra's Jacobi SVD does not guarantee a particular singular value
    // ordering, so find the smallest (and next-smallest) explicitly rather
    // than assuming the conventional descending order.
    let mut order: Vec<usize> = (0..svd.singular_values.len()).collect();
    order.sort_by(|&i, &j| svd.singular_values[i].total_cmp(&svd.singular_values[j]));

    let smallest_idx = order[0];
    let sigma_min = svd.singular_values[smallest_idx];
    let sigma_next = if order.len() > 1 {
        svd.singular_values[order[1]]
    } else {
        sigma_min
    };

    let row = v_t.row(smallest_idx);
    let solution = Vector4::new(row[0], row[1], row[2], row[3]);
    Some((solution, sigma_min, sigma_next))
}

/// Solve the symmetric 3×3 system `m * x = v` via SVD, returning the
/// solution along with `m`'s smallest singular value so the caller can
/// apply the conditioning gate.
pub(crate) fn solve_3x3(m: Matrix3<f64>, v: Vector3<f64>) -> Option<(Vector3<f64>, f64)> {
    let svd = nalgebra::linalg::SVD::try_new(m, true, true, SVD_EPSILON, SVD_MAX_ITERATIONS)?;
    let sigma_min = svd
        .singular_values
        .iter()
        .copied()
        .fold(f64::INFINITY, f64::min);
    let x = svd.solve(&v, MIDPOINT_CONDITIONING_THRESHOLD).ok()?;
    Some((x, sigma_min))
}
