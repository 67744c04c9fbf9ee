use nalgebra::{Matrix3, Matrix3x4, Point3, Vector3};

/// Unit 3-vector: the direction from a camera's optical center to an
/// observed scene point.
///
/// Bearings are tolerant of slight denormalization at construction time —
/// [`Bearing::new`] renormalizes rather than rejecting — but the core never
/// renormalizes silently mid-algorithm; callers that need a guaranteed-unit
/// vector should read [`Bearing::as_unit_vector`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bearing(Vector3<f64>);

/// Bearings whose norm strays further than this from 1.0 are almost
/// certainly a caller bug (e.g. a raw, undivided difference vector) rather
/// than numerical noise, and are renormalized with a `tracing::warn!`
/// rather than silently.
const BEARING_NORM_WARN_TOLERANCE: f64 = 1e-3;

impl Bearing {
    /// Construct a bearing from a (possibly slightly denormalized) direction
    /// vector, renormalizing it to unit length.
    pub fn new(v: Vector3<f64>) -> Self {
        let norm = v.norm();
        if (norm - 1.0).abs() > BEARING_NORM_WARN_TOLERANCE {
            tracing::warn!(norm, "bearing far from unit norm, renormalizing");
        }
        Bearing(v / norm)
    }

    /// Construct from components already known to be (nearly) unit norm,
    /// without the warn-on-denormalization check. Used internally where a
    /// vector is algebraically guaranteed to be normalized already.
    pub(crate) fn new_trusted(v: Vector3<f64>) -> Self {
        Bearing(v.normalize())
    }

    #[inline]
    pub fn as_unit_vector(&self) -> Vector3<f64> {
        self.0
    }
}

impl From<Vector3<f64>> for Bearing {
    fn from(v: Vector3<f64>) -> Self {
        Bearing::new(v)
    }
}

/// A calibrated camera pose: the 3×4 world→camera transform `[R | t]`.
///
/// `R` is a proper rotation (orthonormal, det = +1) and `t = -R * center`,
/// so that for a world point `X`, `R * X + t` is `X` expressed in the
/// camera's local frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    rotation: Matrix3<f64>,
    translation: Vector3<f64>,
}

impl Pose {
    /// Build a pose directly from a rotation matrix and translation vector,
    /// as they would be read off a calibration file's `[R | t]` block.
    pub fn from_rotation_translation(rotation: Matrix3<f64>, translation: Vector3<f64>) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    /// Build a pose from a rotation and a world-frame camera center, using
    /// the documented invariant `t = -R * center`.
    pub fn from_rotation_and_center(rotation: Matrix3<f64>, center: Point3<f64>) -> Self {
        let translation = -(rotation * center.coords);
        Self {
            rotation,
            translation,
        }
    }

    #[inline]
    pub fn rotation(&self) -> &Matrix3<f64> {
        &self.rotation
    }

    #[inline]
    pub fn translation(&self) -> &Vector3<f64> {
        &self.translation
    }

    /// Recover the world-frame camera center as `-Rᵀt`.
    pub fn center(&self) -> Point3<f64> {
        Point3::from(-(self.rotation.transpose() * self.translation))
    }

    /// The 3×4 `[R | t]` matrix used directly by the DLT solver.
    pub fn as_rt_matrix(&self) -> Matrix3x4<f64> {
        let mut rt = Matrix3x4::zeros();
        rt.fixed_view_mut::<3, 3>(0, 0).copy_from(&self.rotation);
        rt.fixed_view_mut::<3, 1>(0, 3).copy_from(&self.translation);
        rt
    }

    /// Map a world point into this camera's local frame: `R * X + t`.
    pub fn world_to_camera(&self, world_point: &Point3<f64>) -> Vector3<f64> {
        self.rotation * world_point.coords + self.translation
    }

    /// Rotate a camera-frame direction vector into the world frame (`Rᵀ * v`).
    /// Used to compare bearings across cameras for the parallax gate.
    pub fn camera_to_world_direction(&self, camera_frame_dir: &Vector3<f64>) -> Vector3<f64> {
        self.rotation.transpose() * camera_frame_dir
    }
}

/// Gate parameters shared by the DLT and midpoint triangulators: the
/// minimum required parallax angle and the minimum acceptable signed depth.
///
/// Setting `min_depth` negative disables the positive-depth gate entirely —
/// this is relied upon by the coincident-center diagnostic (P5).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateParams {
    pub min_parallax_radians: f64,
    pub min_depth: f64,
}

impl GateParams {
    pub fn new(min_parallax_radians: f64, min_depth: f64) -> Self {
        Self {
            min_parallax_radians,
            min_depth,
        }
    }
}

/// Per-view reprojection-error thresholds, expressed as an upper bound on
/// `1 - cos(angular_error)` (see [`crate::gate::reprojection_residual`] for
/// why this convention was chosen over a raw angle).
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdBundle(Vec<f64>);

impl ThresholdBundle {
    /// One threshold per view.
    pub fn per_view(thresholds: Vec<f64>) -> Self {
        Self(thresholds)
    }

    /// The same threshold broadcast to every one of `n` views.
    pub fn broadcast(threshold: f64, n: usize) -> Self {
        Self(vec![threshold; n])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, i: usize) -> f64 {
        self.0[i]
    }
}

/// The result of a gated triangulation: a boolean acceptance flag plus a
/// point that must not be consumed by the caller when rejected.
///
/// Modeled as a tagged enum per the spec's design note (§9): callers cannot
/// accidentally read a meaningless `point` out of a rejected result, because
/// there is no `point` field to read without matching on the variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TriangulationResult {
    Accepted(Point3<f64>),
    Rejected,
}

impl TriangulationResult {
    #[inline]
    pub fn accepted(&self) -> bool {
        matches!(self, TriangulationResult::Accepted(_))
    }

    /// The reconstructed point, or `None` if the gate rejected this
    /// observation set.
    #[inline]
    pub fn point(&self) -> Option<Point3<f64>> {
        match self {
            TriangulationResult::Accepted(p) => Some(*p),
            TriangulationResult::Rejected => None,
        }
    }

    /// The canonical `(bool, Point3)` shape from §6, for callers that
    /// prefer it. The point is `Point3::origin()` when rejected and must
    /// not be interpreted as meaningful.
    pub fn as_bool_point_pair(&self) -> (bool, Point3<f64>) {
        match self {
            TriangulationResult::Accepted(p) => (true, *p),
            TriangulationResult::Rejected => (false, Point3::origin()),
        }
    }
}
