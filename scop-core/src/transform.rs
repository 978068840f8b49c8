/// 3D transformation matrices and model normalization
use nalgebra::{Matrix4, Point3, Vector3, Vector4};

use crate::bounds::BoundingBox;
use crate::geometry::Model;

/// Vectors shorter than this normalize to zero
pub const NORMALIZE_EPSILON: f32 = 1e-5;

/// Default size of the largest model dimension after normalization
pub const DEFAULT_DESIRED_SIZE: f32 = 2.0;

/// Extents below this are treated as flat and left unscaled
pub const MIN_EXTENT: f32 = 1e-5;

/// Unit vector in the direction of `v`, or the zero vector if `v` is too
/// short to have a direction.
pub fn normalize_or_zero(v: &Vector3<f32>) -> Vector3<f32> {
    v.try_normalize(NORMALIZE_EPSILON)
        .unwrap_or_else(Vector3::zeros)
}

/// Transform builder for 3D transformations
pub struct Transform;

impl Transform {
    /// Create a rotation matrix about the Y axis
    pub fn rotation_y(degrees: f32) -> Matrix4<f32> {
        Matrix4::from_axis_angle(&Vector3::y_axis(), degrees.to_radians())
    }

    /// Create a translation matrix
    pub fn translation_matrix(x: f32, y: f32, z: f32) -> Matrix4<f32> {
        Matrix4::new_translation(&Vector3::new(x, y, z))
    }

    pub fn uniform_scale(scale: f32) -> Matrix4<f32> {
        Matrix4::new_scaling(scale)
    }

    /// Right-handed view matrix looking from `eye` towards `center`.
    pub fn look_at(eye: &Point3<f32>, center: &Point3<f32>, up: &Vector3<f32>) -> Matrix4<f32> {
        Self::look_along(eye, &(center - eye), up)
    }

    /// Right-handed view matrix looking from `eye` along `forward`.
    ///
    /// `forward` and `up` need not be unit length but must not be collinear.
    #[rustfmt::skip]
    pub fn look_along(
        eye: &Point3<f32>,
        forward: &Vector3<f32>,
        up: &Vector3<f32>,
    ) -> Matrix4<f32> {
        let f = normalize_or_zero(forward);
        let s = normalize_or_zero(&f.cross(up));
        let u = s.cross(&f);
        let eye = eye.coords;

        Matrix4::new(
            s.x, s.y, s.z, -s.dot(&eye),
            u.x, u.y, u.z, -u.dot(&eye),
            -f.x, -f.y, -f.z, f.dot(&eye),
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Symmetric perspective projection (OpenGL clip conventions).
    ///
    /// `fovy_degrees` is the vertical field of view. Requires
    /// `0 < near < far` and a positive aspect ratio.
    #[rustfmt::skip]
    pub fn perspective(fovy_degrees: f32, aspect: f32, near: f32, far: f32) -> Matrix4<f32> {
        debug_assert!(near > 0.0 && far > near, "invalid clip planes: near={near}, far={far}");
        debug_assert!(aspect > 0.0, "invalid aspect ratio: {aspect}");

        let f = 1.0 / (fovy_degrees.to_radians() / 2.0).tan();
        let depth = near - far;

        Matrix4::new(
            f / aspect, 0.0, 0.0, 0.0,
            0.0, f, 0.0, 0.0,
            0.0, 0.0, (far + near) / depth, 2.0 * far * near / depth,
            0.0, 0.0, -1.0, 0.0,
        )
    }

    /// Create a model-view-projection matrix
    pub fn mvp_matrix(
        model: &Matrix4<f32>,
        view: &Matrix4<f32>,
        projection: &Matrix4<f32>,
    ) -> Matrix4<f32> {
        projection * view * model
    }

    /// The 16 matrix elements in column-major order, as loaded by a
    /// fixed-function matrix stack.
    pub fn to_column_major(matrix: &Matrix4<f32>) -> [f32; 16] {
        let mut out = [0.0; 16];
        out.copy_from_slice(matrix.as_slice());
        out
    }

    /// Project a model-space point to screen space.
    ///
    /// Returns `(x, y, depth)` with `y` growing downwards and depth in NDC
    /// (`-1` near, `1` far), or `None` if the point is behind the camera or
    /// outside the view volume.
    pub fn project_to_screen(
        mvp: &Matrix4<f32>,
        point: &Point3<f32>,
        width: u32,
        height: u32,
    ) -> Option<(f32, f32, f32)> {
        let clip: Vector4<f32> = mvp * point.to_homogeneous();

        // Prevent division by near-zero w
        if clip.w < 1e-6 {
            return None;
        }

        let ndc = clip.xyz() / clip.w;

        // Clip test
        if ndc.x.abs() > 1.0 || ndc.y.abs() > 1.0 || ndc.z.abs() > 1.0 {
            return None;
        }

        // Convert to screen space
        let screen_x = (ndc.x + 1.0) * 0.5 * width as f32;
        let screen_y = (1.0 - ndc.y) * 0.5 * height as f32;

        Some((screen_x, screen_y, ndc.z))
    }
}

/// How a model is brought into the display frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Normalization {
    /// Translate the bounding-box center to the origin
    CenterOnly,
    /// Center, then scale uniformly so the largest side is `desired_size`
    UniformScale { desired_size: f32 },
}

impl Default for Normalization {
    fn default() -> Self {
        Normalization::UniformScale {
            desired_size: DEFAULT_DESIRED_SIZE,
        }
    }
}

/// Pure translation moving the model's center to the origin
pub fn centering_transform(model: &Model) -> Matrix4<f32> {
    let center = BoundingBox::of(model).center();
    Matrix4::new_translation(&-center.coords)
}

/// Centering translation followed by a uniform scale to `desired_size`
pub fn normalizing_transform(model: &Model, desired_size: f32) -> Matrix4<f32> {
    let bounds = BoundingBox::of(model);
    Transform::uniform_scale(normalization_scale(&bounds, desired_size))
        * Matrix4::new_translation(&-bounds.center().coords)
}

fn normalization_scale(bounds: &BoundingBox, desired_size: f32) -> f32 {
    let extent = bounds.extent();
    if extent < MIN_EXTENT {
        1.0
    } else {
        desired_size / extent
    }
}

/// The baked placement of a model: `scale * translation`, computed once per
/// model load. Only the rotation changes from frame to frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelTransform {
    base: Matrix4<f32>,
    scale: f32,
}

impl ModelTransform {
    pub fn new(model: &Model, normalization: Normalization) -> Self {
        match normalization {
            Normalization::CenterOnly => Self {
                base: centering_transform(model),
                scale: 1.0,
            },
            Normalization::UniformScale { desired_size } => Self {
                base: normalizing_transform(model, desired_size),
                scale: normalization_scale(&BoundingBox::of(model), desired_size),
            },
        }
    }

    pub fn identity() -> Self {
        Self {
            base: Matrix4::identity(),
            scale: 1.0,
        }
    }

    pub fn base(&self) -> &Matrix4<f32> {
        &self.base
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Full model matrix: `rotation * (scale * translation)`
    pub fn model_matrix(&self, rotation: &Matrix4<f32>) -> Matrix4<f32> {
        rotation * self.base
    }
}

impl Default for ModelTransform {
    fn default() -> Self {
        Self::identity()
    }
}
