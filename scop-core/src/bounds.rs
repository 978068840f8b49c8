/// Axis-aligned bounds of a model
use nalgebra::{Point3, Vector3};

use crate::geometry::Model;

/// Axis-aligned bounding box over a model's vertex positions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl BoundingBox {
    /// Bounds of every vertex in the model. An empty model yields a zero-sized
    /// box at the origin.
    pub fn of(model: &Model) -> Self {
        let mut vertices = model.vertices.iter();
        let Some(first) = vertices.next() else {
            return Self {
                min: Point3::origin(),
                max: Point3::origin(),
            };
        };

        vertices.fold(
            Self {
                min: *first,
                max: *first,
            },
            |bounds, v| Self {
                min: bounds.min.inf(v),
                max: bounds.max.sup(v),
            },
        )
    }

    /// Midpoint of the box
    pub fn center(&self) -> Point3<f32> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Side lengths along each axis
    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }

    /// Length of the longest side
    pub fn extent(&self) -> f32 {
        self.size().max()
    }
}

impl Model {
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::of(self)
    }

    pub fn center(&self) -> Point3<f32> {
        self.bounding_box().center()
    }
}
