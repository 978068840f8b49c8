/// scop core library - OBJ ingestion, model framing and camera math
///
/// This library provides the renderer-independent part of the viewer:
/// OBJ parsing, bounding-box normalization, view/projection matrices,
/// deterministic face colors and the interactive session state.

pub mod bounds;
pub mod colors;
pub mod error;
pub mod geometry;
pub mod obj;
pub mod projection;
pub mod transform;
pub mod viewer;

// Re-export commonly used types
pub use bounds::BoundingBox;
pub use colors::{face_colors, FaceColors, RenderMode};
pub use error::{ParseError, Result};
pub use geometry::{Face, FaceVertex, Model, TexCoord};
pub use obj::{load_obj, parse_obj};
pub use projection::{Camera, ViewMode};
pub use transform::{ModelTransform, Normalization, Transform};
pub use viewer::{FrameMatrices, Motion, Viewer, ViewerConfig};
