/// Interactive viewing session: the state a render loop keeps between frames
use std::path::{Path, PathBuf};

use log::{debug, error, info};
use nalgebra::Matrix4;

use crate::colors::{face_colors, FaceColors, RenderMode, DEFAULT_SEED};
use crate::error::Result;
use crate::geometry::Model;
use crate::obj;
use crate::projection::{Camera, ViewMode};
use crate::transform::{ModelTransform, Normalization, Transform};

/// Texture used when a model does not name one
pub const DEFAULT_TEXTURE: &str = "white.bmp";

/// Tunables for a viewing session
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    /// Focus-mode model spin, degrees per frame
    pub spin_speed: f32,
    /// Amount one spin speed adjustment changes the speed by
    pub spin_step: f32,
    /// Free-mode movement, units per second
    pub move_speed: f32,
    /// Free-mode look rotation, degrees per second
    pub look_speed: f32,
    pub normalization: Normalization,
    pub color_seed: u64,
    pub texture_name: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            spin_speed: 0.5,
            spin_step: 0.1,
            move_speed: 5.0,
            look_speed: 90.0,
            normalization: Normalization::default(),
            color_seed: DEFAULT_SEED,
            texture_name: DEFAULT_TEXTURE.to_string(),
        }
    }
}

/// Free-mode movement directions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

impl Motion {
    const ALL: [Motion; 6] = [
        Motion::Forward,
        Motion::Backward,
        Motion::Left,
        Motion::Right,
        Motion::Up,
        Motion::Down,
    ];
}

/// Matrices needed to draw one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameMatrices {
    pub model: Matrix4<f32>,
    pub view: Matrix4<f32>,
    pub projection: Matrix4<f32>,
}

impl FrameMatrices {
    pub fn mvp(&self) -> Matrix4<f32> {
        Transform::mvp_matrix(&self.model, &self.view, &self.projection)
    }
}

/// A loaded model together with the camera and input state used to view it.
///
/// The model is only ever replaced as a whole: a failed load leaves the
/// current model, its transform and its colors untouched.
pub struct Viewer {
    config: ViewerConfig,
    model: Model,
    transform: ModelTransform,
    colors: FaceColors,
    source: Option<PathBuf>,
    camera: Camera,
    view_mode: ViewMode,
    render_mode: RenderMode,
    spin_angle: f32,
    spin_speed: f32,
    held: [bool; 6],
    look: (f32, f32),
}

impl Viewer {
    pub fn new(model: Model, config: ViewerConfig) -> Self {
        let mut viewer = Self {
            transform: ModelTransform::identity(),
            colors: FaceColors::default(),
            model: Model::new(),
            source: None,
            camera: Camera::default(),
            view_mode: ViewMode::Focus,
            render_mode: RenderMode::default(),
            spin_angle: 0.0,
            spin_speed: config.spin_speed,
            held: [false; 6],
            look: (0.0, 0.0),
            config,
        };
        viewer.set_model(model);
        viewer
    }

    /// Start a session from an OBJ file
    pub fn open(path: impl AsRef<Path>, config: ViewerConfig) -> Result<Self> {
        let path = path.as_ref();
        let model = obj::load_obj(path)?;
        let mut viewer = Self::new(model, config);
        viewer.source = Some(path.to_path_buf());
        Ok(viewer)
    }

    /// Replace the current model with one read from `path`.
    ///
    /// On failure the current model is kept and the error is returned.
    pub fn load_model(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        match obj::load_obj(path) {
            Ok(mut model) => {
                if model.texture_name.is_empty() {
                    model.texture_name = self.model.texture_name.clone();
                }
                self.set_model(model);
                self.source = Some(path.to_path_buf());
                Ok(())
            }
            Err(e) => {
                error!("Failed to load model {}: {}", path.display(), e);
                Err(e)
            }
        }
    }

    /// Re-read the file the current model came from.
    ///
    /// Returns `Ok(false)` when the model did not come from a file and
    /// nothing was reloaded.
    pub fn reload(&mut self) -> Result<bool> {
        match self.source.clone() {
            Some(path) => self.load_model(path).map(|()| true),
            None => {
                debug!("Nothing to reload: model was not loaded from a file");
                Ok(false)
            }
        }
    }

    /// Swap in a new model and rebuild everything derived from it
    pub fn set_model(&mut self, mut model: Model) {
        if model.texture_name.is_empty() {
            model.texture_name = self.config.texture_name.clone();
        }
        self.transform = ModelTransform::new(&model, self.config.normalization);
        self.colors = face_colors(model.faces.len(), self.config.color_seed);
        self.model = model;
        self.source = None;

        info!(
            "Displaying {} ({} vertices, {} faces, scale {:.3})",
            self.model.object_name,
            self.model.vertices.len(),
            self.model.faces.len(),
            self.transform.scale()
        );
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn colors(&self) -> &FaceColors {
        &self.colors
    }

    pub fn transform(&self) -> &ModelTransform {
        &self.transform
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn render_mode(&self) -> RenderMode {
        self.render_mode
    }

    /// Current model spin in degrees
    pub fn spin_angle(&self) -> f32 {
        self.spin_angle
    }

    pub fn spin_speed(&self) -> f32 {
        self.spin_speed
    }

    /// Switch between focus and free mode. Returning to focus mode resets the
    /// camera and spin.
    pub fn toggle_view_mode(&mut self) {
        self.view_mode = self.view_mode.toggled();
        self.release_all();
        match self.view_mode {
            ViewMode::Free => info!("Switched to free camera mode"),
            ViewMode::Focus => {
                info!("Switched to focus mode");
                self.reset_to_defaults();
            }
        }
    }

    pub fn cycle_render_mode(&mut self) {
        self.render_mode = self.render_mode.next();
        info!("Render mode: {}", self.render_mode.name());
    }

    /// Change the focus-mode spin speed; never goes below zero
    pub fn adjust_spin_speed(&mut self, steps: f32) {
        if self.view_mode == ViewMode::Focus {
            self.spin_speed = (self.spin_speed + steps * self.config.spin_step).max(0.0);
        }
    }

    /// Reset camera and spin (focus mode only)
    pub fn reset(&mut self) {
        if self.view_mode == ViewMode::Focus {
            self.reset_to_defaults();
        }
    }

    fn reset_to_defaults(&mut self) {
        self.camera.reset_to_defaults();
        self.spin_angle = 0.0;
        self.spin_speed = self.config.spin_speed;
    }

    /// Zoom by changing the field of view (clamped by the camera)
    pub fn zoom(&mut self, delta: f32) {
        self.camera.zoom(delta);
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.camera.set_viewport(width, height);
    }

    /// Start moving in a direction (free mode only)
    pub fn press(&mut self, motion: Motion) {
        if self.view_mode == ViewMode::Free {
            self.held[motion as usize] = true;
        }
    }

    pub fn release(&mut self, motion: Motion) {
        self.held[motion as usize] = false;
    }

    pub fn release_all(&mut self) {
        self.held = [false; 6];
    }

    /// Request a look rotation for the next update, as signed fractions of
    /// the configured look speed (free mode only)
    pub fn look(&mut self, yaw: f32, pitch: f32) {
        if self.view_mode == ViewMode::Free {
            self.look = (yaw, pitch);
        }
    }

    /// Advance the session by `dt` seconds
    pub fn update(&mut self, dt: f32) {
        match self.view_mode {
            ViewMode::Focus => {
                self.spin_angle = (self.spin_angle + self.spin_speed) % 360.0;
            }
            ViewMode::Free => {
                let distance = self.config.move_speed * dt;
                for motion in Motion::ALL {
                    if !self.held[motion as usize] {
                        continue;
                    }
                    match motion {
                        Motion::Forward => self.camera.move_forward(distance),
                        Motion::Backward => self.camera.move_forward(-distance),
                        Motion::Right => self.camera.move_right(distance),
                        Motion::Left => self.camera.move_right(-distance),
                        Motion::Up => self.camera.move_up(distance),
                        Motion::Down => self.camera.move_up(-distance),
                    }
                }

                let (yaw, pitch) = self.look;
                if yaw != 0.0 || pitch != 0.0 {
                    let degrees = self.config.look_speed * dt;
                    self.camera.rotate(yaw * degrees, pitch * degrees);
                }
                self.look = (0.0, 0.0);
            }
        }
    }

    /// Matrices for the current frame. The model spins only in focus mode.
    pub fn frame(&self) -> FrameMatrices {
        let model = match self.view_mode {
            ViewMode::Focus => self
                .transform
                .model_matrix(&Transform::rotation_y(self.spin_angle)),
            ViewMode::Free => *self.transform.base(),
        };

        FrameMatrices {
            model,
            view: self.camera.view_matrix(self.view_mode),
            projection: self.camera.projection_matrix(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;
    use approx::assert_relative_eq;
    use nalgebra::Point3;
    use std::fs;

    fn temp_obj(name: &str, contents: &str) -> PathBuf {
        let file = format!("scop-viewer-{}-{}.obj", std::process::id(), name);
        let path = std::env::temp_dir().join(file);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_new_viewer_derives_transform_and_colors() {
        let viewer = Viewer::new(Model::cube(4.0), ViewerConfig::default());
        assert_eq!(viewer.colors().len(), 6);
        assert_relative_eq!(viewer.transform().scale(), 0.5);
        assert_eq!(viewer.model().texture_name, DEFAULT_TEXTURE);
        assert_eq!(viewer.view_mode(), ViewMode::Focus);
    }

    #[test]
    fn test_failed_load_keeps_previous_model() {
        let mut viewer = Viewer::new(Model::cube(2.0), ViewerConfig::default());
        let bad = temp_obj("bad", "v 0 0 0\nv 1 x 0\n");

        let err = viewer.load_model(&bad).unwrap_err();
        assert!(matches!(err, ParseError::InvalidNumber { line: 2, .. }));
        assert_eq!(viewer.model().object_name, "cube");
        assert_eq!(viewer.model().faces.len(), 6);
        assert_eq!(viewer.colors().len(), 6);

        assert!(viewer.load_model("/nonexistent/scop/model.obj").is_err());
        assert_eq!(viewer.model().vertices.len(), 8);

        fs::remove_file(bad).ok();
    }

    #[test]
    fn test_load_replaces_model_and_reload_rereads() {
        let mut viewer = Viewer::new(Model::cube(2.0), ViewerConfig::default());
        let path = temp_obj("good", "v 0 0 0\nv 4 0 0\nv 0 4 0\nf 1 2 3\n");

        viewer.load_model(&path).unwrap();
        assert_eq!(viewer.model().vertices.len(), 3);
        assert_eq!(viewer.colors().len(), 1);
        assert_eq!(viewer.source(), Some(path.as_path()));
        assert_eq!(viewer.model().texture_name, DEFAULT_TEXTURE);

        fs::write(&path, "v 0 0 0\nv 1 0 0\nv 0 1 0\nv 1 1 0\nf 1 2 4 3\nf 1 2 3\n").unwrap();
        assert!(viewer.reload().unwrap());
        assert_eq!(viewer.model().faces.len(), 2);

        fs::write(&path, "f 1 -2 3\n").unwrap();
        assert!(viewer.reload().is_err());
        assert_eq!(viewer.model().faces.len(), 2);

        fs::remove_file(path).ok();
    }

    #[test]
    fn test_reload_without_source_does_nothing() {
        let mut viewer = Viewer::new(Model::cube(2.0), ViewerConfig::default());
        assert!(!viewer.reload().unwrap());
        assert_eq!(viewer.model().object_name, "cube");
        assert_eq!(viewer.source(), None);
    }

    #[test]
    fn test_free_input_is_inert_in_focus_mode() {
        let mut viewer = Viewer::new(Model::cube(2.0), ViewerConfig::default());
        viewer.press(Motion::Forward);
        viewer.look(1.0, 1.0);
        viewer.update(1.0);

        assert_eq!(viewer.camera().eye, Point3::new(0.0, 0.0, 5.0));
        assert_relative_eq!(viewer.spin_angle(), 0.5);
    }

    #[test]
    fn test_free_mode_moves_and_looks() {
        let mut viewer = Viewer::new(Model::cube(2.0), ViewerConfig::default());
        viewer.toggle_view_mode();
        assert_eq!(viewer.view_mode(), ViewMode::Free);

        viewer.press(Motion::Forward);
        viewer.update(0.5);
        assert_relative_eq!(viewer.camera().eye, Point3::new(0.0, 0.0, 2.5), epsilon = 1e-6);

        viewer.release(Motion::Forward);
        viewer.look(1.0, 0.0);
        viewer.update(1.0);
        assert_relative_eq!(viewer.camera().forward().x, 1.0, epsilon = 1e-5);

        // Look deltas are consumed by the update that applies them
        viewer.update(1.0);
        assert_relative_eq!(viewer.camera().forward().x, 1.0, epsilon = 1e-5);
        assert_eq!(viewer.spin_angle(), 0.0);
    }

    #[test]
    fn test_returning_to_focus_resets_camera() {
        let mut viewer = Viewer::new(Model::cube(2.0), ViewerConfig::default());
        viewer.update(1.0);
        viewer.toggle_view_mode();
        viewer.press(Motion::Up);
        viewer.update(1.0);
        viewer.toggle_view_mode();

        assert_eq!(viewer.view_mode(), ViewMode::Focus);
        assert_eq!(viewer.camera().eye, Point3::new(0.0, 0.0, 5.0));
        assert_eq!(viewer.spin_angle(), 0.0);
    }

    #[test]
    fn test_spin_speed_adjustment() {
        let mut viewer = Viewer::new(Model::cube(2.0), ViewerConfig::default());
        viewer.adjust_spin_speed(2.0);
        assert_relative_eq!(viewer.spin_speed(), 0.7, epsilon = 1e-6);
        viewer.adjust_spin_speed(-100.0);
        assert_eq!(viewer.spin_speed(), 0.0);

        viewer.reset();
        assert_relative_eq!(viewer.spin_speed(), 0.5);

        viewer.toggle_view_mode();
        viewer.adjust_spin_speed(5.0);
        assert_relative_eq!(viewer.spin_speed(), 0.5);
    }

    #[test]
    fn test_frame_matrices() {
        let mut viewer = Viewer::new(Model::cube(2.0), ViewerConfig::default());
        let frame = viewer.frame();
        assert_relative_eq!(frame.model, Matrix4::identity(), epsilon = 1e-6);
        assert_relative_eq!(frame.view, viewer.camera().view_matrix(ViewMode::Focus));
        assert_relative_eq!(frame.mvp(), frame.projection * frame.view * frame.model);

        for _ in 0..180 {
            viewer.update(0.016);
        }
        let spun = viewer.frame().model;
        assert_relative_eq!(spun, Transform::rotation_y(90.0), epsilon = 1e-5);

        viewer.toggle_view_mode();
        assert_relative_eq!(viewer.frame().model, *viewer.transform().base());
    }

    #[test]
    fn test_zoom_and_render_mode() {
        let mut viewer = Viewer::new(Model::cube(2.0), ViewerConfig::default());
        viewer.zoom(1000.0);
        assert_eq!(viewer.camera().fovy(), crate::projection::MIN_FOVY);
        viewer.cycle_render_mode();
        assert_eq!(viewer.render_mode(), RenderMode::RandomColor);
    }
}
