/// Per-face display colors
use rand::distributions::Uniform;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Seed used when the caller does not ask for a specific one
pub const DEFAULT_SEED: u64 = 12345;

/// Range of every generated color channel
pub const CHANNEL_RANGE: (f32, f32) = (0.2, 0.7);

pub type Rgb = [f32; 3];

/// How faces are colored when drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    #[default]
    Grayscale,
    RandomColor,
    Texture,
    Wireframe,
}

impl RenderMode {
    /// The next mode, wrapping around after the last one
    pub fn next(self) -> Self {
        match self {
            RenderMode::Grayscale => RenderMode::RandomColor,
            RenderMode::RandomColor => RenderMode::Texture,
            RenderMode::Texture => RenderMode::Wireframe,
            RenderMode::Wireframe => RenderMode::Grayscale,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RenderMode::Grayscale => "grayscale",
            RenderMode::RandomColor => "random color",
            RenderMode::Texture => "texture",
            RenderMode::Wireframe => "wireframe",
        }
    }
}

/// Precomputed colors, one entry per face
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FaceColors {
    pub gray: Vec<Rgb>,
    pub random: Vec<Rgb>,
}

impl FaceColors {
    pub fn len(&self) -> usize {
        self.gray.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gray.is_empty()
    }

    /// Color of a face in the given mode. Texture mode is white so the
    /// texture is not tinted; wireframe is black. Unknown faces are white.
    pub fn color_for(&self, mode: RenderMode, face_index: usize) -> Rgb {
        let lookup = |colors: &[Rgb]| colors.get(face_index).copied().unwrap_or([1.0; 3]);
        match mode {
            RenderMode::Grayscale => lookup(&self.gray),
            RenderMode::RandomColor => lookup(&self.random),
            RenderMode::Texture => [1.0; 3],
            RenderMode::Wireframe => [0.0; 3],
        }
    }
}

/// Generate reproducible face colors.
///
/// Output depends only on `face_count` and `seed`: for each face one gray
/// level is drawn, then one RGB triple, all from `CHANNEL_RANGE`.
pub fn face_colors(face_count: usize, seed: u64) -> FaceColors {
    let mut rng = StdRng::seed_from_u64(seed);
    let channel = Uniform::new(CHANNEL_RANGE.0, CHANNEL_RANGE.1);

    let mut colors = FaceColors {
        gray: Vec::with_capacity(face_count),
        random: Vec::with_capacity(face_count),
    };

    for _ in 0..face_count {
        let grey = rng.sample(&channel);
        colors.gray.push([grey; 3]);
        colors
            .random
            .push([rng.sample(&channel), rng.sample(&channel), rng.sample(&channel)]);
    }

    colors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_colors() {
        assert_eq!(face_colors(64, DEFAULT_SEED), face_colors(64, DEFAULT_SEED));
    }

    #[test]
    fn test_prefix_is_stable_across_face_counts() {
        let short = face_colors(4, DEFAULT_SEED);
        let long = face_colors(10, DEFAULT_SEED);
        assert_eq!(short.gray[..], long.gray[..4]);
        assert_eq!(short.random[..], long.random[..4]);
    }

    #[test]
    fn test_different_seed_differs() {
        assert_ne!(face_colors(16, 1).random, face_colors(16, 2).random);
    }

    #[test]
    fn test_channels_within_range() {
        let colors = face_colors(500, DEFAULT_SEED);
        assert_eq!(colors.len(), 500);
        for rgb in colors.gray.iter().chain(&colors.random) {
            for channel in rgb {
                assert!((CHANNEL_RANGE.0..CHANNEL_RANGE.1).contains(channel));
            }
        }
        for gray in &colors.gray {
            assert_eq!(gray[0], gray[1]);
            assert_eq!(gray[1], gray[2]);
        }
        assert_eq!(colors.random.len(), 500);
    }

    #[test]
    fn test_color_for_modes() {
        let colors = face_colors(2, DEFAULT_SEED);
        assert_eq!(colors.color_for(RenderMode::Grayscale, 1), colors.gray[1]);
        assert_eq!(colors.color_for(RenderMode::RandomColor, 0), colors.random[0]);
        assert_eq!(colors.color_for(RenderMode::Texture, 0), [1.0; 3]);
        assert_eq!(colors.color_for(RenderMode::Wireframe, 0), [0.0; 3]);
        assert_eq!(colors.color_for(RenderMode::Grayscale, 9), [1.0; 3]);
    }

    #[test]
    fn test_render_mode_cycles() {
        let mut mode = RenderMode::default();
        for _ in 0..4 {
            mode = mode.next();
        }
        assert_eq!(mode, RenderMode::Grayscale);
    }

    #[test]
    fn test_empty_model() {
        assert!(face_colors(0, DEFAULT_SEED).is_empty());
    }
}
