use std::f64::consts::{PI, TAU};

use rand::Rng;

use crate::art::{
    color::{hue_shift, Palette},
    geometry::{Bounds, Point},
    params::GenerationParams,
    seed::{derive_seed, SeedKey},
    state::ArtState,
};

/// Number of palettes the colors cycle through: the source palette and its descendants
pub const PALETTE_CYCLE: usize = 4;

/// Motion targets derived from a source state
///
/// Targets depend only on the source state and the canvas, never on earlier frames.
#[derive(Debug, Clone, PartialEq)]
pub struct EndTargets {
    pub palettes: [Palette; PALETTE_CYCLE],
    pub initial_point: Point,
    pub line_end_points: Vec<Point>,
    pub curve_control_points: Vec<[Point; 2]>,
}

/// Derives the colors and positions an animation moves toward
#[derive(Debug, Clone, Copy)]
pub struct EndStateDeriver {
    size: u32,
    bounds: Bounds,
}

impl EndStateDeriver {
    /// Deriver for the canvas described by `params` (only `size` and `padding` matter)
    pub fn new(params: &GenerationParams) -> Self {
        Self {
            size: params.size,
            bounds: params.bounds(),
        }
    }

    /// One palette generation: every color hue-shifted with a seed taken from its role
    pub fn derive_end_colors(palette: &Palette) -> Palette {
        palette.map(|role, color| hue_shift(color, derive_seed(role.key())))
    }

    /// The source palette followed by three successive generations
    pub fn palette_chain(palette: &Palette) -> [Palette; PALETTE_CYCLE] {
        let first = Self::derive_end_colors(palette);
        let second = Self::derive_end_colors(&first);
        let third = Self::derive_end_colors(&second);
        [*palette, first, second, third]
    }

    /// Target of one point
    ///
    /// The point is swung around the image center (half to one and a half turns, radius
    /// scaled by 0.6-1.5), pushed along a sine wave and offset by a bounded random amount.
    /// Every draw is seeded from `(x, y, index)`.
    pub fn derive_end_point(&self, point: Point, index: usize) -> Point {
        let mut rng = SeedKey::new("end_point").i32(point.x).i32(point.y).usize(index).rng();
        let size = f64::from(self.size);
        let center = size / 2.0;

        let dx = f64::from(point.x) - center;
        let dy = f64::from(point.y) - center;
        let angle = dy.atan2(dx) + rng.gen_range(1.0..3.0) * PI;
        let distance = dx.hypot(dy) * rng.gen_range(0.6..1.5);

        let wave_amplitude = size * rng.gen_range(0.05..0.15);
        let wave_frequency = rng.gen_range(1.5..3.0);
        let wave_phase = rng.gen_range(0.0..TAU);
        let wave_angle = angle * wave_frequency + wave_phase;

        let offset_range = size * rng.gen_range(0.1..0.3);
        let offset_x = rng.gen_range(-offset_range..offset_range);
        let offset_y = rng.gen_range(-offset_range..offset_range);

        let x = center + angle.cos() * distance + wave_angle.sin() * wave_amplitude + offset_x;
        let y = center + angle.sin() * distance + wave_angle.cos() * wave_amplitude + offset_y;
        self.bounds.clamp_truncated(x, y)
    }

    /// Targets of a sequence of points, each seeded with its position in the sequence
    pub fn derive_end_points(&self, points: &[Point]) -> Vec<Point> {
        points
            .iter()
            .enumerate()
            .map(|(i, point)| self.derive_end_point(*point, i))
            .collect()
    }

    /// Every target of `state`
    ///
    /// End points are indexed by their curve; the initial point and each control point
    /// are derived on their own (index 0).
    pub fn derive(&self, state: &ArtState) -> EndTargets {
        EndTargets {
            palettes: Self::palette_chain(&state.palette()),
            initial_point: self.derive_end_point(state.initial_point, 0),
            line_end_points: self.derive_end_points(&state.line_end_points),
            curve_control_points: state
                .curve_control_points
                .iter()
                .map(|[a, b]| [self.derive_end_point(*a, 0), self.derive_end_point(*b, 0)])
                .collect(),
        }
    }
}
