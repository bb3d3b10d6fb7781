use std::f64::consts::{PI, TAU};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    animation::end_state::{EndStateDeriver, EndTargets, PALETTE_CYCLE},
    art::{
        color::{rotate_hue, ColorRole, Palette},
        geometry::{effective_padding, Bounds, Point},
        params::GenerationParams,
        state::ArtState,
    },
};

/// Speed treated as 1x
pub const BASELINE_SPEED: f64 = 20.0;

/// Geometry moves this many times faster than the color cycle
const GEOMETRY_RATE: f64 = 12.0;

/// Base spiral rotation per unit of geometry factor, in half turns
const BASE_ROTATION: f64 = 0.2;

/// Per-curve wave: phase step between curves, phase speed, amplitude as a share of size
const WAVE_INDEX_STEP: f64 = 0.3;
const WAVE_SPEED: f64 = 1.5;
const WAVE_AMPLITUDE: f64 = 0.04;

/// Amplitude of the zoom oscillation and the range zoom is held to while oscillating
const ZOOM_OSCILLATION: f64 = 0.3;
const ZOOM_RANGE: (f64, f64) = (0.5, 2.0);

/// Time-independent motion settings of an animation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionParams {
    /// Animation speed, 20 being the reference pace
    pub speed: f64,

    /// Zoom about the image center; below 1 the usable area shrinks accordingly
    pub zoom: f64,

    /// Zoom oscillations over the whole animation; 0 keeps the zoom fixed
    pub zoom_speed: f64,
}

impl Default for MotionParams {
    fn default() -> Self {
        Self {
            speed: BASELINE_SPEED,
            zoom: 1.1,
            zoom_speed: 0.0,
        }
    }
}

impl MotionParams {
    /// Zoom in effect at time `t`
    pub fn zoom_at(&self, t: f64) -> f64 {
        if self.zoom_speed > 0.0 {
            let oscillation = (t * TAU * self.zoom_speed).sin() * ZOOM_OSCILLATION;
            (self.zoom + oscillation).clamp(ZOOM_RANGE.0, ZOOM_RANGE.1)
        } else {
            self.zoom
        }
    }
}

/// Tilt input of an interactive preview, each axis in `[-1, 1]`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Gyro {
    pub x: f64,
    pub y: f64,
}

impl Gyro {
    /// Tilt with both axes clamped into `[-1, 1]`
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: x.clamp(-1.0, 1.0),
            y: y.clamp(-1.0, 1.0),
        }
    }

    /// A level device has no effect at all
    pub fn is_active(&self) -> bool {
        self.x != 0.0 || self.y != 0.0
    }

    pub fn magnitude(&self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn angle(&self) -> f64 {
        self.y.atan2(self.x)
    }

    /// Hue rotation (fraction of the wheel) and saturation nudge applied to every color
    fn color_shift(&self) -> (f64, f64) {
        let magnitude = self.magnitude();
        let hue = self.angle() / TAU * (magnitude * 0.3);
        let saturation = magnitude * 0.2 - 0.1;
        (hue, saturation)
    }

    /// Shift of the transform center, in pixels
    fn offset(&self, size: f64) -> (f64, f64) {
        (self.x * size * 0.8, self.y * size * 0.8)
    }

    /// Extra rotation, strongest when tilted along the x axis
    fn rotation(&self) -> f64 {
        self.magnitude() * PI * 0.3 * self.angle().cos()
    }

    /// Per-axis stretch along the tilt direction
    fn stretch(&self) -> (f64, f64) {
        let amount = self.magnitude() * 0.4;
        let angle = self.angle();
        (1.0 + amount * angle.cos() * 0.5, 1.0 + amount * angle.sin() * 0.5)
    }
}

/// The state and parameters of one animation frame
#[derive(Debug, Clone, PartialEq)]
pub struct AnimatedFrame {
    pub state: ArtState,
    pub params: GenerationParams,
}

/// Computes any frame of an animation directly from its source state
///
/// Each call re-derives the motion targets from the source, so a frame depends only on
/// its time and never on which frames were computed before it.
#[derive(Debug, Clone, Copy)]
pub struct FrameInterpolator {
    start: GenerationParams,
    end: GenerationParams,
    motion: MotionParams,
}

impl FrameInterpolator {
    /// Animate from `start` toward `end`; `size` and `padding` always come from `start`
    pub fn new(start: GenerationParams, end: GenerationParams, motion: MotionParams) -> Self {
        Self { start, end, motion }
    }

    pub fn start(&self) -> &GenerationParams {
        &self.start
    }

    pub fn motion(&self) -> &MotionParams {
        &self.motion
    }

    /// Frame at time `t` (nominally `[0, 1]`) with the given tilt
    pub fn interpolate(&self, state: &ArtState, t: f64, gyro: Gyro) -> AnimatedFrame {
        let targets = EndStateDeriver::new(&self.start).derive(state);
        self.interpolate_towards(state, &targets, t, gyro)
    }

    /// Frame at time `t` using targets derived from `state` beforehand
    pub fn interpolate_towards(
        &self,
        state: &ArtState,
        targets: &EndTargets,
        t: f64,
        gyro: Gyro,
    ) -> AnimatedFrame {
        let speed = self.motion.speed / BASELINE_SPEED;
        let geometry_factor = t * speed * GEOMETRY_RATE;

        let mut params = self.start.interpolate(&self.end, geometry_factor);
        params.amount = params.amount.min(state.amount());

        let mut palette = cycle_palette(&targets.palettes, t * speed * PALETTE_CYCLE as f64);
        if gyro.is_active() {
            palette = tilt_palette(&palette, gyro);
        }

        let transform = PointTransform::new(&self.start, geometry_factor, self.motion.zoom_at(t), gyro);
        let animate = |from: Point, to: Point, index: usize| transform.apply(from, to, index);

        let amount = params.amount;
        let line_end_points = state.line_end_points[..amount]
            .iter()
            .zip(&targets.line_end_points)
            .enumerate()
            .map(|(i, (from, to))| animate(*from, *to, i))
            .collect();
        let curve_control_points = state.curve_control_points[..amount]
            .iter()
            .zip(&targets.curve_control_points)
            .enumerate()
            .map(|(i, ([a, b], [ta, tb]))| [animate(*a, *ta, i), animate(*b, *tb, i)])
            .collect();

        let source = state.truncated(amount);
        let animated = ArtState {
            initial_point: animate(state.initial_point, targets.initial_point, 0),
            line_end_points,
            curve_control_points,
            ..source.with_palette(palette)
        };

        debug!(
            "Frame t={:.4}: geometry {:.3}, {} curves, zoom {:.2}",
            t,
            geometry_factor,
            amount,
            transform.zoom
        );

        AnimatedFrame {
            state: animated,
            params,
        }
    }
}

/// Palette at `progress` along the cycle, blending each palette into its successor
fn cycle_palette(palettes: &[Palette; PALETTE_CYCLE], progress: f64) -> Palette {
    let index = (progress.floor() as i64).rem_euclid(PALETTE_CYCLE as i64) as usize;
    let next = (index + 1) % PALETTE_CYCLE;
    palettes[index].interpolate(&palettes[next], progress.rem_euclid(1.0))
}

fn tilt_palette(palette: &Palette, gyro: Gyro) -> Palette {
    let (hue, saturation) = gyro.color_shift();
    palette.map(|role, color| {
        let hue = if role == ColorRole::Background { hue * 0.5 } else { hue };
        rotate_hue(color, hue, saturation)
    })
}

/// Position transform shared by every point of one frame
struct PointTransform {
    geometry_factor: f64,
    center: f64,
    effective_center: (f64, f64),
    rotation: f64,
    stretch: (f64, f64),
    wave_amplitude: f64,
    zoom: f64,
    bounds: Bounds,
}

impl PointTransform {
    fn new(params: &GenerationParams, geometry_factor: f64, zoom: f64, gyro: Gyro) -> Self {
        let size = f64::from(params.size);
        let center = size / 2.0;
        let (offset_x, offset_y) = gyro.offset(size);

        Self {
            geometry_factor,
            center,
            effective_center: (center + offset_x, center + offset_y),
            rotation: geometry_factor * PI * BASE_ROTATION + gyro.rotation(),
            stretch: gyro.stretch(),
            wave_amplitude: size * WAVE_AMPLITUDE,
            zoom,
            bounds: zoomed_bounds(params, zoom),
        }
    }

    /// Move `from` toward `to`, then spin, stretch, wave and zoom it
    fn apply(&self, from: Point, to: Point, index: usize) -> Point {
        let lerp = |a: i32, b: i32| f64::from(a) + f64::from(b - a) * self.geometry_factor;
        let x = lerp(from.x, to.x) - self.center;
        let y = lerp(from.y, to.y) - self.center;

        let (sin, cos) = self.rotation.sin_cos();
        let rotated_x = x * cos - y * sin;
        let rotated_y = x * sin + y * cos;

        let phase = index as f64 * WAVE_INDEX_STEP + self.geometry_factor * WAVE_SPEED;
        let wave_x = phase.sin() * self.wave_amplitude;
        let wave_y = (phase * 1.2).cos() * self.wave_amplitude;

        // Relative to the effective center, zoom scales the displaced position.
        let relative_x = rotated_x * self.stretch.0 + wave_x;
        let relative_y = rotated_y * self.stretch.1 + wave_y;
        let (cx, cy) = self.effective_center;
        self.bounds
            .clamp_rounded(cx + relative_x * self.zoom, cy + relative_y * self.zoom)
    }
}

/// Padded bounds, tightened to the visible square when zoomed out
fn zoomed_bounds(params: &GenerationParams, zoom: f64) -> Bounds {
    let padded = params.bounds();
    if zoom >= 1.0 {
        return padded;
    }

    let size = f64::from(params.size);
    let padding = effective_padding(params.padding) as i32;
    let offset = (size - size * zoom) / 2.0;
    let min = padding.max(offset.trunc() as i32);
    let max = padded.max.min((size - offset - 1.0).trunc() as i32);
    if min > max {
        padded
    } else {
        Bounds::new(min, max)
    }
}
