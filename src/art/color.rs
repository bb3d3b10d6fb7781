use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::art::seed::seeded_rng;

/// An RGB color, one byte per channel
pub type Color = [u8; 3];

/// Minimum RGB distance between the colors of one palette
pub const MIN_COLOR_DISTANCE: f64 = 200.0;

/// Upper bound on rejection-sampling draws in [`random_color`]
pub const MAX_COLOR_ATTEMPTS: usize = 10_000;

/// Hue shift range of one palette generation, as a fraction of the color wheel (60°-120°)
const HUE_SHIFT_RANGE: (f64, f64) = (60.0 / 360.0, 120.0 / 360.0);

/// Euclidean distance between two colors in RGB space
pub fn distance(a: Color, b: Color) -> f64 {
    let dr = f64::from(a[0]) - f64::from(b[0]);
    let dg = f64::from(a[1]) - f64::from(b[1]);
    let db = f64::from(a[2]) - f64::from(b[2]);
    (dr * dr + dg * dg + db * db).sqrt()
}

/// Draw a random color at least [`MIN_COLOR_DISTANCE`] away from every color in `existing`
///
/// Rejection sampling is capped at [`MAX_COLOR_ATTEMPTS`]; if no candidate qualifies,
/// the one farthest from its nearest neighbour is returned.
pub fn random_color<R: Rng + ?Sized>(rng: &mut R, existing: &[Color]) -> Color {
    let mut best = draw_color(rng);
    if existing.is_empty() {
        return best;
    }

    let mut best_nearest = nearest_distance(best, existing);
    if best_nearest >= MIN_COLOR_DISTANCE {
        return best;
    }

    for _ in 1..MAX_COLOR_ATTEMPTS {
        let candidate = draw_color(rng);
        let nearest = nearest_distance(candidate, existing);
        if nearest >= MIN_COLOR_DISTANCE {
            return candidate;
        }
        if nearest > best_nearest {
            best = candidate;
            best_nearest = nearest;
        }
    }

    warn!(
        "No color {:.0} away from {} existing colors after {} draws, using closest candidate ({:.1})",
        MIN_COLOR_DISTANCE,
        existing.len(),
        MAX_COLOR_ATTEMPTS,
        best_nearest
    );
    best
}

fn draw_color<R: Rng + ?Sized>(rng: &mut R) -> Color {
    [rng.gen_range(0..=255), rng.gen_range(0..=255), rng.gen_range(0..=255)]
}

fn nearest_distance(color: Color, existing: &[Color]) -> f64 {
    existing
        .iter()
        .map(|other| distance(color, *other))
        .fold(f64::INFINITY, f64::min)
}

/// Linear blend of two colors, truncated per channel
///
/// Factors outside `[0, 1]` extrapolate; the result is clamped into the byte range.
pub fn interpolate(from: Color, to: Color, factor: f64) -> Color {
    let recip = 1.0 - factor;
    let channel = |i: usize| {
        let value = f64::from(from[i]) * recip + f64::from(to[i]) * factor;
        value.trunc().clamp(0.0, 255.0) as u8
    };
    [channel(0), channel(1), channel(2)]
}

/// Convert to HSV, each component in `[0, 1]`
pub fn rgb_to_hsv(color: Color) -> (f64, f64, f64) {
    let r = f64::from(color[0]) / 255.0;
    let g = f64::from(color[1]) / 255.0;
    let b = f64::from(color[2]) / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let value = max;
    if max == min {
        return (0.0, 0.0, value);
    }

    let delta = max - min;
    let saturation = delta / max;
    let rc = (max - r) / delta;
    let gc = (max - g) / delta;
    let bc = (max - b) / delta;

    let hue = if r == max {
        bc - gc
    } else if g == max {
        2.0 + rc - bc
    } else {
        4.0 + gc - rc
    };

    ((hue / 6.0).rem_euclid(1.0), saturation, value)
}

/// Convert HSV (each component in `[0, 1]`) back to RGB
pub fn hsv_to_rgb(hue: f64, saturation: f64, value: f64) -> Color {
    let to_channel = |x: f64| (x * 255.0).round().clamp(0.0, 255.0) as u8;

    if saturation <= 0.0 {
        let v = to_channel(value);
        return [v, v, v];
    }

    let sector = (hue * 6.0).floor();
    let f = hue * 6.0 - sector;
    let p = value * (1.0 - saturation);
    let q = value * (1.0 - saturation * f);
    let t = value * (1.0 - saturation * (1.0 - f));

    let (r, g, b) = match (sector as i64).rem_euclid(6) {
        0 => (value, t, p),
        1 => (q, value, p),
        2 => (p, value, t),
        3 => (p, q, value),
        4 => (t, p, value),
        _ => (value, p, q),
    };

    [to_channel(r), to_channel(g), to_channel(b)]
}

/// Shift a color around the hue wheel by a seeded amount in 60°-120°
///
/// Saturation and value are nudged by up to ±0.2 and kept within `[0.3, 1]` and
/// `[0.4, 1]` so the result never collapses to grey or black.
pub fn hue_shift(color: Color, seed: u64) -> Color {
    let mut rng = seeded_rng(seed);
    let (h, s, v) = rgb_to_hsv(color);

    let shift = rng.gen_range(HUE_SHIFT_RANGE.0..HUE_SHIFT_RANGE.1);
    let saturation = (s + rng.gen_range(-0.2..0.2)).clamp(0.3, 1.0);
    let value = (v + rng.gen_range(-0.2..0.2)).clamp(0.4, 1.0);

    hsv_to_rgb((h + shift).rem_euclid(1.0), saturation, value)
}

/// Rotate a color's hue by `hue_delta` (fraction of the wheel) and nudge its saturation
pub fn rotate_hue(color: Color, hue_delta: f64, saturation_delta: f64) -> Color {
    let (h, s, v) = rgb_to_hsv(color);
    let saturation = (s + saturation_delta).clamp(0.3, 1.0);
    hsv_to_rgb((h + hue_delta).rem_euclid(1.0), saturation, v)
}

/// The named colors of one artwork
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorRole {
    Start,
    End,
    Background,
    Border,
}

impl ColorRole {
    pub const ALL: [ColorRole; 4] = [Self::Start, Self::End, Self::Background, Self::Border];

    /// Key of this color in persisted snapshots, also used to seed its hue shifts
    pub fn key(self) -> &'static str {
        match self {
            Self::Start => "start_clr",
            Self::End => "end_clr",
            Self::Background => "image_bg_clr",
            Self::Border => "border_clr",
        }
    }
}

/// The four colors of an artwork
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    pub start: Color,
    pub end: Color,
    pub background: Color,
    pub border: Color,
}

impl Palette {
    pub fn get(&self, role: ColorRole) -> Color {
        match role {
            ColorRole::Start => self.start,
            ColorRole::End => self.end,
            ColorRole::Background => self.background,
            ColorRole::Border => self.border,
        }
    }

    /// Build a new palette by transforming each color with its role
    pub fn map(&self, mut f: impl FnMut(ColorRole, Color) -> Color) -> Self {
        Self {
            start: f(ColorRole::Start, self.start),
            end: f(ColorRole::End, self.end),
            background: f(ColorRole::Background, self.background),
            border: f(ColorRole::Border, self.border),
        }
    }

    /// Blend every color of two palettes
    pub fn interpolate(&self, to: &Palette, factor: f64) -> Self {
        self.map(|role, color| interpolate(color, to.get(role), factor))
    }
}
