use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    art::{
        color::{Color, Palette},
        geometry::{effective_padding, Bounds, Point},
        params::GenerationParams,
        seed::{seeded_rng, SeedKey},
    },
    error::{Result, StateError},
};

/// Share of the curves (counted from the first) that may fork off an earlier point
pub const BRANCH_SHARE: f64 = 0.3;

/// Jitter of the control point synthesized for legacy single-control snapshots
const LEGACY_CONTROL_JITTER: i32 = 50;

/// Where a curve starts
///
/// Persisted as `null` (continue) or the branch index. The index addresses the
/// sequence `[initial_point, end_0, end_1, ...]`, so `BranchFrom(0)` starts at the
/// initial point and `BranchFrom(k)` at the end of curve `k - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<usize>", into = "Option<usize>")]
pub enum LineOrigin {
    /// Start where the previous curve ended
    Continue,
    /// Start at an earlier point of the drawing
    BranchFrom(usize),
}

impl LineOrigin {
    /// Draw the origin of curve `index` out of `amount`
    ///
    /// The first curve always continues from the initial point; curves in the first
    /// [`BRANCH_SHARE`] of the drawing branch from a uniformly chosen earlier point.
    pub fn draw<R: Rng + ?Sized>(rng: &mut R, index: usize, amount: usize) -> Self {
        if index > 0 && (index as f64) < amount as f64 * BRANCH_SHARE {
            Self::BranchFrom(rng.gen_range(0..index))
        } else {
            Self::Continue
        }
    }
}

impl From<Option<usize>> for LineOrigin {
    fn from(value: Option<usize>) -> Self {
        value.map_or(Self::Continue, Self::BranchFrom)
    }
}

impl From<LineOrigin> for Option<usize> {
    fn from(origin: LineOrigin) -> Self {
        match origin {
            LineOrigin::Continue => None,
            LineOrigin::BranchFrom(index) => Some(index),
        }
    }
}

/// Bézier controls of one curve as found in a persisted snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ControlPoints {
    /// Current format: `[[x1, y1], [x2, y2]]`
    Cubic(Point, Point),
    /// Legacy format with a single control point: `[x, y]`
    Single(Point),
}

impl ControlPoints {
    /// Turn the stored controls into a cubic pair
    ///
    /// A legacy single control keeps its position and gains a second control within
    /// ±50 px of it, drawn from `seed` and clamped into `bounds`.
    pub fn upgrade(self, seed: u64, bounds: Bounds) -> [Point; 2] {
        match self {
            Self::Cubic(first, second) => [first, second],
            Self::Single(first) => {
                let mut rng = seeded_rng(seed);
                let jitter = -LEGACY_CONTROL_JITTER..=LEGACY_CONTROL_JITTER;
                let second = Point::new(
                    first.x + rng.gen_range(jitter.clone()),
                    first.y + rng.gen_range(jitter),
                );
                [first, bounds.clamp(second)]
            }
        }
    }
}

/// Deterministic snapshot of every random choice behind one artwork
///
/// An `ArtState` is never modified for animation; each frame derives a new one.
/// Serialized field names are the persisted snapshot keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtState {
    #[serde(rename = "start_clr")]
    pub start_color: Color,

    #[serde(rename = "end_clr")]
    pub end_color: Color,

    #[serde(rename = "image_bg_clr")]
    pub background_color: Color,

    #[serde(rename = "border_clr")]
    pub border_color: Color,

    /// Start of the first curve
    pub initial_point: Point,

    pub line_end_points: Vec<Point>,

    /// Extra stroke width per curve, added to the base line width
    pub line_width_variations: Vec<u32>,

    /// Two Bézier controls per curve
    pub curve_control_points: Vec<[Point; 2]>,

    pub line_start_points: Vec<LineOrigin>,
}

impl ArtState {
    /// Number of curves
    pub fn amount(&self) -> usize {
        self.line_end_points.len()
    }

    pub fn palette(&self) -> Palette {
        Palette {
            start: self.start_color,
            end: self.end_color,
            background: self.background_color,
            border: self.border_color,
        }
    }

    /// Copy of this state with its colors replaced
    pub fn with_palette(&self, palette: Palette) -> Self {
        Self {
            start_color: palette.start,
            end_color: palette.end,
            background_color: palette.background,
            border_color: palette.border,
            ..self.clone()
        }
    }

    /// Every coordinate of the state: initial point, end points and both controls
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        std::iter::once(self.initial_point)
            .chain(self.line_end_points.iter().copied())
            .chain(self.curve_control_points.iter().flat_map(|pair| pair.iter().copied()))
    }

    /// Check the per-curve sequences line up and branches only look backwards
    pub fn validate(&self) -> Result<()> {
        let expected = self.amount();
        let lengths = [
            ("line_width_variations", self.line_width_variations.len()),
            ("curve_control_points", self.curve_control_points.len()),
            ("line_start_points", self.line_start_points.len()),
        ];
        for (field, actual) in lengths {
            if actual != expected {
                return Err(StateError::LengthMismatch { field, expected, actual }.into());
            }
        }

        for (line, origin) in self.line_start_points.iter().enumerate() {
            if let LineOrigin::BranchFrom(target) = *origin {
                if target >= line {
                    return Err(StateError::InvalidBranch { line, target }.into());
                }
            }
        }

        Ok(())
    }

    /// Copy keeping only the first `amount` curves
    pub fn truncated(&self, amount: usize) -> Self {
        let amount = amount.min(self.amount());
        Self {
            line_end_points: self.line_end_points[..amount].to_vec(),
            line_width_variations: self.line_width_variations[..amount].to_vec(),
            curve_control_points: self.curve_control_points[..amount].to_vec(),
            line_start_points: self.line_start_points[..amount].to_vec(),
            ..self.clone()
        }
    }

    /// Map every coordinate from one canvas size and padding onto another
    ///
    /// Points keep their relative position inside the usable (unpadded) area.
    pub fn rescale(&self, from: &GenerationParams, to: &GenerationParams) -> Self {
        if from.size == to.size && effective_padding(from.padding) == effective_padding(to.padding) {
            return self.clone();
        }

        let from_padding = f64::from(effective_padding(from.padding));
        let to_padding = f64::from(effective_padding(to.padding));
        let from_usable = f64::from(from.size) - 2.0 * from_padding;
        let to_usable = f64::from(to.size) - 2.0 * to_padding;
        let bounds = to.bounds();

        let scale = |point: Point| {
            let normalize = |v: i32| {
                if from_usable > 0.0 {
                    (f64::from(v) - from_padding) / from_usable
                } else {
                    0.5
                }
            };
            bounds.clamp_rounded(
                normalize(point.x) * to_usable + to_padding,
                normalize(point.y) * to_usable + to_padding,
            )
        };

        Self {
            initial_point: scale(self.initial_point),
            line_end_points: self.line_end_points.iter().map(|p| scale(*p)).collect(),
            curve_control_points: self
                .curve_control_points
                .iter()
                .map(|[a, b]| [scale(*a), scale(*b)])
                .collect(),
            ..self.clone()
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a persisted snapshot, upgrading older formats
    pub fn from_json(json: &str, params: &GenerationParams) -> Result<Self> {
        let snapshot: ArtSnapshot = serde_json::from_str(json)?;
        snapshot.into_state(params)
    }
}

/// Persisted snapshot as read from disk or a front end
///
/// Fields introduced after the first format are optional and filled in by
/// [`ArtSnapshot::into_state`].
#[derive(Debug, Clone, Deserialize)]
pub struct ArtSnapshot {
    pub start_clr: Color,
    pub end_clr: Color,
    pub image_bg_clr: Color,
    pub border_clr: Color,
    pub initial_point: Point,
    pub line_end_points: Vec<Point>,
    #[serde(default)]
    pub line_width_variations: Option<Vec<u32>>,
    #[serde(default)]
    pub curve_control_points: Option<Vec<ControlPoints>>,
    #[serde(default)]
    pub line_start_points: Option<Vec<LineOrigin>>,
}

/// Seed key of the controls of curve `index` ending at `end`
fn control_key(label: &str, index: usize, end: Point) -> SeedKey {
    SeedKey::new(label).usize(index).i32(end.x).i32(end.y)
}

impl ArtSnapshot {
    /// Build a complete, validated [`ArtState`]
    ///
    /// Missing or legacy data is reconstructed deterministically from the snapshot's
    /// own coordinates, so loading the same snapshot twice always yields the same state.
    pub fn into_state(self, params: &GenerationParams) -> Result<ArtState> {
        let bounds = params.bounds();
        let amount = self.line_end_points.len();

        let line_width_variations = self.line_width_variations.unwrap_or_else(|| {
            debug!("Snapshot has no width variations, using base width");
            vec![0; amount]
        });

        let curve_control_points: Vec<[Point; 2]> = match self.curve_control_points {
            Some(controls) => {
                if controls.len() != amount {
                    return Err(StateError::LengthMismatch {
                        field: "curve_control_points",
                        expected: amount,
                        actual: controls.len(),
                    }
                    .into());
                }
                controls
                    .into_iter()
                    .enumerate()
                    .map(|(i, controls)| {
                        let end = self.line_end_points[i];
                        controls.upgrade(control_key("control", i, end).seed(), bounds)
                    })
                    .collect()
            }
            None => {
                debug!("Snapshot has no curve controls, synthesizing {}", amount);
                self.line_end_points
                    .iter()
                    .enumerate()
                    .map(|(i, end)| {
                        let mut rng = control_key("controls", i, *end).rng();
                        let mut draw = || {
                            Point::new(
                                rng.gen_range(bounds.min..=bounds.max),
                                rng.gen_range(bounds.min..=bounds.max),
                            )
                        };
                        [draw(), draw()]
                    })
                    .collect()
            }
        };

        let line_start_points = self.line_start_points.unwrap_or_else(|| {
            debug!("Snapshot has no branch data, drawing branches for {} curves", amount);
            let mut rng = SeedKey::new("branches").usize(amount).rng();
            (0..amount).map(|i| LineOrigin::draw(&mut rng, i, amount)).collect()
        });

        let state = ArtState {
            start_color: self.start_clr,
            end_color: self.end_clr,
            background_color: self.image_bg_clr,
            border_color: self.border_clr,
            initial_point: bounds.clamp(self.initial_point),
            line_end_points: self.line_end_points.iter().map(|p| bounds.clamp(*p)).collect(),
            line_width_variations,
            curve_control_points: curve_control_points
                .into_iter()
                .map(|[a, b]| [bounds.clamp(a), bounds.clamp(b)])
                .collect(),
            line_start_points,
        };

        state.validate()?;
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> GenerationParams {
        GenerationParams {
            size: 100,
            amount: 3,
            line_width: 2,
            line_width_variation: 2,
            padding: 5,
            border_width: 1,
        }
    }

    fn sample_state() -> ArtState {
        ArtState {
            start_color: [255, 0, 0],
            end_color: [0, 0, 255],
            background_color: [255, 255, 255],
            border_color: [0, 0, 0],
            initial_point: Point::new(10, 10),
            line_end_points: vec![Point::new(20, 30), Point::new(50, 50), Point::new(80, 20)],
            line_width_variations: vec![0, 1, 2],
            curve_control_points: vec![
                [Point::new(15, 15), Point::new(25, 25)],
                [Point::new(30, 60), Point::new(60, 30)],
                [Point::new(70, 70), Point::new(90, 10)],
            ],
            line_start_points: vec![
                LineOrigin::Continue,
                LineOrigin::BranchFrom(0),
                LineOrigin::Continue,
            ],
        }
    }

    #[test]
    fn test_snapshot_keys() {
        let value: serde_json::Value = serde_json::from_str(&sample_state().to_json().unwrap()).unwrap();
        for key in [
            "start_clr",
            "end_clr",
            "image_bg_clr",
            "border_clr",
            "initial_point",
            "line_end_points",
            "line_width_variations",
            "curve_control_points",
            "line_start_points",
        ] {
            assert!(value.get(key).is_some(), "missing key {}", key);
        }
        assert_eq!(value["line_start_points"], serde_json::json!([null, 0, null]));
        assert_eq!(value["curve_control_points"][0], serde_json::json!([[15, 15], [25, 25]]));
    }

    #[test]
    fn test_json_roundtrip() {
        let state = sample_state();
        let restored = ArtState::from_json(&state.to_json().unwrap(), &params()).unwrap();
        assert_eq!(state, restored);
    }

    #[test]
    fn test_legacy_single_controls_are_upgraded() {
        let json = r#"{
            "start_clr": [255, 0, 0], "end_clr": [0, 0, 255],
            "image_bg_clr": [255, 255, 255], "border_clr": [0, 0, 0],
            "initial_point": [10, 10],
            "line_end_points": [[20, 30], [50, 50]],
            "line_width_variations": [0, 1],
            "curve_control_points": [[15, 15], [40, 40]],
            "line_start_points": [null, 0]
        }"#;

        let state = ArtState::from_json(json, &params()).unwrap();
        assert_eq!(state.curve_control_points[0][0], Point::new(15, 15));
        assert_eq!(state.curve_control_points[1][0], Point::new(40, 40));

        let second = state.curve_control_points[0][1];
        assert!((second.x - 15).abs() <= 50 && (second.y - 15).abs() <= 50);
        assert!(params().bounds().contains(second));

        // Reloading reproduces the synthesized control exactly.
        assert_eq!(state, ArtState::from_json(json, &params()).unwrap());
    }

    #[test]
    fn test_missing_fields_are_reconstructed() {
        let json = r#"{
            "start_clr": [255, 0, 0], "end_clr": [0, 0, 255],
            "image_bg_clr": [255, 255, 255], "border_clr": [0, 0, 0],
            "initial_point": [10, 10],
            "line_end_points": [[20, 30], [50, 50], [80, 20], [60, 60]]
        }"#;

        let state = ArtState::from_json(json, &params()).unwrap();
        assert_eq!(state.amount(), 4);
        assert_eq!(state.line_width_variations, vec![0; 4]);
        assert_eq!(state.curve_control_points.len(), 4);
        assert_eq!(state.line_start_points.len(), 4);
        assert!(state.points().all(|p| params().bounds().contains(p)));
        assert!(state.validate().is_ok());
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let mut state = sample_state();
        state.line_width_variations.pop();
        assert!(matches!(
            state.validate(),
            Err(crate::FlowlineError::State(StateError::LengthMismatch { field: "line_width_variations", .. }))
        ));
    }

    #[test]
    fn test_forward_branch_rejected() {
        let mut state = sample_state();
        state.line_start_points[1] = LineOrigin::BranchFrom(1);
        assert!(matches!(
            state.validate(),
            Err(crate::FlowlineError::State(StateError::InvalidBranch { line: 1, target: 1 }))
        ));
    }

    #[test]
    fn test_line_origin_draw() {
        let mut rng = seeded_rng(1);
        let origins: Vec<_> = (0..20).map(|i| LineOrigin::draw(&mut rng, i, 20)).collect();
        assert_eq!(origins[0], LineOrigin::Continue);
        for (i, origin) in origins.iter().enumerate() {
            match origin {
                LineOrigin::BranchFrom(k) => assert!(*k < i && i < 6),
                LineOrigin::Continue => assert!(i == 0 || i >= 6),
            }
        }
    }

    #[test]
    fn test_truncated() {
        let state = sample_state().truncated(2);
        assert_eq!(state.amount(), 2);
        assert_eq!(state.curve_control_points.len(), 2);
        assert!(state.validate().is_ok());
        assert_eq!(sample_state().truncated(10).amount(), 3);
    }

    #[test]
    fn test_rescale() {
        let from = params();
        let to = GenerationParams { size: 200, padding: 10, ..from };
        let scaled = sample_state().rescale(&from, &to);

        // (x - 5) / 90 * 180 + 10
        assert_eq!(scaled.initial_point, Point::new(20, 20));
        assert_eq!(scaled.line_end_points[1], Point::new(100, 100));
        assert!(scaled.points().all(|p| to.bounds().contains(p)));
        assert_eq!(sample_state().rescale(&from, &from), sample_state());
    }
}
