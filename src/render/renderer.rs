use tracing::debug;

use crate::{
    art::{
        color::interpolate,
        geometry::Point,
        params::GenerationParams,
        state::{ArtState, LineOrigin},
    },
    error::{RenderError, Result},
    render::{
        canvas::{Canvas, SkiaCanvas},
        frame::Frame,
    },
};

/// Default number of straight segments a curve is tessellated into
pub const DEFAULT_BEZIER_SEGMENTS: usize = 30;

/// Rasterizes an [`ArtState`]
///
/// Rendering is a pure function of the state and the parameters: the same inputs always
/// produce the same pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticRenderer {
    segments: usize,
}

impl Default for StaticRenderer {
    fn default() -> Self {
        Self {
            segments: DEFAULT_BEZIER_SEGMENTS,
        }
    }
}

impl StaticRenderer {
    /// Renderer tessellating each curve into `segments` pieces (at least one)
    pub fn with_segments(segments: usize) -> Self {
        Self {
            segments: segments.max(1),
        }
    }

    pub fn segments(&self) -> usize {
        self.segments
    }

    /// Render onto a [`SkiaCanvas`] and return the pixels
    pub fn render(&self, state: &ArtState, params: &GenerationParams) -> Result<Frame> {
        self.render_with::<SkiaCanvas>(state, params)?.into_frame()
    }

    /// Render onto any [`Canvas`]
    ///
    /// Draw order: background, border, then every curve in sequence so later curves
    /// paint over earlier ones.
    pub fn render_with<C: Canvas>(&self, state: &ArtState, params: &GenerationParams) -> Result<C> {
        if params.size == 0 {
            return Err(RenderError::InvalidDimensions {
                width: params.size,
                height: params.size,
            }
            .into());
        }
        state.validate()?;

        let mut canvas = C::new_image(params.size, params.size, state.background_color)?;
        canvas.stroke_rect(0, state.border_color, params.border_width);

        let amount = state.amount();
        let mut last_point = state.initial_point;
        // Branch targets: the initial point followed by every end point drawn so far.
        let mut previous_points = Vec::with_capacity(amount + 1);
        previous_points.push(state.initial_point);

        for i in 0..amount {
            let end = state.line_end_points[i];
            let [control1, control2] = state.curve_control_points[i];
            let start = match state.line_start_points[i] {
                LineOrigin::Continue => last_point,
                LineOrigin::BranchFrom(k) => previous_points.get(k).copied().unwrap_or(last_point),
            };

            let factor = if amount > 1 {
                i as f64 / (amount - 1) as f64
            } else {
                0.0
            };
            let color = interpolate(state.start_color, state.end_color, factor);
            let width = params
                .line_width
                .saturating_add(state.line_width_variations[i])
                .clamp(1, params.size);

            let points = self.tessellate(start, control1, control2, end);
            canvas.stroke_polyline(&points, color, width);

            last_point = end;
            previous_points.push(end);
        }

        debug!("Rendered {} curves at {}px", amount, params.size);
        Ok(canvas)
    }

    /// Render and encode as PNG
    pub fn render_png(&self, state: &ArtState, params: &GenerationParams) -> Result<Vec<u8>> {
        self.render(state, params)?.encode_png()
    }

    /// Sample a cubic Bézier at `segments + 1` evenly spaced parameters, truncating to pixels
    fn tessellate(&self, p0: Point, p1: Point, p2: Point, p3: Point) -> Vec<Point> {
        let coord = |t: f64, a: i32, b: i32, c: i32, d: i32| {
            let mt = 1.0 - t;
            let value = mt.powi(3) * f64::from(a)
                + 3.0 * mt.powi(2) * t * f64::from(b)
                + 3.0 * mt * t.powi(2) * f64::from(c)
                + t.powi(3) * f64::from(d);
            value.trunc() as i32
        };

        (0..=self.segments)
            .map(|step| {
                let t = step as f64 / self.segments as f64;
                Point::new(
                    coord(t, p0.x, p1.x, p2.x, p3.x),
                    coord(t, p0.y, p1.y, p2.y, p3.y),
                )
            })
            .collect()
    }
}
