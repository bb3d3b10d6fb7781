use image::RgbImage;
use tiny_skia::{LineCap, LineJoin, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};

use crate::{
    art::{color::Color, geometry::Point},
    error::{RenderError, Result},
    render::frame::Frame,
};

/// Raster surface the renderer draws onto
///
/// The renderer only ever needs a filled background, a rectangular outline and stroked
/// polylines; curves are tessellated before they reach the canvas.
pub trait Canvas: Sized {
    /// Create a `width` x `height` surface filled with `background`
    fn new_image(width: u32, height: u32, background: Color) -> Result<Self>;

    /// Stroke the outline of the rectangle `inset` pixels in from the edges
    ///
    /// The stroke grows inward: a `width` of 3 covers three pixel rows on each side.
    fn stroke_rect(&mut self, inset: u32, color: Color, width: u32);

    /// Stroke a polyline of the given width through the centers of `points`
    fn stroke_polyline(&mut self, points: &[Point], color: Color, width: u32);

    /// Finish drawing and hand over the pixels
    fn into_frame(self) -> Result<Frame>;
}

/// [`Canvas`] backed by a `tiny_skia` pixmap
///
/// Everything is painted opaque and without anti-aliasing, so every pixel carries exactly
/// one of the colors of the artwork.
#[derive(Debug, Clone)]
pub struct SkiaCanvas {
    pixmap: Pixmap,
}

impl SkiaCanvas {
    fn fill_rect(&mut self, x: i64, y: i64, width: i64, height: i64, paint: &Paint) {
        if let Some(rect) = Rect::from_xywh(x as f32, y as f32, width as f32, height as f32) {
            self.pixmap.fill_rect(rect, paint, Transform::identity(), None);
        }
    }
}

fn solid_paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color[0], color[1], color[2], 255);
    paint.anti_alias = false;
    paint
}

impl Canvas for SkiaCanvas {
    fn new_image(width: u32, height: u32, background: Color) -> Result<Self> {
        let mut pixmap = Pixmap::new(width, height).ok_or(RenderError::InvalidDimensions { width, height })?;
        pixmap.fill(tiny_skia::Color::from_rgba8(background[0], background[1], background[2], 255));
        Ok(Self { pixmap })
    }

    fn stroke_rect(&mut self, inset: u32, color: Color, width: u32) {
        let (w, h) = (i64::from(self.pixmap.width()), i64::from(self.pixmap.height()));
        let inset = i64::from(inset);
        let (inner_w, inner_h) = (w - 2 * inset, h - 2 * inset);
        if width == 0 || inner_w <= 0 || inner_h <= 0 {
            return;
        }
        let band = i64::from(width);
        let paint = solid_paint(color);

        // Four bands; where they meet the band is painted twice.
        self.fill_rect(inset, inset, inner_w, band.min(inner_h), &paint);
        self.fill_rect(inset, inset + (inner_h - band).max(0), inner_w, band.min(inner_h), &paint);
        self.fill_rect(inset, inset, band.min(inner_w), inner_h, &paint);
        self.fill_rect(inset + (inner_w - band).max(0), inset, band.min(inner_w), inner_h, &paint);
    }

    fn stroke_polyline(&mut self, points: &[Point], color: Color, width: u32) {
        let Some(&first) = points.first() else {
            return;
        };
        let paint = solid_paint(color);
        let width = width.max(1);

        // A curve collapsed onto one pixel still leaves a square dot.
        if points.iter().all(|&p| p == first) {
            let half = i64::from(width / 2);
            let size = i64::from(width);
            self.fill_rect(i64::from(first.x) - half, i64::from(first.y) - half, size, size, &paint);
            return;
        }

        let center = |p: Point| (p.x as f32 + 0.5, p.y as f32 + 0.5);
        let mut builder = PathBuilder::new();
        let (x, y) = center(first);
        builder.move_to(x, y);
        for &point in &points[1..] {
            let (x, y) = center(point);
            builder.line_to(x, y);
        }
        let Some(path) = builder.finish() else {
            return;
        };

        let stroke = Stroke {
            width: width as f32,
            line_cap: LineCap::Square,
            line_join: LineJoin::Round,
            ..Stroke::default()
        };
        self.pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }

    fn into_frame(self) -> Result<Frame> {
        let (width, height) = (self.pixmap.width(), self.pixmap.height());
        // Opaque pixels: premultiplied RGBA equals straight RGBA.
        let rgb: Vec<u8> = self
            .pixmap
            .data()
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect();
        let buffer = RgbImage::from_raw(width, height, rgb).ok_or(RenderError::InvalidDimensions { width, height })?;
        Ok(Frame::new(buffer))
    }
}
