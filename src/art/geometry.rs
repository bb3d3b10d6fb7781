use serde::{Deserialize, Serialize};

/// A 2D integer pixel coordinate, persisted as `[x, y]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "[i32; 2]", into = "[i32; 2]")]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<[i32; 2]> for Point {
    fn from([x, y]: [i32; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point> for [i32; 2] {
    fn from(point: Point) -> Self {
        [point.x, point.y]
    }
}

/// Inclusive square region every coordinate is clamped into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min: i32,
    pub max: i32,
}

impl Bounds {
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    /// `[padding, size - padding - 1]`, with a padding of 0 treated as 1
    pub fn padded(size: u32, padding: u32) -> Self {
        let padding = effective_padding(padding) as i32;
        Self {
            min: padding,
            max: size as i32 - padding - 1,
        }
    }

    pub fn contains(&self, point: Point) -> bool {
        (self.min..=self.max).contains(&point.x) && (self.min..=self.max).contains(&point.y)
    }

    pub fn clamp(&self, point: Point) -> Point {
        Point::new(
            point.x.clamp(self.min, self.max),
            point.y.clamp(self.min, self.max),
        )
    }

    /// Truncate a floating point position toward zero and clamp it
    pub fn clamp_truncated(&self, x: f64, y: f64) -> Point {
        Point::new(self.clamp_axis(x.trunc()), self.clamp_axis(y.trunc()))
    }

    /// Round a floating point position to the nearest pixel and clamp it
    pub fn clamp_rounded(&self, x: f64, y: f64) -> Point {
        Point::new(self.clamp_axis(x.round()), self.clamp_axis(y.round()))
    }

    /// NaN has no side to clamp toward and lands on the center
    fn clamp_axis(&self, value: f64) -> i32 {
        if value.is_nan() {
            return self.min + (self.max - self.min) / 2;
        }
        value.clamp(f64::from(self.min), f64::from(self.max)) as i32
    }
}

/// Padding actually applied to an image; zero padding still keeps a one pixel margin
pub fn effective_padding(padding: u32) -> u32 {
    padding.max(1)
}
