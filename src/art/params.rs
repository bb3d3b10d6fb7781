use serde::{Deserialize, Serialize};

use crate::{
    art::geometry::{effective_padding, Bounds},
    error::{ConfigError, Result},
};

/// Scalar knobs of one artwork
///
/// `size` and `padding` describe the canvas and stay fixed for a whole animation;
/// every other field may be interpolated between a start and an end set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationParams {
    /// Width and height of the square image in pixels
    pub size: u32,

    /// Number of curves
    pub amount: usize,

    /// Base stroke width of every curve
    pub line_width: u32,

    /// Maximum extra width drawn per curve
    pub line_width_variation: u32,

    /// Margin kept free of geometry on every side
    pub padding: u32,

    /// Width of the frame drawn around the image
    pub border_width: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            size: 512,
            amount: 40,
            line_width: 3,
            line_width_variation: 4,
            padding: 16,
            border_width: 6,
        }
    }
}

impl GenerationParams {
    /// Check the preconditions generation and rendering rely on
    pub fn validate(&self) -> Result<()> {
        if self.size == 0 {
            return Err(ConfigError::invalid("generation.size", self.size).into());
        }

        if self.amount == 0 {
            return Err(ConfigError::invalid("generation.amount", self.amount).into());
        }

        // The padded region must hold at least one pixel.
        let padding = effective_padding(self.padding);
        if self.size < 2 * padding + 1 {
            return Err(ConfigError::InvalidValue {
                key: "generation.padding".to_string(),
                value: format!("{} (size {})", self.padding, self.size),
            }
            .into());
        }

        Ok(())
    }

    /// Region all coordinates of an artwork with these parameters live in
    pub fn bounds(&self) -> Bounds {
        Bounds::padded(self.size, self.padding)
    }

    /// Blend toward `end` by `factor`
    ///
    /// The factor is not limited to `[0, 1]`, so values extrapolate past `end`; results
    /// are truncated and never drop below zero. Widths never exceed the image size.
    /// `size` and `padding` are kept from `self`.
    pub fn interpolate(&self, end: &GenerationParams, factor: f64) -> Self {
        let blend = |from: f64, to: f64| {
            let value = (from + (to - from) * factor).trunc();
            if value.is_nan() {
                0.0
            } else {
                value.max(0.0)
            }
        };
        let width = |from: u32, to: u32| blend(f64::from(from), f64::from(to)).min(f64::from(self.size)) as u32;

        Self {
            size: self.size,
            amount: blend(self.amount as f64, end.amount as f64) as usize,
            line_width: width(self.line_width, end.line_width),
            line_width_variation: width(self.line_width_variation, end.line_width_variation),
            padding: self.padding,
            border_width: width(self.border_width, end.border_width),
        }
    }
}
