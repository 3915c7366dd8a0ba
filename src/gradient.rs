//! Gradient synthesis for background fills.
//!
//! A [`GradientTable`] holds the color keypoints of a gradient; each stop
//! position lives in `[0, 1]`. Sampling scans the stops pairwise and blends
//! adjacent colors perceptually (in Lch, the cylindrical Lab space), so
//! midpoints stay vivid instead of washing out the way naive RGB averaging
//! does. Supply stops in ascending position order.

use image::{Rgba, RgbaImage};
use palette::{Clamp, IntoColor, Lch, Mix, Srgb};

use crate::error::{Error, Result};

// ============================================================================
// GradientStop / GradientTable
// ============================================================================

/// A color keypoint with its position in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub color: Srgb<f32>,
    pub position: f64,
}

impl GradientStop {
    pub fn new(color: Srgb<f32>, position: f64) -> Self {
        Self { color, position }
    }
}

/// An ordered, non-empty sequence of gradient stops.
///
/// Constructed once from caller input and immutable thereafter.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientTable {
    stops: Vec<GradientStop>,
}

impl GradientTable {
    /// Wraps a stop sequence. Fails on an empty sequence.
    pub fn new(stops: Vec<GradientStop>) -> Result<Self> {
        if stops.is_empty() {
            return Err(Error::EmptyGradientTable);
        }
        Ok(Self { stops })
    }

    /// Zips parallel color and stop-position lists into a table.
    ///
    /// Fails when the lists differ in length or are empty.
    pub fn from_colors_and_stops(colors: &[Srgb<f32>], positions: &[f64]) -> Result<Self> {
        if colors.len() != positions.len() {
            return Err(Error::MismatchedGradientStops {
                colors: colors.len(),
                stops: positions.len(),
            });
        }
        Self::new(
            colors
                .iter()
                .zip(positions)
                .map(|(&color, &position)| GradientStop::new(color, position))
                .collect(),
        )
    }

    /// A table collapsed to a single color.
    ///
    /// Sampling it yields that color at every `t`; solid fills reuse the
    /// gradient code path through this.
    pub fn solid(color: Srgb<f32>) -> Self {
        Self {
            stops: vec![GradientStop::new(color, 0.0)],
        }
    }

    pub fn stops(&self) -> &[GradientStop] {
        &self.stops
    }

    /// Samples the table at `t`.
    ///
    /// If `t` falls between two adjacent stops the result is a perceptual
    /// blend proportional to the local fraction. At or before the first
    /// stop's position the first color is returned unmodified; at or past
    /// the last, the last color. `t` may be unclamped.
    pub fn color_at(&self, t: f64) -> Srgb<f32> {
        for pair in self.stops.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if a.position <= t && t <= b.position {
                let span = b.position - a.position;
                if span <= f64::EPSILON {
                    return a.color;
                }
                let local = (t - a.position) / span;
                // Exact endpoints skip the color-space round trip.
                if local <= 0.0 {
                    return a.color;
                }
                if local >= 1.0 {
                    return b.color;
                }
                return blend_perceptual(a.color, b.color, local as f32);
            }
        }

        if t <= self.stops[0].position {
            self.stops[0].color
        } else {
            self.stops[self.stops.len() - 1].color
        }
    }
}

/// Blends two colors in Lch and clamps the result back into sRGB gamut.
fn blend_perceptual(a: Srgb<f32>, b: Srgb<f32>, factor: f32) -> Srgb<f32> {
    let a_lch: Lch = a.into_color();
    let b_lch: Lch = b.into_color();
    let mixed: Srgb = a_lch.mix(b_lch, factor).into_color();
    mixed.clamp()
}

// ============================================================================
// Fills
// ============================================================================

/// Paints a linear gradient across a `width` x `height` buffer.
///
/// Every pixel is projected onto the unit direction vector given by
/// `degree` (rotation from the horizontal axis); the projection is
/// normalized against the min/max projections of the four canvas corners,
/// so the gradient band exactly spans the rectangle at any angle.
pub(crate) fn linear_fill(table: &GradientTable, degree: f64, width: u32, height: u32) -> RgbaImage {
    let theta = degree.to_radians();
    let (ux, uy) = (theta.cos(), theta.sin());

    let (w, h) = (f64::from(width), f64::from(height));
    let corners = [(0.0, 0.0), (w, 0.0), (0.0, h), (w, h)];

    let mut r_min = f64::INFINITY;
    let mut r_max = f64::NEG_INFINITY;
    for (cx, cy) in corners {
        let r = cx * ux + cy * uy;
        r_min = r_min.min(r);
        r_max = r_max.max(r);
    }
    let span = (r_max - r_min).max(f64::EPSILON);

    RgbaImage::from_fn(width, height, |x, y| {
        let r = f64::from(x) * ux + f64::from(y) * uy;
        to_rgba(table.color_at((r - r_min) / span))
    })
}

/// Paints a radial gradient across a `width` x `height` buffer.
///
/// Distance from the canvas center is normalized by half the shorter
/// dimension; values past `1` land on the table's last stop.
pub(crate) fn radial_fill(table: &GradientTable, width: u32, height: u32) -> RgbaImage {
    let cx = f64::from(width / 2);
    let cy = f64::from(height / 2);
    let radius = (f64::from(width.min(height)) / 2.0).max(f64::EPSILON);

    RgbaImage::from_fn(width, height, |x, y| {
        let dx = f64::from(x) - cx;
        let dy = f64::from(y) - cy;
        to_rgba(table.color_at((dx * dx + dy * dy).sqrt() / radius))
    })
}

fn to_rgba(color: Srgb<f32>) -> Rgba<u8> {
    let c = color.into_format::<u8>();
    Rgba([c.red, c.green, c.blue, 255])
}

// ============================================================================
// Tests
// ============================================================================
