//! The pixel-buffer pipeline at the heart of asset generation.
//!
//! [`Canvas`] owns an RGBA buffer and exposes the chainable transforms the
//! generation flows are built from: squaring, padding, trimming, recoloring,
//! alpha binarization, rounded-rect clipping, and layer stacking. Every
//! operation consumes the canvas and returns the new owning value, so flows
//! read as a single chain with explicit ownership transfer.
//!
//! Cloning a `Canvas` is cheap: the buffer lives behind an [`Arc`] and is
//! only materialized anew when an operation actually produces different
//! pixels. Use [`Canvas::duplicate`] when two divergent branches (logo and
//! background) must never alias.

use std::sync::Arc;

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use palette::Srgb;

use crate::error::{Error, Result};
use crate::gradient::{self, GradientTable};

// ============================================================================
// SizePx
// ============================================================================

/// A 2D size in pixel units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SizePx {
    pub width: u32,
    pub height: u32,
}

impl SizePx {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns true if width equals height.
    pub fn is_square(&self) -> bool {
        self.width == self.height
    }

    /// Returns the longer of the two axes.
    pub fn max_axis(&self) -> u32 {
        self.width.max(self.height)
    }
}

// ============================================================================
// AlphaThreshold
// ============================================================================

/// An alpha cutoff in `[0, 1]`, with `-1` meaning "disabled".
///
/// Partially transparent pixels whose alpha fraction exceeds the threshold
/// are treated as opaque by [`Canvas::remove_alpha_on_threshold`] and
/// [`Canvas::stack_with_no_alpha`]; the rest are treated as transparent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlphaThreshold(f64);

impl AlphaThreshold {
    /// The sentinel value that disables threshold handling.
    pub const DISABLED: Self = Self(-1.0);

    /// Validates and wraps a threshold value.
    ///
    /// Accepts values in `[0, 1]` or exactly `-1` for the disabled sentinel.
    pub fn new(value: f64) -> Result<Self> {
        if value == -1.0 || (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(Error::OptionOutOfRange {
                option: "alpha-threshold",
                value,
                min: -1.0,
                max: 1.0,
            })
        }
    }

    /// Returns true unless this is the disabled sentinel.
    pub fn is_enabled(&self) -> bool {
        self.0 >= 0.0
    }

    /// The cutoff as a fraction of full opacity.
    pub fn fraction(&self) -> f64 {
        self.0
    }

    /// True when the given alpha byte is strictly above the cutoff.
    fn exceeded_by(&self, alpha: u8) -> bool {
        f64::from(alpha) > 255.0 * self.0
    }
}

impl Default for AlphaThreshold {
    fn default() -> Self {
        Self::DISABLED
    }
}

// ============================================================================
// Canvas
// ============================================================================

const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// An owned RGBA pixel buffer with chainable transform operations.
///
/// Width and height are always positive. Clones share the underlying buffer
/// until a transform produces new pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    pixels: Arc<RgbaImage>,
}

impl Canvas {
    /// Wraps a decoded RGBA buffer.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero.
    pub fn from_image(image: RgbaImage) -> Self {
        assert!(
            image.width() > 0 && image.height() > 0,
            "canvas dimensions must be positive"
        );
        Self {
            pixels: Arc::new(image),
        }
    }

    /// Creates a fully transparent canvas of the given size.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self::from_image(RgbaImage::from_pixel(width, height, CLEAR))
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> SizePx {
        SizePx::new(self.width(), self.height())
    }

    /// Returns the backing buffer.
    pub fn image(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Unwraps into the backing buffer, copying only if the buffer is shared.
    pub fn into_image(self) -> RgbaImage {
        Arc::try_unwrap(self.pixels).unwrap_or_else(|shared| (*shared).clone())
    }

    /// Returns the pixel at the given coordinate.
    pub fn pixel(&self, x: u32, y: u32) -> Rgba<u8> {
        *self.pixels.get_pixel(x, y)
    }

    /// Forces a detached deep copy of the buffer.
    ///
    /// Divergent branches over the same normalized canvas (logo vs.
    /// background source) start from a duplicate so they can never alias.
    pub fn duplicate(&self) -> Self {
        Self::from_image((*self.pixels).clone())
    }

    /// Applies `f` when `condition` holds, passes through unchanged otherwise.
    pub fn apply_if(self, condition: bool, f: impl FnOnce(Self) -> Self) -> Self {
        if condition { f(self) } else { self }
    }

    /// Rebuilds the buffer pixel by pixel, keeping the dimensions.
    fn update_pixels<F>(self, f: F) -> Self
    where
        F: Fn(u32, u32, Rgba<u8>) -> Rgba<u8>,
    {
        let src = &self.pixels;
        let out = RgbaImage::from_fn(src.width(), src.height(), |x, y| {
            f(x, y, *src.get_pixel(x, y))
        });
        Self::from_image(out)
    }

    // ---- Geometry ----

    /// Bilinear scale to the target size. No-op if already there.
    pub fn resize(self, width: u32, height: u32) -> Self {
        if self.width() == width && self.height() == height {
            return self;
        }
        let out = imageops::resize(&*self.pixels, width, height, FilterType::Triangle);
        Self::from_image(out)
    }

    /// Bilinear scale to a square of the given side.
    pub fn resize_square(self, side: u32) -> Self {
        self.resize(side, side)
    }

    /// Pads the shorter dimension with transparent pixels until the canvas is
    /// square, centering the original content, then adds `extra_pad`
    /// transparent pixels on every side.
    ///
    /// Original pixels are preserved unscaled inside the centered window;
    /// border pixels are fully transparent, never sampled or duplicated.
    pub fn square_with_empty_pixels(self, extra_pad: u32) -> Self {
        let (w, h) = (self.width(), self.height());
        if w == h && extra_pad == 0 {
            return self;
        }

        let side = w.max(h) + 2 * extra_pad;
        let mut out = RgbaImage::from_pixel(side, side, CLEAR);
        imageops::replace(
            &mut out,
            &*self.pixels,
            i64::from((side - w) / 2),
            i64::from((side - h) / 2),
        );
        Self::from_image(out)
    }

    /// Grows the canvas by `n` transparent pixels on every edge.
    pub fn pad(self, n: u32) -> Self {
        if n == 0 {
            return self;
        }

        let (w, h) = (self.width(), self.height());
        let mut out = RgbaImage::from_pixel(w + 2 * n, h + 2 * n, CLEAR);
        imageops::replace(&mut out, &*self.pixels, i64::from(n), i64::from(n));
        Self::from_image(out)
    }

    /// Crops away the fully transparent border runs on all four edges.
    ///
    /// Only rows and columns that are transparent across their entire length
    /// count; interior transparent holes are never trimmed. A canvas with no
    /// opaque content at all is returned unchanged.
    pub fn trim_whitespace(self) -> Self {
        let img = &*self.pixels;
        let (w, h) = img.dimensions();

        // The vertical and horizontal sweeps are independent reads of the
        // same buffer and run as two parallel tasks.
        let ((top, bottom), (left, right)) = rayon::join(
            || transparent_row_runs(img),
            || transparent_column_runs(img),
        );

        if top + bottom >= h || left + right >= w {
            return self;
        }
        if top == 0 && bottom == 0 && left == 0 && right == 0 {
            return self;
        }

        let cropped =
            imageops::crop_imm(img, left, top, w - left - right, h - top - bottom).to_image();
        Self::from_image(cropped)
    }

    /// Centered crop to the shorter dimension. No-op if already square.
    pub fn crop_to_square(self) -> Self {
        let (w, h) = (self.width(), self.height());
        if w == h {
            return self;
        }

        let side = w.min(h);
        let cropped =
            imageops::crop_imm(&*self.pixels, (w - side) / 2, (h - side) / 2, side, side)
                .to_image();
        Self::from_image(cropped)
    }

    // ---- Color ----

    /// Replaces every pixel that is not fully transparent with `color` at
    /// full opacity, discarding its original hue. Used for monochrome
    /// silhouettes and solid-mask variants.
    pub fn convert_non_opaque_to_color(self, color: Srgb<u8>) -> Self {
        let fill = Rgba([color.red, color.green, color.blue, 255]);
        self.update_pixels(|_, _, px| if px[3] == 0 { px } else { fill })
    }

    /// Forces every pixel to full opacity.
    pub fn remove_alpha(self) -> Self {
        self.update_pixels(|_, _, px| Rgba([px[0], px[1], px[2], 255]))
    }

    /// Binarizes anti-aliased edges: partially transparent pixels become
    /// fully opaque when their alpha fraction exceeds `threshold`, fully
    /// transparent otherwise. Fully opaque and fully transparent pixels pass
    /// through unchanged. No-op when the threshold is disabled.
    pub fn remove_alpha_on_threshold(self, threshold: AlphaThreshold) -> Self {
        if !threshold.is_enabled() {
            return self;
        }
        self.update_pixels(|_, _, px| match px[3] {
            0 | 255 => px,
            a if threshold.exceeded_by(a) => Rgba([px[0], px[1], px[2], 255]),
            _ => Rgba([px[0], px[1], px[2], 0]),
        })
    }

    // ---- Clipping ----

    /// Clears the four corner regions outside a rounded rectangle.
    ///
    /// The corner radius is `percent_radius` of half the longer axis.
    /// `percent_radius >= 1` degenerates to a full circular clip; values at
    /// or below zero are a no-op. Non-corner regions are untouched.
    pub fn clip_rounded_rect(self, percent_radius: f64) -> Self {
        if percent_radius <= 0.0 {
            return self;
        }
        if percent_radius >= 1.0 {
            return self.clip_to_circle();
        }

        let (w, h) = (self.width(), self.height());
        let radius = ((f64::from(w.max(h)) / 2.0).floor() * percent_radius) as i64;
        self.update_pixels(|x, y, px| {
            if in_clipped_corner(i64::from(x), i64::from(y), i64::from(w), i64::from(h), radius)
            {
                CLEAR
            } else {
                px
            }
        })
    }

    /// Clears every pixel outside a centered circle of radius
    /// `max(width, height) / 2`.
    pub fn clip_to_circle(self) -> Self {
        let (w, h) = (self.width(), self.height());
        let radius = f64::from(w.max(h)) / 2.0;
        let cx = f64::from(w) / 2.0;
        let cy = f64::from(h) / 2.0;

        self.update_pixels(|x, y, px| {
            let dx = f64::from(x) - cx;
            let dy = f64::from(y) - cy;
            if (dx * dx + dy * dy).sqrt() <= radius {
                px
            } else {
                CLEAR
            }
        })
    }

    // ---- Compositing ----

    /// Flattens layers with a plain alpha test.
    ///
    /// `self` is the bottommost layer; `overlays` are ordered bottom-to-top.
    /// For each pixel the topmost layer with non-zero alpha wins; if none
    /// match, the pixel is fully transparent. All layers must share this
    /// canvas's dimensions.
    pub fn stack(self, overlays: &[Canvas]) -> Self {
        for layer in overlays {
            debug_assert_eq!(layer.dimensions(), self.dimensions());
        }
        self.update_pixels(|x, y, base| {
            for layer in overlays.iter().rev() {
                let px = *layer.pixels.get_pixel(x, y);
                if px[3] != 0 {
                    return px;
                }
            }
            if base[3] != 0 { base } else { CLEAR }
        })
    }

    /// Flattens layers while stripping partial transparency.
    ///
    /// Per pixel, scanning topmost first: a fully opaque pixel is selected
    /// immediately; a fully transparent one is skipped; a partially
    /// transparent one is selected (forced opaque) when its alpha fraction
    /// exceeds `threshold`. The bottommost layer (`self`) is the guaranteed
    /// last resort: its pixel is forced to full opacity when the scan
    /// reaches it, so the result never has a transparent hole.
    ///
    /// With a disabled threshold this is exactly [`Canvas::stack`].
    pub fn stack_with_no_alpha(self, threshold: AlphaThreshold, overlays: &[Canvas]) -> Self {
        if !threshold.is_enabled() {
            return self.stack(overlays);
        }

        for layer in overlays {
            debug_assert_eq!(layer.dimensions(), self.dimensions());
        }
        self.update_pixels(|x, y, base| {
            for layer in overlays.iter().rev() {
                let px = *layer.pixels.get_pixel(x, y);
                match px[3] {
                    255 => return px,
                    0 => continue,
                    a if threshold.exceeded_by(a) => return Rgba([px[0], px[1], px[2], 255]),
                    _ => continue,
                }
            }
            Rgba([base[0], base[1], base[2], 255])
        })
    }

    // ---- Gradient fills ----

    /// Replaces the buffer with a linear gradient across the current size.
    pub fn fill_linear_gradient(self, table: &GradientTable, degree: f64) -> Self {
        let (w, h) = (self.width(), self.height());
        Self::from_image(gradient::linear_fill(table, degree, w, h))
    }

    /// Replaces the buffer with a radial gradient across the current size.
    pub fn fill_radial_gradient(self, table: &GradientTable) -> Self {
        let (w, h) = (self.width(), self.height());
        Self::from_image(gradient::radial_fill(table, w, h))
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Counts the fully transparent row runs at the top and bottom edges.
fn transparent_row_runs(img: &RgbaImage) -> (u32, u32) {
    let h = img.height();
    let row_clear = |y: u32| (0..img.width()).all(|x| img.get_pixel(x, y)[3] == 0);

    let top = (0..h).take_while(|&y| row_clear(y)).count() as u32;
    if top == h {
        return (h, 0);
    }
    let bottom = (0..h).rev().take_while(|&y| row_clear(y)).count() as u32;
    (top, bottom)
}

/// Counts the fully transparent column runs at the left and right edges.
fn transparent_column_runs(img: &RgbaImage) -> (u32, u32) {
    let w = img.width();
    let column_clear = |x: u32| (0..img.height()).all(|y| img.get_pixel(x, y)[3] == 0);

    let left = (0..w).take_while(|&x| column_clear(x)).count() as u32;
    if left == w {
        return (w, 0);
    }
    let right = (0..w).rev().take_while(|&x| column_clear(x)).count() as u32;
    (left, right)
}

/// True when `(x, y)` lies in a corner window but outside the quarter circle
/// of radius `r` centered at the inset corner point.
fn in_clipped_corner(x: i64, y: i64, w: i64, h: i64, r: i64) -> bool {
    let outside = |dx: i64, dy: i64| dx * dx + dy * dy > r * r;

    if x < r && y < r {
        return outside(x - r, y - r);
    }
    if x < r && y >= h - r {
        return outside(x - r, y - (h - r));
    }
    if x >= w - r && y < r {
        return outside(x - (w - r), y - r);
    }
    if x >= w - r && y >= h - r {
        return outside(x - (w - r), y - (h - r));
    }
    false
}

// ============================================================================
// Tests
// ============================================================================
