//! Background layer synthesis.
//!
//! [`BackgroundSpec`] is the tagged union over the supported background
//! kinds. Each variant is a pure data payload plus one production function:
//! [`BackgroundSpec::render`] turns the spec into a [`Canvas`] matching the
//! logo's dimensions. The logo canvas itself is never touched; rendering
//! always starts from a detached copy so the two layers diverge freely.

use std::path::PathBuf;

use palette::Srgb;

use crate::canvas::Canvas;
use crate::error::{Error, Result};
use crate::gradient::GradientTable;

// ============================================================================
// BackgroundSpec
// ============================================================================

/// How an external background image is made square before resizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SquareFit {
    /// Centered crop to the shorter dimension.
    #[default]
    Crop,
    /// Pad the shorter dimension with empty pixels.
    Pad,
}

/// A background fill specification. Exactly one variant is active per
/// generation run.
#[derive(Debug, Clone, PartialEq)]
pub enum BackgroundSpec {
    /// A single flat color.
    Solid(Srgb<f32>),
    /// A linear gradient at the given rotation from the horizontal axis.
    LinearGradient {
        table: GradientTable,
        degree: f64,
    },
    /// A radial gradient from the canvas center.
    RadialGradient { table: GradientTable },
    /// An external image, squared and scaled to fit.
    Image { path: PathBuf, fit: SquareFit },
}

impl BackgroundSpec {
    /// Convenience constructor for an image background with the default
    /// centered-crop fit.
    pub fn image(path: impl Into<PathBuf>) -> Self {
        Self::Image {
            path: path.into(),
            fit: SquareFit::Crop,
        }
    }

    /// Produces the background canvas for the given logo.
    ///
    /// The result always matches the logo's dimensions and never carries
    /// partial transparency. Image decoding failures are surfaced, not
    /// retried.
    pub fn render(&self, logo: &Canvas) -> Result<Canvas> {
        match self {
            // A solid fill is a gradient table collapsed to one color, so
            // the same fill code path serves both.
            Self::Solid(color) => Ok(logo
                .duplicate()
                .fill_linear_gradient(&GradientTable::solid(*color), 0.0)),

            Self::LinearGradient { table, degree } => {
                Ok(logo.duplicate().fill_linear_gradient(table, *degree))
            }

            Self::RadialGradient { table } => Ok(logo.duplicate().fill_radial_gradient(table)),

            Self::Image { path, fit } => {
                if !path.exists() {
                    return Err(Error::FileNotFound(path.clone()));
                }
                let decoded = image::open(path)?.to_rgba8();
                let squared = match fit {
                    SquareFit::Crop => Canvas::from_image(decoded).crop_to_square(),
                    SquareFit::Pad => Canvas::from_image(decoded).square_with_empty_pixels(0),
                };
                Ok(squared
                    .resize(logo.width(), logo.height())
                    .remove_alpha())
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
