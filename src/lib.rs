//! iconloom: turn one logo into a full family of icon assets.
//!
//! The crate takes a single source raster image and produces the resized,
//! padded, masked, and composited variants each platform wants: Android
//! launcher icons (legacy and adaptive), notification icons, the Play Store
//! logo, and the iOS app icon set with its `Contents.json` manifest.
//!
//! The building blocks compose freely:
//!
//! - [`Canvas`] — an owned RGBA buffer with chainable transforms
//! - [`GradientTable`] — color keypoints for synthesized background fills
//! - [`BackgroundSpec`] — solid / linear / radial / image background variants
//! - [`AssetBatch`] — fans one canvas out over a table of [`AssetDescriptor`]s
//! - [`AssetWriter`] — encodes and persists variants and manifests
//!
//! # Example
//!
//! ```
//! use iconloom::{AlphaThreshold, BackgroundSpec, Canvas};
//! use image::{Rgba, RgbaImage};
//! use palette::Srgb;
//!
//! // Normalize a logo, derive a background, and composite the two.
//! let logo = Canvas::from_image(RgbaImage::from_pixel(64, 64, Rgba([20, 40, 60, 255])))
//!     .square_with_empty_pixels(8);
//! let background = BackgroundSpec::Solid(Srgb::new(1.0, 1.0, 1.0))
//!     .render(&logo)
//!     .unwrap();
//! let icon = background
//!     .stack_with_no_alpha(AlphaThreshold::new(0.5).unwrap(), std::slice::from_ref(&logo))
//!     .clip_rounded_rect(0.2)
//!     .resize_square(512);
//! assert_eq!(icon.width(), 512);
//! ```
//!
//! The platform entry points wrap these blocks into complete flows; see
//! [`platform::generate_all`] and the [`platform::android`] /
//! [`platform::ios`] modules. Resolved run options round-trip through JSON
//! as a [`GenerationRecipe`].

mod background;
mod batch;
mod canvas;
mod error;
mod gradient;
mod recipe;
mod writer;

pub mod platform;

pub use background::{BackgroundSpec, SquareFit};
pub use batch::{AssetBatch, AssetCanvas, AssetDescriptor, PaddingRule, SizeRule};
pub use canvas::{AlphaThreshold, Canvas, SizePx};
pub use error::{Error, Result};
pub use gradient::{GradientStop, GradientTable};
pub use platform::android::AndroidResFolder;
pub use platform::generate_all;
pub use recipe::{BackgroundKind, BackgroundSettings, GenerationRecipe};
pub use writer::{AssetWriter, ImageEncoding, SourceImage};
