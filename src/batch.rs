//! Asset descriptors and the variant expander.
//!
//! An [`AssetDescriptor`] is immutable, declarative data: a name, a size
//! rule, an optional padding rule, and the output subdirectory the variant
//! lands in. Platform tables are plain lists of descriptors passed in as
//! explicit parameters.
//!
//! [`AssetBatch`] expands one normalized [`Canvas`] into one replica per
//! descriptor. Replicas share the source buffer until their first mutation
//! (a logical copy), then diverge independently.

use crate::canvas::{Canvas, SizePx};
use crate::error::Result;
use crate::writer::AssetWriter;

// ============================================================================
// Size & padding rules
// ============================================================================

/// Computes a variant's target size from the source's natural bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SizeRule {
    /// An absolute pixel size.
    Exact { width: u32, height: u32 },
    /// A density bucket: the natural bounds are reduced to a base size by
    /// the table's maximum scale factor, then multiplied by this bucket's
    /// factor. The densest bucket reproduces the natural bounds.
    Density { factor: f64, max_factor: f64 },
}

impl SizeRule {
    /// The square variant of [`SizeRule::Exact`].
    pub fn exact_square(side: u32) -> Self {
        Self::Exact {
            width: side,
            height: side,
        }
    }

    fn resolve(&self, natural: SizePx) -> SizePx {
        match *self {
            Self::Exact { width, height } => SizePx::new(width, height),
            Self::Density { factor, max_factor } => {
                let base_w = (f64::from(natural.width) / max_factor).floor();
                let base_h = (f64::from(natural.height) / max_factor).floor();
                SizePx::new(
                    ((base_w * factor).floor() as u32).max(1),
                    ((base_h * factor).floor() as u32).max(1),
                )
            }
        }
    }
}

/// Computes the transparent padding applied around a variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PaddingRule {
    /// A fixed pixel amount per edge.
    Pixels(u32),
    /// A fraction of the target's longer axis.
    FractionOfMaxAxis(f64),
}

impl PaddingRule {
    fn resolve(&self, target: SizePx) -> u32 {
        match *self {
            Self::Pixels(n) => n,
            Self::FractionOfMaxAxis(fraction) => {
                (f64::from(target.max_axis()) * fraction).floor() as u32
            }
        }
    }
}

// ============================================================================
// AssetDescriptor
// ============================================================================

/// Declarative description of one output variant: its name, target size,
/// optional padding, and output subdirectory.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetDescriptor {
    name: String,
    size: SizeRule,
    padding: Option<PaddingRule>,
    subdirectory: String,
}

impl AssetDescriptor {
    pub fn new(name: impl Into<String>, size: SizeRule, subdirectory: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size,
            padding: None,
            subdirectory: subdirectory.into(),
        }
    }

    /// Attaches a padding rule.
    pub fn with_padding(mut self, rule: PaddingRule) -> Self {
        self.padding = Some(rule);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The per-descriptor output subdirectory, e.g. `mipmap-mdpi`. Empty for
    /// flat layouts.
    pub fn subdirectory(&self) -> &str {
        &self.subdirectory
    }

    /// The variant's target size given the source's natural bounds.
    pub fn target_size(&self, natural: SizePx) -> SizePx {
        self.size.resolve(natural)
    }

    /// The padding applied around the given target size, in pixels.
    pub fn padding_for(&self, target: SizePx) -> u32 {
        self.padding.map_or(0, |rule| rule.resolve(target))
    }
}

// ============================================================================
// AssetBatch
// ============================================================================

/// One expanded variant: a canvas replica paired with its descriptor.
#[derive(Debug, Clone)]
pub struct AssetCanvas {
    pub canvas: Canvas,
    pub descriptor: AssetDescriptor,
}

/// A batch of canvas replicas, one per asset descriptor.
#[derive(Debug, Clone)]
pub struct AssetBatch {
    items: Vec<AssetCanvas>,
}

impl AssetBatch {
    /// Expands one canvas into a replica per descriptor.
    ///
    /// Replicas share the source buffer until their first mutation.
    pub fn split_per_asset(
        source: &Canvas,
        descriptors: impl IntoIterator<Item = AssetDescriptor>,
    ) -> Self {
        Self {
            items: descriptors
                .into_iter()
                .map(|descriptor| AssetCanvas {
                    canvas: source.clone(),
                    descriptor,
                })
                .collect(),
        }
    }

    fn map(self, f: impl Fn(AssetCanvas) -> AssetCanvas) -> Self {
        Self {
            items: self.items.into_iter().map(f).collect(),
        }
    }

    /// Resizes each replica to its descriptor's computed size.
    pub fn resize_for_assets(self) -> Self {
        self.map(|item| {
            let target = item.descriptor.target_size(item.canvas.dimensions());
            AssetCanvas {
                canvas: item.canvas.resize(target.width, target.height),
                descriptor: item.descriptor,
            }
        })
    }

    /// Applies each descriptor's padding to its replica.
    pub fn pad_for_assets(self) -> Self {
        self.map(|item| {
            let target = item.descriptor.target_size(item.canvas.dimensions());
            let padding = item.descriptor.padding_for(target);
            AssetCanvas {
                canvas: item.canvas.pad(padding),
                descriptor: item.descriptor,
            }
        })
    }

    /// Reassigns a second descriptor list onto the batch, preserving each
    /// replica's current pixel content. Used to move from inner-logo sizing
    /// to outer-layer sizing without re-deriving pixels.
    ///
    /// # Panics
    ///
    /// Panics if the descriptor count differs from the batch size.
    pub fn set_assets(mut self, descriptors: Vec<AssetDescriptor>) -> Self {
        assert_eq!(
            descriptors.len(),
            self.items.len(),
            "descriptor count must match the batch size"
        );
        for (item, descriptor) in self.items.iter_mut().zip(descriptors) {
            item.descriptor = descriptor;
        }
        self
    }

    /// Centers each replica's current content within its descriptor-declared
    /// final canvas size, filling the surround with transparency.
    pub fn center_for_assets(self) -> Self {
        self.map(|item| {
            let current = item.canvas.dimensions();
            let target = item.descriptor.target_size(current);
            if current == target {
                return item;
            }

            let mut out = image::RgbaImage::from_pixel(target.width, target.height, image::Rgba([0, 0, 0, 0]));
            image::imageops::replace(
                &mut out,
                item.canvas.image(),
                (i64::from(target.width) - i64::from(current.width)) / 2,
                (i64::from(target.height) - i64::from(current.height)) / 2,
            );
            AssetCanvas {
                canvas: Canvas::from_image(out),
                descriptor: item.descriptor,
            }
        })
    }

    /// Persists every replica under its descriptor's subdirectory with the
    /// writer's default file name.
    pub fn save(&self, writer: &AssetWriter) -> Result<()> {
        for item in &self.items {
            writer.save_asset(&item.canvas, &item.descriptor, None)?;
        }
        Ok(())
    }

    /// Persists every replica under a caller-supplied file name.
    pub fn save_with_custom_name(&self, writer: &AssetWriter, name: &str) -> Result<()> {
        for item in &self.items {
            writer.save_asset(&item.canvas, &item.descriptor, Some(name))?;
        }
        Ok(())
    }

    /// Persists every replica under its own descriptor's name.
    pub fn save_with_descriptor_names(&self, writer: &AssetWriter) -> Result<()> {
        for item in &self.items {
            writer.save_asset(&item.canvas, &item.descriptor, Some(item.descriptor.name()))?;
        }
        Ok(())
    }

    pub fn items(&self) -> &[AssetCanvas] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl IntoIterator for AssetBatch {
    type Item = AssetCanvas;
    type IntoIter = std::vec::IntoIter<AssetCanvas>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

// ============================================================================
// Tests
// ============================================================================
