//! iOS app icon set generation.
//!
//! One flat `ios/AppIcon.appiconset/` directory receives a PNG per idiom
//! slot plus the `Contents.json` manifest Xcode expects. The slot table
//! covers iPhone, iPad, CarPlay, and the App Store marketing icon.

use std::path::Path;

use palette::Srgb;
use serde::Serialize;
use tracing::instrument;

use crate::background::BackgroundSpec;
use crate::batch::{AssetBatch, AssetDescriptor, SizeRule};
use crate::canvas::{AlphaThreshold, Canvas};
use crate::error::Result;
use crate::writer::{AssetWriter, SourceImage};

// ============================================================================
// Idiom slots
// ============================================================================

/// One entry of the app icon set: a device idiom at a display scale.
#[derive(Debug, Clone, Copy)]
struct AppIconSlot {
    file_stem: &'static str,
    idiom: &'static str,
    scale: &'static str,
    size_name: &'static str,
    side: u32,
}

const APP_ICON_SLOTS: [AppIconSlot; 21] = [
    AppIconSlot { file_stem: "AppIcon@2x", idiom: "iphone", scale: "2x", size_name: "60x60", side: 120 },
    AppIconSlot { file_stem: "AppIcon@3x", idiom: "iphone", scale: "3x", size_name: "60x60", side: 180 },
    AppIconSlot { file_stem: "AppIcon~ipad", idiom: "ipad", scale: "1x", size_name: "76x76", side: 76 },
    AppIconSlot { file_stem: "AppIcon@2x~ipad", idiom: "ipad", scale: "2x", size_name: "76x76", side: 152 },
    AppIconSlot { file_stem: "AppIcon-83.5@2x~ipad", idiom: "ipad", scale: "2x", size_name: "83.5x83.5", side: 167 },
    AppIconSlot { file_stem: "AppIcon-40@2x", idiom: "iphone", scale: "2x", size_name: "40x40", side: 80 },
    AppIconSlot { file_stem: "AppIcon-40@3x", idiom: "iphone", scale: "3x", size_name: "40x40", side: 120 },
    AppIconSlot { file_stem: "AppIcon-40~ipad", idiom: "ipad", scale: "1x", size_name: "40x40", side: 40 },
    AppIconSlot { file_stem: "AppIcon-40@2x~ipad", idiom: "ipad", scale: "2x", size_name: "40x40", side: 80 },
    AppIconSlot { file_stem: "AppIcon-20@2x", idiom: "iphone", scale: "2x", size_name: "20x20", side: 40 },
    AppIconSlot { file_stem: "AppIcon-20@3x", idiom: "iphone", scale: "3x", size_name: "20x20", side: 60 },
    AppIconSlot { file_stem: "AppIcon-20~ipad", idiom: "ipad", scale: "1x", size_name: "20x20", side: 20 },
    AppIconSlot { file_stem: "AppIcon-20@2x~ipad", idiom: "ipad", scale: "2x", size_name: "20x20", side: 40 },
    AppIconSlot { file_stem: "AppIcon-29", idiom: "iphone", scale: "1x", size_name: "29x29", side: 29 },
    AppIconSlot { file_stem: "AppIcon-29@2x", idiom: "iphone", scale: "2x", size_name: "29x29", side: 58 },
    AppIconSlot { file_stem: "AppIcon-29@3x", idiom: "iphone", scale: "3x", size_name: "29x29", side: 87 },
    AppIconSlot { file_stem: "AppIcon-29~ipad", idiom: "ipad", scale: "1x", size_name: "29x29", side: 29 },
    AppIconSlot { file_stem: "AppIcon-29@2x~ipad", idiom: "ipad", scale: "2x", size_name: "29x29", side: 58 },
    AppIconSlot { file_stem: "AppIcon-60@2x~car", idiom: "car", scale: "2x", size_name: "60x60", side: 120 },
    AppIconSlot { file_stem: "AppIcon-60@3x~car", idiom: "car", scale: "3x", size_name: "60x60", side: 180 },
    AppIconSlot { file_stem: "AppIcon~ios-marketing", idiom: "ios-marketing", scale: "1x", size_name: "1024x1024", side: 1024 },
];

impl AppIconSlot {
    fn file_name(&self, extension: &str) -> String {
        format!("{}.{extension}", self.file_stem)
    }
}

/// Descriptors for the app icon set, one per idiom slot. File names carry
/// the source's extension; the output directory is flat.
fn app_icon_descriptors(extension: &str) -> Vec<AssetDescriptor> {
    APP_ICON_SLOTS
        .iter()
        .map(|slot| {
            AssetDescriptor::new(slot.file_name(extension), SizeRule::exact_square(slot.side), "")
        })
        .collect()
}

// ============================================================================
// Contents.json
// ============================================================================

#[derive(Debug, Serialize)]
struct ContentsImage {
    filename: String,
    idiom: &'static str,
    scale: &'static str,
    size: &'static str,
}

#[derive(Debug, Serialize)]
struct ContentsInfo {
    author: &'static str,
    version: u32,
}

#[derive(Debug, Serialize)]
struct ContentsManifest {
    images: Vec<ContentsImage>,
    info: ContentsInfo,
}

fn contents_manifest(extension: &str) -> ContentsManifest {
    ContentsManifest {
        images: APP_ICON_SLOTS
            .iter()
            .map(|slot| ContentsImage {
                filename: slot.file_name(extension),
                idiom: slot.idiom,
                scale: slot.scale,
                size: slot.size_name,
            })
            .collect(),
        info: ContentsInfo {
            author: "iconloom",
            version: 1,
        },
    }
}

// ============================================================================
// Generation
// ============================================================================

/// Options for iOS app icon generation.
#[derive(Debug, Clone)]
pub struct AppIconOptions {
    pub background: BackgroundSpec,
    /// Extra transparent padding in `[0, 1]` of the longer axis.
    pub padding: f64,
    pub alpha_threshold: AlphaThreshold,
    pub trim_whitespace: bool,
    pub mask_color: Option<Srgb<u8>>,
}

/// Generates the complete `AppIcon.appiconset` with its manifest.
#[instrument(skip(options))]
pub fn generate_app_icons(
    image_path: &Path,
    out_root: &Path,
    options: &AppIconOptions,
) -> Result<()> {
    let source = SourceImage::open(image_path)?;
    let writer = AssetWriter::new(
        out_root,
        Path::new("ios").join("AppIcon.appiconset"),
        &source,
    );

    writer.write_json("", "Contents.json", &contents_manifest(&source.extension))?;

    let pad = (f64::from(source.canvas.dimensions().max_axis()) * options.padding).floor() as u32;
    let logo = source
        .canvas
        .clone()
        .apply_if(options.trim_whitespace, Canvas::trim_whitespace)
        .square_with_empty_pixels(pad);
    let logo = match options.mask_color {
        Some(color) => logo.convert_non_opaque_to_color(color),
        None => logo,
    };

    let background = options.background.render(&logo)?;
    let composited =
        background.stack_with_no_alpha(options.alpha_threshold, std::slice::from_ref(&logo));

    AssetBatch::split_per_asset(&composited, app_icon_descriptors(&source.extension))
        .resize_for_assets()
        .save_with_descriptor_names(&writer)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn slot_table_covers_every_idiom() {
        assert_eq!(APP_ICON_SLOTS.len(), 21);
        for idiom in ["iphone", "ipad", "car", "ios-marketing"] {
            assert!(APP_ICON_SLOTS.iter().any(|s| s.idiom == idiom));
        }
        let marketing = APP_ICON_SLOTS.last().unwrap();
        assert_eq!(marketing.side, 1024);
    }

    #[test]
    fn manifest_serializes_the_expected_record_shape() {
        let manifest = contents_manifest("png");
        let json = serde_json::to_string(&manifest).unwrap();
        assert!(json.contains(r#""filename":"AppIcon@2x.png""#));
        assert!(json.contains(r#""idiom":"iphone""#));
        assert!(json.contains(r#""scale":"2x""#));
        assert!(json.contains(r#""size":"60x60""#));
        assert!(json.contains(r#""version":1"#));
    }

    #[test]
    fn app_icon_generation_writes_every_slot_and_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.png");
        RgbaImage::from_pixel(256, 256, Rgba([200, 60, 10, 255]))
            .save(&path)
            .unwrap();
        let out = dir.path().join("out");

        let options = AppIconOptions {
            background: BackgroundSpec::Solid(Srgb::new(1.0, 1.0, 1.0)),
            padding: 0.1,
            alpha_threshold: AlphaThreshold::new(0.5).unwrap(),
            trim_whitespace: false,
            mask_color: None,
        };
        generate_app_icons(&path, &out, &options).unwrap();

        let set_dir = out.join("ios/AppIcon.appiconset");
        assert!(set_dir.join("Contents.json").exists());
        for slot in APP_ICON_SLOTS {
            let img = image::open(set_dir.join(slot.file_name("png"))).unwrap();
            assert_eq!(img.width(), slot.side);
            assert_eq!(img.height(), slot.side);
        }
    }

    #[test]
    fn icons_are_square_and_opaque() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.png");
        // A non-square source with transparency.
        let mut img = RgbaImage::from_pixel(120, 80, Rgba([0, 0, 0, 0]));
        for y in 20..60 {
            for x in 30..90 {
                img.put_pixel(x, y, Rgba([10, 200, 40, 255]));
            }
        }
        img.save(&path).unwrap();
        let out = dir.path().join("out");

        let options = AppIconOptions {
            background: BackgroundSpec::Solid(Srgb::new(0.1, 0.1, 0.1)),
            padding: 0.0,
            alpha_threshold: AlphaThreshold::new(0.5).unwrap(),
            trim_whitespace: true,
            mask_color: None,
        };
        generate_app_icons(&path, &out, &options).unwrap();

        let small = image::open(out.join("ios/AppIcon.appiconset/AppIcon-20~ipad.png"))
            .unwrap()
            .to_rgba8();
        assert_eq!((small.width(), small.height()), (20, 20));
        assert!(small.pixels().all(|p| p[3] == 255));
    }
}
