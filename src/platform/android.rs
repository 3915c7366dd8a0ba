//! Android asset generation: launcher icons (legacy + adaptive),
//! notification icons, the Play Store logo, and generic density-bucketed
//! image assets.
//!
//! Density tables are plain descriptor data. Output lands under
//! `<root>/android/res/<folder>-<dpi>/` (launcher, notification, generic
//! assets) and `<root>/android/main/` (Play Store logo).

use std::path::Path;

use palette::Srgb;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::background::BackgroundSpec;
use crate::batch::{AssetBatch, AssetDescriptor, SizeRule};
use crate::canvas::{AlphaThreshold, Canvas};
use crate::error::{combine_results, Result};
use crate::writer::{AssetWriter, SourceImage};

/// Default file name for launcher icons.
pub const DEFAULT_LAUNCHER_NAME: &str = "ic_launcher";
/// Default file name for notification icons.
pub const DEFAULT_NOTIFICATION_NAME: &str = "ic_stat_notification_icon";
/// Default file name for the Play Store logo.
pub const DEFAULT_PLAY_STORE_NAME: &str = "play_store_logo_512x512";

// ============================================================================
// Resource folder
// ============================================================================

/// Which Android resource folder family the generated assets target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum AndroidResFolder {
    #[default]
    Mipmap,
    Drawable,
}

impl AndroidResFolder {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mipmap => "mipmap",
            Self::Drawable => "drawable",
        }
    }
}

// ============================================================================
// Density tables
// ============================================================================

// MDPI    - 1.0x
// HDPI    - 1.5x
// XHDPI   - 2.0x
// XXHDPI  - 3.0x
// XXXHDPI - 4.0x
const DENSITY_BUCKETS: [(&str, f64); 5] = [
    ("mdpi", 1.0),
    ("hdpi", 1.5),
    ("xhdpi", 2.0),
    ("xxhdpi", 3.0),
    ("xxxhdpi", 4.0),
];
const MAX_DENSITY_FACTOR: f64 = 4.0;

// Adaptive launcher canvases at 108dp per bucket.
const LAUNCHER_SIDES: [(&str, u32); 5] = [
    ("mdpi", 108),
    ("hdpi", 162),
    ("xhdpi", 216),
    ("xxhdpi", 324),
    ("xxxhdpi", 432),
];

// Notification icons at 24dp per bucket.
const NOTIFICATION_SIDES: [(&str, u32); 5] = [
    ("mdpi", 24),
    ("hdpi", 36),
    ("xhdpi", 48),
    ("xxhdpi", 72),
    ("xxxhdpi", 96),
];

const PLAY_STORE_SIDE: u32 = 512;

fn fixed_side_descriptors(
    folder: AndroidResFolder,
    sides: &[(&str, u32)],
) -> Vec<AssetDescriptor> {
    sides
        .iter()
        .map(|&(dpi, side)| {
            AssetDescriptor::new(
                dpi,
                SizeRule::exact_square(side),
                format!("{}-{dpi}", folder.as_str()),
            )
        })
        .collect()
}

/// Launcher icon descriptors, one per density bucket.
pub fn launcher_descriptors(folder: AndroidResFolder) -> Vec<AssetDescriptor> {
    fixed_side_descriptors(folder, &LAUNCHER_SIDES)
}

/// Outer adaptive-icon canvases; identical sizing to the legacy table.
pub fn adaptive_outer_descriptors(folder: AndroidResFolder) -> Vec<AssetDescriptor> {
    launcher_descriptors(folder)
}

/// Inner adaptive-icon content sizes: two thirds of the outer canvas, the
/// safe zone the launcher never masks away.
pub fn adaptive_inner_descriptors(folder: AndroidResFolder) -> Vec<AssetDescriptor> {
    LAUNCHER_SIDES
        .iter()
        .map(|&(dpi, side)| {
            AssetDescriptor::new(
                dpi,
                SizeRule::exact_square(side * 2 / 3),
                format!("{}-{dpi}", folder.as_str()),
            )
        })
        .collect()
}

/// Notification icon descriptors, one per density bucket.
pub fn notification_descriptors(folder: AndroidResFolder) -> Vec<AssetDescriptor> {
    fixed_side_descriptors(folder, &NOTIFICATION_SIDES)
}

/// Generic image-asset descriptors: the source's natural bounds are treated
/// as the densest bucket and scaled down for the rest.
pub fn density_descriptors(folder: AndroidResFolder) -> Vec<AssetDescriptor> {
    DENSITY_BUCKETS
        .iter()
        .map(|&(dpi, factor)| {
            AssetDescriptor::new(
                dpi,
                SizeRule::Density {
                    factor,
                    max_factor: MAX_DENSITY_FACTOR,
                },
                format!("{}-{dpi}", folder.as_str()),
            )
        })
        .collect()
}

fn play_store_descriptor() -> AssetDescriptor {
    AssetDescriptor::new("main", SizeRule::exact_square(PLAY_STORE_SIDE), "")
}

// ============================================================================
// Options
// ============================================================================

/// Options for launcher icon generation (legacy and adaptive).
#[derive(Debug, Clone)]
pub struct LauncherIconOptions {
    pub background: BackgroundSpec,
    /// Rounded-corner radius in `[0, 1]` of half the longer axis.
    pub corner_radius: f64,
    /// Extra transparent padding in `[0, 1]` of the longer axis.
    pub padding: f64,
    pub alpha_threshold: AlphaThreshold,
    /// Crop away fully transparent borders first.
    pub trim_whitespace: bool,
    /// Replace the logo's colors with a flat mask color.
    pub mask_color: Option<Srgb<u8>>,
    pub folder: AndroidResFolder,
    /// File name override, without extension.
    pub output_name: Option<String>,
}

/// Options for notification icon generation.
#[derive(Debug, Clone)]
pub struct NotificationIconOptions {
    pub folder: AndroidResFolder,
    pub trim_whitespace: bool,
    pub alpha_threshold: AlphaThreshold,
    pub output_name: Option<String>,
}

/// Options for Play Store logo generation.
#[derive(Debug, Clone)]
pub struct PlayStoreLogoOptions {
    pub background: BackgroundSpec,
    pub padding: f64,
    pub alpha_threshold: AlphaThreshold,
    pub trim_whitespace: bool,
    pub mask_color: Option<Srgb<u8>>,
    pub output_name: Option<String>,
}

/// Options for generic density-bucketed image assets.
#[derive(Debug, Clone)]
pub struct ImageAssetOptions {
    pub folder: AndroidResFolder,
    pub trim_whitespace: bool,
}

// ============================================================================
// Generation flows
// ============================================================================

fn padding_px(canvas: &Canvas, fraction: f64) -> u32 {
    (f64::from(canvas.dimensions().max_axis()) * fraction).floor() as u32
}

fn apply_mask(canvas: Canvas, mask: Option<Srgb<u8>>) -> Canvas {
    match mask {
        Some(color) => canvas.convert_non_opaque_to_color(color),
        None => canvas,
    }
}

/// Generates legacy and adaptive launcher icons from one source image.
///
/// The two families run as independent parallel tasks over the shared
/// normalized logo and background; both complete even if one fails.
#[instrument(skip(options))]
pub fn generate_launcher_icons(
    image_path: &Path,
    out_root: &Path,
    options: &LauncherIconOptions,
) -> Result<()> {
    let source = SourceImage::open(image_path)?;
    let writer = AssetWriter::new(out_root, Path::new("android").join("res"), &source);

    let pad = padding_px(&source.canvas, options.padding);
    let logo = apply_mask(
        source
            .canvas
            .clone()
            .apply_if(options.trim_whitespace, Canvas::trim_whitespace)
            .square_with_empty_pixels(pad),
        options.mask_color,
    );
    let background = options.background.render(&logo)?;
    debug!(side = logo.width(), "normalized launcher logo");

    let (legacy, adaptive) = rayon::join(
        || generate_legacy_launcher(&writer, &logo, &background, options),
        || generate_adaptive_launcher(&writer, &logo, &background, options),
    );
    combine_results([legacy, adaptive])
}

fn generate_legacy_launcher(
    writer: &AssetWriter,
    logo: &Canvas,
    background: &Canvas,
    options: &LauncherIconOptions,
) -> Result<()> {
    let name = options.output_name.as_deref().unwrap_or(DEFAULT_LAUNCHER_NAME);

    let composited = background
        .clone()
        .stack_with_no_alpha(options.alpha_threshold, std::slice::from_ref(logo))
        .clip_rounded_rect(options.corner_radius);

    AssetBatch::split_per_asset(&composited, launcher_descriptors(options.folder))
        .resize_for_assets()
        .save_with_custom_name(writer, name)
}

fn generate_adaptive_launcher(
    writer: &AssetWriter,
    logo: &Canvas,
    background: &Canvas,
    options: &LauncherIconOptions,
) -> Result<()> {
    let name = options.output_name.as_deref().unwrap_or(DEFAULT_LAUNCHER_NAME);
    let inner = adaptive_inner_descriptors(options.folder);
    let outer = adaptive_outer_descriptors(options.folder);

    // Foreground: logo content scaled to the safe zone, centered on the
    // transparent outer canvas.
    AssetBatch::split_per_asset(logo, inner.clone())
        .resize_for_assets()
        .set_assets(outer.clone())
        .center_for_assets()
        .save_with_custom_name(writer, &format!("{name}_foreground"))?;

    // Monochrome: the same geometry as a white silhouette.
    let monochrome = logo.clone().convert_non_opaque_to_color(Srgb::new(255, 255, 255));
    AssetBatch::split_per_asset(&monochrome, inner)
        .resize_for_assets()
        .set_assets(outer.clone())
        .center_for_assets()
        .save_with_custom_name(writer, &format!("{name}_monochrome"))?;

    // Background: the full outer canvas.
    AssetBatch::split_per_asset(background, outer)
        .resize_for_assets()
        .save_with_custom_name(writer, &format!("{name}_background"))?;

    writer.write_text(
        &format!("{}-anydpi-v26", options.folder.as_str()),
        &format!("{name}.xml"),
        &adaptive_icon_manifest(options.folder, name),
    )?;

    // A flat-color background additionally lands as a value resource.
    if let BackgroundSpec::Solid(color) = &options.background {
        writer.write_text(
            "values",
            &format!("{name}_background.xml"),
            &color_resource(name, *color),
        )?;
    }

    Ok(())
}

/// Generates white silhouette notification icons per density bucket.
#[instrument(skip(options))]
pub fn generate_notification_icons(
    image_path: &Path,
    out_root: &Path,
    options: &NotificationIconOptions,
) -> Result<()> {
    let source = SourceImage::open(image_path)?;
    let writer = AssetWriter::new(out_root, Path::new("android").join("res"), &source);
    let name = options
        .output_name
        .as_deref()
        .unwrap_or(DEFAULT_NOTIFICATION_NAME);

    let silhouette = source
        .canvas
        .clone()
        .apply_if(options.trim_whitespace, Canvas::trim_whitespace)
        .remove_alpha_on_threshold(options.alpha_threshold)
        .convert_non_opaque_to_color(Srgb::new(255, 255, 255))
        .square_with_empty_pixels(0);

    AssetBatch::split_per_asset(&silhouette, notification_descriptors(options.folder))
        .resize_for_assets()
        .save_with_custom_name(&writer, name)
}

/// Generates the 512x512 Play Store logo.
#[instrument(skip(options))]
pub fn generate_play_store_logo(
    image_path: &Path,
    out_root: &Path,
    options: &PlayStoreLogoOptions,
) -> Result<()> {
    let source = SourceImage::open(image_path)?;
    let writer = AssetWriter::new(out_root, Path::new("android").join("main"), &source);
    let name = options
        .output_name
        .as_deref()
        .unwrap_or(DEFAULT_PLAY_STORE_NAME);

    let pad = padding_px(&source.canvas, options.padding);
    let logo = apply_mask(
        source
            .canvas
            .clone()
            .apply_if(options.trim_whitespace, Canvas::trim_whitespace)
            .square_with_empty_pixels(pad),
        options.mask_color,
    );

    let background = options.background.render(&logo)?;
    let composited =
        background.stack_with_no_alpha(options.alpha_threshold, std::slice::from_ref(&logo));

    AssetBatch::split_per_asset(&composited, vec![play_store_descriptor()])
        .resize_for_assets()
        .save_with_custom_name(&writer, name)
}

/// Fans a generic image out over the density buckets, treating its natural
/// bounds as the densest variant.
#[instrument(skip(options))]
pub fn generate_image_assets(
    image_path: &Path,
    out_root: &Path,
    options: &ImageAssetOptions,
) -> Result<()> {
    let source = SourceImage::open(image_path)?;
    let writer = AssetWriter::new(out_root, Path::new("android").join("res"), &source);

    let canvas = source
        .canvas
        .clone()
        .apply_if(options.trim_whitespace, Canvas::trim_whitespace);

    AssetBatch::split_per_asset(&canvas, density_descriptors(options.folder))
        .resize_for_assets()
        .save(&writer)
}

// ============================================================================
// Manifests
// ============================================================================

fn adaptive_icon_manifest(folder: AndroidResFolder, name: &str) -> String {
    format!(
        r##"<?xml version="1.0" encoding="utf-8"?>
<adaptive-icon xmlns:android="http://schemas.android.com/apk/res/android">
    <background android:drawable="@{folder}/{name}_background" />
    <foreground android:drawable="@{folder}/{name}_foreground" />
    <monochrome android:drawable="@{folder}/{name}_monochrome" />
</adaptive-icon>
"##,
        folder = folder.as_str(),
        name = name,
    )
}

fn color_resource(name: &str, color: Srgb<f32>) -> String {
    let c = color.into_format::<u8>();
    format!(
        r##"<?xml version="1.0" encoding="utf-8"?>
<resources>
    <color name="{name}_background">#{:02X}{:02X}{:02X}</color>
</resources>
"##,
        c.red,
        c.green,
        c.blue,
        name = name,
    )
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::SizePx;
    use image::{Rgba, RgbaImage};
    use std::path::PathBuf;

    fn write_logo(dir: &Path, w: u32, h: u32) -> PathBuf {
        let path = dir.join("logo.png");
        RgbaImage::from_pixel(w, h, Rgba([30, 120, 210, 255]))
            .save(&path)
            .unwrap();
        path
    }

    fn solid_options() -> LauncherIconOptions {
        LauncherIconOptions {
            background: BackgroundSpec::Solid(Srgb::new(1.0, 1.0, 1.0)),
            corner_radius: 0.2,
            padding: 0.1,
            alpha_threshold: AlphaThreshold::new(0.5).unwrap(),
            trim_whitespace: false,
            mask_color: None,
            folder: AndroidResFolder::Mipmap,
            output_name: None,
        }
    }

    #[test]
    fn launcher_table_covers_all_buckets() {
        let descriptors = launcher_descriptors(AndroidResFolder::Mipmap);
        assert_eq!(descriptors.len(), 5);
        assert_eq!(descriptors[0].subdirectory(), "mipmap-mdpi");
        assert_eq!(
            descriptors[4].target_size(SizePx::new(1, 1)),
            SizePx::new(432, 432)
        );
    }

    #[test]
    fn adaptive_inner_is_two_thirds_of_outer() {
        let inner = adaptive_inner_descriptors(AndroidResFolder::Mipmap);
        let outer = adaptive_outer_descriptors(AndroidResFolder::Mipmap);
        for (i, o) in inner.iter().zip(&outer) {
            let inner_side = i.target_size(SizePx::new(1, 1)).width;
            let outer_side = o.target_size(SizePx::new(1, 1)).width;
            assert_eq!(inner_side, outer_side * 2 / 3);
        }
    }

    #[test]
    fn drawable_folder_changes_subdirectories() {
        let descriptors = notification_descriptors(AndroidResFolder::Drawable);
        assert_eq!(descriptors[0].subdirectory(), "drawable-mdpi");
    }

    #[test]
    fn manifest_references_all_three_drawables() {
        let xml = adaptive_icon_manifest(AndroidResFolder::Mipmap, "ic_launcher");
        assert!(xml.contains("@mipmap/ic_launcher_background"));
        assert!(xml.contains("@mipmap/ic_launcher_foreground"));
        assert!(xml.contains("@mipmap/ic_launcher_monochrome"));
    }

    #[test]
    fn color_resource_formats_as_hex() {
        let xml = color_resource("ic_launcher", Srgb::new(1.0, 0.0, 0.0));
        assert!(xml.contains(r##"<color name="ic_launcher_background">#FF0000</color>"##));
    }

    #[test]
    fn launcher_generation_writes_legacy_and_adaptive_files() {
        let dir = tempfile::tempdir().unwrap();
        let logo = write_logo(dir.path(), 256, 256);
        let out = dir.path().join("out");

        generate_launcher_icons(&logo, &out, &solid_options()).unwrap();

        let res = out.join("android/res");
        for (dpi, side) in LAUNCHER_SIDES {
            let legacy = image::open(res.join(format!("mipmap-{dpi}/ic_launcher.png"))).unwrap();
            assert_eq!(legacy.width(), side);
            assert_eq!(legacy.height(), side);

            for suffix in ["foreground", "background", "monochrome"] {
                let layer = image::open(
                    res.join(format!("mipmap-{dpi}/ic_launcher_{suffix}.png")),
                )
                .unwrap();
                assert_eq!(layer.width(), side);
            }
        }
        assert!(res.join("mipmap-anydpi-v26/ic_launcher.xml").exists());
        // Solid background also lands as a value resource.
        assert!(res.join("values/ic_launcher_background.xml").exists());
    }

    #[test]
    fn adaptive_foreground_keeps_a_transparent_margin() {
        let dir = tempfile::tempdir().unwrap();
        let logo = write_logo(dir.path(), 128, 128);
        let out = dir.path().join("out");

        let mut options = solid_options();
        options.padding = 0.0;
        generate_launcher_icons(&logo, &out, &options).unwrap();

        let fg = image::open(
            out.join("android/res/mipmap-mdpi/ic_launcher_foreground.png"),
        )
        .unwrap()
        .to_rgba8();
        assert_eq!(fg.width(), 108);
        // Outside the 72px safe zone the canvas stays transparent.
        assert_eq!(fg.get_pixel(0, 0)[3], 0);
        assert_eq!(fg.get_pixel(54, 54)[3], 255);
    }

    #[test]
    fn notification_icons_are_white_silhouettes() {
        let dir = tempfile::tempdir().unwrap();
        let logo = write_logo(dir.path(), 96, 96);
        let out = dir.path().join("out");

        let options = NotificationIconOptions {
            folder: AndroidResFolder::Mipmap,
            trim_whitespace: false,
            alpha_threshold: AlphaThreshold::new(0.5).unwrap(),
            output_name: None,
        };
        generate_notification_icons(&logo, &out, &options).unwrap();

        for (dpi, side) in NOTIFICATION_SIDES {
            let path = out
                .join("android/res")
                .join(format!("mipmap-{dpi}"))
                .join("ic_stat_notification_icon.png");
            let img = image::open(path).unwrap().to_rgba8();
            assert_eq!(img.width(), side);
            let center = img.get_pixel(side / 2, side / 2);
            assert_eq!(center.0, [255, 255, 255, 255]);
        }
    }

    #[test]
    fn play_store_logo_is_512_square_and_opaque() {
        let dir = tempfile::tempdir().unwrap();
        let logo = write_logo(dir.path(), 300, 200);
        let out = dir.path().join("out");

        let options = PlayStoreLogoOptions {
            background: BackgroundSpec::Solid(Srgb::new(0.0, 0.0, 0.0)),
            padding: 0.05,
            alpha_threshold: AlphaThreshold::new(0.5).unwrap(),
            trim_whitespace: false,
            mask_color: None,
            output_name: None,
        };
        generate_play_store_logo(&logo, &out, &options).unwrap();

        let img = image::open(out.join("android/main/play_store_logo_512x512.png"))
            .unwrap()
            .to_rgba8();
        assert_eq!((img.width(), img.height()), (512, 512));
        assert!(img.pixels().all(|p| p[3] == 255));
    }

    #[test]
    fn image_assets_scale_down_from_the_natural_bounds() {
        let dir = tempfile::tempdir().unwrap();
        let logo = write_logo(dir.path(), 400, 200);
        let out = dir.path().join("out");

        let options = ImageAssetOptions {
            folder: AndroidResFolder::Drawable,
            trim_whitespace: false,
        };
        generate_image_assets(&logo, &out, &options).unwrap();

        let mdpi = image::open(out.join("android/res/drawable-mdpi/logo.png"))
            .unwrap()
            .to_rgba8();
        assert_eq!((mdpi.width(), mdpi.height()), (100, 50));
        let densest = image::open(out.join("android/res/drawable-xxxhdpi/logo.png"))
            .unwrap()
            .to_rgba8();
        assert_eq!((densest.width(), densest.height()), (400, 200));
    }

    #[test]
    fn output_name_override_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let logo = write_logo(dir.path(), 64, 64);
        let out = dir.path().join("out");

        let mut options = solid_options();
        options.output_name = Some("brand".into());
        generate_launcher_icons(&logo, &out, &options).unwrap();

        assert!(out.join("android/res/mipmap-mdpi/brand.png").exists());
        assert!(
            out.join("android/res/mipmap-anydpi-v26/brand.xml")
                .exists()
        );
    }
}
