//! Per-platform generation flows.
//!
//! Each submodule owns its platform's descriptor tables (plain immutable
//! data) and generation entry points. [`generate_all`] is the everything
//! mode: Android launcher icons, the Play Store logo, notification icons,
//! and the iOS app icon set run as independent parallel tasks that read the
//! same source and write to disjoint output subdirectories. The call blocks
//! until every task finishes and joins all of their errors; it never cancels
//! siblings early, and completed outputs stay on disk if another branch
//! fails.

pub mod android;
pub mod ios;

use std::path::Path;

use tracing::instrument;

use crate::error::{combine_results, Error, Result};
use crate::recipe::GenerationRecipe;
use crate::writer::ImageEncoding;

/// Default output root, relative to the caller's working directory.
pub const DEFAULT_OUTPUT_ROOT: &str = "assets_out";

/// Generates every supported asset family from one source image.
#[instrument(skip(recipe))]
pub fn generate_all(image_path: &Path, out_root: &Path, recipe: &GenerationRecipe) -> Result<()> {
    // Input validation fails before any task spawns or any pixel moves.
    if !image_path.exists() {
        return Err(Error::FileNotFound(image_path.to_path_buf()));
    }
    ImageEncoding::from_path(image_path)?;
    recipe.validate()?;

    let background = recipe.background_spec()?;
    let mask_color = recipe.mask()?;
    let alpha_threshold = recipe.threshold()?;

    let launcher = android::LauncherIconOptions {
        background: background.clone(),
        corner_radius: recipe.corner_radius,
        padding: recipe.padding,
        alpha_threshold,
        trim_whitespace: recipe.trim_whitespace,
        mask_color,
        folder: recipe.folder,
        output_name: Some(android::DEFAULT_LAUNCHER_NAME.into()),
    };
    let play_store = android::PlayStoreLogoOptions {
        background: background.clone(),
        padding: recipe.padding,
        alpha_threshold,
        trim_whitespace: recipe.trim_whitespace,
        mask_color,
        output_name: Some(android::DEFAULT_PLAY_STORE_NAME.into()),
    };
    let notification = android::NotificationIconOptions {
        folder: recipe.folder,
        trim_whitespace: recipe.trim_whitespace,
        alpha_threshold,
        output_name: Some(android::DEFAULT_NOTIFICATION_NAME.into()),
    };
    let app_icons = ios::AppIconOptions {
        background,
        padding: recipe.padding,
        alpha_threshold,
        trim_whitespace: recipe.trim_whitespace,
        mask_color,
    };

    let ((launcher_res, play_res), (notification_res, ios_res)) = rayon::join(
        || {
            rayon::join(
                || android::generate_launcher_icons(image_path, out_root, &launcher),
                || android::generate_play_store_logo(image_path, out_root, &play_store),
            )
        },
        || {
            rayon::join(
                || android::generate_notification_icons(image_path, out_root, &notification),
                || ios::generate_app_icons(image_path, out_root, &app_icons),
            )
        },
    );

    combine_results([launcher_res, play_res, notification_res, ios_res])
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn missing_source_fails_before_any_output() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let err = generate_all(
            &dir.path().join("nope.png"),
            &out,
            &GenerationRecipe::new(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::FileNotFound(_)));
        assert!(!out.exists());
    }

    #[test]
    fn unsupported_extension_fails_before_any_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.gif");
        std::fs::write(&path, b"not really a gif").unwrap();
        let out = dir.path().join("out");

        let err = generate_all(&path, &out, &GenerationRecipe::new()).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFileType(_)));
        assert!(!out.exists());
    }

    #[test]
    fn everything_mode_produces_all_platform_families() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.png");
        RgbaImage::from_pixel(512, 512, Rgba([10, 90, 200, 255]))
            .save(&path)
            .unwrap();
        let out = dir.path().join("out");

        let recipe = GenerationRecipe::new()
            .with_padding(0.1)
            .with_corner_radius(0.2)
            .with_alpha_threshold(0.5);
        generate_all(&path, &out, &recipe).unwrap();

        // Legacy launcher icons, one per density bucket.
        for (dpi, side) in [
            ("mdpi", 108u32),
            ("hdpi", 162),
            ("xhdpi", 216),
            ("xxhdpi", 324),
            ("xxxhdpi", 432),
        ] {
            let file = out
                .join("android/res")
                .join(format!("mipmap-{dpi}"))
                .join("ic_launcher.png");
            let img = image::open(&file).unwrap();
            assert_eq!(img.width(), side);
            assert_eq!(img.height(), side);
        }

        // Adaptive layers and their manifest.
        for suffix in ["foreground", "background", "monochrome"] {
            assert!(
                out.join("android/res/mipmap-xxxhdpi")
                    .join(format!("ic_launcher_{suffix}.png"))
                    .exists()
            );
        }
        let manifest = std::fs::read_to_string(
            out.join("android/res/mipmap-anydpi-v26/ic_launcher.xml"),
        )
        .unwrap();
        for suffix in ["foreground", "background", "monochrome"] {
            assert!(manifest.contains(&format!("@mipmap/ic_launcher_{suffix}")));
        }

        // Play Store logo and notification icons.
        assert!(out.join("android/main/play_store_logo_512x512.png").exists());
        assert!(
            out.join("android/res/mipmap-mdpi/ic_stat_notification_icon.png")
                .exists()
        );

        // iOS app icon set with its manifest.
        let appiconset = out.join("ios/AppIcon.appiconset");
        assert!(appiconset.join("Contents.json").exists());
        assert!(appiconset.join("AppIcon@2x.png").exists());
    }
}
