//! Serializable generation settings.
//!
//! A [`GenerationRecipe`] captures one run's resolved options — background,
//! padding, corner radius, alpha threshold, mask color, naming — in a format
//! that round-trips through JSON, so a frontend or CLI layer can hand the
//! core a plain data document. Colors travel as hex strings and are parsed
//! into [`palette`] types on conversion; range and length validation fails
//! fast before any pixel work.
//!
//! # Example
//!
//! ```
//! use iconloom::GenerationRecipe;
//!
//! let recipe = GenerationRecipe::new()
//!     .with_padding(0.1)
//!     .with_corner_radius(0.2)
//!     .with_alpha_threshold(0.5);
//!
//! recipe.validate().unwrap();
//! let json = recipe.to_json().unwrap();
//! let restored = GenerationRecipe::from_json(&json).unwrap();
//! assert_eq!(restored.padding, 0.1);
//! ```

use std::path::PathBuf;

use palette::Srgb;
use serde::{Deserialize, Serialize};

use crate::background::{BackgroundSpec, SquareFit};
use crate::canvas::AlphaThreshold;
use crate::error::{Error, Result};
use crate::gradient::GradientTable;
use crate::platform::android::AndroidResFolder;

// ============================================================================
// Color parsing
// ============================================================================

/// Parses a `#RRGGBB` hex string into a float color.
pub(crate) fn parse_hex_color(text: &str) -> Result<Srgb<f32>> {
    let parsed: Srgb<u8> = text
        .trim()
        .parse()
        .map_err(|_| Error::InvalidColor(text.to_string()))?;
    Ok(parsed.into_format())
}

// ============================================================================
// Background settings
// ============================================================================

/// The background variant selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BackgroundKind {
    #[default]
    SolidColor,
    LinearGradient,
    RadialGradient,
    Image,
}

/// Serializable background description.
///
/// Gradient colors and stop positions travel as parallel lists; their
/// lengths must match. Converted to a [`BackgroundSpec`] via
/// [`BackgroundSettings::to_spec`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundSettings {
    pub kind: BackgroundKind,

    /// Hex colors, e.g. `["#0000FF", "#FF0000"]`.
    #[serde(default)]
    pub colors: Vec<String>,

    /// Stop positions in `[0, 1]`, parallel to `colors`.
    #[serde(default)]
    pub stops: Vec<f64>,

    /// Rotation of a linear gradient, in degrees from the horizontal axis.
    #[serde(default)]
    pub degree: f64,

    /// Path to the background image for [`BackgroundKind::Image`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<PathBuf>,
}

impl Default for BackgroundSettings {
    fn default() -> Self {
        Self::solid("#FFFFFF")
    }
}

impl BackgroundSettings {
    /// A flat color background.
    pub fn solid(color: impl Into<String>) -> Self {
        Self {
            kind: BackgroundKind::SolidColor,
            colors: vec![color.into()],
            stops: Vec::new(),
            degree: 0.0,
            image_path: None,
        }
    }

    /// A linear gradient background.
    pub fn linear_gradient(colors: Vec<String>, stops: Vec<f64>, degree: f64) -> Self {
        Self {
            kind: BackgroundKind::LinearGradient,
            colors,
            stops,
            degree,
            image_path: None,
        }
    }

    /// A radial gradient background.
    pub fn radial_gradient(colors: Vec<String>, stops: Vec<f64>) -> Self {
        Self {
            kind: BackgroundKind::RadialGradient,
            colors,
            stops,
            degree: 0.0,
            image_path: None,
        }
    }

    /// An external image background.
    pub fn image(path: impl Into<PathBuf>) -> Self {
        Self {
            kind: BackgroundKind::Image,
            colors: Vec::new(),
            stops: Vec::new(),
            degree: 0.0,
            image_path: Some(path.into()),
        }
    }

    fn gradient_table(&self) -> Result<GradientTable> {
        let colors = self
            .colors
            .iter()
            .map(|c| parse_hex_color(c))
            .collect::<Result<Vec<_>>>()?;
        GradientTable::from_colors_and_stops(&colors, &self.stops)
    }

    /// Converts the settings into a runtime [`BackgroundSpec`].
    pub fn to_spec(&self) -> Result<BackgroundSpec> {
        match self.kind {
            BackgroundKind::SolidColor => {
                let color = match self.colors.first() {
                    Some(text) => parse_hex_color(text)?,
                    None => Srgb::new(1.0, 1.0, 1.0),
                };
                Ok(BackgroundSpec::Solid(color))
            }
            BackgroundKind::LinearGradient => Ok(BackgroundSpec::LinearGradient {
                table: self.gradient_table()?,
                degree: self.degree,
            }),
            BackgroundKind::RadialGradient => Ok(BackgroundSpec::RadialGradient {
                table: self.gradient_table()?,
            }),
            BackgroundKind::Image => {
                let path = self.image_path.clone().unwrap_or_default();
                if path.as_os_str().is_empty() {
                    return Err(Error::FileNotFound(path));
                }
                Ok(BackgroundSpec::Image {
                    path,
                    fit: SquareFit::Crop,
                })
            }
        }
    }
}

// ============================================================================
// GenerationRecipe
// ============================================================================

/// The resolved options of one generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRecipe {
    #[serde(default)]
    pub background: BackgroundSettings,

    /// Extra transparent padding as a fraction of the logo's longer axis,
    /// in `[0, 1]`.
    #[serde(default)]
    pub padding: f64,

    /// Rounded-corner radius as a fraction of half the longer axis, in
    /// `[0, 1]`. `1` clips to a full circle.
    #[serde(default = "default_corner_radius")]
    pub corner_radius: f64,

    /// Alpha cutoff in `[0, 1]`, or `-1` to disable.
    #[serde(default = "default_alpha_threshold")]
    pub alpha_threshold: f64,

    /// Crop away fully transparent borders before any other work.
    #[serde(default)]
    pub trim_whitespace: bool,

    /// Replace the logo's colors with this hex color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask_color: Option<String>,

    /// Override the output file name (without extension).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_name: Option<String>,

    /// Android resource folder family the assets target.
    #[serde(default)]
    pub folder: AndroidResFolder,
}

fn default_corner_radius() -> f64 {
    1.0
}

fn default_alpha_threshold() -> f64 {
    0.5
}

impl Default for GenerationRecipe {
    fn default() -> Self {
        Self {
            background: BackgroundSettings::default(),
            padding: 0.0,
            corner_radius: default_corner_radius(),
            alpha_threshold: default_alpha_threshold(),
            trim_whitespace: false,
            mask_color: None,
            output_name: None,
            folder: AndroidResFolder::default(),
        }
    }
}

impl GenerationRecipe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_background(mut self, background: BackgroundSettings) -> Self {
        self.background = background;
        self
    }

    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_corner_radius(mut self, corner_radius: f64) -> Self {
        self.corner_radius = corner_radius;
        self
    }

    pub fn with_alpha_threshold(mut self, alpha_threshold: f64) -> Self {
        self.alpha_threshold = alpha_threshold;
        self
    }

    pub fn with_trim_whitespace(mut self, trim: bool) -> Self {
        self.trim_whitespace = trim;
        self
    }

    pub fn with_mask_color(mut self, color: impl Into<String>) -> Self {
        self.mask_color = Some(color.into());
        self
    }

    pub fn with_output_name(mut self, name: impl Into<String>) -> Self {
        self.output_name = Some(name.into());
        self
    }

    pub fn with_folder(mut self, folder: AndroidResFolder) -> Self {
        self.folder = folder;
        self
    }

    /// Validates every option range and color string.
    ///
    /// Runs before any pixel work so bad input never produces partial
    /// output on its own.
    pub fn validate(&self) -> Result<()> {
        in_unit_range("padding", self.padding)?;
        in_unit_range("corner-radius", self.corner_radius)?;
        AlphaThreshold::new(self.alpha_threshold)?;
        self.mask()?;
        self.background_spec()?;
        Ok(())
    }

    /// The runtime background specification.
    pub fn background_spec(&self) -> Result<BackgroundSpec> {
        self.background.to_spec()
    }

    /// The parsed mask color, if one is set.
    pub fn mask(&self) -> Result<Option<Srgb<u8>>> {
        self.mask_color
            .as_deref()
            .map(|text| {
                text.trim()
                    .parse::<Srgb<u8>>()
                    .map_err(|_| Error::InvalidColor(text.to_string()))
            })
            .transpose()
    }

    /// The validated alpha threshold.
    pub fn threshold(&self) -> Result<AlphaThreshold> {
        AlphaThreshold::new(self.alpha_threshold)
    }

    /// Serializes to a JSON string.
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serializes to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserializes from a JSON string.
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

fn in_unit_range(option: &'static str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::OptionOutOfRange {
            option,
            value,
            min: 0.0,
            max: 1.0,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        GenerationRecipe::new().validate().unwrap();
    }

    #[test]
    fn json_round_trip_preserves_settings() {
        let recipe = GenerationRecipe::new()
            .with_padding(0.1)
            .with_corner_radius(0.2)
            .with_alpha_threshold(-1.0)
            .with_trim_whitespace(true)
            .with_mask_color("#00FF00")
            .with_output_name("brand_icon")
            .with_background(BackgroundSettings::linear_gradient(
                vec!["#0000FF".into(), "#FF0000".into()],
                vec![0.0, 1.0],
                45.0,
            ));

        let json = recipe.to_json().unwrap();
        let restored = GenerationRecipe::from_json(&json).unwrap();
        assert_eq!(restored.padding, 0.1);
        assert_eq!(restored.corner_radius, 0.2);
        assert_eq!(restored.alpha_threshold, -1.0);
        assert!(restored.trim_whitespace);
        assert_eq!(restored.mask_color.as_deref(), Some("#00FF00"));
        assert_eq!(restored.output_name.as_deref(), Some("brand_icon"));
        assert_eq!(restored.background.kind, BackgroundKind::LinearGradient);
        restored.validate().unwrap();
    }

    #[test]
    fn padding_out_of_range_is_rejected() {
        let err = GenerationRecipe::new().with_padding(1.5).validate().unwrap_err();
        assert!(matches!(
            err,
            Error::OptionOutOfRange { option: "padding", .. }
        ));
    }

    #[test]
    fn bad_mask_color_is_rejected() {
        let err = GenerationRecipe::new()
            .with_mask_color("not-a-color")
            .validate()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidColor(_)));
    }

    #[test]
    fn mismatched_gradient_lists_are_rejected() {
        let recipe = GenerationRecipe::new().with_background(
            BackgroundSettings::radial_gradient(vec!["#000000".into()], vec![0.0, 1.0]),
        );
        let err = recipe.validate().unwrap_err();
        assert!(matches!(err, Error::MismatchedGradientStops { .. }));
    }

    #[test]
    fn solid_settings_parse_into_a_solid_spec() {
        let spec = BackgroundSettings::solid("#FF0000").to_spec().unwrap();
        match spec {
            BackgroundSpec::Solid(color) => {
                assert!((color.red - 1.0).abs() < 1e-6);
                assert_eq!(color.green, 0.0);
            }
            other => panic!("expected solid background, got {other:?}"),
        }
    }

    #[test]
    fn image_settings_require_a_path() {
        let mut settings = BackgroundSettings::image("bg.png");
        settings.to_spec().unwrap();

        settings.image_path = None;
        assert!(matches!(
            settings.to_spec(),
            Err(Error::FileNotFound(_))
        ));
    }

    #[test]
    fn hex_parsing_accepts_shorthand_and_rejects_garbage() {
        assert!(parse_hex_color("#FFFFFF").is_ok());
        assert!(parse_hex_color("  #00ff00  ").is_ok());
        assert!(matches!(
            parse_hex_color("#GGGGGG"),
            Err(Error::InvalidColor(_))
        ));
    }
}
