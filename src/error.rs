//! Error types for the asset generation pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while generating assets.
///
/// Input validation (file existence, format, option ranges) fails before any
/// pixel work begins. Parallel generation collects every branch's error into
/// [`Error::Aggregate`] instead of stopping at the first failure.
#[derive(Debug, Error)]
pub enum Error {
    /// The source or background image path does not exist.
    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    /// The image extension is not one of png, jpg, jpeg, or bmp.
    #[error("unsupported file type: {0}")]
    UnsupportedFileType(PathBuf),

    /// A color string could not be parsed as a hex color.
    #[error("invalid color {0:?}, expected a hex color such as #0000FF")]
    InvalidColor(String),

    /// A gradient was built from colors and stops of different lengths.
    #[error("gradient colors and stops differ in length: {colors} colors, {stops} stops")]
    MismatchedGradientStops {
        /// Number of colors supplied.
        colors: usize,
        /// Number of stop positions supplied.
        stops: usize,
    },

    /// A gradient table was constructed without any stops.
    #[error("gradient table must contain at least one stop")]
    EmptyGradientTable,

    /// A numeric option fell outside its documented range.
    #[error("{option} must be within {min}..={max}, got {value}")]
    OptionOutOfRange {
        /// Name of the offending option.
        option: &'static str,
        /// The supplied value.
        value: f64,
        /// Lower bound (inclusive).
        min: f64,
        /// Upper bound (inclusive).
        max: f64,
    },

    /// Decode or encode failure from the image codecs.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// Filesystem failure while persisting assets.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Manifest serialization failure.
    #[error("manifest error: {0}")]
    Manifest(#[from] serde_json::Error),

    /// Combined failures from parallel generation tasks. All tasks run to
    /// completion before this is returned; outputs of successful tasks stay
    /// on disk.
    #[error("{} generation task(s) failed: {}", .0.len(), format_aggregate(.0))]
    Aggregate(Vec<Error>),
}

fn format_aggregate(errors: &[Error]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Joins the outcomes of parallel generation tasks without failing fast.
///
/// A single failure is returned as-is; multiple failures are combined into
/// [`Error::Aggregate`].
pub(crate) fn combine_results(results: impl IntoIterator<Item = Result<()>>) -> Result<()> {
    let mut failures: Vec<Error> = results.into_iter().filter_map(std::result::Result::err).collect();
    match failures.len() {
        0 => Ok(()),
        1 => Err(failures.remove(0)),
        _ => Err(Error::Aggregate(failures)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            Error::FileNotFound(PathBuf::from("a.png"))
                .to_string()
                .contains("file not found")
        );
        assert!(
            Error::InvalidColor("zzz".into())
                .to_string()
                .contains("invalid color")
        );
        assert!(
            Error::OptionOutOfRange {
                option: "padding",
                value: 2.0,
                min: 0.0,
                max: 1.0,
            }
            .to_string()
            .contains("padding must be within 0..=1")
        );
    }

    #[test]
    fn aggregate_lists_every_failure() {
        let err = Error::Aggregate(vec![
            Error::EmptyGradientTable,
            Error::InvalidColor("nope".into()),
        ]);
        let text = err.to_string();
        assert!(text.contains("2 generation task(s) failed"));
        assert!(text.contains("at least one stop"));
        assert!(text.contains("nope"));
    }

    #[test]
    fn combine_results_passes_through_success() {
        assert!(combine_results([Ok(()), Ok(())]).is_ok());
    }

    #[test]
    fn combine_results_unwraps_single_failure() {
        let err = combine_results([Ok(()), Err(Error::EmptyGradientTable)]).unwrap_err();
        assert!(matches!(err, Error::EmptyGradientTable));
    }

    #[test]
    fn combine_results_aggregates_multiple_failures() {
        let err = combine_results([
            Err(Error::EmptyGradientTable),
            Ok(()),
            Err(Error::InvalidColor("x".into())),
        ])
        .unwrap_err();
        match err {
            Error::Aggregate(inner) => assert_eq!(inner.len(), 2),
            other => panic!("expected aggregate, got {other}"),
        }
    }
}
