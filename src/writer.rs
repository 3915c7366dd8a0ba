//! Decoding sources and persisting generated assets.
//!
//! [`SourceImage`] loads the input logo (or fails fast on a missing path or
//! unsupported extension). [`AssetWriter`] is the persistence boundary: it
//! resolves `root/<base>/<per-descriptor-subdirectory>/<file>` paths,
//! encodes canvases with the source's own format, and writes the JSON/XML
//! manifests that accompany some asset families.

use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};
use serde::Serialize;
use tracing::debug;

use crate::batch::AssetDescriptor;
use crate::canvas::Canvas;
use crate::error::{Error, Result};

// ============================================================================
// ImageEncoding
// ============================================================================

/// The output codec, derived from the source file's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageEncoding {
    Png,
    /// JPEG at maximum quality.
    Jpeg,
    Bmp,
}

impl ImageEncoding {
    /// Maps a file extension to its codec.
    ///
    /// Supports `png`, `jpg`, `jpeg`, and `bmp`; anything else is
    /// [`Error::UnsupportedFileType`].
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "bmp" => Ok(Self::Bmp),
            _ => Err(Error::UnsupportedFileType(path.to_path_buf())),
        }
    }
}

// ============================================================================
// SourceImage
// ============================================================================

/// A fully decoded input image plus the naming metadata that follows it
/// through the pipeline.
#[derive(Debug, Clone)]
pub struct SourceImage {
    /// The decoded pixels.
    pub canvas: Canvas,
    /// Codec used for every derived asset.
    pub encoding: ImageEncoding,
    /// File name without the extension, e.g. `logo`.
    pub file_stem: String,
    /// Extension without the dot, e.g. `png`.
    pub extension: String,
}

impl SourceImage {
    /// Opens and fully decodes an image file.
    ///
    /// Fails fast with [`Error::FileNotFound`] or
    /// [`Error::UnsupportedFileType`] before any decoding work.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let encoding = ImageEncoding::from_path(path)?;
        let decoded = image::open(path)?.to_rgba8();

        let file_stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("image")
            .to_string();
        let extension = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("png")
            .to_ascii_lowercase();

        Ok(Self {
            canvas: Canvas::from_image(decoded),
            encoding,
            file_stem,
            extension,
        })
    }

    /// The source's full file name, e.g. `logo.png`.
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.file_stem, self.extension)
    }
}

// ============================================================================
// AssetWriter
// ============================================================================

/// Persists canvases and manifests under one output tree.
///
/// Paths resolve as `root/<base>/<subdirectory>/<file>`, where `base` is the
/// platform-and-intent prefix (e.g. `android/res`) and `subdirectory` comes
/// from the asset descriptor (e.g. `mipmap-mdpi`).
#[derive(Debug, Clone)]
pub struct AssetWriter {
    root: PathBuf,
    base: PathBuf,
    encoding: ImageEncoding,
    default_file_name: String,
    extension: String,
}

impl AssetWriter {
    pub fn new(root: impl Into<PathBuf>, base: impl Into<PathBuf>, source: &SourceImage) -> Self {
        Self {
            root: root.into(),
            base: base.into(),
            encoding: source.encoding,
            default_file_name: source.file_name(),
            extension: source.extension.clone(),
        }
    }

    /// The directory a descriptor's assets land in.
    pub fn asset_dir(&self, descriptor: &AssetDescriptor) -> PathBuf {
        self.dir_for(descriptor.subdirectory())
    }

    fn dir_for(&self, subdirectory: &str) -> PathBuf {
        let mut dir = self.root.join(&self.base);
        if !subdirectory.is_empty() {
            dir.push(subdirectory);
        }
        dir
    }

    /// Completes a custom file name with the source extension if it has none.
    fn resolve_file_name(&self, custom: Option<&str>) -> String {
        match custom {
            None => self.default_file_name.clone(),
            Some(name) if name.ends_with(&format!(".{}", self.extension)) => name.to_string(),
            Some(name) => format!("{name}.{}", self.extension),
        }
    }

    /// Encodes and persists one canvas under the descriptor's subdirectory.
    ///
    /// Returns the written path.
    pub fn save_asset(
        &self,
        canvas: &Canvas,
        descriptor: &AssetDescriptor,
        custom_name: Option<&str>,
    ) -> Result<PathBuf> {
        let dir = self.asset_dir(descriptor);
        fs::create_dir_all(&dir)?;
        let path = dir.join(self.resolve_file_name(custom_name));
        self.encode_to(&path, canvas)?;
        debug!(path = %path.display(), "wrote asset");
        Ok(path)
    }

    fn encode_to(&self, path: &Path, canvas: &Canvas) -> Result<()> {
        match self.encoding {
            ImageEncoding::Png => canvas.image().save_with_format(path, ImageFormat::Png)?,
            ImageEncoding::Bmp => canvas.image().save_with_format(path, ImageFormat::Bmp)?,
            ImageEncoding::Jpeg => {
                // JPEG carries no alpha channel; composited output is opaque
                // by the time it reaches the writer.
                let rgb = DynamicImage::ImageRgba8(canvas.image().clone()).to_rgb8();
                let file = BufWriter::new(fs::File::create(path)?);
                JpegEncoder::new_with_quality(file, 100).encode_image(&rgb)?;
            }
        }
        Ok(())
    }

    /// Serializes `value` as JSON into `subdirectory/file_name`.
    pub fn write_json<T: Serialize>(
        &self,
        subdirectory: &str,
        file_name: &str,
        value: &T,
    ) -> Result<PathBuf> {
        let dir = self.dir_for(subdirectory);
        fs::create_dir_all(&dir)?;
        let path = dir.join(file_name);
        fs::write(&path, serde_json::to_vec_pretty(value)?)?;
        debug!(path = %path.display(), "wrote manifest");
        Ok(path)
    }

    /// Writes a text file (XML manifests) into `subdirectory/file_name`.
    pub fn write_text(
        &self,
        subdirectory: &str,
        file_name: &str,
        contents: &str,
    ) -> Result<PathBuf> {
        let dir = self.dir_for(subdirectory);
        fs::create_dir_all(&dir)?;
        let path = dir.join(file_name);
        fs::write(&path, contents)?;
        debug!(path = %path.display(), "wrote manifest");
        Ok(path)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::SizeRule;
    use image::{Rgba, RgbaImage};

    fn sample_source(dir: &Path) -> SourceImage {
        let path = dir.join("logo.png");
        RgbaImage::from_pixel(8, 8, Rgba([1, 2, 3, 255]))
            .save(&path)
            .unwrap();
        SourceImage::open(&path).unwrap()
    }

    #[test]
    fn encoding_from_extension() {
        assert_eq!(
            ImageEncoding::from_path(Path::new("a.png")).unwrap(),
            ImageEncoding::Png
        );
        assert_eq!(
            ImageEncoding::from_path(Path::new("a.JPG")).unwrap(),
            ImageEncoding::Jpeg
        );
        assert_eq!(
            ImageEncoding::from_path(Path::new("a.jpeg")).unwrap(),
            ImageEncoding::Jpeg
        );
        assert_eq!(
            ImageEncoding::from_path(Path::new("a.bmp")).unwrap(),
            ImageEncoding::Bmp
        );
        assert!(matches!(
            ImageEncoding::from_path(Path::new("a.gif")),
            Err(Error::UnsupportedFileType(_))
        ));
        assert!(ImageEncoding::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn open_missing_file_is_file_not_found() {
        let err = SourceImage::open(Path::new("missing/logo.png")).unwrap_err();
        assert!(matches!(err, Error::FileNotFound(_)));
    }

    #[test]
    fn open_decodes_and_records_naming() {
        let dir = tempfile::tempdir().unwrap();
        let source = sample_source(dir.path());
        assert_eq!(source.file_stem, "logo");
        assert_eq!(source.extension, "png");
        assert_eq!(source.file_name(), "logo.png");
        assert_eq!(source.canvas.width(), 8);
    }

    #[test]
    fn save_asset_resolves_subdirectory_and_default_name() {
        let dir = tempfile::tempdir().unwrap();
        let source = sample_source(dir.path());
        let writer = AssetWriter::new(dir.path().join("out"), "android/res", &source);

        let descriptor =
            AssetDescriptor::new("mdpi", SizeRule::exact_square(8), "mipmap-mdpi");
        let path = writer.save_asset(&source.canvas, &descriptor, None).unwrap();
        assert_eq!(
            path,
            dir.path()
                .join("out")
                .join("android/res")
                .join("mipmap-mdpi")
                .join("logo.png")
        );
        assert!(path.exists());
    }

    #[test]
    fn custom_names_get_the_source_extension() {
        let dir = tempfile::tempdir().unwrap();
        let source = sample_source(dir.path());
        let writer = AssetWriter::new(dir.path().join("out"), "android/res", &source);
        let descriptor = AssetDescriptor::new("mdpi", SizeRule::exact_square(8), "mipmap-mdpi");

        let path = writer
            .save_asset(&source.canvas, &descriptor, Some("ic_launcher"))
            .unwrap();
        assert!(path.ends_with("mipmap-mdpi/ic_launcher.png"));

        let path = writer
            .save_asset(&source.canvas, &descriptor, Some("AppIcon@2x.png"))
            .unwrap();
        assert!(path.ends_with("mipmap-mdpi/AppIcon@2x.png"));
    }

    #[test]
    fn empty_subdirectory_writes_into_the_base() {
        let dir = tempfile::tempdir().unwrap();
        let source = sample_source(dir.path());
        let writer = AssetWriter::new(dir.path().join("out"), "android/main", &source);
        let descriptor = AssetDescriptor::new("main", SizeRule::exact_square(8), "");

        let path = writer.save_asset(&source.canvas, &descriptor, None).unwrap();
        assert_eq!(
            path,
            dir.path().join("out").join("android/main").join("logo.png")
        );
    }

    #[test]
    fn write_json_round_trips() {
        #[derive(Serialize)]
        struct Manifest {
            version: u32,
        }

        let dir = tempfile::tempdir().unwrap();
        let source = sample_source(dir.path());
        let writer = AssetWriter::new(dir.path().join("out"), "ios/AppIcon.appiconset", &source);

        let path = writer
            .write_json("", "Contents.json", &Manifest { version: 1 })
            .unwrap();
        let text = fs::read_to_string(path).unwrap();
        assert!(text.contains("\"version\": 1"));
    }

    #[test]
    fn written_png_decodes_back() {
        let dir = tempfile::tempdir().unwrap();
        let source = sample_source(dir.path());
        let writer = AssetWriter::new(dir.path().join("out"), "android/res", &source);
        let descriptor = AssetDescriptor::new("mdpi", SizeRule::exact_square(8), "mipmap-mdpi");

        let path = writer.save_asset(&source.canvas, &descriptor, None).unwrap();
        let reread = image::open(path).unwrap().to_rgba8();
        assert_eq!(reread.get_pixel(0, 0).0, [1, 2, 3, 255]);
    }
}
