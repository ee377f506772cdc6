//! Photo and chart lookup
//!
//! Absence of an asset is an expected state, so lookups never return an error:
//! every probe ends in an [`AssetOutcome`] that the composer consumes.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::DynamicImage;

/// Extensions probed, in order of preference
pub const ASSET_EXTENSIONS: [&str; 2] = ["jpg", "png"];

/// Result of looking up and decoding one image asset
#[derive(Debug, Clone)]
pub enum AssetOutcome {
    /// File located and decoded
    Found {
        path: PathBuf,
        image: Arc<DynamicImage>,
    },
    /// No file with any accepted extension
    NotFound { stem: PathBuf },
    /// File located but could not be decoded
    DecodeFailed { path: PathBuf, reason: String },
}

impl AssetOutcome {
    /// Whether a file exists for this asset, decodable or not
    pub fn is_located(&self) -> bool {
        !matches!(self, AssetOutcome::NotFound { .. })
    }

    /// Decoded image, if any
    pub fn image(&self) -> Option<&Arc<DynamicImage>> {
        match self {
            AssetOutcome::Found { image, .. } => Some(image),
            _ => None,
        }
    }
}

/// Return the first `{dir}/{stem}.{ext}` that exists
pub fn locate(dir: &Path, stem: &str) -> Option<PathBuf> {
    ASSET_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{}.{}", stem, ext)))
        .find(|candidate| candidate.is_file())
}

/// Locate and decode an asset
pub fn load(dir: &Path, stem: &str) -> AssetOutcome {
    match locate(dir, stem) {
        None => AssetOutcome::NotFound {
            stem: dir.join(stem),
        },
        Some(path) => decode(path),
    }
}

fn decode(path: PathBuf) -> AssetOutcome {
    let decoded = image::ImageReader::open(&path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|e| e.to_string())
        .and_then(|reader| reader.decode().map_err(|e| e.to_string()));

    match decoded {
        Ok(image) => AssetOutcome::Found {
            path,
            image: Arc::new(image),
        },
        Err(reason) => AssetOutcome::DecodeFailed { path, reason },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn write_png(path: &Path) {
        RgbImage::from_pixel(4, 3, Rgb([28, 48, 98])).save(path).unwrap();
    }

    #[test]
    fn test_locate_none_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(locate(dir.path(), "42"), None);
    }

    #[test]
    fn test_locate_prefers_jpg() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("42_courbe1.png"), b"png").unwrap();
        std::fs::write(dir.path().join("42_courbe1.jpg"), b"jpg").unwrap();
        assert_eq!(
            locate(dir.path(), "42_courbe1"),
            Some(dir.path().join("42_courbe1.jpg"))
        );
    }

    #[test]
    fn test_locate_falls_back_to_png() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("42.png"), b"png").unwrap();
        assert_eq!(locate(dir.path(), "42"), Some(dir.path().join("42.png")));
    }

    #[test]
    fn test_locate_ignores_other_extensions() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("42.gif"), b"gif").unwrap();
        std::fs::create_dir(dir.path().join("42.jpg")).unwrap();
        assert_eq!(locate(dir.path(), "42"), None);
    }

    #[test]
    fn test_load_found() {
        let dir = tempfile::tempdir().unwrap();
        write_png(&dir.path().join("42.png"));

        let outcome = load(dir.path(), "42");
        assert!(outcome.is_located());
        let image = outcome.image().expect("image should decode");
        assert_eq!((image.width(), image.height()), (4, 3));
    }

    #[test]
    fn test_load_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = load(dir.path(), "42");
        assert!(!outcome.is_located());
        assert!(matches!(outcome, AssetOutcome::NotFound { .. }));
    }

    #[test]
    fn test_load_decode_failed() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("42.jpg"), b"definitely not a jpeg").unwrap();

        let outcome = load(dir.path(), "42");
        assert!(outcome.is_located());
        assert!(outcome.image().is_none());
        assert!(matches!(outcome, AssetOutcome::DecodeFailed { .. }));
    }
}
