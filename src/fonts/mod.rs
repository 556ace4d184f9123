//! Installed font discovery and binary metadata
//!
//! Scans an Android font directory for the Noto binaries worth comparing and
//! reads the handful of facts the report needs out of each sfnt.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use skrifa::raw::{FontRef, TableProvider};
use skrifa::{MetadataProvider, Tag};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub mod epoch;

pub use epoch::font_datetime;

/// Present in every Android system font directory.
pub const DEFAULT_REFERENCE_FONT: &str = "Roboto-Regular.ttf";

const FVAR: Tag = Tag::new(b"fvar");

/// A directory of installed font binaries.
#[derive(Debug, Clone)]
pub struct FontDirectory {
    root: PathBuf,
}

impl FontDirectory {
    /// Open `root`, checking that it contains `reference_font`.
    ///
    /// A missing reference font almost always means the image is not mounted
    /// where we were told it is.
    pub fn open(root: impl Into<PathBuf>, reference_font: &str) -> Result<Self> {
        let root = root.into();
        let reference = root.join(reference_font);
        if !reference.is_file() {
            return Err(anyhow!(
                "No fonts in '{}': missing {}",
                root.display(),
                reference_font
            ));
        }
        Ok(Self { root })
    }

    /// Regular-weight Noto binaries in the directory, sorted by path.
    pub fn candidates(&self) -> Result<Vec<PathBuf>> {
        let entries = fs::read_dir(&self.root)
            .with_context(|| format!("Failed to list font directory {}", self.root.display()))?;

        let mut candidates = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if !path.is_file() || !has_font_extension(&path) {
                continue;
            }
            let comparable = path
                .file_name()
                .is_some_and(|name| is_comparable_font_name(&name.to_string_lossy()));
            if comparable {
                candidates.push(path);
            } else {
                debug!("Skipping {}", path.display());
            }
        }
        candidates.sort();
        Ok(candidates)
    }
}

/// Matches the `*.?tf` glob: `.ttf`, `.otf` and friends.
fn has_font_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.chars().count() == 3 && ext.ends_with("tf"))
}

/// Only regular-weight, non-UI Noto fonts are compared.
pub fn is_comparable_font_name(file_name: &str) -> bool {
    file_name.contains("Noto") && !file_name.contains("UI") && !file_name.contains("Bold")
}

/// What we know about one font binary.
#[derive(Debug, Clone, PartialEq)]
pub struct FontMetadata {
    /// Codepoints mapped by the best cmap subtable
    pub coverage: BTreeSet<u32>,
    /// `head.fontRevision`
    pub revision: f64,
    /// `head.modified`, converted to UTC
    pub modified: DateTime<Utc>,
    pub byte_size: u64,
    pub has_fvar: bool,
}

impl FontMetadata {
    /// Read and parse the font at `path`.
    pub fn read(path: &Path) -> Result<Self> {
        let data =
            fs::read(path).with_context(|| format!("Failed to read font {}", path.display()))?;
        Self::from_bytes(&data, data.len() as u64)
            .with_context(|| format!("Failed to parse font {}", path.display()))
    }

    pub fn from_bytes(data: &[u8], byte_size: u64) -> Result<Self> {
        let font = FontRef::new(data).map_err(|e| anyhow!("Invalid font data: {e}"))?;
        let head = font
            .head()
            .map_err(|e| anyhow!("Unreadable head table: {e}"))?;

        let coverage = font
            .charmap()
            .mappings()
            .map(|(codepoint, _gid)| codepoint)
            .collect();

        Ok(Self {
            coverage,
            revision: head.font_revision().to_f64(),
            modified: font_datetime(head.modified().as_secs()),
            byte_size,
            has_fvar: font.table_data(FVAR).is_some(),
        })
    }

    pub fn encoded_glyphs(&self) -> usize {
        self.coverage.len()
    }

    /// Revision with three decimals, e.g. `2.004`.
    pub fn version_string(&self) -> String {
        format!("{:.3}", self.revision)
    }

    /// Modified date as `YYYY-MM-DD`.
    pub fn date_string(&self) -> String {
        self.modified.format("%Y-%m-%d").to_string()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    // 2023-06-01T00:00:00Z in font epoch seconds
    const JUNE_2023: i64 = 1_685_577_600 + 2_082_844_800;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"").unwrap();
    }

    #[test]
    fn test_open_requires_reference_font() {
        let dir = tempfile::tempdir().unwrap();
        let err = FontDirectory::open(dir.path(), DEFAULT_REFERENCE_FONT).unwrap_err();
        assert!(err.to_string().contains("No fonts in"));

        touch(dir.path(), DEFAULT_REFERENCE_FONT);
        assert!(FontDirectory::open(dir.path(), DEFAULT_REFERENCE_FONT).is_ok());
    }

    #[test]
    fn test_candidates_filtering() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            DEFAULT_REFERENCE_FONT,
            "NotoSansThai-Regular.ttf",
            "NotoSerifArmenian-VF.otf",
            "NotoSansThaiUI-Regular.ttf",
            "NotoSansThai-Bold.ttf",
            "NotoColorEmoji.ttc",
            "NotoSansCJK-Regular.ttc",
            "DroidSansMono.ttf",
            "NotoSans-Regular.txt",
        ] {
            touch(dir.path(), name);
        }

        let fonts = FontDirectory::open(dir.path(), DEFAULT_REFERENCE_FONT).unwrap();
        let names: Vec<String> = fonts
            .candidates()
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec!["NotoSansThai-Regular.ttf", "NotoSerifArmenian-VF.otf"]
        );
    }

    #[test]
    fn test_comparable_font_name() {
        assert!(is_comparable_font_name("NotoSansAdlam-VF.ttf"));
        assert!(!is_comparable_font_name("NotoSansAdlamUI-VF.ttf"));
        assert!(!is_comparable_font_name("NotoSerif-Bold.ttf"));
        assert!(!is_comparable_font_name("Roboto-Regular.ttf"));
    }

    #[test]
    fn test_metadata_from_bytes() {
        let data = test_font::build(&[0x41, 0x42, 0x1F600], 2.004, JUNE_2023, false);
        let meta = FontMetadata::from_bytes(&data, data.len() as u64).unwrap();

        assert_eq!(meta.coverage, BTreeSet::from([0x41, 0x42, 0x1F600]));
        assert_eq!(meta.encoded_glyphs(), 3);
        assert_eq!(meta.version_string(), "2.004");
        assert_eq!(meta.date_string(), "2023-06-01");
        assert_eq!(meta.byte_size, data.len() as u64);
        assert!(!meta.has_fvar);
    }

    #[test]
    fn test_metadata_detects_fvar() {
        let data = test_font::build(&[0x41], 1.0, JUNE_2023, true);
        let meta = FontMetadata::from_bytes(&data, data.len() as u64).unwrap();
        assert!(meta.has_fvar);
        assert_eq!(meta.version_string(), "1.000");
    }

    #[test]
    fn test_read_reports_path_on_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("NotoSans-Regular.ttf");
        fs::write(&path, b"definitely not a font").unwrap();
        let err = FontMetadata::read(&path).unwrap_err();
        assert!(format!("{err:#}").contains("NotoSans-Regular.ttf"));
    }

    #[test]
    fn test_read_uses_file_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("NotoSans-Regular.ttf");
        let data = test_font::build(&[0x41, 0x42], 2.0, JUNE_2023, false);
        fs::write(&path, &data).unwrap();
        let meta = FontMetadata::read(&path).unwrap();
        assert_eq!(meta.byte_size, data.len() as u64);
    }
}
