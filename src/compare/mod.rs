//! Local versus upstream font comparison

use crate::fonts::FontMetadata;

/// Differences between an installed font and its upstream release.
///
/// "Android" is the font found in the system image, "Noto" the upstream one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontDiff {
    pub android_version: String,
    pub noto_version: String,
    pub android_bytesize: u64,
    pub noto_bytesize: u64,
    pub android_encoded_glyphs: usize,
    pub noto_encoded_glyphs: usize,
    /// Codepoints upstream covers that the installed font does not
    pub new_encoded: usize,
    pub android_date: String,
    pub noto_date: String,
    /// Static font on the device, variable font upstream
    pub vf_upgrade: bool,
}

impl FontDiff {
    pub fn between(android: &FontMetadata, noto: &FontMetadata) -> Self {
        Self {
            android_version: android.version_string(),
            noto_version: noto.version_string(),
            android_bytesize: android.byte_size,
            noto_bytesize: noto.byte_size,
            android_encoded_glyphs: android.encoded_glyphs(),
            noto_encoded_glyphs: noto.encoded_glyphs(),
            new_encoded: noto.coverage.difference(&android.coverage).count(),
            android_date: android.date_string(),
            noto_date: noto.date_string(),
            vf_upgrade: is_vf_upgrade(android.has_fvar, noto.has_fvar),
        }
    }

    /// Upstream activity strictly after this instant is of interest.
    pub fn activity_threshold(&self) -> String {
        format!("{}T00:00:00Z", self.android_date)
    }
}

fn is_vf_upgrade(android_has_fvar: bool, noto_has_fvar: bool) -> bool {
    !android_has_fvar && noto_has_fvar
}
