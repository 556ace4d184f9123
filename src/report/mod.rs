//! Report assembly
//!
//! Drives the comparison for every installed Noto font and collects the
//! per-family records, plus the upstream families Android does not ship.

use crate::compare::FontDiff;
use crate::fonts::{FontDirectory, FontMetadata};
use crate::github::{ActivitySource, Issue, ReleaseNote, UpstreamActivity};
use crate::manifest::{normalize_font_name, Manifest, UnseenFamily, UpstreamEntry, UpstreamIndex};
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// One compared family. Field names follow the published report format,
/// where "their" is the Android copy and "my" the upstream Noto copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FamilyReport {
    pub family_name: String,
    #[serde(rename = "my_file")]
    pub noto_file: String,
    #[serde(rename = "their_version")]
    pub android_version: String,
    #[serde(rename = "their_bytesize")]
    pub android_bytesize: u64,
    #[serde(rename = "my_bytesize")]
    pub noto_bytesize: u64,
    pub noto_version: String,
    #[serde(rename = "their_encoded_glyphs")]
    pub android_encoded_glyphs: usize,
    pub noto_encoded_glyphs: usize,
    pub new_encoded: usize,
    #[serde(rename = "their_date")]
    pub android_date: String,
    pub noto_date: String,
    pub release_notes: Vec<ReleaseNote>,
    pub issue_count: usize,
    pub issues: Vec<Issue>,
    pub repo_name: String,
    pub vf_upgrade: bool,
}

impl FamilyReport {
    pub fn new(upstream: &UpstreamEntry, diff: FontDiff, activity: UpstreamActivity) -> Self {
        Self {
            family_name: upstream.family_name.clone(),
            noto_file: upstream.latest.display().to_string(),
            android_version: diff.android_version,
            android_bytesize: diff.android_bytesize,
            noto_bytesize: diff.noto_bytesize,
            noto_version: diff.noto_version,
            android_encoded_glyphs: diff.android_encoded_glyphs,
            noto_encoded_glyphs: diff.noto_encoded_glyphs,
            new_encoded: diff.new_encoded,
            android_date: diff.android_date,
            noto_date: diff.noto_date,
            release_notes: activity.release_notes,
            issue_count: activity.issues.len(),
            issues: activity.issues,
            repo_name: upstream.repo_name.clone(),
            vf_upgrade: diff.vf_upgrade,
        }
    }
}

/// The complete report.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    pub results: Vec<FamilyReport>,
    pub unseen_families: Vec<UnseenFamily>,
    /// Installed fonts with no upstream match; reported on stderr only
    #[serde(skip)]
    pub unmatched: Vec<PathBuf>,
}

impl Report {
    /// Sort `results` by family name and work out which upstream families
    /// have no installed counterpart.
    pub fn assemble(
        mut results: Vec<FamilyReport>,
        manifest: &Manifest,
        unmatched: Vec<PathBuf>,
    ) -> Self {
        results.sort_by(|a, b| a.family_name.cmp(&b.family_name));
        let seen_repos: BTreeSet<String> = results
            .iter()
            .map(|result| result.repo_name.clone())
            .collect();
        let unseen_families = manifest.unseen_families(&seen_repos);
        Self {
            results,
            unseen_families,
            unmatched,
        }
    }

    /// Two-space indented JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize report")
    }
}

/// Runs the comparison pipeline against one activity source.
pub struct ReportBuilder<'a, S> {
    manifest: &'a Manifest,
    index: UpstreamIndex,
    source: &'a S,
    owner: String,
}

impl<'a, S: ActivitySource> ReportBuilder<'a, S> {
    pub fn new(
        manifest: &'a Manifest,
        upstream_root: &Path,
        source: &'a S,
        owner: impl Into<String>,
    ) -> Self {
        Self {
            manifest,
            index: manifest.index(upstream_root),
            source,
            owner: owner.into(),
        }
    }

    /// Compare every candidate font in `fonts`, one family at a time.
    pub async fn build(&self, fonts: &FontDirectory) -> Result<Report> {
        let mut results = Vec::new();
        let mut unmatched = Vec::new();

        for path in fonts.candidates()? {
            let Some(upstream) = self.lookup(&path) else {
                warn!("Can't find upstream version of {}", path.display());
                unmatched.push(path);
                continue;
            };
            results.push(self.compare(&path, upstream).await?);
        }

        let report = Report::assemble(results, self.manifest, unmatched);
        info!(
            "Compared {} families, {} upstream families not shipped",
            report.results.len(),
            report.unseen_families.len()
        );
        Ok(report)
    }

    fn lookup(&self, path: &Path) -> Option<&UpstreamEntry> {
        let file_name = path.file_name()?.to_string_lossy();
        self.index.get(&normalize_font_name(&file_name))
    }

    async fn compare(&self, path: &Path, upstream: &UpstreamEntry) -> Result<FamilyReport> {
        let android = FontMetadata::read(path)?;
        let noto = FontMetadata::read(&upstream.latest)?;
        let diff = FontDiff::between(&android, &noto);

        let threshold = diff.activity_threshold();
        let activity = self
            .source
            .fetch(&self.owner, &upstream.repo_name, &threshold)
            .await?
            .filter(
                &threshold,
                &upstream.family_name,
                &self.owner,
                &upstream.repo_name,
            );

        info!(
            "{}: {} -> {}, {} new codepoints, {} releases, {} issues",
            upstream.family_name,
            diff.android_version,
            diff.noto_version,
            diff.new_encoded,
            activity.release_notes.len(),
            activity.issues.len()
        );
        Ok(FamilyReport::new(upstream, diff, activity))
    }
}
