//! Upstream Noto manifest handling
//!
//! Loads the `noto.json` state document published by notofonts.github.io and
//! indexes its distributable files by normalized font name, so installed
//! binaries can be joined against their upstream counterparts.

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Suffixes removed from file names, tested once each and in this order.
pub const FONT_NAME_SUFFIXES: [&str; 7] = [
    ".ttf", ".otf", "-Regular", "-Bold", "-Italic", "-VF", "[wght]",
];

/// Marker for the reduced-size variable font distribution.
pub const SLIM_VARIABLE_MARKER: &str = "slim-variable-ttf";

/// Strip known suffixes from a font file name in a single pass.
///
/// Each suffix in [`FONT_NAME_SUFFIXES`] is checked exactly once against
/// whatever the previous suffixes left behind:
///
/// ```
/// use notodiff::manifest::normalize_font_name;
///
/// assert_eq!(normalize_font_name("NotoSansThai-Regular.ttf"), "NotoSansThai");
/// assert_eq!(normalize_font_name("NotoSansThai[wght].ttf"), "NotoSansThai");
/// ```
pub fn normalize_font_name(name: &str) -> String {
    let mut name = name;
    for suffix in FONT_NAME_SUFFIXES {
        if let Some(stripped) = name.strip_suffix(suffix) {
            name = stripped;
        }
    }
    name.to_string()
}

/// The whole manifest: repository name to repository state, in document order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    pub repos: IndexMap<String, RepoEntry>,
}

/// One upstream repository, e.g. `latin-greek-cyrillic`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepoEntry {
    #[serde(default)]
    pub families: IndexMap<String, FamilyEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FamilyEntry {
    pub files: FamilyFiles,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FamilyFiles {
    pub unhinted: Vec<String>,
}

/// Where the upstream copy of a font lives and what it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamEntry {
    pub latest: PathBuf,
    pub repo_name: String,
    pub family_name: String,
}

/// Normalized font name to upstream entry.
#[derive(Debug, Clone, Default)]
pub struct UpstreamIndex {
    entries: HashMap<String, UpstreamEntry>,
}

impl UpstreamIndex {
    pub fn get(&self, key: &str) -> Option<&UpstreamEntry> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// An upstream family that has no installed counterpart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnseenFamily {
    pub family: String,
    pub repo: String,
}

impl Manifest {
    /// Load the manifest from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest {}", path.display()))?;
        let manifest = Self::from_json(&contents)
            .with_context(|| format!("Failed to parse manifest {}", path.display()))?;
        debug!(
            "Loaded manifest {} with {} repositories",
            path.display(),
            manifest.repos.len()
        );
        Ok(manifest)
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        Ok(serde_json::from_str(contents)?)
    }

    /// The files considered canonical for a family.
    ///
    /// When a family ships both slim and regular variable fonts, only the
    /// slim ones are kept.
    pub fn canonical_files(family: &FamilyEntry) -> Vec<&str> {
        let unhinted = &family.files.unhinted;
        let has_slim = unhinted
            .iter()
            .any(|path| path.contains(SLIM_VARIABLE_MARKER));
        if unhinted.len() > 1 && has_slim {
            unhinted
                .iter()
                .filter(|path| path.contains(SLIM_VARIABLE_MARKER))
                .map(String::as_str)
                .collect()
        } else {
            unhinted.iter().map(String::as_str).collect()
        }
    }

    /// Index every canonical file by its normalized name.
    ///
    /// Paths in the manifest are relative to `upstream_root`. When two files
    /// share a name, the one later in the document wins.
    pub fn index(&self, upstream_root: &Path) -> UpstreamIndex {
        let mut entries = HashMap::new();
        for (repo_name, repo) in &self.repos {
            for (family_name, family) in &repo.families {
                for file in Self::canonical_files(family) {
                    let file_name = Path::new(file)
                        .file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or_else(|| file.to_string());
                    entries.insert(
                        normalize_font_name(&file_name),
                        UpstreamEntry {
                            latest: upstream_root.join(file),
                            repo_name: repo_name.clone(),
                            family_name: family_name.clone(),
                        },
                    );
                }
            }
        }
        debug!("Indexed {} upstream font files", entries.len());
        UpstreamIndex { entries }
    }

    /// Every family of every repository that is not in `seen_repos`.
    pub fn unseen_families(&self, seen_repos: &BTreeSet<String>) -> Vec<UnseenFamily> {
        self.repos
            .iter()
            .filter(|(repo_name, _)| !seen_repos.contains(*repo_name))
            .flat_map(|(repo_name, repo)| {
                repo.families.keys().map(move |family_name| UnseenFamily {
                    family: family_name.clone(),
                    repo: repo_name.clone(),
                })
            })
            .collect()
    }
}
