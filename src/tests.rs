//! End-to-end pipeline tests against scratch font directories and a fake
//! GitHub.

#[cfg(test)]
mod pipeline_tests {
    use crate::core::config_file::Settings;
    use crate::core::runner::{compare_fonts, write_report};
    use crate::fonts::{test_font, FontDirectory, DEFAULT_REFERENCE_FONT};
    use crate::github::{ActivitySource, RepositoryActivity};
    use crate::manifest::Manifest;
    use crate::report::ReportBuilder;
    use anyhow::{anyhow, Result};
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    // font-epoch seconds
    const JAN_2022: i64 = 1_640_995_200 + 2_082_844_800;
    const JAN_2024: i64 = 1_704_067_200 + 2_082_844_800;

    /// Serves canned activity per repository and records every query.
    #[derive(Default)]
    struct FakeGithub {
        activity: HashMap<String, String>,
        calls: RefCell<Vec<(String, String, String)>>,
    }

    impl FakeGithub {
        fn with_repo(mut self, repo: &str, json: &str) -> Self {
            self.activity.insert(repo.to_string(), json.to_string());
            self
        }
    }

    impl ActivitySource for FakeGithub {
        async fn fetch(&self, owner: &str, repo: &str, since: &str) -> Result<RepositoryActivity> {
            self.calls
                .borrow_mut()
                .push((owner.to_string(), repo.to_string(), since.to_string()));
            match self.activity.get(repo) {
                Some(json) => Ok(serde_json::from_str(json)?),
                None => Ok(RepositoryActivity::default()),
            }
        }
    }

    struct BrokenGithub;

    impl ActivitySource for BrokenGithub {
        async fn fetch(&self, owner: &str, repo: &str, _since: &str) -> Result<RepositoryActivity> {
            Err(anyhow!("connection refused querying {owner}/{repo}"))
        }
    }

    struct Workspace {
        _dir: TempDir,
        fonts_dir: PathBuf,
        upstream_root: PathBuf,
        manifest: PathBuf,
    }

    impl Workspace {
        fn new(manifest: &str) -> Self {
            let dir = tempfile::tempdir().unwrap();
            let fonts_dir = dir.path().join("android/system/system/fonts");
            let upstream_root = dir.path().join("notofonts.github.io");
            fs::create_dir_all(&fonts_dir).unwrap();
            fs::create_dir_all(upstream_root.join("docs")).unwrap();
            fs::write(fonts_dir.join(DEFAULT_REFERENCE_FONT), b"").unwrap();

            let manifest_path = upstream_root.join("docs/noto.json");
            fs::write(&manifest_path, manifest).unwrap();
            Self {
                _dir: dir,
                fonts_dir,
                upstream_root,
                manifest: manifest_path,
            }
        }

        fn android_font(&self, name: &str, data: &[u8]) -> PathBuf {
            let path = self.fonts_dir.join(name);
            fs::write(&path, data).unwrap();
            path
        }

        fn upstream_font(&self, relative: &str, data: &[u8]) {
            let path = self.upstream_root.join(relative);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, data).unwrap();
        }

        fn settings(&self) -> Settings {
            Settings {
                fonts_dir: self.fonts_dir.clone(),
                manifest: self.manifest.clone(),
                upstream_root: self.upstream_root.clone(),
                ..Settings::default()
            }
        }

        fn fonts(&self) -> FontDirectory {
            FontDirectory::open(&self.fonts_dir, DEFAULT_REFERENCE_FONT).unwrap()
        }
    }

    const TWO_FAMILY_MANIFEST: &str = r#"{
        "thai": {"families": {"Noto Sans Thai": {"files": {"unhinted": [
            "fonts/NotoSansThai/unhinted/slim-variable-ttf/NotoSansThai[wght].ttf",
            "fonts/NotoSansThai/unhinted/variable-ttf/NotoSansThai[wght].ttf"
        ]}}}},
        "arabic": {"families": {"Noto Naskh Arabic": {"files": {"unhinted": [
            "fonts/NotoNaskhArabic/unhinted/ttf/NotoNaskhArabic-Regular.ttf"
        ]}}}}
    }"#;

    const THAI_ACTIVITY: &str = r#"{
        "issues": {"nodes": [
            {"title": "Missing Thai digit", "number": 12, "url": "https://github.com/notofonts/thai/issues/12", "closedAt": "2023-03-04T05:06:07Z"},
            {"title": "Closed on build day", "number": 3, "url": "https://github.com/notofonts/thai/issues/3", "closedAt": "2022-01-01T00:00:00Z"}
        ]},
        "refs": {"nodes": [
            {"name": "NotoSansThai-v2.004", "target": {"message": "Variable release", "target": {"committedDate": "2023-11-01T00:00:00Z"}}},
            {"name": "NotoSansThaiLooped-v1.001", "target": {"message": "Looped", "target": {"committedDate": "2023-11-01T00:00:00Z"}}}
        ]}
    }"#;

    #[tokio::test]
    async fn test_end_to_end_one_match_one_missing() {
        let ws = Workspace::new(TWO_FAMILY_MANIFEST);
        ws.android_font(
            "NotoSansThai-Regular.ttf",
            &test_font::build(&[0x41, 0x0E01], 2.0, JAN_2022, false),
        );
        let ghost = ws.android_font("NotoSansGhost-Regular.ttf", b"");
        ws.upstream_font(
            "fonts/NotoSansThai/unhinted/slim-variable-ttf/NotoSansThai[wght].ttf",
            &test_font::build(&[0x41, 0x0E01, 0x0E02], 2.004, JAN_2024, true),
        );

        let github = FakeGithub::default().with_repo("thai", THAI_ACTIVITY);
        let report = compare_fonts(&ws.settings(), &ws.fonts(), &github)
            .await
            .unwrap();

        assert_eq!(report.results.len(), 1);
        let thai = &report.results[0];
        assert_eq!(thai.family_name, "Noto Sans Thai");
        assert_eq!(thai.repo_name, "thai");
        assert!(thai.noto_file.contains("slim-variable-ttf"));
        assert_eq!(thai.android_version, "2.000");
        assert_eq!(thai.noto_version, "2.004");
        assert_eq!(thai.android_encoded_glyphs, 2);
        assert_eq!(thai.noto_encoded_glyphs, 3);
        assert_eq!(thai.new_encoded, 1);
        assert_eq!(thai.android_date, "2022-01-01");
        assert_eq!(thai.noto_date, "2024-01-01");
        assert!(thai.vf_upgrade);
        assert_eq!(thai.issue_count, 1);
        assert_eq!(thai.issues[0].number, 12);
        assert_eq!(thai.release_notes.len(), 1);
        assert_eq!(thai.release_notes[0].version, "NotoSansThai-v2.004");

        assert_eq!(report.unseen_families.len(), 1);
        assert_eq!(report.unseen_families[0].family, "Noto Naskh Arabic");
        assert_eq!(report.unseen_families[0].repo, "arabic");

        // the missing font only shows up as a diagnostic
        assert_eq!(report.unmatched, vec![ghost]);
        assert!(!report.to_json_pretty().unwrap().contains("NotoSansGhost"));

        let calls = github.calls.borrow();
        assert_eq!(calls.len(), 1);
        let (owner, repo, since) = &calls[0];
        assert_eq!(owner, "notofonts");
        assert_eq!(repo, "thai");
        assert_eq!(since, "2022-01-01T00:00:00Z");
    }

    #[tokio::test]
    async fn test_results_sorted_regardless_of_discovery_order() {
        let ws = Workspace::new(
            r#"{
                "zed": {"families": {"Zed": {"files": {"unhinted": ["fonts/NotoSansAaa-Regular.ttf"]}}}},
                "alpha": {"families": {"Alpha": {"files": {"unhinted": ["fonts/NotoSansBbb-Regular.ttf"]}}}}
            }"#,
        );
        let font = test_font::build(&[0x41], 1.0, JAN_2022, false);
        for name in ["NotoSansAaa-Regular.ttf", "NotoSansBbb-Regular.ttf"] {
            ws.android_font(name, &font);
            ws.upstream_font(&format!("fonts/{name}"), &font);
        }

        let github = FakeGithub::default();
        let report = compare_fonts(&ws.settings(), &ws.fonts(), &github)
            .await
            .unwrap();

        let families: Vec<&str> = report
            .results
            .iter()
            .map(|r| r.family_name.as_str())
            .collect();
        assert_eq!(families, vec!["Alpha", "Zed"]);
        assert!(report.unseen_families.is_empty());
        assert_eq!(github.calls.borrow().len(), 2);
    }

    #[tokio::test]
    async fn test_remote_failure_aborts_run() {
        let ws = Workspace::new(TWO_FAMILY_MANIFEST);
        let font = test_font::build(&[0x41], 1.0, JAN_2022, false);
        ws.android_font("NotoNaskhArabic-Regular.ttf", &font);
        ws.upstream_font(
            "fonts/NotoNaskhArabic/unhinted/ttf/NotoNaskhArabic-Regular.ttf",
            &font,
        );

        let manifest = Manifest::load(&ws.manifest).unwrap();
        let builder = ReportBuilder::new(&manifest, &ws.upstream_root, &BrokenGithub, "notofonts");
        let err = builder.build(&ws.fonts()).await.unwrap_err();
        assert!(err.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_missing_upstream_binary_is_fatal() {
        let ws = Workspace::new(TWO_FAMILY_MANIFEST);
        ws.android_font(
            "NotoSansThai-Regular.ttf",
            &test_font::build(&[0x41], 1.0, JAN_2022, false),
        );

        let result = compare_fonts(&ws.settings(), &ws.fonts(), &FakeGithub::default()).await;
        let err = result.unwrap_err();
        assert!(format!("{err:#}").contains("NotoSansThai[wght].ttf"));
    }

    #[tokio::test]
    async fn test_missing_manifest_is_fatal() {
        let ws = Workspace::new("{}");
        fs::remove_file(&ws.manifest).unwrap();
        let result = compare_fonts(&ws.settings(), &ws.fonts(), &FakeGithub::default()).await;
        assert!(result.unwrap_err().to_string().contains("Failed to read manifest"));
    }

    #[test]
    fn test_missing_reference_font_is_fatal() {
        let ws = Workspace::new("{}");
        fs::remove_file(ws.fonts_dir.join(DEFAULT_REFERENCE_FONT)).unwrap();
        assert!(FontDirectory::open(&ws.fonts_dir, DEFAULT_REFERENCE_FONT).is_err());
    }

    #[tokio::test]
    async fn test_write_report_to_file() {
        let ws = Workspace::new(TWO_FAMILY_MANIFEST);
        let report = compare_fonts(&ws.settings(), &ws.fonts(), &FakeGithub::default())
            .await
            .unwrap();
        assert!(report.results.is_empty());
        assert_eq!(report.unseen_families.len(), 2);

        let output = ws.fonts_dir.join("report.json");
        write_report(&report, Some(Path::new(&output))).unwrap();
        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(written["results"], serde_json::json!([]));
        assert_eq!(written["unseen_families"][0]["repo"], "thai");
        assert_eq!(written["unseen_families"][1]["repo"], "arabic");
    }
}
