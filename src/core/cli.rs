//! Command line interface for notodiff
//!
//! Handles parsing command line arguments and provides validation for user
//! inputs. Every path option can also come from the settings file, see
//! [`crate::core::config_file`].

use crate::core::config_file::{ConfigFile, Settings};
use clap::Parser;
use std::path::PathBuf;

/// notodiff CLI arguments
///
/// Examples:
///   notodiff                                      # Compare fonts in android/system/system/fonts
///   notodiff --fonts-dir /mnt/system/fonts        # Compare a mounted image
///   notodiff --output report.json                 # Write the report to a file
///   ANDROID_MOUNT_POINT=/mnt/fonts notodiff -v    # Debug logging
#[derive(Parser, Debug, Clone, Default)]
#[clap(
    name = "notodiff",
    version,
    about = "Compare Android's Noto fonts against upstream releases",
    long_about = "notodiff reads the Noto fonts installed in an Android system image, matches them against the upstream notofonts manifest, and prints a JSON report of version drift, coverage changes and upstream issues and releases since the installed build."
)]
pub struct CliArgs {
    /// Directory holding the installed font binaries
    #[clap(
        long = "fonts-dir",
        short = 'd',
        env = "ANDROID_MOUNT_POINT",
        help = "Directory of installed Android fonts",
        long_help = "Directory of installed Android fonts, usually system/fonts of a mounted system image. It must contain the reference font (Roboto-Regular.ttf unless overridden)."
    )]
    pub fonts_dir: Option<PathBuf>,

    /// Path to the upstream noto.json manifest
    #[clap(long = "manifest", short = 'm', help = "Upstream noto.json manifest")]
    pub manifest: Option<PathBuf>,

    /// Checkout that manifest file paths are relative to
    #[clap(
        long = "upstream-root",
        help = "Directory the manifest's font paths are relative to"
    )]
    pub upstream_root: Option<PathBuf>,

    /// File that must exist in the fonts directory
    #[clap(
        long = "reference-font",
        help = "Font that must exist in the fonts directory"
    )]
    pub reference_font: Option<String>,

    /// GitHub organization hosting the font repositories
    #[clap(long = "owner", help = "GitHub organization of the font repositories")]
    pub owner: Option<String>,

    /// GitHub GraphQL endpoint
    #[clap(long = "api-url", help = "GitHub GraphQL endpoint")]
    pub api_url: Option<String>,

    /// Write the report here instead of standard output
    #[clap(long = "output", short = 'o', help = "Write the JSON report to a file")]
    pub output: Option<PathBuf>,

    /// Enable debug logging
    #[clap(long = "verbose", short = 'v', help = "Enable debug logging")]
    pub verbose: bool,

    /// Also write logs to the daily log file
    #[clap(
        long = "log-to-file",
        help = "Also write logs to the notodiff logs directory",
        long_help = "Also write logs to ~/.config/notodiff/logs/notodiff-YYYY-MM-DD.log (or the platform equivalent). Console logging on stderr is unaffected."
    )]
    pub log_to_file: bool,

    /// Initialize user configuration directory with a settings file
    #[clap(
        long = "new-config",
        help = "Write a default settings file and exit",
        long_help = "Create ~/.config/notodiff/settings.json (or the platform equivalent) filled with the built-in defaults, then exit. Existing settings are left alone."
    )]
    pub new_config: bool,
}

impl CliArgs {
    /// Validate the CLI arguments after parsing
    pub fn validate(&self) -> Result<(), String> {
        if let Some(owner) = &self.owner {
            if owner.trim().is_empty() {
                return Err("Owner must not be empty".to_string());
            }
        }

        if let Some(url) = &self.api_url {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(format!(
                    "Invalid API URL: '{url}'\nExpected an http:// or https:// URL."
                ));
            }
        }

        Ok(())
    }

    /// Resolve the run settings.
    ///
    /// Priority order:
    /// 1. CLI argument
    /// 2. Config file setting (~/.config/notodiff/settings.json)
    /// 3. Built-in default
    pub fn resolve(&self, config: Option<&ConfigFile>) -> Settings {
        let config = config.cloned().unwrap_or_default();
        let defaults = Settings::default();
        Settings {
            fonts_dir: self
                .fonts_dir
                .clone()
                .or(config.fonts_dir)
                .unwrap_or(defaults.fonts_dir),
            manifest: self
                .manifest
                .clone()
                .or(config.manifest)
                .unwrap_or(defaults.manifest),
            upstream_root: self
                .upstream_root
                .clone()
                .or(config.upstream_root)
                .unwrap_or(defaults.upstream_root),
            reference_font: self
                .reference_font
                .clone()
                .or(config.reference_font)
                .unwrap_or(defaults.reference_font),
            owner: self
                .owner
                .clone()
                .or(config.owner)
                .unwrap_or(defaults.owner),
            api_url: self
                .api_url
                .clone()
                .or(config.api_url)
                .unwrap_or(defaults.api_url),
        }
    }
}
