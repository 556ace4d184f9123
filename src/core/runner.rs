//! Application runner logic
//!
//! Checks the run's preconditions in order (font directory, credentials,
//! manifest), then drives the comparison and prints the report.

use crate::core::cli::CliArgs;
use crate::core::config_file::{ConfigFile, Settings};
use crate::fonts::FontDirectory;
use crate::github::{ActivitySource, GithubClient};
use crate::logging;
use crate::manifest::Manifest;
use crate::report::{Report, ReportBuilder};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Run notodiff with the given CLI arguments.
pub async fn run_app(cli_args: CliArgs) -> Result<()> {
    if cli_args.new_config {
        let path = ConfigFile::config_path();
        if ConfigFile::initialize(&path)? {
            eprintln!("Created settings file: {}", path.display());
        } else {
            eprintln!("Settings file already exists: {}", path.display());
        }
        return Ok(());
    }

    let _log_guard = logging::init(cli_args.verbose, cli_args.log_to_file)?;
    let settings = cli_args.resolve(ConfigFile::load().as_ref());

    let report = generate_report(&settings).await?;
    write_report(&report, cli_args.output.as_deref())
}

/// Build the report against the live GitHub API.
pub async fn generate_report(settings: &Settings) -> Result<Report> {
    let fonts = FontDirectory::open(&settings.fonts_dir, &settings.reference_font)?;
    let client = GithubClient::from_env(settings.api_url.as_str())?;
    compare_fonts(settings, &fonts, &client).await
}

/// Build the report for an already opened font directory.
pub async fn compare_fonts<S: ActivitySource>(
    settings: &Settings,
    fonts: &FontDirectory,
    source: &S,
) -> Result<Report> {
    let manifest = Manifest::load(&settings.manifest)?;
    ReportBuilder::new(
        &manifest,
        &settings.upstream_root,
        source,
        settings.owner.as_str(),
    )
    .build(fonts)
    .await
}

/// Print the report to stdout, or write it to `output`.
pub fn write_report(report: &Report, output: Option<&Path>) -> Result<()> {
    let json = report.to_json_pretty()?;
    match output {
        Some(path) => fs::write(path, format!("{json}\n"))
            .with_context(|| format!("Failed to write report to {}", path.display())),
        None => {
            println!("{json}");
            Ok(())
        }
    }
}
