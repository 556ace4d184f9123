//! Process-level plumbing: argument parsing and fatal error reporting.

/// Report a fatal error and exit with code 1.
///
/// Nothing has been written to stdout at this point, so a failed run never
/// leaves a partial report behind.
pub fn handle_error(error: anyhow::Error) -> ! {
    eprintln!();
    eprintln!("notodiff failed:");
    eprintln!("{error:#}");
    eprintln!();
    eprintln!("Try running with --help for usage information.");
    std::process::exit(1);
}

/// Parse and validate command line arguments, exiting on invalid input.
pub fn get_cli_args() -> crate::core::cli::CliArgs {
    use clap::Parser;
    let args = crate::core::cli::CliArgs::parse();
    if let Err(message) = args.validate() {
        eprintln!("{message}");
        std::process::exit(2);
    }
    args
}
