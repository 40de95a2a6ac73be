use std::process::ExitCode;

use colored::Colorize;
use tracing_subscriber::EnvFilter;

use json2cpp::cli::CommandLineInterface;

fn main() -> ExitCode {
    let command_line_interface = CommandLineInterface::load();
    init_tracing(command_line_interface.verbose());

    match command_line_interface.run() {
        Ok(outcome) => {
            print!("{outcome}");
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("{} {error:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so the manifest on stdout stays clean.
fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("json2cpp=warn"),
        1 => EnvFilter::new("json2cpp=debug"),
        _ => EnvFilter::new("json2cpp=trace"),
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
