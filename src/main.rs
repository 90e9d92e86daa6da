use clap::Parser;
use fsort::cli::{CliArgs, run_cli};
use fsort::output::OutputFormatter;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = CliArgs::parse();

    match run_cli(&args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}", OutputFormatter::error(&format!("Error: {}", e)));
            ExitCode::FAILURE
        }
    }
}
