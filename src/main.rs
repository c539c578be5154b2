use clap::Parser;

use mediafetch_lib::cli::Cli;

fn main() -> std::process::ExitCode {
    mediafetch_lib::run(Cli::parse())
}
