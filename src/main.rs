//! fk - repository files and deploy hooks from the command line

use std::process::ExitCode;

fn main() -> ExitCode {
    forgekit::cli::run()
}
