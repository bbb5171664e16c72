//! Devhand binary entry point.
//!
//! Thin wrapper around [`devhand::cli::run`]: errors are printed once at
//! this boundary and mapped to the exit-code convention (0 success,
//! 1 validation/health-gate failure, 2 context error, 3 internal error).

use std::process::ExitCode;

use devhand::cli;
use devhand::ui::output;

fn main() -> ExitCode {
    match cli::run() {
        Ok(code) => ExitCode::from(code.clamp(0, 255) as u8),
        Err(err) => {
            output::error(&err);
            ExitCode::from(cli::exit_code_for(&err).clamp(0, 255) as u8)
        }
    }
}
