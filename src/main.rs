use std::process::ExitCode;

use tiercheck::cli::{self, EXIT_SETUP_ERROR};
use tiercheck::ui::output;

fn main() -> ExitCode {
    match cli::run() {
        Ok(code) => code,
        Err(e) => {
            output::error(format!("{:#}", e));
            ExitCode::from(EXIT_SETUP_ERROR)
        }
    }
}
