use std::process::ExitCode;

use orrery::run_app;
use tracing::error;

use super::bootstrap::{build_app, init_tracing};

pub(crate) fn run() -> ExitCode {
    init_tracing();
    let result =
        build_app().and_then(|app| run_app(app.config, app.solar, app.grid, app.theme));
    if let Err(err) = result {
        error!(error = %err, "startup_failed");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
