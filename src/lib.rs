pub mod app;
pub mod appearance;
pub mod config;
pub mod controller;
pub mod daemon;
pub mod error;
pub mod logging;
pub mod notification;
pub mod schedule;
pub mod settings;
pub mod state;
pub mod storage;
pub use error::{AppError, AppResult};

use app::{App, AppOptions, RunOptions};

/// Entrypoint used by the CLI binding: run the scheduler until shutdown.
pub fn run(options: AppOptions, run_options: RunOptions) -> AppResult<()> {
    logging::init();
    tracing::info!("starting daynight");

    let app = App::new(options)?;
    app.run(run_options)?;

    tracing::info!("daynight stopped");
    Ok(())
}
