use campus_cms::database::init_database;
use campus_cms::services::open_gallery;
use campus_cms::{AppError, CmsConfig};
use std::process::ExitCode;

/// Maintenance entry point: brings the schema up to date and derives any
/// missing gallery thumbnails.
fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), AppError> {
    let config = CmsConfig::from_env()?;
    log::debug!("Configuration: {:?}", config);

    let conn = init_database(&config.database_path)?;
    let gallery = open_gallery(&conn, &config)?;

    let report = gallery.backfill_thumbnails()?;
    log::info!(
        "Thumbnail backfill: {} images examined, {} regenerated, {} failed",
        report.examined,
        report.regenerated,
        report.failed
    );

    Ok(())
}
