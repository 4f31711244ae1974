// Public modules
pub mod auth;
pub mod config;
pub mod domains;
pub mod errors;
pub mod types;
pub mod validation;

pub use config::ReportSettings;
pub use domains::demographics::{
    bucketize, summarize, DemographicReport, DemographicReportService, DemographicReportServiceImpl,
    ReportView,
};
pub use domains::person::{filter, FilterCriteria, PersonRecord};

/// Initialize logging for the library's host process.
///
/// Respects `RUST_LOG` when set; otherwise logs at `debug` in debug builds and
/// `info` in release builds. Safe to call more than once.
pub fn init_logging() {
    #[cfg(debug_assertions)]
    let default_filter = "debug";
    #[cfg(not(debug_assertions))]
    let default_filter = "info";

    let env = env_logger::Env::default().default_filter_or(default_filter);
    if env_logger::Builder::from_env(env).try_init().is_ok() {
        log::info!("Logging initialized");
    }
}
