use std::env;
use std::fs;
use std::sync::Arc;

use chrono::Local;
use vims_core::auth::AuthContext;
use vims_core::domains::demographics::{DemographicReportService, DemographicReportServiceImpl, ReportView};
use vims_core::domains::person::{FilterCriteria, InMemoryPersonRepository, PersonRecord};
use vims_core::ReportSettings;

/// Usage: report_preview <records.json> [facet=value ...]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    vims_core::init_logging();

    let mut args = env::args().skip(1);
    let path = match args.next() {
        Some(path) => path,
        None => {
            eprintln!("Usage: report_preview <records.json> [facet=value ...]");
            std::process::exit(2);
        }
    };

    let raw = fs::read_to_string(&path)?;
    let records: Vec<PersonRecord> = serde_json::from_str(&raw)?;
    log::info!("Loaded {} records from {}", records.len(), path);

    let pairs: Vec<(String, String)> = args
        .filter_map(|arg| {
            arg.split_once('=')
                .map(|(name, value)| (name.to_string(), value.to_string()))
        })
        .collect();
    let criteria = FilterCriteria::from_pairs(pairs.iter().map(|(n, v)| (n.as_str(), v.as_str())))?;

    let settings = ReportSettings::from_env()?;
    let view = ReportView::population().apply_settings(&settings);

    let repo = Arc::new(InMemoryPersonRepository::new(records));
    let service = DemographicReportServiceImpl::new(repo.clone(), repo);
    let report = service
        .build_report(&view, &criteria, Local::now().date_naive(), &AuthContext::internal_system_context())
        .await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
