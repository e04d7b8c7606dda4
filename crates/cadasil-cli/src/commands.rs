use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use cadasil_cli::dashboard::Dashboard;
use cadasil_cli::logging::redact_value;
use cadasil_cli::views::{
    PATIENTS_TITLE, QUALITY_TITLE, comparison_banner, completeness_overview_table,
    completeness_table, describe_filters, metadata_table, province_table, summary_report,
};
use cadasil_ingest::RedcapClient;
use cadasil_model::{AgeRange, FilterState, PatientRecord, RawRecord, Selector};
use tracing::{info, info_span, trace};

use crate::cli::FilterArgs;

/// Applies command-line filters on top of the configured defaults.
pub fn build_filters(args: &FilterArgs, defaults: FilterState) -> Result<FilterState> {
    let mut filters = defaults;
    if args.age_min.is_some() || args.age_max.is_some() {
        let min = args.age_min.unwrap_or(filters.age_range.min);
        let max = args.age_max.unwrap_or(filters.age_range.max);
        filters.age_range = AgeRange::new(min, max)?;
    }
    if let Some(sex) = &args.sex {
        filters.sex = sex.parse()?;
    }
    if let Some(province) = &args.province {
        filters.province = Selector::parse_code("province", province)?;
    }
    if let Some(symptom) = &args.symptom {
        filters.symptom = Selector::parse_code("symptom", symptom)?;
    }
    if let Some(method) = &args.diagnosis {
        filters.diagnosis_method = Selector::parse_code("diagnosis", method)?;
    }
    if let Some(history) = &args.family_history {
        filters.family_history = Selector::parse_yes_no("family history", history)?;
    }
    Ok(filters)
}

pub fn run_summary(dashboard: &Dashboard, json: bool) -> Result<()> {
    let span = info_span!("summary");
    let _guard = span.enter();
    let summaries = dashboard.summaries();
    info!(patients = summaries.total, "computed summaries");
    if json {
        let text = serde_json::to_string_pretty(&summaries).context("serialize summaries")?;
        println!("{text}");
        return Ok(());
    }
    print_filters(dashboard);
    print!("{}", summary_report(&summaries));
    Ok(())
}

pub fn run_patients(dashboard: &mut Dashboard, clicks: &[String]) -> Result<()> {
    for key in clicks {
        dashboard.click_patient_column(key);
    }
    let table = dashboard.patient_table().context("build patient table")?;
    info!(rows = table.rows().len(), sort = %table.sort_state(), "rendering patient table");
    println!("{PATIENTS_TITLE}");
    print_filters(dashboard);
    println!("{}", table.render().to_terminal());
    Ok(())
}

pub fn run_quality(dashboard: &Dashboard, limit: Option<usize>) -> Result<()> {
    let span = info_span!("quality");
    let _guard = span.enter();
    let scored = dashboard.completeness();
    for entry in &scored {
        trace!(
            record = %entry.record.record_id,
            name = redact_value(entry.record.full_name.as_deref().unwrap_or_default()),
            overall = entry.score.overall_percentage,
            "scored record"
        );
    }
    let shown = limit.map_or(scored.as_slice(), |limit| &scored[..limit.min(scored.len())]);
    println!("{QUALITY_TITLE}");
    println!("{}", completeness_overview_table(&dashboard.completeness_overview()));
    println!("{}", completeness_table(shown));
    Ok(())
}

pub fn run_upload(dashboard: &mut Dashboard, file: &Path) -> Result<()> {
    let text = fs::read_to_string(file)
        .with_context(|| format!("read upload {}", file.display()))?;
    let comparison = dashboard
        .upload(&text)
        .with_context(|| format!("process upload {}", file.display()))?;
    println!("{}", comparison_banner(&comparison));
    println!();
    print_filters(dashboard);
    print!("{}", summary_report(&dashboard.summaries()));
    Ok(())
}

/// Imports the current snapshot into REDCap.
pub fn run_push(dashboard: &Dashboard, client: &RedcapClient) -> Result<()> {
    let records = import_payload(dashboard);
    let count = client
        .import_records(&records)
        .context("import records into REDCap")?;
    info!(sent = records.len(), imported = count, "pushed upload to REDCap");
    println!("Registros importados a REDCap: {count}");
    Ok(())
}

/// Flat REDCap rows for every loaded record. Empty fields are left out.
fn import_payload(dashboard: &Dashboard) -> Vec<RawRecord> {
    dashboard
        .snapshot()
        .records
        .iter()
        .map(PatientRecord::to_fields)
        .collect()
}

pub fn run_provinces() {
    println!("{}", province_table());
}

pub fn run_metadata(client: &RedcapClient) -> Result<()> {
    let fields = client.export_metadata().context("export REDCap metadata")?;
    info!(fields = fields.len(), "exported data dictionary");
    println!("{}", metadata_table(&fields));
    Ok(())
}

fn print_filters(dashboard: &Dashboard) {
    if let Some(line) = describe_filters(dashboard.filters()) {
        println!("{line}");
    }
}
