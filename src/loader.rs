// Fault export ingestion.
//
// The export is the spreadsheet's CSV dump: a banner line first, the real
// header on the second physical row, then one row per fault. Loading is
// all-or-nothing: a missing required column, a duplicate fault number or
// an unparseable timestamp aborts the load with no partial result. Blank
// cells are a normal, expected state and simply become absent fields.
use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use csv::{ReaderBuilder, StringRecord};
use thiserror::Error;

use crate::location::parse_location;
use crate::metrics::{classify_kpi, derive_durations};
use crate::types::{FaultRecord, RawFaultRow};
use crate::util::{clean_cell, format_int, parse_datetime};

/// Columns the export must carry. Order in the file does not matter.
pub const REQUIRED_COLUMNS: [&str; 20] = [
    "Fault Number",
    "Building Trade",
    "Trade Category",
    "Type of Fault",
    "Impact",
    "Location",
    "Cancel Status",
    "Reported Date",
    "Fault Acknowledged Date",
    "Responded on Site Date",
    "RA Conducted Date",
    "Work Started Date",
    "Work Completed Date",
    "Other Trades Required Date",
    "Cost Cap Exceed Date",
    "Assistance Requested Date",
    "Fault Reference",
    "End User Priority",
    "Incident Report",
    "Remarks",
];

/// Errors that abort a load. No partial record set is ever produced.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The export file could not be opened, read, or parsed as CSV.
    #[error("Load: failed to read fault export: {0}")]
    Csv(#[from] csv::Error),

    /// The file ends before the header row (expected on line 2, below the
    /// banner line).
    #[error("Load: fault export has no header row on line 2")]
    EmptySource,

    /// A required column is absent from the header row.
    #[error("Load: required column '{column}' is missing from the header row")]
    MissingColumn { column: &'static str },

    /// A data row carries no fault number, so it cannot be indexed.
    #[error("Load: row {row} has no fault number")]
    MissingFaultNumber { row: usize },

    /// Two rows share a fault number; the export is expected to be keyed
    /// uniquely.
    #[error("Load: duplicate fault number '{fault_number}'")]
    DuplicateFaultNumber { fault_number: String },

    /// A non-blank cell in a date column did not match any accepted
    /// timestamp layout.
    #[error("Load: column '{column}' of fault '{fault_number}' holds an unparseable timestamp: '{value}'")]
    InvalidTimestamp {
        column: &'static str,
        fault_number: String,
        value: String,
    },
}

/// Per-load diagnostics surfaced to the caller.
#[derive(Debug, Clone, Copy)]
pub struct LoadSummary {
    pub total_rows: usize,
    /// Records carrying at least one negative duration (out-of-order
    /// timestamp pair in the raw data). Such durations pass through to
    /// tiers and aggregates unchanged; this count is how callers notice.
    pub negative_duration_records: usize,
}

fn parse_timestamp_cell(
    raw: Option<&str>,
    column: &'static str,
    fault_number: &str,
) -> Result<Option<NaiveDateTime>, LoadError> {
    let Some(value) = clean_cell(raw) else {
        return Ok(None);
    };
    match parse_datetime(&value) {
        Some(dt) => Ok(Some(dt)),
        None => Err(LoadError::InvalidTimestamp {
            column,
            fault_number: fault_number.to_string(),
            value,
        }),
    }
}

/// Read the export at `path` and index it by fault number, with every
/// derived field (location, durations, KPI tiers) populated.
pub fn load_faults(path: &str) -> Result<(BTreeMap<String, FaultRecord>, LoadSummary), LoadError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;
    let mut rows = rdr.records();

    // Line 1 is a banner; the real header sits on line 2.
    let _banner = rows.next().ok_or(LoadError::EmptySource)??;
    let header: StringRecord = rows
        .next()
        .ok_or(LoadError::EmptySource)??
        .iter()
        .map(str::trim)
        .collect();

    for column in REQUIRED_COLUMNS {
        if !header.iter().any(|h| h == column) {
            return Err(LoadError::MissingColumn { column });
        }
    }
    log::debug!("header row validated ({} columns)", header.len());

    let mut records: BTreeMap<String, FaultRecord> = BTreeMap::new();
    let mut total_rows = 0usize;
    let mut negative_duration_records = 0usize;

    for (idx, row) in rows.enumerate() {
        let row = row?;
        total_rows += 1;
        let raw: RawFaultRow = row.deserialize(Some(&header))?;

        let Some(fault_number) = clean_cell(raw.fault_number.as_deref()) else {
            // Physical line number: banner and header occupy lines 1-2.
            return Err(LoadError::MissingFaultNumber { row: idx + 3 });
        };

        let reported_date =
            parse_timestamp_cell(raw.reported_date.as_deref(), "Reported Date", &fault_number)?;
        let fault_acknowledged_date = parse_timestamp_cell(
            raw.fault_acknowledged_date.as_deref(),
            "Fault Acknowledged Date",
            &fault_number,
        )?;
        let responded_on_site_date = parse_timestamp_cell(
            raw.responded_on_site_date.as_deref(),
            "Responded on Site Date",
            &fault_number,
        )?;
        let ra_conducted_date = parse_timestamp_cell(
            raw.ra_conducted_date.as_deref(),
            "RA Conducted Date",
            &fault_number,
        )?;
        let work_started_date = parse_timestamp_cell(
            raw.work_started_date.as_deref(),
            "Work Started Date",
            &fault_number,
        )?;
        let work_completed_date = parse_timestamp_cell(
            raw.work_completed_date.as_deref(),
            "Work Completed Date",
            &fault_number,
        )?;
        let other_trades_required_date = parse_timestamp_cell(
            raw.other_trades_required_date.as_deref(),
            "Other Trades Required Date",
            &fault_number,
        )?;
        let cost_cap_exceed_date = parse_timestamp_cell(
            raw.cost_cap_exceed_date.as_deref(),
            "Cost Cap Exceed Date",
            &fault_number,
        )?;
        let assistance_requested_date = parse_timestamp_cell(
            raw.assistance_requested_date.as_deref(),
            "Assistance Requested Date",
            &fault_number,
        )?;

        let location_raw = clean_cell(raw.location.as_deref());
        let location = parse_location(location_raw.as_deref());
        let durations = derive_durations(
            reported_date,
            fault_acknowledged_date,
            responded_on_site_date,
            work_started_date,
            work_completed_date,
        );
        if durations.any_negative() {
            negative_duration_records += 1;
        }

        let record = FaultRecord {
            fault_number: fault_number.clone(),
            building_trade: clean_cell(raw.building_trade.as_deref()),
            trade_category: clean_cell(raw.trade_category.as_deref()),
            type_of_fault: clean_cell(raw.type_of_fault.as_deref()),
            impact: clean_cell(raw.impact.as_deref()),
            location_raw,
            cancel_status: clean_cell(raw.cancel_status.as_deref()),
            reported_date,
            fault_acknowledged_date,
            responded_on_site_date,
            ra_conducted_date,
            work_started_date,
            work_completed_date,
            other_trades_required_date,
            cost_cap_exceed_date,
            assistance_requested_date,
            fault_reference: clean_cell(raw.fault_reference.as_deref()),
            end_user_priority: clean_cell(raw.end_user_priority.as_deref()),
            incident_report: clean_cell(raw.incident_report.as_deref()),
            remarks: clean_cell(raw.remarks.as_deref()),
            kpi_responded: classify_kpi(durations.acknowledged_mins),
            kpi_recovered: classify_kpi(durations.recovered_mins),
            location,
            durations,
        };

        if records.insert(fault_number.clone(), record).is_some() {
            return Err(LoadError::DuplicateFaultNumber { fault_number });
        }
    }

    log::info!(
        "loaded {} rows into {} indexed fault records",
        format_int(total_rows as i64),
        format_int(records.len() as i64)
    );
    if negative_duration_records > 0 {
        log::warn!(
            "{} records carry a negative duration (out-of-order timestamps)",
            format_int(negative_duration_records as i64)
        );
    }

    Ok((
        records,
        LoadSummary {
            total_rows,
            negative_duration_records,
        },
    ))
}
