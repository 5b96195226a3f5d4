// Entry point and high-level CLI flow.
//
// - Option [1] loads and indexes the fault export, printing diagnostics.
// - Option [2] asks for an optional trade/category filter, then renders the
//   dashboard report suite: status counts, KPI cross-tabs, per-dimension
//   summaries with top-10 slices, and a JSON summary. Full tables are
//   exported to CSV files; the console shows markdown previews.
// - After generating reports, the user can choose to go back to the
//   selection menu or exit.
use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Write};
use std::sync::Mutex;

use once_cell::sync::Lazy;

use fault_report::aggregate::{Dimension, StatKind, DEFAULT_TOP_N};
use fault_report::loader::{self, LoadSummary};
use fault_report::reports::{self, FilterSelection};
use fault_report::types::{DurationMetric, FaultRecord};
use fault_report::util::format_int;
use fault_report::{output, status};

/// Fault export consumed by the dashboard, one reporting period per file.
const INPUT_FILE: &str = "fault_export.csv";

// Simple in-memory app state so we only load the export once but can
// generate reports (with different filters) multiple times in a single run.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState { data: None }));

struct AppState {
    data: Option<(BTreeMap<String, FaultRecord>, LoadSummary)>,
}

/// Print `prompt` and read a single trimmed line of input.
fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Ask the user whether to go back to the report selection menu after
/// generating reports.
///
/// Returns `true` if the user chose `Y`, `false` if they chose `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        match read_line("Back to Report Selection (Y/N): ")
            .to_uppercase()
            .as_str()
        {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Read an optional comma-separated filter set; a blank line keeps
/// everything.
fn prompt_filter_set(prompt: &str) -> Option<BTreeSet<String>> {
    let input = read_line(prompt);
    if input.is_empty() {
        return None;
    }
    let set: BTreeSet<String> = input
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if set.is_empty() {
        None
    } else {
        Some(set)
    }
}

/// Handle option [1]: load and index the fault export.
///
/// On success the record map is stored in `APP_STATE` and a short textual
/// summary of the load is printed.
fn handle_load() {
    match loader::load_faults(INPUT_FILE) {
        Ok((records, summary)) => {
            println!(
                "Processing fault export... ({} rows loaded, {} faults indexed)",
                format_int(summary.total_rows as i64),
                format_int(records.len() as i64)
            );
            if summary.negative_duration_records > 0 {
                println!(
                    "Note: {} records have out-of-order timestamps; their negative durations are kept as-is.",
                    format_int(summary.negative_duration_records as i64)
                );
            }
            println!();
            let mut state = APP_STATE.lock().unwrap();
            state.data = Some((records, summary));
        }
        Err(e) => {
            eprintln!("Failed to load fault export: {}\n", e);
        }
    }
}

/// Preview the top-10 count/mean/sum slices of one dimension for one
/// duration metric.
fn preview_slices(records: &[FaultRecord], dimension: Dimension, metric: DurationMetric) {
    for stat in [StatKind::Count, StatKind::Mean, StatKind::Sum] {
        let slice = reports::top_slice(records, dimension, metric, stat, DEFAULT_TOP_N);
        println!(
            "{}: {}_{} - Top {}",
            dimension.label(),
            metric.label(),
            stat.label(),
            DEFAULT_TOP_N
        );
        output::preview_table_rows(&slice, DEFAULT_TOP_N);
    }
}

/// Write one dimension's full aggregate table and preview its head.
fn export_dimension_table(records: &[FaultRecord], dimension: Dimension, file: &str) {
    let table = reports::dimension_table(records, dimension);
    if let Err(e) = output::write_csv(file, &table) {
        eprintln!("Write error: {}", e);
    }
    println!("{} Summary (full table exported to {})", dimension.label(), file);
    output::preview_table_rows(&table, 5);
}

/// Handle option [2]: generate the full report suite.
///
/// This function is intentionally side-effectful:
/// - writes the cross-tab and per-dimension summary CSV files,
/// - writes the JSON summary,
/// - and prints markdown previews of each table to the console.
fn handle_generate_reports() {
    let data = {
        let state = APP_STATE.lock().unwrap();
        state.data.clone()
    };
    let Some((records, load_summary)) = data else {
        println!("Error: No data loaded. Please load the fault export first (option 1).\n");
        return;
    };

    let filter = FilterSelection {
        trades: prompt_filter_set("Filter by Building Trade (comma-separated, blank for all): "),
        categories: prompt_filter_set("Filter by Trade Category (comma-separated, blank for all): "),
    };
    let records = reports::apply_filter(&records, &filter);

    println!("\nGenerating reports...");
    println!("Outputs saved to individual files...\n");

    let split = status::partition(&records);
    let counts = split.counts();
    println!(
        "Fault Overview: Total {} | Cancelled {} | Outstanding {} | Recovered {}\n",
        format_int(counts.total as i64),
        format_int(counts.cancelled as i64),
        format_int(counts.outstanding as i64),
        format_int(counts.recovered as i64)
    );
    let recovered = &split.recovered;

    // KPI monitoring (recovered faults only).
    let kpi_trade = reports::kpi_crosstab(recovered, Dimension::BuildingTrade);
    if let Err(e) = output::write_csv("kpi_vs_building_trade.csv", &kpi_trade) {
        eprintln!("Write error: {}", e);
    }
    println!("KPI vs Building Trade");
    output::preview_table_rows(&kpi_trade, 5);

    let kpi_category = reports::kpi_crosstab(recovered, Dimension::TradeCategory);
    if let Err(e) = output::write_csv("kpi_vs_trade_category.csv", &kpi_category) {
        eprintln!("Write error: {}", e);
    }
    println!("KPI vs Trade Category");
    output::preview_table_rows(&kpi_category, 5);

    // Tier 1: building trade.
    export_dimension_table(recovered, Dimension::BuildingTrade, "building_trade_summary.csv");

    // Tier 2: trade category, with ranked slices.
    export_dimension_table(recovered, Dimension::TradeCategory, "trade_category_summary.csv");
    preview_slices(recovered, Dimension::TradeCategory, DurationMetric::Acknowledged);
    preview_slices(recovered, Dimension::TradeCategory, DurationMetric::Recovered);

    // Tier 3: type of fault, with ranked slices.
    export_dimension_table(recovered, Dimension::FaultType, "fault_type_summary.csv");
    preview_slices(recovered, Dimension::FaultType, DurationMetric::Acknowledged);
    preview_slices(recovered, Dimension::FaultType, DurationMetric::Recovered);

    // Fault by location.
    let buildings = reports::building_counts(recovered);
    println!("Number of Faults vs Building");
    output::preview_table_rows(&buildings, 10);

    export_dimension_table(recovered, Dimension::Location, "location_summary.csv");
    preview_slices(recovered, Dimension::Location, DurationMetric::Recovered);

    let summary = reports::summary_stats(counts, recovered, &load_summary);
    if let Err(e) = output::write_json("summary.json", &summary) {
        eprintln!("Write error: {}", e);
    }
    println!("Summary Stats (summary.json):");
    match serde_json::to_string(&summary) {
        Ok(s) => println!("{}\n", s),
        Err(e) => eprintln!("Write error: {}", e),
    }
}

fn main() {
    env_logger::init();
    loop {
        println!("Select an option:");
        println!("[1] Load the fault export");
        println!("[2] Generate Reports\n");
        match read_line("Enter choice: ").as_str() {
            "1" => {
                handle_load();
            }
            "2" => {
                println!();
                handle_generate_reports();
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => {
                println!("Invalid choice. Please enter 1 or 2.\n");
            }
        }
    }
}
