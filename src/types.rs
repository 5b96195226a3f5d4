// Core record types for the fault reporting pipeline.
//
// `RawFaultRow` mirrors the spreadsheet columns one-to-one (headers carry
// spaces, every cell optional); `FaultRecord` is the typed record the rest
// of the pipeline works with, including the derived location, duration and
// KPI tier fields. Report row structs live here too so `reports` and
// `output` share one vocabulary of table shapes.
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// One data row of the fault export, addressed by the original header names.
#[derive(Debug, Deserialize)]
pub struct RawFaultRow {
    #[serde(rename = "Fault Number")]
    pub fault_number: Option<String>,
    #[serde(rename = "Building Trade")]
    pub building_trade: Option<String>,
    #[serde(rename = "Trade Category")]
    pub trade_category: Option<String>,
    #[serde(rename = "Type of Fault")]
    pub type_of_fault: Option<String>,
    #[serde(rename = "Impact")]
    pub impact: Option<String>,
    #[serde(rename = "Location")]
    pub location: Option<String>,
    #[serde(rename = "Cancel Status")]
    pub cancel_status: Option<String>,
    #[serde(rename = "Reported Date")]
    pub reported_date: Option<String>,
    #[serde(rename = "Fault Acknowledged Date")]
    pub fault_acknowledged_date: Option<String>,
    #[serde(rename = "Responded on Site Date")]
    pub responded_on_site_date: Option<String>,
    #[serde(rename = "RA Conducted Date")]
    pub ra_conducted_date: Option<String>,
    #[serde(rename = "Work Started Date")]
    pub work_started_date: Option<String>,
    #[serde(rename = "Work Completed Date")]
    pub work_completed_date: Option<String>,
    #[serde(rename = "Other Trades Required Date")]
    pub other_trades_required_date: Option<String>,
    #[serde(rename = "Cost Cap Exceed Date")]
    pub cost_cap_exceed_date: Option<String>,
    #[serde(rename = "Assistance Requested Date")]
    pub assistance_requested_date: Option<String>,
    #[serde(rename = "Fault Reference")]
    pub fault_reference: Option<String>,
    #[serde(rename = "End User Priority")]
    pub end_user_priority: Option<String>,
    #[serde(rename = "Incident Report")]
    pub incident_report: Option<String>,
    #[serde(rename = "Remarks")]
    pub remarks: Option<String>,
}

/// Parsed location hierarchy. Trailing positions with no corresponding path
/// segment stay `None`; they are never stored as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub site: Option<String>,
    pub building: Option<String>,
    pub level: Option<String>,
    pub room: Option<String>,
}

impl Location {
    /// Composite grouping key for the location dimension. Absent segments
    /// join as empty strings so records with a partial hierarchy still land
    /// in a group instead of dropping out of the table.
    pub fn composite_key(&self) -> String {
        format!(
            "{}_{}_{}",
            self.building.as_deref().unwrap_or(""),
            self.level.as_deref().unwrap_or(""),
            self.room.as_deref().unwrap_or("")
        )
    }
}

/// The four elapsed-time metrics tracked per fault, all measured from the
/// reported timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationMetric {
    Acknowledged,
    SiteReached,
    WorkStarted,
    Recovered,
}

impl DurationMetric {
    pub const ALL: [DurationMetric; 4] = [
        DurationMetric::Acknowledged,
        DurationMetric::SiteReached,
        DurationMetric::WorkStarted,
        DurationMetric::Recovered,
    ];

    /// Column-name stem used in the exported tables.
    pub fn label(&self) -> &'static str {
        match self {
            DurationMetric::Acknowledged => "Fault_Acknowledged",
            DurationMetric::SiteReached => "Fault_Site_Reached",
            DurationMetric::WorkStarted => "Fault_Work_Started",
            DurationMetric::Recovered => "Fault_Recovered",
        }
    }
}

/// Elapsed-time metrics in fractional minutes. A metric is `None` whenever
/// either endpoint timestamp is missing; negative values are kept as-is
/// when the raw timestamps are out of order.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Durations {
    pub acknowledged_mins: Option<f64>,
    pub site_reached_mins: Option<f64>,
    pub work_started_mins: Option<f64>,
    pub recovered_mins: Option<f64>,
}

impl Durations {
    pub fn minutes_for(&self, metric: DurationMetric) -> Option<f64> {
        match metric {
            DurationMetric::Acknowledged => self.acknowledged_mins,
            DurationMetric::SiteReached => self.site_reached_mins,
            DurationMetric::WorkStarted => self.work_started_mins,
            DurationMetric::Recovered => self.recovered_mins,
        }
    }

    /// Hour-scaled copy of a metric; absence and sign carry through.
    pub fn hours_for(&self, metric: DurationMetric) -> Option<f64> {
        self.minutes_for(metric).map(|m| m / 60.0)
    }

    /// True when any derived metric came out negative, i.e. the raw data
    /// holds an out-of-order timestamp pair.
    pub fn any_negative(&self) -> bool {
        DurationMetric::ALL
            .iter()
            .filter_map(|m| self.minutes_for(*m))
            .any(|m| m < 0.0)
    }
}

/// Response-time bucket for service-level reporting. Buckets are half-open
/// on the upper bound; the first bucket is open-ended below zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum KpiTier {
    Within10Mins,
    Within30Mins,
    Within60Mins,
    Beyond60Mins,
}

impl KpiTier {
    pub const ALL: [KpiTier; 4] = [
        KpiTier::Within10Mins,
        KpiTier::Within30Mins,
        KpiTier::Within60Mins,
        KpiTier::Beyond60Mins,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            KpiTier::Within10Mins => "0-10mins",
            KpiTier::Within30Mins => "10-30mins",
            KpiTier::Within60Mins => "30-60mins",
            KpiTier::Beyond60Mins => "60-inf",
        }
    }
}

impl fmt::Display for KpiTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lifecycle classification of a fault. Every record is exactly one of
/// these; cancellation wins regardless of the other fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultStatus {
    Cancelled,
    Outstanding,
    Recovered,
}

impl FaultStatus {
    pub fn label(&self) -> &'static str {
        match self {
            FaultStatus::Cancelled => "Cancelled",
            FaultStatus::Outstanding => "Outstanding",
            FaultStatus::Recovered => "Recovered",
        }
    }
}

impl fmt::Display for FaultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One maintenance ticket with all derived fields populated.
#[derive(Debug, Clone, Default)]
pub struct FaultRecord {
    pub fault_number: String,
    pub building_trade: Option<String>,
    pub trade_category: Option<String>,
    pub type_of_fault: Option<String>,
    pub impact: Option<String>,
    pub location_raw: Option<String>,
    pub cancel_status: Option<String>,
    pub reported_date: Option<NaiveDateTime>,
    pub fault_acknowledged_date: Option<NaiveDateTime>,
    pub responded_on_site_date: Option<NaiveDateTime>,
    pub ra_conducted_date: Option<NaiveDateTime>,
    pub work_started_date: Option<NaiveDateTime>,
    pub work_completed_date: Option<NaiveDateTime>,
    pub other_trades_required_date: Option<NaiveDateTime>,
    pub cost_cap_exceed_date: Option<NaiveDateTime>,
    pub assistance_requested_date: Option<NaiveDateTime>,
    pub fault_reference: Option<String>,
    pub end_user_priority: Option<String>,
    pub incident_report: Option<String>,
    pub remarks: Option<String>,
    pub location: Location,
    pub durations: Durations,
    pub kpi_responded: Option<KpiTier>,
    pub kpi_recovered: Option<KpiTier>,
}

/// Cross-tab row: responded-KPI tier counts for one group value (a building
/// trade or a trade category).
#[derive(Debug, Serialize, Tabled, Clone)]
pub struct KpiCrosstabRow {
    #[serde(rename = "Group")]
    #[tabled(rename = "Group")]
    pub group: String,
    #[serde(rename = "0-10mins")]
    #[tabled(rename = "0-10mins")]
    pub within_10: usize,
    #[serde(rename = "10-30mins")]
    #[tabled(rename = "10-30mins")]
    pub within_30: usize,
    #[serde(rename = "30-60mins")]
    #[tabled(rename = "30-60mins")]
    pub within_60: usize,
    #[serde(rename = "60-inf")]
    #[tabled(rename = "60-inf")]
    pub beyond_60: usize,
}

/// Fully expanded aggregate table row: the five statistics for each of the
/// four hour-scaled metrics, formatted for export. Counts are plain
/// integers; a statistic with no contributing values renders as an empty
/// cell rather than zero.
#[derive(Debug, Serialize, Tabled, Clone)]
pub struct DimensionTableRow {
    #[serde(rename = "Group")]
    #[tabled(rename = "Group")]
    pub group: String,
    #[serde(rename = "Fault_Acknowledged_count")]
    #[tabled(rename = "Fault_Acknowledged_count")]
    pub acknowledged_count: usize,
    #[serde(rename = "Fault_Acknowledged_max_hrs")]
    #[tabled(rename = "Fault_Acknowledged_max_hrs")]
    pub acknowledged_max: String,
    #[serde(rename = "Fault_Acknowledged_min_hrs")]
    #[tabled(rename = "Fault_Acknowledged_min_hrs")]
    pub acknowledged_min: String,
    #[serde(rename = "Fault_Acknowledged_mean_hrs")]
    #[tabled(rename = "Fault_Acknowledged_mean_hrs")]
    pub acknowledged_mean: String,
    #[serde(rename = "Fault_Acknowledged_sum_hrs")]
    #[tabled(rename = "Fault_Acknowledged_sum_hrs")]
    pub acknowledged_sum: String,
    #[serde(rename = "Fault_Site_Reached_count")]
    #[tabled(rename = "Fault_Site_Reached_count")]
    pub site_reached_count: usize,
    #[serde(rename = "Fault_Site_Reached_max_hrs")]
    #[tabled(rename = "Fault_Site_Reached_max_hrs")]
    pub site_reached_max: String,
    #[serde(rename = "Fault_Site_Reached_min_hrs")]
    #[tabled(rename = "Fault_Site_Reached_min_hrs")]
    pub site_reached_min: String,
    #[serde(rename = "Fault_Site_Reached_mean_hrs")]
    #[tabled(rename = "Fault_Site_Reached_mean_hrs")]
    pub site_reached_mean: String,
    #[serde(rename = "Fault_Site_Reached_sum_hrs")]
    #[tabled(rename = "Fault_Site_Reached_sum_hrs")]
    pub site_reached_sum: String,
    #[serde(rename = "Fault_Work_Started_count")]
    #[tabled(rename = "Fault_Work_Started_count")]
    pub work_started_count: usize,
    #[serde(rename = "Fault_Work_Started_max_hrs")]
    #[tabled(rename = "Fault_Work_Started_max_hrs")]
    pub work_started_max: String,
    #[serde(rename = "Fault_Work_Started_min_hrs")]
    #[tabled(rename = "Fault_Work_Started_min_hrs")]
    pub work_started_min: String,
    #[serde(rename = "Fault_Work_Started_mean_hrs")]
    #[tabled(rename = "Fault_Work_Started_mean_hrs")]
    pub work_started_mean: String,
    #[serde(rename = "Fault_Work_Started_sum_hrs")]
    #[tabled(rename = "Fault_Work_Started_sum_hrs")]
    pub work_started_sum: String,
    #[serde(rename = "Fault_Recovered_count")]
    #[tabled(rename = "Fault_Recovered_count")]
    pub recovered_count: usize,
    #[serde(rename = "Fault_Recovered_max_hrs")]
    #[tabled(rename = "Fault_Recovered_max_hrs")]
    pub recovered_max: String,
    #[serde(rename = "Fault_Recovered_min_hrs")]
    #[tabled(rename = "Fault_Recovered_min_hrs")]
    pub recovered_min: String,
    #[serde(rename = "Fault_Recovered_mean_hrs")]
    #[tabled(rename = "Fault_Recovered_mean_hrs")]
    pub recovered_mean: String,
    #[serde(rename = "Fault_Recovered_sum_hrs")]
    #[tabled(rename = "Fault_Recovered_sum_hrs")]
    pub recovered_sum: String,
}

/// One entry of a ranked top-N slice.
#[derive(Debug, Serialize, Tabled, Clone)]
pub struct TopSliceRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Group")]
    #[tabled(rename = "Group")]
    pub group: String,
    #[serde(rename = "Value")]
    #[tabled(rename = "Value")]
    pub value: String,
}

/// Fault count per building, for the location section.
#[derive(Debug, Serialize, Tabled, Clone)]
pub struct BuildingCountRow {
    #[serde(rename = "Building")]
    #[tabled(rename = "Building")]
    pub building: String,
    #[serde(rename = "Faults")]
    #[tabled(rename = "Faults")]
    pub faults: usize,
}

/// Headline numbers exported as `summary.json`.
#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub total_faults: usize,
    pub fault_cancelled: usize,
    pub fault_outstanding: usize,
    pub fault_recovered: usize,
    pub distinct_trades: usize,
    pub avg_recovered_hrs: Option<f64>,
    pub total_recovered_hrs: Option<f64>,
    pub negative_duration_records: usize,
}
