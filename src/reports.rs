// Report building over the partitioned record set.
//
// Everything here consumes the recovered subset (cancelled and outstanding
// faults are excluded from tier and aggregate reporting) and returns plain
// row structs; writing and previewing live in `output`. The caller-supplied
// trade/category filter is a pre-pass over the indexed record set, applied
// before partitioning, never inside the aggregator.
use std::collections::{BTreeMap, BTreeSet};

use crate::aggregate::{self, Dimension, GroupAggregate, StatKind};
use crate::loader::LoadSummary;
use crate::status::StatusCounts;
use crate::types::{
    BuildingCountRow, DimensionTableRow, DurationMetric, FaultRecord, KpiCrosstabRow, SummaryStats,
    TopSliceRow,
};
use crate::util::{format_int, format_number, mean};

/// Caller-supplied restriction on the working record set. `None` for a
/// field means no restriction (the dashboard's select-all default).
#[derive(Debug, Clone, Default)]
pub struct FilterSelection {
    pub trades: Option<BTreeSet<String>>,
    pub categories: Option<BTreeSet<String>>,
}

impl FilterSelection {
    /// The select-all default.
    pub fn all() -> FilterSelection {
        FilterSelection::default()
    }

    fn allows(&self, record: &FaultRecord) -> bool {
        let trade_ok = match &self.trades {
            Some(set) => record
                .building_trade
                .as_deref()
                .is_some_and(|t| set.contains(t)),
            None => true,
        };
        let category_ok = match &self.categories {
            Some(set) => record
                .trade_category
                .as_deref()
                .is_some_and(|c| set.contains(c)),
            None => true,
        };
        trade_ok && category_ok
    }
}

/// Restrict the indexed record set to the filter selection.
pub fn apply_filter(
    records: &BTreeMap<String, FaultRecord>,
    filter: &FilterSelection,
) -> BTreeMap<String, FaultRecord> {
    records
        .iter()
        .filter(|(_, record)| filter.allows(record))
        .map(|(key, record)| (key.clone(), record.clone()))
        .collect()
}

/// Responded-KPI tier counts per group value. Records without a tier (no
/// acknowledge duration) carry no bucket and are left out of the cross-tab;
/// they still show up in every duration aggregate their present metrics
/// support.
pub fn kpi_crosstab(records: &[FaultRecord], dimension: Dimension) -> Vec<KpiCrosstabRow> {
    let mut groups: BTreeMap<String, [usize; 4]> = BTreeMap::new();
    for record in records {
        let Some(tier) = record.kpi_responded else {
            continue;
        };
        let counts = groups.entry(dimension.key_of(record)).or_default();
        // Slots follow the tier declaration order, lowest bucket first.
        counts[tier as usize] += 1;
    }
    groups
        .into_iter()
        .map(|(group, counts)| KpiCrosstabRow {
            group,
            within_10: counts[0],
            within_30: counts[1],
            within_60: counts[2],
            beyond_60: counts[3],
        })
        .collect()
}

fn format_stat(value: Option<f64>) -> String {
    value.map(|v| format_number(v, 2)).unwrap_or_default()
}

fn to_table_row(row: &GroupAggregate) -> DimensionTableRow {
    let count = |metric| row.summary_for(metric).map_or(0, |s| s.count);
    let stat = |metric, stat| format_stat(row.stat(metric, stat));
    DimensionTableRow {
        group: row.key.clone(),
        acknowledged_count: count(DurationMetric::Acknowledged),
        acknowledged_max: stat(DurationMetric::Acknowledged, StatKind::Max),
        acknowledged_min: stat(DurationMetric::Acknowledged, StatKind::Min),
        acknowledged_mean: stat(DurationMetric::Acknowledged, StatKind::Mean),
        acknowledged_sum: stat(DurationMetric::Acknowledged, StatKind::Sum),
        site_reached_count: count(DurationMetric::SiteReached),
        site_reached_max: stat(DurationMetric::SiteReached, StatKind::Max),
        site_reached_min: stat(DurationMetric::SiteReached, StatKind::Min),
        site_reached_mean: stat(DurationMetric::SiteReached, StatKind::Mean),
        site_reached_sum: stat(DurationMetric::SiteReached, StatKind::Sum),
        work_started_count: count(DurationMetric::WorkStarted),
        work_started_max: stat(DurationMetric::WorkStarted, StatKind::Max),
        work_started_min: stat(DurationMetric::WorkStarted, StatKind::Min),
        work_started_mean: stat(DurationMetric::WorkStarted, StatKind::Mean),
        work_started_sum: stat(DurationMetric::WorkStarted, StatKind::Sum),
        recovered_count: count(DurationMetric::Recovered),
        recovered_max: stat(DurationMetric::Recovered, StatKind::Max),
        recovered_min: stat(DurationMetric::Recovered, StatKind::Min),
        recovered_mean: stat(DurationMetric::Recovered, StatKind::Mean),
        recovered_sum: stat(DurationMetric::Recovered, StatKind::Sum),
    }
}

/// Full aggregate table for one dimension, in the dashboard's display
/// order: the categorical dimensions sort by acknowledged count descending
/// (stable, key-order ties), the location table keeps key order.
pub fn dimension_table(records: &[FaultRecord], dimension: Dimension) -> Vec<DimensionTableRow> {
    let rows = aggregate::aggregate_by(records, dimension);
    let rows = match dimension {
        Dimension::Location => rows,
        _ => aggregate::rank_by(&rows, DurationMetric::Acknowledged, StatKind::Count),
    };
    rows.iter().map(to_table_row).collect()
}

/// Ranked top-N slice of one dimension by one statistic, formatted for
/// display. Counts render as integers, everything else as hours with two
/// decimals.
pub fn top_slice(
    records: &[FaultRecord],
    dimension: Dimension,
    metric: DurationMetric,
    stat: StatKind,
    n: usize,
) -> Vec<TopSliceRow> {
    let rows = aggregate::aggregate_by(records, dimension);
    aggregate::top_n(&rows, metric, stat, n)
        .into_iter()
        .enumerate()
        .map(|(idx, row)| {
            let value = match (stat, row.stat(metric, stat)) {
                (StatKind::Count, Some(v)) => format_int(v as i64),
                (_, v) => format_stat(v),
            };
            TopSliceRow {
                rank: idx + 1,
                group: row.key.clone(),
                value,
            }
        })
        .collect()
}

/// Fault count per building over the recovered set, most faults first.
pub fn building_counts(records: &[FaultRecord]) -> Vec<BuildingCountRow> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for record in records {
        let building = record.location.building.clone().unwrap_or_default();
        *counts.entry(building).or_default() += 1;
    }
    let mut rows: Vec<BuildingCountRow> = counts
        .into_iter()
        .map(|(building, faults)| BuildingCountRow { building, faults })
        .collect();
    rows.sort_by(|a, b| b.faults.cmp(&a.faults));
    rows
}

/// Headline numbers for `summary.json`.
pub fn summary_stats(
    counts: StatusCounts,
    recovered: &[FaultRecord],
    load: &LoadSummary,
) -> SummaryStats {
    let distinct_trades: BTreeSet<&str> = recovered
        .iter()
        .filter_map(|r| r.building_trade.as_deref())
        .collect();
    let recovered_hrs: Vec<f64> = recovered
        .iter()
        .filter_map(|r| r.durations.hours_for(DurationMetric::Recovered))
        .collect();
    let (avg_recovered_hrs, total_recovered_hrs) = if recovered_hrs.is_empty() {
        (None, None)
    } else {
        (Some(mean(&recovered_hrs)), Some(recovered_hrs.iter().sum()))
    };
    SummaryStats {
        total_faults: counts.total,
        fault_cancelled: counts.cancelled,
        fault_outstanding: counts.outstanding,
        fault_recovered: counts.recovered,
        distinct_trades: distinct_trades.len(),
        avg_recovered_hrs,
        total_recovered_hrs,
        negative_duration_records: load.negative_duration_records,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::partition;
    use crate::types::Durations;
    use crate::util::parse_datetime;
    use pretty_assertions::assert_eq;

    fn record(
        fault_number: &str,
        trade: Option<&str>,
        category: Option<&str>,
        acknowledged_mins: Option<f64>,
        recovered_mins: Option<f64>,
    ) -> (String, FaultRecord) {
        let durations = Durations {
            acknowledged_mins,
            recovered_mins,
            ..Default::default()
        };
        let record = FaultRecord {
            fault_number: fault_number.to_string(),
            building_trade: trade.map(str::to_string),
            trade_category: category.map(str::to_string),
            // Keep the record consistent: a recovered duration implies a
            // completion timestamp.
            work_completed_date: recovered_mins
                .map(|_| parse_datetime("2021-10-02 10:00:00").unwrap()),
            durations,
            kpi_responded: crate::metrics::classify_kpi(acknowledged_mins),
            kpi_recovered: crate::metrics::classify_kpi(recovered_mins),
            ..Default::default()
        };
        (fault_number.to_string(), record)
    }

    fn sample_set() -> BTreeMap<String, FaultRecord> {
        BTreeMap::from([
            record("F-001", Some("ACMV"), Some("Chiller"), Some(5.0), Some(120.0)),
            record("F-002", Some("ACMV"), Some("AHU"), Some(10.0), Some(60.0)),
            record("F-003", Some("Electrical"), Some("Lighting"), Some(45.0), None),
            record("F-004", Some("Plumbing"), Some("Piping"), None, Some(30.0)),
        ])
    }

    #[test]
    fn filter_restricts_the_set_before_aggregation() {
        let records = sample_set();
        let filter = FilterSelection {
            trades: Some(BTreeSet::from(["ACMV".to_string()])),
            categories: None,
        };
        let filtered = apply_filter(&records, &filter);
        let keys: Vec<&str> = filtered.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["F-001", "F-002"]);

        // Select-all keeps everything.
        assert_eq!(apply_filter(&records, &FilterSelection::all()).len(), 4);
    }

    #[test]
    fn filter_on_both_fields_intersects() {
        let records = sample_set();
        let filter = FilterSelection {
            trades: Some(BTreeSet::from(["ACMV".to_string()])),
            categories: Some(BTreeSet::from(["AHU".to_string()])),
        };
        let filtered = apply_filter(&records, &filter);
        assert_eq!(filtered.len(), 1);
        assert!(filtered.contains_key("F-002"));
    }

    #[test]
    fn record_without_trade_is_excluded_by_a_trade_filter() {
        let records = BTreeMap::from([record("F-009", None, None, Some(1.0), Some(1.0))]);
        let filter = FilterSelection {
            trades: Some(BTreeSet::from(["ACMV".to_string()])),
            categories: None,
        };
        assert!(apply_filter(&records, &filter).is_empty());
    }

    #[test]
    fn crosstab_counts_tiers_and_skips_unclassified_records() {
        let records = sample_set();
        let all: Vec<FaultRecord> = records.values().cloned().collect();
        let rows = kpi_crosstab(&all, Dimension::BuildingTrade);
        // F-004 has no acknowledge duration, so no tier and no cross-tab row
        // for Plumbing.
        let groups: Vec<&str> = rows.iter().map(|r| r.group.as_str()).collect();
        assert_eq!(groups, vec!["ACMV", "Electrical"]);

        let acmv = &rows[0];
        assert_eq!(acmv.within_10, 1); // 5 mins
        assert_eq!(acmv.within_30, 1); // exactly 10 mins
        assert_eq!(acmv.within_60, 0);
        assert_eq!(acmv.beyond_60, 0);

        let electrical = &rows[1];
        assert_eq!(electrical.within_60, 1); // 45 mins
    }

    #[test]
    fn dimension_table_formats_absent_aggregates_as_empty_cells() {
        let (_, r) = record("F-003", Some("Electrical"), None, Some(45.0), None);
        let table = dimension_table(&[r], Dimension::BuildingTrade);
        assert_eq!(table.len(), 1);
        let row = &table[0];
        assert_eq!(row.group, "Electrical");
        assert_eq!(row.acknowledged_count, 1);
        assert_eq!(row.acknowledged_sum, "0.75"); // 45 mins in hours
        assert_eq!(row.recovered_count, 0);
        assert_eq!(row.recovered_sum, "");
        assert_eq!(row.recovered_mean, "");
    }

    #[test]
    fn top_slice_formats_counts_as_integers_and_hours_with_decimals() {
        let records = sample_set();
        let all: Vec<FaultRecord> = records.values().cloned().collect();
        let by_count = top_slice(
            &all,
            Dimension::BuildingTrade,
            DurationMetric::Recovered,
            StatKind::Count,
            2,
        );
        assert_eq!(by_count[0].rank, 1);
        assert_eq!(by_count[0].group, "ACMV");
        assert_eq!(by_count[0].value, "2");

        let by_sum = top_slice(
            &all,
            Dimension::BuildingTrade,
            DurationMetric::Recovered,
            StatKind::Sum,
            1,
        );
        assert_eq!(by_sum[0].group, "ACMV"); // 2h + 1h
        assert_eq!(by_sum[0].value, "3.00");
    }

    #[test]
    fn summary_stats_cover_the_partition_and_negative_count() {
        let mut records = sample_set();
        let (key, cancelled) = {
            let (k, mut r) = record("F-005", Some("ACMV"), None, None, None);
            r.cancel_status = Some("duplicate".to_string());
            (k, r)
        };
        records.insert(key, cancelled);

        let split = partition(&records);
        let counts = split.counts();
        assert_eq!(counts.recovered, 3);
        assert_eq!(counts.outstanding, 1);

        let load = LoadSummary {
            total_rows: records.len(),
            negative_duration_records: 1,
        };
        let stats = summary_stats(counts, &split.recovered, &load);
        assert_eq!(stats.total_faults, 5);
        assert_eq!(stats.fault_cancelled, 1);
        assert_eq!(stats.fault_recovered, 3);
        assert_eq!(stats.distinct_trades, 2); // ACMV, Plumbing
        assert_eq!(stats.negative_duration_records, 1);
        // Recovered hours {2.0, 1.0, 0.5}: sum 3.5, mean 3.5/3.
        assert_eq!(stats.total_recovered_hrs, Some(3.5));
        assert!((stats.avg_recovered_hrs.unwrap() - 3.5 / 3.0).abs() < 1e-9);
    }
}
