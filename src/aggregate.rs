// Grouped aggregation over the recovered record set.
//
// For a chosen dimension the aggregator computes count/min/max/mean/sum of
// each hour-scaled duration metric per group. Absent durations never
// contribute: a group where every record misses a metric gets an absent
// summary for that metric, not a zero. Groups accumulate in a `BTreeMap`,
// so "original group-key ordering" is ascending key order and reruns over
// the same input produce identical tables.
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::types::{DurationMetric, FaultRecord};
use crate::util::mean;

/// Number of groups a ranked slice keeps by default.
pub const DEFAULT_TOP_N: usize = 10;

/// Grouping dimensions the dashboard slices by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    BuildingTrade,
    TradeCategory,
    FaultType,
    Location,
}

impl Dimension {
    pub fn label(&self) -> &'static str {
        match self {
            Dimension::BuildingTrade => "Building_Trade",
            Dimension::TradeCategory => "Trade_Category",
            Dimension::FaultType => "Type_of_Fault",
            Dimension::Location => "Location",
        }
    }

    /// Grouping key of a record under this dimension. A record with an
    /// absent categorical value groups under the empty key rather than
    /// dropping out of the table.
    pub fn key_of(&self, record: &FaultRecord) -> String {
        match self {
            Dimension::BuildingTrade => record.building_trade.clone().unwrap_or_default(),
            Dimension::TradeCategory => record.trade_category.clone().unwrap_or_default(),
            Dimension::FaultType => record.type_of_fault.clone().unwrap_or_default(),
            Dimension::Location => record.location.composite_key(),
        }
    }
}

/// The five per-group statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatKind {
    Count,
    Min,
    Max,
    Mean,
    Sum,
}

impl StatKind {
    pub fn label(&self) -> &'static str {
        match self {
            StatKind::Count => "count",
            StatKind::Min => "min_hrs",
            StatKind::Max => "max_hrs",
            StatKind::Mean => "mean_hrs",
            StatKind::Sum => "sum_hrs",
        }
    }
}

/// Statistics over the present values of one metric within one group.
/// Only built when at least one value is present, so `count >= 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricSummary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub sum: f64,
}

impl MetricSummary {
    fn from_values(values: &[f64]) -> Option<MetricSummary> {
        if values.is_empty() {
            return None;
        }
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for v in values {
            min = min.min(*v);
            max = max.max(*v);
        }
        Some(MetricSummary {
            count: values.len(),
            min,
            max,
            mean: mean(values),
            sum: values.iter().sum(),
        })
    }
}

/// One group of the aggregate table: a summary per duration metric, absent
/// when the group carries no present value for that metric.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupAggregate {
    pub key: String,
    pub acknowledged: Option<MetricSummary>,
    pub site_reached: Option<MetricSummary>,
    pub work_started: Option<MetricSummary>,
    pub recovered: Option<MetricSummary>,
}

impl GroupAggregate {
    pub fn summary_for(&self, metric: DurationMetric) -> Option<&MetricSummary> {
        match metric {
            DurationMetric::Acknowledged => self.acknowledged.as_ref(),
            DurationMetric::SiteReached => self.site_reached.as_ref(),
            DurationMetric::WorkStarted => self.work_started.as_ref(),
            DurationMetric::Recovered => self.recovered.as_ref(),
        }
    }

    /// The chosen statistic as a sortable value; `None` when the metric has
    /// no summary (for `Count`, an absent summary reads as a count of 0).
    pub fn stat(&self, metric: DurationMetric, stat: StatKind) -> Option<f64> {
        let summary = match self.summary_for(metric) {
            Some(s) => s,
            None => {
                return match stat {
                    StatKind::Count => Some(0.0),
                    _ => None,
                }
            }
        };
        let value = match stat {
            StatKind::Count => summary.count as f64,
            StatKind::Min => summary.min,
            StatKind::Max => summary.max,
            StatKind::Mean => summary.mean,
            StatKind::Sum => summary.sum,
        };
        Some(value)
    }
}

/// Group the records along `dimension` and summarize every hour-scaled
/// duration metric per group. Rows come back in ascending key order.
pub fn aggregate_by(records: &[FaultRecord], dimension: Dimension) -> Vec<GroupAggregate> {
    #[derive(Default)]
    struct Acc {
        acknowledged: Vec<f64>,
        site_reached: Vec<f64>,
        work_started: Vec<f64>,
        recovered: Vec<f64>,
    }

    let mut groups: BTreeMap<String, Acc> = BTreeMap::new();
    for record in records {
        let acc = groups.entry(dimension.key_of(record)).or_default();
        if let Some(h) = record.durations.hours_for(DurationMetric::Acknowledged) {
            acc.acknowledged.push(h);
        }
        if let Some(h) = record.durations.hours_for(DurationMetric::SiteReached) {
            acc.site_reached.push(h);
        }
        if let Some(h) = record.durations.hours_for(DurationMetric::WorkStarted) {
            acc.work_started.push(h);
        }
        if let Some(h) = record.durations.hours_for(DurationMetric::Recovered) {
            acc.recovered.push(h);
        }
    }

    groups
        .into_iter()
        .map(|(key, acc)| GroupAggregate {
            key,
            acknowledged: MetricSummary::from_values(&acc.acknowledged),
            site_reached: MetricSummary::from_values(&acc.site_reached),
            work_started: MetricSummary::from_values(&acc.work_started),
            recovered: MetricSummary::from_values(&acc.recovered),
        })
        .collect()
}

fn descending(a: Option<f64>, b: Option<f64>) -> Ordering {
    // Present values sort descending; groups with an absent statistic sink
    // to the end. Ties keep the incoming order (stable sort).
    match (a, b) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Rank groups by one statistic, descending. The sort is stable, so ties
/// keep the relative order of the input rows (key order, when the rows come
/// straight from [`aggregate_by`]).
pub fn rank_by(
    rows: &[GroupAggregate],
    metric: DurationMetric,
    stat: StatKind,
) -> Vec<GroupAggregate> {
    let mut ranked = rows.to_vec();
    ranked.sort_by(|a, b| descending(a.stat(metric, stat), b.stat(metric, stat)));
    ranked
}

/// The top `n` groups by one statistic. Dashboard slices use
/// [`DEFAULT_TOP_N`].
pub fn top_n(
    rows: &[GroupAggregate],
    metric: DurationMetric,
    stat: StatKind,
    n: usize,
) -> Vec<GroupAggregate> {
    let mut ranked = rank_by(rows, metric, stat);
    ranked.truncate(n);
    ranked
}
