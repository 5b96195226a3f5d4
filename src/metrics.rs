// Elapsed-time metric derivation and KPI tier classification.
//
// Both stages are pure: they look only at their inputs and propagate
// absence instead of substituting defaults. Out-of-order timestamp pairs
// produce negative durations, which are surfaced unchanged; the loader
// counts them so callers can decide what to do about data quality.
use chrono::NaiveDateTime;

use crate::types::{Durations, KpiTier};
use crate::util::minutes_between;

/// Elapsed minutes between two lifecycle timestamps. `None` whenever either
/// endpoint is missing, never a default of zero.
fn elapsed_mins(start: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> Option<f64> {
    Some(minutes_between(start?, end?))
}

/// Derive the four elapsed-time metrics, all anchored on the reported
/// timestamp.
pub fn derive_durations(
    reported: Option<NaiveDateTime>,
    acknowledged: Option<NaiveDateTime>,
    responded_on_site: Option<NaiveDateTime>,
    work_started: Option<NaiveDateTime>,
    work_completed: Option<NaiveDateTime>,
) -> Durations {
    Durations {
        acknowledged_mins: elapsed_mins(reported, acknowledged),
        site_reached_mins: elapsed_mins(reported, responded_on_site),
        work_started_mins: elapsed_mins(reported, work_started),
        recovered_mins: elapsed_mins(reported, work_completed),
    }
}

/// Bucket a duration into one of the four response-time tiers.
///
/// Tiers are half-open on the upper bound: [0,10), [10,30), [30,60),
/// [60,inf). A value exactly on a boundary belongs to the tier whose lower
/// bound it equals, so 10 minutes is `10-30mins`. The first tier is
/// open-ended below, so negative durations classify as `0-10mins`.
/// An absent duration yields no tier.
pub fn classify_kpi(minutes: Option<f64>) -> Option<KpiTier> {
    let m = minutes?;
    let tier = if m < 10.0 {
        KpiTier::Within10Mins
    } else if m < 30.0 {
        KpiTier::Within30Mins
    } else if m < 60.0 {
        KpiTier::Within60Mins
    } else {
        KpiTier::Beyond60Mins
    };
    Some(tier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DurationMetric;
    use crate::util::parse_datetime;

    fn ts(s: &str) -> Option<NaiveDateTime> {
        Some(parse_datetime(s).unwrap())
    }

    #[test]
    fn duration_present_iff_both_endpoints_present() {
        let d = derive_durations(
            ts("2021-10-01 08:00:00"),
            ts("2021-10-01 08:07:00"),
            None,
            ts("2021-10-01 09:00:00"),
            None,
        );
        assert_eq!(d.acknowledged_mins, Some(7.0));
        assert_eq!(d.site_reached_mins, None);
        assert_eq!(d.work_started_mins, Some(60.0));
        assert_eq!(d.recovered_mins, None);

        let none = derive_durations(None, ts("2021-10-01 08:07:00"), None, None, None);
        assert_eq!(none.acknowledged_mins, None);
    }

    #[test]
    fn inverted_pair_yields_negative_duration() {
        let d = derive_durations(
            ts("2021-10-01 08:00:00"),
            None,
            None,
            None,
            ts("2021-10-01 07:30:00"),
        );
        assert_eq!(d.recovered_mins, Some(-30.0));
        assert!(d.any_negative());
    }

    #[test]
    fn hour_scaled_copy_divides_by_sixty() {
        let d = Durations {
            recovered_mins: Some(90.0),
            acknowledged_mins: Some(-30.0),
            ..Default::default()
        };
        assert_eq!(d.hours_for(DurationMetric::Recovered), Some(1.5));
        assert_eq!(d.hours_for(DurationMetric::Acknowledged), Some(-0.5));
        assert_eq!(d.hours_for(DurationMetric::SiteReached), None);
    }

    #[test]
    fn tier_boundaries_are_lower_bound_inclusive() {
        assert_eq!(classify_kpi(Some(0.0)), Some(KpiTier::Within10Mins));
        assert_eq!(classify_kpi(Some(9.99)), Some(KpiTier::Within10Mins));
        assert_eq!(classify_kpi(Some(10.0)), Some(KpiTier::Within30Mins));
        assert_eq!(classify_kpi(Some(30.0)), Some(KpiTier::Within60Mins));
        assert_eq!(classify_kpi(Some(59.5)), Some(KpiTier::Within60Mins));
        assert_eq!(classify_kpi(Some(60.0)), Some(KpiTier::Beyond60Mins));
        assert_eq!(classify_kpi(Some(100_000.0)), Some(KpiTier::Beyond60Mins));
    }

    #[test]
    fn negative_duration_falls_in_first_tier() {
        assert_eq!(classify_kpi(Some(-5.0)), Some(KpiTier::Within10Mins));
    }

    #[test]
    fn absent_duration_has_no_tier() {
        assert_eq!(classify_kpi(None), None);
    }
}
