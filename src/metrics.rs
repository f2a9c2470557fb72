use crate::error::{PipelineError, Result};
use crate::models::{CleanRow, ClientRecord, RateTable, Segment};

/// Revenue-share fraction at or above which a client counts as high revenue.
pub const HIGH_REVENUE_SHARE: f64 = 0.05;
/// Utilization at or above which a client counts as high utilization.
pub const HIGH_UTILIZATION: f64 = 0.80;

const MONTHS_IN_WINDOW: f64 = 3.0;

impl RateTable {
    /// Look up the session rate for a normalized category. Upstream
    /// filtering guarantees "hour"/"thirty"; anything else is an
    /// invariant violation.
    pub fn session_rate(&self, category: &str) -> Result<f64> {
        match category.trim().to_lowercase().as_str() {
            "hour" => Ok(self.hour),
            "thirty" => Ok(self.thirty),
            other => Err(PipelineError::UnrecognizedCategory(other.to_string())),
        }
    }
}

/// Classify a client from its two threshold flags.
pub fn classify(high_revenue: bool, high_utilization: bool) -> Segment {
    match (high_revenue, high_utilization) {
        (true, true) => Segment::Anchor,
        (true, false) => Segment::Opportunity,
        (false, true) => Segment::Steady,
        (false, false) => Segment::LowImpact,
    }
}

/// Derive all per-client metrics and segment assignments.
///
/// Runs in two passes: per-row base metrics feed the portfolio revenue
/// total, which the revenue share of every row is then normalized against.
/// A zero ideal-hours target leaves utilization as NaN (or +inf when hours
/// were still delivered); NaN never passes the high-utilization threshold.
pub fn enrich(rows: Vec<CleanRow>, rates: &RateTable) -> Result<Vec<ClientRecord>> {
    let priced: Vec<(CleanRow, f64)> = rows
        .into_iter()
        .map(|row| {
            let rate = rates.session_rate(&row.service_category)?;
            Ok((row, rate))
        })
        .collect::<Result<_>>()?;

    let total_monthly_revenue: f64 = priced
        .iter()
        .map(|(row, rate)| row.hours_nov_jan * rate / MONTHS_IN_WINDOW)
        .sum();

    let records = priced
        .into_iter()
        .map(|(row, session_rate)| {
            let expected_hours_3mo = row.ideal_hours_month * MONTHS_IN_WINDOW;
            let utilization = row.hours_nov_jan / expected_hours_3mo;
            let revenue_nov_jan = row.hours_nov_jan * session_rate;
            let avg_monthly_revenue = revenue_nov_jan / MONTHS_IN_WINDOW;
            let hours_gap = expected_hours_3mo - row.hours_nov_jan;
            let revenue_share_pct = if total_monthly_revenue > 0.0 {
                avg_monthly_revenue / total_monthly_revenue
            } else {
                0.0
            };
            let high_revenue = revenue_share_pct >= HIGH_REVENUE_SHARE;
            let high_utilization = utilization >= HIGH_UTILIZATION;

            ClientRecord {
                client_id: row.client_id,
                service_type: row.service_type,
                service_category: row.service_category,
                ideal_hours_month: row.ideal_hours_month,
                hours_nov_jan: row.hours_nov_jan,
                session_rate,
                expected_hours_3mo,
                utilization,
                revenue_nov_jan,
                avg_monthly_revenue,
                hours_gap,
                positive_gap: hours_gap.max(0.0),
                revenue_share_pct,
                high_revenue,
                high_utilization,
                segment: classify(high_revenue, high_utilization),
            }
        })
        .collect();

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row(client_id: &str, category: &str, ideal: f64, hours: f64) -> CleanRow {
        CleanRow {
            client_id: client_id.to_string(),
            service_type: "coaching".to_string(),
            service_category: category.to_string(),
            ideal_hours_month: ideal,
            hours_nov_jan: hours,
        }
    }

    #[test]
    fn rate_lookup_normalizes_case_and_whitespace() {
        let rates = RateTable::default();
        assert_eq!(rates.session_rate("Hour ").unwrap(), 61.20);
        assert_eq!(rates.session_rate("thirty").unwrap(), 33.75);
    }

    #[test]
    fn rate_lookup_rejects_unknown_categories() {
        let rates = RateTable::default();
        let err = rates.session_rate("weekly").unwrap_err();
        assert!(matches!(err, PipelineError::UnrecognizedCategory(v) if v == "weekly"));
    }

    #[test]
    fn classification_covers_all_four_segments() {
        assert_eq!(classify(true, true), Segment::Anchor);
        assert_eq!(classify(true, false), Segment::Opportunity);
        assert_eq!(classify(false, true), Segment::Steady);
        assert_eq!(classify(false, false), Segment::LowImpact);
    }

    #[test]
    fn derives_expected_metrics_for_exact_target_delivery() {
        let rates = RateTable::default();
        let records = enrich(vec![sample_row("C1", "hour", 100.0, 300.0)], &rates).unwrap();
        let record = &records[0];
        assert_eq!(record.expected_hours_3mo, 300.0);
        assert_eq!(record.utilization, 1.0);
        assert_eq!(record.hours_gap, 0.0);
        assert_eq!(record.positive_gap, 0.0);
        assert_eq!(record.revenue_nov_jan, 300.0 * 61.20);
        assert_eq!(record.avg_monthly_revenue, 300.0 * 61.20 / 3.0);
    }

    #[test]
    fn revenue_shares_sum_to_one() {
        let rates = RateTable::default();
        let records = enrich(
            vec![
                sample_row("C1", "hour", 10.0, 20.0),
                sample_row("C2", "thirty", 8.0, 30.0),
                sample_row("C3", "hour", 12.0, 15.0),
            ],
            &rates,
        )
        .unwrap();
        let share_total: f64 = records.iter().map(|r| r.revenue_share_pct).sum();
        assert!((share_total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn positive_gap_clips_negative_gaps_to_zero() {
        let rates = RateTable::default();
        let records = enrich(
            vec![
                sample_row("C1", "hour", 10.0, 40.0),
                sample_row("C2", "hour", 10.0, 20.0),
            ],
            &rates,
        )
        .unwrap();
        assert_eq!(records[0].hours_gap, -10.0);
        assert_eq!(records[0].positive_gap, 0.0);
        assert_eq!(records[1].hours_gap, 10.0);
        assert_eq!(records[1].positive_gap, 10.0);
    }

    #[test]
    fn threshold_boundaries_are_inclusive() {
        // Twenty identical clients, each delivering 24 of 30 expected
        // hours at a unit rate: utilization is exactly 0.80 and every
        // revenue share is exactly 1/20 = 0.05.
        let rates = RateTable {
            hour: 1.0,
            thirty: 1.0,
        };
        let mut rows = vec![sample_row("target", "hour", 10.0, 24.0)];
        for i in 0..19 {
            rows.push(sample_row(&format!("filler-{i}"), "hour", 10.0, 24.0));
        }
        let records = enrich(rows, &rates).unwrap();
        let target = records.iter().find(|r| r.client_id == "target").unwrap();
        assert!((target.revenue_share_pct - 0.05).abs() < 1e-12);
        assert!((target.utilization - 0.80).abs() < 1e-12);
        assert!(target.high_revenue);
        assert!(target.high_utilization);
        assert_eq!(target.segment, Segment::Anchor);
    }

    #[test]
    fn zero_ideal_hours_never_counts_as_high_utilization_when_idle() {
        let rates = RateTable::default();
        let records = enrich(
            vec![
                sample_row("idle", "hour", 0.0, 0.0),
                sample_row("busy", "hour", 0.0, 5.0),
                sample_row("normal", "hour", 10.0, 30.0),
            ],
            &rates,
        )
        .unwrap();
        let idle = &records[0];
        assert!(idle.utilization.is_nan());
        assert!(!idle.high_utilization);
        // Delivered hours against a zero target count as over-delivery.
        let busy = &records[1];
        assert!(busy.utilization.is_infinite());
        assert!(busy.high_utilization);
    }

    #[test]
    fn zero_total_revenue_yields_zero_shares() {
        let rates = RateTable::default();
        let records = enrich(
            vec![
                sample_row("C1", "hour", 10.0, 0.0),
                sample_row("C2", "thirty", 5.0, 0.0),
            ],
            &rates,
        )
        .unwrap();
        for record in &records {
            assert_eq!(record.revenue_share_pct, 0.0);
            assert!(!record.high_revenue);
        }
    }
}
