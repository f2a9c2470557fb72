use std::collections::HashMap;
use std::fmt::Write;

use crate::models::{ClientRecord, PortfolioSummary, RateTable, Segment, SegmentRollup};

/// Portfolio-wide scalars. Missing hours count only positive gaps; clients
/// running over target do not offset under-delivery elsewhere. The monthly
/// revenue opportunity prices every gap hour at the hour rate, a documented
/// rough estimate.
pub fn portfolio_summary(records: &[ClientRecord], rates: &RateTable) -> PortfolioSummary {
    let total_avg_monthly_revenue: f64 = records.iter().map(|r| r.avg_monthly_revenue).sum();
    let missing_hours_3mo: f64 = records
        .iter()
        .filter(|r| r.hours_gap > 0.0)
        .map(|r| r.hours_gap)
        .sum();
    let avg_missing_hours_month = missing_hours_3mo / 3.0;

    PortfolioSummary {
        client_count: records.len(),
        total_avg_monthly_revenue,
        missing_hours_3mo,
        avg_missing_hours_month,
        monthly_revenue_opportunity: avg_missing_hours_month * rates.hour,
    }
}

/// Per-segment rollup, sorted descending by summed monthly revenue.
/// Segments with no members are omitted.
pub fn segment_rollup(records: &[ClientRecord]) -> Vec<SegmentRollup> {
    let mut totals: HashMap<Segment, (usize, f64, f64)> = HashMap::new();

    for record in records {
        let entry = totals.entry(record.segment).or_insert((0, 0.0, 0.0));
        entry.0 += 1;
        entry.1 += record.avg_monthly_revenue;
        entry.2 += record.positive_gap;
    }

    let mut rollups: Vec<SegmentRollup> = totals
        .into_iter()
        .map(|(segment, (client_count, revenue, gap))| SegmentRollup {
            segment,
            client_count,
            avg_monthly_revenue: revenue,
            avg_monthly_gap_hours: gap / 3.0,
        })
        .collect();

    rollups.sort_by(|a, b| {
        b.avg_monthly_revenue
            .partial_cmp(&a.avg_monthly_revenue)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.segment.label().cmp(b.segment.label()))
    });
    rollups
}

pub fn render_summary(summary: &PortfolioSummary, rollups: &[SegmentRollup]) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "=== Summary ===");
    let _ = writeln!(output, "Clients: {}", summary.client_count);
    let _ = writeln!(
        output,
        "Total avg monthly revenue: ${:.2}",
        summary.total_avg_monthly_revenue
    );
    let _ = writeln!(
        output,
        "Missing hours (3 months): {:.1}",
        summary.missing_hours_3mo
    );
    let _ = writeln!(
        output,
        "Avg missing hours per month: {:.1}",
        summary.avg_missing_hours_month
    );
    let _ = writeln!(
        output,
        "Rough revenue opportunity per month (hour rate): ${:.2}",
        summary.monthly_revenue_opportunity
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "=== Segment Summary ===");

    if rollups.is_empty() {
        let _ = writeln!(output, "No clients survived cleaning.");
    } else {
        let _ = writeln!(
            output,
            "{:<12} {:>12} {:>20} {:>22}",
            "segment", "client_count", "avg_monthly_revenue", "avg_monthly_gap_hours"
        );
        for rollup in rollups {
            let _ = writeln!(
                output,
                "{:<12} {:>12} {:>20.2} {:>22.2}",
                rollup.segment,
                rollup.client_count,
                rollup.avg_monthly_revenue,
                rollup.avg_monthly_gap_hours
            );
        }
    }

    output
}
