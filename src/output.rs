use std::path::Path;

use plotters::prelude::*;
use plotters::style::FontTransform;

use crate::models::{ClientRecord, SegmentRollup};

const CHART_BLUE: RGBColor = RGBColor(66, 133, 244);

/// Write the full enriched client table, one row per client, no index.
pub fn write_metrics_csv(path: &Path, records: &[ClientRecord]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the per-segment summary table, already sorted by revenue.
pub fn write_segment_summary(path: &Path, rollups: &[SegmentRollup]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for rollup in rollups {
        writer.serialize(rollup)?;
    }
    writer.flush()?;
    Ok(())
}

/// Bar chart of summed average monthly revenue per segment, descending.
pub fn revenue_by_segment_chart(path: &Path, rollups: &[SegmentRollup]) -> anyhow::Result<()> {
    let labels: Vec<String> = rollups.iter().map(|r| r.segment.to_string()).collect();
    let values: Vec<f64> = rollups.iter().map(|r| r.avg_monthly_revenue).collect();
    draw_bar_chart(
        path,
        "Average Monthly Revenue by Client Segment",
        "Avg Monthly Revenue ($)",
        &labels,
        &values,
        (800, 600),
    )
}

/// Bar chart of positive hours gap per client, descending; clients with no
/// gap are excluded.
pub fn gap_by_client_chart(path: &Path, records: &[ClientRecord]) -> anyhow::Result<()> {
    let mut gaps: Vec<(&str, f64)> = records
        .iter()
        .filter(|r| r.positive_gap > 0.0)
        .map(|r| (r.client_id.as_str(), r.positive_gap))
        .collect();
    gaps.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(b.0))
    });

    let labels: Vec<String> = gaps.iter().map(|(id, _)| id.to_string()).collect();
    let values: Vec<f64> = gaps.iter().map(|(_, gap)| *gap).collect();
    draw_bar_chart(
        path,
        "Unrealized Training Hours by Client (3 Months)",
        "Hours Gap (Positive Only)",
        &labels,
        &values,
        (900, 400),
    )
}

fn draw_bar_chart(
    path: &Path,
    title: &str,
    y_desc: &str,
    labels: &[String],
    values: &[f64],
    size: (u32, u32),
) -> anyhow::Result<()> {
    let n = labels.len().max(1);
    let max_value = values.iter().fold(0.0_f64, |a, &b| a.max(b)).max(1.0);

    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(70)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..n as f64, 0f64..(max_value * 1.1))?;

    let label_text: Vec<String> = labels.to_vec();
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n)
        .x_label_formatter(&move |x| {
            label_text
                .get(x.floor() as usize)
                .cloned()
                .unwrap_or_default()
        })
        .x_label_style(("sans-serif", 12).into_font().transform(FontTransform::Rotate90))
        .y_desc(y_desc)
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    for (i, &value) in values.iter().enumerate() {
        chart.draw_series(std::iter::once(Rectangle::new(
            [(i as f64 + 0.1, 0.0), (i as f64 + 0.9, value)],
            CHART_BLUE.filled(),
        )))?;
    }

    root.present()?;
    Ok(())
}
