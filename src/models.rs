use serde::Serialize;

/// Client segment derived from the revenue-share and utilization thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Segment {
    Anchor,
    Opportunity,
    Steady,
    #[serde(rename = "Low impact")]
    LowImpact,
}

impl Segment {
    pub fn label(&self) -> &'static str {
        match self {
            Segment::Anchor => "Anchor",
            Segment::Opportunity => "Opportunity",
            Segment::Steady => "Steady",
            Segment::LowImpact => "Low impact",
        }
    }
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.label())
    }
}

/// Session rates per service category, passed into the metrics stage so
/// tests can run with alternate tables.
#[derive(Debug, Clone)]
pub struct RateTable {
    pub hour: f64,
    pub thirty: f64,
}

impl Default for RateTable {
    fn default() -> Self {
        Self {
            hour: 61.20,
            thirty: 33.75,
        }
    }
}

/// One cleaned input row, after filtering and numeric coercion but before
/// any derived metrics.
#[derive(Debug, Clone)]
pub struct CleanRow {
    pub client_id: String,
    pub service_type: String,
    /// Normalized hour/thirty discriminator (trimmed, lowercased).
    pub service_category: String,
    pub ideal_hours_month: f64,
    pub hours_nov_jan: f64,
}

/// One fully enriched client row, as written to the metrics table.
#[derive(Debug, Clone, Serialize)]
pub struct ClientRecord {
    pub client_id: String,
    pub service_type: String,
    #[serde(rename = "30_60")]
    pub service_category: String,
    pub ideal_hours_month: f64,
    pub hours_nov_jan: f64,
    pub session_rate: f64,
    pub expected_hours_3mo: f64,
    pub utilization: f64,
    pub revenue_nov_jan: f64,
    pub avg_monthly_revenue: f64,
    pub hours_gap: f64,
    pub positive_gap: f64,
    pub revenue_share_pct: f64,
    pub high_revenue: bool,
    pub high_utilization: bool,
    pub segment: Segment,
}

/// Portfolio-wide scalars for the console summary.
#[derive(Debug, Clone)]
pub struct PortfolioSummary {
    pub client_count: usize,
    pub total_avg_monthly_revenue: f64,
    pub missing_hours_3mo: f64,
    pub avg_missing_hours_month: f64,
    /// Rough estimate using the hour rate for every gap hour.
    pub monthly_revenue_opportunity: f64,
}

/// One row of the per-segment summary table.
#[derive(Debug, Clone, Serialize)]
pub struct SegmentRollup {
    pub segment: Segment,
    pub client_count: usize,
    pub avg_monthly_revenue: f64,
    pub avg_monthly_gap_hours: f64,
}
