use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::path::Path;

use crate::error::{PipelineError, Result};
use crate::models::CleanRow;

/// Columns the pipeline needs; `30_60` is the raw hour/thirty discriminator.
pub const REQUIRED_COLUMNS: [&str; 5] = [
    "client_id",
    "service_type",
    "ideal_hours_month",
    "hours_nov_jan",
    "30_60",
];

/// Load and clean the client table from a CSV export.
///
/// Keeps only rows whose discriminator normalizes to "hour" or "thirty",
/// drops rows missing either numeric field, and keeps the first occurrence
/// of each `client_id`. Dropped rows are expected dashboard noise, not
/// errors.
pub fn load_clients(path: &Path) -> Result<Vec<CleanRow>> {
    // Exports often carry ragged dashboard rows below the client table.
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    read_clients(&mut reader)
}

fn read_clients<R: Read>(reader: &mut csv::Reader<R>) -> Result<Vec<CleanRow>> {
    let headers = reader.headers()?.clone();
    let found: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();

    let mut column_index: HashMap<String, usize> = HashMap::new();
    for (idx, name) in found.iter().enumerate() {
        column_index.entry(name.clone()).or_insert(idx);
    }

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|name| !column_index.contains_key(**name))
        .map(|name| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(PipelineError::Schema { missing, found });
    }

    let id_idx = column_index["client_id"];
    let service_idx = column_index["service_type"];
    let ideal_idx = column_index["ideal_hours_month"];
    let hours_idx = column_index["hours_nov_jan"];
    let category_idx = column_index["30_60"];

    let mut seen_ids: HashSet<String> = HashSet::new();
    let mut rows = Vec::new();

    for record in reader.records() {
        let record = record?;

        let category = record
            .get(category_idx)
            .unwrap_or("")
            .trim()
            .to_lowercase();
        if category != "hour" && category != "thirty" {
            continue;
        }

        // Coerce before the completeness check so malformed numeric text
        // falls out with the genuinely blank rows.
        let ideal_hours_month = parse_numeric(record.get(ideal_idx));
        let hours_nov_jan = parse_numeric(record.get(hours_idx));
        let (Some(ideal_hours_month), Some(hours_nov_jan)) = (ideal_hours_month, hours_nov_jan)
        else {
            continue;
        };

        let client_id = record.get(id_idx).unwrap_or("").trim().to_string();
        if !seen_ids.insert(client_id.clone()) {
            // Chart tables in the sheet repeat clients; keep the first.
            continue;
        }

        rows.push(CleanRow {
            client_id,
            service_type: record.get(service_idx).unwrap_or("").trim().to_string(),
            service_category: category,
            ideal_hours_month,
            hours_nov_jan,
        });
    }

    Ok(rows)
}

fn parse_numeric(field: Option<&str>) -> Option<f64> {
    let trimmed = field?.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}
