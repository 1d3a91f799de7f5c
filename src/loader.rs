use crate::error::{ReportError, Result};
use crate::types::{OrderRecord, RawRow, EXPECTED_COLUMNS};
use crate::util::coerce_optional;
use csv::{ReaderBuilder, Trim};
use serde_json::Value;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub parse_errors: usize,
    pub missing_columns: Vec<String>,
}

/// Load orders from `path`. Files ending in `.json` are read as a JSON array
/// of records; everything else is treated as CSV.
pub fn load_orders(path: &Path) -> Result<(Vec<OrderRecord>, LoadReport)> {
    info!("Reading orders from {:?}", path);
    let file = BufReader::new(File::open(path)?);
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    let (records, report) = if is_json {
        read_orders_json(file)?
    } else {
        read_orders_csv(file)?
    };
    info!(
        "Loaded {} of {} rows ({} skipped)",
        report.loaded_rows, report.total_rows, report.parse_errors
    );
    Ok((records, report))
}

fn missing_columns(present: &[&str]) -> Vec<String> {
    EXPECTED_COLUMNS
        .iter()
        .filter(|c| !present.contains(*c))
        .map(|c| c.to_string())
        .collect()
}

pub fn read_orders_csv<R: Read>(input: R) -> Result<(Vec<OrderRecord>, LoadReport)> {
    let mut rdr = ReaderBuilder::new().flexible(true).trim(Trim::Headers).from_reader(input);
    let headers = rdr.headers()?.clone();
    let names: Vec<&str> = headers.iter().collect();
    let missing = missing_columns(&names);
    if missing.len() == EXPECTED_COLUMNS.len() {
        return Err(ReportError::InvalidInput(format!(
            "header row has none of the expected columns ({})",
            EXPECTED_COLUMNS.join(", ")
        )));
    }
    if !missing.is_empty() {
        warn!("Missing columns, treated as empty: {}", missing.join(", "));
    }

    let mut report = LoadReport {
        missing_columns: missing,
        ..Default::default()
    };
    let mut records = Vec::new();
    for (line, result) in rdr.deserialize::<RawRow>().enumerate() {
        report.total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                debug!("Skipping row {}: {}", line + 2, e);
                report.parse_errors += 1;
                continue;
            }
        };
        records.push(OrderRecord {
            order: coerce_optional(row.order.as_deref()),
            name: coerce_optional(row.name.as_deref()),
            country: coerce_optional(row.country.as_deref()),
            order_amt: coerce_optional(row.order_amt.as_deref()),
            rel: coerce_optional(row.rel.as_deref()),
            ch: coerce_optional(row.ch.as_deref()),
            next_rel_dt: coerce_optional(row.next_rel_dt.as_deref()),
        });
    }
    report.loaded_rows = records.len();
    Ok((records, report))
}

/// Read a JSON array of record objects. Anything other than an array of
/// objects is rejected as a whole; individual objects with unusable cells
/// are skipped and counted.
pub fn read_orders_json<R: Read>(input: R) -> Result<(Vec<OrderRecord>, LoadReport)> {
    let doc: Value = serde_json::from_reader(input)?;
    let Value::Array(items) = doc else {
        return Err(ReportError::InvalidInput("expected a JSON array of order records".to_string()));
    };
    if let Some(pos) = items.iter().position(|v| !v.is_object()) {
        return Err(ReportError::InvalidInput(format!("element {} is not a record object", pos)));
    }

    let present: Vec<&str> = items
        .iter()
        .filter_map(Value::as_object)
        .flat_map(|o| o.keys().map(String::as_str))
        .collect();
    let missing = if items.is_empty() { Vec::new() } else { missing_columns(&present) };
    if !missing.is_empty() {
        warn!("Missing fields, treated as empty: {}", missing.join(", "));
    }

    let mut report = LoadReport {
        total_rows: items.len(),
        missing_columns: missing,
        ..Default::default()
    };
    let mut records = Vec::with_capacity(items.len());
    for (idx, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<OrderRecord>(item) {
            Ok(r) => records.push(r),
            Err(e) => {
                debug!("Skipping record {}: {}", idx, e);
                report.parse_errors += 1;
            }
        }
    }
    report.loaded_rows = records.len();
    Ok((records, report))
}
