use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use tabled::Tabled;

/// A single dynamically typed cell, as produced by the loader.
///
/// CSV cells are typed by `util::coerce_field`; JSON cells map onto the
/// variants directly (`null` is `Empty`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Truthiness: empty, `false`, `0`, NaN and `""` are all falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            CellValue::Empty => false,
            CellValue::Bool(b) => *b,
            CellValue::Number(n) => *n != 0.0 && !n.is_nan(),
            CellValue::Text(s) => !s.is_empty(),
        }
    }

    /// Strict flag check: only a real boolean `true` counts.
    pub fn is_true(&self) -> bool {
        matches!(self, CellValue::Bool(true))
    }

    /// Monetary reading of the cell. Anything that is not a finite, non-zero
    /// number reads as 0.
    pub fn amount(&self) -> f64 {
        match self {
            CellValue::Number(n) if n.is_finite() => *n,
            _ => 0.0,
        }
    }

    /// Text content, if the cell holds non-empty text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) if !s.is_empty() => Some(s.as_str()),
            _ => None,
        }
    }

    /// Grouping key for a truthy cell (its display form), `None` otherwise.
    pub fn as_key(&self) -> Option<String> {
        self.is_truthy().then(|| self.to_string())
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Number(v)
    }
}

impl From<bool> for CellValue {
    fn from(v: bool) -> Self {
        CellValue::Bool(v)
    }
}

impl From<&str> for CellValue {
    fn from(v: &str) -> Self {
        CellValue::Text(v.to_string())
    }
}

impl From<String> for CellValue {
    fn from(v: String) -> Self {
        CellValue::Text(v)
    }
}

/// One CSV row before dynamic typing. Header names must match exactly.
#[derive(Debug, Deserialize)]
pub struct RawRow {
    #[serde(rename = "Order")]
    pub order: Option<String>,
    #[serde(rename = "Name")]
    pub name: Option<String>,
    #[serde(rename = "Country")]
    pub country: Option<String>,
    #[serde(rename = "Order Amt")]
    pub order_amt: Option<String>,
    #[serde(rename = "REL")]
    pub rel: Option<String>,
    #[serde(rename = "CH")]
    pub ch: Option<String>,
    #[serde(rename = "NextRelDt")]
    pub next_rel_dt: Option<String>,
}

/// Columns the loader looks for, in header order of the source export.
pub const EXPECTED_COLUMNS: [&str; 7] = ["Order", "Name", "Country", "Order Amt", "REL", "CH", "NextRelDt"];

/// One parsed order. Every field may be absent or of an unexpected type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    #[serde(rename = "Order", default)]
    pub order: CellValue,
    #[serde(rename = "Name", default)]
    pub name: CellValue,
    #[serde(rename = "Country", default)]
    pub country: CellValue,
    #[serde(rename = "Order Amt", default)]
    pub order_amt: CellValue,
    #[serde(rename = "REL", default)]
    pub rel: CellValue,
    #[serde(rename = "CH", default)]
    pub ch: CellValue,
    #[serde(rename = "NextRelDt", default)]
    pub next_rel_dt: CellValue,
}

impl OrderRecord {
    pub fn amount(&self) -> f64 {
        self.order_amt.amount()
    }

    /// Raw `NextRelDt` text; non-text cells count as absent.
    pub fn release_text(&self) -> Option<&str> {
        self.next_rel_dt.as_text()
    }
}

/// Which quantity a grouped view accumulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Sum of `Order Amt`.
    Value,
    /// Number of orders.
    Count,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Totals {
    #[serde(rename = "totalOrders")]
    pub count: usize,
    #[serde(rename = "totalValue")]
    pub total: f64,
    /// `None` when there are no orders.
    #[serde(rename = "avgValue")]
    pub average: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusBreakdown {
    pub released_count: usize,
    pub released_value: f64,
    pub changes_count: usize,
    pub changes_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryMetric {
    pub country: String,
    pub metric: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingRelease {
    pub order_number: CellValue,
    pub company: CellValue,
    pub release_date: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateMetric {
    pub date: String,
    pub metric: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueRange {
    pub range: String,
    pub count: usize,
    pub value: f64,
}

/// The aggregate bundle produced per ingestion.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub as_of: NaiveDateTime,
    #[serde(flatten)]
    pub totals: Totals,
    #[serde(flatten)]
    pub status: StatusBreakdown,
    pub top_countries_value: Vec<CountryMetric>,
    pub value_by_country: Vec<CountryMetric>,
    pub orders_by_country: Vec<CountryMetric>,
    pub upcoming_releases: Vec<UpcomingRelease>,
    pub date_value_distribution: Vec<DateMetric>,
    pub date_count_distribution: Vec<DateMetric>,
    pub order_value_ranges: Vec<ValueRange>,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct CountryRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Country")]
    #[tabled(rename = "Country")]
    pub country: String,
    #[serde(rename = "Metric")]
    #[tabled(rename = "Metric")]
    pub metric: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct UpcomingRow {
    #[serde(rename = "Order")]
    #[tabled(rename = "Order #")]
    pub order_number: String,
    #[serde(rename = "Company")]
    #[tabled(rename = "Company")]
    pub company: String,
    #[serde(rename = "ReleaseDate")]
    #[tabled(rename = "Release Date")]
    pub release_date: String,
    #[serde(rename = "Value")]
    #[tabled(rename = "Value")]
    pub value: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct DateRow {
    #[serde(rename = "Date")]
    #[tabled(rename = "Date")]
    pub date: String,
    #[serde(rename = "Metric")]
    #[tabled(rename = "Metric")]
    pub metric: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct RangeRow {
    #[serde(rename = "Range")]
    #[tabled(rename = "Range")]
    pub range: String,
    #[serde(rename = "OrderCount")]
    #[tabled(rename = "Order Count")]
    pub count: String,
    #[serde(rename = "TotalValue")]
    #[tabled(rename = "Total Value")]
    pub value: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct KpiRow {
    #[tabled(rename = "Indicator")]
    pub indicator: String,
    #[tabled(rename = "Value")]
    pub value: String,
}
