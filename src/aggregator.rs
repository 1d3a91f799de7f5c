//! Pure aggregation over parsed order records.
//!
//! Every function here is a read-only pass over `&[OrderRecord]`; the bundle
//! returned by [`build_dashboard`] is the only thing callers need to keep.

use crate::types::{
    CountryMetric, Dashboard, DateMetric, Metric, OrderRecord, StatusBreakdown, Totals,
    UpcomingRelease, ValueRange,
};
use crate::util::{average, date_part, parse_release_datetime};
use chrono::NaiveDateTime;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::debug;

pub const TOP_COUNTRIES_LIMIT: usize = 5;
pub const COUNTRY_CHART_LIMIT: usize = 8;
pub const UPCOMING_LIMIT: usize = 10;
pub const DATE_DISTRIBUTION_LIMIT: usize = 15;

/// Lower bounds of the order value buckets; the last one is open-ended.
pub const VALUE_BUCKETS: [(f64, &str); 6] = [
    (0.0, "$0-$1K"),
    (1_000.0, "$1K-$5K"),
    (5_000.0, "$5K-$10K"),
    (10_000.0, "$10K-$20K"),
    (20_000.0, "$20K-$50K"),
    (50_000.0, "$50K+"),
];

/// Grouping accumulator that remembers first-appearance order of its keys.
#[derive(Default)]
struct Grouped {
    index: HashMap<String, usize>,
    entries: Vec<(String, f64)>,
}

impl Grouped {
    fn add(&mut self, key: &str, amount: f64) {
        let slot = match self.index.get(key) {
            Some(&i) => i,
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push((key.to_string(), 0.0));
                self.entries.len() - 1
            }
        };
        self.entries[slot].1 += amount;
    }

    fn into_entries(self) -> Vec<(String, f64)> {
        self.entries
    }
}

fn contribution(record: &OrderRecord, metric: Metric) -> f64 {
    match metric {
        Metric::Value => record.amount(),
        Metric::Count => 1.0,
    }
}

pub fn compute_totals(records: &[OrderRecord]) -> Totals {
    let count = records.len();
    let total: f64 = records.iter().map(OrderRecord::amount).sum();
    Totals {
        count,
        total,
        average: average(total, count),
    }
}

pub fn compute_status_breakdown(records: &[OrderRecord]) -> StatusBreakdown {
    let mut out = StatusBreakdown::default();
    for r in records {
        if r.rel.is_true() {
            out.released_count += 1;
            out.released_value += r.amount();
        }
        if r.ch.is_true() {
            out.changes_count += 1;
            out.changes_value += r.amount();
        }
    }
    out
}

/// Rank countries by summed value or by order count, highest first.
///
/// Records without a usable country are skipped. Equal metrics keep the
/// order in which the countries first appear in `records`.
pub fn compute_country_ranking(
    records: &[OrderRecord],
    metric: Metric,
    limit: Option<usize>,
) -> Vec<CountryMetric> {
    let mut groups = Grouped::default();
    for r in records {
        if let Some(country) = r.country.as_key() {
            groups.add(&country, contribution(r, metric));
        }
    }
    let mut ranked: Vec<CountryMetric> = groups
        .into_entries()
        .into_iter()
        .map(|(country, metric)| CountryMetric { country, metric })
        .collect();
    ranked.sort_by(|a, b| b.metric.partial_cmp(&a.metric).unwrap_or(Ordering::Equal));
    if let Some(limit) = limit {
        ranked.truncate(limit);
    }
    ranked
}

/// Orders releasing at or after `now`, soonest first.
pub fn compute_upcoming_releases(
    records: &[OrderRecord],
    now: NaiveDateTime,
    limit: usize,
) -> Vec<UpcomingRelease> {
    let mut upcoming: Vec<(NaiveDateTime, &OrderRecord, &str)> = records
        .iter()
        .filter_map(|r| {
            let text = r.release_text()?;
            let when = parse_release_datetime(text)?;
            (when >= now).then_some((when, r, text))
        })
        .collect();
    upcoming.sort_by_key(|(when, _, _)| *when);
    upcoming
        .into_iter()
        .take(limit)
        .map(|(_, r, text)| UpcomingRelease {
            order_number: r.order.clone(),
            company: r.name.clone(),
            release_date: date_part(text).to_string(),
            value: r.amount(),
        })
        .collect()
}

/// Upcoming releases reordered by value, largest first; ties keep date order.
pub fn upcoming_by_value(releases: &[UpcomingRelease]) -> Vec<UpcomingRelease> {
    let mut out = releases.to_vec();
    out.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(Ordering::Equal));
    out
}

/// Per-day totals keyed by the date portion of `NextRelDt`, earliest first.
///
/// Keys that do not parse as a date sort after all parseable ones.
pub fn compute_date_distribution(
    records: &[OrderRecord],
    metric: Metric,
    limit: usize,
) -> Vec<DateMetric> {
    let mut groups = Grouped::default();
    for r in records {
        if let Some(text) = r.release_text() {
            groups.add(date_part(text), contribution(r, metric));
        }
    }
    let mut dated: Vec<(Option<NaiveDateTime>, DateMetric)> = groups
        .into_entries()
        .into_iter()
        .map(|(date, metric)| (parse_release_datetime(&date), DateMetric { date, metric }))
        .collect();
    dated.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    dated.into_iter().take(limit).map(|(_, m)| m).collect()
}

fn bucket_index(amount: f64) -> usize {
    VALUE_BUCKETS
        .iter()
        .rposition(|(lower, _)| amount >= *lower)
        .unwrap_or(0)
}

pub fn compute_value_ranges(records: &[OrderRecord]) -> Vec<ValueRange> {
    let mut ranges: Vec<ValueRange> = VALUE_BUCKETS
        .iter()
        .map(|(_, label)| ValueRange {
            range: label.to_string(),
            count: 0,
            value: 0.0,
        })
        .collect();
    for r in records {
        let amount = r.amount();
        let bucket = &mut ranges[bucket_index(amount)];
        bucket.count += 1;
        bucket.value += amount;
    }
    ranges
}

/// Compute the full aggregate bundle for one ingestion.
pub fn build_dashboard(records: &[OrderRecord], now: NaiveDateTime) -> Dashboard {
    debug!(records = records.len(), %now, "building dashboard");
    let value_ranking = compute_country_ranking(records, Metric::Value, None);
    Dashboard {
        as_of: now,
        totals: compute_totals(records),
        status: compute_status_breakdown(records),
        top_countries_value: value_ranking.iter().take(TOP_COUNTRIES_LIMIT).cloned().collect(),
        value_by_country: value_ranking.into_iter().take(COUNTRY_CHART_LIMIT).collect(),
        orders_by_country: compute_country_ranking(records, Metric::Count, None),
        upcoming_releases: compute_upcoming_releases(records, now, UPCOMING_LIMIT),
        date_value_distribution: compute_date_distribution(records, Metric::Value, DATE_DISTRIBUTION_LIMIT),
        date_count_distribution: compute_date_distribution(records, Metric::Count, DATE_DISTRIBUTION_LIMIT),
        order_value_ranges: compute_value_ranges(records),
    }
}
