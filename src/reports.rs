use crate::aggregator::upcoming_by_value;
use crate::error::Result;
use crate::output::{publish, write_json, ReportSpec};
use crate::types::{
    CountryMetric, CountryRow, Dashboard, DateMetric, DateRow, KpiRow, Metric, RangeRow,
    UpcomingRelease, UpcomingRow, ValueRange,
};
use crate::util::{format_int, format_money, format_percent, share};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const DASHBOARD_FILE: &str = "dashboard.json";

pub const TOP_COUNTRIES: ReportSpec = ReportSpec {
    number: 1,
    title: "Top Countries by Order Value",
    note: Some("Top 5 by summed Order Amt"),
    file_name: "report1_top_countries.csv",
};
pub const VALUE_BY_COUNTRY: ReportSpec = ReportSpec {
    number: 2,
    title: "Order Value by Country",
    note: Some("Top 8 by summed Order Amt"),
    file_name: "report2_value_by_country.csv",
};
pub const ORDERS_BY_COUNTRY: ReportSpec = ReportSpec {
    number: 3,
    title: "Orders by Country",
    note: Some("All countries by order count"),
    file_name: "report3_orders_by_country.csv",
};
pub const UPCOMING_RELEASES: ReportSpec = ReportSpec {
    number: 4,
    title: "Upcoming Releases by Value",
    note: Some("Next 10 releases, largest first"),
    file_name: "report4_upcoming_releases.csv",
};
pub const RELEASE_VALUE_BY_DATE: ReportSpec = ReportSpec {
    number: 5,
    title: "Upcoming Release Values",
    note: Some("Summed Order Amt per release date, first 15 dates"),
    file_name: "report5_release_value_by_date.csv",
};
pub const RELEASE_COUNT_BY_DATE: ReportSpec = ReportSpec {
    number: 6,
    title: "Upcoming Release Counts",
    note: Some("Orders per release date, first 15 dates"),
    file_name: "report6_release_count_by_date.csv",
};
pub const VALUE_RANGES: ReportSpec = ReportSpec {
    number: 7,
    title: "Order Value Ranges",
    note: None,
    file_name: "report7_order_value_ranges.csv",
};

fn render_metric(value: f64, metric: Metric) -> String {
    match metric {
        Metric::Value => format_money(value),
        Metric::Count => format_int(value as u64),
    }
}

pub fn country_rows(ranking: &[CountryMetric], metric: Metric) -> Vec<CountryRow> {
    ranking
        .iter()
        .enumerate()
        .map(|(idx, c)| CountryRow {
            rank: idx + 1,
            country: c.country.clone(),
            metric: render_metric(c.metric, metric),
        })
        .collect()
}

pub fn upcoming_rows(releases: &[UpcomingRelease]) -> Vec<UpcomingRow> {
    releases
        .iter()
        .map(|u| UpcomingRow {
            order_number: u.order_number.to_string(),
            company: u.company.to_string(),
            release_date: u.release_date.clone(),
            value: format_money(u.value),
        })
        .collect()
}

pub fn date_rows(distribution: &[DateMetric], metric: Metric) -> Vec<DateRow> {
    distribution
        .iter()
        .map(|d| DateRow {
            date: d.date.clone(),
            metric: render_metric(d.metric, metric),
        })
        .collect()
}

pub fn range_rows(ranges: &[ValueRange]) -> Vec<RangeRow> {
    ranges
        .iter()
        .map(|r| RangeRow {
            range: r.range.clone(),
            count: format_int(r.count),
            value: format_money(r.value),
        })
        .collect()
}

/// Headline figures: totals, average and the released/changes split.
pub fn kpi_rows(d: &Dashboard) -> Vec<KpiRow> {
    let kpi = |indicator: &str, value: String| KpiRow {
        indicator: indicator.to_string(),
        value,
    };
    let total = d.totals.total;
    vec![
        kpi("Total Orders", format_int(d.totals.count)),
        kpi("Total Order Value", format_money(total)),
        kpi(
            "Average Order",
            d.totals.average.map(format_money).unwrap_or_else(|| "no data".to_string()),
        ),
        kpi(
            "Released",
            format!("{} ({} orders)", format_money(d.status.released_value), format_int(d.status.released_count)),
        ),
        kpi(
            "Changes",
            format!("{} ({} orders)", format_money(d.status.changes_value), format_int(d.status.changes_count)),
        ),
        kpi("Released Share", format_percent(share(d.status.released_value, total))),
        kpi("Changes Share", format_percent(share(d.status.changes_value, total))),
    ]
}

/// Export every report of `dashboard` into `out_dir`, plus the full bundle as
/// JSON. With `preview_rows` set, each report is also printed as a table.
pub fn export_all(dashboard: &Dashboard, out_dir: &Path, preview_rows: Option<usize>) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)?;
    let upcoming = upcoming_by_value(&dashboard.upcoming_releases);
    let written = vec![
        publish(out_dir, &TOP_COUNTRIES, &country_rows(&dashboard.top_countries_value, Metric::Value), preview_rows)?,
        publish(out_dir, &VALUE_BY_COUNTRY, &country_rows(&dashboard.value_by_country, Metric::Value), preview_rows)?,
        publish(out_dir, &ORDERS_BY_COUNTRY, &country_rows(&dashboard.orders_by_country, Metric::Count), preview_rows)?,
        publish(out_dir, &UPCOMING_RELEASES, &upcoming_rows(&upcoming), preview_rows)?,
        publish(
            out_dir,
            &RELEASE_VALUE_BY_DATE,
            &date_rows(&dashboard.date_value_distribution, Metric::Value),
            preview_rows,
        )?,
        publish(
            out_dir,
            &RELEASE_COUNT_BY_DATE,
            &date_rows(&dashboard.date_count_distribution, Metric::Count),
            preview_rows,
        )?,
        publish(out_dir, &VALUE_RANGES, &range_rows(&dashboard.order_value_ranges), preview_rows)?,
    ];
    let json_path = out_dir.join(DASHBOARD_FILE);
    write_json(&json_path, dashboard)?;
    info!("Wrote {} report files and {:?}", written.len(), json_path);

    let mut all = written;
    all.push(json_path);
    Ok(all)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::build_dashboard;
    use chrono::NaiveDate;

    #[test]
    fn kpis_mark_empty_dataset_as_no_data() {
        let now = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let rows = kpi_rows(&build_dashboard(&[], now));
        assert_eq!(rows[0].value, "0");
        assert_eq!(rows[2].value, "no data");
        assert_eq!(rows[5].value, "no data");
    }

    #[test]
    fn metrics_render_per_kind() {
        let ranking = vec![CountryMetric { country: "US".into(), metric: 1234.5 }];
        assert_eq!(country_rows(&ranking, Metric::Value)[0].metric, "$1,234.50");
        let counts = vec![DateMetric { date: "2030-01-15".into(), metric: 1200.0 }];
        assert_eq!(date_rows(&counts, Metric::Count)[0].metric, "1,200");
    }
}
