use chrono::{NaiveDate, NaiveDateTime};
use shipclerk_report::aggregator::{
    build_dashboard, compute_country_ranking, compute_date_distribution, compute_status_breakdown,
    compute_totals, compute_upcoming_releases, compute_value_ranges,
};
use shipclerk_report::types::{CellValue, CountryMetric, Metric, OrderRecord};

fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(0, 0, 0).unwrap()
}

fn rec(country: Option<&str>, amount: Option<f64>, rel: bool, ch: bool) -> OrderRecord {
    OrderRecord {
        country: country.map(CellValue::from).unwrap_or_default(),
        order_amt: amount.map(CellValue::Number).unwrap_or_default(),
        rel: CellValue::Bool(rel),
        ch: CellValue::Bool(ch),
        ..Default::default()
    }
}

fn mixed_sample() -> Vec<OrderRecord> {
    vec![
        OrderRecord {
            order: CellValue::Number(1.0),
            name: CellValue::from("Acme"),
            country: CellValue::from("US"),
            order_amt: CellValue::Number(750.0),
            rel: CellValue::Bool(true),
            next_rel_dt: CellValue::from("2030-02-01 10:00:00"),
            ..Default::default()
        },
        OrderRecord {
            order: CellValue::from("B-2"),
            country: CellValue::from("DE"),
            order_amt: CellValue::from("n/a"),
            rel: CellValue::Number(1.0),
            ch: CellValue::Bool(true),
            next_rel_dt: CellValue::from("2020-05-05"),
            ..Default::default()
        },
        OrderRecord {
            order: CellValue::Number(3.0),
            country: CellValue::Empty,
            order_amt: CellValue::Number(64_000.0),
            next_rel_dt: CellValue::from("garbled"),
            ..Default::default()
        },
        OrderRecord {
            order: CellValue::Number(4.0),
            country: CellValue::from("DE"),
            order_amt: CellValue::Number(12_000.0),
            ch: CellValue::Bool(true),
            ..Default::default()
        },
    ]
}

#[test]
fn three_order_scenario() {
    let records = vec![
        rec(Some("US"), Some(500.0), true, false),
        rec(Some("US"), Some(1500.0), false, false),
        rec(Some("CA"), Some(20000.0), false, true),
    ];
    let dash = build_dashboard(&records, at(2026, 1, 1));

    assert_eq!(dash.totals.count, 3);
    assert_eq!(dash.totals.total, 22000.0);
    assert_eq!(dash.status.released_value, 500.0);
    assert_eq!(dash.status.changes_value, 20000.0);
    assert_eq!(
        dash.top_countries_value,
        vec![
            CountryMetric { country: "CA".into(), metric: 20000.0 },
            CountryMetric { country: "US".into(), metric: 2000.0 },
        ]
    );

    let counts: Vec<usize> = dash.order_value_ranges.iter().map(|r| r.count).collect();
    let values: Vec<f64> = dash.order_value_ranges.iter().map(|r| r.value).collect();
    assert_eq!(counts, vec![1, 1, 0, 0, 1, 0]);
    assert_eq!(values, vec![500.0, 1500.0, 0.0, 0.0, 20000.0, 0.0]);
}

#[test]
fn empty_dataset_reports_no_data() {
    let dash = build_dashboard(&[], at(2026, 1, 1));
    assert_eq!(dash.totals.count, 0);
    assert_eq!(dash.totals.total, 0.0);
    assert_eq!(dash.totals.average, None);
    assert!(dash.top_countries_value.is_empty());
    assert!(dash.value_by_country.is_empty());
    assert!(dash.orders_by_country.is_empty());
    assert!(dash.upcoming_releases.is_empty());
    assert!(dash.date_value_distribution.is_empty());
    assert!(dash.date_count_distribution.is_empty());
    assert_eq!(dash.order_value_ranges.len(), 6);
    assert!(dash.order_value_ranges.iter().all(|r| r.count == 0 && r.value == 0.0));
}

#[test]
fn release_time_is_dropped_from_upcoming_date() {
    let records = vec![OrderRecord {
        order: CellValue::Number(77.0),
        name: CellValue::from("Initech"),
        order_amt: CellValue::Number(42.0),
        next_rel_dt: CellValue::from("2030-01-15 08:00:00"),
        ..Default::default()
    }];
    let upcoming = compute_upcoming_releases(&records, at(2029, 12, 31), 10);
    assert_eq!(upcoming.len(), 1);
    assert_eq!(upcoming[0].release_date, "2030-01-15");
    assert_eq!(upcoming[0].company, CellValue::from("Initech"));
    assert_eq!(upcoming[0].value, 42.0);
}

#[test]
fn totals_treat_unusable_amounts_as_zero() {
    let records = mixed_sample();
    let totals = compute_totals(&records);
    assert_eq!(totals.count, 4);
    assert_eq!(totals.total, 750.0 + 64_000.0 + 12_000.0);
    assert_eq!(totals.average, Some(totals.total / 4.0));
}

#[test]
fn status_counts_partition_on_strict_true() {
    let records = mixed_sample();
    let status = compute_status_breakdown(&records);
    let not_released = records.iter().filter(|r| r.rel != CellValue::Bool(true)).count();
    let not_changed = records.iter().filter(|r| r.ch != CellValue::Bool(true)).count();
    assert_eq!(status.released_count + not_released, records.len());
    assert_eq!(status.changes_count + not_changed, records.len());
    assert_eq!(status.released_count, 1);
    assert_eq!(status.changes_count, 2);
    assert_eq!(status.changes_value, 12_000.0);
}

#[test]
fn buckets_cover_every_record_once() {
    let records = mixed_sample();
    let ranges = compute_value_ranges(&records);
    assert_eq!(ranges.iter().map(|r| r.count).sum::<usize>(), records.len());
    // "n/a" amount lands in the first bucket with no value.
    assert_eq!(ranges[0].count, 2);
    assert_eq!(ranges[0].value, 750.0);
    assert_eq!(ranges[3].count, 1);
    assert_eq!(ranges[5].count, 1);
}

#[test]
fn country_views_skip_missing_country() {
    let records = mixed_sample();
    let by_value = compute_country_ranking(&records, Metric::Value, None);
    assert_eq!(
        by_value,
        vec![
            CountryMetric { country: "DE".into(), metric: 12_000.0 },
            CountryMetric { country: "US".into(), metric: 750.0 },
        ]
    );
    let by_count = compute_country_ranking(&records, Metric::Count, None);
    assert_eq!(by_count[0], CountryMetric { country: "DE".into(), metric: 2.0 });
    assert_eq!(by_count.len(), 2);
}

#[test]
fn upcoming_excludes_past_missing_and_garbled_dates() {
    let records = mixed_sample();
    let upcoming = compute_upcoming_releases(&records, at(2026, 10, 17), 10);
    assert_eq!(upcoming.len(), 1);
    assert_eq!(upcoming[0].order_number, CellValue::Number(1.0));
    assert_eq!(upcoming[0].release_date, "2030-02-01");
}

#[test]
fn date_distribution_is_bounded_and_ascending() {
    let records: Vec<OrderRecord> = (0..40)
        .map(|i| OrderRecord {
            order_amt: CellValue::Number(100.0),
            next_rel_dt: CellValue::from(format!("{:02}/{:02}/2030 09:00", 1 + (i % 12), 1 + (i % 28))),
            ..Default::default()
        })
        .collect();
    let dist = compute_date_distribution(&records, Metric::Value, 15);
    assert!(dist.len() <= 15);
    let parsed: Vec<NaiveDate> = dist
        .iter()
        .map(|d| NaiveDate::parse_from_str(&d.date, "%m/%d/%Y").unwrap())
        .collect();
    assert!(parsed.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn aggregation_is_idempotent() {
    let records = mixed_sample();
    let now = at(2026, 10, 17);
    assert_eq!(build_dashboard(&records, now), build_dashboard(&records, now));
}

#[test]
fn country_order_is_stable_on_ties() {
    let records = vec![
        rec(Some("NL"), Some(10.0), false, false),
        rec(Some("BE"), Some(10.0), false, false),
        rec(Some("LU"), Some(10.0), false, false),
    ];
    let ranked = compute_country_ranking(&records, Metric::Value, Some(2));
    let names: Vec<&str> = ranked.iter().map(|c| c.country.as_str()).collect();
    assert_eq!(names, vec!["NL", "BE"]);
}

#[test]
fn dashboard_serializes_with_contract_field_names() {
    let records = vec![rec(Some("US"), Some(500.0), true, false)];
    let json = serde_json::to_value(build_dashboard(&records, at(2026, 1, 1))).unwrap();
    for key in [
        "asOf",
        "totalOrders",
        "totalValue",
        "avgValue",
        "releasedValue",
        "releasedCount",
        "changesValue",
        "changesCount",
        "topCountriesValue",
        "valueByCountry",
        "ordersByCountry",
        "upcomingReleases",
        "dateValueDistribution",
        "dateCountDistribution",
        "orderValueRanges",
    ] {
        assert!(json.get(key).is_some(), "missing {}", key);
    }
    let empty = serde_json::to_value(build_dashboard(&[], at(2026, 1, 1))).unwrap();
    assert!(empty["avgValue"].is_null());
}
