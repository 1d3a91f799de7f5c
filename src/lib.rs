//! shipclerk_report
//!
//! Turns a ShipClerk order export (CSV or JSON, one record per order) into
//! the summary figures behind the financial dashboard: totals, released and
//! changed value, country rankings, upcoming releases, per-date distributions
//! and order value ranges.
//!
//! ### Example
//! ```no_run
//! use shipclerk_report::{aggregator, loader};
//!
//! let (orders, _report) = loader::load_orders("Shipclerkmonitor.csv".as_ref())?;
//! let now = chrono::Local::now().naive_local();
//! let dashboard = aggregator::build_dashboard(&orders, now);
//! println!("{} orders worth {}", dashboard.totals.count, dashboard.totals.total);
//! # Ok::<(), shipclerk_report::ReportError>(())
//! ```

pub mod aggregator;
pub mod error;
pub mod loader;
pub mod output;
pub mod reports;
pub mod types;
pub mod util;

pub use aggregator::build_dashboard;
pub use error::ReportError;
pub use loader::{load_orders, LoadReport};
pub use types::{CellValue, Dashboard, Metric, OrderRecord};
