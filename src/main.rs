// Entry point and high-level CLI flow.
//
// - Option [1] loads an order export, computes the dashboard once and keeps
//   it as the current snapshot. Loading another file replaces it.
// - Option [2] previews every report and exports CSV files plus
//   `dashboard.json`.
// - `--batch` runs both steps once and exits.
use anyhow::Result;
use chrono::{Local, NaiveDateTime};
use clap::Parser;
use once_cell::sync::Lazy;
use shipclerk_report::{aggregator, loader, output, reports, util, Dashboard, LoadReport};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Summarize a ShipClerk order export into dashboard reports
#[derive(Parser, Debug)]
#[command(name = "shipclerk_report")]
#[command(about = "Aggregate ShipClerk order exports into dashboard reports")]
struct Args {
    /// Order export to load (CSV, or JSON array of records)
    #[arg(long, env = "SHIPCLERK_INPUT", default_value = "Shipclerkmonitor.csv")]
    input: PathBuf,

    /// Directory for exported report files
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Evaluate upcoming releases against this moment instead of now
    #[arg(long, value_parser = parse_as_of)]
    as_of: Option<NaiveDateTime>,

    /// Rows shown per report preview
    #[arg(long, default_value = "5")]
    preview_rows: usize,

    /// Load and generate reports once, without the menu
    #[arg(long)]
    batch: bool,
}

fn parse_as_of(s: &str) -> std::result::Result<NaiveDateTime, String> {
    util::parse_as_of(s).map_err(|e| e.to_string())
}

/// Everything derived from one ingestion, published as a unit.
struct Snapshot {
    source: PathBuf,
    load_report: LoadReport,
    dashboard: Dashboard,
}

// The latest snapshot; a new load swaps the whole `Arc` so readers never
// observe a half-built dashboard.
static APP_STATE: Lazy<Mutex<Option<Arc<Snapshot>>>> = Lazy::new(|| Mutex::new(None));

fn publish_snapshot(snapshot: Snapshot) {
    let mut state = APP_STATE.lock().unwrap_or_else(|e| e.into_inner());
    *state = Some(Arc::new(snapshot));
}

fn current_snapshot() -> Option<Arc<Snapshot>> {
    APP_STATE.lock().unwrap_or_else(|e| e.into_inner()).clone()
}

/// Read a single trimmed line after printing `prompt`; `None` once input is
/// exhausted.
fn read_line_from<R: BufRead>(input: &mut R, prompt: &str) -> Result<Option<String>> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut buf = String::new();
    if input.read_line(&mut buf)? == 0 {
        return Ok(None);
    }
    Ok(Some(buf.trim().to_string()))
}

/// Ask whether to go back to the menu after generating reports. End of input
/// counts as "N".
fn prompt_back_to_menu<R: BufRead>(input: &mut R) -> Result<bool> {
    loop {
        let Some(answer) = read_line_from(input, "Back to Report Selection (Y/N): ")? else {
            return Ok(false);
        };
        match answer.to_uppercase().as_str() {
            "Y" => return Ok(true),
            "N" => return Ok(false),
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Handle option [1]: load a file and publish a fresh snapshot.
fn handle_load(path: &Path, as_of: Option<NaiveDateTime>) -> Result<()> {
    let (orders, load_report) = loader::load_orders(path)?;
    let now = as_of.unwrap_or_else(|| Local::now().naive_local());
    let dashboard = aggregator::build_dashboard(&orders, now);

    println!(
        "Processing dataset... ({} rows read, {} orders loaded)",
        util::format_int(load_report.total_rows),
        util::format_int(load_report.loaded_rows)
    );
    if load_report.parse_errors > 0 {
        println!(
            "Note: {} rows skipped due to parse errors.",
            util::format_int(load_report.parse_errors)
        );
    }
    if !load_report.missing_columns.is_empty() {
        println!("Note: missing columns treated as empty: {}", load_report.missing_columns.join(", "));
    }
    println!();

    publish_snapshot(Snapshot {
        source: path.to_path_buf(),
        load_report,
        dashboard,
    });
    Ok(())
}

/// Handle option [2]: print KPIs, preview and export every report.
fn handle_generate_reports(out_dir: &Path, preview_rows: usize) -> Result<()> {
    let Some(snapshot) = current_snapshot() else {
        println!("Error: No data loaded. Please load a file first (option 1).\n");
        return Ok(());
    };
    let dashboard = &snapshot.dashboard;
    info!(
        "Generating reports for {:?} ({} orders)",
        snapshot.source, snapshot.load_report.loaded_rows
    );

    println!("ShipClerk Financial Dashboard");
    println!("(As of {})\n", dashboard.as_of.format("%Y-%m-%d %H:%M"));
    if let Some(table) = output::markdown_table(&reports::kpi_rows(dashboard), usize::MAX) {
        println!("{}\n", table);
    }
    if dashboard.totals.average.is_none() {
        warn!("Dataset is empty; averages reported as no data");
    }

    let written = reports::export_all(dashboard, out_dir, Some(preview_rows))?;
    println!("\n{} files written to {}\n", written.len(), out_dir.display());
    Ok(())
}

fn run_menu(args: &Args) -> Result<()> {
    let mut input = io::stdin().lock();
    loop {
        println!("ShipClerk Order Reports:");
        println!("[1] Load a file");
        println!("[2] Generate Reports\n");
        let Some(choice) = read_line_from(&mut input, "Enter choice: ")? else {
            println!("\nExiting the program.");
            return Ok(());
        };
        match choice.as_str() {
            "1" => {
                let prompt = format!("File path [{}]: ", args.input.display());
                let Some(entered) = read_line_from(&mut input, &prompt)? else {
                    println!("\nExiting the program.");
                    return Ok(());
                };
                let path = if entered.is_empty() { args.input.clone() } else { PathBuf::from(entered) };
                if let Err(e) = handle_load(&path, args.as_of) {
                    eprintln!("Failed to load file: {}\n", e);
                }
            }
            "2" => {
                println!();
                if let Err(e) = handle_generate_reports(&args.out_dir, args.preview_rows) {
                    eprintln!("Report error: {}\n", e);
                }
                if !prompt_back_to_menu(&mut input)? {
                    println!("Exiting the program.");
                    return Ok(());
                }
            }
            _ => println!("Invalid choice. Please enter 1 or 2.\n"),
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    if !args.batch {
        return run_menu(&args);
    }

    handle_load(&args.input, args.as_of)?;
    handle_generate_reports(&args.out_dir, args.preview_rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn read_line_signals_end_of_input() {
        let mut input = Cursor::new("  2 \n");
        assert_eq!(read_line_from(&mut input, "").unwrap().as_deref(), Some("2"));
        assert_eq!(read_line_from(&mut input, "").unwrap(), None);
    }

    #[test]
    fn blank_line_is_not_end_of_input() {
        let mut input = Cursor::new("\n");
        assert_eq!(read_line_from(&mut input, "").unwrap().as_deref(), Some(""));
    }

    #[test]
    fn back_prompt_stops_at_end_of_input() {
        let mut input = Cursor::new("maybe\n");
        assert!(!prompt_back_to_menu(&mut input).unwrap());
        let mut input = Cursor::new("x\ny\n");
        assert!(prompt_back_to_menu(&mut input).unwrap());
    }
}
