use crate::error::Result;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};

/// Title block and target file of one exported report.
#[derive(Debug, Clone, Copy)]
pub struct ReportSpec {
    pub number: usize,
    pub title: &'static str,
    pub note: Option<&'static str>,
    pub file_name: &'static str,
}

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    fs::write(path, s)?;
    Ok(())
}

pub fn markdown_table<T>(rows: &[T], max_rows: usize) -> Option<String>
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return None;
    }
    Some(Table::new(slice).with(Style::markdown()).to_string())
}

pub fn preview_table<T>(spec: &ReportSpec, rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("\nReport {}: {}", spec.number, spec.title);
    if let Some(n) = spec.note {
        println!("({})", n);
    }
    println!();
    match markdown_table(rows, max_rows) {
        Some(table) => println!("{}\n", table),
        None => println!("(no rows)\n"),
    }
}

/// Write `rows` to `out_dir/<spec.file_name>` and optionally preview them.
pub fn publish<T>(out_dir: &Path, spec: &ReportSpec, rows: &[T], preview_rows: Option<usize>) -> Result<PathBuf>
where
    T: Serialize + Tabled + Clone,
{
    let path = out_dir.join(spec.file_name);
    write_csv(&path, rows)?;
    if let Some(max_rows) = preview_rows {
        preview_table(spec, rows, max_rows);
        println!("(Full table exported to {})", path.display());
    }
    Ok(path)
}
