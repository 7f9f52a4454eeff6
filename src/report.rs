//! Audit report: one row per staging folder, plus a summary.
//!
//! Rows are read-only snapshots derived after all pipeline phases have
//! run; nothing in here mutates the records. The column set is the one
//! the catalog team has always worked with:
//!
//! | Column | Content |
//! |---|---|
//! | Dir name | staging folder name |
//! | Path | full folder path |
//! | Exist files | production files with the folder's item code |
//! | Added files | files promoted from this folder this run |
//! | Wrong files | files whose own code differs from the folder's |
//! | Outsiders | free-text flag when wrong files exist |
//! | Duplicates | other staging folders with the same code |
//! | Comment | primary/variant photo inventory of the folder |
//!
//! The summary row records `<promoted> promoted / <promoted+existing>
//! total`, where existing is the production image count before the run.
//!
//! ## Export
//!
//! CSV is the primary format and must succeed — the run fails without it.
//! The HTML table (for mailing around) and the JSON document (for
//! machines) are secondary: their failure is logged and ignored.

use crate::scan::StagingScan;
use crate::types::{FolderRecord, PromotionState};
use log::warn;
use maud::{DOCTYPE, Markup, html};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One folder's reconciliation outcome.
#[derive(Debug, Clone, Serialize)]
pub struct ReportRow {
    pub dir_name: String,
    pub path: String,
    pub exist_files: Vec<String>,
    pub added_files: Vec<String>,
    pub wrong_files: Vec<String>,
    pub outsiders: String,
    pub duplicates: Vec<String>,
    pub comment: String,
}

/// The complete report: folder rows plus the run summary.
#[derive(Debug, Serialize)]
pub struct Report {
    pub rows: Vec<ReportRow>,
    pub summary: String,
}

const COLUMNS: &[&str] = &[
    "Dir name",
    "Path",
    "Exist files",
    "Added files",
    "Wrong files",
    "Outsiders",
    "Duplicates",
    "Comment",
    "Statistics",
];

/// Derive the report from the finished staging scan.
///
/// `existing` is the number of production images found before promotion.
pub fn build_report(scan: &StagingScan, promoted: usize, existing: usize) -> Report {
    let rows = scan
        .folders
        .iter()
        .enumerate()
        .map(|(i, folder)| build_row(folder, scan.duplicate_names_of(i)))
        .collect();

    Report {
        rows,
        summary: format!("{} promoted / {} total", promoted, promoted + existing),
    }
}

fn build_row(folder: &FolderRecord, duplicates: Vec<&str>) -> ReportRow {
    let filenames_in = |state: PromotionState| -> Vec<String> {
        folder
            .images
            .iter()
            .filter(|i| i.state() == state)
            .map(|i| i.filename.clone())
            .collect()
    };

    let wrong_files = filenames_in(PromotionState::Misplaced);
    let outsiders = if wrong_files.is_empty() {
        String::new()
    } else {
        "Contains images with a foreign item code".to_string()
    };

    ReportRow {
        dir_name: folder.name.clone(),
        path: folder.path.display().to_string(),
        exist_files: folder.production_matches.clone(),
        added_files: filenames_in(PromotionState::Promoted),
        wrong_files,
        outsiders,
        duplicates: duplicates.into_iter().map(String::from).collect(),
        comment: classify_photo_kinds(folder).to_string(),
    }
}

/// Which kinds of photos a folder holds, misplaced ones not counted.
fn classify_photo_kinds(folder: &FolderRecord) -> &'static str {
    let mut has_primary = false;
    let mut has_variant = false;
    for image in &folder.images {
        if image.state() == PromotionState::Misplaced {
            continue;
        }
        match image.identity.variant {
            None => has_primary = true,
            Some(_) => has_variant = true,
        }
    }
    match (has_primary, has_variant) {
        (true, true) => "Has both primary and variant photos",
        (true, false) => "Primary photo only",
        (false, true) => "Variant photos only",
        (false, false) => "No conforming photos",
    }
}

/// Write the report in every format. CSV is mandatory; HTML and JSON
/// failures only warn. Returns the CSV path.
pub fn write_reports(report: &Report, dir: &Path, name: &str) -> Result<PathBuf, ReportError> {
    fs::create_dir_all(dir)?;

    let csv_path = dir.join(format!("{name}.csv"));
    fs::write(&csv_path, to_csv(report))?;

    let html_path = dir.join(format!("{name}.html"));
    if let Err(e) = fs::write(&html_path, render_html(report).into_string()) {
        warn!("Skipping HTML report {}: {}", html_path.display(), e);
    }

    let json_path = dir.join(format!("{name}.json"));
    match serde_json::to_string_pretty(report) {
        Ok(json) => {
            if let Err(e) = fs::write(&json_path, json) {
                warn!("Skipping JSON report {}: {}", json_path.display(), e);
            }
        }
        Err(e) => warn!("Skipping JSON report: {}", e),
    }

    Ok(csv_path)
}

/// Render the report as CSV, one line per folder plus the summary row.
pub fn to_csv(report: &Report) -> String {
    let mut out = String::new();
    push_csv_line(&mut out, COLUMNS.iter().map(|c| c.to_string()));

    for row in &report.rows {
        push_csv_line(
            &mut out,
            [
                row.dir_name.clone(),
                row.path.clone(),
                row.exist_files.join("; "),
                row.added_files.join("; "),
                row.wrong_files.join("; "),
                row.outsiders.clone(),
                row.duplicates.join("; "),
                row.comment.clone(),
                String::new(),
            ],
        );
    }

    let mut summary = vec![String::new(); COLUMNS.len()];
    summary[COLUMNS.len() - 1] = report.summary.clone();
    push_csv_line(&mut out, summary);
    out
}

fn push_csv_line(out: &mut String, fields: impl IntoIterator<Item = String>) {
    let line = fields
        .into_iter()
        .map(|f| csv_field(&f))
        .collect::<Vec<_>>()
        .join(",");
    out.push_str(&line);
    out.push('\n');
}

/// Quote a CSV field when it needs it, doubling embedded quotes.
fn csv_field(value: &str) -> String {
    if value.contains(['"', ',', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Render the report as a standalone HTML table.
pub fn render_html(report: &Report) -> Markup {
    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { "Promotion report" }
            }
            body {
                h1 { "Promotion report" }
                p { (report.summary) }
                table border="1" {
                    thead {
                        tr {
                            @for column in COLUMNS.iter().take(COLUMNS.len() - 1).copied() {
                                th { (column) }
                            }
                        }
                    }
                    tbody {
                        @for row in &report.rows {
                            tr {
                                td { (row.dir_name) }
                                td { (row.path) }
                                td { (row.exist_files.join(", ")) }
                                td { (row.added_files.join(", ")) }
                                td { (row.wrong_files.join(", ")) }
                                td { (row.outsiders) }
                                td { (row.duplicates.join(", ")) }
                                td { (row.comment) }
                            }
                        }
                    }
                }
            }
        }
    }
}
