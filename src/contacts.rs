//! Contact export loading
//!
//! Supports:
//! - CSV files with a header row and a job title column
//! - LinkedIn connection exports, which start with a `Notes:` preamble
//! - Merging several files, dropping rows that are exact duplicates
//!
//! Rows that cannot be parsed are skipped with a warning so one bad line
//! does not abort a whole export.

use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Title columns tried when none is given, in order
pub const DEFAULT_TITLE_COLUMNS: &[&str] = &["title", "position"];

/// One contact row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactRecord {
    /// Job title, if the row has a non-blank one
    pub title: Option<String>,
    /// All columns keyed by header
    pub fields: BTreeMap<String, String>,
}

impl ContactRecord {
    /// Key identifying the row regardless of column order.
    pub fn dedup_key(&self) -> Vec<(String, String)> {
        self.fields
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(column))
            .map(|(_, v)| v.as_str())
    }

    /// "First Name Last Name" from a LinkedIn export, or a `name` column.
    pub fn display_name(&self) -> Option<String> {
        let non_empty = |column: &str| self.get(column).filter(|v| !v.is_empty());

        match (non_empty("first name"), non_empty("last name")) {
            (Some(first), Some(last)) => Some(format!("{} {}", first, last)),
            (Some(first), None) => Some(first.to_string()),
            (None, Some(last)) => Some(last.to_string()),
            (None, None) => non_empty("name").map(str::to_string),
        }
    }
}

/// Drop everything up to the first blank line when the export opens with a
/// `Notes:` block.
fn skip_preamble(content: &str) -> &str {
    if !content.trim_start_matches('\u{feff}').starts_with("Notes:") {
        return content;
    }

    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        offset += line.len();
        if line.trim().is_empty() {
            debug!("Skipped {} bytes of export preamble", offset);
            return &content[offset..];
        }
    }
    ""
}

/// Locate the title column. An explicit name must exist; otherwise the
/// first of [`DEFAULT_TITLE_COLUMNS`] present is used.
fn find_title_column(headers: &csv::StringRecord, title_column: Option<&str>) -> Result<usize> {
    let position = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    };

    match title_column {
        Some(name) => position(name).with_context(|| {
            format!(
                "CSV has no '{}' column (found: {})",
                name,
                headers.iter().collect::<Vec<_>>().join(", ")
            )
        }),
        None => DEFAULT_TITLE_COLUMNS
            .iter()
            .find_map(|name| position(*name))
            .with_context(|| {
                format!(
                    "CSV must have a 'title' or 'position' column (found: {})",
                    headers.iter().collect::<Vec<_>>().join(", ")
                )
            }),
    }
}

/// Parse contacts from CSV content.
pub fn parse_contacts_csv(content: &str, title_column: Option<&str>) -> Result<Vec<ContactRecord>> {
    let body = skip_preamble(content);
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let headers = reader
        .headers()
        .context("Failed to read CSV headers")?
        .clone();
    if headers.iter().all(|h| h.is_empty()) {
        bail!("CSV header row is empty");
    }
    let title_idx = find_title_column(&headers, title_column)?;

    let mut records = Vec::new();
    for (line, result) in reader.records().enumerate() {
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                warn!("Skipping malformed CSV row {}: {}", line + 2, e);
                continue;
            }
        };

        if row.iter().all(|v| v.is_empty()) {
            continue;
        }

        let fields: BTreeMap<String, String> = headers
            .iter()
            .zip(row.iter())
            .map(|(h, v)| (h.to_string(), v.to_string()))
            .collect();
        let title = row
            .get(title_idx)
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        records.push(ContactRecord { title, fields });
    }

    Ok(records)
}

/// Parse one contacts file.
pub fn parse_contacts_file(path: &Path, title_column: Option<&str>) -> Result<Vec<ContactRecord>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read contacts file: {}", path.display()))?;
    parse_contacts_csv(&content, title_column)
        .with_context(|| format!("Failed to parse contacts file: {}", path.display()))
}

/// Drop rows identical to an earlier one, keeping first occurrences.
pub fn dedup_records(records: Vec<ContactRecord>) -> Vec<ContactRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|record| seen.insert(record.dedup_key()))
        .collect()
}

/// Load and merge several contact files.
pub fn load_contacts<P: AsRef<Path>>(
    paths: &[P],
    title_column: Option<&str>,
) -> Result<Vec<ContactRecord>> {
    let mut combined = Vec::new();
    for path in paths {
        let records = parse_contacts_file(path.as_ref(), title_column)?;
        debug!("{}: {} rows", path.as_ref().display(), records.len());
        combined.extend(records);
    }

    let total = combined.len();
    let unique = dedup_records(combined);
    info!(
        "Loaded {} contacts from {} file(s), {} duplicates removed",
        unique.len(),
        paths.len(),
        total - unique.len()
    );
    Ok(unique)
}
