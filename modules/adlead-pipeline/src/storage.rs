//! CSV persistence for both phase outputs: header row, UTF-8, no index column.

use std::fs::File;
use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::info;

use adlead_common::{AdleadError, CleanAdRow, EmptyOutput, EnrichedRow, FieldSet, Result};

pub const CLEAN_HEADERS: &[&str] = &["page_name", "page_url", "ad_text"];

const CONTACT_HEADERS: &[&str] = &[
    "page_name",
    "page_url",
    "ad_text",
    "website",
    "email",
    "phone",
];

const EXTENDED_HEADERS: &[&str] = &[
    "page_name",
    "page_url",
    "ad_text",
    "website",
    "email",
    "phone",
    "category",
    "bio",
    "address",
];

pub fn enriched_headers(fields: FieldSet) -> &'static [&'static str] {
    match fields {
        FieldSet::Contact => CONTACT_HEADERS,
        FieldSet::Extended => EXTENDED_HEADERS,
    }
}

fn clean_record(row: &CleanAdRow) -> Vec<&str> {
    vec![row.page_name.as_str(), row.page_url.as_str(), row.ad_text.as_str()]
}

fn enriched_record(row: &EnrichedRow, fields: FieldSet) -> Vec<&str> {
    let mut record = vec![
        row.page_name.as_str(),
        row.page_url.as_str(),
        row.ad_text.as_str(),
        row.website.as_str(),
        row.email.as_str(),
        row.phone.as_str(),
    ];
    if fields == FieldSet::Extended {
        record.extend([row.category.as_str(), row.bio.as_str(), row.address.as_str()]);
    }
    record
}

fn storage_err(path: &Path, err: impl std::fmt::Display) -> AdleadError {
    AdleadError::Storage {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

/// Write `records` under `headers`, replacing the file. With
/// [`EmptyOutput::Skip`], an empty table leaves the file untouched.
/// Returns whether the file was written.
fn write_table<'a, I>(
    path: &Path,
    headers: &[&str],
    records: I,
    is_empty: bool,
    on_empty: EmptyOutput,
) -> Result<bool>
where
    I: IntoIterator<Item = Vec<&'a str>>,
{
    if is_empty && on_empty == EmptyOutput::Skip {
        info!(path = %path.display(), "No rows, leaving output file untouched");
        return Ok(false);
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| storage_err(path, e))?;
    writer
        .write_record(headers)
        .map_err(|e| storage_err(path, e))?;
    for record in records {
        writer
            .write_record(&record)
            .map_err(|e| storage_err(path, e))?;
    }
    writer.flush()?;
    Ok(true)
}

pub fn write_clean(path: &Path, rows: &[CleanAdRow], on_empty: EmptyOutput) -> Result<bool> {
    let written = write_table(
        path,
        CLEAN_HEADERS,
        rows.iter().map(clean_record),
        rows.is_empty(),
        on_empty,
    )?;
    if written {
        info!(path = %path.display(), rows = rows.len(), "Wrote cleaned ads");
    }
    Ok(written)
}

pub fn write_enriched(
    path: &Path,
    rows: &[EnrichedRow],
    fields: FieldSet,
    on_empty: EmptyOutput,
) -> Result<bool> {
    let written = write_table(
        path,
        enriched_headers(fields),
        rows.iter().map(|row| enriched_record(row, fields)),
        rows.is_empty(),
        on_empty,
    )?;
    if written {
        info!(path = %path.display(), rows = rows.len(), "Wrote enriched pages");
    }
    Ok(written)
}

fn read_table<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = File::open(path).map_err(|e| storage_err(path, e))?;
    csv::Reader::from_reader(file)
        .deserialize()
        .collect::<csv::Result<Vec<T>>>()
        .map_err(|e| storage_err(path, e))
}

/// Read a cleaned-ads table. Columns beyond the clean schema are ignored, so
/// an enriched file is also accepted.
pub fn read_clean(path: &Path) -> Result<Vec<CleanAdRow>> {
    read_table(path)
}

/// Read an enriched table written with either field set.
pub fn read_enriched(path: &Path) -> Result<Vec<EnrichedRow>> {
    read_table(path)
}
