//! File-backed exporters: CSV and a tab-separated spreadsheet file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use geofence_core::Table;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use super::TableSink;
use crate::error::SinkError;

/// Encodes `table` with the given field delimiter. Fields are quoted only
/// when they contain the delimiter, a quote, or a line break; quotes are
/// doubled. Records end with `\n`.
///
/// # Errors
///
/// Returns [`SinkError::Csv`] if encoding fails.
pub fn to_delimited_bytes(table: &Table, delimiter: u8) -> Result<Vec<u8>, SinkError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row.iter().map(ToString::to_string))?;
    }
    writer
        .into_inner()
        .map_err(|e| SinkError::Csv(csv::Error::from(e.into_error())))
}

/// RFC 4180 style CSV text for `table`.
///
/// # Errors
///
/// Returns [`SinkError::Csv`] if encoding fails.
pub fn to_csv_string(table: &Table) -> Result<String, SinkError> {
    let bytes = to_delimited_bytes(table, b',')?;
    // Every field came from a `String`, so the output is valid UTF-8.
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Lowercase ASCII slug: alphanumerics kept, runs of anything else become `_`.
fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_sep = false;
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('_');
            }
            pending_sep = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }
    if slug.is_empty() {
        slug.push_str("route");
    }
    slug
}

/// `{slug}_{timestamp}_{random}.{ext}`. Runs sharing a title and a
/// millisecond still get distinct files.
fn export_file_name(title: &str, extension: &str) -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!(
        "{}_{}_{}.{extension}",
        slugify(title),
        Utc::now().format("%Y%m%dT%H%M%S%3f"),
        &id[..8]
    )
}

async fn write_export(dir: &Path, file_name: &str, bytes: Vec<u8>) -> Result<String, SinkError> {
    let io_err = |path: &Path, source| SinkError::Io {
        path: path.display().to_string(),
        source,
    };

    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| io_err(dir, e))?;
    let path = dir.join(file_name);
    // `create_new` refuses to clobber another run's export.
    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .await
        .map_err(|e| io_err(&path, e))?;
    file.write_all(&bytes).await.map_err(|e| io_err(&path, e))?;
    file.flush().await.map_err(|e| io_err(&path, e))?;

    let absolute = tokio::fs::canonicalize(&path).await.unwrap_or(path);
    tracing::info!(path = %absolute.display(), "export written");
    Ok(format!("file://{}", absolute.display()))
}

/// Writes comma-separated exports into a directory.
pub struct CsvWriter {
    dir: PathBuf,
}

impl CsvWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl TableSink for CsvWriter {
    async fn write(&self, title: &str, table: &Table) -> Result<String, SinkError> {
        let bytes = to_delimited_bytes(table, b',')?;
        write_export(&self.dir, &export_file_name(title, "csv"), bytes).await
    }
}

/// Writes tab-separated spreadsheet files into a directory.
pub struct SheetWriter {
    dir: PathBuf,
}

impl SheetWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl TableSink for SheetWriter {
    async fn write(&self, title: &str, table: &Table) -> Result<String, SinkError> {
        let bytes = to_delimited_bytes(table, b'\t')?;
        write_export(&self.dir, &export_file_name(title, "tsv"), bytes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geofence_core::Cell;

    fn sample() -> Table {
        Table {
            headers: vec!["#".into(), "Business Name".into(), "Address".into()],
            rows: vec![
                vec![Cell::Integer(1), "Joe's \"Best\" Diner".into(), "1 Main St, Springfield".into()],
                vec![Cell::Integer(2), "Plain".into(), "".into()],
            ],
        }
    }

    #[test]
    fn csv_quotes_only_when_needed() {
        let csv = to_csv_string(&sample()).unwrap();
        assert_eq!(
            csv,
            "#,Business Name,Address\n1,\"Joe's \"\"Best\"\" Diner\",\"1 Main St, Springfield\"\n2,Plain,\n"
        );
    }

    #[test]
    fn empty_table_is_header_only() {
        let table = Table {
            headers: vec!["a".into(), "b".into()],
            rows: vec![],
        };
        assert_eq!(to_csv_string(&table).unwrap(), "a,b\n");
    }

    #[test]
    fn tab_delimiter_leaves_commas_unquoted() {
        let bytes = to_delimited_bytes(&sample(), b'\t').unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("1 Main St, Springfield"), "{text}");
        assert!(text.starts_with("#\tBusiness Name\tAddress\n"));
    }

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(
            slugify("Geofence Route - 37.42, -122.08"),
            "geofence_route_37_42_122_08"
        );
        assert_eq!(slugify("---"), "route");
    }

    #[tokio::test]
    async fn csv_writer_creates_dir_and_returns_file_link() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested");
        let link = CsvWriter::new(&dir)
            .write("geofence_route", &sample())
            .await
            .unwrap();

        assert!(link.starts_with("file://"), "{link}");
        assert!(link.ends_with(".csv"), "{link}");
        let path = link.trim_start_matches("file://");
        let written = std::fs::read_to_string(path).unwrap();
        assert!(written.starts_with("#,Business Name,Address\n"));
    }

    #[tokio::test]
    async fn concurrent_writes_with_same_title_get_separate_files() {
        let tmp = tempfile::tempdir().unwrap();
        let writer = CsvWriter::new(tmp.path());
        let mut first = sample();
        first.rows.truncate(1);
        let second = sample();

        for _ in 0..20 {
            let (a, b) = tokio::join!(
                writer.write("geofence_route", &first),
                writer.write("geofence_route", &second)
            );
            let (a, b) = (a.unwrap(), b.unwrap());
            assert_ne!(a, b);

            let a_text = std::fs::read_to_string(a.trim_start_matches("file://")).unwrap();
            let b_text = std::fs::read_to_string(b.trim_start_matches("file://")).unwrap();
            assert_eq!(a_text.lines().count(), 2);
            assert_eq!(b_text.lines().count(), 1 + second.rows.len());
        }
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 40);
    }

    #[tokio::test]
    async fn sheet_writer_uses_title_in_file_name() {
        let tmp = tempfile::tempdir().unwrap();
        let link = SheetWriter::new(tmp.path())
            .write("Geofence Route - HQ", &sample())
            .await
            .unwrap();
        assert!(link.contains("geofence_route_hq_"), "{link}");
        assert!(link.ends_with(".tsv"), "{link}");
    }
}
