//! Tabular export of the four output streams
//!
//! Comma-separated text with a `Muestra,Crudo,Promedio,Mediana,Exponencial`
//! header and one row per sample index (1-based), truncated to the shortest
//! stream. Fractional columns keep a decimal point (`30.0`, `1.3`).

use crate::filter_bank::FilterSnapshot;
use chrono::Utc;
use ecg_core::{EcgError, EcgResult, FilterKind, Sample};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Title of the index column
pub const INDEX_COLUMN: &str = "Muestra";

/// One index-aligned export row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportRow {
    /// 1-based sample index
    pub index: usize,
    pub raw: Sample,
    pub average: f64,
    pub median: Sample,
    pub exponential: f64,
}

impl ExportRow {
    fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writeln!(
            writer,
            "{},{},{:?},{},{:?}",
            self.index, self.raw, self.average, self.median, self.exponential
        )
    }
}

/// Outcome of a file export
#[derive(Debug, Clone, PartialEq)]
pub struct ExportReport {
    pub path: PathBuf,
    pub rows: usize,
}

/// Header line of the export file
pub fn header() -> String {
    let mut columns = vec![INDEX_COLUMN];
    columns.extend(FilterKind::ALL.iter().map(|kind| kind.column_name()));
    columns.join(",")
}

/// Aligned rows of a snapshot.
///
/// Fails with `EmptyData` when no raw sample has been recorded; otherwise
/// returns `aligned_len()` rows, possibly zero when a filter stream is empty.
pub fn rows(snapshot: &FilterSnapshot) -> EcgResult<Vec<ExportRow>> {
    if snapshot.raw.is_empty() {
        return Err(EcgError::EmptyData { operation: "export" });
    }

    let rows = (0..snapshot.aligned_len())
        .map(|i| ExportRow {
            index: i + 1,
            raw: snapshot.raw[i],
            average: snapshot.average[i],
            median: snapshot.median[i],
            exponential: snapshot.exponential[i],
        })
        .collect();
    Ok(rows)
}

/// Write header and rows to any writer, returning the number of data rows
pub fn write_csv<W: Write>(snapshot: &FilterSnapshot, writer: &mut W) -> EcgResult<usize> {
    let rows = rows(snapshot)?;

    writeln!(writer, "{}", header())?;
    for row in &rows {
        row.write_to(writer)?;
    }
    writer.flush()?;

    Ok(rows.len())
}

/// File name for an export taken now: `ecg_datos_<unix seconds>.txt`
pub fn file_name() -> String {
    format!("ecg_datos_{}.txt", Utc::now().timestamp())
}

/// Export into a fresh timestamped file inside `dir`
pub fn export_to_dir(snapshot: &FilterSnapshot, dir: &Path) -> EcgResult<ExportReport> {
    // Check before touching the file system so an empty export leaves nothing behind
    if snapshot.raw.is_empty() {
        return Err(EcgError::EmptyData { operation: "export" });
    }

    std::fs::create_dir_all(dir)?;
    let path = dir.join(file_name());
    debug!("Writing export to {}", path.display());

    let file = File::create(&path).map_err(|e| EcgError::Io {
        reason: format!("Failed to create {}: {}", path.display(), e),
    })?;
    let mut writer = BufWriter::new(file);
    let rows = write_csv(snapshot, &mut writer)?;

    info!(rows, path = %path.display(), "ECG data exported");
    Ok(ExportReport { path, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter_bank::FilterBank;
    use ecg_core::FilterActivation;

    fn snapshot_of(samples: &[Sample]) -> FilterSnapshot {
        let mut bank = FilterBank::default();
        for &sample in samples {
            bank.process(sample, FilterActivation::all_on());
        }
        bank.snapshot()
    }

    #[test]
    fn test_header() {
        assert_eq!(header(), "Muestra,Crudo,Promedio,Mediana,Exponencial");
    }

    #[test]
    fn test_rows_truncate_to_shortest_stream() {
        let snapshot = snapshot_of(&[1, 2, 3, 4, 5]);
        let rows = rows(&snapshot).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].index, 1);
        assert_eq!(rows[0].raw, 1);
        assert_eq!(rows[0].average, 3.0);
        assert_eq!(rows[0].median, 3);
        assert_eq!(rows[0].exponential, 1.0);
    }

    #[test]
    fn test_write_csv_format() {
        let snapshot = snapshot_of(&[1, 2, 3, 4, 5, 6]);
        let mut out = Vec::new();
        let written = write_csv(&snapshot, &mut out).unwrap();
        assert_eq!(written, 2);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Muestra,Crudo,Promedio,Mediana,Exponencial");
        assert_eq!(lines[1], "1,1,3.0,3,1.0");
        assert!(lines[2].starts_with("2,2,4.0,4,"));
        let exponential: f64 = lines[2].rsplit(',').next().unwrap().parse().unwrap();
        assert!((exponential - 1.3).abs() < 1e-9);
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_empty_raw_is_rejected() {
        let snapshot = FilterSnapshot::default();
        assert_eq!(
            rows(&snapshot),
            Err(EcgError::EmptyData { operation: "export" })
        );
    }

    #[test]
    fn test_disabled_filter_yields_header_only() {
        let mut bank = FilterBank::default();
        for sample in 0..10 {
            bank.process(sample, FilterActivation::raw_only());
        }
        let mut out = Vec::new();
        assert_eq!(write_csv(&bank.snapshot(), &mut out).unwrap(), 0);
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 1);
    }

    #[test]
    fn test_export_to_dir() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = snapshot_of(&[10, 20, 30, 40, 50, 60, 70]);

        let report = export_to_dir(&snapshot, dir.path()).unwrap();
        assert_eq!(report.rows, 3);
        assert!(report
            .path
            .file_name()
            .and_then(|name| name.to_str())
            .map_or(false, |name| name.starts_with("ecg_datos_") && name.ends_with(".txt")));

        let contents = std::fs::read_to_string(&report.path).unwrap();
        assert_eq!(contents.lines().count(), 4);
    }

    #[test]
    fn test_empty_export_creates_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = export_to_dir(&FilterSnapshot::default(), dir.path());
        assert!(matches!(result, Err(EcgError::EmptyData { .. })));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
