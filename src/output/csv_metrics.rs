//! CSV metrics log

use crate::output::stats::{MetricsRow, METRICS_COLUMNS};
use crate::output::traits::{MetricsSink, OutputError, OutputResult};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes metrics rows to a CSV file, flushing after every row
pub struct CsvMetricsSink<W: Write> {
    writer: csv::Writer<W>,
}

impl CsvMetricsSink<File> {
    /// Creates (or truncates) the log at `path` and writes the header
    pub fn create(path: &Path) -> OutputResult<Self> {
        let file = File::create(path).map_err(|source| OutputError::Open {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_writer(file)
    }
}

impl<W: Write> CsvMetricsSink<W> {
    /// Wraps any writer and writes the header immediately
    pub fn from_writer(inner: W) -> OutputResult<Self> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(inner);
        writer.write_record(METRICS_COLUMNS)?;
        writer.flush()?;
        Ok(Self { writer })
    }

    /// Consumes the sink and returns the underlying writer
    pub fn into_inner(self) -> OutputResult<W> {
        self.writer
            .into_inner()
            .map_err(|e| OutputError::Write(e.to_string()))
    }
}

impl<W: Write + Send> MetricsSink for CsvMetricsSink<W> {
    fn write_row(&mut self, row: &MetricsRow) -> OutputResult<()> {
        self.writer.serialize(row)?;
        self.writer.flush()?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(page_number: u64) -> MetricsRow {
        MetricsRow {
            page_number,
            elapsed_seconds: 1.5,
            elapsed_minutes: 0.025,
            total_urls_extracted: 3,
            total_keywords_extracted: 2,
            page_urls: 3,
            page_keywords: 2,
            urls_able_to_crawl: 3,
            urls_crawled: 1,
            urls_remaining: 2,
            encountered_urls_total: 3,
            encountered_urls_unique: 3,
            able_urls_unique: 2,
            crawled_urls_unique: 1,
        }
    }

    #[test]
    fn test_header_written_at_open() {
        let sink = CsvMetricsSink::from_writer(Vec::new()).unwrap();
        let output = String::from_utf8(sink.into_inner().unwrap()).unwrap();
        assert_eq!(output, format!("{}\n", METRICS_COLUMNS.join(",")));
    }

    #[test]
    fn test_rows_in_column_order() {
        let mut sink = CsvMetricsSink::from_writer(Vec::new()).unwrap();
        sink.write_row(&row(1)).unwrap();
        sink.write_row(&row(2)).unwrap();

        let output = String::from_utf8(sink.into_inner().unwrap()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "1,1.5,0.025,3,2,3,2,3,1,2,3,3,2,1");
        assert!(lines[2].starts_with("2,"));
    }

    #[test]
    fn test_file_is_flushed_per_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crawl_log.csv");

        let mut sink = CsvMetricsSink::create(&path).unwrap();
        sink.write_row(&row(1)).unwrap();

        // Readable before the sink is finished or dropped
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
        assert!(contents.starts_with("page_number,elapsed_seconds,"));
    }

    #[test]
    fn test_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("crawl_log.csv");
        assert!(matches!(
            CsvMetricsSink::create(&path),
            Err(OutputError::Open { .. })
        ));
    }
}
