//! JSON-lines page output

use crate::extract::Page;
use crate::output::traits::{OutputError, OutputResult, PageSink};
use crate::storage::RunStatus;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes one JSON object per crawled page, one page per line
pub struct JsonLinesPageSink<W: Write> {
    writer: W,
    pages: u64,
}

impl JsonLinesPageSink<BufWriter<File>> {
    /// Creates (or truncates) the output file at `path`
    pub fn create(path: &Path) -> OutputResult<Self> {
        let file = File::create(path).map_err(|source| OutputError::Open {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::from_writer(BufWriter::new(file)))
    }
}

impl<W: Write> JsonLinesPageSink<W> {
    pub fn from_writer(writer: W) -> Self {
        Self { writer, pages: 0 }
    }

    /// Number of pages written so far
    pub fn pages_written(&self) -> u64 {
        self.pages
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> PageSink for JsonLinesPageSink<W> {
    fn record_page(&mut self, page: &Page) -> OutputResult<()> {
        serde_json::to_writer(&mut self.writer, page)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        self.pages += 1;
        Ok(())
    }

    fn finish(&mut self, _status: RunStatus) -> OutputResult<()> {
        self.writer.flush()?;
        tracing::debug!("Wrote {} page records", self.pages);
        Ok(())
    }
}
