//! Output sink traits and error types
//!
//! A crawl writes to two kinds of sinks: page sinks receive every crawled
//! [`Page`] (and every fetch failure), the metrics sink receives one
//! [`MetricsRow`] per page. Both are append-only.

use crate::crawler::FetchError;
use crate::extract::Page;
use crate::output::stats::MetricsRow;
use crate::storage::RunStatus;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to open output {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] crate::storage::StorageError),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Destination for crawled page records
///
/// Records arrive in completion order, one per distinct page URL. A page is
/// recorded before its metrics row is written, and `finish` is called once
/// after the last record. Implementations must be `Send` so the coordinator
/// can keep them behind its shared lock.
pub trait PageSink: Send {
    /// Records one crawled page
    fn record_page(&mut self, page: &Page) -> OutputResult<()>;

    /// Records a URL whose fetch failed
    fn record_failure(&mut self, _url: &str, _error: &FetchError) -> OutputResult<()> {
        Ok(())
    }

    /// Flushes and closes the sink, recording how the crawl ended
    fn finish(&mut self, _status: RunStatus) -> OutputResult<()> {
        Ok(())
    }
}

/// Destination for per-page metrics rows
pub trait MetricsSink: Send {
    /// Writes one row; the row must be durable when this returns
    fn write_row(&mut self, row: &MetricsRow) -> OutputResult<()>;

    /// Flushes and closes the sink
    fn finish(&mut self) -> OutputResult<()> {
        Ok(())
    }
}

/// Fans every record out to several page sinks in order
#[derive(Default)]
pub struct MultiPageSink {
    sinks: Vec<Box<dyn PageSink>>,
}

impl MultiPageSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sink; records reach sinks in the order they were added
    pub fn push(&mut self, sink: Box<dyn PageSink>) {
        self.sinks.push(sink);
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl PageSink for MultiPageSink {
    fn record_page(&mut self, page: &Page) -> OutputResult<()> {
        for sink in &mut self.sinks {
            sink.record_page(page)?;
        }
        Ok(())
    }

    fn record_failure(&mut self, url: &str, error: &FetchError) -> OutputResult<()> {
        for sink in &mut self.sinks {
            sink.record_failure(url, error)?;
        }
        Ok(())
    }

    fn finish(&mut self, status: RunStatus) -> OutputResult<()> {
        // Every sink gets a chance to close; the first error is reported
        let mut first_error = None;
        for sink in &mut self.sinks {
            if let Err(e) = sink.finish(status) {
                tracing::warn!("Failed to finish page sink: {}", e);
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct RecordingSink {
        events: Arc<Mutex<Vec<String>>>,
        fail_finish: bool,
    }

    impl PageSink for RecordingSink {
        fn record_page(&mut self, page: &Page) -> OutputResult<()> {
            self.events.lock().unwrap().push(format!("page:{}", page.url));
            Ok(())
        }

        fn record_failure(&mut self, url: &str, _error: &FetchError) -> OutputResult<()> {
            self.events.lock().unwrap().push(format!("failure:{}", url));
            Ok(())
        }

        fn finish(&mut self, status: RunStatus) -> OutputResult<()> {
            self.events
                .lock()
                .unwrap()
                .push(format!("finish:{}", status.to_db_string()));
            if self.fail_finish {
                Err(OutputError::Write("disk full".to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn test_multi_sink_fans_out() {
        let first = RecordingSink::default();
        let second = RecordingSink::default();

        let mut multi = MultiPageSink::new();
        multi.push(Box::new(first.clone()));
        multi.push(Box::new(second.clone()));
        assert_eq!(multi.len(), 2);

        multi.record_page(&Page::empty("https://cc.gatech.edu/")).unwrap();
        multi
            .record_failure(
                "https://cc.gatech.edu/gone",
                &FetchError::HttpStatus {
                    url: "https://cc.gatech.edu/gone".to_string(),
                    status: 404,
                },
            )
            .unwrap();
        multi.finish(RunStatus::Completed).unwrap();

        for sink in [first, second] {
            assert_eq!(
                *sink.events.lock().unwrap(),
                vec![
                    "page:https://cc.gatech.edu/",
                    "failure:https://cc.gatech.edu/gone",
                    "finish:completed"
                ]
            );
        }
    }

    #[test]
    fn test_multi_sink_finishes_all_on_error() {
        let failing = RecordingSink {
            fail_finish: true,
            ..RecordingSink::default()
        };
        let healthy = RecordingSink::default();

        let mut multi = MultiPageSink::new();
        multi.push(Box::new(failing));
        multi.push(Box::new(healthy.clone()));

        assert!(multi.finish(RunStatus::Interrupted).is_err());
        assert_eq!(*healthy.events.lock().unwrap(), vec!["finish:interrupted"]);
    }
}
