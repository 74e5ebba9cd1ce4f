use image_filter::{ErrorKind, ErrorSink};
use std::sync::Mutex;

/// Presents pipeline failures in the log and remembers the last one.
#[derive(Debug, Default)]
pub struct LogErrorSink {
    reports: Mutex<Vec<(ErrorKind, String)>>,
}

impl LogErrorSink {
    pub fn count(&self) -> usize {
        self.reports.lock().unwrap().len()
    }

    pub fn last(&self) -> Option<(ErrorKind, String)> {
        self.reports.lock().unwrap().last().cloned()
    }
}

impl ErrorSink for LogErrorSink {
    fn report(&self, kind: ErrorKind, message: &str) {
        log::warn!("[{kind}] {message}");
        self.reports
            .lock()
            .unwrap()
            .push((kind, message.to_string()));
    }
}
