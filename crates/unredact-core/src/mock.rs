//! Mock PDF backend for testing.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use crate::backend::{BackendError, PdfBackend};

/// A configurable mock response for [`MockBackend`].
#[derive(Clone, Debug)]
pub enum MockResponse {
    /// Return these pages (untrimmed, as given).
    Pages(Vec<String>),
    /// Fail to open with this message.
    Error(String),
    /// Panic inside the extraction call.
    Panic,
}

/// A hand-rolled mock implementing [`PdfBackend`] for tests.
///
/// Responses are keyed by file name (`a.pdf`), so the same mock works
/// regardless of where the scratch directory lives. Unknown files fail to
/// open. Every call is recorded and can be read back with
/// [`opened()`](MockBackend::opened).
pub struct MockBackend {
    responses: HashMap<String, MockResponse>,
    delay: Option<Duration>,
    opened: Mutex<Vec<PathBuf>>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            delay: None,
            opened: Mutex::new(Vec::new()),
        }
    }

    pub fn with_pages(mut self, file_name: &str, pages: &[&str]) -> Self {
        self.responses.insert(
            file_name.to_string(),
            MockResponse::Pages(pages.iter().map(|p| p.to_string()).collect()),
        );
        self
    }

    pub fn with_error(mut self, file_name: &str, message: &str) -> Self {
        self.responses
            .insert(file_name.to_string(), MockResponse::Error(message.to_string()));
        self
    }

    pub fn with_panic(mut self, file_name: &str) -> Self {
        self.responses
            .insert(file_name.to_string(), MockResponse::Panic);
        self
    }

    /// Sleep this long inside every call (blocking, like a real extraction).
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Paths passed to `extract_pages`, in call order.
    pub fn opened(&self) -> Vec<PathBuf> {
        self.opened.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl PdfBackend for MockBackend {
    fn extract_pages(&self, path: &Path) -> Result<Vec<String>, BackendError> {
        if let Ok(mut opened) = self.opened.lock() {
            opened.push(path.to_path_buf());
        }
        if let Some(d) = self.delay {
            std::thread::sleep(d);
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        match self.responses.get(&name) {
            Some(MockResponse::Pages(pages)) => Ok(pages.clone()),
            Some(MockResponse::Error(msg)) => Err(BackendError::OpenError(msg.clone())),
            Some(MockResponse::Panic) => panic!("mock backend panic for {name}"),
            None => Err(BackendError::OpenError(format!("no mock response for {name}"))),
        }
    }
}
