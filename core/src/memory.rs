//! In memory listing used by the unit tests of this crate.

use crate::{Context, Error, ListSegment, Page, RequestOptions, Result, StorageLocation};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Default)]
pub(crate) struct MemoryListing {
    pub items: Vec<String>,
    pub page_size: Option<usize>,
    pub secondary: bool,
    pub delay: Option<Duration>,
    /// Return this many empty pages before the first real one.
    pub empty_pages: usize,
    /// Fail this many calls before answering.
    pub failures: Arc<AtomicUsize>,
    /// Return one more item than asked for.
    pub oversized: bool,
    pub calls: Arc<AtomicUsize>,
    pub locations: Arc<Mutex<Vec<StorageLocation>>>,
}

impl MemoryListing {
    pub fn new(n: usize) -> Self {
        Self {
            items: (0..n).map(|i| format!("item{i:03}")).collect(),
            ..Default::default()
        }
    }

    pub fn with_page_size(mut self, size: usize) -> Self {
        self.page_size = Some(size);
        self
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

#[async_trait::async_trait]
impl ListSegment for MemoryListing {
    type Item = String;

    fn secondary_available(&self) -> bool {
        self.secondary
    }

    fn max_results(&self) -> Option<u32> {
        self.page_size.map(|v| v as u32)
    }

    async fn list_segment(
        &self,
        _: &Context,
        location: StorageLocation,
        marker: Option<&str>,
        _: &RequestOptions,
    ) -> Result<Page<String>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.locations.lock().unwrap().push(location);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |v| v.checked_sub(1))
            .is_ok()
        {
            return Err(Error::unexpected("connection reset by peer"));
        }

        if call < self.empty_pages {
            return Ok(Page {
                items: vec![],
                next_marker: Some(marker.unwrap_or("0").to_string()),
            });
        }

        let start: usize = match marker {
            Some(v) => v.parse().map_err(|e| Error::unexpected("bad marker").with_source(e))?,
            None => 0,
        };
        let mut end = self
            .page_size
            .map_or(self.items.len(), |size| (start + size).min(self.items.len()));
        if self.oversized {
            end = (end + 1).min(self.items.len());
        }

        Ok(Page {
            items: self.items[start..end].to_vec(),
            next_marker: (end < self.items.len()).then(|| end.to_string()),
        })
    }
}
