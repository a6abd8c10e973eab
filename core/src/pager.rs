use crate::{ContinuationToken, Error, ListSegment, RequestOptions, Result, ResultSegment, SegmentedLister};
use log::debug;
use std::time::Duration;
use tokio::time::Instant;

/// Pager drives a listing loop from the first page to the last one.
///
/// Pages are fetched strictly one after another. A failed page leaves the
/// pager untouched, calling [`Pager::next_page`] again retries the same page.
#[derive(Debug)]
pub struct Pager<L: ListSegment> {
    lister: SegmentedLister<L>,
    options: RequestOptions,
    state: PagerState,
    deadline: Option<Instant>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PagerState {
    Start,
    HasToken(ContinuationToken),
    Done,
}

impl<L: ListSegment> Pager<L> {
    /// Create a pager starting at the first page.
    pub fn new(lister: SegmentedLister<L>, options: RequestOptions) -> Self {
        Self {
            lister,
            options,
            state: PagerState::Start,
            deadline: None,
        }
    }

    /// Resume a listing from a token returned by an earlier page.
    pub fn resume(mut self, token: ContinuationToken) -> Self {
        self.state = PagerState::HasToken(token);
        self
    }

    /// Bound the total time spent in this loop, starting now.
    ///
    /// Once the deadline passed no further page is requested and
    /// [`ErrorKind::Timeout`](crate::ErrorKind::Timeout) is returned.
    pub fn with_deadline(mut self, total: Duration) -> Self {
        self.deadline = Some(Instant::now() + total);
        self
    }

    /// Token of the next page, `None` before the first page and after the last.
    pub fn token(&self) -> Option<&ContinuationToken> {
        match &self.state {
            PagerState::HasToken(token) => Some(token),
            _ => None,
        }
    }

    /// Check if the last page has been returned.
    pub fn is_done(&self) -> bool {
        self.state == PagerState::Done
    }

    /// Lift the location pin of the pending token.
    pub fn clear_target_location(&mut self) {
        if let PagerState::HasToken(token) = &mut self.state {
            token.clear_target_location();
        }
    }

    /// Fetch the next page, `Ok(None)` once the listing is complete.
    pub async fn next_page(&mut self) -> Result<Option<ResultSegment<L::Item>>> {
        let token = match &self.state {
            PagerState::Start => None,
            PagerState::HasToken(token) => Some(token),
            PagerState::Done => return Ok(None),
        };

        let mut options = self.lister.default_options().merge(&self.options);
        if let Some(deadline) = self.deadline {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(Error::timeout("listing exceeded its deadline")
                    .with_context("no further page was requested"));
            }
            options.maximum_execution_time = Some(
                options
                    .maximum_execution_time
                    .map_or(remaining, |v| v.min(remaining)),
            );
        }

        let segment = self.lister.next_segment(token, &options).await?;

        self.state = match segment.continuation_token() {
            Some(token) => PagerState::HasToken(token.clone()),
            None => {
                debug!("listing completed");
                PagerState::Done
            }
        };

        Ok(Some(segment))
    }

    /// Fetch all remaining pages and return their items in order.
    pub async fn collect(mut self) -> Result<Vec<L::Item>> {
        let mut items = Vec::new();
        while let Some(segment) = self.next_page().await? {
            items.extend(segment);
        }
        Ok(items)
    }
}
