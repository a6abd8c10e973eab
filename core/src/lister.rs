use crate::location::resolve_location;
use crate::{
    Context, ContinuationToken, Error, ListSegment, Pager, RequestOptions, Result, ResultSegment,
};
use log::debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// SegmentedLister fetches a listing one page at a time.
///
/// There is a single paging algorithm, [`SegmentedLister::next_segment`].
/// The other calling conventions (cancellable, blocking, begin/end) only
/// differ in how the caller observes completion.
#[derive(Debug)]
pub struct SegmentedLister<L: ListSegment> {
    ctx: Context,
    inner: Arc<L>,
    defaults: RequestOptions,
}

impl<L: ListSegment> Clone for SegmentedLister<L> {
    fn clone(&self) -> Self {
        Self {
            ctx: self.ctx.clone(),
            inner: self.inner.clone(),
            defaults: self.defaults,
        }
    }
}

impl<L: ListSegment> SegmentedLister<L> {
    /// Create a new lister.
    pub fn new(ctx: Context, inner: L) -> Self {
        Self {
            ctx,
            inner: Arc::new(inner),
            defaults: RequestOptions::default(),
        }
    }

    /// Set the options every call is merged with.
    pub fn with_default_options(mut self, options: RequestOptions) -> Self {
        self.defaults = options;
        self
    }

    /// The options every call is merged with.
    pub fn default_options(&self) -> &RequestOptions {
        &self.defaults
    }

    /// The service specific lister.
    pub fn inner(&self) -> &L {
        &self.inner
    }

    /// Fetch the page `token` points to, or the first page if `token` is `None`.
    ///
    /// The returned token is pinned to the location that served the page.
    pub async fn next_segment(
        &self,
        token: Option<&ContinuationToken>,
        options: &RequestOptions,
    ) -> Result<ResultSegment<L::Item>> {
        let options = self.defaults.merge(options);

        match options.maximum_execution_time {
            Some(budget) => tokio::time::timeout(budget, self.fetch(token, &options))
                .await
                .map_err(|e| {
                    Error::timeout("listing call exceeded its maximum execution time")
                        .with_source(e)
                        .with_context(format!("maximum_execution_time: {budget:?}"))
                })?,
            None => self.fetch(token, &options).await,
        }
    }

    async fn fetch(
        &self,
        token: Option<&ContinuationToken>,
        options: &RequestOptions,
    ) -> Result<ResultSegment<L::Item>> {
        let location = resolve_location(
            options.location_mode(),
            token,
            self.inner.secondary_available(),
        )?;
        let marker = token.and_then(|t| t.next_marker());

        let page = self
            .inner
            .list_segment(&self.ctx, location, marker, options)
            .await?;

        if let Some(max) = self.inner.max_results() {
            if page.items.len() > max as usize {
                return Err(Error::unexpected(
                    "service returned more items than the requested page size",
                )
                .with_context(format!("max_results: {max}"))
                .with_context(format!("returned: {}", page.items.len())));
            }
        }

        let next = page
            .next_marker
            .filter(|v| !v.is_empty())
            .map(|v| ContinuationToken::new(Some(v), Some(location)));

        debug!(
            "listed {} items from {location}, has next page: {}",
            page.items.len(),
            next.is_some()
        );

        Ok(ResultSegment::new(page.items, next))
    }

    /// Like [`SegmentedLister::next_segment`], but stops waiting as soon as
    /// `cancel` fires.
    ///
    /// A cancelled call returns [`ErrorKind::Cancelled`](crate::ErrorKind::Cancelled).
    /// Tokens returned by earlier pages stay valid.
    pub async fn next_segment_with_cancellation(
        &self,
        token: Option<&ContinuationToken>,
        options: &RequestOptions,
        cancel: &CancellationToken,
    ) -> Result<ResultSegment<L::Item>> {
        if cancel.is_cancelled() {
            return Err(Error::cancelled("listing cancelled before it started"));
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(Error::cancelled("listing cancelled while waiting for the page")),
            res = self.next_segment(token, options) => res,
        }
    }

    /// Blocking version of [`SegmentedLister::next_segment`].
    ///
    /// The call runs on a private current thread runtime, so it must not be
    /// used from inside an async context.
    pub fn blocking_next_segment(
        &self,
        token: Option<&ContinuationToken>,
        options: &RequestOptions,
    ) -> Result<ResultSegment<L::Item>> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::unexpected("failed to build runtime").with_source(e))?;

        rt.block_on(self.next_segment(token, options))
    }

    /// Start fetching a page and return immediately.
    ///
    /// `callback` is invoked exactly once, after the page completed
    /// successfully or not, or after [`PendingSegment::cancel`] stopped it.
    /// The result is retrieved with [`PendingSegment::end`] or
    /// [`PendingSegment::blocking_end`]. Must be called within a Tokio runtime.
    pub fn begin_next_segment<F>(
        &self,
        token: Option<ContinuationToken>,
        options: RequestOptions,
        callback: F,
    ) -> Result<PendingSegment<L::Item>>
    where
        F: FnOnce() + Send + 'static,
    {
        let handle = tokio::runtime::Handle::try_current().map_err(|e| {
            Error::invalid_operation("begin_next_segment must be called within a Tokio runtime")
                .with_source(e)
        })?;

        let (tx, rx) = oneshot::channel();
        let completed = Arc::new(AtomicBool::new(false));

        let this = self.clone();
        // Owned by the task future so an aborted task still signals completion.
        let completion = Completion {
            flag: completed.clone(),
            callback: Some(callback),
        };
        let task = handle.spawn(async move {
            let _completion = completion;
            let result = this.next_segment(token.as_ref(), &options).await;
            // The receiver may have been dropped, the result is not needed then.
            let _ = tx.send(result);
        });

        Ok(PendingSegment {
            rx,
            completed,
            cancelled: AtomicBool::new(false),
            task,
        })
    }

    /// Create a pager that walks the whole listing.
    pub fn pager(&self, options: RequestOptions) -> Pager<L> {
        Pager::new(self.clone(), options)
    }
}

/// Marks a begun page as completed and runs its callback exactly once, when
/// the task finishes or is aborted.
struct Completion<F: FnOnce()> {
    flag: Arc<AtomicBool>,
    callback: Option<F>,
}

impl<F: FnOnce()> Drop for Completion<F> {
    fn drop(&mut self) {
        self.flag.store(true, Ordering::Release);
        if let Some(callback) = self.callback.take() {
            callback();
        }
    }
}

/// PendingSegment is the handle of a page started by
/// [`SegmentedLister::begin_next_segment`].
#[derive(Debug)]
pub struct PendingSegment<T> {
    rx: oneshot::Receiver<Result<ResultSegment<T>>>,
    completed: Arc<AtomicBool>,
    cancelled: AtomicBool,
    task: JoinHandle<()>,
}

impl<T> PendingSegment<T> {
    /// Check if the page completed or its cancellation took effect.
    pub fn is_completed(&self) -> bool {
        self.completed.load(Ordering::Acquire)
    }

    /// Stop waiting for the page.
    ///
    /// A later `end` returns [`ErrorKind::Cancelled`](crate::ErrorKind::Cancelled)
    /// unless the page already completed. The callback still runs once.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        self.task.abort();
    }

    /// Wait for the page and return its result.
    pub async fn end(self) -> Result<ResultSegment<T>> {
        let cancelled = self.cancelled.load(Ordering::Acquire);
        let res = self.rx.await;
        Self::finish(res, cancelled)
    }

    /// Block the current thread until the page completed and return its result.
    ///
    /// Must not be called from inside an async context.
    pub fn blocking_end(self) -> Result<ResultSegment<T>> {
        let cancelled = self.cancelled.load(Ordering::Acquire);
        let res = self.rx.blocking_recv();
        Self::finish(res, cancelled)
    }

    fn finish(
        res: std::result::Result<Result<ResultSegment<T>>, oneshot::error::RecvError>,
        cancelled: bool,
    ) -> Result<ResultSegment<T>> {
        match res {
            Ok(res) => res,
            Err(_) if cancelled => Err(Error::cancelled("listing cancelled while waiting for the page")),
            Err(e) => Err(Error::unexpected("listing task stopped before completion").with_source(e)),
        }
    }
}
