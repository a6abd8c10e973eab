use crate::ContinuationToken;

/// ResultSegment is one page of a segmented listing.
///
/// An empty `results` does not mean the listing is complete, the server may
/// return an empty page and still hand out a continuation token. Only a
/// `None` token marks the end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultSegment<T> {
    results: Vec<T>,
    continuation_token: Option<ContinuationToken>,
}

impl<T> ResultSegment<T> {
    /// Create a new segment.
    pub fn new(results: Vec<T>, continuation_token: Option<ContinuationToken>) -> Self {
        Self {
            results,
            continuation_token,
        }
    }

    /// Items of this page in server order.
    pub fn results(&self) -> &[T] {
        &self.results
    }

    /// Token of the next page, `None` if this was the last one.
    pub fn continuation_token(&self) -> Option<&ContinuationToken> {
        self.continuation_token.as_ref()
    }

    /// Check if this is the last page of the listing.
    pub fn is_last(&self) -> bool {
        self.continuation_token.is_none()
    }

    /// Split the segment into its items and token.
    pub fn into_parts(self) -> (Vec<T>, Option<ContinuationToken>) {
        (self.results, self.continuation_token)
    }
}

impl<T> IntoIterator for ResultSegment<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}
