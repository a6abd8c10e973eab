use crate::LocationMode;
use std::time::Duration;

/// RequestOptions carries per request settings of a listing call.
///
/// Every field is optional so that a client's defaults can be merged with the
/// overrides of a single call, see [`RequestOptions::merge`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Which endpoints the request may be sent to.
    pub location_mode: Option<LocationMode>,
    /// Timeout the server applies to one request, sent as the `timeout` query.
    pub server_timeout: Option<Duration>,
    /// Client side budget for a whole call, including waiting for the response.
    pub maximum_execution_time: Option<Duration>,
}

impl RequestOptions {
    /// Create empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the location mode.
    pub fn with_location_mode(mut self, mode: LocationMode) -> Self {
        self.location_mode = Some(mode);
        self
    }

    /// Set the server side timeout.
    pub fn with_server_timeout(mut self, timeout: Duration) -> Self {
        self.server_timeout = Some(timeout);
        self
    }

    /// Set the client side execution budget.
    pub fn with_maximum_execution_time(mut self, budget: Duration) -> Self {
        self.maximum_execution_time = Some(budget);
        self
    }

    /// Merge `overrides` on top of `self`, fields set in `overrides` win.
    ///
    /// Neither input is modified, the merged value is computed once per call
    /// and passed down by reference.
    pub fn merge(&self, overrides: &RequestOptions) -> RequestOptions {
        RequestOptions {
            location_mode: overrides.location_mode.or(self.location_mode),
            server_timeout: overrides.server_timeout.or(self.server_timeout),
            maximum_execution_time: overrides
                .maximum_execution_time
                .or(self.maximum_execution_time),
        }
    }

    /// The location mode to use, defaults to [`LocationMode::PrimaryOnly`].
    pub fn location_mode(&self) -> LocationMode {
        self.location_mode.unwrap_or_default()
    }
}
