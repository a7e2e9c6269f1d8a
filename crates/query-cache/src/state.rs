//! Query State Snapshots

use std::fmt;
use std::rc::Rc;

/// Failure of a query fetch, carried as its display message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryError {
    message: String,
}

impl QueryError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for QueryError {}

/// Coarse status of a query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    /// No data and no error yet
    Pending,
    /// Last fetch failed
    Error,
    /// Data available
    Success,
}

/// Typed snapshot of one cache entry.
///
/// `data` is the most recent successfully fetched value. It survives later
/// failed fetches and is only replaced by a newer success.
#[derive(Debug)]
pub struct QueryState<T> {
    pub data: Option<Rc<T>>,
    pub error: Option<QueryError>,
    /// A fetch is in flight and there is no data to show yet
    pub is_loading: bool,
    /// A fetch is in flight
    pub is_fetching: bool,
    /// Marked by invalidation; cleared by the next successful fetch
    pub is_stale: bool,
    /// Number of successful fetches stored in this entry
    pub data_updates: u64,
}

impl<T> QueryState<T> {
    pub fn status(&self) -> QueryStatus {
        if self.error.is_some() {
            QueryStatus::Error
        } else if self.data.is_some() {
            QueryStatus::Success
        } else {
            QueryStatus::Pending
        }
    }
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            is_loading: false,
            is_fetching: false,
            is_stale: false,
            data_updates: 0,
        }
    }
}

impl<T> Clone for QueryState<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            error: self.error.clone(),
            is_loading: self.is_loading,
            is_fetching: self.is_fetching,
            is_stale: self.is_stale,
            data_updates: self.data_updates,
        }
    }
}
