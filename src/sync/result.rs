// Result stream protocol.
// Three-state emissions and the cache-then-network driver every query runs on.

use std::future::Future;

use futures::StreamExt;
use futures::stream::{self, BoxStream};
use tracing::warn;

use crate::error::FetchError;

use super::classify::Query;

/// One emission of a query stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultState<T> {
    /// Always the first emission.
    Loading,
    /// Data to show; interim values may come from a stale cache.
    Success(T),
    /// Terminal failure with the best data known before the attempt.
    Error {
        message: String,
        fallback: Option<T>,
    },
}

impl<T> ResultState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, ResultState::Loading)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ResultState::Error { .. })
    }

    /// Payload of a success, or the fallback of an error.
    pub fn data(&self) -> Option<&T> {
        match self {
            ResultState::Loading => None,
            ResultState::Success(data) => Some(data),
            ResultState::Error { fallback, .. } => fallback.as_ref(),
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            ResultState::Error { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// Stream of states for one query invocation. Dropping it cancels the query.
pub type ResultStream<T> = BoxStream<'static, ResultState<T>>;

/// Outcome of consulting the local store before any network access.
pub(crate) enum CacheRead<T> {
    /// Answer with this and finish; the network is not consulted.
    Settled(T),
    /// Emit `shown` now if present, then refetch; `fallback` rides on a failure.
    Revalidate {
        shown: Option<T>,
        fallback: Option<T>,
    },
}

enum Phase<R, F, T> {
    Start { read: R, fetch: F },
    Read { read: R, fetch: F },
    Fetch { fetch: F, fallback: Option<T> },
    Done,
}

/// Build a query stream: `Loading`, the cache view, then the refetched view or an error.
///
/// `fetch` resolving to `Ok(None)` ends the stream without a terminal state
/// (nothing to show after the refresh).
pub(crate) fn revalidate<T, R, F, Fut>(query: Query, read: R, fetch: F) -> ResultStream<T>
where
    T: Send + 'static,
    R: Future<Output = CacheRead<T>> + Send + 'static,
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Option<T>, FetchError>> + Send + 'static,
{
    stream::unfold(Phase::Start { read, fetch }, move |phase| async move {
        match phase {
            Phase::Start { read, fetch } => {
                Some((ResultState::Loading, Phase::Read { read, fetch }))
            }
            Phase::Read { read, fetch } => match read.await {
                CacheRead::Settled(data) => Some((ResultState::Success(data), Phase::Done)),
                CacheRead::Revalidate {
                    shown: Some(data),
                    fallback,
                } => Some((ResultState::Success(data), Phase::Fetch { fetch, fallback })),
                CacheRead::Revalidate {
                    shown: None,
                    fallback,
                } => settle(query, fetch, fallback).await,
            },
            Phase::Fetch { fetch, fallback } => settle(query, fetch, fallback).await,
            Phase::Done => None,
        }
    })
    .boxed()
}

async fn settle<T, R, F, Fut>(
    query: Query,
    fetch: F,
    fallback: Option<T>,
) -> Option<(ResultState<T>, Phase<R, F, T>)>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Option<T>, FetchError>>,
{
    match fetch().await {
        Ok(Some(data)) => Some((ResultState::Success(data), Phase::Done)),
        Ok(None) => None,
        Err(err) => {
            let message = query.describe(&err);
            warn!(query = query.name(), error = %err, "Query failed, serving fallback");
            Some((ResultState::Error { message, fallback }, Phase::Done))
        }
    }
}
