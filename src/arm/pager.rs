//! Lazy listing over Resource Manager collections
//!
//! Single-page and `nextLink`-paginated listings are exposed as the same
//! item stream. Pages are requested only as the consumer pulls items, so a
//! scan that stops early never fetches the remaining pages. A stream is
//! finite and cannot be rewound; list again to start over.

use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use tracing::{debug, warn};

use super::client::ManagementClient;
use super::models::Page;
use crate::error::{AzResolveError, Result};

/// How a listing endpoint delivers its results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paging {
    /// Only the first response is read; any `nextLink` is ignored
    SinglePage,
    /// `nextLink` is followed until the provider stops returning one
    FollowNextLink,
}

/// Stream every item of the listing at `url`.
///
/// A `nextLink` that was already fetched ends the listing, so a provider
/// that keeps handing out the same link cannot loop the stream forever.
pub fn list_items<'a, T>(
    client: &'a ManagementClient,
    url: String,
    paging: Paging,
) -> BoxStream<'a, Result<T>>
where
    T: DeserializeOwned + Send + 'a,
{
    let start = (Some(url), HashSet::new());

    stream::try_unfold(start, move |(next, mut visited)| async move {
        let Some(url) = next else {
            return Ok(None);
        };

        let page: Page<T> = client.get_json(&url).await?;
        visited.insert(url);

        let next = match paging {
            Paging::SinglePage => None,
            Paging::FollowNextLink => page.next_link.filter(|link| !link.is_empty()),
        };
        let next = match next {
            Some(link) if visited.contains(&link) => {
                warn!("Stopping listing, nextLink repeats an earlier page");
                None
            }
            other => other,
        };
        debug!(
            "Fetched page with {} item(s), more pages: {}",
            page.value.len(),
            next.is_some()
        );

        Ok::<_, AzResolveError>(Some((page.value, (next, visited))))
    })
    .map_ok(|items| stream::iter(items.into_iter().map(Ok::<T, AzResolveError>)))
    .try_flatten()
    .boxed()
}
