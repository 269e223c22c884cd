//! Resource Collection
//!
//! A lazy, restartable view over a paged list endpoint. Configuring a
//! collection (`filter`, `limit`, `page_size`) returns a new value and never
//! touches the network; records are fetched one page at a time while a
//! stream from [`ResourceCollection::stream`] or [`ResourceCollection::pages`]
//! is being polled.

use super::instance::Instance;
use super::registry::InstanceBinding;
use super::transport::{ListRequest, Page, Query, Transport};
use crate::error::{Error, Result};
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Filterable, paginated collection of instances
#[derive(Clone)]
pub struct ResourceCollection {
    transport: Arc<dyn Transport>,
    binding: Arc<InstanceBinding>,
    query: Query,
    page_size: u32,
    limit: Option<u64>,
}

/// Accept only JSON integers greater than zero
fn positive_integer(value: Value, name: &'static str) -> Result<u64> {
    value
        .as_u64()
        .filter(|n| *n > 0)
        .ok_or(Error::InvalidParam { name })
}

impl ResourceCollection {
    /// Create a collection over `binding`'s list endpoint with an empty query
    pub fn new(transport: Arc<dyn Transport>, binding: Arc<InstanceBinding>) -> Self {
        let page_size = binding.page_size();
        Self {
            transport,
            binding,
            query: Query::new(),
            page_size,
            limit: None,
        }
    }

    /// Narrow the collection with equality filters
    ///
    /// Keys already present are overwritten. Fails when the binding restricts
    /// filter keys and one of them is not in its list.
    pub fn filter<I, K, V>(&self, criteria: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut next = self.clone();
        for (key, value) in criteria {
            let key = key.into();
            if !self.binding.accepts_filter(&key) {
                return Err(Error::UnrecognizedFilter {
                    key,
                    action: self.binding.list_action.clone(),
                });
            }
            next.query.insert(key, value.into());
        }
        Ok(next)
    }

    /// The un-narrowed view of the current query
    pub fn all(&self) -> Self {
        self.clone()
    }

    /// Yield at most `n` records in total
    pub fn limit(&self, n: impl Into<Value>) -> Result<Self> {
        let limit = positive_integer(n.into(), "limit")?;
        Ok(Self {
            limit: Some(limit),
            ..self.clone()
        })
    }

    /// Request `n` records per round trip
    pub fn page_size(&self, n: impl Into<Value>) -> Result<Self> {
        let page_size = positive_integer(n.into(), "page_size")?;
        let page_size =
            u32::try_from(page_size).map_err(|_| Error::InvalidParam { name: "page_size" })?;
        Ok(Self {
            page_size,
            ..self.clone()
        })
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn current_page_size(&self) -> u32 {
        self.page_size
    }

    pub fn current_limit(&self) -> Option<u64> {
        self.limit
    }

    pub fn binding(&self) -> &InstanceBinding {
        &self.binding
    }

    /// Fetch a single page without any pagination bookkeeping
    pub async fn fetch_page(&self, page_number: u32) -> Result<Page> {
        if page_number == 0 {
            return Err(Error::InvalidParam { name: "page_number" });
        }

        let request = ListRequest {
            action: &self.binding.list_action,
            response_path: &self.binding.response_path,
            query: &self.query,
            page_number,
            page_size: self.page_size,
        };
        let page = self.transport.list(&request).await?;

        tracing::debug!(
            "{} page {} (size {}): {} records, total {:?}",
            self.binding.list_action,
            page_number,
            self.page_size,
            page.records.len(),
            page.total_count
        );

        Ok(page)
    }

    /// Lazy sequence of pages, one round trip per element
    ///
    /// The last page is truncated when `limit` is reached. Empty pages are
    /// never yielded. Each call starts again from page 1.
    pub fn pages(&self) -> BoxStream<'static, Result<Vec<Instance>>> {
        let cursor = PageCursor::new(self.clone());
        stream::try_unfold(cursor, |mut cursor| async move {
            let batch = cursor.next_batch().await?;
            Ok::<_, Error>(batch.map(|batch| (batch, cursor)))
        })
        .boxed()
    }

    /// Lazy sequence of instances across all pages
    pub fn stream(&self) -> BoxStream<'static, Result<Instance>> {
        self.pages()
            .map_ok(|batch| stream::iter(batch.into_iter().map(Ok::<Instance, Error>)))
            .try_flatten()
            .boxed()
    }

    /// Drain [`ResourceCollection::stream`] into a vector
    pub async fn fetch_all(&self) -> Result<Vec<Instance>> {
        self.stream().try_collect().await
    }

    /// The instance whose identifier is exactly `id`, if the provider has it
    ///
    /// Records the provider returns for the id filter are checked one by one,
    /// so a filter the provider ignores cannot substitute another instance.
    pub async fn find_by_id(&self, id: &str) -> Result<Option<Instance>> {
        let mut candidates = self
            .filter([(self.binding.id_field.as_str(), id)])?
            .stream();
        while let Some(instance) = candidates.try_next().await? {
            if instance.id() == id {
                return Ok(Some(instance));
            }
            tracing::warn!(
                "{} for {}={} returned {}",
                self.binding.list_action,
                self.binding.id_field,
                id,
                instance.id()
            );
        }
        Ok(None)
    }

    fn wrap(&self, record: super::transport::Record) -> Result<Instance> {
        Instance::new(record, self.binding.clone(), self.transport.clone())
    }
}

impl fmt::Display for ResourceCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let query = serde_json::to_string(&self.query).unwrap_or_default();
        write!(
            f,
            "<ResourceCollection action={} query={} page_size={}",
            self.binding.list_action, query, self.page_size
        )?;
        match self.limit {
            Some(limit) => write!(f, " limit={}>", limit),
            None => f.write_str(" limit=None>"),
        }
    }
}

impl fmt::Debug for ResourceCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Per-iteration pagination state
struct PageCursor {
    collection: ResourceCollection,
    next_page: u32,
    fetched: u64,
    yielded: u64,
    done: bool,
}

impl PageCursor {
    fn new(collection: ResourceCollection) -> Self {
        Self {
            collection,
            next_page: 1,
            fetched: 0,
            yielded: 0,
            done: false,
        }
    }

    /// Fetch the next page, or `None` once the provider or the limit ends it
    async fn next_batch(&mut self) -> Result<Option<Vec<Instance>>> {
        if self.done {
            return Ok(None);
        }

        let remaining = self
            .collection
            .limit
            .map(|limit| limit.saturating_sub(self.yielded));
        if remaining == Some(0) {
            self.done = true;
            return Ok(None);
        }

        let page = self.collection.fetch_page(self.next_page).await?;
        let received = page.records.len() as u64;
        self.fetched += received;

        let short_page = received < u64::from(self.collection.page_size);
        let total_reached = page
            .total_count
            .is_some_and(|total| self.fetched >= total);

        let mut records = page.records;
        if let Some(remaining) = remaining {
            records.truncate(usize::try_from(remaining).unwrap_or(usize::MAX));
        }
        self.yielded += records.len() as u64;
        let limit_reached = self
            .collection
            .limit
            .is_some_and(|limit| self.yielded >= limit);

        match self.next_page.checked_add(1) {
            Some(next) => self.next_page = next,
            None => self.done = true,
        }
        if short_page || total_reached || limit_reached || records.is_empty() {
            self.done = true;
        }
        if records.is_empty() {
            return Ok(None);
        }

        let batch = records
            .into_iter()
            .map(|record| self.collection.wrap(record))
            .collect::<Result<Vec<_>>>()?;
        Ok(Some(batch))
    }
}
