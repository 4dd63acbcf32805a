//! Data sources and the generation-guarded load state machine.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::column::ColumnDefinition;
use crate::column::Order;
use crate::error::LoadError;
use crate::filter::FilterModel;

/// Parameters of one load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub offset: usize,
    pub limit: usize,
    pub order: Order,
    pub order_by: String,
    pub filter: FilterModel,
}

/// Page-supplied row loader.
///
/// Loads are never aborted. A load whose result arrives after a newer load
/// was issued is discarded by the table.
#[async_trait]
pub trait DataSource<T>: Send + Sync {
    async fn load(&self, request: LoadRequest) -> Result<Vec<T>, LoadError>;
}

/// [`DataSource`] backed by an async closure.
pub struct FnSource<F> {
    load: F,
}

/// Wraps an async closure as a [`DataSource`].
///
/// # Examples
///
/// ```ignore
/// let source = source_fn(move |request: LoadRequest| {
///     let client = client.clone();
///     async move { fetch_page(&client, request).await }
/// });
/// ```
pub fn source_fn<T, F, Fut>(load: F) -> FnSource<F>
where
    F: Fn(LoadRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Vec<T>, LoadError>> + Send,
{
    FnSource { load }
}

#[async_trait]
impl<T, F, Fut> DataSource<T> for FnSource<F>
where
    T: Send + 'static,
    F: Fn(LoadRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Vec<T>, LoadError>> + Send,
{
    async fn load(&self, request: LoadRequest) -> Result<Vec<T>, LoadError> {
        (self.load)(request).await
    }
}

type Predicate<T> = Arc<dyn Fn(&T, &FilterModel) -> bool + Send + Sync>;

/// In-memory [`DataSource`] that filters, sorts and windows a fixed row set
/// using the column comparators.
pub struct MemorySource<T> {
    rows: Vec<T>,
    columns: ColumnDefinition<T>,
    predicate: Predicate<T>,
}

impl<T: Clone> MemorySource<T> {
    pub fn new(rows: Vec<T>, columns: ColumnDefinition<T>) -> Self {
        Self {
            rows,
            columns,
            predicate: Arc::new(|_, _| true),
        }
    }

    /// Sets how a filter model selects rows.
    pub fn with_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&T, &FilterModel) -> bool + Send + Sync + 'static,
    {
        self.predicate = Arc::new(predicate);
        self
    }

    /// Number of rows matching `filter`, ignoring pagination.
    pub fn matching_count(&self, filter: &FilterModel) -> usize {
        self.rows
            .iter()
            .filter(|row| (self.predicate)(row, filter))
            .count()
    }
}

#[async_trait]
impl<T> DataSource<T> for MemorySource<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn load(&self, request: LoadRequest) -> Result<Vec<T>, LoadError> {
        let mut rows: Vec<T> = self
            .rows
            .iter()
            .filter(|row| (self.predicate)(row, &request.filter))
            .cloned()
            .collect();
        self.columns
            .sort_rows(&request.order_by, request.order, &mut rows)
            .map_err(|e| LoadError::new(e.to_string()))?;
        Ok(rows
            .into_iter()
            .skip(request.offset)
            .take(request.limit)
            .collect())
    }
}

/// Number of an issued load. Later loads have larger numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(u64);

impl Generation {
    fn next(self) -> Self {
        Generation(self.0 + 1)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Outcome of handing a load result to [`LoaderState::complete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// A newer load was issued; the result was dropped.
    Stale,
}

/// Rows, loading flag and error of a table, updated by load results.
///
/// Only the result of the most recently issued load is applied ("last
/// issued wins"), whatever order results arrive in.
#[derive(Debug, Clone)]
pub struct LoaderState<T> {
    latest: Generation,
    rows: Vec<T>,
    is_loading: bool,
    error: Option<LoadError>,
    last_request: Option<LoadRequest>,
}

impl<T> LoaderState<T> {
    pub fn new() -> Self {
        Self {
            latest: Generation::default(),
            rows: Vec::new(),
            is_loading: false,
            error: None,
            last_request: None,
        }
    }

    /// Registers a new load and returns its number.
    pub fn issue(&mut self, request: LoadRequest) -> Generation {
        self.latest = self.latest.next();
        self.is_loading = true;
        self.last_request = Some(request);
        self.latest
    }

    /// Applies a load result if it belongs to the latest load.
    ///
    /// A failed load keeps the previous rows and exposes the error.
    pub fn complete(
        &mut self,
        generation: Generation,
        result: Result<Vec<T>, LoadError>,
    ) -> Completion {
        if generation != self.latest {
            log::debug!(
                "Discarding stale load {} (latest is {})",
                generation,
                self.latest
            );
            return Completion::Stale;
        }

        self.is_loading = false;
        match result {
            Ok(rows) => {
                self.rows = rows;
                self.error = None;
            }
            Err(e) => {
                log::warn!("Load {} failed: {}", generation, e);
                self.error = Some(e);
            }
        }
        Completion::Applied
    }

    /// Makes every outstanding load stale.
    pub fn invalidate(&mut self) {
        self.latest = self.latest.next();
        self.is_loading = false;
    }

    pub fn latest(&self) -> Generation {
        self.latest
    }

    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&LoadError> {
        self.error.as_ref()
    }

    pub fn last_request(&self) -> Option<&LoadRequest> {
        self.last_request.as_ref()
    }
}

impl<T> Default for LoaderState<T> {
    fn default() -> Self {
        Self::new()
    }
}
