//! Lazy traversal over paginated endpoints.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use crate::api_call::ApiCall;
use crate::clients::HttpCallContext;
use crate::config::GlobalConfiguration;
use crate::error::{ApiError, Result};
use crate::pagination::strategy::{PageState, PaginationStrategy};
use crate::pagination::PagedResponse;
use crate::request::RequestBuilder;

/// Extracts the items of one page from its deserialized body.
pub type ItemsConverter<T, I> = Arc<dyn Fn(&T) -> Option<Vec<I>> + Send + Sync>;

/// Turns a fetched page, with its strategy metadata, into a caller-defined page type.
pub type PageWrapper<T, I, W> = Arc<dyn Fn(PagedResponse<T, I>) -> W + Send + Sync>;

/// Copies `configuration` with a private call context that still forwards
/// to the caller's callback.
fn isolate(configuration: &GlobalConfiguration) -> (Arc<HttpCallContext>, Arc<GlobalConfiguration>) {
    let call_context = Arc::new(HttpCallContext::wrapping(
        configuration.client_configuration().http_callback().cloned(),
    ));
    let isolated = configuration.clone_with_http_callback(call_context.clone());
    (call_context, Arc::new(isolated))
}

/// A paginated endpoint, iterated item by item.
///
/// Pages are fetched lazily and strictly in sequence. The first strategy
/// that proves applicable after a successful fetch is locked in for the rest
/// of the traversal.
///
/// Iterating yields `Result<I>`; a failed fetch yields its error once and
/// ends the traversal. [`Clone`] restarts from the initial request.
///
/// # Example
///
/// ```rust,no_run
/// use apimatic_core::pagination::PaginationStrategy;
/// use apimatic_core::ApiCall;
/// # fn call() -> ApiCall<serde_json::Value> { unimplemented!() }
///
/// let items = call().paginate(
///     |body: &serde_json::Value| body["data"].as_array().cloned(),
///     vec![PaginationStrategy::cursor("$response.body#/next", "$request.query#/cursor")?],
/// )?;
///
/// for item in items.clone() {
///     println!("{}", item?);
/// }
/// for page in items.pages() {
///     println!("{:?}", page?.cursor());
/// }
/// # Ok::<(), apimatic_core::ApiError>(())
/// ```
pub struct PaginatedData<T, I> {
    configuration: Arc<GlobalConfiguration>,
    api_call: ApiCall<T>,
    initial_request_builder: RequestBuilder,
    request_builder: RequestBuilder,
    converter: ItemsConverter<T, I>,
    initial_strategies: Vec<PaginationStrategy>,
    strategies: Vec<PaginationStrategy>,
    locked: Option<usize>,
    call_context: Arc<HttpCallContext>,
    last_page: Option<PageState>,
    buffer: VecDeque<I>,
    finished: bool,
}

impl<T, I> PaginatedData<T, I> {
    /// Starts a traversal of `api_call`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidArgument`] if `strategies` is empty.
    pub fn new(
        api_call: ApiCall<T>,
        converter: ItemsConverter<T, I>,
        strategies: Vec<PaginationStrategy>,
    ) -> Result<Self> {
        if strategies.is_empty() {
            return Err(ApiError::invalid_argument(
                "At least one pagination strategy is required.",
            ));
        }

        let configuration = Arc::clone(api_call.global_configuration());
        let initial_request_builder = api_call.request_builder().clone();
        let (call_context, isolated) = isolate(&configuration);

        Ok(Self {
            api_call: api_call.clone_with(Some(isolated), None),
            configuration,
            request_builder: initial_request_builder.clone(),
            initial_request_builder,
            converter,
            strategies: strategies.clone(),
            initial_strategies: strategies,
            locked: None,
            call_context,
            last_page: None,
            buffer: VecDeque::new(),
            finished: false,
        })
    }

    /// Returns the strategy locked in for this traversal, if any.
    #[must_use]
    pub fn locked_strategy(&self) -> Option<&PaginationStrategy> {
        self.locked.map(|index| &self.strategies[index])
    }

    /// Fetches the next page.
    ///
    /// Returns `Ok(None)` once no strategy can produce another request or a
    /// page converts to no items.
    ///
    /// # Errors
    ///
    /// Returns any error raised while executing the page request.
    pub fn fetch_next_page(&mut self) -> Result<Option<PagedResponse<T, I>>> {
        if self.finished {
            return Ok(None);
        }

        let candidates: Vec<usize> = match self.locked {
            Some(index) => vec![index],
            None => (0..self.strategies.len()).collect(),
        };
        let selected = candidates.into_iter().find_map(|index| {
            self.strategies[index]
                .apply(&self.request_builder, self.last_page.as_ref())
                .map(|builder| (index, builder))
        });
        let Some((index, builder)) = selected else {
            self.finished = true;
            return Ok(None);
        };

        let value = match self.api_call.clone_with(None, Some(builder.clone())).execute() {
            Ok(value) => value,
            Err(error) => {
                self.finished = true;
                return Err(error);
            }
        };

        let items = value
            .data()
            .and_then(|data| (self.converter)(data))
            .unwrap_or_default();
        self.request_builder = builder;
        self.last_page = self.call_context.response().map(|response| PageState {
            response,
            item_count: items.len(),
        });
        if self.last_page.is_none() {
            self.finished = true;
        }

        if self.locked.is_none() {
            if let Some(last) = &self.last_page {
                self.locked = self
                    .strategies
                    .iter()
                    .position(|strategy| strategy.is_applicable(Some(&last.response)));
                if let Some(locked) = self.locked {
                    tracing::debug!(strategy = ?self.strategies[locked], "Pagination strategy locked");
                }
            }
        }

        if items.is_empty() {
            self.finished = true;
            return Ok(None);
        }

        let meta = self.strategies[index].meta();
        Ok(Some(PagedResponse::new(value, items, meta)))
    }

    /// Returns a fresh traversal yielding whole pages.
    #[must_use]
    pub fn pages(&self) -> Pages<T, I> {
        Pages { data: self.clone() }
    }

    /// Consumes this traversal and yields its remaining pages.
    #[must_use]
    pub fn into_pages(self) -> Pages<T, I> {
        Pages { data: self }
    }

    /// Returns a fresh traversal yielding pages passed through `wrapper`.
    ///
    /// `wrapper` receives each [`PagedResponse`], whose
    /// [`meta`](PagedResponse::meta) carries the cursor, offset, page number
    /// or next link used to fetch it.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use apimatic_core::pagination::{PageMeta, PaginatedData};
    /// # fn data() -> PaginatedData<serde_json::Value, serde_json::Value> { unimplemented!() }
    ///
    /// let numbers = data().pages_with(|page| {
    ///     let number = match page.meta() {
    ///         PageMeta::Page { page_number } => *page_number,
    ///         _ => 0,
    ///     };
    ///     (number, page.into_items())
    /// });
    /// for page in numbers {
    ///     let (number, items) = page?;
    ///     println!("page {number}: {} items", items.len());
    /// }
    /// # Ok::<(), apimatic_core::ApiError>(())
    /// ```
    #[must_use]
    pub fn pages_with<W, F>(&self, wrapper: F) -> WrappedPages<T, I, W>
    where
        F: Fn(PagedResponse<T, I>) -> W + Send + Sync + 'static,
    {
        WrappedPages {
            pages: self.pages(),
            wrapper: Arc::new(wrapper),
        }
    }

    /// Consumes this traversal and yields its remaining pages through `wrapper`.
    #[must_use]
    pub fn into_pages_with<W>(self, wrapper: PageWrapper<T, I, W>) -> WrappedPages<T, I, W> {
        WrappedPages {
            pages: self.into_pages(),
            wrapper,
        }
    }

    /// Returns a fresh traversal yielding items.
    #[must_use]
    pub fn items(&self) -> Self {
        self.clone()
    }
}

impl<T, I> Clone for PaginatedData<T, I> {
    fn clone(&self) -> Self {
        let (call_context, isolated) = isolate(&self.configuration);

        Self {
            configuration: Arc::clone(&self.configuration),
            api_call: self
                .api_call
                .clone_with(Some(isolated), Some(self.initial_request_builder.clone())),
            initial_request_builder: self.initial_request_builder.clone(),
            request_builder: self.initial_request_builder.clone(),
            converter: Arc::clone(&self.converter),
            initial_strategies: self.initial_strategies.clone(),
            strategies: self.initial_strategies.clone(),
            locked: None,
            call_context,
            last_page: None,
            buffer: VecDeque::new(),
            finished: false,
        }
    }
}

impl<T, I> fmt::Debug for PaginatedData<T, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaginatedData")
            .field("request_builder", &self.request_builder)
            .field("strategies", &self.strategies)
            .field("locked", &self.locked)
            .field("buffered", &self.buffer.len())
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

impl<T, I> Iterator for PaginatedData<T, I> {
    type Item = Result<I>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(item) = self.buffer.pop_front() {
            return Some(Ok(item));
        }
        match self.fetch_next_page() {
            Ok(Some(page)) => {
                self.buffer.extend(page.into_items());
                self.buffer.pop_front().map(Ok)
            }
            Ok(None) => None,
            Err(error) => Some(Err(error)),
        }
    }
}

/// Iterator over the pages of a [`PaginatedData`].
pub struct Pages<T, I> {
    data: PaginatedData<T, I>,
}

impl<T, I> fmt::Debug for Pages<T, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pages").field("data", &self.data).finish()
    }
}

impl<T, I> Iterator for Pages<T, I> {
    type Item = Result<PagedResponse<T, I>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.data.fetch_next_page().transpose()
    }
}

/// Iterator over the pages of a [`PaginatedData`], each passed through a
/// [`PageWrapper`].
pub struct WrappedPages<T, I, W> {
    pages: Pages<T, I>,
    wrapper: PageWrapper<T, I, W>,
}

impl<T, I, W> fmt::Debug for WrappedPages<T, I, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WrappedPages")
            .field("pages", &self.pages)
            .finish_non_exhaustive()
    }
}

impl<T, I, W> Iterator for WrappedPages<T, I, W> {
    type Item = Result<W>;

    fn next(&mut self) -> Option<Self::Item> {
        let page = self.pages.next()?;
        Some(page.map(|page| (self.wrapper)(page)))
    }
}
