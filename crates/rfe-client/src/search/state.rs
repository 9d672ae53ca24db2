//! Filter and deep-search state.

use rfe_core::{Entry, RemoteError, RemoteFs, RemoteResult};
use tracing::{debug, warn};

use super::pagination::Pagination;
use crate::generation::{Generation, Ticket};

/// A deep search in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    ticket: Ticket,
    path: String,
    query: String,
}

impl SearchTicket {
    /// Directory the search is scoped to.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The query sent.
    pub fn query(&self) -> &str {
        &self.query
    }
}

/// What happened to a finished deep search.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// Results now back the view.
    Committed,
    /// The search was superseded; results were dropped.
    Stale,
    /// The search failed; the view is unchanged.
    Failed(RemoteError),
}

/// Local filter, deep-search results and the page cursor.
#[derive(Debug, Clone)]
pub struct SearchFilter {
    query: String,
    deep: bool,
    results: Option<Vec<Entry>>,
    generation: Generation,
    /// Page cursor over the effective list.
    pub pagination: Pagination,
}

impl SearchFilter {
    /// Create an empty filter with the given page size.
    pub fn new(page_size: usize) -> Self {
        Self {
            query: String::new(),
            deep: false,
            results: None,
            generation: Generation::new(),
            pagination: Pagination::new(page_size),
        }
    }

    /// The filter text.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Whether deep-search mode is on.
    pub fn is_deep(&self) -> bool {
        self.deep
    }

    /// Whether the view is backed by deep-search results.
    pub fn has_results(&self) -> bool {
        self.results.is_some()
    }

    /// Update the filter text and go back to page 1.
    ///
    /// An empty query drops deep-search results.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.pagination.reset();
        if self.query.trim().is_empty() {
            self.drop_results();
        }
    }

    /// Switch between local filtering and deep search.
    pub fn set_deep(&mut self, deep: bool) {
        self.deep = deep;
        self.pagination.reset();
        if !deep {
            self.drop_results();
        }
    }

    /// Forget deep-search results after the directory changed.
    pub fn on_navigate(&mut self) {
        self.drop_results();
        self.pagination.reset();
    }

    /// Start a deep search in `path`.
    ///
    /// Returns `None` when deep search is off or the query is empty; in
    /// that case the view reverts to the directory listing.
    pub fn begin_deep_search(&mut self, path: &str) -> Option<SearchTicket> {
        let query = self.query.trim();
        if !self.deep || query.is_empty() {
            self.drop_results();
            return None;
        }
        let ticket = self.generation.begin();
        debug!(path, query, generation = ticket.get(), "Deep search");
        Some(SearchTicket {
            ticket,
            path: path.to_string(),
            query: query.to_string(),
        })
    }

    /// Commit deep-search results if the search is still the latest one.
    pub fn finish_deep_search(
        &mut self,
        ticket: SearchTicket,
        result: RemoteResult<Vec<Entry>>,
    ) -> SearchOutcome {
        if !self.generation.is_current(ticket.ticket) {
            debug!(
                query = %ticket.query,
                stale = ticket.ticket.get(),
                current = self.generation.current(),
                "Discarding stale search results"
            );
            return SearchOutcome::Stale;
        }
        match result {
            Ok(results) => {
                debug!(query = %ticket.query, count = results.len(), "Search committed");
                self.results = Some(results);
                self.pagination.reset();
                SearchOutcome::Committed
            }
            Err(e) => {
                warn!(query = %ticket.query, error = %e, "Search failed");
                SearchOutcome::Failed(e)
            }
        }
    }

    /// Run a deep search in `path`. Returns `None` when nothing was sent.
    pub async fn deep_search(
        &mut self,
        remote: &dyn RemoteFs,
        path: &str,
    ) -> Option<SearchOutcome> {
        let ticket = self.begin_deep_search(path)?;
        let result = remote.search(ticket.path(), ticket.query()).await;
        Some(self.finish_deep_search(ticket, result))
    }

    /// Entries the view is built from, before pagination.
    pub fn effective<'a>(&'a self, listing: &'a [Entry]) -> Vec<&'a Entry> {
        let query = self.query.trim().to_lowercase();
        if self.deep && !query.is_empty() {
            return match &self.results {
                Some(results) => results.iter().collect(),
                None => listing.iter().collect(),
            };
        }
        if query.is_empty() {
            return listing.iter().collect();
        }
        listing.iter().filter(|e| e.name_contains(&query)).collect()
    }

    /// Number of entries after filtering.
    pub fn filtered_count(&self, listing: &[Entry]) -> usize {
        self.effective(listing).len()
    }

    /// Number of pages of the effective list.
    pub fn total_pages(&self, listing: &[Entry]) -> usize {
        self.pagination.total_pages(self.filtered_count(listing))
    }

    /// The entries on the current page.
    pub fn page_items(&self, listing: &[Entry]) -> Vec<Entry> {
        let effective = self.effective(listing);
        self.pagination
            .slice(&effective)
            .iter()
            .map(|e| (*e).clone())
            .collect()
    }

    /// Advance one page. Returns `false` at the last page.
    pub fn next_page(&mut self, listing: &[Entry]) -> bool {
        let count = self.filtered_count(listing);
        self.pagination.next(count)
    }

    /// Go back one page. Returns `false` at the first page.
    pub fn prev_page(&mut self) -> bool {
        self.pagination.prev()
    }

    fn drop_results(&mut self) {
        if self.results.take().is_some() {
            debug!("Deep-search results dropped");
        }
        self.generation.invalidate();
    }
}
