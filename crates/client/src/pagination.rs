//! Cursor pagination over list endpoints.
//!
//! A [`Pager`] turns a list endpoint into a lazily advancing sequence of
//! pages and of flattened items. It performs no I/O itself: every page comes
//! from a [`Lister`], which makes the state machine testable without a
//! network.
use std::future::Future;

use api_types::{ListEnvelope, ListParams};
use thiserror::Error;

/// Executes one list call.
///
/// Implemented by [`Client`](crate::Client) for every resource; tests plug in
/// scripted listers.
pub trait Lister<P, T> {
    type Error: std::error::Error + Send + Sync + 'static;

    fn list(
        &self,
        params: &P,
    ) -> impl Future<Output = Result<ListEnvelope<T>, Self::Error>> + Send;
}

impl<L, P, T> Lister<P, T> for &L
where
    L: Lister<P, T> + ?Sized,
{
    type Error = L::Error;

    fn list(
        &self,
        params: &P,
    ) -> impl Future<Output = Result<ListEnvelope<T>, Self::Error>> + Send {
        (**self).list(params)
    }
}

#[derive(Error, Debug)]
pub enum PageError<E> {
    /// The list call failed. `cursor` is the one sent with the failed call,
    /// `None` for the first page.
    #[error(
        "page fetch failed at cursor {}: {source}",
        .cursor.as_deref().unwrap_or("<start>")
    )]
    Fetch {
        cursor: Option<String>,
        #[source]
        source: E,
    },
    /// A previous fetch failed; build a new pager to try again.
    #[error("pager already failed")]
    Failed,
}

impl<E> PageError<E> {
    /// The executor error, when this error carries one.
    pub fn fetch_error(&self) -> Option<&E> {
        match self {
            Self::Fetch { source, .. } => Some(source),
            Self::Failed => None,
        }
    }

    pub fn into_fetch_error(self) -> Option<E> {
        match self {
            Self::Fetch { source, .. } => Some(source),
            Self::Failed => None,
        }
    }
}

/// Observable state of a [`Pager`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PagerState {
    /// No list call made yet.
    Fresh,
    /// A page is buffered.
    HasData,
    /// The last page has been consumed.
    Exhausted,
    /// A list call failed.
    Failed,
}

#[derive(Debug)]
enum State<T> {
    Fresh,
    Buffered {
        page: ListEnvelope<T>,
        /// Items of `page` handed out so far; the current one is
        /// `page.data[position - 1]`.
        position: usize,
    },
    Exhausted,
    Failed,
}

enum Next {
    First,
    After(String),
    End,
}

/// Iterates a cursor-paginated list.
///
/// Only the cursor of the request parameters changes between calls; every
/// filter is sent unchanged. Cursors are opaque and only move forward, so a
/// pager cannot be rewound: [`Pager::restart`] builds a fresh one from the
/// initial parameters instead.
///
/// `Exhausted` and `Failed` are terminal. A failed fetch is never retried.
#[derive(Debug)]
pub struct Pager<L, P, T> {
    lister: L,
    initial: P,
    params: P,
    state: State<T>,
    pages_fetched: usize,
}

impl<L, P, T> Pager<L, P, T>
where
    L: Lister<P, T>,
    P: ListParams,
{
    /// A pager that makes its first list call on the first advance.
    pub fn new(lister: L, params: P) -> Self {
        Self {
            lister,
            initial: params.clone(),
            params,
            state: State::Fresh,
            pages_fetched: 0,
        }
    }

    /// A pager with the first page already fetched.
    ///
    /// No item is current until the first [`advance_item`](Self::advance_item).
    pub async fn start(lister: L, params: P) -> Result<Self, PageError<L::Error>> {
        let mut pager = Self::new(lister, params);
        pager.fetch(None).await?;
        Ok(pager)
    }

    /// The item returned by the last [`advance_item`](Self::advance_item).
    pub fn current(&self) -> Option<&T> {
        match &self.state {
            State::Buffered { page, position } => {
                position.checked_sub(1).and_then(|index| page.data.get(index))
            }
            State::Fresh | State::Exhausted | State::Failed => None,
        }
    }

    /// The buffered page, if any.
    pub fn page(&self) -> Option<&ListEnvelope<T>> {
        match &self.state {
            State::Buffered { page, .. } => Some(page),
            State::Fresh | State::Exhausted | State::Failed => None,
        }
    }

    /// Parameters of the latest list call.
    pub fn params(&self) -> &P {
        &self.params
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    pub fn state(&self) -> PagerState {
        match self.state {
            State::Fresh => PagerState::Fresh,
            State::Buffered { .. } => PagerState::HasData,
            State::Exhausted => PagerState::Exhausted,
            State::Failed => PagerState::Failed,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self.state, State::Exhausted)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.state, State::Failed)
    }

    /// Moves to the next item across page boundaries.
    ///
    /// A list call is made only when the buffered page is used up and the
    /// server sent a next cursor. Returns `Ok(None)` once the list is
    /// exhausted. An empty page ends the sequence even if it carries a cursor.
    pub async fn advance_item(&mut self) -> Result<Option<&T>, PageError<L::Error>> {
        if !self.step_within_page() {
            let next = match &self.state {
                State::Fresh => Next::First,
                State::Buffered { page, .. } if page.is_empty() => Next::End,
                State::Buffered { page, .. } => match page.next_cursor() {
                    Some(cursor) => Next::After(cursor.to_string()),
                    None => Next::End,
                },
                State::Exhausted => return Ok(None),
                State::Failed => return Err(PageError::Failed),
            };
            match next {
                Next::First => self.fetch(None).await?,
                Next::After(cursor) => self.fetch(Some(cursor)).await?,
                Next::End => {
                    self.finish();
                    return Ok(None);
                }
            }
            if !self.step_within_page() {
                self.finish();
                return Ok(None);
            }
        }
        Ok(self.current())
    }

    /// Fetches the next page, skipping whatever is left of the buffered one.
    ///
    /// On a fresh pager this fetches the first page. Item iteration resumes
    /// from the start of the returned page.
    ///
    /// Unlike [`advance_item`](Self::advance_item), an empty page does not end
    /// the walk: its cursor, when present, is still followed.
    pub async fn advance_page(
        &mut self,
    ) -> Result<Option<&ListEnvelope<T>>, PageError<L::Error>> {
        let next = match &self.state {
            State::Fresh => Next::First,
            State::Buffered { page, .. } => match page.next_cursor() {
                Some(cursor) => Next::After(cursor.to_string()),
                None => Next::End,
            },
            State::Exhausted => return Ok(None),
            State::Failed => return Err(PageError::Failed),
        };
        match next {
            Next::First => self.fetch(None).await?,
            Next::After(cursor) => self.fetch(Some(cursor)).await?,
            Next::End => {
                self.finish();
                return Ok(None);
            }
        }
        Ok(self.page())
    }

    /// Drains every remaining item, fetching pages as needed.
    pub async fn collect_remaining(mut self) -> Result<Vec<T>, PageError<L::Error>>
    where
        T: Clone,
    {
        let mut items = Vec::new();
        while let Some(item) = self.advance_item().await? {
            items.push(item.clone());
        }
        Ok(items)
    }

    /// A fresh pager over the same lister with the initial parameters.
    pub fn restart(self) -> Self {
        Self::new(self.lister, self.initial)
    }

    fn step_within_page(&mut self) -> bool {
        match &mut self.state {
            State::Buffered { page, position } if *position < page.data.len() => {
                *position += 1;
                true
            }
            _ => false,
        }
    }

    fn finish(&mut self) {
        if !self.is_exhausted() {
            tracing::trace!(pages = self.pages_fetched, "pager exhausted");
            self.state = State::Exhausted;
        }
    }

    /// Makes one list call; `cursor` replaces the request cursor when set.
    async fn fetch(&mut self, cursor: Option<String>) -> Result<(), PageError<L::Error>> {
        if cursor.is_some() {
            self.params.set_cursor(cursor);
        }
        tracing::debug!(
            cursor = self.params.cursor().unwrap_or("<start>"),
            page = self.pages_fetched + 1,
            "fetching page"
        );

        match self.lister.list(&self.params).await {
            Ok(page) => {
                self.pages_fetched += 1;
                self.state = State::Buffered { page, position: 0 };
                Ok(())
            }
            Err(source) => {
                tracing::debug!(error = %source, "page fetch failed");
                self.state = State::Failed;
                Err(PageError::Fetch {
                    cursor: self.params.cursor().map(str::to_string),
                    source,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::future::ready;

    use api_types::Query;

    use super::*;

    #[derive(Clone, Debug, Default, PartialEq)]
    struct Params {
        cursor: Option<String>,
    }

    impl ListParams for Params {
        fn cursor(&self) -> Option<&str> {
            self.cursor.as_deref()
        }

        fn set_cursor(&mut self, cursor: Option<String>) {
            self.cursor = cursor;
        }

        fn to_query(&self) -> Query {
            let mut query = Query::new();
            query.push_opt("cursor", self.cursor.as_deref());
            query
        }
    }

    /// Serves the same single page forever.
    struct Fixed(Vec<u32>);

    impl Lister<Params, u32> for Fixed {
        type Error = std::io::Error;

        fn list(
            &self,
            _params: &Params,
        ) -> impl Future<Output = Result<ListEnvelope<u32>, Self::Error>> + Send {
            ready(Ok(ListEnvelope::new(self.0.clone(), None)))
        }
    }

    #[tokio::test]
    async fn new_is_lazy() {
        let pager = Pager::new(Fixed(vec![1]), Params::default());
        assert_eq!(pager.state(), PagerState::Fresh);
        assert_eq!(pager.pages_fetched(), 0);
        assert!(pager.current().is_none());
        assert!(pager.page().is_none());
    }

    #[tokio::test]
    async fn start_fetches_without_selecting_an_item() {
        let pager = Pager::start(Fixed(vec![1, 2]), Params::default()).await.unwrap();
        assert_eq!(pager.state(), PagerState::HasData);
        assert_eq!(pager.pages_fetched(), 1);
        assert!(pager.current().is_none());
        assert_eq!(pager.page().map(ListEnvelope::len), Some(2));
    }

    #[tokio::test]
    async fn exhausted_pager_stays_exhausted() {
        let mut pager = Pager::new(Fixed(vec![7]), Params::default());
        assert_eq!(pager.advance_item().await.unwrap(), Some(&7));
        assert_eq!(pager.advance_item().await.unwrap(), None);
        assert!(pager.is_exhausted());
        assert!(pager.current().is_none());
        assert_eq!(pager.advance_item().await.unwrap(), None);
        assert!(pager.advance_page().await.unwrap().is_none());
        assert_eq!(pager.pages_fetched(), 1);
    }

    #[test]
    fn fetch_error_display_names_the_cursor() {
        let first: PageError<std::io::Error> = PageError::Fetch {
            cursor: None,
            source: std::io::Error::other("boom"),
        };
        let later: PageError<std::io::Error> = PageError::Fetch {
            cursor: Some("c1".to_string()),
            source: std::io::Error::other("boom"),
        };
        assert_eq!(first.to_string(), "page fetch failed at cursor <start>: boom");
        assert_eq!(later.to_string(), "page fetch failed at cursor c1: boom");
        assert!(later.fetch_error().is_some());
        assert!(PageError::<std::io::Error>::Failed.into_fetch_error().is_none());
    }
}
