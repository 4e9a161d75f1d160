//! Async iterator over paged query results.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use super::Page;
use super::request::ODataRequest;
use crate::B1Client;
use crate::error::Error;
use crate::response::Collection;
use crate::response::ODataResponse;

/// Async iterator that yields pages of query results.
///
/// Follows `@odata.nextLink` until the server stops sending one. Follow-up
/// requests keep the headers of the first request.
pub struct Pages<'a, T> {
    client: &'a B1Client,
    request: Option<ODataRequest>,
    headers: Vec<(String, String)>,
    inline_count: bool,
    cancel: Option<CancellationToken>,
    done: bool,
    _marker: PhantomData<fn() -> T>,
}

impl<'a, T: DeserializeOwned> Pages<'a, T> {
    pub(crate) fn new(
        client: &'a B1Client,
        request: ODataRequest,
        cancel: Option<CancellationToken>,
    ) -> Self {
        Self {
            client,
            headers: request.headers.clone(),
            inline_count: request.param_value("$inlinecount").is_some(),
            request: Some(request),
            cancel,
            done: false,
            _marker: PhantomData,
        }
    }

    /// Fetches the next page of results.
    ///
    /// Returns `None` when all pages have been consumed.
    pub async fn next(&mut self) -> Option<Result<Page<T>, Error>> {
        if self.done {
            return None;
        }
        let Some(request) = self.request.take() else {
            self.done = true;
            return None;
        };

        let fetched = self.fetch(&request).await;
        Some(self.advance(fetched))
    }

    /// Queues the follow-up request for a fetched page, or stops after the
    /// last page or the first error.
    fn advance(&mut self, fetched: Result<Page<T>, Error>) -> Result<Page<T>, Error> {
        let page = match fetched {
            Ok(page) => page,
            Err(e) => {
                self.done = true;
                return Err(e);
            }
        };

        match page.next_link() {
            Some(link) => {
                log::debug!("Following next link {}", link);
                self.request = Some(self.follow_up(link));
            }
            None => self.done = true,
        }
        Ok(page)
    }

    fn follow_up(&self, link: &str) -> ODataRequest {
        let mut next = ODataRequest::get(link);
        next.headers = self.headers.clone();
        next
    }

    /// Fetches every remaining page and concatenates the rows.
    pub async fn collect_all(mut self) -> Result<Vec<T>, Error> {
        let mut items = Vec::new();
        while let Some(page) = self.next().await {
            items.extend(page?.into_items());
        }
        Ok(items)
    }

    async fn fetch(&self, request: &ODataRequest) -> Result<Page<T>, Error> {
        let cancel = self.cancel.as_ref();
        if self.inline_count {
            let collection: Collection<T> = self.client.fetch_json(request, cancel).await?;
            let mut page = Page::new(collection.value).with_total_count(collection.count);
            if let Some(link) = collection.next_link {
                page = page.with_next_link(link);
            }
            Ok(page)
        } else {
            let response: ODataResponse<Vec<T>> = self.client.fetch_json(request, cancel).await?;
            let mut page = Page::new(response.value);
            if let Some(link) = response.next_link {
                page = page.with_next_link(link);
            }
            Ok(page)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Credentials;

    fn client() -> B1Client {
        B1Client::builder()
            .url("https://sap.example.com:50000/b1s/v2/")
            .credentials(Credentials::new("DB", "manager", "secret"))
            .build()
            .unwrap()
    }

    fn first_request() -> ODataRequest {
        ODataRequest::get("Items").param("$top", 2).no_paginate()
    }

    #[test]
    fn test_follow_up_keeps_headers() {
        let client = client();
        let mut pages: Pages<'_, i32> = Pages::new(&client, first_request(), None);
        pages.request = None;

        let page = Page::new(vec![1, 2]).with_next_link("Items?$skip=2");
        assert!(pages.advance(Ok(page)).is_ok());

        let next = pages.request.as_ref().unwrap();
        assert_eq!(next.path, "Items?$skip=2");
        assert!(next.params.is_empty());
        assert_eq!(next.header_value("Prefer"), Some("odata.maxpagesize=0"));
        assert!(!pages.done);
    }

    #[tokio::test]
    async fn test_stops_without_next_link() {
        let client = client();
        let mut pages: Pages<'_, i32> = Pages::new(&client, first_request(), None);
        pages.request = None;

        let page = pages.advance(Ok(Page::new(vec![3]))).unwrap();
        assert_eq!(page.into_items(), [3]);
        assert!(pages.done);
        assert!(pages.request.is_none());
        assert!(pages.next().await.is_none());
    }

    #[tokio::test]
    async fn test_error_ends_iteration() {
        let client = client();
        let mut pages: Pages<'_, i32> = Pages::new(&client, first_request(), None);

        assert!(matches!(pages.advance(Err(Error::Cancelled)), Err(Error::Cancelled)));
        assert!(pages.done);
        assert!(pages.next().await.is_none());
    }
}
