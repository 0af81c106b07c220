use std::future::Future;
use std::num::NonZeroU32;

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use thiserror::Error;
use tracing::{debug, info};

use crate::model::{Page, RecordSet};

pub const DEFAULT_MAX_PAGES: usize = 1000;

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("could not decode listing page {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("listing still had a next page after {limit} pages (next: {url})")]
    TooManyPages { limit: usize, url: String },
}

impl FetchError {
    pub fn url(&self) -> &str {
        match self {
            Self::Transport { url, .. }
            | Self::Status { url, .. }
            | Self::Decode { url, .. }
            | Self::TooManyPages { url, .. } => url,
        }
    }
}

// `page` is 1-based. Nothing accumulated before it survives.
#[derive(Debug, Error)]
#[error("loading page {page} failed: {source}")]
pub struct FetchFailure {
    pub page: usize,
    #[source]
    pub source: FetchError,
}

pub trait PageSource {
    fn fetch_page(&self, url: &str) -> impl Future<Output = Result<Page, FetchError>> + Send;
}

#[derive(Clone, Debug)]
pub struct HttpPageSource {
    client: reqwest::Client,
}

impl HttpPageSource {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl PageSource for HttpPageSource {
    async fn fetch_page(&self, url: &str) -> Result<Page, FetchError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let body = resp.bytes().await.map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })?;
        serde_json::from_slice::<Page>(&body).map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

pub struct PageFetcher<S> {
    source: S,
    limiter: Option<DirectRateLimiter>,
    max_pages: usize,
}

impl<S: PageSource> PageFetcher<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            limiter: None,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    /// Pace page requests to `rate` per second. Zero means unpaced.
    pub fn with_rate(mut self, rate: u32) -> Self {
        self.limiter =
            NonZeroU32::new(rate).map(|rate| RateLimiter::direct(Quota::per_second(rate)));
        self
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn load(&self, start_url: &str) -> Result<RecordSet, FetchFailure> {
        self.load_with_progress(start_url, |_, _| {}).await
    }

    pub async fn load_with_progress<F>(
        &self,
        start_url: &str,
        mut on_page: F,
    ) -> Result<RecordSet, FetchFailure>
    where
        F: FnMut(usize, usize),
    {
        let mut records = RecordSet::new();
        let mut current = Some(start_url.to_string());
        let mut page = 0usize;

        while let Some(url) = current.take() {
            page += 1;
            if page > self.max_pages {
                let failure = FetchFailure {
                    page,
                    source: FetchError::TooManyPages {
                        limit: self.max_pages,
                        url,
                    },
                };
                debug!(error = %failure, "listing load aborted");
                return Err(failure);
            }

            if let Some(lim) = self.limiter.as_ref() {
                lim.until_ready().await;
            }

            let body = match self.source.fetch_page(&url).await {
                Ok(body) => body,
                Err(source) => {
                    let failure = FetchFailure { page, source };
                    debug!(error = %failure, "listing load aborted");
                    return Err(failure);
                }
            };

            current = body.next_url().map(str::to_string);
            debug!(
                page,
                url = %url,
                results = body.results.len(),
                has_next = current.is_some(),
                "fetched listing page"
            );
            records.extend(body.results);
            on_page(page, records.len());
        }

        info!(pages = page, records = records.len(), "listing load complete");
        Ok(records)
    }
}
