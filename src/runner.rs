use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;

use crate::fetcher::{FetchFailure, HttpPageSource, PageFetcher, PageSource, DEFAULT_MAX_PAGES};
use crate::model::RecordSet;
use crate::utils;
use crate::view::{self, ProjectedView, ViewState, DEFAULT_PAGE_SIZE};

pub const DEFAULT_START_URL: &str = "https://swapi.dev/api/people/";

#[derive(Clone, Debug)]
pub struct Options {
    pub start_url: String,
    pub page_size: usize,
    pub view: ViewState,
    pub rate: u32,
    pub timeout_seconds: usize,
    pub proxy: Option<String>,
    pub header: Option<String>,
    pub max_pages: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            start_url: DEFAULT_START_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            view: ViewState::default(),
            rate: 0,
            timeout_seconds: 10,
            proxy: None,
            header: None,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("invalid URL: {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid page_size {value}, expected positive integer")]
    InvalidPageSize { value: usize },

    #[error("invalid page_number {value}, expected positive integer")]
    InvalidPageNumber { value: usize },

    #[error("invalid header '{header}': {reason}")]
    InvalidHeader { header: String, reason: String },

    #[error("failed to build HTTP client: {source}")]
    HttpClientBuild {
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to setup proxy: {proxy}: {source}")]
    ProxySetup {
        proxy: String,
        #[source]
        source: reqwest::Error,
    },

    #[error(transparent)]
    Fetch(#[from] FetchFailure),
}

#[derive(Clone, Debug)]
pub struct BrowseResult {
    pub elapsed: Duration,
    pub records: RecordSet,
    pub gender_options: Vec<String>,
    pub projected: ProjectedView,
}

#[derive(Clone, Debug)]
pub struct Runner {
    options: Options,
}

impl Runner {
    pub fn new(options: Options) -> Result<Self, RunnerError> {
        utils::parse_listing_url(&options.start_url).map_err(|reason| RunnerError::InvalidUrl {
            url: options.start_url.clone(),
            reason,
        })?;
        if options.page_size == 0 {
            return Err(RunnerError::InvalidPageSize {
                value: options.page_size,
            });
        }
        if options.view.page_number == 0 {
            return Err(RunnerError::InvalidPageNumber {
                value: options.view.page_number,
            });
        }
        if let Some(header) = options.header.as_deref() {
            utils::parse_header_line(header).map_err(|reason| RunnerError::InvalidHeader {
                header: header.to_string(),
                reason,
            })?;
        }
        Ok(Self { options })
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn fetcher(&self) -> Result<PageFetcher<HttpPageSource>, RunnerError> {
        let client = build_http_client(
            self.options.proxy.as_deref(),
            self.options.timeout_seconds,
            self.options.header.as_deref(),
        )?;
        Ok(PageFetcher::new(HttpPageSource::new(client))
            .with_rate(self.options.rate)
            .with_max_pages(self.options.max_pages))
    }

    pub async fn run(&self) -> Result<BrowseResult, RunnerError> {
        let fetcher = self.fetcher()?;
        self.run_with(&fetcher).await
    }

    pub async fn run_with<S: PageSource>(
        &self,
        fetcher: &PageFetcher<S>,
    ) -> Result<BrowseResult, RunnerError> {
        self.run_with_progress(fetcher, |_, _| {}).await
    }

    pub async fn run_with_progress<S, F>(
        &self,
        fetcher: &PageFetcher<S>,
        on_page: F,
    ) -> Result<BrowseResult, RunnerError>
    where
        S: PageSource,
        F: FnMut(usize, usize),
    {
        let started_at = Instant::now();
        let records = fetcher
            .load_with_progress(&self.options.start_url, on_page)
            .await?;
        Ok(self.browse(records, started_at.elapsed()))
    }

    fn browse(&self, records: RecordSet, elapsed: Duration) -> BrowseResult {
        let projected = view::project(&records, &self.options.view, self.options.page_size);
        let gender_options = view::gender_options(&records);
        BrowseResult {
            elapsed,
            records,
            gender_options,
            projected,
        }
    }
}

pub fn build_http_client(
    proxy: Option<&str>,
    timeout_seconds: usize,
    header: Option<&str>,
) -> Result<reqwest::Client, RunnerError> {
    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        reqwest::header::USER_AGENT,
        reqwest::header::HeaderValue::from_static(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        )),
    );
    headers.insert(
        reqwest::header::ACCEPT,
        reqwest::header::HeaderValue::from_static("application/json"),
    );

    if let Some(header) = header.filter(|h| !h.trim().is_empty()) {
        let invalid = |reason: String| RunnerError::InvalidHeader {
            header: header.to_string(),
            reason,
        };
        let (key, value) = utils::parse_header_line(header).map_err(invalid)?;
        let key = reqwest::header::HeaderName::from_str(&key).map_err(|e| invalid(e.to_string()))?;
        let value =
            reqwest::header::HeaderValue::from_str(&value).map_err(|e| invalid(e.to_string()))?;
        headers.insert(key, value);
    }

    let timeout = Duration::from_secs(timeout_seconds.try_into().unwrap_or(10));
    let mut builder = reqwest::Client::builder()
        .default_headers(headers)
        .redirect(reqwest::redirect::Policy::limited(10))
        .timeout(timeout);

    if let Some(proxy) = proxy.filter(|p| !p.trim().is_empty()) {
        let proxy = reqwest::Proxy::all(proxy).map_err(|e| RunnerError::ProxySetup {
            proxy: proxy.to_string(),
            source: e,
        })?;
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| RunnerError::HttpClientBuild { source: e })
}
