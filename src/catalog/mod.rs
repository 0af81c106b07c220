use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::fetcher::{FetchFailure, PageFetcher, PageSource};
use crate::model::{Record, RecordSet};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("a load is already in progress")]
    LoadInProgress,

    #[error(transparent)]
    Fetch(#[from] FetchFailure),
}

#[derive(Debug, Default)]
pub struct Catalog {
    records: RwLock<Arc<RecordSet>>,
    loading: AtomicBool,
}

struct LoadingGuard<'a>(&'a AtomicBool);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: RecordSet) -> Self {
        Self {
            records: RwLock::new(Arc::new(records)),
            loading: AtomicBool::new(false),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    pub async fn snapshot(&self) -> Arc<RecordSet> {
        Arc::clone(&*self.records.read().await)
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    // the previous records stay published until the new set is complete
    pub async fn load<S>(
        &self,
        fetcher: &PageFetcher<S>,
        start_url: &str,
    ) -> Result<usize, CatalogError>
    where
        S: PageSource + Sync,
    {
        self.load_with_progress(fetcher, start_url, |_, _| {}).await
    }

    pub async fn load_with_progress<S, F>(
        &self,
        fetcher: &PageFetcher<S>,
        start_url: &str,
        on_page: F,
    ) -> Result<usize, CatalogError>
    where
        S: PageSource + Sync,
        F: FnMut(usize, usize),
    {
        let _guard = self.begin_load()?;
        let fresh = fetcher.load_with_progress(start_url, on_page).await?;
        let count = fresh.len();
        self.publish(fresh).await;
        info!(records = count, "catalog replaced");
        Ok(count)
    }

    fn begin_load(&self) -> Result<LoadingGuard<'_>, CatalogError> {
        if self
            .loading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("ignoring load request, a load is already running");
            return Err(CatalogError::LoadInProgress);
        }
        Ok(LoadingGuard(&self.loading))
    }

    async fn publish(&self, records: Vec<Record>) {
        *self.records.write().await = Arc::new(records);
    }
}
