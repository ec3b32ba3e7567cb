use std::{collections::BTreeMap, sync::Arc, time::Duration};

use chrono::NaiveDate;
use tokio::time::timeout;
use tracing::warn;

use crate::{
    domain::{FetchMode, SourceKey},
    fetch::SourceFetcher,
    titles::filter_titles,
};

/// Fan-out/fan-in front of the per-source fetchers.
///
/// Every call completes within the per-source timeout plus scheduling
/// overhead and yields one entry per configured source; a failed or slow
/// source degrades to an empty list without affecting its siblings.
pub struct ListingService {
    fetchers: Vec<Arc<dyn SourceFetcher>>,
    source_timeout: Duration,
}

impl ListingService {
    pub fn new(fetchers: Vec<Arc<dyn SourceFetcher>>, source_timeout: Duration) -> Self {
        Self {
            fetchers,
            source_timeout,
        }
    }

    pub fn sources(&self) -> Vec<SourceKey> {
        self.fetchers.iter().map(|f| f.key()).collect()
    }

    /// Filtered titles for one source; empty when the source is not
    /// configured or its fetch degrades.
    pub async fn fetch_and_filter(
        &self,
        key: SourceKey,
        day: NaiveDate,
        mode: FetchMode,
    ) -> Vec<String> {
        let Some(fetcher) = self.fetchers.iter().find(|f| f.key() == key) else {
            warn!(source = %key, "source not configured");
            return Vec::new();
        };
        run_with_timeout(Arc::clone(fetcher), day, mode, self.source_timeout).await
    }

    /// Filtered titles for every configured source: concurrent fan-out with
    /// independent timeouts, then a fan-in barrier.
    pub async fn fetch_all_and_filter(
        &self,
        day: NaiveDate,
        mode: FetchMode,
    ) -> BTreeMap<SourceKey, Vec<String>> {
        let mut tasks = Vec::with_capacity(self.fetchers.len());
        for fetcher in &self.fetchers {
            let fetcher = Arc::clone(fetcher);
            let budget = self.source_timeout;
            tasks.push((
                fetcher.key(),
                tokio::spawn(async move { run_with_timeout(fetcher, day, mode, budget).await }),
            ));
        }

        let mut listing = BTreeMap::new();
        for (key, task) in tasks {
            let titles = match task.await {
                Ok(titles) => titles,
                Err(e) => {
                    warn!(source = %key, error = %e, "fetch task failed");
                    Vec::new()
                }
            };
            listing.insert(key, titles);
        }
        listing
    }
}

async fn run_with_timeout(
    fetcher: Arc<dyn SourceFetcher>,
    day: NaiveDate,
    mode: FetchMode,
    budget: Duration,
) -> Vec<String> {
    match timeout(budget, fetcher.fetch_raw(day, mode)).await {
        Ok(Ok(raw)) => filter_titles(raw),
        Ok(Err(e)) => {
            warn!(source = %fetcher.key(), error = %e, "fetch degraded to empty");
            Vec::new()
        }
        Err(_) => {
            warn!(
                source = %fetcher.key(),
                timeout_ms = budget.as_millis() as u64,
                "fetch timed out"
            );
            Vec::new()
        }
    }
}
