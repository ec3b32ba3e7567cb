//! End-to-end cycles: fetch → filter → diff → hand off to the notifier.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::info;

use crate::{
    domain::{FetchMode, SourceKey},
    listings::ListingService,
    seen::SeenStore,
    Result,
};

/// One unattended "anything new?" cycle: fetch every source, diff against the
/// seen store and persist the union. Only sources with new titles appear in
/// the result. A failed persist fails the whole cycle — proceeding silently
/// would cause permanent duplicate reports for the missed merge.
pub async fn check_new_titles(
    service: &ListingService,
    store: &mut SeenStore,
    day: NaiveDate,
    mode: FetchMode,
) -> Result<BTreeMap<SourceKey, Vec<String>>> {
    let listing = service.fetch_all_and_filter(day, mode).await;

    let mut new_titles = BTreeMap::new();
    for (key, titles) in listing {
        let fresh = store.diff_and_merge(key, &titles)?;
        if !fresh.is_empty() {
            info!(source = %key, count = fresh.len(), "new titles");
            new_titles.insert(key, fresh);
        }
    }
    Ok(new_titles)
}

/// Snapshot of the day's listings across all sources; no seen-state
/// interaction. One entry per configured source, possibly empty.
pub async fn daily_digest(
    service: &ListingService,
    day: NaiveDate,
    mode: FetchMode,
) -> BTreeMap<SourceKey, Vec<String>> {
    service.fetch_all_and_filter(day, mode).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{FetchResult, SourceFetcher};
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::time::Duration;

    struct CannedFetcher {
        key: SourceKey,
        titles: Vec<&'static str>,
    }

    #[async_trait]
    impl SourceFetcher for CannedFetcher {
        fn key(&self) -> SourceKey {
            self.key
        }

        async fn fetch_raw(&self, _day: NaiveDate, _mode: FetchMode) -> FetchResult<Vec<String>> {
            Ok(self.titles.iter().map(|s| s.to_string()).collect())
        }
    }

    fn tmp_file(prefix: &str) -> PathBuf {
        let ts = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or(Duration::from_secs(0))
            .as_millis();
        let pid = std::process::id();
        PathBuf::from(format!("/tmp/{prefix}-{pid}-{ts}.json"))
    }

    fn service() -> ListingService {
        ListingService::new(
            vec![
                Arc::new(CannedFetcher {
                    key: SourceKey::Prada,
                    titles: vec!["Дюна 2", "Комедии"],
                }),
                Arc::new(CannedFetcher {
                    key: SourceKey::Karo,
                    titles: vec![],
                }),
            ],
            Duration::from_secs(1),
        )
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, 28).unwrap()
    }

    #[tokio::test]
    async fn reports_only_once() {
        let path = tmp_file("kinowatch-cycle");
        let service = service();
        let mut store = SeenStore::load(&path);

        let first = check_new_titles(&service, &mut store, day(), FetchMode::Quick)
            .await
            .unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[&SourceKey::Prada], vec!["Дюна 2"]);

        let second = check_new_titles(&service, &mut store, day(), FetchMode::Quick)
            .await
            .unwrap();
        assert!(second.is_empty());

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn failed_persist_fails_the_cycle() {
        let blocker = tmp_file("kinowatch-cycle-blocker");
        std::fs::write(&blocker, "x").unwrap();

        let service = service();
        let mut store = SeenStore::load(blocker.join("seen.json"));
        let result = check_new_titles(&service, &mut store, day(), FetchMode::Quick).await;
        assert!(result.is_err());

        let _ = std::fs::remove_file(&blocker);
    }

    #[tokio::test]
    async fn digest_keeps_empty_sources_distinguishable() {
        let service = service();
        let listing = daily_digest(&service, day(), FetchMode::Quick).await;
        assert_eq!(listing.len(), 2);
        assert!(listing.contains_key(&SourceKey::Karo));
        assert!(listing[&SourceKey::Karo].is_empty());
        assert!(!listing.contains_key(&SourceKey::Kinoformat));
    }
}
