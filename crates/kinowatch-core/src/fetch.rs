use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{FetchMode, SourceKey};

/// Why a fetch produced no usable content.
///
/// Callers collapse all of these to "no data for this source", but keeping
/// them apart lets the orchestrator log the real cause and lets tests tell
/// "nothing listed" from "unreachable" from "blocked".
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("http error: {0}")]
    Http(String),

    #[error("blocked by anti-automation challenge")]
    Blocked,

    #[error("renderer unavailable: {0}")]
    RendererUnavailable(String),

    #[error("requested date is not shown on the page")]
    DateNotShown,
}

pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Capability: produce raw candidate title strings for one listing source.
///
/// Implementations return unfiltered text in document order; classification
/// and dedup happen in the orchestrator.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    fn key(&self) -> SourceKey;

    async fn fetch_raw(&self, day: NaiveDate, mode: FetchMode) -> FetchResult<Vec<String>>;
}

/// Capability: render a page with a full browser engine and return its HTML.
///
/// The thorough strategy for sources whose quick path gets challenged or
/// whose content is lazily loaded. `ready_selector` bounds the wait for the
/// content to appear.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render(&self, url: &str, ready_selector: &str) -> FetchResult<String>;
}
