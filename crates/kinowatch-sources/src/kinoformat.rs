//! Киноцентр (Kino-Format) in Balashikha.
//!
//! The schedule page is mostly static but loads film cards late on some
//! layouts, so the quick GET escalates to the renderer when it parses out to
//! nothing at all.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::debug;

use kinowatch_core::{
    domain::{FetchMode, SourceKey},
    fetch::{FetchError, FetchResult, PageRenderer, SourceFetcher},
};

use crate::{html::select_texts, http};

const BASE_URL: &str = "https://kino-format.ru/";

pub const READY_SELECTOR: &str = r#"a[href*="/film/"], h2, h3"#;

pub struct KinoformatFetcher {
    client: reqwest::Client,
    renderer: Arc<dyn PageRenderer>,
}

impl KinoformatFetcher {
    pub fn new(client: reqwest::Client, renderer: Arc<dyn PageRenderer>) -> Self {
        Self { client, renderer }
    }
}

fn build_url(day: NaiveDate) -> String {
    format!("{BASE_URL}schedule/?date={day}")
}

/// Film detail links first, then card headings.
fn parse_titles(html: &str) -> Vec<String> {
    let mut titles = select_texts(html, r#"a[href*="/film/"]"#);
    titles.extend(select_texts(html, "h2, h3"));
    titles
}

#[async_trait]
impl SourceFetcher for KinoformatFetcher {
    fn key(&self) -> SourceKey {
        SourceKey::Kinoformat
    }

    async fn fetch_raw(&self, day: NaiveDate, _mode: FetchMode) -> FetchResult<Vec<String>> {
        let url = build_url(day);

        let body = http::get_text(&self.client, &url).await?;
        let titles = parse_titles(&body);
        if !titles.is_empty() {
            return Ok(titles);
        }

        debug!(url, "quick fetch parsed to nothing, escalating to renderer");
        match self.renderer.render(&url, READY_SELECTOR).await {
            Ok(rendered) => Ok(parse_titles(&rendered)),
            // An empty-but-successful quick result stands on its own.
            Err(FetchError::RendererUnavailable(_)) => Ok(titles),
            Err(e) => Err(e),
        }
    }
}
