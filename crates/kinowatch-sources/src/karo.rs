//! Karo 10 Reutov via its Yandex Afisha page.
//!
//! Yandex fronts the page with SmartCaptcha for clients it distrusts, so the
//! quick GET escalates to the browser renderer when the challenge markers
//! show up in the body. Full mode goes straight to the renderer and keeps the
//! direct GET as a fallback.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Days, Local, NaiveDate};
use tracing::debug;

use kinowatch_core::{
    domain::{FetchMode, SourceKey},
    fetch::{FetchError, FetchResult, PageRenderer, SourceFetcher},
};

use crate::{html::select_texts, http};

const BASE_URL: &str = "https://afisha.yandex.ru/moscow/cinema/places/karo-10-reutov";

/// Movie cards render lazily; any of these appearing means content arrived.
pub const READY_SELECTOR: &str = r#"a[href*="/movie/"], h2, h3"#;

const CAPTCHA_MARKERS: [&str; 2] = ["SmartCaptcha", "Я не робот"];

pub struct KaroFetcher {
    client: reqwest::Client,
    renderer: Arc<dyn PageRenderer>,
}

impl KaroFetcher {
    pub fn new(client: reqwest::Client, renderer: Arc<dyn PageRenderer>) -> Self {
        Self { client, renderer }
    }

    /// Quick-path body in hand: use it unless it is a challenge page, in
    /// which case the renderer gets a shot. No renderer means the source is
    /// genuinely blocked.
    async fn resolve_quick(&self, url: &str, body: String) -> FetchResult<String> {
        if !has_captcha(&body) {
            return Ok(body);
        }

        debug!(url, "captcha challenge detected, escalating to renderer");
        match self.renderer.render(url, READY_SELECTOR).await {
            Ok(rendered) => Ok(rendered),
            Err(FetchError::RendererUnavailable(_)) => Err(FetchError::Blocked),
            Err(e) => Err(e),
        }
    }
}

fn build_url(day: NaiveDate) -> String {
    let today = Local::now().date_naive();
    if day == today {
        return format!("{BASE_URL}?place-schedule-preset=today");
    }
    if Some(day) == today.checked_add_days(Days::new(1)) {
        return format!("{BASE_URL}?place-schedule-preset=tomorrow");
    }
    format!("{BASE_URL}?place-schedule-date={day}")
}

fn has_captcha(html: &str) -> bool {
    CAPTCHA_MARKERS.iter().any(|m| html.contains(m))
}

/// Movie detail links first, then card headings. Duplicates between the two
/// passes are fine; the filter dedups downstream.
fn parse_titles(html: &str) -> Vec<String> {
    let mut titles = select_texts(html, r#"a[href*="/movie/"]"#);
    titles.extend(select_texts(html, "h2, h3"));
    titles
}

#[async_trait]
impl SourceFetcher for KaroFetcher {
    fn key(&self) -> SourceKey {
        SourceKey::Karo
    }

    async fn fetch_raw(&self, day: NaiveDate, mode: FetchMode) -> FetchResult<Vec<String>> {
        let url = build_url(day);

        let html = match mode {
            FetchMode::Quick => {
                let body = http::get_text(&self.client, &url).await?;
                self.resolve_quick(&url, body).await?
            }
            FetchMode::Full => match self.renderer.render(&url, READY_SELECTOR).await {
                Ok(rendered) if !rendered.trim().is_empty() => rendered,
                Ok(_) | Err(FetchError::RendererUnavailable(_)) => {
                    debug!(url, "renderer yielded nothing, falling back to direct fetch");
                    http::get_text(&self.client, &url).await?
                }
                Err(e) => return Err(e),
            },
        };

        Ok(parse_titles(&html))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeRenderer {
        calls: AtomicUsize,
        result: FetchResult<&'static str>,
    }

    impl FakeRenderer {
        fn ok(html: &'static str) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                result: Ok(html),
            }
        }

        fn unavailable() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                result: Err(FetchError::RendererUnavailable("no chrome".to_string())),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PageRenderer for FakeRenderer {
        async fn render(&self, _url: &str, _ready_selector: &str) -> FetchResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.result {
                Ok(html) => Ok(html.to_string()),
                Err(FetchError::RendererUnavailable(msg)) => {
                    Err(FetchError::RendererUnavailable(msg.clone()))
                }
                Err(_) => Err(FetchError::Http("unexpected".to_string())),
            }
        }
    }

    fn fetcher(renderer: Arc<FakeRenderer>) -> KaroFetcher {
        KaroFetcher::new(reqwest::Client::new(), renderer)
    }

    #[test]
    fn date_url_uses_presets_near_today() {
        let today = Local::now().date_naive();
        assert!(build_url(today).ends_with("place-schedule-preset=today"));

        let tomorrow = today.checked_add_days(Days::new(1)).unwrap();
        assert!(build_url(tomorrow).ends_with("place-schedule-preset=tomorrow"));

        let fixed = NaiveDate::from_ymd_opt(2020, 1, 15).unwrap();
        assert!(build_url(fixed).ends_with("place-schedule-date=2020-01-15"));
    }

    #[test]
    fn captcha_markers_are_detected() {
        assert!(has_captcha("<div id=\"SmartCaptcha\"></div>"));
        assert!(has_captcha("<p>Я не робот</p>"));
        assert!(!has_captcha("<h2>Дюна 2</h2>"));
    }

    #[test]
    fn movie_links_come_before_headings() {
        let html = r#"
            <h2>Расписание фильмов</h2>
            <a href="/moscow/movie/dune-2">Дюна 2</a>
            <h3>Барби</h3>
        "#;
        assert_eq!(
            parse_titles(html),
            vec!["Дюна 2", "Расписание фильмов", "Барби"]
        );
    }

    #[tokio::test]
    async fn clean_body_skips_the_renderer() {
        let renderer = Arc::new(FakeRenderer::ok("<h2>unused</h2>"));
        let f = fetcher(renderer.clone());

        let html = f
            .resolve_quick("http://x", "<h2>Дюна 2</h2>".to_string())
            .await
            .unwrap();
        assert_eq!(html, "<h2>Дюна 2</h2>");
        assert_eq!(renderer.calls(), 0);
    }

    #[tokio::test]
    async fn challenged_body_escalates_once() {
        let renderer = Arc::new(FakeRenderer::ok("<h2>Дюна 2</h2>"));
        let f = fetcher(renderer.clone());

        let html = f
            .resolve_quick("http://x", "<div>SmartCaptcha</div>".to_string())
            .await
            .unwrap();
        assert_eq!(html, "<h2>Дюна 2</h2>");
        assert_eq!(renderer.calls(), 1);
    }

    #[tokio::test]
    async fn challenge_without_renderer_is_blocked() {
        let renderer = Arc::new(FakeRenderer::unavailable());
        let f = fetcher(renderer.clone());

        let err = f
            .resolve_quick("http://x", "<p>Я не робот</p>".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Blocked));
        assert_eq!(renderer.calls(), 1);
    }
}
