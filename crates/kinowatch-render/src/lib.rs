//! Headless-browser adapter for the thorough fetch strategy.
//!
//! Drives a local Chrome/Chromium over the DevTools protocol: navigate,
//! scroll in stages to trigger lazily-loaded cards, wait for a known
//! selector, then hand back the rendered HTML. The `headless_chrome` API is
//! blocking, so the whole interaction runs on the blocking thread pool.

use std::{path::PathBuf, time::Duration};

use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions};
use tracing::debug;

use kinowatch_core::{
    config::Config,
    fetch::{FetchError, FetchResult, PageRenderer},
};

const SCROLL_STEP_PX: u32 = 1200;

#[derive(Clone)]
pub struct ChromeRenderer {
    chrome_path: Option<PathBuf>,
    nav_timeout: Duration,
    ready_timeout: Duration,
    scroll_steps: u32,
    scroll_pause: Duration,
}

impl ChromeRenderer {
    pub fn new(cfg: &Config) -> Self {
        Self {
            chrome_path: cfg.chrome_path.clone(),
            nav_timeout: cfg.render_nav_timeout,
            ready_timeout: cfg.render_ready_timeout,
            scroll_steps: cfg.render_scroll_steps,
            scroll_pause: cfg.render_scroll_pause,
        }
    }

    fn render_blocking(&self, url: &str, ready_selector: &str) -> FetchResult<String> {
        let options = LaunchOptions::default_builder()
            .headless(true)
            .path(self.chrome_path.clone())
            .build()
            .map_err(|e| FetchError::RendererUnavailable(e.to_string()))?;

        // Launch failure usually means no Chrome/Chromium on this host.
        let browser =
            Browser::new(options).map_err(|e| FetchError::RendererUnavailable(e.to_string()))?;
        let tab = browser
            .new_tab()
            .map_err(|e| FetchError::RendererUnavailable(e.to_string()))?;
        tab.set_default_timeout(self.nav_timeout);

        tab.navigate_to(url)
            .and_then(|t| t.wait_until_navigated())
            .map_err(|e| FetchError::Http(format!("{url}: {e}")))?;

        // Staged scroll so lazily-loaded cards actually mount.
        for _ in 0..self.scroll_steps {
            let _ = tab.evaluate(&format!("window.scrollBy(0, {SCROLL_STEP_PX})"), false);
            std::thread::sleep(self.scroll_pause);
        }

        if tab
            .wait_for_element_with_custom_timeout(ready_selector, self.ready_timeout)
            .is_err()
        {
            // Grab whatever rendered; the parse decides if it was enough.
            debug!(url, "ready selector never appeared");
            std::thread::sleep(Duration::from_millis(800));
        }

        tab.get_content()
            .map_err(|e| FetchError::Http(format!("{url}: {e}")))
    }
}

#[async_trait]
impl PageRenderer for ChromeRenderer {
    async fn render(&self, url: &str, ready_selector: &str) -> FetchResult<String> {
        let renderer = self.clone();
        let url = url.to_string();
        let ready = ready_selector.to_string();

        tokio::task::spawn_blocking(move || renderer.render_blocking(&url, &ready))
            .await
            .map_err(|e| FetchError::RendererUnavailable(format!("render task failed: {e}")))?
    }
}
