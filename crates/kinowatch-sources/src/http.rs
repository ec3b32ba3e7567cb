use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, USER_AGENT};

use kinowatch_core::{config::Config, fetch::FetchError};

/// Build the shared HTTP client used by the quick strategies.
///
/// A desktop browser UA and Russian Accept-Language keep the listing sites
/// serving the same markup they serve real visitors.
pub fn build_client(cfg: &Config) -> reqwest::Client {
    let mut headers = HeaderMap::new();
    if let Ok(v) = HeaderValue::from_str(&cfg.user_agent) {
        headers.insert(USER_AGENT, v);
    }
    if let Ok(v) = HeaderValue::from_str(&cfg.accept_language) {
        headers.insert(ACCEPT_LANGUAGE, v);
    }

    reqwest::Client::builder()
        .timeout(cfg.http_timeout)
        .default_headers(headers)
        .build()
        .expect("reqwest client build")
}

/// GET `url` and return the body. Transport failures and non-2xx statuses
/// both map to `FetchError::Http`.
pub async fn get_text(client: &reqwest::Client, url: &str) -> Result<String, FetchError> {
    let resp = client
        .get(url)
        .send()
        .await
        .map_err(|e| FetchError::Http(format!("{url}: {e}")))?
        .error_for_status()
        .map_err(|e| FetchError::Http(format!("{url}: {e}")))?;

    resp.text()
        .await
        .map_err(|e| FetchError::Http(format!("{url}: {e}")))
}
