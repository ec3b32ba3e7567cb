//! Prada 3D (Balashikha) — a static page, so a direct GET is enough.
//!
//! The site silently serves the default (today's) schedule when the `date`
//! query names a day it does not list, so for any non-today date the page
//! must first prove it is actually showing that date.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use scraper::{ElementRef, Html, Selector};

use kinowatch_core::{
    domain::{FetchMode, SourceKey},
    fetch::{FetchError, FetchResult, SourceFetcher},
};

use crate::{html::select_texts, http};

const BASE_URL: &str = "https://prada3d.ru/";

pub struct PradaFetcher {
    client: reqwest::Client,
}

impl PradaFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn build_url(day: NaiveDate) -> String {
    format!("{BASE_URL}?date={day}&city=balashiha&facility=prada-3d")
}

fn is_selected(el: ElementRef<'_>) -> bool {
    let v = el.value();

    let class = v.attr("class").unwrap_or_default().to_lowercase();
    if class.contains("active") || class.contains("selected") || class.contains("is-active") {
        return true;
    }
    if v.attr("aria-selected") == Some("true") {
        return true;
    }
    if matches!(v.attr("aria-current"), Some("date" | "page" | "true")) {
        return true;
    }
    if v.name() == "input" && matches!(v.attr("checked"), Some("" | "checked")) {
        return true;
    }
    false
}

fn looks_like_iso_date(val: &str) -> bool {
    val.len() == 10 && val.as_bytes()[4] == b'-' && val.as_bytes()[7] == b'-'
}

/// ISO dates the page offers: `?date=YYYY-MM-DD` links and inputs carrying
/// an ISO value.
fn available_dates(doc: &Html) -> BTreeSet<String> {
    let mut dates = BTreeSet::new();

    if let Ok(sel) = Selector::parse("a[href*='date=']") {
        for a in doc.select(&sel) {
            let Some(href) = a.value().attr("href") else {
                continue;
            };
            let Some((_, part)) = href.rsplit_once("date=") else {
                continue;
            };
            let iso = part.split(['&', '#']).next().unwrap_or("");
            if iso.len() == 10 {
                dates.insert(iso.to_string());
            }
        }
    }

    if let Ok(sel) = Selector::parse("input[value]") {
        for inp in doc.select(&sel) {
            if let Some(val) = inp.value().attr("value") {
                if looks_like_iso_date(val) {
                    dates.insert(val.to_string());
                }
            }
        }
    }

    dates
}

fn page_shows_date(doc: &Html, day: NaiveDate) -> bool {
    let iso = day.to_string();

    // Explicitly selected/active date widgets win.
    if let Ok(sel) = Selector::parse(&format!("a[href*='date={iso}']")) {
        if doc.select(&sel).any(is_selected) {
            return true;
        }
    }
    if let Ok(sel) = Selector::parse(&format!("input[value='{iso}']")) {
        if doc.select(&sel).any(is_selected) {
            return true;
        }
    }

    // Otherwise accept the date if it is at least offered on the page.
    available_dates(doc).contains(&iso)
}

#[async_trait]
impl SourceFetcher for PradaFetcher {
    fn key(&self) -> SourceKey {
        SourceKey::Prada
    }

    async fn fetch_raw(&self, day: NaiveDate, _mode: FetchMode) -> FetchResult<Vec<String>> {
        let url = build_url(day);
        let body = http::get_text(&self.client, &url).await?;

        let today = Local::now().date_naive();
        if day != today && !page_shows_date(&Html::parse_document(&body), day) {
            return Err(FetchError::DateNotShown);
        }

        Ok(select_texts(&body, "h1, h2, h3"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, 28).unwrap()
    }

    #[test]
    fn url_carries_date_city_and_facility() {
        assert_eq!(
            build_url(day()),
            "https://prada3d.ru/?date=2025-09-28&city=balashiha&facility=prada-3d"
        );
    }

    #[test]
    fn selected_link_confirms_the_date() {
        let doc = Html::parse_document(
            r#"<a href="?date=2025-09-28" class="day is-active">28</a>"#,
        );
        assert!(page_shows_date(&doc, day()));
    }

    #[test]
    fn checked_input_confirms_the_date() {
        let doc = Html::parse_document(r#"<input value="2025-09-28" checked>"#);
        assert!(page_shows_date(&doc, day()));
    }

    #[test]
    fn listed_but_unselected_date_is_still_accepted() {
        let doc = Html::parse_document(
            r#"<a href="?date=2025-09-27&city=x" class="day">27</a>
               <a href="?date=2025-09-28&city=x" class="day">28</a>"#,
        );
        assert!(page_shows_date(&doc, day()));
    }

    #[test]
    fn unlisted_date_is_rejected() {
        let doc = Html::parse_document(
            r#"<a href="?date=2025-09-27" class="day active">27</a>
               <h2>Дюна 2</h2>"#,
        );
        assert!(!page_shows_date(&doc, day()));
    }

    #[test]
    fn aria_markers_count_as_selected() {
        let doc =
            Html::parse_document(r#"<a href="?date=2025-09-28" aria-current="date">28</a>"#);
        assert!(page_shows_date(&doc, day()));
    }
}
