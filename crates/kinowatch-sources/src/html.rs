use scraper::{Html, Selector};

/// Text of every element matching `selector`, in document order, trimmed,
/// with empty strings dropped. Inner whitespace is left alone; the title
/// filter collapses it downstream.
pub fn select_texts(html: &str, selector: &str) -> Vec<String> {
    let doc = Html::parse_document(html);
    let Ok(sel) = Selector::parse(selector) else {
        return Vec::new();
    };

    doc.select(&sel)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}
