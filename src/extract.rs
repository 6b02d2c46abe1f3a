//! Linked-data (JSON-LD) extraction from raw marketplace HTML.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use serde_json::Value;
use tracing::debug;

static JSONLD_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"script[type="application/ld+json"]"#).expect("static selector is valid")
});

pub const ITEM_LIST_TYPE: &str = "ItemList";

/// Parses every `application/ld+json` block in the page.
///
/// Blocks that are empty or not valid JSON are skipped; the page as a whole
/// never fails.
pub fn extract_structured_data(html: &str) -> Vec<Value> {
    let document = Html::parse_document(html);
    let mut objects = Vec::new();

    for element in document.select(&JSONLD_SELECTOR) {
        let text: String = element.text().collect();
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(text) {
            Ok(value) => objects.push(value),
            Err(e) => debug!("Skipping malformed ld+json block: {}", e),
        }
    }

    objects
}

/// First block declaring `"@type": "ItemList"`.
pub fn find_item_list(objects: &[Value]) -> Option<&Value> {
    objects
        .iter()
        .find(|v| v.get("@type").and_then(Value::as_str) == Some(ITEM_LIST_TYPE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_valid_blocks_and_skips_broken_ones() {
        let html = r#"<html><head>
            <script type="application/ld+json">{"@type":"BreadcrumbList","itemListElement":[]}</script>
            <script type="application/ld+json">{ not json </script>
            <script type="application/ld+json">   </script>
            <script type="application/json">{"@type":"ItemList"}</script>
            </head><body>
            <script type="application/ld+json">
                {"@type":"ItemList","name":"AWP Skins","itemListElement":[{"item":{"name":"AWP | Asiimov"}}]}
            </script>
            </body></html>"#;

        let objects = extract_structured_data(html);
        assert_eq!(objects.len(), 2);

        let list = find_item_list(&objects).unwrap();
        assert_eq!(list["name"], "AWP Skins");
        assert_eq!(list["itemListElement"][0]["item"]["name"], "AWP | Asiimov");
    }

    #[test]
    fn page_without_linked_data_yields_nothing() {
        let objects = extract_structured_data("<html><body><p>No listings</p></body></html>");
        assert!(objects.is_empty());
        assert!(find_item_list(&objects).is_none());
    }

    #[test]
    fn script_text_is_not_entity_decoded_twice() {
        let html = r#"<script type="application/ld+json">{"name":"Dual Berettas | Cobra Strike &amp; Co"}</script>"#;
        let objects = extract_structured_data(html);
        assert_eq!(objects[0]["name"], "Dual Berettas | Cobra Strike &amp; Co");
    }
}
