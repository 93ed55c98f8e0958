pub mod containers;
pub mod fragments;

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use containers::ContainerRecord;
use fragments::StructuredContainer;

static CONTAINER_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"div[data-lyrics-container="true"]"#).unwrap()
});

/// Every lyrics container in document order.
pub fn find_containers(document: &Html) -> Vec<ElementRef<'_>> {
    document.select(&CONTAINER_SELECTOR).collect()
}

/// Raw pass: one record per container with its outer HTML and stripped text.
pub fn parse_raw(url: &str, html: &str) -> Vec<ContainerRecord> {
    let document = Html::parse_document(html);
    find_containers(&document)
        .into_iter()
        .enumerate()
        .map(|(i, el)| containers::raw_record(url, i + 1, el))
        .collect()
}

/// Structured pass: containers split into lines of classified fragments.
/// The second value is the number of containers matched, including empty ones.
pub fn parse_structured(html: &str) -> (Vec<StructuredContainer>, usize) {
    let document = Html::parse_document(html);
    let found = find_containers(&document);
    let total = found.len();
    let structured = found
        .into_iter()
        .enumerate()
        .filter_map(|(i, el)| {
            let lines = fragments::extract_lines(el);
            if lines.is_empty() {
                None
            } else {
                Some(StructuredContainer {
                    container_number: i + 1,
                    lines,
                })
            }
        })
        .collect();
    (structured, total)
}
