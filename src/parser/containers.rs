use scraper::ElementRef;
use serde::{Deserialize, Serialize};

/// One matched container, captured as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerRecord {
    pub url: String,
    pub container_number: usize,
    pub html_content: String,
    pub text_content: String,
}

pub fn raw_record(url: &str, container_number: usize, container: ElementRef<'_>) -> ContainerRecord {
    ContainerRecord {
        url: url.to_string(),
        container_number,
        html_content: container.html(),
        text_content: stripped_text(container),
    }
}

/// Every descendant text node trimmed and glued together, empty ones skipped.
pub fn stripped_text(el: ElementRef<'_>) -> String {
    el.text().map(str::trim).filter(|t| !t.is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn stripped_text_has_no_separator() {
        let doc = Html::parse_fragment("<div>  Hello <br/> <b> world </b>\n!</div>");
        let sel = scraper::Selector::parse("div").unwrap();
        let div = doc.select(&sel).next().unwrap();
        assert_eq!(stripped_text(div), "Helloworld!");
    }

    #[test]
    fn record_keeps_outer_html() {
        let doc = Html::parse_fragment(r#"<div data-lyrics-container="true">a<br>b</div>"#);
        let sel = scraper::Selector::parse("div").unwrap();
        let div = doc.select(&sel).next().unwrap();
        let rec = raw_record("https://example.com", 3, div);
        assert_eq!(rec.container_number, 3);
        assert_eq!(rec.html_content, r#"<div data-lyrics-container="true">a<br>b</div>"#);
        assert_eq!(rec.text_content, "ab");
    }

    #[test]
    fn outer_html_keeps_attribute_order() {
        let src = r#"<div data-lyrics-container="true" class="Lyrics__Container" id="c1" data-n="7">x</div>"#;
        let sel = scraper::Selector::parse("div").unwrap();
        for _ in 0..20 {
            let doc = Html::parse_fragment(src);
            let div = doc.select(&sel).next().unwrap();
            assert_eq!(raw_record("u", 1, div).html_content, src);
        }
    }
}
