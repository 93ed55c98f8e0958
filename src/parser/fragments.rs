use scraper::{ElementRef, Node};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// One classified piece of container content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Text(String),
    Span(String),
    Link { label: String, href: Option<String> },
    Element { tag: String, text: String },
}

/// Fragments between two `<br>` markers.
pub type Line = Vec<Fragment>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructuredContainer {
    pub container_number: usize,
    pub lines: Vec<Line>,
}

impl StructuredContainer {
    pub fn fragments(&self) -> impl Iterator<Item = &Fragment> {
        self.lines.iter().flatten()
    }
}

impl Fragment {
    /// The `type` tag used in JSON and CSV output.
    pub fn kind(&self) -> &str {
        match self {
            Fragment::Text(_) => "text",
            Fragment::Span(_) => "span",
            Fragment::Link { .. } => "a",
            Fragment::Element { tag, .. } => tag,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Fragment::Text(t) | Fragment::Span(t) => t,
            Fragment::Link { label, .. } => label,
            Fragment::Element { text, .. } => text,
        }
    }

    pub fn href(&self) -> Option<&str> {
        match self {
            Fragment::Link { href, .. } => href.as_deref(),
            _ => None,
        }
    }
}

#[derive(Serialize)]
struct SpanLabel<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
}

impl Serialize for Fragment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Fragment::Text(text) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("text", text)?;
                map.end()
            }
            Fragment::Span(text) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", "span")?;
                map.serialize_entry("text", text)?;
                map.end()
            }
            Fragment::Link { label, href } => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("type", "a")?;
                map.serialize_entry("content", &SpanLabel { kind: "span", text: label })?;
                map.serialize_entry("href", href)?;
                map.end()
            }
            Fragment::Element { tag, text } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", tag)?;
                map.serialize_entry("text", text)?;
                map.end()
            }
        }
    }
}

fn is_excluded(el: ElementRef<'_>) -> bool {
    el.value().name() == "div" && el.value().attr("data-exclude-from-selection") == Some("true")
}

/// Split a container's direct children on `<br>` and classify each one.
/// Empty lines are not emitted.
pub fn extract_lines(container: ElementRef<'_>) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut current: Line = Vec::new();

    for child in container.children() {
        match child.value() {
            Node::Text(t) => {
                let t = t.trim();
                if !t.is_empty() {
                    current.push(Fragment::Text(t.to_string()));
                }
            }
            Node::Element(_) => {
                let Some(el) = ElementRef::wrap(child) else {
                    continue;
                };
                if el.value().name() == "br" {
                    if !current.is_empty() {
                        lines.push(std::mem::take(&mut current));
                    }
                    continue;
                }
                if let Some(fragment) = classify(el) {
                    current.push(fragment);
                }
            }
            // comments, doctypes, processing instructions
            _ => {}
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn classify(el: ElementRef<'_>) -> Option<Fragment> {
    if is_excluded(el) {
        return None;
    }

    match el.value().name() {
        "a" => {
            // Only the first <span> child carries the label.
            let span = el
                .children()
                .filter_map(ElementRef::wrap)
                .find(|c| c.value().name() == "span")?;
            let label = visible_text(span);
            if label.is_empty() {
                return None;
            }
            Some(Fragment::Link {
                label,
                href: el.value().attr("href").map(str::to_string),
            })
        }
        "span" => non_empty(visible_text(el)).map(Fragment::Span),
        tag => non_empty(visible_text(el)).map(|text| Fragment::Element {
            tag: tag.to_string(),
            text,
        }),
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Descendant text with excluded sub-trees skipped, trimmed.
pub fn visible_text(el: ElementRef<'_>) -> String {
    let mut out = String::new();
    collect_text(el, &mut out);
    out.trim().to_string()
}

fn collect_text(el: ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        match child.value() {
            Node::Text(t) => out.push_str(t),
            Node::Element(_) => {
                if let Some(c) = ElementRef::wrap(child) {
                    if !is_excluded(c) {
                        collect_text(c, out);
                    }
                }
            }
            _ => {}
        }
    }
}
