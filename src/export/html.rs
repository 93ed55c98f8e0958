use std::io::{self, Write};

use chrono::{DateTime, TimeZone};

use crate::parser::containers::ContainerRecord;
use crate::parser::fragments::{Fragment, StructuredContainer};

const STYLE: &str = "body{font-family:Arial,sans-serif;max-width:800px;margin:0 auto;padding:20px}\
.container{border:1px solid #ddd;margin:20px 0;padding:15px;border-radius:5px}\
h2{color:#333}pre{white-space:pre-wrap;background:#f5f5f5;padding:10px;border-radius:3px}\
footer{color:#888;font-size:12px}";

pub fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn write_head<W: Write>(w: &mut W, title: &str) -> io::Result<()> {
    writeln!(w, "<!DOCTYPE html>\n<html>\n<head>")?;
    writeln!(w, "<meta charset=\"UTF-8\">")?;
    writeln!(w, "<title>{}</title>", escape(title))?;
    writeln!(w, "<style>{}</style>", STYLE)?;
    writeln!(w, "</head>\n<body>")?;
    writeln!(w, "<h1>{}</h1>", escape(title))
}

fn write_foot<W: Write, Tz: TimeZone>(w: &mut W, generated: DateTime<Tz>) -> io::Result<()>
where
    Tz::Offset: std::fmt::Display,
{
    writeln!(
        w,
        "<footer>Generated {}</footer>",
        generated.format("%Y-%m-%d %H:%M:%S %Z")
    )?;
    write!(w, "</body>\n</html>\n")
}

/// Report page with the escaped HTML source and the text of every container.
pub fn write_records<W: Write, Tz: TimeZone>(
    mut w: W,
    records: &[ContainerRecord],
    generated: DateTime<Tz>,
) -> io::Result<()>
where
    Tz::Offset: std::fmt::Display,
{
    write_head(&mut w, "Lyrics Scraping Results")?;
    for r in records {
        writeln!(w, "<div class=\"container\">")?;
        writeln!(
            w,
            "<h2>Container {} from {}</h2>",
            r.container_number,
            escape(&r.url)
        )?;
        writeln!(w, "<h3>HTML Content:</h3>\n<pre>{}</pre>", escape(&r.html_content))?;
        writeln!(w, "<h3>Text Content:</h3>\n<p>{}</p>", escape(&r.text_content))?;
        writeln!(w, "</div>")?;
    }
    write_foot(&mut w, generated)
}

fn fragment_markup(f: &Fragment) -> String {
    match f {
        Fragment::Text(t) => escape(t),
        Fragment::Span(t) => format!("<span>{}</span>", escape(t)),
        Fragment::Link { label, href } => match href {
            Some(h) => format!("<a href=\"{}\"><span>{}</span></a>", escape(h), escape(label)),
            None => format!("<a><span>{}</span></a>", escape(label)),
        },
        Fragment::Element { tag, text } => format!("<{tag}>{}</{tag}>", escape(text)),
    }
}

/// Re-render the classified fragments, one `<br>` per line break.
pub fn write_structured<W: Write, Tz: TimeZone>(
    mut w: W,
    containers: &[StructuredContainer],
    generated: DateTime<Tz>,
) -> io::Result<()>
where
    Tz::Offset: std::fmt::Display,
{
    write_head(&mut w, "Extracted Lyrics")?;
    for c in containers {
        writeln!(
            w,
            "<div class=\"container\" data-container=\"{}\">",
            c.container_number
        )?;
        let rendered: Vec<String> = c
            .lines
            .iter()
            .map(|line| {
                line.iter()
                    .map(fragment_markup)
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect();
        writeln!(w, "{}", rendered.join("<br>\n"))?;
        writeln!(w, "</div>")?;
    }
    write_foot(&mut w, generated)
}
