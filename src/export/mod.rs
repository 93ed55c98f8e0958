pub mod csv;
pub mod html;
pub mod text;

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use tracing::info;

use crate::parser::containers::ContainerRecord;
use crate::parser::fragments::{Fragment, StructuredContainer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Csv,
    Html,
    #[value(alias = "text")]
    Txt,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Html => "html",
            OutputFormat::Txt => "txt",
        };
        f.write_str(name)
    }
}

/// Raw container records in the requested format.
pub fn write_records<W: Write>(mut w: W, records: &[ContainerRecord], format: OutputFormat) -> io::Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut w, records)?;
            writeln!(w)
        }
        OutputFormat::Csv => csv::write_records(w, records),
        OutputFormat::Html => html::write_records(w, records, chrono::Local::now()),
        OutputFormat::Txt => text::write_records(w, records),
    }
}

/// Structured containers in the requested format. JSON is the flat fragment list.
pub fn write_structured<W: Write>(
    mut w: W,
    containers: &[StructuredContainer],
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Json => {
            let flat: Vec<&Fragment> = containers.iter().flat_map(|c| c.fragments()).collect();
            serde_json::to_writer_pretty(&mut w, &flat)?;
            writeln!(w)
        }
        OutputFormat::Csv => csv::write_structured(w, containers),
        OutputFormat::Html => html::write_structured(w, containers, chrono::Local::now()),
        OutputFormat::Txt => text::write_structured(w, containers),
    }
}

/// Open `path` for writing, creating missing parent directories.
pub fn create_output(path: &Path) -> Result<BufWriter<File>> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    Ok(BufWriter::new(file))
}

/// Run `write` against a file (if given) or stdout, flushing either way.
pub fn emit<F>(output: Option<&Path>, format: OutputFormat, write: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    match output {
        Some(path) => {
            let mut out = create_output(path)?;
            write(&mut out).with_context(|| format!("Failed to write {}", path.display()))?;
            out.flush()?;
            info!("Results saved to {} in {} format", path.display(), format);
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            write(&mut out).context("Failed to write to stdout")?;
            out.flush()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ContainerRecord {
        ContainerRecord {
            url: "https://example.com/song".into(),
            container_number: 1,
            html_content: "<div data-lyrics-container=\"true\">Ça va<br>bien</div>".into(),
            text_content: "Ça vabien".into(),
        }
    }

    #[test]
    fn json_keeps_non_ascii() {
        let mut buf = Vec::new();
        write_records(&mut buf, &[record()], OutputFormat::Json).unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert!(out.contains("Ça vabien"));
        let back: Vec<ContainerRecord> = serde_json::from_str(&out).unwrap();
        assert_eq!(back, vec![record()]);
    }

    #[test]
    fn structured_json_is_flat() {
        let containers = vec![
            StructuredContainer {
                container_number: 1,
                lines: vec![
                    vec![Fragment::Text("a".into())],
                    vec![Fragment::Span("b".into())],
                ],
            },
            StructuredContainer {
                container_number: 2,
                lines: vec![vec![Fragment::Text("c".into())]],
            },
        ];
        let mut buf = Vec::new();
        write_structured(&mut buf, &containers, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(
            value,
            serde_json::json!([{"text": "a"}, {"type": "span", "text": "b"}, {"text": "c"}])
        );
    }

    #[test]
    fn emit_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/results.json");
        emit(Some(&path), OutputFormat::Json, |w| {
            write_records(w, &[record()], OutputFormat::Json)
        })
        .unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"container_number\": 1"));
    }

    #[test]
    fn text_alias_parses() {
        assert_eq!(OutputFormat::from_str("text", true).unwrap(), OutputFormat::Txt);
        assert_eq!(OutputFormat::from_str("csv", true).unwrap(), OutputFormat::Csv);
    }
}
