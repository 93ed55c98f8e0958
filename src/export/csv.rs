use std::io::{self, Write};

use crate::parser::containers::ContainerRecord;
use crate::parser::fragments::StructuredContainer;

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Write one comma-separated row, quoting fields where needed. Rows end in CRLF.
pub fn write_row<W: Write, S: AsRef<str>>(mut w: W, row: &[S]) -> io::Result<()> {
    for (i, cell) in row.iter().enumerate() {
        if i > 0 {
            w.write_all(b",")?;
        }
        let cell = cell.as_ref();
        if needs_quotes(cell) {
            write!(w, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            w.write_all(cell.as_bytes())?;
        }
    }
    w.write_all(b"\r\n")
}

pub fn write_records<W: Write>(mut w: W, records: &[ContainerRecord]) -> io::Result<()> {
    write_row(&mut w, &["URL", "Container Number", "Text Content"])?;
    for r in records {
        write_row(
            &mut w,
            &[
                r.url.as_str(),
                r.container_number.to_string().as_str(),
                r.text_content.as_str(),
            ],
        )?;
    }
    Ok(())
}

pub fn write_structured<W: Write>(mut w: W, containers: &[StructuredContainer]) -> io::Result<()> {
    write_row(&mut w, &["Container", "Line", "Type", "Text", "Href"])?;
    for c in containers {
        for (line_no, line) in c.lines.iter().enumerate() {
            for fragment in line {
                write_row(
                    &mut w,
                    &[
                        c.container_number.to_string().as_str(),
                        (line_no + 1).to_string().as_str(),
                        fragment.kind(),
                        fragment.text(),
                        fragment.href().unwrap_or(""),
                    ],
                )?;
            }
        }
    }
    Ok(())
}
