use std::io::{self, Write};

use crate::parser::containers::ContainerRecord;
use crate::parser::fragments::StructuredContainer;

pub fn write_records<W: Write>(mut w: W, records: &[ContainerRecord]) -> io::Result<()> {
    for r in records {
        writeln!(w, "=== Container {} from {} ===\n", r.container_number, r.url)?;
        writeln!(w, "--- HTML Content ---")?;
        writeln!(w, "{}\n", r.html_content)?;
        writeln!(w, "--- Text Content ---")?;
        writeln!(w, "{}\n", r.text_content)?;
        writeln!(w, "{}\n", "=".repeat(50))?;
    }
    Ok(())
}

/// Console listing used by `batch` when no format was asked for.
pub fn write_listing<W: Write>(mut w: W, records: &[ContainerRecord]) -> io::Result<()> {
    for r in records {
        writeln!(w, "\n--- Container {} from {} ---", r.container_number, r.url)?;
        writeln!(w, "HTML Content:\n{}", r.html_content)?;
        writeln!(w, "\nText Content:\n{}", r.text_content)?;
        writeln!(w, "{}", "-".repeat(50))?;
    }
    Ok(())
}

/// One output line per lyric line, blank line between containers.
pub fn write_structured<W: Write>(mut w: W, containers: &[StructuredContainer]) -> io::Result<()> {
    for (i, c) in containers.iter().enumerate() {
        if i > 0 {
            writeln!(w)?;
        }
        for line in &c.lines {
            let text: Vec<&str> = line.iter().map(|f| f.text()).collect();
            writeln!(w, "{}", text.join(" "))?;
        }
    }
    Ok(())
}
