//! Output formatting for listings.
//!
//! Listings render either as a boxed table (`--pretty`) or as plain,
//! left-aligned columns without a header, which is easier to grep.

use std::io::Write;

use serde_json::Value;

use crate::error::MistError;

/// Rows of already-formatted cells under a fixed header.
#[derive(Debug, Clone)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Table {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row. Short rows are padded with empty cells.
    pub fn add_row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut row: Vec<String> = cells.into_iter().map(Into::into).collect();
        row.resize(self.headers.len().max(row.len()), String::new());
        self.rows.push(row);
    }

    fn widths(&self, with_headers: bool) -> Vec<usize> {
        let cols = self
            .rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0);
        let mut widths = vec![0; cols];
        let header_row = with_headers.then_some(&self.headers);
        for row in header_row.into_iter().chain(self.rows.iter()) {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
        widths
    }

    pub fn render(&self, pretty: bool) -> String {
        if pretty {
            self.render_pretty()
        } else {
            self.render_plain()
        }
    }

    fn render_pretty(&self) -> String {
        let widths = self.widths(true);
        let border: String = widths
            .iter()
            .map(|w| format!("+{}", "-".repeat(w + 2)))
            .collect::<String>()
            + "+\n";
        let line = |cells: &[String]| {
            let mut s = String::new();
            for (i, w) in widths.iter().enumerate() {
                let cell = cells.get(i).map(String::as_str).unwrap_or("");
                s.push_str(&format!("| {} ", pad(cell, *w)));
            }
            s.push_str("|\n");
            s
        };

        let mut out = border.clone();
        out.push_str(&line(&self.headers));
        out.push_str(&border);
        for row in &self.rows {
            out.push_str(&line(row));
        }
        out.push_str(&border);
        out
    }

    fn render_plain(&self) -> String {
        let widths = self.widths(false);
        let mut out = String::new();
        for row in &self.rows {
            let line: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(cell, w)| pad(cell, *w))
                .collect();
            out.push_str(line.join("  ").trim_end());
            out.push('\n');
        }
        out
    }

    pub fn write<W: Write>(&self, out: &mut W, pretty: bool) -> Result<(), MistError> {
        out.write_all(self.render(pretty).as_bytes())?;
        Ok(())
    }
}

fn pad(cell: &str, width: usize) -> String {
    let len = cell.chars().count();
    format!("{}{}", cell, " ".repeat(width.saturating_sub(len)))
}

/// Render a JSON scalar the way a person would type it: strings without
/// quotes, null as empty.
pub fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(cell).collect::<Vec<_>>().join(", "),
        other => other.to_string(),
    }
}

/// Print a raw JSON value: bare strings as-is, everything else pretty-printed.
pub fn write_json<W: Write>(out: &mut W, value: &Value) -> Result<(), MistError> {
    match value {
        Value::String(s) => writeln!(out, "{}", s)?,
        other => {
            serde_json::to_writer_pretty(&mut *out, other)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn keys_table() -> Table {
        let mut t = Table::new(["Name", "Is Default"]);
        t.add_row(["deploy", "true"]);
        t.add_row(["ci-runner", "false"]);
        t
    }

    #[test]
    fn pretty_table_has_borders_and_header() {
        let rendered = keys_table().render(true);
        let expected = "\
+-----------+------------+
| Name      | Is Default |
+-----------+------------+
| deploy    | true       |
| ci-runner | false      |
+-----------+------------+
";
        assert_eq!(rendered, expected);
    }

    #[test]
    fn plain_table_aligns_columns_without_header() {
        let rendered = keys_table().render(false);
        assert_eq!(rendered, "deploy     true\nci-runner  false\n");
    }

    #[test]
    fn short_rows_are_padded() {
        let mut t = Table::new(["A", "B", "C"]);
        t.add_row(["x"]);
        assert!(t.render(true).contains("| x |   |   |"));
    }

    #[test]
    fn cells_render_json_scalars() {
        assert_eq!(cell(&json!("a")), "a");
        assert_eq!(cell(&json!(null)), "");
        assert_eq!(cell(&json!(true)), "true");
        assert_eq!(cell(&json!(["10.0.0.0/8", "10.1.0.0/16"])), "10.0.0.0/8, 10.1.0.0/16");
    }

    #[test]
    fn write_json_prints_strings_bare() {
        let mut buf = Vec::new();
        write_json(&mut buf, &json!("ssh-rsa AAAA")).expect("write");
        assert_eq!(String::from_utf8(buf).expect("utf8"), "ssh-rsa AAAA\n");
    }
}
