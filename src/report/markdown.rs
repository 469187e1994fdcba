//! Markdown output: headings, paragraphs and aligned tables

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

static MARKDOWN_ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([\]!#*<>\[\\_`|])").expect("valid markdown escape regex"));

/// Backslash-escape the characters that would change how a table cell renders
pub fn escape(text: &str) -> Cow<'_, str> {
    MARKDOWN_ESCAPE.replace_all(text, r"\${1}")
}

/// Render a table with every column padded to its widest cell.
///
/// Cells are escaped first. Columns are at least two characters wide so the
/// separator row is always a valid Markdown delimiter. With `hide` the table
/// is wrapped in a collapsed `<details>` block.
pub fn table<S: AsRef<str>>(header: &[&str], rows: &[Vec<S>], hide: bool) -> String {
    let escaped: Vec<Vec<Cow<'_, str>>> =
        std::iter::once(header.iter().map(|h| escape(h)).collect::<Vec<_>>())
            .chain(rows.iter().map(|row| {
                row.iter()
                    .map(|cell| escape(cell.as_ref()))
                    .collect::<Vec<_>>()
            }))
            .collect();

    let widths: Vec<usize> = (0..header.len())
        .map(|col| {
            escaped
                .iter()
                .filter_map(|row| row.get(col))
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or(0)
                .max(2)
        })
        .collect();

    let format_row = |cells: Vec<Cow<'_, str>>| -> String {
        widths
            .iter()
            .enumerate()
            .map(|(col, &width)| {
                let cell = cells.get(col).map(|c| c.as_ref()).unwrap_or("");
                format!("{:<width$}", cell)
            })
            .collect::<Vec<_>>()
            .join(" | ")
    };

    let mut lines = Vec::with_capacity(escaped.len() + 1);
    let mut escaped = escaped.into_iter();
    if let Some(header) = escaped.next() {
        lines.push(format_row(header));
    }
    lines.push(
        widths
            .iter()
            .map(|&width| "-".repeat(width))
            .collect::<Vec<_>>()
            .join(" | "),
    );
    lines.extend(escaped.map(format_row));

    let body = lines.join("\n");
    if hide {
        format!("<details>\n<summary>Click to show the table</summary>\n\n{}\n\n</details>", body)
    } else {
        body
    }
}

/// A Markdown document assembled block by block
#[derive(Debug, Default)]
pub struct Markdown {
    text: String,
}

impl Markdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn heading(&mut self, level: usize, title: &str) -> &mut Self {
        self.block(&format!("{} {}", "#".repeat(level), title))
    }

    pub fn paragraph(&mut self, text: &str) -> &mut Self {
        self.block(text)
    }

    pub fn table<S: AsRef<str>>(&mut self, header: &[&str], rows: &[Vec<S>], hide: bool) -> &mut Self {
        self.block(&table(header, rows, hide))
    }

    /// Append a block separated from the previous one by a blank line
    fn block(&mut self, text: &str) -> &mut Self {
        if !self.text.is_empty() {
            self.text.push_str("\n\n");
        }
        self.text.push_str(text);
        self
    }

    pub fn finish(mut self) -> String {
        self.text.push('\n');
        self.text
    }
}
