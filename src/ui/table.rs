//! Plain column-aligned tables for list output.

use console::{Alignment, measure_text_width, pad_str, style, truncate_str};

const MAX_CELL_WIDTH: usize = 40;

#[derive(Debug, Clone, Default)]
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
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Missing cells render empty; extra cells are dropped.
    pub fn add_row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut row: Vec<String> = cells.into_iter().map(Into::into).collect();
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn render(&self) -> String {
        let widths: Vec<usize> = self
            .headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                self.rows
                    .iter()
                    .map(|row| measure_text_width(&row[i]).min(MAX_CELL_WIDTH))
                    .chain(std::iter::once(measure_text_width(header)))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let line = |cells: &[String]| {
            cells
                .iter()
                .zip(&widths)
                .map(|(cell, width)| {
                    let cell = truncate_str(cell, MAX_CELL_WIDTH, "…");
                    pad_str(&cell, *width, Alignment::Left, None).into_owned()
                })
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        let mut out = Vec::with_capacity(self.rows.len() + 2);
        out.push(style(line(&self.headers)).bold().to_string());
        out.push(
            widths
                .iter()
                .map(|w| "─".repeat(*w))
                .collect::<Vec<_>>()
                .join("  "),
        );
        for row in &self.rows {
            out.push(line(row));
        }
        out.join("\n")
    }
}
