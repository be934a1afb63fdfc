//! Plain text tables for the console

use std::fmt;

/// Bordered table whose cells may span several lines
#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    row_dividers: bool,
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
            row_dividers: false,
        }
    }

    /// Draw a border between every row, useful when cells hold nested tables
    pub fn with_row_dividers(mut self) -> Self {
        self.row_dividers = true;
        self
    }

    /// Append a row; missing cells render empty, extra cells are dropped
    pub fn add_row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        let mut row: Vec<String> = cells
            .into_iter()
            .take(self.headers.len())
            .map(|cell| cell.to_string())
            .collect();
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| text_width(h)).collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(text_width(cell));
            }
        }
        widths
    }
}

fn text_width(cell: &str) -> usize {
    cell.lines().map(|line| line.chars().count()).max().unwrap_or(0)
}

fn write_border(f: &mut fmt::Formatter<'_>, widths: &[usize]) -> fmt::Result {
    f.write_str("+")?;
    for width in widths {
        write!(f, "{}+", "-".repeat(width + 2))?;
    }
    writeln!(f)
}

fn write_row(f: &mut fmt::Formatter<'_>, widths: &[usize], cells: &[String]) -> fmt::Result {
    let lines: Vec<Vec<&str>> = cells.iter().map(|cell| cell.lines().collect()).collect();
    let height = lines.iter().map(Vec::len).max().unwrap_or(0).max(1);

    for line in 0..height {
        f.write_str("|")?;
        for (width, cell_lines) in widths.iter().zip(&lines) {
            let text = cell_lines.get(line).copied().unwrap_or("");
            let padding = width - text.chars().count();
            write!(f, " {}{} |", text, " ".repeat(padding))?;
        }
        writeln!(f)?;
    }
    Ok(())
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths = self.widths();

        write_border(f, &widths)?;
        write_row(f, &widths, &self.headers)?;
        write_border(f, &widths)?;
        for (index, row) in self.rows.iter().enumerate() {
            write_row(f, &widths, row)?;
            if self.row_dividers && index + 1 < self.rows.len() {
                write_border(f, &widths)?;
            }
        }
        if !self.rows.is_empty() {
            write_border(f, &widths)?;
        }
        Ok(())
    }
}
