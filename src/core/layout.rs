//! Fixed-width text tables
//!
//! Reports describe their columns with printf-style specifiers
//! (`"%-35s %-30s %,15d"`). The same description drives the header, every
//! row and the separator lines, so frames always match the table width.

use once_cell::sync::Lazy;
use regex::Regex;

static SPECIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"%(-)?(,)?(\d+)(?:\.(\d+))?([sdf])").expect("column specifier pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

/// Declared shape of one column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub width: usize,
    pub align: Align,
    /// Thousands separators for numeric cells
    pub grouped: bool,
    /// Digits after the decimal point for float cells
    pub precision: Option<usize>,
}

/// A value to place in a column
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Int(i64),
    Float(f64),
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<&String> for Cell {
    fn from(value: &String) -> Self {
        Cell::Text(value.clone())
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Int(value)
    }
}

impl From<i32> for Cell {
    fn from(value: i32) -> Self {
        Cell::Int(i64::from(value))
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Float(value)
    }
}

/// Column layout parsed from a format specification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLayout {
    columns: Vec<Column>,
}

impl TableLayout {
    /// Parse every `%[-][,]width[.precision](s|d|f)` specifier in `spec`.
    ///
    /// Anything else in the string (literal text, `%n`, `%%`) is ignored.
    pub fn parse(spec: &str) -> Self {
        let columns = SPECIFIER
            .captures_iter(spec)
            .filter_map(|caps| {
                let width = caps.get(3)?.as_str().parse().ok()?;
                Some(Column {
                    width,
                    align: if caps.get(1).is_some() {
                        Align::Left
                    } else {
                        Align::Right
                    },
                    grouped: caps.get(2).is_some(),
                    precision: caps.get(4).and_then(|p| p.as_str().parse().ok()),
                })
            })
            .collect();

        Self { columns }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Sum of the declared widths plus one space between columns
    pub fn width(&self) -> usize {
        let widths: usize = self.columns.iter().map(|column| column.width).sum();
        widths + self.columns.len().saturating_sub(1)
    }

    /// Header line: every label aligned like its column
    pub fn header(&self, labels: &[&str]) -> String {
        let cells: Vec<Cell> = labels.iter().map(|label| Cell::from(*label)).collect();
        self.row(&cells)
    }

    /// Render one line. Extra cells are dropped, missing cells render blank.
    pub fn row(&self, cells: &[Cell]) -> String {
        self.columns
            .iter()
            .enumerate()
            .map(|(position, column)| {
                let text = cells
                    .get(position)
                    .map(|cell| format_cell(cell, column))
                    .unwrap_or_default();
                pad(&text, column)
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Full-width line of `ch`
    pub fn separator(&self, ch: char) -> String {
        repeated_line(self.width(), ch)
    }
}

/// Width of a table described by `spec`; 0 when it has no columns
pub fn separator_width(spec: &str) -> usize {
    TableLayout::parse(spec).width()
}

pub fn repeated_line(width: usize, ch: char) -> String {
    std::iter::repeat(ch).take(width).collect()
}

/// `1234567` -> `1,234,567`
pub fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);

    if value < 0 {
        grouped.push('-');
    }
    for (position, digit) in digits.chars().enumerate() {
        if position > 0 && (digits.len() - position) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

fn format_cell(cell: &Cell, column: &Column) -> String {
    match cell {
        Cell::Text(text) => text.clone(),
        Cell::Int(value) if column.grouped => group_thousands(*value),
        Cell::Int(value) => value.to_string(),
        Cell::Float(value) => {
            let precision = column.precision.unwrap_or(2);
            let formatted = format!("{:.*}", precision, value);
            if column.grouped {
                group_float(&formatted)
            } else {
                formatted
            }
        }
    }
}

fn group_float(formatted: &str) -> String {
    let (integral, fraction) = formatted
        .split_once('.')
        .map_or((formatted, None), |(i, f)| (i, Some(f)));

    let grouped = integral
        .parse::<i64>()
        .map(group_thousands)
        .unwrap_or_else(|_| integral.to_string());

    match fraction {
        Some(fraction) => format!("{}.{}", grouped, fraction),
        None => grouped,
    }
}

fn pad(text: &str, column: &Column) -> String {
    match column.align {
        Align::Left => format!("{:<width$}", text, width = column.width),
        Align::Right => format!("{:>width$}", text, width = column.width),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_three_columns() {
        assert_eq!(separator_width("%-10s %20s %,15d"), 10 + 20 + 15 + 2);
    }

    #[test]
    fn test_no_columns_and_single_column() {
        assert_eq!(separator_width(""), 0);
        assert_eq!(separator_width("plain text%n"), 0);
        assert_eq!(separator_width("%-12s%n"), 12);
    }

    #[test]
    fn test_parse_flags() {
        let layout = TableLayout::parse("%-35s %,15d %11.2f");
        assert_eq!(
            layout.columns(),
            &[
                Column {
                    width: 35,
                    align: Align::Left,
                    grouped: false,
                    precision: None,
                },
                Column {
                    width: 15,
                    align: Align::Right,
                    grouped: true,
                    precision: None,
                },
                Column {
                    width: 11,
                    align: Align::Right,
                    grouped: false,
                    precision: Some(2),
                },
            ]
        );
    }

    #[test]
    fn test_header_matches_separator() {
        let layout = TableLayout::parse("%-35s %-30s %-20s %,15d%n");
        let header = layout.header(&["City", "Country", "District", "Population"]);

        assert_eq!(header.chars().count(), layout.separator('=').chars().count());
        assert!(header.starts_with("City "));
        assert!(header.ends_with("     Population"));
    }

    #[test]
    fn test_row_formatting() {
        let layout = TableLayout::parse("%-8s %,12d %8.1f");
        let line = layout.row(&[Cell::from("Tokyo"), Cell::from(7_980_230_i64), Cell::from(12.345)]);
        assert_eq!(line, "Tokyo       7,980,230     12.3");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_000), "1,000");
        assert_eq!(group_thousands(6_078_749_450), "6,078,749,450");
        assert_eq!(group_thousands(-1_234_567), "-1,234,567");
    }

    #[test]
    fn test_grouped_float() {
        let layout = TableLayout::parse("%,12.2f");
        assert_eq!(layout.row(&[Cell::from(1234567.891)]), "1,234,567.89");
    }

    #[test]
    fn test_repeated_line() {
        assert_eq!(repeated_line(5, '-'), "-----");
        assert_eq!(repeated_line(0, '='), "");
    }

    #[test]
    fn test_missing_cells_render_blank() {
        let layout = TableLayout::parse("%-4s %4s");
        assert_eq!(layout.row(&[Cell::from("ab")]), "ab       ");
    }

    fn column_strategy() -> impl Strategy<Value = (usize, bool, bool)> {
        (1usize..40, any::<bool>(), any::<bool>())
    }

    proptest! {
        #[test]
        fn prop_header_width_equals_separator(columns in prop::collection::vec(column_strategy(), 0..8)) {
            let spec: Vec<String> = columns
                .iter()
                .map(|(width, left, grouped)| {
                    format!(
                        "%{}{}{}{}",
                        if *left { "-" } else { "" },
                        if *grouped { "," } else { "" },
                        width,
                        if *grouped { "d" } else { "s" }
                    )
                })
                .collect();
            let spec = format!("{}%n", spec.join(" "));

            let layout = TableLayout::parse(&spec);
            // labels never exceed the narrowest possible column
            let labels: Vec<&str> = columns.iter().map(|_| "x").collect();
            let header = layout.header(&labels);

            let expected: usize = columns.iter().map(|(width, _, _)| width).sum::<usize>()
                + columns.len().saturating_sub(1);
            prop_assert_eq!(separator_width(&spec), expected);
            prop_assert_eq!(header.chars().count(), expected);
        }
    }
}
