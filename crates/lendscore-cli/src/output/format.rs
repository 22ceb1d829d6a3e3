use serde_json::Value;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Align {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy)]
pub struct Column<'a> {
    pub name: &'a str,
    pub align: Align,
}

const COLUMN_GAP: &str = "  ";

pub fn key_value_rows(entries: &[(&str, String)], indent: usize) -> Vec<String> {
    let label_width = entries
        .iter()
        .map(|(label, _)| label.len())
        .max()
        .unwrap_or(0);
    let padding = " ".repeat(indent);

    entries
        .iter()
        .map(|(label, value)| format!("{padding}{label:<label_width$}  {value}"))
        .collect()
}

/// Fixed-width table: each column is as wide as its longest cell.
pub fn render_table(columns: &[Column<'_>], rows: &[Vec<String>], indent: usize) -> Vec<String> {
    let mut widths = columns
        .iter()
        .map(|column| column.name.len())
        .collect::<Vec<usize>>();
    for row in rows {
        for (index, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(index) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let header = columns
        .iter()
        .map(|column| column.name.to_string())
        .collect::<Vec<String>>();
    std::iter::once(&header)
        .chain(rows)
        .map(|cells| format_row(columns, cells, &widths, indent))
        .collect()
}

fn format_row(columns: &[Column<'_>], cells: &[String], widths: &[usize], indent: usize) -> String {
    let rendered = columns
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(index, (column, width))| {
            let cell = cells.get(index).map(String::as_str).unwrap_or("");
            match column.align {
                Align::Left => format!("{cell:<width$}"),
                Align::Right => format!("{cell:>width$}"),
            }
        })
        .collect::<Vec<String>>()
        .join(COLUMN_GAP);
    format!("{}{}", " ".repeat(indent), rendered.trim_end())
}

pub fn money(value: Option<&Value>) -> String {
    value
        .and_then(Value::as_f64)
        .map_or_else(|| "-".to_string(), |amount| format!("{amount:.2}"))
}

pub fn number(value: Option<&Value>) -> String {
    match value {
        Some(Value::Number(number)) => number.to_string(),
        _ => "-".to_string(),
    }
}

pub fn text<'a>(value: Option<&'a Value>) -> &'a str {
    value.and_then(Value::as_str).unwrap_or("-")
}

pub fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{Align, Column, key_value_rows, money, render_table};

    #[test]
    fn key_value_rows_align_labels() {
        let rows = key_value_rows(
            &[("Decision:", "APPROVE".to_string()), ("Risk level:", "LOW".to_string())],
            2,
        );
        assert_eq!(rows[0], "  Decision:    APPROVE");
        assert_eq!(rows[1], "  Risk level:  LOW");
    }

    #[test]
    fn table_pads_and_right_aligns_numbers() {
        let columns = [
            Column {
                name: "Subcategory",
                align: Align::Left,
            },
            Column {
                name: "Out",
                align: Align::Right,
            },
        ];
        let rows = vec![
            vec!["rent".to_string(), "800.00".to_string()],
            vec!["groceries".to_string(), "45.50".to_string()],
        ];
        let lines = render_table(&columns, &rows, 2);
        assert_eq!(lines[0], "  Subcategory     Out");
        assert_eq!(lines[1], "  rent         800.00");
        assert_eq!(lines[2], "  groceries     45.50");
    }

    #[test]
    fn money_uses_two_decimals_and_dash_for_missing() {
        assert_eq!(money(Some(&json!(246.6))), "246.60");
        assert_eq!(money(None), "-");
    }
}
