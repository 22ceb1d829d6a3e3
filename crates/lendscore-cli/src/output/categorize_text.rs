use std::io;

use serde_json::Value;

use super::format::{self, Align, Column, money, number, string_list, text};
use super::score_text::render_input_footer;

pub fn render_categorize(data: &Value) -> io::Result<String> {
    let summary = data
        .get("summary")
        .ok_or_else(|| io::Error::other("categorize output requires summary"))?;
    let categories = summary
        .get("categories")
        .and_then(Value::as_object)
        .ok_or_else(|| io::Error::other("categorize output requires summary.categories"))?;

    let mut lines = vec![format!(
        "Categorized {} transactions over {} months.",
        number(summary.get("transaction_count")),
        number(data.get("months_of_data")),
    )];
    if let Some(window) = data.get("window").filter(|window| !window.is_null()) {
        lines.push(format!(
            "Window: after {} up to {}",
            text(window.get("start_exclusive")),
            text(window.get("anchor")),
        ));
    }

    let rows = categories
        .iter()
        .flat_map(|(category, buckets)| {
            buckets
                .as_object()
                .into_iter()
                .flatten()
                .map(move |(subcategory, stats)| {
                    vec![
                        category.clone(),
                        subcategory.clone(),
                        number(stats.get("count")),
                        money(stats.get("credit_total")),
                        money(stats.get("debit_total")),
                    ]
                })
        })
        .collect::<Vec<Vec<String>>>();

    lines.push(String::new());
    if rows.is_empty() {
        lines.push("No transactions were categorized.".to_string());
    } else {
        let columns = [
            Column {
                name: "Category",
                align: Align::Left,
            },
            Column {
                name: "Subcategory",
                align: Align::Left,
            },
            Column {
                name: "Count",
                align: Align::Right,
            },
            Column {
                name: "In",
                align: Align::Right,
            },
            Column {
                name: "Out",
                align: Align::Right,
            },
        ];
        lines.extend(format::render_table(&columns, &rows, 2));
    }

    let excluded = summary.get("excluded_transfer_pairs");
    let excluded_count = excluded
        .and_then(|value| value.get("count"))
        .and_then(Value::as_u64)
        .unwrap_or(0);
    if excluded_count > 0 {
        lines.push(String::new());
        lines.push(format!(
            "Excluded own-account transfers: {excluded_count} transactions ({} in, {} out)",
            money(excluded.and_then(|value| value.get("credit_total"))),
            money(excluded.and_then(|value| value.get("debit_total"))),
        ));
    }

    lines.push(String::new());
    lines.extend(render_input_footer(data));

    let notes = string_list(data.get("notes"));
    if !notes.is_empty() {
        lines.push(format!("Notes: {}", notes.join(", ")));
    }

    Ok(lines.join("\n"))
}
