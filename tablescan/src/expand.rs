//! Row expansion
//!
//! List and range cells in device and value columns turn one table row into
//! several: the cross-product of their values, leftmost column varying
//! slowest. Loop cells stay as they are; the compiler nests them.

use crate::ast::{Cell, CellValue, ColumnRole};
use crate::columns::ColumnLayout;
use crate::parser::parse_cell;
use tablescan_core::Value;
use tablescan_plugin::Overrides;

/// Parse the cells of a row
pub fn parse_row(layout: &ColumnLayout, raw: &[String]) -> Vec<Cell> {
    layout
        .columns
        .iter()
        .zip(raw)
        .map(|(column, text)| {
            let text = text.trim();
            match column.role {
                ColumnRole::Device { .. } => {
                    let (overrides, rest) = Overrides::split(text);
                    Cell {
                        text: rest.to_string(),
                        overrides,
                        value: parse_cell(rest),
                    }
                }
                ColumnRole::WaitValue => Cell {
                    text: text.to_string(),
                    overrides: Overrides::default(),
                    value: parse_cell(text),
                },
                _ => Cell {
                    text: text.to_string(),
                    overrides: Overrides::default(),
                    value: if text.is_empty() {
                        CellValue::Empty
                    } else {
                        CellValue::Scalar(Value::Text(text.to_string()))
                    },
                },
            }
        })
        .collect()
}

/// Concrete rows for one table row
pub fn expand_row(layout: &ColumnLayout, raw: &[String]) -> Vec<Vec<Cell>> {
    let mut rows: Vec<Vec<Cell>> = vec![Vec::with_capacity(raw.len())];

    for cell in parse_row(layout, raw) {
        let choices = alternatives(cell);
        if choices.len() == 1 {
            for row in rows.iter_mut() {
                row.push(choices[0].clone());
            }
            continue;
        }
        rows = rows
            .into_iter()
            .flat_map(|row| {
                choices.iter().map(move |choice| {
                    let mut expanded = row.clone();
                    expanded.push(choice.clone());
                    expanded
                })
            })
            .collect();
    }
    rows
}

/// Values a cell takes across the expanded rows; never empty
fn alternatives(cell: Cell) -> Vec<Cell> {
    let values: Vec<Value> = match &cell.value {
        CellValue::List(values) => values.clone(),
        CellValue::Range(range) => range.values().into_iter().map(Value::Number).collect(),
        _ => return vec![cell],
    };

    if values.is_empty() {
        return vec![Cell {
            text: String::new(),
            overrides: cell.overrides,
            value: CellValue::Empty,
        }];
    }

    values
        .into_iter()
        .map(|v| Cell {
            text: v.to_string(),
            overrides: cell.overrides,
            value: CellValue::Scalar(v),
        })
        .collect()
}
