//! Cell and table parsers

use crate::ast::{CellValue, LoopSpec, RangeSpec, Table};
use tablescan_core::number::{decimal_places, parse_number};
use tablescan_core::{ScanError, Value};
use tracing::warn;

/// Parse one cell.
///
/// - `""` is empty
/// - `[1, 2, 'a']` is a list
/// - `range(stop)`, `range(start, stop)`, `range(start, stop, step)`
/// - `loop(end)`, `loop(start, end)`, `loop(start, end, step)`
/// - anything else is a number or text
///
/// Malformed `range(...)` or `loop(...)` directives are kept as text.
pub fn parse_cell(text: &str) -> CellValue {
    let text = text.trim();
    if text.is_empty() {
        return CellValue::Empty;
    }

    if text.starts_with('[') && text.ends_with(']') {
        return CellValue::List(parse_list_elements(&text[1..text.len() - 1]));
    }

    if let Some(args) = directive_args(text, "range") {
        return match parse_range(&args) {
            Some(range) => CellValue::Range(range),
            None => degrade(text, "range"),
        };
    }

    if let Some(args) = directive_args(text, "loop") {
        return match numeric_args(&args) {
            Some(n) => CellValue::Loop(LoopSpec {
                start: n.start,
                end: n.stop,
                step: n.step,
            }),
            None => degrade(text, "loop"),
        };
    }

    CellValue::Scalar(Value::parse(text))
}

fn degrade(text: &str, directive: &str) -> CellValue {
    warn!(cell = text, "malformed {} directive, using the cell as text", directive);
    CellValue::Scalar(Value::Text(text.to_string()))
}

/// Arguments of `keyword(...)`, keyword matched case-insensitively
fn directive_args(text: &str, keyword: &str) -> Option<Vec<String>> {
    let head = text.get(..keyword.len())?;
    if !head.eq_ignore_ascii_case(keyword) {
        return None;
    }
    let rest = text[keyword.len()..].trim_start();
    let inner = rest.strip_prefix('(')?.strip_suffix(')')?;
    Some(inner.split(',').map(|a| a.trim().to_string()).collect())
}

struct NumericArgs {
    start: f64,
    stop: f64,
    step: f64,
    decimals: u32,
}

/// `(stop)`, `(start, stop)` or `(start, stop, step)`
fn numeric_args(args: &[String]) -> Option<NumericArgs> {
    let numbers: Vec<f64> = args
        .iter()
        .map(|a| parse_number(a))
        .collect::<Option<Vec<_>>>()?;
    let decimals = args.iter().map(|a| decimal_places(a)).max().unwrap_or(0);

    let (start, stop, step) = match numbers.as_slice() {
        [stop] => (0.0, *stop, 1.0),
        [start, stop] => (*start, *stop, 1.0),
        [start, stop, step] => (*start, *stop, *step),
        _ => return None,
    };
    Some(NumericArgs {
        start,
        stop,
        step,
        decimals,
    })
}

fn parse_range(args: &[String]) -> Option<RangeSpec> {
    let n = numeric_args(args)?;
    Some(RangeSpec {
        start: n.start,
        stop: n.stop,
        step: n.step,
        decimals: n.decimals,
    })
}

/// List elements separated by commas; quotes around an element are removed
fn parse_list_elements(input: &str) -> Vec<Value> {
    let mut elements = Vec::new();
    let mut in_double_quote = false;
    let mut in_single_quote = false;
    let mut current_start = 0;

    for (byte_pos, c) in input.char_indices() {
        match c {
            '"' if !in_single_quote => in_double_quote = !in_double_quote,
            '\'' if !in_double_quote => in_single_quote = !in_single_quote,
            ',' if !in_double_quote && !in_single_quote => {
                push_element(&mut elements, &input[current_start..byte_pos]);
                current_start = byte_pos + c.len_utf8();
            }
            _ => {}
        }
    }
    push_element(&mut elements, &input[current_start..]);
    elements
}

fn push_element(elements: &mut Vec<Value>, raw: &str) {
    let raw = raw.trim();
    if raw.is_empty() {
        return;
    }
    let quoted = raw.len() >= 2
        && ((raw.starts_with('\'') && raw.ends_with('\''))
            || (raw.starts_with('"') && raw.ends_with('"')));
    if quoted {
        elements.push(Value::Text(raw[1..raw.len() - 1].to_string()));
    } else {
        elements.push(Value::parse(raw));
    }
}

// ============================================================================
// Tables
// ============================================================================

/// First pipe table in a markdown document
pub fn parse_markdown(input: &str) -> Result<Table, ScanError> {
    let mut headers: Option<Vec<String>> = None;
    let mut rows: Vec<Vec<String>> = Vec::new();

    for line in input.lines() {
        let line = line.trim();
        let is_table_line = line.starts_with('|') && line.ends_with('|') && line.len() >= 2;

        if !is_table_line {
            if headers.is_some() {
                break;
            }
            continue;
        }

        if headers.is_none() {
            headers = Some(parse_table_row_cells(line));
            continue;
        }

        // Separator directly below the header
        if rows.is_empty() && is_separator(line) {
            continue;
        }
        rows.push(parse_table_row_cells(line));
    }

    let headers = headers.ok_or_else(|| ScanError::invalid_input("No table found"))?;
    Table::new(headers, rows)
}

fn is_separator(line: &str) -> bool {
    line.contains('-')
        && line
            .chars()
            .all(|c| c == '|' || c == '-' || c == ':' || c.is_whitespace())
}

fn parse_table_row_cells(line: &str) -> Vec<String> {
    line[1..line.len() - 1]
        .split('|')
        .map(|s| s.trim().to_string())
        .collect()
}

/// `{"headers": [...], "rows": [[...], ...]}`
///
/// Numbers and booleans become their text, `null` an empty cell.
pub fn parse_json(json: &serde_json::Value) -> Result<Table, ScanError> {
    let headers = json
        .get("headers")
        .and_then(|h| h.as_array())
        .ok_or_else(|| ScanError::invalid_input("Table needs a 'headers' list"))?;
    let headers: Vec<String> = headers.iter().map(json_cell).collect();

    let rows = json
        .get("rows")
        .and_then(|r| r.as_array())
        .ok_or_else(ScanError::table_needs_rows)?;

    let mut cells = Vec::with_capacity(rows.len());
    for row in rows {
        let row = row.as_array().ok_or_else(ScanError::table_needs_rows)?;
        cells.push(row.iter().map(json_cell).collect::<Vec<_>>());
    }
    Table::new(headers, cells)
}

fn json_cell(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tablescan_core::codes;

    #[test]
    fn test_scalars() {
        assert_eq!(parse_cell(""), CellValue::Empty);
        assert_eq!(parse_cell("   "), CellValue::Empty);
        assert_eq!(parse_cell("  1"), CellValue::Scalar(Value::Number(1.0)));
        assert_eq!(parse_cell("snap"), CellValue::Scalar(Value::Text("snap".into())));
    }

    #[test]
    fn test_list() {
        assert_eq!(
            parse_cell("[ 0, 1]"),
            CellValue::List(vec![Value::Number(0.0), Value::Number(1.0)])
        );
        assert_eq!(parse_cell("[]"), CellValue::List(vec![]));
        assert_eq!(
            parse_cell("['a, b', snap, 2]"),
            CellValue::List(vec![
                Value::Text("a, b".into()),
                Value::Text("snap".into()),
                Value::Number(2.0)
            ])
        );
    }

    #[test]
    fn test_range_forms() {
        let CellValue::Range(r) = parse_cell("range(5)") else {
            panic!("expected range");
        };
        assert_eq!(r.values(), vec![0.0, 1.0, 2.0, 3.0, 4.0]);

        let CellValue::Range(r) = parse_cell("RANGE(2, 4)") else {
            panic!("expected range");
        };
        assert_eq!(r.values(), vec![2.0, 3.0]);
    }

    #[test]
    fn test_range_semantics() {
        let values = |text: &str| match parse_cell(text) {
            CellValue::Range(r) => r.values(),
            other => panic!("expected range, got {:?}", other),
        };
        assert_eq!(values("range(100,200,10)").len(), 10);
        assert_eq!(values("range(175,246,70)"), vec![175.0, 245.0]);
        assert_eq!(values("range(175,245,70)"), vec![175.0]);
        assert!(values("range(1,0,2)").is_empty());
        assert!(values("range(1,5,0)").is_empty());
        assert_eq!(values("range(3,0,-1)"), vec![3.0, 2.0, 1.0]);
        assert_eq!(
            values("range(0.2, 5.4, 0.7)"),
            vec![0.2, 0.9, 1.6, 2.3, 3.0, 3.7, 4.4, 5.1]
        );
    }

    #[test]
    fn test_loop() {
        assert_eq!(
            parse_cell("loop(2, 5, 1)"),
            CellValue::Loop(LoopSpec { start: 2.0, end: 5.0, step: 1.0 })
        );
        assert_eq!(
            parse_cell("Loop(3)"),
            CellValue::Loop(LoopSpec { start: 0.0, end: 3.0, step: 1.0 })
        );
        assert_eq!(
            parse_cell("Loop(2,5)"),
            CellValue::Loop(LoopSpec { start: 2.0, end: 5.0, step: 1.0 })
        );
    }

    #[test]
    fn test_malformed_directives_are_text() {
        assert_eq!(
            parse_cell("range(a, b)"),
            CellValue::Scalar(Value::Text("range(a, b)".into()))
        );
        assert_eq!(
            parse_cell("loop(1,2,3,4)"),
            CellValue::Scalar(Value::Text("loop(1,2,3,4)".into()))
        );
        assert_eq!(
            parse_cell("looping"),
            CellValue::Scalar(Value::Text("looping".into()))
        );
    }

    #[test]
    fn test_markdown_table() {
        let doc = r#"
# Scan

| X   | Wait For | Value |
|-----|----------|-------|
| 1   | seconds  | 10    |
| 3   | time     | 20    |

Trailing text
"#;
        let table = parse_markdown(doc).unwrap();
        assert_eq!(table.headers(), &["X", "Wait For", "Value"]);
        assert_eq!(table.rows()[1], vec!["3", "time", "20"]);
    }

    #[test]
    fn test_markdown_empty_cells() {
        let table = parse_markdown("| A | B |\n| 1 |   |\n").unwrap();
        assert_eq!(table.rows()[0], vec!["1", ""]);
    }

    #[test]
    fn test_markdown_no_table() {
        assert_eq!(parse_markdown("no table").unwrap_err().code, codes::INVALID_INPUT);
    }

    #[test]
    fn test_json_table() {
        let json = serde_json::json!({
            "headers": ["X", "Y", "Wait For", "Value"],
            "rows": [[1, 2.5, "seconds", 10], [null, true, "", ""]]
        });
        let table = parse_json(&json).unwrap();
        assert_eq!(table.rows()[0], vec!["1", "2.5", "seconds", "10"]);
        assert_eq!(table.rows()[1], vec!["", "true", "", ""]);
    }

    #[test]
    fn test_json_flat_row() {
        let json = serde_json::json!({
            "headers": ["X", "Y"],
            "rows": ["1", "2"]
        });
        let err = parse_json(&json).unwrap_err();
        assert!(err.message.contains("Table needs list of rows"));
    }
}
