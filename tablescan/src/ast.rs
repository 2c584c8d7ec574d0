//! Table model

use serde::{Deserialize, Serialize};
use std::fmt;
use tablescan_core::number::round_to;
use tablescan_core::{ScanError, Value};
use tablescan_plugin::Overrides;

/// Column headers and rows of cell text
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawTable")]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// Deserialized form, validated by `Table::new`
#[derive(Deserialize)]
struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TryFrom<RawTable> for Table {
    type Error = ScanError;

    fn try_from(raw: RawTable) -> Result<Self, Self::Error> {
        Table::new(raw.headers, raw.rows)
    }
}

impl Table {
    /// Build a table; every row must have one cell per header
    pub fn new<H, R, C>(headers: H, rows: R) -> Result<Self, ScanError>
    where
        H: IntoIterator,
        H::Item: Into<String>,
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        let headers: Vec<String> = headers.into_iter().map(Into::into).collect();
        let rows: Vec<Vec<String>> = rows
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();

        for (i, row) in rows.iter().enumerate() {
            if row.len() != headers.len() {
                return Err(ScanError::row_length(headers.len(), i, row.len()));
            }
        }
        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Markdown pipe table
impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut widths: Vec<usize> = self
            .headers
            .iter()
            .map(|h| h.chars().count().max(3))
            .collect();
        for row in &self.rows {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.chars().count());
            }
        }

        let line = |cells: &[String]| -> String {
            let padded: Vec<String> = cells
                .iter()
                .zip(&widths)
                .map(|(c, w)| format!("{:<width$}", c, width = *w))
                .collect();
            format!("| {} |", padded.join(" | "))
        };

        writeln!(f, "{}", line(&self.headers))?;
        let separator: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        writeln!(f, "| {} |", separator.join(" | "))?;
        for row in &self.rows {
            writeln!(f, "{}", line(row))?;
        }
        Ok(())
    }
}

/// Parsed content of one cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Scalar(Value),
    List(Vec<Value>),
    Range(RangeSpec),
    Loop(LoopSpec),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

/// `range(start, stop, step)`: values from start, strictly before stop
#[derive(Debug, Clone, PartialEq)]
pub struct RangeSpec {
    pub start: f64,
    pub stop: f64,
    pub step: f64,
    /// Decimals written in the directive, used to round generated values
    pub decimals: u32,
}

impl RangeSpec {
    pub fn values(&self) -> Vec<f64> {
        let mut values = Vec::new();
        if self.step == 0.0 {
            return values;
        }
        let mut i = 0.0;
        loop {
            let value = round_to(self.start + i * self.step, self.decimals);
            let inside = if self.step > 0.0 {
                value < self.stop
            } else {
                value > self.stop
            };
            // Too large for the step to move it in f64
            let stalled = values.last().map_or(false, |&last: &f64| {
                if self.step > 0.0 {
                    value <= last
                } else {
                    value >= last
                }
            });
            if !inside || stalled {
                break;
            }
            values.push(value);
            i += 1.0;
        }
        values
    }

    pub fn is_empty(&self) -> bool {
        self.values().is_empty()
    }
}

/// `loop(start, end, step)`: a device loop executed by the scan server
#[derive(Debug, Clone, PartialEq)]
pub struct LoopSpec {
    pub start: f64,
    pub end: f64,
    pub step: f64,
}

/// What a column contributes to each row
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnRole {
    /// Write the cell value to a device
    Device {
        name: String,
        parallel: bool,
        overrides: Overrides,
    },
    Comment,
    WaitFor,
    WaitValue,
    WaitOrTime,
    /// Built-in delay, used when no special column claims "Delay"
    Delay,
    /// Registered special column, by header
    Special(String),
    /// Only logged, never written
    LogOnly(String),
}

/// Classified column
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub header: String,
    pub role: ColumnRole,
}

/// One cell of an expanded row
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// Trimmed cell text, without override flags
    pub text: String,
    pub overrides: Overrides,
    pub value: CellValue,
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tablescan_core::codes;

    #[test]
    fn test_deserialize_checks_row_length() {
        let err = serde_json::from_str::<Table>(
            r#"{"headers": ["X", "Y", "Wait For", "Value"], "rows": [["1"]]}"#,
        )
        .unwrap_err();
        assert!(err
            .to_string()
            .contains("Table has 4 columns but row 0 has only 1"));
    }

    #[test]
    fn test_deserialize_valid_table() {
        let table: Table =
            serde_json::from_str(r#"{"headers": ["X", "Y"], "rows": [["1", "2"]]}"#).unwrap();
        assert_eq!(table, Table::new(["X", "Y"], [["1", "2"]]).unwrap());
    }

    #[test]
    fn test_row_length_error_code() {
        let err = Table::new(["X", "Y"], [vec!["1", "2", "3"]]).unwrap_err();
        assert_eq!(err.code, codes::ROW_LENGTH);
        assert_eq!(err.message, "Table has 2 columns but row 0 has 3");
    }

    #[test]
    fn test_range_stops_when_value_stalls() {
        let range = RangeSpec {
            start: 1e20,
            stop: 2e20,
            step: 1.0,
            decimals: 0,
        };
        assert_eq!(range.values(), vec![1e20]);
    }

    #[test]
    fn test_descending_range() {
        let range = RangeSpec {
            start: 3.0,
            stop: 0.0,
            step: -1.0,
            decimals: 0,
        };
        assert_eq!(range.values(), vec![3.0, 2.0, 1.0]);
    }
}
