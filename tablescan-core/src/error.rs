//! Structured errors
//!
//! Structural problems with a table (wrong shape, misplaced wait columns,
//! bad device patterns) are reported as `ScanError` values that name the
//! offending condition. Content ambiguities inside cells are not errors.

use crate::SecondsError;
use serde::{Deserialize, Serialize};

/// Standard error codes (machine-readable)
pub mod codes {
    pub const TABLE_SHAPE: &str = "TABLE_SHAPE";
    pub const ROW_LENGTH: &str = "ROW_LENGTH";
    pub const WAIT_FOR_VALUE: &str = "WAIT_FOR_VALUE";
    pub const VALUE_WITHOUT_WAIT_FOR: &str = "VALUE_WITHOUT_WAIT_FOR";
    pub const DUPLICATE_COLUMN: &str = "DUPLICATE_COLUMN";
    pub const INVALID_PATTERN: &str = "INVALID_PATTERN";
    pub const INVALID_SECONDS: &str = "INVALID_SECONDS";
    pub const SPECIAL_COLUMN: &str = "SPECIAL_COLUMN";
    pub const INVALID_INPUT: &str = "INVALID_INPUT";
    pub const INTERNAL: &str = "INTERNAL";
}

/// Where in the table an error occurred
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Source row index (0-based)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,

    /// Column header
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,

    /// Raw cell text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cell: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub notes: Vec<String>,
}

/// Configuration error raised while building or compiling a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanError {
    /// Machine-readable error code
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Suggestion for fixing the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,

    /// Where the error occurred
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<ErrorContext>,
}

impl ScanError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            suggestion: None,
            context: None,
        }
    }

    /// Builder: add suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Builder: set row context
    pub fn in_row(mut self, row: usize) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::default);
        ctx.row = Some(row);
        self
    }

    /// Builder: set column context
    pub fn in_column(mut self, column: impl Into<String>) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::default);
        ctx.column = Some(column.into());
        self
    }

    /// Builder: set cell context
    pub fn with_cell(mut self, cell: impl Into<String>) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::default);
        ctx.cell = Some(cell.into());
        self
    }

    /// Builder: fill in row and column where not already set
    pub fn located(mut self, row: usize, column: &str) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::default);
        ctx.row.get_or_insert(row);
        ctx.column.get_or_insert_with(|| column.to_string());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::default);
        ctx.notes.push(note.into());
        self
    }

    // ========== Common Error Constructors ==========

    pub fn table_needs_rows() -> Self {
        Self::new(codes::TABLE_SHAPE, "Table needs list of rows")
            .with_suggestion("Wrap a single row in a list: [[...]]")
    }

    pub fn row_length(columns: usize, row: usize, cells: usize) -> Self {
        let message = if cells < columns {
            format!("Table has {} columns but row {} has only {}", columns, row, cells)
        } else {
            format!("Table has {} columns but row {} has {}", columns, row, cells)
        };
        Self::new(codes::ROW_LENGTH, message).in_row(row)
    }

    pub fn wait_for_value() -> Self {
        Self::new(codes::WAIT_FOR_VALUE, "Wait For column must be followed by Value")
            .with_suggestion("Add a 'Value' column right after 'Wait For'")
    }

    pub fn value_without_wait_for() -> Self {
        Self::new(codes::VALUE_WITHOUT_WAIT_FOR, "Value column must follow Wait For")
    }

    pub fn duplicate_column(name: &str) -> Self {
        Self::new(codes::DUPLICATE_COLUMN, format!("Duplicate '{}' column", name))
            .in_column(name)
    }

    pub fn invalid_pattern(pattern: &str, details: impl Into<String>) -> Self {
        Self::new(
            codes::INVALID_PATTERN,
            format!("Invalid device pattern '{}': {}", pattern, details.into()),
        )
    }

    pub fn special_column(name: &str, details: impl Into<String>) -> Self {
        Self::new(
            codes::SPECIAL_COLUMN,
            format!("Column '{}': {}", name, details.into()),
        )
        .in_column(name)
    }

    pub fn invalid_input(details: impl Into<String>) -> Self {
        Self::new(codes::INVALID_INPUT, format!("Invalid input: {}", details.into()))
    }

    pub fn internal(details: impl Into<String>) -> Self {
        Self::new(codes::INTERNAL, format!("Internal error: {}", details.into()))
            .with_suggestion("This is a bug, please report it")
    }
}

impl std::fmt::Display for ScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " (suggestion: {})", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for ScanError {}

impl From<SecondsError> for ScanError {
    fn from(err: SecondsError) -> Self {
        Self::new(codes::INVALID_SECONDS, err.to_string())
            .with_suggestion("Use seconds (90) or HH:MM:SS (00:01:30)")
    }
}

impl From<serde_json::Error> for ScanError {
    fn from(err: serde_json::Error) -> Self {
        Self::invalid_input(err.to_string())
    }
}
