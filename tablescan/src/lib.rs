//! Table Scan - Compile tables of device settings into scan commands
//!
//! ```text
//! | X | Y | Wait For | Value |
//! |---|---|----------|-------|
//! | 1 | 2 | seconds  | 10    |
//! | 3 | 4 | Counter1 | 20    |
//! ```
//!
//! compiles into
//!
//! ```text
//! Set('X', 1.0), Set('Y', 2.0), Delay(10), Log('X', 'Y'),
//! Set('X', 3.0), Set('Y', 4.0), Wait('Counter1', 20.0, comparison='>=', tolerance=0.1), Log('X', 'Y', 'Counter1')
//! ```

mod ast;
mod parser;
mod columns;
mod expand;
mod compile;

pub use ast::{Cell, CellValue, Column, ColumnRole, LoopSpec, RangeSpec, Table};
pub use parser::parse_cell;
pub use columns::{classify, ColumnLayout};
pub use expand::expand_row;
pub use compile::RowCompiler;

use std::fmt;
use std::sync::Arc;
use tablescan_core::{Command, CommandSequence, Comment, ScanError};
use tablescan_plugin::{
    default_settings, ColumnRegistry, CompileContext, ScanSettings, SpecialColumn, TraceStep,
};
use tracing::{debug, trace};

impl Table {
    /// First pipe table in a markdown document
    pub fn from_markdown(input: &str) -> Result<Self, ScanError> {
        parser::parse_markdown(input)
    }

    /// `{"headers": [...], "rows": [[...], ...]}`
    pub fn from_json(json: &serde_json::Value) -> Result<Self, ScanError> {
        parser::parse_json(json)
    }

    pub fn from_json_str(input: &str) -> Result<Self, ScanError> {
        let json: serde_json::Value = serde_json::from_str(input)?;
        parser::parse_json(&json)
    }
}

/// Commands of a compiled table plus the special-column trace
#[derive(Debug, Clone)]
pub struct ScanResult {
    pub commands: CommandSequence,
    pub trace: Vec<TraceStep>,
}

/// A table with everything needed to compile it
#[derive(Debug, Clone)]
pub struct TableScan {
    table: Table,
    pre: Vec<Command>,
    post: Vec<Command>,
    start: Vec<Command>,
    stop: Vec<Command>,
    columns: ColumnRegistry,
    log_always: Vec<String>,
    settings: Option<Arc<ScanSettings>>,
    tracing: bool,
}

impl TableScan {
    pub fn new(table: Table) -> Self {
        Self {
            table,
            pre: Vec::new(),
            post: Vec::new(),
            start: Vec::new(),
            stop: Vec::new(),
            columns: ColumnRegistry::new(),
            log_always: Vec::new(),
            settings: None,
            tracing: false,
        }
    }

    /// Shorthand for `TableScan::new(Table::new(headers, rows)?)`
    pub fn from_rows<H, R, C>(headers: H, rows: R) -> Result<Self, ScanError>
    where
        H: IntoIterator,
        H::Item: Into<String>,
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Ok(Self::new(Table::new(headers, rows)?))
    }

    /// Command run once before the first row
    pub fn with_pre(mut self, command: impl Into<Command>) -> Self {
        self.pre.push(command.into());
        self
    }

    /// Command run once after the last row
    pub fn with_post(mut self, command: impl Into<Command>) -> Self {
        self.post.push(command.into());
        self
    }

    /// Command run before each row's wait
    pub fn with_start(mut self, command: impl Into<Command>) -> Self {
        self.start.push(command.into());
        self
    }

    /// Command run after each row's log
    pub fn with_stop(mut self, command: impl Into<Command>) -> Self {
        self.stop.push(command.into());
        self
    }

    pub fn with_special<C: SpecialColumn + 'static>(mut self, column: C) -> Self {
        self.columns.register(column);
        self
    }

    pub fn with_columns(mut self, registry: ColumnRegistry) -> Self {
        self.columns = self.columns.merge(registry);
        self
    }

    /// "Run Control" includes and the "Delay" column; columns already
    /// registered under those headers are kept
    pub fn with_standard_columns(mut self) -> Self {
        let existing = std::mem::take(&mut self.columns);
        self.columns = tablescan_std::standard_columns().merge(existing);
        self
    }

    /// Devices added to every log
    pub fn with_log_always<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.log_always.extend(names.into_iter().map(Into::into));
        self
    }

    /// Settings to use instead of the registered default
    pub fn with_settings(mut self, settings: impl Into<Arc<ScanSettings>>) -> Self {
        self.settings = Some(settings.into());
        self
    }

    /// Record special-column invocations in `ScanResult::trace`
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.tracing = enabled;
        self
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Compile the table
    ///
    /// With `lineinfo`, a `Comment('# Line N')` precedes the commands of
    /// table row N and `Comment('# End')` follows the last row.
    pub fn create_scan(&self, lineinfo: bool) -> Result<CommandSequence, ScanError> {
        self.compile(lineinfo).map(|result| result.commands)
    }

    pub fn compile(&self, lineinfo: bool) -> Result<ScanResult, ScanError> {
        let settings = match self.settings {
            Some(ref settings) => Arc::clone(settings),
            None => default_settings()?,
        };
        let layout = classify(self.table.headers(), &self.columns)?;
        debug!(
            columns = layout.len(),
            rows = self.table.len(),
            specials = self.columns.len(),
            "compiling table"
        );

        let compiler = RowCompiler {
            layout: &layout,
            registry: &self.columns,
            settings: &settings,
            start: &self.start,
            stop: &self.stop,
            log_always: &self.log_always,
        };
        let mut ctx = CompileContext::new(Arc::clone(&settings)).with_tracing(self.tracing);

        let mut commands = CommandSequence::new();
        commands.extend(self.pre.iter().cloned());

        for (index, raw) in self.table.rows().iter().enumerate() {
            ctx.row = index;
            if lineinfo {
                commands.push(Comment::new(format!("# Line {}", index + 1)));
            }
            let rows = expand_row(&layout, raw);
            trace!(row = index, expanded = rows.len(), "expanded row");
            for row in &rows {
                commands.extend(compiler.compile_row(row, &mut ctx)?);
            }
        }

        if lineinfo {
            commands.push(Comment::new("# End"));
        }
        commands.extend(self.post.iter().cloned());

        debug!(commands = commands.len(), "table compiled");
        Ok(ScanResult {
            commands,
            trace: ctx.trace,
        })
    }
}

impl fmt::Display for TableScan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.table)
    }
}
