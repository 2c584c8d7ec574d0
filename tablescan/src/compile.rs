//! Row compiler
//!
//! Turns one expanded row into commands. Columns are visited left to right.
//! Sets in `+p` columns collect in a pending group that is emitted as one
//! `Parallel` as soon as any other command follows. A loop in a plain column
//! wraps everything to its right, including the wait and log that end the row.

use crate::ast::{Cell, CellValue, ColumnRole, LoopSpec};
use crate::columns::ColumnLayout;
use tablescan_core::{
    parse_seconds, Command, Comment, Delay, Log, Loop, Parallel, ScanError, Set, Value, Wait,
    ON_ERROR_CONTINUE,
};
use tablescan_plugin::{
    ColumnRegistry, CompileContext, Overrides, ScanSettings, TraceStep, DEFAULT_TOLERANCE,
};
use tracing::{debug, trace};

/// How a row ends, from its `Wait For` cell
#[derive(Debug, Clone, PartialEq)]
enum WaitKind {
    None,
    Time,
    Completion,
    Device(String),
}

impl WaitKind {
    fn from_cell(text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() {
            return WaitKind::None;
        }
        match text.to_lowercase().as_str() {
            "seconds" | "time" => WaitKind::Time,
            "completion" => WaitKind::Completion,
            _ => WaitKind::Device(text.to_string()),
        }
    }
}

/// Compiles rows of one table
pub struct RowCompiler<'a> {
    pub layout: &'a ColumnLayout,
    pub registry: &'a ColumnRegistry,
    pub settings: &'a ScanSettings,
    pub start: &'a [Command],
    pub stop: &'a [Command],
    pub log_always: &'a [String],
}

impl<'a> RowCompiler<'a> {
    /// Commands for one expanded row
    pub fn compile_row(
        &self,
        row: &[Cell],
        ctx: &mut CompileContext,
    ) -> Result<Vec<Command>, ScanError> {
        let mut out = Vec::new();
        if let Some(comment) = self.layout.comment.and_then(|i| row.get(i)) {
            if !comment.text.is_empty() {
                out.push(Comment::new(comment.text.clone()).into());
            }
        }
        out.extend(self.compile_from(row, 0, ctx)?);
        trace!(row = ctx.row, commands = out.len(), "compiled row");
        Ok(out)
    }

    /// Commands for the columns from `first` on, followed by the row's tail
    fn compile_from(
        &self,
        row: &[Cell],
        first: usize,
        ctx: &mut CompileContext,
    ) -> Result<Vec<Command>, ScanError> {
        let mut out = Vec::new();
        let mut group: Vec<Command> = Vec::new();

        for (index, (column, cell)) in self.layout.columns.iter().zip(row).enumerate().skip(first) {
            match &column.role {
                ColumnRole::Device {
                    name,
                    parallel,
                    overrides,
                } => match &cell.value {
                    CellValue::Empty => {}
                    CellValue::Scalar(value) => {
                        let set = self.set_command(name, value, overrides.merge(cell.overrides));
                        if *parallel {
                            group.push(set.into());
                        } else {
                            flush(&mut out, &mut group);
                            out.push(set.into());
                        }
                    }
                    CellValue::Loop(spec) => {
                        let lp = self.loop_command(name, spec, overrides.merge(cell.overrides));
                        if *parallel {
                            group.push(lp.into());
                        } else {
                            flush(&mut out, &mut group);
                            let body = self.compile_from(row, index + 1, ctx)?;
                            out.push(lp.with_body(body).into());
                            return Ok(out);
                        }
                    }
                    CellValue::List(_) | CellValue::Range(_) => {
                        return Err(ScanError::internal("list cell reached the row compiler")
                            .in_row(ctx.row)
                            .in_column(column.header.clone()));
                    }
                },
                ColumnRole::Special(header) => {
                    if cell.text.is_empty() {
                        continue;
                    }
                    flush(&mut out, &mut group);
                    let special = self.registry.get(header).ok_or_else(|| {
                        ScanError::special_column(header, "not registered").in_row(ctx.row)
                    })?;
                    let command = special
                        .compile(&cell.text, ctx)
                        .map_err(|e| e.located(ctx.row, header))?;
                    ctx.record(TraceStep {
                        row: ctx.row,
                        column: header.clone(),
                        cell: cell.text.clone(),
                        command: command.as_ref().map(|c| c.to_string()),
                    });
                    out.extend(command);
                }
                ColumnRole::Delay => {
                    if cell.text.is_empty() {
                        continue;
                    }
                    flush(&mut out, &mut group);
                    let seconds = self.seconds(&cell.text, &column.header, ctx)?;
                    out.push(Delay::new(seconds).into());
                }
                ColumnRole::Comment
                | ColumnRole::WaitFor
                | ColumnRole::WaitValue
                | ColumnRole::WaitOrTime
                | ColumnRole::LogOnly(_) => {}
            }
        }

        self.tail(row, &mut out, group, ctx)?;
        Ok(out)
    }

    /// Wait, start/stop and log at the end of a row
    fn tail(
        &self,
        row: &[Cell],
        out: &mut Vec<Command>,
        mut group: Vec<Command>,
        ctx: &CompileContext,
    ) -> Result<(), ScanError> {
        let wait = self
            .layout
            .wait_for
            .and_then(|i| row.get(i))
            .map(|c| WaitKind::from_cell(&c.text))
            .unwrap_or(WaitKind::None);

        if wait == WaitKind::None {
            flush(out, &mut group);
            return Ok(());
        }

        let value = self.layout.value.and_then(|i| row.get(i));
        let timeout = match self.layout.or_time.and_then(|i| row.get(i)) {
            Some(cell) if !cell.text.is_empty() => self.seconds(&cell.text, "Or Time", ctx)?,
            _ => 0.0,
        };

        match &wait {
            WaitKind::None => {}
            WaitKind::Time => {
                flush(out, &mut group);
                out.extend(self.start.iter().cloned());
                let text = value.map(|c| c.text.as_str()).unwrap_or("");
                out.push(Delay::new(self.seconds(text, "Value", ctx)?).into());
            }
            WaitKind::Completion => {
                out.extend(self.start.iter().cloned());
                if group.is_empty() {
                    // Sets outside a `+p` run already await their own completion
                    debug!(row = ctx.row, timeout, "completion wait without a parallel group");
                } else {
                    let mut parallel = Parallel::new(std::mem::take(&mut group));
                    if timeout > 0.0 {
                        parallel = parallel
                            .with_timeout(timeout)
                            .with_errhandler(ON_ERROR_CONTINUE);
                    }
                    out.push(parallel.into());
                }
            }
            WaitKind::Device(device) => {
                flush(out, &mut group);
                out.extend(self.start.iter().cloned());
                let target = match value.map(|c| &c.value) {
                    Some(CellValue::Scalar(v)) => v.clone(),
                    _ => {
                        return Err(ScanError::wait_for_value()
                            .in_row(ctx.row)
                            .with_note(format!("waiting for '{}' needs a value", device)))
                    }
                };
                let mut command = Wait::new(device.clone(), target)
                    .with_comparison(self.settings.comparison_for(device))
                    .with_tolerance(DEFAULT_TOLERANCE);
                if timeout > 0.0 {
                    command = command.with_timeout(timeout).with_errhandler(ON_ERROR_CONTINUE);
                }
                out.push(command.into());
            }
        }

        out.push(self.log_command(row, &wait).into());
        out.extend(self.stop.iter().cloned());
        Ok(())
    }

    /// Always-logged names, then written or logged columns, then the waited-for device
    fn log_command(&self, row: &[Cell], wait: &WaitKind) -> Log {
        let mut names: Vec<String> = Vec::new();
        let mut add = |name: &str| {
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        };

        for name in self.log_always {
            add(name.as_str());
        }
        for (column, cell) in self.layout.columns.iter().zip(row) {
            match &column.role {
                ColumnRole::Device { name, .. } | ColumnRole::LogOnly(name) if !cell.is_empty() => {
                    add(name.as_str())
                }
                _ => {}
            }
        }
        if let WaitKind::Device(device) = wait {
            add(device.as_str());
        }
        Log::new(names)
    }

    fn set_command(&self, device: &str, value: &Value, overrides: Overrides) -> Set {
        let defaults = self.settings.resolve(device).with_overrides(overrides);
        let mut set = Set::new(device, value.clone());
        defaults.configure(&mut set);
        set
    }

    fn loop_command(&self, device: &str, spec: &LoopSpec, overrides: Overrides) -> Loop {
        let defaults = self.settings.resolve(device).with_overrides(overrides);
        defaults.configure_loop(Loop::new(device, spec.start, spec.end, spec.step))
    }

    fn seconds(&self, text: &str, column: &str, ctx: &CompileContext) -> Result<f64, ScanError> {
        parse_seconds(text).map_err(|e| {
            ScanError::from(e)
                .in_row(ctx.row)
                .in_column(column)
                .with_cell(text)
        })
    }
}

/// Emit the pending parallel group, if any
fn flush(out: &mut Vec<Command>, group: &mut Vec<Command>) {
    if !group.is_empty() {
        out.push(Parallel::new(std::mem::take(group)).into());
    }
}
