//! Special column traits

use crate::CompileContext;
use serde::Serialize;
use std::fmt;
use tablescan_core::{Command, ScanError};

/// Metadata for a special column
#[derive(Debug, Clone, Serialize)]
pub struct ColumnMeta {
    /// Header that selects the column
    pub name: String,
    pub description: &'static str,
    pub examples: &'static [&'static str],
}

/// Column whose cells are turned into commands by custom code
///
/// `compile` is only called for non-empty cells and receives the trimmed
/// cell text. The returned command, if any, is placed at the column's
/// position in the row.
pub trait SpecialColumn: Send + Sync {
    fn meta(&self) -> ColumnMeta;
    fn compile(&self, cell: &str, ctx: &mut CompileContext) -> Result<Option<Command>, ScanError>;
}

type CellHandler = dyn Fn(&str) -> Result<Option<Command>, ScanError> + Send + Sync;

/// Special column backed by a closure
pub struct FnColumn {
    name: String,
    handler: Box<CellHandler>,
}

impl FnColumn {
    pub fn new<F>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&str) -> Result<Option<Command>, ScanError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            handler: Box::new(handler),
        }
    }
}

impl SpecialColumn for FnColumn {
    fn meta(&self) -> ColumnMeta {
        ColumnMeta {
            name: self.name.clone(),
            description: "Custom cell handler",
            examples: &[],
        }
    }

    fn compile(&self, cell: &str, _ctx: &mut CompileContext) -> Result<Option<Command>, ScanError> {
        (self.handler)(cell)
    }
}

impl fmt::Debug for FnColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnColumn").field("name", &self.name).finish()
    }
}
