//! Include column: cell text names a scan file to run

use tablescan_plugin::prelude::*;
use tracing::trace;

static INCLUDE_EXAMPLES: [&str; 2] = [
    "Start -> Include('Start.scn')",
    "Stop -> Include('Stop.scn')",
];

/// Turns a cell such as `Start` into `Include('Start.scn')`
#[derive(Debug, Clone)]
pub struct IncludeColumn {
    name: String,
    suffix: String,
    macros: Option<String>,
    errhandler: Option<String>,
}

impl IncludeColumn {
    pub fn new(name: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            suffix: suffix.into(),
            macros: None,
            errhandler: None,
        }
    }

    /// Macros passed to every included file
    pub fn with_macros(mut self, macros: impl Into<String>) -> Self {
        self.macros = Some(macros.into());
        self
    }

    pub fn with_errhandler(mut self, errhandler: impl Into<String>) -> Self {
        self.errhandler = Some(errhandler.into());
        self
    }
}

impl SpecialColumn for IncludeColumn {
    fn meta(&self) -> ColumnMeta {
        ColumnMeta {
            name: self.name.clone(),
            description: "Include the scan file named by the cell",
            examples: &INCLUDE_EXAMPLES,
        }
    }

    fn compile(&self, cell: &str, _ctx: &mut CompileContext) -> Result<Option<Command>, ScanError> {
        let mut include = Include::new(format!("{}{}", cell, self.suffix));
        if let Some(ref macros) = self.macros {
            include = include.with_macros(macros.clone());
        }
        if let Some(ref errhandler) = self.errhandler {
            include = include.with_errhandler(errhandler.clone());
        }
        trace!(column = %self.name, scan = %include.scan, "include");
        Ok(Some(include.into()))
    }
}
