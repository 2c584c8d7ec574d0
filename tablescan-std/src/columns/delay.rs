//! Delay column

use tablescan_core::parse_seconds;
use tablescan_plugin::prelude::*;
use tracing::trace;

static DELAY_EXAMPLES: [&str; 3] = [
    "10 -> Delay(10)",
    "01:30 -> Delay(90)",
    "00:05:00 -> Delay(300)",
];

/// Cell holds a duration; emits `Delay(seconds)`
#[derive(Debug, Clone)]
pub struct DelayColumn {
    name: String,
}

impl DelayColumn {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for DelayColumn {
    fn default() -> Self {
        Self::new("Delay")
    }
}

impl SpecialColumn for DelayColumn {
    fn meta(&self) -> ColumnMeta {
        ColumnMeta {
            name: self.name.clone(),
            description: "Pause for the duration in the cell (seconds or HH:MM:SS)",
            examples: &DELAY_EXAMPLES,
        }
    }

    fn compile(&self, cell: &str, ctx: &mut CompileContext) -> Result<Option<Command>, ScanError> {
        let seconds = parse_seconds(cell).map_err(|e| {
            ScanError::from(e)
                .in_row(ctx.row)
                .in_column(self.name.clone())
                .with_cell(cell)
        })?;
        trace!(column = %self.name, seconds, "delay");
        Ok(Some(Delay::new(seconds).into()))
    }
}
