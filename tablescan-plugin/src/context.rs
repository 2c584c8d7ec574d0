//! Compile Context

use crate::ScanSettings;
use std::sync::Arc;

/// Context passed to special columns while a table is compiled
pub struct CompileContext {
    pub settings: Arc<ScanSettings>,
    /// Source row being compiled (0-based)
    pub row: usize,
    pub tracing: bool,
    pub trace: Vec<TraceStep>,
}

/// One special-column invocation
#[derive(Debug, Clone, PartialEq)]
pub struct TraceStep {
    pub row: usize,
    pub column: String,
    pub cell: String,
    /// Rendered command, if the column produced one
    pub command: Option<String>,
}

impl CompileContext {
    pub fn new(settings: Arc<ScanSettings>) -> Self {
        Self {
            settings,
            row: 0,
            tracing: false,
            trace: Vec::new(),
        }
    }

    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.tracing = enabled;
        self
    }

    pub fn record(&mut self, step: TraceStep) {
        if self.tracing {
            self.trace.push(step);
        }
    }
}
