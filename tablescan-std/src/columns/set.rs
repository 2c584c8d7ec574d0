//! Set column: write the cell text to a fixed device

use tablescan_plugin::prelude::*;

static SET_EXAMPLES: [&str; 1] = ["Sample A -> Set('SampleName', 'Sample A')"];

/// Writes the cell text to one device, e.g. a PV that records the
/// current sample name
#[derive(Debug, Clone)]
pub struct SetColumn {
    name: String,
    device: String,
    completion: bool,
}

impl SetColumn {
    pub fn new(name: impl Into<String>, device: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            device: device.into(),
            completion: false,
        }
    }

    pub fn with_completion(mut self, completion: bool) -> Self {
        self.completion = completion;
        self
    }
}

impl SpecialColumn for SetColumn {
    fn meta(&self) -> ColumnMeta {
        ColumnMeta {
            name: self.name.clone(),
            description: "Write the cell text to a fixed device",
            examples: &SET_EXAMPLES,
        }
    }

    /// The device's class settings apply; `with_completion(true)` forces completion
    fn compile(&self, cell: &str, ctx: &mut CompileContext) -> Result<Option<Command>, ScanError> {
        let mut set = Set::new(self.device.clone(), Value::Text(cell.to_string()));
        ctx.settings.resolve(&self.device).configure(&mut set);
        if self.completion {
            set.set_completion(true);
        }
        Ok(Some(set.into()))
    }
}
