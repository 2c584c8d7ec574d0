//! Table Scan Standard Library

pub mod columns;
pub mod settings;

pub use settings::beamline_settings;

use tablescan_plugin::ColumnRegistry;

/// Load standard special columns into registry
pub fn load_standard_columns(registry: ColumnRegistry) -> ColumnRegistry {
    registry
        // "Start" -> Include('Start.scn')
        .with_column(columns::IncludeColumn::new("Run Control", ".scn"))
        .with_column(columns::DelayColumn::default())
}

/// Create registry with standard columns
pub fn standard_columns() -> ColumnRegistry {
    load_standard_columns(ColumnRegistry::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tablescan_core::{codes, Command, Delay, Include, Readback, Set};
    use tablescan_plugin::{CompileContext, ScanSettings, SpecialColumn};

    fn ctx() -> CompileContext {
        CompileContext::new(Arc::new(ScanSettings::new()))
    }

    #[test]
    fn test_standard_columns() {
        let registry = standard_columns();
        assert!(registry.contains("Run Control"));
        assert!(registry.contains("delay"));
    }

    #[test]
    fn test_include_column() {
        let column = columns::IncludeColumn::new("Run Control", ".scn");
        let cmd = column.compile("Start", &mut ctx()).unwrap();
        assert_eq!(cmd, Some(Command::Include(Include::new("Start.scn"))));
    }

    #[test]
    fn test_include_column_macros() {
        let column = columns::IncludeColumn::new("Procedure", ".scn")
            .with_macros("sample=1")
            .with_errhandler("OnErrorContinue");
        let cmd = column.compile("lf_start", &mut ctx()).unwrap().unwrap();
        assert_eq!(
            cmd.to_string(),
            "Include('lf_start.scn', macros='sample=1', errhandler='OnErrorContinue')"
        );
    }

    #[test]
    fn test_delay_column() {
        let column = columns::DelayColumn::default();
        let cmd = column.compile("00:05:00", &mut ctx()).unwrap();
        assert_eq!(cmd, Some(Command::Delay(Delay::new(300.0))));
    }

    #[test]
    fn test_delay_column_error() {
        let column = columns::DelayColumn::default();
        let mut ctx = ctx();
        ctx.row = 2;
        let err = column.compile("later", &mut ctx).unwrap_err();
        assert_eq!(err.code, codes::INVALID_SECONDS);
        let context = err.context.unwrap();
        assert_eq!(context.row, Some(2));
        assert_eq!(context.cell.as_deref(), Some("later"));
    }

    #[test]
    fn test_set_column() {
        let column = columns::SetColumn::new("Sample", "SampleName");
        let cmd = column.compile("42", &mut ctx()).unwrap();
        assert_eq!(cmd, Some(Command::Set(Set::new("SampleName", "42"))));
    }

    #[test]
    fn test_set_column_uses_device_settings() {
        let settings = ScanSettings::new()
            .define("temperature", |c| c.completion(true).timeout(300.0))
            .unwrap();
        let mut ctx = CompileContext::new(Arc::new(settings));
        let column = columns::SetColumn::new("Temp", "temperature");
        let cmd = column.compile("25", &mut ctx).unwrap().unwrap();
        assert_eq!(
            cmd.to_string(),
            "Set('temperature', '25', completion=True, timeout=300)"
        );

        let column = columns::SetColumn::new("Note", "note").with_completion(true);
        let cmd = column.compile("ok", &mut ctx).unwrap().unwrap();
        assert_eq!(cmd.to_string(), "Set('note', 'ok', completion=True)");
    }

    #[test]
    fn test_beamline_settings() {
        let settings = beamline_settings().unwrap();
        let motor = settings.resolve("Motor3");
        assert_eq!(motor.readback, Readback::Named("Motor3.RBV".to_string()));
        assert_eq!(settings.resolve("temperature").timeout, 300.0);
        assert_eq!(settings.resolve("temperature").readback, Readback::Off);
        assert!(!settings.resolve("position").completion);
    }
}
