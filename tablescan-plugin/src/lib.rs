//! Table Scan Plugin System
//!
//! Provides the pieces a table compilation consults:
//! - Device settings (classes, readback names, overrides)
//! - Special columns (custom cell handlers)
//! - The compile context handed to special columns

mod settings;
mod traits;
mod registry;
mod context;

pub use settings::{
    default_settings, set_default_settings, DeviceClass, DeviceDefaults, Overrides,
    ReadbackNamer, ScanSettings, DEFAULT_TOLERANCE,
};
pub use traits::{ColumnMeta, FnColumn, SpecialColumn};
pub use registry::{normalize_header, ColumnRegistry};
pub use context::{CompileContext, TraceStep};

/// Re-export core types for plugin authors
pub mod prelude {
    pub use crate::{
        ColumnMeta, ColumnRegistry, CompileContext, DeviceClass, FnColumn, ScanSettings,
        SpecialColumn, TraceStep,
    };
    pub use tablescan_core::prelude::*;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tablescan_core::{codes, Command, Comparison, Delay, Readback, Set};

    fn motor_settings() -> ScanSettings {
        ScanSettings::new()
            .with_class(
                DeviceClass::new("Motor.*")
                    .unwrap()
                    .completion(true)
                    .readback(true)
                    .timeout(100.0),
            )
            .with_class(
                DeviceClass::new("InfiniteCounter")
                    .unwrap()
                    .comparison(Comparison::IncreaseBy),
            )
            .with_readback_namer(|device| {
                if device.contains("Motor") {
                    format!("{}.RBV", device)
                } else {
                    device.to_string()
                }
            })
    }

    mod settings_tests {
        use super::*;

        #[test]
        fn test_resolve_class() {
            let defaults = motor_settings().resolve("Motor1");
            assert!(defaults.completion);
            assert_eq!(defaults.readback, Readback::Named("Motor1.RBV".to_string()));
            assert_eq!(defaults.tolerance, 0.1);
            assert_eq!(defaults.timeout, 100.0);
        }

        #[test]
        fn test_resolve_unmatched() {
            assert_eq!(motor_settings().resolve("X"), DeviceDefaults::zero());
        }

        #[test]
        fn test_pattern_is_anchored_at_start() {
            let settings = motor_settings();
            assert!(settings.find_class("MotorX").is_some());
            assert!(settings.find_class("SlowMotor").is_none());
        }

        #[test]
        fn test_first_match_wins() {
            let settings = ScanSettings::new()
                .with_class(DeviceClass::new("temp").unwrap().timeout(300.0))
                .with_class(DeviceClass::new("temp.*").unwrap().timeout(10.0));
            assert_eq!(settings.resolve("temperature").timeout, 300.0);
        }

        #[test]
        fn test_comparison_for() {
            let settings = motor_settings();
            assert_eq!(settings.comparison_for("InfiniteCounter"), Comparison::IncreaseBy);
            assert_eq!(settings.comparison_for("Counter1"), Comparison::AtLeast);
        }

        #[test]
        fn test_fixed_readback_device() {
            let settings = ScanSettings::new()
                .define("heater", |c| c.readback_device("heater:actual"))
                .unwrap();
            assert_eq!(
                settings.resolve("heater").readback,
                Readback::Named("heater:actual".to_string())
            );
        }

        #[test]
        fn test_invalid_pattern() {
            let err = DeviceClass::new("Motor(").unwrap_err();
            assert_eq!(err.code, codes::INVALID_PATTERN);
        }

        #[test]
        fn test_comparison_by_name() {
            let settings = ScanSettings::new().with_class(
                DeviceClass::new("Counter")
                    .unwrap()
                    .comparison_str("increase by")
                    .unwrap(),
            );
            assert_eq!(settings.comparison_for("Counter7"), Comparison::IncreaseBy);

            let err = DeviceClass::new("Counter")
                .unwrap()
                .comparison_str("sideways")
                .unwrap_err();
            assert_eq!(err.code, codes::INVALID_INPUT);
        }

        #[test]
        fn test_configure_set() {
            let mut set = Set::new("Motor1", 2.0);
            motor_settings().resolve("Motor1").configure(&mut set);
            assert_eq!(
                set.to_string(),
                "Set('Motor1', 2.0, completion=True, timeout=100, readback='Motor1.RBV', tolerance=0.100000)"
            );
        }
    }

    mod override_tests {
        use super::*;

        #[test]
        fn test_split() {
            let (o, rest) = Overrides::split("-cr Motor2");
            assert!(o.no_completion && o.no_readback);
            assert_eq!(rest, "Motor2");

            let (o, rest) = Overrides::split("-r  5");
            assert!(!o.no_completion && o.no_readback);
            assert_eq!(rest, "5");

            let (o, rest) = Overrides::split("-5");
            assert!(o.is_empty());
            assert_eq!(rest, "-5");

            let (o, rest) = Overrides::split("-x Motor");
            assert!(o.is_empty());
            assert_eq!(rest, "-x Motor");
        }

        #[test]
        fn test_apply() {
            let defaults = motor_settings().resolve("Motor2").with_overrides(Overrides {
                no_completion: true,
                no_readback: true,
            });
            let mut set = Set::new("Motor2", 2.0);
            defaults.configure(&mut set);
            assert_eq!(set.to_string(), "Set('Motor2', 2.0)");
        }
    }

    mod registry_tests {
        use super::*;

        #[test]
        fn test_lookup_is_normalized() {
            let registry = ColumnRegistry::new().with_column(FnColumn::new("Run Control", |cell| {
                Ok(Some(tablescan_core::Include::new(format!("{}.scn", cell)).into()))
            }));
            assert!(registry.contains("run control"));
            assert!(registry.contains("RunControl"));
            assert!(!registry.contains("Run"));
            assert_eq!(registry.names(), vec!["Run Control".to_string()]);
        }

        #[test]
        fn test_handler_call() {
            let registry = ColumnRegistry::new()
                .with_column(FnColumn::new("Pause", |_| Ok(Some(Delay::new(1.0).into()))));
            let column = registry.get("pause").unwrap();
            let mut ctx = CompileContext::new(Arc::new(ScanSettings::new())).with_tracing(true);
            let cmd = column.compile("yes", &mut ctx).unwrap();
            assert_eq!(cmd, Some(Command::Delay(Delay::new(1.0))));
        }

        #[test]
        fn test_merge_replaces() {
            let first = ColumnRegistry::new().with_column(FnColumn::new("A", |_| Ok(None)));
            let second = ColumnRegistry::new()
                .with_column(FnColumn::new("a", |_| Ok(Some(Delay::new(2.0).into()))));
            let merged = first.merge(second);
            assert_eq!(merged.len(), 1);
        }

        #[test]
        fn test_list_columns() {
            let registry = ColumnRegistry::new().with_column(FnColumn::new("A", |_| Ok(None)));
            let json = registry.list_columns();
            assert_eq!(json[0]["name"], "A");
        }

        #[test]
        fn test_normalize_header() {
            assert_eq!(normalize_header(" Wait For "), "waitfor");
            assert_eq!(normalize_header("OR TIME"), "ortime");
        }
    }

    #[test]
    fn test_default_settings_roundtrip() {
        set_default_settings(motor_settings()).unwrap();
        let settings = default_settings().unwrap();
        assert!(settings.find_class("Motor7").is_some());
        set_default_settings(ScanSettings::new()).unwrap();
    }
}
