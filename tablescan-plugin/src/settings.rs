//! Device settings
//!
//! Devices are grouped into classes by name pattern. Each class carries the
//! defaults applied when a table writes to one of its devices: await
//! completion, verify a readback, tolerance, timeout and the comparison used
//! when waiting on it.

use regex::Regex;
use std::fmt;
use std::sync::{Arc, OnceLock, RwLock};
use tablescan_core::{Comparison, Loop, Readback, ScanError, Set};

/// Tolerance of a device class unless configured otherwise
pub const DEFAULT_TOLERANCE: f64 = 0.1;

/// Settings for devices whose name matches a pattern
#[derive(Debug, Clone)]
pub struct DeviceClass {
    pattern: String,
    regex: Regex,
    completion: bool,
    readback: bool,
    readback_device: Option<String>,
    tolerance: f64,
    timeout: f64,
    comparison: Comparison,
}

impl DeviceClass {
    /// Class for devices whose name starts with a match of `pattern`
    pub fn new(pattern: &str) -> Result<Self, ScanError> {
        let regex = Regex::new(&format!("^(?:{})", pattern))
            .map_err(|e| ScanError::invalid_pattern(pattern, e.to_string()))?;
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
            completion: false,
            readback: false,
            readback_device: None,
            tolerance: DEFAULT_TOLERANCE,
            timeout: 0.0,
            comparison: Comparison::AtLeast,
        })
    }

    pub fn completion(mut self, completion: bool) -> Self {
        self.completion = completion;
        self
    }

    /// Verify the readback, named by the settings' readback namer
    pub fn readback(mut self, readback: bool) -> Self {
        self.readback = readback;
        self
    }

    /// Verify the readback on a fixed device
    pub fn readback_device(mut self, device: impl Into<String>) -> Self {
        self.readback = true;
        self.readback_device = Some(device.into());
        self
    }

    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn timeout(mut self, timeout: f64) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn comparison(mut self, comparison: Comparison) -> Self {
        self.comparison = comparison;
        self
    }

    /// Comparison by name: `">="`, `"increase by"`, `"AT_MOST"`, ...
    pub fn comparison_str(self, comparison: &str) -> Result<Self, ScanError> {
        match Comparison::parse(comparison) {
            Some(parsed) => Ok(self.comparison(parsed)),
            None => Err(ScanError::invalid_input(format!(
                "Unknown comparison '{}' for devices matching '{}'",
                comparison, self.pattern
            ))
            .with_suggestion("Use =, >, >=, <, <=, increase by or decrease by")),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn matches(&self, device: &str) -> bool {
        self.regex.is_match(device)
    }
}

/// Resolved settings for one device
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceDefaults {
    pub completion: bool,
    pub readback: Readback,
    pub tolerance: f64,
    pub timeout: f64,
    pub comparison: Comparison,
}

impl DeviceDefaults {
    /// Settings of a device that matches no class
    pub fn zero() -> Self {
        Self {
            completion: false,
            readback: Readback::Off,
            tolerance: 0.0,
            timeout: 0.0,
            comparison: Comparison::AtLeast,
        }
    }

    /// Copy completion, readback, tolerance and timeout onto a Set
    pub fn configure(&self, set: &mut Set) {
        set.set_completion(self.completion);
        set.set_readback(self.readback.clone());
        set.set_tolerance(self.tolerance);
        set.set_timeout(self.timeout);
    }

    pub fn configure_loop(&self, lp: Loop) -> Loop {
        lp.with_completion(self.completion)
            .with_readback(self.readback.clone())
            .with_tolerance(self.tolerance)
            .with_timeout(self.timeout)
    }

    /// Apply per-column or per-cell overrides
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if overrides.no_completion {
            self.completion = false;
        }
        if overrides.no_readback {
            self.readback = Readback::Off;
        }
        self
    }
}

/// Flags that switch off class defaults for one column or cell
///
/// Written as a prefix: `-c Motor1` (no completion), `-r Motor1`
/// (no readback), `-cr Motor1` or `-rc Motor1` (neither).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Overrides {
    pub no_completion: bool,
    pub no_readback: bool,
}

impl Overrides {
    /// Split a leading override flag from `text`
    pub fn split(text: &str) -> (Overrides, &str) {
        let text = text.trim();
        let Some((flag, rest)) = text.split_once(char::is_whitespace) else {
            return (Overrides::default(), text);
        };
        let overrides = match flag {
            "-c" => Overrides { no_completion: true, no_readback: false },
            "-r" => Overrides { no_completion: false, no_readback: true },
            "-cr" | "-rc" => Overrides { no_completion: true, no_readback: true },
            _ => return (Overrides::default(), text),
        };
        (overrides, rest.trim_start())
    }

    pub fn is_empty(&self) -> bool {
        !self.no_completion && !self.no_readback
    }

    /// Union of two override sets
    pub fn merge(self, other: Overrides) -> Overrides {
        Overrides {
            no_completion: self.no_completion || other.no_completion,
            no_readback: self.no_readback || other.no_readback,
        }
    }
}

/// Maps a device name to the device that reports its readback
pub type ReadbackNamer = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Ordered device classes plus a readback namer
#[derive(Clone)]
pub struct ScanSettings {
    classes: Vec<DeviceClass>,
    readback_namer: ReadbackNamer,
}

impl ScanSettings {
    pub fn new() -> Self {
        Self {
            classes: Vec::new(),
            readback_namer: Arc::new(|device: &str| device.to_string()),
        }
    }

    /// Add a class; earlier classes take precedence
    pub fn with_class(mut self, class: DeviceClass) -> Self {
        self.classes.push(class);
        self
    }

    /// Shorthand for `with_class(DeviceClass::new(pattern)?)`
    pub fn define(
        self,
        pattern: &str,
        configure: impl FnOnce(DeviceClass) -> DeviceClass,
    ) -> Result<Self, ScanError> {
        let class = configure(DeviceClass::new(pattern)?);
        Ok(self.with_class(class))
    }

    pub fn with_readback_namer<F>(mut self, namer: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.readback_namer = Arc::new(namer);
        self
    }

    pub fn classes(&self) -> &[DeviceClass] {
        &self.classes
    }

    /// First class matching the device
    pub fn find_class(&self, device: &str) -> Option<&DeviceClass> {
        self.classes.iter().find(|c| c.matches(device))
    }

    pub fn readback_name(&self, device: &str) -> String {
        (self.readback_namer)(device)
    }

    /// Defaults for a device, before overrides
    pub fn resolve(&self, device: &str) -> DeviceDefaults {
        match self.find_class(device) {
            Some(class) => {
                let readback = if !class.readback {
                    Readback::Off
                } else if let Some(ref fixed) = class.readback_device {
                    Readback::Named(fixed.clone())
                } else {
                    Readback::Named(self.readback_name(device))
                };
                DeviceDefaults {
                    completion: class.completion,
                    readback,
                    tolerance: class.tolerance,
                    timeout: class.timeout,
                    comparison: class.comparison,
                }
            }
            None => DeviceDefaults::zero(),
        }
    }

    /// Comparison used when waiting on a device
    pub fn comparison_for(&self, device: &str) -> Comparison {
        self.find_class(device)
            .map(|c| c.comparison)
            .unwrap_or(Comparison::AtLeast)
    }
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ScanSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanSettings")
            .field("classes", &self.classes)
            .finish_non_exhaustive()
    }
}

static DEFAULT_SETTINGS: OnceLock<RwLock<Arc<ScanSettings>>> = OnceLock::new();

fn default_cell() -> &'static RwLock<Arc<ScanSettings>> {
    DEFAULT_SETTINGS.get_or_init(|| RwLock::new(Arc::new(ScanSettings::new())))
}

/// Register the settings used by tables that are not given explicit ones
pub fn set_default_settings(settings: ScanSettings) -> Result<(), ScanError> {
    let mut guard = default_cell()
        .write()
        .map_err(|_| ScanError::internal("Failed to acquire settings lock"))?;
    *guard = Arc::new(settings);
    tracing::debug!(classes = guard.classes.len(), "default scan settings replaced");
    Ok(())
}

/// Currently registered default settings
pub fn default_settings() -> Result<Arc<ScanSettings>, ScanError> {
    let guard = default_cell()
        .read()
        .map_err(|_| ScanError::internal("Failed to acquire settings lock"))?;
    Ok(Arc::clone(&guard))
}
