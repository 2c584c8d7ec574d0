//! Device settings presets

use tablescan_core::ScanError;
use tablescan_plugin::{DeviceClass, ScanSettings};

/// Motors, a temperature controller and a free-running counter
///
/// - `Motor*`: await completion, verify `<name>.RBV`, 100 s timeout
/// - `temperature`: await completion, 300 s timeout
/// - `InfiniteCounter`: waits use "increase by"
pub fn beamline_settings() -> Result<ScanSettings, ScanError> {
    let settings = ScanSettings::new()
        .with_class(
            DeviceClass::new("Motor.*")?
                .completion(true)
                .readback(true)
                .timeout(100.0),
        )
        .with_class(DeviceClass::new("temperature")?.completion(true).timeout(300.0))
        .with_class(DeviceClass::new("InfiniteCounter")?.comparison_str("increase by")?)
        .with_readback_namer(|device| {
            if device.contains("Motor") {
                format!("{}.RBV", device)
            } else {
                device.to_string()
            }
        });
    tracing::debug!(classes = settings.classes().len(), "beamline settings built");
    Ok(settings)
}
