// Invokes the external smartctl tool and extracts identity fields

use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result};
use regex::Regex;

/// Checks whether the device reports self-monitoring as enabled.
/// Devices that do not are excluded from the pipeline entirely.
pub fn smart_enabled(dev: &Path) -> Result<bool> {
    let output = Command::new("smartctl")
        .arg("-i")
        .arg(dev)
        .output()
        .with_context(|| format!("failed to run smartctl -i on {}", dev.display()))?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(stdout.contains("SMART support is: Enabled"))
}

/// Returns the full diagnostic output for a device.
/// smartctl exits non-zero for failing drives; the text is still the
/// report we want, so only a failed spawn is an error.
pub fn full_output(dev: &Path) -> Result<String> {
    let output = Command::new("smartctl")
        .arg("-a")
        .arg(dev)
        .output()
        .with_context(|| format!("failed to run smartctl -a on {}", dev.display()))?;

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Manufacturer serial number, the stable device identity.
pub fn serial_number(raw: &str) -> Option<String> {
    extract(raw, r"Serial Number:\s+(.+)")
}

/// Drive model, for report headers.
pub fn model(raw: &str) -> Option<String> {
    extract(raw, r"Device Model:\s+(.+)").or_else(|| extract(raw, r"Model Number:\s+(.+)"))
}

fn extract(src: &str, pat: &str) -> Option<String> {
    let re = Regex::new(pat).unwrap();
    re.captures(src).map(|c| c[1].trim().to_string())
}
