// Device enumeration and partition overview

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use sysinfo::Disks;

use crate::models::PartitionInfo;

/// Scans /dev for whole-disk nodes to probe: NVMe namespaces without a
/// partition suffix and three-letter sd devices. Paths are transient
/// probe targets only; identity comes from the serial number later.
pub fn candidate_devices() -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();

    let dev_entries = fs::read_dir("/dev").context("failed to read /dev")?;
    for entry in dev_entries {
        if let Ok(e) = entry {
            let name = e.file_name().into_string().unwrap_or_default();

            if name.starts_with("nvme") && !name.contains('p') {
                out.push(PathBuf::from(format!("/dev/{}", name)));
            }

            if name.starts_with("sd") && name.len() == 3 {
                out.push(PathBuf::from(format!("/dev/{}", name)));
            }
        }
    }

    out.sort();
    Ok(out)
}

/// Collects mounted-partition usage for a device name (e.g., "sda").
pub fn partitions_for(dev_name: &str) -> Vec<PartitionInfo> {
    let disks = Disks::new_with_refreshed_list();
    let mut out = Vec::new();

    for disk in disks.iter() {
        let disk_name = disk.name().to_string_lossy();
        if disk_name.contains(dev_name) {
            let total = disk.total_space() as f64 / 1_000_000_000.0;
            let available = disk.available_space() as f64 / 1_000_000_000.0;
            let used = total - available;
            let used_percent = if total > 0.0 {
                (used / total) * 100.0
            } else {
                0.0
            };

            out.push(PartitionInfo {
                mount_point: disk.mount_point().display().to_string(),
                fs_type: disk.file_system().to_string_lossy().into_owned(),
                total_gb: total,
                used_gb: used,
                used_percent,
            });
        }
    }

    out
}
