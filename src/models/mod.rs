// Data models for drive health evaluation and critical-metric history

use chrono::NaiveDateTime;

/// A single row of the SMART attribute table as reported by the drive.
/// Holds the normalized current value, the worst value ever recorded,
/// and the vendor failure threshold.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeRow {
    /// Attribute identifier as printed by the tool (usually a number)
    #[allow(dead_code)]
    pub id: String,
    /// Human-readable attribute name (e.g., Reallocated_Sector_Ct)
    pub name: String,
    /// Current normalized value of the attribute
    pub current: u32,
    /// Worst value ever recorded for this attribute
    pub worst: u32,
    /// Vendor failure threshold for this attribute
    pub threshold: u32,
}

/// The fixed set of critical metrics tracked with dedicated history,
/// regardless of how the attribute table is laid out per model.
/// Variant order is the ledger column order and the report order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CriticalMetric {
    /// Sectors the drive has remapped to spare area
    ReallocatedSectors,
    /// Sectors waiting to be remapped
    PendingSectors,
    /// Sectors that could not be corrected offline
    OfflineUncorrectable,
}

impl CriticalMetric {
    /// All metrics in fixed order.
    pub const ALL: [CriticalMetric; 3] = [
        CriticalMetric::ReallocatedSectors,
        CriticalMetric::PendingSectors,
        CriticalMetric::OfflineUncorrectable,
    ];

    /// Column name used in ledger headers and report findings.
    pub fn column_name(&self) -> &'static str {
        match self {
            CriticalMetric::ReallocatedSectors => "ReallocatedSectorCount",
            CriticalMetric::PendingSectors => "CurrentPendingSectorCount",
            CriticalMetric::OfflineUncorrectable => "OfflineUncorrectableCount",
        }
    }
}

/// Where to find one critical metric's raw value in the diagnostic text.
/// Keeping the label and column here (instead of hard-coded offsets in the
/// extractor) isolates vendor format drift to this table.
#[derive(Clone, Copy, Debug)]
pub struct RawValueField {
    /// Metric this field feeds
    pub metric: CriticalMetric,
    /// Substring identifying the metric's line (attribute id + name)
    pub label: &'static str,
    /// 1-based whitespace-token position of the raw value on that line
    pub column: usize,
}

/// Raw-value field layout for the common ATA attribute table: the
/// RAW_VALUE column is the 10th whitespace-delimited token.
pub const ATA_RAW_VALUE_FIELDS: [RawValueField; 3] = [
    RawValueField {
        metric: CriticalMetric::ReallocatedSectors,
        label: "5 Reallocated_Sector_Ct",
        column: 10,
    },
    RawValueField {
        metric: CriticalMetric::PendingSectors,
        label: "197 Current_Pending_Sector",
        column: 10,
    },
    RawValueField {
        metric: CriticalMetric::OfflineUncorrectable,
        label: "198 Offline_Uncorrectable",
        column: 10,
    },
];

/// One reading of the critical metrics for a device.
/// A `None` value means the metric's label was absent from the diagnostic
/// text: it is recorded as unknown, never silently dropped, and unknown
/// values are excluded from threshold and regression comparisons.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CriticalSnapshot {
    /// Local wall-clock time the reading was taken
    pub taken_at: NaiveDateTime,
    /// Raw reallocated sector count, if reported
    pub reallocated: Option<u64>,
    /// Raw pending sector count, if reported
    pub pending: Option<u64>,
    /// Raw offline-uncorrectable count, if reported
    pub uncorrectable: Option<u64>,
}

impl CriticalSnapshot {
    /// Creates a snapshot with all metrics unknown.
    pub fn empty(taken_at: NaiveDateTime) -> Self {
        Self {
            taken_at,
            reallocated: None,
            pending: None,
            uncorrectable: None,
        }
    }

    /// Returns the value recorded for one metric.
    pub fn value(&self, metric: CriticalMetric) -> Option<u64> {
        match metric {
            CriticalMetric::ReallocatedSectors => self.reallocated,
            CriticalMetric::PendingSectors => self.pending,
            CriticalMetric::OfflineUncorrectable => self.uncorrectable,
        }
    }

    /// Sets the value for one metric.
    pub fn set_value(&mut self, metric: CriticalMetric, value: Option<u64>) {
        match metric {
            CriticalMetric::ReallocatedSectors => self.reallocated = value,
            CriticalMetric::PendingSectors => self.pending = value,
            CriticalMetric::OfflineUncorrectable => self.uncorrectable = value,
        }
    }
}

/// Tri-state health classification computed per run per device.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verdict {
    /// No threshold breach and no critical metric above zero
    Good,
    /// An attribute has dipped below its threshold in the past
    Warn,
    /// An attribute is currently below threshold, or a critical
    /// metric is above zero
    Bad,
}

impl Verdict {
    /// Short label for report headers.
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Good => "GOOD",
            Verdict::Warn => "WARN",
            Verdict::Bad => "BAD",
        }
    }
}

/// Verdict plus the ordered list of reasons that produced it.
/// Computed fresh every run; never persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HealthReport {
    /// Overall classification for the device
    pub verdict: Verdict,
    /// Why the verdict is what it is; empty only when Good
    pub reasons: Vec<String>,
}

/// Information about a single partition on a drive.
#[derive(Clone, Debug)]
pub struct PartitionInfo {
    /// Directory where the partition is mounted (e.g., /home)
    pub mount_point: String,
    /// Filesystem type (e.g., ext4, ntfs)
    pub fs_type: String,
    /// Total capacity in gigabytes
    pub total_gb: f64,
    /// Used space in gigabytes
    pub used_gb: f64,
    /// Percentage of space currently used (0-100)
    pub used_percent: f64,
}

/// Everything the run summary reports for one device.
#[derive(Clone, Debug)]
pub struct DeviceReport {
    /// Stable identity: the manufacturer serial number
    pub serial: String,
    /// Transient device path the reading came from
    pub path: String,
    /// Drive model, if the tool reported one
    pub model: Option<String>,
    /// Verdict and reasons for this run
    pub health: HealthReport,
    /// Critical metrics that strictly increased since the prior run
    pub regressions: Vec<String>,
    /// Mounted partitions on this drive, for the overview section
    pub partitions: Vec<PartitionInfo>,
}
