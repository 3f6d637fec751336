use std::collections::BTreeMap;

use serde::Serialize;

use crate::collector::{DiskRow, Reading, Snapshot, VolumeRow};

/// JSON document handed to whatever renders the metrics
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotJson {
    pub device_type: String,
    pub host: String,
    pub timestamp: String,
    pub summary: SnapshotSummary,
    pub scalars: BTreeMap<String, Reading>,
    pub disks: Vec<DiskRow>,
    pub volumes: Vec<VolumeRow>,
    pub errors: Vec<ErrorInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotSummary {
    pub total_scalars: usize,
    pub available_scalars: usize,
    pub disks: usize,
    pub volumes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorInfo {
    pub item_type: String, // "scalar"
    pub item_name: String,
    pub error_message: String,
}

/// JSON formatter for poll snapshots
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn format_snapshot(snapshot: &Snapshot, device_type: &str, host: &str) -> SnapshotJson {
        let scalars = snapshot.scalars();

        let summary = SnapshotSummary {
            total_scalars: scalars.len(),
            available_scalars: scalars.values().filter(|r| r.is_available()).count(),
            disks: snapshot.disks().len(),
            volumes: snapshot.volumes().len(),
        };

        SnapshotJson {
            device_type: device_type.to_string(),
            host: host.to_string(),
            timestamp: snapshot.taken_at().to_rfc3339(),
            summary,
            scalars: scalars.clone(),
            disks: snapshot.disks().to_vec(),
            volumes: snapshot.volumes().to_vec(),
            errors: Self::extract_errors(snapshot),
        }
    }

    fn extract_errors(snapshot: &Snapshot) -> Vec<ErrorInfo> {
        snapshot
            .scalars()
            .iter()
            .filter_map(|(key, reading)| match reading {
                Reading::Unavailable(reason) => Some(ErrorInfo {
                    item_type: "scalar".to_string(),
                    item_name: key.clone(),
                    error_message: reason.clone(),
                }),
                Reading::Available(_) => None,
            })
            .collect()
    }

    /// Serializes the snapshot to pretty JSON
    pub fn to_json_string(snapshot: &Snapshot, device_type: &str, host: &str) -> anyhow::Result<String> {
        let json = Self::format_snapshot(snapshot, device_type, host);
        serde_json::to_string_pretty(&json)
            .map_err(|e| anyhow::anyhow!("JSON serialization failed: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn snapshot() -> Snapshot {
        Snapshot::new(
            BTreeMap::from([
                ("cpu_load_1min".to_string(), Reading::number(0.42)),
                ("fan_status".to_string(), Reading::unavailable("TIMEOUT")),
            ]),
            vec![DiskRow {
                index: "1".to_string(),
                vendor: "WDC".to_string(),
                model: "WD40EFRX".to_string(),
                serial: "WD-1234".to_string(),
                temperature: Some(38.0),
                capacity: None,
                status: "normal".to_string(),
            }],
            Vec::new(),
        )
    }

    #[test]
    fn summarizes_and_lists_errors() {
        let json = JsonFormatter::format_snapshot(&snapshot(), "wd-ex2-ultra", "nas.local");

        assert_eq!(
            json.summary,
            SnapshotSummary {
                total_scalars: 2,
                available_scalars: 1,
                disks: 1,
                volumes: 0,
            }
        );
        assert_eq!(json.errors.len(), 1);
        assert_eq!(json.errors[0].item_name, "fan_status");
    }

    #[test]
    fn unknown_values_render_as_null_not_zero() {
        let json = JsonFormatter::format_snapshot(&snapshot(), "wd-ex2-ultra", "nas.local");
        let value: Value = serde_json::to_value(&json).unwrap();

        assert_eq!(value["scalars"]["fan_status"]["value"], Value::Null);
        assert_eq!(value["disks"][0]["capacity"], Value::Null);
        assert_eq!(value["scalars"]["cpu_load_1min"]["value"], 0.42);
    }
}
