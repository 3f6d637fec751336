use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::debug;

use super::table_collector::TableCollector;
use super::types::{DiskRow, VolumeRow};
use super::value_parser::{parse_number, parse_vendor_temperature, round1};
use crate::config::{DiskTableLayout, VolumeTableLayout};
use crate::snmp::SnmpTransport;

/// One joined table row before value parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub index: String,
    cells: HashMap<&'static str, String>,
}

impl RawRow {
    /// Cell of `column`, empty when its walk did not return this row.
    pub fn cell(&self, column: &str) -> &str {
        self.cells.get(column).map(String::as_str).unwrap_or("")
    }
}

/// Orders row indices numerically when both are all digits, lexically otherwise.
/// Numeric indices sort ahead of non-numeric ones.
pub fn compare_row_indices(a: &str, b: &str) -> Ordering {
    let is_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());

    match (is_digits(a), is_digits(b)) {
        (true, true) => {
            let (na, nb) = (a.trim_start_matches('0'), b.trim_start_matches('0'));
            na.len()
                .cmp(&nb.len())
                .then_with(|| na.cmp(nb))
                .then_with(|| a.cmp(b))
        }
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.cmp(b),
    }
}

pub fn disk_status_label(code: &str) -> String {
    match code.trim() {
        "0" => "normal".to_string(),
        "1" => "warning".to_string(),
        "2" => "failed".to_string(),
        "3" => "missing".to_string(),
        other => other.to_string(),
    }
}

pub fn raid_level_label(code: &str) -> String {
    let code = code.trim();
    match code.to_ascii_lowercase().as_str() {
        "0" | "raid0" => "RAID 0".to_string(),
        "1" | "raid1" => "RAID 1".to_string(),
        "5" | "raid5" => "RAID 5".to_string(),
        "10" | "raid10" => "RAID 10".to_string(),
        "jbod" => "JBOD".to_string(),
        "linear" | "spanning" => "Spanning".to_string(),
        _ => code.to_string(),
    }
}

/// `(used_mb, used_pct)`, both present only when size and free both parsed.
pub fn volume_usage(size_mb: Option<f64>, free_mb: Option<f64>) -> (Option<f64>, Option<f64>) {
    match (size_mb, free_mb) {
        (Some(size), Some(free)) => {
            let used = size - free;
            let pct = if size == 0.0 { 0.0 } else { used / size * 100.0 };
            (Some(round1(used)), Some(round1(pct)))
        }
        _ => (None, None),
    }
}

impl DiskRow {
    pub fn from_raw(row: &RawRow) -> Self {
        Self {
            index: row.index.clone(),
            vendor: row.cell("vendor").trim().to_string(),
            model: row.cell("model").trim().to_string(),
            serial: row.cell("serial").trim().to_string(),
            temperature: parse_vendor_temperature(row.cell("temperature")),
            capacity: parse_number(row.cell("capacity")),
            status: disk_status_label(row.cell("status")),
        }
    }
}

impl VolumeRow {
    pub fn from_raw(row: &RawRow) -> Self {
        let size_mb = parse_number(row.cell("size"));
        let free_mb = parse_number(row.cell("free"));
        let (used_mb, used_pct) = volume_usage(size_mb, free_mb);

        Self {
            index: row.index.clone(),
            name: row.cell("name").trim().to_string(),
            fs_type: row.cell("fs_type").trim().to_string(),
            raid_level: raid_level_label(row.cell("raid_level")),
            size_mb,
            free_mb,
            used_mb,
            used_pct,
        }
    }
}

/// Assembles the disk and volume tables from column walks
pub struct InventoryCollector;

impl InventoryCollector {
    /// Walks the index column, then every data column, and joins them on row index.
    ///
    /// Rows come from the index column alone. A column whose walk failed or skipped a
    /// row leaves that cell empty instead of dropping the row.
    pub async fn collect_rows<T>(
        transport: &mut T,
        index_column: &str,
        columns: &[(&'static str, &str)],
    ) -> Vec<RawRow>
    where
        T: SnmpTransport + ?Sized,
    {
        let indices = TableCollector::walk_column(transport, index_column).await;
        if indices.is_empty() {
            debug!(index_column, "table is empty");
            return Vec::new();
        }

        let mut rows: Vec<RawRow> = indices
            .into_keys()
            .map(|index| RawRow {
                index,
                cells: HashMap::new(),
            })
            .collect();

        for (name, column_root) in columns {
            let mut values = TableCollector::walk_column(transport, column_root).await;
            for row in &mut rows {
                let value = values.remove(&row.index).unwrap_or_default();
                row.cells.insert(*name, value);
            }
        }

        rows.sort_by(|a, b| compare_row_indices(&a.index, &b.index));
        rows
    }

    pub async fn collect_disks<T>(transport: &mut T, layout: &DiskTableLayout) -> Vec<DiskRow>
    where
        T: SnmpTransport + ?Sized,
    {
        let columns = [
            ("vendor", layout.vendor.as_str()),
            ("model", layout.model.as_str()),
            ("serial", layout.serial.as_str()),
            ("temperature", layout.temperature.as_str()),
            ("capacity", layout.capacity.as_str()),
            ("status", layout.status.as_str()),
        ];

        Self::collect_rows(transport, &layout.index, &columns)
            .await
            .iter()
            .map(DiskRow::from_raw)
            .collect()
    }

    pub async fn collect_volumes<T>(transport: &mut T, layout: &VolumeTableLayout) -> Vec<VolumeRow>
    where
        T: SnmpTransport + ?Sized,
    {
        let columns = [
            ("name", layout.name.as_str()),
            ("fs_type", layout.fs_type.as_str()),
            ("raid_level", layout.raid_level.as_str()),
            ("size", layout.size.as_str()),
            ("free", layout.free.as_str()),
        ];

        Self::collect_rows(transport, &layout.index, &columns)
            .await
            .iter()
            .map(VolumeRow::from_raw)
            .collect()
    }
}
