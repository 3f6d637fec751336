use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

/// Typed value of a scalar metric
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Text(String),
}

/// Outcome of one scalar: a value, or unknown with the reason it is missing.
#[derive(Debug, Clone, PartialEq)]
pub enum Reading {
    Available(MetricValue),
    Unavailable(String),
}

impl Reading {
    pub fn number(value: f64) -> Self {
        Reading::Available(MetricValue::Number(value))
    }

    pub fn text(value: impl Into<String>) -> Self {
        Reading::Available(MetricValue::Text(value.into()))
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Reading::Unavailable(reason.into())
    }

    pub fn value(&self) -> Option<&MetricValue> {
        match self {
            Reading::Available(value) => Some(value),
            Reading::Unavailable(_) => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Reading::Available(MetricValue::Number(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Reading::Available(_))
    }
}

// `{"value": ..., "error": null}` or `{"value": null, "error": "..."}`
impl Serialize for Reading {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Reading", 2)?;
        match self {
            Reading::Available(value) => {
                state.serialize_field("value", value)?;
                state.serialize_field("error", &None::<&str>)?;
            }
            Reading::Unavailable(reason) => {
                state.serialize_field("value", &None::<&MetricValue>)?;
                state.serialize_field("error", reason)?;
            }
        }
        state.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiskRow {
    pub index: String,
    pub vendor: String,
    pub model: String,
    pub serial: String,
    /// °C
    pub temperature: Option<f64>,
    /// As reported by the agent (GB)
    pub capacity: Option<f64>,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeRow {
    pub index: String,
    pub name: String,
    pub fs_type: String,
    pub raid_level: String,
    pub size_mb: Option<f64>,
    pub free_mb: Option<f64>,
    pub used_mb: Option<f64>,
    pub used_pct: Option<f64>,
}

/// Result of one completed poll. Built once at the end of the cycle, never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    taken_at: DateTime<Utc>,
    scalars: BTreeMap<String, Reading>,
    disks: Vec<DiskRow>,
    volumes: Vec<VolumeRow>,
}

impl Snapshot {
    pub(crate) fn new(
        scalars: BTreeMap<String, Reading>,
        disks: Vec<DiskRow>,
        volumes: Vec<VolumeRow>,
    ) -> Self {
        Self {
            taken_at: Utc::now(),
            scalars,
            disks,
            volumes,
        }
    }

    pub fn taken_at(&self) -> DateTime<Utc> {
        self.taken_at
    }

    pub fn scalars(&self) -> &BTreeMap<String, Reading> {
        &self.scalars
    }

    pub fn scalar(&self, key: &str) -> Option<&Reading> {
        self.scalars.get(key)
    }

    pub fn disks(&self) -> &[DiskRow] {
        &self.disks
    }

    pub fn volumes(&self) -> &[VolumeRow] {
        &self.volumes
    }
}
