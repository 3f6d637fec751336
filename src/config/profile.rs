use std::collections::HashSet;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// WD MYCLOUDEX2ULTRA-MIB nasAgent: enterprises.5127.1.1.1.8.1
pub const WD_NAS_AGENT: &str = "1.3.6.1.4.1.5127.1.1.1.8.1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transform {
    /// Kilobytes to mebibytes, one decimal
    KbToMib,
}

/// Metric computed from other scalars after fetching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Derivation {
    Difference { minuend: String, subtrahend: String },
}

impl Derivation {
    pub fn inputs(&self) -> Vec<&str> {
        match self {
            Derivation::Difference {
                minuend,
                subtrahend,
            } => vec![minuend.as_str(), subtrahend.as_str()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricSpec {
    pub key: String,
    /// Absent for computed metrics
    #[serde(default)]
    pub oid: Option<String>,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub transform: Option<Transform>,
    #[serde(default)]
    pub computed: Option<Derivation>,
}

impl MetricSpec {
    pub fn scalar(key: &str, oid: &str, unit: &str) -> Self {
        Self {
            key: key.to_string(),
            oid: Some(oid.to_string()),
            unit: unit.to_string(),
            transform: None,
            computed: None,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = Some(transform);
        self
    }

    pub fn computed(key: &str, unit: &str, derivation: Derivation) -> Self {
        Self {
            key: key.to_string(),
            oid: None,
            unit: unit.to_string(),
            transform: None,
            computed: Some(derivation),
        }
    }

    pub fn is_computed(&self) -> bool {
        self.computed.is_some()
    }
}

/// Column roots of the disk table (walk `index` to discover rows)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskTableLayout {
    pub index: String,
    pub vendor: String,
    pub model: String,
    pub serial: String,
    pub temperature: String,
    pub capacity: String,
    pub status: String,
}

/// Column roots of the volume table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeTableLayout {
    pub index: String,
    pub name: String,
    pub fs_type: String,
    pub raid_level: String,
    pub size: String,
    pub free: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub scalars: Vec<MetricSpec>,
    pub disk_table: DiskTableLayout,
    pub volume_table: VolumeTableLayout,
}

impl Profile {
    pub fn validate(&self) -> Result<()> {
        if self.scalars.is_empty() {
            anyhow::bail!("profile '{}' has no scalars", self.name);
        }

        let mut keys = HashSet::new();
        for spec in &self.scalars {
            if !keys.insert(spec.key.as_str()) {
                anyhow::bail!("profile '{}' repeats metric key '{}'", self.name, spec.key);
            }
            if spec.computed.is_none() && spec.oid.is_none() {
                anyhow::bail!("metric '{}' needs an oid or a derivation", spec.key);
            }
        }

        for spec in &self.scalars {
            if let Some(derivation) = &spec.computed {
                for input in derivation.inputs() {
                    if !keys.contains(input) {
                        anyhow::bail!("metric '{}' derives from unknown key '{}'", spec.key, input);
                    }
                }
            }
        }

        Ok(())
    }

    /// Built-in profile for the WD My Cloud EX2 Ultra.
    pub fn wd_ex2_ultra() -> Self {
        let agent = |suffix: &str| format!("{}.{}", WD_NAS_AGENT, suffix);

        Self {
            name: "wd-ex2-ultra".to_string(),
            scalars: vec![
                MetricSpec::scalar("cpu_load_1min", "1.3.6.1.4.1.2021.10.1.3.1", "%"),
                MetricSpec::scalar("cpu_load_5min", "1.3.6.1.4.1.2021.10.1.3.2", "%"),
                MetricSpec::scalar("cpu_load_15min", "1.3.6.1.4.1.2021.10.1.3.3", "%"),
                MetricSpec::scalar("ram_total", "1.3.6.1.4.1.2021.4.5.0", "MiB")
                    .with_transform(Transform::KbToMib),
                MetricSpec::scalar("ram_free", "1.3.6.1.4.1.2021.4.11.0", "MiB")
                    .with_transform(Transform::KbToMib),
                MetricSpec::computed(
                    "ram_used",
                    "MiB",
                    Derivation::Difference {
                        minuend: "ram_total".to_string(),
                        subtrahend: "ram_free".to_string(),
                    },
                ),
                MetricSpec::scalar("system_temperature", &agent("7.0"), "°C"),
                MetricSpec::scalar("fan_status", &agent("8.0"), ""),
                MetricSpec::scalar("network_in", "1.3.6.1.2.1.2.2.1.10.2", "B"),
                MetricSpec::scalar("network_out", "1.3.6.1.2.1.2.2.1.16.2", "B"),
                MetricSpec::scalar("system_uptime", "1.3.6.1.2.1.1.3.0", "s"),
            ],
            disk_table: DiskTableLayout {
                index: agent("10.1.1"),
                vendor: agent("10.1.2"),
                model: agent("10.1.3"),
                serial: agent("10.1.4"),
                temperature: agent("10.1.5"),
                capacity: agent("10.1.6"),
                status: agent("10.1.7"),
            },
            volume_table: VolumeTableLayout {
                index: agent("9.1.1"),
                name: agent("9.1.2"),
                fs_type: agent("9.1.3"),
                raid_level: agent("9.1.4"),
                size: agent("9.1.5"),
                free: agent("9.1.6"),
            },
        }
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::wd_ex2_ultra()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_profile_is_valid() {
        let profile = Profile::wd_ex2_ultra();
        profile.validate().unwrap();
        assert_eq!(profile.disk_table.index, "1.3.6.1.4.1.5127.1.1.1.8.1.10.1.1");
        assert!(profile.scalars.iter().any(|s| s.key == "ram_used" && s.is_computed()));
    }

    #[test]
    fn rejects_duplicate_keys() {
        let mut profile = Profile::wd_ex2_ultra();
        profile
            .scalars
            .push(MetricSpec::scalar("fan_status", "1.3.6.1.2.1.1.1.0", ""));
        assert!(profile.validate().is_err());
    }

    #[test]
    fn rejects_derivation_from_unknown_key() {
        let mut profile = Profile::wd_ex2_ultra();
        profile.scalars.push(MetricSpec::computed(
            "swap_used",
            "MiB",
            Derivation::Difference {
                minuend: "swap_total".to_string(),
                subtrahend: "swap_free".to_string(),
            },
        ));
        assert!(profile.validate().is_err());
    }

    #[test]
    fn parses_yaml_metric_specs() {
        let yaml = r#"
key: ram_used
unit: MiB
computed:
  op: difference
  minuend: ram_total
  subtrahend: ram_free
"#;
        let spec: MetricSpec = serde_yml::from_str(yaml).unwrap();
        assert!(spec.is_computed());
        assert_eq!(spec.oid, None);

        let spec: MetricSpec =
            serde_yml::from_str("key: ram_total\noid: 1.3.6.1.4.1.2021.4.5.0\ntransform: kb_to_mib\n")
                .unwrap();
        assert_eq!(spec.transform, Some(Transform::KbToMib));
    }
}
