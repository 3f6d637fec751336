use std::collections::BTreeMap;

use tracing::{debug, warn};

use super::types::Reading;
use super::value_parser::{parse_number, parse_strict_number, parse_vendor_temperature, round1};
use crate::config::{Derivation, MetricSpec, Transform};
use crate::snmp::SnmpTransport;

const UPTIME_KEY: &str = "system_uptime";

/// Collects scalar SNMP values
pub struct ScalarCollector;

impl ScalarCollector {
    /// Fetches every non-computed metric, then derives the computed ones.
    pub async fn fetch_scalars<T>(transport: &mut T, specs: &[MetricSpec]) -> BTreeMap<String, Reading>
    where
        T: SnmpTransport + ?Sized,
    {
        let mut readings = Self::collect_raw(transport, specs).await;
        Self::derive_computed(specs, &mut readings);
        readings
    }

    /// One GET per metric. A failed item becomes `Unavailable` and the loop moves on.
    pub async fn collect_raw<T>(transport: &mut T, specs: &[MetricSpec]) -> BTreeMap<String, Reading>
    where
        T: SnmpTransport + ?Sized,
    {
        let mut readings = BTreeMap::new();

        for spec in specs.iter().filter(|spec| !spec.is_computed()) {
            let reading = Self::collect_single_scalar(transport, spec).await;
            readings.insert(spec.key.clone(), reading);
        }

        readings
    }

    async fn collect_single_scalar<T>(transport: &mut T, spec: &MetricSpec) -> Reading
    where
        T: SnmpTransport + ?Sized,
    {
        let Some(oid) = spec.oid.as_deref() else {
            warn!(key = %spec.key, "metric has no OID");
            return Reading::unavailable("no OID configured");
        };

        match transport.get(oid).await {
            Ok(Some(raw)) => {
                debug!(key = %spec.key, oid, raw = %raw, "scalar fetched");
                Self::post_process(spec, &raw)
            }
            Ok(None) => {
                warn!(key = %spec.key, oid, "agent returned no value");
                Reading::unavailable("no such object")
            }
            Err(e) => {
                warn!(key = %spec.key, oid, error = %e, "SNMP GET failed");
                Reading::unavailable(e.to_string())
            }
        }
    }

    /// Converts a raw value to its unit. First matching rule wins.
    pub fn post_process(spec: &MetricSpec, raw: &str) -> Reading {
        let parsed = if spec.key == UPTIME_KEY {
            // timeticks are hundredths of a second
            parse_number(raw).map(|ticks| round1(ticks / 100.0))
        } else if spec.key.contains("temperature") {
            parse_vendor_temperature(raw)
        } else if spec.transform == Some(Transform::KbToMib) {
            parse_number(raw).map(|kb| round1(kb / 1024.0))
        } else {
            return match parse_strict_number(raw) {
                Some(value) => Reading::number(value),
                None => Reading::text(raw),
            };
        };

        match parsed {
            Some(value) => Reading::number(value),
            None => {
                warn!(key = %spec.key, raw, "unparsable value");
                Reading::unavailable(format!("unparsable value: {:?}", raw))
            }
        }
    }

    /// Fills computed metrics whose inputs are all numeric; the rest are recorded as unavailable.
    pub fn derive_computed(specs: &[MetricSpec], readings: &mut BTreeMap<String, Reading>) {
        for spec in specs {
            let Some(derivation) = &spec.computed else {
                continue;
            };

            let reading = match derivation {
                Derivation::Difference {
                    minuend,
                    subtrahend,
                } => {
                    let lhs = readings.get(minuend).and_then(Reading::as_f64);
                    let rhs = readings.get(subtrahend).and_then(Reading::as_f64);
                    match (lhs, rhs) {
                        (Some(lhs), Some(rhs)) => Reading::number(round1(lhs - rhs)),
                        _ => Reading::unavailable(format!(
                            "inputs unavailable: {} - {}",
                            minuend, subtrahend
                        )),
                    }
                }
            };

            readings.insert(spec.key.clone(), reading);
        }
    }
}
