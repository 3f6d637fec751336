//! SNMP telemetry collector for WD My Cloud class NAS appliances.
//!
//! One poll fetches a fixed set of scalar metrics, walks the disk and volume tables,
//! normalizes vendor value formats and returns an immutable [`Snapshot`]. Per-item
//! failures become unknown values. Only a poll that cannot start fails as a whole.

pub mod collector;
pub mod config;
pub mod error;
pub mod formatter;
pub mod handlers;
pub mod routes;
pub mod scheduler;
pub mod snmp;

pub use collector::{Reading, Snapshot, SnmpCollector};
pub use config::{AppConfig, DeviceSettings, Profile};
pub use error::{PollError, RequestError, SessionError, ValidationError};
