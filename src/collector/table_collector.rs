use std::cmp::Ordering;
use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::snmp::{SnmpTransport, compare_oids, normalize_oid, row_index};

/// Walks single columns of SNMP tables
pub struct TableCollector;

impl TableCollector {
    /// Walks one column with GETNEXT and returns `row index -> raw value`.
    ///
    /// The walk stops on the first request error (keeping the rows collected so far),
    /// on an unbound answer, or once the agent answers outside `column_root`.
    /// An empty column is a normal result.
    pub async fn walk_column<T>(transport: &mut T, column_root: &str) -> BTreeMap<String, String>
    where
        T: SnmpTransport + ?Sized,
    {
        let root = normalize_oid(column_root);
        let mut rows = BTreeMap::new();
        let mut cursor = root.clone();

        loop {
            let (oid, value) = match transport.get_next(&cursor).await {
                Ok(Some(next)) => next,
                Ok(None) => break,
                Err(e) => {
                    warn!(column = %root, rows = rows.len(), error = %e, "column walk aborted");
                    break;
                }
            };

            let Some(index) = row_index(&root, &oid) else {
                break;
            };
            if compare_oids(&oid, &cursor) != Ordering::Greater {
                warn!(column = %root, oid = %oid, "agent did not advance, stopping walk");
                break;
            }

            rows.insert(index.to_string(), value);
            cursor = oid;
        }

        debug!(column = %root, rows = rows.len(), "column walked");
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snmp::simulated::SimulatedAgent;

    const DISK_NUM: &str = "1.3.6.1.4.1.5127.1.1.1.8.1.10.1.1";
    const DISK_VENDOR: &str = "1.3.6.1.4.1.5127.1.1.1.8.1.10.1.2";

    #[tokio::test]
    async fn empty_table_yields_no_rows() {
        let mut agent = SimulatedAgent::new();
        assert!(TableCollector::walk_column(&mut agent, DISK_NUM).await.is_empty());

        // the next object belongs to another column
        let mut agent = SimulatedAgent::new().with_value(&format!("{}.1", DISK_VENDOR), "WDC");
        assert!(TableCollector::walk_column(&mut agent, DISK_NUM).await.is_empty());
    }

    #[tokio::test]
    async fn stops_at_the_next_column() {
        let mut agent = SimulatedAgent::new()
            .with_value(&format!("{}.1", DISK_NUM), "1")
            .with_value(&format!("{}.1", DISK_VENDOR), "WDC");

        let rows = TableCollector::walk_column(&mut agent, DISK_NUM).await;

        assert_eq!(rows.len(), 1);
        assert_eq!(rows["1"], "1");
    }

    #[tokio::test]
    async fn does_not_match_sibling_with_shared_prefix() {
        // .10.1.10 shares the text prefix of .10.1.1 but is another column
        let mut agent = SimulatedAgent::new()
            .with_value(&format!("{}.3", DISK_NUM), "3")
            .with_value("1.3.6.1.4.1.5127.1.1.1.8.1.10.1.10.1", "other");

        let rows = TableCollector::walk_column(&mut agent, DISK_NUM).await;

        assert_eq!(rows.keys().collect::<Vec<_>>(), vec!["3"]);
    }

    #[tokio::test]
    async fn keeps_rows_collected_before_a_failure() {
        let mut agent = SimulatedAgent::new()
            .with_value(&format!("{}.1", DISK_NUM), "1")
            .with_value(&format!("{}.2", DISK_NUM), "2")
            .with_value(&format!("{}.3", DISK_NUM), "3")
            .with_timeout(&format!("{}.2", DISK_NUM));

        let rows = TableCollector::walk_column(&mut agent, DISK_NUM).await;

        assert_eq!(rows.keys().collect::<Vec<_>>(), vec!["1", "2"]);
    }

    #[tokio::test]
    async fn agent_that_does_not_advance_ends_the_walk() {
        let mut agent = SimulatedAgent::new()
            .with_value(&format!("{}.1", DISK_NUM), "1")
            .with_value(&format!("{}.2", DISK_NUM), "2")
            .with_value(&format!("{}.3", DISK_NUM), "3")
            .with_next(&format!("{}.2", DISK_NUM), &format!("{}.1", DISK_NUM), "1");

        let rows = TableCollector::walk_column(&mut agent, DISK_NUM).await;

        assert_eq!(rows.keys().collect::<Vec<_>>(), vec!["1", "2"]);

        // answering with the cursor itself also stops
        let mut agent = SimulatedAgent::new()
            .with_value(&format!("{}.1", DISK_NUM), "1")
            .with_next(&format!("{}.1", DISK_NUM), &format!("{}.1", DISK_NUM), "1");

        let rows = TableCollector::walk_column(&mut agent, DISK_NUM).await;

        assert_eq!(rows.keys().collect::<Vec<_>>(), vec!["1"]);
    }

    #[tokio::test]
    async fn accepts_root_with_leading_dot() {
        let mut agent = SimulatedAgent::new().with_value(&format!("{}.4", DISK_NUM), "4");

        let rows = TableCollector::walk_column(&mut agent, &format!(".{}", DISK_NUM)).await;

        assert_eq!(rows["4"], "4");
    }
}
