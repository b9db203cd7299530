//! Writes the spatial index tables inside an open transaction.
#![forbid(unsafe_code)]

use geo::{Coord, Rect};
use kerbside_core::{Coordinate, NodeId, StreetAttributes, store::schema};
use rusqlite::{Error as SqliteError, ErrorCode, Statement, Transaction, params};

use crate::ImportError;

/// Whether a row was written or skipped as a repeated id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Inserted {
    Fresh,
    Duplicate,
}

/// Prepared insert statements for one import transaction.
pub(crate) struct IndexWriter<'tx> {
    insert_node: Statement<'tx>,
    insert_way: Statement<'tx>,
    insert_member: Statement<'tx>,
}

impl<'tx> IndexWriter<'tx> {
    pub(crate) fn prepare(transaction: &'tx Transaction<'_>) -> Result<Self, ImportError> {
        let prepare = |table: &'static str, sql: &str| {
            transaction
                .prepare(sql)
                .map_err(|source| ImportError::Prepare { table, source })
        };
        Ok(Self {
            insert_node: prepare("nodes", schema::INSERT_NODE)?,
            insert_way: prepare("way_info", schema::INSERT_WAY_INFO)?,
            insert_member: prepare("way_nodes", schema::INSERT_WAY_NODE)?,
        })
    }

    pub(crate) fn node(
        &mut self,
        id: NodeId,
        coordinate: Coordinate,
    ) -> Result<Inserted, ImportError> {
        classify(
            self.insert_node
                .execute(params![id, coordinate.lon(), coordinate.lat()]),
        )
        .map_err(|source| ImportError::Insert {
            table: "nodes",
            id,
            source,
        })
    }

    /// Write the street attributes and, unless the way id repeats, its
    /// ordered node list starting at 0.
    pub(crate) fn way(
        &mut self,
        attributes: &StreetAttributes,
        refs: &[NodeId],
    ) -> Result<Inserted, ImportError> {
        let way_id = attributes.way_id;
        let inserted = classify(self.insert_way.execute(params![
            way_id,
            attributes.name,
            attributes.lanes,
            attributes.declared_speed_kmh,
            attributes.road_class.as_str(),
            attributes.oneway,
        ]))
        .map_err(|source| ImportError::Insert {
            table: "way_info",
            id: way_id,
            source,
        })?;
        if inserted == Inserted::Duplicate {
            return Ok(inserted);
        }

        for (order, node) in (0_u32..).zip(refs) {
            self.insert_member
                .execute(params![way_id, order, node])
                .map_err(|source| ImportError::Insert {
                    table: "way_nodes",
                    id: way_id,
                    source,
                })?;
        }
        Ok(Inserted::Fresh)
    }
}

fn classify(result: rusqlite::Result<usize>) -> rusqlite::Result<Inserted> {
    match result {
        Ok(_) => Ok(Inserted::Fresh),
        Err(SqliteError::SqliteFailure(failure, _))
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            Ok(Inserted::Duplicate)
        }
        Err(other) => Err(other),
    }
}

pub(crate) fn create_schema(transaction: &Transaction<'_>) -> Result<(), ImportError> {
    for statement in schema::CREATE_ALL {
        transaction
            .execute(statement, [])
            .map_err(|source| ImportError::CreateSchema { source })?;
    }
    Ok(())
}

/// Delete nodes outside every kept way, returning how many went.
pub(crate) fn prune_orphans(transaction: &Transaction<'_>) -> Result<u64, ImportError> {
    let removed = transaction
        .execute(schema::PRUNE_ORPHAN_NODES, [])
        .map_err(|source| ImportError::Prune { source })?;
    Ok(u64::try_from(removed).unwrap_or(u64::MAX))
}

/// Count the surviving nodes and the box they span (`x = lon`, `y = lat`).
pub(crate) fn summarise_nodes(
    transaction: &Transaction<'_>,
) -> Result<(u64, Option<Rect<f64>>), ImportError> {
    let (count, min_lon, min_lat, max_lon, max_lat) = transaction
        .query_row(schema::SUMMARISE_NODES, [], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, Option<f64>>(1)?,
                row.get::<_, Option<f64>>(2)?,
                row.get::<_, Option<f64>>(3)?,
                row.get::<_, Option<f64>>(4)?,
            ))
        })
        .map_err(|source| ImportError::Prune { source })?;

    let bounds = match (min_lon, min_lat, max_lon, max_lat) {
        (Some(min_x), Some(min_y), Some(max_x), Some(max_y)) => Some(Rect::new(
            Coord { x: min_x, y: min_y },
            Coord { x: max_x, y: max_y },
        )),
        _ => None,
    };
    Ok((u64::try_from(count).unwrap_or(0), bounds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kerbside_core::RoadClass;
    use rstest::{fixture, rstest};
    use rusqlite::Connection;

    #[fixture]
    fn connection() -> Connection {
        Connection::open_in_memory().expect("open in-memory database")
    }

    fn coordinate(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).expect("valid test coordinate")
    }

    fn street(way_id: i64) -> StreetAttributes {
        StreetAttributes {
            way_id,
            name: Some("Main St".into()),
            lanes: 2,
            declared_speed_kmh: 0,
            road_class: RoadClass::Residential,
            oneway: false,
        }
    }

    fn count(transaction: &Transaction<'_>, table: &str) -> i64 {
        transaction
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
            .expect("count rows")
    }

    #[rstest]
    fn repeated_ids_are_reported_as_duplicates(mut connection: Connection) {
        let transaction = connection.transaction().expect("begin transaction");
        create_schema(&transaction).expect("create schema");
        {
            let mut writer = IndexWriter::prepare(&transaction).expect("prepare writer");
            assert_eq!(writer.node(1, coordinate(43.0, -79.0)).expect("insert"), Inserted::Fresh);
            assert_eq!(
                writer.node(1, coordinate(44.0, -78.0)).expect("insert"),
                Inserted::Duplicate
            );
            assert_eq!(writer.way(&street(100), &[1, 2]).expect("insert"), Inserted::Fresh);
            assert_eq!(
                writer.way(&street(100), &[3, 4, 5]).expect("insert"),
                Inserted::Duplicate
            );
        }
        assert_eq!(count(&transaction, "nodes"), 1);
        assert_eq!(count(&transaction, "way_info"), 1);
        assert_eq!(count(&transaction, "way_nodes"), 2);
    }

    #[rstest]
    fn pruning_keeps_only_referenced_nodes(mut connection: Connection) {
        let transaction = connection.transaction().expect("begin transaction");
        create_schema(&transaction).expect("create schema");
        {
            let mut writer = IndexWriter::prepare(&transaction).expect("prepare writer");
            writer.node(1, coordinate(43.0, -79.0)).expect("insert");
            writer.node(2, coordinate(43.5, -78.5)).expect("insert");
            writer.node(3, coordinate(45.0, -70.0)).expect("insert");
            writer.way(&street(100), &[1, 2]).expect("insert");
        }
        assert_eq!(prune_orphans(&transaction).expect("prune"), 1);

        let (retained, bounds) = summarise_nodes(&transaction).expect("summarise");
        assert_eq!(retained, 2);
        let bounds = bounds.expect("nodes survive pruning");
        assert_eq!(bounds.min(), Coord { x: -79.0, y: 43.0 });
        assert_eq!(bounds.max(), Coord { x: -78.5, y: 43.5 });
    }

    #[rstest]
    fn empty_index_has_no_bounds(mut connection: Connection) {
        let transaction = connection.transaction().expect("begin transaction");
        create_schema(&transaction).expect("create schema");
        assert_eq!(summarise_nodes(&transaction).expect("summarise"), (0, None));
    }
}
