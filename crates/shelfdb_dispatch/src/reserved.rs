//! Operations on the reserved `packets` and `schemas` collections.
//!
//! These run as parameter-bound statements against the reserved
//! collections; every mutation is followed by a checkpoint of the
//! affected collection.

use crate::reply::{Packet, SavedSchema};
use rusqlite::params;
use shelfdb_core::{
    CheckpointManager, CoreError, CoreResult, PACKETS_COLLECTION, SCHEMAS_COLLECTION,
};

/// Saves a packet (named URL group) and checkpoints the collection.
pub fn save_packet(manager: &CheckpointManager, name: &str, urls: &[String]) -> CoreResult<()> {
    let urls_json = serde_json::Value::from(urls.to_vec()).to_string();
    manager.with_collection(PACKETS_COLLECTION, |conn| {
        conn.execute(
            "INSERT INTO packets (name, urls) VALUES (?1, ?2)",
            params![name, urls_json],
        )?;
        Ok(())
    })?;
    manager.save_checkpoint(PACKETS_COLLECTION)
}

/// Lists saved packets, newest first.
pub fn list_packets(manager: &CheckpointManager) -> CoreResult<Vec<Packet>> {
    manager.with_collection(PACKETS_COLLECTION, |conn| {
        let mut stmt = conn.prepare(
            "SELECT rowid, name, urls FROM packets ORDER BY created DESC, rowid DESC",
        )?;
        let packets = stmt
            .query_map([], |row| {
                let urls_json: String = row.get(2)?;
                Ok(Packet {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    // A row with unparseable urls still lists, just empty.
                    urls: serde_json::from_str(&urls_json).unwrap_or_default(),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(packets)
    })
}

/// Deletes one packet by rowid and checkpoints the collection.
pub fn delete_packet(manager: &CheckpointManager, id: i64) -> CoreResult<()> {
    let removed = manager.with_collection(PACKETS_COLLECTION, |conn| {
        Ok(conn.execute("DELETE FROM packets WHERE rowid = ?1", params![id])?)
    })?;
    if removed == 0 {
        return Err(CoreError::row_not_found(PACKETS_COLLECTION, id));
    }
    manager.save_checkpoint(PACKETS_COLLECTION)
}

/// Saves a schema into the library and checkpoints the collection.
pub fn save_schema(manager: &CheckpointManager, name: &str, sql: &str) -> CoreResult<()> {
    manager.with_collection(SCHEMAS_COLLECTION, |conn| {
        conn.execute(
            "INSERT INTO schemas (name, sql) VALUES (?1, ?2)",
            params![name, sql],
        )?;
        Ok(())
    })?;
    manager.save_checkpoint(SCHEMAS_COLLECTION)
}

/// Lists saved schemas, newest first.
pub fn list_schemas(manager: &CheckpointManager) -> CoreResult<Vec<SavedSchema>> {
    manager.with_collection(SCHEMAS_COLLECTION, |conn| {
        let mut stmt = conn.prepare(
            "SELECT rowid, name, sql FROM schemas ORDER BY created DESC, rowid DESC",
        )?;
        let schemas = stmt
            .query_map([], |row| {
                Ok(SavedSchema {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    sql: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(schemas)
    })
}

/// Deletes one saved schema by rowid and checkpoints the collection.
pub fn delete_schema(manager: &CheckpointManager, id: i64) -> CoreResult<()> {
    let removed = manager.with_collection(SCHEMAS_COLLECTION, |conn| {
        Ok(conn.execute("DELETE FROM schemas WHERE rowid = ?1", params![id])?)
    })?;
    if removed == 0 {
        return Err(CoreError::row_not_found(SCHEMAS_COLLECTION, id));
    }
    manager.save_checkpoint(SCHEMAS_COLLECTION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelfdb_core::Config;
    use shelfdb_store::MemoryStore;
    use std::sync::Arc;

    fn manager() -> CheckpointManager {
        let manager = CheckpointManager::new(Arc::new(MemoryStore::new()), Config::default());
        manager.initialize().unwrap();
        manager
    }

    #[test]
    fn save_and_list_packets() {
        let manager = manager();
        save_packet(
            &manager,
            "Research",
            &["https://a".to_string(), "https://b".to_string()],
        )
        .unwrap();

        let packets = list_packets(&manager).unwrap();
        assert_eq!(packets.len(), 1);
        assert_eq!(packets[0].name, "Research");
        assert_eq!(packets[0].urls, vec!["https://a", "https://b"]);
    }

    #[test]
    fn packet_names_with_quotes_are_bound_not_interpolated() {
        let manager = manager();
        let tricky = "Rob'); DROP TABLE packets;--";
        save_packet(&manager, tricky, &["https://x".to_string()]).unwrap();

        let packets = list_packets(&manager).unwrap();
        assert_eq!(packets.len(), 1);
        assert_eq!(packets[0].name, tricky);
    }

    #[test]
    fn delete_packet_unknown_rowid_is_not_found() {
        let manager = manager();
        let result = delete_packet(&manager, 999);
        assert!(matches!(result, Err(CoreError::RowNotFound { .. })));
    }

    #[test]
    fn delete_packet_removes_and_persists() {
        let manager = manager();
        save_packet(&manager, "a", &["https://a".to_string()]).unwrap();
        let id = list_packets(&manager).unwrap()[0].id;
        delete_packet(&manager, id).unwrap();
        assert!(list_packets(&manager).unwrap().is_empty());

        // The delete was checkpointed: restore must not resurrect the row.
        manager.restore_checkpoint(PACKETS_COLLECTION).unwrap();
        assert!(list_packets(&manager).unwrap().is_empty());
    }

    #[test]
    fn schema_library_roundtrip() {
        let manager = manager();
        save_schema(&manager, "expenses", "CREATE TABLE expenses (amount REAL)").unwrap();
        save_schema(&manager, "notes", "CREATE TABLE notes (title TEXT)").unwrap();

        let schemas = list_schemas(&manager).unwrap();
        assert_eq!(schemas.len(), 2);
        // Newest first.
        assert_eq!(schemas[0].name, "notes");

        delete_schema(&manager, schemas[0].id).unwrap();
        assert_eq!(list_schemas(&manager).unwrap().len(), 1);
    }
}
