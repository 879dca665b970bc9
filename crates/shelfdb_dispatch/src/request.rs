//! The closed set of caller requests.

use serde::{Deserialize, Serialize};

/// A caller request, one variant per operation.
///
/// The wire shape is a JSON object tagged by `action`, matching the
/// message format of extension-style callers:
///
/// ```json
/// { "action": "createCollection", "name": "notes" }
/// ```
///
/// The enum is closed and the dispatcher matches exhaustively, so adding
/// an operation is a compile-time-checked change rather than a string
/// comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    /// Lists the names of all open collections.
    ListCollections,
    /// Creates a new empty collection and checkpoints it.
    CreateCollection {
        /// Collection name.
        name: String,
    },
    /// Imports a binary database image under a collection name, then
    /// checkpoints it.
    ImportFromBlob {
        /// Collection name.
        name: String,
        /// The raw image bytes.
        data: Vec<u8>,
    },
    /// Exports a collection as a binary database image.
    ExportToBlob {
        /// Collection name.
        name: String,
    },
    /// Writes the collection's durable checkpoint.
    SaveCheckpoint {
        /// Collection name.
        name: String,
    },
    /// Restores the collection from its durable checkpoint.
    RestoreCheckpoint {
        /// Collection name.
        name: String,
    },
    /// Closes the collection and removes its checkpoint.
    DeleteCollection {
        /// Collection name.
        name: String,
    },
    /// Executes one SQL statement against a collection.
    ExecuteSql {
        /// Collection name.
        name: String,
        /// The statement to run.
        sql: String,
    },
    /// Lists the schema objects of a collection.
    GetSchema {
        /// Collection name.
        name: String,
    },
    /// Lists the rows of one table.
    GetEntries {
        /// Collection name.
        name: String,
        /// Table name.
        table: String,
    },
    /// Applies schema SQL to a collection and checkpoints it.
    ApplySchema {
        /// Collection name.
        name: String,
        /// DDL to apply.
        sql: String,
    },
    /// Saves a packet (named URL group) into the reserved collection.
    SavePacket {
        /// Packet name.
        name: String,
        /// The grouped URLs.
        urls: Vec<String>,
    },
    /// Lists saved packets, newest first.
    ListPackets,
    /// Deletes one packet by rowid.
    DeletePacket {
        /// The packet's rowid.
        id: i64,
    },
    /// Saves a schema into the reserved schema library.
    SaveSchema {
        /// Schema name.
        name: String,
        /// The schema's SQL text.
        sql: String,
    },
    /// Lists saved schemas, newest first.
    ListSchemas,
    /// Deletes one saved schema by rowid.
    DeleteSchema {
        /// The schema's rowid.
        id: i64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_are_action_tagged_json() {
        let json = r#"{ "action": "createCollection", "name": "notes" }"#;
        let request: Request = serde_json::from_str(json).unwrap();
        assert_eq!(
            request,
            Request::CreateCollection {
                name: "notes".to_string()
            }
        );
    }

    #[test]
    fn blob_payload_roundtrips() {
        let request = Request::ImportFromBlob {
            name: "notes".to_string(),
            data: vec![0, 1, 255],
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains(r#""action":"importFromBlob""#));
        let back: Request = serde_json::from_str(&json).unwrap();
        assert_eq!(back, request);
    }

    #[test]
    fn unknown_action_is_rejected_at_decode() {
        let json = r#"{ "action": "dropEverything" }"#;
        assert!(serde_json::from_str::<Request>(json).is_err());
    }
}
