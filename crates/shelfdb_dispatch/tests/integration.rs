//! End-to-end dispatch tests: requests in, replies out, with durability
//! checked across simulated process restarts over a shared store.

use shelfdb_core::{CheckpointManager, Config};
use shelfdb_dispatch::{Dispatcher, FailureKind, Reply, Request};
use shelfdb_store::{DurableStore, MemoryStore};
use std::sync::Arc;

fn dispatcher_over(store: Arc<MemoryStore>) -> Dispatcher {
    let manager = Arc::new(CheckpointManager::new(store, Config::default()));
    manager.initialize().unwrap();
    Dispatcher::new(manager)
}

#[test]
fn create_list_delete_roundtrip() {
    let store = Arc::new(MemoryStore::new());
    let dispatcher = dispatcher_over(Arc::clone(&store));

    dispatcher
        .handle(Request::CreateCollection {
            name: "notes".to_string(),
        })
        .unwrap();

    let reply = dispatcher.handle(Request::ListCollections).unwrap();
    let Reply::Collections { names } = reply else {
        panic!("expected collections reply");
    };
    assert!(names.contains(&"notes".to_string()));

    dispatcher
        .handle(Request::DeleteCollection {
            name: "notes".to_string(),
        })
        .unwrap();

    let reply = dispatcher.handle(Request::ListCollections).unwrap();
    let Reply::Collections { names } = reply else {
        panic!("expected collections reply");
    };
    assert!(!names.contains(&"notes".to_string()));
}

#[test]
fn duplicate_create_fails_already_exists() {
    let dispatcher = dispatcher_over(Arc::new(MemoryStore::new()));
    dispatcher
        .handle(Request::CreateCollection {
            name: "notes".to_string(),
        })
        .unwrap();

    let failure = dispatcher
        .handle(Request::CreateCollection {
            name: "notes".to_string(),
        })
        .unwrap_err();
    assert_eq!(failure.kind, FailureKind::AlreadyExists);
}

#[test]
fn requests_before_initialize_fail_not_ready() {
    let manager = Arc::new(CheckpointManager::new(
        Arc::new(MemoryStore::new()),
        Config::default(),
    ));
    let dispatcher = Dispatcher::new(manager);

    let failure = dispatcher.handle(Request::ListCollections).unwrap_err();
    assert_eq!(failure.kind, FailureKind::NotReady);
}

#[test]
fn execute_sql_persists_writes_across_restart() {
    let store = Arc::new(MemoryStore::new());
    {
        let dispatcher = dispatcher_over(Arc::clone(&store));
        dispatcher
            .handle(Request::CreateCollection {
                name: "notes".to_string(),
            })
            .unwrap();
        dispatcher
            .handle(Request::ApplySchema {
                name: "notes".to_string(),
                sql: "CREATE TABLE notes (title TEXT NOT NULL)".to_string(),
            })
            .unwrap();
        dispatcher
            .handle(Request::ExecuteSql {
                name: "notes".to_string(),
                sql: "INSERT INTO notes (title) VALUES ('first')".to_string(),
            })
            .unwrap();
    }

    let dispatcher = dispatcher_over(store);
    let reply = dispatcher
        .handle(Request::GetEntries {
            name: "notes".to_string(),
            table: "notes".to_string(),
        })
        .unwrap();
    let Reply::Entries { entries } = reply else {
        panic!("expected entries reply");
    };
    assert_eq!(entries.rows.len(), 1);
}

#[test]
fn read_only_sql_returns_rows_without_checkpoint() {
    let store = Arc::new(MemoryStore::new());
    let dispatcher = dispatcher_over(Arc::clone(&store));
    dispatcher
        .handle(Request::CreateCollection {
            name: "notes".to_string(),
        })
        .unwrap();
    dispatcher
        .handle(Request::ApplySchema {
            name: "notes".to_string(),
            sql: "CREATE TABLE notes (title TEXT)".to_string(),
        })
        .unwrap();

    let before = store.get("checkpoint_notes").unwrap().unwrap();
    let reply = dispatcher
        .handle(Request::ExecuteSql {
            name: "notes".to_string(),
            sql: "SELECT * FROM notes".to_string(),
        })
        .unwrap();
    let Reply::Execution { outcome } = reply else {
        panic!("expected execution reply");
    };
    assert!(outcome.rows.is_some());
    // A read did not rewrite the checkpoint.
    assert_eq!(store.get("checkpoint_notes").unwrap().unwrap(), before);
}

#[test]
fn malformed_sql_is_a_query_failure() {
    let dispatcher = dispatcher_over(Arc::new(MemoryStore::new()));
    dispatcher
        .handle(Request::CreateCollection {
            name: "notes".to_string(),
        })
        .unwrap();

    let failure = dispatcher
        .handle(Request::ExecuteSql {
            name: "notes".to_string(),
            sql: "SELEKT broken".to_string(),
        })
        .unwrap_err();
    assert_eq!(failure.kind, FailureKind::Query);
}

#[test]
fn export_import_moves_a_collection_between_names() {
    let dispatcher = dispatcher_over(Arc::new(MemoryStore::new()));
    dispatcher
        .handle(Request::CreateCollection {
            name: "source".to_string(),
        })
        .unwrap();
    dispatcher
        .handle(Request::ApplySchema {
            name: "source".to_string(),
            sql: "CREATE TABLE t (v INTEGER)".to_string(),
        })
        .unwrap();
    dispatcher
        .handle(Request::ExecuteSql {
            name: "source".to_string(),
            sql: "INSERT INTO t (v) VALUES (42)".to_string(),
        })
        .unwrap();

    let reply = dispatcher
        .handle(Request::ExportToBlob {
            name: "source".to_string(),
        })
        .unwrap();
    let Reply::Blob { data } = reply else {
        panic!("expected blob reply");
    };

    dispatcher
        .handle(Request::ImportFromBlob {
            name: "copy".to_string(),
            data,
        })
        .unwrap();

    let reply = dispatcher
        .handle(Request::GetEntries {
            name: "copy".to_string(),
            table: "t".to_string(),
        })
        .unwrap();
    let Reply::Entries { entries } = reply else {
        panic!("expected entries reply");
    };
    assert_eq!(entries.rows.len(), 1);
}

#[test]
fn import_from_blob_is_immediately_durable() {
    let store = Arc::new(MemoryStore::new());
    {
        let dispatcher = dispatcher_over(Arc::clone(&store));
        let empty = {
            let reply = dispatcher
                .handle(Request::CreateCollection {
                    name: "seed".to_string(),
                })
                .and_then(|_| {
                    dispatcher.handle(Request::ExportToBlob {
                        name: "seed".to_string(),
                    })
                })
                .unwrap();
            let Reply::Blob { data } = reply else {
                panic!("expected blob reply");
            };
            data
        };
        dispatcher
            .handle(Request::ImportFromBlob {
                name: "imported".to_string(),
                data: empty,
            })
            .unwrap();
    }

    assert!(store.get("checkpoint_imported").unwrap().is_some());
}

#[test]
fn packets_scenario_survives_restart() {
    let store = Arc::new(MemoryStore::new());
    {
        let dispatcher = dispatcher_over(Arc::clone(&store));
        dispatcher
            .handle(Request::SavePacket {
                name: "Research".to_string(),
                urls: vec![
                    "https://example.com/a".to_string(),
                    "https://example.com/b".to_string(),
                ],
            })
            .unwrap();
    }

    let dispatcher = dispatcher_over(store);
    let reply = dispatcher.handle(Request::ListPackets).unwrap();
    let Reply::Packets { packets } = reply else {
        panic!("expected packets reply");
    };
    assert_eq!(packets.len(), 1);
    assert_eq!(packets[0].name, "Research");
    assert_eq!(packets[0].urls.len(), 2);

    dispatcher
        .handle(Request::DeletePacket { id: packets[0].id })
        .unwrap();
    let reply = dispatcher.handle(Request::ListPackets).unwrap();
    let Reply::Packets { packets } = reply else {
        panic!("expected packets reply");
    };
    assert!(packets.is_empty());
}

#[test]
fn schema_library_roundtrip_over_the_wire() {
    let dispatcher = dispatcher_over(Arc::new(MemoryStore::new()));
    let request: Request = serde_json::from_str(
        r#"{ "action": "saveSchema", "name": "expenses",
             "sql": "CREATE TABLE expenses (amount REAL)" }"#,
    )
    .unwrap();
    dispatcher.handle(request).unwrap();

    let reply = dispatcher.handle(Request::ListSchemas).unwrap();
    let json = serde_json::to_value(&reply).unwrap();
    assert_eq!(json["result"], "schemas");
    assert_eq!(json["schemas"][0]["name"], "expenses");
}

#[test]
fn get_entries_unknown_table_is_not_found() {
    let dispatcher = dispatcher_over(Arc::new(MemoryStore::new()));
    dispatcher
        .handle(Request::CreateCollection {
            name: "notes".to_string(),
        })
        .unwrap();

    let failure = dispatcher
        .handle(Request::GetEntries {
            name: "notes".to_string(),
            table: "missing".to_string(),
        })
        .unwrap_err();
    assert_eq!(failure.kind, FailureKind::NotFound);
}

#[test]
fn get_schema_lists_reserved_baseline() {
    let dispatcher = dispatcher_over(Arc::new(MemoryStore::new()));
    let reply = dispatcher
        .handle(Request::GetSchema {
            name: "packets".to_string(),
        })
        .unwrap();
    let Reply::Schema { objects } = reply else {
        panic!("expected schema reply");
    };
    assert!(objects.iter().any(|o| o.name == "packets"));
}
