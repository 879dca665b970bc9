//! Schema and query facade over named collections.
//!
//! Thin pass-throughs to the live handle, auto-opening via restore when a
//! checkpoint exists but no handle is live. Mutating calls are followed by
//! a durable checkpoint. Caller-supplied **values** are always
//! parameter-bound; only validated identifiers are ever quoted into SQL
//! text.

use crate::error::{CoreError, CoreResult};
use crate::manager::CheckpointManager;
use rusqlite::types::ValueRef;
use rusqlite::{params, Batch, OptionalExtension, Statement};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One object from a collection's schema catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaObject {
    /// Object name.
    pub name: String,
    /// Object kind: `table`, `index`, `view`, or `trigger`.
    pub kind: String,
    /// The SQL that created the object, when the engine retains it.
    pub sql: Option<String>,
}

/// A rectangular query result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    /// Column names, in select order.
    pub columns: Vec<String>,
    /// Row values; blobs are rendered as arrays of byte values.
    pub rows: Vec<Vec<serde_json::Value>>,
}

/// Outcome of a raw statement execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecOutcome {
    /// Result rows, present when the statement produced columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<ResultSet>,
    /// Rows changed by a non-query statement.
    #[serde(default)]
    pub rows_changed: usize,
}

/// Schema introspection and query execution for named collections.
///
/// All operations funnel through the [`CheckpointManager`] so that
/// mutations are followed by a durable checkpoint and unopened
/// collections are restored on first touch.
#[derive(Debug, Clone)]
pub struct QueryFacade {
    manager: Arc<CheckpointManager>,
}

impl QueryFacade {
    /// Creates a facade over the given manager.
    pub fn new(manager: Arc<CheckpointManager>) -> Self {
        Self { manager }
    }

    /// Lists the schema objects of a collection.
    ///
    /// # Errors
    ///
    /// Fails with `CollectionNotFound` when the collection neither is
    /// open nor has a checkpoint.
    pub fn schema(&self, name: &str) -> CoreResult<Vec<SchemaObject>> {
        self.manager.with_collection(name, |conn| {
            let mut stmt = conn.prepare(
                "SELECT name, type, sql FROM sqlite_master \
                 WHERE name NOT LIKE 'sqlite_%' ORDER BY name",
            )?;
            let objects = stmt
                .query_map([], |row| {
                    Ok(SchemaObject {
                        name: row.get(0)?,
                        kind: row.get(1)?,
                        sql: row.get(2)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(objects)
        })
    }

    /// Lists the rows of one table, rowid first when the table has one.
    ///
    /// The table name is validated against the catalog before being
    /// quoted into the statement; identifier positions cannot be
    /// parameter-bound.
    ///
    /// # Errors
    ///
    /// Fails with [`CoreError::TableNotFound`] for an unknown table.
    pub fn entries(&self, name: &str, table: &str) -> CoreResult<ResultSet> {
        self.manager.with_collection(name, |conn| {
            let known: Option<String> = conn
                .query_row(
                    "SELECT name FROM sqlite_master \
                     WHERE type IN ('table', 'view') AND name = ?1",
                    params![table],
                    |row| row.get(0),
                )
                .optional()?;
            if known.is_none() {
                return Err(CoreError::table_not_found(name, table));
            }

            let quoted = quote_ident(table);
            // Views and WITHOUT ROWID tables have no rowid column.
            match conn.prepare(&format!("SELECT rowid AS rowid, * FROM {quoted}")) {
                Ok(mut stmt) => collect_rows(&mut stmt),
                Err(_) => {
                    let mut stmt = conn.prepare(&format!("SELECT * FROM {quoted}"))?;
                    collect_rows(&mut stmt)
                }
            }
        })
    }

    /// Applies schema SQL (one or more DDL statements) to a collection
    /// and checkpoints the result.
    ///
    /// # Errors
    ///
    /// Fails with a query error when the SQL is rejected; no checkpoint
    /// is written in that case.
    pub fn apply_schema(&self, name: &str, sql: &str) -> CoreResult<()> {
        self.manager.with_collection(name, |conn| {
            conn.execute_batch(sql)?;
            Ok(())
        })?;
        self.manager.save_checkpoint(name)
    }

    /// Executes a single SQL statement against a collection.
    ///
    /// Exactly one statement is accepted: input with a non-empty tail
    /// after the first statement fails before anything runs, rather than
    /// silently executing only the first piece. Multi-statement DDL goes
    /// through [`Self::apply_schema`].
    ///
    /// Statements the engine reports as non-read-only are followed by a
    /// checkpoint.
    ///
    /// # Errors
    ///
    /// Fails with a query error for malformed SQL, failing SQL, or more
    /// than one statement.
    pub fn execute(&self, name: &str, sql: &str) -> CoreResult<ExecOutcome> {
        let (readonly, outcome) = self.manager.with_collection(name, |conn| {
            let mut batch = Batch::new(conn, sql);
            let Some(mut stmt) = batch.next()? else {
                return Ok((true, ExecOutcome::default()));
            };
            if batch.next()?.is_some() {
                return Err(CoreError::Engine(rusqlite::Error::MultipleStatement));
            }

            let readonly = stmt.readonly();
            let outcome = if stmt.column_count() > 0 {
                ExecOutcome {
                    rows: Some(collect_rows(&mut stmt)?),
                    rows_changed: 0,
                }
            } else {
                let rows_changed = stmt.execute([])?;
                ExecOutcome {
                    rows: None,
                    rows_changed,
                }
            };
            Ok((readonly, outcome))
        })?;

        if !readonly {
            self.manager.save_checkpoint(name)?;
        }
        Ok(outcome)
    }
}

/// Drains a prepared statement into a [`ResultSet`].
pub(crate) fn collect_rows(stmt: &mut Statement<'_>) -> CoreResult<ResultSet> {
    let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
    let mut rows = stmt.query([])?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let mut values = Vec::with_capacity(columns.len());
        for i in 0..columns.len() {
            values.push(json_value(row.get_ref(i)?));
        }
        out.push(values);
    }
    Ok(ResultSet { columns, rows: out })
}

fn json_value(value: ValueRef<'_>) -> serde_json::Value {
    match value {
        ValueRef::Null => serde_json::Value::Null,
        ValueRef::Integer(i) => serde_json::Value::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Text(t) => serde_json::Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => serde_json::Value::Array(
            b.iter().map(|&byte| serde_json::Value::from(byte)).collect(),
        ),
    }
}

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use shelfdb_store::MemoryStore;

    fn facade() -> QueryFacade {
        let manager = Arc::new(CheckpointManager::new(
            Arc::new(MemoryStore::new()),
            Config::new().bootstrap_reserved(false),
        ));
        manager.initialize().unwrap();
        manager.create_collection("notes").unwrap();
        QueryFacade::new(manager)
    }

    #[test]
    fn schema_lists_created_objects() {
        let facade = facade();
        facade
            .apply_schema(
                "notes",
                "CREATE TABLE notes (title TEXT); CREATE INDEX idx_title ON notes (title);",
            )
            .unwrap();

        let schema = facade.schema("notes").unwrap();
        let kinds: Vec<(&str, &str)> = schema
            .iter()
            .map(|o| (o.name.as_str(), o.kind.as_str()))
            .collect();
        assert_eq!(kinds, vec![("idx_title", "index"), ("notes", "table")]);
        assert!(schema[1].sql.as_deref().unwrap().contains("CREATE TABLE"));
    }

    #[test]
    fn entries_returns_rowid_and_values() {
        let facade = facade();
        facade
            .apply_schema("notes", "CREATE TABLE notes (title TEXT, stars INTEGER)")
            .unwrap();
        facade
            .execute(
                "notes",
                "INSERT INTO notes (title, stars) VALUES ('alpha', 3)",
            )
            .unwrap();

        let entries = facade.entries("notes", "notes").unwrap();
        assert_eq!(entries.columns, vec!["rowid", "title", "stars"]);
        assert_eq!(entries.rows.len(), 1);
        assert_eq!(entries.rows[0][1], serde_json::json!("alpha"));
        assert_eq!(entries.rows[0][2], serde_json::json!(3));
    }

    #[test]
    fn entries_unknown_table_fails() {
        let facade = facade();
        let result = facade.entries("notes", "nope");
        assert!(matches!(result, Err(CoreError::TableNotFound { .. })));
    }

    #[test]
    fn entries_handles_quoted_table_names() {
        let facade = facade();
        facade
            .apply_schema("notes", "CREATE TABLE \"odd \"\"name\"\"\" (v TEXT)")
            .unwrap();
        let entries = facade.entries("notes", "odd \"name\"").unwrap();
        assert!(entries.rows.is_empty());
    }

    #[test]
    fn execute_select_returns_rows_without_checkpoint() {
        let facade = facade();
        facade
            .apply_schema("notes", "CREATE TABLE t (v TEXT)")
            .unwrap();

        let outcome = facade.execute("notes", "SELECT 1 AS one").unwrap();
        let rows = outcome.rows.unwrap();
        assert_eq!(rows.columns, vec!["one"]);
        assert_eq!(rows.rows, vec![vec![serde_json::json!(1)]]);
    }

    #[test]
    fn execute_mutation_is_checkpointed() {
        let facade = facade();
        facade
            .apply_schema("notes", "CREATE TABLE t (v TEXT)")
            .unwrap();
        let outcome = facade
            .execute("notes", "INSERT INTO t VALUES ('a'), ('b')")
            .unwrap();
        assert_eq!(outcome.rows_changed, 2);

        // Restore must observe the insert: the mutation was checkpointed.
        facade.manager.restore_checkpoint("notes").unwrap();
        let rows = facade
            .execute("notes", "SELECT COUNT(*) FROM t")
            .unwrap()
            .rows
            .unwrap();
        assert_eq!(rows.rows[0][0], serde_json::json!(2));
    }

    #[test]
    fn execute_rejects_a_second_statement_before_running_the_first() {
        let facade = facade();
        facade
            .apply_schema("notes", "CREATE TABLE t (v TEXT)")
            .unwrap();

        let result = facade.execute(
            "notes",
            "INSERT INTO t VALUES ('a'); INSERT INTO t VALUES ('b')",
        );
        assert!(matches!(result, Err(CoreError::Engine(_))));

        // Neither insert ran.
        let rows = facade
            .execute("notes", "SELECT COUNT(*) FROM t")
            .unwrap()
            .rows
            .unwrap();
        assert_eq!(rows.rows[0][0], serde_json::json!(0));
    }

    #[test]
    fn execute_rejects_transaction_scripts_whole() {
        let facade = facade();
        facade
            .apply_schema("notes", "CREATE TABLE t (v TEXT)")
            .unwrap();

        let result = facade.execute(
            "notes",
            "BEGIN; INSERT INTO t VALUES ('a'); COMMIT",
        );
        assert!(matches!(result, Err(CoreError::Engine(_))));

        // The handle is not left inside an open transaction: a follow-up
        // mutation succeeds and checkpoints normally.
        facade
            .execute("notes", "INSERT INTO t VALUES ('b')")
            .unwrap();
        let rows = facade
            .execute("notes", "SELECT COUNT(*) FROM t")
            .unwrap()
            .rows
            .unwrap();
        assert_eq!(rows.rows[0][0], serde_json::json!(1));
    }

    #[test]
    fn execute_tolerates_trailing_semicolon() {
        let facade = facade();
        facade
            .apply_schema("notes", "CREATE TABLE t (v TEXT)")
            .unwrap();
        let outcome = facade
            .execute("notes", "INSERT INTO t VALUES ('a');")
            .unwrap();
        assert_eq!(outcome.rows_changed, 1);
    }

    #[test]
    fn execute_malformed_sql_is_a_query_error() {
        let facade = facade();
        let result = facade.execute("notes", "SELEKT nonsense");
        assert!(matches!(result, Err(CoreError::Engine(_))));
    }

    #[test]
    fn facade_touch_of_absent_collection_fails() {
        let facade = facade();
        let result = facade.schema("missing");
        assert!(matches!(result, Err(CoreError::CollectionNotFound { .. })));
    }

    #[test]
    fn blob_values_render_as_byte_arrays() {
        let facade = facade();
        facade
            .apply_schema("notes", "CREATE TABLE b (data BLOB)")
            .unwrap();
        facade
            .execute("notes", "INSERT INTO b VALUES (x'0102ff')")
            .unwrap();

        let entries = facade.entries("notes", "b").unwrap();
        assert_eq!(entries.rows[0][1], serde_json::json!([1, 2, 255]));
    }
}
