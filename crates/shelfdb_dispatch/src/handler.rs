//! The request dispatcher.

use crate::reply::{DispatchResult, Reply};
use crate::request::Request;
use crate::reserved;
use shelfdb_core::{CheckpointManager, QueryFacade};
use std::sync::Arc;
use tracing::debug;

/// Routes caller requests to manager and facade operations.
///
/// One dispatcher is constructed per process, after the manager's
/// [`CheckpointManager::initialize`] has been started; requests arriving
/// before restoration completes fail with a `notReady` tagged failure
/// rather than racing the restore pass.
///
/// Every error is returned as a [`crate::Failure`]; nothing panics across
/// the boundary.
pub struct Dispatcher {
    manager: Arc<CheckpointManager>,
    facade: QueryFacade,
}

impl Dispatcher {
    /// Creates a dispatcher over the given manager.
    pub fn new(manager: Arc<CheckpointManager>) -> Self {
        let facade = QueryFacade::new(Arc::clone(&manager));
        Self { manager, facade }
    }

    /// Handles one request to completion.
    pub fn handle(&self, request: Request) -> DispatchResult {
        debug!(?request, "dispatching request");
        match request {
            Request::ListCollections => Ok(Reply::Collections {
                names: self.manager.list_collections()?,
            }),
            Request::CreateCollection { name } => {
                self.manager.create_collection(&name)?;
                Ok(Reply::Done)
            }
            Request::ImportFromBlob { name, data } => {
                self.manager.import_from_blob(&name, &data)?;
                self.manager.save_checkpoint(&name)?;
                Ok(Reply::Done)
            }
            Request::ExportToBlob { name } => Ok(Reply::Blob {
                data: self.manager.export_to_blob(&name)?,
            }),
            Request::SaveCheckpoint { name } => {
                self.manager.save_checkpoint(&name)?;
                Ok(Reply::Done)
            }
            Request::RestoreCheckpoint { name } => {
                self.manager.restore_checkpoint(&name)?;
                Ok(Reply::Done)
            }
            Request::DeleteCollection { name } => {
                self.manager.delete_collection(&name)?;
                Ok(Reply::Done)
            }
            Request::ExecuteSql { name, sql } => Ok(Reply::Execution {
                outcome: self.facade.execute(&name, &sql)?,
            }),
            Request::GetSchema { name } => Ok(Reply::Schema {
                objects: self.facade.schema(&name)?,
            }),
            Request::GetEntries { name, table } => Ok(Reply::Entries {
                entries: self.facade.entries(&name, &table)?,
            }),
            Request::ApplySchema { name, sql } => {
                self.facade.apply_schema(&name, &sql)?;
                Ok(Reply::Done)
            }
            Request::SavePacket { name, urls } => {
                reserved::save_packet(&self.manager, &name, &urls)?;
                Ok(Reply::Done)
            }
            Request::ListPackets => Ok(Reply::Packets {
                packets: reserved::list_packets(&self.manager)?,
            }),
            Request::DeletePacket { id } => {
                reserved::delete_packet(&self.manager, id)?;
                Ok(Reply::Done)
            }
            Request::SaveSchema { name, sql } => {
                reserved::save_schema(&self.manager, &name, &sql)?;
                Ok(Reply::Done)
            }
            Request::ListSchemas => Ok(Reply::Schemas {
                schemas: reserved::list_schemas(&self.manager)?,
            }),
            Request::DeleteSchema { id } => {
                reserved::delete_schema(&self.manager, id)?;
                Ok(Reply::Done)
            }
        }
    }
}
