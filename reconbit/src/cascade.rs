use crate::detail::{DetailRowReader, DetailRowService};
use crate::error::AppError;
use crate::info;
use crate::record::{DetailRecord, MasterId};
use crate::storage::TxView;
use redb::WriteTransaction;
use std::sync::Arc;

/// Removes a master's details row by row through the service, inside the master's delete transaction.
pub struct CascadeDelete<D> {
    name: &'static str,
    service: Arc<dyn DetailRowService<D>>,
    reader: Arc<dyn DetailRowReader<D>>,
}

impl<D: DetailRecord> CascadeDelete<D> {
    pub fn new(name: &'static str, service: Arc<dyn DetailRowService<D>>, reader: Arc<dyn DetailRowReader<D>>) -> Self {
        CascadeDelete { name, service, reader }
    }

    /// Returns how many detail rows were deleted.
    pub fn delete_details(&self, tx: &WriteTransaction, master_id: MasterId) -> Result<usize, AppError> {
        let ids = self.reader.ids_by_master(TxView::Write(tx), master_id)?;
        for id in &ids {
            self.service.delete(tx, *id)?;
        }
        info!("Deleted {} {} of master {}", ids.len(), self.name, master_id);
        Ok(ids.len())
    }
}
