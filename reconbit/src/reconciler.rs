use crate::detail::{DetailRowReader, DetailRowService};
use crate::differ::diff;
use crate::error::AppError;
use crate::record::{DetailRecord, MasterId};
use crate::storage::TxView;
use crate::{debug, info};
use redb::WriteTransaction;
use std::sync::Arc;

/// Synchronizes a submitted detail list with the rows persisted for a master.
///
/// Runs after the master row is written and its id resolved, inside the same write transaction.
/// Deletes go first so natural keys held by removed rows are free for new ones, then creates, then
/// updates. Every call is sequential on the one transaction, the first failure aborts the pass.
pub struct Reconciler<D> {
    name: &'static str,
    service: Arc<dyn DetailRowService<D>>,
    reader: Arc<dyn DetailRowReader<D>>,
}

impl<D: DetailRecord> Reconciler<D> {
    pub fn new(name: &'static str, service: Arc<dyn DetailRowService<D>>, reader: Arc<dyn DetailRowReader<D>>) -> Self {
        Reconciler { name, service, reader }
    }

    /// `None` means the client did not send a list and the persisted rows are left alone.
    /// Returns the persisted list in submission order, with ids minted for added rows.
    pub fn reconcile(
        &self,
        tx: &WriteTransaction,
        master_id: MasterId,
        is_new: bool,
        submitted: Option<Vec<D>>,
    ) -> Result<Option<Vec<D>>, AppError> {
        let Some(submitted) = submitted else {
            debug!("{} of master {} not submitted, skipping reconciliation", self.name, master_id);
            return Ok(None);
        };
        let old = if is_new {
            Vec::new()
        } else {
            self.reader.list_by_master(TxView::Write(tx), master_id, &[])?
        };
        let total = submitted.len();
        let plan = diff(old, submitted)?;
        info!(
            "Reconciling {} of master {}: {} removed, {} added, {} retained",
            self.name,
            master_id,
            plan.removed.len(),
            plan.added.len(),
            plan.retained.len()
        );

        for id in plan.removed.iter().filter_map(|d| d.id()) {
            self.service.delete(tx, id)?;
        }

        let mut persisted: Vec<Option<D>> = (0..total).map(|_| None).collect();
        for (position, mut detail) in plan.added {
            detail.set_master_id(master_id);
            detail.set_id(None);
            persisted[position] = Some(self.service.create(tx, detail)?);
        }
        for (position, mut detail) in plan.retained {
            detail.set_master_id(master_id);
            persisted[position] = Some(self.service.update(tx, detail)?);
        }
        Ok(Some(persisted.into_iter().flatten().collect()))
    }
}
