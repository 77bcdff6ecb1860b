use crate::cascade::CascadeDelete;
use crate::detail::{DetailRowReader, DetailRowService};
use crate::error::AppError;
use crate::joiner::Joiner;
use crate::reconciler::Reconciler;
use crate::record::{DetailRecord, MasterId, MasterRecord, RecordId};
use crate::storage::{DetailTable, EntityTable, Storage, TxView};
use crate::{debug, error, warn};
use redb::WriteTransaction;
use std::sync::Arc;

/// Extension points of the master pipeline. Every stage defaults to doing nothing.
pub trait MasterBehavior<M: MasterRecord>: Send + Sync {
    fn name(&self) -> &'static str;

    /// Master row written and its id resolved, transaction still open.
    fn after_master_persist(&self, _tx: &WriteTransaction, _master: &mut M, _is_new: bool) -> Result<(), AppError> {
        Ok(())
    }

    /// Master row still present, about to be removed in the same transaction.
    fn before_master_delete(&self, _tx: &WriteTransaction, _master_id: MasterId) -> Result<(), AppError> {
        Ok(())
    }

    /// Master fields loaded for a caller.
    fn after_master_retrieve(&self, _tx: TxView<'_>, _master: &mut M) -> Result<(), AppError> {
        Ok(())
    }
}

/// A master's detail list wired into the three stages: reconcile on save, cascade on delete, join on read.
pub struct DetailRelation<M, D> {
    name: &'static str,
    details: fn(&mut M) -> &mut Option<Vec<D>>,
    reconciler: Reconciler<D>,
    cascade: CascadeDelete<D>,
    joiner: Joiner<D>,
}

impl<M: MasterRecord, D: DetailRecord> DetailRelation<M, D> {
    /// Relation backed by a detail table, joining every expression field its descriptor declares.
    pub fn from_table(table: Arc<DetailTable<D>>, details: fn(&mut M) -> &mut Option<Vec<D>>) -> Self {
        let name = table.descriptor().name;
        let extra_fields = table.descriptor().join_names();
        Self::new(name, table.clone(), table, extra_fields, details)
    }

    pub fn new(
        name: &'static str,
        service: Arc<dyn DetailRowService<D>>,
        reader: Arc<dyn DetailRowReader<D>>,
        extra_fields: Vec<&'static str>,
        details: fn(&mut M) -> &mut Option<Vec<D>>,
    ) -> Self {
        DetailRelation {
            name,
            details,
            reconciler: Reconciler::new(name, service.clone(), reader.clone()),
            cascade: CascadeDelete::new(name, service, reader.clone()),
            joiner: Joiner::new(reader, extra_fields),
        }
    }
}

impl<M: MasterRecord, D: DetailRecord> MasterBehavior<M> for DetailRelation<M, D> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn after_master_persist(&self, tx: &WriteTransaction, master: &mut M, is_new: bool) -> Result<(), AppError> {
        let master_id = master
            .id()
            .ok_or_else(|| AppError::Custom(format!("{} reconciled before master id was resolved", self.name)))?;
        let submitted = (self.details)(master).take();
        let persisted = self.reconciler.reconcile(tx, master_id, is_new, submitted)?;
        *(self.details)(master) = persisted;
        Ok(())
    }

    fn before_master_delete(&self, tx: &WriteTransaction, master_id: MasterId) -> Result<(), AppError> {
        self.cascade.delete_details(tx, master_id)?;
        Ok(())
    }

    fn after_master_retrieve(&self, tx: TxView<'_>, master: &mut M) -> Result<(), AppError> {
        let attached = self.joiner.attach(tx, master.id())?;
        *(self.details)(master) = attached;
        Ok(())
    }
}

/// Save, retrieve and delete of one master type, each in a single transaction with registered stages.
pub struct MasterPipeline<M> {
    storage: Arc<Storage>,
    masters: EntityTable<M>,
    behaviors: Vec<Box<dyn MasterBehavior<M>>>,
}

impl<M: MasterRecord> MasterPipeline<M> {
    pub fn new(storage: Arc<Storage>, masters: EntityTable<M>) -> Self {
        MasterPipeline { storage, masters, behaviors: Vec::new() }
    }

    pub fn register(mut self, behavior: impl MasterBehavior<M> + 'static) -> Self {
        self.behaviors.push(Box::new(behavior));
        self
    }

    pub fn behavior_names(&self) -> Vec<&'static str> {
        self.behaviors.iter().map(|b| b.name()).collect()
    }

    /// Inserts when the master has no id, updates otherwise; commits only if every stage succeeded.
    pub fn save(&self, master: M) -> Result<M, AppError> {
        let tx = self.storage.begin_write()?;
        match self.save_in(&tx, master) {
            Ok(saved) => {
                tx.commit()?;
                Ok(saved)
            }
            Err(err) => Err(Self::rollback(tx, "save", err)),
        }
    }

    pub fn save_in(&self, tx: &WriteTransaction, master: M) -> Result<M, AppError> {
        let is_new = master.id().is_none();
        let mut saved = if is_new { self.masters.insert(tx, master)? } else { self.masters.update(tx, master)? };
        for behavior in &self.behaviors {
            debug!("after_master_persist: {} on {} {:?}", behavior.name(), self.masters.name(), saved.id());
            behavior.after_master_persist(tx, &mut saved, is_new)?;
        }
        Ok(saved)
    }

    pub fn retrieve(&self, id: MasterId) -> Result<Option<M>, AppError> {
        let tx = self.storage.begin_read()?;
        self.retrieve_in(TxView::Read(&tx), id)
    }

    pub fn retrieve_in(&self, tx: TxView<'_>, id: MasterId) -> Result<Option<M>, AppError> {
        let Some(mut master) = self.masters.get_in(tx, id)? else {
            return Ok(None);
        };
        for behavior in &self.behaviors {
            debug!("after_master_retrieve: {} on {} {}", behavior.name(), self.masters.name(), id);
            behavior.after_master_retrieve(tx, &mut master)?;
        }
        Ok(Some(master))
    }

    /// Masters without their details, ascending by id.
    pub fn list(&self) -> Result<Vec<M>, AppError> {
        let tx = self.storage.begin_read()?;
        self.masters.list_in(TxView::Read(&tx))
    }

    pub fn delete(&self, id: MasterId) -> Result<(), AppError> {
        let tx = self.storage.begin_write()?;
        match self.delete_in(&tx, id) {
            Ok(()) => {
                tx.commit()?;
                Ok(())
            }
            Err(err) => Err(Self::rollback(tx, "delete", err)),
        }
    }

    pub fn delete_in(&self, tx: &WriteTransaction, id: MasterId) -> Result<(), AppError> {
        if !self.masters.exists_in(TxView::Write(tx), id)? {
            return Err(AppError::NotFound(format!("{} {}", self.masters.name(), id.raw())));
        }
        for behavior in &self.behaviors {
            debug!("before_master_delete: {} on {} {}", behavior.name(), self.masters.name(), id);
            behavior.before_master_delete(tx, id)?;
        }
        self.masters.remove(tx, id)?;
        Ok(())
    }

    fn rollback(tx: WriteTransaction, op: &str, err: AppError) -> AppError {
        warn!("Rolling back {}: {}", op, err);
        if let Err(abort_err) = tx.abort() {
            error!("Abort after failed {} failed too: {}", op, abort_err);
        }
        err
    }
}
