use crate::descriptor::DetailDescriptor;
use crate::detail::{DetailRowReader, DetailRowService};
use crate::error::AppError;
use crate::record::{DetailId, DetailRecord, MasterId, MasterRecord, RecordId};
use crate::storage::entity_table::{row_exists, EntityTable, RowDefinition};
use crate::storage::TxView;
use redb::{MultimapTableDefinition, ReadableMultimapTable, ReadableTable, TableDefinition, WriteTransaction};

type UniqueDefinition = TableDefinition<'static, (u32, &'static str), u32>;

fn leak(name: String) -> &'static str {
    Box::leak(name.into_boxed_str())
}

/// Detail rows plus the `<NAME>_BY_<FK>` index (master -> detail ids) and an optional
/// `<NAME>_<KEY>_UNIQUE` index ((master, natural key) -> detail id).
pub struct DetailTable<D> {
    rows: EntityTable<D>,
    descriptor: DetailDescriptor<D>,
    master_name: &'static str,
    master_def: RowDefinition,
    by_master: MultimapTableDefinition<'static, u32, u32>,
    unique: Option<UniqueDefinition>,
}

impl<D: DetailRecord> DetailTable<D> {
    pub fn new<M: MasterRecord>(descriptor: DetailDescriptor<D>, masters: &EntityTable<M>) -> Self {
        let table_name = descriptor.name.to_uppercase();
        let by_master_name = format!("{}_BY_{}", table_name, descriptor.foreign_key.to_uppercase());
        let unique = descriptor
            .unique
            .as_ref()
            .map(|u| TableDefinition::new(leak(format!("{}_{}_UNIQUE", table_name, u.name.to_uppercase()))));
        DetailTable {
            rows: EntityTable::new(descriptor.name),
            master_name: masters.name(),
            master_def: masters.definition(),
            by_master: MultimapTableDefinition::new(leak(by_master_name)),
            unique,
            descriptor,
        }
    }

    pub fn descriptor(&self) -> &DetailDescriptor<D> {
        &self.descriptor
    }

    pub fn ensure(&self, tx: &WriteTransaction) -> Result<(), AppError> {
        self.rows.ensure(tx)?;
        tx.open_multimap_table(self.by_master)?;
        if let Some(def) = self.unique {
            tx.open_table(def)?;
        }
        Ok(())
    }

    fn require_master(&self, tx: &WriteTransaction, detail: &D) -> Result<MasterId, AppError> {
        let master_id = detail.master_id().ok_or_else(|| {
            AppError::ConstraintViolation(format!("{} row has no {}", self.descriptor.name, self.descriptor.foreign_key))
        })?;
        if !row_exists(TxView::Write(tx), self.master_def, master_id.raw())? {
            return Err(AppError::ConstraintViolation(format!(
                "{} references missing {} {}",
                self.descriptor.name, self.master_name, master_id
            )));
        }
        Ok(master_id)
    }

    fn check_unique(&self, tx: &WriteTransaction, master_id: MasterId, key: &str, owner: Option<DetailId>) -> Result<(), AppError> {
        let Some(def) = self.unique else { return Ok(()) };
        let holder = tx.open_table(def)?.get((master_id.raw(), key))?.map(|guard| guard.value());
        match holder {
            Some(raw) if Some(DetailId(raw)) != owner => Err(AppError::ConstraintViolation(format!(
                "{} '{}' already taken by {} {} of {} {}",
                self.unique_name(), key, self.descriptor.name, raw, self.master_name, master_id
            ))),
            _ => Ok(()),
        }
    }

    fn unique_name(&self) -> &'static str {
        self.descriptor.unique.as_ref().map(|u| u.name).unwrap_or("key")
    }

    fn link(&self, tx: &WriteTransaction, master_id: MasterId, id: DetailId, key: Option<&str>) -> Result<(), AppError> {
        tx.open_multimap_table(self.by_master)?.insert(master_id.raw(), id.raw())?;
        if let (Some(def), Some(key)) = (self.unique, key) {
            tx.open_table(def)?.insert((master_id.raw(), key), id.raw())?;
        }
        Ok(())
    }

    fn unlink(&self, tx: &WriteTransaction, master_id: MasterId, id: DetailId, key: Option<&str>) -> Result<(), AppError> {
        tx.open_multimap_table(self.by_master)?.remove(master_id.raw(), id.raw())?;
        if let (Some(def), Some(key)) = (self.unique, key) {
            tx.open_table(def)?.remove((master_id.raw(), key))?;
        }
        Ok(())
    }

    fn collect_ids<T: ReadableMultimapTable<u32, u32>>(table: &T, master_id: MasterId) -> Result<Vec<DetailId>, AppError> {
        let mut ids = Vec::new();
        for item in table.get(master_id.raw())? {
            ids.push(DetailId(item?.value()));
        }
        Ok(ids)
    }
}

impl<D: DetailRecord> DetailRowService<D> for DetailTable<D> {
    fn create(&self, tx: &WriteTransaction, detail: D) -> Result<D, AppError> {
        if let Some(id) = detail.id() {
            return Err(AppError::ConstraintViolation(format!("{} {} cannot be created twice", self.descriptor.name, id)));
        }
        let master_id = self.require_master(tx, &detail)?;
        self.descriptor.run_validation(&detail)?;
        let key = self.descriptor.natural_key(&detail);
        if let Some(key) = key.as_deref() {
            self.check_unique(tx, master_id, key, None)?;
        }
        let created = self.rows.insert(tx, detail)?;
        let id = created
            .id()
            .ok_or_else(|| AppError::Custom(format!("{} insert returned no id", self.descriptor.name)))?;
        self.link(tx, master_id, id, key.as_deref())?;
        Ok(created)
    }

    fn update(&self, tx: &WriteTransaction, detail: D) -> Result<D, AppError> {
        let id = detail
            .id()
            .ok_or_else(|| AppError::NotFound(format!("{} row without id", self.descriptor.name)))?;
        let previous = self
            .rows
            .get_in(TxView::Write(tx), id)?
            .ok_or_else(|| AppError::NotFound(format!("{} {}", self.descriptor.name, id)))?;
        let master_id = self.require_master(tx, &detail)?;
        self.descriptor.run_validation(&detail)?;
        let key = self.descriptor.natural_key(&detail);
        if let Some(key) = key.as_deref() {
            self.check_unique(tx, master_id, key, Some(id))?;
        }
        let updated = self.rows.update(tx, detail)?;
        if let Some(previous_master) = previous.master_id() {
            self.unlink(tx, previous_master, id, self.descriptor.natural_key(&previous).as_deref())?;
        }
        self.link(tx, master_id, id, key.as_deref())?;
        Ok(updated)
    }

    fn delete(&self, tx: &WriteTransaction, id: DetailId) -> Result<(), AppError> {
        let removed = self.rows.remove(tx, id)?;
        if let Some(master_id) = removed.master_id() {
            self.unlink(tx, master_id, id, self.descriptor.natural_key(&removed).as_deref())?;
        }
        Ok(())
    }
}

impl<D: DetailRecord> DetailRowReader<D> for DetailTable<D> {
    fn list_by_master(&self, tx: TxView<'_>, master_id: MasterId, extra_fields: &[&str]) -> Result<Vec<D>, AppError> {
        self.descriptor.check_fields(extra_fields)?;
        let ids = self.ids_by_master(tx, master_id)?;
        let mut details = Vec::with_capacity(ids.len());
        for id in ids {
            let detail = self.rows.get_in(tx, id)?.ok_or_else(|| {
                AppError::Custom(format!("{} index points at missing {} {}", self.descriptor.foreign_key, self.descriptor.name, id))
            })?;
            details.push(self.descriptor.compose(&tx, detail, extra_fields)?);
        }
        Ok(details)
    }

    fn ids_by_master(&self, tx: TxView<'_>, master_id: MasterId) -> Result<Vec<DetailId>, AppError> {
        match tx {
            TxView::Read(tx) => Self::collect_ids(&tx.open_multimap_table(self.by_master)?, master_id),
            TxView::Write(tx) => Self::collect_ids(&tx.open_multimap_table(self.by_master)?, master_id),
        }
    }
}
