use crate::error::AppError;
use crate::record::{Record, RecordId};
use crate::storage::TxView;
use redb::{ReadableTable, TableDefinition, WriteTransaction};
use std::marker::PhantomData;

pub(crate) type RowDefinition = TableDefinition<'static, u32, &'static [u8]>;

const SEQUENCES: TableDefinition<'static, &'static str, u32> = TableDefinition::new("SEQUENCES");

/// Id-keyed table of bincode-encoded rows; ids are minted per table from `SEQUENCES`, starting at 1.
pub struct EntityTable<R> {
    name: &'static str,
    def: RowDefinition,
    _marker: PhantomData<fn() -> R>,
}

impl<R> Clone for EntityTable<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for EntityTable<R> {}

impl<R: Record> EntityTable<R> {
    pub const fn new(name: &'static str) -> Self {
        EntityTable { name, def: TableDefinition::new(name), _marker: PhantomData }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn definition(&self) -> RowDefinition {
        self.def
    }

    /// Creates the table (and the shared sequence table) so read transactions can open it.
    pub fn ensure(&self, tx: &WriteTransaction) -> Result<(), AppError> {
        tx.open_table(self.def)?;
        tx.open_table(SEQUENCES)?;
        Ok(())
    }

    fn next_id(&self, tx: &WriteTransaction) -> Result<u32, AppError> {
        let mut sequences = tx.open_table(SEQUENCES)?;
        let next = sequences.get(self.name)?.map(|guard| guard.value()).unwrap_or(0) + 1;
        sequences.insert(self.name, next)?;
        Ok(next)
    }

    fn encode(record: &R) -> Result<Vec<u8>, AppError> {
        Ok(bincode::serde::encode_to_vec(record.to_row(), bincode::config::standard())?)
    }

    fn decode(raw: u32, bytes: &[u8]) -> Result<R, AppError> {
        let (row, _) = bincode::serde::decode_from_slice::<R::Row, _>(bytes, bincode::config::standard())?;
        Ok(R::from_row(R::Id::from_raw(raw), row))
    }

    /// Stores the record under a freshly minted id, any id already on it is replaced.
    pub fn insert(&self, tx: &WriteTransaction, mut record: R) -> Result<R, AppError> {
        let raw = self.next_id(tx)?;
        record.set_id(Some(R::Id::from_raw(raw)));
        let bytes = Self::encode(&record)?;
        let mut table = tx.open_table(self.def)?;
        table.insert(raw, bytes.as_slice())?;
        Ok(record)
    }

    pub fn update(&self, tx: &WriteTransaction, record: R) -> Result<R, AppError> {
        let id = record
            .id()
            .ok_or_else(|| AppError::BadRequest(format!("{} update requires an id", self.name)))?;
        let bytes = Self::encode(&record)?;
        let mut table = tx.open_table(self.def)?;
        if table.get(id.raw())?.is_none() {
            return Err(AppError::NotFound(format!("{} {}", self.name, id)));
        }
        table.insert(id.raw(), bytes.as_slice())?;
        Ok(record)
    }

    pub fn remove(&self, tx: &WriteTransaction, id: R::Id) -> Result<R, AppError> {
        let mut table = tx.open_table(self.def)?;
        let removed = match table.remove(id.raw())? {
            Some(guard) => Self::decode(id.raw(), guard.value())?,
            None => return Err(AppError::NotFound(format!("{} {}", self.name, id))),
        };
        Ok(removed)
    }

    pub fn get_in(&self, tx: TxView<'_>, id: R::Id) -> Result<Option<R>, AppError> {
        match tx {
            TxView::Read(tx) => Self::lookup(&tx.open_table(self.def)?, id.raw()),
            TxView::Write(tx) => Self::lookup(&tx.open_table(self.def)?, id.raw()),
        }
    }

    pub fn exists_in(&self, tx: TxView<'_>, id: R::Id) -> Result<bool, AppError> {
        row_exists(tx, self.def, id.raw())
    }

    /// All rows in ascending id order.
    pub fn list_in(&self, tx: TxView<'_>) -> Result<Vec<R>, AppError> {
        match tx {
            TxView::Read(tx) => Self::scan(&tx.open_table(self.def)?),
            TxView::Write(tx) => Self::scan(&tx.open_table(self.def)?),
        }
    }

    fn lookup<T: ReadableTable<u32, &'static [u8]>>(table: &T, raw: u32) -> Result<Option<R>, AppError> {
        match table.get(raw)? {
            Some(guard) => Ok(Some(Self::decode(raw, guard.value())?)),
            None => Ok(None),
        }
    }

    fn scan<T: ReadableTable<u32, &'static [u8]>>(table: &T) -> Result<Vec<R>, AppError> {
        let mut records = Vec::new();
        for entry in table.iter()? {
            let (key, value) = entry?;
            records.push(Self::decode(key.value(), value.value())?);
        }
        Ok(records)
    }
}

pub(crate) fn row_exists(tx: TxView<'_>, def: RowDefinition, raw: u32) -> Result<bool, AppError> {
    match tx {
        TxView::Read(tx) => Ok(tx.open_table(def)?.get(raw)?.is_some()),
        TxView::Write(tx) => Ok(tx.open_table(def)?.get(raw)?.is_some()),
    }
}
