use crate::detail::DetailRowReader;
use crate::error::AppError;
use crate::record::{DetailRecord, MasterId};
use crate::storage::TxView;
use std::sync::Arc;

/// Loads a master's details for display, including the expression fields plain column reads would miss.
pub struct Joiner<D> {
    reader: Arc<dyn DetailRowReader<D>>,
    extra_fields: Vec<&'static str>,
}

impl<D: DetailRecord> Joiner<D> {
    pub fn new(reader: Arc<dyn DetailRowReader<D>>, extra_fields: Vec<&'static str>) -> Self {
        Joiner { reader, extra_fields }
    }

    pub fn extra_fields(&self) -> &[&'static str] {
        &self.extra_fields
    }

    /// A master without an id has nothing persisted to join, so nothing is attached.
    pub fn attach(&self, tx: TxView<'_>, master_id: Option<MasterId>) -> Result<Option<Vec<D>>, AppError> {
        match master_id {
            Some(master_id) => Ok(Some(self.reader.list_by_master(tx, master_id, &self.extra_fields)?)),
            None => Ok(None),
        }
    }
}
