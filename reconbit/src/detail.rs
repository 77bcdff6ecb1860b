use crate::error::AppError;
use crate::record::{DetailId, DetailRecord, MasterId};
use crate::storage::TxView;
use redb::WriteTransaction;

/// Per-row mutations for one detail type, always executed inside the caller's write transaction.
///
/// Failures are returned as-is: `NotFound` when the row vanished, `ConstraintViolation` for unique or
/// foreign-key breaches, and the redb storage variants for connection problems. The caller owns the
/// transaction and rolls it back.
pub trait DetailRowService<D: DetailRecord>: Send + Sync {
    fn create(&self, tx: &WriteTransaction, detail: D) -> Result<D, AppError>;
    fn update(&self, tx: &WriteTransaction, detail: D) -> Result<D, AppError>;
    fn delete(&self, tx: &WriteTransaction, id: DetailId) -> Result<(), AppError>;
}

/// Reads the details scoped to a master, in storage's natural order.
pub trait DetailRowReader<D: DetailRecord>: Send + Sync {
    /// `extra_fields` names the expression fields to join in, plain columns are always loaded.
    fn list_by_master(&self, tx: TxView<'_>, master_id: MasterId, extra_fields: &[&str]) -> Result<Vec<D>, AppError>;

    fn ids_by_master(&self, tx: TxView<'_>, master_id: MasterId) -> Result<Vec<DetailId>, AppError> {
        Ok(self.list_by_master(tx, master_id, &[])?.iter().filter_map(|d| d.id()).collect())
    }
}
