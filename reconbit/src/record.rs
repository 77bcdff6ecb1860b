use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use std::hash::Hash;

/// Storage-minted identifier; `None` on the owning record means "not yet created".
pub trait RecordId: Copy + Eq + Ord + Hash + Debug + std::fmt::Display + Send + Sync + 'static {
    fn from_raw(raw: u32) -> Self;
    fn raw(self) -> u32;
}

crate::impl_record_id!(MasterId);
crate::impl_record_id!(DetailId);

/// A persistable entity. `Row` carries the native columns only, computed fields never reach storage.
pub trait Record: Clone + Debug + Send + Sync + 'static {
    type Id: RecordId;
    type Row: Serialize + DeserializeOwned;

    fn id(&self) -> Option<Self::Id>;
    fn set_id(&mut self, id: Option<Self::Id>);
    fn to_row(&self) -> Self::Row;
    fn from_row(id: Self::Id, row: Self::Row) -> Self;
}

/// Record owned by exactly one master through its foreign reference.
pub trait DetailRecord: Record<Id = DetailId> {
    fn master_id(&self) -> Option<MasterId>;
    fn set_master_id(&mut self, master_id: MasterId);
}

pub trait MasterRecord: Record<Id = MasterId> {}
