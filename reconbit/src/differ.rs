use crate::error::AppError;
use crate::record::{DetailId, DetailRecord};
use std::collections::HashSet;

/// Outcome of comparing persisted details with a submitted replacement list.
/// `added` and `retained` keep each record's position in the submitted list.
#[derive(Debug)]
pub struct DetailDiff<D> {
    pub removed: Vec<D>,
    pub added: Vec<(usize, D)>,
    pub retained: Vec<(usize, D)>,
}

impl<D> DetailDiff<D> {
    /// True when applying the diff changes no row count.
    pub fn is_noop(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }
}

/// Classifies details by id.
///
/// Submitted records without an id, or with an id unknown to `old`, are added. Submitted records whose id
/// matches a persisted one are retained and always re-written. Persisted records whose id is not submitted
/// are removed. A non-null id submitted twice is rejected before anything is classified.
pub fn diff<D: DetailRecord>(old: Vec<D>, new: Vec<D>) -> Result<DetailDiff<D>, AppError> {
    let mut submitted: HashSet<DetailId> = HashSet::with_capacity(new.len());
    for id in new.iter().filter_map(|d| d.id()) {
        if !submitted.insert(id) {
            return Err(AppError::DuplicateDetail(id));
        }
    }

    let removed: Vec<D> = if old.is_empty() {
        Vec::new()
    } else {
        old.iter()
            .filter(|d| d.id().is_some_and(|id| !submitted.contains(&id)))
            .cloned()
            .collect()
    };
    let persisted: HashSet<DetailId> = old.iter().filter_map(|d| d.id()).collect();

    let mut added = Vec::new();
    let mut retained = Vec::new();
    for (position, detail) in new.into_iter().enumerate() {
        match detail.id() {
            Some(id) if persisted.contains(&id) => retained.push((position, detail)),
            _ => added.push((position, detail)),
        }
    }
    Ok(DetailDiff { removed, added, retained })
}
