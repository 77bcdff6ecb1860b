use crate::error::AppError;
use crate::storage::TxView;

/// Indicates how to apply a joined field when composing a detail.
pub enum LoadResult<D> {
    Value(Box<dyn FnOnce(D) -> D + Send + 'static>),
    Skip,
}

/// An expression field: not a native column, filled in at read time by a join.
pub struct JoinSpec<D> {
    pub name: &'static str,
    pub load: fn(&TxView<'_>, &D) -> Result<LoadResult<D>, AppError>,
}

/// Natural key that must stay unique among the details of one master.
pub struct UniqueSpec<D> {
    pub name: &'static str,
    pub key: fn(&D) -> String,
}

/// Per-detail-type metadata, resolved once when a relation is configured.
pub struct DetailDescriptor<D> {
    pub name: &'static str,
    pub foreign_key: &'static str,
    pub unique: Option<UniqueSpec<D>>,
    pub joins: Vec<JoinSpec<D>>,
    pub validate: Option<fn(&D) -> Result<(), AppError>>,
}

impl<D> DetailDescriptor<D> {
    pub fn new(name: &'static str, foreign_key: &'static str) -> Self {
        DetailDescriptor { name, foreign_key, unique: None, joins: Vec::new(), validate: None }
    }

    pub fn with_unique(mut self, name: &'static str, key: fn(&D) -> String) -> Self {
        self.unique = Some(UniqueSpec { name, key });
        self
    }

    pub fn with_join(mut self, name: &'static str, load: fn(&TxView<'_>, &D) -> Result<LoadResult<D>, AppError>) -> Self {
        self.joins.push(JoinSpec { name, load });
        self
    }

    pub fn with_validation(mut self, validate: fn(&D) -> Result<(), AppError>) -> Self {
        self.validate = Some(validate);
        self
    }

    pub fn join_names(&self) -> Vec<&'static str> {
        self.joins.iter().map(|j| j.name).collect()
    }

    /// Rejects extra fields the descriptor cannot resolve.
    pub fn check_fields(&self, fields: &[&str]) -> Result<(), AppError> {
        match fields.iter().find(|f| !self.joins.iter().any(|j| j.name == **f)) {
            Some(unknown) => Err(AppError::BadRequest(format!("{} has no expression field '{}'", self.name, unknown))),
            None => Ok(()),
        }
    }

    pub fn natural_key(&self, detail: &D) -> Option<String> {
        self.unique.as_ref().map(|u| (u.key)(detail))
    }

    pub fn run_validation(&self, detail: &D) -> Result<(), AppError> {
        match self.validate {
            Some(validate) => validate(detail),
            None => Ok(()),
        }
    }

    /// Folds the requested join loaders over a detail in declaration order.
    pub fn compose(&self, tx: &TxView<'_>, detail: D, fields: &[&str]) -> Result<D, AppError> {
        let mut detail = detail;
        for join in self.joins.iter().filter(|j| fields.contains(&j.name)) {
            match (join.load)(tx, &detail)? {
                LoadResult::Value(apply) => {
                    detail = apply(detail);
                }
                LoadResult::Skip => {}
            }
        }
        Ok(detail)
    }
}
